pub(crate) mod layout_mode;
pub(crate) mod reposition;
