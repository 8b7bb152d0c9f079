pub(crate) mod content;
pub(crate) mod profile;
pub(crate) mod safe_area;
