pub(crate) mod flow;
pub(crate) mod model;
pub(crate) mod text;
