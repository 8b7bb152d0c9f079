pub(crate) mod feedback;
pub(crate) mod policy;
