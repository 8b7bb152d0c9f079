pub(crate) mod nudge;
pub(crate) mod scoring;
