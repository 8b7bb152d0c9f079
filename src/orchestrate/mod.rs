pub(crate) mod scaler;
