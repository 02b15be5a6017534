pub(crate) mod paint;
