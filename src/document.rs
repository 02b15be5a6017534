pub(crate) mod export;
pub(crate) mod frame;
pub(crate) mod import;
