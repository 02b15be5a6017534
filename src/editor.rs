pub(crate) mod async_ops;
pub(crate) mod commands;
pub(crate) mod gestures;
pub(crate) mod opts;
pub(crate) mod state;
