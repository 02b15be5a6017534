pub(crate) mod model;
pub(crate) mod order;
pub(crate) mod patch;
pub(crate) mod store;
