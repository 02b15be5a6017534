pub(crate) mod decode;
pub(crate) mod pending;
pub(crate) mod pipeline;
pub(crate) mod shape_raster;
