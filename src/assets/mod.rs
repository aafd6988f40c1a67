pub(crate) mod local;
pub(crate) mod media;
pub(crate) mod raster;
