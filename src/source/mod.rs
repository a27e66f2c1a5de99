//! Document access: page text with positions and page images.

mod backend;
mod lopdf_source;
mod rasterize;

pub use backend::{DocumentSource, PageRasterizer, RasterImage};
pub use lopdf_source::LopdfSource;
pub use rasterize::{PdftoppmRasterizer, DEFAULT_PDFTOPPM, NATIVE_DPI};
