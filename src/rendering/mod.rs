//! Off-screen rendering: pixel buffers, the software context that owns them,
//! the rasterizer that draws into them and the extractor that turns them into
//! caller-facing images.

pub mod buffer;
pub mod context;
pub mod extract;
pub mod font;
pub mod raster;
pub mod target;

pub use buffer::PixelBuffer;
pub use context::{
    Capabilities, ContextConfig, ContextId, ContextRegistry, OffscreenContext, MAX_VIEWPORT,
};
pub use extract::{extract, ImageTensor};
pub use raster::RasterRenderer;
pub use target::{HAlign, RenderTarget, TextItem, Vertex};
