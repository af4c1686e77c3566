//! GPU plumbing shared by the passes, asset uploads and the prefilter tool.

pub mod context;
pub mod mipmap;
pub mod readback;
pub mod shader;
pub mod uniform;

pub use context::{PresentationSurface, WgpuContext};
pub use mipmap::MipmapGenerator;
pub use uniform::{UniformBlock, UniformTable};
