//! GPU rendering subsystem.
//!
//! Each renderer owns its GPU resources (pipelines, buffers, textures) and
//! creates them lazily on first use.
//!
//! Convention:
//! - geometry is a single clip-space quad covering the bound viewport
//! - the fragment stage turns clip-space positions into panorama rays

mod ctx;
mod panorama;
mod quad;
mod texture;

pub use ctx::{RenderCtx, RenderTarget};
pub use panorama::PanoramaRenderer;
pub use texture::{PanoramaImage, PanoramaTexture};
