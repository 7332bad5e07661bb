use anyhow::{ensure, Result};

use super::ctx::RenderCtx;

const BYTES_PER_PIXEL: u32 = 4;

/// A decoded equirectangular image, tightly packed 8-bit sRGB RGBA rows.
///
/// This is the handle the image source passes to the renderer; decoding
/// happens elsewhere.
#[derive(Clone)]
pub struct PanoramaImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for PanoramaImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PanoramaImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl PanoramaImage {
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        ensure!(width > 0 && height > 0, "panorama image has zero size");
        let expected = width as usize * height as usize * BYTES_PER_PIXEL as usize;
        ensure!(
            pixels.len() == expected,
            "panorama pixel buffer is {} bytes, expected {expected} for {width}x{height} RGBA",
            pixels.len(),
        );
        Ok(Self { width, height, pixels })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// GPU copy of a [`PanoramaImage`].
pub struct PanoramaTexture {
    texture: wgpu::Texture,
    view: wgpu::TextureView,
}

impl PanoramaTexture {
    /// Creates a texture sized to `image` and uploads its pixels.
    pub fn upload(ctx: &RenderCtx<'_>, image: &PanoramaImage) -> Result<Self> {
        let max = ctx.device.limits().max_texture_dimension_2d;
        ensure!(
            image.width <= max && image.height <= max,
            "panorama {}x{} exceeds the device texture limit of {max}",
            image.width,
            image.height,
        );

        let size = wgpu::Extent3d {
            width: image.width,
            height: image.height,
            depth_or_array_layers: 1,
        };

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("panoview panorama texture"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        ctx.queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &image.pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(image.width * BYTES_PER_PIXEL),
                rows_per_image: Some(image.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        log::debug!("panorama texture uploaded: {}x{}", image.width, image.height);

        Ok(Self { texture, view })
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }
}
