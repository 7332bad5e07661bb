//! Background panorama decoder.
//!
//! Receives decode requests, decodes and downscales off the event-loop
//! thread, and hands back ready-to-upload RGBA8 images.

use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use panoview_engine::render::PanoramaImage;

/// One decode job. `generation` lets the viewer drop results it no longer wants.
#[derive(Debug, Clone)]
pub struct LoadRequest {
    pub generation: u64,
    pub path: PathBuf,
}

/// Outcome of a [`LoadRequest`].
#[derive(Debug)]
pub struct LoadResult {
    pub generation: u64,
    pub path: PathBuf,
    pub image: Result<PanoramaImage>,
}

/// Handle to the decoder thread. Dropping it stops the thread once its
/// current job finishes.
pub struct ImageLoader {
    requests: Sender<LoadRequest>,
    results: Receiver<LoadResult>,
}

impl ImageLoader {
    pub fn spawn(max_texture_size: u32) -> Result<Self> {
        let (req_tx, req_rx) = crossbeam_channel::unbounded::<LoadRequest>();
        let (res_tx, res_rx) = crossbeam_channel::unbounded::<LoadResult>();

        thread::Builder::new()
            .name("panoview-loader".into())
            .spawn(move || {
                while let Ok(req) = req_rx.recv() {
                    log::info!("loading {}", req.path.display());
                    let image = decode_panorama(&req.path, max_texture_size);
                    let result = LoadResult {
                        generation: req.generation,
                        path: req.path,
                        image,
                    };
                    if res_tx.send(result).is_err() {
                        break;
                    }
                }
            })
            .context("failed to spawn image loader thread")?;

        Ok(Self {
            requests: req_tx,
            results: res_rx,
        })
    }

    pub fn request(&self, req: LoadRequest) -> Result<()> {
        self.requests
            .send(req)
            .map_err(|_| anyhow::anyhow!("image loader thread has stopped"))
    }

    /// Non-blocking: a finished result, if any.
    pub fn poll(&self) -> Result<Option<LoadResult>> {
        match self.results.try_recv() {
            Ok(r) => Ok(Some(r)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => anyhow::bail!("image loader thread has stopped"),
        }
    }
}

/// Decodes `path` to RGBA8, downscaling so neither edge exceeds `max_edge`.
pub fn decode_panorama(path: &Path, max_edge: u32) -> Result<PanoramaImage> {
    let img = image::open(path).with_context(|| format!("failed to decode {}", path.display()))?;

    let (w, h) = (img.width(), img.height());
    let (tw, th) = fit_within(w, h, max_edge);
    let img = if (tw, th) != (w, h) {
        log::info!("downscaling {}x{} to {tw}x{th}", w, h);
        img.resize_exact(tw, th, image::imageops::FilterType::Triangle)
    } else {
        img
    };

    let rgba = img.to_rgba8();
    let (w, h) = rgba.dimensions();
    PanoramaImage::new(w, h, rgba.into_raw())
}

/// Largest size with the same aspect ratio whose edges fit in `max_edge`.
pub fn fit_within(width: u32, height: u32, max_edge: u32) -> (u32, u32) {
    let longest = width.max(height);
    if longest <= max_edge || longest == 0 {
        return (width, height);
    }
    let scale = max_edge as f64 / longest as f64;
    let fit = |v: u32| ((v as f64 * scale).round() as u32).clamp(1, max_edge);
    (fit(width), fit(height))
}
