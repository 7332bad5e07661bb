use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use panoview_engine::core::{App, AppControl, FrameCtx};
use panoview_engine::input::{InputEvent, Key, KeyState};
use panoview_engine::render::{PanoramaImage, PanoramaRenderer};
use panoview_engine::window::RuntimeCtx;
use panoview_stereo::{DisplayMode, FrameTimingMonitor, ViewState};

use crate::loader::{ImageLoader, LoadRequest, LoadResult};

const CLEAR: wgpu::Color = wgpu::Color::BLACK;

/// Which image is showing and which one is on its way.
///
/// The render loop is cancelled while a load is in flight; a decoded image
/// waits here until the next frame uploads it.
#[derive(Debug)]
pub struct ImageSwap {
    images: Vec<PathBuf>,
    index: usize,
    generation: u64,
    in_flight: Option<u64>,
    pending: Option<PanoramaImage>,
}

/// What accepting a load result means for the render loop.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SwapOutcome {
    /// New image is pending upload; restart the loop.
    Ready,
    /// Decode failed; stay idle.
    Failed,
    /// Superseded by a newer request; ignore.
    Stale,
}

impl ImageSwap {
    pub fn new(images: Vec<PathBuf>) -> Self {
        Self {
            images,
            index: 0,
            generation: 0,
            in_flight: None,
            pending: None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Request for the current image.
    pub fn request_current(&mut self) -> Option<LoadRequest> {
        let path = self.images.get(self.index)?.clone();
        self.generation += 1;
        self.in_flight = Some(self.generation);
        self.pending = None;
        Some(LoadRequest {
            generation: self.generation,
            path,
        })
    }

    /// Advances to the next image (wrapping) and requests it.
    pub fn request_next(&mut self) -> Option<LoadRequest> {
        if self.images.is_empty() {
            return None;
        }
        self.index = (self.index + 1) % self.images.len();
        self.request_current()
    }

    pub fn accept(&mut self, result: LoadResult) -> SwapOutcome {
        if self.in_flight != Some(result.generation) {
            return SwapOutcome::Stale;
        }
        self.in_flight = None;
        match result.image {
            Ok(image) => {
                log::info!(
                    "loaded {} ({}x{})",
                    result.path.display(),
                    image.width(),
                    image.height()
                );
                self.pending = Some(image);
                SwapOutcome::Ready
            }
            Err(e) => {
                log::error!("{e:#}");
                SwapOutcome::Failed
            }
        }
    }

    pub fn take_pending(&mut self) -> Option<PanoramaImage> {
        self.pending.take()
    }
}

/// The panorama viewer application.
pub struct Viewer {
    view: ViewState,
    display: DisplayMode,
    fullscreen: bool,
    renderer: PanoramaRenderer,
    loader: ImageLoader,
    swap: ImageSwap,
    timing: Option<FrameTimingMonitor>,
}

impl Viewer {
    /// Creates the viewer and requests the first image.
    pub fn new(view: ViewState, loader: ImageLoader, swap: ImageSwap, show_timing: bool) -> Result<Self> {
        let mut viewer = Self {
            view,
            display: DisplayMode::Windowed,
            fullscreen: false,
            renderer: PanoramaRenderer::new(),
            loader,
            swap,
            timing: show_timing.then(FrameTimingMonitor::default),
        };
        if let Some(req) = viewer.swap.request_current() {
            viewer.loader.request(req)?;
        }
        Ok(viewer)
    }

    fn load_next(&mut self, runtime: &mut RuntimeCtx) -> AppControl {
        let Some(req) = self.swap.request_next() else {
            return AppControl::Continue;
        };
        runtime.cancel_loop();
        if let Err(e) = self.loader.request(req) {
            log::error!("{e:#}");
            return AppControl::Exit;
        }
        AppControl::Continue
    }

    /// Ready images restart the render loop; failures leave it idle.
    fn apply_load(&mut self, result: LoadResult, runtime: &mut RuntimeCtx) {
        match self.swap.accept(result) {
            SwapOutcome::Ready => runtime.start_loop(),
            SwapOutcome::Failed => self.renderer.clear_texture(),
            SwapOutcome::Stale => log::debug!("dropping superseded image"),
        }
    }

    fn set_display(&mut self, mode: DisplayMode, fullscreen: bool, runtime: &mut RuntimeCtx) {
        self.display = mode;
        self.fullscreen = fullscreen;
        runtime.set_fullscreen(fullscreen);
        log::info!("display mode: {mode:?} (fullscreen: {fullscreen})");
    }

    fn on_key_pressed(&mut self, c: char, runtime: &mut RuntimeCtx) -> AppControl {
        match c {
            'p' => {
                let mode = self.view.projection_mode().toggled();
                self.view.set_projection_mode(mode);
            }
            'f' | 'g' if self.fullscreen => self.set_display(DisplayMode::Windowed, false, runtime),
            'f' if self.view.headset().is_some() => {
                self.set_display(DisplayMode::HeadsetFullscreen, true, runtime)
            }
            'f' | 'g' => self.set_display(DisplayMode::Windowed, true, runtime),
            'z' => {
                log::info!("recentering orientation sensor");
                self.view.zero_sensor();
            }
            'n' | ' ' => return self.load_next(runtime),
            _ => {}
        }
        AppControl::Continue
    }
}

impl App for Viewer {
    fn on_input(&mut self, event: &InputEvent, runtime: &mut RuntimeCtx) -> AppControl {
        match event {
            InputEvent::Focused(false) => {
                self.view.controls_mut().release_all();
                AppControl::Continue
            }

            InputEvent::Key { key: Key::Escape, state: KeyState::Pressed, .. } => {
                if self.fullscreen {
                    self.set_display(DisplayMode::Windowed, false, runtime);
                    AppControl::Continue
                } else {
                    AppControl::Exit
                }
            }

            InputEvent::Key { key, state, repeat, modifiers, .. } => {
                let Some(c) = key.as_char() else {
                    return AppControl::Continue;
                };
                match state {
                    KeyState::Pressed if self.view.controls().is_mapped(c) => {
                        self.view.controls_mut().key_down(c);
                        AppControl::Continue
                    }
                    KeyState::Pressed if *repeat || modifiers.any() => AppControl::Continue,
                    KeyState::Pressed => self.on_key_pressed(c, runtime),
                    KeyState::Released => {
                        self.view.controls_mut().key_up(c);
                        AppControl::Continue
                    }
                }
            }

            _ => AppControl::Continue,
        }
    }

    fn on_idle(&mut self, runtime: &mut RuntimeCtx) -> AppControl {
        loop {
            let result = match self.loader.poll() {
                Ok(Some(r)) => r,
                Ok(None) => return AppControl::Continue,
                Err(e) => {
                    log::error!("{e:#}");
                    return AppControl::Exit;
                }
            };

            self.apply_load(result, runtime);
        }
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        if let Some(image) = self.swap.take_pending() {
            let rctx = ctx.render_ctx();
            if let Err(e) = self.renderer.replace_texture(&rctx, &image) {
                log::error!("{e:#}");
                self.renderer.clear_texture();
                ctx.runtime.cancel_loop();
                return AppControl::Continue;
            }
        }

        let wanted = self.view.surface_size(self.display, ctx.window.metrics());
        let surface = ctx.resize_surface(wanted);
        if surface.is_empty() {
            return AppControl::Continue;
        }

        let plan = self.view.frame(ctx.time.elapsed, surface);

        let renderer = &mut self.renderer;
        let control = ctx.render(CLEAR, |rctx, target| renderer.render(rctx, target, &plan));

        if let Some(monitor) = self.timing.as_mut() {
            let took = Instant::now().saturating_duration_since(ctx.time.now);
            if let Some(slow) = monitor.record(took) {
                log::info!(
                    "slow frame: {:.1} ms after {} good frames",
                    slow.duration.as_secs_f64() * 1000.0,
                    slow.frames_since_issue
                );
            }
        }

        control
    }
}
