use glam::{Mat4, Quat};

use crate::controls::ManualControls;
use crate::eye::{Eye, ProjectionMode, SurfaceSize, ViewportRect};
use crate::orientation::{OrientationTracker, SourceChain};
use crate::projection::{HeadsetInfo, Projection};

/// How the render surface is currently presented.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum DisplayMode {
    /// Regular window (also used for fullscreen that ignores the headset).
    #[default]
    Windowed,
    /// Fullscreen on the headset; the surface follows its render targets.
    HeadsetFullscreen,
}

/// Window metrics needed to size the surface in windowed mode.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct WindowMetrics {
    pub logical_width: f64,
    pub logical_height: f64,
    pub scale_factor: f64,
}

impl WindowMetrics {
    /// Logical size scaled by the device pixel ratio.
    pub fn physical_size(&self) -> SurfaceSize {
        SurfaceSize::new(
            (self.logical_width * self.scale_factor).round().max(0.0) as u32,
            (self.logical_height * self.scale_factor).round().max(0.0) as u32,
        )
    }
}

/// Everything the renderer needs to draw one eye.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EyeView {
    pub eye: Eye,
    pub viewport: ViewportRect,
    /// `rotation * inverse(projection)`: maps clip-space positions to
    /// panorama-space view rays.
    pub inverse_view_projection: Mat4,
}

/// Per-frame draw plan for both eyes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FramePlan {
    pub surface: SurfaceSize,
    pub rotation: Mat4,
    pub projection_mode: ProjectionMode,
    pub eyes: [EyeView; 2],
}

impl FramePlan {
    pub fn build(
        rotation: Mat4,
        projection_mode: ProjectionMode,
        surface: SurfaceSize,
        headset: Option<&HeadsetInfo>,
    ) -> Self {
        let view = |eye: Eye| EyeView {
            eye,
            viewport: surface.eye_viewport(eye),
            inverse_view_projection: rotation * Projection::for_eye(eye, headset, surface).inverse(),
        };

        Self {
            surface,
            rotation,
            projection_mode,
            eyes: [view(Eye::Left), view(Eye::Right)],
        }
    }

    pub fn eye(&self, eye: Eye) -> &EyeView {
        &self.eyes[eye.index()]
    }
}

/// Render-side state that persists across frames.
///
/// Owned by the render loop and passed by `&mut` into each frame; there is
/// no global orientation or projection state anywhere else.
pub struct ViewState {
    tracker: OrientationTracker,
    controls: ManualControls,
    sources: SourceChain,
    headset: Option<HeadsetInfo>,
    projection_mode: ProjectionMode,
}

impl ViewState {
    pub fn new(sources: SourceChain, headset: Option<HeadsetInfo>, projection_mode: ProjectionMode) -> Self {
        Self {
            tracker: OrientationTracker::new(),
            controls: ManualControls::new(),
            sources,
            headset,
            projection_mode,
        }
    }

    pub fn headset(&self) -> Option<&HeadsetInfo> {
        self.headset.as_ref()
    }

    pub fn projection_mode(&self) -> ProjectionMode {
        self.projection_mode
    }

    pub fn set_projection_mode(&mut self, mode: ProjectionMode) {
        if self.projection_mode != mode {
            log::info!("projection mode: {mode:?}");
        }
        self.projection_mode = mode;
    }

    pub fn controls(&self) -> &ManualControls {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut ManualControls {
        &mut self.controls
    }

    pub fn manual_rotation(&self) -> Quat {
        self.tracker.manual_rotation()
    }

    /// Recenters the external sensor. The manual rotation is untouched.
    pub fn zero_sensor(&mut self) {
        if !self.sources.recenter() {
            log::debug!("zero sensor: no orientation source");
        }
    }

    /// Surface size the current display mode requires.
    ///
    /// Headset fullscreen uses the headset's render targets side by side;
    /// everything else uses the window's physical size.
    pub fn surface_size(&self, mode: DisplayMode, window: WindowMetrics) -> SurfaceSize {
        match (mode, self.headset.as_ref()) {
            (DisplayMode::HeadsetFullscreen, Some(info)) => info.surface_size(),
            _ => window.physical_size(),
        }
    }

    /// Advances orientation by `elapsed` seconds (`None` on the first frame)
    /// and plans both eyes for a surface of size `surface`.
    pub fn frame(&mut self, elapsed: Option<f32>, surface: SurfaceSize) -> FramePlan {
        let external = self.sources.sample();
        let rotation = self.tracker.advance(self.controls.rate(), elapsed, external);
        FramePlan::build(rotation, self.projection_mode, surface, self.headset.as_ref())
    }
}
