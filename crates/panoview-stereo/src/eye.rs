/// Which eye a draw targets.
///
/// The numeric value is what the fragment stage receives as its eye selector.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Eye {
    Left,
    Right,
}

impl Eye {
    pub const BOTH: [Eye; 2] = [Eye::Left, Eye::Right];

    #[inline]
    pub fn index(self) -> usize {
        match self {
            Eye::Left => 0,
            Eye::Right => 1,
        }
    }

    /// Shader-side selector (0.0 left, 1.0 right).
    #[inline]
    pub fn selector(self) -> f32 {
        self.index() as f32
    }
}

/// Layout of the panorama source image.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum ProjectionMode {
    /// One equirectangular image shown to both eyes.
    #[default]
    Mono,
    /// Left and right equirectangular halves side by side.
    Stereo,
}

impl ProjectionMode {
    /// Shader-side selector (0.0 mono, 1.0 stereo).
    #[inline]
    pub fn selector(self) -> f32 {
        match self {
            ProjectionMode::Mono => 0.0,
            ProjectionMode::Stereo => 1.0,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ProjectionMode::Mono => ProjectionMode::Stereo,
            ProjectionMode::Stereo => ProjectionMode::Mono,
        }
    }
}

/// Render surface size in physical pixels.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Aspect ratio of one eye's half: `(width / 2) / height`.
    pub fn eye_aspect(self) -> f32 {
        if self.height == 0 {
            return 1.0;
        }
        (self.width as f32 / 2.0) / self.height as f32
    }

    /// Viewport for `eye`: left half or right half, full height.
    ///
    /// For odd widths the right half is one pixel wider so the two viewports
    /// always tile the surface exactly.
    pub fn eye_viewport(self, eye: Eye) -> ViewportRect {
        let half = self.width / 2;
        match eye {
            Eye::Left => ViewportRect::new(0, 0, half, self.height),
            Eye::Right => ViewportRect::new(half, 0, self.width - half, self.height),
        }
    }
}

/// Pixel rectangle on the render surface (origin top-left).
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct ViewportRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl ViewportRect {
    #[inline]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn right(self) -> u32 {
        self.x + self.width
    }
}
