use std::f32::consts::FRAC_PI_2;

use glam::{Mat4, Vec4};

use crate::error::FovError;
use crate::eye::{Eye, SurfaceSize};

/// Near clip plane shared by every projection.
pub const NEAR: f32 = 0.1;
/// Far clip plane shared by every projection.
pub const FAR: f32 = 10.0;
/// Vertical field of view used when no headset reports its own.
pub const DEFAULT_FOV_Y: f32 = FRAC_PI_2;

/// Per-edge field of view in degrees, as reported by headset optics.
///
/// Each angle is measured from the view axis to that edge, so a symmetric
/// 90° frustum is `45/45/45/45`. Angles may be negative for strongly
/// off-axis lenses as long as opposite edges still enclose a positive span.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FieldOfView {
    up: f32,
    down: f32,
    left: f32,
    right: f32,
}

impl FieldOfView {
    pub fn new(up: f32, down: f32, left: f32, right: f32) -> Result<Self, FovError> {
        for (name, deg) in [("up", up), ("down", down), ("left", left), ("right", right)] {
            if !deg.is_finite() {
                return Err(FovError::new(format!("{name} angle is not finite")));
            }
            if deg <= -90.0 || deg >= 90.0 {
                return Err(FovError::new(format!(
                    "{name} angle {deg}° must lie strictly between -90° and 90°"
                )));
            }
        }
        if up + down <= 0.0 {
            return Err(FovError::new("vertical span must be positive"));
        }
        if left + right <= 0.0 {
            return Err(FovError::new("horizontal span must be positive"));
        }
        Ok(Self { up, down, left, right })
    }

    /// Symmetric field of view with the same angle on every edge.
    pub fn symmetric(half_angle_deg: f32) -> Result<Self, FovError> {
        Self::new(half_angle_deg, half_angle_deg, half_angle_deg, half_angle_deg)
    }

    pub fn up(&self) -> f32 {
        self.up
    }

    pub fn down(&self) -> f32 {
        self.down
    }

    pub fn left(&self) -> f32 {
        self.left
    }

    pub fn right(&self) -> f32 {
        self.right
    }
}

/// Display geometry a headset reports for one eye.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct EyeParameters {
    pub recommended_fov: FieldOfView,
    /// Recommended render-target size for this eye, in pixels.
    pub render_width: u32,
    pub render_height: u32,
}

/// Display geometry for both eyes of a headset.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct HeadsetInfo {
    pub left: EyeParameters,
    pub right: EyeParameters,
}

impl HeadsetInfo {
    pub fn eye(&self, eye: Eye) -> &EyeParameters {
        match eye {
            Eye::Left => &self.left,
            Eye::Right => &self.right,
        }
    }

    /// Surface size for side-by-side output: the right eye's render target
    /// doubled horizontally.
    pub fn surface_size(&self) -> SurfaceSize {
        SurfaceSize::new(self.right.render_width * 2, self.right.render_height)
    }
}

/// A perspective projection (wgpu clip space: right-handed, depth 0..1).
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Projection {
    matrix: Mat4,
}

impl Projection {
    /// Shared projection from a vertical field of view and aspect ratio.
    pub fn perspective(fov_y_radians: f32, aspect: f32) -> Self {
        Self {
            matrix: Mat4::perspective_rh(fov_y_radians, aspect, NEAR, FAR),
        }
    }

    /// Projection used when no headset is present: 90° vertical, aspect of one eye's half.
    pub fn windowed(surface: SurfaceSize) -> Self {
        Self::perspective(DEFAULT_FOV_Y, surface.eye_aspect())
    }

    /// Off-axis projection from a headset's per-edge field of view.
    pub fn from_fov(fov: &FieldOfView) -> Self {
        let up = fov.up.to_radians().tan();
        let down = fov.down.to_radians().tan();
        let left = fov.left.to_radians().tan();
        let right = fov.right.to_radians().tan();

        let x_scale = 2.0 / (left + right);
        let y_scale = 2.0 / (up + down);
        let depth = FAR / (NEAR - FAR);

        Self {
            matrix: Mat4::from_cols(
                Vec4::new(x_scale, 0.0, 0.0, 0.0),
                Vec4::new(0.0, y_scale, 0.0, 0.0),
                Vec4::new(
                    -((left - right) * x_scale * 0.5),
                    (up - down) * y_scale * 0.5,
                    depth,
                    -1.0,
                ),
                Vec4::new(0.0, 0.0, NEAR * depth, 0.0),
            ),
        }
    }

    /// Projection for `eye`: the headset's reported FOV when present,
    /// otherwise the shared windowed projection.
    pub fn for_eye(eye: Eye, headset: Option<&HeadsetInfo>, surface: SurfaceSize) -> Self {
        match headset {
            Some(info) => Self::from_fov(&info.eye(eye).recommended_fov),
            None => Self::windowed(surface),
        }
    }

    #[inline]
    pub fn matrix(&self) -> Mat4 {
        self.matrix
    }

    /// Inverse of the projection matrix.
    ///
    /// # Panics
    /// Panics if the matrix is singular. Validated fields of view and the fixed
    /// clip planes never produce one, so this indicates a construction bug.
    pub fn inverse(&self) -> Mat4 {
        let det = self.matrix.determinant();
        assert!(
            det.is_finite() && det != 0.0,
            "projection matrix is not invertible (determinant {det})"
        );
        self.matrix.inverse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── field of view ─────────────────────────────────────────────────────

    #[test]
    fn fov_accepts_typical_headset_values() {
        assert!(FieldOfView::new(41.6, 50.0, 43.5, 47.1).is_ok());
        assert!(FieldOfView::symmetric(45.0).is_ok());
    }

    #[test]
    fn fov_rejects_out_of_range_edges() {
        assert!(FieldOfView::new(90.0, 45.0, 45.0, 45.0).is_err());
        assert!(FieldOfView::new(45.0, -95.0, 45.0, 45.0).is_err());
        assert!(FieldOfView::new(f32::NAN, 45.0, 45.0, 45.0).is_err());
    }

    #[test]
    fn fov_rejects_empty_span() {
        let err = FieldOfView::new(10.0, -10.0, 45.0, 45.0).unwrap_err();
        assert!(err.to_string().contains("vertical"));
        assert!(FieldOfView::new(45.0, 45.0, -20.0, 10.0).is_err());
    }

    // ── matrices ──────────────────────────────────────────────────────────

    #[test]
    fn symmetric_fov_matches_perspective() {
        let fov = FieldOfView::symmetric(45.0).unwrap();
        let a = Projection::from_fov(&fov).matrix();
        let b = Projection::perspective(FRAC_PI_2, 1.0).matrix();
        assert!(a.abs_diff_eq(b, 1e-5), "{a:?} vs {b:?}");
    }

    #[test]
    fn windowed_uses_half_width_aspect() {
        let s = SurfaceSize::new(800, 600);
        let p = Projection::windowed(s).matrix();
        let expected = Mat4::perspective_rh(FRAC_PI_2, 400.0 / 600.0, NEAR, FAR);
        assert_eq!(p, expected);
    }

    #[test]
    fn off_axis_fov_shifts_center() {
        // Unequal left/right edges give a horizontal skew term; vertical stays centered.
        let fov = FieldOfView::new(45.0, 45.0, 30.0, 60.0).unwrap();
        let m = Projection::from_fov(&fov).matrix();
        assert!(m.z_axis.x > 0.0);
        assert_eq!(m.z_axis.y, 0.0);
    }

    #[test]
    fn near_and_far_map_to_depth_range() {
        let m = Projection::from_fov(&FieldOfView::symmetric(45.0).unwrap()).matrix();
        let near = m * Vec4::new(0.0, 0.0, -NEAR, 1.0);
        let far = m * Vec4::new(0.0, 0.0, -FAR, 1.0);
        assert!((near.z / near.w).abs() < 1e-5);
        assert!((far.z / far.w - 1.0).abs() < 1e-5);
    }

    #[test]
    fn inverse_round_trips() {
        let p = Projection::windowed(SurfaceSize::new(1920, 1080));
        let id = p.matrix() * p.inverse();
        assert!(id.abs_diff_eq(Mat4::IDENTITY, 1e-4));
    }

    #[test]
    #[should_panic(expected = "not invertible")]
    fn inverse_of_singular_matrix_panics() {
        let p = Projection { matrix: Mat4::ZERO };
        let _ = p.inverse();
    }

    #[test]
    fn for_eye_prefers_headset_fov() {
        let left = FieldOfView::new(40.0, 40.0, 50.0, 35.0).unwrap();
        let right = FieldOfView::new(40.0, 40.0, 35.0, 50.0).unwrap();
        let info = HeadsetInfo {
            left: EyeParameters { recommended_fov: left, render_width: 960, render_height: 1080 },
            right: EyeParameters { recommended_fov: right, render_width: 960, render_height: 1080 },
        };
        let s = SurfaceSize::new(800, 600);

        assert_eq!(Projection::for_eye(Eye::Left, Some(&info), s), Projection::from_fov(&left));
        assert_eq!(Projection::for_eye(Eye::Right, Some(&info), s), Projection::from_fov(&right));
        assert_eq!(Projection::for_eye(Eye::Right, None, s), Projection::windowed(s));
        assert_eq!(info.surface_size(), SurfaceSize::new(1920, 1080));
    }
}
