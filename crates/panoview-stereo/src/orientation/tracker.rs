use glam::{Mat4, Quat, Vec3};

use super::source::sanitize_sample;

/// Accumulated manual rotation.
///
/// The manual quaternion is the only long-lived orientation state. External
/// samples are composed on top of it per frame and never stored.
#[derive(Debug, Clone)]
pub struct OrientationTracker {
    manual: Quat,
}

impl Default for OrientationTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl OrientationTracker {
    pub fn new() -> Self {
        Self {
            manual: Quat::IDENTITY,
        }
    }

    #[inline]
    pub fn manual_rotation(&self) -> Quat {
        self.manual
    }

    /// Applies `rate * elapsed` to the manual rotation.
    ///
    /// `elapsed` is `None` on the first frame, which skips integration. The
    /// increment is the small-angle quaternion `(rate * dt, 1)` normalized and
    /// composed on the right, so rates act in camera space.
    pub fn integrate(&mut self, rate: Vec3, elapsed: Option<f32>) {
        let Some(dt) = elapsed else { return };
        if rate == Vec3::ZERO || dt <= 0.0 {
            return;
        }

        let step = rate * dt;
        let update = Quat::from_xyzw(step.x, step.y, step.z, 1.0).normalize();
        self.manual = (self.manual * update).normalize();
    }

    /// Total rotation for this frame: manual rotation followed by the external
    /// sample, or manual alone when the sample is absent or invalid.
    pub fn compose(&self, external: Option<Quat>) -> Quat {
        match external.and_then(sanitize_sample) {
            Some(sensor) => self.manual * sensor,
            None => self.manual,
        }
    }

    /// Integrates, composes and returns the rotation matrix for rendering.
    pub fn advance(&mut self, rate: Vec3, elapsed: Option<f32>, external: Option<Quat>) -> Mat4 {
        self.integrate(rate, elapsed);
        Mat4::from_quat(self.compose(external))
    }
}
