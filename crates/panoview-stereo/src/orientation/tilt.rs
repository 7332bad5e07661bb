use std::f32::consts::FRAC_PI_2;

use glam::Quat;

use super::feed::{sample_channel, LatestSample, SampleFeed};
use super::source::{sanitize_sample, OrientationSource, SourceKind};

const FEED_CAPACITY: usize = 64;

/// Device orientation angles in degrees.
///
/// `alpha` is the rotation about the device Z axis (compass heading), `beta`
/// about X (front/back tilt), `gamma` about Y (left/right tilt), applied in
/// that order. `screen` is the current screen rotation (0, 90, 180 or -90).
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct DeviceAngles {
    pub alpha: f32,
    pub beta: f32,
    pub gamma: f32,
    pub screen: f32,
}

impl DeviceAngles {
    /// World-aligned orientation of the camera looking out of the screen.
    ///
    /// A device held upright in portrait (beta = 90°) looks at the horizon
    /// and maps to the identity rotation.
    pub fn to_quat(self) -> Quat {
        let device = Quat::from_rotation_z(self.alpha.to_radians())
            * Quat::from_rotation_x(self.beta.to_radians())
            * Quat::from_rotation_y(self.gamma.to_radians());
        let screen = Quat::from_rotation_z(-self.screen.to_radians());
        let upright = Quat::from_rotation_x(-FRAC_PI_2);
        (upright * device * screen).normalize()
    }
}

/// Orientation from a handheld device's tilt sensors.
pub struct TiltSensor {
    angles: LatestSample<DeviceAngles>,
    zero_ref: Quat,
}

impl TiltSensor {
    pub fn new() -> (Self, SampleFeed<DeviceAngles>) {
        let (feed, angles) = sample_channel(FEED_CAPACITY);
        let sensor = Self {
            angles,
            zero_ref: Quat::IDENTITY,
        };
        (sensor, feed)
    }
}

impl OrientationSource for TiltSensor {
    fn kind(&self) -> SourceKind {
        SourceKind::DeviceTilt
    }

    fn current_orientation(&mut self) -> Option<Quat> {
        let absolute = self.angles.poll().map(DeviceAngles::to_quat).and_then(sanitize_sample)?;
        sanitize_sample(self.zero_ref.conjugate() * absolute)
    }

    fn recenter(&mut self) {
        match self.angles.latest().map(DeviceAngles::to_quat).and_then(sanitize_sample) {
            Some(current) => self.zero_ref = current,
            None => log::debug!("tilt recenter ignored: no valid sample"),
        }
    }
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn angles(alpha: f32, beta: f32, gamma: f32, screen: f32) -> DeviceAngles {
        DeviceAngles { alpha, beta, gamma, screen }
    }

    #[test]
    fn upright_portrait_is_identity() {
        let q = angles(0.0, 90.0, 0.0, 0.0).to_quat();
        assert!(q.abs_diff_eq(Quat::IDENTITY, 1e-6) || q.abs_diff_eq(-Quat::IDENTITY, 1e-6));
    }

    #[test]
    fn flat_device_looks_down() {
        let q = angles(0.0, 0.0, 0.0, 0.0).to_quat();
        let forward = q * Vec3::NEG_Z;
        assert!(forward.abs_diff_eq(Vec3::NEG_Y, 1e-6));
    }

    #[test]
    fn heading_turns_about_world_up() {
        let q = angles(90.0, 90.0, 0.0, 0.0).to_quat();
        let forward = q * Vec3::NEG_Z;
        assert!(forward.y.abs() < 1e-6);
        assert!(forward.abs_diff_eq(Vec3::NEG_X, 1e-6));
    }

    #[test]
    fn landscape_screen_rolls_view() {
        let portrait = angles(0.0, 90.0, 0.0, 0.0).to_quat();
        let landscape = angles(0.0, 90.0, 0.0, 90.0).to_quat();
        // Same viewing direction, different up vector.
        assert!((portrait * Vec3::NEG_Z).abs_diff_eq(landscape * Vec3::NEG_Z, 1e-6));
        assert!(!(portrait * Vec3::Y).abs_diff_eq(landscape * Vec3::Y, 1e-3));
    }

    #[test]
    fn sensor_reports_and_recenters() {
        let (mut sensor, feed) = TiltSensor::new();
        assert_eq!(sensor.current_orientation(), None);

        feed.push(angles(30.0, 80.0, 5.0, 0.0));
        assert!(sensor.current_orientation().is_some());

        sensor.recenter();
        let q = sensor.current_orientation().unwrap();
        assert!(q.abs_diff_eq(Quat::IDENTITY, 1e-5));
        assert_eq!(sensor.kind(), SourceKind::DeviceTilt);
    }

    #[test]
    fn recenter_on_invalid_sample_keeps_reference() {
        let (mut sensor, feed) = TiltSensor::new();
        feed.push(angles(f32::NAN, 90.0, 0.0, 0.0));
        assert_eq!(sensor.current_orientation(), None);

        sensor.recenter();

        feed.push(angles(10.0, 90.0, 0.0, 0.0));
        let q = sensor.current_orientation().unwrap();
        assert!(q.is_finite());
        assert!(q.abs_diff_eq(angles(10.0, 90.0, 0.0, 0.0).to_quat(), 1e-5));
    }
}
