use glam::Quat;

use super::feed::{sample_channel, LatestSample, SampleFeed};
use super::source::{sanitize_sample, OrientationSource, SourceKind};

/// Samples buffered between frames before the oldest are evicted.
const FEED_CAPACITY: usize = 256;

/// Orientation sensor of a head-mounted display.
///
/// A headset driver pushes absolute orientations into the [`SampleFeed`]
/// returned by [`HeadsetSensor::new`]; the sensor reports the newest one,
/// relative to the pose captured by the last [`recenter`](OrientationSource::recenter).
pub struct HeadsetSensor {
    samples: LatestSample<Quat>,
    /// Reference pose for "zero sensor".
    zero_ref: Quat,
}

impl HeadsetSensor {
    pub fn new() -> (Self, SampleFeed<Quat>) {
        let (feed, samples) = sample_channel(FEED_CAPACITY);
        let sensor = Self {
            samples,
            zero_ref: Quat::IDENTITY,
        };
        (sensor, feed)
    }
}

impl OrientationSource for HeadsetSensor {
    fn kind(&self) -> SourceKind {
        SourceKind::Headset
    }

    fn current_orientation(&mut self) -> Option<Quat> {
        let absolute = self.samples.poll().and_then(sanitize_sample)?;
        sanitize_sample(self.zero_ref.conjugate() * absolute)
    }

    fn recenter(&mut self) {
        match self.samples.latest().and_then(sanitize_sample) {
            Some(current) => self.zero_ref = current,
            None => log::debug!("headset recenter ignored: no sample yet"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_until_first_sample() {
        let (mut sensor, _feed) = HeadsetSensor::new();
        assert_eq!(sensor.current_orientation(), None);
    }

    #[test]
    fn reports_latest_sample() {
        let (mut sensor, feed) = HeadsetSensor::new();
        feed.push(Quat::from_rotation_y(0.1));
        feed.push(Quat::from_rotation_y(0.2));
        let q = sensor.current_orientation().unwrap();
        assert!(q.abs_diff_eq(Quat::from_rotation_y(0.2), 1e-6));
    }

    #[test]
    fn zero_sentinel_is_absent() {
        let (mut sensor, feed) = HeadsetSensor::new();
        feed.push(Quat::from_xyzw(0.0, 0.0, 0.0, 0.0));
        assert_eq!(sensor.current_orientation(), None);
    }

    #[test]
    fn recenter_makes_current_pose_identity() {
        let (mut sensor, feed) = HeadsetSensor::new();
        let pose = Quat::from_rotation_y(1.2) * Quat::from_rotation_x(0.3);
        feed.push(pose);
        sensor.current_orientation();
        sensor.recenter();

        let q = sensor.current_orientation().unwrap();
        assert!(q.abs_diff_eq(Quat::IDENTITY, 1e-6));

        // Later motion is reported relative to the new reference.
        feed.push(pose * Quat::from_rotation_y(0.5));
        let q = sensor.current_orientation().unwrap();
        assert!(q.abs_diff_eq(Quat::from_rotation_y(0.5), 1e-5));
    }

    #[test]
    fn recenter_without_sample_keeps_reference() {
        let (mut sensor, feed) = HeadsetSensor::new();
        sensor.recenter();
        feed.push(Quat::from_rotation_z(0.4));
        let q = sensor.current_orientation().unwrap();
        assert!(q.abs_diff_eq(Quat::from_rotation_z(0.4), 1e-6));
    }

    #[test]
    fn recenter_on_non_finite_sample_keeps_reference() {
        let (mut sensor, feed) = HeadsetSensor::new();
        feed.push(Quat::from_xyzw(f32::NAN, 0.0, 0.0, 1.0));
        assert_eq!(sensor.current_orientation(), None);
        sensor.recenter();

        feed.push(Quat::from_rotation_x(0.3));
        let q = sensor.current_orientation().unwrap();
        assert!(q.abs_diff_eq(Quat::from_rotation_x(0.3), 1e-6));
    }
}
