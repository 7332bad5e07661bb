//! Orientation subsystem.
//!
//! `OrientationTracker` owns the accumulated manual rotation. External
//! sensors implement `OrientationSource`; at startup the available ones are
//! handed to `SourceChain::resolve`, which keeps the highest-priority one.
//! Every frame the tracker folds that source's sample (if any) on top of the
//! manual rotation.

mod feed;
mod headset;
mod source;
mod tilt;
mod tracker;

pub use feed::SampleFeed;
pub use headset::HeadsetSensor;
pub use source::{sanitize_sample, OrientationSource, SourceChain, SourceKind};
pub use tilt::{DeviceAngles, TiltSensor};
pub use tracker::OrientationTracker;

#[cfg(test)]
pub(crate) use source::tests::FixedSource;
