//! Orientation + stereo planning for the panorama viewer.
//!
//! This crate owns everything between "a key went down / a sensor reported"
//! and "draw this eye with this matrix into this viewport". It has no GPU or
//! windowing dependencies so the math can be tested on its own.

pub mod controls;
pub mod error;
pub mod eye;
pub mod frame;
pub mod orientation;
pub mod projection;
pub mod timing;

pub use controls::ManualControls;
pub use error::FovError;
pub use eye::{Eye, ProjectionMode, SurfaceSize, ViewportRect};
pub use frame::{DisplayMode, EyeView, FramePlan, ViewState, WindowMetrics};
pub use orientation::{
    DeviceAngles, HeadsetSensor, OrientationSource, OrientationTracker, SampleFeed, SourceChain,
    SourceKind, TiltSensor,
};
pub use projection::{EyeParameters, FieldOfView, HeadsetInfo, Projection};
pub use timing::{FrameTimingMonitor, SlowFrame};
