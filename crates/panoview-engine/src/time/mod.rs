//! Time subsystem.
//!
//! Provides frame timing without coupling to the runtime:
//! - `FrameClock` turns refresh timestamps into elapsed-time snapshots
//! - `FrameScheduler` owns the Idle/Running loop state and its clock

mod frame_clock;
mod scheduler;

pub use frame_clock::{FrameClock, FrameTime};
pub use scheduler::{FrameScheduler, LoopState};
