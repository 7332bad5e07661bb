//! Window + runtime loop.
//!
//! Owns the `winit` EventLoop and the viewer window, wires them to the GPU
//! layer, and drives the frame scheduler.

mod runtime;

pub use runtime::{Runtime, RuntimeCommand, RuntimeConfig, RuntimeCtx, IDLE_POLL_INTERVAL};
