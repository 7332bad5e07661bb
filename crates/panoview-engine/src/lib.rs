//! Panoview engine crate.
//!
//! Owns the platform + GPU runtime pieces: the window and its event loop, the
//! frame scheduler driving per-refresh callbacks, input translation, and the
//! panorama renderer. Orientation and stereo math live in `panoview-stereo`.

pub mod device;
pub mod window;
pub mod input;
pub mod time;
pub mod core;

pub mod logging;
pub mod render;
