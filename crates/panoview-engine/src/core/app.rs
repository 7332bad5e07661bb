use crate::input::InputEvent;
use crate::window::RuntimeCtx;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by the viewer.
///
/// All callbacks run on the event-loop thread, one at a time.
pub trait App {
    /// Called for each translated input event, between frames.
    fn on_input(&mut self, event: &InputEvent, runtime: &mut RuntimeCtx) -> AppControl {
        let _ = (event, runtime);
        AppControl::Continue
    }

    /// Called while the render loop is idle, at least every
    /// [`IDLE_POLL_INTERVAL`](crate::window::IDLE_POLL_INTERVAL).
    fn on_idle(&mut self, runtime: &mut RuntimeCtx) -> AppControl {
        let _ = runtime;
        AppControl::Continue
    }

    /// Called once per display refresh while the render loop is running.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;
}
