use std::time::Instant;

use super::frame_clock::{FrameClock, FrameTime};

/// Render loop state.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum LoopState {
    /// No per-refresh callback registered.
    #[default]
    Idle,
    /// Ticking once per display refresh until cancelled.
    Running,
}

/// Drives the per-refresh render callback.
///
/// The runtime asks for a redraw on every refresh while `Running` and calls
/// [`tick`](Self::tick) from the redraw handler; only ticks taken while
/// running produce a [`FrameTime`]. Starting always resets the clock, so the
/// first frame after a (re)start skips orientation integration.
#[derive(Debug, Default)]
pub struct FrameScheduler {
    state: LoopState,
    clock: FrameClock,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Registers the loop. Restarting a running loop only resets the clock.
    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            log::debug!("render loop started");
        }
        self.state = LoopState::Running;
        self.clock.reset();
    }

    /// Cancels the loop. Cancelling an idle loop is a no-op.
    pub fn cancel(&mut self) {
        if self.state == LoopState::Running {
            log::debug!("render loop cancelled");
        }
        self.state = LoopState::Idle;
    }

    /// Runs one refresh at `now`; `None` while idle.
    pub fn tick(&mut self, now: Instant) -> Option<FrameTime> {
        match self.state {
            LoopState::Idle => None,
            LoopState::Running => Some(self.clock.tick(now)),
        }
    }
}
