use std::time::Duration;

/// Frame budget above which a frame is reported as slow.
pub const SLOW_FRAME_THRESHOLD: Duration = Duration::from_millis(20);

/// A frame that exceeded the budget.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SlowFrame {
    pub duration: Duration,
    /// Frames within budget since the previous slow one.
    pub frames_since_issue: u64,
}

/// Counts frames between budget overruns.
#[derive(Debug, Clone)]
pub struct FrameTimingMonitor {
    threshold: Duration,
    frames_since_issue: u64,
}

impl Default for FrameTimingMonitor {
    fn default() -> Self {
        Self::new(SLOW_FRAME_THRESHOLD)
    }
}

impl FrameTimingMonitor {
    pub fn new(threshold: Duration) -> Self {
        Self {
            threshold,
            frames_since_issue: 0,
        }
    }

    /// Records one frame's duration (tick timestamp to end of submission).
    pub fn record(&mut self, duration: Duration) -> Option<SlowFrame> {
        if duration > self.threshold {
            let slow = SlowFrame {
                duration,
                frames_since_issue: self.frames_since_issue,
            };
            self.frames_since_issue = 0;
            return Some(slow);
        }
        self.frames_since_issue += 1;
        None
    }
}
