use std::time::Instant;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, or `None` on the first tick after the
    /// clock was (re)started.
    pub elapsed: Option<f32>,

    /// Monotonic timestamp taken at the tick.
    pub now: Instant,

    /// Monotonic frame counter.
    pub frame_index: u64,
}

/// Frame clock producing `FrameTime` snapshots.
///
/// Elapsed time is reported unclamped: orientation integration must see the
/// real interval between refreshes. After `reset` the next tick has no
/// previous timestamp and reports `elapsed: None`.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    previous: Option<Instant>,
    frame_index: u64,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forgets the previous timestamp.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Advances the clock to `now` and returns a new `FrameTime`.
    pub fn tick(&mut self, now: Instant) -> FrameTime {
        let elapsed = self
            .previous
            .map(|prev| now.saturating_duration_since(prev).as_secs_f32());

        self.previous = Some(now);

        let ft = FrameTime {
            elapsed,
            now,
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        ft
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn first_tick_has_no_elapsed() {
        let mut clock = FrameClock::new();
        let ft = clock.tick(Instant::now());
        assert_eq!(ft.elapsed, None);
        assert_eq!(ft.frame_index, 0);
    }

    #[test]
    fn elapsed_is_interval_since_previous_tick() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        clock.tick(t0);
        let ft = clock.tick(t0 + Duration::from_millis(16));
        let dt = ft.elapsed.unwrap();
        assert!((dt - 0.016).abs() < 1e-6);
        assert_eq!(ft.frame_index, 1);

        // Long stalls are reported as-is.
        let ft = clock.tick(t0 + Duration::from_secs(3));
        assert!((ft.elapsed.unwrap() - 2.984).abs() < 1e-4);
    }

    #[test]
    fn reset_drops_previous_timestamp_but_keeps_counting() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now();
        clock.tick(t0);
        clock.reset();
        let ft = clock.tick(t0 + Duration::from_millis(500));
        assert_eq!(ft.elapsed, None);
        assert_eq!(ft.frame_index, 1);
    }

    #[test]
    fn backwards_timestamp_saturates_to_zero() {
        let mut clock = FrameClock::new();
        let t0 = Instant::now() + Duration::from_secs(1);
        clock.tick(t0);
        let ft = clock.tick(t0 - Duration::from_millis(10));
        assert_eq!(ft.elapsed, Some(0.0));
    }
}
