use glam::Quat;

/// Kind of external orientation source, in fallback priority order.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum SourceKind {
    /// Head-mounted display sensor. Always preferred when present.
    Headset,
    /// Device tilt (accelerometer/gyro of a handheld).
    DeviceTilt,
}

/// A sensor that reports an absolute orientation.
pub trait OrientationSource {
    fn kind(&self) -> SourceKind;

    /// Latest orientation, or `None` when the sensor has nothing yet.
    fn current_orientation(&mut self) -> Option<Quat>;

    /// Makes the current physical pose the new reference ("zero sensor").
    fn recenter(&mut self);
}

/// Filters a raw sensor sample.
///
/// An all-zero quaternion is what sensors report before their first reading;
/// it and any non-finite sample count as absent. Valid samples are normalized.
pub fn sanitize_sample(q: Quat) -> Option<Quat> {
    if q == Quat::from_xyzw(0.0, 0.0, 0.0, 0.0) || !q.is_finite() {
        return None;
    }
    Some(q.normalize())
}

/// The external orientation source selected at startup.
///
/// Holds at most one source: the highest-priority candidate that was
/// available when the chain was resolved.
#[derive(Default)]
pub struct SourceChain {
    active: Option<Box<dyn OrientationSource>>,
}

impl SourceChain {
    /// A chain with no external source; rendering uses manual rotation only.
    pub fn none() -> Self {
        Self::default()
    }

    /// Picks the highest-priority candidate. The rest are dropped.
    pub fn resolve(candidates: Vec<Box<dyn OrientationSource>>) -> Self {
        let active = candidates.into_iter().min_by_key(|s| s.kind());
        match &active {
            Some(source) => log::info!("orientation source: {:?}", source.kind()),
            None => log::info!("orientation source: none (manual rotation only)"),
        }
        Self { active }
    }

    pub fn kind(&self) -> Option<SourceKind> {
        self.active.as_ref().map(|s| s.kind())
    }

    /// Reads the active source, discarding invalid samples.
    pub fn sample(&mut self) -> Option<Quat> {
        self.active
            .as_mut()
            .and_then(|s| s.current_orientation())
            .and_then(sanitize_sample)
    }

    /// Forwards a recenter request. Returns `false` when there is no source.
    pub fn recenter(&mut self) -> bool {
        match self.active.as_mut() {
            Some(source) => {
                source.recenter();
                log::info!("{:?} recentered", source.kind());
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Source returning a fixed sample and counting recenter calls.
    pub(crate) struct FixedSource {
        pub kind: SourceKind,
        pub sample: Option<Quat>,
        pub recentered: usize,
    }

    impl FixedSource {
        pub(crate) fn boxed(kind: SourceKind, sample: Option<Quat>) -> Box<dyn OrientationSource> {
            Box::new(Self { kind, sample, recentered: 0 })
        }
    }

    impl OrientationSource for FixedSource {
        fn kind(&self) -> SourceKind {
            self.kind
        }

        fn current_orientation(&mut self) -> Option<Quat> {
            self.sample
        }

        fn recenter(&mut self) {
            self.recentered += 1;
        }
    }

    // ── sanitize ──────────────────────────────────────────────────────────

    #[test]
    fn all_zero_sample_is_absent() {
        assert_eq!(sanitize_sample(Quat::from_xyzw(0.0, 0.0, 0.0, 0.0)), None);
    }

    #[test]
    fn non_finite_sample_is_absent() {
        assert_eq!(sanitize_sample(Quat::from_xyzw(f32::NAN, 0.0, 0.0, 1.0)), None);
    }

    #[test]
    fn partially_zero_sample_is_valid() {
        // Identity has three zero components and must not be mistaken for "no data".
        assert_eq!(sanitize_sample(Quat::IDENTITY), Some(Quat::IDENTITY));
    }

    #[test]
    fn sample_is_normalized() {
        let q = sanitize_sample(Quat::from_xyzw(0.0, 0.0, 0.0, 2.0)).unwrap();
        assert!(q.abs_diff_eq(Quat::IDENTITY, 1e-6));
    }

    // ── chain ─────────────────────────────────────────────────────────────

    #[test]
    fn headset_wins_over_tilt_regardless_of_order() {
        let chain = SourceChain::resolve(vec![
            FixedSource::boxed(SourceKind::DeviceTilt, None),
            FixedSource::boxed(SourceKind::Headset, None),
        ]);
        assert_eq!(chain.kind(), Some(SourceKind::Headset));
    }

    #[test]
    fn tilt_used_when_no_headset() {
        let chain = SourceChain::resolve(vec![FixedSource::boxed(SourceKind::DeviceTilt, None)]);
        assert_eq!(chain.kind(), Some(SourceKind::DeviceTilt));
    }

    #[test]
    fn empty_chain_samples_nothing() {
        let mut chain = SourceChain::resolve(Vec::new());
        assert_eq!(chain.kind(), None);
        assert_eq!(chain.sample(), None);
        assert!(!chain.recenter());
    }

    #[test]
    fn chain_filters_zero_sentinel() {
        let zero = Quat::from_xyzw(0.0, 0.0, 0.0, 0.0);
        let mut chain = SourceChain::resolve(vec![FixedSource::boxed(SourceKind::Headset, Some(zero))]);
        assert_eq!(chain.sample(), None);
    }

    #[test]
    fn recenter_reaches_source() {
        let mut chain = SourceChain::resolve(vec![FixedSource::boxed(SourceKind::Headset, None)]);
        assert!(chain.recenter());
    }
}
