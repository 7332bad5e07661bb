use crossbeam_channel::{Receiver, Sender, TryRecvError, TrySendError};

/// Producer half handed to a sensor driver.
///
/// The channel is bounded; when the render loop is not draining it (e.g. while
/// an image loads) the oldest sample is evicted so the newest always fits.
#[derive(Clone)]
pub struct SampleFeed<T> {
    tx: Sender<T>,
    evict: Receiver<T>,
}

impl<T> SampleFeed<T> {
    pub fn push(&self, sample: T) {
        let mut pending = sample;
        loop {
            match self.tx.try_send(pending) {
                Ok(()) => return,
                Err(TrySendError::Full(v)) => {
                    let _ = self.evict.try_recv();
                    pending = v;
                }
                // Unreachable while `evict` is alive, but there is nothing to deliver to.
                Err(TrySendError::Disconnected(_)) => return,
            }
        }
    }
}

/// Consumer half: remembers the most recent sample seen.
pub(crate) struct LatestSample<T> {
    rx: Receiver<T>,
    latest: Option<T>,
}

impl<T: Copy> LatestSample<T> {
    /// Drains pending samples and returns the newest one known.
    ///
    /// Once every producer has gone away the last sample is forgotten.
    pub(crate) fn poll(&mut self) -> Option<T> {
        loop {
            match self.rx.try_recv() {
                Ok(v) => self.latest = Some(v),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.latest = None;
                    break;
                }
            }
        }
        self.latest
    }

    pub(crate) fn latest(&self) -> Option<T> {
        self.latest
    }
}

pub(crate) fn sample_channel<T>(capacity: usize) -> (SampleFeed<T>, LatestSample<T>) {
    let (tx, rx) = crossbeam_channel::bounded(capacity.max(1));
    let feed = SampleFeed {
        tx,
        evict: rx.clone(),
    };
    (feed, LatestSample { rx, latest: None })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn poll_returns_newest() {
        let (feed, mut reader) = sample_channel(8);
        assert_eq!(reader.poll(), None);
        feed.push(1);
        feed.push(2);
        feed.push(3);
        assert_eq!(reader.poll(), Some(3));
        // Nothing new: keep the last one.
        assert_eq!(reader.poll(), Some(3));
    }

    #[test]
    fn full_channel_evicts_oldest() {
        let (feed, mut reader) = sample_channel(2);
        for v in 0..10 {
            feed.push(v);
        }
        assert_eq!(reader.poll(), Some(9));
    }

    #[test]
    fn dropped_feed_forgets_sample() {
        let (feed, mut reader) = sample_channel(4);
        feed.push(7);
        assert_eq!(reader.poll(), Some(7));
        drop(feed);
        assert_eq!(reader.poll(), None);
        assert_eq!(reader.latest(), None);
    }
}
