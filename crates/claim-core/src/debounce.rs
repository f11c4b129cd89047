use std::time::{Duration, Instant};

/// Holds back a rapidly changing value until it has been stable for `delay`.
///
/// Time is passed in by the caller so the event loop and tests share one clock.
#[derive(Clone, Debug)]
pub struct Debounced<T> {
    delay: Duration,
    settled: T,
    pending: Option<(T, Instant)>,
}

impl<T: Clone + PartialEq> Debounced<T> {
    pub fn new(initial: T, delay: Duration) -> Self {
        Self {
            delay,
            settled: initial,
            pending: None,
        }
    }

    pub fn set(&mut self, value: T, now: Instant) {
        if value == self.settled {
            self.pending = None;
        } else {
            self.pending = Some((value, now));
        }
    }

    /// Returns the new settled value once, when the pending one has aged past
    /// the delay.
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = matches!(&self.pending, Some((_, at)) if now.duration_since(*at) >= self.delay);
        if !ready {
            return None;
        }
        let (value, _) = self.pending.take()?;
        self.settled = value.clone();
        Some(value)
    }

    pub fn settled(&self) -> &T {
        &self.settled
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
