use std::time::{Duration, Instant};

/// Tracks dispatch state for one domain during a crawl
///
/// The scheduler owns one of these per domain and consults it before every
/// dispatch.
#[derive(Debug, Clone, Default)]
pub struct DomainState {
    /// Number of requests dispatched to this domain in the current crawl
    pub request_count: u32,

    /// Fetches currently in flight against this domain
    pub in_flight: u32,

    /// Earliest instant the next dispatch may happen
    pub next_allowed: Option<Instant>,
}

impl DomainState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if a request can be dispatched to this domain
    ///
    /// This method enforces:
    /// - At most `parallelism` fetches in flight
    /// - The spacing set by the previous dispatch
    ///
    /// # Arguments
    ///
    /// * `now` - The current time instant
    /// * `parallelism` - Maximum concurrent fetches per domain
    pub fn can_request(&self, now: Instant, parallelism: u32) -> bool {
        if self.in_flight >= parallelism {
            return false;
        }

        match self.next_allowed {
            Some(next) => now >= next,
            None => true,
        }
    }

    /// Records a dispatch and pushes the next slot out by `spacing`
    pub fn record_dispatch(&mut self, now: Instant, spacing: Duration) {
        self.request_count += 1;
        self.in_flight += 1;
        self.next_allowed = Some(now + spacing);
    }

    /// Records that an in-flight fetch finished, whatever its outcome
    pub fn record_completion(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    /// Calculates the time until the spacing allows another dispatch
    ///
    /// Returns None if the spacing already allows it. Saturation of the
    /// in-flight limit is not a timed wait and is not reported here.
    pub fn time_until_next_request(&self, now: Instant) -> Option<Duration> {
        match self.next_allowed {
            Some(next) if next > now => Some(next - now),
            _ => None,
        }
    }
}
