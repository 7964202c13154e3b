//! Dual sliding-window rate limiting
//!
//! Riot development keys allow 20 requests per second and 100 requests per two
//! minutes. The limiter keeps a ledger of recent request instants and delays the
//! caller until a new request fits inside both windows.

use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{debug, info};

use crate::metrics::RateLimiterMetrics;

/// Window sizes and request caps enforced by a [`RateLimiter`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLimits {
    /// Length of the long window
    pub long_window: Duration,
    /// Maximum requests inside the long window
    pub long_limit: usize,
    /// Length of the short window
    pub short_window: Duration,
    /// Maximum requests inside the short window
    pub short_limit: usize,
}

impl WindowLimits {
    /// Limits of a Riot development API key: 20/1s and 100/120s
    pub const fn development_key() -> Self {
        Self {
            long_window: Duration::from_secs(120),
            long_limit: 100,
            short_window: Duration::from_secs(1),
            short_limit: 20,
        }
    }
}

impl Default for WindowLimits {
    fn default() -> Self {
        Self::development_key()
    }
}

/// Rate limiter backed by a ledger of request instants
///
/// The ledger sits behind an async mutex that is held while waiting, so callers
/// sharing one limiter are admitted one at a time in arrival order.
#[derive(Debug)]
pub struct RateLimiter {
    limits: WindowLimits,
    ledger: Mutex<VecDeque<Instant>>,
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(WindowLimits::default())
    }
}

impl RateLimiter {
    /// Create a limiter with the given window limits
    pub fn new(limits: WindowLimits) -> Self {
        Self {
            limits,
            ledger: Mutex::new(VecDeque::with_capacity(limits.long_limit)),
        }
    }

    /// Configured limits
    pub fn limits(&self) -> WindowLimits {
        self.limits
    }

    /// Wait until a request fits in both windows, then record it
    ///
    /// # Returns
    /// The total time spent waiting
    pub async fn acquire(&self) -> Duration {
        let mut metrics = RateLimiterMetrics::new();
        metrics.start_acquire();

        let mut ledger = self.ledger.lock().await;
        let started = Instant::now();

        loop {
            let now = Instant::now();
            prune(&mut ledger, now, self.limits.long_window);
            if ledger.len() < self.limits.long_limit {
                break;
            }
            let Some(&oldest) = ledger.front() else {
                break;
            };
            let wait = self
                .limits
                .long_window
                .saturating_sub(now.duration_since(oldest));
            info!(
                wait_secs = wait.as_secs_f64(),
                in_window = ledger.len(),
                "Rate limit (long window): sleeping"
            );
            sleep(wait).await;
        }

        let now = Instant::now();
        let recent = count_within(&ledger, now, self.limits.short_window);
        if recent >= self.limits.short_limit {
            debug!(recent, "Rate limit (short window): sleeping");
            sleep(self.limits.short_window).await;
        }

        ledger.push_back(Instant::now());
        metrics.record_acquired(ledger.len());

        started.elapsed()
    }

    /// Snapshot of the recorded request instants, oldest first
    pub async fn recorded(&self) -> Vec<Instant> {
        self.ledger.lock().await.iter().copied().collect()
    }
}

/// Drop instants that are at least `window` old
fn prune(ledger: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(&front) = ledger.front() {
        if now.duration_since(front) >= window {
            ledger.pop_front();
        } else {
            break;
        }
    }
}

/// Number of instants younger than `window`
fn count_within(ledger: &VecDeque<Instant>, now: Instant, window: Duration) -> usize {
    ledger
        .iter()
        .rev()
        .take_while(|t| now.duration_since(**t) < window)
        .count()
}

/// Largest number of instants falling inside any span of length `window`
///
/// Spans are half-open: an instant exactly `window` after another is outside it.
pub fn max_in_any_window(instants: &[Instant], window: Duration) -> usize {
    let mut best = 0;
    let mut start = 0;
    for end in 0..instants.len() {
        while instants[end].duration_since(instants[start]) >= window {
            start += 1;
        }
        best = best.max(end - start + 1);
    }
    best
}
