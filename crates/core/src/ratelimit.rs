//! Token bucket rate limiter
//!
//! Callers reserve a token up front and then sleep off any deficit, so
//! concurrent waiters are served in reservation order without polling.

use std::sync::Mutex;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::DEFAULT_REQUESTS_PER_SECOND;
use crate::error::{Error, Result};

#[derive(Debug)]
struct Bucket {
    /// May go negative while reservations are outstanding
    tokens: f64,
    last_refill: Instant,
}

/// Token bucket shared by every request of a client
#[derive(Debug)]
pub struct RateLimiter {
    capacity: f64,
    refill_rate: f64,
    bucket: Mutex<Bucket>,
}

impl RateLimiter {
    /// Create a limiter allowing `refill_rate` requests per second with
    /// bursts of up to `capacity`. The bucket starts full.
    ///
    /// A rate that is not a positive finite number falls back to
    /// [`DEFAULT_REQUESTS_PER_SECOND`].
    pub fn new(refill_rate: f64, capacity: u32) -> Self {
        let capacity = f64::from(capacity.max(1));
        let refill_rate = if refill_rate > 0.0 && refill_rate.is_finite() {
            refill_rate
        } else {
            DEFAULT_REQUESTS_PER_SECOND
        };
        Self {
            capacity,
            refill_rate,
            bucket: Mutex::new(Bucket {
                tokens: capacity,
                last_refill: Instant::now(),
            }),
        }
    }

    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    pub fn capacity(&self) -> u32 {
        self.capacity as u32
    }

    /// Wait for a token. Returns [`Error::Cancelled`] if `cancel` fires first,
    /// in which case the reservation is handed back.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<()> {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let wait = self.reserve();
        if wait.is_zero() {
            return Ok(());
        }

        tracing::trace!(wait_ms = wait.as_millis(), "Waiting for rate limiter");

        tokio::select! {
            _ = cancel.cancelled() => {
                self.release();
                Err(Error::Cancelled)
            }
            _ = tokio::time::sleep(wait) => Ok(()),
        }
    }

    /// Take a token only if one is available right now
    pub fn try_acquire(&self) -> bool {
        let mut bucket = self.lock();
        self.refill(&mut bucket);
        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    fn reserve(&self) -> Duration {
        let mut bucket = self.lock();
        self.refill(&mut bucket);
        bucket.tokens -= 1.0;

        if bucket.tokens >= 0.0 {
            Duration::ZERO
        } else {
            // Tiny rates overflow Duration; wait until cancelled instead
            Duration::try_from_secs_f64(-bucket.tokens / self.refill_rate).unwrap_or(Duration::MAX)
        }
    }

    fn release(&self) {
        let mut bucket = self.lock();
        bucket.tokens = (bucket.tokens + 1.0).min(self.capacity);
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.saturating_duration_since(bucket.last_refill);
        bucket.tokens =
            (bucket.tokens + elapsed.as_secs_f64() * self.refill_rate).min(self.capacity);
        bucket.last_refill = now;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Bucket> {
        // The bucket holds plain numbers, so a poisoned lock is still usable.
        self.bucket.lock().unwrap_or_else(|e| e.into_inner())
    }
}
