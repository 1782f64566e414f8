//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

use bytes::Bytes;

/// Longest lifetime an entry can have, in seconds (100 years).
///
/// Longer per-call TTLs are clamped to this; longer policy defaults are
/// rejected.
pub const MAX_TTL_SECONDS: u64 = 100 * 365 * 24 * 60 * 60;

// == Cache Entry ==
/// A single cached payload and its expiry.
///
/// Timestamps are monotonic so wall-clock adjustments never resurrect or
/// prematurely expire an entry.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// The stored payload, opaque to the engine
    pub value: Bytes,
    /// When the entry was written
    pub created_at: Instant,
    /// The entry is visible only while `now < expires_at`
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry that lives for `ttl_seconds`, clamped to
    /// [`MAX_TTL_SECONDS`].
    pub fn new(value: Bytes, ttl_seconds: u64) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            expires_at: deadline_after(now, ttl_seconds),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal to
    /// its expiration time, so a zero TTL is expired on creation.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Same as [`is_expired`](Self::is_expired) against a caller-supplied clock.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }

    // == Time To Live ==
    /// Returns the remaining lifetime, zero once expired.
    pub fn ttl_remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// Latest representable instant at most `ttl_seconds` (clamped) after `now`.
fn deadline_after(now: Instant, ttl_seconds: u64) -> Instant {
    let mut lifetime = Duration::from_secs(ttl_seconds.min(MAX_TTL_SECONDS));
    loop {
        if let Some(deadline) = now.checked_add(lifetime) {
            return deadline;
        }
        // Terminates: adding a zero duration always succeeds
        lifetime /= 2;
    }
}
