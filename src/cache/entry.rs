//! Cache Entry Module
//!
//! Defines individual cache entries and the TTL a caller asks for.

use std::time::{Duration, Instant};

use bytes::Bytes;

// == TTL ==
/// Time-to-live requested when storing a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ttl {
    /// Expire instantly: any existing entry for the key is deleted
    Expire,
    /// Never expire
    NoExpiration,
    /// Expire once the duration has elapsed
    After(Duration),
}

impl Ttl {
    /// Builds a TTL from a signed millisecond count.
    ///
    /// Negative values expire instantly, zero never expires.
    pub fn from_millis(ms: i64) -> Self {
        match ms {
            ms if ms < 0 => Ttl::Expire,
            0 => Ttl::NoExpiration,
            ms => Ttl::After(Duration::from_millis(ms.unsigned_abs())),
        }
    }
}

impl From<Duration> for Ttl {
    fn from(ttl: Duration) -> Self {
        if ttl.is_zero() {
            Ttl::NoExpiration
        } else {
            Ttl::After(ttl)
        }
    }
}

// == Cache Entry ==
/// A stored value with its TTL and absolute expiration instant.
///
/// `expires_at` is computed once at creation and never recomputed. It is
/// `None` when the TTL is zero, and also when the TTL is too large to add to
/// the current instant; such an entry keeps its nonzero TTL but never
/// expires.
#[derive(Debug, Clone)]
pub struct Entry {
    value: Bytes,
    ttl: Duration,
    expires_at: Option<Instant>,
}

impl Entry {
    // == Constructor ==
    /// Creates an entry expiring `ttl` from now, or never if `ttl` is zero.
    ///
    /// A TTL too large to represent as an instant is treated as never
    /// expiring.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `ttl` - Time-to-live; zero means no expiration
    pub fn new(value: Bytes, ttl: Duration) -> Self {
        let expires_at = if ttl.is_zero() {
            None
        } else {
            Instant::now().checked_add(ttl)
        };

        Self {
            value,
            ttl,
            expires_at,
        }
    }

    #[cfg(test)]
    pub(crate) fn expiring_at(value: Bytes, ttl: Duration, expires_at: Instant) -> Self {
        Self {
            value,
            ttl,
            expires_at: Some(expires_at),
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current time is greater than or equal
    /// to its expiration instant. The clock is read on every call.
    ///
    /// # Returns
    /// - `true` if the entry has an expiration instant and it has passed
    /// - `false` if the entry never expires or its TTL hasn't elapsed
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(expires) => Instant::now() >= expires,
            None => false,
        }
    }

    // == Value And TTL ==
    /// Returns the value and configured TTL, or `(None, 0)` once expired.
    ///
    /// Readers never observe an expired value, whether or not the cleaner
    /// has reclaimed the entry yet.
    pub fn value_and_ttl(&self) -> (Option<Bytes>, Duration) {
        if self.is_expired() {
            return (None, Duration::ZERO);
        }
        (Some(self.value.clone()), self.ttl)
    }

    /// The stored payload, regardless of expiry.
    pub fn value(&self) -> &Bytes {
        &self.value
    }

    /// The TTL the entry was stored with; zero means no expiration.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// The absolute expiration instant, if any.
    pub fn expires_at(&self) -> Option<Instant> {
        self.expires_at
    }
}
