//! Expiration Policy Module
//!
//! Turns TTLs into absolute expiry instants and decides record liveness.

use std::fmt::Debug;
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::cache::CacheRecord;
use crate::error::{Result, StoreError};

// == Clock ==
/// Source of "now" for every timestamp the store embeds or checks.
pub trait Clock: Debug + Send + Sync {
    /// Current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

// == Expiration Policy ==
/// Default TTL plus the rules for applying it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirationPolicy {
    default_ttl: chrono::Duration,
}

impl ExpirationPolicy {
    /// Creates a policy; the default TTL must be positive.
    pub fn new(default_ttl: Duration) -> Result<Self> {
        let default_ttl = to_chrono(default_ttl)?;
        if default_ttl <= chrono::Duration::zero() {
            return Err(StoreError::Configuration(
                "default ttl must be positive".to_string(),
            ));
        }
        Ok(Self { default_ttl })
    }

    /// TTL applied when a write carries no override.
    pub fn default_ttl(&self) -> chrono::Duration {
        self.default_ttl
    }

    /// Returns `now + ttl`, where `ttl` is the override when given.
    ///
    /// A zero override yields an already-dead record, which is what the
    /// caller asked for.
    pub fn compute_expiry(
        &self,
        ttl_override: Option<Duration>,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>> {
        let ttl = match ttl_override {
            Some(ttl) => to_chrono(ttl)?,
            None => self.default_ttl,
        };
        now.checked_add_signed(ttl).ok_or_else(|| {
            StoreError::Configuration(format!("ttl of {}s overflows the calendar", ttl.num_seconds()))
        })
    }

    /// A record is live iff its expiry is strictly after `now`.
    pub fn is_live(&self, record: &CacheRecord, now: DateTime<Utc>) -> bool {
        record.is_live(now)
    }
}

fn to_chrono(ttl: Duration) -> Result<chrono::Duration> {
    chrono::Duration::from_std(ttl)
        .map_err(|_| StoreError::Configuration(format!("ttl {:?} is out of range", ttl)))
}
