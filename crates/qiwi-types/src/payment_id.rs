//! Client-side payment identifiers.
//!
//! Every payment submission carries an `id` chosen by the client; the API rejects a second
//! payment with an identifier it has already seen. Identifiers are numeric strings derived
//! from the wall clock (milliseconds since the Unix epoch, scaled by 1000) and are bumped past
//! the last issued value when the clock has not advanced, so they are strictly increasing
//! across all threads of a process.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;

/// Last identifier handed out by [`PaymentId::generate`].
static LAST_ISSUED: AtomicU64 = AtomicU64::new(0);

/// A payment identifier, serialized as a stringified integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PaymentId(u64);

impl PaymentId {
    /// Issues the next identifier for this process.
    pub fn generate() -> Self {
        let candidate = Self::clock_candidate();
        let previous = LAST_ISSUED
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(candidate.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        PaymentId(candidate.max(previous + 1))
    }

    pub fn from_raw(value: u64) -> Self {
        Self(value)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }

    fn clock_candidate() -> u64 {
        let millis = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        millis.saturating_mul(1000)
    }
}

impl Display for PaymentId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for PaymentId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0.to_string())
    }
}

impl<'de> Deserialize<'de> for PaymentId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let id = s
            .parse::<u64>()
            .map_err(|_| serde::de::Error::custom("payment id must be a non-negative integer"))?;
        Ok(PaymentId(id))
    }
}
