//! Stored Entry
//!
//! A value with its absolute expiry, and the JSON record it is persisted as.

use bytes::Bytes;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// TTLs are clamped to this many seconds (about a century) in either direction
pub const MAX_TTL_SECS: i64 = 100 * 365 * 24 * 60 * 60;

/// Entry in the store with value and expiration
///
/// Serialized as `{"val": "...", "expiresAt": "<RFC 3339>"}`. The default entry
/// has an empty value and expires at the Unix epoch, so it is never live.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "val")]
    pub value: String,
    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}

impl Entry {
    /// Create an entry expiring `ttl_secs` after `now`.
    ///
    /// Zero or negative TTLs are allowed and produce an entry that is already
    /// expired at `now`.
    pub fn with_ttl(value: impl Into<String>, ttl_secs: i64, now: DateTime<Utc>) -> Self {
        let ttl = ttl_secs.clamp(-MAX_TTL_SECS, MAX_TTL_SECS);
        let expires_at = TimeDelta::try_seconds(ttl)
            .and_then(|delta| now.checked_add_signed(delta))
            .unwrap_or(now);
        Self {
            value: value.into(),
            expires_at,
        }
    }

    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        now < self.expires_at
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_live_at(now)
    }

    pub fn encode(&self) -> Result<Bytes> {
        Ok(Bytes::from(serde_json::to_vec(self)?))
    }

    pub fn decode(raw: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(raw)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_live_until_expiry() {
        let now = at(1_700_000_000);
        let entry = Entry::with_ttl("john", 3, now);

        assert_eq!(entry.expires_at, at(1_700_000_003));
        assert!(entry.is_live_at(now));
        assert!(entry.is_live_at(at(1_700_000_002)));
        // Expiry instant itself is no longer live
        assert!(entry.is_expired_at(at(1_700_000_003)));
    }

    #[test]
    fn test_zero_and_negative_ttl_already_expired() {
        let now = at(1_700_000_000);
        assert!(Entry::with_ttl("v", 0, now).is_expired_at(now));
        assert!(Entry::with_ttl("v", -10, now).is_expired_at(now));
    }

    #[test]
    fn test_huge_ttl_is_clamped() {
        let now = at(1_700_000_000);
        let entry = Entry::with_ttl("v", i64::MAX, now);
        assert_eq!(entry.expires_at, now + TimeDelta::seconds(MAX_TTL_SECS));

        let entry = Entry::with_ttl("v", i64::MIN, now);
        assert!(entry.is_expired_at(now));
    }

    #[test]
    fn test_wire_field_names() {
        let entry = Entry::with_ttl("alice", 5, at(0));
        let encoded = entry.encode().unwrap();
        let json: serde_json::Value = serde_json::from_slice(&encoded).unwrap();

        assert_eq!(json["val"], "alice");
        assert_eq!(json["expiresAt"], "1970-01-01T00:00:05Z");
        assert_eq!(Entry::decode(&encoded).unwrap(), entry);
    }

    #[test]
    fn test_decode_foreign_record() {
        let raw = br#"{"val":"bob","expiresAt":"2030-01-02T03:04:05.123456789+02:00"}"#;
        let entry = Entry::decode(raw).unwrap();
        assert_eq!(entry.value, "bob");
        assert_eq!(
            entry.expires_at,
            Utc.with_ymd_and_hms(2030, 1, 2, 1, 4, 5).unwrap()
                + TimeDelta::nanoseconds(123_456_789)
        );
    }

    #[test]
    fn test_default_entry_is_never_live() {
        assert!(Entry::decode(b"not json").is_err());

        let entry = Entry::default();
        assert!(entry.value.is_empty());
        assert!(entry.is_expired_at(Utc::now()));
    }
}
