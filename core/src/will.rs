//! # Will: The Data Model
//!
//! A `Will` is created once by its testator and never mutated afterwards.
//! The only moving part is the `CheckInRecord`, which lives under its own key
//! so that a check-in never has to rewrite the will itself.

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Opaque principal identifier (typically an EVM wallet address).
pub type Address = String;

/// Milliseconds in one day.
pub const MS_PER_DAY: i64 = 86_400_000;

/// A principal eligible to claim the will once it is releasable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Beneficiary {
    pub address: Address,
}

impl Beneficiary {
    pub fn new(address: impl Into<Address>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

/// A pointer to something the beneficiaries should know about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DigitalAsset {
    pub description: String,
    pub location: String,
}

impl DigitalAsset {
    pub fn new(description: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            location: location.into(),
        }
    }
}

/// Inactivity thresholds offered to testators.
///
/// The engine accepts any positive day count; these are only the presets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InactivityPeriod;

impl InactivityPeriod {
    pub const PRESETS: [u32; 4] = [30, 90, 180, 365];
    pub const DEFAULT_DAYS: u32 = 90;

    pub fn is_preset(days: u32) -> bool {
        Self::PRESETS.contains(&days)
    }
}

/// The caller-supplied part of a will.
///
/// Identifiers, testator and deployment timestamp are filled in by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WillDraft {
    pub content: String,
    pub beneficiaries: Vec<Beneficiary>,
    pub assets: Vec<DigitalAsset>,
    pub inactivity_period_days: u32,
}

/// A registered will.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Will {
    pub content: String,
    pub beneficiaries: Vec<Beneficiary>,
    pub assets: Vec<DigitalAsset>,
    pub inactivity_period_days: u32,
    #[serde(rename = "encryptedContentIPFSHash")]
    pub encrypted_content_ipfs_hash: String,
    #[serde(rename = "keySharesIPFSHash")]
    pub key_shares_ipfs_hash: String,
    pub testator_address: Address,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub deployment_timestamp: DateTime<Utc>,
}

impl Will {
    /// Seal a draft into a will owned by `testator`.
    pub fn from_draft(
        draft: WillDraft,
        testator: impl Into<Address>,
        deployed_at: DateTime<Utc>,
        content_hash: impl Into<String>,
        key_shares_hash: impl Into<String>,
    ) -> Self {
        let WillDraft {
            content,
            beneficiaries,
            assets,
            inactivity_period_days,
        } = draft;

        Self {
            content,
            beneficiaries,
            assets,
            inactivity_period_days,
            encrypted_content_ipfs_hash: content_hash.into(),
            key_shares_ipfs_hash: key_shares_hash.into(),
            testator_address: testator.into(),
            deployment_timestamp: deployed_at,
        }
    }

    /// The configured threshold in milliseconds.
    pub fn inactivity_period_ms(&self) -> i64 {
        i64::from(self.inactivity_period_days) * MS_PER_DAY
    }

    /// Membership check over the beneficiary set (plain string equality).
    pub fn has_beneficiary(&self, address: &str) -> bool {
        self.beneficiaries.iter().any(|b| b.address == address)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Decode a persisted will. `key` is only used for error reporting.
    pub fn from_json(key: &str, raw: &str) -> Result<Self, EngineError> {
        serde_json::from_str(raw).map_err(|e| EngineError::PersistenceFailure {
            key: key.to_string(),
            reason: format!("malformed will record: {e}"),
        })
    }
}

/// Last liveness signal of a testator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckInRecord {
    pub last_check_in: DateTime<Utc>,
}

impl CheckInRecord {
    pub fn new(last_check_in: DateTime<Utc>) -> Self {
        Self { last_check_in }
    }

    /// Persisted form: decimal milliseconds since the Unix epoch.
    pub fn encode(&self) -> String {
        self.last_check_in.timestamp_millis().to_string()
    }

    pub fn decode(key: &str, raw: &str) -> Result<Self, EngineError> {
        let corrupt = |reason: String| EngineError::PersistenceFailure {
            key: key.to_string(),
            reason,
        };

        let millis: i64 = raw
            .trim()
            .parse()
            .map_err(|e| corrupt(format!("malformed check-in timestamp {raw:?}: {e}")))?;

        Utc.timestamp_millis_opt(millis)
            .single()
            .map(Self::new)
            .ok_or_else(|| corrupt(format!("check-in timestamp out of range: {millis}")))
    }
}

/// A will together with its latest check-in, as returned by lookups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WillRecord {
    pub will: Will,
    pub last_check_in: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_will() -> Will {
        let draft = WillDraft {
            content: "Leave the cat to Bob".to_string(),
            beneficiaries: vec![Beneficiary::new("0xbob"), Beneficiary::new("0xcarol")],
            assets: vec![DigitalAsset::new("Cold wallet", "safe deposit box 12")],
            inactivity_period_days: 90,
        };
        Will::from_draft(
            draft,
            "0xalice",
            Utc.timestamp_millis_opt(1_700_000_000_123).unwrap(),
            "QmContent",
            "QmShares",
        )
    }

    #[test]
    fn test_will_json_field_names() {
        let json = sample_will().to_json().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["inactivityPeriodDays"], 90);
        assert_eq!(value["encryptedContentIPFSHash"], "QmContent");
        assert_eq!(value["keySharesIPFSHash"], "QmShares");
        assert_eq!(value["testatorAddress"], "0xalice");
        assert_eq!(value["deploymentTimestamp"], 1_700_000_000_123i64);
    }

    #[test]
    fn test_will_decode_keeps_millisecond_precision() {
        let will = sample_will();
        let decoded = Will::from_json("will:0xalice", &will.to_json().unwrap()).unwrap();
        assert_eq!(decoded, will);
    }

    #[test]
    fn test_corrupt_will_is_persistence_failure() {
        let err = Will::from_json("will:0xalice", "{not json").unwrap_err();
        assert!(matches!(
            err,
            EngineError::PersistenceFailure { ref key, .. } if key == "will:0xalice"
        ));
    }

    #[test]
    fn test_check_in_decode_rejects_garbage() {
        let ok = CheckInRecord::decode("checkin:0xalice", "1700000000000").unwrap();
        assert_eq!(ok.last_check_in.timestamp_millis(), 1_700_000_000_000);

        let err = CheckInRecord::decode("checkin:0xalice", "yesterday").unwrap_err();
        assert!(matches!(err, EngineError::PersistenceFailure { .. }));
    }

    #[test]
    fn test_beneficiary_membership_is_exact() {
        let will = sample_will();
        assert!(will.has_beneficiary("0xbob"));
        assert!(!will.has_beneficiary("0xBOB"));
        assert!(!will.has_beneficiary(""));
    }

    #[test]
    fn test_period_presets() {
        assert!(InactivityPeriod::is_preset(180));
        assert!(!InactivityPeriod::is_preset(7));
        assert_eq!(sample_will().inactivity_period_ms(), 90 * MS_PER_DAY);
    }
}
