use serde::{Deserialize, Serialize};

use crate::error::{EngineError, EngineResult};
use crate::will::WillDraft;

/// How strictly drafts are checked before a will is created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Structural rules only: non-empty content, beneficiaries and assets, positive period.
    #[default]
    Lenient,
    /// Lenient rules plus the creation form's rules: `0x` + 40 hex addresses,
    /// descriptions and locations of 3+ characters, content of 10+ characters.
    Strict,
}

const MIN_CONTENT_CHARS: usize = 10;
const MIN_ASSET_FIELD_CHARS: usize = 3;

impl WillDraft {
    pub fn validate(&self, policy: ValidationPolicy) -> EngineResult<()> {
        if self.content.trim().is_empty() {
            return Err(invalid("content must not be empty"));
        }
        if self.beneficiaries.is_empty() {
            return Err(invalid("at least one beneficiary is required"));
        }
        if self.assets.is_empty() {
            return Err(invalid("at least one asset is required"));
        }
        if self.inactivity_period_days == 0 {
            return Err(invalid("inactivity period must be at least one day"));
        }

        if policy == ValidationPolicy::Strict {
            self.validate_strict()?;
        }
        Ok(())
    }

    fn validate_strict(&self) -> EngineResult<()> {
        if self.content.chars().count() < MIN_CONTENT_CHARS {
            return Err(invalid("content is too short"));
        }
        for (i, b) in self.beneficiaries.iter().enumerate() {
            if !is_evm_address(&b.address) {
                return Err(invalid(format!(
                    "beneficiary #{} has an invalid address: {}",
                    i + 1,
                    b.address
                )));
            }
        }
        for (i, a) in self.assets.iter().enumerate() {
            if a.description.chars().count() < MIN_ASSET_FIELD_CHARS {
                return Err(invalid(format!("asset #{} description is too short", i + 1)));
            }
            if a.location.chars().count() < MIN_ASSET_FIELD_CHARS {
                return Err(invalid(format!("asset #{} location is too short", i + 1)));
            }
        }
        Ok(())
    }
}

/// `0x` followed by exactly 40 hex digits, either case.
pub fn is_evm_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 40 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}

fn invalid(reason: impl Into<String>) -> EngineError {
    EngineError::InvalidDraft(reason.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::will::{Beneficiary, DigitalAsset};

    const ADDR: &str = "0x1234567890AbCdEf1234567890aBcDeF12345678";

    fn draft() -> WillDraft {
        WillDraft {
            content: "All my keys go to my sister".to_string(),
            beneficiaries: vec![Beneficiary::new(ADDR)],
            assets: vec![DigitalAsset::new("Hardware wallet", "desk drawer")],
            inactivity_period_days: 180,
        }
    }

    #[test]
    fn test_valid_draft_passes_both_policies() {
        assert!(draft().validate(ValidationPolicy::Lenient).is_ok());
        assert!(draft().validate(ValidationPolicy::Strict).is_ok());
    }

    #[test]
    fn test_structural_rules() {
        let mut d = draft();
        d.beneficiaries.clear();
        assert!(matches!(
            d.validate(ValidationPolicy::Lenient),
            Err(EngineError::InvalidDraft(_))
        ));

        let mut d = draft();
        d.assets.clear();
        assert!(d.validate(ValidationPolicy::Lenient).is_err());

        let mut d = draft();
        d.inactivity_period_days = 0;
        assert!(d.validate(ValidationPolicy::Lenient).is_err());

        let mut d = draft();
        d.content = "   ".to_string();
        assert!(d.validate(ValidationPolicy::Lenient).is_err());
    }

    #[test]
    fn test_lenient_accepts_any_address_and_period() {
        let mut d = draft();
        d.beneficiaries = vec![Beneficiary::new("bob"), Beneficiary::new("bob")];
        d.inactivity_period_days = 7;
        assert!(d.validate(ValidationPolicy::Lenient).is_ok());
        assert!(d.validate(ValidationPolicy::Strict).is_err());
    }

    #[test]
    fn test_strict_field_lengths() {
        let mut d = draft();
        d.assets[0].location = "x".to_string();
        assert!(d.validate(ValidationPolicy::Strict).is_err());

        let mut d = draft();
        d.content = "short".to_string();
        assert!(d.validate(ValidationPolicy::Strict).is_err());
    }

    #[test]
    fn test_evm_address() {
        assert!(is_evm_address(ADDR));
        assert!(!is_evm_address("0x1234"));
        assert!(!is_evm_address("1234567890AbCdEf1234567890aBcDeF1234567800"));
        assert!(!is_evm_address("0xZZ34567890AbCdEf1234567890aBcDeF12345678"));
    }
}
