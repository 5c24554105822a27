use thiserror::Error;

use crate::will::Address;

pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the release engine.
///
/// Every error is terminal for the operation that raised it; the engine never
/// retries. Callers decide whether to retry, surface, or ignore.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EngineError {
    #[error("No principal is bound to the session")]
    NotAuthenticated,

    #[error("No will on record for {testator}")]
    NotFound { testator: Address },

    #[error("A will is already on record for {testator}")]
    AlreadyExists { testator: Address },

    #[error("Will is not releasable: the inactivity period has not passed")]
    NotReleasable,

    #[error("Invalid key share: proof does not match any beneficiary")]
    InvalidKeyShare,

    #[error("Invalid will draft: {0}")]
    InvalidDraft(String),

    #[error("Persistence failure on {key}: {reason}")]
    PersistenceFailure { key: String, reason: String },
}

impl EngineError {
    /// Wrap a backend error with the key that was being accessed.
    pub fn persistence(key: impl Into<String>, err: StoreError) -> Self {
        EngineError::PersistenceFailure {
            key: key.into(),
            reason: err.to_string(),
        }
    }

    /// Whether this error is one of the claim denials.
    pub fn is_claim_denial(&self) -> bool {
        matches!(self, EngineError::NotReleasable | EngineError::InvalidKeyShare)
    }
}

/// Reasons a claim is refused.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimDenied {
    #[error("the inactivity period has not passed")]
    NotReleasable,

    #[error("proof does not match any beneficiary")]
    InvalidKeyShare,
}

impl From<ClaimDenied> for EngineError {
    fn from(denied: ClaimDenied) -> Self {
        match denied {
            ClaimDenied::NotReleasable => EngineError::NotReleasable,
            ClaimDenied::InvalidKeyShare => EngineError::InvalidKeyShare,
        }
    }
}

/// Key-value backend failures.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Backend error: {0}")]
    Backend(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claim_denied_maps_one_to_one() {
        assert_eq!(
            EngineError::from(ClaimDenied::NotReleasable),
            EngineError::NotReleasable
        );
        assert_eq!(
            EngineError::from(ClaimDenied::InvalidKeyShare),
            EngineError::InvalidKeyShare
        );
        assert!(EngineError::InvalidKeyShare.is_claim_denial());
        assert!(!EngineError::NotAuthenticated.is_claim_denial());
    }

    #[test]
    fn test_persistence_keeps_key_and_reason() {
        let err = EngineError::persistence("will:0xabc", StoreError::Backend("disk full".into()));
        assert_eq!(
            err.to_string(),
            "Persistence failure on will:0xabc: Backend error: disk full"
        );
    }
}
