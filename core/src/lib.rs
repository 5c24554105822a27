//! # Legacy Clock Core
//!
//! The inactivity-based release state machine of a dead-man's-switch will,
//! plus the data model and the capability contracts the async engine consumes.
//!
//! **IMPORTANT**: This layer is Pure Rust - no storage backends, no runtime, no global clock.

pub mod capability;
pub mod error;
pub mod release;
pub mod validation;
pub mod will;

pub use capability::{Clock, Identity, KeyValueStore, ManualClock, StaticIdentity, SystemClock};
pub use error::{ClaimDenied, EngineError, EngineResult, StoreError};
pub use release::{ReleaseState, ReleaseStatus, authorize_claim, compute_state, release_status};
pub use validation::ValidationPolicy;
pub use will::{
    Address, Beneficiary, CheckInRecord, DigitalAsset, InactivityPeriod, Will, WillDraft,
    WillRecord,
};

pub mod prelude {
    pub use crate::capability::{
        Clock, Identity, KeyValueStore, ManualClock, StaticIdentity, SystemClock, keys,
    };
    pub use crate::error::{ClaimDenied, EngineError, EngineResult, StoreError};
    pub use crate::release::{
        ReleaseState, ReleaseStatus, authorize_claim, compute_state, release_status,
    };
    pub use crate::validation::ValidationPolicy;
    pub use crate::will::{
        Address, Beneficiary, CheckInRecord, DigitalAsset, InactivityPeriod, Will, WillDraft,
        WillRecord,
    };
}
