//! # Release: The Inactivity State Machine
//!
//! Two states, `Locked` and `Releasable`, recomputed on every read from
//! `(last_check_in, now)`. Nothing here stores a "current state": time moves a
//! will from `Locked` to `Releasable`, a check-in moves it straight back.
//!
//! All functions are pure. `now` is always supplied by the caller.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ClaimDenied;
use crate::will::Will;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReleaseState {
    Locked,
    Releasable,
}

impl ReleaseState {
    pub fn is_releasable(self) -> bool {
        matches!(self, ReleaseState::Releasable)
    }
}

impl fmt::Display for ReleaseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReleaseState::Locked => f.write_str("Locked"),
            ReleaseState::Releasable => f.write_str("Releasable"),
        }
    }
}

/// Milliseconds elapsed since the last check-in; `None` means "never", i.e. infinite.
pub fn elapsed_ms(last_check_in: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Option<i64> {
    last_check_in.map(|at| now.signed_duration_since(at).num_milliseconds())
}

/// Decide the state of `will`.
///
/// The comparison is strict: an elapsed time exactly equal to the threshold is
/// still `Locked`. A check-in that lies in the future relative to `now` is `Locked`.
pub fn compute_state(
    will: &Will,
    last_check_in: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ReleaseState {
    match elapsed_ms(last_check_in, now) {
        None => ReleaseState::Releasable,
        Some(elapsed) if elapsed > will.inactivity_period_ms() => ReleaseState::Releasable,
        Some(_) => ReleaseState::Locked,
    }
}

/// Gate disclosure of the will's content.
///
/// Releasability is checked before membership, so a locked will never reveals
/// whether the proof would have matched.
pub fn authorize_claim<'w>(
    will: &'w Will,
    last_check_in: Option<DateTime<Utc>>,
    proof: &str,
    now: DateTime<Utc>,
) -> Result<&'w str, ClaimDenied> {
    if !compute_state(will, last_check_in, now).is_releasable() {
        return Err(ClaimDenied::NotReleasable);
    }
    if !will.has_beneficiary(proof) {
        return Err(ClaimDenied::InvalidKeyShare);
    }
    Ok(&will.content)
}

/// A point-in-time view of a will's release clock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseStatus {
    pub state: ReleaseState,
    pub inactivity_period_days: u32,
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub last_check_in: Option<DateTime<Utc>>,
    /// First instant at which the will is releasable. `None` when never checked in.
    #[serde(with = "chrono::serde::ts_milliseconds_option")]
    pub releasable_after: Option<DateTime<Utc>>,
    /// Zero once releasable.
    pub time_remaining_ms: i64,
}

impl ReleaseStatus {
    pub fn time_remaining(&self) -> Duration {
        Duration::milliseconds(self.time_remaining_ms)
    }
}

pub fn release_status(
    will: &Will,
    last_check_in: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ReleaseStatus {
    let state = compute_state(will, last_check_in, now);
    let releasable_after = last_check_in.and_then(|at| {
        at.checked_add_signed(Duration::milliseconds(will.inactivity_period_ms() + 1))
    });
    let time_remaining_ms = match (state, releasable_after) {
        (ReleaseState::Releasable, _) | (_, None) => 0,
        (ReleaseState::Locked, Some(after)) => {
            after.signed_duration_since(now).num_milliseconds().max(0)
        }
    };

    ReleaseStatus {
        state,
        inactivity_period_days: will.inactivity_period_days,
        last_check_in,
        releasable_after,
        time_remaining_ms,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::will::{Beneficiary, DigitalAsset, MS_PER_DAY, WillDraft};
    use chrono::TimeZone;

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(ms).unwrap()
    }

    fn will_with_period(days: u32) -> Will {
        Will::from_draft(
            WillDraft {
                content: "the secret recipe".to_string(),
                beneficiaries: vec![Beneficiary::new("0xbeef")],
                assets: vec![DigitalAsset::new("Recipe book", "kitchen drawer")],
                inactivity_period_days: days,
            },
            "0xtestator",
            at(0),
            "QmA",
            "QmB",
        )
    }

    #[test]
    fn test_boundary_is_exclusive() {
        for days in [1, 30, 90, 180, 365, 10_000] {
            let will = will_with_period(days);
            let period = i64::from(days) * MS_PER_DAY;
            let checked_in = at(1_000);

            assert_eq!(
                compute_state(&will, Some(checked_in), at(1_000 + period)),
                ReleaseState::Locked,
                "exactly {days} days must stay locked"
            );
            assert_eq!(
                compute_state(&will, Some(checked_in), at(1_000 + period + 1)),
                ReleaseState::Releasable,
                "{days} days + 1ms must be releasable"
            );
        }
    }

    #[test]
    fn test_never_checked_in_is_releasable() {
        let will = will_with_period(365);
        assert_eq!(compute_state(&will, None, at(0)), ReleaseState::Releasable);
    }

    #[test]
    fn test_check_in_resets_to_locked() {
        let will = will_with_period(30);
        let now = at(400 * MS_PER_DAY);
        assert!(compute_state(&will, Some(at(0)), now).is_releasable());
        assert_eq!(compute_state(&will, Some(now), now), ReleaseState::Locked);
    }

    #[test]
    fn test_future_check_in_is_locked() {
        let will = will_with_period(30);
        assert_eq!(
            compute_state(&will, Some(at(10 * MS_PER_DAY)), at(0)),
            ReleaseState::Locked
        );
    }

    #[test]
    fn test_claim_on_locked_will_is_denied_before_membership() {
        let will = will_with_period(90);
        assert_eq!(
            authorize_claim(&will, Some(at(0)), "0xbeef", at(MS_PER_DAY)),
            Err(ClaimDenied::NotReleasable)
        );
        assert_eq!(
            authorize_claim(&will, Some(at(0)), "0xstranger", at(MS_PER_DAY)),
            Err(ClaimDenied::NotReleasable)
        );
    }

    #[test]
    fn test_claim_requires_listed_beneficiary() {
        let will = will_with_period(90);
        let late = at(90 * MS_PER_DAY + 1);

        assert_eq!(
            authorize_claim(&will, Some(at(0)), "0xstranger", late),
            Err(ClaimDenied::InvalidKeyShare)
        );
        assert_eq!(
            authorize_claim(&will, Some(at(0)), "0xbeef", late),
            Ok("the secret recipe")
        );
        // idempotent
        assert_eq!(
            authorize_claim(&will, Some(at(0)), "0xbeef", late),
            Ok("the secret recipe")
        );
    }

    #[test]
    fn test_release_status_countdown() {
        let will = will_with_period(30);
        let status = release_status(&will, Some(at(0)), at(10 * MS_PER_DAY));

        assert_eq!(status.state, ReleaseState::Locked);
        assert_eq!(status.releasable_after, Some(at(30 * MS_PER_DAY + 1)));
        assert_eq!(status.time_remaining_ms, 20 * MS_PER_DAY + 1);

        let released = release_status(&will, Some(at(0)), at(31 * MS_PER_DAY));
        assert_eq!(released.state, ReleaseState::Releasable);
        assert_eq!(released.time_remaining(), Duration::zero());
    }

    #[test]
    fn test_release_status_never_checked_in() {
        let status = release_status(&will_with_period(30), None, at(5));
        assert_eq!(status.state, ReleaseState::Releasable);
        assert_eq!(status.releasable_after, None);
        assert_eq!(status.time_remaining_ms, 0);
    }

    #[test]
    fn test_state_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ReleaseState::Releasable).unwrap(),
            "\"releasable\""
        );
    }
}
