//! # LegacyClock: The Release Engine
//!
//! Wires the pure release rules of `legacy-clock-core` to the injected
//! capabilities (store, clock, identity) and exposes the testator and
//! beneficiary operations.
//!
//! ## Design Philosophy
//!
//! * **No stored state**: `Locked`/`Releasable` is recomputed from the records on every call
//! * **Claims re-read**: a claim never trusts an earlier lookup; both records are loaded again
//! * **One read, one write**: each record is touched at most once per operation
//!
//! Operations for different testators never contend. Concurrent check-ins for
//! the same testator are last-writer-wins.

use chrono::{DateTime, Utc};
use legacy_clock_core::capability::{Clock, Identity, KeyValueStore, SystemClock, keys};
use legacy_clock_core::error::{EngineError, EngineResult};
use legacy_clock_core::release::{self, ReleaseState, ReleaseStatus};
use legacy_clock_core::validation::ValidationPolicy;
use legacy_clock_core::will::{Address, CheckInRecord, Will, WillDraft, WillRecord};
use std::sync::Arc;
use tracing::Instrument;

use crate::cid::{CidMinter, PlaceholderCid};

/// The engine. Cheap to clone; clones share capabilities.
#[derive(Clone)]
pub struct LegacyClock {
    store: Arc<dyn KeyValueStore>,
    identity: Arc<dyn Identity>,
    clock: Arc<dyn Clock>,
    minter: Arc<dyn CidMinter>,
    policy: ValidationPolicy,
}

fn op_span(op: &'static str, testator: Option<&str>) -> tracing::Span {
    tracing::info_span!(
        "LegacyClock",
        legacy_clock.op = op,
        legacy_clock.testator = testator.unwrap_or("-"),
        legacy_clock.trace_id = %uuid::Uuid::new_v4(),
    )
}

impl LegacyClock {
    /// Engine over `store` acting as `identity`, on the wall clock.
    pub fn new(store: Arc<dyn KeyValueStore>, identity: Arc<dyn Identity>) -> Self {
        Self {
            store,
            identity,
            clock: Arc::new(SystemClock),
            minter: Arc::new(PlaceholderCid),
            policy: ValidationPolicy::default(),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_minter(mut self, minter: Arc<dyn CidMinter>) -> Self {
        self.minter = minter;
        self
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> ValidationPolicy {
        self.policy
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn principal(&self) -> EngineResult<Address> {
        self.identity
            .current_principal()
            .ok_or(EngineError::NotAuthenticated)
    }

    // ============== Record access ==============

    async fn load_will(&self, testator: &str) -> EngineResult<Option<Will>> {
        let key = keys::will(testator);
        let raw = self
            .store
            .get(&key)
            .await
            .map_err(|e| EngineError::persistence(&key, e))?;
        raw.map(|raw| Will::from_json(&key, &raw)).transpose()
    }

    async fn require_will(&self, testator: &str) -> EngineResult<Will> {
        self.load_will(testator)
            .await?
            .ok_or_else(|| EngineError::NotFound {
                testator: testator.to_string(),
            })
    }

    async fn load_check_in(&self, testator: &str) -> EngineResult<Option<DateTime<Utc>>> {
        let key = keys::check_in(testator);
        let raw = self
            .store
            .get(&key)
            .await
            .map_err(|e| EngineError::persistence(&key, e))?;
        Ok(raw
            .map(|raw| CheckInRecord::decode(&key, &raw))
            .transpose()?
            .map(|record| record.last_check_in))
    }

    async fn write_check_in(
        &self,
        testator: &str,
        at: DateTime<Utc>,
    ) -> EngineResult<CheckInRecord> {
        let key = keys::check_in(testator);
        let record = CheckInRecord::new(at);
        self.store
            .set(&key, record.encode())
            .await
            .map_err(|e| EngineError::persistence(&key, e))?;
        Ok(record)
    }

    // ============== Testator operations ==============

    /// Register a will for the connected principal.
    ///
    /// A second will for the same principal is rejected with `AlreadyExists`;
    /// `revoke_will` first to change terms. Creation also records the first
    /// check-in at the deployment instant, so a new will starts `Locked`.
    pub async fn create_will(&self, draft: WillDraft) -> EngineResult<Will> {
        let testator = self.principal()?;
        let span = op_span("create_will", Some(&testator));

        async move {
            draft.validate(self.policy)?;

            if self.load_will(&testator).await?.is_some() {
                tracing::warn!("Will already on record; refusing to overwrite");
                return Err(EngineError::AlreadyExists { testator });
            }

            let now = self.clock.now();
            let will = Will::from_draft(
                draft,
                testator.clone(),
                now,
                self.minter.mint(),
                self.minter.mint(),
            );
            let key = keys::will(&testator);
            let body = will
                .to_json()
                .map_err(|e| EngineError::persistence(&key, e.into()))?;

            // check-in first: a will must never be visible without its clock
            self.write_check_in(&testator, now).await?;
            self.store
                .set(&key, body)
                .await
                .map_err(|e| EngineError::persistence(&key, e))?;

            tracing::info!(
                beneficiaries = will.beneficiaries.len(),
                assets = will.assets.len(),
                inactivity_period_days = will.inactivity_period_days,
                "Will created"
            );
            Ok(will)
        }
        .instrument(span)
        .await
    }

    /// Record a check-in for `testator` at `now`.
    ///
    /// Only the bound principal may record its own check-in, and only against
    /// a will on record. The stored instant never moves backwards: it is the
    /// latest of `now`, the previous check-in and the deployment timestamp.
    pub async fn record_check_in(
        &self,
        testator: &str,
        now: DateTime<Utc>,
    ) -> EngineResult<CheckInRecord> {
        match self.identity.current_principal() {
            Some(principal) if principal == testator => {}
            _ => return Err(EngineError::NotAuthenticated),
        }

        let will = self.require_will(testator).await?;
        let previous = self.load_check_in(testator).await?;
        let mut at = now.max(will.deployment_timestamp);
        if let Some(previous) = previous {
            at = at.max(previous);
        }

        if at > now {
            tracing::warn!(
                requested = %now,
                recorded = %at,
                "Clock behind last activity; check-in clamped"
            );
        }
        self.write_check_in(testator, at).await
    }

    /// Liveness signal from the connected testator. Returns the recorded instant.
    pub async fn check_in(&self) -> EngineResult<DateTime<Utc>> {
        let testator = self.principal()?;
        let span = op_span("check_in", Some(&testator));

        async move {
            let record = self.record_check_in(&testator, self.clock.now()).await?;

            tracing::info!(at = %record.last_check_in, "Check-in recorded");
            Ok(record.last_check_in)
        }
        .instrument(span)
        .await
    }

    /// The connected testator's own will, if any.
    pub async fn my_will(&self) -> EngineResult<Option<WillRecord>> {
        let testator = self.principal()?;
        let Some(will) = self.load_will(&testator).await? else {
            return Ok(None);
        };
        let last_check_in = self.load_check_in(&testator).await?;
        Ok(Some(WillRecord {
            will,
            last_check_in,
        }))
    }

    /// Remove the connected testator's will and check-in record.
    pub async fn revoke_will(&self) -> EngineResult<()> {
        let testator = self.principal()?;
        let span = op_span("revoke_will", Some(&testator));

        async move {
            self.require_will(&testator).await?;

            // will first: a dangling check-in is harmless, a will without one is releasable
            let will_key = keys::will(&testator);
            self.store
                .remove(&will_key)
                .await
                .map_err(|e| EngineError::persistence(&will_key, e))?;
            let check_in_key = keys::check_in(&testator);
            self.store
                .remove(&check_in_key)
                .await
                .map_err(|e| EngineError::persistence(&check_in_key, e))?;

            tracing::info!("Will revoked");
            Ok(())
        }
        .instrument(span)
        .await
    }

    // ============== Beneficiary operations ==============

    pub async fn find_will(&self, testator: &str) -> EngineResult<WillRecord> {
        let span = op_span("find_will", Some(testator));

        async move {
            let will = self.require_will(testator).await?;
            let last_check_in = self.load_check_in(testator).await?;
            Ok(WillRecord {
                will,
                last_check_in,
            })
        }
        .instrument(span)
        .await
    }

    /// Current release state of `testator`'s will.
    pub async fn state(&self, testator: &str) -> EngineResult<ReleaseState> {
        let record = self.find_will(testator).await?;
        Ok(release::compute_state(
            &record.will,
            record.last_check_in,
            self.clock.now(),
        ))
    }

    /// Release state plus countdown, for dashboards.
    pub async fn status(&self, testator: &str) -> EngineResult<ReleaseStatus> {
        let record = self.find_will(testator).await?;
        Ok(release::release_status(
            &record.will,
            record.last_check_in,
            self.clock.now(),
        ))
    }

    /// Disclose the will's content to a beneficiary.
    ///
    /// Releasability is evaluated against the records as they are now, not as
    /// they were when the caller last looked the will up.
    pub async fn claim_will(&self, testator: &str, proof: &str) -> EngineResult<String> {
        let span = op_span("claim_will", Some(testator));

        async move {
            let WillRecord {
                will,
                last_check_in,
            } = self.find_will(testator).await?;
            let now = self.clock.now();

            match release::authorize_claim(&will, last_check_in, proof, now) {
                Ok(content) => {
                    tracing::info!("Claim granted");
                    Ok(content.to_string())
                }
                Err(denied) => {
                    tracing::warn!(reason = %denied, "Claim denied");
                    Err(denied.into())
                }
            }
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for LegacyClock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LegacyClock")
            .field("principal", &self.identity.current_principal())
            .field("policy", &self.policy)
            .finish()
    }
}
