//! Command handlers.
//!
//! Each handler drives one engine operation and renders the result either as
//! human-readable text or, with `--json`, as a single JSON document on stdout.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use legacy_clock_core::prelude::*;
use legacy_clock_runtime::{LegacyClock, WalletSession};
use legacy_clock_store::{FileStore, Traced};
use serde_json::json;
use std::sync::Arc;

use crate::config::LegacyClockConfig;

/// Everything a command needs: the engine, the session behind its identity,
/// and the output mode.
pub struct App {
    pub engine: LegacyClock,
    pub session: Arc<WalletSession>,
    pub json: bool,
}

impl App {
    pub async fn open(config: &LegacyClockConfig, json: bool) -> Result<Self> {
        let file = FileStore::open(&config.store_path)
            .await
            .with_context(|| format!("Failed to open store: {}", config.store_path.display()))?;
        let store: Arc<dyn KeyValueStore> = Arc::new(Traced::new(file, "file"));

        let session = Arc::new(WalletSession::restore(store.clone()).await?);
        let engine =
            LegacyClock::new(store, session.clone()).with_policy(config.validation_policy());

        Ok(Self {
            engine,
            session,
            json,
        })
    }

    fn emit(&self, value: serde_json::Value, text: impl FnOnce() -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(&value)?);
        } else {
            println!("{}", text());
        }
        Ok(())
    }

    fn principal(&self) -> Result<Address> {
        Ok(self
            .session
            .current_principal()
            .ok_or(EngineError::NotAuthenticated)?)
    }
}

// ============== Session ==============

pub async fn run_connect(app: &App, address: String) -> Result<()> {
    app.session.connect(address.clone()).await?;
    app.emit(json!({ "principal": address }), || {
        format!("Connected as {}", shorten(&address))
    })
}

pub async fn run_disconnect(app: &App) -> Result<()> {
    app.session.disconnect().await?;
    app.emit(json!({ "principal": null }), || "Wallet disconnected".to_string())
}

pub fn run_whoami(app: &App) -> Result<()> {
    let principal = app.session.current_principal();
    app.emit(json!({ "principal": principal }), || match &principal {
        Some(p) => p.clone(),
        None => "Not connected".to_string(),
    })
}

// ============== Testator ==============

pub async fn run_create(
    app: &App,
    content: String,
    beneficiaries: Vec<String>,
    assets: Vec<DigitalAsset>,
    inactivity_period_days: u32,
) -> Result<()> {
    if !InactivityPeriod::is_preset(inactivity_period_days) {
        tracing::warn!(
            inactivity_period_days,
            presets = ?InactivityPeriod::PRESETS,
            "Inactivity period is not one of the presets"
        );
    }

    let draft = WillDraft {
        content,
        beneficiaries: beneficiaries.into_iter().map(Beneficiary::new).collect(),
        assets,
        inactivity_period_days,
    };
    let will = app.engine.create_will(draft).await?;

    app.emit(json!({ "will": will }), || {
        let mut out = format!("Will created for {}", will.testator_address);
        out.push_str(&format!(
            "\n  Content (IPFS): {}\n  Keys (IPFS):    {}",
            will.encrypted_content_ipfs_hash, will.key_shares_ipfs_hash
        ));
        out.push_str(&format!(
            "\n  Inactivity period: {} days",
            will.inactivity_period_days
        ));
        out
    })
}

pub async fn run_check_in(app: &App) -> Result<()> {
    let at = app.engine.check_in().await?;
    app.emit(json!({ "lastCheckIn": at.timestamp_millis() }), || {
        format!("Check-in recorded at {}", at.to_rfc3339())
    })
}

pub async fn run_show(app: &App) -> Result<()> {
    let Some(record) = app.engine.my_will().await? else {
        return app.emit(json!({ "will": null }), || {
            "No will on record. Create one with `legacy-clock create`.".to_string()
        });
    };
    let status = release_status(&record.will, record.last_check_in, app.engine.now());
    render_record(app, &record, &status, true)
}

pub async fn run_revoke(app: &App) -> Result<()> {
    let principal = app.principal()?;
    app.engine.revoke_will().await?;
    app.emit(json!({ "revoked": principal }), || {
        format!("Will revoked for {}", shorten(&principal))
    })
}

// ============== Beneficiary ==============

pub async fn run_find(app: &App, testator: String) -> Result<()> {
    let record = app.engine.find_will(&testator).await?;
    let status = release_status(&record.will, record.last_check_in, app.engine.now());
    render_record(app, &record, &status, false)
}

pub async fn run_status(app: &App, testator: Option<String>) -> Result<()> {
    let testator = match testator {
        Some(t) => t,
        None => app.principal()?,
    };
    let status = app.engine.status(&testator).await?;
    let now = app.engine.now();

    app.emit(json!({ "testator": testator, "status": status }), || {
        let mut out = format!("{}: {}", shorten(&testator), status.state);
        out.push_str(&format!(
            "\n  Last activity: {}",
            describe_last_check_in(status.last_check_in, now)
        ));
        if let (ReleaseState::Locked, Some(after)) = (status.state, status.releasable_after) {
            out.push_str(&format!(
                "\n  Releasable in {} (after {})",
                humanize(status.time_remaining()),
                after.to_rfc3339()
            ));
        }
        out
    })
}

pub async fn run_claim(app: &App, testator: String, key_share: String) -> Result<()> {
    let content = app.engine.claim_will(&testator, &key_share).await?;
    app.emit(json!({ "testator": testator, "content": content }), || {
        format!("Decrypted will content:\n\n{content}")
    })
}

// ============== Rendering ==============

fn render_record(
    app: &App,
    record: &WillRecord,
    status: &ReleaseStatus,
    owner: bool,
) -> Result<()> {
    let now = app.engine.now();
    let will = &record.will;

    // beneficiaries never see content through a lookup, only through a claim
    let will_json = if owner {
        json!(will)
    } else {
        let mut value = json!(will);
        if let Some(obj) = value.as_object_mut() {
            obj.remove("content");
        }
        value
    };

    app.emit(json!({ "will": will_json, "status": status }), || {
        let mut out = format!("Will of {}  [{}]", will.testator_address, status.state);
        out.push_str(&format!(
            "\n  Last activity:     {}",
            describe_last_check_in(record.last_check_in, now)
        ));
        out.push_str(&format!(
            "\n  Inactivity period: {} days",
            will.inactivity_period_days
        ));
        if status.state == ReleaseState::Locked && status.releasable_after.is_some() {
            out.push_str(&format!(
                "\n  Releasable in:     {}",
                humanize(status.time_remaining())
            ));
        }
        out.push_str("\n  Beneficiaries:");
        for b in &will.beneficiaries {
            out.push_str(&format!("\n    - {}", b.address));
        }
        if owner {
            out.push_str("\n  Digital assets:");
            for a in &will.assets {
                out.push_str(&format!("\n    - {} ({})", a.description, a.location));
            }
            out.push_str(&format!(
                "\n  Content (IPFS): {}\n  Keys (IPFS):    {}",
                will.encrypted_content_ipfs_hash, will.key_shares_ipfs_hash
            ));
        }
        out
    })
}

fn describe_last_check_in(last: Option<DateTime<Utc>>, now: DateTime<Utc>) -> String {
    match last {
        Some(at) => format!("{} ago", humanize(now.signed_duration_since(at))),
        None => "never".to_string(),
    }
}

/// Coarse "3 days" / "5 hours" / "less than a minute" rendering.
pub fn humanize(d: Duration) -> String {
    let d = if d < Duration::zero() { Duration::zero() } else { d };
    let plural = |n: i64, unit: &str| {
        if n == 1 {
            format!("1 {unit}")
        } else {
            format!("{n} {unit}s")
        }
    };

    if d.num_days() > 0 {
        plural(d.num_days(), "day")
    } else if d.num_hours() > 0 {
        plural(d.num_hours(), "hour")
    } else if d.num_minutes() > 0 {
        plural(d.num_minutes(), "minute")
    } else {
        "less than a minute".to_string()
    }
}

/// `0x1234...5678` for long addresses, unchanged otherwise.
pub fn shorten(address: &str) -> String {
    let chars: Vec<char> = address.chars().collect();
    if chars.len() <= 12 {
        return address.to_string();
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{head}...{tail}")
}

/// Parse `description=location` for `--asset`.
pub fn parse_asset(raw: &str) -> Result<DigitalAsset, String> {
    let (description, location) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected DESCRIPTION=LOCATION, got {raw:?}"))?;
    let (description, location) = (description.trim(), location.trim());
    if description.is_empty() || location.is_empty() {
        return Err(format!("asset description and location must be non-empty: {raw:?}"));
    }
    Ok(DigitalAsset::new(description, location))
}
