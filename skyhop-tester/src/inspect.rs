//! File-backed engine for poking at a saved mission state from the command line.
use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use colored::Colorize;
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::rc::Rc;

use skyhop_missions::{
    Clock, ManualClock, Mission, MissionCategory, MissionConfig, MissionEngine, MissionRegistry,
    MissionState, ObjectiveType, RewardApplier, StoredWallet, SystemClock,
};

use crate::storage::JsonFileStore;

pub type FileEngine = MissionEngine<Rc<JsonFileStore>, Box<dyn Clock>>;

/// Actions requested on the command line, applied in the order increments,
/// values, claims.
#[derive(Debug, Clone, Default)]
pub struct ActionRequest {
    pub show: bool,
    pub increments: Vec<(ObjectiveType, i64)>,
    pub values: Vec<(ObjectiveType, i64)>,
    pub claims: Vec<String>,
}

impl ActionRequest {
    pub fn is_empty(&self) -> bool {
        !self.show && self.increments.is_empty() && self.values.is_empty() && self.claims.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClaimLine {
    pub mission_id: String,
    pub granted: bool,
    pub detail: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActionOutcome {
    pub missions_changed: usize,
    pub claims: Vec<ClaimLine>,
    pub balance: i64,
    pub claimable: usize,
    pub missions: Vec<Mission>,
}

/// Open the store at `path` and build an engine over it. Currency and unlocks
/// live in the same file.
///
/// # Errors
///
/// Returns an error if the store cannot be opened or the config is invalid.
pub fn open_engine(
    path: &Path,
    config: MissionConfig,
    registry: MissionRegistry,
    now: Option<NaiveDateTime>,
) -> Result<FileEngine> {
    let storage = Rc::new(
        JsonFileStore::open(path).with_context(|| format!("opening {}", path.display()))?,
    );
    let clock: Box<dyn Clock> = match now {
        Some(now) => Box::new(ManualClock::new(now)),
        None => Box::new(SystemClock),
    };
    let rewards = RewardApplier::new(
        StoredWallet::new(Rc::clone(&storage), &config),
        StoredWallet::new(Rc::clone(&storage), &config),
    );
    MissionEngine::new(config, registry, storage, clock, rewards).context("invalid mission config")
}

pub fn apply_actions(engine: &mut FileEngine, request: &ActionRequest) -> ActionOutcome {
    let mut missions_changed = 0;
    for &(objective, amount) in &request.increments {
        missions_changed += engine.report_increment(objective, amount);
    }
    for &(objective, value) in &request.values {
        missions_changed += engine.report_value(objective, value);
    }

    let claims = request
        .claims
        .iter()
        .map(|id| match engine.try_claim_reward(id) {
            Ok(reward) => ClaimLine {
                mission_id: id.clone(),
                granted: true,
                detail: reward.description(),
            },
            Err(rejection) => ClaimLine {
                mission_id: id.clone(),
                granted: false,
                detail: rejection.to_string(),
            },
        })
        .collect();

    ActionOutcome {
        missions_changed,
        claims,
        balance: engine.rewards().ledger().balance(),
        claimable: engine.claimable_count(),
        missions: engine.all_missions(),
    }
}

pub fn write_console<W: Write + ?Sized>(
    out: &mut W,
    engine: &FileEngine,
    outcome: &ActionOutcome,
    show: bool,
) -> Result<()> {
    if outcome.missions_changed > 0 {
        writeln!(out, "📈 {} mission(s) advanced", outcome.missions_changed)?;
    }
    for claim in &outcome.claims {
        if claim.granted {
            writeln!(out, "🎁 {} claimed: {}", claim.mission_id.green(), claim.detail)?;
        } else {
            writeln!(out, "🚫 {}: {}", claim.mission_id.yellow(), claim.detail)?;
        }
    }

    if show {
        for category in MissionCategory::ALL {
            writeln!(out)?;
            let reset = engine
                .time_until_reset(category)
                .map(|left| format!(" (resets in {})", format_remaining(left)))
                .unwrap_or_default();
            writeln!(out, "{}{reset}", category.key().to_uppercase().bold())?;
            for mission in outcome
                .missions
                .iter()
                .filter(|mission| mission.category() == category)
            {
                writeln!(out, "  {}", mission_line(mission))?;
            }
        }
        writeln!(out)?;
    }

    writeln!(
        out,
        "💰 Balance: {}  |  Claimable: {}",
        outcome.balance, outcome.claimable
    )?;
    Ok(())
}

fn mission_line(mission: &Mission) -> String {
    let state = match mission.progress.state() {
        MissionState::NotStarted => "not started".dimmed(),
        MissionState::InProgress => "in progress".normal(),
        MissionState::Completed => "claimable".green(),
        MissionState::Claimed => "claimed".blue(),
    };
    format!(
        "[{:>5}/{:<5}] {:<20} {:<18} {:<22} {state}",
        mission.progress.current_progress,
        mission.template.target,
        mission.id(),
        mission.template.title,
        mission.template.reward.description(),
    )
}

fn format_remaining(left: Duration) -> String {
    let days = left.num_days();
    let hours = left.num_hours() % 24;
    let minutes = left.num_minutes() % 60;
    if days > 0 {
        format!("{days}d {hours}h")
    } else {
        format!("{hours}h {minutes}m")
    }
}
