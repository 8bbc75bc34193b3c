use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use std::cell::RefCell;
use std::rc::Rc;

use skyhop_missions::{
    Clock, CurrencyLedger, ManualClock, MemoryStore, MemoryWallet, Mission, MissionConfig,
    MissionEngine, MissionEvent, MissionProgress, MissionRegistry, ObjectiveType, ResetOutcome,
    RewardApplier, Subscription,
};

/// One scripted player or platform action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionStep {
    Increment(ObjectiveType, i64),
    Value(ObjectiveType, i64),
    Claim(String),
    Advance(Duration),
    /// Run the reset scheduler explicitly and record its outcome.
    RunResets,
    /// Drop the engine and build a new one over the same storage.
    Relaunch,
}

pub type Expectation = fn(&SessionSummary) -> Result<()>;

#[derive(Clone)]
pub struct SessionPlan {
    pub start: NaiveDateTime,
    pub steps: Vec<SessionStep>,
    pub expectations: Vec<Expectation>,
}

impl std::fmt::Debug for SessionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionPlan")
            .field("start", &self.start)
            .field("steps", &self.steps)
            .field("expectations", &self.expectations.len())
            .finish()
    }
}

impl SessionPlan {
    #[must_use]
    pub const fn new(start: NaiveDateTime) -> Self {
        Self {
            start,
            steps: Vec::new(),
            expectations: Vec::new(),
        }
    }

    #[must_use]
    pub fn increment(mut self, objective: ObjectiveType, amount: i64) -> Self {
        self.steps.push(SessionStep::Increment(objective, amount));
        self
    }

    #[must_use]
    pub fn value(mut self, objective: ObjectiveType, value: i64) -> Self {
        self.steps.push(SessionStep::Value(objective, value));
        self
    }

    #[must_use]
    pub fn claim(mut self, mission_id: &str) -> Self {
        self.steps.push(SessionStep::Claim(mission_id.to_string()));
        self
    }

    #[must_use]
    pub fn advance(mut self, by: Duration) -> Self {
        self.steps.push(SessionStep::Advance(by));
        self
    }

    #[must_use]
    pub fn run_resets(mut self) -> Self {
        self.steps.push(SessionStep::RunResets);
        self
    }

    #[must_use]
    pub fn relaunch(mut self) -> Self {
        self.steps.push(SessionStep::Relaunch);
        self
    }

    #[must_use]
    pub fn with_expectation(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }
}

/// Everything observed while a plan ran.
#[derive(Debug, Clone, Default)]
pub struct SessionSummary {
    pub missions: Vec<Mission>,
    pub balance: i64,
    pub unlocked: Vec<String>,
    pub claims: Vec<(String, bool)>,
    pub completions: Vec<String>,
    pub progress_events: usize,
    pub resets: Vec<ResetOutcome>,
    pub steps_run: usize,
    pub finished_at: Option<NaiveDateTime>,
}

impl SessionSummary {
    pub fn mission(&self, mission_id: &str) -> Option<&Mission> {
        self.missions
            .iter()
            .find(|mission| mission.id() == mission_id)
    }

    /// Progress of `mission_id`, or an error naming the missing mission.
    pub fn progress(&self, mission_id: &str) -> Result<&MissionProgress> {
        self.mission(mission_id)
            .map(|mission| &mission.progress)
            .with_context(|| format!("mission {mission_id} missing from summary"))
    }

    pub fn completions_of(&self, mission_id: &str) -> usize {
        self.completions
            .iter()
            .filter(|id| id.as_str() == mission_id)
            .count()
    }
}

#[derive(Debug, Default)]
struct EventLog {
    completions: Vec<String>,
    progress_events: usize,
}

type SessionEngine = MissionEngine<MemoryStore, ManualClock>;

/// Runs [`SessionPlan`]s against a fresh in-memory engine each time.
#[derive(Debug, Clone)]
pub struct SessionRunner {
    registry: MissionRegistry,
    config: MissionConfig,
    verbose: bool,
}

impl SessionRunner {
    pub const fn new(registry: MissionRegistry, config: MissionConfig, verbose: bool) -> Self {
        Self {
            registry,
            config,
            verbose,
        }
    }

    /// Execute every step of `plan` and collect a summary.
    ///
    /// # Errors
    ///
    /// Returns an error if the engine cannot be built from this runner's config.
    pub fn run(&self, plan: &SessionPlan) -> Result<SessionSummary> {
        let storage = MemoryStore::new();
        let clock = ManualClock::new(plan.start);
        let wallet = MemoryWallet::new();
        let log = Rc::new(RefCell::new(EventLog::default()));

        let (mut engine, mut guard) = self.launch(&storage, &clock, &wallet, &log)?;
        let mut summary = SessionSummary::default();

        for step in &plan.steps {
            match step {
                SessionStep::Increment(objective, amount) => {
                    engine.report_increment(*objective, *amount);
                }
                SessionStep::Value(objective, value) => {
                    engine.report_value(*objective, *value);
                }
                SessionStep::Claim(id) => {
                    let granted = engine.claim_reward(id);
                    summary.claims.push((id.clone(), granted));
                }
                SessionStep::Advance(by) => clock.advance(*by),
                SessionStep::RunResets => summary.resets.push(engine.run_resets()),
                SessionStep::Relaunch => {
                    drop(guard);
                    (engine, guard) = self.launch(&storage, &clock, &wallet, &log)?;
                }
            }
            summary.steps_run += 1;
            if self.verbose {
                println!("     ↳ {step:?}");
            }
        }
        drop(guard);

        let events = log.borrow();
        summary.missions = engine.all_missions();
        summary.balance = wallet.balance();
        summary.unlocked = wallet.unlocked_items();
        summary.completions.clone_from(&events.completions);
        summary.progress_events = events.progress_events;
        summary.finished_at = Some(clock.now());
        Ok(summary)
    }

    fn launch(
        &self,
        storage: &MemoryStore,
        clock: &ManualClock,
        wallet: &MemoryWallet,
        log: &Rc<RefCell<EventLog>>,
    ) -> Result<(SessionEngine, Subscription)> {
        let engine = MissionEngine::new(
            self.config.clone(),
            self.registry.clone(),
            storage.clone(),
            clock.clone(),
            RewardApplier::new(wallet.clone(), wallet.clone()),
        )
        .context("mission config rejected")?;

        let sink = Rc::clone(log);
        let guard = engine.subscribe(move |event| {
            let mut sink = sink.borrow_mut();
            match event {
                MissionEvent::Completed(mission) => {
                    sink.completions.push(mission.id().to_string());
                }
                MissionEvent::Progress(_) => sink.progress_events += 1,
            }
        });
        Ok((engine, guard))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn start() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 15)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap()
    }

    fn runner() -> SessionRunner {
        SessionRunner::new(MissionRegistry::builtin(), MissionConfig::default(), false)
    }

    #[test]
    fn records_claims_events_and_balance() {
        let plan = SessionPlan::new(start())
            .value(ObjectiveType::ReachScore, 60)
            .claim("score_50")
            .claim("score_50");
        let summary = runner().run(&plan).unwrap();
        assert_eq!(summary.steps_run, 3);
        assert_eq!(
            summary.claims,
            [("score_50".to_string(), true), ("score_50".to_string(), false)]
        );
        assert_eq!(summary.balance, 100);
        assert_eq!(summary.completions_of("score_50"), 1);
        assert!(summary.progress_events >= 3);
    }

    #[test]
    fn relaunch_keeps_storage_and_applies_resets() {
        let plan = SessionPlan::new(start())
            .increment(ObjectiveType::PlayGames, 3)
            .advance(Duration::hours(13))
            .relaunch();
        let summary = runner().run(&plan).unwrap();
        assert_eq!(summary.progress("play_10").unwrap().current_progress, 3);
        assert_eq!(summary.progress("daily_play_5").unwrap().current_progress, 0);
        assert!(summary.progress("nope").is_err());
    }

    #[test]
    fn rejects_invalid_config() {
        let config = MissionConfig {
            daily_reset_key: String::new(),
            ..MissionConfig::default()
        };
        let runner = SessionRunner::new(MissionRegistry::builtin(), config, false);
        assert!(runner.run(&SessionPlan::new(start())).is_err());
    }
}
