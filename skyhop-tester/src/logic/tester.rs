use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

use crate::common::scenario::TestScenario;
use crate::logic::session::{SessionPlan, SessionRunner, SessionSummary};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub passed: bool,
    pub steps_run: usize,
    pub failures: Vec<String>,
    #[serde(with = "duration_serde")]
    pub duration: Duration,
}

pub struct LogicTester {
    runner: SessionRunner,
    verbose: bool,
}

impl LogicTester {
    pub const fn new(runner: SessionRunner, verbose: bool) -> Self {
        Self { runner, verbose }
    }

    pub fn run_scenario(&self, scenario: &TestScenario) -> ScenarioResult {
        if self.verbose {
            println!(
                "🧪 Testing scenario: {} ({} steps)",
                scenario.name.bright_white(),
                scenario.plan.steps.len()
            );
        }

        let start_time = Instant::now();
        let (steps_run, failures) = match self.runner.run(&scenario.plan) {
            Ok(summary) => (
                summary.steps_run,
                evaluate_expectations(&scenario.plan, &summary),
            ),
            Err(err) => (0, vec![format!("session aborted: {err:#}")]),
        };
        let duration = start_time.elapsed();

        if self.verbose {
            if failures.is_empty() {
                println!("  ✅ passed ({duration:?})");
            } else {
                for failure in &failures {
                    println!("  ❌ {}", failure.clone().red());
                }
            }
        }

        ScenarioResult {
            scenario_name: scenario.name.clone(),
            passed: failures.is_empty(),
            steps_run,
            failures,
            duration,
        }
    }
}

/// Every failed expectation, in declaration order.
fn evaluate_expectations(plan: &SessionPlan, summary: &SessionSummary) -> Vec<String> {
    plan.expectations
        .iter()
        .filter_map(|expectation| expectation(summary).err())
        .map(|err| format!("{err:#}"))
        .collect()
}

mod duration_serde {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_millis().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u128::deserialize(deserializer)?;
        Ok(Duration::from_millis(u64::try_from(millis).unwrap_or(0)))
    }
}
