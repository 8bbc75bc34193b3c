pub mod catalog;

use crate::logic::SessionPlan;

// Logic test scenario
#[derive(Debug, Clone)]
pub struct TestScenario {
    pub name: String,
    pub plan: SessionPlan,
}

impl TestScenario {
    #[must_use]
    pub fn new(name: impl Into<String>, plan: SessionPlan) -> Self {
        Self {
            name: name.into(),
            plan,
        }
    }
}

/// Look up a scenario by its CLI key or one of its aliases.
pub fn get_scenario(name: &str) -> Option<TestScenario> {
    let key = match name.to_lowercase().as_str() {
        "smoke" => "smoke",
        "score-claim" | "a" => "score-claim",
        "daily-rollover" | "b" => "daily-rollover",
        "forfeit-unclaimed" | "c" => "forfeit-unclaimed",
        "weekly-rollover" | "weekly" => "weekly-rollover",
        "long-session" => "long-session",
        "unlock-reward" | "unlock" => "unlock-reward",
        "watermark-scores" | "watermark" => "watermark-scores",
        "reset-idempotent" => "reset-idempotent",
        _ => return None,
    };
    catalog::catalog_scenarios()
        .into_iter()
        .find(|(entry_key, _, _)| *entry_key == key)
        .map(|(_, _, scenario)| scenario)
}

/// `(key, description)` for every scenario, in catalog order.
pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog::catalog_scenarios()
        .into_iter()
        .map(|(key, description, _)| (key, description))
        .collect()
}

/// Keys of every scenario, used to expand `all`.
pub fn scenario_keys() -> Vec<String> {
    list_scenarios()
        .into_iter()
        .map(|(key, _)| key.to_string())
        .collect()
}
