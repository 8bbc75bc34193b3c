use anyhow::{Result, ensure};
use chrono::{Duration, NaiveDate, NaiveDateTime};

use super::TestScenario;
use crate::logic::{SessionPlan, SessionSummary};
use skyhop_missions::ObjectiveType::{CollectCurrency, PlayGames, ReachScore, SurviveTime};

/// `(key, description, scenario)` for every logic scenario. All of them run
/// against the built-in catalog.
pub fn catalog_scenarios() -> Vec<(&'static str, &'static str, TestScenario)> {
    vec![
        (
            "smoke",
            "One game and a score report reach every matching mission",
            TestScenario::new("Smoke", smoke_plan()),
        ),
        (
            "score-claim",
            "Score 30 then 50, claim twice: one grant of 100 coins",
            TestScenario::new("Score Mission Claim", score_claim_plan()),
        ),
        (
            "daily-rollover",
            "Daily progress is wiped after relaunching the next morning",
            TestScenario::new("Daily Rollover", daily_rollover_plan()),
        ),
        (
            "forfeit-unclaimed",
            "A completed daily left unclaimed past midnight is forfeited",
            TestScenario::new("Forfeited Daily Reward", forfeit_plan()),
        ),
        (
            "weekly-rollover",
            "Weekly missions reset on Monday, not on Sunday",
            TestScenario::new("Weekly Rollover", weekly_rollover_plan()),
        ),
        (
            "long-session",
            "A session that crosses midnight reports into the new day",
            TestScenario::new("Midnight Mid-Session", long_session_plan()),
        ),
        (
            "unlock-reward",
            "Collecting 1000 coins unlocks a planet",
            TestScenario::new("Unlock Reward", unlock_plan()),
        ),
        (
            "watermark-scores",
            "Score-like objectives keep their best value",
            TestScenario::new("Watermark Scores", watermark_plan()),
        ),
        (
            "reset-idempotent",
            "Running the scheduler twice resets once",
            TestScenario::new("Reset Idempotence", reset_idempotent_plan()),
        ),
    ]
}

fn at(day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .unwrap_or_default()
}

// 2024-05-15 is a Wednesday.
fn midweek(hour: u32) -> SessionPlan {
    SessionPlan::new(at(15, hour))
}

fn expect_progress(summary: &SessionSummary, mission_id: &str, expected: i64) -> Result<()> {
    let actual = summary.progress(mission_id)?.current_progress;
    ensure!(
        actual == expected,
        "{mission_id} progress should be {expected}, got {actual}"
    );
    Ok(())
}

fn expect_claims(summary: &SessionSummary, expected: &[(&str, bool)]) -> Result<()> {
    let actual: Vec<(&str, bool)> = summary
        .claims
        .iter()
        .map(|(id, granted)| (id.as_str(), *granted))
        .collect();
    ensure!(
        actual == expected,
        "claims should be {expected:?}, got {actual:?}"
    );
    Ok(())
}

fn smoke_plan() -> SessionPlan {
    midweek(10)
        .increment(PlayGames, 1)
        .value(ReachScore, 40)
        .with_expectation(smoke_expectation)
}

fn smoke_expectation(summary: &SessionSummary) -> Result<()> {
    expect_progress(summary, "play_10", 1)?;
    expect_progress(summary, "daily_play_5", 1)?;
    expect_progress(summary, "weekly_play_25", 1)?;
    expect_progress(summary, "score_50", 40)?;
    expect_progress(summary, "daily_score_75", 40)?;
    ensure!(summary.completions.is_empty(), "nothing should complete");
    ensure!(summary.balance == 0, "no reward should be granted");
    Ok(())
}

fn score_claim_plan() -> SessionPlan {
    midweek(12)
        .value(ReachScore, 30)
        .value(ReachScore, 50)
        .claim("score_50")
        .claim("score_50")
        .with_expectation(score_claim_expectation)
}

fn score_claim_expectation(summary: &SessionSummary) -> Result<()> {
    expect_progress(summary, "score_50", 50)?;
    let progress = summary.progress("score_50")?;
    ensure!(progress.is_completed && progress.is_claimed, "score_50 should be claimed");
    ensure!(
        summary.completions_of("score_50") == 1,
        "score_50 should complete exactly once"
    );
    expect_claims(summary, &[("score_50", true), ("score_50", false)])?;
    ensure!(summary.balance == 100, "balance should be 100, got {}", summary.balance);
    Ok(())
}

fn daily_rollover_plan() -> SessionPlan {
    midweek(20)
        .increment(PlayGames, 3)
        .advance(Duration::hours(13))
        .relaunch()
        .with_expectation(daily_rollover_expectation)
}

fn daily_rollover_expectation(summary: &SessionSummary) -> Result<()> {
    expect_progress(summary, "daily_play_5", 0)?;
    expect_progress(summary, "weekly_play_25", 3)?;
    expect_progress(summary, "play_10", 3)?;
    let next = summary.progress("daily_play_5")?.next_reset_at;
    ensure!(
        next == Some(at(17, 0)),
        "next daily reset should be 2024-05-17 00:00, got {next:?}"
    );
    Ok(())
}

fn forfeit_plan() -> SessionPlan {
    midweek(8)
        .increment(PlayGames, 5)
        .advance(Duration::hours(24))
        .relaunch()
        .claim("daily_play_5")
        .with_expectation(forfeit_expectation)
}

fn forfeit_expectation(summary: &SessionSummary) -> Result<()> {
    ensure!(
        summary.completions_of("daily_play_5") == 1,
        "daily_play_5 should have completed before the reset"
    );
    expect_progress(summary, "daily_play_5", 0)?;
    expect_claims(summary, &[("daily_play_5", false)])?;
    ensure!(summary.balance == 0, "forfeited reward must not be granted");
    Ok(())
}

fn weekly_rollover_plan() -> SessionPlan {
    // 2024-05-18 is a Saturday.
    SessionPlan::new(at(18, 10))
        .increment(PlayGames, 4)
        .advance(Duration::hours(24))
        .run_resets()
        .increment(PlayGames, 2)
        .advance(Duration::hours(24))
        .run_resets()
        .with_expectation(weekly_rollover_expectation)
}

fn weekly_rollover_expectation(summary: &SessionSummary) -> Result<()> {
    let [sunday, monday] = summary.resets.as_slice() else {
        anyhow::bail!("expected two scheduler passes, got {}", summary.resets.len());
    };
    ensure!(sunday.daily && !sunday.weekly, "Sunday should only reset dailies");
    ensure!(monday.daily && monday.weekly, "Monday should reset both");
    expect_progress(summary, "weekly_play_25", 0)?;
    expect_progress(summary, "play_10", 6)?;
    Ok(())
}

fn long_session_plan() -> SessionPlan {
    midweek(23)
        .increment(PlayGames, 4)
        .advance(Duration::hours(2))
        .increment(PlayGames, 1)
        .with_expectation(long_session_expectation)
}

fn long_session_expectation(summary: &SessionSummary) -> Result<()> {
    expect_progress(summary, "daily_play_5", 1)?;
    expect_progress(summary, "play_10", 5)?;
    expect_progress(summary, "weekly_play_25", 5)?;
    Ok(())
}

fn unlock_plan() -> SessionPlan {
    midweek(10)
        .increment(CollectCurrency, 1_000)
        .claim("collect_1000")
        .with_expectation(unlock_expectation)
}

fn unlock_expectation(summary: &SessionSummary) -> Result<()> {
    expect_claims(summary, &[("collect_1000", true)])?;
    ensure!(
        summary.unlocked == ["planet_saturn"],
        "planet_saturn should be unlocked, got {:?}",
        summary.unlocked
    );
    ensure!(summary.balance == 0, "unlock rewards grant no coins");
    Ok(())
}

fn watermark_plan() -> SessionPlan {
    midweek(10)
        .increment(ReachScore, 40)
        .increment(ReachScore, 20)
        .value(SurviveTime, 45)
        .value(SurviveTime, 30)
        .with_expectation(watermark_expectation)
}

fn watermark_expectation(summary: &SessionSummary) -> Result<()> {
    expect_progress(summary, "score_50", 40)?;
    expect_progress(summary, "survive_60", 45)?;
    expect_progress(summary, "weekly_survive_180", 45)?;
    Ok(())
}

fn reset_idempotent_plan() -> SessionPlan {
    midweek(10)
        .increment(PlayGames, 2)
        .advance(Duration::days(1))
        .run_resets()
        .run_resets()
        .with_expectation(reset_idempotent_expectation)
}

fn reset_idempotent_expectation(summary: &SessionSummary) -> Result<()> {
    let [first, second] = summary.resets.as_slice() else {
        anyhow::bail!("expected two scheduler passes, got {}", summary.resets.len());
    };
    ensure!(first.daily && !first.weekly, "first pass should reset dailies");
    ensure!(
        !second.any() && second.missions_reset == 0,
        "second pass should do nothing"
    );
    expect_progress(summary, "daily_play_5", 0)?;
    expect_progress(summary, "play_10", 2)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::SessionRunner;
    use skyhop_missions::{MissionConfig, MissionRegistry};

    #[test]
    fn every_catalog_scenario_passes_against_the_builtin_catalog() {
        let runner = SessionRunner::new(MissionRegistry::builtin(), MissionConfig::default(), false);
        for (key, _, scenario) in catalog_scenarios() {
            let summary = runner.run(&scenario.plan).unwrap();
            for expectation in &scenario.plan.expectations {
                if let Err(err) = expectation(&summary) {
                    panic!("{key}: {err:#}");
                }
            }
        }
    }

    #[test]
    fn keys_are_unique() {
        let mut keys: Vec<&str> = catalog_scenarios().iter().map(|(key, _, _)| *key).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), catalog_scenarios().len());
    }
}
