mod common;
mod inspect;
mod logic;
mod storage;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use std::fs::{self, File};
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use common::scenario::{get_scenario, list_scenarios, scenario_keys};
use common::{parse_now, parse_report, split_csv};
use inspect::{ActionRequest, apply_actions, open_engine, write_console};
use logic::{LogicTester, SessionRunner};
use skyhop_missions::{MissionConfig, MissionRegistry};

#[derive(Debug, Parser)]
#[command(name = "skyhop-tester", version = "0.1.0")]
#[command(about = "Automated QA and state inspection for the Skyhop mission engine")]
struct Args {
    /// Mission config JSON (key names); defaults are used when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mission catalog JSON ({"missions": [...]}) for the inspection actions; scenarios
    /// always use the built-in catalog
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Key-value store file used by the inspection actions
    #[arg(long, default_value = "skyhop-store.json")]
    store: PathBuf,

    /// Pretend the local time is this (YYYY-MM-DDTHH:MM[:SS] or YYYY-MM-DD)
    #[arg(long)]
    now: Option<String>,

    /// Scenarios to run (comma-separated, `all` for every scenario)
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Print every mission in the store
    #[arg(long)]
    show: bool,

    /// Report progress, e.g. `play_games:3` (repeatable)
    #[arg(long, value_name = "OBJECTIVE:N")]
    increment: Vec<String>,

    /// Report an observed value such as a score, e.g. `reach_score:120` (repeatable)
    #[arg(long, value_name = "OBJECTIVE:N")]
    value: Vec<String>,

    /// Claim a completed mission's reward (repeatable)
    #[arg(long, value_name = "MISSION_ID")]
    claim: Vec<String>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    let config = load_config(args.config.as_deref())?;
    let registry = load_catalog(args.catalog.as_deref())?;
    let request = build_action_request(&args)?;
    if !request.is_empty() {
        return run_actions(&args, config, registry, &request);
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let runner = SessionRunner::new(MissionRegistry::builtin(), config, args.verbose);
    let results = run_logic_scenarios(&scenarios, runner, args.verbose);

    write_reports(&args, &results, start_time)?;

    if results.iter().any(|r| !r.passed) {
        std::process::exit(1);
    }

    Ok(())
}

fn maybe_list_scenarios(args: &Args) -> Result<bool> {
    if !args.list_scenarios {
        return Ok(false);
    }
    let mut output_target = OutputTarget::new(args.output.clone())?;
    writeln!(output_target.writer(), "Available scenarios:")?;
    for (key, description) in list_scenarios() {
        writeln!(output_target.writer(), "  {key:20} - {description}")?;
    }
    output_target.flush_inner()?;
    Ok(true)
}

fn announce_banner() {
    println!("{}", "🚀 Skyhop Mission Tester".bright_cyan().bold());
    println!("{}", "========================".cyan());
}

fn load_config(path: Option<&Path>) -> Result<MissionConfig> {
    let Some(path) = path else {
        return Ok(MissionConfig::default());
    };
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let config = MissionConfig::from_json(&raw)
        .with_context(|| format!("invalid mission config {}", path.display()))?;
    log::debug!("loaded mission config from {}", path.display());
    Ok(config)
}

fn load_catalog(path: Option<&Path>) -> Result<MissionRegistry> {
    let Some(path) = path else {
        return Ok(MissionRegistry::builtin());
    };
    let raw =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let registry = MissionRegistry::from_json(&raw)
        .with_context(|| format!("invalid mission catalog {}", path.display()))?;
    log::debug!("loaded {} missions from {}", registry.len(), path.display());
    Ok(registry)
}

fn build_action_request(args: &Args) -> Result<ActionRequest> {
    let parse_all = |specs: &[String]| -> Result<Vec<_>> {
        specs.iter().map(|spec| parse_report(spec)).collect()
    };
    Ok(ActionRequest {
        show: args.show,
        increments: parse_all(&args.increment).context("--increment")?,
        values: parse_all(&args.value).context("--value")?,
        claims: args.claim.clone(),
    })
}

fn run_actions(
    args: &Args,
    config: MissionConfig,
    registry: MissionRegistry,
    request: &ActionRequest,
) -> Result<()> {
    let now = args
        .now
        .as_deref()
        .map(parse_now)
        .transpose()
        .context("--now")?;
    let mut engine = open_engine(&args.store, config, registry, now)?;
    let outcome = apply_actions(&mut engine, request);

    let mut output_target = OutputTarget::new(args.output.clone())?;
    if args.report == "json" {
        serde_json::to_writer_pretty(&mut output_target, &outcome)?;
        writeln!(&mut output_target)?;
    } else {
        write_console(&mut output_target, &engine, &outcome, request.show)?;
    }
    output_target.flush_inner()?;
    Ok(())
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        scenarios.extend(scenario_keys());
    }
    scenarios
}

fn run_logic_scenarios(
    scenarios: &[String],
    runner: SessionRunner,
    verbose: bool,
) -> Vec<logic::ScenarioResult> {
    println!("{}", "🧠 Running Logic Scenarios".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let logic_tester = LogicTester::new(runner, verbose);
    let mut results = Vec::new();
    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            results.push(logic_tester.run_scenario(&scenario));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }
    results
}

fn write_reports(args: &Args, results: &[logic::ScenarioResult], start_time: Instant) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;

    match args.report.as_str() {
        "json" => {
            if results.is_empty() {
                writeln!(&mut output_target, "[]")?;
            } else {
                logic::reports::generate_json_report(&mut output_target, results)?;
            }
        }
        "markdown" => {
            if results.is_empty() {
                writeln!(
                    &mut output_target,
                    "# Skyhop Mission Logic Results\n\n_No scenarios executed._"
                )?;
            } else {
                logic::reports::generate_markdown_report(&mut output_target, results)?;
            }
        }
        _ => {
            if results.is_empty() {
                writeln!(&mut output_target, "No logic scenarios executed.")?;
            } else {
                logic::reports::generate_console_report(
                    &mut output_target,
                    results,
                    start_time.elapsed(),
                )?;
            }
            writeln!(&mut output_target)?;
            writeln!(&mut output_target, "🏁 Total time: {:?}", start_time.elapsed())?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn base_args() -> Args {
        Args {
            config: None,
            catalog: None,
            store: PathBuf::from("skyhop-store.json"),
            now: None,
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            report: "json".to_string(),
            output: None,
            verbose: false,
            show: false,
            increment: Vec::new(),
            value: Vec::new(),
            claim: Vec::new(),
        }
    }

    fn temp(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!("skyhop-main-{label}-{}", std::process::id()))
    }

    fn sample_result(passed: bool) -> logic::ScenarioResult {
        logic::ScenarioResult {
            scenario_name: "Smoke".to_string(),
            passed,
            steps_run: 2,
            failures: if passed {
                Vec::new()
            } else {
                vec!["failure".to_string()]
            },
            duration: Duration::from_millis(5),
        }
    }

    #[test]
    fn expands_all_scenarios_keyword() {
        let expanded = expand_scenarios("all,smoke");
        assert!(expanded.contains(&"smoke".to_string()));
        assert!(expanded.contains(&"weekly-rollover".to_string()));
        assert!(!expanded.contains(&"all".to_string()));
    }

    #[test]
    fn expand_scenarios_without_all_preserves_order() {
        let expanded = expand_scenarios("b,a");
        assert_eq!(expanded, vec!["b".to_string(), "a".to_string()]);
    }

    #[test]
    fn run_logic_scenarios_skips_unknown_names() {
        let runner = SessionRunner::new(MissionRegistry::builtin(), MissionConfig::default(), false);
        let results = run_logic_scenarios(&["nope".to_string(), "a".to_string()], runner, false);
        assert_eq!(results.len(), 1);
        assert!(results[0].passed, "{:?}", results[0].failures);
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let path = temp("list.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(path.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("forfeit-unclaimed"));
        assert!(!maybe_list_scenarios(&base_args()).unwrap());
    }

    #[test]
    fn write_reports_json_and_markdown() {
        let path = temp("report.json");
        let args = Args {
            output: Some(path.clone()),
            ..base_args()
        };
        write_reports(&args, &[sample_result(true)], Instant::now()).unwrap();
        assert!(fs::read_to_string(&path).unwrap().contains("scenario_name"));

        write_reports(&args, &[], Instant::now()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "[]");

        let args = Args {
            report: "markdown".to_string(),
            ..args
        };
        write_reports(&args, &[sample_result(false)], Instant::now()).unwrap();
        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# Skyhop Mission Logic Results"));
        assert!(content.contains("failure"));
    }

    #[test]
    fn config_and_catalog_files_are_loaded() {
        let config_path = temp("config.json");
        fs::write(&config_path, r#"{"key_prefix": "qa_"}"#).unwrap();
        let config = load_config(Some(&config_path)).unwrap();
        assert_eq!(config.key_prefix, "qa_");
        assert_eq!(config.currency_key, MissionConfig::default().currency_key);

        let catalog_path = temp("catalog.json");
        fs::write(
            &catalog_path,
            r#"{"missions": [{"id": "p1", "title": "P", "description": "", "objective": "PlayGames",
                "target": 1, "reward": {"type": "currency", "amount": 5}, "category": "Daily"}]}"#,
        )
        .unwrap();
        assert_eq!(load_catalog(Some(&catalog_path)).unwrap().len(), 1);

        fs::write(&catalog_path, r#"{"missions": []"#).unwrap();
        assert!(load_catalog(Some(&catalog_path)).is_err());
        assert_eq!(load_catalog(None).unwrap().len(), MissionRegistry::builtin().len());
    }

    #[test]
    fn action_request_parses_reports() {
        let args = Args {
            increment: vec!["play_games:2".to_string()],
            value: vec!["reach_score:80".to_string()],
            claim: vec!["score_50".to_string()],
            ..base_args()
        };
        let request = build_action_request(&args).unwrap();
        assert_eq!(request.increments.len(), 1);
        assert_eq!(request.values.len(), 1);
        assert!(!request.is_empty());

        let bad = Args {
            increment: vec!["play_games".to_string()],
            ..base_args()
        };
        assert!(build_action_request(&bad).is_err());
    }

    #[test]
    fn output_target_stdout_writes() {
        let mut target = OutputTarget::new(None).unwrap();
        target.write_all(b"ok").unwrap();
        target.flush().unwrap();
    }
}
