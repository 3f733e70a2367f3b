mod assets;
mod common;
mod logic;
mod status;
mod storage;

use anyhow::{Context, Result, bail};
use clap::{Parser, ValueEnum};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::time::Instant;

use assets::FileCatalogLoader;
use common::scenario::{StoreKind, all_scenario_keys, get_scenario, list_scenarios};
use common::split_csv;
use logic::{LogicTester, ScenarioResult};
use poolpass_engine::{CatalogLoader, ENGINE_CONFIG_NAME, EngineConfig};
use status::{PassportCommand, apply_command, open_passport, write_status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TestMode {
    /// Run engine scenarios (fast, in-process)
    Logic,
    /// Print the passport persisted under --state-dir
    Status,
    /// Stamp --id, or the selected pool
    Claim,
    /// Select --id
    Select,
    /// Select the next pool
    Next,
    /// Select the previous pool
    Previous,
    /// Show the next page of stamps
    NextPage,
    /// Show the previous page of stamps
    PreviousPage,
    /// Clear every stamp
    Reset,
}

#[derive(Debug, Parser)]
#[command(name = "poolpass-tester", version)]
#[command(about = "Automated checks and a command-line passport for the Pool Passport engine")]
struct Args {
    /// Logic scenarios, or a passport command against --state-dir
    #[arg(long, value_enum, default_value_t = TestMode::Logic)]
    mode: TestMode,

    /// Scenarios to run (comma-separated, or "all")
    #[arg(long, default_value = "smoke")]
    scenarios: String,

    /// List all available scenarios and exit
    #[arg(long)]
    list_scenarios: bool,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Number of iterations per scenario and seed
    #[arg(long, default_value_t = 10)]
    iterations: usize,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Store backing the logic scenarios
    #[arg(long, value_enum, default_value_t = StoreKind::Memory)]
    store: StoreKind,

    /// Directory holding the persisted passport for passport commands
    #[arg(long, default_value = "target/poolpass-state")]
    state_dir: PathBuf,

    /// Location id for claim and select
    #[arg(long)]
    id: Option<String>,

    /// Catalog JSON file (defaults to the web build's pools.json)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Engine config JSON file (defaults to the web build's engine.json)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if maybe_list_scenarios(&args)? {
        return Ok(());
    }

    let loader = FileCatalogLoader::new(args.catalog.clone(), args.config.clone());
    if let Some(command) = passport_command(&args)? {
        return run_passport_command(&args, &loader, &command);
    }

    announce_banner();

    let start_time = Instant::now();
    let scenarios = expand_scenarios(&args.scenarios);
    let seeds = parse_seeds(&args.seeds)?;
    let results = run_logic_scenarios(&args, &loader, &scenarios, &seeds)?;

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
    println!("{}", "🏊 Pool Passport Tester".bright_cyan().bold());
    println!("{}", "=======================".cyan());
}

fn expand_scenarios(scenarios_arg: &str) -> Vec<String> {
    let mut scenarios = split_csv(scenarios_arg);
    if scenarios.iter().any(|s| s == "all") {
        scenarios.retain(|s| s != "all");
        for key in all_scenario_keys() {
            if !scenarios.contains(&key) {
                scenarios.push(key);
            }
        }
    }
    scenarios
}

fn parse_seeds(seeds_arg: &str) -> Result<Vec<u64>> {
    split_csv(seeds_arg)
        .iter()
        .map(|token| {
            let parsed = token
                .strip_prefix("0x")
                .map_or_else(|| token.parse(), |hex| u64::from_str_radix(hex, 16));
            parsed.with_context(|| format!("invalid seed '{token}'"))
        })
        .collect()
}

fn passport_command(args: &Args) -> Result<Option<PassportCommand>> {
    let command = match args.mode {
        TestMode::Logic => return Ok(None),
        TestMode::Status => PassportCommand::Status,
        TestMode::Claim => PassportCommand::Claim(args.id.clone()),
        TestMode::Select => match &args.id {
            Some(id) => PassportCommand::Select(id.clone()),
            None => bail!("--mode select requires --id"),
        },
        TestMode::Next => PassportCommand::NextLocation,
        TestMode::Previous => PassportCommand::PreviousLocation,
        TestMode::NextPage => PassportCommand::NextPage,
        TestMode::PreviousPage => PassportCommand::PreviousPage,
        TestMode::Reset => PassportCommand::Reset,
    };
    Ok(Some(command))
}

fn run_passport_command(
    args: &Args,
    loader: &FileCatalogLoader,
    command: &PassportCommand,
) -> Result<()> {
    let mut session = open_passport(&args.state_dir, loader)?;
    let message = apply_command(&mut session, command)?;

    let mut output_target = OutputTarget::new(args.output.clone())?;
    if !message.is_empty() {
        writeln!(&mut output_target, "{message}")?;
        writeln!(&mut output_target)?;
    }
    write_status(&mut output_target, &session.projection())?;
    output_target.flush_inner()?;
    Ok(())
}

fn run_logic_scenarios(
    args: &Args,
    loader: &FileCatalogLoader,
    scenarios: &[String],
    seeds: &[u64],
) -> Result<Vec<ScenarioResult>> {
    println!("{}", "🧠 Running Logic Tests".bright_yellow().bold());
    println!("{}", "-".repeat(30).yellow());

    let catalog = loader
        .load_locations()
        .context("failed to load the pool catalog")?;
    let config: EngineConfig = loader
        .load_config(ENGINE_CONFIG_NAME)
        .context("failed to load the engine config")?;
    let logic_tester = LogicTester::new(catalog, config.normalized(), args.store, args.verbose);

    let mut results = Vec::new();
    for scenario_name in scenarios {
        if let Some(scenario) = get_scenario(scenario_name) {
            results.extend(logic_tester.run_scenario(&scenario, seeds, args.iterations));
        } else {
            eprintln!("⚠️  Unknown scenario: {}", scenario_name.yellow());
        }
    }
    Ok(results)
}

fn write_reports(args: &Args, results: &[ScenarioResult], start_time: Instant) -> Result<()> {
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
                    "# Pool Passport Test Results\n\n_No scenarios executed._"
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
            writeln!(
                &mut output_target,
                "🏁 Total time: {:?}",
                start_time.elapsed()
            )?;
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
    use crate::common::temp_path;

    fn base_args() -> Args {
        Args {
            mode: TestMode::Logic,
            scenarios: "smoke".to_string(),
            list_scenarios: false,
            seeds: "1337".to_string(),
            iterations: 1,
            report: "json".to_string(),
            verbose: false,
            output: None,
            store: StoreKind::Memory,
            state_dir: temp_path("main-state"),
            id: None,
            catalog: None,
            config: None,
        }
    }

    #[test]
    fn expands_all_scenarios_keyword() {
        let expanded = expand_scenarios("smoke,all");
        assert_eq!(expanded[0], "smoke");
        assert!(expanded.contains(&"random-walk".to_string()));
        assert_eq!(
            expanded.iter().filter(|s| s.as_str() == "smoke").count(),
            1
        );
    }

    #[test]
    fn expand_scenarios_without_all_preserves_order() {
        let expanded = expand_scenarios("reset,smoke");
        assert_eq!(expanded, vec!["reset".to_string(), "smoke".to_string()]);
    }

    #[test]
    fn seeds_accept_decimal_and_hex() {
        assert_eq!(parse_seeds("1, 0xff").unwrap(), vec![1, 255]);
        assert!(parse_seeds("banana").is_err());
    }

    #[test]
    fn select_mode_requires_an_id() {
        let args = Args {
            mode: TestMode::Select,
            ..base_args()
        };
        assert!(passport_command(&args).is_err());
        let args = Args {
            id: Some("brockwell-lido".to_string()),
            ..args
        };
        assert_eq!(
            passport_command(&args).unwrap(),
            Some(PassportCommand::Select("brockwell-lido".to_string()))
        );
        assert_eq!(passport_command(&base_args()).unwrap(), None);
    }

    #[test]
    fn logic_run_produces_passing_results() {
        let args = base_args();
        let loader = FileCatalogLoader::default();
        let results =
            run_logic_scenarios(&args, &loader, &["smoke".to_string(), "nope".to_string()], &[1, 2])
                .unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.passed));
    }

    #[test]
    fn write_reports_emits_json_output() {
        let output = temp_path("report.json");
        let args = Args {
            output: Some(output.clone()),
            ..base_args()
        };
        write_reports(&args, &[], Instant::now()).unwrap();
        let content = std::fs::read_to_string(output).unwrap();
        assert!(content.contains("[]"));
    }

    #[test]
    fn maybe_list_scenarios_writes_output() {
        let output = temp_path("scenarios.txt");
        let args = Args {
            list_scenarios: true,
            output: Some(output.clone()),
            ..base_args()
        };
        assert!(maybe_list_scenarios(&args).unwrap());
        let content = std::fs::read_to_string(output).unwrap();
        assert!(content.contains("Available scenarios"));
        assert!(content.contains("pagination-bounds"));
    }

    #[test]
    fn passport_commands_write_status() {
        let output = temp_path("status.txt");
        let args = Args {
            mode: TestMode::Claim,
            output: Some(output.clone()),
            ..base_args()
        };
        let loader = FileCatalogLoader::default();
        let command = passport_command(&args).unwrap().unwrap();
        run_passport_command(&args, &loader, &command).unwrap();
        let content = std::fs::read_to_string(output).unwrap();
        assert!(content.contains("Stamped brockwell-lido"));
        assert!(content.contains("Pool Passport"));
    }
}
