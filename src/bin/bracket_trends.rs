//! Bracket Trends CLI - simulate bracket pools from a standings snapshot
//! and print the trend reports.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use bracket_trends::{
    render_table, top_per_group, AnalysisConfig, AnalysisMode, BracketAnalysis, ChampionFrequency,
    FailurePolicy, Standings, UnderdogFrequency, UpsetSummary,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Analyse the picks each winning entry submitted
    Snapshot,
    /// Re-simulate every winning bracket for each report
    Resample,
}

#[derive(Parser, Debug)]
#[command(name = "bracket_trends")]
#[command(version, about = "Simulate bracket pools and report trends in the winning brackets")]
struct Args {
    /// Standings snapshot: JSON list of {"team", "conference", "rating"}
    #[arg(short, long)]
    standings: PathBuf,

    /// Optional JSON config file; command-line flags override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of pools to simulate
    #[arg(short, long)]
    pools: Option<usize>,

    /// Entries per pool
    #[arg(short, long)]
    entries: Option<usize>,

    /// Trials used to rank each pool
    #[arg(short, long)]
    trials: Option<usize>,

    /// Random seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Skip pools that fail instead of aborting
    #[arg(long, default_value = "false")]
    fail_soft: bool,

    /// Extra attempts for a failed pool
    #[arg(long)]
    retries: Option<usize>,

    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Rows shown per round / for champions
    #[arg(long, default_value = "10")]
    top: usize,

    /// Print the reports as JSON instead of tables
    #[arg(long, default_value = "false")]
    json: bool,
}

#[derive(Serialize)]
struct Reports {
    upsets: Vec<UpsetSummary>,
    underdogs: Vec<UnderdogFrequency>,
    champions: Vec<ChampionFrequency>,
}

fn load_standings(path: &Path) -> Result<Standings> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read standings {:?}", path))?;
    let rows = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse standings {:?}", path))?;
    Ok(Standings::new(rows))
}

fn load_config(args: &Args) -> Result<AnalysisConfig> {
    let mut config: AnalysisConfig = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {:?}", path))?;
            serde_json::from_str(&text)
                .with_context(|| format!("Failed to parse config {:?}", path))?
        }
        None => AnalysisConfig::default(),
    };
    if let Some(pools) = args.pools {
        config.num_pools = pools;
    }
    if let Some(entries) = args.entries {
        config.entries_per_pool = entries;
    }
    if let Some(trials) = args.trials {
        config.trials_per_pool = trials;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.fail_soft {
        config.failure_policy = FailurePolicy::FailSoft;
    }
    if let Some(retries) = args.retries {
        config.max_retries = retries;
    }
    if let Some(mode) = args.mode {
        config.mode = match mode {
            ModeArg::Snapshot => AnalysisMode::Snapshot,
            ModeArg::Resample => AnalysisMode::Resample,
        };
    }
    Ok(config)
}

fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let standings = load_standings(&args.standings)?;
    info!("Loaded {} teams from {:?}", standings.len(), args.standings);

    let mut analysis = BracketAnalysis::new(standings, config).context("Invalid configuration")?;
    analysis.simulate_pools().context("Simulation failed")?;

    let upsets = analysis.analyze_upsets()?;
    let underdogs = top_per_group(&analysis.find_common_underdogs()?, args.top, |r| r.make_it_to);
    let mut champions = analysis.analyze_champion_picks()?;
    champions.truncate(args.top);

    if args.json {
        let reports = Reports {
            upsets,
            underdogs,
            champions,
        };
        println!("{}", serde_json::to_string_pretty(&reports)?);
    } else {
        println!("\nUpset Statistics by Round:");
        println!("{}", render_table(&upsets));
        println!("\nMost Common Underdogs:");
        println!("{}", render_table(&underdogs));
        println!("\nChampionship Pick Analysis:");
        println!("{}", render_table(&champions));
    }
    Ok(())
}

fn main() -> ExitCode {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_writer(std::io::stderr)
        .finish();
    if tracing::subscriber::set_global_default(subscriber).is_err() {
        eprintln!("Failed to set tracing subscriber");
    }

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("bracket_trends_{}_{}", std::process::id(), name));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_missing_standings_names_file() {
        let err = load_standings(Path::new("no_such_standings.json")).unwrap_err();
        let message = format!("{:#}", err);
        assert!(message.contains("standings"));
        assert!(message.contains("no_such_standings.json"));
    }

    #[test]
    fn test_missing_config_names_file() {
        let args = Args::parse_from([
            "bracket_trends",
            "--standings",
            "teams.json",
            "--config",
            "no_such_config.json",
        ]);
        let message = format!("{:#}", load_config(&args).unwrap_err());
        assert!(message.contains("Failed to read config"));
        assert!(message.contains("no_such_config.json"));
    }

    #[test]
    fn test_bad_config_names_file_and_cause() {
        let path = temp_file("bad_config.json", r#"{"num_pools": "x"}"#);
        let args = Args::parse_from([
            "bracket_trends",
            "--standings",
            "teams.json",
            "--config",
            path.to_str().unwrap(),
        ]);
        let message = format!("{:#}", load_config(&args).unwrap_err());
        fs::remove_file(&path).unwrap();

        assert!(message.contains("Failed to parse config"));
        assert!(message.contains("bad_config.json"));
        assert!(message.contains("invalid type"));
    }

    #[test]
    fn test_flags_override_config_file() {
        let path = temp_file("config.json", r#"{"num_pools": 5, "trials_per_pool": 20}"#);
        let args = Args::parse_from([
            "bracket_trends",
            "--standings",
            "teams.json",
            "--config",
            path.to_str().unwrap(),
            "--pools",
            "3",
            "--fail-soft",
        ]);
        let config = load_config(&args).unwrap();
        fs::remove_file(&path).unwrap();

        assert_eq!(config.num_pools, 3);
        assert_eq!(config.trials_per_pool, 20);
        assert_eq!(config.failure_policy, FailurePolicy::FailSoft);
    }
}
