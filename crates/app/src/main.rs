use std::fmt;

use practice_core::generator::tier_catalog;
use practice_core::model::ProblemId;
use serde_json::json;
use services::config::parse_target_points;
use services::{AppServices, Clock, PracticeConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingFlag { flag: &'static str },
    UnknownArg(String),
    InvalidId { raw: String },
    InvalidDifficulty { raw: String },
    InvalidTarget { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { flag } => write!(f, "{flag} is required"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidId { raw } => write!(f, "invalid --id value: {raw}"),
            ArgsError::InvalidDifficulty { raw } => write!(f, "invalid --difficulty value: {raw}"),
            ArgsError::InvalidTarget { raw } => write!(f, "invalid --target value: {raw}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  app tiers");
    eprintln!("  app new      --name <learner> --difficulty <1-7>");
    eprintln!("  app show     --name <learner> --id <problem_id>");
    eprintln!("  app answer   --name <learner> --id <problem_id> --answer <number>");
    eprintln!("  app progress --name <learner> [--target <points>]");
    eprintln!("  app summary  --name <learner>");
    eprintln!();
    eprintln!("Every command accepts --db <sqlite_url>.");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  PRACTICE_DB_URL, PRACTICE_NAMES, PRACTICE_TARGET_POINTS, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Tiers,
    New,
    Show,
    Answer,
    Progress,
    Summary,
}

impl Command {
    fn from_arg(arg: &str) -> Option<Self> {
        match arg {
            "tiers" => Some(Self::Tiers),
            "new" => Some(Self::New),
            "show" => Some(Self::Show),
            "answer" => Some(Self::Answer),
            "progress" => Some(Self::Progress),
            "summary" => Some(Self::Summary),
            _ => None,
        }
    }
}

#[derive(Debug, Default)]
struct Args {
    db_url: Option<String>,
    name: Option<String>,
    difficulty: Option<u32>,
    id: Option<ProblemId>,
    answer: Option<String>,
    target: Option<u32>,
}

impl Args {
    fn parse(args: &mut impl Iterator<Item = String>) -> Result<Self, ArgsError> {
        let mut parsed = Self::default();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    parsed.db_url = Some(value);
                }
                "--name" => parsed.name = Some(require_value(args, "--name")?),
                "--difficulty" => {
                    let value = require_value(args, "--difficulty")?;
                    let difficulty = value
                        .trim()
                        .parse()
                        .map_err(|_| ArgsError::InvalidDifficulty { raw: value.clone() })?;
                    parsed.difficulty = Some(difficulty);
                }
                "--id" => {
                    let value = require_value(args, "--id")?;
                    let id = value
                        .parse()
                        .map_err(|_| ArgsError::InvalidId { raw: value.clone() })?;
                    parsed.id = Some(id);
                }
                "--answer" => parsed.answer = Some(require_value(args, "--answer")?),
                "--target" => {
                    let value = require_value(args, "--target")?;
                    let target = parse_target_points(&value)
                        .map_err(|_| ArgsError::InvalidTarget { raw: value.clone() })?;
                    parsed.target = Some(target);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(parsed)
    }

    fn name(&self) -> Result<&str, ArgsError> {
        self.name
            .as_deref()
            .ok_or(ArgsError::MissingFlag { flag: "--name" })
    }

    fn id(&self) -> Result<ProblemId, ArgsError> {
        self.id.ok_or(ArgsError::MissingFlag { flag: "--id" })
    }
}

fn print_json(value: &serde_json::Value) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut argv = std::env::args().skip(1);

    let cmd = match argv.next() {
        None => {
            print_usage();
            return Ok(());
        }
        Some(first) if first == "--help" || first == "-h" => {
            print_usage();
            return Ok(());
        }
        Some(first) => Command::from_arg(&first).ok_or_else(|| {
            eprintln!("unknown subcommand: {first}");
            print_usage();
            std::io::Error::new(std::io::ErrorKind::InvalidInput, "unknown subcommand")
        })?,
    };

    let parsed = Args::parse(&mut argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;
    debug!(command = ?cmd, "parsed arguments");

    if cmd == Command::Tiers {
        let tiers: Vec<serde_json::Value> = tier_catalog()
            .iter()
            .map(|tier| {
                json!({
                    "level": tier.level,
                    "title": tier.title,
                    "band": tier.band.label(),
                    "points": tier.points,
                })
            })
            .collect();
        return print_json(&json!(tiers));
    }

    let mut config = PracticeConfig::from_env()?;
    if let Some(db_url) = parsed.db_url.clone() {
        config.db_url = db_url;
    }
    let services = AppServices::new_sqlite(config, Clock::default_clock()).await?;

    match cmd {
        Command::Tiers => Ok(()),
        Command::New => {
            let difficulty = parsed
                .difficulty
                .ok_or(ArgsError::MissingFlag { flag: "--difficulty" })?;
            let problem = services
                .problems()
                .create_new(parsed.name()?, difficulty)
                .await?;
            print_json(&json!({
                "id": problem.id(),
                "problem": problem.problem(),
                "difficulty": problem.difficulty(),
                "points": problem.point_value(),
            }))
        }
        Command::Show => {
            let problem = services
                .problems()
                .get_problem(parsed.name()?, parsed.id()?)
                .await?;
            print_json(&json!(problem))
        }
        Command::Answer => {
            let raw = parsed
                .answer
                .as_deref()
                .ok_or(ArgsError::MissingFlag { flag: "--answer" })?;
            let result = services
                .problems()
                .submit_raw_answer(parsed.name()?, parsed.id()?, raw)
                .await?;
            print_json(&json!({
                "correct": result.correct,
                "attempts": result.problem.attempts(),
                "elapsed": result.problem.elapsed(),
            }))
        }
        Command::Progress => {
            let progress = services.progress();
            let report = match parsed.target {
                Some(target) => progress.determine_progress(parsed.name()?, target).await?,
                None => progress.progress_for_goal(parsed.name()?).await?,
            };
            print_json(&json!(report))
        }
        Command::Summary => {
            let summary = services.progress().daily_summary(parsed.name()?).await?;
            print_json(&json!(summary))
        }
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
