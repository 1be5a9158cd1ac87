use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand, ValueEnum, ValueHint};
use tracing_subscriber::EnvFilter;

use apush::commands::key::KeyAction;
use apush::commands::study::{ProgressUpdate, parse_mastery};
use apush::commands::{generate, key, study};
use apush::llm::{DEFAULT_BATCH_SIZE, GeminiClient, GenerationRequest, ItemKind, Settings};
use apush::period::{Curriculum, Period};
use apush::resources::{DbqScore, ResourceFilter, ResourceFormat, Skill};
use apush::store::FileStore;

#[derive(Parser, Debug)]
#[command(
    name = "apush",
    version,
    about = "AP US History practice for the terminal.",
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true,
    disable_help_subcommand = true
)]
struct Cli {
    /// JSON file of periods to use instead of the built-in curriculum
    #[arg(long, global = true, value_name = "PATH", value_hint = ValueHint::FilePath)]
    curriculum: Option<PathBuf>,
    /// Gemini generateContent URL, overriding APUSH_GEMINI_ENDPOINT
    #[arg(long, global = true, value_name = "URL", value_hint = ValueHint::Url)]
    endpoint: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum KindArg {
    Saq,
    Dbq,
    Leq,
}

impl From<KindArg> for ItemKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Saq => ItemKind::ShortAnswer,
            KindArg::Dbq => ItemKind::DocumentBased,
            KindArg::Leq => ItemKind::LongEssay,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Toggle {
    On,
    Off,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate one practice item with Gemini
    Generate {
        #[arg(value_enum)]
        kind: KindArg,
        /// Curriculum period number
        #[arg(long, value_name = "NUMBER")]
        period: u8,
        /// Narrow the item to a specific topic
        #[arg(long, value_name = "TOPIC")]
        topic: Option<String>,
        /// Report generation errors instead of falling back, for this run only
        #[arg(long, default_value_t = false)]
        no_fallback: bool,
    },
    /// Generate several short answer questions
    Batch {
        #[arg(long, value_name = "NUMBER")]
        period: u8,
        #[arg(long, value_name = "COUNT", default_value_t = DEFAULT_BATCH_SIZE)]
        count: usize,
    },
    /// Manage the Gemini API key
    Key {
        /// Store a new API key. Prompts when no value is given.
        #[arg(long, value_name = "KEY", num_args = 0..=1, conflicts_with_all = ["clear", "status"])]
        set: Option<Option<String>>,
        /// Remove the stored API key
        #[arg(long, conflicts_with = "status")]
        clear: bool,
        /// Show where the API key comes from
        #[arg(long)]
        status: bool,
    },
    /// Turn static fallback content on or off
    Fallback {
        #[arg(value_enum)]
        state: Toggle,
    },
    /// List curriculum periods
    Periods,
    /// Browse practice resources
    Resources {
        #[arg(long, value_name = "NUMBER")]
        period: Option<u8>,
        /// saq, dbq, leq, mcq or all
        #[arg(long, value_name = "SKILL")]
        skill: Option<Skill>,
        /// tool, practice, guide or timeline
        #[arg(long, value_name = "FORMAT")]
        format: Option<ResourceFormat>,
    },
    /// Show or update study progress
    Progress {
        /// Mark a period as completed
        #[arg(long, value_name = "NUMBER")]
        complete: Vec<u8>,
        /// Record mastery for a period
        #[arg(long, value_name = "PERIOD=PERCENT", value_parser = parse_mastery)]
        mastery: Vec<(u8, u8)>,
        /// Add study time
        #[arg(long, value_name = "MINUTES")]
        minutes: Option<u32>,
    },
    /// Score a DBQ response against the 7-point rubric
    ScoreDbq {
        #[arg(long, default_value_t = false)]
        thesis: bool,
        #[arg(long, default_value_t = false)]
        context: bool,
        /// Evidence points, 0-3
        #[arg(long, default_value_t = 0)]
        evidence: u8,
        /// Analysis and reasoning points, 0-2
        #[arg(long, default_value_t = 0)]
        analysis: u8,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run_cli().await {
        eprintln!("{:?}", err);
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    let curriculum = match &cli.curriculum {
        Some(path) => Curriculum::from_json_file(path)?,
        None => Curriculum::builtin().clone(),
    };

    match cli.command {
        Command::Generate {
            kind,
            period,
            topic,
            no_fallback,
        } => {
            let period = find_period(&curriculum, period)?;
            let mut settings = load_settings()?;
            if no_fallback {
                settings.override_fallback(false);
            }
            let request =
                GenerationRequest::new(kind.into(), period).with_topic(topic.as_deref());
            let client = gemini_client(cli.endpoint.as_deref())?;
            generate::run(&client, &settings, &mut open_store()?, request).await?;
        }
        Command::Batch { period, count } => {
            let period = find_period(&curriculum, period)?;
            let settings = load_settings()?;
            let client = gemini_client(cli.endpoint.as_deref())?;
            generate::run_batch(&client, &settings, &mut open_store()?, period, count).await?;
        }
        Command::Key { set, clear, status } => {
            let action = match (set, clear, status) {
                (Some(candidate), _, _) => KeyAction::Set(candidate),
                (None, true, _) => KeyAction::Clear,
                _ => KeyAction::Status,
            };
            key::run(&mut load_settings()?, action)?;
        }
        Command::Fallback { state } => {
            key::set_fallback(&mut load_settings()?, matches!(state, Toggle::On))?;
        }
        Command::Periods => study::list_periods(&curriculum),
        Command::Resources {
            period,
            skill,
            format,
        } => study::list_resources(&ResourceFilter {
            period,
            skill,
            format,
        }),
        Command::Progress {
            complete,
            mastery,
            minutes,
        } => {
            let update = ProgressUpdate {
                complete,
                mastery,
                minutes,
            };
            study::progress(&mut open_store()?, &curriculum, update)?;
        }
        Command::ScoreDbq {
            thesis,
            context,
            evidence,
            analysis,
        } => {
            study::score_dbq(DbqScore {
                thesis,
                contextualization: context,
                evidence,
                analysis,
            });
        }
    }

    Ok(())
}

fn open_store() -> Result<FileStore> {
    FileStore::open_default().context("Failed to open the settings file")
}

fn load_settings() -> Result<Settings<FileStore>> {
    Settings::load(open_store()?).context("Failed to load settings")
}

fn gemini_client(endpoint: Option<&str>) -> Result<GeminiClient> {
    let client = match endpoint {
        Some(endpoint) => GeminiClient::with_endpoint(endpoint)?,
        None => GeminiClient::from_env()?,
    };
    Ok(client)
}

fn find_period(curriculum: &Curriculum, number: u8) -> Result<&Period> {
    curriculum
        .find(number)
        .ok_or_else(|| anyhow!("Unknown period {number}. Run `apush periods` to list them."))
}
