//! gitgenie - CLI entry point.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tracing::warn;
use tracing_subscriber::EnvFilter;

use gitgenie::commit::{
    CommitDriver, CommitOptions, HistoryPolicy, ImpactScorer, ImpactWeights, PushPolicy,
    preview_staged,
};
use gitgenie::config::{
    ApiFormat, AppConfig, CompletionConfig, CredentialProvider, DEFAULT_API_URL,
    DEFAULT_CHANGELOG, DEFAULT_DOCS_DIR, DEFAULT_MODEL, EnvCredentials, StaticCredentials,
};
use gitgenie::doc::{DocOptions, generate_doc};
use gitgenie::error::DriverError;
use gitgenie::git::{GitRepo, check_git_installed};
use gitgenie::interact::{AssumeYes, Prompter, TerminalPrompter};
use gitgenie::llm::HttpCompletionClient;
use gitgenie::record::{HttpRecordStore, RecordStore};

/// Write commit messages and change docs from your staged diff.
#[derive(Parser, Debug)]
#[command(name = "gitgenie")]
#[command(about = "Write commit messages and change docs from your staged diff")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Model identifier
    #[arg(long, global = true, env = "GITGENIE_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// API key (defaults to OPENROUTER_API_KEY or GITGENIE_API_KEY)
    #[arg(long, global = true)]
    api_key: Option<String>,

    /// Completion endpoint URL
    #[arg(long, global = true, env = "GITGENIE_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Wire format spoken by the endpoint
    #[arg(long, global = true, env = "GITGENIE_API_FORMAT", value_enum, default_value_t = ApiFormat::Chat)]
    api_format: ApiFormat,

    /// Show debug logs on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Preview an AI summary of the staged changes
    Test,
    /// Generate a commit message and commit
    #[command(visible_alias = "integrate")]
    Commit(CommitArgs),
    /// Generate a documentation page and add it to the changelog
    Doc(DocArgs),
}

#[derive(Args, Debug)]
struct CommitArgs {
    /// Stage all changes first (git add -A)
    #[arg(short, long)]
    add_all: bool,

    /// Show the message without committing
    #[arg(long, visible_alias = "showcase")]
    dry_run: bool,

    /// Commit even when nothing is staged
    #[arg(long)]
    allow_empty: bool,

    /// Ask before committing
    #[arg(long)]
    confirm: bool,

    /// Push without asking
    #[arg(long, conflicts_with = "no_push")]
    push: bool,

    /// Never push
    #[arg(long)]
    no_push: bool,

    /// Answer yes to every prompt
    #[arg(short, long)]
    yes: bool,

    /// Ask for a JSON reply with a rating and score the change's impact
    #[arg(long)]
    structured: bool,

    /// Record store base URL
    #[arg(long, env = "GITGENIE_RECORD_STORE")]
    record_store: Option<String>,

    /// Weight of the model rating in the impact score
    #[arg(long, env = "GITGENIE_MODEL_WEIGHT", default_value_t = 0.5)]
    model_weight: f64,

    /// Weight of the change-size heuristic in the impact score
    #[arg(long, env = "GITGENIE_HISTORY_WEIGHT", default_value_t = 0.5)]
    history_weight: f64,

    /// Scoring when fewer than 10 past commits exist
    #[arg(long, env = "GITGENIE_HISTORY_POLICY", value_enum, default_value_t = HistoryPolicy::ZeroFill)]
    history_policy: HistoryPolicy,
}

#[derive(Args, Debug)]
struct DocArgs {
    /// Page title (defaults to the first line of the generated page)
    #[arg(short, long)]
    title: Option<String>,

    /// Document `git diff <REV>` instead of the staged changes
    #[arg(long, value_name = "REV")]
    range: Option<String>,

    /// Print the page without writing it
    #[arg(long)]
    dry_run: bool,

    /// Directory for generated pages, relative to the repository root
    #[arg(long, env = "GITGENIE_DOCS_DIR", default_value = DEFAULT_DOCS_DIR)]
    docs_dir: PathBuf,

    /// Changelog index file, relative to the repository root
    #[arg(long, env = "GITGENIE_CHANGELOG", default_value = DEFAULT_CHANGELOG)]
    changelog: PathBuf,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e
                .downcast_ref::<DriverError>()
                .map(DriverError::exit_code)
                .unwrap_or(1);
            std::process::exit(code);
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    check_git_installed()?;

    let mut config = AppConfig {
        completion: CompletionConfig {
            api_url: cli.api_url,
            model: cli.model,
            format: cli.api_format,
        },
        ..AppConfig::default()
    };

    let credentials: Box<dyn CredentialProvider> = match cli.api_key {
        Some(key) => Box::new(StaticCredentials::new(key)),
        None => Box::new(EnvCredentials::default()),
    };

    match cli.command {
        Command::Test => {
            let client = HttpCompletionClient::new(config.completion, credentials.as_ref())?;
            let repo = GitRepo::current();

            match preview_staged(&repo, &client).await? {
                Some(summary) => {
                    println!("----- AI Summary -----");
                    println!("{summary}");
                    Ok(0)
                }
                None => Ok(1),
            }
        }
        Command::Commit(args) => {
            config.record_store = args.record_store.clone();
            config.weights = ImpactWeights::new(args.model_weight, args.history_weight)?;
            config.history_policy = args.history_policy;
            run_commit(args, config, credentials.as_ref()).await
        }
        Command::Doc(args) => {
            config.docs_dir = args.docs_dir;
            config.changelog_path = args.changelog;

            let client = HttpCompletionClient::new(config.completion, credentials.as_ref())?;
            let repo = GitRepo::current();
            let options = DocOptions {
                title: args.title,
                range: args.range,
                dry_run: args.dry_run,
                docs_dir: config.docs_dir,
                changelog_path: config.changelog_path,
            };

            let outcome = generate_doc(&repo, &client, &options, Local::now().naive_local())
                .await
                .context("Failed to generate documentation")?;
            Ok(outcome.exit_code())
        }
    }
}

async fn run_commit(
    args: CommitArgs,
    config: AppConfig,
    credentials: &dyn CredentialProvider,
) -> Result<i32> {
    let client = HttpCompletionClient::new(config.completion, credentials)?;
    let repo = GitRepo::current();

    let prompter: Box<dyn Prompter> = if args.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(TerminalPrompter)
    };

    let store = config
        .record_store
        .as_deref()
        .and_then(|conn| match HttpRecordStore::new(conn) {
            Ok(store) => Some(store),
            Err(e) => {
                warn!("Record store disabled: {e}");
                println!("[WARN] {e}. Commit records will not be saved.");
                None
            }
        });

    let push = if args.push {
        PushPolicy::Always
    } else if args.no_push {
        PushPolicy::Never
    } else {
        PushPolicy::Ask
    };

    let options = CommitOptions {
        add_all: args.add_all,
        dry_run: args.dry_run,
        allow_empty: args.allow_empty,
        confirm: args.confirm,
        push,
        structured: args.structured,
    };

    let mut driver = CommitDriver::new(&repo, &client, prompter.as_ref(), options)
        .with_scorer(ImpactScorer::new(config.weights, config.history_policy));
    if let Some(store) = &store {
        driver = driver.with_store(store as &dyn RecordStore);
    }

    let outcome = driver.run().await?;
    Ok(outcome.exit_code())
}
