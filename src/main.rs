// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use fixture_mirror::utils::logging::{format_error, format_success};
use fixture_mirror::{
    Committer, Config, RepositoryRegistry, SuggestionSubmitter, SyncOrchestrator, TestSuggestion,
};
use futures::stream::{self, StreamExt};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "fixture_mirror")]
#[command(version = "0.1.0")]
#[command(about = "Mirror remote repositories and publish test-fixture snapshots", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the repositories in the registry
    List,

    /// Refresh one repository (provider/owner/name) or all of them
    Refresh {
        /// Repository id, e.g. github/acme/widgets
        repository: Option<String>,

        #[arg(long, conflicts_with = "repository")]
        all: bool,

        #[arg(long, value_name = "NUM", default_value_t = 4)]
        parallel: usize,
    },

    /// Print the published fixture snapshot for a repository
    Tests {
        /// Repository id, e.g. github/acme/widgets
        repository: String,
    },

    /// Submit a test suggestion as a pull request
    Suggest {
        #[arg(long)]
        title: String,

        #[arg(long)]
        description: String,

        /// File holding the suggested test content
        #[arg(long, value_name = "FILE")]
        state_file: PathBuf,

        #[arg(long, requires = "committer_email")]
        committer_name: Option<String>,

        #[arg(long, requires = "committer_name")]
        committer_email: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    fixture_mirror::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        Config::load(None).unwrap_or_else(|e| {
            warn!("Falling back to built-in defaults: {}", e);
            Config::default_config()
        })
    };

    match cli.command {
        Commands::List => {
            cmd_list(&config);
        }
        Commands::Refresh {
            repository,
            all,
            parallel,
        } => {
            cmd_refresh(&config, repository, all, parallel).await?;
        }
        Commands::Tests { repository } => {
            cmd_tests(&config, &repository).await?;
        }
        Commands::Suggest {
            title,
            description,
            state_file,
            committer_name,
            committer_email,
        } => {
            cmd_suggest(
                &config,
                title,
                description,
                state_file,
                committer_name,
                committer_email,
            )
            .await?;
        }
    }

    Ok(())
}

fn build_orchestrator(config: &Config) -> SyncOrchestrator {
    let registry = Arc::new(RepositoryRegistry::new(
        config.registry.repositories.clone(),
    ));
    SyncOrchestrator::new(config.storage.root.clone(), registry)
}

fn cmd_list(config: &Config) {
    if config.registry.repositories.is_empty() {
        println!("No repositories registered");
        return;
    }

    for descriptor in &config.registry.repositories {
        println!(
            "{}  ->  {} ({} / {})",
            descriptor.id(),
            descriptor.remote_url(),
            descriptor.tracked_reference(),
            descriptor.fixture_folder()
        );
    }
}

async fn cmd_refresh(
    config: &Config,
    repository: Option<String>,
    all: bool,
    parallel: usize,
) -> Result<()> {
    let orchestrator = Arc::new(build_orchestrator(config));

    if let Some(id) = repository {
        let outcome = orchestrator
            .refresh_by_id(&id)
            .await
            .with_context(|| format!("Refresh of {} failed", id))?;

        println!(
            "{}",
            serde_json::to_string_pretty(&serde_json::json!({
                "refresh": outcome.duration_ms,
                "repository": outcome.repository,
            }))?
        );
        return Ok(());
    }

    if !all {
        anyhow::bail!("pass a repository id or --all");
    }

    if orchestrator.registry().is_empty() {
        warn!("Registry is empty, nothing to refresh");
        return Ok(());
    }

    let descriptors: Vec<_> = orchestrator.registry().iter().cloned().collect();
    info!(
        "Refreshing {} repositories with {} in flight",
        descriptors.len(),
        parallel.max(1)
    );

    let results: Vec<_> = stream::iter(descriptors.into_iter().map(|descriptor| {
        let orchestrator = Arc::clone(&orchestrator);
        async move {
            let result = orchestrator.refresh(&descriptor).await;
            (descriptor, result)
        }
    }))
    .buffer_unordered(parallel.max(1))
    .collect()
    .await;

    let mut failures = 0;
    for (descriptor, result) in results {
        match result {
            Ok(outcome) => println!(
                "{}",
                format_success(&format!(
                    "{} refreshed in {} ms",
                    descriptor.id(),
                    outcome.duration_ms
                ))
            ),
            Err(e) => {
                failures += 1;
                println!("{}", format_error(&format!("{}: {}", descriptor.id(), e)));
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} repositories failed to refresh", failures);
    }
    Ok(())
}

async fn cmd_tests(config: &Config, repository: &str) -> Result<()> {
    let orchestrator = build_orchestrator(config);

    let descriptor = orchestrator
        .registry()
        .find_by_id(repository)
        .cloned()
        .with_context(|| format!("Repository {} is not tracked", repository))?;

    let bytes = orchestrator
        .read_snapshot(&descriptor)
        .await
        .with_context(|| format!("No snapshot available for {}", repository))?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&bytes)?;
    stdout.write_all(b"\n")?;
    Ok(())
}

async fn cmd_suggest(
    config: &Config,
    title: String,
    description: String,
    state_file: PathBuf,
    committer_name: Option<String>,
    committer_email: Option<String>,
) -> Result<()> {
    let state = std::fs::read_to_string(&state_file)
        .with_context(|| format!("Failed to read {}", state_file.display()))?;

    let suggestion = TestSuggestion {
        title,
        description,
        state,
    };

    let committer = match (committer_name, committer_email) {
        (Some(name), Some(email)) => Some(Committer { name, email }),
        _ => None,
    };

    let submitter =
        SuggestionSubmitter::new(config.github.clone()).context("GitHub client setup failed")?;

    let pull_request = submitter
        .submit(&suggestion, committer.as_ref())
        .await
        .context("Suggestion submission failed")?;

    println!("{}", serde_json::to_string_pretty(&pull_request)?);
    println!(
        "{}",
        format_success(&format!("Opened pull request #{}", pull_request.number))
    );
    Ok(())
}
