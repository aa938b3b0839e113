//! CLI entry point for the ConfOps harness.
//!
//! Provides two subcommands:
//! - `run`: execute the full profile-parameter lifecycle suite against the
//!   bundled in-memory session (the real API transport is an external
//!   collaborator, so the binary self-tests the orchestration).
//! - `validate`: parse a fixture file and report its record counts.
//!
//! # Usage
//!
//! ```bash
//! confops-harness run --fixtures testdata/fixtures.json
//! confops-harness run --concurrent
//! confops-harness validate
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use confops_harness::config::HarnessConfig;
use confops_harness::fixtures::FixtureSet;
use confops_harness::logging;
use confops_harness::mock::{InMemorySession, MockSessionConfig};
use confops_harness::orchestrator::{DeleteMode, LifecycleSuite};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "confops-harness")]
#[command(about = "Profile-parameter lifecycle harness for the ConfOps API", long_about = None)]
struct Cli {
    /// Path to the harness configuration file
    #[arg(long, default_value = "config/harness.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the lifecycle suite against the bundled in-memory session
    Run {
        /// Fixture JSON file (overrides run.fixtures from the config)
        #[arg(long)]
        fixtures: Option<PathBuf>,

        /// Use the concurrent fan-out delete phase
        #[arg(long)]
        concurrent: bool,
    },

    /// Parse a fixture file and report its record counts
    Validate {
        /// Fixture JSON file (overrides run.fixtures from the config)
        #[arg(long)]
        fixtures: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = HarnessConfig::load_from(&cli.config)
        .with_context(|| format!("loading config from {}", cli.config.display()))?;
    config.validate().map_err(anyhow::Error::msg)?;
    logging::init(&config.application.log_level)?;

    match cli.command {
        Commands::Run {
            fixtures,
            concurrent,
        } => run_suite(config, fixtures, concurrent).await,
        Commands::Validate { fixtures } => validate_fixtures(config, fixtures),
    }
}

fn load_fixtures(config: &HarnessConfig, fixtures_override: Option<PathBuf>) -> Result<FixtureSet> {
    let path = fixtures_override.unwrap_or_else(|| config.run.fixtures.clone());
    let fixtures =
        FixtureSet::load(&path).with_context(|| format!("loading fixtures from {}", path.display()))?;
    Ok(fixtures)
}

async fn run_suite(
    config: HarnessConfig,
    fixtures_override: Option<PathBuf>,
    concurrent: bool,
) -> Result<()> {
    let fixtures = load_fixtures(&config, fixtures_override)?;
    fixtures.validate().map_err(anyhow::Error::msg)?;

    let session = Arc::new(InMemorySession::with_config(MockSessionConfig {
        communication_delay_ms: config.mock.communication_delay_ms,
        ..MockSessionConfig::default()
    }));
    let mode = if concurrent || config.run.concurrent_delete {
        DeleteMode::Concurrent
    } else {
        DeleteMode::Sequential
    };

    let suite = LifecycleSuite::new(session, fixtures);
    let report = suite.run(mode).await;

    for failure in report.failures() {
        println!("FAIL {failure}");
    }
    if !report.passed() {
        bail!("{} failure(s) recorded", report.len());
    }
    println!("ok: lifecycle suite passed ({mode:?} delete)");
    Ok(())
}

fn validate_fixtures(config: HarnessConfig, fixtures_override: Option<PathBuf>) -> Result<()> {
    let fixtures = load_fixtures(&config, fixtures_override)?;

    println!("cdns:              {}", fixtures.cdns.len());
    println!("types:             {}", fixtures.types.len());
    println!("parameters:        {}", fixtures.parameters.len());
    println!("profiles:          {}", fixtures.profiles.len());
    println!("profileParameters: {}", fixtures.profile_parameters.len());

    fixtures.validate().map_err(anyhow::Error::msg)?;
    println!("ok: fixture set is usable");
    Ok(())
}
