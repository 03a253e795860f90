//! Acceptance suite entry point
//!
//! This file is the test binary that runs the YAML scenario catalog against a
//! live bookstore API.
//! Run with: cargo test --package bookstore-e2e --test e2e -- --base-url http://localhost:5000

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bookstore_e2e::config::BASE_URL_ENV;
use bookstore_e2e::runner::SuiteResult;
use bookstore_e2e::{E2eResult, HarnessConfig, ScenarioRunner};

#[derive(Parser, Debug)]
#[command(name = "bookstore-e2e")]
#[command(about = "Acceptance scenarios for the bookstore REST API")]
struct Args {
    /// Directory holding the YAML feature files
    #[arg(short, long)]
    scenarios: Option<PathBuf>,

    /// Run only scenarios carrying this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only the scenario with this name
    #[arg(short, long)]
    name: Option<String>,

    /// Root URL of the API (overrides config file and BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// TOML configuration file
    #[arg(short, long, default_value = "e2e.toml")]
    config: PathBuf,

    /// Scenarios allowed to run at the same time
    #[arg(short, long)]
    parallel: Option<usize>,

    /// Output directory for results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Log request and response bodies
    #[arg(long)]
    debug: bool,

    /// Accepted and ignored: cargo's test runner passes these through
    #[arg(long, hide = true)]
    nocapture: bool,
}

fn main() {
    let args = Args::parse();

    let default_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("Error: failed to create tokio runtime: {}", e);
            std::process::exit(2);
        }
    };

    match rt.block_on(async_main(args)) {
        Ok(true) => std::process::exit(0),
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

fn load_config(args: &Args) -> E2eResult<HarnessConfig> {
    let mut config = HarnessConfig::load(&args.config)?.with_env_overrides();

    if let Some(base_url) = &args.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(scenarios) = &args.scenarios {
        config.scenarios_dir = scenarios.clone();
    }
    if let Some(parallel) = args.parallel {
        config.parallelism = parallel;
    }
    if let Some(output) = &args.output {
        config.output_dir = output.clone();
    }

    config.validate()?;
    Ok(config)
}

/// A bare `cargo test` must not reach the public demo API: the suite runs
/// only when a target is given explicitly.
fn target_configured(args: &Args) -> bool {
    args.base_url.is_some() || std::env::var_os(BASE_URL_ENV).is_some() || args.config.exists()
}

async fn async_main(args: Args) -> E2eResult<bool> {
    if !target_configured(&args) {
        info!(
            "No bookstore API configured; set {} or pass --base-url to run the acceptance suite",
            BASE_URL_ENV
        );
        return Ok(true);
    }

    let config = load_config(&args)?;
    let runner = ScenarioRunner::connect(config)?;

    let results = if let Some(name) = &args.name {
        let result = runner.run_named(name).await?;
        let duration_ms = result.duration_ms;
        SuiteResult::from_results(vec![result], duration_ms)
    } else if let Some(tag) = &args.tag {
        runner.run_tagged(tag).await?
    } else {
        runner.run_all().await?
    };

    runner.write_results(&results)?;
    runner.write_environment()?;

    Ok(results.all_passed())
}
