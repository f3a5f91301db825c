//! redis-tester: runs the conformance suite against a running server.
//!
//! ```bash
//! redis-tester --addr 127.0.0.1:6379
//! redis-tester --stage 3 --debug
//! redis-tester --randomize --seed 7 --format json
//! ```
//!
//! Exit codes: 0 when every selected stage passed, 1 otherwise, 2 on usage or
//! configuration errors.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tester_core::{Executable, RunnerConfig, StageRunner, StageRunnerResult};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "redis-tester")]
#[command(about = "Conformance tests for Redis-compatible servers")]
struct Args {
    /// Address of the server under test
    #[arg(long, env = "REDIS_TESTER_ADDR", default_value = "127.0.0.1:6379")]
    addr: String,

    /// Run stages 1..=N only
    #[arg(long, value_name = "N")]
    stage: Option<usize>,

    /// Shuffle the selected stages
    #[arg(long)]
    randomize: bool,

    /// Seed for --randomize (defaults to the clock)
    #[arg(long, requires = "randomize")]
    seed: Option<u64>,

    /// Log raw bytes and decoded values
    #[arg(long)]
    debug: bool,

    /// Per-stage timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Output format for the final summary
    #[arg(long, value_enum, default_value = "text")]
    format: Format,
}

fn init_tracing(is_debug: bool) {
    let default = if is_debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .try_init();
}

fn build_config(args: &Args) -> Result<RunnerConfig> {
    let mut config = RunnerConfig::from_env().context("reading REDIS_TESTER_* environment")?;
    if args.debug {
        config.is_debug = true;
    }
    if let Some(ms) = args.timeout_ms {
        if ms == 0 {
            bail!("--timeout-ms must be greater than zero");
        }
        config.stage_timeout = Duration::from_millis(ms);
    }
    Ok(config)
}

fn build_runner(args: &Args, config: RunnerConfig) -> Result<StageRunner> {
    let mut runner = tester_stages::default_runner(config);
    if let Some(n) = args.stage {
        if n == 0 {
            bail!("--stage must be at least 1");
        }
        runner = runner.truncated(n - 1);
    }
    if args.randomize {
        runner = match args.seed {
            Some(seed) => runner.randomized_with_seed(seed),
            None => runner.randomized(),
        };
    }
    Ok(runner)
}

fn report(result: &StageRunnerResult, format: Format) -> Result<()> {
    match format {
        Format::Json => println!("{}", result.summary().to_json()?),
        Format::Text if result.is_success() => {
            tracing::info!("All tests passed.");
        }
        Format::Text => {
            let stage = result.last_stage_name().unwrap_or("unknown stage");
            tracing::error!("Failed at {}", stage);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let config = match build_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("error: {:#}", err);
            return ExitCode::from(2);
        }
    };
    init_tracing(config.is_debug);

    let runner = match build_runner(&args, config) {
        Ok(runner) => runner,
        Err(err) => {
            eprintln!("error: {:#}", err);
            return ExitCode::from(2);
        }
    };

    let executable = Arc::new(Executable::new(args.addr.clone()));
    tracing::debug!(addr = %args.addr, stages = runner.len(), "starting run");
    let result = runner.run(executable).await;

    if let Err(err) = report(&result, args.format) {
        eprintln!("error: {:#}", err);
        return ExitCode::from(2);
    }

    if result.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("redis-tester").chain(argv.iter().copied())).unwrap()
    }

    #[test]
    fn test_stage_flag_truncates() {
        let args = parse(&["--stage", "2"]);
        let runner = build_runner(&args, RunnerConfig::default()).unwrap();
        assert_eq!(runner.len(), 2);
        assert_eq!(runner.stages()[1].name(), "Stage 2: PING <-> PONG");
    }

    #[test]
    fn test_stage_zero_is_rejected() {
        let args = parse(&["--stage", "0"]);
        assert!(build_runner(&args, RunnerConfig::default()).is_err());
    }

    #[test]
    fn test_seeded_randomize_is_repeatable() {
        let args = parse(&["--randomize", "--seed", "11"]);
        let a = build_runner(&args, RunnerConfig::default()).unwrap();
        let b = build_runner(&args, RunnerConfig::default()).unwrap();
        let names = |r: &StageRunner| r.stages().iter().map(|s| s.name().to_string()).collect::<Vec<_>>();
        assert_eq!(names(&a), names(&b));
        assert_eq!(a.len(), 6);
    }

    #[test]
    fn test_old_up_to_flag_is_gone() {
        let argv = ["redis-tester", "--up-to", "2"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_seed_requires_randomize() {
        let argv = ["redis-tester", "--seed", "3"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_flags_override_config() {
        let args = parse(&["--debug", "--timeout-ms", "750"]);
        let config = build_config(&args).unwrap();
        assert!(config.is_debug);
        assert_eq!(config.stage_timeout, Duration::from_millis(750));
    }
}
