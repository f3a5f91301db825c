//! Stage Runner: executes stages in order, one at a time, each under a timeout
use crate::config::RunnerConfig;
use crate::error::TesterError;
use crate::executable::Executable;
use crate::logger::StageLogger;
use crate::result::StageRunnerResult;
use crate::stage::{Stage, StageContext};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::any::Any;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Default)]
pub struct StageRunner {
    stages: Vec<Stage>,
    config: RunnerConfig,
}

impl StageRunner {
    pub fn new(stages: Vec<Stage>, is_debug: bool) -> Self {
        Self::with_config(stages, RunnerConfig::default().debug(is_debug))
    }

    pub fn with_config(stages: Vec<Stage>, config: RunnerConfig) -> Self {
        Self { stages, config }
    }

    /// Appends `stage` after the existing ones.
    pub fn push(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn config(&self) -> &RunnerConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stages `0..=stage_index`, clamped to the last stage.
    pub fn truncated(&self, stage_index: usize) -> Self {
        let end = stage_index.saturating_add(1).min(self.stages.len());
        Self {
            stages: self.stages[..end].to_vec(),
            config: self.config.clone(),
        }
    }

    /// Same stages in a random order, seeded from the wall clock.
    pub fn randomized(&self) -> Self {
        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or_default();
        self.randomized_with_seed(seed)
    }

    pub fn randomized_with_seed(&self, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut stages = self.stages.clone();
        stages.shuffle(&mut rng);
        Self {
            stages,
            config: self.config.clone(),
        }
    }

    /// Runs every stage against `executable`, stopping at the first failure.
    pub async fn run(&self, executable: Arc<Executable>) -> StageRunnerResult {
        for (index, stage) in self.stages.iter().enumerate() {
            let logger = stage.logger().clone();
            logger.info(format_args!("Running test: {}", stage.name()));

            if let Err(err) = self.run_stage(stage, executable.clone()).await {
                report_test_error(&err, self.config.is_debug, &logger);
                return StageRunnerResult::failed(index, stage.name().to_string(), err, logger);
            }

            logger.success("Test passed.");
        }

        StageRunnerResult::passed(
            self.stages.len().checked_sub(1),
            self.stages.last().map(|s| s.name().to_string()),
        )
    }

    async fn run_stage(&self, stage: &Stage, executable: Arc<Executable>) -> Result<(), TesterError> {
        let cancel = CancellationToken::new();
        let ctx = StageContext::new(executable, stage.logger().clone(), cancel.clone());
        let timeout = self.config.stage_timeout;

        let mut handle = tokio::spawn(stage.start(ctx));
        let outcome = match tokio::time::timeout(timeout, &mut handle).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_err)) => Err(join_error(join_err)),
            Err(_) => {
                tracing::debug!(stage = stage.name(), ?timeout, "stage timed out; cancelling");
                handle.abort();
                Err(TesterError::StageTimedOut(timeout))
            }
        };

        // Releases sockets and helper tasks still parked on the token.
        cancel.cancel();
        outcome
    }
}

fn join_error(err: JoinError) -> TesterError {
    if err.is_panic() {
        TesterError::Panicked(panic_message(err.into_panic()))
    } else {
        TesterError::Aborted(err.to_string())
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

fn report_test_error(err: &TesterError, is_debug: bool, logger: &StageLogger) {
    logger.error(err);
    if is_debug {
        logger.error("Test failed");
    } else {
        logger.error("Test failed (try running with --debug or REDIS_TESTER_DEBUG=true to see more details)");
    }
}
