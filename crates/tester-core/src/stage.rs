//! Stage: a named, self-contained conformance test
use crate::error::TesterError;
use crate::executable::Executable;
use crate::logger::StageLogger;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

pub type StageFuture = Pin<Box<dyn Future<Output = Result<(), TesterError>> + Send>>;

/// Body of a stage. Called once per run on a spawned task.
pub type RunFn = Arc<dyn Fn(StageContext) -> StageFuture + Send + Sync>;

/// Everything a stage body receives.
///
/// The cancellation token fires when the stage times out or finishes;
/// clients opened through [`crate::instrumented`] observe it automatically.
#[derive(Debug, Clone)]
pub struct StageContext {
    executable: Arc<Executable>,
    logger: StageLogger,
    cancel: CancellationToken,
}

impl StageContext {
    pub fn new(executable: Arc<Executable>, logger: StageLogger, cancel: CancellationToken) -> Self {
        Self {
            executable,
            logger,
            cancel,
        }
    }

    pub fn executable(&self) -> &Executable {
        &self.executable
    }

    pub fn logger(&self) -> &StageLogger {
        &self.logger
    }

    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Sleeps for `duration` unless the stage is cancelled first.
    pub async fn sleep(&self, duration: std::time::Duration) -> Result<(), TesterError> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(resp_wire::RespError::Cancelled.into()),
            _ = tokio::time::sleep(duration) => Ok(()),
        }
    }
}

#[derive(Clone)]
pub struct Stage {
    name: String,
    description: Option<String>,
    logger: StageLogger,
    run: RunFn,
}

impl Stage {
    pub fn new<F, Fut>(name: impl Into<String>, logger: StageLogger, run: F) -> Self
    where
        F: Fn(StageContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<(), TesterError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            logger,
            run: Arc::new(move |ctx: StageContext| -> StageFuture { Box::pin(run(ctx)) }),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn logger(&self) -> &StageLogger {
        &self.logger
    }

    pub(crate) fn start(&self, ctx: StageContext) -> StageFuture {
        (self.run)(ctx)
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stage")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("logger", &self.logger)
            .finish_non_exhaustive()
    }
}
