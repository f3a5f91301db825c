//! Tester Core: stage runner, stage logger and instrumented RESP clients
//!
//! A run is an ordered list of [`Stage`]s executed one after another against a
//! server under test. Each stage body runs on its own task, races the
//! configured timeout and receives a cancellation token that fires when the
//! stage is over. The first failure ends the run.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tester_core::{Executable, Stage, StageLogger, StageRunner};
//!
//! let stage = Stage::new("PING", StageLogger::new("[stage-1] ", false), |ctx| async move {
//!     let mut client = tester_core::instrumented::connect_to_executable(&ctx, "").await?;
//!     client.send_and_read("PING", &[]).await?;
//!     Ok(())
//! });
//!
//! let result = StageRunner::new(vec![stage], false)
//!     .run(Arc::new(Executable::new("127.0.0.1:6379")))
//!     .await;
//! assert!(result.is_success());
//! ```

pub mod config;
pub mod error;
pub mod executable;
pub mod instrumented;
pub mod logger;
pub mod result;
pub mod runner;
pub mod stage;

pub use config::{RunnerConfig, DEFAULT_STAGE_TIMEOUT};
pub use error::TesterError;
pub use executable::Executable;
pub use logger::{LogLevel, LogRecord, LogSink, MemorySink, StageLogger, TracingSink};
pub use result::{RunSummary, StageRunnerResult};
pub use runner::StageRunner;
pub use stage::{RunFn, Stage, StageContext, StageFuture};
