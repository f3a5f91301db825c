//! Tester Stages: the conformance suite for Redis-compatible servers.
//!
//! Stages run in the order below; later stages rely on what earlier ones
//! check, so the runner stops at the first failure.
//!
//! ```text
//! bind → PING → ECHO → multiple clients → SET/GET → expiry
//! ```

mod assertions;
mod bind_to_port;
mod echo;
mod expiry;
mod get_set;
mod multiple_clients;
mod ping_pong;
mod words;

pub use assertions::{expect_bulk_string, expect_null_bulk_string, expect_simple_string};
pub use bind_to_port::bind_to_port;
pub use echo::echo;
pub use expiry::expiry;
pub use get_set::get_set;
pub use multiple_clients::multiple_clients;
pub use ping_pong::ping_pong;

use tester_core::{RunnerConfig, Stage, StageLogger, StageRunner};

fn logger(number: usize, is_debug: bool) -> StageLogger {
    StageLogger::new(format!("[stage-{}] ", number), is_debug)
}

/// Every stage, in suite order, with `[stage-N] ` loggers.
pub fn default_stages(is_debug: bool) -> Vec<Stage> {
    vec![
        Stage::new("Stage 1: Bind to a port", logger(1, is_debug), bind_to_port)
            .with_description("The server accepts TCP connections"),
        Stage::new("Stage 2: PING <-> PONG", logger(2, is_debug), ping_pong)
            .with_description("PING is answered with +PONG"),
        Stage::new("Stage 3: ECHO... O... O...", logger(3, is_debug), echo)
            .with_description("ECHO returns its argument as a bulk string"),
        Stage::new("Stage 4: Multiple Clients", logger(4, is_debug), multiple_clients)
            .with_description("Concurrent connections are served independently"),
        Stage::new("Stage 5: SET & GET", logger(5, is_debug), get_set)
            .with_description("A SET value is returned by GET"),
        Stage::new("Stage 6: Expiry!", logger(6, is_debug), expiry)
            .with_description("Keys set with PX expire"),
    ]
}

pub fn default_runner(config: RunnerConfig) -> StageRunner {
    let stages = default_stages(config.is_debug);
    StageRunner::with_config(stages, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suite_layout() {
        let runner = default_runner(RunnerConfig::default());
        let names: Vec<&str> = runner.stages().iter().map(Stage::name).collect();
        assert_eq!(names.len(), 6);
        assert_eq!(names[0], "Stage 1: Bind to a port");
        assert_eq!(names[5], "Stage 6: Expiry!");

        for (i, stage) in runner.stages().iter().enumerate() {
            assert_eq!(stage.logger().prefix(), format!("[stage-{}] ", i + 1));
            assert!(stage.description().is_some());
        }
    }

    #[test]
    fn test_debug_flag_reaches_loggers() {
        let runner = default_runner(RunnerConfig::default().debug(true));
        assert!(runner.stages().iter().all(|s| s.logger().is_debug()));
    }
}
