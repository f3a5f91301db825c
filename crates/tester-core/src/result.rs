//! Outcome of a `StageRunner::run`
use crate::error::TesterError;
use crate::logger::StageLogger;
use serde::{Deserialize, Serialize};

#[derive(Debug)]
pub struct StageRunnerResult {
    last_stage_index: Option<usize>,
    last_stage_name: Option<String>,
    error: Option<TesterError>,
    logger: Option<StageLogger>,
}

impl StageRunnerResult {
    pub(crate) fn passed(last_stage_index: Option<usize>, last_stage_name: Option<String>) -> Self {
        Self {
            last_stage_index,
            last_stage_name,
            error: None,
            logger: None,
        }
    }

    pub(crate) fn failed(index: usize, name: String, error: TesterError, logger: StageLogger) -> Self {
        Self {
            last_stage_index: Some(index),
            last_stage_name: Some(name),
            error: Some(error),
            logger: Some(logger),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }

    /// Index of the last stage attempted; `None` only for an empty runner.
    pub fn last_stage_index(&self) -> Option<usize> {
        self.last_stage_index
    }

    pub fn last_stage_name(&self) -> Option<&str> {
        self.last_stage_name.as_deref()
    }

    pub fn error(&self) -> Option<&TesterError> {
        self.error.as_ref()
    }

    /// Logger of the failing stage.
    pub fn logger(&self) -> Option<&StageLogger> {
        self.logger.as_ref()
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            passed: self.is_success(),
            last_stage_index: self.last_stage_index,
            last_stage_name: self.last_stage_name.clone(),
            error: self.error.as_ref().map(ToString::to_string),
        }
    }
}

/// Serializable view of a run, for machine-readable output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSummary {
    pub passed: bool,
    pub last_stage_index: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_stage_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RunSummary {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_success_iff_no_error() {
        let ok = StageRunnerResult::passed(Some(2), Some("Stage 3".into()));
        assert!(ok.is_success());
        assert!(ok.logger().is_none());

        let failed = StageRunnerResult::failed(
            1,
            "Stage 2".into(),
            TesterError::StageTimedOut(Duration::from_secs(5)),
            StageLogger::new("[stage-2] ", false),
        );
        assert!(!failed.is_success());
        assert_eq!(failed.last_stage_index(), Some(1));
        assert_eq!(failed.logger().map(StageLogger::prefix), Some("[stage-2] "));
    }

    #[test]
    fn test_summary_json() {
        let failed = StageRunnerResult::failed(
            0,
            "Stage 1: Bind to a port".into(),
            TesterError::assertion("Expected \"PONG\", got \"PING\""),
            StageLogger::new("", false),
        );
        let json: serde_json::Value = serde_json::from_str(&failed.summary().to_json().unwrap()).unwrap();
        assert_eq!(json["passed"], false);
        assert_eq!(json["last_stage_index"], 0);
        assert_eq!(json["error"], "Expected \"PONG\", got \"PING\"");

        let ok = StageRunnerResult::passed(Some(5), None).summary();
        assert_eq!(ok.to_json().unwrap(), r#"{"passed":true,"last_stage_index":5}"#);
    }
}
