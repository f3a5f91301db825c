//! Unified Error Model
use resp_wire::RespError;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TesterError {
    #[error("timed out, test exceeded {0:?}")]
    StageTimedOut(Duration),

    #[error("{0}")]
    Assertion(String),

    #[error(transparent)]
    Resp(#[from] RespError),

    #[error("stage panicked: {0}")]
    Panicked(String),

    #[error("stage task aborted: {0}")]
    Aborted(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl TesterError {
    pub fn assertion(msg: impl Into<String>) -> Self {
        Self::Assertion(msg.into())
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::StageTimedOut(_))
    }
}
