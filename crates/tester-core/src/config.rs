//! Runner configuration
use crate::error::TesterError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Time a single stage may run before it is reported as timed out.
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(5);

pub const ENV_DEBUG: &str = "REDIS_TESTER_DEBUG";
pub const ENV_STAGE_TIMEOUT_MS: &str = "REDIS_TESTER_STAGE_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunnerConfig {
    #[serde(rename = "stage_timeout_ms", with = "millis")]
    pub stage_timeout: Duration,
    pub is_debug: bool,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            stage_timeout: DEFAULT_STAGE_TIMEOUT,
            is_debug: false,
        }
    }
}

impl RunnerConfig {
    pub fn debug(mut self, is_debug: bool) -> Self {
        self.is_debug = is_debug;
        self
    }

    pub fn stage_timeout(mut self, timeout: Duration) -> Self {
        self.stage_timeout = timeout;
        self
    }

    /// Defaults overridden by `REDIS_TESTER_*` environment variables.
    pub fn from_env() -> Result<Self, TesterError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, TesterError> {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_DEBUG) {
            config.is_debug = parse_bool(&raw)
                .ok_or_else(|| TesterError::Config(format!("{}={:?} is not a boolean", ENV_DEBUG, raw)))?;
        }

        if let Some(raw) = lookup(ENV_STAGE_TIMEOUT_MS) {
            let ms: u64 = raw.trim().parse().map_err(|_| {
                TesterError::Config(format!("{}={:?} is not a number of milliseconds", ENV_STAGE_TIMEOUT_MS, raw))
            })?;
            if ms == 0 {
                return Err(TesterError::Config(format!("{} must be greater than zero", ENV_STAGE_TIMEOUT_MS)));
            }
            config.stage_timeout = Duration::from_millis(ms);
        }

        Ok(config)
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
