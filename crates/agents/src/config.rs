//! Agent configuration loaded from the environment.

use crate::error::ConfigError;
use std::time::Duration;

pub const GROQ_API_KEY: &str = "GROQ_API_KEY";
pub const GROQ_MODEL_NAME: &str = "GROQ_MODEL_NAME";
pub const GROQ_API_URL: &str = "GROQ_API_URL";
pub const GROQ_TIMEOUT_SECS: &str = "GROQ_TIMEOUT_SECS";
pub const PEXELS_API_KEY: &str = "PEXELS_API_KEY";
pub const PEXELS_API_URL: &str = "PEXELS_API_URL";
pub const PEXELS_TIMEOUT_SECS: &str = "PEXELS_TIMEOUT_SECS";
pub const PEXELS_DOWNLOAD_TIMEOUT_SECS: &str = "PEXELS_DOWNLOAD_TIMEOUT_SECS";

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
pub const DEFAULT_GROQ_API_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_PEXELS_API_URL: &str = "https://api.pexels.com/v1";

const DEFAULT_GENERATION_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_IMAGE_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Bounded retry schedule for image downloads.
///
/// After failed attempt `k` (1-based) the caller waits `k * backoff_step`,
/// the last attempt included.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_step: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_step: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_step: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_step,
        }
    }

    /// Delay after `failed_attempt`, or `None` outside `1..=max_attempts`.
    pub fn backoff(&self, failed_attempt: u32) -> Option<Duration> {
        (1..=self.max_attempts)
            .contains(&failed_attempt)
            .then(|| self.backoff_step * failed_attempt)
    }

    /// Time spent sleeping when every attempt fails.
    pub fn total_backoff(&self) -> Duration {
        (1..=self.max_attempts).map(|k| self.backoff_step * k).sum()
    }
}

/// Configuration shared by the generation and image clients.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Required for generation only; rendering a saved draft works without it.
    pub groq_api_key: Option<String>,
    pub model: String,
    pub groq_api_url: String,
    pub generation_timeout: Duration,
    /// Images are disabled when absent.
    pub pexels_api_key: Option<String>,
    pub pexels_api_url: String,
    /// Search requests.
    pub image_timeout: Duration,
    /// Each photo download attempt.
    pub download_timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            groq_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            groq_api_url: DEFAULT_GROQ_API_URL.to_string(),
            generation_timeout: DEFAULT_GENERATION_TIMEOUT,
            pexels_api_key: None,
            pexels_api_url: DEFAULT_PEXELS_API_URL.to_string(),
            image_timeout: DEFAULT_IMAGE_TIMEOUT,
            download_timeout: DEFAULT_DOWNLOAD_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }
}

impl AgentConfig {
    /// Load from the process environment, reading `.env` first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let config = Self {
            groq_api_key: get(GROQ_API_KEY),
            model: get(GROQ_MODEL_NAME).unwrap_or(defaults.model),
            groq_api_url: get(GROQ_API_URL)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.groq_api_url),
            generation_timeout: parse_secs(GROQ_TIMEOUT_SECS, get(GROQ_TIMEOUT_SECS))?
                .unwrap_or(defaults.generation_timeout),
            pexels_api_key: get(PEXELS_API_KEY),
            pexels_api_url: get(PEXELS_API_URL)
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.pexels_api_url),
            image_timeout: parse_secs(PEXELS_TIMEOUT_SECS, get(PEXELS_TIMEOUT_SECS))?
                .unwrap_or(defaults.image_timeout),
            download_timeout: parse_secs(
                PEXELS_DOWNLOAD_TIMEOUT_SECS,
                get(PEXELS_DOWNLOAD_TIMEOUT_SECS),
            )?
            .unwrap_or(defaults.download_timeout),
            retry: defaults.retry,
        };

        if config.pexels_api_key.is_none() {
            log::info!("{} not set; slides will be rendered without images", PEXELS_API_KEY);
        }

        Ok(config)
    }

    /// The generation API key, or a typed error naming the missing variable.
    pub fn require_groq_key(&self) -> Result<&str, ConfigError> {
        self.groq_api_key
            .as_deref()
            .ok_or(ConfigError::Missing(GROQ_API_KEY))
    }

    pub fn images_enabled(&self) -> bool {
        self.pexels_api_key.is_some()
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

fn parse_secs(key: &'static str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    value
        .map(|v| {
            v.parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| ConfigError::Invalid {
                    key,
                    value: v.clone(),
                    reason: e.to_string(),
                })
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AgentConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.groq_api_url, DEFAULT_GROQ_API_URL);
        assert_eq!(config.pexels_api_url, DEFAULT_PEXELS_API_URL);
        assert_eq!(config.image_timeout, Duration::from_secs(10));
        assert_eq!(config.download_timeout, Duration::from_secs(30));
        assert!(!config.images_enabled());
        assert!(matches!(
            config.require_groq_key(),
            Err(ConfigError::Missing("GROQ_API_KEY"))
        ));
    }

    #[test]
    fn test_overrides() {
        let config = AgentConfig::from_lookup(lookup(&[
            (GROQ_API_KEY, "gsk_test"),
            (GROQ_MODEL_NAME, "mixtral"),
            (GROQ_API_URL, "http://localhost:9000/v1/"),
            (PEXELS_API_KEY, "px"),
            (PEXELS_TIMEOUT_SECS, "3"),
            (PEXELS_DOWNLOAD_TIMEOUT_SECS, "45"),
        ]))
        .unwrap();

        assert_eq!(config.require_groq_key().unwrap(), "gsk_test");
        assert_eq!(config.model, "mixtral");
        assert_eq!(config.groq_api_url, "http://localhost:9000/v1");
        assert!(config.images_enabled());
        assert_eq!(config.image_timeout, Duration::from_secs(3));
        assert_eq!(config.download_timeout, Duration::from_secs(45));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let config =
            AgentConfig::from_lookup(lookup(&[(GROQ_API_KEY, "  "), (GROQ_MODEL_NAME, "")]))
                .unwrap();
        assert!(config.groq_api_key.is_none());
        assert_eq!(config.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_invalid_timeout() {
        let err = AgentConfig::from_lookup(lookup(&[(GROQ_TIMEOUT_SECS, "soon")])).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "GROQ_TIMEOUT_SECS", .. }
        ));
    }

    #[test]
    fn test_invalid_download_timeout() {
        let err = AgentConfig::from_lookup(lookup(&[(PEXELS_DOWNLOAD_TIMEOUT_SECS, "-1")]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { key: "PEXELS_DOWNLOAD_TIMEOUT_SECS", .. }
        ));
    }

    #[test]
    fn test_retry_schedule_is_linear() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.backoff(1), Some(Duration::from_secs(1)));
        assert_eq!(policy.backoff(2), Some(Duration::from_secs(2)));
        assert_eq!(policy.backoff(3), Some(Duration::from_secs(3)));
        assert_eq!(policy.backoff(4), None);
        assert_eq!(policy.backoff(0), None);
        assert_eq!(policy.total_backoff(), Duration::from_secs(6));
    }

    #[test]
    fn test_retry_policy_needs_one_attempt() {
        let policy = RetryPolicy::new(0, Duration::from_secs(5));
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.backoff(1), Some(Duration::from_secs(5)));
        assert_eq!(policy.backoff(2), None);
        assert_eq!(policy.total_backoff(), Duration::from_secs(5));
    }
}
