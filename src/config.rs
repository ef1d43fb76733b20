//! Configuration loaded once from the environment at startup.

use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::grammar::DEFAULT_MAX_SUBJECT_LEN;
use crate::i18n::Language;
use crate::prompt::DEFAULT_DIFF_BUDGET;

pub const API_KEY_ENV_VAR: &str = "COMMITSMITH_API_KEY";
/// Checked in order when the primary key variable is unset.
pub const FALLBACK_API_KEY_ENV_VARS: [&str; 2] = ["OPENROUTER_API_KEY", "QWEN_API_KEY"];
pub const BASE_URL_ENV_VAR: &str = "COMMITSMITH_BASE_URL";
pub const MODEL_ENV_VAR: &str = "COMMITSMITH_MODEL";
pub const LANG_ENV_VAR: &str = "COMMITSMITH_LANG";
pub const MAX_SUBJECT_LEN_ENV_VAR: &str = "COMMITSMITH_MAX_SUBJECT_LEN";
pub const DIFF_BUDGET_ENV_VAR: &str = "COMMITSMITH_DIFF_BUDGET";
pub const TIMEOUT_ENV_VAR: &str = "COMMITSMITH_AI_TIMEOUT";
pub const MAX_TOKENS_ENV_VAR: &str = "COMMITSMITH_MAX_TOKENS";
pub const TEMPERATURE_ENV_VAR: &str = "COMMITSMITH_TEMPERATURE";
pub const HISTORY_FILE_ENV_VAR: &str = "COMMITSMITH_HISTORY_FILE";

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "qwen/qwen2.5-vl-72b-instruct:free";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_TOKENS: u32 = 300;
pub const DEFAULT_TEMPERATURE: f32 = 0.5;

/// Settings for the chat-completions endpoint.
#[derive(Clone, PartialEq)]
pub struct AiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Bounds the whole request, retries included.
    pub timeout: Duration,
}

impl AiSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl fmt::Debug for AiSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Everything the binary needs, built once and passed down explicitly.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub ai: AiSettings,
    /// Preselected language; the menu asks when unset.
    pub language: Option<Language>,
    pub max_subject_len: usize,
    pub diff_budget: usize,
    pub history_path: PathBuf,
}

impl Config {
    /// Load configuration from `COMMITSMITH_*` variables.
    ///
    /// A missing API key, an unknown language or a malformed base URL is
    /// fatal. Malformed numbers fall back to their defaults with a warning.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = read_api_key()?;

        let base_url = match non_empty_var(BASE_URL_ENV_VAR) {
            Some(url) if url.starts_with("http://") || url.starts_with("https://") => {
                url.trim_end_matches('/').to_string()
            }
            Some(url) => {
                return Err(ConfigError::InvalidValue {
                    var: BASE_URL_ENV_VAR,
                    value: url,
                    reason: "expected an http:// or https:// URL".to_string(),
                });
            }
            None => DEFAULT_BASE_URL.to_string(),
        };

        let language = match non_empty_var(LANG_ENV_VAR) {
            Some(value) => Some(value.parse::<Language>().map_err(|reason| {
                ConfigError::InvalidValue {
                    var: LANG_ENV_VAR,
                    value,
                    reason,
                }
            })?),
            None => None,
        };

        let timeout_secs = positive_number(TIMEOUT_ENV_VAR, DEFAULT_TIMEOUT_SECS);
        let temperature = match non_empty_var(TEMPERATURE_ENV_VAR) {
            Some(v) => match v.parse::<f32>() {
                Ok(t) if (0.0..=2.0).contains(&t) => t,
                _ => {
                    warn!(
                        "Invalid {} value '{}', using default {}",
                        TEMPERATURE_ENV_VAR, v, DEFAULT_TEMPERATURE
                    );
                    DEFAULT_TEMPERATURE
                }
            },
            None => DEFAULT_TEMPERATURE,
        };

        let config = Config {
            ai: AiSettings {
                api_key,
                base_url,
                model: non_empty_var(MODEL_ENV_VAR).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                max_tokens: positive_number(MAX_TOKENS_ENV_VAR, DEFAULT_MAX_TOKENS),
                temperature,
                timeout: Duration::from_secs(timeout_secs),
            },
            language,
            max_subject_len: positive_number(MAX_SUBJECT_LEN_ENV_VAR, DEFAULT_MAX_SUBJECT_LEN),
            diff_budget: positive_number(DIFF_BUDGET_ENV_VAR, DEFAULT_DIFF_BUDGET),
            history_path: non_empty_var(HISTORY_FILE_ENV_VAR)
                .map(PathBuf::from)
                .unwrap_or_else(default_history_path),
        };
        debug!(?config, "Loaded configuration");
        Ok(config)
    }
}

fn read_api_key() -> Result<String, ConfigError> {
    std::iter::once(API_KEY_ENV_VAR)
        .chain(FALLBACK_API_KEY_ENV_VARS)
        .find_map(non_empty_var)
        .ok_or(ConfigError::MissingApiKey)
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Read a positive number, warning and using `default` when malformed.
fn positive_number<T>(var: &str, default: T) -> T
where
    T: FromStr + PartialOrd + Default + fmt::Display + Copy,
{
    match non_empty_var(var) {
        Some(v) => match v.parse::<T>() {
            Ok(n) if n > T::default() => n,
            _ => {
                warn!("Invalid {} value '{}', using default {}", var, v, default);
                default
            }
        },
        None => default,
    }
}

fn default_history_path() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .map(|dir| dir.join("commitsmith").join("history.jsonl"))
        .unwrap_or_else(|| PathBuf::from(".commitsmith-history.jsonl"))
}

/// Fail early when the `git` executable is not on the PATH.
///
/// Uses the `which` crate so the check also works on Windows.
pub fn check_git_installed() -> Result<PathBuf, ConfigError> {
    which::which("git").map_err(|_| ConfigError::GitNotInstalled)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_VARS: [&str; 12] = [
        API_KEY_ENV_VAR,
        "OPENROUTER_API_KEY",
        "QWEN_API_KEY",
        BASE_URL_ENV_VAR,
        MODEL_ENV_VAR,
        LANG_ENV_VAR,
        MAX_SUBJECT_LEN_ENV_VAR,
        DIFF_BUDGET_ENV_VAR,
        TIMEOUT_ENV_VAR,
        MAX_TOKENS_ENV_VAR,
        TEMPERATURE_ENV_VAR,
        HISTORY_FILE_ENV_VAR,
    ];

    /// Run with every config variable unset except the given ones.
    fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
        let mut all: Vec<(&str, Option<&str>)> = ALL_VARS.iter().map(|v| (*v, None)).collect();
        for (k, v) in vars {
            all.retain(|(name, _)| name != k);
            all.push((*k, Some(*v)));
        }
        temp_env::with_vars(all, f);
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        with_env(&[], || {
            assert!(matches!(Config::from_env(), Err(ConfigError::MissingApiKey)));
        });
    }

    #[test]
    fn test_defaults() {
        with_env(&[(API_KEY_ENV_VAR, "sk-test")], || {
            let config = Config::from_env().unwrap();
            assert_eq!(config.ai.api_key, "sk-test");
            assert_eq!(config.ai.base_url, DEFAULT_BASE_URL);
            assert_eq!(config.ai.model, DEFAULT_MODEL);
            assert_eq!(config.ai.timeout, Duration::from_secs(30));
            assert_eq!(config.ai.max_tokens, 300);
            assert_eq!(config.max_subject_len, 72);
            assert_eq!(config.diff_budget, 30_000);
            assert_eq!(config.language, None);
        });
    }

    #[test]
    fn test_fallback_key_variables() {
        with_env(&[("QWEN_API_KEY", "qwen-key")], || {
            assert_eq!(Config::from_env().unwrap().ai.api_key, "qwen-key");
        });
        with_env(
            &[("OPENROUTER_API_KEY", "or-key"), ("QWEN_API_KEY", "qwen-key")],
            || {
                assert_eq!(Config::from_env().unwrap().ai.api_key, "or-key");
            },
        );
    }

    #[test]
    fn test_invalid_numbers_fall_back_to_defaults() {
        with_env(
            &[
                (API_KEY_ENV_VAR, "k"),
                (TIMEOUT_ENV_VAR, "soon"),
                (MAX_SUBJECT_LEN_ENV_VAR, "0"),
                (DIFF_BUDGET_ENV_VAR, "-5"),
                (TEMPERATURE_ENV_VAR, "9"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.ai.timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
                assert_eq!(config.max_subject_len, DEFAULT_MAX_SUBJECT_LEN);
                assert_eq!(config.diff_budget, DEFAULT_DIFF_BUDGET);
                assert_eq!(config.ai.temperature, DEFAULT_TEMPERATURE);
            },
        );
    }

    #[test]
    fn test_overrides() {
        with_env(
            &[
                (API_KEY_ENV_VAR, "k"),
                (BASE_URL_ENV_VAR, "http://localhost:8080/v1/"),
                (LANG_ENV_VAR, "es"),
                (MAX_SUBJECT_LEN_ENV_VAR, "50"),
                (TIMEOUT_ENV_VAR, "5"),
                (HISTORY_FILE_ENV_VAR, "/tmp/h.jsonl"),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert_eq!(config.ai.base_url, "http://localhost:8080/v1");
                assert_eq!(config.language, Some(Language::Es));
                assert_eq!(config.max_subject_len, 50);
                assert_eq!(config.ai.timeout, Duration::from_secs(5));
                assert_eq!(config.history_path, PathBuf::from("/tmp/h.jsonl"));
            },
        );
    }

    #[test]
    fn test_invalid_language_and_url_are_fatal() {
        with_env(&[(API_KEY_ENV_VAR, "k"), (LANG_ENV_VAR, "fr")], || {
            assert!(matches!(
                Config::from_env(),
                Err(ConfigError::InvalidValue { var: LANG_ENV_VAR, .. })
            ));
        });
        with_env(&[(API_KEY_ENV_VAR, "k"), (BASE_URL_ENV_VAR, "openrouter.ai")], || {
            assert!(matches!(
                Config::from_env(),
                Err(ConfigError::InvalidValue { var: BASE_URL_ENV_VAR, .. })
            ));
        });
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let settings = AiSettings::new("sk-secret");
        assert!(!format!("{settings:?}").contains("sk-secret"));
    }
}
