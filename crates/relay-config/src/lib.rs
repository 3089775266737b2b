//! Startup configuration for the relay, read once from the environment.
//!
//! The server fails to start if a required variable is missing or invalid;
//! nothing reads the environment after startup.

use std::env;
use std::time::Duration;

/// Configuration loading and validation errors.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

/// Validated relay configuration.
///
/// Constructed once at startup and passed by reference; handlers never read
/// the environment directly.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    /// Base URL of the agent project, e.g.
    /// `https://acct.services.ai.azure.com/api/projects/proj`.
    pub project_endpoint: String,
    /// Id of the pre-provisioned agent to run.
    pub agent_id: String,
    /// Port the HTTP server listens on.
    pub port: u16,
    /// Overall deadline for one run to reach a terminal status.
    pub run_timeout: Duration,
    /// First delay between status polls.
    pub poll_initial: Duration,
    /// Upper bound for the poll delay after backoff.
    pub poll_max: Duration,
}

const DEFAULT_PORT: u16 = 8000;
const DEFAULT_RUN_TIMEOUT_SECS: u64 = 120;
const DEFAULT_POLL_INITIAL_MS: u64 = 250;
const DEFAULT_POLL_MAX_MS: u64 = 4_000;

impl RelayConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        let project_endpoint = required("PROJECT_ENDPOINT")?;
        if !project_endpoint.starts_with("http://") && !project_endpoint.starts_with("https://") {
            return Err(ConfigError::Invalid {
                var: "PROJECT_ENDPOINT",
                reason: format!("expected an http(s) URL, got {project_endpoint:?}"),
            });
        }

        let agent_id = required("AGENT_ID")?;

        let port = parsed("PORT", DEFAULT_PORT)?;
        let run_timeout = Duration::from_secs(parsed("RUN_TIMEOUT_SECS", DEFAULT_RUN_TIMEOUT_SECS)?);
        let poll_initial = Duration::from_millis(parsed("POLL_INITIAL_MS", DEFAULT_POLL_INITIAL_MS)?);
        let poll_max = Duration::from_millis(parsed("POLL_MAX_MS", DEFAULT_POLL_MAX_MS)?);

        if poll_initial.is_zero() {
            return Err(ConfigError::Invalid {
                var: "POLL_INITIAL_MS",
                reason: "poll interval must be non-zero".into(),
            });
        }
        if poll_max < poll_initial {
            return Err(ConfigError::Invalid {
                var: "POLL_MAX_MS",
                reason: "must be >= POLL_INITIAL_MS".into(),
            });
        }

        Ok(Self {
            project_endpoint: project_endpoint.trim_end_matches('/').to_string(),
            agent_id,
            port,
            run_timeout,
            poll_initial,
            poll_max,
        })
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    match env::var(var) {
        Ok(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ConfigError::Missing(var)),
    }
}

fn parsed<T: std::str::FromStr>(var: &'static str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(v) => v.parse().map_err(|e: T::Err| ConfigError::Invalid {
            var,
            reason: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env vars are process-global; serialize tests that touch them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn with_env(vars: &[(&str, Option<&str>)], f: impl FnOnce()) {
        let _guard = ENV_LOCK.lock().unwrap();
        for (k, v) in vars {
            match v {
                Some(v) => env::set_var(k, v),
                None => env::remove_var(k),
            }
        }
        f();
        for (k, _) in vars {
            env::remove_var(k);
        }
    }

    #[test]
    fn loads_with_defaults() {
        with_env(
            &[
                ("PROJECT_ENDPOINT", Some("https://acct.services.ai.azure.com/api/projects/proj/")),
                ("AGENT_ID", Some("asst_123")),
                ("PORT", None),
                ("RUN_TIMEOUT_SECS", None),
                ("POLL_INITIAL_MS", None),
                ("POLL_MAX_MS", None),
            ],
            || {
                let cfg = RelayConfig::from_env().unwrap();
                assert_eq!(
                    cfg.project_endpoint,
                    "https://acct.services.ai.azure.com/api/projects/proj"
                );
                assert_eq!(cfg.agent_id, "asst_123");
                assert_eq!(cfg.port, 8000);
                assert_eq!(cfg.run_timeout, Duration::from_secs(120));
            },
        );
    }

    #[test]
    fn missing_endpoint_fails() {
        with_env(
            &[("PROJECT_ENDPOINT", None), ("AGENT_ID", Some("asst_123"))],
            || {
                let err = RelayConfig::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::Missing("PROJECT_ENDPOINT")));
            },
        );
    }

    #[test]
    fn non_url_endpoint_fails() {
        with_env(
            &[
                ("PROJECT_ENDPOINT", Some("acct.services.ai.azure.com")),
                ("AGENT_ID", Some("asst_123")),
            ],
            || {
                let err = RelayConfig::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::Invalid { var: "PROJECT_ENDPOINT", .. }));
            },
        );
    }

    #[test]
    fn inverted_poll_bounds_fail() {
        with_env(
            &[
                ("PROJECT_ENDPOINT", Some("https://example.com/api/projects/p")),
                ("AGENT_ID", Some("asst_123")),
                ("POLL_INITIAL_MS", Some("5000")),
                ("POLL_MAX_MS", Some("1000")),
            ],
            || {
                let err = RelayConfig::from_env().unwrap_err();
                assert!(matches!(err, ConfigError::Invalid { var: "POLL_MAX_MS", .. }));
            },
        );
    }
}
