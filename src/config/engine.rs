//! Engine configuration structures.

use serde::{Deserialize, Serialize};

use crate::core::dispatcher::DispatchPolicy;

/// Store backend selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackendConfig {
    /// In-memory store for development/testing.
    InMemory,
    /// Postgres-backed store.
    Postgres {
        /// Database connection string.
        connection_string: String,
    },
}

/// Notification sink selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotifierBackendConfig {
    /// Log-only sink.
    Log,
    /// In-memory sink (tests/dev).
    InMemory,
    /// SMTP sink.
    Smtp {
        /// Sender address.
        from_address: String,
    },
}

/// Root engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default job duration in minutes, used for assignment estimates.
    pub default_job_minutes: u32,
    /// Upper bound on dispatches attempted by one cascade task.
    pub max_cascade_dispatches: usize,
    /// Store backend selection.
    pub store: StoreBackendConfig,
    /// Notification sink selection.
    pub notifier: NotifierBackendConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_job_minutes: 60,
            max_cascade_dispatches: 8,
            store: StoreBackendConfig::InMemory,
            notifier: NotifierBackendConfig::Log,
        }
    }
}

impl EngineConfig {
    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_job_minutes == 0 {
            return Err("default_job_minutes must be greater than 0".into());
        }
        if self.max_cascade_dispatches == 0 {
            return Err("max_cascade_dispatches must be greater than 0".into());
        }
        if let StoreBackendConfig::Postgres { connection_string } = &self.store {
            if connection_string.is_empty() {
                return Err("postgres store requires a connection string".into());
            }
        }
        if let NotifierBackendConfig::Smtp { from_address } = &self.notifier {
            if !from_address.contains('@') {
                return Err("smtp notifier requires a valid from_address".into());
            }
        }
        Ok(())
    }

    /// Parse engine configuration from a JSON string and validate.
    pub fn from_json_str(input: &str) -> Result<Self, String> {
        let cfg: Self = serde_json::from_str(input).map_err(|e| format!("parse error: {e}"))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load configuration from the environment (reading a `.env` file when
    /// present). Unset variables fall back to defaults; `DISPATCH_STORE_URL`
    /// selects the Postgres backend, `DISPATCH_SMTP_FROM` the SMTP sink.
    pub fn from_env() -> Result<Self, String> {
        dotenvy::dotenv().ok();
        let mut cfg = Self::default();

        if let Ok(v) = std::env::var("DISPATCH_DEFAULT_JOB_MINUTES") {
            cfg.default_job_minutes = v
                .parse()
                .map_err(|e| format!("DISPATCH_DEFAULT_JOB_MINUTES: {e}"))?;
        }
        if let Ok(v) = std::env::var("DISPATCH_MAX_CASCADE") {
            cfg.max_cascade_dispatches =
                v.parse().map_err(|e| format!("DISPATCH_MAX_CASCADE: {e}"))?;
        }
        if let Ok(url) = std::env::var("DISPATCH_STORE_URL") {
            cfg.store = StoreBackendConfig::Postgres {
                connection_string: url,
            };
        }
        if let Ok(from) = std::env::var("DISPATCH_SMTP_FROM") {
            cfg.notifier = NotifierBackendConfig::Smtp { from_address: from };
        }

        cfg.validate()?;
        Ok(cfg)
    }

    /// The dispatch knobs this configuration implies.
    #[must_use]
    pub const fn policy(&self) -> DispatchPolicy {
        DispatchPolicy {
            default_job_minutes: self.default_job_minutes,
            max_cascade_dispatches: self.max_cascade_dispatches,
        }
    }
}
