//! Configuration module for octohook.
//!
//! Loads configuration from TOML files with environment variable substitution.
//!
//! # Example
//!
//! ```toml
//! [app]
//! debug = false
//!
//! [discord]
//! webhook_url = "${DISCORD_WEBHOOK_URL}"
//!
//! [events]
//! push = true
//! workflow_job = false
//!
//! [events_config.issues]
//! show_labels = true
//! embed_color = 0x57F287
//! ```

use regex::Regex;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::event::EventType;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),
}

/// Root configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: GeneralConfig,

    #[serde(default)]
    pub discord: DiscordConfig,

    /// Per-event on/off switches
    #[serde(default)]
    pub events: EventToggles,

    #[serde(default)]
    pub events_config: EventsConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct GeneralConfig {
    #[serde(default)]
    pub debug: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscordConfig {
    #[serde(default)]
    pub webhook_url: String,

    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            webhook_url: String::new(),
            timeout_ms: default_timeout_ms(),
            retries: default_retries(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    10000
}

fn default_retries() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize, Clone)]
pub struct EventToggles {
    #[serde(default = "default_true")]
    pub push: bool,

    #[serde(default = "default_true")]
    pub issues: bool,

    #[serde(default = "default_true")]
    pub workflow_run: bool,

    #[serde(default = "default_true")]
    pub workflow_job: bool,
}

impl Default for EventToggles {
    fn default() -> Self {
        Self {
            push: true,
            issues: true,
            workflow_run: true,
            workflow_job: true,
        }
    }
}

impl EventToggles {
    /// Whether notifications for `event` are switched on. `ping` is always on.
    pub fn is_enabled(&self, event: EventType) -> bool {
        match event {
            EventType::Ping => true,
            EventType::Push => self.push,
            EventType::Issues => self.issues,
            EventType::WorkflowRun => self.workflow_run,
            EventType::WorkflowJob => self.workflow_job,
        }
    }
}

/// Rendering options per event type
#[derive(Debug, Deserialize, Clone, Default)]
pub struct EventsConfig {
    #[serde(default)]
    pub push: PushConfig,

    #[serde(default)]
    pub issues: IssuesConfig,

    #[serde(default)]
    pub workflow_run: WorkflowRunConfig,

    #[serde(default)]
    pub workflow_job: WorkflowJobConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PushConfig {
    pub show_file_changes: bool,
    pub max_commits_shown: usize,
    pub show_commit_details: bool,
    pub embed_color: u32,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            show_file_changes: true,
            max_commits_shown: 5,
            show_commit_details: true,
            embed_color: 0x5865F2,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct IssuesConfig {
    pub show_labels: bool,
    pub show_assignees: bool,
    pub embed_color: u32,
}

impl Default for IssuesConfig {
    fn default() -> Self {
        Self {
            show_labels: true,
            show_assignees: true,
            embed_color: 0x57F287,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WorkflowRunConfig {
    pub show_duration: bool,
    pub show_conclusion: bool,
    pub embed_color: u32,
}

impl Default for WorkflowRunConfig {
    fn default() -> Self {
        Self {
            show_duration: true,
            show_conclusion: true,
            embed_color: 0xFEE75C,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WorkflowJobConfig {
    pub show_steps: bool,
    pub show_runner: bool,
    pub embed_color: u32,
}

impl Default for WorkflowJobConfig {
    fn default() -> Self {
        Self {
            show_steps: false,
            show_runner: true,
            embed_color: 0x99AAB5,
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path or OCTOHOOK_CONFIG env var.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            env::var("OCTOHOOK_CONFIG").unwrap_or_else(|_| "config/octohook.toml".to_string());

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            info!(path = %path.display(), "Loading configuration");
            Self::parse(&fs::read_to_string(path)?)?
        } else {
            info!(
                path = %path.display(),
                "Config file not found, using defaults"
            );
            Self::default()
        };

        config.apply_env_overrides();
        config.validate()?;

        info!(
            debug = config.app.debug,
            webhook_configured = !config.discord.webhook_url.is_empty(),
            "Configuration loaded"
        );

        Ok(config)
    }

    /// Parse TOML text after substituting `${VAR}` references.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let content = substitute_env_vars(content);

        debug!("Parsing TOML configuration");
        Ok(toml::from_str(&content)?)
    }

    /// `DISCORD_WEBHOOK_URL` fills in the webhook when the file leaves it blank.
    fn apply_env_overrides(&mut self) {
        if self.discord.webhook_url.is_empty() {
            if let Ok(url) = env::var("DISCORD_WEBHOOK_URL") {
                self.discord.webhook_url = url;
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = &self.discord.webhook_url;

        if url.contains("${") {
            warn!(
                url = %url,
                "Discord webhook URL contains unsubstituted environment variable"
            );
        } else if !url.is_empty() && !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(ConfigError::ValidationError(
                "Discord webhook URL must start with http:// or https://".to_string(),
            ));
        }

        if url.is_empty() {
            warn!("No Discord webhook URL configured, deliveries will fail");
        }

        if self.events_config.push.max_commits_shown == 0 {
            return Err(ConfigError::ValidationError(
                "events_config.push.max_commits_shown must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(content: &str) -> String {
    static ENV_VAR: OnceLock<Regex> = OnceLock::new();
    let re = ENV_VAR.get_or_init(|| {
        Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("env var pattern is valid")
    });

    re.replace_all(content, |caps: &regex::Captures| {
        let var_name = &caps[1];
        match env::var(var_name) {
            Ok(value) => value,
            Err(_) => {
                debug!(var = %var_name, "Environment variable not set, keeping placeholder");
                caps[0].to_string()
            }
        }
    })
    .to_string()
}
