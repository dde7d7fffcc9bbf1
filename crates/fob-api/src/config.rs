//! Startup configuration: environment variables plus an optional YAML file.

use std::path::PathBuf;

use fob_contest::settings::ContestSettings;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Ids the messaging gateway needs to route announcements.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayBindings {
    /// Channel that receives contest announcements.
    pub announce_channel_id: Option<String>,
    /// Guild the bot commands are registered in.
    pub guild_id: Option<String>,
}

/// Layout of the file named by `CONTEST_CONFIG`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    backup_dir: Option<PathBuf>,
    admin_token: Option<String>,
    default_zone: Option<String>,
    exclusive_guesses: Option<bool>,
    allowed_locations: Option<Vec<String>>,
    announce_channel_id: Option<String>,
    guild_id: Option<String>,
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `PostgreSQL` connection string.
    pub database_url: String,
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Directory backup snapshots are written to.
    pub backup_dir: PathBuf,
    /// Shared secret for admin routes.
    pub admin_token: Option<String>,
    /// Contest behavior.
    pub contest: ContestSettings,
    /// Gateway routing ids.
    pub bindings: GatewayBindings,
}

impl AppConfig {
    /// Reads the process environment and, if `CONTEST_CONFIG` is set, the
    /// YAML file it names.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` for a missing `DATABASE_URL`, a bad port,
    /// an unreadable or invalid config file, or unusable contest settings.
    pub fn from_env() -> Result<Self, AppError> {
        let file = match std::env::var("CONTEST_CONFIG") {
            Ok(path) => Some(std::fs::read_to_string(&path).map_err(|e| {
                AppError::Config(format!("cannot read CONTEST_CONFIG file {path}: {e}"))
            })?),
            Err(_) => None,
        };
        Self::from_sources(|key| std::env::var(key).ok(), file.as_deref())
    }

    /// Builds the configuration from an environment lookup and optional YAML
    /// text. Environment values win over the file.
    ///
    /// # Errors
    ///
    /// See [`Self::from_env`].
    pub fn from_sources(
        env: impl Fn(&str) -> Option<String>,
        yaml: Option<&str>,
    ) -> Result<Self, AppError> {
        let file: ConfigFile = match yaml {
            Some(text) if !text.trim().is_empty() => serde_yaml::from_str(text)
                .map_err(|e| AppError::Config(format!("invalid CONTEST_CONFIG file: {e}")))?,
            _ => ConfigFile::default(),
        };

        let database_url = env("DATABASE_URL").ok_or_else(|| {
            AppError::Config("DATABASE_URL environment variable must be set".into())
        })?;
        let host = env("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = match env("PORT") {
            Some(port) => port
                .parse()
                .map_err(|e| AppError::Config(format!("PORT must be a valid u16: {e}")))?,
            None => 3000,
        };

        let defaults = ContestSettings::default();
        let contest = ContestSettings {
            allowed_locations: file.allowed_locations.unwrap_or(defaults.allowed_locations),
            default_zone: file.default_zone.unwrap_or(defaults.default_zone),
            exclusive_guesses: file.exclusive_guesses.unwrap_or(defaults.exclusive_guesses),
        };
        contest
            .validate()
            .map_err(|e| AppError::Config(format!("invalid contest settings: {e}")))?;

        Ok(Self {
            database_url,
            host,
            port,
            backup_dir: file.backup_dir.unwrap_or_else(|| PathBuf::from("backups")),
            admin_token: env("ADMIN_TOKEN")
                .or(file.admin_token)
                .filter(|token| !token.is_empty()),
            contest,
            bindings: GatewayBindings {
                announce_channel_id: file.announce_channel_id,
                guild_id: file.guild_id,
            },
        })
    }
}
