/// Server configuration
use crate::error::{Result, ServerError};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Shortest allowed smart playlist refresh interval
pub const MIN_REFRESH_INTERVAL_SECS: u64 = 60;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_server")]
    pub server: ServerSettings,

    #[serde(default = "default_storage")]
    pub storage: StorageSettings,

    #[serde(default = "default_auth")]
    pub auth: AuthSettings,

    #[serde(default = "default_smart_playlists")]
    pub smart_playlists: SmartPlaylistSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageSettings {
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AuthSettings {
    #[serde(default)]
    pub jwt_secret: String,

    #[serde(default = "default_jwt_expiration_hours")]
    pub jwt_expiration_hours: u64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SmartPlaylistSettings {
    #[serde(default = "default_refresh_enabled")]
    pub refresh_enabled: bool,

    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,
}

impl SmartPlaylistSettings {
    /// Interval between scheduled refreshes, never shorter than a minute
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs.max(MIN_REFRESH_INTERVAL_SECS))
    }
}

impl ServerConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        Self::load_from(None)
    }

    /// Load configuration, reading `path` instead of `./config.toml` when given
    pub fn load_from(path: Option<PathBuf>) -> Result<Self> {
        let mut settings = config::Config::builder();

        let config_path = path.unwrap_or_else(|| PathBuf::from("config.toml"));
        if config_path.exists() {
            settings = settings.add_source(config::File::from(config_path));
        }

        // Override with environment variables (prefixed with CHORUS_)
        settings = settings.add_source(
            config::Environment::with_prefix("CHORUS")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = settings
            .build()
            .map_err(|e| ServerError::Config(e.to_string()))?;

        config
            .try_deserialize()
            .map_err(|e| ServerError::Config(e.to_string()))
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ServerError::Config(
                "JWT secret is required (set CHORUS_AUTH__JWT_SECRET)".to_string(),
            ));
        }

        if self.smart_playlists.refresh_interval_secs < MIN_REFRESH_INTERVAL_SECS {
            tracing::warn!(
                "Smart playlist refresh interval {}s is below the minimum, using {}s",
                self.smart_playlists.refresh_interval_secs,
                MIN_REFRESH_INTERVAL_SECS
            );
        }

        Ok(())
    }
}

// Default values
fn default_server() -> ServerSettings {
    ServerSettings {
        host: default_host(),
        port: default_port(),
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_storage() -> StorageSettings {
    StorageSettings {
        database_url: default_database_url(),
    }
}

fn default_database_url() -> String {
    "sqlite://./data/chorus.db".to_string()
}

fn default_auth() -> AuthSettings {
    AuthSettings {
        jwt_secret: String::new(),
        jwt_expiration_hours: default_jwt_expiration_hours(),
    }
}

fn default_jwt_expiration_hours() -> u64 {
    24
}

fn default_smart_playlists() -> SmartPlaylistSettings {
    SmartPlaylistSettings {
        refresh_enabled: default_refresh_enabled(),
        refresh_interval_secs: default_refresh_interval_secs(),
    }
}

fn default_refresh_enabled() -> bool {
    true
}

fn default_refresh_interval_secs() -> u64 {
    900
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            server: default_server(),
            storage: default_storage(),
            auth: default_auth(),
            smart_playlists: default_smart_playlists(),
        }
    }
}
