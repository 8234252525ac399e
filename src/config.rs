//! Configuration manager for local-tours.
//!
//! Values come from an optional `config.yaml` file, then from environment
//! variables which always win.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::FromRef;
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::database::{DEFAULT_DATABASE_NAME, DEFAULT_HOST};

const DEFAULT_CONFIG_PATH: &str = "config.yaml";
pub const DEFAULT_PORT: u16 = 5000;
const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    /// Instance name.
    pub name: String,
    /// Listening port.
    pub port: u16,
    #[serde(skip_deserializing)]
    pub version: String,
    /// Origins allowed to send credentials. Empty means any origin, without
    /// credentials.
    pub allowed_origins: Vec<String>,
    /// Related to MongoDB configuration.
    #[serde(skip_serializing)]
    pub mongodb: Option<MongoDB>,
    /// Secret used to sign identity tokens.
    #[serde(skip_serializing)]
    pub access_token_secret: Option<String>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            name: env!("CARGO_CRATE_NAME").into(),
            port: DEFAULT_PORT,
            version: VERSION.to_owned(),
            allowed_origins: Vec::new(),
            mongodb: None,
            access_token_secret: None,
        }
    }
}

/// MongoDB configuration.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct MongoDB {
    /// Hostname of the Atlas cluster.
    #[serde(default = "default_host")]
    pub host: String,
    /// Database name.
    #[serde(default = "default_database")]
    pub database: String,
    /// Username credential to connect.
    pub username: String,
    /// Password credential to connect.
    pub password: String,
}

fn default_host() -> String {
    DEFAULT_HOST.to_owned()
}

fn default_database() -> String {
    DEFAULT_DATABASE_NAME.to_owned()
}

impl FromRef<AppState> for Arc<Configuration> {
    fn from_ref(state: &AppState) -> Arc<Configuration> {
        Arc::clone(&state.config)
    }
}

impl Configuration {
    /// Reads the `config.yaml` file from the specified path or the default
    /// location.
    pub fn read(path: Option<PathBuf>) -> Self {
        let file_path = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_PATH).to_path_buf());

        match File::open(&file_path) {
            Ok(file) => match serde_yaml::from_reader::<_, Configuration>(file) {
                Ok(mut config) => {
                    config.version = VERSION.to_owned();
                    config
                },
                Err(err) => Self::error(err),
            },
            Err(err) => {
                tracing::info!(error = %err, path = %file_path.display(), "no configuration file, using defaults");
                Self::default()
            },
        }
    }

    /// Apply environment variables on top of current values.
    pub fn with_env<F>(mut self, var: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(port) = var("PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!(%port, "ignoring invalid `PORT`"),
            }
        }

        if let Some(secret) = var("ACCESS_TOKEN_SECRET") {
            self.access_token_secret = Some(secret);
        }

        if let Some(origins) = var("ALLOWED_ORIGINS") {
            self.allowed_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_owned)
                .collect();
        }

        let user = var("DB_USER");
        let password = var("DB_PASSWORD");
        let host = var("DB_HOST");
        let database = var("DB_NAME");

        match (self.mongodb.as_mut(), user, password) {
            (Some(mongodb), user, password) => {
                if let Some(user) = user {
                    mongodb.username = user;
                }
                if let Some(password) = password {
                    mongodb.password = password;
                }
            },
            (None, Some(username), Some(password)) => {
                self.mongodb = Some(MongoDB {
                    host: default_host(),
                    database: default_database(),
                    username,
                    password,
                });
            },
            (None, _, _) => {},
        }

        if let Some(mongodb) = self.mongodb.as_mut() {
            if let Some(host) = host {
                mongodb.host = host;
            }
            if let Some(database) = database {
                mongodb.database = database;
            }
        }

        self
    }

    /// Load the whole configuration from `CONFIG_PATH` and process
    /// environment.
    pub fn load() -> Arc<Self> {
        let path = std::env::var("CONFIG_PATH").ok().map(PathBuf::from);

        Arc::new(Self::read(path).with_env(|key| std::env::var(key).ok()))
    }

    /// Return a default configuration as fallback.
    fn error(err: impl std::error::Error) -> Self {
        tracing::error!(error = %err, "`config.yaml` file is invalid");
        Self::default()
    }
}
