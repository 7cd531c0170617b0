//! Connection settings, and how gaps in them are filled from `DB_*`
//! environment variables.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::SqlRecordsError;
use crate::types::DatabaseType;

/// Where missing configuration values are looked up.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// Reads the process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

impl EnvSource for HashMap<&str, &str> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).map(|v| (*v).to_string())
    }
}

/// A configuration field and the environment variable that backs it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigField {
    Host,
    Username,
    Password,
    Port,
    Database,
    Driver,
}

impl ConfigField {
    pub const ALL: [ConfigField; 6] = [
        ConfigField::Host,
        ConfigField::Username,
        ConfigField::Password,
        ConfigField::Port,
        ConfigField::Database,
        ConfigField::Driver,
    ];

    #[must_use]
    pub fn env_key(self) -> &'static str {
        match self {
            ConfigField::Host => "DB_HOST",
            ConfigField::Username => "DB_USERNAME",
            ConfigField::Password => "DB_PASSWORD",
            ConfigField::Port => "DB_PORT",
            ConfigField::Database => "DB_DATABASE",
            ConfigField::Driver => "DB_CONNECTION",
        }
    }
}

/// Connection settings. Empty strings mean "not set".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Configs {
    pub host: String,
    pub username: String,
    pub password: String,
    pub port: String,
    pub database: String,
    pub driver: String,
}

impl Configs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    #[must_use]
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = username.into();
        self
    }

    #[must_use]
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    #[must_use]
    pub fn with_port(mut self, port: impl Into<String>) -> Self {
        self.port = port.into();
        self
    }

    #[must_use]
    pub fn with_database(mut self, database: impl Into<String>) -> Self {
        self.database = database.into();
        self
    }

    #[must_use]
    pub fn with_driver(mut self, driver: impl Into<String>) -> Self {
        self.driver = driver.into();
        self
    }

    /// Load from a JSON object; absent keys stay empty.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::ConfigError` if the JSON does not parse.
    pub fn from_json_str(json: &str) -> Result<Self, SqlRecordsError> {
        serde_json::from_str(json)
            .map_err(|e| SqlRecordsError::ConfigError(format!("invalid config JSON: {e}")))
    }

    fn field(&self, field: ConfigField) -> &str {
        match field {
            ConfigField::Host => &self.host,
            ConfigField::Username => &self.username,
            ConfigField::Password => &self.password,
            ConfigField::Port => &self.port,
            ConfigField::Database => &self.database,
            ConfigField::Driver => &self.driver,
        }
    }

    fn field_mut(&mut self, field: ConfigField) -> &mut String {
        match field {
            ConfigField::Host => &mut self.host,
            ConfigField::Username => &mut self.username,
            ConfigField::Password => &mut self.password,
            ConfigField::Port => &mut self.port,
            ConfigField::Database => &mut self.database,
            ConfigField::Driver => &mut self.driver,
        }
    }

    /// Whether every required field is set. `database` is not required when
    /// schemaless.
    #[must_use]
    pub fn has_all(&self, schemaless: bool) -> bool {
        ConfigField::ALL
            .iter()
            .filter(|f| !(schemaless && **f == ConfigField::Database))
            .all(|f| !self.field(*f).is_empty())
    }

    /// Fill empty fields from `env`, one field at a time.
    ///
    /// Values already set are never replaced. When schemaless, `DB_DATABASE`
    /// is not consulted.
    pub fn supplement_from<E: EnvSource + ?Sized>(&mut self, env: &E, schemaless: bool) {
        if self.has_all(schemaless) {
            return;
        }
        for field in ConfigField::ALL {
            if schemaless && field == ConfigField::Database {
                continue;
            }
            let slot = self.field_mut(field);
            if !slot.is_empty() {
                continue;
            }
            if let Some(value) = env.var(field.env_key()) {
                *slot = value;
            }
        }
    }

    /// `username:password@tcp(host:port)/[database]`, with the database left
    /// off when schemaless.
    #[must_use]
    pub fn connection_string(&self, schemaless: bool) -> String {
        self.render_connection_string(&self.password, schemaless)
    }

    /// [`Configs::connection_string`] with the password masked, for logs.
    #[must_use]
    pub fn redacted_connection_string(&self, schemaless: bool) -> String {
        let masked = if self.password.is_empty() { "" } else { "***" };
        self.render_connection_string(masked, schemaless)
    }

    fn render_connection_string(&self, password: &str, schemaless: bool) -> String {
        let mut s = format!(
            "{}:{}@tcp({}:{})/",
            self.username, password, self.host, self.port
        );
        if !schemaless {
            s.push_str(&self.database);
        }
        s
    }

    /// # Errors
    ///
    /// Returns `SqlRecordsError::ConfigError` for an empty or unknown driver.
    pub fn database_type(&self) -> Result<DatabaseType, SqlRecordsError> {
        DatabaseType::from_driver_name(&self.driver)
    }

    /// # Errors
    ///
    /// Returns `SqlRecordsError::ConfigError` if the port is not a TCP port number.
    pub fn port_number(&self) -> Result<u16, SqlRecordsError> {
        self.port.trim().parse::<u16>().map_err(|e| {
            SqlRecordsError::ConfigError(format!("invalid port '{}': {e}", self.port))
        })
    }

    /// Check the settings a driver needs before connecting.
    ///
    /// # Errors
    ///
    /// Returns `SqlRecordsError::ConfigError` naming the first missing or
    /// invalid field.
    pub fn validate(&self, schemaless: bool) -> Result<DatabaseType, SqlRecordsError> {
        let db_type = self.database_type()?;
        match db_type {
            #[cfg(feature = "mysql")]
            DatabaseType::Mysql => {
                for field in [ConfigField::Host, ConfigField::Username, ConfigField::Port] {
                    if self.field(field).is_empty() {
                        return Err(SqlRecordsError::ConfigError(format!(
                            "{} is required",
                            field.env_key()
                        )));
                    }
                }
                self.port_number()?;
                if !schemaless && self.database.is_empty() {
                    return Err(SqlRecordsError::ConfigError(
                        "DB_DATABASE is required".to_string(),
                    ));
                }
            }
            #[cfg(feature = "sqlite")]
            DatabaseType::Sqlite => {
                if !schemaless && self.database.is_empty() {
                    return Err(SqlRecordsError::ConfigError(
                        "DB_DATABASE is required".to_string(),
                    ));
                }
            }
        }
        Ok(db_type)
    }
}
