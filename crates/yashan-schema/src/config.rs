//! Connection configuration.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchemaError};

/// Settings for one YashanDB connection.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Driver name.
    pub driver: String,
    /// Server host.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// Database (owning user) name.
    pub database: String,
    /// Login user.
    pub username: String,
    /// Login password.
    pub password: String,
    /// Client character set.
    pub charset: String,
    /// Prefix prepended to every table name.
    pub prefix: String,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            driver: "yashan".to_string(),
            host: "127.0.0.1".to_string(),
            port: 1688,
            database: "test".to_string(),
            username: "test".to_string(),
            password: "test".to_string(),
            charset: "UTF8".to_string(),
            prefix: String::new(),
        }
    }
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("driver", &self.driver)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &"***")
            .field("charset", &self.charset)
            .field("prefix", &self.prefix)
            .finish()
    }
}

impl ConnectionConfig {
    /// Reads `DB_HOST`, `DB_PORT`, `DB_DATABASE`, `DB_USERNAME`,
    /// `DB_PASSWORD`, `DB_CHARSET` and `DB_PREFIX`, using the defaults for
    /// unset variables.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Config`] if `DB_PORT` is not a port number.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`], reading variables through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns [`SchemaError::Config`] if `DB_PORT` is not a port number.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(host) = lookup("DB_HOST") {
            config.host = host;
        }
        if let Some(port) = lookup("DB_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| SchemaError::Config(format!("invalid DB_PORT '{port}'")))?;
        }
        if let Some(database) = lookup("DB_DATABASE") {
            config.database = database;
        }
        if let Some(username) = lookup("DB_USERNAME") {
            config.username = username;
        }
        if let Some(password) = lookup("DB_PASSWORD") {
            config.password = password;
        }
        if let Some(charset) = lookup("DB_CHARSET") {
            config.charset = charset;
        }
        if let Some(prefix) = lookup("DB_PREFIX") {
            config.prefix = prefix;
        }

        Ok(config)
    }

    /// Loads a JSON configuration file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns an IO or serialization error if the file cannot be read or
    /// parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Builds the ODBC data source string, without credentials.
    #[must_use]
    pub fn dsn(&self) -> String {
        format!(
            "DRIVER=YashanDB;SERVER={};PORT={};DATABASE={}",
            self.host, self.port, self.database
        )
    }

    /// Builds the full ODBC connection string, credentials included.
    #[must_use]
    pub fn connection_string(&self) -> String {
        format!(
            "{};UID={};PWD={};CHARSET={}",
            self.dsn(),
            self.username,
            self.password,
            self.charset
        )
    }
}
