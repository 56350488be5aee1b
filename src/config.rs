//! Process configuration, loaded the way the teacher's `Settings` does:
//! a base file, an optional local override, then `APP__`-prefixed env vars.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub application: ApplicationSettings,
    pub bootstrap: Option<BootstrapSettings>,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseSettings {
    pub url: String,
    pub pool_size: u32,
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

fn default_acquire_timeout_secs() -> u64 {
    5
}

#[derive(Debug, Deserialize)]
pub struct ApplicationSettings {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_shutdown_timeout_secs")]
    pub shutdown_timeout_secs: u64,
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_shutdown_timeout_secs() -> u64 {
    10
}

/// Inputs for zero-state admin provisioning. All three fields are required
/// together: a config source that only sets some of them is a configuration
/// error, not a partially-applied bootstrap.
#[derive(Debug, Deserialize, Clone)]
pub struct BootstrapSettings {
    pub tenant_name: String,
    pub key_name: String,
    pub raw_api_key: String,
}

impl Settings {
    pub fn new() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("APP").separator("__"));

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), config::ConfigError> {
        if self.database.pool_size == 0 {
            return Err(config::ConfigError::Message(
                "database.pool_size must be positive".to_string(),
            ));
        }
        if self.application.port == 0 {
            return Err(config::ConfigError::Message(
                "application.port must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
