use anyhow::Result;
use config::Config;
use serde::Deserialize;

use crate::constants::{DEFAULT_END_HOUR, DEFAULT_START_HOUR, ENV_PREFIX, FALLBACK_TIMEZONE};

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub planner: PlannerConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// ## Summary
    /// Returns the bind address in the format "host:port".
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

/// Planner defaults applied when a request leaves a field blank.
#[derive(Debug, Clone, Deserialize)]
pub struct PlannerConfig {
    /// IANA name of the display zone.
    pub timezone: String,
    pub start_hour: u32,
    pub end_hour: u32,
    pub show_todos: bool,
    pub fetch_timeout_secs: u64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            timezone: FALLBACK_TIMEZONE.to_owned(),
            start_hour: DEFAULT_START_HOUR,
            end_hour: DEFAULT_END_HOUR,
            show_todos: true,
            fetch_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// ## Summary
    /// Loads configuration from defaults, environment variables and an optional
    /// `config.toml` into a `Settings`.
    ///
    /// ## Errors
    /// Returns an error if building the configuration or deserializing it fails.
    pub fn load() -> Result<Self> {
        Self::load_with(environment())
    }

    fn load_with(environment: config::Environment) -> Result<Self> {
        Ok(Config::builder()
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 5000)?
            .set_default("logging.level", "debug")?
            .set_default("planner.timezone", FALLBACK_TIMEZONE)?
            .set_default("planner.start_hour", DEFAULT_START_HOUR)?
            .set_default("planner.end_hour", DEFAULT_END_HOUR)?
            .set_default("planner.show_todos", true)?
            .set_default("planner.fetch_timeout_secs", 30)?
            // Env file
            .add_source(environment)
            // TOML file
            .add_source(config::File::with_name("config.toml").required(false))
            .build()?
            .try_deserialize::<Settings>()?)
    }
}

/// Environment source: `DAYSHEET_PLANNER__START_HOUR` sets `planner.start_hour`.
///
/// Keys contain single underscores, so sections are split on `__`.
fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("_")
        .separator("__")
        .convert_case(config::Case::Snake)
        .ignore_empty(true)
        .try_parsing(true)
}

/// ## Summary
/// Loads configuration from environment variables and `.env` file.
///
/// ## Errors
/// Returns an error if loading or deserializing the configuration fails.
pub fn load_config() -> Result<Settings> {
    dotenvy::dotenv().ok();

    Settings::load()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn defaults_load_without_any_source() {
        let empty = config::Map::new();
        let settings = Settings::load_with(environment().source(Some(empty))).unwrap();
        assert_eq!(settings.planner.start_hour, DEFAULT_START_HOUR);
        assert_eq!(settings.planner.end_hour, DEFAULT_END_HOUR);
        assert!(settings.planner.show_todos);
        assert_eq!(settings.planner.fetch_timeout_secs, 30);
        assert_eq!(settings.planner.timezone, FALLBACK_TIMEZONE);
    }

    #[test_log::test]
    fn environment_overrides_multi_word_keys() {
        let vars = config::Map::from([
            ("DAYSHEET_PLANNER__START_HOUR".to_owned(), "7".to_owned()),
            ("DAYSHEET_PLANNER__FETCH_TIMEOUT_SECS".to_owned(), "5".to_owned()),
            ("DAYSHEET_PLANNER__SHOW_TODOS".to_owned(), "false".to_owned()),
            ("DAYSHEET_PLANNER__TIMEZONE".to_owned(), "Europe/Berlin".to_owned()),
            ("DAYSHEET_SERVER__PORT".to_owned(), "8080".to_owned()),
            ("PLANNER_END_HOUR".to_owned(), "20".to_owned()),
        ]);

        let settings = Settings::load_with(environment().source(Some(vars))).unwrap();
        assert_eq!(settings.planner.start_hour, 7);
        assert_eq!(settings.planner.fetch_timeout_secs, 5);
        assert!(!settings.planner.show_todos);
        assert_eq!(settings.planner.timezone, "Europe/Berlin");
        assert_eq!(settings.server.port, 8080);
        // unprefixed variables are ignored
        assert_eq!(settings.planner.end_hour, DEFAULT_END_HOUR);
    }

    #[test]
    fn bind_address_joins_host_and_port() {
        let server = ServerConfig {
            host: "127.0.0.1".to_owned(),
            port: 5000,
        };
        assert_eq!(server.bind_address(), "127.0.0.1:5000");
    }

    #[test]
    fn planner_default_matches_constants() {
        let planner = PlannerConfig::default();
        assert_eq!(planner.start_hour, 6);
        assert_eq!(planner.end_hour, 17);
        assert_eq!(planner.timezone, "America/Chicago");
    }
}
