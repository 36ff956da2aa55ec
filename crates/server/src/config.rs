//! Server configuration with precedence and validation
//!
//! Layers are applied lowest to highest: defaults, config file,
//! `BCACHED_*` environment variables, command-line flags.

use crate::errors::{Result, ServerError};
use bcached_cache::{ArbitratorConfig, EmptyExpectation};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable naming an explicit config file
pub const CONFIG_FILE_ENV: &str = "BCACHED_CONFIG";

const ENV_HOST: &str = "BCACHED_HOST";
const ENV_PORT: &str = "BCACHED_PORT";
const ENV_DATA_DIR: &str = "BCACHED_DATA_DIR";
const ENV_REQUEST_TIMEOUT_MS: &str = "BCACHED_REQUEST_TIMEOUT_MS";
const ENV_SHARDS: &str = "BCACHED_SHARDS";
const ENV_QUEUE_DEPTH: &str = "BCACHED_QUEUE_DEPTH";
const ENV_EMPTY_EXPECTATION: &str = "BCACHED_EMPTY_EXPECTATION";

/// Fully resolved server configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Interface to listen on
    pub host: String,
    /// Port for clients
    pub port: u16,
    /// Storage root holding one record per key
    pub data_dir: PathBuf,
    /// How long a request waits for the cache before giving up
    pub request_timeout: Duration,
    /// Number of arbitrator workers
    pub shards: usize,
    /// Queue capacity per worker
    pub queue_depth: usize,
    /// Meaning of an empty `FromValue` on put
    pub empty_expectation: EmptyExpectation,
    /// Layers that contributed to this configuration, in order
    pub sources: Vec<ConfigSource>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let arbitrator = ArbitratorConfig::default();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            request_timeout: Duration::from_secs(5),
            shards: arbitrator.shards,
            queue_depth: arbitrator.queue_depth,
            empty_expectation: EmptyExpectation::default(),
            sources: vec![ConfigSource::Default],
        }
    }
}

impl ServerConfig {
    /// Overlay every value present in `layer`
    pub fn apply(&mut self, layer: ConfigLayer, source: ConfigSource) {
        if let Some(host) = layer.host {
            self.host = host;
        }
        if let Some(port) = layer.port {
            self.port = port;
        }
        if let Some(data_dir) = layer.data_dir {
            self.data_dir = data_dir;
        }
        if let Some(ms) = layer.request_timeout_ms {
            self.request_timeout = Duration::from_millis(ms);
        }
        if let Some(shards) = layer.shards {
            self.shards = shards;
        }
        if let Some(queue_depth) = layer.queue_depth {
            self.queue_depth = queue_depth;
        }
        if let Some(expectation) = layer.empty_expectation {
            self.empty_expectation = expectation;
        }
        self.sources.push(source);
    }

    pub fn validate(&self) -> Result<()> {
        if self.port == 0 {
            return Err(ServerError::configuration("port must be between 1 and 65535"));
        }
        if self.host.trim().is_empty() {
            return Err(ServerError::configuration("host cannot be empty"));
        }
        if self.request_timeout.is_zero() {
            return Err(ServerError::configuration(
                "request timeout must be greater than zero",
            ));
        }
        self.arbitrator().validate()?;
        Ok(())
    }

    pub fn arbitrator(&self) -> ArbitratorConfig {
        ArbitratorConfig {
            shards: self.shards,
            queue_depth: self.queue_depth,
        }
    }

    /// `host:port` as handed to the listener
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// A partial configuration; `None` leaves the lower layer's value alone
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigLayer {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub data_dir: Option<PathBuf>,
    pub request_timeout_ms: Option<u64>,
    pub shards: Option<usize>,
    pub queue_depth: Option<usize>,
    pub empty_expectation: Option<EmptyExpectation>,
}

impl ConfigLayer {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Source of configuration for debugging and precedence tracking
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigSource {
    /// Default configuration
    Default,
    /// Configuration file
    ConfigFile(PathBuf),
    /// Environment variables
    EnvironmentVariable(String),
    /// Command line argument
    CommandLine,
}

/// Configuration loader that handles precedence
pub struct ServerConfigLoader;

impl ServerConfigLoader {
    /// Load configuration with full precedence handling
    ///
    /// The config file is `explicit_file`, else `$BCACHED_CONFIG`, else
    /// `<config dir>/bcached/config.json` when that file exists.
    pub fn load(explicit_file: Option<&Path>, cli: ConfigLayer) -> Result<ServerConfig> {
        let env_lookup = |name: &str| std::env::var(name).ok();

        let file = match explicit_file {
            Some(path) => Some(path.to_path_buf()),
            None => match env_lookup(CONFIG_FILE_ENV) {
                Some(path) => Some(PathBuf::from(path)),
                None => Self::default_config_path().filter(|path| path.is_file()),
            },
        };

        let file_layer = match &file {
            Some(path) => Some((Self::load_from_file(path)?, path.clone())),
            None => None,
        };
        let env_layer = Self::load_from_env(env_lookup)?;

        Self::assemble(file_layer, env_layer, cli)
    }

    /// Merge already-loaded layers over the defaults and validate
    pub fn assemble(
        file: Option<(ConfigLayer, PathBuf)>,
        env: Option<ConfigLayer>,
        cli: ConfigLayer,
    ) -> Result<ServerConfig> {
        let mut config = ServerConfig::default();

        if let Some((layer, path)) = file {
            config.apply(layer, ConfigSource::ConfigFile(path));
        }

        if let Some(layer) = env {
            config.apply(
                layer,
                ConfigSource::EnvironmentVariable("BCACHED_*".to_string()),
            );
        }

        if !cli.is_empty() {
            config.apply(cli, ConfigSource::CommandLine);
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON file
    pub fn load_from_file(path: &Path) -> Result<ConfigLayer> {
        let content = std::fs::read_to_string(path).map_err(|e| ServerError::ConfigFile {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| ServerError::ConfigParse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Load configuration from `BCACHED_*` variables via `lookup`
    ///
    /// Returns `None` when no variable is set.
    pub fn load_from_env(lookup: impl Fn(&str) -> Option<String>) -> Result<Option<ConfigLayer>> {
        let layer = ConfigLayer {
            host: lookup(ENV_HOST),
            port: parse_var(&lookup, ENV_PORT)?,
            data_dir: lookup(ENV_DATA_DIR).map(PathBuf::from),
            request_timeout_ms: parse_var(&lookup, ENV_REQUEST_TIMEOUT_MS)?,
            shards: parse_var(&lookup, ENV_SHARDS)?,
            queue_depth: parse_var(&lookup, ENV_QUEUE_DEPTH)?,
            empty_expectation: parse_var(&lookup, ENV_EMPTY_EXPECTATION)?,
        };

        if layer.is_empty() {
            Ok(None)
        } else {
            Ok(Some(layer))
        }
    }

    /// Get the default configuration file path
    fn default_config_path() -> Option<PathBuf> {
        let config_dir = match std::env::var("XDG_CONFIG_HOME") {
            Ok(dir) => PathBuf::from(dir),
            Err(_) => dirs::config_dir()?,
        };
        Some(config_dir.join("bcached").join("config.json"))
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, variable: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(variable) {
        None => Ok(None),
        Some(value) => match value.trim().parse::<T>() {
            Ok(parsed) => Ok(Some(parsed)),
            Err(e) => Err(ServerError::Environment {
                variable: variable.to_string(),
                message: e.to_string(),
                value,
            }),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfigLoader::assemble(None, None, ConfigLayer::default()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.shards, 1);
        assert_eq!(config.empty_expectation, EmptyExpectation::Unconditional);
        assert_eq!(config.sources, vec![ConfigSource::Default]);
    }

    #[test]
    fn test_precedence_file_env_cli() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"port": 9000, "data_dir": "/srv/cache", "shards": 2, "empty_expectation": "require-absent"}"#,
        )
        .unwrap();

        let file = ServerConfigLoader::load_from_file(&path).unwrap();
        let env = ServerConfigLoader::load_from_env(env_of(&[
            ("BCACHED_PORT", "9100"),
            ("BCACHED_REQUEST_TIMEOUT_MS", "250"),
        ]))
        .unwrap();
        let cli = ConfigLayer {
            port: Some(9200),
            ..Default::default()
        };

        let config = ServerConfigLoader::assemble(Some((file, path.clone())), env, cli).unwrap();

        assert_eq!(config.port, 9200);
        assert_eq!(config.data_dir, PathBuf::from("/srv/cache"));
        assert_eq!(config.shards, 2);
        assert_eq!(config.request_timeout, Duration::from_millis(250));
        assert_eq!(config.empty_expectation, EmptyExpectation::RequireAbsent);
        assert_eq!(
            config.sources,
            vec![
                ConfigSource::Default,
                ConfigSource::ConfigFile(path),
                ConfigSource::EnvironmentVariable("BCACHED_*".to_string()),
                ConfigSource::CommandLine,
            ]
        );
    }

    #[test]
    fn test_no_env_vars_is_no_layer() {
        let layer = ServerConfigLoader::load_from_env(env_of(&[])).unwrap();
        assert!(layer.is_none());
    }

    #[test]
    fn test_invalid_env_value() {
        let err = ServerConfigLoader::load_from_env(env_of(&[("BCACHED_PORT", "eighty")]))
            .unwrap_err();
        match err {
            ServerError::Environment {
                variable, value, ..
            } => {
                assert_eq!(variable, "BCACHED_PORT");
                assert_eq!(value, "eighty");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(ServerConfigLoader::load_from_env(env_of(&[(
            "BCACHED_EMPTY_EXPECTATION",
            "maybe"
        )]))
        .is_err());
    }

    #[test]
    fn test_unknown_file_keys_are_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        std::fs::write(&path, r#"{"prot": 1}"#).unwrap();

        assert!(matches!(
            ServerConfigLoader::load_from_file(&path),
            Err(ServerError::ConfigParse { .. })
        ));
    }

    #[test]
    fn test_validation() {
        for layer in [
            ConfigLayer {
                port: Some(0),
                ..Default::default()
            },
            ConfigLayer {
                shards: Some(0),
                ..Default::default()
            },
            ConfigLayer {
                request_timeout_ms: Some(0),
                ..Default::default()
            },
        ] {
            assert!(ServerConfigLoader::assemble(None, None, layer).is_err());
        }
    }

    #[test]
    #[serial]
    fn test_load_reads_process_environment() {
        std::env::set_var("BCACHED_SHARDS", "3");
        let config = ServerConfigLoader::load(None, ConfigLayer::default());
        std::env::remove_var("BCACHED_SHARDS");

        assert_eq!(config.unwrap().shards, 3);
    }

    #[test]
    #[serial]
    fn test_explicit_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("absent.json");

        assert!(matches!(
            ServerConfigLoader::load(Some(&missing), ConfigLayer::default()),
            Err(ServerError::ConfigFile { .. })
        ));
    }
}
