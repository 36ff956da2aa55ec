use bcached_cache::CacheError;
use std::path::PathBuf;

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Errors raised while configuring, starting or running the server
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration values that fail validation
    #[error("configuration error: {message}")]
    Configuration { message: String },

    /// Config file could not be read
    #[error("failed to read config file '{path}': {source}")]
    ConfigFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid JSON for a server config
    #[error("failed to parse config file '{path}': {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Environment variable holds a value of the wrong shape
    #[error("environment variable '{variable}' has invalid value '{value}': {message}")]
    Environment {
        variable: String,
        value: String,
        message: String,
    },

    /// Listener could not be bound
    #[error("failed to listen on {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    /// Failure from the cache core, including storage root setup
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The HTTP server stopped with an error
    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

impl ServerError {
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}
