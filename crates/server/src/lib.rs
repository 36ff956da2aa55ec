//! HTTP front end for the bcached cache
//!
//! [`Server`] wires a [`FileStore`](bcached_cache::FileStore) and the
//! arbitrator behind the routes in [`gateway`]. Configuration is layered by
//! [`ServerConfigLoader`].

pub mod config;
pub mod errors;
pub mod gateway;
pub mod server;

pub use config::{ConfigLayer, ConfigSource, ServerConfig, ServerConfigLoader};
pub use errors::{Result, ServerError};
pub use gateway::{router, ApiError, ClientPayload, GatewayState};
pub use server::{shutdown_signal, Server};
