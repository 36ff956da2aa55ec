//! Process-level server: storage root, arbitrator, listener

use crate::config::ServerConfig;
use crate::errors::{Result, ServerError};
use crate::gateway::{self, GatewayState};
use bcached_cache::{CacheHandle, FileStore, RecordStore, RootStatus};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// A bound, not yet serving cache server
pub struct Server {
    listener: TcpListener,
    cache: CacheHandle,
    state: GatewayState,
}

impl Server {
    /// Validate `config`, prepare the storage root and bind the listener
    pub async fn bind(config: ServerConfig) -> Result<Self> {
        config.validate()?;

        let (store, status) = FileStore::open(config.data_dir.clone()).await?;
        match status {
            RootStatus::AlreadyExists => {
                debug!(path = %store.root().display(), "storage root already exists")
            }
            RootStatus::Created => {
                info!(path = %store.root().display(), "created storage root")
            }
        }

        let address = config.address();
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind { address, source })?;

        Self::start(&config, Arc::new(store), listener)
    }

    /// Spawn the arbitrator over `store` and attach it to an already bound
    /// listener
    pub fn start(
        config: &ServerConfig,
        store: Arc<dyn RecordStore>,
        listener: TcpListener,
    ) -> Result<Self> {
        let cache = CacheHandle::spawn(store, &config.arbitrator())?;
        let state = GatewayState::new(
            cache.clone(),
            config.request_timeout,
            config.empty_expectation,
        );

        Ok(Self {
            listener,
            cache,
            state,
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr().map_err(|source| ServerError::Bind {
            address: "listener".to_string(),
            source,
        })
    }

    pub fn cache(&self) -> &CacheHandle {
        &self.cache
    }

    /// Serve until Ctrl-C or SIGTERM
    pub async fn serve(self) -> Result<()> {
        self.serve_with_shutdown(shutdown_signal()).await
    }

    /// Serve until `signal` resolves, then stop the arbitrator
    ///
    /// Requests already accepted by the arbitrator finish before it stops.
    pub async fn serve_with_shutdown(
        self,
        signal: impl Future<Output = ()> + Send + 'static,
    ) -> Result<()> {
        let Self {
            listener,
            cache,
            state,
        } = self;

        if let Ok(addr) = listener.local_addr() {
            info!(%addr, "listening");
        }

        let result = axum::serve(listener, gateway::router(state))
            .with_graceful_shutdown(signal)
            .await;

        cache.shutdown().await;
        info!("server stopped");
        result.map_err(ServerError::Serve)
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}
