//! Process-wide Qdrant session.
//!
//! [`SessionManager::global`] hands out one manager per process. It owns at
//! most one client handle at a time: `init` creates it, `close` releases it,
//! and `connected` probes it without ever failing.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use async_trait::async_trait;
use core_config::{FromEnv, QdrantConfig};
use once_cell::sync::OnceCell;
use qdrant_client::Qdrant;
use tracing::{debug, error, info};

use crate::error::{OdmError, OdmResult};

/// A connection handle the manager can own and probe.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionHandle: Send + Sync {
    /// Lightweight metadata round trip against the database.
    async fn probe(&self) -> OdmResult<()>;

    /// Release resources held by the handle.
    fn close(&self) {}
}

#[async_trait]
impl SessionHandle for Qdrant {
    async fn probe(&self) -> OdmResult<()> {
        self.list_collections().await?;
        Ok(())
    }
}

/// Build a Qdrant client from configuration. The channel is opened lazily.
pub fn connect(config: &QdrantConfig) -> Result<Qdrant, qdrant_client::QdrantError> {
    let mut builder = Qdrant::from_url(&config.url);

    if let Some(api_key) = &config.api_key {
        builder = builder.api_key(api_key.clone());
    }

    builder = builder.timeout(config.timeout());

    builder.build()
}

struct Session<H> {
    handle: Arc<H>,
    timeout: Duration,
}

pub struct SessionManager<H: SessionHandle = Qdrant> {
    session: RwLock<Option<Session<H>>>,
}

static GLOBAL: OnceCell<SessionManager> = OnceCell::new();

impl SessionManager {
    /// The process-wide manager. Every call returns the same instance.
    pub fn global() -> &'static SessionManager {
        GLOBAL.get_or_init(SessionManager::new)
    }

    /// Read `QDRANT_URL` / `QDRANT_API_KEY` and connect.
    pub fn init(&self) -> OdmResult<Arc<Qdrant>> {
        let config = QdrantConfig::from_env().map_err(|e| {
            error!(error = %e, "Qdrant configuration is incomplete");
            OdmError::Connection(e.to_string())
        })?;

        self.init_from_config(&config)
    }

    pub fn init_from_config(&self, config: &QdrantConfig) -> OdmResult<Arc<Qdrant>> {
        self.init_with(config, connect)
    }
}

impl<H: SessionHandle> SessionManager<H> {
    pub fn new() -> Self {
        Self {
            session: RwLock::new(None),
        }
    }

    /// Establish the handle with `connector`.
    ///
    /// Failures are logged and returned as [`OdmError::Connection`]; nothing is
    /// retried. A successful init replaces and closes any previous handle.
    pub fn init_with<F, E>(&self, config: &QdrantConfig, connector: F) -> OdmResult<Arc<H>>
    where
        F: FnOnce(&QdrantConfig) -> Result<H, E>,
        E: std::fmt::Debug + std::fmt::Display,
    {
        let handle = match connector(config) {
            Ok(handle) => Arc::new(handle),
            Err(e) => {
                error!(url = %config.url, error = ?e, "Failed to connect to Qdrant");
                return Err(OdmError::Connection(format!(
                    "Failed to connect to {}: {}",
                    config.url, e
                )));
            }
        };

        let previous = self.write().replace(Session {
            handle: Arc::clone(&handle),
            timeout: config.timeout(),
        });

        if let Some(previous) = previous {
            previous.handle.close();
            debug!("Replaced previous Qdrant handle");
        }

        info!(url = %config.url, "Connected to Qdrant");
        Ok(handle)
    }

    /// The current handle, if `init` has run and `close` has not.
    pub fn get_client(&self) -> Option<Arc<H>> {
        self.read().as_ref().map(|session| Arc::clone(&session.handle))
    }

    /// Release the handle. Calling it without a handle does nothing.
    pub fn close(&self) {
        let Some(session) = self.write().take() else {
            return;
        };

        session.handle.close();
        info!("Qdrant connection closed");
    }

    /// `true` only when a handle exists and answers the probe in time.
    pub async fn connected(&self) -> bool {
        let Some((handle, timeout)) = self
            .read()
            .as_ref()
            .map(|session| (Arc::clone(&session.handle), session.timeout))
        else {
            return false;
        };

        match tokio::time::timeout(timeout, handle.probe()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                debug!(error = %e, "Qdrant liveness probe failed");
                false
            }
            Err(_) => {
                debug!(timeout_secs = timeout.as_secs(), "Qdrant liveness probe timed out");
                false
            }
        }
    }

    // The lock only guards an Option swap, so a poisoned lock still holds a
    // consistent value.
    fn read(&self) -> RwLockReadGuard<'_, Option<Session<H>>> {
        self.session.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, Option<Session<H>>> {
        self.session.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl<H: SessionHandle> Default for SessionManager<H> {
    fn default() -> Self {
        Self::new()
    }
}
