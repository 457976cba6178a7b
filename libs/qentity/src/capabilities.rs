//! Optional entity capabilities: timestamps and embeddable content.
//!
//! Each capability is a trait an entity opts into independently. Combine them
//! freely on the same type.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};

use crate::error::OdmResult;
use crate::model::{PointModel, VectorMap};

/// Creation and modification times, meant to be `#[serde(flatten)]`ed into an entity.
///
/// Serialized as RFC 3339 text. Missing values decode as "now".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default = "Utc::now")]
    pub updated_at: DateTime<Utc>,
}

impl Timestamps {
    pub fn now() -> Self {
        let now = Utc::now();
        Self {
            created_at: now,
            updated_at: now,
        }
    }

    /// Mark as modified now.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

impl Default for Timestamps {
    fn default() -> Self {
        Self::now()
    }
}

pub trait HasTimestamps {
    fn timestamps(&self) -> &Timestamps;

    fn timestamps_mut(&mut self) -> &mut Timestamps;

    fn created_at(&self) -> DateTime<Utc> {
        self.timestamps().created_at
    }

    fn updated_at(&self) -> DateTime<Utc> {
        self.timestamps().updated_at
    }

    fn touch(&mut self) {
        self.timestamps_mut().touch();
    }
}

/// Turns text into a dense vector.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EmbeddingService: Send + Sync {
    async fn embed(&self, text: &str) -> OdmResult<Vec<f32>>;
}

/// Named embedding services, called in insertion order.
#[derive(Clone, Default)]
pub struct EmbeddingServices {
    services: Vec<(String, Arc<dyn EmbeddingService>)>,
}

impl EmbeddingServices {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `service` under the vector name `name`, replacing a service
    /// already registered under that name in place.
    pub fn insert(&mut self, name: impl Into<String>, service: Arc<dyn EmbeddingService>) {
        let name = name.into();
        match self.services.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = service,
            None => self.services.push((name, service)),
        }
    }

    pub fn with(mut self, name: impl Into<String>, service: Arc<dyn EmbeddingService>) -> Self {
        self.insert(name, service);
        self
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.services.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Arc<dyn EmbeddingService>)> {
        self.services
            .iter()
            .map(|(name, service)| (name.as_str(), service))
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl fmt::Debug for EmbeddingServices {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

/// An entity with text content worth embedding.
#[async_trait]
pub trait Embeddable: Send + Sync {
    /// The text handed to every embedding service.
    fn embedding_content(&self) -> String;

    /// Per-vector embedding settings, keyed by vector name.
    fn embedding_config(&self) -> HashMap<String, String> {
        HashMap::new()
    }

    /// One vector per service, in service order.
    ///
    /// A failing service is logged and skipped. If every service fails the
    /// result is empty.
    async fn generate_embedding(&self, services: &EmbeddingServices) -> VectorMap {
        let content = self.embedding_content();
        let mut vectors = VectorMap::with_capacity(services.len());

        for (name, service) in services.iter() {
            match service.embed(&content).await {
                Ok(vector) => {
                    debug!(vector = name, dimensions = vector.len(), "Generated embedding");
                    vectors.insert(name.to_string(), vector);
                }
                Err(e) => {
                    error!(vector = name, error = %e, "Failed to embed content");
                }
            }
        }

        vectors
    }

    /// Generate vectors and attach them, keeping existing vectors the
    /// services did not produce.
    async fn embed_into(&mut self, services: &EmbeddingServices)
    where
        Self: PointModel,
    {
        let generated = self.generate_embedding(services).await;
        if generated.is_empty() {
            return;
        }

        let mut vectors = self.vector().cloned().unwrap_or_default();
        vectors.extend(generated);
        self.set_vector(Some(vectors));
    }
}
