//! Typed entities on top of Qdrant points.
//!
//! An entity is a plain struct deriving [`PointModel`](macro@PointModel). Its `id`
//! becomes the point id, its `vector` field the named vectors, and every other
//! field the payload, tagged with the entity's `point_type` discriminator.
//!
//! ```ignore
//! use qentity::{PointId, PointModel, SessionManager, VectorMap};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Default, Serialize, Deserialize, PointModel)]
//! #[point_model(point_type = "article")]
//! pub struct Article {
//!     pub id: PointId,
//!     pub vector: Option<VectorMap>,
//!     pub title: String,
//! }
//!
//! let client = SessionManager::global().init()?;
//! let point = Article::default().to_point_struct(true)?;
//! let back = Article::from_qdrant(point)?;
//! ```
//!
//! The session manager owns the client; reads and writes go straight through
//! the client it hands out.

extern crate self as qentity;

pub mod capabilities;
pub mod error;
pub mod model;
pub mod payload;
pub mod point;
pub mod session;

pub use capabilities::{Embeddable, EmbeddingService, EmbeddingServices, HasTimestamps, Timestamps};
pub use error::{FieldError, OdmError, OdmResult};
pub use model::{PointId, PointModel, PointType, VectorMap, DEFAULT_VECTOR_NAME, POINT_TYPE_KEY};
pub use point::{PointInput, QdrantPoint};
pub use session::{connect, SessionHandle, SessionManager};

#[cfg(feature = "derive")]
pub use point_model::PointModel;

pub use core_config::QdrantConfig;
pub use qdrant_client::Qdrant;
pub use uuid::Uuid;
pub use validator;
