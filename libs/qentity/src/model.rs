use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use qdrant_client::qdrant::PointStruct;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;
use uuid::Uuid;

use crate::error::{OdmError, OdmResult};
use crate::payload::json_type_name;
use crate::point::{PointInput, QdrantPoint, RawPoint};

/// Payload key carrying the entity discriminator.
pub const POINT_TYPE_KEY: &str = "point_type";

/// Name Qdrant gives to the single unnamed vector of a collection.
pub const DEFAULT_VECTOR_NAME: &str = "";

/// Named dense vectors attached to a point, keyed by vector space name.
pub type VectorMap = HashMap<String, Vec<f32>>;

/// 128-bit point identifier.
///
/// `Default` generates a fresh random (v4) id, so entities deriving `Default`
/// get a new identity each time they are constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PointId(Uuid);

impl PointId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn parse_str(input: &str) -> OdmResult<Self> {
        Uuid::parse_str(input)
            .map(Self)
            .map_err(|e| OdmError::Format(format!("Invalid point id '{}': {}", input, e)))
    }
}

impl Default for PointId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for PointId {
    type Err = OdmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

impl From<Uuid> for PointId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<PointId> for Uuid {
    fn from(id: PointId) -> Self {
        id.0
    }
}

impl From<PointId> for qdrant_client::qdrant::PointId {
    fn from(id: PointId) -> Self {
        qdrant_client::qdrant::PointId::from(id.to_string())
    }
}

/// Discriminator contract. Every persisted entity type declares one.
pub trait PointType {
    const POINT_TYPE: &'static str;
}

/// An entity stored as a Qdrant point.
///
/// Implement it with `#[derive(PointModel)]`. Every serialized field except
/// `id` and `vector` becomes part of the payload.
pub trait PointModel: PointType + Serialize + DeserializeOwned {
    fn id(&self) -> PointId;

    fn vector(&self) -> Option<&VectorMap>;

    fn set_vector(&mut self, vector: Option<VectorMap>);

    /// Field rules checked after a payload is decoded.
    fn validate_fields(&self) -> Result<(), validator::ValidationErrors> {
        Ok(())
    }

    /// Build an entity from any accepted point shape.
    ///
    /// The discriminator is stripped from the payload, unknown payload keys are
    /// ignored, and a vector present on the point overrides the field default.
    fn from_qdrant(point: impl Into<PointInput>) -> OdmResult<Self> {
        let RawPoint {
            id,
            mut payload,
            vector,
        } = point.into().into_raw()?;

        payload.remove(POINT_TYPE_KEY);

        let id = id.into_point_id()?;
        payload.insert("id".to_string(), Value::String(id.to_string()));

        let mut instance: Self = serde_path_to_error::deserialize(Value::Object(payload))
            .map_err(|e| OdmError::decode(Self::POINT_TYPE, &e))?;

        instance
            .validate_fields()
            .map_err(|e| OdmError::rules(Self::POINT_TYPE, &e))?;

        if vector.is_some() {
            instance.set_vector(vector);
        }

        trace!(point_type = Self::POINT_TYPE, %id, "Decoded point");
        Ok(instance)
    }

    /// Convert into the `{ id, payload, vector? }` wire shape.
    fn to_qdrant(&self, include_vector: bool) -> OdmResult<QdrantPoint> {
        let mut payload = match serde_json::to_value(self)? {
            Value::Object(map) => map,
            other => {
                return Err(OdmError::Serialization(format!(
                    "{} serialized to {} instead of an object",
                    Self::POINT_TYPE,
                    json_type_name(&other)
                )));
            }
        };

        payload.remove("id");
        payload.remove("vector");
        payload.insert(
            POINT_TYPE_KEY.to_string(),
            Value::String(Self::POINT_TYPE.to_string()),
        );

        let vector = if include_vector {
            self.vector().cloned()
        } else {
            None
        };

        Ok(QdrantPoint {
            id: self.id().to_string(),
            payload,
            vector,
        })
    }

    /// Convert into a client `PointStruct`, ready for an upsert.
    fn to_point_struct(&self, include_vector: bool) -> OdmResult<PointStruct> {
        self.to_qdrant(include_vector)?.try_into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, crate::PointModel)]
    #[point_model(point_type = "note")]
    struct Note {
        id: PointId,
        vector: Option<VectorMap>,
        text: String,
        #[serde(default)]
        pinned: bool,
    }

    #[test]
    fn test_point_id_default_is_unique() {
        let a = PointId::default();
        let b = PointId::default();
        assert_ne!(a, b);
        assert_eq!(a.as_uuid().get_version_num(), 4);
    }

    #[test]
    fn test_point_id_canonical_string() {
        let id: PointId = "A1A2A3A4-B1B2-C1C2-D1D2-D3D4D5D6D7D8".parse().unwrap();
        assert_eq!(id.to_string(), "a1a2a3a4-b1b2-c1c2-d1d2-d3d4d5d6d7d8");
    }

    #[test]
    fn test_point_id_parse_error_is_format_error() {
        let err = PointId::parse_str("not-a-uuid").unwrap_err();
        assert!(matches!(err, OdmError::Format(_)));
        assert!(err.to_string().contains("not-a-uuid"));
    }

    #[test]
    fn test_point_id_into_qdrant_point_id() {
        use qdrant_client::qdrant::point_id::PointIdOptions;

        let id = PointId::new();
        let qdrant_id: qdrant_client::qdrant::PointId = id.into();
        assert_eq!(
            qdrant_id.point_id_options,
            Some(PointIdOptions::Uuid(id.to_string()))
        );
    }

    #[test]
    fn test_to_qdrant_injects_discriminator() {
        let note = Note {
            text: "hello".into(),
            ..Default::default()
        };

        let point = note.to_qdrant(true).unwrap();
        assert_eq!(point.id, note.id.to_string());
        assert_eq!(point.payload["point_type"], json!("note"));
        assert_eq!(point.payload["text"], json!("hello"));
        assert!(!point.payload.contains_key("id"));
        assert!(!point.payload.contains_key("vector"));
        assert!(point.vector.is_none());
    }

    #[test]
    fn test_to_qdrant_vector_flag() {
        let note = Note {
            vector: Some(VectorMap::from([("dense".to_string(), vec![0.5, 1.0])])),
            ..Default::default()
        };

        assert!(note.to_qdrant(true).unwrap().vector.is_some());
        assert!(note.to_qdrant(false).unwrap().vector.is_none());
    }

    #[test]
    fn test_from_qdrant_round_trip() {
        let note = Note {
            vector: Some(VectorMap::from([("dense".to_string(), vec![0.1, 0.2])])),
            text: "round trip".into(),
            pinned: true,
            ..Default::default()
        };

        let decoded = Note::from_qdrant(note.to_qdrant(true).unwrap()).unwrap();
        assert_eq!(decoded, note);
    }

    #[test]
    fn test_from_qdrant_uses_declared_defaults() {
        let id = PointId::new();
        let decoded = Note::from_qdrant(json!({
            "id": id.to_string(),
            "payload": { "text": "only text", "point_type": "note" }
        }))
        .unwrap();

        assert_eq!(decoded.id, id);
        assert!(!decoded.pinned);
        assert!(decoded.vector.is_none());
    }

    #[test]
    fn test_from_qdrant_missing_required_field() {
        let err = Note::from_qdrant(json!({
            "id": PointId::new().to_string(),
            "payload": { "pinned": true }
        }))
        .unwrap_err();

        assert_eq!(err.failed_fields(), vec!["text"]);
    }

    #[test]
    fn test_from_qdrant_wrong_field_type_names_the_field() {
        let err = Note::from_qdrant(json!({
            "id": PointId::new().to_string(),
            "payload": { "text": "x", "pinned": "yes" }
        }))
        .unwrap_err();

        assert!(matches!(err, OdmError::Validation { model: "note", .. }));
        assert_eq!(err.failed_fields(), vec!["pinned"]);
    }

    #[test]
    fn test_from_qdrant_payload_id_is_overridden_by_point_id() {
        let id = PointId::new();
        let decoded = Note::from_qdrant(json!({
            "id": id.to_string(),
            "payload": { "id": PointId::new().to_string(), "text": "x" }
        }))
        .unwrap();

        assert_eq!(decoded.id, id);
    }
}
