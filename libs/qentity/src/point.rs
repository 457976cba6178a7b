//! Accepted point shapes and the persisted wire shape.
//!
//! `from_qdrant` takes anything convertible into [`PointInput`]: a JSON mapping,
//! the [`QdrantPoint`] wire struct, or one of the client's point types. Every
//! shape is normalized once into a [`RawPoint`] before decoding.

use std::collections::HashMap;

use qdrant_client::qdrant::{
    self, point_id::PointIdOptions, vectors::VectorsOptions, vectors_output, PointStruct,
    RetrievedPoint, ScoredPoint,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{OdmError, OdmResult};
use crate::model::{PointId, VectorMap, DEFAULT_VECTOR_NAME};
use crate::payload::{json_payload_to_qdrant, json_type_name, qdrant_payload_to_json};

/// Persisted point: `{ id, payload, vector? }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QdrantPoint {
    pub id: String,
    #[serde(default)]
    pub payload: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vector: Option<VectorMap>,
}

impl QdrantPoint {
    /// The wire shape as a JSON mapping.
    pub fn to_json(&self) -> OdmResult<Value> {
        Ok(serde_json::to_value(self)?)
    }
}

impl TryFrom<QdrantPoint> for PointStruct {
    type Error = OdmError;

    fn try_from(point: QdrantPoint) -> Result<Self, Self::Error> {
        let id = PointId::parse_str(&point.id)?;

        Ok(PointStruct {
            id: Some(id.into()),
            payload: json_payload_to_qdrant(point.payload),
            vectors: point.vector.map(qdrant::Vectors::from),
        })
    }
}

/// Every point shape `from_qdrant` understands.
#[derive(Debug, Clone)]
pub enum PointInput {
    /// A generic mapping with `id`, `payload` and optional `vector` keys.
    Map(Value),
    Wire(QdrantPoint),
    Struct(PointStruct),
    Retrieved(RetrievedPoint),
    Scored(ScoredPoint),
}

/// Point id as found on the input, before parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum RawId {
    Text(String),
    Num(u64),
    Missing,
}

impl RawId {
    pub fn into_point_id(self) -> OdmResult<PointId> {
        match self {
            RawId::Text(text) => PointId::parse_str(&text),
            RawId::Num(num) => Err(OdmError::Format(format!(
                "Numeric point id {} is not a UUID",
                num
            ))),
            RawId::Missing => Err(OdmError::Format("Point has no id".to_string())),
        }
    }

    fn from_json(value: Option<Value>) -> OdmResult<Self> {
        match value {
            None | Some(Value::Null) => Ok(RawId::Missing),
            Some(Value::String(text)) => Ok(RawId::Text(text)),
            Some(Value::Number(n)) => n.as_u64().map(RawId::Num).ok_or_else(|| {
                OdmError::Format(format!("Point id {} is not a valid identifier", n))
            }),
            Some(other) => Err(OdmError::Format(format!(
                "Point id must be a string, got {}",
                json_type_name(&other)
            ))),
        }
    }

    fn from_qdrant(id: Option<qdrant::PointId>) -> Self {
        match id.and_then(|id| id.point_id_options) {
            Some(PointIdOptions::Uuid(text)) => RawId::Text(text),
            Some(PointIdOptions::Num(num)) => RawId::Num(num),
            None => RawId::Missing,
        }
    }
}

/// A point reduced to its three parts. The payload is always an owned copy.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPoint {
    pub id: RawId,
    pub payload: Map<String, Value>,
    pub vector: Option<VectorMap>,
}

impl PointInput {
    pub fn into_raw(self) -> OdmResult<RawPoint> {
        match self {
            PointInput::Map(value) => raw_from_json(value),
            PointInput::Wire(point) => Ok(RawPoint {
                id: RawId::Text(point.id),
                payload: point.payload,
                vector: point.vector,
            }),
            PointInput::Struct(point) => Ok(RawPoint {
                id: RawId::from_qdrant(point.id),
                payload: qdrant_payload_to_json(point.payload),
                vector: point.vectors.and_then(vectors_to_map),
            }),
            PointInput::Retrieved(point) => Ok(RawPoint {
                id: RawId::from_qdrant(point.id),
                payload: qdrant_payload_to_json(point.payload),
                vector: point.vectors.and_then(vectors_output_to_map),
            }),
            PointInput::Scored(point) => Ok(RawPoint {
                id: RawId::from_qdrant(point.id),
                payload: qdrant_payload_to_json(point.payload),
                vector: point.vectors.and_then(vectors_output_to_map),
            }),
        }
    }
}

fn raw_from_json(value: Value) -> OdmResult<RawPoint> {
    let mut map = match value {
        Value::Object(map) => map,
        other => {
            return Err(OdmError::Format(format!(
                "Unknown point format: {}",
                json_type_name(&other)
            )));
        }
    };

    let id = RawId::from_json(map.remove("id"))?;

    let payload = match map.remove("payload") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(payload)) => payload,
        Some(other) => {
            return Err(OdmError::Format(format!(
                "Point payload must be a mapping, got {}",
                json_type_name(&other)
            )));
        }
    };

    let vector = match map.remove("vector") {
        None | Some(Value::Null) => None,
        Some(vector) => Some(
            serde_json::from_value::<VectorMap>(vector)
                .map_err(|e| OdmError::Format(format!("Invalid named vectors: {}", e)))?,
        ),
    };

    Ok(RawPoint {
        id,
        payload,
        vector,
    })
}

fn vectors_to_map(vectors: qdrant::Vectors) -> Option<VectorMap> {
    match vectors.vectors_options? {
        VectorsOptions::Vector(vector) => Some(HashMap::from([(
            DEFAULT_VECTOR_NAME.to_string(),
            dense_input(vector),
        )])),
        VectorsOptions::Vectors(named) => Some(
            named
                .vectors
                .into_iter()
                .map(|(name, vector)| (name, dense_input(vector)))
                .collect(),
        ),
    }
}

fn vectors_output_to_map(vectors: qdrant::VectorsOutput) -> Option<VectorMap> {
    match vectors.vectors_options? {
        vectors_output::VectorsOptions::Vector(vector) => Some(HashMap::from([(
            DEFAULT_VECTOR_NAME.to_string(),
            dense_output(vector),
        )])),
        vectors_output::VectorsOptions::Vectors(named) => Some(
            named
                .vectors
                .into_iter()
                .map(|(name, vector)| (name, dense_output(vector)))
                .collect(),
        ),
    }
}

// The typed oneof wins; the deprecated `data` field is only read from
// points built by older clients that leave the oneof empty.
#[allow(deprecated)]
fn dense_input(vector: qdrant::Vector) -> Vec<f32> {
    match vector.vector {
        Some(qdrant::vector::Vector::Dense(dense)) => dense.data,
        _ => vector.data,
    }
}

#[allow(deprecated)]
fn dense_output(vector: qdrant::VectorOutput) -> Vec<f32> {
    match vector.vector {
        Some(qdrant::vector_output::Vector::Dense(dense)) => dense.data,
        _ => vector.data,
    }
}

impl From<Value> for PointInput {
    fn from(value: Value) -> Self {
        PointInput::Map(value)
    }
}

impl From<&Value> for PointInput {
    fn from(value: &Value) -> Self {
        PointInput::Map(value.clone())
    }
}

impl From<Map<String, Value>> for PointInput {
    fn from(map: Map<String, Value>) -> Self {
        PointInput::Map(Value::Object(map))
    }
}

impl From<QdrantPoint> for PointInput {
    fn from(point: QdrantPoint) -> Self {
        PointInput::Wire(point)
    }
}

impl From<&QdrantPoint> for PointInput {
    fn from(point: &QdrantPoint) -> Self {
        PointInput::Wire(point.clone())
    }
}

impl From<PointStruct> for PointInput {
    fn from(point: PointStruct) -> Self {
        PointInput::Struct(point)
    }
}

impl From<RetrievedPoint> for PointInput {
    fn from(point: RetrievedPoint) -> Self {
        PointInput::Retrieved(point)
    }
}

impl From<ScoredPoint> for PointInput {
    fn from(point: ScoredPoint) -> Self {
        PointInput::Scored(point)
    }
}
