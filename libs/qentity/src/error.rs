use std::fmt;

use thiserror::Error;

/// Field name reported when a decoding error cannot be pinned to one field.
pub const PAYLOAD_FIELD: &str = "<payload>";

#[derive(Debug, Error)]
pub enum OdmError {
    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Format error: {0}")]
    Format(String),

    #[error("Validation failed for {model}: {}", join_field_errors(.errors))]
    Validation {
        model: &'static str,
        errors: Vec<FieldError>,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Qdrant error: {0}")]
    Qdrant(String),
}

pub type OdmResult<T> = Result<T, OdmError>;

/// One failed field of a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl OdmError {
    /// Wrap a payload decoding failure, naming the field at the error path.
    pub(crate) fn decode(
        model: &'static str,
        err: &serde_path_to_error::Error<serde_json::Error>,
    ) -> Self {
        let message = err.inner().to_string();
        let path = err.path().to_string();
        let at_root = path == ".";

        let missing = message
            .strip_prefix("missing field `")
            .and_then(|rest| rest.split('`').next());

        let field = match missing {
            Some(name) if at_root => name.to_string(),
            Some(name) => format!("{}.{}", path, name),
            None if at_root => PAYLOAD_FIELD.to_string(),
            None => path,
        };

        OdmError::Validation {
            model,
            errors: vec![FieldError::new(field, message)],
        }
    }

    pub(crate) fn rules(model: &'static str, errors: &validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, failures)| {
                failures.iter().map(move |failure| {
                    let message = failure
                        .message
                        .as_ref()
                        .map(ToString::to_string)
                        .unwrap_or_else(|| failure.code.to_string());
                    FieldError::new(field.to_string(), message)
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));

        if fields.is_empty() {
            fields.push(FieldError::new(PAYLOAD_FIELD, errors.to_string()));
        }

        OdmError::Validation {
            model,
            errors: fields,
        }
    }

    /// Names of the fields that failed, for validation errors.
    pub fn failed_fields(&self) -> Vec<&str> {
        match self {
            OdmError::Validation { errors, .. } => {
                errors.iter().map(|error| error.field.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

impl From<qdrant_client::QdrantError> for OdmError {
    fn from(err: qdrant_client::QdrantError) -> Self {
        OdmError::Qdrant(err.to_string())
    }
}

impl From<serde_json::Error> for OdmError {
    fn from(err: serde_json::Error) -> Self {
        OdmError::Serialization(err.to_string())
    }
}
