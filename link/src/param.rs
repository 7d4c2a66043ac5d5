//! Typed parameter declarations and their string conversions.

use crate::error::{DeepLinkError, DeepLinkResult};
use serde::{Deserialize, Serialize};
use waymark_core::ParamValue;

/// How a parameter travels as text inside a URI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SerializerKind {
    String,
    Int,
    Long,
    Float,
    Double,
    Boolean,
    Enum { variants: Vec<String> },
    Json,
}

impl SerializerKind {
    pub fn enumeration<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        SerializerKind::Enum {
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SerializerKind::String => "string",
            SerializerKind::Int => "int",
            SerializerKind::Long => "long",
            SerializerKind::Float => "float",
            SerializerKind::Double => "double",
            SerializerKind::Boolean => "boolean",
            SerializerKind::Enum { .. } => "enum",
            SerializerKind::Json => "json",
        }
    }

    /// Convert an already percent-decoded string into a typed value.
    ///
    /// Numbers parse locale-independently; booleans ignore case; enum
    /// members match exactly.
    pub fn decode(&self, name: &str, raw: &str) -> DeepLinkResult<ParamValue> {
        let invalid = || DeepLinkError::InvalidParameterType {
            name: name.to_string(),
            expected: self.name().to_string(),
            value: raw.to_string(),
        };

        let value = match self {
            SerializerKind::String => ParamValue::String(raw.to_string()),
            SerializerKind::Int => ParamValue::Int(raw.parse().map_err(|_| invalid())?),
            SerializerKind::Long => ParamValue::Long(raw.parse().map_err(|_| invalid())?),
            SerializerKind::Float => ParamValue::Float(raw.parse().map_err(|_| invalid())?),
            SerializerKind::Double => ParamValue::Double(raw.parse().map_err(|_| invalid())?),
            SerializerKind::Boolean => {
                if raw.eq_ignore_ascii_case("true") {
                    ParamValue::Boolean(true)
                } else if raw.eq_ignore_ascii_case("false") {
                    ParamValue::Boolean(false)
                } else {
                    return Err(invalid());
                }
            }
            SerializerKind::Enum { variants } => {
                if !variants.iter().any(|v| v == raw) {
                    return Err(invalid());
                }
                ParamValue::Enum(raw.to_string())
            }
            SerializerKind::Json => {
                ParamValue::Json(serde_json::from_str(raw).map_err(|_| invalid())?)
            }
        };
        Ok(value)
    }

    /// Inverse of [`decode`](Self::decode); the result is not yet
    /// percent-encoded. `None` when `value` could not be decoded back as
    /// this kind.
    pub fn encode(&self, value: &ParamValue) -> Option<String> {
        if !self.accepts(value) {
            return None;
        }
        Some(match self {
            SerializerKind::Json => value.to_json().to_string(),
            _ => value.to_string(),
        })
    }

    /// Whether `value` is of this kind. Integers widen to `Long` and
    /// floats to `Double`.
    pub fn accepts(&self, value: &ParamValue) -> bool {
        match (self, value) {
            (SerializerKind::String, ParamValue::String(_))
            | (SerializerKind::Int, ParamValue::Int(_))
            | (SerializerKind::Long, ParamValue::Int(_) | ParamValue::Long(_))
            | (SerializerKind::Float, ParamValue::Float(_))
            | (SerializerKind::Double, ParamValue::Float(_) | ParamValue::Double(_))
            | (SerializerKind::Boolean, ParamValue::Boolean(_))
            | (SerializerKind::Json, _) => true,
            (SerializerKind::Enum { variants }, ParamValue::Enum(member)) => {
                variants.contains(member)
            }
            _ => false,
        }
    }
}

/// Declaration of one route parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamSpec {
    pub name: String,
    pub serializer_kind: SerializerKind,
    pub required: bool,
    pub default: Option<ParamValue>,
}

impl ParamSpec {
    pub fn required(name: impl Into<String>, kind: SerializerKind) -> Self {
        Self {
            name: name.into(),
            serializer_kind: kind,
            required: true,
            default: None,
        }
    }

    pub fn optional(name: impl Into<String>, kind: SerializerKind) -> Self {
        Self {
            name: name.into(),
            serializer_kind: kind,
            required: false,
            default: None,
        }
    }

    /// Value used when an optional parameter is absent from the URI.
    pub fn with_default(mut self, value: impl Into<ParamValue>) -> Self {
        self.default = Some(value.into());
        self
    }
}
