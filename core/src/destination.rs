use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A typed argument carried by a [`Destination`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum ParamValue {
    String(String),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Boolean(bool),
    /// Name of an enum member.
    Enum(String),
    Json(serde_json::Value),
}

impl ParamValue {
    /// Lossless view as a JSON value, used by [`Destination::arg_as`].
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ParamValue::String(s) | ParamValue::Enum(s) => serde_json::Value::from(s.as_str()),
            ParamValue::Int(v) => serde_json::Value::from(*v),
            ParamValue::Long(v) => serde_json::Value::from(*v),
            ParamValue::Float(v) => serde_json::Value::from(*v),
            ParamValue::Double(v) => serde_json::Value::from(*v),
            ParamValue::Boolean(v) => serde_json::Value::from(*v),
            ParamValue::Json(v) => v.clone(),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ParamValue::String(s) | ParamValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ParamValue::Int(v) => Some(i64::from(*v)),
            ParamValue::Long(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ParamValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for ParamValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamValue::String(s) | ParamValue::Enum(s) => f.write_str(s),
            ParamValue::Int(v) => write!(f, "{v}"),
            ParamValue::Long(v) => write!(f, "{v}"),
            ParamValue::Float(v) => write!(f, "{v}"),
            ParamValue::Double(v) => write!(f, "{v}"),
            ParamValue::Boolean(v) => write!(f, "{v}"),
            ParamValue::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Int(value)
    }
}

impl From<i64> for ParamValue {
    fn from(value: i64) -> Self {
        ParamValue::Long(value)
    }
}

impl From<f32> for ParamValue {
    fn from(value: f32) -> Self {
        ParamValue::Float(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Double(value)
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Boolean(value)
    }
}

impl From<serde_json::Value> for ParamValue {
    fn from(value: serde_json::Value) -> Self {
        ParamValue::Json(value)
    }
}

/// Where a screen points: an application-defined route id plus typed arguments.
///
/// The core never interprets `route`; the rendering layer maps it to a view
/// and the deep-link registry maps it to a URI pattern.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Destination {
    pub route: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, ParamValue>,
}

impl Destination {
    pub fn new(route: impl Into<String>) -> Self {
        Self {
            route: route.into(),
            args: BTreeMap::new(),
        }
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    pub fn arg(&self, name: &str) -> Option<&ParamValue> {
        self.args.get(name)
    }

    /// Decode an argument into an application type.
    ///
    /// Returns `Ok(None)` when the argument is absent.
    pub fn arg_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, serde_json::Error> {
        self.args
            .get(name)
            .map(|v| serde_json::from_value(v.to_json()))
            .transpose()
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.route)?;
        if self.args.is_empty() {
            return Ok(());
        }
        f.write_str("(")?;
        for (i, (name, value)) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{name} = {value}")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Filter {
        tag: String,
        limit: u32,
    }

    #[test]
    fn test_display_lists_arguments() {
        let dest = Destination::new("Profile").with_arg("userId", 42);
        assert_eq!(dest.to_string(), "Profile(userId = 42)");
        assert_eq!(Destination::new("Home").to_string(), "Home");
    }

    #[test]
    fn test_arg_as_decodes_json_argument() {
        let dest = Destination::new("Search")
            .with_arg("filter", serde_json::json!({ "tag": "rust", "limit": 5 }));
        let filter: Option<Filter> = dest.arg_as("filter").unwrap();
        assert_eq!(
            filter,
            Some(Filter {
                tag: "rust".into(),
                limit: 5
            })
        );
        assert_eq!(dest.arg_as::<Filter>("missing").unwrap(), None);
    }
}
