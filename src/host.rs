//! Dynamically-typed values exchanged with the host.
//!
//! `HostValue` mirrors the value kinds a garbage-collected host hands across
//! the boundary, with `Undefined` and `Null` kept distinct. JSON values convert
//! losslessly into it, which is how configuration files and tests build option
//! objects.
use crate::mat::Mat;
use std::collections::BTreeMap;

pub type HostObject = BTreeMap<String, HostValue>;

#[derive(Clone, Debug, Default, PartialEq)]
pub enum HostValue {
    #[default]
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    Array(Vec<HostValue>),
    Object(HostObject),
    Mat(Mat),
}

impl HostValue {
    /// Builds an object from `(key, value)` pairs.
    pub fn object<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<HostValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        HostValue::Object(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    pub fn array<V: Into<HostValue>, I: IntoIterator<Item = V>>(items: I) -> Self {
        HostValue::Array(items.into_iter().map(Into::into).collect())
    }

    /// Name of the value kind as the host reports it.
    pub fn kind_name(&self) -> &'static str {
        match self {
            HostValue::Undefined => "undefined",
            HostValue::Null => "null",
            HostValue::Bool(_) => "boolean",
            HostValue::Number(_) => "number",
            HostValue::String(_) => "string",
            HostValue::Array(_) => "array",
            HostValue::Object(_) => "object",
            HostValue::Mat(_) => "Mat",
        }
    }

    /// `undefined` or `null`.
    pub fn is_nullish(&self) -> bool {
        matches!(self, HostValue::Undefined | HostValue::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            HostValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Integral number that fits an `i64`.
    pub fn as_integer(&self) -> Option<i64> {
        let n = self.as_number()?;
        (n.is_finite() && n.fract() == 0.0 && n.abs() <= i64::MAX as f64).then_some(n as i64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HostValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[HostValue]> {
        match self {
            HostValue::Array(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&HostObject> {
        match self {
            HostValue::Object(map) => Some(map),
            _ => None,
        }
    }

    pub fn as_mat(&self) -> Option<&Mat> {
        match self {
            HostValue::Mat(m) => Some(m),
            _ => None,
        }
    }

    /// Object property lookup; missing keys read as `undefined`.
    pub fn get(&self, key: &str) -> &HostValue {
        const UNDEFINED: &HostValue = &HostValue::Undefined;
        self.as_object()
            .and_then(|map| map.get(key))
            .unwrap_or(UNDEFINED)
    }
}

impl From<bool> for HostValue {
    fn from(v: bool) -> Self {
        HostValue::Bool(v)
    }
}

impl From<f64> for HostValue {
    fn from(v: f64) -> Self {
        HostValue::Number(v)
    }
}

impl From<f32> for HostValue {
    fn from(v: f32) -> Self {
        HostValue::Number(v as f64)
    }
}

impl From<i32> for HostValue {
    fn from(v: i32) -> Self {
        HostValue::Number(v as f64)
    }
}

impl From<u8> for HostValue {
    fn from(v: u8) -> Self {
        HostValue::Number(v as f64)
    }
}

impl From<usize> for HostValue {
    fn from(v: usize) -> Self {
        HostValue::Number(v as f64)
    }
}

impl From<&str> for HostValue {
    fn from(v: &str) -> Self {
        HostValue::String(v.to_string())
    }
}

impl From<String> for HostValue {
    fn from(v: String) -> Self {
        HostValue::String(v)
    }
}

impl From<Mat> for HostValue {
    fn from(m: Mat) -> Self {
        HostValue::Mat(m)
    }
}

impl<T: Into<HostValue>> From<Vec<T>> for HostValue {
    fn from(items: Vec<T>) -> Self {
        HostValue::array(items)
    }
}

impl<T: Into<HostValue>> From<Option<T>> for HostValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(HostValue::Undefined, Into::into)
    }
}

impl From<serde_json::Value> for HostValue {
    fn from(v: serde_json::Value) -> Self {
        use serde_json::Value;
        match v {
            Value::Null => HostValue::Null,
            Value::Bool(b) => HostValue::Bool(b),
            Value::Number(n) => n.as_f64().map_or(HostValue::Null, HostValue::Number),
            Value::String(s) => HostValue::String(s),
            Value::Array(items) => HostValue::array(items),
            Value::Object(map) => HostValue::object(map),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn json_converts_structurally() {
        let v = HostValue::from(json!({ "code": 44, "size": [3, 2], "flag": true, "none": null }));
        assert_eq!(v.get("code").as_integer(), Some(44));
        assert_eq!(v.get("size").as_array().map(<[_]>::len), Some(2));
        assert_eq!(v.get("flag").as_bool(), Some(true));
        assert_eq!(v.get("none"), &HostValue::Null);
        assert_eq!(v.get("missing"), &HostValue::Undefined);
    }

    #[test]
    fn nullish_and_kind_names() {
        assert!(HostValue::Undefined.is_nullish());
        assert!(HostValue::Null.is_nullish());
        assert!(!HostValue::Number(0.0).is_nullish());
        assert_eq!(HostValue::from("x").kind_name(), "string");
        assert_eq!(HostValue::from(None::<f64>), HostValue::Undefined);
    }

    #[test]
    fn integer_view_rejects_fractions() {
        assert_eq!(HostValue::Number(3.0).as_integer(), Some(3));
        assert_eq!(HostValue::Number(3.5).as_integer(), None);
        assert_eq!(HostValue::Number(f64::NAN).as_integer(), None);
    }
}
