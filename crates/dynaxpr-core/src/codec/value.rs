//! Native value model mapped onto DynamoDB attribute values.

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use bytes::Bytes;

use super::number::Number;
use crate::error::CodecError;

/// A native value that the codec can encode.
///
/// Sets are `BTreeSet`s: their members share one kind and never repeat.
/// `String(String::new())` and `Binary(Bytes::new())` are valid values,
/// distinct from `Null`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Null.
    Null,
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    String(String),
    /// Decimal number.
    Number(Number),
    /// Raw bytes.
    Binary(Bytes),
    /// Set of strings.
    StringSet(BTreeSet<String>),
    /// Set of numbers.
    NumberSet(BTreeSet<Number>),
    /// Set of byte strings.
    BinarySet(BTreeSet<Bytes>),
    /// Ordered list.
    List(Vec<Value>),
    /// String-keyed map.
    Map(HashMap<String, Value>),
}

impl Value {
    /// Human-readable name of the value's kind, used in error messages.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Number(_) => "number",
            Self::Binary(_) => "binary",
            Self::StringSet(_) => "string set",
            Self::NumberSet(_) => "number set",
            Self::BinarySet(_) => "binary set",
            Self::List(_) => "list",
            Self::Map(_) => "map",
        }
    }

    /// Builds a binary value.
    pub fn binary(bytes: impl Into<Bytes>) -> Self {
        Self::Binary(bytes.into())
    }

    /// Builds a list, converting each element.
    ///
    /// `Vec<u8>` converts to `Binary`; use this for a list of small numbers.
    pub fn list<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Builds a string set.
    pub fn string_set<I, S>(members: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::StringSet(members.into_iter().map(Into::into).collect())
    }

    /// Builds a number set.
    pub fn number_set<I, N>(members: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<Number>,
    {
        Self::NumberSet(members.into_iter().map(Into::into).collect())
    }

    /// Returns `true` for `Null`.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns the string if this is a `String`.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the number if this is a `Number`.
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Self::Number(n) => Some(n),
            _ => None,
        }
    }

    /// Returns the map if this is a `Map`.
    #[must_use]
    pub fn as_map(&self) -> Option<&HashMap<String, Value>> {
        match self {
            Self::Map(m) => Some(m),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::String(s) => write!(f, "{s:?}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Binary(b) => write!(f, "<{} bytes>", b.len()),
            Self::StringSet(set) => write_seq(f, "{", "}", set.iter().map(|s| format!("{s:?}"))),
            Self::NumberSet(set) => write_seq(f, "{", "}", set.iter().map(ToString::to_string)),
            Self::BinarySet(set) => {
                write_seq(f, "{", "}", set.iter().map(|b| format!("<{} bytes>", b.len())))
            }
            Self::List(list) => write_seq(f, "[", "]", list.iter().map(ToString::to_string)),
            Self::Map(map) => {
                let mut entries: Vec<_> = map.iter().collect();
                entries.sort_by_key(|(k, _)| *k);
                write_seq(f, "{", "}", entries.into_iter().map(|(k, v)| format!("{k}: {v}")))
            }
        }
    }
}

fn write_seq(
    f: &mut fmt::Formatter<'_>,
    open: &str,
    close: &str,
    items: impl Iterator<Item = String>,
) -> fmt::Result {
    f.write_str(open)?;
    for (i, item) in items.enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        f.write_str(&item)?;
    }
    f.write_str(close)
}

// ---------------------------------------------------------------------------
// Conversions from native Rust values
// ---------------------------------------------------------------------------

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Self::Number(n)
    }
}

macro_rules! impl_value_from_integer {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Self::Number(Number::from(n))
                }
            }
        )*
    };
}

impl_value_from_integer!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize);

impl TryFrom<f64> for Value {
    type Error = CodecError;

    fn try_from(n: f64) -> Result<Self, Self::Error> {
        Number::try_from(n).map(Self::Number)
    }
}

impl From<Bytes> for Value {
    fn from(b: Bytes) -> Self {
        Self::Binary(b)
    }
}

impl From<&[u8]> for Value {
    fn from(b: &[u8]) -> Self {
        Self::Binary(Bytes::copy_from_slice(b))
    }
}

impl From<BTreeSet<String>> for Value {
    fn from(set: BTreeSet<String>) -> Self {
        Self::StringSet(set)
    }
}

impl From<BTreeSet<Number>> for Value {
    fn from(set: BTreeSet<Number>) -> Self {
        Self::NumberSet(set)
    }
}

impl From<BTreeSet<Bytes>> for Value {
    fn from(set: BTreeSet<Bytes>) -> Self {
        Self::BinarySet(set)
    }
}

impl From<Vec<u8>> for Value {
    fn from(b: Vec<u8>) -> Self {
        Self::Binary(Bytes::from(b))
    }
}

impl From<Vec<Value>> for Value {
    fn from(list: Vec<Value>) -> Self {
        Self::List(list)
    }
}

impl<T: Into<Value>> From<HashMap<String, T>> for Value {
    fn from(map: HashMap<String, T>) -> Self {
        Self::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl TryFrom<serde_json::Value> for Value {
    type Error = CodecError;

    /// Maps plain JSON onto native values. JSON has no sets or binary, so
    /// arrays become lists and strings stay strings.
    fn try_from(json: serde_json::Value) -> Result<Self, Self::Error> {
        Ok(match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.to_string().parse()?),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => Self::List(
                items
                    .into_iter()
                    .map(Self::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(map) => Self::Map(
                map.into_iter()
                    .map(|(k, v)| Self::try_from(v).map(|v| (k, v)))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use dynaxpr_model::AttributeValue;

    use super::*;

    #[test]
    fn test_should_map_option_to_null() {
        assert_eq!(Value::from(None::<String>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".to_owned()));
    }

    #[test]
    fn test_should_deduplicate_set_members() {
        let set = Value::string_set(["a", "b", "a"]);
        assert!(matches!(set, Value::StringSet(ref s) if s.len() == 2));
    }

    #[test]
    fn test_should_convert_json_document() {
        let json = serde_json::json!({"name": "a", "age": 3, "tags": ["x", null], "ok": true});
        let value = Value::try_from(json).unwrap();
        let map = value.as_map().unwrap();
        assert_eq!(map["name"], Value::from("a"));
        assert_eq!(map["age"], Value::from(3));
        assert_eq!(map["tags"], Value::List(vec![Value::from("x"), Value::Null]));
        assert_eq!(map["ok"], Value::Bool(true));
    }

    #[test]
    fn test_should_treat_byte_vec_as_binary() {
        let value = Value::from(vec![1u8, 2, 3]);
        assert_eq!(value, Value::binary(vec![1u8, 2, 3]));
        assert_eq!(
            crate::codec::encode(&value).unwrap(),
            AttributeValue::B(Bytes::from_static(&[1, 2, 3]))
        );

        let list = Value::list([1u8, 2, 3]);
        assert_eq!(
            list,
            Value::List(vec![Value::from(1), Value::from(2), Value::from(3)])
        );
    }

    #[test]
    fn test_should_display_values_inline() {
        let value = Value::List(vec![Value::from("a"), Value::from(1), Value::Null]);
        assert_eq!(value.to_string(), r#"["a", 1, null]"#);
    }
}
