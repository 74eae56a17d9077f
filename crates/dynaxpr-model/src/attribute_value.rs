//! The tagged `AttributeValue` of the DynamoDB JSON protocol.
//!
//! On the wire every value is an object with exactly one key naming its type,
//! e.g. `{"S": "hello"}` or `{"L": [{"N": "1"}]}`. Binary payloads are
//! base64 strings. Anything else is rejected when deserializing.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::{Hash, Hasher};

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use bytes::Bytes;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Every type tag, in wire spelling.
pub const TYPE_DESCRIPTORS: &[&str] = &["S", "N", "B", "SS", "NS", "BS", "BOOL", "NULL", "L", "M"];

/// The type tag carried by an [`AttributeValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeTag {
    /// `S`
    S,
    /// `N`
    N,
    /// `B`
    B,
    /// `SS`
    Ss,
    /// `NS`
    Ns,
    /// `BS`
    Bs,
    /// `BOOL`
    Bool,
    /// `NULL`
    Null,
    /// `L`
    L,
    /// `M`
    M,
}

impl AttributeTag {
    /// The wire spelling of the tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::S => "S",
            Self::N => "N",
            Self::B => "B",
            Self::Ss => "SS",
            Self::Ns => "NS",
            Self::Bs => "BS",
            Self::Bool => "BOOL",
            Self::Null => "NULL",
            Self::L => "L",
            Self::M => "M",
        }
    }

    /// Parse a wire tag. Tags are case-sensitive.
    #[must_use]
    pub fn parse(tag: &str) -> Option<Self> {
        let tag = match tag {
            "S" => Self::S,
            "N" => Self::N,
            "B" => Self::B,
            "SS" => Self::Ss,
            "NS" => Self::Ns,
            "BS" => Self::Bs,
            "BOOL" => Self::Bool,
            "NULL" => Self::Null,
            "L" => Self::L,
            "M" => Self::M,
            _ => return None,
        };
        Some(tag)
    }

    /// Returns `true` for `SS`, `NS` and `BS`.
    #[must_use]
    pub fn is_set(self) -> bool {
        matches!(self, Self::Ss | Self::Ns | Self::Bs)
    }
}

impl fmt::Display for AttributeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A DynamoDB attribute value as it travels on the wire.
///
/// Numbers stay decimal strings; interpreting them is up to the caller.
/// `Null` keeps its boolean payload so that a malformed `{"NULL": false}`
/// can be reported instead of silently accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeValue {
    /// String.
    S(String),
    /// Number, as decimal text.
    N(String),
    /// Binary.
    B(Bytes),
    /// String set.
    Ss(Vec<String>),
    /// Number set, as decimal text.
    Ns(Vec<String>),
    /// Binary set.
    Bs(Vec<Bytes>),
    /// Boolean.
    Bool(bool),
    /// Null.
    Null(bool),
    /// List.
    L(Vec<AttributeValue>),
    /// Map.
    M(HashMap<String, AttributeValue>),
}

macro_rules! payload_accessor {
    ($name:ident, $variant:ident, $ty:ty) => {
        #[doc = concat!("The payload of an `", stringify!($variant), "` value.")]
        #[must_use]
        pub fn $name(&self) -> Option<&$ty> {
            match self {
                Self::$variant(payload) => {
                    let payload: &$ty = payload;
                    Some(payload)
                }
                _ => None,
            }
        }
    };
}

impl AttributeValue {
    /// The type tag of this value.
    #[must_use]
    pub fn tag(&self) -> AttributeTag {
        match self {
            Self::S(_) => AttributeTag::S,
            Self::N(_) => AttributeTag::N,
            Self::B(_) => AttributeTag::B,
            Self::Ss(_) => AttributeTag::Ss,
            Self::Ns(_) => AttributeTag::Ns,
            Self::Bs(_) => AttributeTag::Bs,
            Self::Bool(_) => AttributeTag::Bool,
            Self::Null(_) => AttributeTag::Null,
            Self::L(_) => AttributeTag::L,
            Self::M(_) => AttributeTag::M,
        }
    }

    /// The wire spelling of this value's tag, e.g. `"BOOL"`.
    #[must_use]
    pub fn type_descriptor(&self) -> &'static str {
        self.tag().as_str()
    }

    /// Returns `true` for a well-formed null.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null(true))
    }

    /// The payload of a `Bool` value.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(flag) => Some(*flag),
            _ => None,
        }
    }

    payload_accessor!(as_s, S, str);
    payload_accessor!(as_n, N, str);
    payload_accessor!(as_b, B, Bytes);
    payload_accessor!(as_l, L, [AttributeValue]);
    payload_accessor!(as_m, M, HashMap<String, AttributeValue>);
}

impl Hash for AttributeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag().hash(state);
        match self {
            Self::S(text) | Self::N(text) => text.hash(state),
            Self::B(bytes) => bytes.hash(state),
            Self::Ss(members) | Self::Ns(members) => members.hash(state),
            Self::Bs(members) => members.hash(state),
            Self::Bool(flag) | Self::Null(flag) => flag.hash(state),
            Self::L(items) => items.hash(state),
            // HashMap iteration order is random; hash through a sorted view.
            Self::M(map) => map.iter().collect::<BTreeMap<_, _>>().hash(state),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = self.tag();
        match self {
            Self::S(text) => write!(f, "{tag}({text:?})"),
            Self::N(text) => write!(f, "{tag}({text})"),
            Self::B(bytes) => write!(f, "{tag}(<{} bytes>)", bytes.len()),
            Self::Ss(members) | Self::Ns(members) => write!(f, "{tag}{members:?}"),
            Self::Bs(members) => write!(f, "{tag}(<{} members>)", members.len()),
            Self::Bool(flag) | Self::Null(flag) => write!(f, "{tag}({flag})"),
            Self::L(items) => write!(f, "{tag}(<{} items>)", items.len()),
            Self::M(map) => write!(f, "{tag}(<{} attributes>)", map.len()),
        }
    }
}

// ---------------------------------------------------------------------------
// Serialization
// ---------------------------------------------------------------------------

/// Borrowed wire shape. Serde's external tagging produces the single-key
/// object; only the binary payloads need a custom encoding.
#[derive(Serialize)]
enum WireRef<'a> {
    S(&'a str),
    N(&'a str),
    #[serde(serialize_with = "serialize_binary")]
    B(&'a Bytes),
    #[serde(rename = "SS")]
    Ss(&'a [String]),
    #[serde(rename = "NS")]
    Ns(&'a [String]),
    #[serde(rename = "BS", serialize_with = "serialize_binary_set")]
    Bs(&'a [Bytes]),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null(bool),
    L(&'a [AttributeValue]),
    M(&'a HashMap<String, AttributeValue>),
}

#[allow(clippy::trivially_copy_pass_by_ref)]
fn serialize_binary<S: Serializer>(bytes: &&Bytes, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&BASE64.encode(bytes))
}

fn serialize_binary_set<S: Serializer>(
    members: &&[Bytes],
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(members.iter().map(|member| BASE64.encode(member)))
}

impl Serialize for AttributeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let wire = match self {
            Self::S(text) => WireRef::S(text),
            Self::N(text) => WireRef::N(text),
            Self::B(bytes) => WireRef::B(bytes),
            Self::Ss(members) => WireRef::Ss(members),
            Self::Ns(members) => WireRef::Ns(members),
            Self::Bs(members) => WireRef::Bs(members),
            Self::Bool(flag) => WireRef::Bool(*flag),
            Self::Null(flag) => WireRef::Null(*flag),
            Self::L(items) => WireRef::L(items),
            Self::M(map) => WireRef::M(map),
        };
        wire.serialize(serializer)
    }
}

// ---------------------------------------------------------------------------
// Deserialization
// ---------------------------------------------------------------------------

impl<'de> Deserialize<'de> for AttributeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TaggedVisitor)
    }
}

struct TaggedVisitor;

fn decode_binary<E: de::Error>(encoded: &str) -> Result<Bytes, E> {
    BASE64
        .decode(encoded)
        .map(Bytes::from)
        .map_err(|e| E::custom(format!("invalid base64 binary: {e}")))
}

impl<'de> Visitor<'de> for TaggedVisitor {
    type Value = AttributeValue;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an object with exactly one attribute type tag")
    }

    fn visit_map<M: MapAccess<'de>>(self, mut map: M) -> Result<Self::Value, M::Error> {
        let Some(key) = map.next_key::<String>()? else {
            return Err(de::Error::custom("attribute value has no type tag"));
        };
        let tag = AttributeTag::parse(&key)
            .ok_or_else(|| de::Error::unknown_variant(&key, TYPE_DESCRIPTORS))?;

        let value = match tag {
            AttributeTag::S => AttributeValue::S(map.next_value()?),
            AttributeTag::N => AttributeValue::N(map.next_value()?),
            AttributeTag::B => AttributeValue::B(decode_binary(&map.next_value::<String>()?)?),
            AttributeTag::Ss => AttributeValue::Ss(map.next_value()?),
            AttributeTag::Ns => AttributeValue::Ns(map.next_value()?),
            AttributeTag::Bs => {
                let encoded: Vec<String> = map.next_value()?;
                let members = encoded
                    .iter()
                    .map(|member| decode_binary(member))
                    .collect::<Result<_, _>>()?;
                AttributeValue::Bs(members)
            }
            AttributeTag::Bool => AttributeValue::Bool(map.next_value()?),
            AttributeTag::Null => AttributeValue::Null(map.next_value()?),
            AttributeTag::L => AttributeValue::L(map.next_value()?),
            AttributeTag::M => AttributeValue::M(map.next_value()?),
        };

        if let Some(extra) = map.next_key::<String>()? {
            return Err(de::Error::custom(format!(
                "attribute value has several type tags: {key} and {extra}"
            )));
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use serde_json::json;

    use super::*;

    fn to_json(value: &AttributeValue) -> serde_json::Value {
        serde_json::to_value(value).unwrap()
    }

    #[test]
    fn test_should_serialize_single_key_objects() {
        assert_eq!(to_json(&AttributeValue::S("hi".to_owned())), json!({"S": "hi"}));
        assert_eq!(to_json(&AttributeValue::N("-1.5".to_owned())), json!({"N": "-1.5"}));
        assert_eq!(to_json(&AttributeValue::Bool(false)), json!({"BOOL": false}));
        assert_eq!(to_json(&AttributeValue::Null(true)), json!({"NULL": true}));
        assert_eq!(
            to_json(&AttributeValue::Ns(vec!["1".to_owned(), "2".to_owned()])),
            json!({"NS": ["1", "2"]})
        );
        assert_eq!(
            to_json(&AttributeValue::L(vec![AttributeValue::S("a".to_owned())])),
            json!({"L": [{"S": "a"}]})
        );
    }

    #[test]
    fn test_should_base64_encode_binary_and_binary_sets() {
        let value = AttributeValue::B(Bytes::from_static(b"test data"));
        assert_eq!(to_json(&value), json!({"B": "dGVzdCBkYXRh"}));

        let set = AttributeValue::Bs(vec![Bytes::from_static(b"a"), Bytes::from_static(b"b")]);
        assert_eq!(to_json(&set), json!({"BS": ["YQ==", "Yg=="]}));
        let back: AttributeValue = serde_json::from_value(to_json(&set)).unwrap();
        assert_eq!(back, set);
    }

    #[test]
    fn test_should_keep_empty_string_distinct_from_null() {
        assert_eq!(to_json(&AttributeValue::S(String::new())), json!({"S": ""}));
        assert_ne!(AttributeValue::S(String::new()), AttributeValue::Null(true));
    }

    #[test]
    fn test_should_parse_nested_document() {
        let value: AttributeValue = serde_json::from_value(json!({
            "M": {"tags": {"SS": ["x"]}, "inner": {"M": {"deep": {"BOOL": true}}}}
        }))
        .unwrap();
        let map = value.as_m().unwrap();
        assert_eq!(map["tags"], AttributeValue::Ss(vec!["x".to_owned()]));
        assert_eq!(map["inner"].as_m().unwrap()["deep"].as_bool(), Some(true));
    }

    #[test]
    fn test_should_reject_missing_tag() {
        let err = serde_json::from_value::<AttributeValue>(json!({})).unwrap_err();
        assert!(err.to_string().contains("no type tag"), "{err}");
    }

    #[test]
    fn test_should_reject_several_tags() {
        let err = serde_json::from_str::<AttributeValue>(r#"{"S":"a","N":"1"}"#).unwrap_err();
        assert!(err.to_string().contains("several type tags: S and N"), "{err}");
    }

    #[test]
    fn test_should_reject_unknown_tag_and_bad_base64() {
        assert!(serde_json::from_value::<AttributeValue>(json!({"X": "a"})).is_err());
        assert!(serde_json::from_value::<AttributeValue>(json!({"s": "a"})).is_err());
        let err = serde_json::from_value::<AttributeValue>(json!({"B": "***"})).unwrap_err();
        assert!(err.to_string().contains("invalid base64"), "{err}");
    }

    #[test]
    fn test_should_round_trip_tags() {
        for descriptor in TYPE_DESCRIPTORS {
            let tag = AttributeTag::parse(descriptor).unwrap();
            assert_eq!(tag.as_str(), *descriptor);
        }
        assert!(AttributeTag::Bs.is_set());
        assert!(!AttributeTag::L.is_set());
    }

    #[test]
    fn test_should_hash_maps_independent_of_insertion_order() {
        let mut a = HashMap::new();
        a.insert("x".to_owned(), AttributeValue::N("1".to_owned()));
        a.insert("y".to_owned(), AttributeValue::N("2".to_owned()));
        let mut b = HashMap::new();
        b.insert("y".to_owned(), AttributeValue::N("2".to_owned()));
        b.insert("x".to_owned(), AttributeValue::N("1".to_owned()));

        let mut set = HashSet::new();
        set.insert(AttributeValue::M(a));
        assert!(set.contains(&AttributeValue::M(b)));
    }

    #[test]
    fn test_should_display_compact_form() {
        assert_eq!(AttributeValue::S("a".to_owned()).to_string(), r#"S("a")"#);
        assert_eq!(AttributeValue::B(Bytes::from_static(b"ab")).to_string(), "B(<2 bytes>)");
    }
}
