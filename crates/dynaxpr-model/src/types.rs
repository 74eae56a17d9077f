//! Enumerations and small structs shared by several request shapes.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Declares a closed enum whose wire form is a fixed string per variant.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$doc:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$doc])* #[serde(rename = $wire)] $variant,)+
        }

        impl $name {
            /// Wire spelling.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

wire_enum! {
    /// Role of an attribute in a key schema. Multi-attribute keys repeat the
    /// role once per attribute.
    KeyType {
        /// Partition key component.
        Hash => "HASH",
        /// Sort key component.
        Range => "RANGE",
    }
}

wire_enum! {
    /// What a write returns about the item it touched.
    ReturnValue {
        /// Nothing.
        None => "NONE",
        /// The whole item before the write.
        AllOld => "ALL_OLD",
        /// Only the updated attributes, before the write.
        UpdatedOld => "UPDATED_OLD",
        /// The whole item after the write.
        AllNew => "ALL_NEW",
        /// Only the updated attributes, after the write.
        UpdatedNew => "UPDATED_NEW",
    }
}

wire_enum! {
    /// How much capacity accounting the response includes.
    ReturnConsumedCapacity {
        /// Table and per-index totals.
        Indexes => "INDEXES",
        /// A single total.
        Total => "TOTAL",
        /// No accounting.
        None => "NONE",
    }
}

wire_enum! {
    /// Which attributes a `Query` or `Scan` returns.
    Select {
        /// Every attribute.
        AllAttributes => "ALL_ATTRIBUTES",
        /// Every attribute projected into the index.
        AllProjectedAttributes => "ALL_PROJECTED_ATTRIBUTES",
        /// Those named by the projection expression.
        SpecificAttributes => "SPECIFIC_ATTRIBUTES",
        /// Only the match count.
        Count => "COUNT",
    }
}

/// Scalar type of a key attribute.
///
/// Anything other than `S`, `N` or `B` read from a table description is kept
/// as `Unknown` so the schema layer can report it with context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ScalarAttributeType {
    /// String.
    S,
    /// Number.
    N,
    /// Binary.
    B,
    /// Unrecognised type name.
    Unknown(String),
}

impl ScalarAttributeType {
    /// Wire spelling.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::S => "S",
            Self::N => "N",
            Self::B => "B",
            Self::Unknown(other) => other,
        }
    }

    /// Only `S`, `N` and `B` may type a key attribute.
    #[must_use]
    pub fn is_valid_key_type(&self) -> bool {
        !matches!(self, Self::Unknown(_))
    }
}

impl From<String> for ScalarAttributeType {
    fn from(name: String) -> Self {
        match name.as_str() {
            "S" => Self::S,
            "N" => Self::N,
            "B" => Self::B,
            _ => Self::Unknown(name),
        }
    }
}

impl Serialize for ScalarAttributeType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_str().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ScalarAttributeType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        String::deserialize(deserializer).map(Self::from)
    }
}

impl fmt::Display for ScalarAttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One attribute of a key schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct KeySchemaElement {
    /// Attribute name.
    pub attribute_name: String,
    /// `HASH` or `RANGE`.
    pub key_type: KeyType,
}

/// Declared scalar type of a key attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AttributeDefinition {
    /// Attribute name.
    pub attribute_name: String,
    /// `S`, `N` or `B`.
    pub attribute_type: ScalarAttributeType,
}

/// Capacity units charged to one table or index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Capacity {
    /// Read units.
    pub read_capacity_units: Option<f64>,
    /// Write units.
    pub write_capacity_units: Option<f64>,
    /// Read plus write units.
    pub capacity_units: Option<f64>,
}

/// Capacity accounting attached to a response when requested.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConsumedCapacity {
    /// Table the units were charged to.
    pub table_name: Option<String>,
    /// Total units for the call.
    pub capacity_units: Option<f64>,
    /// Units charged to the base table.
    pub table: Option<Capacity>,
    /// Units charged to each global secondary index.
    #[serde(default)]
    pub global_secondary_indexes: HashMap<String, Capacity>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_serialize_key_schema_element() {
        let element = KeySchemaElement {
            attribute_name: "tenant".to_owned(),
            key_type: KeyType::Hash,
        };
        let json = serde_json::to_string(&element).unwrap();
        assert_eq!(json, r#"{"AttributeName":"tenant","KeyType":"HASH"}"#);
    }

    #[test]
    fn test_should_parse_unknown_scalar_type_leniently() {
        let def: AttributeDefinition =
            serde_json::from_str(r#"{"AttributeName":"a","AttributeType":"BOOL"}"#).unwrap();
        assert_eq!(
            def.attribute_type,
            ScalarAttributeType::Unknown("BOOL".to_owned())
        );
        assert!(!def.attribute_type.is_valid_key_type());
    }

    #[test]
    fn test_should_use_screaming_case_on_the_wire() {
        assert_eq!(
            serde_json::to_string(&Select::SpecificAttributes).unwrap(),
            r#""SPECIFIC_ATTRIBUTES""#
        );
        let parsed: ReturnValue = serde_json::from_str(r#""UPDATED_NEW""#).unwrap();
        assert_eq!(parsed, ReturnValue::UpdatedNew);
        assert_eq!(ReturnConsumedCapacity::Total.to_string(), "TOTAL");
    }

    #[test]
    fn test_should_parse_consumed_capacity() {
        let capacity: ConsumedCapacity =
            serde_json::from_str(r#"{"TableName":"t","CapacityUnits":0.5}"#).unwrap();
        assert_eq!(capacity.table_name.as_deref(), Some("t"));
        assert!(capacity.capacity_units.is_some_and(|units| (units - 0.5).abs() < f64::EPSILON));
        assert!(capacity.global_secondary_indexes.is_empty());
    }
}
