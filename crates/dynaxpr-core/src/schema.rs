//! Key schema model with multi-attribute partition and sort keys.
//!
//! A partition (hash) key has 1 to 4 attributes and a sort (range) key has 0
//! to 4. Attribute order is significant: sort key attributes are matched left
//! to right in queries.

use std::fmt;

use dynaxpr_model::types::{AttributeDefinition, KeySchemaElement, KeyType, ScalarAttributeType};

use crate::codec::{Item, Value};
use crate::error::SchemaError;

/// Maximum number of attributes in one key component.
pub const MAX_KEY_ATTRIBUTES: usize = 4;

/// Scalar type of a key attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAttributeType {
    /// String key (`S`).
    String,
    /// Number key (`N`).
    Number,
    /// Binary key (`B`).
    Binary,
}

impl KeyAttributeType {
    /// Returns `true` if `value` has this type.
    #[must_use]
    pub fn matches(self, value: &Value) -> bool {
        matches!(
            (self, value),
            (Self::String, Value::String(_))
                | (Self::Number, Value::Number(_))
                | (Self::Binary, Value::Binary(_))
        )
    }

    /// The wire attribute type.
    #[must_use]
    pub fn scalar(self) -> ScalarAttributeType {
        match self {
            Self::String => ScalarAttributeType::S,
            Self::Number => ScalarAttributeType::N,
            Self::Binary => ScalarAttributeType::B,
        }
    }

    /// Parses a wire attribute type; `None` for anything but `S`, `N` or `B`.
    #[must_use]
    pub fn from_scalar(scalar: &ScalarAttributeType) -> Option<Self> {
        match scalar {
            ScalarAttributeType::S => Some(Self::String),
            ScalarAttributeType::N => Some(Self::Number),
            ScalarAttributeType::B => Some(Self::Binary),
            ScalarAttributeType::Unknown(_) => None,
        }
    }
}

impl fmt::Display for KeyAttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Binary => "binary",
        })
    }
}

/// One key attribute: its name and declared type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeySpec {
    name: String,
    attribute_type: KeyAttributeType,
}

impl KeySpec {
    /// Creates a key spec.
    pub fn new(name: impl Into<String>, attribute_type: KeyAttributeType) -> Self {
        Self {
            name: name.into(),
            attribute_type,
        }
    }

    /// A string key attribute.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, KeyAttributeType::String)
    }

    /// A number key attribute.
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, KeyAttributeType::Number)
    }

    /// A binary key attribute.
    pub fn binary(name: impl Into<String>) -> Self {
        Self::new(name, KeyAttributeType::Binary)
    }

    /// The attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared type.
    #[must_use]
    pub fn attribute_type(&self) -> KeyAttributeType {
        self.attribute_type
    }

    /// Checks that `value` has the declared type.
    pub fn check(&self, value: &Value) -> Result<(), SchemaError> {
        if self.attribute_type.matches(value) {
            Ok(())
        } else {
            Err(SchemaError::KeyTypeMismatch {
                attribute: self.name.clone(),
                expected: self.attribute_type,
                actual: value.kind(),
            })
        }
    }
}

/// The key schema of a table or index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySchema {
    hash_key: Vec<KeySpec>,
    range_key: Vec<KeySpec>,
}

impl KeySchema {
    /// Builds a schema from ordered partition and sort key attributes.
    ///
    /// An empty `range_key` means the table has no sort key.
    pub fn new(
        hash_key: impl IntoIterator<Item = KeySpec>,
        range_key: impl IntoIterator<Item = KeySpec>,
    ) -> Result<Self, SchemaError> {
        let hash_key: Vec<KeySpec> = hash_key.into_iter().collect();
        let range_key: Vec<KeySpec> = range_key.into_iter().collect();

        if hash_key.is_empty() || hash_key.len() > MAX_KEY_ATTRIBUTES {
            return Err(SchemaError::InvalidKeySchema {
                reason: format!(
                    "partition key must have 1-{MAX_KEY_ATTRIBUTES} attributes, got {}",
                    hash_key.len()
                ),
            });
        }
        if range_key.len() > MAX_KEY_ATTRIBUTES {
            return Err(SchemaError::InvalidKeySchema {
                reason: format!(
                    "sort key must have 0-{MAX_KEY_ATTRIBUTES} attributes, got {}",
                    range_key.len()
                ),
            });
        }

        let mut seen = std::collections::HashSet::new();
        for spec in hash_key.iter().chain(&range_key) {
            if !seen.insert(spec.name()) {
                return Err(SchemaError::InvalidKeySchema {
                    reason: format!("attribute `{}` is declared more than once", spec.name()),
                });
            }
        }

        Ok(Self {
            hash_key,
            range_key,
        })
    }

    /// A schema with one partition key attribute and an optional sort key
    /// attribute.
    pub fn single(hash_key: KeySpec, range_key: Option<KeySpec>) -> Result<Self, SchemaError> {
        Self::new([hash_key], range_key)
    }

    /// Partition key attributes, in declared order.
    #[must_use]
    pub fn hash_key(&self) -> &[KeySpec] {
        &self.hash_key
    }

    /// Sort key attributes, in declared order. Empty without a sort key.
    #[must_use]
    pub fn range_key(&self) -> &[KeySpec] {
        &self.range_key
    }

    /// All key attributes: partition key first, then sort key.
    pub fn specs(&self) -> impl Iterator<Item = &KeySpec> {
        self.hash_key.iter().chain(&self.range_key)
    }

    /// Looks up a key attribute by name.
    #[must_use]
    pub fn find(&self, name: &str) -> Option<(KeyType, &KeySpec)> {
        if let Some(spec) = self.hash_key.iter().find(|s| s.name() == name) {
            return Some((KeyType::Hash, spec));
        }
        self.range_key
            .iter()
            .find(|s| s.name() == name)
            .map(|spec| (KeyType::Range, spec))
    }

    /// Checks that `item` carries every key attribute with the declared type.
    pub fn validate_item_keys(&self, item: &Item) -> Result<(), SchemaError> {
        for spec in self.specs() {
            let value = item
                .get(spec.name())
                .ok_or_else(|| SchemaError::MissingKeyAttribute {
                    attribute: spec.name().to_owned(),
                })?;
            spec.check(value)?;
        }
        Ok(())
    }

    /// Returns only the key attributes of a full item, validated.
    pub fn extract_key(&self, item: &Item) -> Result<Item, SchemaError> {
        self.validate_item_keys(item)?;
        Ok(self
            .specs()
            .filter_map(|spec| {
                item.get(spec.name())
                    .map(|value| (spec.name().to_owned(), value.clone()))
            })
            .collect())
    }

    /// Wire key schema: one element per attribute, `HASH` elements first.
    #[must_use]
    pub fn key_schema_elements(&self) -> Vec<KeySchemaElement> {
        let element = |spec: &KeySpec, key_type| KeySchemaElement {
            attribute_name: spec.name().to_owned(),
            key_type,
        };
        self.hash_key
            .iter()
            .map(|spec| element(spec, KeyType::Hash))
            .chain(self.range_key.iter().map(|spec| element(spec, KeyType::Range)))
            .collect()
    }

    /// Wire attribute definitions for every key attribute.
    #[must_use]
    pub fn attribute_definitions(&self) -> Vec<AttributeDefinition> {
        self.specs()
            .map(|spec| AttributeDefinition {
                attribute_name: spec.name().to_owned(),
                attribute_type: spec.attribute_type().scalar(),
            })
            .collect()
    }

    /// Rebuilds a schema from a table description's key schema and attribute
    /// definitions.
    pub fn from_wire(
        elements: &[KeySchemaElement],
        definitions: &[AttributeDefinition],
    ) -> Result<Self, SchemaError> {
        let mut hash_key = Vec::new();
        let mut range_key = Vec::new();
        for element in elements {
            let name = &element.attribute_name;
            let definition = definitions
                .iter()
                .find(|d| &d.attribute_name == name)
                .ok_or_else(|| SchemaError::InvalidKeySchema {
                    reason: format!("no attribute definition for key attribute `{name}`"),
                })?;
            let attribute_type = KeyAttributeType::from_scalar(&definition.attribute_type)
                .ok_or_else(|| SchemaError::InvalidKeySchema {
                    reason: format!(
                        "key attribute `{name}` has unsupported type {}",
                        definition.attribute_type
                    ),
                })?;
            let spec = KeySpec::new(name.clone(), attribute_type);
            match element.key_type {
                KeyType::Hash => hash_key.push(spec),
                KeyType::Range => range_key.push(spec),
            }
        }
        Self::new(hash_key, range_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composite() -> KeySchema {
        KeySchema::new(
            [KeySpec::string("tenant"), KeySpec::string("region")],
            [KeySpec::string("date"), KeySpec::number("seq")],
        )
        .unwrap()
    }

    #[test]
    fn test_should_reject_empty_partition_key() {
        let err = KeySchema::new(Vec::new(), [KeySpec::string("sk")]).unwrap_err();
        assert!(err.to_string().contains("partition key must have 1-4"), "{err}");
    }

    #[test]
    fn test_should_reject_five_attribute_key() {
        let specs = (0..5).map(|i| KeySpec::string(format!("a{i}")));
        let err = KeySchema::new([KeySpec::string("pk")], specs).unwrap_err();
        assert!(err.to_string().contains("sort key must have 0-4"), "{err}");
    }

    #[test]
    fn test_should_reject_duplicate_names() {
        let err = KeySchema::new(
            [KeySpec::string("a"), KeySpec::number("a")],
            Vec::new(),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::InvalidKeySchema { .. }));
        assert!(KeySchema::single(KeySpec::string("a"), Some(KeySpec::string("a"))).is_err());
    }

    #[test]
    fn test_should_report_missing_key_attribute() {
        let item: Item = [
            ("tenant".to_owned(), Value::from("acme")),
            ("date".to_owned(), Value::from("2025-01-01")),
            ("seq".to_owned(), Value::from(1)),
        ]
        .into_iter()
        .collect();
        let err = composite().validate_item_keys(&item).unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingKeyAttribute {
                attribute: "region".to_owned()
            }
        );
    }

    #[test]
    fn test_should_report_key_type_mismatch() {
        let item: Item = [
            ("tenant".to_owned(), Value::from("acme")),
            ("region".to_owned(), Value::from("eu")),
            ("date".to_owned(), Value::from("2025-01-01")),
            ("seq".to_owned(), Value::from("one")),
        ]
        .into_iter()
        .collect();
        let err = composite().validate_item_keys(&item).unwrap_err();
        assert_eq!(
            err,
            SchemaError::KeyTypeMismatch {
                attribute: "seq".to_owned(),
                expected: KeyAttributeType::Number,
                actual: "string",
            }
        );
    }

    #[test]
    fn test_should_extract_key_from_item() {
        let schema = KeySchema::single(KeySpec::string("pk"), None).unwrap();
        let item: Item = [
            ("pk".to_owned(), Value::from("a")),
            ("other".to_owned(), Value::from(1)),
        ]
        .into_iter()
        .collect();
        let key = schema.extract_key(&item).unwrap();
        assert_eq!(key.len(), 1);
        assert_eq!(key["pk"], Value::from("a"));
    }

    #[test]
    fn test_should_emit_hash_elements_before_range() {
        let elements = composite().key_schema_elements();
        let names: Vec<_> = elements
            .iter()
            .map(|e| (e.attribute_name.as_str(), e.key_type))
            .collect();
        assert_eq!(
            names,
            vec![
                ("tenant", KeyType::Hash),
                ("region", KeyType::Hash),
                ("date", KeyType::Range),
                ("seq", KeyType::Range),
            ]
        );
    }

    #[test]
    fn test_should_rebuild_schema_from_wire() {
        let schema = composite();
        let rebuilt =
            KeySchema::from_wire(&schema.key_schema_elements(), &schema.attribute_definitions())
                .unwrap();
        assert_eq!(rebuilt, schema);
    }

    #[test]
    fn test_should_reject_wire_schema_without_definition() {
        let elements = vec![KeySchemaElement {
            attribute_name: "pk".to_owned(),
            key_type: KeyType::Hash,
        }];
        let err = KeySchema::from_wire(&elements, &[]).unwrap_err();
        assert!(err.to_string().contains("`pk`"), "{err}");
    }
}
