//! Bidirectional mapping between native [`Value`]s and wire [`AttributeValue`]s.
//!
//! Encoding fails only for values the wire format cannot hold (empty sets).
//! Decoding fails for wire values that break the format's invariants: empty or
//! repeated set members, `NULL: false`, or number text that is not decimal.
//! Nesting depth is not limited here.

mod number;
mod value;

use std::collections::{BTreeSet, HashMap};

use dynaxpr_model::AttributeValue;
use serde::Deserialize;

pub use number::Number;
pub use value::Value;

use crate::error::CodecError;

/// An item as native values.
pub type Item = HashMap<String, Value>;

pub use dynaxpr_model::output::WireItem;

/// Encodes a native value.
pub fn encode(value: &Value) -> Result<AttributeValue, CodecError> {
    Ok(match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Number(n) => AttributeValue::N(n.as_str().to_owned()),
        Value::Binary(b) => AttributeValue::B(b.clone()),
        Value::StringSet(set) => {
            non_empty(value, set)?;
            AttributeValue::Ss(set.iter().cloned().collect())
        }
        Value::NumberSet(set) => {
            non_empty(value, set)?;
            AttributeValue::Ns(set.iter().map(|n| n.as_str().to_owned()).collect())
        }
        Value::BinarySet(set) => {
            non_empty(value, set)?;
            AttributeValue::Bs(set.iter().cloned().collect())
        }
        Value::List(items) => AttributeValue::L(items.iter().map(encode).collect::<Result<_, _>>()?),
        Value::Map(map) => AttributeValue::M(encode_item(map)?),
    })
}

fn non_empty<T>(value: &Value, set: &BTreeSet<T>) -> Result<(), CodecError> {
    if set.is_empty() {
        return Err(CodecError::UnsupportedType {
            kind: value.kind().to_owned(),
            reason: "sets must have at least one member".to_owned(),
        });
    }
    Ok(())
}

/// Decodes a wire value.
pub fn decode(value: &AttributeValue) -> Result<Value, CodecError> {
    Ok(match value {
        AttributeValue::S(s) => Value::String(s.clone()),
        AttributeValue::N(n) => Value::Number(parse_wire_number(n)?),
        AttributeValue::B(b) => Value::Binary(b.clone()),
        AttributeValue::Bool(b) => Value::Bool(*b),
        AttributeValue::Null(true) => Value::Null,
        AttributeValue::Null(false) => {
            return Err(CodecError::MalformedWireValue {
                reason: "NULL must be true".to_owned(),
            });
        }
        AttributeValue::Ss(members) => {
            Value::StringSet(collect_set("SS", members.len(), members.iter().cloned())?)
        }
        AttributeValue::Ns(members) => {
            let numbers = members
                .iter()
                .map(|n| parse_wire_number(n))
                .collect::<Result<Vec<_>, _>>()?;
            Value::NumberSet(collect_set("NS", members.len(), numbers)?)
        }
        AttributeValue::Bs(members) => {
            Value::BinarySet(collect_set("BS", members.len(), members.iter().cloned())?)
        }
        AttributeValue::L(items) => Value::List(items.iter().map(decode).collect::<Result<_, _>>()?),
        AttributeValue::M(map) => Value::Map(decode_item(map)?),
    })
}

fn parse_wire_number(text: &str) -> Result<Number, CodecError> {
    text.parse().map_err(|_| CodecError::MalformedWireValue {
        reason: format!("{text:?} is not a decimal number"),
    })
}

fn collect_set<T: Ord>(
    tag: &str,
    len: usize,
    members: impl IntoIterator<Item = T>,
) -> Result<BTreeSet<T>, CodecError> {
    if len == 0 {
        return Err(CodecError::MalformedWireValue {
            reason: format!("{tag} must not be empty"),
        });
    }
    let set: BTreeSet<T> = members.into_iter().collect();
    if set.len() != len {
        return Err(CodecError::MalformedWireValue {
            reason: format!("{tag} contains duplicate members"),
        });
    }
    Ok(set)
}

/// Decodes a raw wire JSON value such as `{"S": "hello"}`.
///
/// Fails when the object has zero or several type tags, or an unknown one.
pub fn decode_json(json: &serde_json::Value) -> Result<Value, CodecError> {
    let wire = AttributeValue::deserialize(json).map_err(|e| CodecError::MalformedWireValue {
        reason: e.to_string(),
    })?;
    decode(&wire)
}

/// Encodes every attribute of an item.
pub fn encode_item(item: &Item) -> Result<WireItem, CodecError> {
    item.iter()
        .map(|(name, value)| {
            encode(value)
                .map(|v| (name.clone(), v))
                .map_err(|e| e.at(name))
        })
        .collect()
}

/// Decodes every attribute of a wire item.
pub fn decode_item(item: &WireItem) -> Result<Item, CodecError> {
    item.iter()
        .map(|(name, value)| {
            decode(value)
                .map(|v| (name.clone(), v))
                .map_err(|e| e.at(name))
        })
        .collect()
}
