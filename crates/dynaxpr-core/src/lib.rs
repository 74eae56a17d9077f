//! Translation core for dynaxpr.
//!
//! Converts native values to and from DynamoDB `AttributeValue`s, models key
//! schemas with multi-attribute partition and sort keys, builds condition,
//! update and projection expressions with placeholder maps, and validates key
//! conditions against a schema before they are sent.
//!
//! Everything here is pure and synchronous.
#![allow(clippy::doc_markdown)]

pub mod codec;
pub mod error;
pub mod expression;
pub mod schema;

pub use codec::{Item, Number, Value, WireItem, decode, decode_item, decode_json, encode, encode_item};
pub use error::{CodecError, Error, ExpressionError, KeyConditionError, Result, SchemaError};
pub use expression::{
    AttributePath, CompiledExpression, Condition, ExpressionParams, HashKey, KeyCondition,
    MultiHashKey, ProjectionExpression, RangeKey, UpdateExpression, attr, compile,
    compile_key_condition, compile_projection, compile_update, validate_and_build_key_condition,
};
pub use schema::{KeyAttributeType, KeySchema, KeySpec};
