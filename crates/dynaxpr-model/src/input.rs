//! Request bodies of the item operations.
//!
//! Unset options and empty placeholder maps are left out of the JSON, so a
//! request without expressions serializes to just its table and key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attribute_value::AttributeValue;
use crate::output::WireItem;
use crate::types::{ReturnConsumedCapacity, ReturnValue, Select};

/// `#name` placeholder to attribute name.
pub type AttributeNames = HashMap<String, String>;

/// `:value` placeholder to wire value.
pub type AttributeValues = HashMap<String, AttributeValue>;

/// Body of `GetItem`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemInput {
    /// Target table.
    pub table_name: String,
    /// Full primary key.
    pub key: WireItem,
    /// Attributes to return; all when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
    /// Name placeholders used by the projection.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: AttributeNames,
    /// Strongly consistent read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
    /// Capacity accounting level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

/// Body of `PutItem`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PutItemInput {
    /// Target table.
    pub table_name: String,
    /// The full item, key attributes included.
    pub item: WireItem,
    /// Guard that must hold for the write to happen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    /// Name placeholders used by the condition.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: AttributeNames,
    /// Value placeholders used by the condition.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: AttributeValues,
    /// `NONE` or `ALL_OLD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_values: Option<ReturnValue>,
    /// Capacity accounting level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

/// Body of `UpdateItem`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct UpdateItemInput {
    /// Target table.
    pub table_name: String,
    /// Full primary key.
    pub key: WireItem,
    /// `SET`/`REMOVE`/`ADD`/`DELETE` clauses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_expression: Option<String>,
    /// Guard that must hold for the write to happen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    /// Name placeholders shared by the update and the condition.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: AttributeNames,
    /// Value placeholders shared by the update and the condition.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: AttributeValues,
    /// Which attributes come back.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_values: Option<ReturnValue>,
    /// Capacity accounting level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

/// Body of `DeleteItem`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeleteItemInput {
    /// Target table.
    pub table_name: String,
    /// Full primary key.
    pub key: WireItem,
    /// Guard that must hold for the delete to happen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_expression: Option<String>,
    /// Name placeholders used by the condition.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: AttributeNames,
    /// Value placeholders used by the condition.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: AttributeValues,
    /// `NONE` or `ALL_OLD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_values: Option<ReturnValue>,
    /// Capacity accounting level.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_consumed_capacity: Option<ReturnConsumedCapacity>,
}

/// Body of `Query`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct QueryInput {
    /// Target table.
    pub table_name: String,
    /// Secondary index to read instead of the table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    /// Partition equality plus an optional sort-key predicate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_condition_expression: Option<String>,
    /// Applied after the key condition; does not reduce items read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
    /// Attributes to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
    /// Name placeholders shared by every expression above.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: AttributeNames,
    /// Value placeholders shared by every expression above.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: AttributeValues,
    /// `false` walks the sort key backwards.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scan_index_forward: Option<bool>,
    /// Upper bound on items read for this page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// `LastEvaluatedKey` of the previous page.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub exclusive_start_key: WireItem,
    /// Attribute selection mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Select>,
    /// Strongly consistent read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
}

/// Body of `Scan`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ScanInput {
    /// Target table.
    pub table_name: String,
    /// Secondary index to read instead of the table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_name: Option<String>,
    /// Applied to every item read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter_expression: Option<String>,
    /// Attributes to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub projection_expression: Option<String>,
    /// Name placeholders shared by the filter and projection.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_names: AttributeNames,
    /// Value placeholders used by the filter.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub expression_attribute_values: AttributeValues,
    /// Upper bound on items read for this page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
    /// `LastEvaluatedKey` of the previous page.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub exclusive_start_key: WireItem,
    /// Attribute selection mode.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub select: Option<Select>,
    /// Strongly consistent read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistent_read: Option<bool>,
}
