//! Response bodies of the item operations.
//!
//! The service omits empty collections, so every collection field defaults.
//! The three single-item writes share one shape, as do `Query` and `Scan`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::attribute_value::AttributeValue;
use crate::types::ConsumedCapacity;

/// An item as it appears in a response.
pub type WireItem = HashMap<String, AttributeValue>;

/// Response of `GetItem`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GetItemOutput {
    /// Absent when no item has the requested key.
    pub item: Option<WireItem>,
    /// Present when capacity accounting was requested.
    pub consumed_capacity: Option<ConsumedCapacity>,
}

/// Response of `PutItem`, `UpdateItem` and `DeleteItem`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WriteItemOutput {
    /// The attributes selected by `ReturnValues`; empty for `NONE`.
    #[serde(default)]
    pub attributes: WireItem,
    /// Present when capacity accounting was requested.
    pub consumed_capacity: Option<ConsumedCapacity>,
}

/// Response of `PutItem`.
pub type PutItemOutput = WriteItemOutput;
/// Response of `UpdateItem`.
pub type UpdateItemOutput = WriteItemOutput;
/// Response of `DeleteItem`.
pub type DeleteItemOutput = WriteItemOutput;

/// One page of a `Query` or `Scan`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PageOutput {
    /// Items that passed the filter.
    #[serde(default)]
    pub items: Vec<WireItem>,
    /// `items.len()` as counted by the service.
    #[serde(default)]
    pub count: i32,
    /// Items read before filtering.
    #[serde(default)]
    pub scanned_count: i32,
    /// Where the next page starts; empty on the last page.
    #[serde(default)]
    pub last_evaluated_key: WireItem,
    /// Present when capacity accounting was requested.
    pub consumed_capacity: Option<ConsumedCapacity>,
}

/// Response of `Query`.
pub type QueryOutput = PageOutput;
/// Response of `Scan`.
pub type ScanOutput = PageOutput;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_parse_query_output_with_continuation() {
        let json = r#"{
            "Items": [{"pk": {"S": "a"}, "n": {"N": "1"}}],
            "Count": 1,
            "ScannedCount": 3,
            "LastEvaluatedKey": {"pk": {"S": "a"}}
        }"#;
        let output: QueryOutput = serde_json::from_str(json).unwrap();
        assert_eq!(output.items.len(), 1);
        assert_eq!(output.count, 1);
        assert_eq!(output.scanned_count, 3);
        assert_eq!(
            output.last_evaluated_key.get("pk"),
            Some(&AttributeValue::S("a".to_owned()))
        );
    }

    #[test]
    fn test_should_default_absent_fields() {
        let get: GetItemOutput = serde_json::from_str("{}").unwrap();
        assert!(get.item.is_none());

        let write: WriteItemOutput = serde_json::from_str("{}").unwrap();
        assert!(write.attributes.is_empty());
        assert!(write.consumed_capacity.is_none());

        let page: ScanOutput = serde_json::from_str(r#"{"Count":0,"ScannedCount":5}"#).unwrap();
        assert!(page.items.is_empty());
        assert!(page.last_evaluated_key.is_empty());
    }
}
