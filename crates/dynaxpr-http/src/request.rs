//! Request builders that translate native values and expression objects into
//! wire inputs.
//!
//! Every expression of one request (key condition, filter, projection,
//! update, condition) shares a single [`ExpressionParams`], so placeholders
//! are unique and deduplicated across the whole request.

use dynaxpr_core::{
    Condition, ExpressionParams, Item, KeyCondition, KeySchema, ProjectionExpression,
    UpdateExpression, encode_item,
};
use dynaxpr_model::DynamoDBOperation;
use dynaxpr_model::input::{
    DeleteItemInput, GetItemInput, PutItemInput, QueryInput, ScanInput, UpdateItemInput,
};
use dynaxpr_model::types::{ReturnConsumedCapacity, ReturnValue, Select};

use crate::error::ClientError;

fn non_empty(item: Item, operation: DynamoDBOperation) -> Result<Item, ClientError> {
    if item.is_empty() {
        return Err(ClientError::EmptyItem { operation });
    }
    Ok(item)
}

fn optional<T>(
    params: &mut ExpressionParams,
    value: Option<&T>,
    render: impl FnOnce(&mut ExpressionParams, &T) -> Result<String, ClientError>,
) -> Result<Option<String>, ClientError> {
    value.map(|v| render(params, v)).transpose()
}

fn condition(params: &mut ExpressionParams, condition: &Condition) -> Result<String, ClientError> {
    Ok(params.condition(condition)?)
}

fn projection(
    params: &mut ExpressionParams,
    projection: &ProjectionExpression,
) -> Result<String, ClientError> {
    Ok(params.projection(projection)?)
}

// ---------------------------------------------------------------------------
// Item CRUD
// ---------------------------------------------------------------------------

/// Fetch one item by primary key.
#[derive(Debug, Clone)]
pub struct GetItemRequest {
    table_name: String,
    key: Item,
    projection: Option<ProjectionExpression>,
    consistent_read: Option<bool>,
}

impl GetItemRequest {
    /// Get the item with `key` from `table_name`.
    pub fn new(table_name: impl Into<String>, key: Item) -> Self {
        Self {
            table_name: table_name.into(),
            key,
            projection: None,
            consistent_read: None,
        }
    }

    /// Return only these attributes.
    #[must_use]
    pub fn projection(mut self, projection: impl Into<ProjectionExpression>) -> Self {
        self.projection = Some(projection.into());
        self
    }

    /// Use a strongly consistent read.
    #[must_use]
    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.consistent_read = Some(consistent);
        self
    }

    /// Build the wire input.
    pub fn into_input(self) -> Result<GetItemInput, ClientError> {
        let key = non_empty(self.key, DynamoDBOperation::GetItem)?;
        let mut params = ExpressionParams::new();
        let projection_expression = optional(&mut params, self.projection.as_ref(), projection)?;
        Ok(GetItemInput {
            table_name: self.table_name,
            key: encode_item(&key)?,
            consistent_read: self.consistent_read,
            projection_expression,
            expression_attribute_names: params.attribute_names(),
            return_consumed_capacity: None,
        })
    }
}

/// Create or replace an item.
#[derive(Debug, Clone)]
pub struct PutItemRequest {
    table_name: String,
    item: Item,
    condition: Option<Condition>,
    return_values: Option<ReturnValue>,
    return_consumed_capacity: Option<ReturnConsumedCapacity>,
    schema: Option<KeySchema>,
}

impl PutItemRequest {
    /// Put `item` into `table_name`.
    pub fn new(table_name: impl Into<String>, item: Item) -> Self {
        Self {
            table_name: table_name.into(),
            item,
            condition: None,
            return_values: None,
            return_consumed_capacity: None,
            schema: None,
        }
    }

    /// Only write if `condition` holds on the stored item.
    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Which attributes to return.
    #[must_use]
    pub fn return_values(mut self, return_values: ReturnValue) -> Self {
        self.return_values = Some(return_values);
        self
    }

    /// Request consumed capacity in the response.
    #[must_use]
    pub fn return_consumed_capacity(mut self, level: ReturnConsumedCapacity) -> Self {
        self.return_consumed_capacity = Some(level);
        self
    }

    /// Check the item's key attributes against `schema` before sending.
    #[must_use]
    pub fn validate_keys(mut self, schema: KeySchema) -> Self {
        self.schema = Some(schema);
        self
    }

    /// Build the wire input.
    pub fn into_input(self) -> Result<PutItemInput, ClientError> {
        let item = non_empty(self.item, DynamoDBOperation::PutItem)?;
        if let Some(schema) = &self.schema {
            schema.validate_item_keys(&item)?;
        }
        let mut params = ExpressionParams::new();
        let condition_expression = optional(&mut params, self.condition.as_ref(), condition)?;
        Ok(PutItemInput {
            table_name: self.table_name,
            item: encode_item(&item)?,
            condition_expression,
            expression_attribute_names: params.attribute_names(),
            expression_attribute_values: params.attribute_values(),
            return_values: self.return_values,
            return_consumed_capacity: self.return_consumed_capacity,
        })
    }
}

/// Modify attributes of an item, creating it if absent.
#[derive(Debug, Clone)]
pub struct UpdateItemRequest {
    table_name: String,
    key: Item,
    update: UpdateExpression,
    condition: Option<Condition>,
    return_values: Option<ReturnValue>,
}

impl UpdateItemRequest {
    /// Apply `update` to the item with `key` in `table_name`.
    pub fn new(table_name: impl Into<String>, key: Item, update: UpdateExpression) -> Self {
        Self {
            table_name: table_name.into(),
            key,
            update,
            condition: None,
            return_values: None,
        }
    }

    /// Only update if `condition` holds on the stored item.
    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Which attributes to return.
    #[must_use]
    pub fn return_values(mut self, return_values: ReturnValue) -> Self {
        self.return_values = Some(return_values);
        self
    }

    /// Build the wire input.
    pub fn into_input(self) -> Result<UpdateItemInput, ClientError> {
        let key = non_empty(self.key, DynamoDBOperation::UpdateItem)?;
        let mut params = ExpressionParams::new();
        let update_expression = params.update(&self.update)?;
        let condition_expression = optional(&mut params, self.condition.as_ref(), condition)?;
        Ok(UpdateItemInput {
            table_name: self.table_name,
            key: encode_item(&key)?,
            update_expression: Some(update_expression),
            condition_expression,
            expression_attribute_names: params.attribute_names(),
            expression_attribute_values: params.attribute_values(),
            return_values: self.return_values,
            return_consumed_capacity: None,
        })
    }
}

/// Delete an item by primary key.
#[derive(Debug, Clone)]
pub struct DeleteItemRequest {
    table_name: String,
    key: Item,
    condition: Option<Condition>,
    return_values: Option<ReturnValue>,
}

impl DeleteItemRequest {
    /// Delete the item with `key` from `table_name`.
    pub fn new(table_name: impl Into<String>, key: Item) -> Self {
        Self {
            table_name: table_name.into(),
            key,
            condition: None,
            return_values: None,
        }
    }

    /// Only delete if `condition` holds on the stored item.
    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Which attributes to return.
    #[must_use]
    pub fn return_values(mut self, return_values: ReturnValue) -> Self {
        self.return_values = Some(return_values);
        self
    }

    /// Build the wire input.
    pub fn into_input(self) -> Result<DeleteItemInput, ClientError> {
        let key = non_empty(self.key, DynamoDBOperation::DeleteItem)?;
        let mut params = ExpressionParams::new();
        let condition_expression = optional(&mut params, self.condition.as_ref(), condition)?;
        Ok(DeleteItemInput {
            table_name: self.table_name,
            key: encode_item(&key)?,
            condition_expression,
            expression_attribute_names: params.attribute_names(),
            expression_attribute_values: params.attribute_values(),
            return_values: self.return_values,
            return_consumed_capacity: None,
        })
    }
}

// ---------------------------------------------------------------------------
// Query & Scan
// ---------------------------------------------------------------------------

/// Read one page of items sharing a partition key.
///
/// The key condition is validated against the table's (or index's) key
/// schema before anything is sent.
#[derive(Debug, Clone)]
pub struct QueryRequest {
    table_name: String,
    schema: KeySchema,
    key_condition: KeyCondition,
    index_name: Option<String>,
    filter: Option<Condition>,
    projection: Option<ProjectionExpression>,
    limit: Option<i32>,
    scan_index_forward: Option<bool>,
    exclusive_start_key: Option<Item>,
    consistent_read: Option<bool>,
    select: Option<Select>,
}

impl QueryRequest {
    /// Query `table_name`, whose key schema is `schema`, for `key_condition`.
    pub fn new(
        table_name: impl Into<String>,
        schema: KeySchema,
        key_condition: impl Into<KeyCondition>,
    ) -> Self {
        Self {
            table_name: table_name.into(),
            schema,
            key_condition: key_condition.into(),
            index_name: None,
            filter: None,
            projection: None,
            limit: None,
            scan_index_forward: None,
            exclusive_start_key: None,
            consistent_read: None,
            select: None,
        }
    }

    /// Query a secondary index. `schema` must then be the index's key schema.
    #[must_use]
    pub fn index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    /// Drop matching items for which `filter` does not hold.
    #[must_use]
    pub fn filter(mut self, filter: Condition) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Return only these attributes.
    #[must_use]
    pub fn projection(mut self, projection: impl Into<ProjectionExpression>) -> Self {
        self.projection = Some(projection.into());
        self
    }

    /// Evaluate at most `limit` items.
    #[must_use]
    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Traverse the sort key in descending order.
    #[must_use]
    pub fn descending(mut self) -> Self {
        self.scan_index_forward = Some(false);
        self
    }

    /// Continue from the `last_evaluated_key` of a previous page.
    #[must_use]
    pub fn exclusive_start_key(mut self, key: Item) -> Self {
        self.exclusive_start_key = Some(key);
        self
    }

    /// Use a strongly consistent read.
    #[must_use]
    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.consistent_read = Some(consistent);
        self
    }

    /// Which attributes, or only the count, to return.
    #[must_use]
    pub fn select(mut self, select: Select) -> Self {
        self.select = Some(select);
        self
    }

    /// Build the wire input.
    pub fn into_input(self) -> Result<QueryInput, ClientError> {
        let mut params = ExpressionParams::new();
        let key_condition_expression = params.key_condition(&self.schema, &self.key_condition)?;
        let filter_expression = optional(&mut params, self.filter.as_ref(), condition)?;
        let projection_expression = optional(&mut params, self.projection.as_ref(), projection)?;
        let exclusive_start_key = self
            .exclusive_start_key
            .as_ref()
            .map(encode_item)
            .transpose()?
            .unwrap_or_default();
        tracing::trace!(
            table = %self.table_name,
            key_condition = %key_condition_expression,
            "built query input"
        );
        Ok(QueryInput {
            table_name: self.table_name,
            index_name: self.index_name,
            key_condition_expression: Some(key_condition_expression),
            filter_expression,
            projection_expression,
            expression_attribute_names: params.attribute_names(),
            expression_attribute_values: params.attribute_values(),
            scan_index_forward: self.scan_index_forward,
            limit: self.limit,
            exclusive_start_key,
            select: self.select,
            consistent_read: self.consistent_read,
        })
    }
}

/// Read one page of a whole table or index.
#[derive(Debug, Clone)]
pub struct ScanRequest {
    table_name: String,
    index_name: Option<String>,
    filter: Option<Condition>,
    projection: Option<ProjectionExpression>,
    limit: Option<i32>,
    exclusive_start_key: Option<Item>,
    select: Option<Select>,
    consistent_read: Option<bool>,
}

impl ScanRequest {
    /// Scan `table_name`.
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            index_name: None,
            filter: None,
            projection: None,
            limit: None,
            exclusive_start_key: None,
            select: None,
            consistent_read: None,
        }
    }

    /// Scan a secondary index.
    #[must_use]
    pub fn index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    /// Drop items for which `filter` does not hold.
    #[must_use]
    pub fn filter(mut self, filter: Condition) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Return only these attributes.
    #[must_use]
    pub fn projection(mut self, projection: impl Into<ProjectionExpression>) -> Self {
        self.projection = Some(projection.into());
        self
    }

    /// Evaluate at most `limit` items.
    #[must_use]
    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Continue from the `last_evaluated_key` of a previous page.
    #[must_use]
    pub fn exclusive_start_key(mut self, key: Item) -> Self {
        self.exclusive_start_key = Some(key);
        self
    }

    /// Use a strongly consistent read.
    #[must_use]
    pub fn consistent_read(mut self, consistent: bool) -> Self {
        self.consistent_read = Some(consistent);
        self
    }

    /// Which attributes, or only the count, to return.
    #[must_use]
    pub fn select(mut self, select: Select) -> Self {
        self.select = Some(select);
        self
    }

    /// Build the wire input.
    pub fn into_input(self) -> Result<ScanInput, ClientError> {
        let mut params = ExpressionParams::new();
        let filter_expression = optional(&mut params, self.filter.as_ref(), condition)?;
        let projection_expression = optional(&mut params, self.projection.as_ref(), projection)?;
        let exclusive_start_key = self
            .exclusive_start_key
            .as_ref()
            .map(encode_item)
            .transpose()?
            .unwrap_or_default();
        Ok(ScanInput {
            table_name: self.table_name,
            index_name: self.index_name,
            filter_expression,
            projection_expression,
            expression_attribute_names: params.attribute_names(),
            expression_attribute_values: params.attribute_values(),
            limit: self.limit,
            exclusive_start_key,
            select: self.select,
            consistent_read: self.consistent_read,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use dynaxpr_core::{
        ExpressionError, HashKey, KeyConditionError, KeySpec, MultiHashKey, RangeKey, Value, attr,
    };
    use dynaxpr_model::AttributeValue;

    use super::*;

    fn key(pairs: &[(&str, Value)]) -> Item {
        pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), value.clone()))
            .collect()
    }

    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_owned())
    }

    fn n(value: &str) -> AttributeValue {
        AttributeValue::N(value.to_owned())
    }

    #[test]
    fn test_should_build_get_item_with_projection() {
        let input = GetItemRequest::new("users", key(&[("pk", Value::from("u1"))]))
            .projection(attr("name") & attr("tags").index(0))
            .consistent_read(true)
            .into_input()
            .unwrap();
        assert_eq!(input.projection_expression.as_deref(), Some("#n0,#n1[0]"));
        assert_eq!(
            input.expression_attribute_names,
            HashMap::from([
                ("#n0".to_owned(), "name".to_owned()),
                ("#n1".to_owned(), "tags".to_owned()),
            ])
        );
        assert_eq!(input.key.get("pk"), Some(&s("u1")));
        assert_eq!(input.consistent_read, Some(true));
    }

    #[test]
    fn test_should_reject_empty_key() {
        let err = GetItemRequest::new("users", Item::new())
            .into_input()
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::EmptyItem {
                operation: DynamoDBOperation::GetItem
            }
        ));
    }

    #[test]
    fn test_should_validate_put_item_keys_against_schema() {
        let schema = KeySchema::single(KeySpec::string("pk"), None).unwrap();
        let err = PutItemRequest::new("users", key(&[("other", Value::from(1))]))
            .validate_keys(schema)
            .into_input()
            .unwrap_err();
        assert!(matches!(err, ClientError::Core(dynaxpr_core::Error::Schema(_))));
    }

    #[test]
    fn test_should_build_put_item_with_condition() {
        let input = PutItemRequest::new("users", key(&[("pk", Value::from("u1"))]))
            .condition(attr("pk").does_not_exist())
            .return_values(ReturnValue::AllOld)
            .into_input()
            .unwrap();
        assert_eq!(
            input.condition_expression.as_deref(),
            Some("attribute_not_exists(#n0)")
        );
        assert!(input.expression_attribute_values.is_empty());
        assert_eq!(input.return_values, Some(ReturnValue::AllOld));
    }

    #[test]
    fn test_should_share_placeholders_between_update_and_condition() {
        let input = UpdateItemRequest::new(
            "counters",
            key(&[("pk", Value::from("c1"))]),
            attr("count").change(1),
        )
        .condition(attr("count").lt(10))
        .into_input()
        .unwrap();
        assert_eq!(
            input.update_expression.as_deref(),
            Some("SET #n0 = #n0 + :v0")
        );
        assert_eq!(input.condition_expression.as_deref(), Some("#n0 < :v1"));
        assert_eq!(input.expression_attribute_names.len(), 1);
        assert_eq!(input.expression_attribute_values.get(":v0"), Some(&n("1")));
        assert_eq!(input.expression_attribute_values.get(":v1"), Some(&n("10")));
    }

    #[test]
    fn test_should_surface_empty_update() {
        let err = UpdateItemRequest::new(
            "counters",
            key(&[("pk", Value::from("c1"))]),
            UpdateExpression::new(),
        )
        .into_input()
        .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(dynaxpr_core::Error::Expression(ExpressionError::EmptyUpdate))
        ));
    }

    #[test]
    fn test_should_build_multi_attribute_query() {
        let schema = KeySchema::new(
            [KeySpec::string("tenant"), KeySpec::string("region")],
            [KeySpec::number("year"), KeySpec::number("seq")],
        )
        .unwrap();
        let condition = MultiHashKey::new([("tenant", "acme"), ("region", "eu")])
            & RangeKey::new("year").equals(2024)
            & RangeKey::new("seq").gt(100);

        let input = QueryRequest::new("events", schema, condition)
            .filter(attr("status").equals("open"))
            .descending()
            .limit(25)
            .into_input()
            .unwrap();

        assert_eq!(
            input.key_condition_expression.as_deref(),
            Some("(#n0 = :v0) AND (#n1 = :v1) AND (#n2 = :v2) AND (#n3 > :v3)")
        );
        assert_eq!(input.filter_expression.as_deref(), Some("#n4 = :v4"));
        assert_eq!(input.expression_attribute_names["#n4"], "status");
        assert_eq!(input.expression_attribute_values[":v3"], n("100"));
        assert_eq!(input.scan_index_forward, Some(false));
        assert_eq!(input.limit, Some(25));
        assert!(input.exclusive_start_key.is_empty());
    }

    #[test]
    fn test_should_reject_query_skipping_sort_attribute() {
        let schema = KeySchema::new(
            [KeySpec::string("pk")],
            [KeySpec::number("year"), KeySpec::number("seq")],
        )
        .unwrap();
        let condition = HashKey::new("pk", "a") & RangeKey::new("seq").gt(1);
        let err = QueryRequest::new("events", schema, condition)
            .into_input()
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(dynaxpr_core::Error::KeyCondition(
                KeyConditionError::KeyConditionGap { .. }
            ))
        ));
    }

    #[test]
    fn test_should_encode_scan_start_key() {
        let input = ScanRequest::new("events")
            .exclusive_start_key(key(&[("pk", Value::from("a"))]))
            .into_input()
            .unwrap();
        assert_eq!(input.exclusive_start_key.get("pk"), Some(&s("a")));
        assert!(input.filter_expression.is_none());
        assert!(input.expression_attribute_names.is_empty());
        assert!(input.select.is_none());
    }

    #[test]
    fn test_should_pass_scan_select_through() {
        let input = ScanRequest::new("events")
            .filter(attr("archived").equals(false))
            .select(Select::Count)
            .into_input()
            .unwrap();
        assert_eq!(input.select, Some(Select::Count));
        assert_eq!(
            serde_json::to_value(&input).unwrap()["Select"],
            serde_json::json!("COUNT")
        );
    }
}
