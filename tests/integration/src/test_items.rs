//! Item CRUD through the dynaxpr client.

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};

    use bytes::Bytes;
    use dynaxpr_core::{Item, KeySchema, KeySpec, Number, Value, attr};
    use dynaxpr_http::{
        ClientError, DeleteItemRequest, GetItemRequest, PutItemRequest, UpdateItemRequest,
    };
    use dynaxpr_model::DynamoDBErrorCode;
    use dynaxpr_model::types::ReturnValue;

    use crate::{admin_client, client, create_table, delete_table};

    fn schema() -> KeySchema {
        KeySchema::single(KeySpec::string("pk"), None).unwrap()
    }

    fn key(pk: &str) -> Item {
        HashMap::from([("pk".to_owned(), Value::from(pk))])
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_round_trip_every_value_kind() {
        let admin = admin_client();
        let client = client();
        let table = create_table(&admin, "kinds", &schema()).await;

        let mut item = key("all");
        item.insert("empty".to_owned(), Value::from(""));
        item.insert("null".to_owned(), Value::Null);
        item.insert("flag".to_owned(), Value::from(true));
        item.insert(
            "big".to_owned(),
            Value::from("12345678901234567890.5".parse::<Number>().unwrap()),
        );
        item.insert("blob".to_owned(), Value::from(Bytes::from_static(&[0, 1, 2])));
        item.insert(
            "tags".to_owned(),
            Value::from(BTreeSet::from(["a".to_owned(), "b".to_owned()])),
        );
        item.insert(
            "nested".to_owned(),
            Value::from(vec![
                Value::from(1),
                Value::from(HashMap::from([("x".to_owned(), Value::from("y"))])),
            ]),
        );

        client
            .put_item(PutItemRequest::new(&table, item.clone()).validate_keys(schema()))
            .await
            .unwrap();
        let fetched = client
            .get_item(GetItemRequest::new(&table, key("all")).consistent_read(true))
            .await
            .unwrap();
        assert_eq!(fetched, Some(item));

        delete_table(&admin, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_fail_conditional_put_on_existing_item() {
        let admin = admin_client();
        let client = client();
        let table = create_table(&admin, "cond", &schema()).await;

        let put = || {
            PutItemRequest::new(&table, key("once")).condition(attr("pk").does_not_exist())
        };
        client.put_item(put()).await.unwrap();
        let err = client.put_item(put()).await.unwrap_err();
        tracing::info!(%err, "conditional put rejected");
        assert!(matches!(
            err.service_error().map(|e| e.code),
            Some(DynamoDBErrorCode::ConditionalCheckFailedException)
        ));
        assert!(matches!(err, ClientError::Service(_)));

        delete_table(&admin, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_apply_update_groups() {
        let admin = admin_client();
        let client = client();
        let table = create_table(&admin, "update", &schema()).await;

        let mut item = key("u1");
        item.insert("visits".to_owned(), Value::from(1));
        item.insert("stale".to_owned(), Value::from("x"));
        client
            .put_item(PutItemRequest::new(&table, item))
            .await
            .unwrap();

        let update = attr("visits").change(2)
            & attr("stale").remove()
            & attr("labels").add(BTreeSet::from(["new".to_owned()]))
            & attr("name").set_if_not_exists("anon");
        let updated = client
            .update_item(
                UpdateItemRequest::new(&table, key("u1"), update)
                    .condition(attr("visits").lt(10))
                    .return_values(ReturnValue::AllNew),
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.get("visits"), Some(&Value::from(3)));
        assert_eq!(updated.get("name"), Some(&Value::from("anon")));
        assert!(!updated.contains_key("stale"));

        let deleted = client
            .delete_item(
                DeleteItemRequest::new(&table, key("u1")).return_values(ReturnValue::AllOld),
            )
            .await
            .unwrap();
        assert!(deleted.is_some());

        delete_table(&admin, &table).await;
    }
}
