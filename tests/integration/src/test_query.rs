//! Query and Scan through the dynaxpr client.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use dynaxpr_core::{HashKey, Item, KeySchema, KeySpec, RangeKey, Value, attr};
    use dynaxpr_http::{PutItemRequest, QueryRequest, ScanRequest};

    use crate::{admin_client, client, create_table, delete_table};

    fn schema() -> KeySchema {
        KeySchema::single(KeySpec::string("tenant"), Some(KeySpec::number("seq"))).unwrap()
    }

    fn event(tenant: &str, seq: i64) -> Item {
        HashMap::from([
            ("tenant".to_owned(), Value::from(tenant)),
            ("seq".to_owned(), Value::from(seq)),
            ("open".to_owned(), Value::from(seq % 2 == 0)),
        ])
    }

    async fn seed(client: &dynaxpr_http::Client, table: &str) {
        for seq in 0..10 {
            client
                .put_item(PutItemRequest::new(table, event("acme", seq)))
                .await
                .unwrap();
        }
        client
            .put_item(PutItemRequest::new(table, event("other", 0)))
            .await
            .unwrap();
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_query_range_in_pages() {
        let admin = admin_client();
        let client = client();
        let table = create_table(&admin, "query", &schema()).await;
        seed(&client, &table).await;

        let mut seen = Vec::new();
        let mut start: Option<Item> = None;
        loop {
            let condition = HashKey::new("tenant", "acme") & RangeKey::new("seq").gte(4);
            let mut request = QueryRequest::new(&table, schema(), condition).limit(2);
            if let Some(key) = start.take() {
                request = request.exclusive_start_key(key);
            }
            let page = client.query(request).await.unwrap();
            tracing::info!(count = page.count, more = page.has_more(), "query page");
            seen.extend(page.items.iter().filter_map(|item| item["seq"].as_number()?.as_i64()));
            match page.last_evaluated_key {
                Some(key) => start = Some(key),
                None => break,
            }
        }
        assert_eq!(seen, vec![4, 5, 6, 7, 8, 9]);

        delete_table(&admin, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_query_descending_with_filter_and_projection() {
        let admin = admin_client();
        let client = client();
        let table = create_table(&admin, "filter", &schema()).await;
        seed(&client, &table).await;

        let condition = HashKey::new("tenant", "acme") & RangeKey::new("seq").between(2, 7);
        let page = client
            .query(
                QueryRequest::new(&table, schema(), condition)
                    .filter(attr("open").equals(true))
                    .projection(attr("seq"))
                    .descending(),
            )
            .await
            .unwrap();

        let seqs: Vec<i64> = page
            .items
            .iter()
            .filter_map(|item| item["seq"].as_number()?.as_i64())
            .collect();
        tracing::info!(?seqs, scanned = page.scanned_count, "filtered query");
        assert_eq!(seqs, vec![6, 4, 2]);
        assert!(page.items.iter().all(|item| item.len() == 1));
        assert_eq!(page.scanned_count, 6);

        delete_table(&admin, &table).await;
    }

    #[tokio::test]
    #[ignore = "requires running server"]
    async fn test_should_scan_with_filter() {
        let admin = admin_client();
        let client = client();
        let table = create_table(&admin, "scan", &schema()).await;
        seed(&client, &table).await;

        let page = client
            .scan(ScanRequest::new(&table).filter(attr("tenant").begins_with("oth")))
            .await
            .unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.items[0]["tenant"], Value::from("other"));

        delete_table(&admin, &table).await;
    }
}
