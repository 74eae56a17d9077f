//! Integration tests for dynaxpr against a DynamoDB-compatible server.
//!
//! These tests require a server at `localhost:4566` (override with
//! `DYNAMODB_ENDPOINT_URL`). They are marked `#[ignore]` so they don't run
//! during normal `cargo test`.
//!
//! Run them with:
//! ```text
//! cargo test -p dynaxpr-integration -- --ignored
//! ```
//!
//! Tables are created and dropped with the AWS SDK; every item operation
//! under test goes through [`dynaxpr_http::Client`].

use std::sync::Once;

use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_dynamodb::types::{
    AttributeDefinition, BillingMode, KeySchemaElement, KeyType, ScalarAttributeType,
};
use dynaxpr_auth::{Credentials as SigningCredentials, StaticCredentialProvider};
use dynaxpr_core::KeySchema;
use dynaxpr_http::{Client, ClientConfig, ReqwestTransport, SigV4Signer};

static INIT: Once = Once::new();

const REGION: &str = "us-east-1";

/// Initialize tracing (once).
fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// Endpoint URL for the server.
fn endpoint_url() -> String {
    std::env::var("DYNAMODB_ENDPOINT_URL").unwrap_or_else(|_| "http://localhost:4566".to_owned())
}

/// Create a dynaxpr client signing with the test credentials.
#[must_use]
pub fn client() -> Client {
    init_tracing();

    let config = ClientConfig::builder()
        .region(REGION)
        .endpoint_url(endpoint_url())
        .build();
    let signer = SigV4Signer::new(
        StaticCredentialProvider::new(SigningCredentials::new("test", "test")),
        REGION,
    );
    Client::new(config, ReqwestTransport::new(), signer)
        .unwrap_or_else(|e| panic!("failed to build client: {e}"))
}

/// Create an AWS SDK client for table administration.
#[must_use]
pub fn admin_client() -> aws_sdk_dynamodb::Client {
    init_tracing();

    let creds = Credentials::new("test", "test", None, None, "integration-test");

    let config = aws_sdk_dynamodb::config::Builder::new()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(REGION))
        .credentials_provider(creds)
        .endpoint_url(endpoint_url())
        .build();

    aws_sdk_dynamodb::Client::from_conf(config)
}

/// Generate a unique table name for a test.
#[must_use]
pub fn test_table_name(prefix: &str) -> String {
    let id = uuid::Uuid::new_v4().to_string()[..8].to_owned();
    format!("test-{prefix}-{id}")
}

/// Create a table for `schema` and return its name. Caller is responsible
/// for cleanup.
pub async fn create_table(
    admin: &aws_sdk_dynamodb::Client,
    prefix: &str,
    schema: &KeySchema,
) -> String {
    let name = test_table_name(prefix);
    let mut request = admin
        .create_table()
        .table_name(&name)
        .billing_mode(BillingMode::PayPerRequest);

    for element in schema.key_schema_elements() {
        let key_type = match element.key_type {
            dynaxpr_model::types::KeyType::Hash => KeyType::Hash,
            dynaxpr_model::types::KeyType::Range => KeyType::Range,
        };
        request = request.key_schema(
            KeySchemaElement::builder()
                .attribute_name(element.attribute_name)
                .key_type(key_type)
                .build()
                .unwrap_or_else(|e| panic!("invalid key schema element: {e}")),
        );
    }
    for definition in schema.attribute_definitions() {
        request = request.attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(definition.attribute_name)
                .attribute_type(ScalarAttributeType::from(definition.attribute_type.as_str()))
                .build()
                .unwrap_or_else(|e| panic!("invalid attribute definition: {e}")),
        );
    }

    request
        .send()
        .await
        .unwrap_or_else(|e| panic!("failed to create table {name}: {e}"));
    tracing::info!(table = %name, "created test table");
    name
}

/// Drop a table, logging failures.
pub async fn delete_table(admin: &aws_sdk_dynamodb::Client, table_name: &str) {
    if let Err(e) = admin.delete_table().table_name(table_name).send().await {
        tracing::warn!(table = %table_name, error = %e, "failed to delete test table");
    }
}

mod test_items;
mod test_query;
