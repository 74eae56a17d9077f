//! The DynamoDB client: envelope construction, dispatch and response decoding.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use dynaxpr_auth::EnvCredentialProvider;
use dynaxpr_core::{Item, WireItem, decode_item};
use dynaxpr_model::DynamoDBError;
use dynaxpr_model::DynamoDBOperation;
use dynaxpr_model::output::{
    DeleteItemOutput, GetItemOutput, PutItemOutput, QueryOutput, ScanOutput, UpdateItemOutput,
};
use http::header::CONTENT_TYPE;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::time::Instant;

use crate::config::ClientConfig;
use crate::error::{ClientError, TransportError};
use crate::request::{
    DeleteItemRequest, GetItemRequest, PutItemRequest, QueryRequest, ScanRequest,
    UpdateItemRequest,
};
use crate::signer::{NoopSigner, RequestSigner, SigV4Signer};
use crate::transport::{HttpTransport, ReqwestTransport};

/// Content type of the `awsJson1_0` protocol.
pub const CONTENT_TYPE_JSON_1_0: &str = "application/x-amz-json-1.0";

/// One page of `Query` or `Scan` results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    /// The decoded items.
    pub items: Vec<Item>,
    /// Where the next page starts. `None` on the last page.
    pub last_evaluated_key: Option<Item>,
    /// Items returned after filtering.
    pub count: usize,
    /// Items evaluated before filtering.
    pub scanned_count: usize,
}

impl Page {
    /// Returns `true` if more pages follow.
    #[must_use]
    pub fn has_more(&self) -> bool {
        self.last_evaluated_key.is_some()
    }

    fn decode(
        items: &[WireItem],
        last_evaluated_key: &WireItem,
        count: i32,
        scanned_count: i32,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            items: items.iter().map(decode_item).collect::<Result<_, _>>()?,
            last_evaluated_key: decode_optional(last_evaluated_key)?,
            count: usize::try_from(count).unwrap_or_default(),
            scanned_count: usize::try_from(scanned_count).unwrap_or_default(),
        })
    }
}

fn decode_optional(item: &WireItem) -> Result<Option<Item>, ClientError> {
    if item.is_empty() {
        return Ok(None);
    }
    Ok(Some(decode_item(item)?))
}

/// A DynamoDB client for the item operations.
///
/// Cloning is cheap; clones share the transport and signer.
#[derive(Clone)]
pub struct Client {
    config: ClientConfig,
    endpoint: http::Uri,
    transport: Arc<dyn HttpTransport>,
    signer: Arc<dyn RequestSigner>,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.endpoint)
            .field("signer", &self.signer)
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Create a client from [`ClientConfig::from_env`], signing with
    /// credentials from the environment unless signing is disabled.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_config(ClientConfig::from_env())
    }

    /// Create a client with the default transport.
    pub fn from_config(config: ClientConfig) -> Result<Self, ClientError> {
        if config.skip_signature {
            return Self::new(config, ReqwestTransport::new(), NoopSigner);
        }
        let signer = SigV4Signer::new(EnvCredentialProvider, config.region.clone());
        Self::new(config, ReqwestTransport::new(), signer)
    }

    /// Create a client with an explicit transport and signer.
    pub fn new(
        config: ClientConfig,
        transport: impl HttpTransport,
        signer: impl RequestSigner,
    ) -> Result<Self, ClientError> {
        let endpoint = config
            .endpoint()
            .parse::<http::Uri>()
            .map_err(|e| TransportError::InvalidRequest(format!("invalid endpoint: {e}")))?;
        Ok(Self {
            config,
            endpoint,
            transport: Arc::new(transport),
            signer: Arc::new(signer),
        })
    }

    /// The configuration this client was built with.
    #[must_use]
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetch an item. Returns `None` when no item has the key.
    pub async fn get_item(&self, request: GetItemRequest) -> Result<Option<Item>, ClientError> {
        let input = request.into_input()?;
        let output: GetItemOutput = self.call(DynamoDBOperation::GetItem, &input).await?;
        output.item.as_ref().map(decode_item).transpose().map_err(Into::into)
    }

    /// Put an item. Returns the previous attributes if requested.
    pub async fn put_item(&self, request: PutItemRequest) -> Result<Option<Item>, ClientError> {
        let input = request.into_input()?;
        let output: PutItemOutput = self.call(DynamoDBOperation::PutItem, &input).await?;
        decode_optional(&output.attributes)
    }

    /// Update an item. Returns the attributes selected by `return_values`.
    pub async fn update_item(
        &self,
        request: UpdateItemRequest,
    ) -> Result<Option<Item>, ClientError> {
        let input = request.into_input()?;
        let output: UpdateItemOutput = self.call(DynamoDBOperation::UpdateItem, &input).await?;
        decode_optional(&output.attributes)
    }

    /// Delete an item. Returns the deleted attributes if requested.
    pub async fn delete_item(
        &self,
        request: DeleteItemRequest,
    ) -> Result<Option<Item>, ClientError> {
        let input = request.into_input()?;
        let output: DeleteItemOutput = self.call(DynamoDBOperation::DeleteItem, &input).await?;
        decode_optional(&output.attributes)
    }

    /// Fetch one page of a query.
    pub async fn query(&self, request: QueryRequest) -> Result<Page, ClientError> {
        let input = request.into_input()?;
        let output: QueryOutput = self.call(DynamoDBOperation::Query, &input).await?;
        Page::decode(
            &output.items,
            &output.last_evaluated_key,
            output.count,
            output.scanned_count,
        )
    }

    /// Fetch one page of a scan.
    pub async fn scan(&self, request: ScanRequest) -> Result<Page, ClientError> {
        let input = request.into_input()?;
        let output: ScanOutput = self.call(DynamoDBOperation::Scan, &input).await?;
        Page::decode(
            &output.items,
            &output.last_evaluated_key,
            output.count,
            output.scanned_count,
        )
    }

    async fn call<I, O>(&self, operation: DynamoDBOperation, input: &I) -> Result<O, ClientError>
    where
        I: Serialize,
        O: DeserializeOwned,
    {
        let body = Bytes::from(
            serde_json::to_vec(input)
                .map_err(|source| ClientError::Serialization { operation, source })?,
        );

        let retry = self.config.retry;
        let deadline = Instant::now() + retry.time_limit();
        let mut attempts: u32 = 0;
        let mut delay = Duration::ZERO;
        loop {
            let err = match self.send_once(operation, body.clone()).await {
                Ok(response) => {
                    return serde_json::from_slice(response.body())
                        .map_err(|source| ClientError::Serialization { operation, source });
                }
                Err(err) => err,
            };
            attempts += 1;
            if !err.is_retryable() {
                return Err(err);
            }
            let Some(next) = retry.next_delay(attempts - 1, delay) else {
                return Err(err);
            };
            if Instant::now() + next > deadline {
                tracing::warn!(
                    operation = %operation,
                    attempts,
                    "retry time limit reached"
                );
                return Err(ClientError::RetryTimeout {
                    operation,
                    attempts,
                    last: Box::new(err),
                });
            }
            tracing::debug!(
                operation = %operation,
                attempt = attempts,
                delay_ms = u64::try_from(next.as_millis()).unwrap_or(u64::MAX),
                error = %err,
                "retrying DynamoDB request"
            );
            tokio::time::sleep(next).await;
            delay = next;
        }
    }

    /// Sign and send one attempt. Non-2xx responses come back as errors.
    async fn send_once(
        &self,
        operation: DynamoDBOperation,
        body: Bytes,
    ) -> Result<http::Response<Bytes>, ClientError> {
        let mut request = http::Request::builder()
            .method(http::Method::POST)
            .uri(self.endpoint.clone())
            .header(CONTENT_TYPE, CONTENT_TYPE_JSON_1_0)
            .header("x-amz-target", operation.target())
            .body(body)
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;
        self.signer.sign(&mut request)?;

        tracing::debug!(
            operation = %operation,
            endpoint = %self.endpoint,
            read_only = operation.is_read_only(),
            "dispatching DynamoDB request"
        );
        let response = self.transport.send(request).await?;
        let status = response.status();
        tracing::debug!(
            operation = %operation,
            status = status.as_u16(),
            "received DynamoDB response"
        );

        if !status.is_success() {
            let err = DynamoDBError::from_response(status, response.body());
            tracing::warn!(
                operation = %operation,
                code = %err.code,
                message = %err.message,
                "DynamoDB request failed"
            );
            return Err(err.into());
        }
        Ok(response)
    }
}
