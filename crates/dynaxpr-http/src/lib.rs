//! DynamoDB client glue around the `dynaxpr` translation core.
//!
//! Requests are built from native values and expression objects
//! ([`request`]), serialized into the `awsJson1_0` envelope, signed by a
//! [`RequestSigner`] and sent through an [`HttpTransport`]. Error responses
//! are decoded into [`DynamoDBError`](dynaxpr_model::DynamoDBError), and
//! throttled or transient failures are resent per the [`RetryConfig`].
//!
//! ```no_run
//! use std::collections::HashMap;
//!
//! use dynaxpr_core::Value;
//! use dynaxpr_http::{Client, GetItemRequest};
//!
//! # async fn run() -> Result<(), dynaxpr_http::ClientError> {
//! let client = Client::from_env()?;
//! let key = HashMap::from([("pk".to_owned(), Value::from("user#1"))]);
//! let _item = client.get_item(GetItemRequest::new("users", key)).await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod retry;
pub mod signer;
pub mod transport;

pub use client::{Client, Page};
pub use config::ClientConfig;
pub use error::{ClientError, TransportError};
pub use request::{
    DeleteItemRequest, GetItemRequest, PutItemRequest, QueryRequest, ScanRequest,
    UpdateItemRequest,
};
pub use retry::{Backoff, RetryConfig};
pub use signer::{NoopSigner, RequestSigner, SigV4Signer};
pub use transport::{HttpTransport, ReqwestTransport, TransportFuture};
