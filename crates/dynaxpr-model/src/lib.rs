//! DynamoDB wire model types for dynaxpr.
//!
//! These are the request and response shapes of the DynamoDB JSON protocol
//! (`awsJson1_0`) for the item operations. They are hand-written serde structs;
//! building their expression strings and placeholder maps is the job of
//! `dynaxpr-core`.
// "DynamoDB" appears in virtually every doc comment in this crate.
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]

pub mod attribute_value;
pub mod error;
pub mod input;
pub mod operations;
pub mod output;
pub mod types;

pub use attribute_value::AttributeValue;
pub use error::{DynamoDBError, DynamoDBErrorCode};
pub use operations::DynamoDBOperation;
