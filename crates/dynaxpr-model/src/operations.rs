//! Operations the client sends, and their `X-Amz-Target` values.

use std::fmt;

/// Service namespace of the 2012-08-10 JSON API.
pub const TARGET_PREFIX: &str = "DynamoDB_20120810";

/// An item-level API call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DynamoDBOperation {
    /// `GetItem`
    GetItem,
    /// `PutItem`
    PutItem,
    /// `UpdateItem`
    UpdateItem,
    /// `DeleteItem`
    DeleteItem,
    /// `Query`
    Query,
    /// `Scan`
    Scan,
}

impl DynamoDBOperation {
    /// The API action name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GetItem => "GetItem",
            Self::PutItem => "PutItem",
            Self::UpdateItem => "UpdateItem",
            Self::DeleteItem => "DeleteItem",
            Self::Query => "Query",
            Self::Scan => "Scan",
        }
    }

    /// Value of the `X-Amz-Target` header, e.g. `DynamoDB_20120810.Query`.
    #[must_use]
    pub fn target(&self) -> String {
        format!("{TARGET_PREFIX}.{self}")
    }

    /// `true` for operations that never modify the table.
    #[must_use]
    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::GetItem | Self::Query | Self::Scan)
    }
}

impl fmt::Display for DynamoDBOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
