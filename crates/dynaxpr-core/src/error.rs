//! Error taxonomy for the translation core.
//!
//! Every failure here is deterministic: sending the same input again produces
//! the same error. Messages name the offending attribute and the rule it broke.

use crate::expression::UpdateKeyword;
use crate::schema::KeyAttributeType;

/// Errors raised while converting between native values and wire values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    /// The native value has no wire representation.
    #[error("unsupported {kind} value: {reason}")]
    UnsupportedType {
        /// The kind of value that was rejected.
        kind: String,
        /// Why it cannot be encoded.
        reason: String,
    },
    /// The wire value violates the attribute value format.
    #[error("malformed wire value: {reason}")]
    MalformedWireValue {
        /// What is wrong with it.
        reason: String,
    },
}

impl CodecError {
    /// Prefix the message with the attribute the error occurred under.
    #[must_use]
    pub fn at(self, attribute: &str) -> Self {
        match self {
            Self::UnsupportedType { kind, reason } => Self::UnsupportedType {
                kind,
                reason: format!("attribute `{attribute}`: {reason}"),
            },
            Self::MalformedWireValue { reason } => Self::MalformedWireValue {
                reason: format!("attribute `{attribute}`: {reason}"),
            },
        }
    }
}

/// Errors raised by the key schema model.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// The schema itself is not valid.
    #[error("invalid key schema: {reason}")]
    InvalidKeySchema {
        /// The broken constraint.
        reason: String,
    },
    /// An item lacks one of the key attributes.
    #[error("missing key attribute `{attribute}`")]
    MissingKeyAttribute {
        /// The absent key attribute.
        attribute: String,
    },
    /// A key attribute holds a value of the wrong kind.
    #[error("key attribute `{attribute}` must be a {expected}, got {actual}")]
    KeyTypeMismatch {
        /// The key attribute.
        attribute: String,
        /// The declared type.
        expected: KeyAttributeType,
        /// The kind of value supplied.
        actual: &'static str,
    },
}

/// Errors raised while compiling expressions.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpressionError {
    /// One path is the target of two different update keywords.
    #[error("attribute `{path}` appears under both {first} and {second} in one update")]
    ConflictingUpdateAction {
        /// The path targeted twice.
        path: String,
        /// The keyword seen first.
        first: UpdateKeyword,
        /// The keyword that conflicts with it.
        second: UpdateKeyword,
    },
    /// An update expression without actions.
    #[error("update expression has no actions")]
    EmptyUpdate,
    /// A projection expression without paths.
    #[error("projection expression has no attributes")]
    EmptyProjection,
    /// A logical group or `IN` list without operands.
    #[error("{operator} requires at least one operand")]
    EmptyOperands {
        /// The operator with no operands.
        operator: &'static str,
    },
    /// A literal could not be encoded.
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Errors raised while validating a key condition against a key schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyConditionError {
    /// A partition key attribute is not matched.
    #[error(
        "partition key attribute `{attribute}` is missing: every partition key attribute must be matched with `=`"
    )]
    IncompletePartitionKey {
        /// The first unmatched partition key attribute.
        attribute: String,
    },
    /// A partition key attribute is matched with something other than `=`.
    #[error(
        "partition key attribute `{attribute}` uses `{operator}`: partition key attributes only accept `=`"
    )]
    InvalidPartitionKeyOperator {
        /// The partition key attribute.
        attribute: String,
        /// The operator used on it.
        operator: &'static str,
    },
    /// A sort key attribute is referenced after an earlier one was skipped.
    #[error(
        "sort key attribute `{attribute}` is used but `{skipped}` is not: sort key attributes must be matched left to right without gaps"
    )]
    KeyConditionGap {
        /// The declared sort key attribute that was skipped.
        skipped: String,
        /// The later attribute that was referenced anyway.
        attribute: String,
    },
    /// A sort key attribute uses an operator it may not use.
    #[error("sort key attribute `{attribute}` uses `{operator}`: {reason}")]
    InvalidSortKeyOperator {
        /// The sort key attribute.
        attribute: String,
        /// The operator used on it.
        operator: &'static str,
        /// The rule that forbids it.
        reason: &'static str,
    },
    /// A clause names an attribute that is not part of the key schema.
    #[error("`{attribute}` is not a key attribute of this table or index")]
    UnknownKeyAttribute {
        /// The unknown attribute.
        attribute: String,
    },
    /// A key attribute is named by more than one clause.
    #[error("key attribute `{attribute}` is used in more than one clause")]
    DuplicateKeyAttribute {
        /// The repeated attribute.
        attribute: String,
    },
    /// A literal does not match the declared key type.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// The validated condition failed to compile.
    #[error(transparent)]
    Expression(#[from] ExpressionError),
}

/// Any error raised by the translation core.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Value codec error.
    #[error(transparent)]
    Codec(#[from] CodecError),
    /// Key schema error.
    #[error(transparent)]
    Schema(#[from] SchemaError),
    /// Expression compilation error.
    #[error(transparent)]
    Expression(#[from] ExpressionError),
    /// Key condition validation error.
    #[error(transparent)]
    KeyCondition(#[from] KeyConditionError),
}

/// Result alias for the translation core.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_prefix_codec_error_with_attribute() {
        let err = CodecError::MalformedWireValue {
            reason: "empty string set".to_owned(),
        }
        .at("tags");
        assert_eq!(
            err.to_string(),
            "malformed wire value: attribute `tags`: empty string set"
        );
    }

    #[test]
    fn test_should_name_attribute_in_key_errors() {
        let err = KeyConditionError::KeyConditionGap {
            skipped: "date".to_owned(),
            attribute: "seq".to_owned(),
        };
        let msg = err.to_string();
        assert!(msg.contains("`seq`"), "{msg}");
        assert!(msg.contains("`date`"), "{msg}");
    }
}
