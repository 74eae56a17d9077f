//! Expression builder.
//!
//! Builds condition, filter, key-condition, update and projection expressions
//! as typed trees and compiles them into DynamoDB expression strings with
//! `ExpressionAttributeNames` / `ExpressionAttributeValues` placeholder maps.
//!
//! ```
//! use dynaxpr_core::expression::{attr, compile};
//!
//! let compiled = compile(&(attr("status").equals("active") & attr("age").gte(18))).unwrap();
//! assert_eq!(compiled.expression(), "(#n0 = :v0) AND (#n1 >= :v1)");
//! ```

pub mod ast;
pub mod key;
pub mod params;
pub mod projection;
pub mod update;

pub use ast::{AttributeKind, AttributePath, CompareOp, Condition, Operand, PathElement, Size, attr};
pub use key::{
    HashKey, KeyClause, KeyCondition, KeyOperator, MultiHashKey, RangeKey, compile_key_condition,
    validate_and_build_key_condition,
};
pub use params::{CompiledExpression, ExpressionParams};
pub use projection::ProjectionExpression;
pub use update::{UpdateAction, UpdateExpression, UpdateKeyword};

use crate::error::ExpressionError;

/// Compiles a condition or filter expression on its own.
pub fn compile(condition: &Condition) -> Result<CompiledExpression, ExpressionError> {
    let mut params = ExpressionParams::new();
    let expression = params.condition(condition)?;
    tracing::trace!(%expression, "compiled condition expression");
    Ok(params.finish(expression))
}

/// Compiles an update expression on its own.
pub fn compile_update(update: &UpdateExpression) -> Result<CompiledExpression, ExpressionError> {
    let mut params = ExpressionParams::new();
    let expression = params.update(update)?;
    tracing::trace!(%expression, "compiled update expression");
    Ok(params.finish(expression))
}

/// Compiles a projection expression on its own.
pub fn compile_projection(
    projection: &ProjectionExpression,
) -> Result<CompiledExpression, ExpressionError> {
    let mut params = ExpressionParams::new();
    let expression = params.projection(projection)?;
    Ok(params.finish(expression))
}
