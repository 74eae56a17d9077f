//! Placeholder allocation and expression rendering.
//!
//! Every attribute name is rendered as `#n<i>` and every literal as `:v<i>`,
//! numbered in first-seen order during a pre-order walk. A name or value seen
//! again reuses its placeholder. One [`ExpressionParams`] is shared by all
//! expressions of a request so the placeholder maps stay consistent.

use std::collections::HashMap;

use dynaxpr_model::AttributeValue;

use super::ast::{AttributePath, Condition, Operand, PathElement};
use crate::codec::{self, Value};
use crate::error::{CodecError, ExpressionError};

/// A compiled expression and the placeholder maps it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledExpression {
    expression: String,
    names: HashMap<String, String>,
    values: HashMap<String, AttributeValue>,
}

impl CompiledExpression {
    /// The expression string.
    #[must_use]
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// `ExpressionAttributeNames`: placeholder to attribute name.
    #[must_use]
    pub fn names(&self) -> &HashMap<String, String> {
        &self.names
    }

    /// `ExpressionAttributeValues`: placeholder to attribute value.
    #[must_use]
    pub fn values(&self) -> &HashMap<String, AttributeValue> {
        &self.values
    }

    /// Splits into expression, names and values.
    #[must_use]
    pub fn into_parts(
        self,
    ) -> (
        String,
        HashMap<String, String>,
        HashMap<String, AttributeValue>,
    ) {
        (self.expression, self.names, self.values)
    }
}

/// Placeholder allocator shared by the expressions of one request.
#[derive(Debug, Clone, Default)]
pub struct ExpressionParams {
    names: HashMap<String, String>,
    values: HashMap<AttributeValue, String>,
}

impl ExpressionParams {
    /// Creates an empty allocator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no placeholder has been allocated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.values.is_empty()
    }

    /// The placeholder for an attribute name.
    pub fn name(&mut self, name: &str) -> String {
        if let Some(placeholder) = self.names.get(name) {
            return placeholder.clone();
        }
        let placeholder = format!("#n{}", self.names.len());
        self.names.insert(name.to_owned(), placeholder.clone());
        placeholder
    }

    /// The placeholder for an encoded value.
    pub fn wire_value(&mut self, value: AttributeValue) -> String {
        if let Some(placeholder) = self.values.get(&value) {
            return placeholder.clone();
        }
        let placeholder = format!(":v{}", self.values.len());
        self.values.insert(value, placeholder.clone());
        placeholder
    }

    /// Encodes a value and returns its placeholder.
    pub fn value(&mut self, value: &Value) -> Result<String, CodecError> {
        Ok(self.wire_value(codec::encode(value)?))
    }

    /// Renders a path with one name placeholder per name element.
    pub fn path(&mut self, path: &AttributePath) -> String {
        let mut out = String::new();
        for (i, element) in path.elements().iter().enumerate() {
            match element {
                PathElement::Name(name) => {
                    if i > 0 {
                        out.push('.');
                    }
                    out.push_str(&self.name(name));
                }
                PathElement::Index(idx) => {
                    out.push('[');
                    out.push_str(&idx.to_string());
                    out.push(']');
                }
            }
        }
        out
    }

    /// Renders a condition, allocating placeholders as it goes.
    pub fn condition(&mut self, condition: &Condition) -> Result<String, ExpressionError> {
        render(self, condition)
    }

    /// `ExpressionAttributeNames` for everything rendered so far.
    #[must_use]
    pub fn attribute_names(&self) -> HashMap<String, String> {
        self.names
            .iter()
            .map(|(name, placeholder)| (placeholder.clone(), name.clone()))
            .collect()
    }

    /// `ExpressionAttributeValues` for everything rendered so far.
    #[must_use]
    pub fn attribute_values(&self) -> HashMap<String, AttributeValue> {
        self.values
            .iter()
            .map(|(value, placeholder)| (placeholder.clone(), value.clone()))
            .collect()
    }

    /// Packages an expression rendered by this allocator.
    #[must_use]
    pub fn finish(self, expression: String) -> CompiledExpression {
        CompiledExpression {
            names: self.attribute_names(),
            values: self.attribute_values(),
            expression,
        }
    }
}

// ---------------------------------------------------------------------------
// Rendering
// ---------------------------------------------------------------------------

/// Where names and values go while rendering.
pub(crate) trait Sink {
    fn path(&mut self, path: &AttributePath) -> String;
    fn value(&mut self, value: &Value) -> Result<String, ExpressionError>;
}

impl Sink for ExpressionParams {
    fn path(&mut self, path: &AttributePath) -> String {
        ExpressionParams::path(self, path)
    }

    fn value(&mut self, value: &Value) -> Result<String, ExpressionError> {
        Ok(ExpressionParams::value(self, value)?)
    }
}

/// Inlines names and values verbatim.
pub(crate) struct Inline;

impl Sink for Inline {
    fn path(&mut self, path: &AttributePath) -> String {
        path.to_string()
    }

    fn value(&mut self, value: &Value) -> Result<String, ExpressionError> {
        Ok(value.to_string())
    }
}

pub(crate) fn render_inline(condition: &Condition) -> String {
    render(&mut Inline, condition).unwrap_or_else(|e| format!("<{e}>"))
}

fn operand<S: Sink>(sink: &mut S, operand: &Operand) -> Result<String, ExpressionError> {
    Ok(match operand {
        Operand::Path(path) => sink.path(path),
        Operand::Value(value) => sink.value(value)?,
        Operand::Size(path) => format!("size({})", sink.path(path)),
    })
}

fn render<S: Sink>(sink: &mut S, condition: &Condition) -> Result<String, ExpressionError> {
    Ok(match condition {
        Condition::Compare { left, op, right } => {
            let left = operand(sink, left)?;
            let right = operand(sink, right)?;
            format!("{left} {op} {right}")
        }
        Condition::Between {
            operand: value,
            low,
            high,
        } => {
            let value = operand(sink, value)?;
            let low = operand(sink, low)?;
            let high = operand(sink, high)?;
            format!("{value} BETWEEN {low} AND {high}")
        }
        Condition::In {
            operand: value,
            candidates,
        } => {
            if candidates.is_empty() {
                return Err(ExpressionError::EmptyOperands { operator: "IN" });
            }
            let value = operand(sink, value)?;
            let candidates = candidates
                .iter()
                .map(|c| operand(sink, c))
                .collect::<Result<Vec<_>, _>>()?;
            format!("{value} IN ({})", candidates.join(", "))
        }
        Condition::BeginsWith { path, prefix } => {
            let path = sink.path(path);
            format!("begins_with({path}, {})", operand(sink, prefix)?)
        }
        Condition::Contains {
            path,
            operand: member,
        } => {
            let path = sink.path(path);
            format!("contains({path}, {})", operand(sink, member)?)
        }
        Condition::AttributeExists(path) => format!("attribute_exists({})", sink.path(path)),
        Condition::AttributeNotExists(path) => {
            format!("attribute_not_exists({})", sink.path(path))
        }
        Condition::AttributeType { path, kind } => {
            let path = sink.path(path);
            let kind = sink.value(&Value::from(kind.descriptor()))?;
            format!("attribute_type({path}, {kind})")
        }
        Condition::And(children) => group(sink, "AND", children)?,
        Condition::Or(children) => group(sink, "OR", children)?,
        Condition::Not(inner) => format!("NOT ({})", render(sink, inner)?),
    })
}

fn group<S: Sink>(
    sink: &mut S,
    operator: &'static str,
    children: &[Condition],
) -> Result<String, ExpressionError> {
    match children {
        [] => Err(ExpressionError::EmptyOperands { operator }),
        [only] => render(sink, only),
        _ => {
            let parts = children
                .iter()
                .map(|child| render(sink, child).map(|s| format!("({s})")))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(parts.join(&format!(" {operator} ")))
        }
    }
}
