//! Condition AST and the builder API that produces it.
//!
//! Conditions are built from [`attr`] paths and composed with `&`, `|` and
//! `!`. Chaining the same logical operator flattens into one n-ary node, so
//! `a & b & c` is a single `And` with three children.

use std::fmt;
use std::ops::{BitAnd, BitOr, Not};

use crate::codec::Value;

/// A single element in an attribute path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathElement {
    /// An attribute name. Dots are part of the name, not separators.
    Name(String),
    /// A list index dereference (e.g., `[0]`).
    Index(usize),
}

/// A document path consisting of one or more elements.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributePath {
    elements: Vec<PathElement>,
}

/// Starts a path at a top-level attribute.
///
/// `attr("a.b")` names the single attribute `a.b`; use
/// `attr("a").field("b")` for the nested map member.
pub fn attr(name: impl Into<String>) -> AttributePath {
    AttributePath {
        elements: vec![PathElement::Name(name.into())],
    }
}

impl AttributePath {
    /// Descends into a map member.
    #[must_use]
    pub fn field(mut self, name: impl Into<String>) -> Self {
        self.elements.push(PathElement::Name(name.into()));
        self
    }

    /// Descends into a list element.
    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.elements.push(PathElement::Index(index));
        self
    }

    /// The path elements in order.
    #[must_use]
    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    /// The top-level attribute name.
    #[must_use]
    pub fn root(&self) -> &str {
        match self.elements.first() {
            Some(PathElement::Name(name)) => name,
            _ => "",
        }
    }

    // -- Conditions --

    /// `path = value`
    pub fn equals(&self, value: impl Into<Operand>) -> Condition {
        compare(self.into(), CompareOp::Eq, value)
    }

    /// `path <> value`
    pub fn not_equals(&self, value: impl Into<Operand>) -> Condition {
        compare(self.into(), CompareOp::Ne, value)
    }

    /// `path < value`
    pub fn lt(&self, value: impl Into<Operand>) -> Condition {
        compare(self.into(), CompareOp::Lt, value)
    }

    /// `path <= value`
    pub fn lte(&self, value: impl Into<Operand>) -> Condition {
        compare(self.into(), CompareOp::Le, value)
    }

    /// `path > value`
    pub fn gt(&self, value: impl Into<Operand>) -> Condition {
        compare(self.into(), CompareOp::Gt, value)
    }

    /// `path >= value`
    pub fn gte(&self, value: impl Into<Operand>) -> Condition {
        compare(self.into(), CompareOp::Ge, value)
    }

    /// `path BETWEEN low AND high`
    pub fn between(&self, low: impl Into<Operand>, high: impl Into<Operand>) -> Condition {
        Condition::Between {
            operand: self.into(),
            low: low.into(),
            high: high.into(),
        }
    }

    /// `path IN (candidates...)`
    pub fn is_in<I, V>(&self, candidates: I) -> Condition
    where
        I: IntoIterator<Item = V>,
        V: Into<Operand>,
    {
        Condition::In {
            operand: self.into(),
            candidates: candidates.into_iter().map(Into::into).collect(),
        }
    }

    /// `begins_with(path, prefix)`
    pub fn begins_with(&self, prefix: impl Into<Operand>) -> Condition {
        Condition::BeginsWith {
            path: self.clone(),
            prefix: prefix.into(),
        }
    }

    /// `contains(path, operand)`
    pub fn contains(&self, operand: impl Into<Operand>) -> Condition {
        Condition::Contains {
            path: self.clone(),
            operand: operand.into(),
        }
    }

    /// `attribute_exists(path)`
    #[must_use]
    pub fn exists(&self) -> Condition {
        Condition::AttributeExists(self.clone())
    }

    /// `attribute_not_exists(path)`
    #[must_use]
    pub fn does_not_exist(&self) -> Condition {
        Condition::AttributeNotExists(self.clone())
    }

    /// `attribute_type(path, kind)`
    #[must_use]
    pub fn attribute_type(&self, kind: AttributeKind) -> Condition {
        Condition::AttributeType {
            path: self.clone(),
            kind,
        }
    }

    /// `size(path)`, to be compared against a number.
    #[must_use]
    pub fn size(&self) -> Size {
        Size(self.clone())
    }
}

impl fmt::Display for AttributePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, elem) in self.elements.iter().enumerate() {
            match elem {
                PathElement::Name(name) if i > 0 => write!(f, ".{name}")?,
                PathElement::Name(name) => f.write_str(name)?,
                PathElement::Index(idx) => write!(f, "[{idx}]")?,
            }
        }
        Ok(())
    }
}

impl From<&str> for AttributePath {
    fn from(name: &str) -> Self {
        attr(name)
    }
}

impl From<String> for AttributePath {
    fn from(name: String) -> Self {
        attr(name)
    }
}

/// `size(path)` on the left-hand side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Size(AttributePath);

impl Size {
    /// `size(path) = value`
    pub fn equals(&self, value: impl Into<Operand>) -> Condition {
        compare(self.operand(), CompareOp::Eq, value)
    }

    /// `size(path) <> value`
    pub fn not_equals(&self, value: impl Into<Operand>) -> Condition {
        compare(self.operand(), CompareOp::Ne, value)
    }

    /// `size(path) < value`
    pub fn lt(&self, value: impl Into<Operand>) -> Condition {
        compare(self.operand(), CompareOp::Lt, value)
    }

    /// `size(path) <= value`
    pub fn lte(&self, value: impl Into<Operand>) -> Condition {
        compare(self.operand(), CompareOp::Le, value)
    }

    /// `size(path) > value`
    pub fn gt(&self, value: impl Into<Operand>) -> Condition {
        compare(self.operand(), CompareOp::Gt, value)
    }

    /// `size(path) >= value`
    pub fn gte(&self, value: impl Into<Operand>) -> Condition {
        compare(self.operand(), CompareOp::Ge, value)
    }

    fn operand(&self) -> Operand {
        Operand::Size(self.0.clone())
    }
}

fn compare(left: Operand, op: CompareOp, right: impl Into<Operand>) -> Condition {
    Condition::Compare {
        left,
        op,
        right: right.into(),
    }
}

/// An operand in a condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    /// A document path, rendered through a name placeholder.
    Path(AttributePath),
    /// A literal, rendered through a value placeholder.
    Value(Value),
    /// `size(path)`.
    Size(AttributePath),
}

impl<T: Into<Value>> From<T> for Operand {
    fn from(value: T) -> Self {
        Self::Value(value.into())
    }
}

impl From<AttributePath> for Operand {
    fn from(path: AttributePath) -> Self {
        Self::Path(path)
    }
}

impl From<&AttributePath> for Operand {
    fn from(path: &AttributePath) -> Self {
        Self::Path(path.clone())
    }
}

/// Comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal (`=`).
    Eq,
    /// Not equal (`<>`).
    Ne,
    /// Less than (`<`).
    Lt,
    /// Less than or equal (`<=`).
    Le,
    /// Greater than (`>`).
    Gt,
    /// Greater than or equal (`>=`).
    Ge,
}

impl CompareOp {
    /// The operator as written in an expression.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
        }
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Attribute types accepted by `attribute_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKind {
    /// `S`
    String,
    /// `N`
    Number,
    /// `B`
    Binary,
    /// `BOOL`
    Bool,
    /// `NULL`
    Null,
    /// `SS`
    StringSet,
    /// `NS`
    NumberSet,
    /// `BS`
    BinarySet,
    /// `L`
    List,
    /// `M`
    Map,
}

impl AttributeKind {
    /// The wire type descriptor.
    #[must_use]
    pub fn descriptor(self) -> &'static str {
        match self {
            Self::String => "S",
            Self::Number => "N",
            Self::Binary => "B",
            Self::Bool => "BOOL",
            Self::Null => "NULL",
            Self::StringSet => "SS",
            Self::NumberSet => "NS",
            Self::BinarySet => "BS",
            Self::List => "L",
            Self::Map => "M",
        }
    }
}

/// A condition, filter or key-condition expression tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// `left op right`
    Compare {
        /// Left-hand operand.
        left: Operand,
        /// Comparison operator.
        op: CompareOp,
        /// Right-hand operand.
        right: Operand,
    },
    /// `operand BETWEEN low AND high`
    Between {
        /// Value to test.
        operand: Operand,
        /// Lower bound (inclusive).
        low: Operand,
        /// Upper bound (inclusive).
        high: Operand,
    },
    /// `operand IN (candidates...)`
    In {
        /// Value to search for.
        operand: Operand,
        /// Candidate values.
        candidates: Vec<Operand>,
    },
    /// `begins_with(path, prefix)`
    BeginsWith {
        /// Attribute to test.
        path: AttributePath,
        /// Expected prefix.
        prefix: Operand,
    },
    /// `contains(path, operand)`
    Contains {
        /// String or set attribute.
        path: AttributePath,
        /// Substring or member.
        operand: Operand,
    },
    /// `attribute_exists(path)`
    AttributeExists(AttributePath),
    /// `attribute_not_exists(path)`
    AttributeNotExists(AttributePath),
    /// `attribute_type(path, kind)`
    AttributeType {
        /// Attribute to test.
        path: AttributePath,
        /// Expected type.
        kind: AttributeKind,
    },
    /// All children hold.
    And(Vec<Condition>),
    /// At least one child holds.
    Or(Vec<Condition>),
    /// The child does not hold.
    Not(Box<Condition>),
}

impl Condition {
    /// Renders the condition with names and values inlined, for logs.
    ///
    /// The output is not a valid DynamoDB expression.
    #[must_use]
    pub fn debug(&self) -> String {
        super::params::render_inline(self)
    }
}

impl BitAnd for Condition {
    type Output = Condition;

    fn bitand(self, rhs: Self) -> Self::Output {
        let mut children = match self {
            Self::And(children) => children,
            other => vec![other],
        };
        match rhs {
            Self::And(more) => children.extend(more),
            other => children.push(other),
        }
        Self::And(children)
    }
}

impl BitOr for Condition {
    type Output = Condition;

    fn bitor(self, rhs: Self) -> Self::Output {
        let mut children = match self {
            Self::Or(children) => children,
            other => vec![other],
        };
        match rhs {
            Self::Or(more) => children.extend(more),
            other => children.push(other),
        }
        Self::Or(children)
    }
}

impl Not for Condition {
    type Output = Condition;

    fn not(self) -> Self::Output {
        Self::Not(Box::new(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_should_flatten_chained_and() {
        let cond = attr("a").equals(1) & attr("b").equals(2) & attr("c").equals(3);
        assert!(matches!(cond, Condition::And(ref children) if children.len() == 3));
    }

    #[test]
    fn test_should_not_flatten_mixed_operators() {
        let cond = (attr("a").equals(1) | attr("b").equals(2)) & attr("c").equals(3);
        let Condition::And(children) = cond else {
            panic!("expected And");
        };
        assert_eq!(children.len(), 2);
        assert!(matches!(children[0], Condition::Or(ref or) if or.len() == 2));
    }

    #[test]
    fn test_should_display_nested_path() {
        let path = attr("foo").index(0).field("bar");
        assert_eq!(path.to_string(), "foo[0].bar");
        assert_eq!(path.root(), "foo");
    }

    #[test]
    fn test_should_treat_dotted_name_as_one_element() {
        assert_eq!(attr("a.b").elements().len(), 1);
    }

    #[test]
    fn test_should_compare_two_paths() {
        let cond = attr("a").lt(attr("b"));
        assert!(matches!(
            cond,
            Condition::Compare {
                right: Operand::Path(_),
                ..
            }
        ));
    }
}
