//! Key conditions and their validation against a multi-attribute key schema.
//!
//! A key condition is a set of clauses, one per key attribute, built from
//! [`HashKey`], [`MultiHashKey`] and [`RangeKey`] and joined with `&`.
//! [`validate_and_build_key_condition`] checks it against a [`KeySchema`]:
//!
//! * every partition key attribute is matched with `=`;
//! * sort key attributes are matched left to right with no gaps;
//! * only the last matched sort key attribute may use a range operator.

use std::collections::HashMap;
use std::ops::BitAnd;

use super::ast::{Condition, attr};
use super::params::{CompiledExpression, ExpressionParams};
use crate::codec::Value;
use crate::error::KeyConditionError;
use crate::schema::{KeyAttributeType, KeySchema, KeySpec};

/// The operator a key clause applies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyOperator {
    /// `=`
    Eq(Value),
    /// `<`
    Lt(Value),
    /// `<=`
    Le(Value),
    /// `>`
    Gt(Value),
    /// `>=`
    Ge(Value),
    /// `BETWEEN low AND high`
    Between(Value, Value),
    /// `begins_with`
    BeginsWith(Value),
}

impl KeyOperator {
    /// The operator as written in an expression.
    #[must_use]
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Eq(_) => "=",
            Self::Lt(_) => "<",
            Self::Le(_) => "<=",
            Self::Gt(_) => ">",
            Self::Ge(_) => ">=",
            Self::Between(..) => "BETWEEN",
            Self::BeginsWith(_) => "begins_with",
        }
    }

    /// Returns `true` for `=`.
    #[must_use]
    pub fn is_equality(&self) -> bool {
        matches!(self, Self::Eq(_))
    }

    fn values(&self) -> Vec<&Value> {
        match self {
            Self::Eq(v) | Self::Lt(v) | Self::Le(v) | Self::Gt(v) | Self::Ge(v) => vec![v],
            Self::BeginsWith(v) => vec![v],
            Self::Between(low, high) => vec![low, high],
        }
    }
}

/// One key attribute and the operator applied to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyClause {
    name: String,
    operator: KeyOperator,
}

impl KeyClause {
    /// The key attribute name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The operator applied.
    #[must_use]
    pub fn operator(&self) -> &KeyOperator {
        &self.operator
    }

    fn to_condition(&self) -> Condition {
        let path = attr(self.name.as_str());
        match &self.operator {
            KeyOperator::Eq(v) => path.equals(v.clone()),
            KeyOperator::Lt(v) => path.lt(v.clone()),
            KeyOperator::Le(v) => path.lte(v.clone()),
            KeyOperator::Gt(v) => path.gt(v.clone()),
            KeyOperator::Ge(v) => path.gte(v.clone()),
            KeyOperator::Between(low, high) => path.between(low.clone(), high.clone()),
            KeyOperator::BeginsWith(prefix) => path.begins_with(prefix.clone()),
        }
    }

    fn check_types(&self, spec: &KeySpec) -> Result<(), KeyConditionError> {
        for value in self.operator.values() {
            spec.check(value)?;
        }
        Ok(())
    }
}

/// Equality on a single partition key attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashKey {
    name: String,
    value: Value,
}

impl HashKey {
    /// `name = value`
    pub fn new(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Equality on every attribute of a multi-attribute partition key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiHashKey {
    parts: Vec<(String, Value)>,
}

impl MultiHashKey {
    /// `name1 = value1 AND name2 = value2 ...`
    pub fn new<I, N, V>(parts: I) -> Self
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<Value>,
    {
        Self {
            parts: parts
                .into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        }
    }
}

/// A sort key attribute, waiting for its operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeKey {
    name: String,
}

impl RangeKey {
    /// Names a sort key attribute.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    fn clause(&self, operator: KeyOperator) -> KeyClause {
        KeyClause {
            name: self.name.clone(),
            operator,
        }
    }

    /// `name = value`
    pub fn equals(&self, value: impl Into<Value>) -> KeyClause {
        self.clause(KeyOperator::Eq(value.into()))
    }

    /// `name < value`
    pub fn lt(&self, value: impl Into<Value>) -> KeyClause {
        self.clause(KeyOperator::Lt(value.into()))
    }

    /// `name <= value`
    pub fn lte(&self, value: impl Into<Value>) -> KeyClause {
        self.clause(KeyOperator::Le(value.into()))
    }

    /// `name > value`
    pub fn gt(&self, value: impl Into<Value>) -> KeyClause {
        self.clause(KeyOperator::Gt(value.into()))
    }

    /// `name >= value`
    pub fn gte(&self, value: impl Into<Value>) -> KeyClause {
        self.clause(KeyOperator::Ge(value.into()))
    }

    /// `name BETWEEN low AND high`
    pub fn between(&self, low: impl Into<Value>, high: impl Into<Value>) -> KeyClause {
        self.clause(KeyOperator::Between(low.into(), high.into()))
    }

    /// `begins_with(name, prefix)`
    pub fn begins_with(&self, prefix: impl Into<Value>) -> KeyClause {
        self.clause(KeyOperator::BeginsWith(prefix.into()))
    }
}

/// A complete key condition: clauses joined with `&`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyCondition {
    clauses: Vec<KeyClause>,
}

impl KeyCondition {
    /// The clauses in the order they were joined.
    #[must_use]
    pub fn clauses(&self) -> &[KeyClause] {
        &self.clauses
    }
}

impl From<KeyClause> for KeyCondition {
    fn from(clause: KeyClause) -> Self {
        Self {
            clauses: vec![clause],
        }
    }
}

impl From<HashKey> for KeyCondition {
    fn from(key: HashKey) -> Self {
        Self {
            clauses: vec![KeyClause {
                name: key.name,
                operator: KeyOperator::Eq(key.value),
            }],
        }
    }
}

impl From<MultiHashKey> for KeyCondition {
    fn from(key: MultiHashKey) -> Self {
        Self {
            clauses: key
                .parts
                .into_iter()
                .map(|(name, value)| KeyClause {
                    name,
                    operator: KeyOperator::Eq(value),
                })
                .collect(),
        }
    }
}

impl<T: Into<KeyCondition>> BitAnd<T> for KeyCondition {
    type Output = KeyCondition;

    fn bitand(mut self, rhs: T) -> Self::Output {
        self.clauses.extend(rhs.into().clauses);
        self
    }
}

macro_rules! impl_key_bitand {
    ($($ty:ty),*) => {
        $(
            impl<T: Into<KeyCondition>> BitAnd<T> for $ty {
                type Output = KeyCondition;

                fn bitand(self, rhs: T) -> Self::Output {
                    KeyCondition::from(self) & rhs
                }
            }
        )*
    };
}

impl_key_bitand!(HashKey, MultiHashKey, KeyClause);

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Progress through the declared sort key attributes.
#[derive(Clone, Copy)]
enum SortState<'a> {
    Matching,
    Done { skipped: &'a KeySpec },
}

/// Validates a key condition against a schema and builds the condition to
/// compile.
///
/// The leaves of the result follow the declared order of the schema
/// (partition key attributes, then sort key attributes), whatever order the
/// clauses were joined in.
pub fn validate_and_build_key_condition(
    schema: &KeySchema,
    condition: &KeyCondition,
) -> Result<Condition, KeyConditionError> {
    let mut by_name: HashMap<&str, &KeyClause> = HashMap::new();
    for clause in condition.clauses() {
        if schema.find(clause.name()).is_none() {
            return Err(KeyConditionError::UnknownKeyAttribute {
                attribute: clause.name().to_owned(),
            });
        }
        if by_name.insert(clause.name(), clause).is_some() {
            return Err(KeyConditionError::DuplicateKeyAttribute {
                attribute: clause.name().to_owned(),
            });
        }
    }

    let mut leaves = Vec::with_capacity(by_name.len());

    for spec in schema.hash_key() {
        let clause =
            by_name
                .get(spec.name())
                .ok_or_else(|| KeyConditionError::IncompletePartitionKey {
                    attribute: spec.name().to_owned(),
                })?;
        if !clause.operator().is_equality() {
            return Err(KeyConditionError::InvalidPartitionKeyOperator {
                attribute: spec.name().to_owned(),
                operator: clause.operator().symbol(),
            });
        }
        clause.check_types(spec)?;
        leaves.push(clause.to_condition());
    }

    let mut state = SortState::Matching;
    let mut matched = Vec::new();
    for spec in schema.range_key() {
        match (state, by_name.get(spec.name())) {
            (SortState::Matching, Some(clause)) => matched.push((spec, *clause)),
            (SortState::Matching, None) => state = SortState::Done { skipped: spec },
            (SortState::Done { skipped }, Some(_)) => {
                return Err(KeyConditionError::KeyConditionGap {
                    skipped: skipped.name().to_owned(),
                    attribute: spec.name().to_owned(),
                });
            }
            (SortState::Done { .. }, None) => {}
        }
    }

    let last = matched.len().saturating_sub(1);
    for (i, (spec, clause)) in matched.into_iter().enumerate() {
        let operator = clause.operator();
        if i < last && !operator.is_equality() {
            return Err(KeyConditionError::InvalidSortKeyOperator {
                attribute: spec.name().to_owned(),
                operator: operator.symbol(),
                reason: "only the last matched sort key attribute may use a range operator, \
                         earlier ones must use `=`",
            });
        }
        if matches!(operator, KeyOperator::BeginsWith(_))
            && spec.attribute_type() == KeyAttributeType::Number
        {
            return Err(KeyConditionError::InvalidSortKeyOperator {
                attribute: spec.name().to_owned(),
                operator: operator.symbol(),
                reason: "begins_with does not apply to number keys",
            });
        }
        clause.check_types(spec)?;
        leaves.push(clause.to_condition());
    }

    Ok(if leaves.len() == 1 {
        leaves.remove(0)
    } else {
        Condition::And(leaves)
    })
}

impl ExpressionParams {
    /// Validates a key condition and renders it with this allocator.
    pub fn key_condition(
        &mut self,
        schema: &KeySchema,
        condition: &KeyCondition,
    ) -> Result<String, KeyConditionError> {
        let condition = validate_and_build_key_condition(schema, condition)?;
        Ok(self.condition(&condition)?)
    }
}

/// Validates a key condition and compiles it on its own.
pub fn compile_key_condition(
    schema: &KeySchema,
    condition: &KeyCondition,
) -> Result<CompiledExpression, KeyConditionError> {
    let mut params = ExpressionParams::new();
    let expression = params.key_condition(schema, condition)?;
    tracing::trace!(%expression, "compiled key condition expression");
    Ok(params.finish(expression))
}
