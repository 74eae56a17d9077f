//! Update expressions.
//!
//! Actions are collected in call order and rendered grouped by keyword in
//! the fixed order `SET`, `REMOVE`, `ADD`, `DELETE`:
//!
//! ```text
//! SET #n0 = :v0, #n1 = #n1 + :v1 REMOVE #n2 ADD #n3 :v2
//! ```

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::fmt;
use std::ops::BitAnd;

use super::ast::AttributePath;
use super::params::{ExpressionParams, Inline, Sink};
use crate::codec::{Number, Value};
use crate::error::ExpressionError;

/// The four update clause keywords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateKeyword {
    /// `SET`
    Set,
    /// `REMOVE`
    Remove,
    /// `ADD`
    Add,
    /// `DELETE`
    Delete,
}

impl UpdateKeyword {
    /// Keywords in rendering order.
    pub const ORDER: [Self; 4] = [Self::Set, Self::Remove, Self::Add, Self::Delete];

    /// The keyword as written in an expression.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Set => "SET",
            Self::Remove => "REMOVE",
            Self::Add => "ADD",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for UpdateKeyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single update action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateAction {
    /// `SET path = value`
    Set {
        /// Target path.
        path: AttributePath,
        /// New value.
        value: Value,
    },
    /// `SET path = if_not_exists(path, value)`
    SetIfNotExists {
        /// Target path.
        path: AttributePath,
        /// Value used when the attribute is absent.
        value: Value,
    },
    /// `SET path = path + delta`, or `- |delta|` for a negative delta.
    Change {
        /// Numeric attribute to change.
        path: AttributePath,
        /// Amount to add.
        delta: Number,
    },
    /// `SET path = list_append(path, value)`
    Append {
        /// List attribute.
        path: AttributePath,
        /// List of elements to append.
        value: Value,
    },
    /// `REMOVE path`
    Remove(AttributePath),
    /// `ADD path value`
    Add {
        /// Number or set attribute.
        path: AttributePath,
        /// Number to add or set members to insert.
        value: Value,
    },
    /// `DELETE path value`
    Delete {
        /// Set attribute.
        path: AttributePath,
        /// Set members to remove.
        value: Value,
    },
}

impl UpdateAction {
    /// The keyword this action is grouped under.
    #[must_use]
    pub fn keyword(&self) -> UpdateKeyword {
        match self {
            Self::Set { .. }
            | Self::SetIfNotExists { .. }
            | Self::Change { .. }
            | Self::Append { .. } => UpdateKeyword::Set,
            Self::Remove(_) => UpdateKeyword::Remove,
            Self::Add { .. } => UpdateKeyword::Add,
            Self::Delete { .. } => UpdateKeyword::Delete,
        }
    }

    /// The path this action targets.
    #[must_use]
    pub fn path(&self) -> &AttributePath {
        match self {
            Self::Set { path, .. }
            | Self::SetIfNotExists { path, .. }
            | Self::Change { path, .. }
            | Self::Append { path, .. }
            | Self::Remove(path)
            | Self::Add { path, .. }
            | Self::Delete { path, .. } => path,
        }
    }

    fn render<S: Sink>(&self, sink: &mut S) -> Result<String, ExpressionError> {
        let path = sink.path(self.path());
        Ok(match self {
            Self::Set { value, .. } => format!("{path} = {}", sink.value(value)?),
            Self::SetIfNotExists { value, .. } => {
                format!("{path} = if_not_exists({path}, {})", sink.value(value)?)
            }
            Self::Change { delta, .. } => {
                let (op, amount) = if delta.is_negative() {
                    ('-', delta.abs())
                } else {
                    ('+', delta.clone())
                };
                let amount = sink.value(&Value::Number(amount))?;
                format!("{path} = {path} {op} {amount}")
            }
            Self::Append { value, .. } => {
                format!("{path} = list_append({path}, {})", sink.value(value)?)
            }
            Self::Remove(_) => path,
            Self::Add { value, .. } | Self::Delete { value, .. } => {
                format!("{path} {}", sink.value(value)?)
            }
        })
    }
}

/// An ordered list of update actions, composed with `&`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateExpression {
    actions: Vec<UpdateAction>,
}

impl UpdateExpression {
    /// An update with no actions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The actions in call order.
    #[must_use]
    pub fn actions(&self) -> &[UpdateAction] {
        &self.actions
    }

    /// Returns `true` if there are no actions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Appends an action.
    #[must_use]
    pub fn with(mut self, action: UpdateAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Renders the update with names and values inlined, for logs.
    ///
    /// The output is not a valid DynamoDB expression.
    #[must_use]
    pub fn debug(&self) -> String {
        render(&mut Inline, self).unwrap_or_else(|e| format!("<{e}>"))
    }
}

impl From<UpdateAction> for UpdateExpression {
    fn from(action: UpdateAction) -> Self {
        Self {
            actions: vec![action],
        }
    }
}

impl FromIterator<UpdateAction> for UpdateExpression {
    fn from_iter<I: IntoIterator<Item = UpdateAction>>(iter: I) -> Self {
        Self {
            actions: iter.into_iter().collect(),
        }
    }
}

impl BitAnd for UpdateExpression {
    type Output = UpdateExpression;

    fn bitand(mut self, rhs: Self) -> Self::Output {
        self.actions.extend(rhs.actions);
        self
    }
}

impl AttributePath {
    /// `SET path = value`
    pub fn set(&self, value: impl Into<Value>) -> UpdateExpression {
        UpdateAction::Set {
            path: self.clone(),
            value: value.into(),
        }
        .into()
    }

    /// `SET path = if_not_exists(path, value)`
    pub fn set_if_not_exists(&self, value: impl Into<Value>) -> UpdateExpression {
        UpdateAction::SetIfNotExists {
            path: self.clone(),
            value: value.into(),
        }
        .into()
    }

    /// Adds `delta` to a number attribute with `SET`.
    pub fn change(&self, delta: impl Into<Number>) -> UpdateExpression {
        UpdateAction::Change {
            path: self.clone(),
            delta: delta.into(),
        }
        .into()
    }

    /// Appends the elements of a list to a list attribute.
    pub fn append(&self, value: impl Into<Value>) -> UpdateExpression {
        UpdateAction::Append {
            path: self.clone(),
            value: value.into(),
        }
        .into()
    }

    /// `REMOVE path`
    #[must_use]
    pub fn remove(&self) -> UpdateExpression {
        UpdateAction::Remove(self.clone()).into()
    }

    /// `ADD path value`
    pub fn add(&self, value: impl Into<Value>) -> UpdateExpression {
        UpdateAction::Add {
            path: self.clone(),
            value: value.into(),
        }
        .into()
    }

    /// `DELETE path value`
    pub fn delete(&self, value: impl Into<Value>) -> UpdateExpression {
        UpdateAction::Delete {
            path: self.clone(),
            value: value.into(),
        }
        .into()
    }
}

impl ExpressionParams {
    /// Renders an update expression.
    ///
    /// Fails when one path is targeted under two different keywords, or when
    /// there are no actions.
    pub fn update(&mut self, update: &UpdateExpression) -> Result<String, ExpressionError> {
        render(self, update)
    }
}

fn render<S: Sink>(sink: &mut S, update: &UpdateExpression) -> Result<String, ExpressionError> {
    if update.is_empty() {
        return Err(ExpressionError::EmptyUpdate);
    }

    let mut seen: HashMap<&AttributePath, UpdateKeyword> = HashMap::new();
    let mut groups: HashMap<UpdateKeyword, Vec<String>> = HashMap::new();
    for action in update.actions() {
        let keyword = action.keyword();
        match seen.entry(action.path()) {
            Entry::Occupied(entry) if *entry.get() != keyword => {
                return Err(ExpressionError::ConflictingUpdateAction {
                    path: action.path().to_string(),
                    first: *entry.get(),
                    second: keyword,
                });
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(entry) => {
                entry.insert(keyword);
            }
        }
        groups
            .entry(keyword)
            .or_default()
            .push(action.render(sink)?);
    }

    Ok(UpdateKeyword::ORDER
        .iter()
        .filter_map(|keyword| {
            groups
                .get(keyword)
                .map(|clauses| format!("{keyword} {}", clauses.join(", ")))
        })
        .collect::<Vec<_>>()
        .join(" "))
}

#[cfg(test)]
mod tests {
    use dynaxpr_model::AttributeValue;

    use super::*;
    use crate::expression::ast::attr;

    fn render(update: &UpdateExpression) -> Result<String, ExpressionError> {
        ExpressionParams::new().update(update)
    }

    #[test]
    fn test_should_group_actions_by_keyword() {
        let update = attr("a").set(1)
            & attr("c").remove()
            & attr("b").add(2)
            & attr("d").delete(Value::string_set(["x"]))
            & attr("e").set("v");
        assert_eq!(
            render(&update).unwrap(),
            "SET #n0 = :v0, #n4 = :v3 REMOVE #n1 ADD #n2 :v1 DELETE #n3 :v2"
        );
    }

    #[test]
    fn test_should_render_debug_form_inline() {
        let update = attr("a").set(1)
            & attr("c").remove()
            & attr("b").add(2)
            & attr("d").delete(Value::string_set(["e"]));
        assert_eq!(update.debug(), r#"SET a = 1 REMOVE c ADD b 2 DELETE d {"e"}"#);
        assert_eq!(UpdateExpression::new().debug(), "<update expression has no actions>");
    }

    #[test]
    fn test_should_render_set_functions() {
        let update = attr("count").change(-3)
            & attr("created").set_if_not_exists("now")
            & attr("log").append(Value::list(["entry"]));
        let mut params = ExpressionParams::new();
        let expression = params.update(&update).unwrap();
        assert_eq!(
            expression,
            "SET #n0 = #n0 - :v0, #n1 = if_not_exists(#n1, :v1), #n2 = list_append(#n2, :v2)"
        );
        assert_eq!(
            params.attribute_values()[":v0"],
            AttributeValue::N("3".to_owned())
        );
    }

    #[test]
    fn test_should_reject_set_and_remove_of_same_path() {
        let update = attr("x").set(1) & attr("x").remove();
        assert_eq!(
            render(&update),
            Err(ExpressionError::ConflictingUpdateAction {
                path: "x".to_owned(),
                first: UpdateKeyword::Set,
                second: UpdateKeyword::Remove,
            })
        );
    }

    #[test]
    fn test_should_treat_set_variants_as_one_keyword() {
        let update = attr("x").set(1) & attr("x").change(1);
        assert!(render(&update).is_ok());
    }

    #[test]
    fn test_should_reject_empty_update() {
        assert_eq!(
            render(&UpdateExpression::new()),
            Err(ExpressionError::EmptyUpdate)
        );
    }
}
