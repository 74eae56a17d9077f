//! Projection expressions.

use std::ops::BitAnd;

use super::ast::AttributePath;
use super::params::ExpressionParams;
use crate::error::ExpressionError;

/// The attributes to return, in order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectionExpression {
    paths: Vec<AttributePath>,
}

impl ProjectionExpression {
    /// Builds a projection from paths or attribute names.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<AttributePath>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    /// The projected paths.
    #[must_use]
    pub fn paths(&self) -> &[AttributePath] {
        &self.paths
    }

    /// Returns `true` if no path is projected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl From<AttributePath> for ProjectionExpression {
    fn from(path: AttributePath) -> Self {
        Self { paths: vec![path] }
    }
}

impl BitAnd for AttributePath {
    type Output = ProjectionExpression;

    fn bitand(self, rhs: Self) -> Self::Output {
        ProjectionExpression {
            paths: vec![self, rhs],
        }
    }
}

impl BitAnd<AttributePath> for ProjectionExpression {
    type Output = ProjectionExpression;

    fn bitand(mut self, rhs: AttributePath) -> Self::Output {
        self.paths.push(rhs);
        self
    }
}

impl ExpressionParams {
    /// Renders a projection as comma-separated placeholdered paths.
    pub fn projection(
        &mut self,
        projection: &ProjectionExpression,
    ) -> Result<String, ExpressionError> {
        if projection.is_empty() {
            return Err(ExpressionError::EmptyProjection);
        }
        Ok(projection
            .paths()
            .iter()
            .map(|path| self.path(path))
            .collect::<Vec<_>>()
            .join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::ast::attr;

    #[test]
    fn test_should_share_placeholder_between_components() {
        let projection = attr("foo").index(0).field("bar") & attr("bar");
        let mut params = ExpressionParams::new();
        assert_eq!(params.projection(&projection).unwrap(), "#n0[0].#n1,#n1");
        assert_eq!(params.attribute_names().len(), 2);
    }

    #[test]
    fn test_should_build_from_names() {
        let projection = ProjectionExpression::new(["a", "b", "c"]);
        let mut params = ExpressionParams::new();
        assert_eq!(params.projection(&projection).unwrap(), "#n0,#n1,#n2");
    }

    #[test]
    fn test_should_reject_empty_projection() {
        let mut params = ExpressionParams::new();
        assert_eq!(
            params.projection(&ProjectionExpression::default()),
            Err(ExpressionError::EmptyProjection)
        );
    }
}
