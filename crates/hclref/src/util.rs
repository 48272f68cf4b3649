use crate::addrs::{InstanceKey, Traverser};
use hcl::{Expression, Traversal, TraversalOperator};

/// Instance key of a constant index expression
///
/// `[0]` and `["key"]` are constant, `[count.index]` is not.
pub(crate) fn constant_key(expr: &Expression) -> Option<InstanceKey> {
    match expr {
        Expression::Number(num) => num.as_i64().map(InstanceKey::Int),
        Expression::String(s) => Some(InstanceKey::String(s.clone())),
        Expression::Parenthesis(inner) => constant_key(inner),
        _ => None,
    }
}

/// `a.0` style index, `None` if it doesn't fit a key
fn legacy_key(index: u64) -> Option<InstanceKey> {
    i64::try_from(index).ok().map(InstanceKey::Int)
}

pub(crate) trait TraversalExt {
    /// Name of the root variable, if the traversal starts at one
    fn root_name(&self) -> Option<&str>;
}

impl TraversalExt for Traversal {
    fn root_name(&self) -> Option<&str> {
        match &self.expr {
            Expression::Variable(var) => Some(var.as_str()),
            _ => None,
        }
    }
}

pub(crate) trait TraversalOperatorsExt {
    /// Split off a leading `.name`
    fn split_attr(&self) -> Option<(&str, &Self)>;
    /// Split off a leading constant `[key]`
    fn split_key(&self) -> Option<(InstanceKey, &Self)>;
    /// Convert into address steps
    fn traversers(&self) -> Vec<Traverser>;
}

impl TraversalOperatorsExt for [TraversalOperator] {
    fn split_attr(&self) -> Option<(&str, &Self)> {
        match self.split_first() {
            Some((TraversalOperator::GetAttr(ident), rest)) => Some((ident.as_str(), rest)),
            _ => None,
        }
    }

    fn split_key(&self) -> Option<(InstanceKey, &Self)> {
        match self.split_first() {
            Some((TraversalOperator::Index(expr), rest)) => {
                constant_key(expr).map(|key| (key, rest))
            }
            Some((TraversalOperator::LegacyIndex(index), rest)) => {
                legacy_key(*index).map(|key| (key, rest))
            }
            _ => None,
        }
    }

    fn traversers(&self) -> Vec<Traverser> {
        self.iter()
            .map(|operator| match operator {
                TraversalOperator::GetAttr(ident) => Traverser::Attr(ident.as_str().to_string()),
                TraversalOperator::Index(expr) => Traverser::Index(constant_key(expr)),
                TraversalOperator::LegacyIndex(index) => Traverser::Index(legacy_key(*index)),
                // attribute and full splat
                _ => Traverser::Splat,
            })
            .collect()
    }
}
