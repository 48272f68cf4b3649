//! expression reference extraction
//!
//! Finds the objects an expression or block mentions without evaluating anything. Every
//! traversal rooted in a free variable is classified into an [addrs::Reference]; traversals that
//! don't name a valid object are reported as [Diagnostic]s instead.
//!
//! ```
//! let expr: hcl_edit::expr::Expression = "aws_instance.web[0].id".parse().unwrap();
//! let (refs, diags) = hclref::lang::references_in_expr(&expr.into());
//! assert!(diags.is_empty());
//! assert_eq!(refs[0].to_string(), "aws_instance.web[0].id");
//! ```
mod references;

use crate::addrs;
use crate::visit::{Visit, VisitTraversals};
use hcl::{Body, Expression, Traversal};

/// A non-fatal problem found while extracting references
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub summary: String,
    pub detail: String,
}

impl Diagnostic {
    pub fn new(summary: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            detail: detail.into(),
        }
    }
}

impl std::error::Error for Diagnostic {}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.summary, self.detail)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.0.push(diagnostic);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }
}

#[derive(Default)]
struct ReferenceCollector {
    references: Vec<addrs::Reference>,
    diagnostics: Diagnostics,
}

impl Visit<Traversal> for ReferenceCollector {
    fn visit(&mut self, traversal: &Traversal) {
        match references::parse_ref(traversal) {
            Ok(reference) => self.references.push(reference),
            Err(diagnostic) => {
                tracing::trace!(?diagnostic, "skipping invalid reference");
                self.diagnostics.push(diagnostic);
            }
        }
    }
}

/// References in a single expression
pub fn references_in_expr(expr: &Expression) -> (Vec<addrs::Reference>, Diagnostics) {
    let mut collector = ReferenceCollector::default();
    expr.visit_traversals(&mut collector);
    (collector.references, collector.diagnostics)
}

/// References in all attributes of a block body, including nested blocks
pub fn references_in_block(body: &Body) -> (Vec<addrs::Reference>, Diagnostics) {
    let mut collector = ReferenceCollector::default();
    body.visit_traversals(&mut collector);
    (collector.references, collector.diagnostics)
}
