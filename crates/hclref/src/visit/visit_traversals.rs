use super::Visit;
use hcl::{
    template::{Directive, Element},
    Block, Body, Expression, ObjectKey, Operation, Structure, Template, Traversal,
    TraversalOperator,
};

/// Names bound by enclosing `for` expressions, `%{ for }` directives and `dynamic` blocks
///
/// A traversal rooted in a bound name refers to the loop variable, not to an object of the
/// configuration.
#[derive(Debug, Default)]
pub struct Scope {
    bound: Vec<String>,
}

impl Scope {
    pub fn is_bound(&self, name: &str) -> bool {
        self.bound.iter().any(|bound| bound == name)
    }

    fn with<R>(
        &mut self,
        names: impl IntoIterator<Item = String>,
        f: impl FnOnce(&mut Self) -> R,
    ) -> R {
        let depth = self.bound.len();
        self.bound.extend(names);
        let result = f(self);
        self.bound.truncate(depth);
        result
    }
}

/// Recursively visit all [hcl::Traversal]s that start at a free variable
pub trait VisitTraversals {
    fn visit_traversals(&self, visitor: &mut dyn Visit<Traversal>) {
        self.visit_traversals_in(&mut Scope::default(), visitor)
    }

    fn visit_traversals_in(&self, scope: &mut Scope, visitor: &mut dyn Visit<Traversal>);
}

impl VisitTraversals for Body {
    fn visit_traversals_in(&self, scope: &mut Scope, visitor: &mut dyn Visit<Traversal>) {
        for structure in self.iter() {
            match structure {
                Structure::Attribute(attr) => attr.expr.visit_traversals_in(scope, visitor),
                Structure::Block(block) => visit_block(block, scope, visitor),
            }
        }
    }
}

fn visit_block(block: &Block, scope: &mut Scope, visitor: &mut dyn Visit<Traversal>) {
    if block.identifier.as_str() == "dynamic" {
        visit_dynamic_block(block, scope, visitor)
    } else {
        block.body.visit_traversals_in(scope, visitor)
    }
}

/// `dynamic "<name>" { for_each = ..., iterator = ..., content { ... } }`
///
/// The iterator is named by `iterator`, or else by the block label. It is bound everywhere in
/// the block except `for_each`.
fn visit_dynamic_block(block: &Block, scope: &mut Scope, visitor: &mut dyn Visit<Traversal>) {
    let iterator = block
        .body
        .attributes()
        .find(|attribute| attribute.key.as_str() == "iterator")
        .and_then(|attribute| match &attribute.expr {
            Expression::Variable(variable) => Some(variable.as_str().to_string()),
            _ => None,
        })
        .or_else(|| block.labels.first().map(|label| label.as_str().to_string()));

    for attribute in block.body.attributes() {
        if attribute.key.as_str() == "for_each" {
            attribute.expr.visit_traversals_in(scope, visitor);
        }
    }

    scope.with(iterator, |scope| {
        for structure in block.body.iter() {
            match structure {
                Structure::Attribute(attribute) => match attribute.key.as_str() {
                    "for_each" | "iterator" => {}
                    _ => attribute.expr.visit_traversals_in(scope, visitor),
                },
                Structure::Block(nested) => visit_block(nested, scope, visitor),
            }
        }
    });
}

impl VisitTraversals for Expression {
    fn visit_traversals_in(&self, scope: &mut Scope, visitor: &mut dyn Visit<Traversal>) {
        match self {
            Expression::Variable(variable) => {
                if scope.is_bound(variable.as_str()) {
                    return;
                }

                // a standalone variable is a traversal with no operators...kind of
                let traversal = Traversal::new(
                    Expression::Variable(variable.clone()),
                    Vec::<TraversalOperator>::new(),
                );
                visitor.visit(&traversal);
            }
            Expression::Traversal(traversal) => {
                match &traversal.expr {
                    Expression::Variable(variable) => {
                        if !scope.is_bound(variable.as_str()) {
                            visitor.visit(traversal);
                        }
                    }
                    // e.g. `func().attr` or `[a, b][0]`
                    other => other.visit_traversals_in(scope, visitor),
                }

                for operator in &traversal.operators {
                    if let TraversalOperator::Index(index) = operator {
                        index.visit_traversals_in(scope, visitor);
                    }
                }
            }
            Expression::Array(array) => {
                for expr in array {
                    expr.visit_traversals_in(scope, visitor);
                }
            }
            Expression::Object(object) => {
                for (key, value) in object.iter() {
                    if let ObjectKey::Expression(key) = key {
                        key.visit_traversals_in(scope, visitor);
                    }
                    value.visit_traversals_in(scope, visitor);
                }
            }
            Expression::TemplateExpr(template_expr) => match Template::from_expr(template_expr) {
                Ok(template) => template.visit_traversals_in(scope, visitor),
                Err(error) => tracing::debug!(%error, "template could not be parsed"),
            },
            Expression::FuncCall(func_call) => {
                for arg in &func_call.args {
                    arg.visit_traversals_in(scope, visitor);
                }
            }
            Expression::Parenthesis(expr) => {
                expr.visit_traversals_in(scope, visitor);
            }
            Expression::Conditional(cond) => {
                cond.cond_expr.visit_traversals_in(scope, visitor);
                cond.true_expr.visit_traversals_in(scope, visitor);
                cond.false_expr.visit_traversals_in(scope, visitor);
            }
            Expression::Operation(operation) => match &**operation {
                Operation::Binary(binop) => {
                    binop.lhs_expr.visit_traversals_in(scope, visitor);
                    binop.rhs_expr.visit_traversals_in(scope, visitor);
                }
                Operation::Unary(unop) => {
                    unop.expr.visit_traversals_in(scope, visitor);
                }
            },
            Expression::ForExpr(forexpr) => {
                // the collection is evaluated outside of the loop
                forexpr.collection_expr.visit_traversals_in(scope, visitor);

                let names = forexpr
                    .key_var
                    .iter()
                    .chain(std::iter::once(&forexpr.value_var))
                    .map(|name| name.as_str().to_string());
                scope.with(names, |scope| {
                    if let Some(key_expr) = &forexpr.key_expr {
                        key_expr.visit_traversals_in(scope, visitor);
                    }
                    forexpr.value_expr.visit_traversals_in(scope, visitor);
                    if let Some(cond_expr) = &forexpr.cond_expr {
                        cond_expr.visit_traversals_in(scope, visitor);
                    }
                });
            }
            _ => {}
        }
    }
}

impl VisitTraversals for Template {
    fn visit_traversals_in(&self, scope: &mut Scope, visitor: &mut dyn Visit<Traversal>) {
        for element in self.elements() {
            match element {
                Element::Interpolation(interpolation) => {
                    interpolation.expr.visit_traversals_in(scope, visitor);
                }
                Element::Directive(directive) => match directive {
                    Directive::If(ifdir) => {
                        ifdir.cond_expr.visit_traversals_in(scope, visitor);
                        ifdir.true_template.visit_traversals_in(scope, visitor);
                        if let Some(false_template) = &ifdir.false_template {
                            false_template.visit_traversals_in(scope, visitor);
                        }
                    }
                    Directive::For(fordir) => {
                        fordir.collection_expr.visit_traversals_in(scope, visitor);

                        let names = fordir
                            .key_var
                            .iter()
                            .chain(std::iter::once(&fordir.value_var))
                            .map(|name| name.as_str().to_string());
                        scope.with(names, |scope| {
                            fordir.template.visit_traversals_in(scope, visitor);
                        });
                    }
                },
                Element::Literal(_) => {}
            }
        }
    }
}
