//! parse absolute addresses from their string form
//!
//! Addresses are written in expression syntax, so we let the hcl parser do the tokenizing and
//! only interpret the resulting traversal.
use super::{AbsResource, AbsResourceInstance, InstanceKey, ModuleInstance, Resource, ResourceMode};
use crate::util::constant_key;
use hcl::{Expression, TraversalOperator};
use std::collections::VecDeque;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ParseAddrError {
    #[error("Unable to parse address: {0}")]
    Syntax(String),
    #[error("Address must be a traversal like module.name.type.name")]
    NotATraversal,
    #[error("Expected {0}")]
    Expected(&'static str),
    #[error("Unexpected trailing {0}")]
    Trailing(String),
}

#[derive(Debug, PartialEq)]
enum Step {
    Name(String),
    Key(InstanceKey),
}

impl std::fmt::Display for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Name(name) => write!(f, ".{name}"),
            Step::Key(key) => key.fmt(f),
        }
    }
}

struct Cursor {
    steps: VecDeque<Step>,
}

impl Cursor {
    fn parse(input: &str) -> Result<Self, ParseAddrError> {
        if input.trim().is_empty() {
            return Ok(Self {
                steps: VecDeque::new(),
            });
        }

        let expr: hcl_edit::expr::Expression = input
            .parse()
            .map_err(|e: hcl_edit::parser::Error| ParseAddrError::Syntax(e.to_string()))?;

        let steps = match Expression::from(expr) {
            Expression::Variable(var) => VecDeque::from([Step::Name(var.as_str().to_string())]),
            Expression::Traversal(traversal) => {
                let Expression::Variable(root) = &traversal.expr else {
                    return Err(ParseAddrError::NotATraversal);
                };

                let mut steps = VecDeque::from([Step::Name(root.as_str().to_string())]);
                for operator in &traversal.operators {
                    let step = match operator {
                        TraversalOperator::GetAttr(ident) => Step::Name(ident.as_str().to_string()),
                        TraversalOperator::LegacyIndex(index) => {
                            Step::Key(InstanceKey::Int(*index as i64))
                        }
                        TraversalOperator::Index(expr) => Step::Key(
                            constant_key(expr).ok_or(ParseAddrError::Expected("constant index"))?,
                        ),
                        _ => return Err(ParseAddrError::Expected("attribute or index")),
                    };
                    steps.push_back(step);
                }
                steps
            }
            _ => return Err(ParseAddrError::NotATraversal),
        };

        Ok(Self { steps })
    }

    fn peek_name(&self, name: &str) -> bool {
        matches!(self.steps.front(), Some(Step::Name(n)) if n == name)
    }

    fn name(&mut self, expected: &'static str) -> Result<String, ParseAddrError> {
        match self.steps.pop_front() {
            Some(Step::Name(name)) => Ok(name),
            _ => Err(ParseAddrError::Expected(expected)),
        }
    }

    fn key(&mut self) -> Option<InstanceKey> {
        if let Some(Step::Key(_)) = self.steps.front() {
            if let Some(Step::Key(key)) = self.steps.pop_front() {
                return Some(key);
            }
        }
        None
    }

    fn module_instance(&mut self) -> Result<ModuleInstance, ParseAddrError> {
        let mut module = ModuleInstance::root();
        while self.peek_name("module") {
            self.steps.pop_front();
            let name = self.name("module call name")?;
            let key = self.key();
            module = module.child(name, key);
        }
        Ok(module)
    }

    fn resource(&mut self) -> Result<Resource, ParseAddrError> {
        let mode = if self.peek_name("data") {
            self.steps.pop_front();
            ResourceMode::Data
        } else {
            ResourceMode::Managed
        };

        let type_name = self.name("resource type")?;
        let name = self.name("resource name")?;
        Ok(Resource::new(mode, type_name, name))
    }

    fn finish(self) -> Result<(), ParseAddrError> {
        match self.steps.front() {
            None => Ok(()),
            Some(step) => Err(ParseAddrError::Trailing(step.to_string())),
        }
    }
}

impl FromStr for ModuleInstance {
    type Err = ParseAddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cursor = Cursor::parse(s)?;
        let module = cursor.module_instance()?;
        cursor.finish()?;
        Ok(module)
    }
}

impl FromStr for AbsResource {
    type Err = ParseAddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cursor = Cursor::parse(s)?;
        let module = cursor.module_instance()?;
        let resource = cursor.resource()?;
        cursor.finish()?;
        Ok(resource.absolute(module))
    }
}

impl FromStr for AbsResourceInstance {
    type Err = ParseAddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cursor = Cursor::parse(s)?;
        let module = cursor.module_instance()?;
        let resource = cursor.resource()?;
        let key = cursor.key();
        cursor.finish()?;
        Ok(resource.instance(key).absolute(module))
    }
}
