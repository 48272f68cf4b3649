//! classify traversals into references
use super::Diagnostic;
use crate::addrs::{
    LocalProviderConfig, ModuleCall, ModuleCallInstanceOutput, Reference, Referenceable, Resource,
    ResourceMode,
};
use crate::util::{TraversalExt, TraversalOperatorsExt};
use hcl::{Expression, Traversal, TraversalOperator};
use std::str::FromStr;

type Operators = [TraversalOperator];

fn invalid(detail: impl Into<String>) -> Diagnostic {
    Diagnostic::new("Invalid reference", detail)
}

fn attr<'t>(
    operators: &'t Operators,
    root: &str,
    what: &str,
) -> Result<(&'t str, &'t Operators), Diagnostic> {
    operators.split_attr().ok_or_else(|| {
        invalid(format!(
            "The \"{root}\" object must be followed by an attribute naming {what}."
        ))
    })
}

/// Classify a traversal rooted in a variable
pub(crate) fn parse_ref(traversal: &Traversal) -> Result<Reference, Diagnostic> {
    let root = traversal
        .root_name()
        .ok_or_else(|| invalid("A reference must start with a name."))?;
    let operators = traversal.operators.as_slice();

    let (subject, rest) = match root {
        "var" => {
            let (name, rest) = attr(operators, root, "an input variable")?;
            (Referenceable::InputVariable { name: name.into() }, rest)
        }
        "local" => {
            let (name, rest) = attr(operators, root, "a local value")?;
            (Referenceable::LocalValue { name: name.into() }, rest)
        }
        "module" => parse_module_ref(operators)?,
        "data" => {
            let (type_name, rest) = attr(operators, root, "a data source type")?;
            parse_resource_ref(ResourceMode::Data, type_name, rest)?
        }
        "count" => {
            let (name, rest) = attr(operators, root, "a count attribute")?;
            if name != "index" {
                return Err(invalid(format!(
                    "The \"count\" object does not have an attribute named \"{name}\". The only supported attribute is count.index."
                )));
            }
            (Referenceable::CountAttr { name: name.into() }, rest)
        }
        "each" => {
            let (name, rest) = attr(operators, root, "a for_each attribute")?;
            if name != "key" && name != "value" {
                return Err(invalid(format!(
                    "The \"each\" object does not have an attribute named \"{name}\". The supported attributes are each.key and each.value."
                )));
            }
            (Referenceable::ForEachAttr { name: name.into() }, rest)
        }
        "path" => {
            let (name, rest) = attr(operators, root, "a path attribute")?;
            (Referenceable::PathAttr { name: name.into() }, rest)
        }
        "terraform" => {
            let (name, rest) = attr(operators, root, "a terraform attribute")?;
            (Referenceable::TerraformAttr { name: name.into() }, rest)
        }
        "self" => (Referenceable::SelfRef, operators),
        type_name => parse_resource_ref(ResourceMode::Managed, type_name, operators)?,
    };

    Ok(Reference::new(subject).with_remaining(rest.traversers()))
}

fn parse_module_ref(operators: &Operators) -> Result<(Referenceable, &Operators), Diagnostic> {
    let (name, rest) = attr(operators, "module", "a module call")?;
    let call = ModuleCall::from(name);

    let (instance, rest, keyed) = match rest.split_key() {
        Some((key, rest)) => (call.instance(Some(key)), rest, true),
        None => (call.instance(None), rest, false),
    };

    if let Some((output, rest)) = rest.split_attr() {
        let output = ModuleCallInstanceOutput::new(instance, output.to_string());
        return Ok((Referenceable::ModuleCallInstanceOutput(output), rest));
    }

    if keyed {
        Ok((Referenceable::ModuleCallInstance(instance), rest))
    } else {
        Ok((Referenceable::ModuleCall(call), rest))
    }
}

fn parse_resource_ref<'t>(
    mode: ResourceMode,
    type_name: &str,
    operators: &'t Operators,
) -> Result<(Referenceable, &'t Operators), Diagnostic> {
    let (name, rest) = operators.split_attr().ok_or_else(|| {
        invalid(format!(
            "A reference to a resource type must be followed by at least one attribute access, specifying the resource name (\"{type_name}\")."
        ))
    })?;
    let resource = Resource::new(mode, type_name, name);

    Ok(match rest.split_key() {
        Some((key, rest)) => (Referenceable::ResourceInstance(resource.instance(Some(key))), rest),
        None => (Referenceable::Resource(resource), rest),
    })
}

/// Parse any reference, including the object kinds that can't appear in expressions
///
/// Accepts everything [parse_ref] does plus `output.<name>`, `check.<name>` and
/// `provider.<name>[.<alias>]`, matching the [std::fmt::Display] form of [Referenceable].
impl FromStr for Reference {
    type Err = Diagnostic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let expr: hcl_edit::expr::Expression = s
            .parse()
            .map_err(|e: hcl_edit::parser::Error| {
                Diagnostic::new("Invalid reference syntax", e.to_string())
            })?;

        let traversal = match Expression::from(expr) {
            Expression::Variable(var) => Traversal::new(
                Expression::Variable(var),
                Vec::<TraversalOperator>::new(),
            ),
            Expression::Traversal(traversal) => *traversal,
            _ => {
                return Err(invalid(
                    "A reference must be a name optionally followed by attributes and indexes.",
                ))
            }
        };

        let operators = traversal.operators.as_slice();
        let (subject, rest) = match traversal.root_name() {
            Some("output") => {
                let (name, rest) = attr(operators, "output", "an output value")?;
                (Referenceable::OutputValue { name: name.into() }, rest)
            }
            Some("check") => {
                let (name, rest) = attr(operators, "check", "a check block")?;
                (Referenceable::Check { name: name.into() }, rest)
            }
            Some("provider") => {
                let (name, rest) = attr(operators, "provider", "a provider")?;
                let (alias, rest) = match rest.split_attr() {
                    Some((alias, rest)) => (Some(alias.to_string()), rest),
                    None => (None, rest),
                };
                let provider = LocalProviderConfig::new(name.to_string(), alias);
                (Referenceable::ProviderConfig(provider), rest)
            }
            _ => return parse_ref(&traversal),
        };

        Ok(Reference::new(subject).with_remaining(rest.traversers()))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::addrs::{InstanceKey, Traverser};
    use pretty_assertions::assert_eq;

    fn parse(s: &str) -> Reference {
        s.parse().expect("valid reference")
    }

    #[test]
    fn input_variable_and_local() {
        assert_eq!(
            parse("var.tags.owner"),
            Reference::new(Referenceable::InputVariable {
                name: "tags".into()
            })
            .with_remaining(vec![Traverser::Attr("owner".into())])
        );
        assert_eq!(
            parse("local.name").subject,
            Referenceable::LocalValue {
                name: "name".into()
            }
        );
    }

    #[test]
    fn resources() {
        assert_eq!(
            parse("aws_instance.web").subject,
            Referenceable::Resource(Resource::managed("aws_instance", "web"))
        );
        assert_eq!(
            parse(r#"data.aws_ami.ubuntu["x"].id"#),
            Reference::new(Referenceable::ResourceInstance(
                Resource::data("aws_ami", "ubuntu").instance(Some("x".into()))
            ))
            .with_remaining(vec![Traverser::Attr("id".into())])
        );

        // a non-constant key does not select an instance
        let reference = parse("aws_instance.web[var.i].id");
        assert_eq!(
            reference.subject,
            Referenceable::Resource(Resource::managed("aws_instance", "web"))
        );
        assert_eq!(
            reference.remaining,
            vec![Traverser::Index(None), Traverser::Attr("id".into())]
        );
    }

    #[test]
    fn module_calls() {
        assert_eq!(
            parse("module.net").subject,
            Referenceable::ModuleCall(ModuleCall::from("net"))
        );
        assert_eq!(
            parse("module.net[2]").subject,
            Referenceable::ModuleCallInstance(
                ModuleCall::from("net").instance(Some(InstanceKey::Int(2)))
            )
        );
        assert_eq!(
            parse(r#"module.net["a"].vpc_id"#).subject,
            Referenceable::ModuleCallInstanceOutput(ModuleCallInstanceOutput::new(
                ModuleCall::from("net").instance(Some("a".into())),
                "vpc_id".into()
            ))
        );
        assert_eq!(
            parse("module.net.vpc_id").to_string(),
            "module.net.vpc_id"
        );
    }

    #[test]
    fn repetition_symbols() {
        assert!(parse("count.index").subject.is_repetition_symbol());
        assert!(parse("each.value.name").subject.is_repetition_symbol());
        assert!("count.value".parse::<Reference>().is_err());
        assert!("each.index".parse::<Reference>().is_err());
    }

    #[test]
    fn special_symbols() {
        assert_eq!(parse("self.private_ip").subject, Referenceable::SelfRef);
        assert_eq!(
            parse("path.module").subject,
            Referenceable::PathAttr {
                name: "module".into()
            }
        );
        assert_eq!(
            parse("terraform.workspace").to_string(),
            "terraform.workspace"
        );
    }

    #[test]
    fn non_expression_kinds() {
        assert_eq!(
            parse("output.vpc_id").subject,
            Referenceable::OutputValue {
                name: "vpc_id".into()
            }
        );
        assert_eq!(
            parse("provider.aws.west").subject,
            Referenceable::ProviderConfig(LocalProviderConfig::new(
                "aws".into(),
                Some("west".into())
            ))
        );
        assert_eq!(parse("check.health").to_string(), "check.health");
    }

    #[test]
    fn incomplete_references() {
        assert!("var".parse::<Reference>().is_err());
        assert!("aws_instance".parse::<Reference>().is_err());
        assert!("data.aws_ami".parse::<Reference>().is_err());
        assert!("1 + 1".parse::<Reference>().is_err());
    }
}
