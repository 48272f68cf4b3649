use super::{InstanceKey, Resource, ResourceInstance};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModuleCall {
    pub name: String,
}

impl ModuleCall {
    pub fn instance(&self, key: Option<InstanceKey>) -> ModuleCallInstance {
        ModuleCallInstance::new(self.clone(), key)
    }
}

impl From<String> for ModuleCall {
    fn from(name: String) -> Self {
        Self { name }
    }
}

impl From<&str> for ModuleCall {
    fn from(name: &str) -> Self {
        name.to_string().into()
    }
}

impl Display for ModuleCall {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "module.{}", self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_new::new)]
pub struct ModuleCallInstance {
    pub call: ModuleCall,
    pub key: Option<InstanceKey>,
}

impl Display for ModuleCallInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.call.fmt(f)?;
        if let Some(key) = &self.key {
            key.fmt(f)?;
        }
        Ok(())
    }
}

/// An output value of a child module, as seen from the calling module
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_new::new)]
pub struct ModuleCallInstanceOutput {
    pub call: ModuleCallInstance,
    pub name: String,
}

impl Display for ModuleCallInstanceOutput {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.call, self.name)
    }
}

/// A `provider` block, identified by its local name and optional alias
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_new::new)]
pub struct LocalProviderConfig {
    pub name: String,
    pub alias: Option<String>,
}

impl Display for LocalProviderConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "provider.{}", self.name)?;
        if let Some(alias) = &self.alias {
            write!(f, ".{alias}")?;
        }
        Ok(())
    }
}

/// Everything a reference can point at
///
/// The set is closed on purpose: adding a new kind of configuration object must be handled by
/// every `match` over this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Referenceable {
    /// `aws_instance.web`, `data.aws_ami.ubuntu`
    Resource(Resource),
    /// `aws_instance.web[0]`
    ResourceInstance(ResourceInstance),
    /// `var.name`
    InputVariable { name: String },
    /// `local.name`
    LocalValue { name: String },
    /// An `output` block of the module itself. Not reachable from expressions.
    OutputValue { name: String },
    /// `module.name`
    ModuleCall(ModuleCall),
    /// `module.name[key]`
    ModuleCallInstance(ModuleCallInstance),
    /// `module.name.output`
    ModuleCallInstanceOutput(ModuleCallInstanceOutput),
    /// A `provider` block. Not reachable from expressions.
    ProviderConfig(LocalProviderConfig),
    /// A `check` block. Not reachable from expressions.
    Check { name: String },
    /// `count.index`
    CountAttr { name: String },
    /// `each.key`, `each.value`
    ForEachAttr { name: String },
    /// `path.module`
    PathAttr { name: String },
    /// `terraform.workspace`
    TerraformAttr { name: String },
    /// `self`
    SelfRef,
}

impl Referenceable {
    /// The resource this refers to, for resources and resource instances
    pub fn resource(&self) -> Option<&Resource> {
        match self {
            Referenceable::Resource(resource) => Some(resource),
            Referenceable::ResourceInstance(instance) => Some(&instance.resource),
            _ => None,
        }
    }

    /// `count.*` and `each.*` only have a meaning inside a repeated block
    pub fn is_repetition_symbol(&self) -> bool {
        matches!(
            self,
            Referenceable::CountAttr { .. } | Referenceable::ForEachAttr { .. }
        )
    }
}

impl Display for Referenceable {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Referenceable::Resource(resource) => resource.fmt(f),
            Referenceable::ResourceInstance(instance) => instance.fmt(f),
            Referenceable::InputVariable { name } => write!(f, "var.{name}"),
            Referenceable::LocalValue { name } => write!(f, "local.{name}"),
            Referenceable::OutputValue { name } => write!(f, "output.{name}"),
            Referenceable::ModuleCall(call) => call.fmt(f),
            Referenceable::ModuleCallInstance(call) => call.fmt(f),
            Referenceable::ModuleCallInstanceOutput(output) => output.fmt(f),
            Referenceable::ProviderConfig(provider) => provider.fmt(f),
            Referenceable::Check { name } => write!(f, "check.{name}"),
            Referenceable::CountAttr { name } => write!(f, "count.{name}"),
            Referenceable::ForEachAttr { name } => write!(f, "each.{name}"),
            Referenceable::PathAttr { name } => write!(f, "path.{name}"),
            Referenceable::TerraformAttr { name } => write!(f, "terraform.{name}"),
            Referenceable::SelfRef => f.write_str("self"),
        }
    }
}

/// One step of a traversal that follows the referenced object
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Traverser {
    /// `.name`
    Attr(String),
    /// `[key]`, `None` if the key is not a constant
    Index(Option<InstanceKey>),
    /// `.*` or `[*]`
    Splat,
}

impl Display for Traverser {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Traverser::Attr(name) => write!(f, ".{name}"),
            Traverser::Index(Some(key)) => key.fmt(f),
            Traverser::Index(None) => f.write_str("[?]"),
            Traverser::Splat => f.write_str("[*]"),
        }
    }
}

/// A module-relative reference as found in an expression
///
/// `aws_instance.web[0].private_ip` has the subject `aws_instance.web[0]` and the remaining
/// traversal `.private_ip`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, derive_new::new)]
pub struct Reference {
    pub subject: Referenceable,
    #[new(default)]
    pub remaining: Vec<Traverser>,
}

impl Reference {
    pub fn with_remaining(mut self, remaining: Vec<Traverser>) -> Self {
        self.remaining = remaining;
        self
    }
}

impl From<Referenceable> for Reference {
    fn from(subject: Referenceable) -> Self {
        Self::new(subject)
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.subject.fmt(f)?;
        for step in &self.remaining {
            step.fmt(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display() {
        let output = ModuleCallInstanceOutput::new(
            ModuleCall::from("network").instance(Some("eu".into())),
            "subnet_ids".to_string(),
        );
        let reference = Reference::new(Referenceable::ModuleCallInstanceOutput(output))
            .with_remaining(vec![Traverser::Index(Some(InstanceKey::Int(0)))]);

        assert_eq!(
            reference.to_string(),
            r#"module.network["eu"].subnet_ids[0]"#
        );

        let reference = Reference::new(Referenceable::ResourceInstance(
            Resource::managed("aws_instance", "web").instance(None),
        ))
        .with_remaining(vec![
            Traverser::Splat,
            Traverser::Attr("id".to_string()),
            Traverser::Index(None),
        ]);
        assert_eq!(reference.to_string(), "aws_instance.web[*].id[?]");
    }

    #[test]
    fn provider_display() {
        let default = LocalProviderConfig::new("aws".to_string(), None);
        let aliased = LocalProviderConfig::new("aws".to_string(), Some("west".to_string()));
        assert_eq!(default.to_string(), "provider.aws");
        assert_eq!(aliased.to_string(), "provider.aws.west");
    }
}
