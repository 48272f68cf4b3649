//! decode the blocks of a module directory
use crate::addrs::{LocalProviderConfig, Resource, ResourceMode};
use crate::hcl_documents::HclDocuments;
use hcl::{Body, Expression, Structure};
use indexmap::IndexMap;
use std::collections::HashMap;

/// Arguments of a `resource`/`data` block that configure the block itself, not the object
const RESOURCE_META_ARGUMENTS: &[&str] = &["count", "for_each", "provider", "lifecycle"];
/// Arguments of a `module` block that are not input variables of the called module
const MODULE_META_ARGUMENTS: &[&str] = &[
    "source",
    "version",
    "count",
    "for_each",
    "providers",
    "depends_on",
];

#[derive(Debug, Clone)]
pub struct ResourceConfig {
    pub addr: Resource,
    /// Arguments and nested blocks, with meta-arguments removed
    pub config: Body,
    pub count: Option<Expression>,
    pub for_each: Option<Expression>,
}

impl ResourceConfig {
    pub fn new(addr: Resource, config: Body) -> Self {
        Self {
            addr,
            config,
            count: None,
            for_each: None,
        }
    }

    pub fn with_count(mut self, count: Expression) -> Self {
        self.count = Some(count);
        self
    }

    pub fn with_for_each(mut self, for_each: Expression) -> Self {
        self.for_each = Some(for_each);
        self
    }
}

#[derive(Debug, Clone, derive_new::new)]
pub struct VariableConfig {
    pub name: String,
    pub default: Option<Expression>,
}

#[derive(Debug, Clone, derive_new::new)]
pub struct LocalConfig {
    pub name: String,
    pub expr: Expression,
}

#[derive(Debug, Clone, derive_new::new)]
pub struct OutputConfig {
    pub name: String,
    pub expr: Expression,
}

#[derive(Debug, Clone, derive_new::new)]
pub struct ModuleCallConfig {
    pub name: String,
    pub source: String,
    /// Input variables of the called module
    pub arguments: IndexMap<String, Expression>,
}

impl ModuleCallConfig {
    /// Local sources point into the same source tree and are loaded along with the caller
    pub fn is_local_source(&self) -> bool {
        self.source.starts_with("./") || self.source.starts_with("../")
    }
}

#[derive(Debug, Clone, derive_new::new)]
pub struct ProviderConfigBlock {
    pub addr: LocalProviderConfig,
    pub config: Body,
}

#[derive(Debug, Clone, derive_new::new)]
pub struct CheckConfig {
    pub name: String,
    pub config: Body,
}

/// All declarations of a single module
#[derive(Debug, Clone, Default)]
pub struct ModuleConfig {
    pub resources: IndexMap<Resource, ResourceConfig>,
    pub variables: IndexMap<String, VariableConfig>,
    pub locals: IndexMap<String, LocalConfig>,
    pub outputs: IndexMap<String, OutputConfig>,
    pub module_calls: IndexMap<String, ModuleCallConfig>,
    pub provider_configs: IndexMap<LocalProviderConfig, ProviderConfigBlock>,
    pub checks: IndexMap<String, CheckConfig>,
}

impl ModuleConfig {
    pub fn new(hcl_documents: &HclDocuments) -> Result<Self, ConfigParseErrors> {
        let mut module = Self::default();
        let mut e = ConfigParseErrors::new();
        let mut declared = Declarations::default();

        for (index, _source, _attribute) in hcl_documents.attributes() {
            e.log(Issue::RootAttribute(index))
        }

        for (index, _source, block) in hcl_documents.blocks() {
            let block: hcl::Block = block.clone().into();
            let labels: Vec<&str> = block.labels.iter().map(|label| label.as_str()).collect();

            let expected_labels = match block.identifier.as_str() {
                "resource" | "data" => 2,
                "variable" | "output" | "module" | "provider" | "check" => 1,
                "locals" => 0,
                // not relevant for reference analysis
                "terraform" | "moved" | "import" | "removed" => continue,
                _ => {
                    e.log(Issue::UnknownBlockType(index));
                    continue;
                }
            };

            if labels.len() != expected_labels {
                e.log(Issue::BlockLabelCount {
                    block: index,
                    expected: expected_labels,
                });
                continue;
            }

            match block.identifier.as_str() {
                "resource" | "data" => {
                    let mode = if block.identifier.as_str() == "data" {
                        ResourceMode::Data
                    } else {
                        ResourceMode::Managed
                    };
                    let addr = Resource::new(mode, labels[0], labels[1]);
                    if !declared.declare(&mut e, Declared::Resource(addr.clone()), index) {
                        continue;
                    }

                    let (config, mut meta) = split_arguments(&block.body, RESOURCE_META_ARGUMENTS);
                    let count = meta.shift_remove("count");
                    let for_each = meta.shift_remove("for_each");
                    if count.is_some() && for_each.is_some() {
                        e.log(Issue::CountAndForEach(index));
                        continue;
                    }

                    tracing::trace!(%addr, "add resource");
                    module.resources.insert(
                        addr.clone(),
                        ResourceConfig {
                            addr,
                            config,
                            count,
                            for_each,
                        },
                    );
                }
                "variable" => {
                    let name = labels[0].to_string();
                    if !declared.declare(&mut e, Declared::Variable(name.clone()), index) {
                        continue;
                    }

                    let default = find_attribute(&block.body, "default");
                    module
                        .variables
                        .insert(name.clone(), VariableConfig::new(name, default));
                }
                "locals" => {
                    for attribute in block.body.attributes() {
                        let name = attribute.key.as_str().to_string();
                        if !declared.declare(&mut e, Declared::Local(name.clone()), index) {
                            continue;
                        }

                        module
                            .locals
                            .insert(name.clone(), LocalConfig::new(name, attribute.expr.clone()));
                    }
                }
                "output" => {
                    let name = labels[0].to_string();
                    if !declared.declare(&mut e, Declared::Output(name.clone()), index) {
                        continue;
                    }

                    let Some(expr) = find_attribute(&block.body, "value") else {
                        e.log(Issue::OutputValueMissing(index));
                        continue;
                    };
                    module
                        .outputs
                        .insert(name.clone(), OutputConfig::new(name, expr));
                }
                "module" => {
                    let name = labels[0].to_string();
                    if !declared.declare(&mut e, Declared::ModuleCall(name.clone()), index) {
                        continue;
                    }

                    let Some(Expression::String(source)) = find_attribute(&block.body, "source")
                    else {
                        e.log(Issue::ModuleSourceMissing(index));
                        continue;
                    };

                    let (arguments, _) = split_arguments(&block.body, MODULE_META_ARGUMENTS);
                    let arguments = arguments
                        .attributes()
                        .map(|attribute| {
                            (attribute.key.as_str().to_string(), attribute.expr.clone())
                        })
                        .collect();
                    module
                        .module_calls
                        .insert(name.clone(), ModuleCallConfig::new(name, source, arguments));
                }
                "provider" => {
                    let (config, mut meta) = split_arguments(&block.body, &["alias"]);
                    let alias = match meta.shift_remove("alias") {
                        None => None,
                        Some(Expression::String(alias)) => Some(alias),
                        Some(_) => {
                            e.log(Issue::ProviderAliasInvalid(index));
                            continue;
                        }
                    };

                    let addr = LocalProviderConfig::new(labels[0].to_string(), alias);
                    if !declared.declare(&mut e, Declared::Provider(addr.clone()), index) {
                        continue;
                    }

                    module
                        .provider_configs
                        .insert(addr.clone(), ProviderConfigBlock::new(addr, config));
                }
                "check" => {
                    let name = labels[0].to_string();
                    if !declared.declare(&mut e, Declared::Check(name.clone()), index) {
                        continue;
                    }

                    module
                        .checks
                        .insert(name.clone(), CheckConfig::new(name, block.body.clone()));
                }
                _ => unreachable!("block type was checked above"),
            }
        }

        if !e.issues.is_empty() {
            return Err(e);
        };

        Ok(module)
    }

    /// Total lookup, `None` for unknown resources
    pub fn resource_by_addr(&self, addr: &Resource) -> Option<&ResourceConfig> {
        self.resources.get(addr)
    }
}

/// Splits off the named attributes and drops blocks with those names
fn split_arguments(body: &Body, names: &[&str]) -> (Body, IndexMap<String, Expression>) {
    let mut split = IndexMap::new();
    let remaining: Body = body
        .iter()
        .filter(|structure| match structure {
            Structure::Attribute(attribute) => {
                if names.contains(&attribute.key.as_str()) {
                    split.insert(attribute.key.as_str().to_string(), attribute.expr.clone());
                    return false;
                }
                true
            }
            Structure::Block(block) => !names.contains(&block.identifier.as_str()),
        })
        .cloned()
        .collect();

    (remaining, split)
}

fn find_attribute(body: &Body, name: &str) -> Option<Expression> {
    body.attributes()
        .find(|attribute| attribute.key.as_str() == name)
        .map(|attribute| attribute.expr.clone())
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum Declared {
    Resource(Resource),
    Variable(String),
    Local(String),
    Output(String),
    ModuleCall(String),
    Provider(LocalProviderConfig),
    Check(String),
}

/// Block index of every declaration seen so far
#[derive(Default)]
struct Declarations(HashMap<Declared, usize>);

impl Declarations {
    /// Returns `false` (and logs an issue) if already declared
    fn declare(&mut self, e: &mut ConfigParseErrors, declared: Declared, index: usize) -> bool {
        if let Some(existing) = self.0.get(&declared) {
            tracing::debug!(?declared, "collision");
            e.log(Issue::DuplicateDeclaration {
                existing: *existing,
                new: index,
            });
            return false;
        }

        self.0.insert(declared, index);
        true
    }
}

#[derive(derive_new::new, Debug)]
pub struct ConfigParseErrors {
    #[new(default)]
    issues: Vec<Issue>,
}

impl ConfigParseErrors {
    pub fn log(&mut self, issue: Issue) {
        tracing::trace!(?issue, "issue found");
        self.issues.push(issue);
    }

    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }
}

impl std::error::Error for ConfigParseErrors {}

impl std::fmt::Display for ConfigParseErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.issues.split_first() {
            None => f.write_str("no issues"),
            Some((first, [])) => first.fmt(f),
            Some((first, rest)) => write!(f, "{first} (and {} more issues)", rest.len()),
        }
    }
}

/// Problems found while decoding; numbers are root block (or attribute) indices
#[derive(Debug, PartialEq)]
pub enum Issue {
    RootAttribute(usize),
    UnknownBlockType(usize),
    BlockLabelCount { block: usize, expected: usize },
    DuplicateDeclaration { existing: usize, new: usize },
    CountAndForEach(usize),
    OutputValueMissing(usize),
    ModuleSourceMissing(usize),
    ProviderAliasInvalid(usize),
}

impl std::fmt::Display for Issue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Issue::RootAttribute(index) => {
                write!(f, "attribute #{index}: attributes are not allowed at the root")
            }
            Issue::UnknownBlockType(index) => write!(f, "block #{index}: unknown block type"),
            Issue::BlockLabelCount { block, expected } => {
                write!(f, "block #{block}: expected {expected} label(s)")
            }
            Issue::DuplicateDeclaration { existing, new } => {
                write!(f, "block #{new}: already declared in block #{existing}")
            }
            Issue::CountAndForEach(index) => write!(
                f,
                "block #{index}: \"count\" and \"for_each\" are mutually exclusive"
            ),
            Issue::OutputValueMissing(index) => {
                write!(f, "block #{index}: output requires a \"value\" argument")
            }
            Issue::ModuleSourceMissing(index) => write!(
                f,
                "block #{index}: module call requires a literal \"source\" argument"
            ),
            Issue::ProviderAliasInvalid(index) => {
                write!(f, "block #{index}: provider alias must be a literal string")
            }
        }
    }
}
