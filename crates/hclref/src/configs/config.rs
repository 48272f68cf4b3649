use super::{ConfigParseErrors, ModuleConfig};
use crate::addrs::{Module, ModuleInstance};
use crate::hcl_documents::{HclDocuments, LoadError};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};

/// Immutable mapping of every module in the configuration tree to its declarations
#[derive(Debug, Default)]
pub struct Config {
    modules: IndexMap<Module, ModuleConfig>,
}

impl Config {
    pub fn new(modules: impl IntoIterator<Item = (Module, ModuleConfig)>) -> Self {
        Self {
            modules: modules.into_iter().collect(),
        }
    }

    /// Loads the root module from `root_dir` and every module it calls with a local source
    ///
    /// Module calls with other sources (registries, git, ...) are not followed. Their
    /// configuration is simply absent from the snapshot.
    pub fn load(root_dir: &Path) -> Result<Self, ConfigLoadError> {
        let mut modules = IndexMap::new();
        let mut stack = vec![];
        load_module(root_dir, Module::root(), &mut stack, &mut modules)?;
        Ok(Self { modules })
    }

    pub fn module(&self, addr: &Module) -> Option<&ModuleConfig> {
        self.modules.get(addr)
    }

    /// Configuration of a module instance (all instances of a call share it)
    pub fn descendant_for_instance(&self, addr: &ModuleInstance) -> Option<&ModuleConfig> {
        self.module(&addr.module())
    }

    pub fn modules(&self) -> impl Iterator<Item = (&Module, &ModuleConfig)> {
        self.modules.iter()
    }
}

fn load_module(
    dir: &Path,
    addr: Module,
    stack: &mut Vec<PathBuf>,
    modules: &mut IndexMap<Module, ModuleConfig>,
) -> Result<(), ConfigLoadError> {
    let dir = dir.canonicalize().map_err(LoadError::from)?;
    if stack.contains(&dir) {
        return Err(ConfigLoadError::ModuleCycle {
            module: addr.to_string(),
            dir,
        });
    }

    tracing::debug!(module=%addr, dir=%dir.display(), "loading module");
    let mut documents = HclDocuments::default();
    documents.load_directory(&dir)?;

    let config = ModuleConfig::new(&documents).map_err(|errors| ConfigLoadError::InvalidModule {
        dir: dir.clone(),
        errors,
    })?;

    let mut children = vec![];
    for call in config.module_calls.values() {
        if !call.is_local_source() {
            tracing::debug!(call=%call.name, source=%call.source, "not following module source");
            continue;
        }
        children.push((call.name.clone(), dir.join(&call.source)));
    }

    modules.insert(addr.clone(), config);

    stack.push(dir);
    for (name, child_dir) in children {
        load_module(&child_dir, addr.child(name), stack, modules)?;
    }
    stack.pop();

    Ok(())
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigLoadError {
    #[error("Unable to load module files")]
    Documents(#[from] LoadError),
    #[error("Invalid configuration in {}", dir.display())]
    InvalidModule {
        dir: PathBuf,
        #[source]
        errors: ConfigParseErrors,
    },
    #[error("Module {module} calls itself through {}", dir.display())]
    ModuleCycle { module: String, dir: PathBuf },
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::hcl_documents;

    #[test]
    fn lookup_by_instance() {
        let child = ModuleConfig::new(&hcl_documents! {r#"variable "x" {}"#}).unwrap();
        let config = Config::new([
            (Module::root(), ModuleConfig::default()),
            (Module::root().child("app"), child),
        ]);

        let instance = ModuleInstance::root().child("app", Some("blue".into()));
        let found = config.descendant_for_instance(&instance).expect("known module");
        assert!(found.variables.contains_key("x"));

        let unknown = ModuleInstance::root().child("other", None);
        assert!(config.descendant_for_instance(&unknown).is_none());
        assert_eq!(config.modules().count(), 2);
    }
}
