//! global reference analysis
//!
//! The [Analyzer] answers one question: which other objects does the definition of an object
//! directly refer to? The answers are the edges of a dependency graph; building and walking that
//! graph is up to the caller (see [Analyzer::contributing_resources] for one such walk).
//!
//! All queries are pure functions of the configuration snapshot and the requested address.
//! Objects that can't be found (unknown module, unknown resource, ...) simply have no
//! references; a partially loaded configuration is a normal input.
mod contributing;
mod meta_references;
mod reference;
mod shortcuts;

pub use reference::Reference;

use crate::addrs::ModuleInstance;
use crate::configs::{Config, ModuleConfig};
use std::sync::Arc;

/// Reference analysis over an immutable configuration snapshot
///
/// Cheap to clone and safe to share between threads.
#[derive(Debug, Clone, derive_new::new)]
pub struct Analyzer {
    config: Arc<Config>,
}

impl Analyzer {
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Configuration of the module the given instance belongs to
    pub fn module_config(&self, addr: &ModuleInstance) -> Option<&ModuleConfig> {
        self.config.descendant_for_instance(addr)
    }
}
