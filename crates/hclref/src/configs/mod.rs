//! configuration snapshot
//!
//! [ModuleConfig] is the decoded form of one module directory, [Config] maps every module of
//! the configuration tree to its [ModuleConfig]. Neither is mutated once analysis begins: the
//! [Config] only hands out shared references.
mod config;
mod module;

pub use config::{Config, ConfigLoadError};
pub use module::{
    CheckConfig, ConfigParseErrors, Issue, LocalConfig, ModuleCallConfig, ModuleConfig,
    OutputConfig, ProviderConfigBlock, ResourceConfig, VariableConfig,
};
