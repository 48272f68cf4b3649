//! address algebra
//!
//! Everything that can be pointed at in a configuration has an address. There are two flavours:
//!
//! - *module-relative* addresses ([Resource], [ResourceInstance], [Referenceable]) name an object from
//!   inside the module that declares it
//! - *absolute* addresses ([AbsResource], [AbsResourceInstance]) prefix the relative part with the
//!   [ModuleInstance] it lives in
//!
//! All addresses render in the same syntax a user would write them in an expression, e.g.
//! `module.network["eu"].aws_subnet.private[0]`.
mod module_instance;
mod parse;
mod referenceable;
mod resource;

pub use module_instance::{InstanceKey, Module, ModuleInstance, ModuleInstanceStep};
pub use parse::ParseAddrError;
pub use referenceable::{
    LocalProviderConfig, ModuleCall, ModuleCallInstance, ModuleCallInstanceOutput, Reference,
    Referenceable, Traverser,
};
pub use resource::{AbsResource, AbsResourceInstance, Resource, ResourceInstance, ResourceMode};
pub(crate) use resource::write_module_prefix;
