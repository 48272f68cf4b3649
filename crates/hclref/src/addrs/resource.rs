use super::{InstanceKey, ModuleInstance};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceMode {
    /// `resource "type" "name" {}`
    Managed,
    /// `data "type" "name" {}`
    Data,
}

/// A resource declaration, relative to its module
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Resource {
    pub mode: ResourceMode,
    pub type_name: String,
    pub name: String,
}

impl Resource {
    pub fn new(mode: ResourceMode, type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            mode,
            type_name: type_name.into(),
            name: name.into(),
        }
    }

    pub fn managed(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ResourceMode::Managed, type_name, name)
    }

    pub fn data(type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(ResourceMode::Data, type_name, name)
    }

    pub fn instance(&self, key: Option<InstanceKey>) -> ResourceInstance {
        ResourceInstance {
            resource: self.clone(),
            key,
        }
    }

    pub fn absolute(&self, module: ModuleInstance) -> AbsResource {
        AbsResource {
            module,
            resource: self.clone(),
        }
    }
}

impl Display for Resource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.mode == ResourceMode::Data {
            f.write_str("data.")?;
        }
        write!(f, "{}.{}", self.type_name, self.name)
    }
}

/// One (possibly repetition-expanded) instance of a resource, relative to its module
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceInstance {
    pub resource: Resource,
    pub key: Option<InstanceKey>,
}

impl ResourceInstance {
    pub fn absolute(&self, module: ModuleInstance) -> AbsResourceInstance {
        AbsResourceInstance {
            module,
            resource: self.clone(),
        }
    }
}

impl Display for ResourceInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.resource.fmt(f)?;
        if let Some(key) = &self.key {
            key.fmt(f)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AbsResource {
    pub module: ModuleInstance,
    pub resource: Resource,
}

impl AbsResource {
    pub fn instance(&self, key: Option<InstanceKey>) -> AbsResourceInstance {
        self.resource.instance(key).absolute(self.module.clone())
    }
}

impl Display for AbsResource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_module_prefix(f, &self.module)?;
        self.resource.fmt(f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AbsResourceInstance {
    pub module: ModuleInstance,
    pub resource: ResourceInstance,
}

impl AbsResourceInstance {
    pub fn containing_resource(&self) -> AbsResource {
        self.resource.resource.absolute(self.module.clone())
    }
}

impl Display for AbsResourceInstance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write_module_prefix(f, &self.module)?;
        self.resource.fmt(f)
    }
}

pub(crate) fn write_module_prefix(
    f: &mut Formatter<'_>,
    module: &ModuleInstance,
) -> std::fmt::Result {
    if !module.is_root() {
        write!(f, "{module}.")?;
    }
    Ok(())
}
