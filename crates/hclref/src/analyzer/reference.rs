use crate::addrs::{
    self, AbsResourceInstance, ModuleInstance, Referenceable, ResourceInstance, Traverser,
};
use indexmap::IndexSet;
use serde::ser::{SerializeStruct, Serializer};
use std::fmt::{Display, Formatter};

/// A reference together with the module instance it has to be resolved in
///
/// References are lexically scoped: `var.x` means a different variable in every module
/// instance, so a [addrs::Reference] alone is not enough to find what it points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    pub container_addr: ModuleInstance,
    /// Resource instance whose block contains the reference
    ///
    /// Only needed to give `count.index` and `each.*` a meaning.
    pub resource_context: Option<ResourceInstance>,
    pub local_ref: addrs::Reference,
}

impl Reference {
    pub fn new(container_addr: ModuleInstance, local_ref: impl Into<addrs::Reference>) -> Self {
        Self {
            container_addr,
            resource_context: None,
            local_ref: local_ref.into(),
        }
    }

    pub fn within(mut self, resource: ResourceInstance) -> Self {
        self.resource_context = Some(resource);
        self
    }

    pub fn module_addr(&self) -> &ModuleInstance {
        &self.container_addr
    }

    /// The absolute resource instance this refers to, if it refers to one
    ///
    /// A reference to a whole resource is treated as a reference to its unkeyed instance.
    pub fn resource_instance(&self) -> Option<AbsResourceInstance> {
        match &self.local_ref.subject {
            Referenceable::Resource(resource) => {
                Some(resource.instance(None).absolute(self.container_addr.clone()))
            }
            Referenceable::ResourceInstance(instance) => {
                Some(instance.absolute(self.container_addr.clone()))
            }
            _ => None,
        }
    }

    /// The resource instance and the name of the top-level attribute accessed on it
    ///
    /// `aws_instance.web.tags["Name"]` yields `aws_instance.web` and `tags`.
    pub fn resource_attr(&self) -> Option<(AbsResourceInstance, &str)> {
        let instance = self.resource_instance()?;
        match self.local_ref.remaining.first() {
            Some(Traverser::Attr(name)) => Some((instance, name.as_str())),
            _ => None,
        }
    }

    /// Identity of what the reference selects, used to visit it only once
    ///
    /// The traversal into the object is part of it since it narrows what is analyzed
    /// (`aws_instance.web.tags` vs. `aws_instance.web.id`). The resource context only
    /// matters for symbols that depend on it.
    pub(crate) fn addr_key(&self) -> ObjectKey {
        let resource_context = if self.local_ref.subject.is_repetition_symbol() {
            self.resource_context.clone()
        } else {
            None
        };

        ObjectKey {
            container_addr: self.container_addr.clone(),
            resource_context,
            subject: self.local_ref.subject.clone(),
            remaining: self.local_ref.remaining.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct ObjectKey {
    container_addr: ModuleInstance,
    resource_context: Option<ResourceInstance>,
    subject: Referenceable,
    remaining: Vec<Traverser>,
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        addrs::write_module_prefix(f, &self.container_addr)?;
        self.local_ref.fmt(f)
    }
}

impl serde::ser::Serialize for Reference {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut ser = serializer.serialize_struct("Reference", 3)?;
        ser.serialize_field("module", &self.container_addr.to_string())?;
        ser.serialize_field("reference", &self.local_ref.to_string())?;
        ser.serialize_field(
            "within",
            &self.resource_context.as_ref().map(ToString::to_string),
        )?;
        ser.end()
    }
}

/// Stamp module-relative references with the module instance they were found in
pub(crate) fn absolute_refs(
    container_addr: &ModuleInstance,
    resource_context: Option<&ResourceInstance>,
    refs: impl IntoIterator<Item = addrs::Reference>,
) -> Vec<Reference> {
    refs.into_iter()
        .map(|local_ref| Reference {
            container_addr: container_addr.clone(),
            resource_context: resource_context.cloned(),
            local_ref,
        })
        .collect()
}

/// Remove duplicates, keeping the first occurrence
pub(crate) fn dedup(refs: impl IntoIterator<Item = Reference>) -> Vec<Reference> {
    refs.into_iter().collect::<IndexSet<_>>().into_iter().collect()
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::addrs::{InstanceKey, Resource};
    use pretty_assertions::assert_eq;

    fn reference(module: ModuleInstance, s: &str) -> Reference {
        Reference::new(module, s.parse::<addrs::Reference>().unwrap())
    }

    #[test]
    fn display_includes_module() {
        let module = ModuleInstance::root().child("app", Some(InstanceKey::Int(0)));
        assert_eq!(
            reference(module, "aws_instance.web.id").to_string(),
            "module.app[0].aws_instance.web.id"
        );
        assert_eq!(
            reference(ModuleInstance::root(), "var.x").to_string(),
            "var.x"
        );
    }

    #[test]
    fn resource_attr() {
        let module = ModuleInstance::root().child("app", None);
        let name_tag = reference(module.clone(), r#"aws_instance.web["a"].tags.Name"#);

        let (instance, attr) = name_tag.resource_attr().expect("resource attribute");
        assert_eq!(
            instance,
            Resource::managed("aws_instance", "web")
                .instance(Some("a".into()))
                .absolute(module.clone())
        );
        assert_eq!(attr, "tags");

        assert!(reference(module.clone(), "aws_instance.web")
            .resource_attr()
            .is_none());
        assert!(reference(module, "var.x.y").resource_attr().is_none());
    }

    #[test]
    fn addr_key_ignores_context() {
        let web = Resource::managed("aws_instance", "web").instance(None);
        let a = reference(ModuleInstance::root(), "var.x.a").within(web.clone());
        let b = reference(ModuleInstance::root(), "var.x.a");
        assert_eq!(a.addr_key(), b.addr_key());

        // ...except for repetition symbols
        let a = reference(ModuleInstance::root(), "count.index").within(web);
        let b = reference(ModuleInstance::root(), "count.index");
        assert_ne!(a.addr_key(), b.addr_key());
    }

    #[test]
    fn addr_key_includes_remaining() {
        let tags = reference(ModuleInstance::root(), "aws_instance.web.tags");
        let id = reference(ModuleInstance::root(), "aws_instance.web.id");
        assert_ne!(tags.addr_key(), id.addr_key());
    }

    #[test]
    fn dedup_keeps_first() {
        let refs = vec![
            reference(ModuleInstance::root(), "var.b"),
            reference(ModuleInstance::root(), "var.a"),
            reference(ModuleInstance::root(), "var.b"),
        ];
        let rendered: Vec<_> = dedup(refs).iter().map(ToString::to_string).collect();
        assert_eq!(rendered, vec!["var.b", "var.a"]);
    }

    #[test]
    fn serialize() {
        let web = Resource::managed("aws_instance", "web").instance(None);
        let count_index =
            reference(ModuleInstance::root().child("app", None), "count.index").within(web);

        assert_eq!(
            serde_json::to_string(&count_index).unwrap(),
            r#"{"module":"module.app","reference":"count.index","within":"aws_instance.web"}"#
        );
    }
}
