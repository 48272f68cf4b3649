use super::reference::{absolute_refs, dedup};
use super::{Analyzer, Reference};
use crate::addrs::{self, AbsResource, AbsResourceInstance, Referenceable};
use crate::configs::ResourceConfig;
use crate::lang;

impl Analyzer {
    /// Direct references from the configuration of a resource instance
    ///
    /// Resources can only refer to objects of their own module, so every returned reference is
    /// resolved in `addr.module`.
    pub fn references_from_resource_instance(&self, addr: &AbsResourceInstance) -> Vec<Reference> {
        // MetaReferences is more than strictly needed here, but this way both can never disagree
        let reference = Reference::new(
            addr.module.clone(),
            Referenceable::ResourceInstance(addr.resource.clone()),
        );
        self.meta_references(&reference)
    }

    /// References of the resource's `for_each` or `count` expression
    ///
    /// Empty if the resource is unknown or doesn't repeat. Anything referring to `count.index`,
    /// `each.key` or `each.value` inside the resource depends on these, even if the body itself
    /// doesn't mention them.
    ///
    /// # Panics
    ///
    /// If the resource has both `count` and `for_each`. The configuration loader rejects that,
    /// so getting here means that guarantee was broken somewhere upstream.
    pub fn references_from_resource_repetition(&self, addr: &AbsResource) -> Vec<Reference> {
        let Some(resource_config) = self
            .module_config(&addr.module)
            .and_then(|module_config| module_config.resource_by_addr(&addr.resource))
        else {
            return vec![];
        };

        dedup(absolute_refs(
            &addr.module,
            None,
            repetition_references(addr, resource_config),
        ))
    }
}

pub(super) fn repetition_references(
    addr: &AbsResource,
    resource_config: &ResourceConfig,
) -> Vec<addrs::Reference> {
    let expr = match (&resource_config.for_each, &resource_config.count) {
        (Some(_), Some(_)) => panic!("{addr} has both for_each and count"),
        (Some(for_each), None) => for_each,
        (None, Some(count)) => count,
        (None, None) => return vec![],
    };

    let (refs, _) = lang::references_in_expr(expr);
    refs
}
