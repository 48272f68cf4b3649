use super::{Analyzer, Reference};
use crate::addrs::AbsResource;
use indexmap::IndexMap;
use std::collections::{BTreeSet, HashSet, VecDeque};

impl Analyzer {
    /// Every resource the given references depend on, directly or indirectly
    ///
    /// Sorted and free of duplicates.
    pub fn contributing_resources(&self, refs: &[Reference]) -> Vec<AbsResource> {
        self.contributing_resource_references(refs)
            .iter()
            .filter_map(|reference| {
                reference
                    .local_ref
                    .subject
                    .resource()
                    .map(|resource| resource.absolute(reference.container_addr.clone()))
            })
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// References to resources found while following [Analyzer::meta_references] transitively
    ///
    /// Starting references that point at resources are included. Every distinct reference
    /// (object plus traversal into it) is visited once, which also makes self-referential
    /// (invalid) configurations terminate. `a.x.tags` and `a.x.id` are both visited and both
    /// returned: the first only depends on the `tags` argument, the second on the whole body.
    pub fn contributing_resource_references(&self, refs: &[Reference]) -> Vec<Reference> {
        let mut found = IndexMap::new();
        let mut visited = HashSet::new();
        let mut pending: VecDeque<Reference> = refs.iter().cloned().collect();

        while let Some(reference) = pending.pop_front() {
            let key = reference.addr_key();
            if !visited.insert(key.clone()) {
                continue;
            }

            for next in self.meta_references(&reference) {
                if !visited.contains(&next.addr_key()) {
                    pending.push_back(next);
                }
            }

            if reference.local_ref.subject.resource().is_some() {
                found.entry(key).or_insert(reference);
            }
        }

        tracing::debug!(
            start = refs.len(),
            visited = visited.len(),
            found = found.len(),
            "contributing resources"
        );
        found.into_values().collect()
    }
}
