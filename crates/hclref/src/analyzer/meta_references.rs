use super::reference::{absolute_refs, dedup};
use super::shortcuts::repetition_references;
use super::{Analyzer, Reference};
use crate::addrs::{
    self, LocalProviderConfig, ModuleCallInstance, ModuleInstance, Referenceable, ResourceInstance,
    Traverser,
};
use crate::lang;
use hcl::{Body, Expression};

impl Analyzer {
    /// Direct references made by the definition of the referenced object
    ///
    /// Returned references are deduplicated and resolved in the module that contains the
    /// definition: the object's own module for most objects, the calling module for input
    /// variables (their value is a module call argument) and the called module for module
    /// outputs.
    ///
    /// References to resources also include the references of the resource's `count` or
    /// `for_each` expression, since the number of instances has to be known before any
    /// instance can be.
    ///
    /// # Panics
    ///
    /// If a referenced resource has both `count` and `for_each`, see
    /// [Analyzer::references_from_resource_repetition].
    #[tracing::instrument(level = "trace", skip_all, fields(reference = %reference))]
    pub fn meta_references(&self, reference: &Reference) -> Vec<Reference> {
        let module = &reference.container_addr;
        let remaining = reference.local_ref.remaining.as_slice();

        let refs = match &reference.local_ref.subject {
            Referenceable::Resource(resource) => {
                self.meta_references_resource_instance(module, &resource.instance(None), remaining)
            }
            Referenceable::ResourceInstance(instance) => {
                self.meta_references_resource_instance(module, instance, remaining)
            }
            Referenceable::InputVariable { name } => {
                self.meta_references_input_variable(module, name)
            }
            Referenceable::LocalValue { name } => self.meta_references_local_value(module, name),
            Referenceable::OutputValue { name } => self.meta_references_output_value(module, name),
            Referenceable::ModuleCallInstanceOutput(output) => {
                let callee = module.child(output.call.call.name.clone(), output.call.key.clone());
                self.meta_references_output_value(&callee, &output.name)
            }
            Referenceable::ModuleCallInstance(call) => {
                self.meta_references_module_call(module, call)
            }
            // not quite right: a reference to the call is a reference to all of its instances,
            // but every instance shares the same configuration
            Referenceable::ModuleCall(call) => {
                self.meta_references_module_call(module, &call.instance(None))
            }
            Referenceable::ProviderConfig(provider) => {
                self.meta_references_provider_config(module, provider)
            }
            Referenceable::Check { name } => self.meta_references_check(module, name),
            Referenceable::CountAttr { .. } | Referenceable::ForEachAttr { .. } => {
                match &reference.resource_context {
                    Some(instance) => self.references_from_resource_repetition(
                        &instance.resource.absolute(module.clone()),
                    ),
                    None => vec![],
                }
            }
            // not backed by configuration, can't refer to anything
            Referenceable::PathAttr { .. }
            | Referenceable::TerraformAttr { .. }
            | Referenceable::SelfRef => vec![],
        };

        let refs = dedup(refs);
        tracing::trace!(count = refs.len(), "found references");
        refs
    }

    fn meta_references_resource_instance(
        &self,
        module: &ModuleInstance,
        addr: &ResourceInstance,
        remaining: &[Traverser],
    ) -> Vec<Reference> {
        let Some(module_config) = self.module_config(module) else {
            return vec![];
        };
        let Some(resource_config) = module_config.resource_by_addr(&addr.resource) else {
            tracing::debug!(%module, resource = %addr, "resource not found");
            return vec![];
        };

        let mut refs = references_in_narrowed_body(&resource_config.config, remaining);
        refs.extend(repetition_references(
            &addr.resource.absolute(module.clone()),
            resource_config,
        ));

        absolute_refs(module, Some(addr), refs)
    }

    fn meta_references_input_variable(
        &self,
        callee: &ModuleInstance,
        name: &str,
    ) -> Vec<Reference> {
        // root module variables are set from outside the configuration
        let Some((caller, call)) = callee.parent() else {
            return vec![];
        };
        let Some(caller_config) = self.module_config(&caller) else {
            return vec![];
        };
        let Some(argument) = caller_config
            .module_calls
            .get(&call.call.name)
            .and_then(|call_config| call_config.arguments.get(name))
        else {
            return vec![];
        };

        let (refs, _) = lang::references_in_expr(argument);
        absolute_refs(&caller, None, refs)
    }

    fn meta_references_local_value(&self, module: &ModuleInstance, name: &str) -> Vec<Reference> {
        let Some(local) = self
            .module_config(module)
            .and_then(|module_config| module_config.locals.get(name))
        else {
            return vec![];
        };

        let (refs, _) = lang::references_in_expr(&local.expr);
        absolute_refs(module, None, refs)
    }

    fn meta_references_output_value(&self, callee: &ModuleInstance, name: &str) -> Vec<Reference> {
        let Some(output) = self
            .module_config(callee)
            .and_then(|module_config| module_config.outputs.get(name))
        else {
            return vec![];
        };

        let (refs, _) = lang::references_in_expr(&output.expr);
        absolute_refs(callee, None, refs)
    }

    /// All references of all outputs of the called module
    fn meta_references_module_call(
        &self,
        caller: &ModuleInstance,
        call: &ModuleCallInstance,
    ) -> Vec<Reference> {
        let callee = caller.child(call.call.name.clone(), call.key.clone());
        let Some(callee_config) = self.module_config(&callee) else {
            return vec![];
        };

        callee_config
            .outputs
            .keys()
            .flat_map(|name| self.meta_references_output_value(&callee, name))
            .collect()
    }

    fn meta_references_provider_config(
        &self,
        module: &ModuleInstance,
        provider: &LocalProviderConfig,
    ) -> Vec<Reference> {
        let Some(provider_config) = self
            .module_config(module)
            .and_then(|module_config| module_config.provider_configs.get(provider))
        else {
            return vec![];
        };

        let (refs, _) = lang::references_in_block(&provider_config.config);
        absolute_refs(module, None, refs)
    }

    fn meta_references_check(&self, module: &ModuleInstance, name: &str) -> Vec<Reference> {
        let Some(check) = self
            .module_config(module)
            .and_then(|module_config| module_config.checks.get(name))
        else {
            return vec![];
        };

        let (refs, _) = lang::references_in_block(&check.config);
        absolute_refs(module, None, refs)
    }
}

/// References of a resource body, narrowed down to the part the remaining traversal selects
///
/// `aws_instance.web.tags` only depends on the `tags` argument. Nested blocks are followed
/// (`.root_block_device.volume_size`). Anything else, like the computed `id`, could depend on
/// the whole body.
fn references_in_narrowed_body(body: &Body, remaining: &[Traverser]) -> Vec<addrs::Reference> {
    let mut bodies = vec![body];

    for step in remaining {
        let Traverser::Attr(name) = step else {
            break;
        };

        let exprs: Vec<&Expression> = bodies
            .iter()
            .copied()
            .flat_map(|body| body.attributes())
            .filter(|attribute| attribute.key.as_str() == name)
            .map(|attribute| &attribute.expr)
            .collect();
        if !exprs.is_empty() {
            return exprs
                .into_iter()
                .flat_map(|expr| lang::references_in_expr(expr).0)
                .collect();
        }

        let nested: Vec<&Body> = bodies
            .iter()
            .copied()
            .flat_map(|body| body.blocks())
            .filter(|block| block.identifier.as_str() == name)
            .map(|block| &block.body)
            .collect();
        if nested.is_empty() {
            break;
        }

        bodies = nested;
    }

    bodies
        .into_iter()
        .flat_map(|body| lang::references_in_block(body).0)
        .collect()
}
