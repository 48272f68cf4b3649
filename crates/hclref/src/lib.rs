//! # hclref - static reference analysis for modular hcl configuration
//!
//! Answers "what does this object directly depend on?" for any object of an infrastructure
//! configuration spread over a tree of modules, without evaluating a single expression.
//!
//! ## Introduction for developers
//!
//! Read this to understand how `hclref` works internally.
//!
//! ### Loading files
//!
//! Every module is a directory of `.tf` files. Each file is parsed as a `body`
//! ([hcl_edit::structure::Body]) and collected in a [hcl_documents::HclDocuments] which remembers
//! where each root attribute and block came from.
//!
//! ### Parsing
//!
//! see [configs::ModuleConfig::new]
//!
//! The root blocks of a module (`resource`, `data`, `variable`, `locals`, `output`, `module`,
//! `provider`, `check`) are sorted into declarations. Meta-arguments such as `count` and
//! `for_each` are split from the resource arguments. Problems are collected as
//! [configs::Issue]s so a user sees all of them at once.
//!
//! [configs::Config::load] starts at the root module directory and follows module calls with a
//! local source (`./...` or `../...`). The result is an immutable snapshot keyed by static
//! module path ([addrs::Module]).
//!
//! ### Addresses
//!
//! see [addrs]
//!
//! ```hcl
//! module "network" {
//!   source   = "./modules/network"
//!   for_each = var.regions
//! }
//!
//! output "subnet" {
//!   value = module.network["eu"].subnet_id
//! }
//! ```
//!
//! `module.network["eu"].subnet_id` is a traversal. [lang] classifies it as a module call
//! output: the subject is output `subnet_id` of instance `["eu"]` of call `network`.
//! Traversals are only meaningful in the module instance they were written in, so the analyzer
//! pairs them with a [addrs::ModuleInstance] ([analyzer::Reference]).
//!
//! ### Analysis
//!
//! see [analyzer::Analyzer::meta_references]
//!
//! For a given reference, find the definition of the referenced object and extract the
//! references from its expression(s). Some definitions live in a different module than the
//! reference:
//!
//! | **reference**                  | **definition**                                  | **resolved in** |
//! |--------------------------------|-------------------------------------------------|-----------------|
//! | `var.x` in `module.network`    | argument `x` of `module "network"` in the root  | root            |
//! | `module.network.subnet_id`     | `output "subnet_id"` in the network module      | `module.network`|
//! | `aws_instance.web`             | `resource "aws_instance" "web"` incl. `count`   | same module     |
//!
//! Following these edges transitively yields every resource that contributes to a value, see
//! [analyzer::Analyzer::contributing_resources].
//!
pub mod addrs;
pub mod analyzer;
pub mod configs;
pub mod hcl_documents;
pub mod lang;
mod util;
mod visit;
