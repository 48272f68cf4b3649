//! Analyzer tests against module trees in /tests/fixtures/
//!
//! `tree` is a root module calling a `network` module with for_each.

use hclref::addrs::{
    self, AbsResource, AbsResourceInstance, InstanceKey, ModuleInstance, Resource,
};
use hclref::analyzer::{Analyzer, Reference};
use hclref::configs::{Config, ConfigLoadError, ModuleConfig, ResourceConfig};
use hclref::hcl_documents;
use pretty_assertions::assert_eq;
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

fn analyzer() -> Analyzer {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("HCLREF_LOG"))
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load(&fixture("tree")).expect("fixture must load");
    Analyzer::new(Arc::new(config))
}

fn reference(module: &str, s: &str) -> Reference {
    Reference::new(
        module.parse::<ModuleInstance>().unwrap(),
        s.parse::<addrs::Reference>().unwrap(),
    )
}

fn rendered(refs: &[Reference]) -> Vec<String> {
    refs.iter().map(ToString::to_string).collect()
}

fn instance(s: &str) -> AbsResourceInstance {
    s.parse().unwrap()
}

fn resource(s: &str) -> AbsResource {
    s.parse().unwrap()
}

#[test]
fn loads_local_modules() {
    let analyzer = analyzer();
    let modules: Vec<String> = analyzer
        .config()
        .modules()
        .map(|(addr, _)| addr.to_string())
        .collect();

    assert_eq!(modules, vec!["", "module.network"]);
}

#[test]
fn module_cycle_is_rejected() {
    let err = Config::load(&fixture("cycle")).unwrap_err();
    assert!(
        matches!(err, ConfigLoadError::ModuleCycle { ref module, .. } if module == "module.again"),
        "unexpected error: {err:?}"
    );
}

#[test]
fn resource_instance_references() {
    let analyzer = analyzer();
    let refs = analyzer.references_from_resource_instance(&instance("aws_instance.web[0]"));

    assert_eq!(
        rendered(&refs),
        vec![
            "var.ami",
            r#"module.network["eu"].subnet_id"#,
            "local.name",
            "count.index",
            "var.instance_count",
        ]
    );

    // everything is found inside the resource block
    for reference in &refs {
        assert_eq!(reference.container_addr, ModuleInstance::root());
        assert_eq!(
            reference.resource_context,
            Some(Resource::managed("aws_instance", "web").instance(Some(InstanceKey::Int(0))))
        );
    }
}

#[test]
fn resource_instance_references_in_child_module() {
    let analyzer = analyzer();
    let refs = analyzer
        .references_from_resource_instance(&instance(r#"module.network["eu"].aws_subnet.main"#));

    insta::assert_snapshot!(serde_json::to_string_pretty(&refs).unwrap(), @r###"
    [
      {
        "module": "module.network[\"eu\"]",
        "reference": "aws_vpc.main.id",
        "within": "aws_subnet.main"
      },
      {
        "module": "module.network[\"eu\"]",
        "reference": "var.cidr",
        "within": "aws_subnet.main"
      },
      {
        "module": "module.network[\"eu\"]",
        "reference": "var.name",
        "within": "aws_subnet.main"
      }
    ]
    "###);
}

#[test]
fn resource_instance_without_repetition() {
    let analyzer = analyzer();
    let refs = analyzer.references_from_resource_instance(&instance("null_resource.plain"));

    assert_eq!(rendered(&refs), vec!["aws_instance.web[0].id"]);
}

#[test]
fn repetition_references() {
    let analyzer = analyzer();

    assert_eq!(
        rendered(&analyzer.references_from_resource_repetition(&resource("aws_instance.web"))),
        vec!["var.instance_count"]
    );
    assert_eq!(
        rendered(&analyzer.references_from_resource_repetition(&resource("aws_s3_bucket.logs"))),
        vec!["var.regions"]
    );
    assert!(analyzer
        .references_from_resource_repetition(&resource("null_resource.plain"))
        .is_empty());

    // stamped with the module only, there is no resource context to pass on
    let refs = analyzer.references_from_resource_repetition(&resource("aws_s3_bucket.logs"));
    assert_eq!(refs[0].resource_context, None);
}

#[test]
fn repetition_references_in_child_module() {
    let analyzer = analyzer();
    let network: ModuleInstance = r#"module.network["eu"]"#.parse().unwrap();

    let refs = analyzer.references_from_resource_repetition(&resource(
        r#"module.network["eu"].aws_route_table.private"#,
    ));
    assert_eq!(rendered(&refs), vec![r#"module.network["eu"].var.zones"#]);
    assert_eq!(refs[0].container_addr, network);
    assert_eq!(refs[0].resource_context, None);

    let refs = analyzer.references_from_resource_instance(&instance(
        r#"module.network["eu"].aws_route_table.private[1]"#,
    ));
    assert_eq!(
        rendered(&refs),
        vec![
            r#"module.network["eu"].aws_vpc.main.id"#,
            r#"module.network["eu"].var.zones"#,
        ]
    );
    for reference in &refs {
        assert_eq!(reference.container_addr, network);
    }
}

#[test]
fn unknown_objects_have_no_references() {
    let analyzer = analyzer();

    assert!(analyzer
        .references_from_resource_instance(&instance("aws_instance.missing"))
        .is_empty());
    assert!(analyzer
        .references_from_resource_instance(&instance("module.missing.aws_instance.web"))
        .is_empty());
    assert!(analyzer
        .references_from_resource_repetition(&resource("module.missing.aws_instance.web"))
        .is_empty());
    assert!(analyzer
        .meta_references(&reference("", "local.missing"))
        .is_empty());
    assert!(analyzer
        .meta_references(&reference("", "module.missing.out"))
        .is_empty());
}

#[test]
fn repeated_queries_are_equal() {
    let analyzer = analyzer();
    let addr = instance("aws_instance.web[1]");

    assert_eq!(
        analyzer.references_from_resource_instance(&addr),
        analyzer.references_from_resource_instance(&addr)
    );
    assert_eq!(
        analyzer.clone().meta_references(&reference("", "module.network")),
        analyzer.meta_references(&reference("", "module.network"))
    );
}

#[test]
fn meta_references_narrow_resource_attributes() {
    let analyzer = analyzer();

    assert_eq!(
        rendered(&analyzer.meta_references(&reference("", "aws_instance.web[0].tags"))),
        vec!["local.name", "count.index", "var.instance_count"]
    );
    // computed attributes depend on the whole configuration
    assert_eq!(
        rendered(&analyzer.meta_references(&reference("", "aws_instance.web[0].id"))).len(),
        5
    );
}

#[test]
fn meta_references_of_values() {
    let analyzer = analyzer();

    assert_eq!(
        rendered(&analyzer.meta_references(&reference("", "local.name"))),
        vec!["var.ami"]
    );
    assert_eq!(
        rendered(&analyzer.meta_references(&reference("", "output.web_ids"))),
        vec!["aws_instance.web[*].id"]
    );
    assert_eq!(
        rendered(&analyzer.meta_references(&reference("", "data.aws_ami.ubuntu"))),
        vec!["var.owner"]
    );
    assert_eq!(
        rendered(&analyzer.meta_references(&reference("", "provider.aws"))),
        vec!["var.region"]
    );
    assert_eq!(
        rendered(&analyzer.meta_references(&reference("", "check.health"))),
        vec!["aws_instance.web[0].id"]
    );
    // set from outside the configuration
    assert!(analyzer
        .meta_references(&reference("", "var.ami"))
        .is_empty());
    assert!(analyzer
        .meta_references(&reference("", "path.module"))
        .is_empty());
}

#[test]
fn meta_references_cross_module_boundaries() {
    let analyzer = analyzer();

    // input variables are defined by the caller
    assert_eq!(
        rendered(&analyzer.meta_references(&reference(r#"module.network["eu"]"#, "var.name"))),
        vec!["local.name"]
    );

    // outputs are defined by the callee
    assert_eq!(
        rendered(&analyzer.meta_references(&reference("", r#"module.network["eu"].subnet_id"#))),
        vec![r#"module.network["eu"].aws_subnet.main.id"#]
    );

    // the call as a whole depends on all of its outputs
    assert_eq!(
        rendered(&analyzer.meta_references(&reference("", "module.network"))),
        vec!["module.network.aws_subnet.main.id"]
    );
}

#[test]
fn meta_references_of_repetition_symbols() {
    let analyzer = analyzer();
    let logs = Resource::managed("aws_s3_bucket", "logs").instance(Some("eu".into()));

    let each_key = reference("", "each.key").within(logs);
    assert_eq!(
        rendered(&analyzer.meta_references(&each_key)),
        vec!["var.regions"]
    );

    // meaningless outside of a repeated block
    assert!(analyzer
        .meta_references(&reference("", "count.index"))
        .is_empty());
}

#[test]
fn contributing_resources() {
    let analyzer = analyzer();
    let resources: Vec<String> = analyzer
        .contributing_resources(&[reference("", "output.web_ids")])
        .iter()
        .map(ToString::to_string)
        .collect();

    insta::assert_snapshot!(resources.join("\n"), @r###"
    aws_instance.web
    module.network["eu"].aws_subnet.main
    module.network["eu"].aws_vpc.main
    "###);
}

#[test]
fn contributing_resources_follow_every_traversal() {
    // `a.x.tags` only depends on `tags`, `a.x.id` on the whole body
    let module = ModuleConfig::new(&hcl_documents! {r#"
        resource "a" "x" {
          tags  = var.t
          other = b.y.id
        }

        resource "b" "y" {}

        output "o" {
          value = [a.x.tags, a.x.id]
        }
    "#})
    .unwrap();
    let analyzer = Analyzer::new(Arc::new(Config::new([(addrs::Module::root(), module)])));
    let start = [reference("", "output.o")];

    assert_eq!(
        rendered(&analyzer.contributing_resource_references(&start)),
        vec!["a.x.tags", "a.x.id", "b.y.id"]
    );

    let resources: Vec<String> = analyzer
        .contributing_resources(&start)
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(resources, vec!["a.x", "b.y"]);
}

#[test]
fn contributing_resources_without_resources() {
    let analyzer = analyzer();

    assert!(analyzer
        .contributing_resources(&[reference("", "local.name")])
        .is_empty());
    assert!(analyzer.contributing_resources(&[]).is_empty());
}

#[test]
#[should_panic(expected = "aws_instance.web has both for_each and count")]
fn count_and_for_each_is_fatal() {
    let expr = |s: &str| -> hcl::Expression {
        s.parse::<hcl_edit::expr::Expression>().unwrap().into()
    };

    let addr = Resource::managed("aws_instance", "web");
    let mut module = ModuleConfig::default();
    module.resources.insert(
        addr.clone(),
        ResourceConfig::new(addr.clone(), hcl::Body::default())
            .with_count(expr("var.n"))
            .with_for_each(expr("var.m")),
    );

    let analyzer = Analyzer::new(Arc::new(Config::new([(addrs::Module::root(), module)])));
    analyzer.references_from_resource_repetition(&addr.absolute(ModuleInstance::root()));
}
