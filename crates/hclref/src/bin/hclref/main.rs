mod cli;

use hclref::addrs::{self, AbsResource, AbsResourceInstance, ModuleInstance};
use hclref::analyzer::{Analyzer, Reference};
use hclref::configs::Config;
use std::sync::Arc;

fn main() {
    use clap::Parser;
    let cli = cli::Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_env("HCLREF_LOG"))
        .with_writer(std::io::stderr)
        .init();

    for new_path in cli.directory.iter() {
        match new_path.canonicalize() {
            Err(e) => {
                eprintln!(
                    "Failed to resolve path for -C/--directory {}\n{}",
                    new_path.display(),
                    e
                );
                std::process::exit(1);
            }
            Ok(cwd) => {
                if let Err(err) = std::env::set_current_dir(&cwd) {
                    eprintln!("Failed to set work directory to {}\n{}", cwd.display(), err,);
                    std::process::exit(1);
                }

                tracing::info!(directory=%cwd.display(), "Changed working directory");
            }
        }
    }

    let command_result = match cli.command {
        cli::Command::Refs(refs_cli) => refs(refs_cli),
        cli::Command::Repetition(repetition_cli) => repetition(repetition_cli),
        cli::Command::Meta(meta_cli) => meta(meta_cli),
        cli::Command::Contributing(contributing_cli) => contributing(contributing_cli),
        cli::Command::Dev(dev_cli) => dev(dev_cli),
    };

    if let Err(e) = command_result {
        for error in e.chain() {
            eprintln!("{error}")
        }
        std::process::exit(1);
    }
}

pub fn refs(cli: cli::RefsCommand) -> anyhow::Result<()> {
    let analyzer = load()?;
    let addr: AbsResourceInstance = cli.instance.parse()?;

    output(&cli.output, &analyzer.references_from_resource_instance(&addr))
}

pub fn repetition(cli: cli::RepetitionCommand) -> anyhow::Result<()> {
    let analyzer = load()?;
    let addr: AbsResource = cli.resource.parse()?;

    output(&cli.output, &analyzer.references_from_resource_repetition(&addr))
}

pub fn meta(cli: cli::MetaCommand) -> anyhow::Result<()> {
    let analyzer = load()?;
    let reference = parse_reference(&cli.module, &cli.reference)?;

    output(&cli.output, &analyzer.meta_references(&reference))
}

pub fn contributing(cli: cli::ContributingCommand) -> anyhow::Result<()> {
    let analyzer = load()?;
    let references = cli
        .references
        .iter()
        .map(|reference| parse_reference(&cli.module, reference))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let resources: Vec<String> = analyzer
        .contributing_resources(&references)
        .iter()
        .map(ToString::to_string)
        .collect();

    output(&cli.output, &resources)
}

fn load() -> anyhow::Result<Analyzer> {
    let config = Config::load(&std::env::current_dir()?)?;
    Ok(Analyzer::new(Arc::new(config)))
}

fn parse_reference(module: &cli::ModuleArgs, reference: &str) -> anyhow::Result<Reference> {
    let module: ModuleInstance = module.module.parse()?;
    let local_ref: addrs::Reference = reference.parse()?;

    Ok(Reference::new(module, local_ref))
}

fn output<T: serde::Serialize + ?Sized>(output: &cli::OutputArgs, value: &T) -> anyhow::Result<()> {
    match output.format {
        cli::OutputFormat::Yaml => serde_yaml::to_writer(std::io::stdout(), value)?,
        cli::OutputFormat::Json => serde_json::to_writer_pretty(std::io::stdout(), value)?,
    };

    Ok(())
}

/// (hclref-)developer utilities
///
/// A quick way to expose internal structures for debugging purposes
pub fn dev(cli: cli::DevCommand) -> anyhow::Result<()> {
    let config = Config::load(&std::env::current_dir()?)?;

    match cli.command {
        cli::DevSubCommand::Config => println!("{config:#?}"),
    }

    Ok(())
}
