//! hclref cli interface

use clap::{Parser, Subcommand, ValueEnum};
use std::fmt::Formatter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Change the work directory
    ///
    /// Can be specified multiple times. Note that all
    /// paths on the way to the final path must exist.
    /// The final work directory is the root module.
    ///
    /// This is equivalent to running { cd <directory>; hclref ... }
    #[clap(short = 'C', long = "directory", global(true))]
    pub directory: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Direct references of a resource instance
    ///
    /// e.g. `module.app[0].aws_instance.web["a"]`
    Refs(RefsCommand),

    /// References of a resource's count or for_each expression
    #[command(alias = "rep")]
    Repetition(RepetitionCommand),

    /// Direct references of any referenceable object
    Meta(MetaCommand),

    /// All resources the given references depend on, directly or indirectly
    Contributing(ContributingCommand),

    /// Print debug information for development
    Dev(DevCommand),
}

#[derive(Parser, Debug)]
pub struct RefsCommand {
    #[clap(flatten)]
    pub output: OutputArgs,

    /// Absolute resource instance address
    pub instance: String,
}

#[derive(Parser, Debug)]
pub struct RepetitionCommand {
    #[clap(flatten)]
    pub output: OutputArgs,

    /// Absolute resource address
    pub resource: String,
}

#[derive(Parser, Debug)]
pub struct MetaCommand {
    #[clap(flatten)]
    pub output: OutputArgs,

    #[clap(flatten)]
    pub module: ModuleArgs,

    /// Reference as written in the module, e.g. `var.x` or `aws_instance.web.tags`
    pub reference: String,
}

#[derive(Parser, Debug)]
pub struct ContributingCommand {
    #[clap(flatten)]
    pub output: OutputArgs,

    #[clap(flatten)]
    pub module: ModuleArgs,

    /// References as written in the module
    #[arg(required = true)]
    pub references: Vec<String>,
}

#[derive(Parser, Debug)]
pub struct ModuleArgs {
    /// Module instance the references are resolved in (default: root module)
    #[clap(short = 'm', long = "module", default_value = "")]
    pub module: String,
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    #[arg(short = 'F', long = "output-format", default_value_t)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Clone, Default, Debug)]
pub enum OutputFormat {
    Json,
    #[default]
    Yaml,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Yaml => f.write_str("yaml"),
        }
    }
}

#[derive(Parser, Debug)]
pub struct DevCommand {
    #[command(subcommand)]
    pub command: DevSubCommand,
}

#[derive(Subcommand, Debug)]
pub enum DevSubCommand {
    /// Loaded module configurations
    Config,
}
