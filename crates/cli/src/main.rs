use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use runstore_lib::naming::CloningStrategy;

mod cmd;
mod output;

use cmd::{PersistenceArg, ResourceArg, TargetArg};
use output::{OutputFormat, print_failure};

/// runstore - resolve and manage run artifact locations
#[derive(Parser)]
#[command(name = "runstore")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Settings file (default: $RUNSTORE_CONFIG or <config dir>/stores.yaml)
  #[arg(short, long, global = true)]
  config: Option<PathBuf>,

  /// Enable debug logging
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Check every configured persistence
  Validate,

  /// Show configured persistences and the logs archive root
  Info,

  /// Print where a resource's outputs or logs live
  Path {
    #[arg(value_enum)]
    target: TargetArg,

    #[arg(value_enum)]
    resource: ResourceArg,

    /// Dotted resource name, e.g. user.project.7
    name: String,

    /// Persistence to resolve against (default: `default`, else first by name)
    #[arg(short, long)]
    persistence: Option<String>,

    /// Use the logs archive root instead of the logs persistence
    #[arg(long)]
    temp: bool,

    /// Name of the experiment this one was cloned from
    #[arg(long, requires = "cloning_strategy")]
    original: Option<String>,

    /// How the experiment was cloned (copy, restart, resume)
    #[arg(long)]
    cloning_strategy: Option<CloningStrategy>,
  },

  /// Create the directory a resource writes its outputs or logs to
  Create {
    #[arg(value_enum)]
    target: TargetArg,

    #[arg(value_enum)]
    resource: ResourceArg,

    /// Dotted resource name, e.g. user.project.7
    name: String,

    /// Persistence to create in (default: `default`, else first by name)
    #[arg(short, long)]
    persistence: Option<String>,

    /// Use the logs archive root instead of the logs persistence
    #[arg(long)]
    temp: bool,
  },

  /// Delete paths below a persistence root in the background
  Delete {
    #[arg(value_enum)]
    kind: PersistenceArg,

    /// Paths relative to the persistence root
    #[arg(required = true)]
    subpaths: Vec<String>,

    /// Persistence to delete from (default: `default`, else first by name)
    #[arg(short, long)]
    persistence: Option<String>,
  },

  /// Copy an experiment's outputs to another experiment
  Copy {
    /// Source experiment name
    from: String,

    /// Destination experiment name
    to: String,

    /// Outputs persistence of the source
    #[arg(long)]
    from_persistence: Option<String>,

    /// Outputs persistence of the destination
    #[arg(long)]
    to_persistence: Option<String>,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let config = cli.config.as_deref();
  let result = match cli.command {
    Commands::Validate => cmd::cmd_validate(config, cli.output),
    Commands::Info => cmd::cmd_info(config, cli.output),
    Commands::Path {
      target,
      resource,
      name,
      persistence,
      temp,
      original,
      cloning_strategy,
    } => cmd::cmd_path(
      config,
      &cmd::PathRequest {
        target,
        resource,
        name: &name,
        persistence: persistence.as_deref(),
        temp,
        original: original.as_deref(),
        cloning_strategy,
      },
      cli.output,
    ),
    Commands::Create {
      target,
      resource,
      name,
      persistence,
      temp,
    } => cmd::cmd_create(config, target, resource, &name, persistence.as_deref(), temp, cli.output),
    Commands::Delete {
      kind,
      subpaths,
      persistence,
    } => cmd::cmd_delete(config, kind, &subpaths, persistence.as_deref(), cli.output),
    Commands::Copy {
      from,
      to,
      from_persistence,
      to_persistence,
    } => cmd::cmd_copy(
      config,
      &from,
      &to,
      from_persistence.as_deref(),
      to_persistence.as_deref(),
      cli.output,
    ),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      print_failure(&format!("{:#}", e));
      ExitCode::FAILURE
    }
  }
}
