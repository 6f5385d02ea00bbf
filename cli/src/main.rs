use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use cmdtree_config::{ConfigError, DefinitionLoader};
use cmdtree_core::ParseError;
use thiserror::Error;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt};

/// Output format for parse summaries.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "cmdtree")]
#[command(about = "Check command tree definitions and dry-run parses")]
#[command(version)]
struct Cli {
    /// Enable debug logging on stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load and validate a definition file.
    Check(CheckArgs),
    /// Print the tokens after alias expansion.
    Expand(ExpandArgs),
    /// Parse tokens against a definition and print the bound invocation.
    Parse(ParseArgs),
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Definition file (.yaml, .yml or .json).
    definition: PathBuf,
    /// User alias files, earliest wins.
    #[arg(long = "aliases")]
    aliases: Vec<PathBuf>,
}

#[derive(Debug, Args)]
struct ExpandArgs {
    /// Definition file (.yaml, .yml or .json).
    #[arg(long)]
    definition: PathBuf,
    /// User alias files, earliest wins.
    #[arg(long = "aliases")]
    aliases: Vec<PathBuf>,
    /// Tokens to expand, given after `--`.
    #[arg(last = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Definition file (.yaml, .yml or .json).
    #[arg(long)]
    definition: PathBuf,
    /// User alias files, earliest wins.
    #[arg(long = "aliases")]
    aliases: Vec<PathBuf>,
    /// Output format for the parse summary.
    #[arg(long, value_enum, default_value_t = CliOutputFormat::Json)]
    format: CliOutputFormat,
    /// Tokens to process, given after `--`.
    #[arg(last = true)]
    tokens: Vec<String>,
}

#[derive(Debug, Error)]
enum Failure {
    #[error(transparent)]
    Load(#[from] ConfigError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("failed to render output: {0}")]
    Output(String),
}

impl Failure {
    fn exit_code(&self) -> i32 {
        match self {
            Self::Parse(_) => 2,
            Self::Load(_) | Self::Output(_) => 1,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Check(args) => run_check(args),
        Command::Expand(args) => run_expand(args),
        Command::Parse(args) => run_parse(args),
    };

    if let Err(err) = result {
        match &err {
            Failure::Load(ConfigError::InvalidMetadata(errors)) => {
                for error in errors {
                    eprintln!("error: {error}");
                }
            }
            _ => eprintln!("error: {err}"),
        }
        std::process::exit(err.exit_code());
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn load(definition: &Path, aliases: &[PathBuf]) -> Result<cmdtree_parser::Cli, Failure> {
    let loader = aliases
        .iter()
        .fold(DefinitionLoader::new(), |loader, path| loader.with_alias_file(path));
    let global = loader.load(definition)?;
    debug!(
        program = %global.name,
        aliases = global.parser.aliases().len(),
        "Definition ready"
    );
    cmdtree_parser::Cli::new(global).map_err(|errors| ConfigError::InvalidMetadata(errors).into())
}

fn run_check(args: CheckArgs) -> Result<(), Failure> {
    load(&args.definition, &args.aliases)?;
    println!("ok");
    Ok(())
}

fn run_expand(args: ExpandArgs) -> Result<(), Failure> {
    let cli = load(&args.definition, &args.aliases)?;
    for token in cli.expand(args.tokens)? {
        println!("{token}");
    }
    Ok(())
}

fn run_parse(args: ParseArgs) -> Result<(), Failure> {
    let cli = load(&args.definition, &args.aliases)?;
    let summary = cli.parse(args.tokens)?.summary();
    let rendered = match args.format {
        CliOutputFormat::Json => {
            serde_json::to_string_pretty(&summary).map_err(|e| Failure::Output(e.to_string()))?
        }
        CliOutputFormat::Yaml => {
            serde_yaml::to_string(&summary).map_err(|e| Failure::Output(e.to_string()))?
        }
    };
    println!("{}", rendered.trim_end());
    Ok(())
}
