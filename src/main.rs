use anyhow::Result;
use clap::Parser;
use pkgpool::commands::{self, PoolConfig};
use pkgpool::repository::SearchMode;
use pkgpool::source::parse_named;
use std::path::PathBuf;

/// pkgpool - query several package repositories as one
///
/// Repositories are consulted in the order they are configured: indexes
/// from the sources file, then `--index` flags, then simple-index sources
/// from the file, then `--source` flags. The first repository that has a
/// package wins.
///
/// If the PKGPOOL_TOKEN environment variable is set, it is sent as a bearer
/// token to simple-index servers.
///
/// Examples:
///   pkgpool --source pypi=https://pypi.org/simple find requests
///   pkgpool --index local=./index.json search http
#[derive(Parser, Debug)]
#[command(author, version = env!("PKGPOOL_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Sources file (defaults to <config dir>/pkgpool/sources.json; also via PKGPOOL_CONFIG)
    #[arg(long, short = 'c', env = "PKGPOOL_CONFIG", value_name = "PATH", global = true)]
    config: Option<PathBuf>,

    /// Add a simple-index source, lowest precedence (repeatable)
    #[arg(long = "source", short = 's', value_name = "NAME=URL", value_parser = parse_named, global = true)]
    sources: Vec<(String, String)>,

    /// Add a local JSON index (repeatable)
    #[arg(long = "index", short = 'i', value_name = "NAME=PATH", value_parser = parse_named, global = true)]
    indexes: Vec<(String, String)>,

    /// Print results as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Show an exact package release
    Show(ShowArgs),

    /// List releases of a package
    Find(FindArgs),

    /// Search searchable repositories
    Search(SearchArgs),

    /// List configured repositories in precedence order
    Sources,
}

#[derive(clap::Args, Debug)]
struct ShowArgs {
    /// Package name
    name: String,

    /// Exact version
    version: String,

    /// Requested extras (repeatable)
    #[arg(long = "extra", short = 'e', value_name = "EXTRA")]
    extras: Vec<String>,
}

#[derive(clap::Args, Debug)]
struct FindArgs {
    /// Package name
    name: String,

    /// Only list this exact version
    #[arg(long, short = 'v', value_name = "VERSION")]
    version: Option<String>,

    /// Include prereleases
    #[arg(long)]
    pre: bool,
}

#[derive(clap::Args, Debug)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Match package names only
    #[arg(long)]
    name_only: bool,
}

impl Cli {
    fn pool_config(&self) -> PoolConfig {
        PoolConfig {
            config_path: self.config.clone(),
            indexes: self
                .indexes
                .iter()
                .map(|(name, path)| (name.clone(), PathBuf::from(path)))
                .collect(),
            sources: self.sources.clone(),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let config = cli.pool_config();

    match cli.command {
        Commands::Show(args) => {
            commands::show(&config, &args.name, &args.version, &args.extras, cli.json)?
        }
        Commands::Find(args) => commands::find(
            &config,
            &args.name,
            args.version.as_deref(),
            args.pre,
            cli.json,
        )?,
        Commands::Search(args) => {
            let mode = if args.name_only {
                SearchMode::Name
            } else {
                SearchMode::FullText
            };
            commands::search(&config, &args.query, mode, cli.json)?
        }
        Commands::Sources => commands::sources(&config)?,
    }
    Ok(())
}
