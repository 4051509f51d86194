mod check;
mod scan;
mod schema;
mod serve;

use clap::{Args, Parser, Subcommand};
use routescope_core::{Catalog, CatalogConfig};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "routescope",
    version,
    about = "Discover and serve a directory-based API catalog",
    long_about = "Routescope walks a directory tree of endpoint folders, collects the JSON \
                  descriptor each folder carries, and serves the resulting catalog over HTTP \
                  together with a generic invocation route for every endpoint."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Location of the catalog and the prefix its endpoints live under.
#[derive(Args, Debug, Clone)]
pub struct CatalogArgs {
    /// Catalog root directory
    #[arg(long, env = "ROUTESCOPE_ROOT", default_value = "api", value_name = "DIR")]
    pub root: PathBuf,

    /// Endpoint prefix of the catalog root ("" or "/" for none)
    #[arg(long, env = "ROUTESCOPE_MOUNT", default_value = "/api", value_name = "PREFIX")]
    pub mount: String,
}

impl CatalogArgs {
    pub fn config(&self) -> CatalogConfig {
        CatalogConfig::new(self.root.clone()).with_mount(self.mount.as_str())
    }

    pub fn catalog(&self) -> Catalog {
        Catalog::new(self.config())
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Serve the catalog and its endpoints over HTTP
    #[command(
        long_about = "Starts the HTTP server. `{mount}/discovery` lists the catalog, \
                      `{endpoint}/discovery` describes one endpoint and any request to \
                      `{endpoint}` invokes the handler its descriptor names."
    )]
    Serve {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Address to listen on
        #[arg(long, env = "ROUTESCOPE_BIND", default_value = "127.0.0.1:3000")]
        bind: SocketAddr,

        /// Idle lifetime of handler sessions, in seconds
        #[arg(long, env = "ROUTESCOPE_SESSION_TTL", default_value_t = 1800, value_name = "SECS")]
        session_ttl: u64,
    },
    /// Print the discovered catalog as JSON
    Scan {
        #[command(flatten)]
        catalog: CatalogArgs,

        /// Single-line output
        #[arg(long)]
        compact: bool,
    },
    /// Print the record serving one endpoint
    Show {
        /// Endpoint, e.g. /api/generic/chat
        #[arg(value_name = "ENDPOINT")]
        endpoint: String,

        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Report malformed, unreachable and conflicting descriptors
    #[command(
        long_about = "Walks every descriptor file below the root, including ones discovery \
                      skips. Exits with a non-zero status when any descriptor is malformed, \
                      declares an endpoint its directory does not serve, or two descriptors \
                      claim the same endpoint."
    )]
    Check {
        #[command(flatten)]
        catalog: CatalogArgs,
    },
    /// Print the JSON Schema of descriptor files
    Schema,
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Only the server logs to the terminal; other commands keep stdout clean.
    let (component, to_stderr) = match &cli.command {
        Commands::Serve { .. } => ("serve", true),
        _ => ("cli", false),
    };
    let _guard = routescope_core::logging::init_logging(component, to_stderr);

    let rt = tokio::runtime::Runtime::new()?;

    match cli.command {
        Commands::Serve {
            catalog,
            bind,
            session_ttl,
        } => rt.block_on(serve::run(catalog, bind, session_ttl)),
        Commands::Scan { catalog, compact } => rt.block_on(scan::run(catalog, compact)),
        Commands::Show { endpoint, catalog } => rt.block_on(scan::show(catalog, &endpoint)),
        Commands::Check { catalog } => check::run(catalog),
        Commands::Schema => schema::run(),
    }
}
