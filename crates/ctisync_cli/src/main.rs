//! CtiSync CLI
//!
//! Command-line tools for the ctisync content catalog engine.
//!
//! # Commands
//!
//! - `sync` - Run one synchronization pass against a catalog
//! - `status` - Show the remote consumer record
//! - `preview` - Compute the promotion diff for a space
//! - `promote` - Synchronize, then promote a space into its target
//! - `hash` - Print the canonical content hash of a JSON document

mod commands;

use clap::{Parser, Subcommand};
use ctisync_engine::SyncConfig;
use ctisync_model::SpaceName;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// CtiSync command-line catalog tools.
#[derive(Parser)]
#[command(name = "ctisync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Base URL of the content catalog API
    #[arg(global = true, short, long)]
    url: Option<String>,

    /// Catalog context to pull from
    #[arg(global = true, long)]
    context: Option<String>,

    /// Consumer name within the context
    #[arg(global = true, long)]
    consumer: Option<String>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one synchronization pass against the catalog
    Sync {
        /// Change records fetched per page
        #[arg(long)]
        page_size: Option<u64>,

        /// Request empty change records too
        #[arg(long)]
        with_empties: bool,

        /// Directory for snapshot staging (defaults to a tempdir)
        #[arg(short, long)]
        working_dir: Option<PathBuf>,

        /// Request timeout in seconds
        #[arg(short, long)]
        timeout_secs: Option<u64>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show the remote consumer record
    Status {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Synchronize, then compute the promotion diff for a space
    Preview {
        /// Source space to diff against its promotion target
        #[arg(short, long, default_value = "draft")]
        space: SpaceName,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Synchronize, then promote a space into its target
    Promote {
        /// Source space to promote
        #[arg(short, long, default_value = "draft")]
        space: SpaceName,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Print the canonical content hash of a JSON document
    Hash {
        /// Path to the JSON file to hash
        file: PathBuf,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let catalog = CatalogFlags {
        url: cli.url,
        context: cli.context,
        consumer: cli.consumer,
    };

    match cli.command {
        Commands::Sync {
            page_size,
            with_empties,
            working_dir,
            timeout_secs,
            format,
        } => {
            let mut config = catalog.into_config()?;
            if let Some(size) = page_size {
                config = config.with_page_size(size);
            }
            if with_empties {
                config = config.with_empties(true);
            }
            if let Some(dir) = working_dir {
                config = config.with_working_dir(dir);
            }
            if let Some(secs) = timeout_secs {
                config = config.with_timeout(Duration::from_secs(secs));
            }
            commands::sync::run(config, &format)?;
        }
        Commands::Status { format } => {
            commands::status::run(catalog.into_config()?, &format)?;
        }
        Commands::Preview { space, format } => {
            commands::preview::run(catalog.into_config()?, space, &format)?;
        }
        Commands::Promote { space, format } => {
            commands::promote::run(catalog.into_config()?, space, &format)?;
        }
        Commands::Hash { file, format } => {
            commands::hash::run(&file, &format)?;
        }
        Commands::Version => {
            println!("CtiSync CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

/// The global catalog flags, resolved into an engine config on demand.
struct CatalogFlags {
    url: Option<String>,
    context: Option<String>,
    consumer: Option<String>,
}

impl CatalogFlags {
    fn into_config(self) -> Result<SyncConfig, Box<dyn std::error::Error>> {
        let url = self.url.ok_or("Catalog URL required (--url)")?;
        let context = self.context.ok_or("Catalog context required (--context)")?;
        let consumer = self.consumer.ok_or("Consumer name required (--consumer)")?;
        Ok(SyncConfig::new(context, consumer, url))
    }
}
