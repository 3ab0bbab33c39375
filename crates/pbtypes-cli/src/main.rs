mod commands;
mod reader;

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    name = "pbtypes",
    version,
    about = "Generate TypeScript declarations from PocketBase collection snapshots"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate pocketbase-types.ts once
    Generate {
        /// Snapshot file, directory of *.json exports, or project directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output directory (overrides output_dir from the config file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to pbtypes.config.yaml
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Regenerate whenever the snapshot changes
    Watch {
        /// Snapshot file, directory of *.json exports, or project directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Output directory (overrides output_dir from the config file)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Path to pbtypes.config.yaml
        #[arg(long)]
        config: Option<PathBuf>,

        /// Skip the initial pass
        #[arg(long)]
        no_startup: bool,
    },

    /// Resolve an expand expression against a snapshot
    Expand {
        /// Snapshot file or directory of *.json exports
        snapshot: PathBuf,

        /// Collection the expand starts from
        collection: String,

        /// Expand expression, e.g. "app.default_branch,app_builds_via_app"
        expr: String,

        /// Output format: ts (default) or json
        #[arg(long, default_value = "ts")]
        format: String,
    },

    /// Render the collection relation graph
    Analyze {
        /// Snapshot file, directory of *.json exports, or project directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Path to pbtypes.config.yaml
        #[arg(long)]
        config: Option<PathBuf>,

        /// Output format: mermaid (default) or dot
        #[arg(long, default_value = "mermaid")]
        format: String,
    },
}

fn main() {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pbtypes=info,pbtypes_core=info".into()),
        )
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            path,
            output,
            config,
        } => commands::generate::run_generate(&path, output.as_deref(), config.as_deref()),
        Commands::Watch {
            path,
            output,
            config,
            no_startup,
        } => commands::watch::run_watch(&path, output.as_deref(), config.as_deref(), no_startup),
        Commands::Expand {
            snapshot,
            collection,
            expr,
            format,
        } => commands::expand::run_expand(&snapshot, &collection, &expr, &format),
        Commands::Analyze {
            path,
            config,
            format,
        } => commands::analyze::run_analyze(&path, config.as_deref(), &format),
    };

    match result {
        Ok(output) => {
            println!("{output}");
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
