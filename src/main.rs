use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use envdiagram::config::DiagramSettings;
use envdiagram::diagram::DiagramBuilder;
use envdiagram::scene::DisplayMode;
use envdiagram::snapshot::load_snapshot;

#[derive(Debug, Parser)]
#[command(name = "envdiagram", about = "Environment-model diagram renderer")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Render a runtime snapshot to a draw batch.
    Render {
        /// Snapshot file (.json, .yaml, or .yml).
        snapshot: PathBuf,
        /// Render with all labels visible, for export.
        #[arg(long)]
        printable: bool,
        /// Write the batch here instead of stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    init_tracing()?;

    let cli = Cli::parse();
    let settings = DiagramSettings::from_env().context("failed to load configuration")?;

    match cli.command {
        Commands::Render {
            snapshot,
            printable,
            output,
        } => run_render(&settings, &snapshot, printable, output.as_deref())?,
    }

    Ok(())
}

fn run_render(
    settings: &DiagramSettings,
    snapshot_path: &std::path::Path,
    printable: bool,
    output: Option<&std::path::Path>,
) -> Result<()> {
    let snapshot = load_snapshot(snapshot_path)?;
    let builder = DiagramBuilder::build(&snapshot, settings);

    let mode = if printable {
        DisplayMode::Printable
    } else {
        DisplayMode::from(settings.default_display_mode)
    };
    let batch = builder.draw(mode);
    info!(
        elements = batch.elements.len(),
        sequence = batch.sequence,
        ?mode,
        "rendered draw batch"
    );

    let rendered =
        serde_json::to_string_pretty(&batch).context("failed to serialize draw batch")?;
    match output {
        Some(path) => fs::write(path, rendered)
            .with_context(|| format!("failed to write draw batch to `{}`", path.display()))?,
        None => println!("{rendered}"),
    }

    Ok(())
}

fn init_tracing() -> Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,envdiagram=debug"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))
}
