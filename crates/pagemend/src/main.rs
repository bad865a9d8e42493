use anyhow::Context;
use clap::{Parser, Subcommand};
use pagemend::formatter::{format_log, format_summary};
use pagemend::runner::{self, RunOptions};
use pagemend_core::{MemoryDocument, PageRepairAgent};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pagemend", version, about = "Self-healing checks for static download pages")]
struct Args {
    /// Config file (defaults to ./pagemend.yaml, then ~/.pagemend/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the repair agent against a YAML page snapshot
    Check {
        /// Page snapshot to load
        snapshot: PathBuf,

        /// Number of checks to run, including the initial one
        #[arg(long, default_value_t = 1)]
        cycles: u32,

        /// Override the scheduled check interval
        #[arg(long)]
        interval_ms: Option<u64>,

        /// Keep checking on schedule until Ctrl-C
        #[arg(long)]
        watch: bool,

        /// Report a load failure for images with this source (repeatable)
        #[arg(long = "broken-image")]
        broken_images: Vec<String>,

        /// Write the repaired page as HTML
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Print the repair log as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr; stdout carries the repair report.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let mut config = pagemend::config::load(args.config.as_deref())
        .await
        .context("loading configuration")?;

    match args.command {
        Command::Check {
            snapshot,
            cycles,
            interval_ms,
            watch,
            broken_images,
            output,
            json,
        } => {
            if let Some(ms) = interval_ms {
                config.scheduler.interval_ms = ms;
            }
            let yaml = tokio::fs::read_to_string(&snapshot)
                .await
                .with_context(|| format!("reading {}", snapshot.display()))?;
            let mut doc = MemoryDocument::from_yaml(&yaml)
                .with_context(|| format!("loading {}", snapshot.display()))?;

            let tick = Duration::from_millis(config.scheduler.interval_ms.clamp(1, 250));
            let mut agent = PageRepairAgent::new(config);
            let summary = runner::run(
                &mut agent,
                &mut doc,
                &RunOptions {
                    cycles: cycles.max(1),
                    watch,
                    broken_images,
                    tick,
                },
            )
            .await;

            let entries = agent.repair_log();
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                print!("{}", format_log(&entries));
                println!("{}", format_summary(&entries, summary.cycles));
            }

            if let Some(path) = output {
                tokio::fs::write(&path, doc.to_html())
                    .await
                    .with_context(|| format!("writing {}", path.display()))?;
                info!("repaired page written to {}", path.display());
            }
        }
    }

    Ok(())
}
