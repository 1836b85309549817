use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use delivery_tracker::badge::{summary_text, BadgeStyle};
use delivery_tracker::config::TrackerConfig;
use delivery_tracker::navigation::JsonLinesNavigator;
use delivery_tracker::picking::{build_tracker_lines, PickingSnapshot};
use delivery_tracker::store::ViewStateStore;
use delivery_tracker::view_state::{ExpandState, ViewStateController};
use delivery_tracker::{normalize, normalize_text, DeliveryTracker, NormalizedModel};

/// Inspect delivery tracker payloads the way the order form widget sees them
#[derive(Parser)]
#[command(name = "delivery-tracker", version)]
struct Cli {
    /// Config file (defaults to ~/.config/delivery-tracker/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the normalized model of a payload
    Normalize {
        /// Payload file, or `-` for stdin
        input: Option<PathBuf>,
    },
    /// Print the summary counts of a payload
    Summary {
        input: Option<PathBuf>,
        /// Print the badge status line instead of JSON
        #[arg(long)]
        text: bool,
    },
    /// Classify a badge status line
    Badge { text: String },
    /// List the rows of a payload with the stored expand state of a record
    Show {
        #[arg(long)]
        record: String,
        input: Option<PathBuf>,
    },
    /// Expand or collapse a line of a record
    Toggle {
        #[arg(long)]
        record: String,
        id: i64,
    },
    /// Emit the navigation request for a line
    Open {
        id: i64,
        input: Option<PathBuf>,
    },
    /// Build the payload from a picking snapshot
    Build {
        snapshot: Option<PathBuf>,
        /// Print the badge status line instead of the payload
        #[arg(long)]
        summary: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let config = TrackerConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    let mut stdout = io::stdout().lock();

    match cli.command {
        Command::Normalize { input } => {
            let model = read_payload(input.as_deref())?;
            serde_json::to_writer_pretty(&mut stdout, &model)?;
            writeln!(stdout)?;
        }
        Command::Summary { input, text } => {
            let model = read_payload(input.as_deref())?;
            if text {
                writeln!(stdout, "{}", summary_text(&model.summary))?;
            } else {
                serde_json::to_writer(&mut stdout, &model.summary)?;
                writeln!(stdout)?;
            }
        }
        Command::Badge { text } => {
            let style = BadgeStyle::classify(&text, &config.empty_summary_text);
            writeln!(stdout, "{} {}", style.class(), style.icon())?;
        }
        Command::Show { record, input } => {
            let model = read_payload(input.as_deref())?;
            let state = ViewStateStore::new(&config.state_dir)
                .read()
                .context("Failed to read view state")?
                .record(&record);
            let tracker = DeliveryTracker::from_model(model, state);

            for row in tracker.rows() {
                let marker = if row.expanded { "v" } else { ">" };
                let id = row.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string());
                let name = row.fields.get("name").and_then(|v| v.as_str()).unwrap_or("");
                writeln!(
                    stdout,
                    "{} {} {} {} {} [{}] {}",
                    marker,
                    id,
                    row.icon,
                    row.type_label,
                    row.state,
                    row.progress_class,
                    name
                )?;
            }
            writeln!(stdout, "{}", summary_text(tracker.summary()))?;
        }
        Command::Toggle { record, id } => {
            let store = ViewStateStore::new(&config.state_dir);
            let expanded = store
                .update(|state| {
                    let mut controller = ViewStateController::from_state(state.record(&record));
                    let expanded = controller.toggle(id);
                    state.records.insert(record.clone(), controller.into_state());
                    expanded
                })
                .context("Failed to update view state")?;
            tracing::info!("{} line {} expanded={}", record, id, expanded);
            writeln!(stdout, "{}", if expanded { "expanded" } else { "collapsed" })?;
        }
        Command::Open { id, input } => {
            let model = read_payload(input.as_deref())?;
            let tracker = DeliveryTracker::from_model(model, ExpandState::default())
                .with_record_model(config.record_model.clone());

            let navigator = JsonLinesNavigator::new(&mut stdout);
            if !tracker.activate(id, &navigator) {
                anyhow::bail!("No delivery line with id {}", id);
            }
        }
        Command::Build { snapshot, summary } => {
            let content = read_input(snapshot.as_deref())?;
            let snapshot =
                PickingSnapshot::from_json(&content).context("Failed to parse picking snapshot")?;
            let lines = build_tracker_lines(&snapshot, chrono::Local::now().naive_local());
            let payload = serde_json::to_value(&lines)?;

            if summary {
                writeln!(stdout, "{}", summary_text(&normalize(&payload).summary))?;
            } else {
                serde_json::to_writer(&mut stdout, &payload)?;
                writeln!(stdout)?;
            }
        }
    }

    Ok(())
}

/// Read a file, or stdin for `None` / `-`
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {:?}", path)),
        _ => {
            let mut content = String::new();
            io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read stdin")?;
            Ok(content)
        }
    }
}

fn read_payload(path: Option<&Path>) -> Result<NormalizedModel> {
    let content = read_input(path)?;
    Ok(normalize_text(content.trim()))
}
