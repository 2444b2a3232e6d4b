//! Export command line tool
//!
//! Applies a JSON graph update to an empty in-memory graph and prints the
//! exported document graph or corpus tree as pretty JSON on stdout.
//!
//! ## Configuration
//!
//! Environment variables:
//! - `ANNIS_EXPORT_TIMELINE`: `auto`, `always` or `never` (default: auto)
//! - `ANNIS_EXPORT_SEPARATOR`: token separator (default: a single space)
//! - `ANNIS_EXPORT_ID_PREFIX`: prefix of exported node ids (default: `salt:/`)
//! - `RUST_LOG`: Log level filter (default: annis_export=info)
//! - `LOG_FORMAT`: "json" for structured logs, "pretty" for development (default: json)
//!
//! Logs are written to stderr.
//!
//! ## Usage
//!
//! ```bash
//! cargo run --bin annis_export --features cli -- document update.json
//! ```

use std::process::ExitCode;

use tracing::{error, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

use annis_export::{map_corpus_graph, map_document_graph, ExportConfig, GraphUpdate, MemoryGraph};

const USAGE: &str = "usage: annis_export <document|corpus> <update.json>";

/// Initialize the tracing subscriber with JSON or pretty format
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| "annis_export=info".into());

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_current_span(true)
                    .with_span_events(FmtSpan::CLOSE)
                    .flatten_event(true),
            )
            .init();
    }
}

fn run(mode: &str, path: &str) -> Result<String, Box<dyn std::error::Error>> {
    let raw = std::fs::read_to_string(path)?;
    let update: GraphUpdate = serde_json::from_str(&raw)?;

    let mut graph = MemoryGraph::new();
    graph.apply_update(&update)?;
    info!(
        events = update.len(),
        nodes = graph.num_nodes(),
        edges = graph.num_edges(),
        "graph update applied"
    );

    let config = ExportConfig::from_env();
    let json = match mode {
        "document" => serde_json::to_string_pretty(&map_document_graph(&graph, &config)?)?,
        "corpus" => serde_json::to_string_pretty(&map_corpus_graph(&graph, &config)?)?,
        other => return Err(format!("unknown export mode {other:?}\n{USAGE}").into()),
    };
    Ok(json)
}

fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [mode, path] = args.as_slice() else {
        eprintln!("{USAGE}");
        return ExitCode::from(2);
    };

    match run(mode, path) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, path = %path, "export failed");
            ExitCode::FAILURE
        }
    }
}
