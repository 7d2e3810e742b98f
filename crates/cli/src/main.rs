// ABOUTME: CLI for running a storefront grid converter over an HTML page offline.
// ABOUTME: Scans at a viewport width, replays resizes and clicks, and prints HTML or a JSON report.

use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Instant;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use dom_query::{Document, NodeId};
use serde::Serialize;
use storefront_carousel::{
    presets, ClickOutcome, ConverterConfig, GridConverter, InstanceSummary, ScanReport,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Convert storefront grids into carousels and print the result.
#[derive(Parser, Debug)]
#[command(name = "carousel")]
#[command(about = "Run a grid-to-carousel converter over an HTML page", long_about = None)]
struct Args {
    /// HTML file to convert. Use "-" to read from stdin.
    #[arg(long)]
    html: String,

    /// Built-in converter preset (articles, products).
    #[arg(long, default_value = "articles", conflicts_with = "config")]
    preset: String,

    /// JSON converter config file, used instead of a preset.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Viewport width for the initial scan, in pixels.
    #[arg(long, default_value_t = 1300)]
    width: u32,

    /// Resize the viewport after the scan. Repeatable; each resize settles before the next.
    #[arg(long = "resize", value_name = "PX")]
    resizes: Vec<u32>,

    /// Click a control of the first carousel: prev, next or bullet:N. Repeatable.
    #[arg(long = "click", value_name = "TARGET")]
    clicks: Vec<ClickTarget>,

    /// Print a JSON report instead of the converted HTML.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Write output to a file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ClickTarget {
    Prev,
    Next,
    Bullet(usize),
}

impl FromStr for ClickTarget {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "prev" => Ok(ClickTarget::Prev),
            "next" => Ok(ClickTarget::Next),
            other => other
                .strip_prefix("bullet:")
                .and_then(|n| n.parse().ok())
                .map(ClickTarget::Bullet)
                .ok_or_else(|| format!("expected prev, next or bullet:N, got {other:?}")),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResizeStep {
    width: u32,
    report: Option<ScanReport>,
}

#[derive(Debug, Serialize)]
struct ClickStep {
    target: String,
    outcome: ClickOutcome,
}

#[derive(Debug, Serialize)]
struct Report {
    converter: String,
    width: u32,
    scan: ScanReport,
    resizes: Vec<ResizeStep>,
    clicks: Vec<ClickStep>,
    instances: Vec<InstanceSummary>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let config = load_config(&args)?;
    let html = load_html(&args.html)?;
    let doc = Document::from(html);
    let mut converter = GridConverter::builder(config).build()?;

    let scan = converter.scan(&doc, args.width);
    converter.settle(&doc);
    debug!(width = args.width, ?scan, "initial scan");

    let mut resizes = Vec::new();
    for &width in &args.resizes {
        converter.on_resize(&doc, width, Instant::now());
        let report = converter.settle(&doc);
        resizes.push(ResizeStep { width, report });
    }

    let mut clicks = Vec::new();
    for target in &args.clicks {
        let outcome = match click_node(&converter, *target) {
            Some(node) => converter.handle_click(&doc, node),
            None => ClickOutcome::NotHandled,
        };
        clicks.push(ClickStep {
            target: describe(*target),
            outcome,
        });
    }

    let output = if args.json {
        let report = Report {
            converter: converter.config().name.clone(),
            width: converter.width(),
            scan,
            resizes,
            clicks,
            instances: converter.summaries(),
        };
        serde_json::to_string_pretty(&report)?
    } else {
        doc.html().to_string()
    };

    match &args.output {
        Some(path) => fs::write(path, output + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{}", output),
    }

    Ok(())
}

fn load_config(args: &Args) -> Result<ConverterConfig> {
    if let Some(path) = &args.config {
        let json = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        return Ok(ConverterConfig::from_json(&json)?);
    }
    let available = presets::preset_names()?.join(", ");
    presets::preset(&args.preset)
        .with_context(|| format!("no preset {:?} (available: {})", args.preset, available))
}

fn load_html(target: &str) -> Result<String> {
    if target == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        return Ok(buf);
    }

    let path = PathBuf::from(target);
    if !path.exists() {
        return Err(anyhow!("file not found: {}", target));
    }
    let html = fs::read_to_string(&path)?;
    if html.trim().is_empty() {
        bail!("empty html input: {}", target);
    }
    Ok(html)
}

/// The node a click on `target` lands on, in the first live carousel.
fn click_node(converter: &GridConverter, target: ClickTarget) -> Option<NodeId> {
    let instance = converter.registry().all().next()?;
    match target {
        ClickTarget::Prev => Some(instance.prev_control()),
        ClickTarget::Next => Some(instance.next_control()),
        ClickTarget::Bullet(n) => instance.bullets().get(n).copied(),
    }
}

fn describe(target: ClickTarget) -> String {
    match target {
        ClickTarget::Prev => "prev".to_string(),
        ClickTarget::Next => "next".to_string(),
        ClickTarget::Bullet(n) => format!("bullet:{n}"),
    }
}
