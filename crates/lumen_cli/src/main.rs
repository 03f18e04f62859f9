//! Lumen CLI
//!
//! List, render, and run Lumen components from the terminal.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lumen_cn::prelude::*;
use lumen_core::{shared_gate, AttributeMap, ReadinessGate, WidgetEvent, ANY_EVENT, FRAMEWORK_GATE};
use tokio::sync::mpsc;
use tracing::{debug, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Config file picked up from the working directory when `--config` is absent
const DEFAULT_CONFIG_FILE: &str = "lumen.toml";

#[derive(Parser)]
#[command(name = "lumen")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Lumen component library CLI", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file (defaults to ./lumen.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Simulate a reactive framework that finishes loading after this many ms
    #[arg(long, global = true)]
    framework_delay_ms: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered components and their observed attributes
    List,

    /// Render a component once and print its markup
    Render {
        /// Component tag (e.g. lumen-badge)
        tag: String,

        /// Attribute as name=value (repeatable; `name` alone sets a flag)
        #[arg(short, long = "attr", value_parser = parse_attribute)]
        attributes: Vec<(String, String)>,
    },

    /// Run a live countdown in the terminal
    Countdown {
        /// Length in seconds
        #[arg(short, long, conflicts_with = "target")]
        duration: Option<u64>,

        /// Target instant (RFC 3339, YYYY-MM-DD[THH:MM:SS] UTC, or unix seconds)
        #[arg(short, long)]
        target: Option<String>,

        /// Units to display (e.g. hours,minutes,seconds)
        #[arg(short, long)]
        format: Option<String>,

        /// Text printed once time runs out
        #[arg(short, long)]
        expired: Option<String>,

        /// Pad numerals to two digits
        #[arg(long)]
        pad: bool,

        /// Stop after this many frames
        #[arg(long)]
        ticks: Option<u64>,
    },

    /// Print the effective configuration as TOML
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    let config = load_config(cli.config.as_deref())?;
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .context("Failed to start the async runtime")?;

    let options = host_options(&config, cli.framework_delay_ms);

    match cli.command {
        Commands::List => cmd_list(),

        Commands::Render { tag, attributes } => {
            let markup = runtime.block_on(render_component(
                &tag,
                AttributeMap::from_pairs(attributes),
                &options,
            ))?;
            println!("{}", markup);
            Ok(())
        }

        Commands::Countdown {
            duration,
            target,
            format,
            expired,
            pad,
            ticks,
        } => {
            let mut attrs = AttributeMap::new();
            match (duration, target) {
                (Some(duration), _) => {
                    attrs.set("duration", duration.to_string());
                }
                (None, Some(target)) => {
                    attrs.set("target", target);
                }
                (None, None) => anyhow::bail!("Pass either --duration or --target"),
            }
            if let Some(format) = format {
                attrs.set("format", format);
            }
            if let Some(expired) = expired {
                attrs.set("expired", expired);
            }
            if pad {
                attrs.set("pad", "");
            }

            let mut stdout = std::io::stdout();
            runtime.block_on(run_countdown(attrs, &config, &options, ticks, &mut stdout))
        }

        Commands::Config => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

/// Load `path`, or `./lumen.toml` when present, or the defaults
fn load_config(path: Option<&Path>) -> Result<LumenConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => {
            let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !fallback.exists() {
                debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                return Ok(LumenConfig::default());
            }
            fallback
        }
    };

    let config = LumenConfig::load(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    debug!("Loaded configuration from {}", path.display());
    Ok(config)
}

/// Parse `name=value`; a bare `name` is a boolean flag
fn parse_attribute(raw: &str) -> std::result::Result<(String, String), String> {
    let (name, value) = raw.split_once('=').unwrap_or((raw, ""));
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("attribute '{}' has no name", raw));
    }
    Ok((name.to_string(), value.to_string()))
}

fn host_options(config: &LumenConfig, framework_delay_ms: Option<u64>) -> HostOptions {
    let mut options = HostOptions::new(config.clone());
    if let Some(delay) = framework_delay_ms {
        let readiness = config.readiness.clone();
        options = options.gate(shared_gate(FRAMEWORK_GATE, move || {
            let loaded_at = std::time::Instant::now() + Duration::from_millis(delay);
            ReadinessGate::with_config(
                move || (std::time::Instant::now() >= loaded_at).then(|| "simulated".to_string()),
                &readiness,
            )
        }));
    }
    options
}

fn cmd_list() -> Result<()> {
    let registry = ComponentRegistry::with_defaults();
    for tag in registry.tags() {
        let observed = registry.observed_attributes(tag).unwrap_or_default();
        println!("<{}>", tag);
        println!("  attributes: {}", observed.join(", "));
    }
    Ok(())
}

async fn render_component(tag: &str, attrs: AttributeMap, options: &HostOptions) -> Result<String> {
    let registry = ComponentRegistry::with_defaults();
    let element = registry
        .create(tag, attrs, options)
        .with_context(|| format!("Cannot render <{}>", tag))?;

    element.attach().await;
    let markup = element.markup();
    element.detach();
    Ok(markup)
}

/// Drive a countdown until it completes or `max_frames` frames were printed
async fn run_countdown(
    attrs: AttributeMap,
    config: &LumenConfig,
    options: &HostOptions,
    max_frames: Option<u64>,
    out: &mut impl std::io::Write,
) -> Result<()> {
    let widget = Countdown::new().tick_interval(config.countdown.tick_interval());
    let mut builder = Element::builder(widget)
        .attributes(attrs)
        .attribute("autostart", "")
        .config(config);
    if let Some(gate) = &options.gate {
        builder = builder.gate(gate.clone());
    }
    let element = builder.build();

    let (tx, mut events) = mpsc::unbounded_channel::<(String, String)>();
    element.add_event_listener(ANY_EVENT, move |event: &WidgetEvent| {
        let _ = tx.send((event.name.clone(), event.detail.to_string()));
    });

    info!("Waiting for framework readiness");
    element.attach().await;

    let frame_period = config.countdown.tick_interval();
    let mut frames = tokio::time::interval(frame_period);
    let mut printed = 0u64;
    loop {
        tokio::select! {
            Some((name, detail)) = events.recv() => {
                info!("{} {}", name, detail);
                if name == "completed" {
                    writeln!(out, "{}", element.with_widget(Countdown::text))?;
                    break;
                }
            }
            _ = frames.tick() => {
                writeln!(out, "{}", element.with_widget(Countdown::text))?;
                printed += 1;
                if max_frames.is_some_and(|max| printed >= max) {
                    info!("Stopped after {} frames", printed);
                    break;
                }
            }
        }
    }

    element.detach();
    Ok(())
}
