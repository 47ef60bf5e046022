use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use canon_interpreter::{
    CanonLibrary, EngineConfig, InterpretationRuntime, InterpreterTelemetry, OutputMode, PhaseId,
    SharedCanonStore,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use shared_logging::LogLevel;

#[derive(Parser, Debug)]
#[command(name = "readlaw", version, about = "Phased canon interpretation of legal text")]
struct Cli {
    /// Rule source JSON; `-` reads stdin. Defaults to the bundled canons.
    #[arg(long, global = true)]
    canons: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Evaluates a claim against a rule text.
    Interpret(InterpretArgs),
    /// Loads the rule source and reports per-phase canon counts.
    Validate,
    /// Lists canons.
    Canons {
        /// Restrict to one phase (`phase_0` .. `phase_3`).
        #[arg(long)]
        phase: Option<String>,
        /// Emit JSON instead of a table.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Parser, Debug)]
struct InterpretArgs {
    #[arg(long)]
    claim: String,
    #[arg(long)]
    rule_text: String,
    /// `json`, `summary` or `detailed`.
    #[arg(long, default_value = "json")]
    mode: String,
    /// Engine settings (TOML).
    #[arg(long)]
    config: Option<PathBuf>,
    /// JSON-lines telemetry file.
    #[arg(long)]
    log_path: Option<PathBuf>,
    /// Minimum severity written to the telemetry file.
    #[arg(long, default_value = "info")]
    log_level: LogLevel,
}

#[derive(Debug, Serialize)]
struct CanonRow<'a> {
    phase: PhaseId,
    name: &'a str,
    trigger: &'static str,
    keywords: Vec<&'a str>,
    weight: f64,
    adjust: f64,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Interpret(args) => handle_interpret(cli.canons.as_deref(), args),
        Commands::Validate => {
            let library = load_library(cli.canons.as_deref())?;
            for (phase, canons) in library.iter() {
                println!("{phase} | {} canons", canons.len());
            }
            println!("total | {} canons", library.canon_count());
            Ok(())
        }
        Commands::Canons { phase, json } => {
            let library = load_library(cli.canons.as_deref())?;
            let filter = phase
                .map(|label| label.parse::<PhaseId>())
                .transpose()?;
            let rows = canon_rows(&library, filter);
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in rows {
                    println!(
                        "{} | {} | {} {:?} | weight {} | adjust {}",
                        row.phase, row.name, row.trigger, row.keywords, row.weight, row.adjust
                    );
                }
            }
            Ok(())
        }
    }
}

fn handle_interpret(canons: Option<&Path>, args: InterpretArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => EngineConfig::load(path)
            .with_context(|| format!("loading engine config {}", path.display()))?,
        None => EngineConfig::default(),
    };
    let store = match canons {
        Some(path) if path != Path::new("-") => SharedCanonStore::open(path)
            .with_context(|| format!("loading canons from {}", path.display()))?,
        other => SharedCanonStore::new(load_library(other)?),
    };
    let telemetry = match &args.log_path {
        Some(path) => Some(
            InterpreterTelemetry::builder("readlaw")
                .log_path(path)
                .min_level(args.log_level)
                .build()?,
        ),
        None => None,
    };
    let runtime = InterpretationRuntime::new(store, config, telemetry)?;
    let mode: OutputMode = args.mode.parse()?;
    let output = runtime.interpret(&args.claim, &args.rule_text, mode);
    println!("{}", output.to_pretty_string()?);
    Ok(())
}

fn load_library(canons: Option<&Path>) -> Result<CanonLibrary> {
    match canons {
        None => CanonLibrary::reference().context("loading bundled canons"),
        Some(path) if path == Path::new("-") => {
            CanonLibrary::from_reader(io::stdin().lock()).context("reading canons from stdin")
        }
        Some(path) => CanonLibrary::load(path)
            .with_context(|| format!("loading canons from {}", path.display())),
    }
}

fn canon_rows(library: &CanonLibrary, only: Option<PhaseId>) -> Vec<CanonRow<'_>> {
    library
        .iter()
        .filter(|(phase, _)| only.map_or(true, |wanted| wanted == *phase))
        .flat_map(|(phase, canons)| {
            canons.iter().map(move |canon| CanonRow {
                phase,
                name: &canon.name,
                trigger: canon.trigger.kind(),
                keywords: canon
                    .trigger
                    .keywords()
                    .map(|set| set.iter().map(String::as_str).collect())
                    .unwrap_or_default(),
                weight: canon.weight,
                adjust: canon.adjust,
            })
        })
        .collect()
}
