use std::io::Write;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tapguard_replay::{config, logging, Replayer, Scene};

/// Replay a touch/click trace through the tap recognizer and clickbuster.
#[derive(Debug, Parser)]
#[command(name = "tapguard-replay", version)]
struct Cli {
    /// Scene file (YAML): element tree + event trace.
    #[arg(long)]
    scene: PathBuf,

    /// Tuning overrides (YAML). Defaults to the user config, then built-ins.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only print the final summary.
    #[arg(long)]
    summary_only: bool,

    /// Debug logging on stderr.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::setup(cli.verbose);

    let config = config::resolve(cli.config.as_deref())?;
    let content = std::fs::read_to_string(&cli.scene)
        .with_context(|| format!("failed to read scene {}", cli.scene.display()))?;
    let scene = Scene::from_yaml_str(&content)
        .with_context(|| format!("failed to parse scene {}", cli.scene.display()))?;

    let report = Replayer::new(scene, config)?.run()?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    if !cli.summary_only {
        for step in &report.steps {
            writeln!(out, "{}", serde_json::to_string(step)?)?;
        }
    }
    writeln!(
        out,
        "{}",
        serde_json::to_string(&serde_json::json!({ "summary": report.summary }))?
    )?;
    Ok(())
}
