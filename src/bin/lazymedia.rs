use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "lazymedia", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario JSON against a fresh pipeline and print the report.
    Simulate(SimulateArgs),
    /// Print the URL an image `data-src` resolves to.
    Resolve(ResolveArgs),
    /// Print the default pipeline configuration as JSON.
    Config,
}

#[derive(Parser, Debug)]
struct SimulateArgs {
    /// Input scenario JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Pipeline configuration JSON. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the report here instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct ResolveArgs {
    /// Deferred source as found in `data-src`.
    #[arg(long)]
    src: String,

    /// Pipeline configuration JSON. Defaults are used when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Simulate(args) => cmd_simulate(args),
        Command::Resolve(args) => cmd_resolve(args),
        Command::Config => cmd_config(),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<lazymedia::PipelineConfig> {
    match path {
        Some(p) => lazymedia::PipelineConfig::from_path(p)
            .with_context(|| format!("load config '{}'", p.display())),
        None => Ok(lazymedia::PipelineConfig::default()),
    }
}

fn cmd_simulate(args: SimulateArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    let scenario = lazymedia::scenario::Scenario::from_path(&args.in_path)
        .with_context(|| format!("load scenario '{}'", args.in_path.display()))?;

    let report = lazymedia::scenario::run_scenario(&scenario, cfg)?;
    let json = serde_json::to_string_pretty(&report).context("serialize report")?;

    match args.out {
        Some(out) => {
            if let Some(parent) = out.parent()
                && !parent.as_os_str().is_empty()
            {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("create output dir '{}'", parent.display()))?;
            }
            std::fs::write(&out, json)
                .with_context(|| format!("write report '{}'", out.display()))?;
            eprintln!("wrote {}", out.display());
        }
        None => println!("{json}"),
    }
    Ok(())
}

fn cmd_resolve(args: ResolveArgs) -> anyhow::Result<()> {
    let cfg = load_config(args.config.as_deref())?;
    anyhow::ensure!(!args.src.trim().is_empty(), "--src must be non-empty");
    println!("{}", cfg.resize.rewrite(&args.src));
    Ok(())
}

fn cmd_config() -> anyhow::Result<()> {
    println!("{}", lazymedia::PipelineConfig::default().to_json_pretty()?);
    Ok(())
}
