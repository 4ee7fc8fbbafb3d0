use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use clausegraph_core::AppConfig;
use clausegraph_extraction::load_document;
use clausegraph_reasoning::ContractPipeline;

mod render;

#[derive(Parser, Debug)]
#[command(
    name = "clausegraph",
    version,
    about = "Compile a contract into a clause graph and report structural anomalies"
)]
struct Cli {
    /// Print the full report as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Log pipeline stages and graph statistics to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Skip AI review even when ANTHROPIC_API_KEY is set.
    #[arg(long, global = true)]
    no_ai: bool,

    #[command(subcommand)]
    command: Option<Command>,

    /// Contract text file (.txt).
    file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a contract text file.
    Analyze {
        /// Contract text file (.txt).
        file: PathBuf,
    },
}

impl Cli {
    fn input(&self) -> Option<&PathBuf> {
        match &self.command {
            Some(Command::Analyze { file }) => Some(file),
            None => self.file.as_ref(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let directive = if cli.verbose {
        "clausegraph=debug"
    } else {
        "clausegraph=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(directive.parse()?))
        .with_writer(std::io::stderr)
        .init();

    let Some(path) = cli.input() else {
        bail!("File argument is required");
    };

    let config = AppConfig::from_env();
    let pipeline = if cli.no_ai {
        ContractPipeline::new()
    } else {
        ContractPipeline::from_config(&config)?
    };

    let document = load_document(path)
        .await
        .with_context(|| format!("failed to load {}", path.display()))?;
    let report = pipeline.run(&document).await?;

    info!(
        nodes = report.graph.nodes.len(),
        edges = report.graph.edges.len(),
        anomalies = report.summary.total,
        "Analysis finished"
    );

    if cli.json {
        println!("{}", render::render_json(&report)?);
    } else {
        println!("{}", render::render_text(&report));
    }

    Ok(())
}
