//! nk-games - generate NK game tables from an experiment configuration

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use nkgames_cli::{build_table, write_table, ExperimentConfig, OutputFormat};

#[derive(Parser, Debug)]
#[command(name = "nk-games")]
#[command(about = "Generate cooperative-game value tables over NK landscapes")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one experiment and write its game table
    Run {
        /// Experiment configuration (YAML)
        #[arg(long, default_value = "config/lazer2007_baseline.yml")]
        config: PathBuf,

        /// Output path; overrides `output.path`
        #[arg(long)]
        output: Option<PathBuf>,

        /// Largest coalition size; overrides `game_table.max_coalition_size`
        #[arg(long = "max-size")]
        max_size: Option<usize>,

        #[arg(long, value_enum, default_value_t = OutputFormat::Csv)]
        format: OutputFormat,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nkgames_cli=info,nkgames_tables=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Run {
            config,
            output,
            max_size,
            format,
        } => {
            tracing::info!(
                version = nkgames_common::VERSION,
                config = %config.display(),
                "Loading experiment"
            );
            let experiment = ExperimentConfig::load(&config)?.validate()?;
            let table = build_table(&experiment, max_size)?;
            let path = output.unwrap_or_else(|| experiment.output_path.clone());
            write_table(&table, &path, format)?;
            println!("Saved {} coalition rows to {}", table.len(), path.display());
        }
    }
    Ok(())
}
