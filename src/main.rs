use clap::{Parser, Subcommand};
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;

use results_board::models::Office;
use results_board::{Environment, RenderConfig, Renderer, SqliteStore};

#[derive(Parser)]
#[command(name = "results-board", about = "Render election results into static JSON files")]
struct Cli {
    /// Write files here instead of the configured output directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    task: Option<Task>,
}

#[derive(Subcommand)]
enum Task {
    /// Wipe the output directory and render everything
    All,
    TopLevel,
    Senate,
    House,
    Governor,
    BallotMeasures,
    States,
    /// Render a single state file
    State { statepostal: String },
    Counties,
}

async fn run(cli: Cli, target: Environment) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut config = RenderConfig::load(target)?;
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    info!(
        "Rendering for {} from {} with {} workers",
        target.label(),
        config.database_url,
        config.workers
    );

    let store = SqliteStore::open(&config.database_url, config.workers as u32).await?;
    let renderer = Renderer::new(Arc::new(store), Arc::new(config));

    match cli.task.unwrap_or(Task::All) {
        Task::All => renderer.render_all().await?,
        Task::TopLevel => {
            renderer.render_top_level().await?;
        }
        Task::Senate => {
            renderer.render_board(Office::Senate).await?;
        }
        Task::House => {
            renderer.render_board(Office::House).await?;
        }
        Task::Governor => {
            renderer.render_board(Office::Governor).await?;
        }
        Task::BallotMeasures => {
            renderer.render_board(Office::BallotMeasures).await?;
        }
        Task::States => renderer.render_states().await?,
        Task::State { statepostal } => {
            renderer.render_state(&statepostal.to_uppercase()).await?;
        }
        Task::Counties => renderer.render_counties().await?,
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let target = match Environment::from_env() {
        Ok(target) => target,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(2);
        }
    };

    // RUST_LOG wins over the per-environment default
    env_logger::Builder::new()
        .filter_level(target.log_level())
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli, target).await {
        error!("Render failed: {}", e);
        std::process::exit(1);
    }
}
