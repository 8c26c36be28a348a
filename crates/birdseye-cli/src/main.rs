mod cli;
mod context;
mod handlers;
mod output;

use std::sync::Arc;

use birdseye_core::AppConfig;
use birdseye_gateway::{DirectoryImageSource, ImageSource, SignedUrlImageSource};
use birdseye_server::AppState;
use birdseye_state::BoardStore;
use birdseye_tui::App;
use clap::{CommandFactory, Parser};
use cli::{Cli, Commands, ServeArgs};
use context::{Backend, CliContext};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    let cli = Cli::parse();
    let config = AppConfig::load();
    let backend = Backend::from_flags(cli.file, cli.memory);

    match cli.command {
        None => {
            let gateway = backend.connect(&config).await?;
            let mut store = BoardStore::new(gateway);
            store.load().await?;
            let mut app = App::new(store);
            app.run().await?;
        }
        Some(Commands::Completions { shell }) => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "birdseye",
                &mut std::io::stdout(),
            );
        }
        Some(Commands::Serve(args)) => serve(&config, args).await?,
        Some(cmd) => {
            if let Err(e) = run_command(&backend, &config, cmd).await {
                output::output_error(&format!("{:#}", e));
            }
        }
    }

    Ok(())
}

fn init_logging() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("BIRDSEYE_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
            )
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
            )
            .init();
    }
    Ok(())
}

async fn run_command(backend: &Backend, config: &AppConfig, cmd: Commands) -> anyhow::Result<()> {
    let gateway = backend.connect(config).await?;
    let mut ctx = CliContext::load(gateway).await?;

    match cmd {
        Commands::Board { filter } => handlers::board::handle_show(&mut ctx, filter).await,
        Commands::ArchiveCompleted => handlers::board::handle_archive_completed(&mut ctx).await,
        Commands::Swimlane(swimlane_cmd) => {
            handlers::swimlane::handle(&mut ctx, swimlane_cmd.action).await
        }
        Commands::Card(card_cmd) => handlers::card::handle(&mut ctx, card_cmd.action).await,
        Commands::Serve(_) | Commands::Completions { .. } => Ok(()),
    }
}

async fn serve(config: &AppConfig, args: ServeArgs) -> anyhow::Result<()> {
    let images: Arc<dyn ImageSource> = match args.images_dir {
        Some(dir) => {
            tracing::info!("Serving images from {}", dir.display());
            Arc::new(DirectoryImageSource::new(dir))
        }
        None => Arc::new(SignedUrlImageSource::from_config(config)?),
    };
    let bind = args.bind.unwrap_or_else(|| config.server.bind.clone());
    birdseye_server::run_server(AppState::new(images), &bind).await
}
