use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "birdseye")]
#[command(about = "A swimlane kanban board in the terminal", long_about = None)]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_COMMIT_HASH"), ")"))]
pub struct Cli {
    /// Keep the board in a local JSON file instead of the hosted backend
    #[arg(long, global = true, value_name = "FILE", env = "BIRDSEYE_FILE")]
    pub file: Option<PathBuf>,

    /// Keep the board in memory only; nothing is saved
    #[arg(long, global = true, conflicts_with = "file")]
    pub memory: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the board as swimlanes, columns and cards
    Board {
        /// Only show cards whose name or description contains this text
        #[arg(long)]
        filter: Option<String>,
    },
    /// Swimlane operations
    Swimlane(SwimlaneCommand),
    /// Card operations
    Card(CardCommand),
    /// Archive every card in the completed column
    ArchiveCompleted,
    /// Serve the image proxy and link-preview endpoints
    Serve(ServeArgs),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Args)]
pub struct SwimlaneCommand {
    #[command(subcommand)]
    pub action: SwimlaneAction,
}

#[derive(Subcommand)]
pub enum SwimlaneAction {
    /// Create a swimlane
    Add {
        #[arg(long)]
        name: String,
    },
    /// Rename, open or close a swimlane
    Update(SwimlaneUpdateArgs),
    /// Delete an empty swimlane
    Delete {
        #[arg(long)]
        id: Uuid,
    },
}

#[derive(Args)]
pub struct SwimlaneUpdateArgs {
    #[arg(long)]
    pub id: Uuid,
    #[arg(long)]
    pub name: Option<String>,
    /// Expand (true) or collapse (false) the swimlane
    #[arg(long)]
    pub open: Option<bool>,
}

#[derive(Args)]
pub struct CardCommand {
    #[command(subcommand)]
    pub action: CardAction,
}

#[derive(Subcommand)]
pub enum CardAction {
    /// Add a card to the first column of a swimlane
    Add {
        #[arg(long)]
        swimlane_id: Uuid,
        #[arg(long)]
        name: String,
        /// Description written as markdown
        #[arg(long)]
        description_md: Option<String>,
    },
    /// Show a card with its description as markdown
    Get {
        #[arg(long)]
        id: Uuid,
    },
    /// Rename a card or replace its description
    Update(CardUpdateArgs),
    /// Delete a card
    Delete {
        #[arg(long)]
        id: Uuid,
    },
    /// Move a card within its swimlane
    Move(CardMoveArgs),
}

#[derive(Args)]
pub struct CardUpdateArgs {
    #[arg(long)]
    pub id: Uuid,
    #[arg(long)]
    pub name: Option<String>,
    /// Description written as markdown
    #[arg(long)]
    pub description_md: Option<String>,
}

#[derive(Args)]
pub struct CardMoveArgs {
    #[arg(long)]
    pub id: Uuid,
    /// Destination column
    #[arg(long)]
    pub column_id: Uuid,
    /// Position in the destination column (defaults to the bottom)
    #[arg(long)]
    pub index: Option<usize>,
}

#[derive(Args)]
pub struct ServeArgs {
    /// Address to listen on (defaults to server.bind from the config)
    #[arg(long)]
    pub bind: Option<String>,
    /// Serve images from this directory instead of the storage bucket
    #[arg(long, value_name = "DIR")]
    pub images_dir: Option<PathBuf>,
}
