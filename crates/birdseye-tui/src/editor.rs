use crate::events::EventHandler;
use birdseye_domain::ItemId;
use birdseye_richtext::Document;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

fn which_editor() -> String {
    let editors = if cfg!(target_os = "windows") {
        vec!["nvim", "vim", "nano", "notepad"]
    } else {
        vec!["nvim", "vim", "nano", "vi"]
    };

    let which_cmd = if cfg!(target_os = "windows") {
        "where"
    } else {
        "which"
    };

    for editor in &editors {
        if Command::new(which_cmd)
            .arg(editor)
            .output()
            .map(|output| output.status.success())
            .unwrap_or(false)
        {
            return editor.to_string();
        }
    }

    if cfg!(target_os = "windows") {
        "notepad".to_string()
    } else {
        "vi".to_string()
    }
}

/// Scratch file for editing one card's description.
pub fn description_file(item_id: ItemId) -> PathBuf {
    std::env::temp_dir().join(format!("birdseye-card-{}.md", item_id))
}

/// Stored HTML as the markdown shown in the editor.
pub fn description_markdown(html: &str) -> String {
    Document::from_html(html).to_markdown()
}

/// Runs `editor` on `file` seeded with `initial_content`. Returns the edited
/// text, or `None` when the editor exits unsuccessfully.
pub fn run_editor(editor: &str, file: &Path, initial_content: &str) -> io::Result<Option<String>> {
    std::fs::write(file, initial_content)?;

    let status = Command::new(editor).arg(file).status().map_err(|e| {
        tracing::error!("Failed to launch editor '{}': {}", editor, e);
        io::Error::new(
            io::ErrorKind::NotFound,
            format!(
                "Editor '{}' not found. Please set $EDITOR environment variable.",
                editor
            ),
        )
    });

    let result = match status {
        Ok(status) if status.success() => Ok(Some(std::fs::read_to_string(file)?)),
        Ok(status) => {
            tracing::info!("Editor exited with {}, discarding changes", status);
            Ok(None)
        }
        Err(e) => Err(e),
    };

    if let Err(e) = std::fs::remove_file(file) {
        tracing::debug!("Could not remove {}: {}", file.display(), e);
    }

    result
}

/// Suspends the terminal board, runs `$EDITOR` (or the first editor found),
/// then restores the board.
pub fn edit_in_external_editor(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    event_handler: &EventHandler,
    temp_file: &Path,
    initial_content: &str,
) -> io::Result<Option<String>> {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| which_editor());

    event_handler.stop();

    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    io::stdout().flush()?;

    let result = run_editor(&editor, temp_file, initial_content);

    while crossterm::event::poll(std::time::Duration::from_millis(0))? {
        let _ = crossterm::event::read()?;
    }

    execute!(io::stdout(), EnterAlternateScreen)?;
    enable_raw_mode()?;
    terminal.clear()?;

    result
}
