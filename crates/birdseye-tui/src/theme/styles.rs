use super::colors::*;
use ratatui::style::{Modifier, Style};

pub fn focused_border() -> Style {
    Style::default().fg(FOCUSED_BORDER)
}

pub fn unfocused_border() -> Style {
    Style::default().fg(UNFOCUSED_BORDER)
}

pub fn selected_item(focused: bool) -> Style {
    if focused {
        Style::default().bg(SELECTED_BG)
    } else {
        Style::default()
    }
}

pub fn normal_text() -> Style {
    Style::default().fg(NORMAL_TEXT)
}

pub fn label_text() -> Style {
    Style::default().fg(LABEL_TEXT)
}

pub fn highlight_text() -> Style {
    Style::default().fg(HIGHLIGHT_TEXT)
}

pub fn bold_highlight() -> Style {
    Style::default()
        .fg(HIGHLIGHT_TEXT)
        .add_modifier(Modifier::BOLD)
}

/// The card being dragged, drawn at its drop position.
pub fn drag_ghost() -> Style {
    Style::default()
        .fg(DRAG_GHOST)
        .add_modifier(Modifier::BOLD | Modifier::ITALIC)
}

pub fn closed_lane() -> Style {
    Style::default().fg(CLOSED_LANE)
}

pub fn code_text() -> Style {
    Style::default().fg(CODE_TEXT).bg(CODE_BG)
}

pub fn link_text() -> Style {
    Style::default()
        .fg(LINK_TEXT)
        .add_modifier(Modifier::UNDERLINED)
}

pub fn toolbar_item(active: bool, enabled: bool) -> Style {
    match (active, enabled) {
        (_, false) => Style::default().fg(TOOLBAR_DISABLED),
        (true, true) => Style::default()
            .fg(TOOLBAR_ACTIVE)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED),
        (false, true) => normal_text(),
    }
}

pub fn error_text() -> Style {
    Style::default().fg(ERROR_COLOR).add_modifier(Modifier::BOLD)
}

pub fn popup_bg() -> Style {
    Style::default().bg(POPUP_BG)
}
