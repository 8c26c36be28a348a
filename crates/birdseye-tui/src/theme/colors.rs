use ratatui::style::Color;

pub const FOCUSED_BORDER: Color = Color::Cyan;
pub const UNFOCUSED_BORDER: Color = Color::White;
pub const SELECTED_BG: Color = Color::Blue;

pub const NORMAL_TEXT: Color = Color::White;
pub const LABEL_TEXT: Color = Color::DarkGray;
pub const HIGHLIGHT_TEXT: Color = Color::Yellow;

pub const DRAG_GHOST: Color = Color::Green;
pub const CLOSED_LANE: Color = Color::DarkGray;

pub const CODE_TEXT: Color = Color::Yellow;
pub const CODE_BG: Color = Color::DarkGray;
pub const LINK_TEXT: Color = Color::Cyan;

pub const TOOLBAR_ACTIVE: Color = Color::Green;
pub const TOOLBAR_DISABLED: Color = Color::DarkGray;

pub const POPUP_BG: Color = Color::Black;
pub const ERROR_COLOR: Color = Color::Red;
