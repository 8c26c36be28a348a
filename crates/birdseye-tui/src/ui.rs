use crate::app::{App, AppMode, CardDetail};
use crate::components::*;
use crate::drag::{DragState, Slot};
use crate::rich_text::{render_document, toolbar_line};
use crate::theme::*;
use birdseye_domain::{ColumnView, Item, SwimlaneView};
use birdseye_richtext::Document;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

pub fn render(app: &App, frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
        ])
        .split(frame.area());

    render_header(app, frame, chunks[0]);
    match (&app.mode, &app.detail) {
        (AppMode::CardDetail | AppMode::EditLink | AppMode::InsertImage, Some(detail)) => {
            render_card_detail(app, detail, frame, chunks[1])
        }
        _ => render_board(app, frame, chunks[1]),
    }
    render_footer(app, frame, chunks[2]);

    match app.mode {
        AppMode::Filter => render_input_popup(
            frame,
            "Filter",
            "Cards whose name or description contains:",
            &app.input.text(),
            app.input.cursor(),
        ),
        AppMode::AddCard => {
            let lane = app
                .cursor
                .swimlane(app.store.state().view())
                .map(|lane| lane.swimlane.name.clone())
                .unwrap_or_default();
            render_input_popup(
                frame,
                "New Card",
                &format!("Card name (added to {}):", lane),
                &app.input.text(),
                app.input.cursor(),
            )
        }
        AppMode::AddSwimlane => render_input_popup(
            frame,
            "New Swimlane",
            "Swimlane name:",
            &app.input.text(),
            app.input.cursor(),
        ),
        AppMode::RenameSwimlane => render_input_popup(
            frame,
            "Rename Swimlane",
            "New name:",
            &app.input.text(),
            app.input.cursor(),
        ),
        AppMode::RenameCard => render_input_popup(
            frame,
            "Rename Card",
            "New name:",
            &app.input.text(),
            app.input.cursor(),
        ),
        AppMode::EditLink => render_input_popup(
            frame,
            "Link",
            "URL (empty removes the link):",
            &app.input.text(),
            app.input.cursor(),
        ),
        AppMode::InsertImage => render_input_popup(
            frame,
            "Insert Image",
            "Image id in storage:",
            &app.input.text(),
            app.input.cursor(),
        ),
        AppMode::ConfirmDeleteCard => {
            let name = app
                .selected_item()
                .map(|item| item.name.clone())
                .unwrap_or_default();
            render_confirm_popup(
                frame,
                "Delete Card",
                vec![
                    Line::from(vec![
                        Span::raw("Delete "),
                        Span::styled(name, bold_highlight()),
                        Span::raw("?"),
                    ]),
                    Line::default(),
                    Line::from(Span::styled("y: delete   n/ESC: keep", label_text())),
                ],
            )
        }
        AppMode::Help => render_help_popup(frame),
        _ => {}
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let state = app.store.state();
    let mut spans = vec![Span::styled("Bird's Eye View", bold_highlight())];
    if !state.filter().is_empty() {
        spans.push(Span::styled("  filter: ", label_text()));
        spans.push(Span::styled(state.filter().to_string(), highlight_text()));
    }
    let pending = app.store.pending();
    if pending > 0 {
        spans.push(Span::styled(format!("  saving {}…", pending), label_text()));
    }

    let header = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(unfocused_border()),
    );
    frame.render_widget(header, area);
}

fn render_board(app: &App, frame: &mut Frame, area: Rect) {
    let state = app.store.state();
    let view = state.view();

    if view.swimlanes.is_empty() {
        let empty = Paragraph::new(Line::from(Span::styled(
            "No swimlanes yet. Press S to add one.",
            label_text(),
        )))
        .block(Block::default().borders(Borders::ALL).border_style(unfocused_border()));
        frame.render_widget(empty, area);
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(0)])
        .split(area);
    render_column_headers(app, frame, chunks[0]);

    let heights: Vec<u16> = view
        .swimlanes
        .iter()
        .map(|lane| lane_height(lane, app.drag.as_ref()))
        .collect();
    let first = first_visible_lane(&heights, app.cursor.lane, chunks[1].height);

    let mut constraints: Vec<Constraint> = heights[first..]
        .iter()
        .map(|height| Constraint::Length(*height))
        .collect();
    constraints.push(Constraint::Min(0));
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(chunks[1]);

    for (offset, lane) in view.swimlanes[first..].iter().enumerate() {
        let index = first + offset;
        if rows[offset].height == 0 {
            break;
        }
        render_swimlane(app, lane, index, frame, rows[offset]);
    }
}

/// Column names with their board-wide card counts, aligned with the cells
/// of the swimlanes below.
fn render_column_headers(app: &App, frame: &mut Frame, area: Rect) {
    let state = app.store.state();
    let totals = state.column_totals();
    let columns: Vec<_> = state.active_columns().collect();
    let inner = Rect {
        x: area.x + 1,
        width: area.width.saturating_sub(2),
        ..area
    };
    let cells = split_columns(inner, columns.len());
    for (column, cell) in columns.iter().zip(cells.iter()) {
        let count = totals
            .iter()
            .find(|total| total.column_id == column.id)
            .map(|total| total.count)
            .unwrap_or(0);
        let line = Line::from(vec![
            Span::styled(format!(" {}", column.name), bold_highlight()),
            Span::styled(format!(" ({})", count), label_text()),
        ]);
        frame.render_widget(Paragraph::new(line), *cell);
    }
}

fn render_swimlane(app: &App, lane: &SwimlaneView, index: usize, frame: &mut Frame, area: Rect) {
    let focused = app.cursor.lane == index;

    if !lane.swimlane.is_open {
        let line = Line::from(collapsed_lane_spans(lane))
            .style(closed_lane().patch(selected_item(focused)));
        frame.render_widget(Paragraph::new(line), area);
        return;
    }

    let border = if focused {
        focused_border()
    } else {
        unfocused_border()
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(" ▾ {} ", lane.swimlane.name));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let drag = app
        .drag
        .as_ref()
        .filter(|drag| drag.swimlane_id == lane.swimlane.id);
    let cells = split_columns(inner, lane.columns.len());
    for (column, (cell, cell_area)) in lane.columns.iter().zip(cells.iter()).enumerate() {
        let selected = (focused && app.mode == AppMode::Normal && app.cursor.column == column)
            .then_some(app.cursor.card);
        let lines = match drag {
            Some(drag) => drag_lines(drag, column, cell),
            None => cell_lines(cell, selected),
        };
        let mut widget = Paragraph::new(lines);
        if column > 0 {
            widget = widget.block(
                Block::default()
                    .borders(Borders::LEFT)
                    .border_style(label_text()),
            );
        }
        frame.render_widget(widget, *cell_area);
    }
}

/// `▸ Web  Todo 2 · Doing 0 · Done 1`
fn collapsed_lane_spans(lane: &SwimlaneView) -> Vec<Span<'static>> {
    let mut spans = vec![
        Span::raw("▸ "),
        Span::raw(lane.swimlane.name.clone()),
        Span::raw(" "),
    ];
    for (i, cell) in lane.columns.iter().enumerate() {
        let separator = if i == 0 { " " } else { " · " };
        spans.push(Span::styled(separator, label_text()));
        spans.push(Span::styled(
            format!("{} {}", cell.column.name, cell.items.len()),
            label_text(),
        ));
    }
    spans
}

fn cell_lines(cell: &ColumnView, selected: Option<usize>) -> Vec<Line<'static>> {
    cell.items
        .iter()
        .enumerate()
        .flat_map(|(i, item)| card_lines(item, selected_item(selected == Some(i))))
        .collect()
}

fn drag_lines(drag: &DragState, column: usize, cell: &ColumnView) -> Vec<Line<'static>> {
    drag.slots(column, cell)
        .into_iter()
        .flat_map(|slot| match slot {
            Slot::Card(item) => card_lines(item, Style::default()),
            Slot::Ghost => vec![Line::from(Span::styled(
                format!("» {}", drag.name),
                drag_ghost(),
            ))],
        })
        .collect()
}

const PREVIEW_CHARS: usize = 60;

/// The card name, followed by a dimmed line of its description if it has
/// any text.
fn card_lines(item: &Item, style: Style) -> Vec<Line<'static>> {
    let name = Span::styled(format!(" {}", item.name), normal_text());
    let mut lines = vec![Line::from(name).style(style)];
    if let Some(preview) = description_preview(item) {
        let preview = Span::styled(format!("   {}", preview), label_text());
        lines.push(Line::from(preview).style(style));
    }
    lines
}

fn card_height(item: &Item) -> usize {
    1 + description_preview(item).is_some() as usize
}

/// First non-blank line of the description as plain text.
fn description_preview(item: &Item) -> Option<String> {
    if item.description.is_empty() {
        return None;
    }
    let text = Document::from_html(&item.description).plain_text();
    let first = text.lines().map(str::trim).find(|line| !line.is_empty())?;
    let mut preview: String = first.chars().take(PREVIEW_CHARS).collect();
    if first.chars().count() > PREVIEW_CHARS {
        preview.push('…');
    }
    Some(preview)
}

fn render_card_detail(app: &App, detail: &CardDetail, frame: &mut Frame, area: Rect) {
    let state = app.store.state();
    let Some(item) = state.item(detail.item_id) else {
        return;
    };
    let column = state
        .column(item.column_id)
        .map(|column| column.name.as_str())
        .unwrap_or("?");
    let lane = state
        .swimlane(item.swimlane_id)
        .map(|lane| lane.name.as_str())
        .unwrap_or("?");

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let mut title = vec![
        Span::styled(item.name.clone(), bold_highlight()),
        Span::styled(format!("  {} / {}", lane, column), label_text()),
    ];
    if detail.dirty {
        title.push(Span::styled("  (unsaved)", highlight_text()));
    }
    frame.render_widget(
        Paragraph::new(Line::from(title)).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(unfocused_border())
                .title(" Card "),
        ),
        chunks[0],
    );

    frame.render_widget(
        Paragraph::new(toolbar_line(&detail.editor.toolbar())).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(unfocused_border())
                .title(" Format "),
        ),
        chunks[1],
    );

    let description = Block::default()
        .borders(Borders::ALL)
        .border_style(focused_border())
        .title(" Description ");
    let doc = detail.editor.document();
    if doc.is_empty() {
        let empty = Paragraph::new(Span::styled(
            "No description. Press e to write one.",
            label_text(),
        ))
        .block(description);
        frame.render_widget(empty, chunks[2]);
        return;
    }

    let lines = render_document(doc, Some(detail.editor.selection()));
    let highlighted_bg = selected_item(true).bg;
    let first_selected = lines
        .iter()
        .position(|line| line.style.bg.is_some() && line.style.bg == highlighted_bg)
        .unwrap_or(0);
    let visible = chunks[2].height.saturating_sub(2) as usize;
    let scroll = first_selected.saturating_sub(visible / 2) as u16;
    let widget = Paragraph::new(lines)
        .block(description)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(widget, chunks[2]);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let line = if let Some(error) = app.store.last_error() {
        Line::from(vec![
            Span::styled(error.to_string(), error_text()),
            Span::styled("  (ESC to dismiss)", label_text()),
        ])
    } else if let Some(status) = &app.status {
        Line::from(Span::styled(status.clone(), highlight_text()))
    } else {
        Line::from(Span::styled(help_hint(app.mode), label_text()))
    };

    let footer = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(unfocused_border()),
    );
    frame.render_widget(footer, area);
}

fn help_hint(mode: AppMode) -> &'static str {
    match mode {
        AppMode::Normal => {
            "hjkl: move | SPACE: drag | ENTER: open | e: edit | n: new card | R: rename | /: filter | ?: help | q: quit"
        }
        AppMode::Dragging => "hjkl: move drop target | SPACE/ENTER: drop | ESC: cancel",
        AppMode::CardDetail => {
            "jk: block | b i s: marks | 1-3: heading | u o t: lists | c: code | l: link | m: image | e: edit | ESC: close"
        }
        AppMode::ConfirmDeleteCard => "y: delete | n/ESC: keep",
        AppMode::Help => "any key: close",
        _ => "ENTER: confirm | ESC: cancel",
    }
}

fn render_help_popup(frame: &mut Frame) {
    let inner = render_popup_with_block(frame, "Help", 60, 70);
    let keys = [
        ("h j k l / arrows", "move between cards and swimlanes"),
        ("SPACE", "pick up the card, then drop it"),
        ("ESC", "cancel a drag, dismiss an error"),
        ("/", "filter cards by name or description"),
        ("n", "add a card to the swimlane"),
        ("R", "rename the card"),
        ("ENTER", "open the card"),
        ("e", "edit the description in $EDITOR"),
        ("x", "delete the card"),
        ("S", "add a swimlane"),
        ("r", "rename the swimlane"),
        ("o", "collapse or expand the swimlane"),
        ("D", "delete an empty swimlane"),
        ("A", "archive every card in the last column"),
        ("q", "quit"),
    ];
    let lines: Vec<Line> = keys
        .iter()
        .map(|(key, action)| {
            Line::from(vec![
                Span::styled(format!("{:>18}  ", key), highlight_text()),
                Span::styled(*action, normal_text()),
            ])
        })
        .collect();
    frame.render_widget(Paragraph::new(lines), inner);
}

fn lane_height(lane: &SwimlaneView, drag: Option<&DragState>) -> u16 {
    if !lane.swimlane.is_open {
        return 1;
    }
    let ghost = drag.is_some_and(|drag| drag.swimlane_id == lane.swimlane.id) as usize;
    let tallest = lane
        .columns
        .iter()
        .map(|cell| cell.items.iter().map(card_height).sum::<usize>())
        .max()
        .unwrap_or(0);
    let rows = tallest + ghost;
    rows.max(1) as u16 + 2
}

/// First lane to draw so that the focused lane fits on screen.
fn first_visible_lane(heights: &[u16], focused: usize, available: u16) -> usize {
    let focused = focused.min(heights.len().saturating_sub(1));
    let mut first = focused;
    let mut used = heights.get(focused).copied().unwrap_or(0);
    while first > 0 && used + heights[first - 1] <= available {
        first -= 1;
        used += heights[first];
    }
    first
}

fn split_columns(area: Rect, count: usize) -> Vec<Rect> {
    if count == 0 {
        return Vec::new();
    }
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints((0..count).map(|_| Constraint::Ratio(1, count as u32)))
        .split(area)
        .to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_visible_lane_keeps_focus_on_screen() {
        let heights = [5, 5, 5, 5];
        assert_eq!(first_visible_lane(&heights, 0, 12), 0);
        assert_eq!(first_visible_lane(&heights, 1, 12), 0);
        assert_eq!(first_visible_lane(&heights, 3, 12), 2);
        assert_eq!(first_visible_lane(&heights, 3, 3), 3);
        assert_eq!(first_visible_lane(&[], 0, 10), 0);
    }

    fn card(description: &str) -> Item {
        let mut item = Item::new(Default::default(), Default::default(), "card", 0);
        item.description = description.to_string();
        item
    }

    #[test]
    fn test_description_preview_uses_first_line_of_text() {
        let item = card("<h2>Plan</h2><ul><li>one</li></ul>");
        assert_eq!(description_preview(&item).as_deref(), Some("Plan"));
        assert_eq!(card_height(&item), 2);

        let blank = card("<p></p>");
        assert_eq!(description_preview(&blank), None);
        assert_eq!(card_height(&blank), 1);
    }

    #[test]
    fn test_long_description_preview_is_cut() {
        let item = card(&format!("<p>{}</p>", "x".repeat(PREVIEW_CHARS + 5)));
        let preview = description_preview(&item).unwrap();
        assert_eq!(preview.chars().count(), PREVIEW_CHARS + 1);
        assert!(preview.ends_with('…'));
    }
}
