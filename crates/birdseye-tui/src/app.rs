use crate::cursor::BoardCursor;
use crate::dialog::{handle_dialog_input, DialogAction};
use crate::drag::DragState;
use crate::editor::{description_file, description_markdown, edit_in_external_editor};
use crate::events::{Event, EventHandler};
use crate::ui;
use birdseye_core::{BoardResult, InputState};
use birdseye_domain::{Item, ItemId, SwimlaneId, SwimlaneUpdate};
use birdseye_richtext::{Document, Editor, ToolbarCommand};
use birdseye_state::BoardStore;
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppMode {
    Normal,
    Filter,
    AddCard,
    AddSwimlane,
    RenameSwimlane,
    RenameCard,
    ConfirmDeleteCard,
    Dragging,
    CardDetail,
    EditLink,
    InsertImage,
    Help,
}

/// An opened card: its description in an editor plus the block the
/// toolbar acts on.
pub struct CardDetail {
    pub item_id: ItemId,
    pub editor: Editor,
    /// Index into [`Editor::targets`].
    pub target: usize,
    /// Toolbar edits not yet sent to the backend.
    pub dirty: bool,
}

impl CardDetail {
    fn new(item: &Item) -> Self {
        let mut detail = Self {
            item_id: item.id,
            editor: Editor::from_html(&item.description),
            target: 0,
            dirty: false,
        };
        detail.select_target();
        detail
    }

    fn reload(&mut self, html: &str) {
        self.editor = Editor::from_html(html);
        self.dirty = false;
        self.select_target();
    }

    fn next(&mut self) {
        self.target += 1;
        self.select_target();
    }

    fn prev(&mut self) {
        self.target = self.target.saturating_sub(1);
        self.select_target();
    }

    /// Re-selects the whole target after a command rewrote the blocks.
    fn follow_selection(&mut self) {
        let selection = self.editor.selection();
        if let Some(index) = self
            .editor
            .targets()
            .iter()
            .position(|t| t.block == selection.block && t.item == selection.item)
        {
            self.target = index;
        }
        self.select_target();
    }

    fn select_target(&mut self) {
        let targets = self.editor.targets();
        let Some(last) = targets.len().checked_sub(1) else {
            self.target = 0;
            return;
        };
        self.target = self.target.min(last);
        if let Err(e) = self.editor.select(targets[self.target]) {
            tracing::debug!("Could not select description block: {}", e);
        }
    }
}

pub struct App {
    pub store: BoardStore,
    pub mode: AppMode,
    pub cursor: BoardCursor,
    pub drag: Option<DragState>,
    pub detail: Option<CardDetail>,
    pub input: InputState,
    /// Feedback for the last key, shown in the footer.
    pub status: Option<String>,
    pub should_quit: bool,
    pending_edit: Option<ItemId>,
}

impl App {
    /// Wraps a loaded store.
    pub fn new(store: BoardStore) -> Self {
        Self {
            store,
            mode: AppMode::Normal,
            cursor: BoardCursor::default(),
            drag: None,
            detail: None,
            input: InputState::new(),
            status: None,
            should_quit: false,
            pending_edit: None,
        }
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }
        self.status = None;

        match self.mode {
            AppMode::Normal => self.handle_normal_key(key.code),
            AppMode::Filter => self.handle_filter_key(key.code),
            AppMode::AddCard
            | AppMode::AddSwimlane
            | AppMode::RenameSwimlane
            | AppMode::RenameCard => self.handle_name_prompt(key.code),
            AppMode::ConfirmDeleteCard => self.handle_delete_confirm(key.code),
            AppMode::Dragging => self.handle_drag_key(key.code),
            AppMode::CardDetail => self.handle_detail_key(key.code),
            AppMode::EditLink | AppMode::InsertImage => self.handle_detail_prompt(key.code),
            AppMode::Help => self.mode = AppMode::Normal,
        }
        self.sync();
    }

    /// Card whose description should be opened in the external editor.
    pub fn take_pending_edit(&mut self) -> Option<ItemId> {
        self.pending_edit.take()
    }

    /// Markdown handed to the external editor for `item_id`. An open detail
    /// view contributes its unsaved toolbar edits.
    pub fn description_source(&self, item_id: ItemId) -> Option<String> {
        if let Some(detail) = self.detail.as_ref().filter(|d| d.item_id == item_id) {
            return Some(detail.editor.document().to_markdown());
        }
        self.store
            .state()
            .item(item_id)
            .map(|item| description_markdown(&item.description))
    }

    /// Stores markdown returned by the external editor as the card's HTML
    /// description.
    pub fn apply_description(&mut self, item_id: ItemId, markdown: &str) {
        let html = Document::markdown_to_stored_html(markdown);
        let Some(name) = self.store.state().item(item_id).map(|item| item.name.clone()) else {
            self.status = Some("card no longer exists".into());
            return;
        };
        tracing::info!("Updating description of card {}", item_id);
        let result = self.store.update_card(item_id, &name, &html);
        if self.report(result) {
            if let Some(detail) = self.detail.as_mut().filter(|d| d.item_id == item_id) {
                detail.reload(&html);
            }
        }
    }

    /// Folds completed remote writes into the board.
    pub fn process_remote_events(&mut self) {
        if self.store.process_events() > 0 {
            self.sync();
        }
    }

    pub fn selected_item(&self) -> Option<&Item> {
        self.cursor.item(self.store.state().view())
    }

    pub fn selected_swimlane_id(&self) -> Option<SwimlaneId> {
        self.cursor
            .swimlane(self.store.state().view())
            .map(|lane| lane.swimlane.id)
    }

    fn handle_normal_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('?') => self.mode = AppMode::Help,
            KeyCode::Esc => self.store.clear_error(),
            KeyCode::Up | KeyCode::Char('k') => self.cursor.up(self.store.state().view()),
            KeyCode::Down | KeyCode::Char('j') => self.cursor.down(self.store.state().view()),
            KeyCode::Left | KeyCode::Char('h') => self.cursor.left(self.store.state().view()),
            KeyCode::Right | KeyCode::Char('l') => self.cursor.right(self.store.state().view()),
            KeyCode::Char(' ') => self.pick_up(),
            KeyCode::Char('/') => {
                self.input.set(self.store.state().filter());
                self.mode = AppMode::Filter;
            }
            KeyCode::Char('n') => {
                if self.selected_swimlane_id().is_some() {
                    self.input.clear();
                    self.mode = AppMode::AddCard;
                } else {
                    self.status = Some("Add a swimlane first (S)".into());
                }
            }
            KeyCode::Char('S') => {
                self.input.clear();
                self.mode = AppMode::AddSwimlane;
            }
            KeyCode::Char('r') => {
                let name = self
                    .cursor
                    .swimlane(self.store.state().view())
                    .map(|lane| lane.swimlane.name.clone());
                if let Some(name) = name {
                    self.input.set(&name);
                    self.mode = AppMode::RenameSwimlane;
                }
            }
            KeyCode::Char('R') => {
                let name = self.selected_item().map(|item| item.name.clone());
                if let Some(name) = name {
                    self.input.set(&name);
                    self.mode = AppMode::RenameCard;
                }
            }
            KeyCode::Char('o') => self.toggle_swimlane_open(),
            KeyCode::Char('D') => {
                if let Some(id) = self.selected_swimlane_id() {
                    let result = self.store.delete_swimlane(id);
                    self.report(result);
                }
            }
            KeyCode::Enter => {
                if let Some(detail) = self.selected_item().map(CardDetail::new) {
                    self.detail = Some(detail);
                    self.mode = AppMode::CardDetail;
                }
            }
            KeyCode::Char('e') => {
                self.pending_edit = self.selected_item().map(|item| item.id);
            }
            KeyCode::Char('x') => {
                if self.selected_item().is_some() {
                    self.mode = AppMode::ConfirmDeleteCard;
                }
            }
            KeyCode::Char('A') => {
                let count = self.store.archive_completed();
                self.status = Some(match count {
                    0 => "Nothing to archive".to_string(),
                    1 => "Archiving 1 card".to_string(),
                    n => format!("Archiving {} cards", n),
                });
            }
            _ => {}
        }
    }

    fn handle_filter_key(&mut self, code: KeyCode) {
        match handle_dialog_input(&mut self.input, code, true) {
            DialogAction::Edited => self.store.set_filter(self.input.text()),
            DialogAction::Confirm => {
                self.input.clear();
                self.mode = AppMode::Normal;
            }
            DialogAction::Cancel => {
                self.input.clear();
                self.store.set_filter("");
                self.mode = AppMode::Normal;
            }
            DialogAction::None => {}
        }
    }

    fn handle_name_prompt(&mut self, code: KeyCode) {
        match handle_dialog_input(&mut self.input, code, false) {
            DialogAction::Confirm => {
                let name = self.input.take();
                let result = match (self.mode, self.selected_swimlane_id()) {
                    (AppMode::AddSwimlane, _) => {
                        tracing::info!("Creating swimlane: {}", name.trim());
                        self.store.add_swimlane(&name)
                    }
                    (AppMode::AddCard, Some(lane)) => {
                        tracing::info!("Creating card: {}", name.trim());
                        self.store.add_card(lane, &name, "")
                    }
                    (AppMode::RenameSwimlane, Some(lane)) => self
                        .store
                        .update_swimlane(lane, SwimlaneUpdate::rename(name.trim())),
                    (AppMode::RenameCard, _) => self.rename_selected_card(&name),
                    _ => Ok(()),
                };
                self.report(result);
                self.mode = AppMode::Normal;
            }
            DialogAction::Cancel => {
                self.input.clear();
                self.mode = AppMode::Normal;
            }
            DialogAction::Edited | DialogAction::None => {}
        }
    }

    /// Renames the card under the cursor, keeping its description.
    fn rename_selected_card(&mut self, name: &str) -> BoardResult<()> {
        let Some((id, description)) = self
            .selected_item()
            .map(|item| (item.id, item.description.clone()))
        else {
            return Ok(());
        };
        tracing::info!("Renaming card {}", id);
        self.store.update_card(id, name, &description)
    }

    fn handle_delete_confirm(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                if let Some(id) = self.selected_item().map(|item| item.id) {
                    tracing::info!("Deleting card {}", id);
                    let result = self.store.delete_card(id);
                    self.report(result);
                }
                self.mode = AppMode::Normal;
            }
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                self.mode = AppMode::Normal;
            }
            _ => {}
        }
    }

    fn toggle_swimlane_open(&mut self) {
        let lane = self
            .cursor
            .swimlane(self.store.state().view())
            .map(|lane| (lane.swimlane.id, lane.swimlane.is_open));
        if let Some((id, is_open)) = lane {
            let result = self.store.update_swimlane(id, SwimlaneUpdate::open(!is_open));
            self.report(result);
        }
    }

    fn pick_up(&mut self) {
        let drag = self
            .cursor
            .swimlane(self.store.state().view())
            .and_then(|lane| DragState::pick_up(lane, self.cursor.column, self.cursor.card));
        if let Some(drag) = drag {
            tracing::debug!("Picked up card {}", drag.item_id);
            self.drag = Some(drag);
            self.mode = AppMode::Dragging;
        }
    }

    fn handle_drag_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char(' ') | KeyCode::Enter => return self.finish_drag(false),
            KeyCode::Esc => return self.finish_drag(true),
            _ => {}
        }
        let Some(lane_id) = self.drag.as_ref().map(|drag| drag.swimlane_id) else {
            self.mode = AppMode::Normal;
            return;
        };
        let view = self.store.state().view();
        let lane = view.swimlanes.iter().find(|lane| lane.swimlane.id == lane_id);
        match (code, self.drag.as_mut(), lane) {
            (KeyCode::Up | KeyCode::Char('k'), Some(drag), _) => drag.up(),
            (KeyCode::Down | KeyCode::Char('j'), Some(drag), Some(lane)) => drag.down(lane),
            (KeyCode::Left | KeyCode::Char('h'), Some(drag), Some(lane)) => drag.left(lane),
            (KeyCode::Right | KeyCode::Char('l'), Some(drag), Some(lane)) => drag.right(lane),
            _ => {}
        }
    }

    fn finish_drag(&mut self, cancel: bool) {
        self.mode = AppMode::Normal;
        let Some(drag) = self.drag.take() else {
            return;
        };
        let result = {
            let view = self.store.state().view();
            match view
                .swimlanes
                .iter()
                .find(|lane| lane.swimlane.id == drag.swimlane_id)
            {
                Some(lane) if !cancel => drag.drop(lane),
                _ => drag.cancel(),
            }
        };
        match self.store.handle_drag_end(drag.swimlane_id, &result) {
            Ok(true) => {
                self.cursor.follow(self.store.state().view(), drag.item_id);
            }
            Ok(false) => tracing::debug!("Drag of card {} cancelled", drag.item_id),
            Err(e) => {
                tracing::warn!("Drop rejected: {}", e);
                self.status = Some(e.to_string());
            }
        }
    }

    fn handle_detail_key(&mut self, code: KeyCode) {
        let command = match code {
            KeyCode::Esc | KeyCode::Char('q') => {
                self.close_detail();
                return;
            }
            KeyCode::Up | KeyCode::Char('k') => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.prev();
                }
                return;
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if let Some(detail) = self.detail.as_mut() {
                    detail.next();
                }
                return;
            }
            KeyCode::Char('e') => {
                self.pending_edit = self.detail.as_ref().map(|detail| detail.item_id);
                return;
            }
            KeyCode::Char('l') => {
                self.open_detail_prompt(ToolbarCommand::EditLink);
                return;
            }
            KeyCode::Char('m') => {
                self.open_detail_prompt(ToolbarCommand::InsertImage);
                return;
            }
            KeyCode::Char('b') => ToolbarCommand::Bold,
            KeyCode::Char('i') => ToolbarCommand::Italic,
            KeyCode::Char('s') => ToolbarCommand::Strike,
            KeyCode::Char('1') => ToolbarCommand::Heading(1),
            KeyCode::Char('2') => ToolbarCommand::Heading(2),
            KeyCode::Char('3') => ToolbarCommand::Heading(3),
            KeyCode::Char('u') => ToolbarCommand::BulletList,
            KeyCode::Char('o') => ToolbarCommand::OrderedList,
            KeyCode::Char('t') => ToolbarCommand::TaskList,
            KeyCode::Char('c') => ToolbarCommand::CodeBlock,
            _ => return,
        };
        let Some(detail) = self.detail.as_mut() else {
            return;
        };
        match detail.editor.toggle(command) {
            Ok(()) => {
                detail.dirty = true;
                detail.follow_selection();
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    fn open_detail_prompt(&mut self, command: ToolbarCommand) {
        let Some(detail) = self.detail.as_ref() else {
            return;
        };
        if !detail.editor.is_enabled(command) {
            self.status = Some(format!("{} is not available here", command.label()));
            return;
        }
        self.input.clear();
        self.mode = match command {
            ToolbarCommand::EditLink => AppMode::EditLink,
            _ => AppMode::InsertImage,
        };
    }

    fn handle_detail_prompt(&mut self, code: KeyCode) {
        match handle_dialog_input(&mut self.input, code, self.mode == AppMode::EditLink) {
            DialogAction::Confirm => {
                let text = self.input.take();
                let text = text.trim();
                if let Some(detail) = self.detail.as_mut() {
                    let result = if self.mode == AppMode::EditLink {
                        detail
                            .editor
                            .set_link(if text.is_empty() { None } else { Some(text) })
                    } else {
                        detail
                            .editor
                            .insert_image(&format!("/api/images/{}", text), text)
                    };
                    match result {
                        Ok(()) => {
                            detail.dirty = true;
                            detail.follow_selection();
                        }
                        Err(e) => self.status = Some(e.to_string()),
                    }
                }
                self.mode = AppMode::CardDetail;
            }
            DialogAction::Cancel => {
                self.input.clear();
                self.mode = AppMode::CardDetail;
            }
            DialogAction::Edited | DialogAction::None => {}
        }
    }

    /// Leaves the detail view, sending toolbar edits as the new HTML
    /// description.
    fn close_detail(&mut self) {
        self.mode = AppMode::Normal;
        let Some(detail) = self.detail.take() else {
            return;
        };
        if !detail.dirty {
            return;
        }
        let Some(name) = self
            .store
            .state()
            .item(detail.item_id)
            .map(|item| item.name.clone())
        else {
            return;
        };
        let result = self
            .store
            .update_card(detail.item_id, &name, &detail.editor.to_html());
        self.report(result);
    }

    /// Keeps cursor, drag and detail pointing at things that still exist.
    fn sync(&mut self) {
        let state = self.store.state();
        self.cursor.clamp(state.view());

        let gone = |id: ItemId| !state.item(id).is_some_and(Item::is_visible);
        if self.drag.as_ref().is_some_and(|drag| gone(drag.item_id)) {
            self.drag = None;
            self.status = Some("The dragged card changed remotely".into());
        }
        if self.detail.as_ref().is_some_and(|detail| gone(detail.item_id)) {
            self.detail = None;
        }

        match self.mode {
            AppMode::Dragging if self.drag.is_none() => self.mode = AppMode::Normal,
            AppMode::CardDetail | AppMode::EditLink | AppMode::InsertImage
                if self.detail.is_none() =>
            {
                self.mode = AppMode::Normal
            }
            _ => {}
        }
    }

    /// Shows a rejected action in the footer. Returns `true` on success.
    fn report(&mut self, result: BoardResult<()>) -> bool {
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Action rejected: {}", e);
                self.status = Some(e.to_string());
                false
            }
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal).await;
        restore_terminal(&mut terminal)?;
        result
    }

    async fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> anyhow::Result<()> {
        while !self.should_quit {
            let mut events = EventHandler::new();

            loop {
                terminal.draw(|frame| ui::render(self, frame))?;

                tokio::select! {
                    event = events.next() => match event {
                        Some(Event::Key(key)) => self.handle_key_event(key),
                        Some(Event::Resize) | Some(Event::Tick) => {}
                        None => self.should_quit = true,
                    },
                    Some(remote) = self.store.next_event() => {
                        self.store.apply(remote);
                        self.sync();
                    }
                }

                if let Some(item_id) = self.take_pending_edit() {
                    self.edit_description(terminal, &events, item_id)?;
                    // The poller was stopped for the editor.
                    break;
                }

                if self.should_quit {
                    events.stop();
                    break;
                }
            }
        }
        Ok(())
    }

    fn edit_description(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        events: &EventHandler,
        item_id: ItemId,
    ) -> io::Result<()> {
        let Some(markdown) = self.description_source(item_id) else {
            return Ok(());
        };
        match edit_in_external_editor(terminal, events, &description_file(item_id), &markdown) {
            Ok(Some(edited)) => self.apply_description(item_id, &edited),
            Ok(None) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => self.status = Some(e.to_string()),
            Err(e) => return Err(e),
        }
        Ok(())
    }
}

fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> io::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use birdseye_gateway::{MemoryGateway, TableSet};
    use std::sync::Arc;

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key_event(KeyEvent::from(code));
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            press(app, KeyCode::Char(c));
        }
    }

    async fn app_with_cards(cards: &[&str]) -> App {
        let columns = ["Todo", "Doing", "Done"].map(String::from);
        let gateway = Arc::new(MemoryGateway::with_tables(
            TableSet::with_columns(&columns).unwrap(),
        ));
        let mut store = BoardStore::new(gateway);
        store.load().await.unwrap();
        let mut app = App::new(store);

        press(&mut app, KeyCode::Char('S'));
        type_text(&mut app, "Web");
        press(&mut app, KeyCode::Enter);
        app.store.settle().await;

        for card in cards {
            press(&mut app, KeyCode::Char('n'));
            type_text(&mut app, card);
            press(&mut app, KeyCode::Enter);
            app.store.settle().await;
        }
        app.process_remote_events();
        app
    }

    fn cell_names(app: &App, column: usize) -> Vec<String> {
        app.store.state().view().swimlanes[0].columns[column]
            .items
            .iter()
            .map(|item| item.name.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_prompts_create_swimlane_and_cards() {
        let app = app_with_cards(&["a", "b"]).await;
        assert_eq!(app.store.state().view().swimlanes.len(), 1);
        assert_eq!(cell_names(&app, 0), vec!["a", "b"]);
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[tokio::test]
    async fn test_rename_card_keeps_description() {
        let mut app = app_with_cards(&["a", "b"]).await;
        let id = app.selected_item().unwrap().id;
        app.apply_description(id, "Use **OAuth**");
        app.store.settle().await;

        press(&mut app, KeyCode::Char('R'));
        assert_eq!(app.mode, AppMode::RenameCard);
        assert_eq!(app.input.text(), "a");
        press(&mut app, KeyCode::Backspace);
        type_text(&mut app, "Login page");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::Normal);
        app.store.settle().await;
        app.process_remote_events();

        assert_eq!(cell_names(&app, 0), vec!["Login page", "b"]);
        let item = app.store.state().item(id).unwrap();
        assert_eq!(item.description, "<p>Use <strong>OAuth</strong></p>");
        assert!(app.store.last_error().is_none());
    }

    #[tokio::test]
    async fn test_rename_card_prompt_stays_open_when_blank() {
        let mut app = app_with_cards(&["a"]).await;
        press(&mut app, KeyCode::Char('R'));
        press(&mut app, KeyCode::Backspace);
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::RenameCard);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(app.store.pending(), 0);
        assert_eq!(cell_names(&app, 0), vec!["a"]);
    }

    #[tokio::test]
    async fn test_keyboard_drag_moves_card() {
        let mut app = app_with_cards(&["a", "b"]).await;
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.mode, AppMode::Dragging);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Char(' '));

        assert_eq!(app.mode, AppMode::Normal);
        assert_eq!(cell_names(&app, 0), vec!["a"]);
        assert_eq!(cell_names(&app, 2), vec!["b"]);
        assert_eq!(app.store.pending(), 1);
        assert_eq!((app.cursor.column, app.cursor.card), (2, 0));

        app.store.settle().await;
        assert!(app.store.last_error().is_none());
    }

    #[tokio::test]
    async fn test_escape_cancels_drag() {
        let mut app = app_with_cards(&["a", "b"]).await;
        let before = app.store.snapshot();
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Right);
        press(&mut app, KeyCode::Esc);

        assert_eq!(app.mode, AppMode::Normal);
        assert!(app.drag.is_none());
        assert_eq!(*app.store.snapshot(), *before);
        assert_eq!(app.store.pending(), 0);
    }

    #[tokio::test]
    async fn test_filter_updates_live_and_escape_clears() {
        let mut app = app_with_cards(&["login page", "billing"]).await;
        press(&mut app, KeyCode::Char('/'));
        type_text(&mut app, "LOG");
        assert_eq!(cell_names(&app, 0), vec!["login page"]);

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.store.state().filter(), "LOG");

        press(&mut app, KeyCode::Char('/'));
        press(&mut app, KeyCode::Esc);
        assert_eq!(app.store.state().filter(), "");
        assert_eq!(cell_names(&app, 0).len(), 2);
    }

    #[tokio::test]
    async fn test_delete_swimlane_with_cards_shows_error() {
        let mut app = app_with_cards(&["a"]).await;
        press(&mut app, KeyCode::Char('D'));
        assert!(app.status.as_deref().unwrap().contains("still has cards"));
        assert_eq!(app.store.pending(), 0);
    }

    #[tokio::test]
    async fn test_delete_card_asks_first() {
        let mut app = app_with_cards(&["a"]).await;
        press(&mut app, KeyCode::Char('x'));
        assert_eq!(app.mode, AppMode::ConfirmDeleteCard);
        press(&mut app, KeyCode::Char('n'));
        assert_eq!(app.store.pending(), 0);

        press(&mut app, KeyCode::Char('x'));
        press(&mut app, KeyCode::Char('y'));
        app.store.settle().await;
        app.process_remote_events();
        assert!(cell_names(&app, 0).is_empty());
    }

    #[tokio::test]
    async fn test_collapsed_swimlane_hides_cards_from_cursor() {
        let mut app = app_with_cards(&["a"]).await;
        press(&mut app, KeyCode::Char('o'));
        app.store.settle().await;
        app.process_remote_events();
        assert!(!app.store.state().view().swimlanes[0].swimlane.is_open);
        assert!(app.selected_item().is_none());

        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.mode, AppMode::Normal);
    }

    #[tokio::test]
    async fn test_detail_toolbar_edits_are_saved_on_close() {
        let mut app = app_with_cards(&["a"]).await;
        let id = app.selected_item().unwrap().id;
        app.apply_description(id, "first line\n\nsecond line");
        app.store.settle().await;

        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::CardDetail);
        press(&mut app, KeyCode::Char('b'));
        press(&mut app, KeyCode::Char('j'));
        press(&mut app, KeyCode::Char('2'));
        assert!(app.detail.as_ref().unwrap().dirty);

        press(&mut app, KeyCode::Esc);
        app.store.settle().await;
        assert_eq!(
            app.store.state().item(id).unwrap().description,
            "<p><strong>first line</strong></p><h2>second line</h2>"
        );
    }

    #[tokio::test]
    async fn test_disabled_toolbar_command_reports_status() {
        let mut app = app_with_cards(&["a"]).await;
        let id = app.selected_item().unwrap().id;
        app.apply_description(id, "```\ncode\n```");
        app.store.settle().await;

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('b'));
        assert!(app.status.is_some());
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.mode, AppMode::CardDetail);
        assert!(!app.detail.as_ref().unwrap().dirty);
    }

    #[tokio::test]
    async fn test_link_prompt_sets_link() {
        let mut app = app_with_cards(&["a"]).await;
        let id = app.selected_item().unwrap().id;
        app.apply_description(id, "docs");
        app.store.settle().await;

        press(&mut app, KeyCode::Enter);
        press(&mut app, KeyCode::Char('l'));
        assert_eq!(app.mode, AppMode::EditLink);
        type_text(&mut app, "https://example.com");
        press(&mut app, KeyCode::Enter);
        assert_eq!(app.mode, AppMode::CardDetail);
        assert_eq!(
            app.detail.as_ref().unwrap().editor.to_html(),
            "<p><a href=\"https://example.com\">docs</a></p>"
        );
    }

    #[tokio::test]
    async fn test_edit_key_queues_external_edit() {
        let mut app = app_with_cards(&["a"]).await;
        let id = app.selected_item().unwrap().id;
        press(&mut app, KeyCode::Char('e'));
        assert_eq!(app.take_pending_edit(), Some(id));
        assert_eq!(app.take_pending_edit(), None);
        assert_eq!(app.description_source(id).as_deref(), Some(""));
    }

    #[tokio::test]
    async fn test_archive_completed_reports_count() {
        let mut app = app_with_cards(&["a"]).await;
        press(&mut app, KeyCode::Char('A'));
        assert_eq!(app.status.as_deref(), Some("Nothing to archive"));

        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char('l'));
        press(&mut app, KeyCode::Char(' '));
        press(&mut app, KeyCode::Char('A'));
        assert_eq!(app.status.as_deref(), Some("Archiving 1 card"));
        app.store.settle().await;
        assert_eq!(app.store.state().view().item_count(), 0);
    }
}
