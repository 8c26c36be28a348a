use birdseye_core::InputState;
use crossterm::event::KeyCode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogAction {
    None,
    Edited,
    Cancel,
    Confirm,
}

/// Feeds one key into a prompt. Blank input only confirms when
/// `allow_empty` is set.
pub fn handle_dialog_input(
    input: &mut InputState,
    key_code: KeyCode,
    allow_empty: bool,
) -> DialogAction {
    match key_code {
        KeyCode::Esc => DialogAction::Cancel,
        KeyCode::Enter => {
            if allow_empty || !input.is_blank() {
                DialogAction::Confirm
            } else {
                DialogAction::None
            }
        }
        KeyCode::Char(c) => {
            input.insert_char(c);
            DialogAction::Edited
        }
        KeyCode::Backspace => {
            input.backspace();
            DialogAction::Edited
        }
        KeyCode::Delete => {
            input.delete();
            DialogAction::Edited
        }
        KeyCode::Left => {
            input.move_left();
            DialogAction::None
        }
        KeyCode::Right => {
            input.move_right();
            DialogAction::None
        }
        KeyCode::Home => {
            input.move_home();
            DialogAction::None
        }
        KeyCode::End => {
            input.move_end();
            DialogAction::None
        }
        _ => DialogAction::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_input_does_not_confirm() {
        let mut input = InputState::with_text("  ");
        assert_eq!(
            handle_dialog_input(&mut input, KeyCode::Enter, false),
            DialogAction::None
        );
        assert_eq!(
            handle_dialog_input(&mut input, KeyCode::Enter, true),
            DialogAction::Confirm
        );
    }

    #[test]
    fn test_typing_reports_edits() {
        let mut input = InputState::new();
        assert_eq!(
            handle_dialog_input(&mut input, KeyCode::Char('a'), false),
            DialogAction::Edited
        );
        assert_eq!(
            handle_dialog_input(&mut input, KeyCode::Left, false),
            DialogAction::None
        );
        assert_eq!(input.text(), "a");
        assert_eq!(
            handle_dialog_input(&mut input, KeyCode::Esc, false),
            DialogAction::Cancel
        );
    }
}
