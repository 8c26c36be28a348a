use birdseye_core::BoardResult;
use birdseye_domain::{Row, Table};
use std::fmt;

/// Named board actions that reach the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    AddSwimlane,
    UpdateSwimlane,
    DeleteSwimlane,
    AddCard,
    UpdateCard,
    DeleteCard,
    Reorder,
    ArchiveCompleted,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::AddSwimlane => "add swimlane",
            Action::UpdateSwimlane => "update swimlane",
            Action::DeleteSwimlane => "delete swimlane",
            Action::AddCard => "add card",
            Action::UpdateCard => "update card",
            Action::DeleteCard => "delete card",
            Action::Reorder => "reorder",
            Action::ArchiveCompleted => "archive completed",
        };
        f.write_str(name)
    }
}

/// Completion of one background write.
#[derive(Debug)]
pub struct RemoteEvent {
    pub action: Action,
    pub table: Table,
    /// Rows as stored by the backend.
    pub result: BoardResult<Vec<Row>>,
}
