use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::row::{Row, Table, TableRow};

pub type SwimlaneId = Uuid;

/// A horizontal grouping of cards. Swimlanes are never hard-deleted;
/// clearing `is_active` hides them from the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Swimlane {
    pub id: SwimlaneId,
    pub name: String,
    #[serde(default = "crate::row::default_true")]
    pub is_active: bool,
    #[serde(default = "crate::row::default_true")]
    pub is_open: bool,
}

impl Swimlane {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_active: true,
            is_open: true,
        }
    }
}

impl TableRow for Swimlane {
    const TABLE: Table = Table::Swimlanes;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Partial swimlane update sent as an upsert patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwimlaneUpdate {
    pub name: Option<String>,
    pub is_open: Option<bool>,
    pub is_active: Option<bool>,
}

impl SwimlaneUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn open(is_open: bool) -> Self {
        Self {
            is_open: Some(is_open),
            ..Self::default()
        }
    }

    /// Soft delete.
    pub fn deactivate() -> Self {
        Self {
            is_active: Some(false),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.is_open.is_none() && self.is_active.is_none()
    }

    /// Patch row carrying the id and only the fields that change.
    pub fn to_row(&self, id: SwimlaneId) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), id.to_string().into());
        if let Some(name) = &self.name {
            row.insert("name".into(), name.clone().into());
        }
        if let Some(is_open) = self.is_open {
            row.insert("is_open".into(), is_open.into());
        }
        if let Some(is_active) = self.is_active {
            row.insert("is_active".into(), is_active.into());
        }
        row
    }
}
