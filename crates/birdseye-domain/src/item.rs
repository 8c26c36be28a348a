use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::column::ColumnId;
use crate::row::{Row, Table, TableRow};
use crate::swimlane::SwimlaneId;

pub type ItemId = Uuid;

/// A card. It sits in exactly one (swimlane, column) cell and is ordered
/// within its column by `sort_order`. `description` holds rich-text HTML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub id: ItemId,
    pub swimlane_id: SwimlaneId,
    pub column_id: ColumnId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub sort_order: i32,
    #[serde(default = "crate::row::default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub is_archived: bool,
}

impl Item {
    pub fn new(
        swimlane_id: SwimlaneId,
        column_id: ColumnId,
        name: impl Into<String>,
        sort_order: i32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            swimlane_id,
            column_id,
            name: name.into(),
            description: String::new(),
            sort_order,
            is_active: true,
            is_archived: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Shown on the board: neither soft-deleted nor archived.
    pub fn is_visible(&self) -> bool {
        self.is_active && !self.is_archived
    }
}

impl TableRow for Item {
    const TABLE: Table = Table::Items;

    fn id(&self) -> Uuid {
        self.id
    }
}

/// Partial card update sent as an upsert patch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub is_archived: Option<bool>,
}

impl ItemUpdate {
    pub fn content(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn soft_delete() -> Self {
        Self {
            is_active: Some(false),
            ..Self::default()
        }
    }

    pub fn archive() -> Self {
        Self {
            is_archived: Some(true),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.is_active.is_none()
            && self.is_archived.is_none()
    }

    pub fn to_row(&self, id: ItemId) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), id.to_string().into());
        if let Some(name) = &self.name {
            row.insert("name".into(), name.clone().into());
        }
        if let Some(description) = &self.description {
            row.insert("description".into(), description.clone().into());
        }
        if let Some(is_active) = self.is_active {
            row.insert("is_active".into(), is_active.into());
        }
        if let Some(is_archived) = self.is_archived {
            row.insert("is_archived".into(), is_archived.into());
        }
        row
    }
}
