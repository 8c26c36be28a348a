use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::row::{Table, TableRow};

pub type ColumnId = Uuid;

/// A workflow stage. The set of columns is fixed per board and keeps the
/// order the backend returned it in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    #[serde(default = "crate::row::default_true")]
    pub is_active: bool,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            is_active: true,
        }
    }
}

impl TableRow for Column {
    const TABLE: Table = Table::Columns;

    fn id(&self) -> Uuid {
        self.id
    }
}
