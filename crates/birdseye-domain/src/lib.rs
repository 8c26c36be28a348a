pub mod column;
pub mod item;
pub mod reorder;
pub mod row;
pub mod search;
pub mod state;
pub mod swimlane;
pub mod view;

pub use column::{Column, ColumnId};
pub use item::{Item, ItemId, ItemUpdate};
pub use reorder::{DragLocation, DragResult, Reorder};
pub use row::{merge_rows, Row, Table, TableRow};
pub use search::TextFilter;
pub use state::BoardState;
pub use swimlane::{Swimlane, SwimlaneId, SwimlaneUpdate};
pub use view::{BoardView, ColumnTotal, ColumnView, SwimlaneView};
