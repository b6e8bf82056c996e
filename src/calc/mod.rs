pub mod date_index;
pub mod grid;
pub mod navigation;

pub use date_index::{DateIndex, DateKey};
pub use grid::{build_grid, dot_indicator, week_preview, CalendarGrid, Dot, GridCell, MonthSummary};
pub use navigation::{Direction, NavigationController, ViewMode, ViewState};
