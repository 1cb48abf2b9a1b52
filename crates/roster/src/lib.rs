pub mod export;
pub mod filter;
pub mod sort;
pub mod stats;

pub use export::{ExportColumn, ExportError, export_csv, parse_columns};
pub use filter::StudentFilter;
pub use sort::{SortDirection, SortKey, sort_students};
pub use stats::{DepartmentStats, RosterStats, roster_stats};
