pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{dim, error, muted, record_detail, section, status, success, summary_row, warn};
pub use table::{records_table, sheets_table, SheetRow};
pub use theme::{theme, Theme};
