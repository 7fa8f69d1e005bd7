//! Terminal output for the CLI

pub mod icons;
pub mod printer;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use printer::{Printer, printer};
pub use table::{Metric, records_table};
pub use theme::Theme;
