use tabled::{Table, Tabled, settings::Style};

/// A named figure in a two-column summary table
#[derive(Debug, Clone, Tabled)]
pub struct Metric {
    #[tabled(rename = "Metric")]
    pub name: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl Metric {
    pub fn new(name: &str, value: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Render records (suppliers, coffees, menu lines, metrics) as a rounded
/// table; `None` when there is nothing to show.
pub fn records_table<T: Tabled>(records: &[T]) -> Option<String> {
    if records.is_empty() {
        return None;
    }
    Some(Table::new(records).with(Style::rounded()).to_string())
}
