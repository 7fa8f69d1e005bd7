//! Supplier records - rows of the `SUPPLIERS` table

use rusqlite::Row;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use crate::query::{FromRow, Table};

/// A coffee supplier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct Supplier {
    /// Primary key (`SUP_ID`)
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Street")]
    pub street: String,
    #[tabled(rename = "City")]
    pub city: String,
    #[tabled(rename = "State")]
    pub state: String,
    #[tabled(rename = "Zip")]
    pub zip: String,
}

impl Supplier {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        street: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        zip: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            street: street.into(),
            city: city.into(),
            state: state.into(),
            zip: zip.into(),
        }
    }
}

impl FromRow for Supplier {
    const WIDTH: usize = 6;

    fn from_row_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Supplier {
            id: row.get(offset)?,
            name: row.get(offset + 1)?,
            street: row.get(offset + 2)?,
            city: row.get(offset + 3)?,
            state: row.get(offset + 4)?,
            zip: row.get(offset + 5)?,
        })
    }
}

impl Table for Supplier {
    const NAME: &'static str = "SUPPLIERS";
    const COLUMNS: &'static [&'static str] = &["SUP_ID", "SUP_NAME", "STREET", "CITY", "STATE", "ZIP"];
    const PRIMARY_KEY: &'static str = "SUP_ID";

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.id),
            Value::Text(self.name.clone()),
            Value::Text(self.street.clone()),
            Value::Text(self.city.clone()),
            Value::Text(self.state.clone()),
            Value::Text(self.zip.clone()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projection_width_matches_columns() {
        assert_eq!(Supplier::WIDTH, Supplier::COLUMNS.len());
        let supplier = Supplier::new(1, "n", "s", "c", "CA", "00000");
        assert_eq!(supplier.to_values().len(), Supplier::COLUMNS.len());
    }

    #[test]
    fn test_to_values_follows_field_order() {
        let supplier = Supplier::new(7, "Acme", "1 Road", "Town", "CA", "90000");
        let values = supplier.to_values();
        assert_eq!(values[0], Value::Integer(7));
        assert_eq!(values[1], Value::Text("Acme".into()));
        assert_eq!(values[5], Value::Text("90000".into()));
    }
}
