//! Coffee records - rows of the `COFFEES` table

use rusqlite::Row;
use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use tabled::Tabled;
use crate::query::{FromRow, Table};

/// A coffee sold by a supplier.
///
/// `supplier_id` must reference an existing supplier; the database rejects
/// the row otherwise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct Coffee {
    /// Primary key (`COF_NAME`)
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Supplier")]
    pub supplier_id: i64,
    #[tabled(rename = "Price")]
    pub price: f64,
    #[tabled(rename = "Sales")]
    pub sales: i64,
    #[tabled(rename = "Total")]
    pub total: i64,
}

impl Coffee {
    /// A coffee with zeroed sales counters
    pub fn new(name: impl Into<String>, supplier_id: i64, price: f64) -> Self {
        Self {
            name: name.into(),
            supplier_id,
            price,
            sales: 0,
            total: 0,
        }
    }

    pub fn with_sales(mut self, sales: i64, total: i64) -> Self {
        self.sales = sales;
        self.total = total;
        self
    }
}

impl FromRow for Coffee {
    const WIDTH: usize = 5;

    fn from_row_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok(Coffee {
            name: row.get(offset)?,
            supplier_id: row.get(offset + 1)?,
            price: row.get(offset + 2)?,
            sales: row.get(offset + 3)?,
            total: row.get(offset + 4)?,
        })
    }
}

impl Table for Coffee {
    const NAME: &'static str = "COFFEES";
    const COLUMNS: &'static [&'static str] = &["COF_NAME", "SUP_ID", "PRICE", "SALES", "TOTAL"];
    const PRIMARY_KEY: &'static str = "COF_NAME";

    fn to_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Integer(self.supplier_id),
            Value::Real(self.price),
            Value::Integer(self.sales),
            Value::Integer(self.total),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::mutation::insert_sql;

    #[test]
    fn test_projection_width_matches_columns() {
        assert_eq!(Coffee::WIDTH, Coffee::COLUMNS.len());
        assert_eq!(Coffee::new("x", 1, 1.0).to_values().len(), Coffee::COLUMNS.len());
    }

    #[test]
    fn test_new_zeroes_counters() {
        let coffee = Coffee::new("Colombian", 101, 7.99);
        assert_eq!(coffee.sales, 0);
        assert_eq!(coffee.total, 0);

        let sold = coffee.with_sales(3, 12);
        assert_eq!((sold.sales, sold.total), (3, 12));
    }

    #[test]
    fn test_insert_statement() {
        assert_eq!(
            insert_sql::<Coffee>(),
            "INSERT INTO COFFEES (COF_NAME, SUP_ID, PRICE, SALES, TOTAL) VALUES (?, ?, ?, ?, ?)"
        );
    }
}
