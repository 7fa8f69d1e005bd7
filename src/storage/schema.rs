//! Database schema definitions
//!
//! DDL for the two mapped tables plus the typed table, column and foreign
//! key handles queries are built from.

use crate::coffee::Coffee;
use crate::query::{ForeignKey, TableHandle};
use crate::supplier::Supplier;

/// SQL to create the suppliers table
pub const CREATE_SUPPLIERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS SUPPLIERS (
    SUP_ID INTEGER PRIMARY KEY NOT NULL,
    SUP_NAME TEXT NOT NULL,
    STREET TEXT NOT NULL,
    CITY TEXT NOT NULL,
    STATE TEXT NOT NULL,
    ZIP TEXT NOT NULL
)
"#;

/// SQL to create the coffees table
/// SUP_FK ties every coffee to an existing supplier
pub const CREATE_COFFEES_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS COFFEES (
    COF_NAME TEXT PRIMARY KEY NOT NULL,
    SUP_ID INTEGER NOT NULL,
    PRICE REAL NOT NULL CHECK (PRICE >= 0),
    SALES INTEGER NOT NULL DEFAULT 0,
    TOTAL INTEGER NOT NULL DEFAULT 0,
    CONSTRAINT SUP_FK FOREIGN KEY (SUP_ID) REFERENCES SUPPLIERS (SUP_ID)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_coffees_sup_id ON COFFEES(SUP_ID)",
];

/// Drop statements, dependents first
pub const DROP_TABLES: &[&str] = &[
    "DROP TABLE IF EXISTS COFFEES",
    "DROP TABLE IF EXISTS SUPPLIERS",
];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![CREATE_SUPPLIERS_TABLE, CREATE_COFFEES_TABLE];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

pub const SUPPLIERS: TableHandle<Supplier> = TableHandle::new();
pub const COFFEES: TableHandle<Coffee> = TableHandle::new();

/// Columns of `SUPPLIERS`
pub mod suppliers {
    use crate::query::Column;

    pub const SUP_ID: Column = Column::new("SUPPLIERS", "SUP_ID");
    pub const SUP_NAME: Column = Column::new("SUPPLIERS", "SUP_NAME");
    pub const STREET: Column = Column::new("SUPPLIERS", "STREET");
    pub const CITY: Column = Column::new("SUPPLIERS", "CITY");
    pub const STATE: Column = Column::new("SUPPLIERS", "STATE");
    pub const ZIP: Column = Column::new("SUPPLIERS", "ZIP");
}

/// Columns of `COFFEES`
pub mod coffees {
    use crate::query::Column;

    pub const COF_NAME: Column = Column::new("COFFEES", "COF_NAME");
    pub const SUP_ID: Column = Column::new("COFFEES", "SUP_ID");
    pub const PRICE: Column = Column::new("COFFEES", "PRICE");
    pub const SALES: Column = Column::new("COFFEES", "SALES");
    pub const TOTAL: Column = Column::new("COFFEES", "TOTAL");
}

/// `COFFEES.SUP_ID -> SUPPLIERS.SUP_ID`
pub const SUP_FK: ForeignKey = ForeignKey {
    name: "SUP_FK",
    column: coffees::SUP_ID,
    references: suppliers::SUP_ID,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::Table;

    #[test]
    fn test_handles_match_record_columns() {
        let names: Vec<_> = [
            suppliers::SUP_ID,
            suppliers::SUP_NAME,
            suppliers::STREET,
            suppliers::CITY,
            suppliers::STATE,
            suppliers::ZIP,
        ]
        .iter()
        .map(|c| c.name)
        .collect();
        assert_eq!(names, Supplier::COLUMNS);

        let names: Vec<_> = [
            coffees::COF_NAME,
            coffees::SUP_ID,
            coffees::PRICE,
            coffees::SALES,
            coffees::TOTAL,
        ]
        .iter()
        .map(|c| c.name)
        .collect();
        assert_eq!(names, Coffee::COLUMNS);
    }

    #[test]
    fn test_ddl_declares_foreign_key() {
        assert!(CREATE_COFFEES_TABLE.contains(SUP_FK.name));
        assert!(CREATE_COFFEES_TABLE.contains("REFERENCES SUPPLIERS (SUP_ID)"));
        assert_eq!(SUP_FK.column.table, COFFEES.name());
        assert_eq!(SUP_FK.references.table, SUPPLIERS.name());
    }

    #[test]
    fn test_suppliers_created_before_coffees() {
        let stmts = all_schema_statements();
        let sup = stmts.iter().position(|s| s.contains("TABLE IF NOT EXISTS SUPPLIERS"));
        let cof = stmts.iter().position(|s| s.contains("TABLE IF NOT EXISTS COFFEES"));
        assert!(sup < cof);
    }
}
