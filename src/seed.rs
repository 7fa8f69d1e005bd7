//! Fixed seed data for the example tables

use crate::{Coffee, Result, Session, Supplier};

pub fn suppliers() -> Vec<Supplier> {
    vec![
        Supplier::new(101, "Acme, Inc.", "99 Market Street", "Groundsville", "CA", "95199"),
        Supplier::new(49, "Superior Coffee", "1 Party Place", "Mendocino", "CA", "95460"),
        Supplier::new(150, "The High Ground", "100 Coffee Lane", "Meadows", "CA", "93966"),
    ]
}

pub fn coffees() -> Vec<Coffee> {
    vec![
        Coffee::new("Colombian", 101, 7.99),
        Coffee::new("French_Roast", 49, 8.99),
        Coffee::new("Espresso", 150, 9.99),
        Coffee::new("Colombian_Decaf", 101, 8.99),
        Coffee::new("French_Roast_Decaf", 49, 9.99),
    ]
}

/// Rows inserted by [`populate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeedCounts {
    pub suppliers: usize,
    pub coffees: usize,
}

/// Insert the seed rows; suppliers go first so every coffee's foreign key
/// resolves.
pub fn populate(session: &Session) -> Result<SeedCounts> {
    let suppliers = session.insert_all(&suppliers())?;
    let coffees = session.insert_all(&coffees())?;
    tracing::info!(suppliers, coffees, "seed data inserted");
    Ok(SeedCounts { suppliers, coffees })
}

/// Drop and recreate the schema, then insert the seed rows
pub fn reset(session: &Session) -> Result<SeedCounts> {
    session.reset_schema()?;
    populate(session)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_every_coffee_has_a_seeded_supplier() {
        let ids: HashSet<i64> = suppliers().iter().map(|s| s.id).collect();
        assert!(coffees().iter().all(|c| ids.contains(&c.supplier_id)));
    }

    #[test]
    fn test_reset_is_repeatable() {
        let session = Session::open_in_memory().unwrap();
        let first = reset(&session).unwrap();
        let second = reset(&session).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, SeedCounts { suppliers: 3, coffees: 5 });
    }
}
