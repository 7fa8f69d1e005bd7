//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - SUPPLIERS(SUP_ID, SUP_NAME, STREET, CITY, STATE, ZIP)
//! - COFFEES(COF_NAME, SUP_ID -> SUPPLIERS.SUP_ID, PRICE, SALES, TOTAL)

pub mod schema;
pub mod session;

pub use session::{ConnectionTarget, DbStats, Session, with_session};
