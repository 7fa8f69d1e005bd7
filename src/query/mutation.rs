//! INSERT, UPDATE and DELETE statements for mapped tables

use rusqlite::types::Value;
use crate::{Error, Result};
use super::row::Table;
use super::select::Query;
use super::sql::SqlWriter;

/// `INSERT INTO <table> (<columns>) VALUES (?, ...)` for a record type
pub fn insert_sql<T: Table>() -> String {
    let placeholders = vec!["?"; T::COLUMNS.len()].join(", ");
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        T::NAME,
        T::COLUMNS.join(", "),
        placeholders
    )
}

/// Replace every row matched by `query` with `value`
pub fn update_sql<T: Table>(query: &Query<T>, value: &T) -> Result<(String, Vec<Value>)> {
    let (table, filter) = query
        .select()
        .mutation_target()
        .ok_or_else(|| Error::Query(format!("update needs a plain filtered scan of {}", T::NAME)))?;

    let mut w = SqlWriter::default();
    w.push("UPDATE ");
    w.push(table);
    w.push(" SET ");
    let assignments: Vec<_> = T::COLUMNS.iter().zip(value.to_values()).collect();
    w.join(&assignments, ", ", |(column, value), w| {
        w.push(column);
        w.push(" = ");
        w.bind(value.clone());
    });
    if let Some(filter) = filter {
        w.push(" WHERE ");
        filter.render(&mut w);
    }
    Ok(w.finish())
}

/// Delete every row matched by `query`
pub fn delete_sql<T: Table>(query: &Query<T>) -> Result<(String, Vec<Value>)> {
    let (table, filter) = query
        .select()
        .mutation_target()
        .ok_or_else(|| Error::Query(format!("delete needs a plain filtered scan of {}", T::NAME)))?;

    let mut w = SqlWriter::default();
    w.push("DELETE FROM ");
    w.push(table);
    if let Some(filter) = filter {
        w.push(" WHERE ");
        filter.render(&mut w);
    }
    Ok(w.finish())
}
