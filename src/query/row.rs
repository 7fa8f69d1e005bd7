//! Row projections
//!
//! [`FromRow`] decodes a value from consecutive columns of a result row;
//! [`Table`] adds the write side for records stored in a mapped table.

use std::marker::PhantomData;
use rusqlite::Row;
use rusqlite::types::{FromSql, Value};
use super::expr::Expr;
use super::select::Query;

/// Decode a value from `WIDTH` consecutive columns starting at `offset`.
pub trait FromRow: Sized {
    const WIDTH: usize;

    fn from_row_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self>;
}

/// A record stored in a mapped table.
///
/// `COLUMNS` lists the stored columns in the same order as the record's
/// fields; `to_values` produces bind values in that order and
/// [`FromRow::from_row_at`] reads them back in that order.
pub trait Table: FromRow {
    const NAME: &'static str;
    const COLUMNS: &'static [&'static str];
    const PRIMARY_KEY: &'static str;

    fn to_values(&self) -> Vec<Value>;
}

macro_rules! scalar_from_row {
    ($($ty:ty),* $(,)?) => {
        $(
            impl FromRow for $ty {
                const WIDTH: usize = 1;

                fn from_row_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
                    row.get(offset)
                }
            }
        )*
    };
}

scalar_from_row!(String, i64, i32, f64, bool);

impl<V: FromSql> FromRow for Option<V> {
    const WIDTH: usize = 1;

    fn from_row_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        row.get(offset)
    }
}

impl<A: FromRow, B: FromRow> FromRow for (A, B) {
    const WIDTH: usize = A::WIDTH + B::WIDTH;

    fn from_row_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok((A::from_row_at(row, offset)?, B::from_row_at(row, offset + A::WIDTH)?))
    }
}

impl<A: FromRow, B: FromRow, C: FromRow> FromRow for (A, B, C) {
    const WIDTH: usize = A::WIDTH + B::WIDTH + C::WIDTH;

    fn from_row_at(row: &Row<'_>, offset: usize) -> rusqlite::Result<Self> {
        Ok((
            A::from_row_at(row, offset)?,
            B::from_row_at(row, offset + A::WIDTH)?,
            C::from_row_at(row, offset + A::WIDTH + B::WIDTH)?,
        ))
    }
}

/// Handle for a mapped table; the starting point of every query on it.
pub struct TableHandle<T> {
    marker: PhantomData<fn() -> T>,
}

impl<T> TableHandle<T> {
    pub const fn new() -> Self {
        Self { marker: PhantomData }
    }
}

impl<T> Clone for TableHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for TableHandle<T> {}

impl<T> std::fmt::Debug for TableHandle<T>
where
    T: Table,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TableHandle").field(&T::NAME).finish()
    }
}

impl<T: Table> TableHandle<T> {
    pub fn name(&self) -> &'static str {
        T::NAME
    }

    /// The table's columns, qualified, in projection order
    pub fn columns(&self) -> Vec<Expr> {
        T::COLUMNS
            .iter()
            .map(|name| Expr::Column(super::Column::new(T::NAME, name)))
            .collect()
    }

    /// Full scan of the table
    pub fn query(&self) -> Query<T> {
        Query::scan(T::NAME, self.columns())
    }
}
