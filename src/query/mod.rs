//! Query composition
//!
//! Typed query builder rendering parameterized SQL:
//! - Column handles and predicate expressions
//! - SELECT composition (filter, sort, projection, union, aggregates)
//! - Explicit cross and inner joins between table handles
//! - INSERT / UPDATE / DELETE statements for mapped tables

pub mod expr;
pub mod join;
pub mod mutation;
pub mod row;
pub mod select;
mod sql;

pub use expr::{AggregateFn, BinaryOp, Column, Expr, IntoExpr};
pub use join::{ForeignKey, cross_join, inner_join};
pub use row::{FromRow, Table, TableHandle};
pub use select::{Order, Query, Select};
