//! Explicit joins between two table handles

use super::expr::{Column, Expr};
use super::row::{Table, TableHandle};
use super::select::{JoinKind, Query, Select};

/// A foreign key declaration: `column` references `references`.
///
/// The constraint itself lives in the DDL; this value exists so queries can
/// join along it without restating the predicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForeignKey {
    pub name: &'static str,
    pub column: Column,
    pub references: Column,
}

impl ForeignKey {
    /// Equi-join predicate `column = references`
    pub fn predicate(&self) -> Expr {
        self.column.equals(self.references)
    }
}

fn joined<A: Table, B: Table>(
    left: TableHandle<A>,
    right: TableHandle<B>,
    kind: JoinKind,
    on: Option<Expr>,
) -> Query<(A, B)> {
    let mut projection = left.columns();
    projection.extend(right.columns());
    let mut select = Select::table(left.name(), projection);
    select.add_join(kind, right.name(), on);
    Query::from_select(select)
}

/// Every pairing of a row of `left` with a row of `right`
pub fn cross_join<A: Table, B: Table>(left: TableHandle<A>, right: TableHandle<B>) -> Query<(A, B)> {
    joined(left, right, JoinKind::Cross, None)
}

/// Pairs of rows satisfying `on`
pub fn inner_join<A: Table, B: Table>(
    left: TableHandle<A>,
    right: TableHandle<B>,
    on: Expr,
) -> Query<(A, B)> {
    joined(left, right, JoinKind::Inner, Some(on))
}
