//! SELECT statements and the typed [`Query`] builder
//!
//! A [`Query<T>`] is an immutable description of a SELECT whose rows decode
//! into `T`. Every combinator consumes the query and returns a new one;
//! nothing touches the database until a [`crate::Session`] executes it.
//!
//! Clauses that must apply to a whole compound or limited result (a filter
//! after a union, a sort after a `take`) wrap the query in a derived table
//! first. A derived table over one table is aliased to that table's name, so
//! qualified columns and correlated subqueries keep resolving. A derived join
//! labels every output column `TABLE_COLUMN` and is addressed by label.

use std::marker::PhantomData;
use rusqlite::types::{FromSql, Value};
use super::expr::{AggregateFn, Column, Expr, IntoExpr};
use super::sql::SqlWriter;

/// SQLite reads LIMIT and OFFSET as signed 64-bit integers
const MAX_ROWS: u64 = i64::MAX as u64;

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Order {
    Asc,
    Desc,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Order::Asc => "ASC",
            Order::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Cross,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOp {
    Union,
    UnionAll,
}

impl SetOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            SetOp::Union => " UNION ",
            SetOp::UnionAll => " UNION ALL ",
        }
    }
}

#[derive(Debug, Clone)]
enum Source {
    Table(&'static str),
    Derived {
        inner: Box<Select>,
        alias: Option<&'static str>,
    },
}

#[derive(Debug, Clone)]
struct Join {
    kind: JoinKind,
    table: &'static str,
    on: Option<Expr>,
}

/// An untyped SELECT statement.
#[derive(Debug, Clone)]
pub struct Select {
    distinct: bool,
    /// Render projected columns with their `TABLE_COLUMN` label
    labeled: bool,
    projection: Vec<Expr>,
    source: Source,
    joins: Vec<Join>,
    filter: Option<Expr>,
    compounds: Vec<(SetOp, Select)>,
    order_by: Vec<(Expr, Order)>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl Select {
    fn new(source: Source, projection: Vec<Expr>) -> Self {
        Self {
            distinct: false,
            labeled: false,
            projection,
            source,
            joins: Vec::new(),
            filter: None,
            compounds: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    pub(crate) fn table(name: &'static str, projection: Vec<Expr>) -> Self {
        Self::new(Source::Table(name), projection)
    }

    fn derived(inner: Select, alias: Option<&'static str>) -> Self {
        let source = Source::Derived {
            inner: Box::new(inner),
            alias,
        };
        Self::new(source, vec![Expr::All])
    }

    pub(crate) fn add_join(&mut self, kind: JoinKind, table: &'static str, on: Option<Expr>) {
        self.joins.push(Join { kind, table, on });
    }

    fn is_compound(&self) -> bool {
        !self.compounds.is_empty()
    }

    fn is_limited(&self) -> bool {
        self.limit.is_some() || self.offset.is_some()
    }

    /// The one table this select reads from, directly or through an aliased
    /// derived table. `None` for joins.
    fn single_table(&self) -> Option<&'static str> {
        if !self.joins.is_empty() {
            return None;
        }
        match &self.source {
            Source::Table(name) => Some(*name),
            Source::Derived { alias, .. } => *alias,
        }
    }

    fn reads_labels(&self) -> bool {
        self.labeled || matches!(self.source, Source::Derived { alias: None, .. })
    }

    fn column_ref(&self, column: Column) -> Expr {
        if self.reads_labels() {
            Expr::Label(column)
        } else if self.is_compound() {
            Expr::Bare(column.name)
        } else {
            Expr::Column(column)
        }
    }

    fn scoped(&self, expr: Expr) -> Expr {
        expr.map_columns(&|column| self.column_ref(column))
    }

    /// Label the projected columns of a join and of every compound member
    fn label(&mut self) {
        if matches!(self.source, Source::Table(_)) {
            self.labeled = true;
        }
        for (_, member) in &mut self.compounds {
            member.label();
        }
    }

    /// Make the current result the FROM source of a new select
    fn wrap(mut self) -> Self {
        match self.single_table() {
            Some(table) => Select::derived(self, Some(table)),
            None => {
                self.label();
                Select::derived(self, None)
            }
        }
    }

    fn wrap_if(self, cond: bool) -> Self {
        if cond { self.wrap() } else { self }
    }

    fn and_where(&mut self, predicate: Expr) {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
    }

    /// The table and predicate of a single-table select, the only shape an
    /// UPDATE or DELETE can be derived from.
    pub(crate) fn mutation_target(&self) -> Option<(&'static str, Option<&Expr>)> {
        match self.source {
            Source::Table(table)
                if self.joins.is_empty()
                    && !self.is_compound()
                    && !self.is_limited()
                    && !self.distinct =>
            {
                Some((table, self.filter.as_ref()))
            }
            _ => None,
        }
    }

    fn render_core(&self, w: &mut SqlWriter) {
        w.push("SELECT ");
        if self.distinct {
            w.push("DISTINCT ");
        }
        let labeled = self.labeled;
        w.join(&self.projection, ", ", |expr, w| {
            expr.render(w);
            if let (true, Expr::Column(column)) = (labeled, expr) {
                w.push(" AS ");
                Expr::Label(*column).render(w);
            }
        });
        w.push(" FROM ");
        match &self.source {
            Source::Table(name) => w.push(name),
            Source::Derived { inner, alias } => {
                w.push("(");
                inner.render(w);
                w.push(")");
                if let Some(alias) = alias {
                    w.push(" AS ");
                    w.push(alias);
                }
            }
        }
        for join in &self.joins {
            match join.kind {
                JoinKind::Inner => w.push(" INNER JOIN "),
                JoinKind::Cross => w.push(" CROSS JOIN "),
            }
            w.push(join.table);
            if let Some(on) = &join.on {
                w.push(" ON ");
                on.render(w);
            }
        }
        if let Some(filter) = &self.filter {
            w.push(" WHERE ");
            filter.render(w);
        }
    }

    pub(crate) fn render(&self, w: &mut SqlWriter) {
        self.render_core(w);
        for (op, member) in &self.compounds {
            w.push(op.as_str());
            member.render_core(w);
        }
        if !self.order_by.is_empty() {
            w.push(" ORDER BY ");
            w.join(&self.order_by, ", ", |(expr, order), w| {
                expr.render(w);
                w.push(" ");
                w.push(order.as_str());
            });
        }
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => w.push(&format!(" LIMIT {} OFFSET {}", limit, offset)),
            (Some(limit), None) => w.push(&format!(" LIMIT {}", limit)),
            (None, Some(offset)) => w.push(&format!(" LIMIT -1 OFFSET {}", offset)),
            (None, None) => {}
        }
    }

    pub fn to_sql(&self) -> (String, Vec<Value>) {
        let mut w = SqlWriter::default();
        self.render(&mut w);
        w.finish()
    }
}

/// A SELECT whose rows decode into `T`.
pub struct Query<T> {
    select: Select,
    marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self::from_select(self.select.clone())
    }
}

impl<T> std::fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("row", &std::any::type_name::<T>())
            .field("select", &self.select)
            .finish()
    }
}

impl<T> Query<T> {
    pub(crate) fn from_select(select: Select) -> Self {
        Self {
            select,
            marker: PhantomData,
        }
    }

    pub(crate) fn scan(table: &'static str, projection: Vec<Expr>) -> Self {
        Self::from_select(Select::table(table, projection))
    }

    pub(crate) fn select(&self) -> &Select {
        &self.select
    }

    pub(crate) fn into_select(self) -> Select {
        self.select
    }

    /// Rendered SQL text and its bind parameters
    pub fn to_sql(&self) -> (String, Vec<Value>) {
        self.select.to_sql()
    }

    /// Keep rows matching `predicate`. Repeated filters are ANDed.
    pub fn filter(self, predicate: Expr) -> Self {
        let wrap = self.select.is_compound() || self.select.is_limited();
        let mut select = self.select.wrap_if(wrap);
        let predicate = select.scoped(predicate);
        select.and_where(predicate);
        Self::from_select(select)
    }

    /// Sort by `column`. Earlier sort keys take precedence.
    pub fn sort_by(self, column: Column, order: Order) -> Self {
        let wrap = self.select.is_limited();
        let mut select = self.select.wrap_if(wrap);
        let key = select.column_ref(column);
        select.order_by.push((key, order));
        Self::from_select(select)
    }

    /// At most `n` rows
    pub fn take(self, n: u64) -> Self {
        let wrap = self.select.limit.is_some();
        let mut select = self.select.wrap_if(wrap);
        select.limit = Some(n.min(MAX_ROWS));
        Self::from_select(select)
    }

    /// Skip the first `n` rows
    pub fn skip(self, n: u64) -> Self {
        let wrap = self.select.limit.is_some();
        let mut select = self.select.wrap_if(wrap);
        select.offset = Some(select.offset.unwrap_or(0).saturating_add(n).min(MAX_ROWS));
        Self::from_select(select)
    }

    pub fn distinct(self) -> Self {
        let wrap = self.select.is_limited();
        let mut select = self.select.wrap_if(wrap);
        select.distinct = true;
        Self::from_select(select)
    }

    /// Replace the projection. `U` must decode exactly the projected columns.
    pub fn map<U>(self, projection: impl IntoIterator<Item = impl IntoExpr>) -> Query<U> {
        let wrap = self.select.is_compound() || self.select.is_limited() || self.select.distinct;
        let mut select = self.select.wrap_if(wrap);
        let projection = projection
            .into_iter()
            .map(|expr| select.scoped(expr.into_expr()))
            .collect();
        select.projection = projection;
        Query::from_select(select)
    }

    /// Relational UNION; duplicate rows are removed. Ordering and limits of
    /// `other` do not survive, only those applied after the union.
    pub fn union(self, other: Query<T>) -> Self {
        self.compound(SetOp::Union, other)
    }

    /// UNION ALL; duplicates are kept
    pub fn union_all(self, other: Query<T>) -> Self {
        self.compound(SetOp::UnionAll, other)
    }

    fn compound(self, op: SetOp, other: Query<T>) -> Self {
        let wrap = self.select.is_limited();
        let mut select = self.select.wrap_if(wrap);

        let mut other = other.select;
        if other.is_limited() || other.is_compound() {
            other = other.wrap();
        }

        // Result columns take the first member's names; a join's are ambiguous
        // until labeled.
        let joined = select.single_table().is_none();
        if joined {
            select.label();
            other.label();
        }
        select.order_by = std::mem::take(&mut select.order_by)
            .into_iter()
            .map(|(expr, order)| {
                let key = if joined { expr.labeled() } else { expr.unqualified() };
                (key, order)
            })
            .collect();
        select.compounds.push((op, other));
        Self::from_select(select)
    }

    fn aggregate<V>(self, func: AggregateFn, column: Column) -> Query<V> {
        let wrap = self.select.is_compound() || self.select.is_limited() || self.select.distinct;
        let mut select = self.select.wrap_if(wrap);
        let arg = select.column_ref(column);
        select.projection = vec![Expr::aggregate(func, arg)];
        select.order_by.clear();
        Query::from_select(select)
    }

    /// Smallest value of `column`; `None` when there are no rows
    pub fn min<V: FromSql>(self, column: Column) -> Query<Option<V>> {
        self.aggregate(AggregateFn::Min, column)
    }

    /// Largest value of `column`; `None` when there are no rows
    pub fn max<V: FromSql>(self, column: Column) -> Query<Option<V>> {
        self.aggregate(AggregateFn::Max, column)
    }

    pub fn sum<V: FromSql>(self, column: Column) -> Query<Option<V>> {
        self.aggregate(AggregateFn::Sum, column)
    }

    pub fn avg(self, column: Column) -> Query<Option<f64>> {
        self.aggregate(AggregateFn::Avg, column)
    }

    /// Number of rows this query produces
    pub fn count(self) -> Query<i64> {
        let mut select = self.select.wrap();
        select.projection = vec![Expr::count_all()];
        Query::from_select(select)
    }

    /// `EXISTS (...)` predicate over this query
    pub fn exists(self) -> Expr {
        Expr::Exists(Box::new(self.select))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAME: Column = Column::new("COFFEES", "COF_NAME");
    const PRICE: Column = Column::new("COFFEES", "PRICE");
    const SUP_ID: Column = Column::new("SUPPLIERS", "SUP_ID");
    const COF_SUP_ID: Column = Column::new("COFFEES", "SUP_ID");

    fn names() -> Query<String> {
        Query::scan("COFFEES", vec![Expr::Column(NAME)])
    }

    fn supplier_ids() -> Query<(i64, i64)> {
        let mut select = Select::table("SUPPLIERS", vec![Expr::Column(SUP_ID), Expr::Column(COF_SUP_ID)]);
        select.add_join(JoinKind::Cross, "COFFEES", None);
        Query::from_select(select)
    }

    #[test]
    fn test_filter_and_sort() {
        let (sql, params) = names()
            .filter(PRICE.lt(9.0))
            .filter(NAME.not_equals("Espresso"))
            .sort_by(PRICE, Order::Desc)
            .to_sql();
        assert_eq!(
            sql,
            "SELECT COFFEES.COF_NAME FROM COFFEES WHERE ((COFFEES.PRICE < ?) AND (COFFEES.COF_NAME <> ?)) ORDER BY COFFEES.PRICE DESC"
        );
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_union_orders_by_bare_name() {
        let (sql, _) = names()
            .filter(PRICE.lt(8.0))
            .union(names().filter(PRICE.gt(9.0)))
            .sort_by(NAME, Order::Asc)
            .to_sql();
        assert_eq!(
            sql,
            "SELECT COFFEES.COF_NAME FROM COFFEES WHERE (COFFEES.PRICE < ?) UNION SELECT COFFEES.COF_NAME FROM COFFEES WHERE (COFFEES.PRICE > ?) ORDER BY COF_NAME ASC"
        );
    }

    #[test]
    fn test_filter_after_union_wraps() {
        let (sql, params) = names()
            .union_all(names())
            .filter(NAME.equals("Colombian"))
            .to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM (SELECT COFFEES.COF_NAME FROM COFFEES UNION ALL SELECT COFFEES.COF_NAME FROM COFFEES) AS COFFEES WHERE (COFFEES.COF_NAME = ?)"
        );
        assert_eq!(params, vec![Value::Text("Colombian".into())]);
    }

    #[test]
    fn test_take_skip() {
        let (sql, _) = names().skip(1).take(2).to_sql();
        assert_eq!(sql, "SELECT COFFEES.COF_NAME FROM COFFEES LIMIT 2 OFFSET 1");

        let (sql, _) = names().skip(3).to_sql();
        assert_eq!(sql, "SELECT COFFEES.COF_NAME FROM COFFEES LIMIT -1 OFFSET 3");

        let (sql, _) = names().take(3).sort_by(NAME, Order::Asc).to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM (SELECT COFFEES.COF_NAME FROM COFFEES LIMIT 3) AS COFFEES ORDER BY COFFEES.COF_NAME ASC"
        );
    }

    #[test]
    fn test_oversized_limits_are_clamped() {
        let (sql, _) = names().take(u64::MAX).to_sql();
        assert_eq!(sql, "SELECT COFFEES.COF_NAME FROM COFFEES LIMIT 9223372036854775807");

        let (sql, _) = names().skip(u64::MAX).skip(1).to_sql();
        assert_eq!(sql, "SELECT COFFEES.COF_NAME FROM COFFEES LIMIT -1 OFFSET 9223372036854775807");
    }

    #[test]
    fn test_wrapped_join_addresses_columns_by_label() {
        let (sql, params) = supplier_ids()
            .take(10)
            .filter(COF_SUP_ID.equals(49i64))
            .sort_by(SUP_ID, Order::Desc)
            .to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM (SELECT SUPPLIERS.SUP_ID AS SUPPLIERS_SUP_ID, COFFEES.SUP_ID AS COFFEES_SUP_ID FROM SUPPLIERS CROSS JOIN COFFEES LIMIT 10) WHERE (COFFEES_SUP_ID = ?) ORDER BY SUPPLIERS_SUP_ID DESC"
        );
        assert_eq!(params, vec![Value::Integer(49)]);
    }

    #[test]
    fn test_join_union_orders_by_label() {
        let (sql, _) = supplier_ids()
            .sort_by(COF_SUP_ID, Order::Asc)
            .union(supplier_ids())
            .to_sql();
        assert_eq!(
            sql,
            "SELECT SUPPLIERS.SUP_ID AS SUPPLIERS_SUP_ID, COFFEES.SUP_ID AS COFFEES_SUP_ID FROM SUPPLIERS CROSS JOIN COFFEES UNION SELECT SUPPLIERS.SUP_ID AS SUPPLIERS_SUP_ID, COFFEES.SUP_ID AS COFFEES_SUP_ID FROM SUPPLIERS CROSS JOIN COFFEES ORDER BY COFFEES_SUP_ID ASC"
        );
    }

    #[test]
    fn test_wrapped_table_keeps_outer_scope_for_subqueries() {
        let correlated = names().filter(COF_SUP_ID.equals(SUP_ID)).exists();
        let suppliers: Query<i64> = Query::scan("SUPPLIERS", vec![Expr::Column(SUP_ID)]);
        let (sql, _) = suppliers.take(2).filter(correlated).to_sql();
        assert_eq!(
            sql,
            "SELECT * FROM (SELECT SUPPLIERS.SUP_ID FROM SUPPLIERS LIMIT 2) AS SUPPLIERS WHERE EXISTS (SELECT COFFEES.COF_NAME FROM COFFEES WHERE (COFFEES.SUP_ID = SUPPLIERS.SUP_ID))"
        );
    }

    #[test]
    fn test_aggregate_drops_ordering() {
        let (sql, _) = names()
            .sort_by(PRICE, Order::Asc)
            .max::<f64>(PRICE)
            .to_sql();
        assert_eq!(sql, "SELECT MAX(COFFEES.PRICE) FROM COFFEES");
    }

    #[test]
    fn test_count_wraps() {
        let (sql, _) = names().filter(PRICE.gt(8.0)).count().to_sql();
        assert_eq!(
            sql,
            "SELECT COUNT(*) FROM (SELECT COFFEES.COF_NAME FROM COFFEES WHERE (COFFEES.PRICE > ?)) AS COFFEES"
        );
    }

    #[test]
    fn test_subquery_params_follow_text_order() {
        let sub = names().filter(PRICE.gt(9.5));
        let (sql, params) = names()
            .filter(PRICE.ge(1.0).and(NAME.in_query(sub)))
            .to_sql();
        assert_eq!(
            sql,
            "SELECT COFFEES.COF_NAME FROM COFFEES WHERE ((COFFEES.PRICE >= ?) AND COFFEES.COF_NAME IN (SELECT COFFEES.COF_NAME FROM COFFEES WHERE (COFFEES.PRICE > ?)))"
        );
        assert_eq!(params, vec![Value::Real(1.0), Value::Real(9.5)]);
    }

    #[test]
    fn test_mutation_target_rejects_compound() {
        assert!(names().filter(PRICE.gt(1.0)).select().mutation_target().is_some());
        assert!(names().union(names()).select().mutation_target().is_none());
        assert!(names().take(1).select().mutation_target().is_none());
    }
}
