//! Column handles and predicate expressions
//!
//! Expressions render to SQL text with `?` placeholders; literal values are
//! collected as bind parameters in placeholder order.

use rusqlite::types::Value;
use super::select::Select;
use super::sql::SqlWriter;

/// A column of a mapped table, always rendered qualified as `TABLE.COLUMN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    pub table: &'static str,
    pub name: &'static str,
}

/// Binary operators understood by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::Ne => "<>",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
        }
    }
}

/// Aggregate functions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AggregateFn {
    Min,
    Max,
    Sum,
    Avg,
    Count,
}

impl AggregateFn {
    pub fn as_str(&self) -> &'static str {
        match self {
            AggregateFn::Min => "MIN",
            AggregateFn::Max => "MAX",
            AggregateFn::Sum => "SUM",
            AggregateFn::Avg => "AVG",
            AggregateFn::Count => "COUNT",
        }
    }
}

/// A SQL expression: projections, predicates and aggregate calls.
#[derive(Debug, Clone)]
pub enum Expr {
    Column(Column),
    /// Unqualified column name, used for ORDER BY on a compound select
    Bare(&'static str),
    /// `TABLE_COLUMN`, the output label of a column in a derived join
    Label(Column),
    /// `*`
    All,
    Value(Value),
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Not(Box<Expr>),
    IsNull(Box<Expr>),
    InList {
        expr: Box<Expr>,
        values: Vec<Expr>,
    },
    InQuery {
        expr: Box<Expr>,
        query: Box<Select>,
    },
    Exists(Box<Select>),
    /// `arg: None` renders `COUNT(*)`
    Aggregate {
        func: AggregateFn,
        arg: Option<Box<Expr>>,
    },
}

/// Conversion into an expression operand: columns, expressions and literals.
pub trait IntoExpr {
    fn into_expr(self) -> Expr;
}

impl IntoExpr for Expr {
    fn into_expr(self) -> Expr {
        self
    }
}

impl IntoExpr for Column {
    fn into_expr(self) -> Expr {
        Expr::Column(self)
    }
}

impl IntoExpr for &str {
    fn into_expr(self) -> Expr {
        Expr::Value(Value::Text(self.to_string()))
    }
}

macro_rules! literal_into_expr {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoExpr for $ty {
                fn into_expr(self) -> Expr {
                    Expr::Value(Value::from(self))
                }
            }
        )*
    };
}

literal_into_expr!(String, i64, i32, f64, bool);

impl Column {
    pub const fn new(table: &'static str, name: &'static str) -> Self {
        Self { table, name }
    }

    fn compare(self, op: BinaryOp, rhs: impl IntoExpr) -> Expr {
        Expr::binary(op, Expr::Column(self), rhs.into_expr())
    }

    pub fn equals(self, rhs: impl IntoExpr) -> Expr {
        self.compare(BinaryOp::Eq, rhs)
    }

    pub fn not_equals(self, rhs: impl IntoExpr) -> Expr {
        self.compare(BinaryOp::Ne, rhs)
    }

    pub fn lt(self, rhs: impl IntoExpr) -> Expr {
        self.compare(BinaryOp::Lt, rhs)
    }

    pub fn le(self, rhs: impl IntoExpr) -> Expr {
        self.compare(BinaryOp::Le, rhs)
    }

    pub fn gt(self, rhs: impl IntoExpr) -> Expr {
        self.compare(BinaryOp::Gt, rhs)
    }

    pub fn ge(self, rhs: impl IntoExpr) -> Expr {
        self.compare(BinaryOp::Ge, rhs)
    }

    pub fn is_null(self) -> Expr {
        Expr::IsNull(Box::new(Expr::Column(self)))
    }

    /// `column IN (v1, v2, ...)`
    pub fn in_list<V: IntoExpr>(self, values: impl IntoIterator<Item = V>) -> Expr {
        Expr::InList {
            expr: Box::new(Expr::Column(self)),
            values: values.into_iter().map(IntoExpr::into_expr).collect(),
        }
    }

    /// `column IN (SELECT ...)`. The subquery may reference columns of the
    /// outer query, which makes it correlated.
    pub fn in_query<U>(self, query: super::Query<U>) -> Expr {
        Expr::InQuery {
            expr: Box::new(Expr::Column(self)),
            query: Box::new(query.into_select()),
        }
    }

    pub fn min(self) -> Expr {
        Expr::aggregate(AggregateFn::Min, Expr::Column(self))
    }

    pub fn max(self) -> Expr {
        Expr::aggregate(AggregateFn::Max, Expr::Column(self))
    }

    pub fn sum(self) -> Expr {
        Expr::aggregate(AggregateFn::Sum, Expr::Column(self))
    }

    pub fn avg(self) -> Expr {
        Expr::aggregate(AggregateFn::Avg, Expr::Column(self))
    }
}

impl Expr {
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Self {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn aggregate(func: AggregateFn, arg: Expr) -> Self {
        Expr::Aggregate {
            func,
            arg: Some(Box::new(arg)),
        }
    }

    pub fn count_all() -> Self {
        Expr::Aggregate {
            func: AggregateFn::Count,
            arg: None,
        }
    }

    pub fn and(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::And, self, rhs)
    }

    pub fn or(self, rhs: Expr) -> Self {
        Expr::binary(BinaryOp::Or, self, rhs)
    }

    pub fn negate(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Strip table qualifiers so the expression can address the result
    /// columns of a compound select.
    pub fn unqualified(self) -> Self {
        self.map_columns(&|column| Expr::Bare(column.name))
    }

    /// Address columns by their output label inside a derived join
    pub fn labeled(self) -> Self {
        self.map_columns(&Expr::Label)
    }

    /// Rewrite every column reference with `f`. Subqueries keep their own
    /// scope and are left alone.
    pub(crate) fn map_columns(self, f: &impl Fn(Column) -> Expr) -> Self {
        match self {
            Expr::Column(column) => f(column),
            Expr::Binary { op, lhs, rhs } => Expr::binary(op, lhs.map_columns(f), rhs.map_columns(f)),
            Expr::Not(inner) => Expr::Not(Box::new(inner.map_columns(f))),
            Expr::IsNull(inner) => Expr::IsNull(Box::new(inner.map_columns(f))),
            Expr::InList { expr, values } => Expr::InList {
                expr: Box::new(expr.map_columns(f)),
                values: values.into_iter().map(|v| v.map_columns(f)).collect(),
            },
            Expr::InQuery { expr, query } => Expr::InQuery {
                expr: Box::new(expr.map_columns(f)),
                query,
            },
            Expr::Aggregate { func, arg } => Expr::Aggregate {
                func,
                arg: arg.map(|a| Box::new(a.map_columns(f))),
            },
            other => other,
        }
    }

    pub(crate) fn render(&self, w: &mut SqlWriter) {
        match self {
            Expr::Column(column) => {
                w.push(column.table);
                w.push(".");
                w.push(column.name);
            }
            Expr::Bare(name) => w.push(name),
            Expr::Label(column) => {
                w.push(column.table);
                w.push("_");
                w.push(column.name);
            }
            Expr::All => w.push("*"),
            Expr::Value(value) => w.bind(value.clone()),
            Expr::Binary { op, lhs, rhs } => {
                w.push("(");
                lhs.render(w);
                w.push(" ");
                w.push(op.as_str());
                w.push(" ");
                rhs.render(w);
                w.push(")");
            }
            Expr::Not(inner) => {
                w.push("NOT (");
                inner.render(w);
                w.push(")");
            }
            Expr::IsNull(inner) => {
                inner.render(w);
                w.push(" IS NULL");
            }
            Expr::InList { expr, values } => {
                expr.render(w);
                w.push(" IN (");
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        w.push(", ");
                    }
                    value.render(w);
                }
                w.push(")");
            }
            Expr::InQuery { expr, query } => {
                expr.render(w);
                w.push(" IN (");
                query.render(w);
                w.push(")");
            }
            Expr::Exists(query) => {
                w.push("EXISTS (");
                query.render(w);
                w.push(")");
            }
            Expr::Aggregate { func, arg } => {
                w.push(func.as_str());
                w.push("(");
                match arg {
                    Some(arg) => arg.render(w),
                    None => w.push("*"),
                }
                w.push(")");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRICE: Column = Column::new("COFFEES", "PRICE");
    const NAME: Column = Column::new("COFFEES", "COF_NAME");

    fn rendered(expr: &Expr) -> (String, Vec<Value>) {
        let mut w = SqlWriter::default();
        expr.render(&mut w);
        w.finish()
    }

    #[test]
    fn test_comparison_binds_literal() {
        let (sql, params) = rendered(&PRICE.gt(9.0));
        assert_eq!(sql, "(COFFEES.PRICE > ?)");
        assert_eq!(params, vec![Value::Real(9.0)]);
    }

    #[test]
    fn test_conjunction_keeps_param_order() {
        let expr = NAME.equals("Espresso").or(PRICE.lt(8.0).negate());
        let (sql, params) = rendered(&expr);
        assert_eq!(sql, "((COFFEES.COF_NAME = ?) OR NOT ((COFFEES.PRICE < ?)))");
        assert_eq!(params, vec![Value::Text("Espresso".into()), Value::Real(8.0)]);
    }

    #[test]
    fn test_in_list_and_aggregate() {
        let (sql, params) = rendered(&NAME.in_list(["Colombian", "Espresso"]));
        assert_eq!(sql, "COFFEES.COF_NAME IN (?, ?)");
        assert_eq!(params.len(), 2);

        let (sql, _) = rendered(&PRICE.max());
        assert_eq!(sql, "MAX(COFFEES.PRICE)");

        let (sql, _) = rendered(&Expr::count_all());
        assert_eq!(sql, "COUNT(*)");
    }

    #[test]
    fn test_unqualified_strips_table() {
        let expr = PRICE.ge(8.0).and(NAME.is_null()).unqualified();
        let (sql, _) = rendered(&expr);
        assert_eq!(sql, "((PRICE >= ?) AND COF_NAME IS NULL)");
    }

    #[test]
    fn test_labeled_uses_output_labels() {
        let expr = Column::new("COFFEES", "SUP_ID")
            .equals(49i64)
            .or(Column::new("SUPPLIERS", "SUP_ID").is_null())
            .labeled();
        let (sql, _) = rendered(&expr);
        assert_eq!(sql, "((COFFEES_SUP_ID = ?) OR SUPPLIERS_SUP_ID IS NULL)");
    }

    #[test]
    fn test_column_to_column_comparison() {
        let fk = Column::new("COFFEES", "SUP_ID").equals(Column::new("SUPPLIERS", "SUP_ID"));
        let (sql, params) = rendered(&fk);
        assert_eq!(sql, "(COFFEES.SUP_ID = SUPPLIERS.SUP_ID)");
        assert!(params.is_empty());
    }
}
