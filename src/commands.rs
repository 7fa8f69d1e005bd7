use crate::{OutputMode, emit_success};
use coffeehouse::config::{self, CoffeehouseConfig};
use coffeehouse::query::Order;
use coffeehouse::ui::{Icons, Metric, printer, records_table};
use coffeehouse::{COFFEES, ConnectionTarget, SUPPLIERS, SUP_FK, coffees, inner_join, seed, suppliers, with_session};
use owo_colors::OwoColorize;
use rusqlite::types::Value;
use tabled::Tabled;

/// One line of the menu: a coffee and who supplies it
#[derive(Debug, serde::Serialize, Tabled)]
struct MenuRow {
    #[tabled(rename = "Coffee")]
    coffee: String,
    #[tabled(rename = "Supplier")]
    supplier: String,
    #[tabled(rename = "Price")]
    price: f64,
}

pub fn run_version(output_mode: OutputMode) -> anyhow::Result<()> {
    if output_mode.is_human() {
        printer().header(&format!("Coffeehouse {}", env!("CARGO_PKG_VERSION").bold()));
    } else {
        let data = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
        });
        emit_success(output_mode, "version", data)?;
    }
    Ok(())
}

pub fn run_init(output_mode: OutputMode, target: &ConnectionTarget, force: bool) -> anyhow::Result<()> {
    let path = config::default_config_path();
    let cfg = CoffeehouseConfig {
        database: Some(target.to_string()),
    };
    config::write_config(&path, &cfg, force)?;

    if output_mode.is_human() {
        printer().success(&format!("Wrote {}", path.display()));
        printer().field("Database", target);
    } else {
        emit_success(output_mode, "init", serde_json::json!({
            "config": path.display().to_string(),
            "database": target.to_string(),
        }))?;
    }
    Ok(())
}

pub fn run_setup(output_mode: OutputMode, target: &ConnectionTarget) -> anyhow::Result<()> {
    config::ensure_db_dir(target)?;
    let counts = with_session(target, seed::reset)?;

    if output_mode.is_human() {
        printer().success("Schema recreated and seeded");
        printer().field("Suppliers", counts.suppliers);
        printer().field("Coffees", counts.coffees);
    } else {
        emit_success(output_mode, "setup", serde_json::json!({
            "suppliers": counts.suppliers,
            "coffees": counts.coffees,
        }))?;
    }
    Ok(())
}

pub fn run_suppliers(output_mode: OutputMode, target: &ConnectionTarget, sort_by_zip: bool) -> anyhow::Result<()> {
    let query = if sort_by_zip {
        SUPPLIERS.query().sort_by(suppliers::ZIP, Order::Asc)
    } else {
        SUPPLIERS.query().sort_by(suppliers::SUP_ID, Order::Asc)
    };
    let rows = with_session(target, |session| session.fetch(&query))?;

    if output_mode.is_human() {
        printer().section(&format!("{} Suppliers", Icons::TRUCK));
        print_records(&rows);
    } else {
        emit_success(output_mode, "suppliers", serde_json::to_value(&rows)?)?;
    }
    Ok(())
}

pub fn run_coffees(
    output_mode: OutputMode,
    target: &ConnectionTarget,
    max_price: Option<f64>,
    supplier: Option<i64>,
) -> anyhow::Result<()> {
    if let Some(price) = max_price {
        if price < 0.0 {
            anyhow::bail!("--max-price must not be negative");
        }
    }

    let mut query = COFFEES.query();
    if let Some(price) = max_price {
        query = query.filter(coffees::PRICE.le(price));
    }
    if let Some(id) = supplier {
        query = query.filter(coffees::SUP_ID.equals(id));
    }
    let query = query.sort_by(coffees::COF_NAME, Order::Asc);
    let rows = with_session(target, |session| session.fetch(&query))?;

    if output_mode.is_human() {
        printer().section(&format!("{} Coffees", Icons::COFFEE));
        print_records(&rows);
    } else {
        emit_success(output_mode, "coffees", serde_json::to_value(&rows)?)?;
    }
    Ok(())
}

pub fn run_menu(output_mode: OutputMode, target: &ConnectionTarget) -> anyhow::Result<()> {
    let query = inner_join(COFFEES, SUPPLIERS, SUP_FK.predicate())
        .sort_by(coffees::COF_NAME, Order::Asc)
        .map::<(String, String, f64)>([coffees::COF_NAME, suppliers::SUP_NAME, coffees::PRICE]);
    let rows: Vec<MenuRow> = with_session(target, |session| session.fetch(&query))?
        .into_iter()
        .map(|(coffee, supplier, price)| MenuRow { coffee, supplier, price })
        .collect();

    if output_mode.is_human() {
        printer().section(&format!("{} Menu", Icons::LINK));
        print_records(&rows);
    } else {
        emit_success(output_mode, "menu", serde_json::to_value(&rows)?)?;
    }
    Ok(())
}

pub fn run_prices(output_mode: OutputMode, target: &ConnectionTarget) -> anyhow::Result<()> {
    let (min, max) = with_session(target, |session| {
        let min = session.scalar(&COFFEES.query().min::<f64>(coffees::PRICE))?;
        let max = session.scalar(&COFFEES.query().max::<f64>(coffees::PRICE))?;
        Ok((min, max))
    })?;

    if output_mode.is_human() {
        printer().section(&format!("{} Prices", Icons::MONEY));
        let price = |p: Option<f64>| p.map(|p| format!("{:.2}", p)).unwrap_or_else(|| "-".to_string());
        print_records(&[Metric::new("Cheapest", price(min)), Metric::new("Most expensive", price(max))]);
    } else {
        emit_success(output_mode, "prices", serde_json::json!({ "min": min, "max": max }))?;
    }
    Ok(())
}

pub fn run_stats(output_mode: OutputMode, target: &ConnectionTarget) -> anyhow::Result<()> {
    let stats = with_session(target, |session| session.stats())?;

    if output_mode.is_human() {
        printer().section(&format!("{} Coffeehouse Statistics {} {}", Icons::STATS, Icons::DATABASE, target));
        print_records(&[
            Metric::new("Suppliers", stats.suppliers),
            Metric::new("Coffees", stats.coffees),
        ]);
    } else {
        emit_success(output_mode, "stats", serde_json::json!({
            "suppliers": stats.suppliers,
            "coffees": stats.coffees,
        }))?;
    }
    Ok(())
}

pub fn run_sql(output_mode: OutputMode, target: &ConnectionTarget, sql: &str) -> anyhow::Result<()> {
    let (columns, rows) = with_session(target, |session| session.raw_rows(sql, &[]))?;

    let records: Vec<serde_json::Value> = rows
        .into_iter()
        .map(|row| {
            let object: serde_json::Map<String, serde_json::Value> = columns
                .iter()
                .cloned()
                .zip(row.into_iter().map(sql_to_json))
                .collect();
            serde_json::Value::Object(object)
        })
        .collect();

    if output_mode.is_human() {
        printer().section(&format!("{} {} row(s)", Icons::SCROLL, records.len()));
        if !printer().is_quiet() {
            for record in &records {
                println!("{}", record);
            }
        }
    } else {
        emit_success(output_mode, "sql", serde_json::Value::Array(records))?;
    }
    Ok(())
}

fn print_records<T: Tabled>(rows: &[T]) {
    printer().table(records_table(rows));
}

fn sql_to_json(value: Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Integer(i) => serde_json::json!(i),
        Value::Real(f) => serde_json::json!(f),
        Value::Text(s) => serde_json::Value::String(s),
        Value::Blob(bytes) => serde_json::json!(bytes),
    }
}
