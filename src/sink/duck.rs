use anyhow::{Context, Result};
use arrow::datatypes::Schema;
use duckdb::{types::Value, Connection, ToSql};
use std::path::Path;
use tracing::debug;

use super::{create_table_sql, drop_table_sql, TableSink};
use crate::process::{
    convert::{cell_at, Cell},
    RowSet,
};

/// DuckDB-backed sink, file or in-memory.
pub struct DuckSink {
    conn: Connection,
}

impl DuckSink {
    /// Open a DuckDB database on disk at `path`, creating the file if it doesn't exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path.as_ref())
            .with_context(|| format!("opening duckdb at {:?}", path.as_ref()))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

fn recreate(conn: &Connection, table: &str, schema: &Schema) -> Result<()> {
    let sql = format!("{};\n{};", drop_table_sql(table), create_table_sql(table, schema)?);
    debug!(table, %sql, "recreating");
    conn.execute_batch(&sql)
        .with_context(|| format!("recreating table `{}`", table))
}

fn to_value(cell: Cell<'_>) -> Value {
    match cell {
        Cell::Null => Value::Null,
        Cell::Int(v) => Value::BigInt(v),
        Cell::Float(v) => Value::Double(v),
        Cell::Text(s) => Value::Text(s.to_string()),
    }
}

/// Insert rows via the Appender, one row of `&dyn ToSql` at a time.
fn append(conn: &Connection, table: &str, rows: &RowSet) -> Result<u64> {
    let mut appender = conn
        .appender(table)
        .with_context(|| format!("opening appender for `{}`", table))?;

    let mut row = Vec::with_capacity(rows.num_columns());
    for r in 0..rows.num_rows() {
        row.clear();
        for col in rows.columns() {
            row.push(to_value(cell_at(col, r)?));
        }
        let params: Vec<&dyn ToSql> = row.iter().map(|v| v as &dyn ToSql).collect();
        appender
            .append_row(params.as_slice())
            .with_context(|| format!("appending row {} to `{}`", r, table))?;
    }
    appender.flush()?;
    Ok(rows.num_rows() as u64)
}

impl TableSink for DuckSink {
    fn ensure_schema(&mut self, table: &str, schema: &Schema) -> Result<()> {
        recreate(&self.conn, table, schema)
    }

    fn bulk_insert(&mut self, table: &str, rows: &RowSet) -> Result<u64> {
        append(&self.conn, table, rows)
    }

    fn replace_table(&mut self, table: &str, rows: &RowSet) -> Result<u64> {
        let tx = self.conn.transaction()?;
        recreate(&tx, table, &rows.schema())?;
        let n = append(&tx, table, rows)?;
        tx.commit().with_context(|| format!("committing table `{}`", table))?;
        Ok(n)
    }
}
