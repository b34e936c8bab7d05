use anyhow::{anyhow, Context, Result};
use arrow::datatypes::{DataType, Schema};
use postgres::{
    binary_copy::BinaryCopyInWriter,
    types::{ToSql, Type},
    Client, GenericClient, NoTls,
};
use tracing::debug;

use super::{create_table_sql, drop_table_sql, quote_ident, TableSink};
use crate::process::{
    convert::{cell_at, Cell},
    RowSet,
};

/// PostgreSQL-backed sink; rows go in through binary `COPY`.
pub struct PgSink {
    client: Client,
}

impl PgSink {
    pub fn connect(url: &str) -> Result<Self> {
        let client = Client::connect(url, NoTls)
            .with_context(|| format!("connecting to {}", super::redact(url)))?;
        Ok(Self { client })
    }
}

/// Wire type for an Arrow column type.
pub fn pg_type(ty: &DataType) -> Result<Type> {
    match ty {
        DataType::Int64 => Ok(Type::INT8),
        DataType::Float64 => Ok(Type::FLOAT8),
        DataType::Utf8 => Ok(Type::TEXT),
        other => Err(anyhow!("no postgres mapping for {:?}", other)),
    }
}

/// A cell typed for its column so that nulls still carry a wire type.
#[derive(Debug, PartialEq)]
enum PgCell<'a> {
    Int(Option<i64>),
    Float(Option<f64>),
    Text(Option<&'a str>),
}

impl<'a> PgCell<'a> {
    fn new(ty: &DataType, cell: Cell<'a>) -> Result<Self> {
        match (ty, cell) {
            (DataType::Int64, Cell::Int(v)) => Ok(PgCell::Int(Some(v))),
            (DataType::Int64, Cell::Null) => Ok(PgCell::Int(None)),
            (DataType::Float64, Cell::Float(v)) => Ok(PgCell::Float(Some(v))),
            (DataType::Float64, Cell::Null) => Ok(PgCell::Float(None)),
            (DataType::Utf8, Cell::Text(s)) => Ok(PgCell::Text(Some(s))),
            (DataType::Utf8, Cell::Null) => Ok(PgCell::Text(None)),
            (ty, cell) => Err(anyhow!("cell {:?} does not fit column type {:?}", cell, ty)),
        }
    }

    fn as_param(&self) -> &(dyn ToSql + Sync) {
        match self {
            PgCell::Int(v) => v as &(dyn ToSql + Sync),
            PgCell::Float(v) => v as &(dyn ToSql + Sync),
            PgCell::Text(v) => v as &(dyn ToSql + Sync),
        }
    }
}

fn recreate<C: GenericClient>(client: &mut C, table: &str, schema: &Schema) -> Result<()> {
    let sql = format!("{};\n{};", drop_table_sql(table), create_table_sql(table, schema)?);
    debug!(table, %sql, "recreating");
    client
        .batch_execute(&sql)
        .with_context(|| format!("recreating table `{}`", table))
}

fn copy_rows<C: GenericClient>(client: &mut C, table: &str, rows: &RowSet) -> Result<u64> {
    let schema = rows.schema();
    let types = schema
        .fields()
        .iter()
        .map(|f| pg_type(f.data_type()))
        .collect::<Result<Vec<_>>>()?;
    let cols: Vec<String> = schema.fields().iter().map(|f| quote_ident(f.name())).collect();
    let sql = format!(
        "COPY {} ({}) FROM STDIN BINARY",
        quote_ident(table),
        cols.join(", ")
    );

    let sink = client
        .copy_in(sql.as_str())
        .with_context(|| format!("starting COPY into `{}`", table))?;
    let mut writer = BinaryCopyInWriter::new(sink, &types);

    for r in 0..rows.num_rows() {
        let cells = schema
            .fields()
            .iter()
            .zip(rows.columns())
            .map(|(f, col)| PgCell::new(f.data_type(), cell_at(col, r)?))
            .collect::<Result<Vec<_>>>()?;
        let params: Vec<&(dyn ToSql + Sync)> = cells.iter().map(PgCell::as_param).collect();
        writer
            .write(&params)
            .with_context(|| format!("copying row {} into `{}`", r, table))?;
    }

    let n = writer
        .finish()
        .with_context(|| format!("finishing COPY into `{}`", table))?;
    Ok(n)
}

impl TableSink for PgSink {
    fn ensure_schema(&mut self, table: &str, schema: &Schema) -> Result<()> {
        recreate(&mut self.client, table, schema)
    }

    fn bulk_insert(&mut self, table: &str, rows: &RowSet) -> Result<u64> {
        copy_rows(&mut self.client, table, rows)
    }

    fn replace_table(&mut self, table: &str, rows: &RowSet) -> Result<u64> {
        let mut tx = self.client.transaction()?;
        recreate(&mut tx, table, &rows.schema())?;
        let n = copy_rows(&mut tx, table, rows)?;
        tx.commit().with_context(|| format!("committing table `{}`", table))?;
        Ok(n)
    }
}
