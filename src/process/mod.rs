// src/process/mod.rs
pub mod convert;
pub mod utils;

use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{ArrayRef, StringBuilder},
    datatypes::{Field, Schema},
    record_batch::{RecordBatch, RecordBatchOptions},
};
use csv::ReaderBuilder;
use std::{fs::File, io::Read, path::Path, sync::Arc};
use tracing::debug;

use crate::schema::{derive_column_type, FileSpec};
use convert::convert_column;
use utils::non_missing;

/// The parsed contents of one source file, columns in `FileSpec` order.
pub type RowSet = RecordBatch;

/// Parse `path` as a headerless delimited file described by `spec`.
#[tracing::instrument(level = "debug", skip(spec, path), fields(path = %path.as_ref().display()))]
pub fn read_row_set<P: AsRef<Path>>(spec: &FileSpec, path: P) -> Result<RowSet> {
    let file = File::open(&path)
        .with_context(|| format!("Failed to open data file: {:?}", path.as_ref()))?;
    read_row_set_from(spec, file)
        .with_context(|| format!("Failed to parse {:?}", path.as_ref()))
}

/// Parse any reader as a headerless delimited file described by `spec`.
///
/// Fields are assigned to `spec.columns` by position. Every line must carry
/// exactly that many fields. Missing-value markers become nulls, then each
/// column is narrowed to Int64/Float64 when all of its values allow it.
pub fn read_row_set_from<R: Read>(spec: &FileSpec, reader: R) -> Result<RowSet> {
    let width = spec.columns.len();
    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .delimiter(spec.delimiter_byte()?)
        .flexible(true)
        .from_reader(reader);

    // 1) Collect every field as a nullable string, column by column
    let mut builders: Vec<StringBuilder> = (0..width).map(|_| StringBuilder::new()).collect();
    let mut rows = 0usize;
    for result in rdr.records() {
        let record = result.context("parsing CSV record")?;
        if record.len() != width {
            let line = record.position().map(|p| p.line()).unwrap_or(0);
            return Err(anyhow!(
                "line {} of `{}` has {} fields, expected {}",
                line,
                spec.filename,
                record.len(),
                width
            ));
        }
        for (b, field) in builders.iter_mut().zip(record.iter()) {
            b.append_option(non_missing(field));
        }
        rows += 1;
    }

    // 2) Derive a type per column and convert
    let mut fields = Vec::with_capacity(width);
    let mut columns: Vec<ArrayRef> = Vec::with_capacity(width);
    for (name, mut b) in spec.columns.iter().zip(builders) {
        let raw = b.finish();
        let ty = derive_column_type(name, raw.iter());
        columns.push(convert_column(&raw, &ty).with_context(|| format!("column `{}`", name))?);
        fields.push(Field::new(name, ty, true));
    }
    debug!(file = %spec.filename, rows, "parsed");

    // Explicit row count keeps zero-row files well-formed.
    let options = RecordBatchOptions::new().with_row_count(Some(rows));
    RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), columns, &options)
        .map_err(Into::into)
}
