use anyhow::{Context, Result};
use std::{path::PathBuf, time::Instant};
use tracing::{info, warn};

use crate::{process::read_row_set, schema::FileSpec, sink::TableSink};

/// Outcome of one [`Importer::run`].
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ImportReport {
    /// `(table, rows written)` in import order.
    pub imported: Vec<(String, u64)>,
    /// Source files that were not present.
    pub skipped: Vec<String>,
}

/// Loads each configured file into its table, one after the other.
pub struct Importer<S> {
    specs: Vec<FileSpec>,
    data_dir: PathBuf,
    sink: S,
}

impl<S: TableSink> Importer<S> {
    pub fn new(specs: Vec<FileSpec>, data_dir: impl Into<PathBuf>, sink: S) -> Result<Self> {
        for spec in &specs {
            spec.validate()?;
        }
        Ok(Self {
            specs,
            data_dir: data_dir.into(),
            sink,
        })
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// For each spec in order: skip a missing file with a warning, otherwise
    /// parse it and replace its table. The first parse or database error
    /// aborts; tables replaced before it stay replaced.
    pub fn run(&mut self) -> Result<ImportReport> {
        let mut report = ImportReport::default();

        for spec in &self.specs {
            let path = self.data_dir.join(&spec.filename);
            if !path.is_file() {
                warn!(file = %spec.filename, "file not found, skipping");
                report.skipped.push(spec.filename.clone());
                continue;
            }

            let start = Instant::now();
            let rows = read_row_set(spec, &path)?;
            info!(file = %spec.filename, table = %spec.table, "importing");

            let n = self
                .sink
                .replace_table(&spec.table, &rows)
                .with_context(|| format!("importing {} into table {}", spec.filename, spec.table))?;
            info!(table = %spec.table, rows = n, elapsed = ?start.elapsed(), "imported");
            report.imported.push((spec.table.clone(), n));
        }

        info!(
            imported = report.imported.len(),
            skipped = report.skipped.len(),
            "all files imported successfully"
        );
        Ok(report)
    }
}
