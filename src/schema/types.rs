// src/schema/types.rs

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

fn default_delimiter() -> char {
    ','
}

/// One source file: its positional columns and the table it lands in.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Eq, Hash)]
pub struct FileSpec {
    pub filename: String,
    pub columns: Vec<String>,
    pub table: String,
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
}

impl FileSpec {
    pub fn new(filename: &str, columns: &[&str], table: &str) -> Self {
        FileSpec {
            filename: filename.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            table: table.to_string(),
            delimiter: default_delimiter(),
        }
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// The delimiter as the single byte the CSV reader expects.
    pub fn delimiter_byte(&self) -> Result<u8> {
        if !self.delimiter.is_ascii() {
            return Err(anyhow!(
                "delimiter {:?} for `{}` is not an ASCII character",
                self.delimiter,
                self.filename
            ));
        }
        Ok(self.delimiter as u8)
    }

    /// Rejects specs that could not produce a well-formed table.
    pub fn validate(&self) -> Result<()> {
        if self.filename.trim().is_empty() {
            return Err(anyhow!("file spec for table `{}` has no filename", self.table));
        }
        if self.table.trim().is_empty() {
            return Err(anyhow!("file spec `{}` has no table name", self.filename));
        }
        if self.columns.is_empty() {
            return Err(anyhow!("file spec `{}` declares no columns", self.filename));
        }
        // SQL identifiers fold case, so `Name` and `name` collide in the table.
        let mut seen = HashSet::with_capacity(self.columns.len());
        for (idx, col) in self.columns.iter().enumerate() {
            if col.trim().is_empty() {
                return Err(anyhow!(
                    "column at index {} in `{}` is empty",
                    idx,
                    self.filename
                ));
            }
            if !seen.insert(col.to_ascii_lowercase()) {
                return Err(anyhow!(
                    "column `{}` declared twice in `{}`",
                    col,
                    self.filename
                ));
            }
        }
        self.delimiter_byte()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_well_formed_spec() {
        let spec = FileSpec::new("planes.dat", &["name", "iata", "icao"], "planes");
        assert!(spec.validate().is_ok());
        assert_eq!(spec.delimiter, ',');
    }

    #[test]
    fn validate_rejects_duplicate_columns() {
        let spec = FileSpec::new("planes.dat", &["name", "iata", "name"], "planes");
        let err = spec.validate().unwrap_err().to_string();
        assert!(err.contains("declared twice"), "{}", err);
    }

    #[test]
    fn validate_rejects_columns_differing_only_in_case() {
        let spec = FileSpec::new("planes.dat", &["Name", "name", "icao"], "planes");
        let err = spec.validate().unwrap_err().to_string();
        assert!(err.contains("`name` declared twice"), "{}", err);
    }

    #[test]
    fn validate_rejects_empty_parts() {
        assert!(FileSpec::new("", &["a"], "t").validate().is_err());
        assert!(FileSpec::new("f.dat", &["a"], " ").validate().is_err());
        assert!(FileSpec::new("f.dat", &[], "t").validate().is_err());
        assert!(FileSpec::new("f.dat", &["a", ""], "t").validate().is_err());
    }

    #[test]
    fn validate_rejects_multibyte_delimiter() {
        let spec = FileSpec::new("f.dat", &["a"], "t").with_delimiter('¦');
        assert!(spec.validate().is_err());
        let pipe = FileSpec::new("f.dat", &["a"], "t").with_delimiter('|');
        assert_eq!(pipe.delimiter_byte().unwrap(), b'|');
    }
}
