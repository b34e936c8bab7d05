use anyhow::{anyhow, Context, Result};
use std::{collections::HashSet, fs, path::Path};

use super::FileSpec;

/// Load an ordered list of [`FileSpec`]s from a YAML manifest.
///
/// ```yaml
/// - filename: planes.dat
///   table: planes
///   columns: [name, iata, icao]
/// - filename: countries.txt
///   table: countries
///   delimiter: "|"
///   columns: [name, iso_code, dafif_code]
/// ```
pub fn load_manifest<P: AsRef<Path>>(path: P) -> Result<Vec<FileSpec>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).with_context(|| format!("reading manifest {:?}", path))?;
    parse_manifest(&text).with_context(|| format!("parsing manifest {:?}", path))
}

pub fn parse_manifest(text: &str) -> Result<Vec<FileSpec>> {
    let specs: Vec<FileSpec> = serde_yaml::from_str(text)?;
    if specs.is_empty() {
        return Err(anyhow!("manifest lists no files"));
    }

    // Two specs writing the same table would silently clobber each other.
    let mut tables = HashSet::with_capacity(specs.len());
    for spec in &specs {
        spec.validate()?;
        if !tables.insert(spec.table.as_str()) {
            return Err(anyhow!("table `{}` is targeted more than once", spec.table));
        }
    }
    Ok(specs)
}
