use arrow::datatypes::DataType;
use tracing::debug;

/// Inferred scalar type of one cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum CellKind {
    Integer,
    Float,
    Text,
}

fn infer_cell_kind(v: &str) -> CellKind {
    let v = v.trim();
    if v.parse::<i64>().is_ok() {
        CellKind::Integer
    } else if v.parse::<f64>().map_or(false, f64::is_finite) {
        CellKind::Float
    } else {
        CellKind::Text
    }
}

/// For one column, widen across every non-null cell:
///  - all integers             → Int64
///  - integers and/or floats   → Float64
///  - anything else            → Utf8
///  - no non-null cells at all → Utf8
pub fn derive_column_type<'a, I>(column: &str, cells: I) -> DataType
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let mut widest: Option<CellKind> = None;

    for cell in cells.into_iter().flatten() {
        let kind = infer_cell_kind(cell);
        widest = Some(match (widest, kind) {
            (_, CellKind::Text) => {
                debug!(column, cell, "non-numeric cell, column is text");
                return DataType::Utf8;
            }
            (None, k) => k,
            (Some(CellKind::Float), _) | (_, CellKind::Float) => CellKind::Float,
            (Some(prev), _) => prev,
        });
    }

    match widest {
        Some(CellKind::Integer) => DataType::Int64,
        Some(CellKind::Float) => DataType::Float64,
        _ => {
            debug!(column, "no typed samples, defaulting to utf8");
            DataType::Utf8
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_stay_integers() {
        let cells = vec![Some("1"), None, Some("-42")];
        assert_eq!(derive_column_type("id", cells), DataType::Int64);
    }

    #[test]
    fn mixed_numbers_widen_to_float() {
        let cells = vec![Some("1"), Some("-6.081689"), Some("3")];
        assert_eq!(derive_column_type("latitude", cells), DataType::Float64);
    }

    #[test]
    fn any_text_makes_utf8() {
        let cells = vec![Some("10"), Some("U"), Some("5")];
        assert_eq!(derive_column_type("dst", cells), DataType::Utf8);
    }

    #[test]
    fn nan_and_inf_are_text() {
        let cells = vec![Some("1.5"), Some("INF")];
        assert_eq!(derive_column_type("icao", cells), DataType::Utf8);
        assert_eq!(derive_column_type("x", vec![Some("NaN")]), DataType::Utf8);
    }

    #[test]
    fn all_null_defaults_to_utf8() {
        let cells: Vec<Option<&str>> = vec![None, None];
        assert_eq!(derive_column_type("alias", cells), DataType::Utf8);
    }
}
