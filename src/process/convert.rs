use anyhow::{anyhow, Result};
use arrow::{
    array::{Array, ArrayRef, Float64Array, Float64Builder, Int64Array, Int64Builder, StringArray},
    datatypes::DataType,
};
use std::sync::Arc;

/// One scalar pulled back out of a row set, borrowed from its column.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Null,
    Int(i64),
    Float(f64),
    Text(&'a str),
}

/// Turn a raw string column into the `target` type.
/// Callers only pass targets that `derive_column_type` chose for this column,
/// so every non-null cell is expected to parse.
pub fn convert_column(raw: &StringArray, target: &DataType) -> Result<ArrayRef> {
    match target {
        DataType::Int64 => {
            let mut b = Int64Builder::with_capacity(raw.len());
            for opt in raw.iter() {
                let v = opt
                    .map(|s| {
                        s.trim()
                            .parse::<i64>()
                            .map_err(|e| anyhow!("`{}` is not an integer: {}", s, e))
                    })
                    .transpose()?;
                b.append_option(v);
            }
            Ok(Arc::new(b.finish()) as ArrayRef)
        }
        DataType::Float64 => {
            let mut b = Float64Builder::with_capacity(raw.len());
            for opt in raw.iter() {
                let v = opt
                    .map(|s| {
                        s.trim()
                            .parse::<f64>()
                            .map_err(|e| anyhow!("`{}` is not a number: {}", s, e))
                    })
                    .transpose()?;
                b.append_option(v);
            }
            Ok(Arc::new(b.finish()) as ArrayRef)
        }
        DataType::Utf8 => Ok(Arc::new(raw.clone()) as ArrayRef),
        other => Err(anyhow!("unsupported column type {:?}", other)),
    }
}

/// Read row `row` of `array`.
pub fn cell_at(array: &ArrayRef, row: usize) -> Result<Cell<'_>> {
    if array.is_null(row) {
        return Ok(Cell::Null);
    }
    match array.data_type() {
        DataType::Int64 => {
            let a = array
                .as_any()
                .downcast_ref::<Int64Array>()
                .ok_or_else(|| anyhow!("expected Int64Array"))?;
            Ok(Cell::Int(a.value(row)))
        }
        DataType::Float64 => {
            let a = array
                .as_any()
                .downcast_ref::<Float64Array>()
                .ok_or_else(|| anyhow!("expected Float64Array"))?;
            Ok(Cell::Float(a.value(row)))
        }
        DataType::Utf8 => {
            let a = array
                .as_any()
                .downcast_ref::<StringArray>()
                .ok_or_else(|| anyhow!("expected StringArray"))?;
            Ok(Cell::Text(a.value(row)))
        }
        other => Err(anyhow!("unsupported column type {:?}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_integers_keeping_nulls() -> Result<()> {
        let raw = StringArray::from(vec![Some("1"), None, Some(" 7 ")]);
        let arr = convert_column(&raw, &DataType::Int64)?;
        assert_eq!(cell_at(&arr, 0)?, Cell::Int(1));
        assert_eq!(cell_at(&arr, 1)?, Cell::Null);
        assert_eq!(cell_at(&arr, 2)?, Cell::Int(7));
        Ok(())
    }

    #[test]
    fn converts_floats_and_text() -> Result<()> {
        let raw = StringArray::from(vec![Some("-6.081689"), Some("145")]);
        let arr = convert_column(&raw, &DataType::Float64)?;
        assert_eq!(cell_at(&arr, 0)?, Cell::Float(-6.081689));
        assert_eq!(cell_at(&arr, 1)?, Cell::Float(145.0));

        let raw = StringArray::from(vec![Some("Goroka"), None]);
        let arr = convert_column(&raw, &DataType::Utf8)?;
        assert_eq!(cell_at(&arr, 0)?, Cell::Text("Goroka"));
        assert_eq!(cell_at(&arr, 1)?, Cell::Null);
        Ok(())
    }

    #[test]
    fn bad_integer_is_an_error() {
        let raw = StringArray::from(vec![Some("abc")]);
        assert!(convert_column(&raw, &DataType::Int64).is_err());
    }
}
