pub mod duck;
pub mod pg;

use anyhow::{anyhow, Result};
use arrow::datatypes::{DataType, Schema};
use std::path::PathBuf;

use crate::process::RowSet;

pub use duck::DuckSink;
pub use pg::PgSink;

/// A database that can hold replaced tables.
///
/// Replacing is two explicit steps so each backend decides how they are
/// scoped; both shipped backends run them in a single per-table transaction.
pub trait TableSink {
    /// Drop `table` if it exists, then create it with `schema`'s columns in order.
    fn ensure_schema(&mut self, table: &str, schema: &Schema) -> Result<()>;

    /// Append every row of `rows` to `table`, returning how many were written.
    fn bulk_insert(&mut self, table: &str, rows: &RowSet) -> Result<u64>;

    /// Replace `table` with exactly `rows`.
    fn replace_table(&mut self, table: &str, rows: &RowSet) -> Result<u64> {
        self.ensure_schema(table, &rows.schema())?;
        self.bulk_insert(table, rows)
    }
}

impl<S: TableSink + ?Sized> TableSink for Box<S> {
    fn ensure_schema(&mut self, table: &str, schema: &Schema) -> Result<()> {
        (**self).ensure_schema(table, schema)
    }

    fn bulk_insert(&mut self, table: &str, rows: &RowSet) -> Result<u64> {
        (**self).bulk_insert(table, rows)
    }

    fn replace_table(&mut self, table: &str, rows: &RowSet) -> Result<u64> {
        (**self).replace_table(table, rows)
    }
}

/// Which database a `DATABASE_URL` points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Postgres { url: String },
    DuckDb { path: Option<PathBuf> },
}

impl Backend {
    /// Recognised forms:
    ///  - `postgres://…`, `postgresql://…`, `postgresql+<driver>://…`
    ///  - `duckdb:///relative.db`, `duckdb:////abs/path.db`, `duckdb:///:memory:`
    pub fn parse(url: &str) -> Result<Self> {
        let url = url.trim();
        let (scheme, rest) = url
            .split_once("://")
            .ok_or_else(|| anyhow!("DATABASE_URL `{}` has no scheme", redact(url)))?;
        // SQLAlchemy-style `dialect+driver`
        let dialect = scheme.split('+').next().unwrap_or(scheme).to_ascii_lowercase();

        match dialect.as_str() {
            "postgres" | "postgresql" => Ok(Backend::Postgres {
                url: format!("postgresql://{}", rest),
            }),
            "duckdb" => {
                let path = rest.strip_prefix('/').unwrap_or(rest);
                if path.is_empty() || path == ":memory:" {
                    Ok(Backend::DuckDb { path: None })
                } else {
                    Ok(Backend::DuckDb {
                        path: Some(PathBuf::from(path)),
                    })
                }
            }
            other => Err(anyhow!("unsupported database scheme `{}`", other)),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Backend::Postgres { .. } => "postgres",
            Backend::DuckDb { .. } => "duckdb",
        }
    }
}

/// Open the single connection used for the whole run.
pub fn connect(backend: &Backend) -> Result<Box<dyn TableSink>> {
    match backend {
        Backend::Postgres { url } => Ok(Box::new(PgSink::connect(url)?)),
        Backend::DuckDb { path: Some(p) } => Ok(Box::new(DuckSink::open(p)?)),
        Backend::DuckDb { path: None } => Ok(Box::new(DuckSink::open_in_memory()?)),
    }
}

/// Double-quote an identifier, doubling any embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// SQL column type used by both backends for an Arrow column type.
pub fn sql_type(ty: &DataType) -> Result<&'static str> {
    match ty {
        DataType::Int64 => Ok("BIGINT"),
        DataType::Float64 => Ok("DOUBLE PRECISION"),
        DataType::Utf8 => Ok("TEXT"),
        other => Err(anyhow!("no SQL mapping for {:?}", other)),
    }
}

/// `CREATE TABLE "t" ("a" BIGINT, "b" TEXT)` for `schema`.
pub fn create_table_sql(table: &str, schema: &Schema) -> Result<String> {
    let cols = schema
        .fields()
        .iter()
        .map(|f| Ok(format!("{} {}", quote_ident(f.name()), sql_type(f.data_type())?)))
        .collect::<Result<Vec<_>>>()?;
    Ok(format!(
        "CREATE TABLE {} ({})",
        quote_ident(table),
        cols.join(", ")
    ))
}

pub fn drop_table_sql(table: &str) -> String {
    format!("DROP TABLE IF EXISTS {}", quote_ident(table))
}

/// Hide the password part of a connection string before logging it.
pub fn redact(url: &str) -> String {
    match (url.find("://"), url.rfind('@')) {
        (Some(s), Some(at)) if at > s => {
            let creds = &url[s + 3..at];
            match creds.split_once(':') {
                Some((user, _)) => format!("{}{}:***{}", &url[..s + 3], user, &url[at..]),
                None => url.to_string(),
            }
        }
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::datatypes::Field;

    #[test]
    fn parses_postgres_urls() -> Result<()> {
        assert_eq!(
            Backend::parse("postgresql://u:p@db:5432/flights")?,
            Backend::Postgres {
                url: "postgresql://u:p@db:5432/flights".into()
            }
        );
        assert_eq!(
            Backend::parse("postgres://u@db/flights")?,
            Backend::Postgres {
                url: "postgresql://u@db/flights".into()
            }
        );
        assert_eq!(
            Backend::parse("postgresql+psycopg2://u@db/flights")?.name(),
            "postgres"
        );
        Ok(())
    }

    #[test]
    fn parses_duckdb_urls() -> Result<()> {
        assert_eq!(
            Backend::parse("duckdb:///:memory:")?,
            Backend::DuckDb { path: None }
        );
        assert_eq!(
            Backend::parse("duckdb:///flights.db")?,
            Backend::DuckDb {
                path: Some(PathBuf::from("flights.db"))
            }
        );
        assert_eq!(
            Backend::parse("duckdb:////var/lib/flights.db")?,
            Backend::DuckDb {
                path: Some(PathBuf::from("/var/lib/flights.db"))
            }
        );
        Ok(())
    }

    #[test]
    fn rejects_unknown_schemes() {
        assert!(Backend::parse("mysql://u@db/flights").is_err());
        assert!(Backend::parse("flights.db").is_err());
    }

    #[test]
    fn builds_quoted_ddl() -> Result<()> {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int64, true),
            Field::new("latitude", DataType::Float64, true),
            Field::new("type", DataType::Utf8, true),
        ]);
        assert_eq!(
            create_table_sql("airports", &schema)?,
            r#"CREATE TABLE "airports" ("id" BIGINT, "latitude" DOUBLE PRECISION, "type" TEXT)"#
        );
        assert_eq!(drop_table_sql("a\"b"), r#"DROP TABLE IF EXISTS "a""b""#);
        Ok(())
    }

    #[test]
    fn redacts_password() {
        assert_eq!(
            redact("postgresql://alice:s3cret@db:5432/x"),
            "postgresql://alice:***@db:5432/x"
        );
        assert_eq!(redact("duckdb:///:memory:"), "duckdb:///:memory:");
    }
}
