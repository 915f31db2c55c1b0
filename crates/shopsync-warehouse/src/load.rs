//! Table loads with overwrite or append semantics.

use std::collections::HashMap;

use shopsync_core::record::PATH_SEPARATOR;
use shopsync_core::Table;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::WarehouseError;

/// Postgres caps bind parameters per statement at 65535.
const MAX_BIND_PARAMS: usize = 65_535;

/// Column that identifies a row for [`WriteMode::Merge`].
pub const MERGE_KEY: &str = "id";

/// How a load treats an existing destination table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Drop and recreate the table, then insert.
    OverwriteReplace,
    /// Create the table if missing, add any new columns, then insert.
    Append,
    /// Like `Append`, but first delete existing rows whose [`MERGE_KEY`]
    /// appears in the batch, so reloading the same records is idempotent.
    Merge,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::OverwriteReplace => write!(f, "overwrite-replace"),
            WriteMode::Append => write!(f, "append"),
            WriteMode::Merge => write!(f, "merge"),
        }
    }
}

/// A validated `schema.table` destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    pub schema: String,
    pub table: String,
}

impl Destination {
    /// Parses `schema.table`. Both parts must be plain identifiers.
    ///
    /// # Errors
    ///
    /// Returns [`WarehouseError::InvalidDestination`] when the value is not
    /// two dot-separated parts, or [`WarehouseError::InvalidIdentifier`] when
    /// a part contains anything but ASCII letters, digits, and `_`.
    pub fn parse(value: &str) -> Result<Self, WarehouseError> {
        let (schema, table) = value
            .split_once('.')
            .filter(|(_, t)| !t.contains('.'))
            .ok_or_else(|| WarehouseError::InvalidDestination(value.to_owned()))?;
        validate_identifier(schema)?;
        validate_identifier(table)?;
        Ok(Self {
            schema: schema.to_owned(),
            table: table.to_owned(),
        })
    }

    /// Quoted `"schema"."table"` for use in SQL.
    #[must_use]
    pub fn qualified(&self) -> String {
        format!("{}.{}", quote_ident(&self.schema), quote_ident(&self.table))
    }
}

impl std::fmt::Display for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

fn validate_identifier(ident: &str) -> Result<(), WarehouseError> {
    let mut chars = ident.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        Ok(())
    } else {
        Err(WarehouseError::InvalidIdentifier(ident.to_owned()))
    }
}

/// Rewrites the flattening separator to `_`, e.g. `default_address.city`
/// becomes `default_address_city`.
#[must_use]
pub fn sanitize_column_name(name: &str) -> String {
    name.replace(PATH_SEPARATOR, "_")
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Renames every column with [`sanitize_column_name`] and rejects collisions.
fn sanitized_columns(table: &Table) -> Result<Vec<String>, WarehouseError> {
    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut out = Vec::with_capacity(table.columns.len());
    for original in &table.columns {
        let sanitized = sanitize_column_name(original);
        if let Some(first) = seen.insert(sanitized.clone(), original) {
            return Err(WarehouseError::DuplicateColumn {
                first: first.to_owned(),
                second: original.clone(),
                sanitized,
            });
        }
        out.push(sanitized);
    }
    Ok(out)
}

fn create_table_sql(dest: &Destination, columns: &[String], if_not_exists: bool) -> String {
    let cols = columns
        .iter()
        .map(|c| format!("{} TEXT", quote_ident(c)))
        .collect::<Vec<_>>()
        .join(", ");
    let guard = if if_not_exists { "IF NOT EXISTS " } else { "" };
    format!("CREATE TABLE {guard}{} ({cols})", dest.qualified())
}

fn add_column_sql(dest: &Destination, column: &str) -> String {
    format!(
        "ALTER TABLE {} ADD COLUMN IF NOT EXISTS {} TEXT",
        dest.qualified(),
        quote_ident(column)
    )
}

fn insert_prefix(dest: &Destination, columns: &[String]) -> String {
    let cols = columns
        .iter()
        .map(|c| quote_ident(c))
        .collect::<Vec<_>>()
        .join(", ");
    format!("INSERT INTO {} ({cols}) ", dest.qualified())
}

fn delete_keys_sql(dest: &Destination) -> String {
    format!(
        "DELETE FROM {} WHERE {} = ANY($1)",
        dest.qualified(),
        quote_ident(MERGE_KEY)
    )
}

/// Non-empty [`MERGE_KEY`] values of the batch, in row order.
fn merge_keys(table: &Table, columns: &[String]) -> Result<Vec<String>, WarehouseError> {
    let index = columns
        .iter()
        .position(|c| c == MERGE_KEY)
        .ok_or(WarehouseError::MissingKeyColumn(MERGE_KEY))?;
    Ok(table
        .rows
        .iter()
        .filter_map(|row| row.get(index).cloned().flatten())
        .collect())
}

fn rows_per_statement(column_count: usize) -> usize {
    (MAX_BIND_PARAMS / column_count.max(1)).max(1)
}

/// Loads `table` into `dest` inside one transaction.
///
/// Column names are sanitized first. A table with no columns is a no-op.
/// Returns the number of rows inserted.
///
/// # Errors
///
/// - [`WarehouseError::DuplicateColumn`] if two columns sanitize to the same name.
/// - [`WarehouseError::MissingKeyColumn`] for a merge without an `id` column.
/// - [`WarehouseError::Sqlx`] if any statement fails; the transaction is rolled back.
pub async fn load_table(
    pool: &PgPool,
    table: &Table,
    dest: &Destination,
    mode: WriteMode,
) -> Result<u64, WarehouseError> {
    if table.columns.is_empty() {
        tracing::warn!(destination = %dest, "nothing to load: batch has no columns");
        return Ok(0);
    }
    let columns = sanitized_columns(table)?;
    let keys = match mode {
        WriteMode::Merge => merge_keys(table, &columns)?,
        WriteMode::OverwriteReplace | WriteMode::Append => Vec::new(),
    };

    let mut tx = pool.begin().await?;

    sqlx::query(&format!(
        "CREATE SCHEMA IF NOT EXISTS {}",
        quote_ident(&dest.schema)
    ))
    .execute(&mut *tx)
    .await?;

    match mode {
        WriteMode::OverwriteReplace => {
            sqlx::query(&format!("DROP TABLE IF EXISTS {}", dest.qualified()))
                .execute(&mut *tx)
                .await?;
            sqlx::query(&create_table_sql(dest, &columns, false))
                .execute(&mut *tx)
                .await?;
        }
        WriteMode::Append | WriteMode::Merge => {
            sqlx::query(&create_table_sql(dest, &columns, true))
                .execute(&mut *tx)
                .await?;
            for column in &columns {
                sqlx::query(&add_column_sql(dest, column))
                    .execute(&mut *tx)
                    .await?;
            }
        }
    }

    if mode == WriteMode::Merge && !keys.is_empty() {
        let replaced = sqlx::query(&delete_keys_sql(dest))
            .bind(keys.as_slice())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        tracing::debug!(destination = %dest, replaced, "merge removed superseded rows");
    }

    let mut inserted = 0u64;
    for chunk in table.rows.chunks(rows_per_statement(columns.len())) {
        let mut builder: QueryBuilder<Postgres> = QueryBuilder::new(insert_prefix(dest, &columns));
        builder.push_values(chunk, |mut b, row| {
            for cell in row {
                b.push_bind(cell.clone());
            }
        });
        inserted += builder.build().execute(&mut *tx).await?.rows_affected();
    }

    tx.commit().await?;

    tracing::info!(destination = %dest, mode = %mode, rows = inserted, "warehouse load complete");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dest() -> Destination {
        Destination::parse("raw.customers_raw").unwrap()
    }

    #[test]
    fn sanitize_rewrites_dots() {
        assert_eq!(sanitize_column_name("default_address.city"), "default_address_city");
        assert_eq!(sanitize_column_name("a.b.c"), "a_b_c");
        assert_eq!(sanitize_column_name("id"), "id");
    }

    #[test]
    fn sanitized_columns_detects_collisions() {
        let table = Table {
            columns: vec!["default_address.city".to_owned(), "default_address_city".to_owned()],
            rows: vec![],
        };
        assert!(matches!(
            sanitized_columns(&table),
            Err(WarehouseError::DuplicateColumn { ref sanitized, .. }) if sanitized == "default_address_city"
        ));
    }

    #[test]
    fn destination_parse_accepts_schema_table() {
        let d = dest();
        assert_eq!(d.schema, "raw");
        assert_eq!(d.table, "customers_raw");
        assert_eq!(d.qualified(), "\"raw\".\"customers_raw\"");
        assert_eq!(d.to_string(), "raw.customers_raw");
    }

    #[test]
    fn destination_parse_rejects_bad_shapes() {
        assert!(matches!(
            Destination::parse("orders_raw"),
            Err(WarehouseError::InvalidDestination(_))
        ));
        assert!(matches!(
            Destination::parse("a.b.c"),
            Err(WarehouseError::InvalidDestination(_))
        ));
        assert!(matches!(
            Destination::parse("raw.orders; DROP TABLE x"),
            Err(WarehouseError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            Destination::parse("1raw.orders"),
            Err(WarehouseError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn create_table_sql_quotes_text_columns() {
        let cols = vec!["id".to_owned(), "default_address_city".to_owned()];
        assert_eq!(
            create_table_sql(&dest(), &cols, false),
            "CREATE TABLE \"raw\".\"customers_raw\" (\"id\" TEXT, \"default_address_city\" TEXT)"
        );
        assert!(create_table_sql(&dest(), &cols, true).starts_with("CREATE TABLE IF NOT EXISTS "));
    }

    #[test]
    fn add_column_sql_is_idempotent_form() {
        assert_eq!(
            add_column_sql(&dest(), "note"),
            "ALTER TABLE \"raw\".\"customers_raw\" ADD COLUMN IF NOT EXISTS \"note\" TEXT"
        );
    }

    #[test]
    fn quote_ident_escapes_embedded_quotes() {
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn insert_prefix_lists_columns() {
        let cols = vec!["id".to_owned(), "email".to_owned()];
        assert_eq!(
            insert_prefix(&dest(), &cols),
            "INSERT INTO \"raw\".\"customers_raw\" (\"id\", \"email\") "
        );
    }

    #[test]
    fn rows_per_statement_respects_bind_limit() {
        assert_eq!(rows_per_statement(1), 65_535);
        assert_eq!(rows_per_statement(100), 655);
        assert_eq!(rows_per_statement(0), 65_535);
        assert_eq!(rows_per_statement(100_000), 1);
    }

    #[test]
    fn write_mode_display() {
        assert_eq!(WriteMode::OverwriteReplace.to_string(), "overwrite-replace");
        assert_eq!(WriteMode::Append.to_string(), "append");
        assert_eq!(WriteMode::Merge.to_string(), "merge");
    }

    #[test]
    fn delete_keys_sql_targets_id_column() {
        assert_eq!(
            delete_keys_sql(&dest()),
            "DELETE FROM \"raw\".\"customers_raw\" WHERE \"id\" = ANY($1)"
        );
    }

    #[test]
    fn merge_keys_collects_non_empty_ids() {
        let table = Table {
            columns: vec!["id".to_owned(), "updated_at".to_owned()],
            rows: vec![
                vec![Some("1".to_owned()), Some("t1".to_owned())],
                vec![None, Some("t2".to_owned())],
                vec![Some("3".to_owned()), None],
            ],
        };
        let columns = sanitized_columns(&table).unwrap();
        assert_eq!(merge_keys(&table, &columns).unwrap(), vec!["1", "3"]);
    }

    #[test]
    fn merge_keys_requires_id_column() {
        let table = Table {
            columns: vec!["name".to_owned()],
            rows: vec![vec![Some("x".to_owned())]],
        };
        let columns = sanitized_columns(&table).unwrap();
        assert!(matches!(
            merge_keys(&table, &columns),
            Err(WarehouseError::MissingKeyColumn("id"))
        ));
    }
}
