//! The introspection service: stateless read-only operations over one
//! configured database.
//!
//! Every operation opens a fresh connection through the [`Connector`] and
//! closes it when done. SQL text comes from the engine's [`Dialect`]; user
//! input only ever reaches the database as a bound parameter or as a
//! validated, dialect-quoted identifier.

use crate::db::dialect::Dialect;
use crate::db::executor::Connector;
use crate::db::safety::first_unsafe_keyword;
use crate::error::{GatewayError, GatewayResult};
use crate::models::{
    QUERY_TIMEOUT_SECS, StoredProcedureInfo, TableIdentifier, TableSchema, TabularResult,
    clamp_row_limit,
};
use std::time::Duration;

pub struct Introspector {
    connector: Connector,
    query_timeout: Duration,
}

impl Introspector {
    pub fn new(connector: Connector) -> Self {
        Self {
            connector,
            query_timeout: Duration::from_secs(QUERY_TIMEOUT_SECS),
        }
    }

    pub fn with_query_timeout(mut self, timeout: Duration) -> Self {
        self.query_timeout = timeout;
        self
    }

    pub fn engine_name(&self) -> &'static str {
        self.connector.engine_name()
    }

    fn dialect(&self) -> &'static dyn Dialect {
        self.connector.dialect()
    }

    /// List user tables as `schema.table` strings, sorted by schema then name.
    pub async fn get_tables(&self) -> GatewayResult<Vec<String>> {
        let sql = self.dialect().list_tables_sql();
        self.connector.fetch_strings(sql).await
    }

    /// Describe one table's columns, with primary/foreign key flags.
    ///
    /// An unqualified name resolves against the engine's default schema. A
    /// table that does not exist comes back with an empty column list rather
    /// than an error, matching what the catalog query itself returns.
    pub async fn get_table_schema(&self, table_name: &str) -> GatewayResult<TableSchema> {
        let ident = TableIdentifier::parse(table_name, self.dialect().default_schema())?;
        let sql = self.dialect().describe_table_sql();
        let columns = self
            .connector
            .fetch_columns(sql, &ident.schema, &ident.name)
            .await?;

        let mut schema = TableSchema::new(&ident);
        schema.columns = columns;
        Ok(schema)
    }

    /// List stored routines (Postgres: all routines, functions included;
    /// SQL Server: procedures only).
    pub async fn get_stored_procedures(&self) -> GatewayResult<Vec<StoredProcedureInfo>> {
        let sql = self.dialect().list_routines_sql();
        self.connector.fetch_routines(sql).await
    }

    /// Fetch up to `max_rows` rows from a table.
    ///
    /// `max_rows` is capped, not floored: asking for zero rows returns the
    /// column-free empty shape.
    pub async fn get_sample_data(
        &self,
        table_name: &str,
        max_rows: u32,
    ) -> GatewayResult<TabularResult> {
        let ident = TableIdentifier::parse(table_name, self.dialect().default_schema())?;
        let sql = self.dialect().sample_sql(&ident, clamp_row_limit(max_rows));
        self.connector.fetch_tabular(&sql, None).await
    }

    /// Run an ad-hoc query, denylist-checked and row-limited.
    ///
    /// The safety check happens before any connection is opened, so a
    /// rejected query never touches the database. The wrapped query runs
    /// under the configured timeout.
    pub async fn execute_query(
        &self,
        query: &str,
        max_rows: u32,
    ) -> GatewayResult<TabularResult> {
        let query = query.trim();
        if query.is_empty() {
            return Err(GatewayError::validation("query must not be empty"));
        }

        let extra = self.dialect().extra_unsafe_keywords();
        if let Some(keyword) = first_unsafe_keyword(query, extra) {
            return Err(GatewayError::unsafe_query(format!(
                "keyword '{}' is not allowed; only read-only SELECT statements are permitted",
                keyword
            )));
        }

        let sql = self
            .dialect()
            .wrap_for_limit(query, clamp_row_limit(max_rows));
        self.connector
            .fetch_tabular(&sql, Some(self.query_timeout))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pg_introspector() -> Introspector {
        Introspector::new(Connector::from_url("postgres://u:p@localhost:5432/db").unwrap())
    }

    fn mssql_introspector() -> Introspector {
        Introspector::new(Connector::from_url("mssql://sa:p@localhost:1433/db").unwrap())
    }

    #[tokio::test]
    async fn test_execute_query_rejects_unsafe_before_connecting() {
        // localhost:5432 has no server in the test environment; the error
        // proves the denylist fired before any connection attempt.
        let err = pg_introspector()
            .execute_query("DELETE FROM orders", 100)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnsafeQuery { .. }));
        assert!(err.to_string().contains("DELETE"));
    }

    #[tokio::test]
    async fn test_execute_query_rejects_postgres_extras() {
        let err = pg_introspector()
            .execute_query("CALL do_things()", 100)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnsafeQuery { .. }));

        let err = pg_introspector()
            .execute_query("TRUNCATE orders", 100)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnsafeQuery { .. }));
    }

    #[tokio::test]
    async fn test_mssql_core_denylist_applies() {
        let err = mssql_introspector()
            .execute_query("EXEC sp_who", 100)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::UnsafeQuery { .. }));
    }

    #[tokio::test]
    async fn test_execute_query_rejects_empty() {
        let err = pg_introspector().execute_query("   ", 100).await.unwrap_err();
        assert!(matches!(err, GatewayError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_get_table_schema_rejects_quoted_identifier() {
        let err = pg_introspector()
            .get_table_schema("public.\"users\"")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_get_sample_data_rejects_bad_identifier() {
        let err = mssql_introspector()
            .get_sample_data("orders]; DROP TABLE x", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::Validation { .. }));
    }
}
