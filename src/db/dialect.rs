//! Engine-specific SQL generation.
//!
//! Each database engine hides its syntax behind the `Dialect` trait: the
//! introspection queries, the row-limiting wrappers, and identifier quoting.
//! The rest of the gateway depends only on this trait, so adding an engine
//! means implementing it here and nothing else.
//!
//! Parameter placeholders follow the engine: `@P1`/`@P2` for SQL Server,
//! `$1`/`$2` for PostgreSQL. The describe-table query binds schema and table
//! as parameters; only the sample query embeds identifiers, which is why
//! `TableIdentifier` parsing rejects quoting delimiters.

use crate::models::TableIdentifier;

/// Engine-specific SQL text and quoting conventions.
pub trait Dialect: Send + Sync {
    /// Display name for logging.
    fn name(&self) -> &'static str;

    /// Schema assumed for bare table names (`dbo` / `public`).
    fn default_schema(&self) -> &'static str;

    /// Quote an identifier using the engine's convention.
    fn quote_ident(&self, ident: &str) -> String;

    /// Enumerate base tables as `schema.table` strings, system schemas
    /// excluded, ordered by schema then name. Single result column aliased
    /// `full_name`.
    fn list_tables_sql(&self) -> &'static str;

    /// Column metadata joined with primary/foreign-key membership for one
    /// table, ordered by ordinal position. Takes schema and table as the
    /// engine's first and second positional parameters.
    fn describe_table_sql(&self) -> &'static str;

    /// Enumerate stored routines (procedures or functions, per engine
    /// convention), system schemas excluded, ordered by schema then name.
    fn list_routines_sql(&self) -> &'static str;

    /// Wrap an arbitrary SELECT in an outer bounded projection. The wrapper
    /// must not alter columns or row semantics beyond truncation; queries
    /// that cannot be wrapped (e.g. ending in `;`) are left for the engine
    /// to reject.
    fn wrap_for_limit(&self, raw_query: &str, max_rows: u32) -> String;

    /// Bounded `SELECT *` against one table, identifiers quoted.
    fn sample_sql(&self, table: &TableIdentifier, max_rows: u32) -> String;

    /// Keywords this engine denies in addition to the core unsafe set.
    fn extra_unsafe_keywords(&self) -> &'static [&'static str] {
        &[]
    }
}

/// SQL Server: INFORMATION_SCHEMA views, `TOP (n)`, `[bracket]` quoting.
pub struct SqlServerDialect;

impl Dialect for SqlServerDialect {
    fn name(&self) -> &'static str {
        "SQL Server"
    }

    fn default_schema(&self) -> &'static str {
        "dbo"
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("[{}]", ident.replace(']', "]]"))
    }

    fn list_tables_sql(&self) -> &'static str {
        r#"
        SELECT TABLE_SCHEMA + '.' + TABLE_NAME AS full_name
        FROM INFORMATION_SCHEMA.TABLES
        WHERE TABLE_TYPE = 'BASE TABLE'
            AND TABLE_SCHEMA NOT IN ('sys', 'INFORMATION_SCHEMA')
        ORDER BY TABLE_SCHEMA, TABLE_NAME"#
    }

    fn describe_table_sql(&self) -> &'static str {
        r#"
        SELECT
            c.COLUMN_NAME AS column_name,
            c.DATA_TYPE AS data_type,
            c.IS_NULLABLE AS is_nullable,
            CASE WHEN pk.COLUMN_NAME IS NOT NULL THEN 1 ELSE 0 END AS is_primary_key,
            CASE WHEN fk.COLUMN_NAME IS NOT NULL THEN 1 ELSE 0 END AS is_foreign_key,
            c.CHARACTER_MAXIMUM_LENGTH AS max_length,
            c.COLUMN_DEFAULT AS default_value
        FROM INFORMATION_SCHEMA.COLUMNS c
        LEFT JOIN (
            SELECT ku.COLUMN_NAME
            FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
            INNER JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE ku
                ON tc.CONSTRAINT_NAME = ku.CONSTRAINT_NAME
            WHERE tc.TABLE_SCHEMA = @P1
                AND tc.TABLE_NAME = @P2
                AND tc.CONSTRAINT_TYPE = 'PRIMARY KEY'
        ) pk ON c.COLUMN_NAME = pk.COLUMN_NAME
        LEFT JOIN (
            SELECT ku.COLUMN_NAME
            FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc
            INNER JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE ku
                ON tc.CONSTRAINT_NAME = ku.CONSTRAINT_NAME
            WHERE tc.TABLE_SCHEMA = @P1
                AND tc.TABLE_NAME = @P2
                AND tc.CONSTRAINT_TYPE = 'FOREIGN KEY'
        ) fk ON c.COLUMN_NAME = fk.COLUMN_NAME
        WHERE c.TABLE_SCHEMA = @P1 AND c.TABLE_NAME = @P2
        ORDER BY c.ORDINAL_POSITION"#
    }

    fn list_routines_sql(&self) -> &'static str {
        r#"
        SELECT
            ROUTINE_SCHEMA AS routine_schema,
            ROUTINE_NAME AS routine_name,
            ROUTINE_DEFINITION AS routine_definition
        FROM INFORMATION_SCHEMA.ROUTINES
        WHERE ROUTINE_TYPE = 'PROCEDURE'
            AND ROUTINE_SCHEMA NOT IN ('sys', 'INFORMATION_SCHEMA')
        ORDER BY ROUTINE_SCHEMA, ROUTINE_NAME"#
    }

    fn wrap_for_limit(&self, raw_query: &str, max_rows: u32) -> String {
        format!(
            "SELECT TOP ({}) * FROM ({}) AS SubQuery",
            max_rows, raw_query
        )
    }

    fn sample_sql(&self, table: &TableIdentifier, max_rows: u32) -> String {
        format!(
            "SELECT TOP ({}) * FROM {}.{}",
            max_rows,
            self.quote_ident(&table.schema),
            self.quote_ident(&table.name)
        )
    }
}

/// PostgreSQL: information_schema views, `LIMIT n`, `"double-quote"` quoting.
pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "PostgreSQL"
    }

    fn default_schema(&self) -> &'static str {
        "public"
    }

    fn quote_ident(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    fn list_tables_sql(&self) -> &'static str {
        r#"
        SELECT table_schema || '.' || table_name AS full_name
        FROM information_schema.tables
        WHERE table_type = 'BASE TABLE'
            AND table_schema NOT IN ('pg_catalog', 'information_schema')
        ORDER BY table_schema, table_name"#
    }

    fn describe_table_sql(&self) -> &'static str {
        r#"
        SELECT
            c.column_name,
            c.data_type,
            (c.is_nullable = 'YES') AS is_nullable,
            (pk.column_name IS NOT NULL) AS is_primary_key,
            (fk.column_name IS NOT NULL) AS is_foreign_key,
            c.character_maximum_length AS max_length,
            c.column_default AS default_value
        FROM information_schema.columns c
        LEFT JOIN (
            SELECT kcu.column_name
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
                ON tc.constraint_name = kcu.constraint_name
                AND tc.table_schema = kcu.table_schema
            WHERE tc.table_schema = $1
                AND tc.table_name = $2
                AND tc.constraint_type = 'PRIMARY KEY'
        ) pk ON c.column_name = pk.column_name
        LEFT JOIN (
            SELECT kcu.column_name
            FROM information_schema.table_constraints tc
            JOIN information_schema.key_column_usage kcu
                ON tc.constraint_name = kcu.constraint_name
                AND tc.table_schema = kcu.table_schema
            WHERE tc.table_schema = $1
                AND tc.table_name = $2
                AND tc.constraint_type = 'FOREIGN KEY'
        ) fk ON c.column_name = fk.column_name
        WHERE c.table_schema = $1 AND c.table_name = $2
        ORDER BY c.ordinal_position"#
    }

    fn list_routines_sql(&self) -> &'static str {
        r#"
        SELECT
            routine_schema,
            routine_name,
            routine_definition
        FROM information_schema.routines
        WHERE routine_schema NOT IN ('pg_catalog', 'information_schema')
        ORDER BY routine_schema, routine_name"#
    }

    fn wrap_for_limit(&self, raw_query: &str, max_rows: u32) -> String {
        format!("SELECT * FROM ({}) AS SubQuery LIMIT {}", raw_query, max_rows)
    }

    fn sample_sql(&self, table: &TableIdentifier, max_rows: u32) -> String {
        format!(
            "SELECT * FROM {}.{} LIMIT {}",
            self.quote_ident(&table.schema),
            self.quote_ident(&table.name),
            max_rows
        )
    }

    fn extra_unsafe_keywords(&self) -> &'static [&'static str] {
        &["CALL", "TRUNCATE"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(input: &str, schema: &str) -> TableIdentifier {
        TableIdentifier::parse(input, schema).unwrap()
    }

    #[test]
    fn test_sqlserver_wrap_for_limit() {
        let sql = SqlServerDialect.wrap_for_limit("SELECT * FROM Orders", 100);
        assert_eq!(
            sql,
            "SELECT TOP (100) * FROM (SELECT * FROM Orders) AS SubQuery"
        );
    }

    #[test]
    fn test_postgres_wrap_for_limit() {
        let sql = PostgresDialect.wrap_for_limit("SELECT * FROM orders", 100);
        assert_eq!(
            sql,
            "SELECT * FROM (SELECT * FROM orders) AS SubQuery LIMIT 100"
        );
    }

    #[test]
    fn test_wrap_for_limit_zero_rows() {
        assert!(
            SqlServerDialect
                .wrap_for_limit("SELECT 1", 0)
                .starts_with("SELECT TOP (0)")
        );
        assert!(
            PostgresDialect
                .wrap_for_limit("SELECT 1", 0)
                .ends_with("LIMIT 0")
        );
    }

    #[test]
    fn test_sqlserver_sample_sql_quoting() {
        let sql = SqlServerDialect.sample_sql(&ident("dbo.Orders", "dbo"), 5);
        assert_eq!(sql, "SELECT TOP (5) * FROM [dbo].[Orders]");
    }

    #[test]
    fn test_postgres_sample_sql_quoting() {
        let sql = PostgresDialect.sample_sql(&ident("public.orders", "public"), 5);
        assert_eq!(sql, "SELECT * FROM \"public\".\"orders\" LIMIT 5");
    }

    #[test]
    fn test_quote_ident_escapes_delimiters() {
        assert_eq!(SqlServerDialect.quote_ident("a]b"), "[a]]b]");
        assert_eq!(PostgresDialect.quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn test_default_schemas() {
        assert_eq!(SqlServerDialect.default_schema(), "dbo");
        assert_eq!(PostgresDialect.default_schema(), "public");
    }

    #[test]
    fn test_list_tables_excludes_system_schemas_and_orders() {
        let mssql = SqlServerDialect.list_tables_sql();
        assert!(mssql.contains("INFORMATION_SCHEMA.TABLES"));
        assert!(mssql.contains("BASE TABLE"));
        assert!(mssql.contains("ORDER BY TABLE_SCHEMA, TABLE_NAME"));

        let pg = PostgresDialect.list_tables_sql();
        assert!(pg.contains("information_schema.tables"));
        assert!(pg.contains("pg_catalog"));
        assert!(pg.contains("ORDER BY table_schema, table_name"));
    }

    #[test]
    fn test_describe_table_binds_parameters() {
        let mssql = SqlServerDialect.describe_table_sql();
        assert!(mssql.contains("@P1"));
        assert!(mssql.contains("@P2"));
        assert!(mssql.contains("ORDINAL_POSITION"));

        let pg = PostgresDialect.describe_table_sql();
        assert!(pg.contains("$1"));
        assert!(pg.contains("$2"));
        assert!(pg.contains("ordinal_position"));
    }

    #[test]
    fn test_routines_follow_engine_convention() {
        assert!(
            SqlServerDialect
                .list_routines_sql()
                .contains("ROUTINE_TYPE = 'PROCEDURE'")
        );
        assert!(
            PostgresDialect
                .list_routines_sql()
                .contains("information_schema.routines")
        );
    }

    #[test]
    fn test_extra_unsafe_keywords() {
        assert!(SqlServerDialect.extra_unsafe_keywords().is_empty());
        assert_eq!(
            PostgresDialect.extra_unsafe_keywords(),
            &["CALL", "TRUNCATE"]
        );
    }
}
