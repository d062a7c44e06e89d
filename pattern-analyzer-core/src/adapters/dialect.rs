//! SQL dialect knowledge for the supported database families.
//!
//! Everything that differs between PostgreSQL and Oracle lives here:
//! connection-string assembly, identifier quoting, catalog queries, the
//! row-limit clause and bind placeholders. Callers outside the adapters never
//! build dialect-specific SQL themselves.
//!
//! # Security
//! Identifiers are double-quoted with embedded quotes doubled. Values are
//! never interpolated; range bounds and catalog filters are bound parameters.

use super::{BindValue, ConnectionConfig, ConnectionDescriptor};
use crate::error::PatternAnalyzerError;
use crate::models::ValueRange;
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

/// Alias given to the projected column in sampling queries.
///
/// `ORDER BY` names the table-qualified column, which never resolves to this
/// alias even when the column shares its name.
const SAMPLE_ALIAS: &str = "sample_value";

/// Supported database families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// PostgreSQL
    Postgres,
    /// Oracle Database
    Oracle,
}

/// A SQL statement with its positional bind values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    /// SQL text with dialect placeholders
    pub sql: String,
    /// Values for the placeholders, in order
    pub params: Vec<BindValue>,
}

impl Statement {
    /// A statement without parameters.
    pub fn new(sql: impl Into<String>) -> Self {
        Self {
            sql: sql.into(),
            params: Vec::new(),
        }
    }

    /// Builder method to append a bind value.
    pub fn bind(mut self, value: BindValue) -> Self {
        self.params.push(value);
        self
    }
}

impl Dialect {
    /// All supported dialects.
    pub const ALL: [Self; 2] = [Self::Postgres, Self::Oracle];

    /// Lowercase tag, also used as the URL scheme.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Oracle => "oracle",
        }
    }

    /// Product name for messages.
    pub fn product_name(self) -> &'static str {
        match self {
            Self::Postgres => "PostgreSQL",
            Self::Oracle => "Oracle",
        }
    }

    /// What the descriptor's `database` field names for this dialect.
    pub fn database_label(self) -> &'static str {
        match self {
            Self::Postgres => "database",
            Self::Oracle => "service name",
        }
    }

    /// Standard listener port.
    pub fn default_port(self) -> u16 {
        match self {
            Self::Postgres => 5432,
            Self::Oracle => 1521,
        }
    }

    /// Whether the driver for this dialect was compiled in.
    pub fn is_driver_available(self) -> bool {
        match self {
            Self::Postgres => cfg!(feature = "postgresql"),
            Self::Oracle => cfg!(feature = "oracle"),
        }
    }

    /// Quotes an identifier, doubling embedded double quotes.
    ///
    /// # Example
    /// ```rust
    /// use pattern_analyzer_core::adapters::Dialect;
    ///
    /// assert_eq!(Dialect::Postgres.quote_identifier("order"), "\"order\"");
    /// assert_eq!(Dialect::Oracle.quote_identifier("a\"b"), "\"a\"\"b\"");
    /// ```
    pub fn quote_identifier(self, identifier: &str) -> String {
        // Both families use SQL-standard delimited identifiers
        format!("\"{}\"", identifier.replace('"', "\"\""))
    }

    /// Quotes `schema.table`.
    pub fn qualified_table(self, schema: &str, table: &str) -> String {
        format!(
            "{}.{}",
            self.quote_identifier(schema),
            self.quote_identifier(table)
        )
    }

    /// Oracle easy-connect target (`host:port/service`).
    pub fn data_source(self, descriptor: &ConnectionDescriptor) -> String {
        format!(
            "{}:{}/{}",
            descriptor.host,
            descriptor.effective_port(),
            descriptor.database
        )
    }

    /// Assembles the `Key=Value;` connection string for a descriptor.
    ///
    /// The returned string contains the password and is zeroed on drop.
    pub fn connection_string(self, descriptor: &ConnectionDescriptor) -> Zeroizing<String> {
        let password = descriptor.credentials.password().unwrap_or_default();
        match self {
            Self::Postgres => Zeroizing::new(format!(
                "Host={};Port={};Database={};Username={};Password={}",
                descriptor.host,
                descriptor.effective_port(),
                descriptor.database,
                descriptor.credentials.username(),
                password
            )),
            Self::Oracle => Zeroizing::new(format!(
                "User Id={};Password={};Data Source={}",
                descriptor.credentials.username(),
                password,
                self.data_source(descriptor)
            )),
        }
    }

    /// Dialect-correct row-limit clause.
    pub fn limit_clause(self, limit: u32) -> String {
        match self {
            Self::Postgres => format!("LIMIT {limit}"),
            Self::Oracle => format!("FETCH FIRST {limit} ROWS ONLY"),
        }
    }

    /// Appends a limit clause to caller-supplied SQL.
    ///
    /// Trailing semicolons and whitespace are removed first. The SQL itself is
    /// not inspected.
    pub fn append_limit(self, sql: &str, limit: u32) -> String {
        let trimmed = sql
            .trim_start()
            .trim_end_matches(|c: char| c == ';' || c.is_whitespace());
        format!("{trimmed} {}", self.limit_clause(limit))
    }

    /// Positional bind placeholder, 1-based.
    pub fn placeholder(self, index: usize) -> String {
        match self {
            Self::Postgres => format!("${index}"),
            Self::Oracle => format!(":{index}"),
        }
    }

    /// Trivial round-trip query for connection tests.
    pub fn ping_sql(self) -> &'static str {
        match self {
            Self::Postgres => "SELECT 1",
            Self::Oracle => "SELECT 1 FROM DUAL",
        }
    }

    /// Statements run once when a session opens.
    pub fn session_setup_sql(self, config: &ConnectionConfig) -> Vec<String> {
        match self {
            Self::Postgres => {
                let mut statements = vec![
                    format!(
                        "SET statement_timeout = '{}ms'",
                        config.query_timeout.as_millis()
                    ),
                    format!(
                        "SET application_name = 'pattern-analyzer-{}'",
                        env!("CARGO_PKG_VERSION")
                    ),
                ];
                if config.read_only {
                    statements.push("SET default_transaction_read_only = on".to_string());
                }
                statements
            }
            Self::Oracle => {
                if config.read_only {
                    vec!["SET TRANSACTION READ ONLY".to_string()]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// Lists non-system schemas.
    pub fn list_schemas_sql(self, cap: u32) -> Statement {
        let sql = match self {
            Self::Postgres => format!(
                "SELECT schema_name::text FROM information_schema.schemata \
                 WHERE schema_name NOT IN ('information_schema', 'pg_catalog') \
                 ORDER BY schema_name {}",
                self.limit_clause(cap)
            ),
            Self::Oracle => format!(
                "SELECT username FROM all_users ORDER BY username {}",
                self.limit_clause(cap)
            ),
        };
        Statement::new(sql)
    }

    /// Lists tables outside system schemas, optionally for one schema.
    ///
    /// Rows are `(schema, table)`, ordered by schema then table name.
    pub fn list_tables_sql(self, schema: Option<&str>, cap: u32) -> Statement {
        let (base, schema_filter, order_by) = match self {
            Self::Postgres => (
                "SELECT table_schema::text, table_name::text FROM information_schema.tables \
                 WHERE table_schema NOT IN ('information_schema', 'pg_catalog')",
                "table_schema",
                "table_schema, table_name",
            ),
            Self::Oracle => (
                "SELECT OWNER, TABLE_NAME FROM ALL_TABLES WHERE OWNER NOT IN ('SYS', 'SYSTEM')",
                "OWNER",
                "OWNER, TABLE_NAME",
            ),
        };

        let mut statement = Statement::new(base);
        if let Some(schema) = schema {
            statement.sql = format!(
                "{} AND {schema_filter} = {}",
                statement.sql,
                self.placeholder(1)
            );
            statement = statement.bind(BindValue::Text(schema.to_string()));
        }
        statement.sql = format!(
            "{} ORDER BY {order_by} {}",
            statement.sql,
            self.limit_clause(cap)
        );
        statement
    }

    /// Lists columns of one table in catalog order.
    ///
    /// Rows are `(name, data_type, nullable)` where `nullable` uses the
    /// dialect's own convention; see [`Dialect::parse_nullable`].
    pub fn list_columns_sql(self, schema: &str, table: &str, cap: u32) -> Statement {
        let sql = match self {
            Self::Postgres => format!(
                "SELECT column_name::text, data_type::text, is_nullable::text \
                 FROM information_schema.columns \
                 WHERE table_schema = {} AND table_name = {} \
                 ORDER BY ordinal_position {}",
                self.placeholder(1),
                self.placeholder(2),
                self.limit_clause(cap)
            ),
            Self::Oracle => format!(
                "SELECT COLUMN_NAME, DATA_TYPE, NULLABLE FROM ALL_TAB_COLUMNS \
                 WHERE OWNER = {} AND TABLE_NAME = {} \
                 ORDER BY COLUMN_ID {}",
                self.placeholder(1),
                self.placeholder(2),
                self.limit_clause(cap)
            ),
        };
        Statement::new(sql)
            .bind(BindValue::Text(schema.to_string()))
            .bind(BindValue::Text(table.to_string()))
    }

    /// Normalizes the catalog's nullability flag (`YES` or `Y`).
    pub fn parse_nullable(self, raw: &str) -> bool {
        let raw = raw.trim();
        match self {
            Self::Postgres => raw.eq_ignore_ascii_case("YES"),
            Self::Oracle => raw.eq_ignore_ascii_case("Y"),
        }
    }

    /// Builds the bounded, sorted, non-null projection of one column.
    ///
    /// Values are cast to text so any column type can be sampled; ordering
    /// uses the table-qualified column and therefore the column's own type.
    /// Range bounds are inclusive and bound as integer parameters.
    ///
    /// # Example
    /// ```rust
    /// use pattern_analyzer_core::adapters::Dialect;
    /// use pattern_analyzer_core::models::ValueRange;
    ///
    /// let stmt = Dialect::Postgres.sample_column_sql("public", "orders", "id", ValueRange::default(), 100);
    /// assert_eq!(
    ///     stmt.sql,
    ///     "SELECT \"id\"::text AS sample_value FROM \"public\".\"orders\" \
    ///      WHERE \"id\" IS NOT NULL ORDER BY \"public\".\"orders\".\"id\" LIMIT 100"
    /// );
    /// ```
    pub fn sample_column_sql(
        self,
        schema: &str,
        table: &str,
        column: &str,
        range: ValueRange,
        limit: u32,
    ) -> Statement {
        let quoted = self.quote_identifier(column);
        let table_ref = self.qualified_table(schema, table);
        let projection = match self {
            Self::Postgres => format!("{quoted}::text"),
            Self::Oracle => format!("CAST({quoted} AS VARCHAR2(4000))"),
        };

        let mut statement = Statement::new(format!(
            "SELECT {projection} AS {SAMPLE_ALIAS} FROM {table_ref} WHERE {quoted} IS NOT NULL"
        ));

        for (bound, operator) in [(range.start, ">="), (range.end, "<=")] {
            if let Some(value) = bound {
                statement = statement.bind(BindValue::Integer(value));
                statement.sql = format!(
                    "{} AND {quoted} {operator} {}",
                    statement.sql,
                    self.placeholder(statement.params.len())
                );
            }
        }

        statement.sql = format!(
            "{} ORDER BY {table_ref}.{quoted} {}",
            statement.sql,
            self.limit_clause(limit)
        );
        statement
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Dialect {
    type Err = PatternAnalyzerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            "oracle" | "ora" => Ok(Self::Oracle),
            other => Err(PatternAnalyzerError::configuration(format!(
                "Unsupported database dialect '{other}' (expected postgres or oracle)"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::Credentials;

    fn descriptor(dialect: Dialect) -> ConnectionDescriptor {
        ConnectionDescriptor::new(dialect, "db.local", "SALES").with_credentials(Credentials::new(
            "reader".to_string(),
            Some("pw".to_string()),
        ))
    }

    #[test]
    fn test_parse_dialect() {
        assert_eq!("postgresql".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("PG".parse::<Dialect>().unwrap(), Dialect::Postgres);
        assert_eq!("Oracle".parse::<Dialect>().unwrap(), Dialect::Oracle);

        let err = "mssql".parse::<Dialect>().unwrap_err();
        assert!(matches!(err, PatternAnalyzerError::Configuration { .. }));
    }

    #[test]
    fn test_quote_identifier_escapes_quotes() {
        assert_eq!(Dialect::Postgres.quote_identifier("Order Lines"), "\"Order Lines\"");
        assert_eq!(
            Dialect::Postgres.quote_identifier("x\"; DROP TABLE t; --"),
            "\"x\"\"; DROP TABLE t; --\""
        );
        assert_eq!(
            Dialect::Oracle.qualified_table("HR", "EMP\"LOYEES"),
            "\"HR\".\"EMP\"\"LOYEES\""
        );
    }

    #[test]
    fn test_connection_strings() {
        let pg = descriptor(Dialect::Postgres).connection_string();
        assert_eq!(
            pg.as_str(),
            "Host=db.local;Port=5432;Database=SALES;Username=reader;Password=pw"
        );

        let ora = descriptor(Dialect::Oracle).connection_string();
        assert_eq!(
            ora.as_str(),
            "User Id=reader;Password=pw;Data Source=db.local:1521/SALES"
        );
    }

    #[test]
    fn test_limit_clauses() {
        assert_eq!(Dialect::Postgres.limit_clause(25), "LIMIT 25");
        assert_eq!(Dialect::Oracle.limit_clause(25), "FETCH FIRST 25 ROWS ONLY");
    }

    #[test]
    fn test_append_limit_strips_terminators() {
        assert_eq!(
            Dialect::Postgres.append_limit("  SELECT code FROM codes ;\n", 10),
            "SELECT code FROM codes LIMIT 10"
        );
        assert_eq!(
            Dialect::Oracle.append_limit("SELECT code FROM codes;;", 10),
            "SELECT code FROM codes FETCH FIRST 10 ROWS ONLY"
        );
    }

    #[test]
    fn test_list_tables_sql() {
        let all = Dialect::Postgres.list_tables_sql(None, 1000);
        assert!(all.sql.contains("NOT IN ('information_schema', 'pg_catalog')"));
        assert!(all.sql.ends_with("ORDER BY table_schema, table_name LIMIT 1000"));
        assert!(all.params.is_empty());

        let one = Dialect::Oracle.list_tables_sql(Some("HR"), 1000);
        assert!(one.sql.contains("NOT IN ('SYS', 'SYSTEM') AND OWNER = :1"));
        assert!(one.sql.ends_with("FETCH FIRST 1000 ROWS ONLY"));
        assert_eq!(one.params, vec![BindValue::Text("HR".to_string())]);
    }

    #[test]
    fn test_list_schemas_sql() {
        let pg = Dialect::Postgres.list_schemas_sql(1000);
        assert!(pg.sql.contains("information_schema.schemata"));
        assert!(pg.sql.contains("'pg_catalog'"));

        let ora = Dialect::Oracle.list_schemas_sql(1000);
        assert!(ora.sql.starts_with("SELECT username FROM all_users ORDER BY username"));
    }

    #[test]
    fn test_list_columns_sql_binds_names() {
        let stmt = Dialect::Postgres.list_columns_sql("public", "orders", 1000);
        assert!(stmt.sql.contains("table_schema = $1 AND table_name = $2"));
        assert!(stmt.sql.contains("ORDER BY ordinal_position"));
        assert_eq!(stmt.params.len(), 2);

        let stmt = Dialect::Oracle.list_columns_sql("HR", "EMP", 1000);
        assert!(stmt.sql.contains("OWNER = :1 AND TABLE_NAME = :2"));
        assert!(stmt.sql.contains("ORDER BY COLUMN_ID"));
    }

    #[test]
    fn test_parse_nullable() {
        assert!(Dialect::Postgres.parse_nullable("YES"));
        assert!(!Dialect::Postgres.parse_nullable("NO"));
        assert!(Dialect::Oracle.parse_nullable("Y"));
        assert!(!Dialect::Oracle.parse_nullable("N"));
    }

    #[test]
    fn test_sample_column_sql_with_range() {
        let range = ValueRange {
            start: Some(100),
            end: Some(200),
        };
        let stmt = Dialect::Oracle.sample_column_sql("HR", "EMP", "EMPNO", range, 50);
        assert_eq!(
            stmt.sql,
            "SELECT CAST(\"EMPNO\" AS VARCHAR2(4000)) AS sample_value FROM \"HR\".\"EMP\" \
             WHERE \"EMPNO\" IS NOT NULL AND \"EMPNO\" >= :1 AND \"EMPNO\" <= :2 \
             ORDER BY \"HR\".\"EMP\".\"EMPNO\" FETCH FIRST 50 ROWS ONLY"
        );
        assert_eq!(
            stmt.params,
            vec![BindValue::Integer(100), BindValue::Integer(200)]
        );
    }

    #[test]
    fn test_sample_column_sql_orders_by_qualified_column() {
        let stmt = Dialect::Postgres.sample_column_sql(
            "public",
            "t",
            "sample_value",
            ValueRange::default(),
            10,
        );
        assert!(stmt.sql.starts_with("SELECT \"sample_value\"::text AS sample_value"));
        assert!(
            stmt.sql
                .ends_with("ORDER BY \"public\".\"t\".\"sample_value\" LIMIT 10")
        );
    }

    #[test]
    fn test_sample_column_sql_end_only_uses_first_placeholder() {
        let range = ValueRange {
            start: None,
            end: Some(9),
        };
        let stmt = Dialect::Postgres.sample_column_sql("public", "t", "id", range, 5);
        assert!(stmt.sql.contains("\"id\" <= $1"));
        assert_eq!(stmt.params, vec![BindValue::Integer(9)]);
    }

    #[test]
    fn test_session_setup_sql() {
        let config = ConnectionConfig::default();
        let pg = Dialect::Postgres.session_setup_sql(&config);
        assert!(pg.contains(&"SET statement_timeout = '30000ms'".to_string()));
        assert!(pg.contains(&"SET default_transaction_read_only = on".to_string()));

        let ora = Dialect::Oracle.session_setup_sql(&config);
        assert_eq!(ora, vec!["SET TRANSACTION READ ONLY".to_string()]);
    }

    #[test]
    fn test_ping_sql() {
        assert_eq!(Dialect::Postgres.ping_sql(), "SELECT 1");
        assert_eq!(Dialect::Oracle.ping_sql(), "SELECT 1 FROM DUAL");
    }
}
