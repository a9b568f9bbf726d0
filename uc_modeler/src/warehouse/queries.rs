//! Metadata queries
//!
//! SQL for the information_schema reads, per driver. Listing operations
//! come as an ordered list of strategies: the connection tries each in turn
//! and keeps the first one that returns rows.

use std::future::Future;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::utils::quoting::{quote_ident, Dialect};

/// Supported warehouse drivers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Driver {
    Postgres,
    MySql,
}

impl Driver {
    /// The only DDL dialect this driver's database accepts
    pub fn dialect(self) -> Dialect {
        match self {
            Driver::Postgres => Dialect::Postgres,
            Driver::MySql => Dialect::Mysql,
        }
    }

    fn placeholder(self, n: usize) -> String {
        match self {
            Driver::Postgres => format!("${}", n),
            Driver::MySql => "?".to_string(),
        }
    }

    fn text(self, column: &str) -> String {
        match self {
            Driver::Postgres => format!("CAST({0} AS TEXT) AS {0}", column),
            Driver::MySql => format!("CAST({0} AS CHAR) AS {0}", column),
        }
    }

    fn int(self, column: &str) -> String {
        match self {
            Driver::Postgres => format!("CAST({0} AS BIGINT) AS {0}", column),
            Driver::MySql => format!("CAST({0} AS SIGNED) AS {0}", column),
        }
    }

    /// `WHERE` clause scoping a query to one schema, and its bind values.
    ///
    /// MySQL has a single catalog (`def`), so only the schema is bound there.
    fn scope(
        self,
        catalog_column: &str,
        schema_column: &str,
        catalog: &str,
        schema: &str,
    ) -> (String, Vec<String>) {
        match self {
            Driver::Postgres => (
                format!(
                    "WHERE {} = {} AND {} = {}",
                    catalog_column,
                    self.placeholder(1),
                    schema_column,
                    self.placeholder(2)
                ),
                vec![catalog.to_string(), schema.to_string()],
            ),
            Driver::MySql => (
                format!("WHERE {} = {}", schema_column, self.placeholder(1)),
                vec![schema.to_string()],
            ),
        }
    }
}

impl FromStr for Driver {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(Driver::Postgres),
            "mysql" => Ok(Driver::MySql),
            other => Err(Error::ConfigError(format!(
                "Unsupported warehouse driver: {}",
                other
            ))),
        }
    }
}

/// A statement plus its positional bind values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetadataQuery {
    pub sql: String,
    pub binds: Vec<String>,
}

impl MetadataQuery {
    fn new(sql: String, binds: Vec<String>) -> Self {
        Self { sql, binds }
    }

    fn unbound(sql: &str) -> Self {
        Self::new(sql.to_string(), Vec::new())
    }
}

/// Run strategies in order and return the first non-empty, sorted name list.
///
/// A failing strategy is logged and skipped. All strategies empty or failing
/// yields an empty list.
pub async fn first_non_empty<F, Fut>(
    strategies: Vec<MetadataQuery>,
    mut fetch: F,
) -> Vec<String>
where
    F: FnMut(MetadataQuery) -> Fut,
    Fut: Future<Output = Result<Vec<String>>>,
{
    for (attempt, strategy) in strategies.into_iter().enumerate() {
        let sql = strategy.sql.clone();
        match fetch(strategy).await {
            Ok(mut names) if !names.is_empty() => {
                names.sort();
                return names;
            }
            Ok(_) => {
                tracing::debug!(attempt, sql = %sql, "Metadata strategy returned no rows");
            }
            Err(e) => {
                tracing::debug!(attempt, sql = %sql, error = %e, "Metadata strategy failed");
            }
        }
    }
    Vec::new()
}

/// Strategies for listing catalogs
pub fn list_catalogs(driver: Driver) -> Vec<MetadataQuery> {
    match driver {
        Driver::Postgres => vec![
            MetadataQuery::unbound(
                "SELECT CAST(datname AS TEXT) AS name FROM pg_catalog.pg_database \
                 WHERE NOT datistemplate ORDER BY name",
            ),
            MetadataQuery::unbound("SELECT CAST(current_database() AS TEXT) AS name"),
        ],
        Driver::MySql => vec![MetadataQuery::unbound(
            "SELECT DISTINCT CAST(catalog_name AS CHAR) AS name \
             FROM information_schema.schemata ORDER BY name",
        )],
    }
}

/// Strategies for listing the schemas of a catalog
pub fn list_schemas(driver: Driver, catalog: &str) -> Vec<MetadataQuery> {
    let info_schema = MetadataQuery::new(
        format!(
            "SELECT {} FROM information_schema.schemata WHERE catalog_name = {} \
             ORDER BY schema_name",
            driver.text("schema_name"),
            driver.placeholder(1)
        ),
        vec![catalog.to_string()],
    );

    match driver {
        Driver::Postgres => vec![
            info_schema,
            MetadataQuery::unbound(
                "SELECT CAST(nspname AS TEXT) AS name FROM pg_catalog.pg_namespace ORDER BY name",
            ),
        ],
        Driver::MySql => vec![info_schema, MetadataQuery::unbound("SHOW DATABASES")],
    }
}

/// Strategies for listing the tables of a schema
pub fn list_tables(driver: Driver, catalog: &str, schema: &str) -> Vec<MetadataQuery> {
    let (scope, binds) = driver.scope("table_catalog", "table_schema", catalog, schema);
    let info_schema = MetadataQuery::new(
        format!(
            "SELECT {} FROM information_schema.tables {} ORDER BY table_name",
            driver.text("table_name"),
            scope
        ),
        binds,
    );

    match driver {
        Driver::Postgres => vec![
            info_schema,
            MetadataQuery::new(
                format!(
                    "SELECT CAST(tablename AS TEXT) AS name FROM pg_catalog.pg_tables \
                     WHERE schemaname = {} ORDER BY name",
                    driver.placeholder(1)
                ),
                vec![schema.to_string()],
            ),
        ],
        Driver::MySql => vec![
            info_schema,
            MetadataQuery::new(
                format!("SHOW TABLES IN {}", quote_ident(Dialect::Mysql, schema)),
                Vec::new(),
            ),
        ],
    }
}

/// `information_schema.columns` for a schema
pub fn columns(driver: Driver, catalog: &str, schema: &str) -> MetadataQuery {
    let (scope, binds) = driver.scope("table_catalog", "table_schema", catalog, schema);
    MetadataQuery::new(
        format!(
            "SELECT {}, {}, {}, {}, {} FROM information_schema.columns {}",
            driver.text("table_name"),
            driver.text("column_name"),
            driver.text("data_type"),
            driver.text("is_nullable"),
            driver.int("ordinal_position"),
            scope
        ),
        binds,
    )
}

/// `information_schema.table_constraints` for a schema
pub fn table_constraints(driver: Driver, catalog: &str, schema: &str) -> MetadataQuery {
    let (scope, binds) = driver.scope("table_catalog", "table_schema", catalog, schema);
    MetadataQuery::new(
        format!(
            "SELECT {}, {}, {} FROM information_schema.table_constraints {}",
            driver.text("table_name"),
            driver.text("constraint_name"),
            driver.text("constraint_type"),
            scope
        ),
        binds,
    )
}

/// `information_schema.key_column_usage` for a schema
pub fn key_column_usage(driver: Driver, catalog: &str, schema: &str) -> MetadataQuery {
    let (scope, binds) = driver.scope("table_catalog", "table_schema", catalog, schema);
    MetadataQuery::new(
        format!(
            "SELECT {}, {}, {}, {} FROM information_schema.key_column_usage {}",
            driver.text("constraint_name"),
            driver.text("table_name"),
            driver.text("column_name"),
            driver.int("ordinal_position"),
            scope
        ),
        binds,
    )
}

/// `information_schema.referential_constraints` for a schema.
///
/// MySQL names every primary key `PRIMARY`, so its referenced table is
/// selected too. Postgres has no such column and reports NULL.
pub fn referential_constraints(driver: Driver, catalog: &str, schema: &str) -> MetadataQuery {
    let (scope, binds) = driver.scope("constraint_catalog", "constraint_schema", catalog, schema);
    let referenced_table = match driver {
        Driver::Postgres => "CAST(NULL AS TEXT) AS referenced_table_name".to_string(),
        Driver::MySql => driver.text("referenced_table_name"),
    };
    MetadataQuery::new(
        format!(
            "SELECT {}, {}, {} FROM information_schema.referential_constraints {}",
            driver.text("constraint_name"),
            driver.text("unique_constraint_name"),
            referenced_table,
            scope
        ),
        binds,
    )
}
