//! Warehouse connection handling
//!
//! This module provides a sqlx-backed [`SchemaWarehouse`] for databases that
//! expose an ANSI information_schema.

use async_trait::async_trait;
use sqlx::mysql::{MySqlPoolOptions, MySqlRow};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{FromRow, MySql, Pool, Postgres};
use std::time::Duration;

use crate::config::WarehouseConfig;
use crate::error::{Error, Result};
use crate::schema::rowsets::{
    ColumnRow, ConstraintRowsets, KeyColumnUsageRow, ReferentialConstraintRow, TableConstraintRow,
};
use crate::warehouse::queries::{self, Driver, MetadataQuery};
use crate::warehouse::SchemaWarehouse;

/// Enumeration of supported warehouse connections
#[derive(Debug, Clone)]
pub enum WarehouseConnection {
    Postgres(Pool<Postgres>),
    MySql(Pool<MySql>),
}

impl WarehouseConnection {
    /// Create a new connection pool from configuration
    pub async fn connect(config: &WarehouseConfig) -> Result<Self> {
        let driver: Driver = config.driver.parse()?;
        let pool_size = config.pool_size.unwrap_or(5);
        let timeout = Duration::from_secs(config.timeout_seconds.unwrap_or(30));

        let connection = match driver {
            Driver::Postgres => PgPoolOptions::new()
                .max_connections(pool_size)
                .acquire_timeout(timeout)
                .connect(&config.url)
                .await
                .map(WarehouseConnection::Postgres),
            Driver::MySql => MySqlPoolOptions::new()
                .max_connections(pool_size)
                .acquire_timeout(timeout)
                .connect(&config.url)
                .await
                .map(WarehouseConnection::MySql),
        };

        connection.map_err(|e| {
            Error::WarehouseError(format!("Failed to connect to {:?} warehouse: {}", driver, e))
        })
    }

    pub fn driver(&self) -> Driver {
        match self {
            WarehouseConnection::Postgres(_) => Driver::Postgres,
            WarehouseConnection::MySql(_) => Driver::MySql,
        }
    }

    /// Round-trip a trivial query
    pub async fn test_connection(&self) -> Result<()> {
        self.execute("SELECT 1").await
    }

    async fn fetch_rows<T>(&self, query: &MetadataQuery) -> Result<Vec<T>>
    where
        T: for<'r> FromRow<'r, PgRow> + for<'r> FromRow<'r, MySqlRow> + Send + Unpin,
    {
        match self {
            WarehouseConnection::Postgres(pool) => {
                let mut q = sqlx::query_as::<_, T>(&query.sql);
                for value in &query.binds {
                    q = q.bind(value.as_str());
                }
                Ok(q.fetch_all(pool).await?)
            }
            WarehouseConnection::MySql(pool) => {
                let mut q = sqlx::query_as::<_, T>(&query.sql);
                for value in &query.binds {
                    q = q.bind(value.as_str());
                }
                Ok(q.fetch_all(pool).await?)
            }
        }
    }

    async fn fetch_names(&self, query: MetadataQuery) -> Result<Vec<String>> {
        let rows: Vec<(String,)> = self.fetch_rows(&query).await?;
        Ok(rows.into_iter().map(|(name,)| name).collect())
    }
}

#[async_trait]
impl SchemaWarehouse for WarehouseConnection {
    async fn list_catalogs(&self) -> Result<Vec<String>> {
        let strategies = queries::list_catalogs(self.driver());
        Ok(queries::first_non_empty(strategies, |q| self.fetch_names(q)).await)
    }

    async fn list_schemas(&self, catalog: &str) -> Result<Vec<String>> {
        let strategies = queries::list_schemas(self.driver(), catalog);
        Ok(queries::first_non_empty(strategies, |q| self.fetch_names(q)).await)
    }

    async fn list_tables(&self, catalog: &str, schema: &str) -> Result<Vec<String>> {
        let strategies = queries::list_tables(self.driver(), catalog, schema);
        Ok(queries::first_non_empty(strategies, |q| self.fetch_names(q)).await)
    }

    async fn fetch_columns(&self, catalog: &str, schema: &str) -> Result<Vec<ColumnRow>> {
        self.fetch_rows(&queries::columns(self.driver(), catalog, schema)).await
    }

    async fn fetch_constraints(&self, catalog: &str, schema: &str) -> Result<ConstraintRowsets> {
        let driver = self.driver();
        let table_constraints: Vec<TableConstraintRow> = self
            .fetch_rows(&queries::table_constraints(driver, catalog, schema))
            .await?;
        let key_column_usage: Vec<KeyColumnUsageRow> = self
            .fetch_rows(&queries::key_column_usage(driver, catalog, schema))
            .await?;
        let referential_constraints: Vec<ReferentialConstraintRow> = self
            .fetch_rows(&queries::referential_constraints(driver, catalog, schema))
            .await?;

        Ok(ConstraintRowsets {
            table_constraints,
            key_column_usage,
            referential_constraints,
        })
    }

    async fn execute(&self, sql: &str) -> Result<()> {
        match self {
            WarehouseConnection::Postgres(pool) => {
                sqlx::query(sql).execute(pool).await?;
            }
            WarehouseConnection::MySql(pool) => {
                sqlx::query(sql).execute(pool).await?;
            }
        }
        Ok(())
    }
}
