//! Warehouse module for uc_modeler
//!
//! This module defines the narrow interface the core uses to read metadata
//! from, and run DDL against, a SQL warehouse.

pub mod apply;
pub mod connection;
pub mod queries;

use async_trait::async_trait;

use crate::error::Result;
use crate::schema::rowsets::{ColumnRow, ConstraintRowsets};

// Re-export key types
pub use apply::{apply_statements, ApplyReport, StatementFailure};
pub use connection::WarehouseConnection;

/// Metadata source and statement sink for one warehouse
#[async_trait]
pub trait SchemaWarehouse: Send + Sync {
    /// Catalog names, sorted
    async fn list_catalogs(&self) -> Result<Vec<String>>;

    /// Schema names in a catalog, sorted
    async fn list_schemas(&self, catalog: &str) -> Result<Vec<String>>;

    /// Table names in a schema, sorted
    async fn list_tables(&self, catalog: &str, schema: &str) -> Result<Vec<String>>;

    /// The `information_schema.columns` rowset for a schema
    async fn fetch_columns(&self, catalog: &str, schema: &str) -> Result<Vec<ColumnRow>>;

    /// The three constraint rowsets for a schema
    async fn fetch_constraints(&self, catalog: &str, schema: &str) -> Result<ConstraintRowsets>;

    /// Execute a single statement
    async fn execute(&self, sql: &str) -> Result<()>;
}
