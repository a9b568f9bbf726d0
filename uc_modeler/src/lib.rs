//! uc_modeler: explore and design Unity-Catalog-style warehouse schemas
//!
//! uc_modeler reads a schema's information_schema rowsets, reconciles them
//! into a table/relationship graph, converts that graph into an editable
//! design model, and generates the DDL to apply a design back to the
//! warehouse. The reconciliation, conversion, DDL and diagram code is
//! synchronous and stateless; only the warehouse calls are async.

pub mod config;
pub mod error;
pub mod schema;
pub mod utils;
pub mod warehouse;

// Re-export main types for easier access
pub use config::Config;
pub use error::{Error, Result};
pub use schema::{
    ConstraintResolver, DdlGenerator, DesignColumn, DesignModel, DiagramEncoder, ImportOutcome,
    ModelConverter, Relationship, SchemaGraph, SchemaGraphBuilder,
};
pub use warehouse::{ApplyReport, SchemaWarehouse, WarehouseConnection};

/// Initialize uc_modeler with the specified configuration file
pub async fn init(config_path: &str) -> Result<ModelerClient<WarehouseConnection>> {
    let config = config::load_from_file(config_path)?;
    config.validate()?;
    let connection = WarehouseConnection::connect(&config.warehouse).await?;
    Ok(ModelerClient::new(config, connection))
}

/// The main client tying a warehouse to the modeling engine
pub struct ModelerClient<W> {
    config: Config,
    warehouse: W,
    generator: DdlGenerator,
    encoder: DiagramEncoder,
}

impl<W: SchemaWarehouse> ModelerClient<W> {
    /// Create a client over an already-connected warehouse
    pub fn new(config: Config, warehouse: W) -> Self {
        let generator = DdlGenerator::new(&config.ddl);
        let encoder = DiagramEncoder::new(&config.diagram);
        Self {
            config,
            warehouse,
            generator,
            encoder,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn warehouse(&self) -> &W {
        &self.warehouse
    }

    pub fn generator(&self) -> &DdlGenerator {
        &self.generator
    }

    pub async fn list_catalogs(&self) -> Result<Vec<String>> {
        self.warehouse.list_catalogs().await
    }

    pub async fn list_schemas(&self, catalog: &str) -> Result<Vec<String>> {
        self.warehouse.list_schemas(catalog).await
    }

    pub async fn list_tables(&self, catalog: &str, schema: &str) -> Result<Vec<String>> {
        self.warehouse.list_tables(catalog, schema).await
    }

    /// Fetch a schema's metadata and reconcile it into a graph
    pub async fn fetch_graph(&self, catalog: &str, schema: &str) -> Result<SchemaGraph> {
        let columns = self.warehouse.fetch_columns(catalog, schema).await?;
        let constraints = self.warehouse.fetch_constraints(catalog, schema).await?;
        tracing::debug!(
            catalog,
            schema,
            column_rows = columns.len(),
            constraint_rows = constraints.table_constraints.len(),
            "Fetched schema metadata"
        );

        let resolved = ConstraintResolver::resolve(&constraints);
        Ok(SchemaGraphBuilder::build(&columns, &resolved))
    }

    /// Render a graph as DOT
    pub fn diagram(&self, graph: &SchemaGraph, schema: &str) -> String {
        self.encoder.encode(graph, schema)
    }

    /// Render a design model as DOT
    pub fn diagram_model(&self, model: &DesignModel, schema: &str) -> String {
        self.encoder.encode_model(model, schema)
    }

    /// Fetch a schema and compute the model that replaces `current`
    pub async fn import_design(
        &self,
        current: &DesignModel,
        catalog: &str,
        schema: &str,
    ) -> Result<ImportOutcome> {
        let graph = self.fetch_graph(catalog, schema).await?;
        Ok(ModelConverter::import_replace(current, &graph))
    }

    /// The statements `apply_model` would run
    pub fn preview_sql(&self, model: &DesignModel, catalog: &str, schema: &str) -> Vec<String> {
        self.generator.generate_from_model(model, catalog, schema)
    }

    /// Generate and apply a design model, one statement at a time
    pub async fn apply_model(
        &self,
        model: &DesignModel,
        catalog: &str,
        schema: &str,
    ) -> ApplyReport {
        let statements = self.preview_sql(model, catalog, schema);
        warehouse::apply_statements(&self.warehouse, &statements, &self.config.apply).await
    }

    /// Create a single table
    pub async fn create_table(
        &self,
        catalog: &str,
        schema: &str,
        table: &str,
        columns: &[DesignColumn],
        primary_key_columns: &[String],
    ) -> Result<String> {
        let sql = self
            .generator
            .create_table(catalog, schema, table, columns, primary_key_columns)?;
        self.run_one(sql).await
    }

    /// Add a single foreign key
    #[allow(clippy::too_many_arguments)]
    pub async fn add_foreign_key(
        &self,
        catalog: &str,
        schema: &str,
        child_table: &str,
        parent_table: &str,
        child_columns: &[String],
        parent_columns: &[String],
        constraint_name: &str,
    ) -> Result<String> {
        let sql = self.generator.add_foreign_key(
            catalog,
            schema,
            child_table,
            parent_table,
            child_columns,
            parent_columns,
            constraint_name,
        )?;
        self.run_one(sql).await
    }

    /// Execute one generated statement and hand it back on success
    async fn run_one(&self, sql: String) -> Result<String> {
        if self.config.apply.dry_run {
            tracing::info!(sql = %sql, "DDL (dry run)");
            return Ok(sql);
        }

        match self.warehouse.execute(&sql).await {
            Ok(()) => Ok(sql),
            Err(e) => Err(Error::ExecutionFailure {
                statement: sql,
                message: e.to_string(),
            }),
        }
    }
}
