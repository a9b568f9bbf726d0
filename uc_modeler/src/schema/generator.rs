//! DDL generator
//!
//! This module generates `CREATE TABLE` and `ALTER TABLE ... ADD CONSTRAINT`
//! statements from design models or ad-hoc column and key lists.

use crate::config::DdlConfig;
use crate::error::{Error, Result};
use crate::schema::types::{DesignColumn, DesignModel};
use crate::utils::quoting::{quote_ident, quote_list, quote_qualified, Dialect};

/// Text shown in place of an empty script
pub const EMPTY_SCRIPT: &str = "-- No statements";

/// DDL statement generator
#[derive(Debug, Clone, Copy)]
pub struct DdlGenerator {
    dialect: Dialect,
    if_not_exists: bool,
}

impl DdlGenerator {
    /// Create a new generator from DDL settings
    pub fn new(config: &DdlConfig) -> Self {
        Self {
            dialect: config.dialect,
            if_not_exists: config.if_not_exists,
        }
    }

    /// Override whether `CREATE TABLE` is guarded with `IF NOT EXISTS`
    pub fn with_if_not_exists(mut self, if_not_exists: bool) -> Self {
        self.if_not_exists = if_not_exists;
        self
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Generate a `CREATE TABLE` statement.
    ///
    /// Columns missing a name or a data type are left out. `is_pk` on the
    /// columns is ignored; the key comes from `primary_key_columns`.
    pub fn create_table(
        &self,
        catalog: &str,
        schema: &str,
        table: &str,
        columns: &[DesignColumn],
        primary_key_columns: &[String],
    ) -> Result<String> {
        let table = table.trim();
        if table.is_empty() {
            return Err(Error::invalid_input("table name must not be empty"));
        }

        let column_defs: Vec<String> = columns
            .iter()
            .filter(|c| c.is_valid())
            .map(|c| {
                let null_sql = if c.nullable { "" } else { " NOT NULL" };
                format!(
                    "{} {}{}",
                    quote_ident(self.dialect, c.name.trim()),
                    c.data_type.trim(),
                    null_sql
                )
            })
            .collect();

        if column_defs.is_empty() {
            return Err(Error::invalid_input(format!(
                "table {} needs at least one column with a name and data type",
                table
            )));
        }

        let pk_sql = if primary_key_columns.is_empty() {
            String::new()
        } else {
            format!(
                ", CONSTRAINT {} PRIMARY KEY ({})",
                quote_ident(self.dialect, &format!("pk_{}", table)),
                quote_list(self.dialect, primary_key_columns)
            )
        };
        let ine = if self.if_not_exists { "IF NOT EXISTS " } else { "" };

        Ok(format!(
            "CREATE TABLE {}{} ({}{})",
            ine,
            quote_qualified(self.dialect, catalog, schema, Some(table)),
            column_defs.join(", "),
            pk_sql
        ))
    }

    /// Generate an `ALTER TABLE ... ADD CONSTRAINT ... FOREIGN KEY` statement.
    ///
    /// Columns are paired by position and must be equally many.
    #[allow(clippy::too_many_arguments)]
    pub fn add_foreign_key(
        &self,
        catalog: &str,
        schema: &str,
        child_table: &str,
        parent_table: &str,
        child_columns: &[String],
        parent_columns: &[String],
        constraint_name: &str,
    ) -> Result<String> {
        if child_columns.is_empty() || child_columns.len() != parent_columns.len() {
            return Err(Error::invalid_input(format!(
                "child and parent column lists must have the same non-zero length (got {} and {})",
                child_columns.len(),
                parent_columns.len()
            )));
        }

        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            quote_qualified(self.dialect, catalog, schema, Some(child_table)),
            quote_ident(self.dialect, constraint_name),
            quote_list(self.dialect, child_columns),
            quote_qualified(self.dialect, catalog, schema, Some(parent_table)),
            quote_list(self.dialect, parent_columns)
        ))
    }

    /// Generate every statement needed to materialize a design model.
    ///
    /// All `CREATE TABLE` statements come first, in table order, followed by
    /// the foreign keys in relationship order. Tables without a usable column
    /// and malformed relationships are skipped.
    pub fn generate_from_model(
        &self,
        model: &DesignModel,
        catalog: &str,
        schema: &str,
    ) -> Vec<String> {
        let mut statements = Vec::new();

        for (name, table) in &model.tables {
            let valid: Vec<DesignColumn> = table
                .columns
                .iter()
                .filter(|c| c.is_valid())
                .cloned()
                .collect();
            if valid.is_empty() {
                tracing::debug!(table = %name, "Skipping table without valid columns");
                continue;
            }
            let pk: Vec<String> = valid
                .iter()
                .filter(|c| c.is_pk)
                .map(|c| c.name.trim().to_string())
                .collect();

            match self.create_table(catalog, schema, name, &valid, &pk) {
                Ok(sql) => statements.push(sql),
                Err(e) => tracing::warn!(table = %name, error = %e, "Skipping table"),
            }
        }

        for (index, rel) in model.relationships.iter().enumerate() {
            let name = if rel.name.trim().is_empty() {
                synthesized_constraint_name(&rel.child_table, &rel.parent_table, index)
            } else {
                rel.name.clone()
            };

            match self.add_foreign_key(
                catalog,
                schema,
                &rel.child_table,
                &rel.parent_table,
                &rel.child_columns,
                &rel.parent_columns,
                &name,
            ) {
                Ok(sql) => statements.push(sql),
                Err(e) => tracing::warn!(constraint = %name, error = %e, "Skipping relationship"),
            }
        }

        statements
    }
}

/// Default constraint name offered for a new relationship
pub fn default_constraint_name(child_table: &str, parent_table: &str) -> String {
    format!("fk_{}_{}", child_table, parent_table)
}

/// Name for an unnamed relationship at `index` in the model's relationship list
pub fn synthesized_constraint_name(child_table: &str, parent_table: &str, index: usize) -> String {
    format!("fk_{}_{}_{}", child_table, parent_table, index + 1)
}

/// Join statements into a previewable script
pub fn render_script(statements: &[String]) -> String {
    if statements.is_empty() {
        EMPTY_SCRIPT.to_string()
    } else {
        statements.join(";\n\n")
    }
}
