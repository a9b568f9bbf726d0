//! Type definitions for schema graphs and design models

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Error, Result};

/// A warehouse-derived, read-only snapshot of one schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaGraph {
    pub tables: IndexMap<String, Table>,
    pub relationships: Vec<Relationship>,
}

impl SchemaGraph {
    /// Create a new empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a table, replacing any table of the same name
    pub fn add_table(&mut self, table: Table) {
        self.tables.insert(table.name.clone(), table);
    }

    /// Look up a table by its exact name
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(name)
    }
}

/// Represents a table in a schema graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    /// Columns in ordinal position order
    pub columns: Vec<Column>,
    pub primary_key_columns: Vec<String>,
}

impl Table {
    /// Create a new table with the given name
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            columns: Vec::new(),
            primary_key_columns: Vec::new(),
        }
    }

    /// Add a column to the table
    pub fn add_column(&mut self, column: Column) {
        self.columns.push(column);
    }

    /// Look up a column by its exact name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// Represents a column in a schema graph
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub nullable: bool,
    pub is_pk: bool,
    pub is_fk: bool,
}

impl Column {
    /// Create a new nullable column with the given name and type
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.trim().to_string(),
            nullable: true,
            is_pk: false,
            is_fk: false,
        }
    }

    /// Set whether the column is nullable
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }
}

/// A foreign-key relationship from a child table to a parent table.
///
/// `child_columns[i]` references `parent_columns[i]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// Constraint identifier; may be empty in a design model
    #[serde(default)]
    pub name: String,
    pub child_table: String,
    pub parent_table: String,
    #[serde(alias = "child_cols")]
    pub child_columns: Vec<String>,
    #[serde(alias = "parent_cols")]
    pub parent_columns: Vec<String>,
}

impl Relationship {
    /// Create a new relationship
    pub fn new(
        name: &str,
        child_table: &str,
        parent_table: &str,
        child_columns: Vec<String>,
        parent_columns: Vec<String>,
    ) -> Self {
        Self {
            name: name.to_string(),
            child_table: child_table.to_string(),
            parent_table: parent_table.to_string(),
            child_columns,
            parent_columns,
        }
    }

    /// Both column lists are non-empty and of equal length
    pub fn has_paired_columns(&self) -> bool {
        !self.child_columns.is_empty() && self.child_columns.len() == self.parent_columns.len()
    }

    /// Whether the table is the child or the parent side
    pub fn involves(&self, table: &str) -> bool {
        self.child_table == table || self.parent_table == table
    }

    /// Positional `(child, parent)` column pairs
    pub fn column_pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.child_columns
            .iter()
            .zip(self.parent_columns.iter())
            .map(|(c, p)| (c.as_str(), p.as_str()))
    }
}

/// Names of the columns of `table` that appear on the child side of any relationship
pub(crate) fn foreign_key_columns<'a>(
    relationships: &'a [Relationship],
    table: &str,
) -> HashSet<&'a str> {
    relationships
        .iter()
        .filter(|rel| rel.child_table == table)
        .flat_map(|rel| rel.child_columns.iter().map(String::as_str))
        .collect()
}

/// An offline, editable schema design.
///
/// The value is owned by the caller's session; every operation in this crate
/// takes it by reference and never keeps it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignModel {
    #[serde(default)]
    pub tables: IndexMap<String, DesignTable>,
    #[serde(default)]
    pub relationships: Vec<Relationship>,
}

impl DesignModel {
    /// Create an empty design model
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty() && self.relationships.is_empty()
    }

    /// Table names sorted for display
    pub fn table_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tables.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Insert or replace a table.
    ///
    /// Columns with a blank name are dropped. An existing table keeps its
    /// position in iteration order.
    pub fn upsert_table(&mut self, name: &str, columns: Vec<DesignColumn>) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::invalid_input("table name must not be empty"));
        }

        let columns: Vec<DesignColumn> = columns
            .into_iter()
            .filter_map(|mut column| {
                column.name = column.name.trim().to_string();
                column.data_type = column.data_type.trim().to_string();
                (!column.name.is_empty()).then_some(column)
            })
            .collect();

        let replaced = self
            .tables
            .insert(
                name.to_string(),
                DesignTable {
                    name: name.to_string(),
                    columns,
                },
            )
            .is_some();

        tracing::debug!(table = name, replaced, "Upserted design table");
        Ok(())
    }

    /// Remove a table and every relationship that touches it
    pub fn remove_table(&mut self, name: &str) -> bool {
        let name = name.trim();
        if self.tables.shift_remove(name).is_none() {
            return false;
        }

        let before = self.relationships.len();
        self.relationships.retain(|rel| !rel.involves(name));
        tracing::debug!(
            table = name,
            relationships_removed = before - self.relationships.len(),
            "Removed design table"
        );
        true
    }

    /// Append a relationship between two tables of this model
    pub fn add_relationship(&mut self, mut relationship: Relationship) -> Result<()> {
        relationship.name = relationship.name.trim().to_string();

        if !relationship.has_paired_columns() {
            return Err(Error::invalid_input(format!(
                "child and parent column lists must have the same non-zero length (got {} and {})",
                relationship.child_columns.len(),
                relationship.parent_columns.len()
            )));
        }

        for (table, columns) in [
            (&relationship.child_table, &relationship.child_columns),
            (&relationship.parent_table, &relationship.parent_columns),
        ] {
            let design_table = self
                .tables
                .get(table)
                .ok_or_else(|| Error::invalid_input(format!("unknown table: {}", table)))?;
            if let Some(missing) = columns.iter().find(|c| design_table.column(c).is_none()) {
                return Err(Error::invalid_input(format!(
                    "unknown column {}.{}",
                    table, missing
                )));
            }
        }

        self.relationships.push(relationship);
        Ok(())
    }
}

/// A table in a design model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignTable {
    pub name: String,
    pub columns: Vec<DesignColumn>,
}

impl DesignTable {
    /// Primary key columns in column order
    pub fn primary_key_columns(&self) -> Vec<String> {
        self.columns
            .iter()
            .filter(|c| c.is_pk)
            .map(|c| c.name.clone())
            .collect()
    }

    pub fn column(&self, name: &str) -> Option<&DesignColumn> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A column in a design model. Foreign-key membership is never stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesignColumn {
    pub name: String,
    pub data_type: String,
    #[serde(default = "default_nullable")]
    pub nullable: bool,
    #[serde(default)]
    pub is_pk: bool,
}

impl DesignColumn {
    /// Create a new nullable, non-key column
    pub fn new(name: &str, data_type: &str) -> Self {
        Self {
            name: name.to_string(),
            data_type: data_type.to_string(),
            nullable: true,
            is_pk: false,
        }
    }

    /// Set whether the column is nullable
    pub fn nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    /// Mark the column as part of the primary key
    pub fn primary_key(mut self) -> Self {
        self.is_pk = true;
        self
    }

    /// Name and data type are both non-blank
    pub fn is_valid(&self) -> bool {
        !self.name.trim().is_empty() && !self.data_type.trim().is_empty()
    }
}

fn default_nullable() -> bool {
    true
}
