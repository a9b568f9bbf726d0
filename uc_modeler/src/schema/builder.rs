//! Schema graph builder
//!
//! Combines the columns rowset with resolved constraints into a
//! [`SchemaGraph`].

use std::collections::{BTreeMap, HashSet};

use crate::schema::resolver::ResolvedConstraints;
use crate::schema::rowsets::ColumnRow;
use crate::schema::types::{foreign_key_columns, Column, Relationship, SchemaGraph, Table};

/// Builds schema graphs from warehouse rowsets
pub struct SchemaGraphBuilder;

impl SchemaGraphBuilder {
    /// Build a graph with tables in name order and columns in ordinal order.
    ///
    /// Only tables with at least one column row are materialized, and only
    /// relationships whose tables and columns all made it into the graph are
    /// kept.
    pub fn build(columns: &[ColumnRow], resolved: &ResolvedConstraints) -> SchemaGraph {
        let mut by_table: BTreeMap<&str, Vec<&ColumnRow>> = BTreeMap::new();
        for row in columns {
            by_table.entry(row.table_name.as_str()).or_default().push(row);
        }

        let relationships: Vec<Relationship> = resolved
            .relationships
            .iter()
            .filter(|rel| {
                let materialized = has_columns(&by_table, &rel.child_table, &rel.child_columns)
                    && has_columns(&by_table, &rel.parent_table, &rel.parent_columns);
                if !materialized {
                    tracing::debug!(
                        constraint = %rel.name,
                        child_table = %rel.child_table,
                        parent_table = %rel.parent_table,
                        "Dropping relationship to a table or column without column rows"
                    );
                }
                materialized
            })
            .cloned()
            .collect();

        let mut graph = SchemaGraph::new();
        for (table_name, mut rows) in by_table {
            rows.sort_by_key(|row| row.ordinal_position);

            let pk_columns: &[String] = resolved
                .primary_keys
                .get(table_name)
                .map(Vec::as_slice)
                .unwrap_or_default();
            let pk_set: HashSet<&str> = pk_columns.iter().map(String::as_str).collect();
            let fk_set = foreign_key_columns(&relationships, table_name);

            let mut table = Table::new(table_name);
            for row in rows {
                let name = row.column_name.as_str();
                table.add_column(Column {
                    name: name.to_string(),
                    data_type: row.data_type.trim().to_string(),
                    nullable: row.nullable(),
                    is_pk: pk_set.contains(name),
                    is_fk: fk_set.contains(name),
                });
            }
            table.primary_key_columns = pk_columns
                .iter()
                .filter(|pk| table.column(pk).is_some())
                .cloned()
                .collect();

            graph.add_table(table);
        }

        graph.relationships = relationships;

        tracing::debug!(
            tables = graph.tables.len(),
            relationships = graph.relationships.len(),
            "Built schema graph"
        );
        graph
    }
}

fn has_columns(
    by_table: &BTreeMap<&str, Vec<&ColumnRow>>,
    table: &str,
    columns: &[String],
) -> bool {
    by_table.get(table).is_some_and(|rows| {
        columns
            .iter()
            .all(|column| rows.iter().any(|row| row.column_name == *column))
    })
}
