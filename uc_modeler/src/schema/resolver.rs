//! Constraint resolver
//!
//! Joins the `table_constraints`, `key_column_usage` and
//! `referential_constraints` rowsets into primary keys and foreign-key
//! relationships. Metadata that does not join up cleanly is dropped rather
//! than reported: information_schema can be briefly inconsistent while DDL
//! runs elsewhere.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::schema::rowsets::{ConstraintKind, ConstraintRowsets, KeyColumnUsageRow};
use crate::schema::types::Relationship;

/// Output of [`ConstraintResolver::resolve`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConstraints {
    /// Table name to primary key columns in ordinal order
    pub primary_keys: BTreeMap<String, Vec<String>>,
    pub relationships: Vec<Relationship>,
}

/// Resolves raw constraint rowsets into typed keys
pub struct ConstraintResolver;

impl ConstraintResolver {
    /// Resolve primary keys and realized foreign keys
    pub fn resolve(rowsets: &ConstraintRowsets) -> ResolvedConstraints {
        let pk_constraints = constraint_names_of_kind(rowsets, ConstraintKind::PrimaryKey);
        let fk_constraints = constraint_names_of_kind(rowsets, ConstraintKind::ForeignKey);

        // Primary keys, grouped by table
        let mut pk_rows: BTreeMap<&str, Vec<&KeyColumnUsageRow>> = BTreeMap::new();
        for row in &rowsets.key_column_usage {
            if pk_constraints.contains(row.constraint_name.as_str()) {
                pk_rows.entry(row.table_name.as_str()).or_default().push(row);
            }
        }
        let primary_keys = pk_rows
            .into_iter()
            .map(|(table, rows)| (table.to_string(), ordered_columns(rows)))
            .collect();

        // Usage rows per constraint name, for both sides of a foreign key
        let mut usage_by_constraint: HashMap<&str, Vec<&KeyColumnUsageRow>> = HashMap::new();
        for row in &rowsets.key_column_usage {
            usage_by_constraint
                .entry(row.constraint_name.as_str())
                .or_default()
                .push(row);
        }

        let mut owning_table: HashMap<&str, &str> = HashMap::new();
        for row in &rowsets.table_constraints {
            owning_table
                .entry(row.constraint_name.as_str())
                .or_insert(row.table_name.as_str());
        }

        let mut relationships = Vec::new();
        for rc in &rowsets.referential_constraints {
            let fk_name = rc.constraint_name.as_str();
            let parent_constraint = match rc.unique_constraint_name.as_deref() {
                Some(name) if !name.is_empty() => name,
                _ => {
                    tracing::debug!(
                        constraint = fk_name,
                        "Skipping foreign key without parent constraint"
                    );
                    continue;
                }
            };
            if !fk_constraints.contains(fk_name) {
                tracing::debug!(
                    constraint = fk_name,
                    "Skipping referential constraint not typed as FOREIGN KEY"
                );
                continue;
            }

            let fk_rows = usage_by_constraint.get(fk_name).cloned().unwrap_or_default();
            let child_table = fk_rows
                .iter()
                .min_by_key(|row| row.ordinal_position)
                .map(|row| row.table_name.as_str())
                .unwrap_or("");
            let child_columns = columns_of(&fk_rows, child_table);

            // Constraint names may only be unique per table (MySQL's `PRIMARY`),
            // so the referenced table wins over the name lookup when reported.
            let parent_table = match rc.referenced_table_name.as_deref() {
                Some(table) if !table.is_empty() => table,
                _ => owning_table.get(parent_constraint).copied().unwrap_or(""),
            };
            let parent_columns = usage_by_constraint
                .get(parent_constraint)
                .map(|rows| columns_of(rows, parent_table))
                .unwrap_or_default();

            if !child_table.is_empty()
                && !parent_table.is_empty()
                && !parent_columns.is_empty()
                && child_columns.len() == parent_columns.len()
            {
                relationships.push(Relationship {
                    name: fk_name.to_string(),
                    child_table: child_table.to_string(),
                    parent_table: parent_table.to_string(),
                    child_columns,
                    parent_columns,
                });
            } else {
                tracing::debug!(
                    constraint = fk_name,
                    parent_constraint,
                    parent_table,
                    child_columns = child_columns.len(),
                    parent_columns = parent_columns.len(),
                    "Dropping foreign key with incomplete metadata"
                );
            }
        }

        ResolvedConstraints {
            primary_keys,
            relationships,
        }
    }
}

fn constraint_names_of_kind(rowsets: &ConstraintRowsets, kind: ConstraintKind) -> HashSet<&str> {
    rowsets
        .table_constraints
        .iter()
        .filter(|row| row.kind() == kind)
        .map(|row| row.constraint_name.as_str())
        .collect()
}

/// Columns of `table` among `rows`, by ordinal position
fn columns_of(rows: &[&KeyColumnUsageRow], table: &str) -> Vec<String> {
    ordered_columns(rows.iter().copied().filter(|row| row.table_name == table).collect())
}

/// Column names sorted by ordinal position; ties keep arrival order
fn ordered_columns(mut rows: Vec<&KeyColumnUsageRow>) -> Vec<String> {
    rows.sort_by_key(|row| row.ordinal_position);
    rows.into_iter().map(|row| row.column_name.clone()).collect()
}
