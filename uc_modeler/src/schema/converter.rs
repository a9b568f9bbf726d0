//! Conversion between warehouse graphs and design models

use crate::schema::types::{
    foreign_key_columns, Column, DesignColumn, DesignModel, DesignTable, SchemaGraph, Table,
};

/// Result of importing a warehouse graph into a design session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportOutcome {
    /// The model that replaces the session's model
    pub model: DesignModel,
    /// Tables of the previous model, in its order, that were thrown away
    pub discarded_tables: Vec<String>,
    pub discarded_relationships: usize,
}

impl ImportOutcome {
    /// Whether the import threw away any design work
    pub fn lost_edits(&self) -> bool {
        !self.discarded_tables.is_empty() || self.discarded_relationships > 0
    }
}

/// Converts between [`SchemaGraph`] and [`DesignModel`]
pub struct ModelConverter;

impl ModelConverter {
    /// Project a graph into a design model, dropping the derived FK flags
    pub fn to_design_model(graph: &SchemaGraph) -> DesignModel {
        let tables = graph
            .tables
            .iter()
            .map(|(name, table)| {
                let columns = table
                    .columns
                    .iter()
                    .map(|c| DesignColumn {
                        name: c.name.clone(),
                        data_type: c.data_type.clone(),
                        nullable: c.nullable,
                        is_pk: c.is_pk,
                    })
                    .collect();
                (
                    name.clone(),
                    DesignTable {
                        name: table.name.clone(),
                        columns,
                    },
                )
            })
            .collect();

        DesignModel {
            tables,
            relationships: graph.relationships.clone(),
        }
    }

    /// Build a transient graph view of a design model.
    ///
    /// FK flags are derived from the relationships; relationships whose
    /// tables are not in the model are left out.
    pub fn to_schema_graph(model: &DesignModel) -> SchemaGraph {
        let relationships: Vec<_> = model
            .relationships
            .iter()
            .filter(|rel| {
                model.tables.contains_key(&rel.child_table)
                    && model.tables.contains_key(&rel.parent_table)
            })
            .cloned()
            .collect();

        let mut graph = SchemaGraph::new();
        for (name, design_table) in &model.tables {
            let fk_set = foreign_key_columns(&relationships, name);
            let mut table = Table::new(name);
            for c in &design_table.columns {
                table.add_column(Column {
                    name: c.name.clone(),
                    data_type: c.data_type.clone(),
                    nullable: c.nullable,
                    is_pk: c.is_pk,
                    is_fk: fk_set.contains(c.name.as_str()),
                });
            }
            table.primary_key_columns = design_table.primary_key_columns();
            graph.add_table(table);
        }
        graph.relationships = relationships;
        graph
    }

    /// Replace a design model with an imported graph.
    ///
    /// Import never merges: the returned model is exactly
    /// `to_design_model(graph)`, and whatever was in `current` is gone once the
    /// caller stores it. The outcome lists what is being thrown away so the
    /// caller can warn first.
    pub fn import_replace(current: &DesignModel, graph: &SchemaGraph) -> ImportOutcome {
        let model = Self::to_design_model(graph);

        let discarded_tables: Vec<String> = current
            .tables
            .iter()
            .filter(|(name, table)| model.tables.get(*name) != Some(*table))
            .map(|(name, _)| name.clone())
            .collect();
        let discarded_relationships = current
            .relationships
            .iter()
            .filter(|rel| !model.relationships.contains(rel))
            .count();

        tracing::info!(
            tables = model.tables.len(),
            relationships = model.relationships.len(),
            discarded_tables = discarded_tables.len(),
            discarded_relationships,
            "Imported warehouse schema into design model"
        );

        ImportOutcome {
            model,
            discarded_tables,
            discarded_relationships,
        }
    }
}
