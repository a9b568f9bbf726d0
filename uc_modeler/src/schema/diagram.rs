//! ER diagram encoding
//!
//! Renders graphs and design models as Graphviz DOT. Tables become HTML-label
//! nodes, relationships become child -> parent edges.

use crate::config::DiagramConfig;
use crate::schema::converter::ModelConverter;
use crate::schema::types::{DesignModel, Relationship, SchemaGraph, Table};

/// DOT encoder for ER diagrams
#[derive(Debug, Clone)]
pub struct DiagramEncoder {
    rankdir: String,
}

impl Default for DiagramEncoder {
    fn default() -> Self {
        Self::new(&DiagramConfig::default())
    }
}

impl DiagramEncoder {
    pub fn new(config: &DiagramConfig) -> Self {
        Self {
            rankdir: config.rankdir.clone(),
        }
    }

    /// Encode a warehouse graph
    pub fn encode(&self, graph: &SchemaGraph, schema_label: &str) -> String {
        let mut lines = vec![
            "digraph ERD {".to_string(),
            format!("  graph [rankdir={}, bgcolor=white];", self.rankdir),
            "  node [shape=plain, fontname=Helvetica];".to_string(),
            "  edge [color=gray50, arrowsize=0.8];".to_string(),
        ];

        let mut tables: Vec<&Table> = graph.tables.values().collect();
        tables.sort_by(|a, b| a.name.cmp(&b.name));
        for table in tables {
            lines.push(self.node_line(table, schema_label));
        }

        for rel in &graph.relationships {
            lines.push(self.edge_line(rel, schema_label));
        }

        lines.push("}".to_string());
        lines.join("\n")
    }

    /// Encode a design model. FK flags are derived for the rendering only.
    pub fn encode_model(&self, model: &DesignModel, schema_label: &str) -> String {
        self.encode(&ModelConverter::to_schema_graph(model), schema_label)
    }

    fn node_line(&self, table: &Table, schema_label: &str) -> String {
        let mut rows = vec![format!(
            "<TR><TD BGCOLOR=\"#e8e8e8\"><B>{}</B></TD></TR>",
            escape_html(&format!("{}.{}", schema_label, table.name))
        )];

        for column in &table.columns {
            let mut text = format!("{}: {}", column.name, column.data_type);
            if column.is_pk {
                text.push_str(" [PK]");
            }
            if column.is_fk {
                text.push_str(" [FK]");
            }
            rows.push(format!("<TR><TD ALIGN=\"LEFT\">{}</TD></TR>", escape_html(&text)));
        }

        format!(
            "  {} [label=<<TABLE BORDER=\"0\" CELLBORDER=\"1\" CELLSPACING=\"0\">{}</TABLE>>];",
            node_id(schema_label, &table.name),
            rows.concat()
        )
    }

    fn edge_line(&self, rel: &Relationship, schema_label: &str) -> String {
        let mut label = rel.name.clone();
        if rel.has_paired_columns() {
            let pairs: Vec<String> = rel
                .column_pairs()
                .map(|(child, parent)| format!("{}->{}", child, parent))
                .collect();
            label = format!("{} ({})", rel.name, pairs.join(", "));
        }

        format!(
            "  {} -> {} [color=\"#4b8bbe\", label=\"{}\"];",
            node_id(schema_label, &rel.child_table),
            node_id(schema_label, &rel.parent_table),
            escape_quoted(&label)
        )
    }
}

fn node_id(schema_label: &str, table: &str) -> String {
    let raw = format!("{}_{}", schema_label, table).replace('-', "_");
    format!("\"{}\"", escape_quoted(&raw))
}

fn escape_quoted(text: &str) -> String {
    text.replace('\\', "\\\\").replace('"', "\\\"")
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
