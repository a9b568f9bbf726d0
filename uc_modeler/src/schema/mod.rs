//! Schema module for uc_modeler
//!
//! This module turns information-schema rowsets into schema graphs, converts
//! them to and from design models, and renders DDL and diagrams.

pub mod builder;
pub mod converter;
pub mod diagram;
pub mod generator;
pub mod resolver;
pub mod rowsets;
pub mod types;

// Re-export key types
pub use builder::SchemaGraphBuilder;
pub use converter::{ImportOutcome, ModelConverter};
pub use diagram::DiagramEncoder;
pub use generator::{default_constraint_name, render_script, DdlGenerator};
pub use resolver::{ConstraintResolver, ResolvedConstraints};
pub use rowsets::{
    ColumnRow, ConstraintKind, ConstraintRowsets, KeyColumnUsageRow, ReferentialConstraintRow,
    TableConstraintRow,
};
pub use types::{Column, DesignColumn, DesignModel, DesignTable, Relationship, SchemaGraph, Table};
