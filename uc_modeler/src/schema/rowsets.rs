//! Typed information-schema rowsets
//!
//! Rows are decoded once at the warehouse boundary; everything downstream
//! works with named fields.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// One row of `information_schema.columns`
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ColumnRow {
    pub table_name: String,
    pub column_name: String,
    pub data_type: String,
    /// `YES` or `NO`
    pub is_nullable: String,
    pub ordinal_position: i64,
}

impl ColumnRow {
    pub fn new(
        table_name: &str,
        column_name: &str,
        data_type: &str,
        is_nullable: bool,
        ordinal_position: i64,
    ) -> Self {
        Self {
            table_name: table_name.to_string(),
            column_name: column_name.to_string(),
            data_type: data_type.to_string(),
            is_nullable: if is_nullable { "YES" } else { "NO" }.to_string(),
            ordinal_position,
        }
    }

    pub fn nullable(&self) -> bool {
        self.is_nullable.trim().eq_ignore_ascii_case("YES")
    }
}

/// One row of `information_schema.table_constraints`
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct TableConstraintRow {
    pub table_name: String,
    pub constraint_name: String,
    pub constraint_type: String,
}

impl TableConstraintRow {
    pub fn new(table_name: &str, constraint_name: &str, kind: ConstraintKind) -> Self {
        Self {
            table_name: table_name.to_string(),
            constraint_name: constraint_name.to_string(),
            constraint_type: kind.as_sql().to_string(),
        }
    }

    pub fn kind(&self) -> ConstraintKind {
        ConstraintKind::parse(&self.constraint_type)
    }
}

/// One row of `information_schema.key_column_usage`
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct KeyColumnUsageRow {
    pub constraint_name: String,
    pub table_name: String,
    pub column_name: String,
    pub ordinal_position: i64,
}

impl KeyColumnUsageRow {
    pub fn new(
        constraint_name: &str,
        table_name: &str,
        column_name: &str,
        ordinal_position: i64,
    ) -> Self {
        Self {
            constraint_name: constraint_name.to_string(),
            table_name: table_name.to_string(),
            column_name: column_name.to_string(),
            ordinal_position,
        }
    }
}

/// One row of `information_schema.referential_constraints`
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ReferentialConstraintRow {
    pub constraint_name: String,
    /// The referenced primary/unique constraint
    pub unique_constraint_name: Option<String>,
    /// The referenced table, where the warehouse reports it (MySQL).
    /// Needed when constraint names are only unique per table.
    pub referenced_table_name: Option<String>,
}

impl ReferentialConstraintRow {
    pub fn new(constraint_name: &str, unique_constraint_name: Option<&str>) -> Self {
        Self {
            constraint_name: constraint_name.to_string(),
            unique_constraint_name: unique_constraint_name.map(str::to_string),
            referenced_table_name: None,
        }
    }

    /// Set the referenced table
    pub fn referencing(mut self, table_name: &str) -> Self {
        self.referenced_table_name = Some(table_name.to_string());
        self
    }
}

/// The three constraint rowsets fetched for one schema
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstraintRowsets {
    pub table_constraints: Vec<TableConstraintRow>,
    pub key_column_usage: Vec<KeyColumnUsageRow>,
    pub referential_constraints: Vec<ReferentialConstraintRow>,
}

/// Parsed `constraint_type`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey,
    Unique,
    Other,
}

impl ConstraintKind {
    /// Case-insensitive parse; unknown kinds map to `Other`
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_uppercase().as_str() {
            "PRIMARY KEY" => ConstraintKind::PrimaryKey,
            "FOREIGN KEY" => ConstraintKind::ForeignKey,
            "UNIQUE" => ConstraintKind::Unique,
            _ => ConstraintKind::Other,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "PRIMARY KEY",
            ConstraintKind::ForeignKey => "FOREIGN KEY",
            ConstraintKind::Unique => "UNIQUE",
            ConstraintKind::Other => "CHECK",
        }
    }
}
