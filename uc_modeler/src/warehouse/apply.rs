//! Applying generated DDL
//!
//! Statements run one at a time with no surrounding transaction. A failed
//! statement is recorded and the loop moves on, so a batch can end up
//! partially applied; the report says exactly which statements failed.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::config::ApplyConfig;
use crate::error::Error;
use crate::warehouse::SchemaWarehouse;

/// A statement the warehouse rejected
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatementFailure {
    /// Zero-based position in the submitted batch
    pub index: usize,
    pub statement: String,
    pub message: String,
}

impl StatementFailure {
    /// Convert into the crate error, keeping the statement text
    pub fn into_error(self) -> Error {
        Error::ExecutionFailure {
            statement: self.statement,
            message: self.message,
        }
    }
}

/// Outcome of applying a batch of statements
#[derive(Debug, Clone, Serialize)]
pub struct ApplyReport {
    pub dry_run: bool,
    pub attempted: usize,
    pub succeeded: usize,
    pub failures: Vec<StatementFailure>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ApplyReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Each failed statement followed by its error as a SQL comment
    pub fn render_failures(&self) -> String {
        self.failures
            .iter()
            .map(|f| format!("{}\n-- ERROR: {}", f.statement, f.message))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Execute every statement independently and collect the failures
pub async fn apply_statements<W>(
    warehouse: &W,
    statements: &[String],
    config: &ApplyConfig,
) -> ApplyReport
where
    W: SchemaWarehouse + ?Sized,
{
    let started_at = Utc::now();

    if config.dry_run {
        for (i, statement) in statements.iter().enumerate() {
            tracing::info!(statement_number = i + 1, sql = %statement, "DDL (dry run)");
        }
        return ApplyReport {
            dry_run: true,
            attempted: 0,
            succeeded: 0,
            failures: Vec::new(),
            started_at,
            finished_at: Utc::now(),
        };
    }

    let mut succeeded = 0;
    let mut failures = Vec::new();

    for (index, statement) in statements.iter().enumerate() {
        tracing::info!(statement_number = index + 1, "Applying statement");

        match warehouse.execute(statement).await {
            Ok(()) => succeeded += 1,
            Err(e) => {
                tracing::warn!(
                    statement_number = index + 1,
                    sql = %statement,
                    error = %e,
                    "Statement failed"
                );
                failures.push(StatementFailure {
                    index,
                    statement: statement.clone(),
                    message: e.to_string(),
                });
            }
        }
    }

    tracing::info!(
        attempted = statements.len(),
        succeeded,
        failed = failures.len(),
        "Apply finished"
    );

    ApplyReport {
        dry_run: false,
        attempted: statements.len(),
        succeeded,
        failures,
        started_at,
        finished_at: Utc::now(),
    }
}
