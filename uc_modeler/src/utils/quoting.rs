//! Identifier quoting
//!
//! Every identifier that ends up in generated SQL goes through here. Quoting
//! is the only sanitization applied to names, so nothing else in the crate
//! should splice a raw name into a statement.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// SQL dialect, which decides the identifier quoting token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    Databricks,
    Mysql,
    Postgres,
}

impl Dialect {
    /// Character used to open and close a quoted identifier
    pub fn quote_char(self) -> char {
        match self {
            Dialect::Databricks | Dialect::Mysql => '`',
            Dialect::Postgres => '"',
        }
    }
}

impl FromStr for Dialect {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "databricks" | "unity" | "spark" => Ok(Dialect::Databricks),
            "mysql" => Ok(Dialect::Mysql),
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            other => Err(Error::ConfigError(format!("Unsupported dialect: {}", other))),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Databricks => "databricks",
            Dialect::Mysql => "mysql",
            Dialect::Postgres => "postgres",
        };
        f.write_str(name)
    }
}

/// Quote a single identifier, doubling any embedded quote character
pub fn quote_ident(dialect: Dialect, ident: &str) -> String {
    let quote = dialect.quote_char();
    let mut quoted = String::with_capacity(ident.len() + 2);
    quoted.push(quote);
    for ch in ident.chars() {
        if ch == quote {
            quoted.push(quote);
        }
        quoted.push(ch);
    }
    quoted.push(quote);
    quoted
}

/// Quote `catalog.schema` or `catalog.schema.table`.
///
/// MySQL has no catalog level in names, so the catalog is left out there.
pub fn quote_qualified(
    dialect: Dialect,
    catalog: &str,
    schema: &str,
    table: Option<&str>,
) -> String {
    let mut parts = Vec::with_capacity(3);
    if dialect != Dialect::Mysql {
        parts.push(quote_ident(dialect, catalog));
    }
    parts.push(quote_ident(dialect, schema));
    if let Some(table) = table {
        parts.push(quote_ident(dialect, table));
    }
    parts.join(".")
}

/// Quote each name and join them with `, ` for a column list
pub fn quote_list<S: AsRef<str>>(dialect: Dialect, names: &[S]) -> String {
    names
        .iter()
        .map(|name| quote_ident(dialect, name.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}
