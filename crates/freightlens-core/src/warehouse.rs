// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use std::fmt;

/// A value bound to a named statement parameter, or read back from a result
/// cell. `TextList` is the repeated-value binding used by IN-style membership
/// predicates; it never appears in result cells.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
    TextList(Vec<String>),
}

impl SqlValue {
    #[must_use]
    pub fn opt_text(value: Option<&str>) -> Self {
        value.map_or(Self::Null, |v| Self::Text(v.to_string()))
    }
}

pub type NamedParam = (String, SqlValue);

pub type Row = Vec<SqlValue>;

/// Opaque warehouse failure. The message is safe to log; it must not carry
/// credentials, and callers must not forward it to API clients verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WarehouseError(pub String);

impl fmt::Display for WarehouseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for WarehouseError {}

/// The single capability the aggregation engine needs from a warehouse.
///
/// Adapters own connection and credential lifecycle; the engine owns
/// statement text and parameter binding. Implementations must support named
/// parameters and repeated-value (`TextList`) bindings.
#[async_trait]
pub trait WarehousePort: Send + Sync {
    async fn run_query(&self, sql: &str, params: &[NamedParam]) -> Result<Vec<Row>, WarehouseError>;
}
