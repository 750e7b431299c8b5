// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use freightlens_core::warehouse::{NamedParam, Row, SqlValue, WarehouseError, WarehousePort};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;

/// Warehouse adapter over an embedded SQLite fact table. Binding is strictly
/// by name; `TextList` parameters are realized as JSON arrays consumed by
/// `json_each` in the compiled statements.
pub struct SqliteWarehouse {
    conn: Mutex<Connection>,
}

impl SqliteWarehouse {
    #[must_use]
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open(path: &Path) -> Result<Self, WarehouseError> {
        let conn = Connection::open(path).map_err(|e| WarehouseError(e.to_string()))?;
        Ok(Self::new(conn))
    }

    pub fn open_in_memory() -> Result<Self, WarehouseError> {
        let conn = Connection::open_in_memory().map_err(|e| WarehouseError(e.to_string()))?;
        Ok(Self::new(conn))
    }
}

fn bind_value(value: &SqlValue) -> Result<Value, WarehouseError> {
    Ok(match value {
        SqlValue::Null => Value::Null,
        SqlValue::Int(v) => Value::Integer(*v),
        SqlValue::Float(v) => Value::Real(*v),
        SqlValue::Text(v) => Value::Text(v.clone()),
        SqlValue::TextList(items) => Value::Text(
            serde_json::to_string(items)
                .map_err(|e| WarehouseError(format!("list parameter encoding failed: {e}")))?,
        ),
    })
}

fn cell_value(value: Value) -> Result<SqlValue, WarehouseError> {
    Ok(match value {
        Value::Null => SqlValue::Null,
        Value::Integer(v) => SqlValue::Int(v),
        Value::Real(v) => SqlValue::Float(v),
        Value::Text(v) => SqlValue::Text(v),
        Value::Blob(_) => {
            return Err(WarehouseError("unexpected blob result column".to_string()));
        }
    })
}

#[async_trait]
impl WarehousePort for SqliteWarehouse {
    async fn run_query(&self, sql: &str, params: &[NamedParam]) -> Result<Vec<Row>, WarehouseError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| WarehouseError("warehouse connection poisoned".to_string()))?;
        let mut stmt = conn
            .prepare_cached(sql)
            .map_err(|e| WarehouseError(e.to_string()))?;

        for (name, value) in params {
            let key = format!(":{name}");
            let idx = stmt
                .parameter_index(&key)
                .map_err(|e| WarehouseError(e.to_string()))?
                .ok_or_else(|| WarehouseError(format!("unknown statement parameter: {name}")))?;
            stmt.raw_bind_parameter(idx, bind_value(value)?)
                .map_err(|e| WarehouseError(e.to_string()))?;
        }

        let column_count = stmt.column_count();
        let mut raw = stmt.raw_query();
        let mut out = Vec::new();
        while let Some(row) = raw.next().map_err(|e| WarehouseError(e.to_string()))? {
            let mut cells = Vec::with_capacity(column_count);
            for i in 0..column_count {
                let value: Value = row
                    .get(i)
                    .map_err(|e| WarehouseError(e.to_string()))?;
                cells.push(cell_value(value)?);
            }
            out.push(cells);
        }
        Ok(out)
    }
}
