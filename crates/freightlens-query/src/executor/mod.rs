// SPDX-License-Identifier: Apache-2.0

use crate::db::{compile_search, compile_search_total, compile_shipments};
use crate::filters::{
    CompanySearchPage, CompanySummary, SearchQuery, ShipmentMode, ShipmentQuery, ShipmentRecord,
};
use crate::limits::QueryLimits;
use crate::planner::validate_query;
use crate::query_error::QueryError;
use crate::row_decode::{
    col_date, col_opt_date, col_opt_f64, col_opt_text, col_string_array, col_text, col_u64,
};
use freightlens_core::warehouse::{Row, WarehousePort};
use time::Date;

/// Runs the company aggregation: one page statement plus one pre-pagination
/// distinct-company count. Fails fast; the warehouse call is never retried
/// here.
pub async fn search_companies(
    warehouse: &dyn WarehousePort,
    query: &SearchQuery,
    limits: &QueryLimits,
    as_of: Date,
) -> Result<CompanySearchPage, QueryError> {
    validate_query(query, limits).map_err(QueryError::validation)?;

    let page = compile_search(query, as_of);
    let raw_rows = warehouse.run_query(&page.sql, &page.params).await?;
    let mut rows = Vec::with_capacity(raw_rows.len());
    for row in &raw_rows {
        rows.push(decode_company_row(row).map_err(QueryError::execution)?);
    }

    let count = compile_search_total(query);
    let count_rows = warehouse.run_query(&count.sql, &count.params).await?;
    let total = decode_total_row(&count_rows).map_err(QueryError::execution)?;

    Ok(CompanySearchPage { rows, total })
}

/// Paginated drill-down into one company's raw shipment rows, newest first.
pub async fn company_shipments(
    warehouse: &dyn WarehousePort,
    req: &ShipmentQuery,
    limits: &QueryLimits,
) -> Result<Vec<ShipmentRecord>, QueryError> {
    if req.company_id.trim().is_empty() {
        return Err(QueryError::invalid_argument("company_id must be non-empty"));
    }
    if req.limit == 0 || req.limit > limits.max_limit {
        return Err(QueryError::validation(format!(
            "limit must be between 1 and {}",
            limits.max_limit
        )));
    }

    let compiled = compile_shipments(req);
    let raw_rows = warehouse.run_query(&compiled.sql, &compiled.params).await?;
    let mut rows = Vec::with_capacity(raw_rows.len());
    for row in &raw_rows {
        rows.push(decode_shipment_row(row).map_err(QueryError::execution)?);
    }
    Ok(rows)
}

fn decode_company_row(row: &Row) -> Result<CompanySummary, String> {
    Ok(CompanySummary {
        company_id: col_text(row, 0, "company_id")?,
        company_name: col_text(row, 1, "company_name")?,
        shipments_12m: col_u64(row, 2, "shipments_12m")?,
        last_activity: col_opt_date(row, 3, "last_activity")?,
        top_routes: col_string_array(row, 4, "top_routes")?,
        top_carriers: col_string_array(row, 5, "top_carriers")?,
    })
}

fn decode_total_row(rows: &[Row]) -> Result<u64, String> {
    let row = rows
        .first()
        .ok_or_else(|| "count statement returned no row".to_string())?;
    col_u64(row, 0, "total")
}

fn decode_shipment_row(row: &Row) -> Result<ShipmentRecord, String> {
    let mode_token = col_text(row, 1, "mode")?;
    let mode = ShipmentMode::parse(&mode_token)
        .ok_or_else(|| format!("unexpected mode value `{mode_token}`"))?;
    Ok(ShipmentRecord {
        shipped_on: col_date(row, 0, "shipped_on")?,
        mode,
        origin: col_text(row, 2, "origin_country")?,
        destination: col_text(row, 3, "dest_country")?,
        carrier: col_opt_text(row, 4, "carrier")?,
        value_usd: col_opt_f64(row, 5, "value_usd")?,
        weight_kg: col_opt_f64(row, 6, "weight_kg")?,
    })
}
