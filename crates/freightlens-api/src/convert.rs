// SPDX-License-Identifier: Apache-2.0

use crate::dto::{
    CompanySummaryDto, SearchResponseDto, ShipmentRecordDto, ShipmentsResponseDto,
};
use crate::errors::{ApiError, FieldError};
use freightlens_core::dates::format_iso_date;
use freightlens_query::{CompanySearchPage, CompanySummary, ShipmentRecord};
use serde_json::json;

pub fn search_response_dto(page: &CompanySearchPage) -> Result<SearchResponseDto, ApiError> {
    let mut rows = Vec::with_capacity(page.rows.len());
    for row in &page.rows {
        rows.push(company_summary_dto(row)?);
    }
    Ok(SearchResponseDto {
        rows,
        total: page.total,
    })
}

fn company_summary_dto(row: &CompanySummary) -> Result<CompanySummaryDto, ApiError> {
    if row.company_id.trim().is_empty() {
        return Err(ApiError::validation_failed(&[FieldError::new(
            "company_id",
            "non-empty string",
            &json!(row.company_id),
        )]));
    }
    Ok(CompanySummaryDto {
        company_id: row.company_id.clone(),
        company_name: row.company_name.clone(),
        shipments_12m: row.shipments_12m,
        last_activity: row.last_activity.map(format_iso_date),
        top_routes: row.top_routes.clone(),
        top_carriers: row.top_carriers.clone(),
    })
}

#[must_use]
pub fn shipments_response_dto(rows: &[ShipmentRecord]) -> ShipmentsResponseDto {
    ShipmentsResponseDto {
        rows: rows.iter().map(shipment_record_dto).collect(),
    }
}

fn shipment_record_dto(row: &ShipmentRecord) -> ShipmentRecordDto {
    ShipmentRecordDto {
        shipped_on: format_iso_date(row.shipped_on),
        mode: row.mode.as_str().to_string(),
        origin_country: row.origin.clone(),
        dest_country: row.destination.clone(),
        carrier: row.carrier.clone(),
        value_usd: row.value_usd,
        weight_kg: row.weight_kg,
    }
}
