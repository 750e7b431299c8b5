// SPDX-License-Identifier: Apache-2.0

use crate::convert::{search_response_dto, shipments_response_dto};
use crate::errors::ApiError;
use crate::params::{normalize_search_request, parse_shipment_params};
use freightlens_query::{CompanySearchPage, SearchQuery, ShipmentQuery, ShipmentRecord};
use serde_json::Value;
use std::collections::BTreeMap;

/// Seam between the wire layer and the engine; the server implements it over
/// the live warehouse, tests over canned pages.
pub trait SearchAdapter {
    fn search_companies(&self, query: &SearchQuery) -> Result<CompanySearchPage, ApiError>;
    fn company_shipments(&self, req: &ShipmentQuery) -> Result<Vec<ShipmentRecord>, ApiError>;
}

pub fn search_companies_v1<A: SearchAdapter>(
    adapter: &A,
    payload: &Value,
) -> Result<Value, ApiError> {
    let query = normalize_search_request(payload)?;
    let page = adapter.search_companies(&query)?;
    let dto = search_response_dto(&page)?;
    serde_json::to_value(dto).map_err(|e| ApiError::internal(&e.to_string()))
}

pub fn company_shipments_v1<A: SearchAdapter>(
    adapter: &A,
    params: &BTreeMap<String, String>,
) -> Result<Value, ApiError> {
    let parsed = parse_shipment_params(params)?;
    let rows = adapter.company_shipments(&ShipmentQuery::from(parsed))?;
    let dto = shipments_response_dto(&rows);
    serde_json::to_value(dto).map_err(|e| ApiError::internal(&e.to_string()))
}
