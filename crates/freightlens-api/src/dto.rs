// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CompanySummaryDto {
    pub company_id: String,
    pub company_name: String,
    pub shipments_12m: u64,
    pub last_activity: Option<String>,
    pub top_routes: Vec<String>,
    pub top_carriers: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchResponseDto {
    pub rows: Vec<CompanySummaryDto>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShipmentRecordDto {
    pub shipped_on: String,
    pub mode: String,
    pub origin_country: String,
    pub dest_country: String,
    pub carrier: Option<String>,
    pub value_usd: Option<f64>,
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShipmentsResponseDto {
    pub rows: Vec<ShipmentRecordDto>,
}
