#![forbid(unsafe_code)]

pub const CRATE_NAME: &str = "freightlens-api";

pub mod convert;
pub mod dto;
pub mod error_mapping;
pub mod errors;
pub mod openapi;
pub mod params;
pub mod wire;

pub use convert::{search_response_dto, shipments_response_dto};
pub use dto::{
    CompanySummaryDto, SearchResponseDto, ShipmentRecordDto, ShipmentsResponseDto,
};
pub use error_mapping::{map_error, ApiErrorMapping};
pub use errors::{ApiError, ApiErrorCode, FieldError};
pub use openapi::openapi_v1_spec;
pub use params::{
    normalize_search_request, parse_shipment_params, ShipmentParams, DEFAULT_SEARCH_LIMIT,
    DEFAULT_SHIPMENT_LIMIT, MAX_LIMIT,
};
pub use wire::{company_shipments_v1, search_companies_v1, SearchAdapter};
