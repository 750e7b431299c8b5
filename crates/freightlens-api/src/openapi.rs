// SPDX-License-Identifier: Apache-2.0

use serde_json::{json, Value};

pub const API_VERSION: &str = "v1";

/// Hand-maintained OpenAPI document for the two public operations. Kept in
/// lockstep with `dto.rs` and `errors.rs` by the contract tests.
#[must_use]
pub fn openapi_v1_spec() -> Value {
    json!({
        "openapi": "3.0.3",
        "info": {
            "title": "freightlens",
            "version": API_VERSION,
            "description": "Company search over the shipment fact table, with per-company drill-down"
        },
        "paths": {
            "/v1/companies/search": {
                "post": {
                    "operationId": "searchCompanies",
                    "requestBody": {
                        "required": true,
                        "content": {"application/json": {"schema": {"type": "object"}}}
                    },
                    "responses": {
                        "200": {
                            "description": "Aggregated company page",
                            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/SearchResponse"}}}
                        },
                        "400": {"$ref": "#/components/responses/ApiError"},
                        "422": {"$ref": "#/components/responses/ApiError"},
                        "429": {"$ref": "#/components/responses/ApiError"},
                        "500": {"$ref": "#/components/responses/ApiError"}
                    }
                }
            },
            "/v1/companies/shipments": {
                "get": {
                    "operationId": "companyShipments",
                    "parameters": [
                        {"name": "company_id", "in": "query", "required": true, "schema": {"type": "string", "minLength": 1}},
                        {"name": "limit", "in": "query", "schema": {"type": "integer", "minimum": 1, "maximum": 200, "default": 50}},
                        {"name": "offset", "in": "query", "schema": {"type": "integer", "minimum": 0, "default": 0}}
                    ],
                    "responses": {
                        "200": {
                            "description": "Raw shipment rows, newest first",
                            "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ShipmentsResponse"}}}
                        },
                        "400": {"$ref": "#/components/responses/ApiError"},
                        "500": {"$ref": "#/components/responses/ApiError"}
                    }
                }
            }
        },
        "components": {
            "responses": {
                "ApiError": {
                    "description": "Structured API error",
                    "content": {"application/json": {"schema": {"$ref": "#/components/schemas/ApiError"}}}
                }
            },
            "schemas": {
                "ApiError": {
                    "type": "object",
                    "required": ["code", "message", "details"],
                    "properties": {
                        "code": {"type": "string"},
                        "message": {"type": "string"},
                        "details": {"type": "object"}
                    }
                },
                "CompanySummary": {
                    "type": "object",
                    "required": ["company_id", "company_name", "shipments_12m", "top_routes", "top_carriers"],
                    "properties": {
                        "company_id": {"type": "string"},
                        "company_name": {"type": "string"},
                        "shipments_12m": {"type": "integer", "minimum": 0},
                        "last_activity": {"type": "string", "format": "date", "nullable": true},
                        "top_routes": {"type": "array", "items": {"type": "string"}, "maxItems": 5},
                        "top_carriers": {"type": "array", "items": {"type": "string"}, "maxItems": 5}
                    }
                },
                "SearchResponse": {
                    "type": "object",
                    "required": ["rows", "total"],
                    "properties": {
                        "rows": {"type": "array", "items": {"$ref": "#/components/schemas/CompanySummary"}},
                        "total": {"type": "integer", "minimum": 0}
                    }
                },
                "ShipmentRecord": {
                    "type": "object",
                    "required": ["shipped_on", "mode", "origin_country", "dest_country"],
                    "properties": {
                        "shipped_on": {"type": "string", "format": "date"},
                        "mode": {"type": "string", "enum": ["air", "ocean"]},
                        "origin_country": {"type": "string"},
                        "dest_country": {"type": "string"},
                        "carrier": {"type": "string", "nullable": true},
                        "value_usd": {"type": "number", "nullable": true},
                        "weight_kg": {"type": "number", "nullable": true}
                    }
                },
                "ShipmentsResponse": {
                    "type": "object",
                    "required": ["rows"],
                    "properties": {
                        "rows": {"type": "array", "items": {"$ref": "#/components/schemas/ShipmentRecord"}}
                    }
                }
            }
        }
    })
}
