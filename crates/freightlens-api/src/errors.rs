// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum ApiErrorCode {
    InvalidRequestBody,
    ValidationFailed,
    InvalidQueryParameter,
    MissingCompanyId,
    QueryRejectedByPolicy,
    RateLimited,
    QueryExecutionFailed,
    NotReady,
    Internal,
}

impl ApiErrorCode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequestBody => "invalid_request_body",
            Self::ValidationFailed => "validation_failed",
            Self::InvalidQueryParameter => "invalid_query_parameter",
            Self::MissingCompanyId => "missing_company_id",
            Self::QueryRejectedByPolicy => "query_rejected_by_policy",
            Self::RateLimited => "rate_limited",
            Self::QueryExecutionFailed => "query_execution_failed",
            Self::NotReady => "not_ready",
            Self::Internal => "internal",
        }
    }
}

impl std::fmt::Display for ApiErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a validation failure: the dotted field path, the type the
/// normalizer expected, and the value it received.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub expected: String,
    pub received: Value,
}

impl FieldError {
    #[must_use]
    pub fn new(field: impl Into<String>, expected: &str, received: &Value) -> Self {
        Self {
            field: field.into(),
            expected: expected.to_string(),
            received: received.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
    pub details: Value,
}

impl ApiError {
    #[must_use]
    pub fn new(code: ApiErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
        }
    }

    #[must_use]
    pub fn invalid_body(reason: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidRequestBody,
            "invalid request body",
            json!({"reason": reason}),
        )
    }

    #[must_use]
    pub fn invalid_param(name: &str, value: &str) -> Self {
        Self::new(
            ApiErrorCode::InvalidQueryParameter,
            format!("invalid query parameter: {name}"),
            json!({"field_errors":[{"field": name, "reason": "invalid", "value": value}]}),
        )
    }

    #[must_use]
    pub fn validation_failed(field_errors: &[FieldError]) -> Self {
        Self::new(
            ApiErrorCode::ValidationFailed,
            "validation failed",
            json!({"field_errors": field_errors}),
        )
    }

    #[must_use]
    pub fn missing_company_id() -> Self {
        Self::new(
            ApiErrorCode::MissingCompanyId,
            "company_id must be a non-empty string",
            json!({"field": "company_id"}),
        )
    }

    #[must_use]
    pub fn internal(reason: &str) -> Self {
        Self::new(
            ApiErrorCode::Internal,
            "internal error",
            json!({"reason": reason}),
        )
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

impl From<freightlens_query::QueryError> for ApiError {
    fn from(value: freightlens_query::QueryError) -> Self {
        use freightlens_query::QueryErrorCode;
        match value.code {
            QueryErrorCode::Validation => Self::new(
                ApiErrorCode::ValidationFailed,
                value.message,
                json!({}),
            ),
            QueryErrorCode::InvalidArgument => Self::missing_company_id(),
            // warehouse causes stay in server logs; the wire gets a generic
            // failure so SQL fragments and connection detail never leak
            QueryErrorCode::Execution => Self::new(
                ApiErrorCode::QueryExecutionFailed,
                "warehouse query failed",
                json!({}),
            ),
            _ => Self::internal("unmapped engine error"),
        }
    }
}
