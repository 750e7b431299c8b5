// SPDX-License-Identifier: Apache-2.0

use freightlens_core::warehouse::WarehouseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum QueryErrorCode {
    Validation,
    InvalidArgument,
    Execution,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryError {
    pub code: QueryErrorCode,
    pub message: String,
}

impl QueryError {
    #[must_use]
    pub fn new(code: QueryErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::Validation, message)
    }

    #[must_use]
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::InvalidArgument, message)
    }

    #[must_use]
    pub fn execution(message: impl Into<String>) -> Self {
        Self::new(QueryErrorCode::Execution, message)
    }
}

impl std::fmt::Display for QueryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)
    }
}

impl std::error::Error for QueryError {}

impl From<WarehouseError> for QueryError {
    fn from(value: WarehouseError) -> Self {
        Self::execution(value.0)
    }
}
