use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QueryLimits {
    pub max_limit: usize,
    pub max_keyword_len: usize,
    pub max_filter_values: usize,
}

impl Default for QueryLimits {
    fn default() -> Self {
        Self {
            max_limit: 200,
            max_keyword_len: 128,
            max_filter_values: 50,
        }
    }
}
