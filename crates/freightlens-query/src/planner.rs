use crate::filters::SearchQuery;
use crate::limits::QueryLimits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[non_exhaustive]
pub enum QueryClass {
    Cheap,
    Medium,
    Heavy,
}

/// Cost class used for per-class concurrency permits. Keyword scans and
/// unfiltered aggregations touch every partition; filtered aggregations are
/// bounded by their predicates. Single-company drill-downs are `Cheap`.
#[must_use]
pub fn classify_query(query: &SearchQuery) -> QueryClass {
    if query.keyword.is_some() || !query.has_any_filter() {
        QueryClass::Heavy
    } else {
        QueryClass::Medium
    }
}

pub fn validate_query(query: &SearchQuery, limits: &QueryLimits) -> Result<(), String> {
    let limit = query.pagination.limit;
    if limit == 0 || limit > limits.max_limit {
        return Err(format!("limit must be between 1 and {}", limits.max_limit));
    }

    if let Some(keyword) = &query.keyword {
        if keyword.len() > limits.max_keyword_len {
            return Err(format!(
                "keyword length exceeds {}",
                limits.max_keyword_len
            ));
        }
    }

    for (name, set) in [
        ("origin", &query.origin_countries),
        ("destination", &query.dest_countries),
        ("hs", &query.hs_codes),
    ] {
        if set.len() > limits.max_filter_values {
            return Err(format!(
                "{name} filter exceeds {} values",
                limits.max_filter_values
            ));
        }
    }

    if let (Some(start), Some(end)) = (query.date_start, query.date_end) {
        if end < start {
            return Err("date_start must be <= date_end".to_string());
        }
    }

    Ok(())
}
