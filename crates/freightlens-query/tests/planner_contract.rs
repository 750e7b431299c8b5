use freightlens_query::{classify_query, validate_query, QueryClass, QueryLimits, SearchQuery};
use time::macros::date;

#[test]
fn keyword_and_unfiltered_queries_are_heavy() {
    let unfiltered = SearchQuery::default();
    assert_eq!(classify_query(&unfiltered), QueryClass::Heavy);

    let keyword = SearchQuery {
        keyword: Some("acme".to_string()),
        ..SearchQuery::default()
    };
    assert_eq!(classify_query(&keyword), QueryClass::Heavy);
}

#[test]
fn filtered_queries_are_medium() {
    let mut query = SearchQuery::default();
    query.origin_countries.insert("CN".to_string());
    assert_eq!(classify_query(&query), QueryClass::Medium);

    let carrier = SearchQuery {
        carrier: Some("Maersk".to_string()),
        ..SearchQuery::default()
    };
    assert_eq!(classify_query(&carrier), QueryClass::Medium);
}

#[test]
fn limit_bounds_are_enforced() {
    let limits = QueryLimits::default();

    let mut zero = SearchQuery::default();
    zero.pagination.limit = 0;
    assert!(validate_query(&zero, &limits).is_err());

    let mut over = SearchQuery::default();
    over.pagination.limit = limits.max_limit + 1;
    assert!(validate_query(&over, &limits).is_err());

    let mut max = SearchQuery::default();
    max.pagination.limit = limits.max_limit;
    assert!(validate_query(&max, &limits).is_ok());
}

#[test]
fn oversized_keyword_is_rejected() {
    let limits = QueryLimits::default();
    let query = SearchQuery {
        keyword: Some("x".repeat(limits.max_keyword_len + 1)),
        ..SearchQuery::default()
    };
    let err = validate_query(&query, &limits).expect_err("keyword too long");
    assert!(err.contains("keyword"));
}

#[test]
fn oversized_filter_sets_are_rejected() {
    let limits = QueryLimits::default();
    let mut query = SearchQuery::default();
    for i in 0..=limits.max_filter_values {
        query.hs_codes.insert(format!("{i:06}"));
    }
    let err = validate_query(&query, &limits).expect_err("too many hs codes");
    assert!(err.contains("hs"));
}

#[test]
fn inverted_date_range_is_rejected() {
    let limits = QueryLimits::default();
    let query = SearchQuery {
        date_start: Some(date!(2024 - 06 - 30)),
        date_end: Some(date!(2024 - 01 - 01)),
        ..SearchQuery::default()
    };
    let err = validate_query(&query, &limits).expect_err("inverted range");
    assert!(err.contains("date_start"));
}

#[test]
fn validation_is_pure_and_repeatable() {
    let limits = QueryLimits::default();
    let query = SearchQuery::default();
    assert_eq!(
        validate_query(&query, &limits),
        validate_query(&query, &limits)
    );
}
