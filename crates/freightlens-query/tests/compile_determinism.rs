use freightlens_core::warehouse::SqlValue;
use freightlens_query::{
    compile_search, compile_search_total, compile_shipments, normalized_query_hash, SearchMode,
    SearchQuery, ShipmentQuery,
};
use time::macros::date;

fn filtered_query() -> SearchQuery {
    let mut query = SearchQuery {
        keyword: Some("Acme".to_string()),
        mode: SearchMode::Air,
        carrier: Some("Maersk".to_string()),
        date_start: Some(date!(2024 - 01 - 01)),
        date_end: Some(date!(2024 - 06 - 30)),
        ..SearchQuery::default()
    };
    query.origin_countries.insert("CN".to_string());
    query.origin_countries.insert("VN".to_string());
    query.hs_codes.insert("8471".to_string());
    query
}

#[test]
fn compile_is_deterministic_for_identical_input() {
    let query = filtered_query();
    let as_of = date!(2024 - 06 - 15);
    let a = compile_search(&query, as_of);
    let b = compile_search(&query, as_of);
    assert_eq!(a.sql, b.sql);
    assert_eq!(a.params, b.params);

    let ta = compile_search_total(&query);
    let tb = compile_search_total(&query);
    assert_eq!(ta.sql, tb.sql);
    assert_eq!(ta.params, tb.params);
}

#[test]
fn statement_text_is_identical_across_queries() {
    let as_of = date!(2024 - 06 - 15);
    let unfiltered = compile_search(&SearchQuery::default(), as_of);
    let filtered = compile_search(&filtered_query(), as_of);
    // only the bindings vary; the text never does
    assert_eq!(unfiltered.sql, filtered.sql);
    assert_ne!(unfiltered.params, filtered.params);
}

#[test]
fn unset_filters_bind_null() {
    let compiled = compile_search(&SearchQuery::default(), date!(2024 - 06 - 15));
    for name in [
        "keyword",
        "mode",
        "origins",
        "dests",
        "hs_codes",
        "carrier",
        "date_start",
        "date_end",
    ] {
        let (_, value) = compiled
            .params
            .iter()
            .find(|(n, _)| n == name)
            .expect("param present");
        assert_eq!(value, &SqlValue::Null, "{name} should be unbound");
    }
}

#[test]
fn keyword_binding_is_normalized_and_escaped() {
    let query = SearchQuery {
        keyword: Some("50%_OFF".to_string()),
        ..SearchQuery::default()
    };
    let compiled = compile_search(&query, date!(2024 - 06 - 15));
    let (_, value) = compiled
        .params
        .iter()
        .find(|(n, _)| n == "keyword")
        .expect("keyword param");
    assert_eq!(value, &SqlValue::Text("%50!%!_off%".to_string()));
}

#[test]
fn membership_filters_bind_ordered_lists() {
    let compiled = compile_search(&filtered_query(), date!(2024 - 06 - 15));
    let (_, value) = compiled
        .params
        .iter()
        .find(|(n, _)| n == "origins")
        .expect("origins param");
    assert_eq!(
        value,
        &SqlValue::TextList(vec!["CN".to_string(), "VN".to_string()])
    );
}

#[test]
fn window_start_is_365_days_before_as_of() {
    let compiled = compile_search(&SearchQuery::default(), date!(2024 - 06 - 15));
    let (_, value) = compiled
        .params
        .iter()
        .find(|(n, _)| n == "since")
        .expect("since param");
    assert_eq!(value, &SqlValue::Text("2023-06-16".to_string()));
}

#[test]
fn total_statement_carries_no_pagination() {
    let compiled = compile_search_total(&filtered_query());
    assert!(compiled.params.iter().all(|(n, _)| n != "limit"));
    assert!(compiled.params.iter().all(|(n, _)| n != "offset"));
    assert!(compiled.params.iter().all(|(n, _)| n != "since"));
}

#[test]
fn shipment_statement_binds_company_and_page() {
    let req = ShipmentQuery {
        company_id: "acme".to_string(),
        limit: 10,
        offset: 20,
    };
    let compiled = compile_shipments(&req);
    assert_eq!(
        compiled.params,
        vec![
            (
                "company_id".to_string(),
                SqlValue::Text("acme".to_string())
            ),
            ("limit".to_string(), SqlValue::Int(10)),
            ("offset".to_string(), SqlValue::Int(20)),
        ]
    );
}

#[test]
fn query_fingerprint_ignores_pagination() {
    let mut a = filtered_query();
    let mut b = filtered_query();
    a.pagination.limit = 5;
    a.pagination.offset = 50;
    b.pagination.limit = 100;
    let ha = normalized_query_hash(&a).expect("hash a");
    let hb = normalized_query_hash(&b).expect("hash b");
    assert_eq!(ha, hb);

    b.keyword = Some("Other".to_string());
    let hc = normalized_query_hash(&b).expect("hash c");
    assert_ne!(ha, hc);
}
