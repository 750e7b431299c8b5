// SPDX-License-Identifier: Apache-2.0

use crate::filters::{escape_like, normalize_company_keyword, SearchQuery, ShipmentQuery};
use freightlens_core::dates::{format_iso_date, trailing_year_start};
use freightlens_core::warehouse::{NamedParam, SqlValue};
use std::collections::BTreeSet;
use time::Date;

#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    pub params: Vec<NamedParam>,
}

// Every optional predicate is guarded by its own parameter so the statement
// text is identical for every query; only the bindings vary. Pagination is
// applied to the aggregated rows, after GROUP BY.
const SEARCH_SQL: &str = "\
WITH matched AS (
    SELECT id, company_id, company_name, shipped_on, origin_country, dest_country, carrier
    FROM shipments
    WHERE (:keyword IS NULL OR company_name_norm LIKE :keyword ESCAPE '!')
      AND (:mode IS NULL OR mode = :mode)
      AND (:origins IS NULL OR origin_country IN (SELECT value FROM json_each(:origins)))
      AND (:dests IS NULL OR dest_country IN (SELECT value FROM json_each(:dests)))
      AND (:hs_codes IS NULL OR hs_code IN (SELECT value FROM json_each(:hs_codes)))
      AND (:carrier IS NULL OR carrier = :carrier)
      AND (:date_start IS NULL OR shipped_on >= :date_start)
      AND (:date_end IS NULL OR shipped_on <= :date_end)
),
companies AS (
    SELECT company_id,
           MIN(company_name) AS company_name,
           SUM(CASE WHEN shipped_on >= :since THEN 1 ELSE 0 END) AS shipments_12m,
           MAX(shipped_on) AS last_activity
    FROM matched
    GROUP BY company_id
),
route_ranks AS (
    SELECT company_id, route,
           ROW_NUMBER() OVER (PARTITION BY company_id ORDER BY freq DESC, first_seen ASC) AS rk
    FROM (
        SELECT company_id, origin_country || '\u{2192}' || dest_country AS route,
               COUNT(*) AS freq, MIN(id) AS first_seen
        FROM matched
        GROUP BY company_id, origin_country, dest_country
    )
),
top_routes AS (
    SELECT company_id, json_group_array(route ORDER BY rk) AS routes
    FROM route_ranks
    WHERE rk <= 5
    GROUP BY company_id
),
carrier_ranks AS (
    SELECT company_id, carrier,
           ROW_NUMBER() OVER (PARTITION BY company_id ORDER BY freq DESC, first_seen ASC) AS rk
    FROM (
        SELECT company_id, carrier, COUNT(*) AS freq, MIN(id) AS first_seen
        FROM matched
        WHERE carrier IS NOT NULL AND carrier <> ''
        GROUP BY company_id, carrier
    )
),
top_carriers AS (
    SELECT company_id, json_group_array(carrier ORDER BY rk) AS carriers
    FROM carrier_ranks
    WHERE rk <= 5
    GROUP BY company_id
)
SELECT c.company_id, c.company_name, c.shipments_12m, c.last_activity,
       COALESCE(r.routes, '[]') AS top_routes,
       COALESCE(k.carriers, '[]') AS top_carriers
FROM companies c
LEFT JOIN top_routes r ON r.company_id = c.company_id
LEFT JOIN top_carriers k ON k.company_id = c.company_id
ORDER BY c.shipments_12m DESC, c.company_id ASC
LIMIT :limit OFFSET :offset";

// Companies matching the filters, counted before pagination. A window-function
// total on the page statement would disappear whenever OFFSET lands past the
// last row, so this is a separate pass.
const SEARCH_TOTAL_SQL: &str = "\
SELECT COUNT(DISTINCT company_id) AS total
FROM shipments
WHERE (:keyword IS NULL OR company_name_norm LIKE :keyword ESCAPE '!')
  AND (:mode IS NULL OR mode = :mode)
  AND (:origins IS NULL OR origin_country IN (SELECT value FROM json_each(:origins)))
  AND (:dests IS NULL OR dest_country IN (SELECT value FROM json_each(:dests)))
  AND (:hs_codes IS NULL OR hs_code IN (SELECT value FROM json_each(:hs_codes)))
  AND (:carrier IS NULL OR carrier = :carrier)
  AND (:date_start IS NULL OR shipped_on >= :date_start)
  AND (:date_end IS NULL OR shipped_on <= :date_end)";

// The COALESCE fallback to the snapshot date appears in both the projection
// and the ORDER BY; diverging expressions would skew ordering against the
// reported date.
const SHIPMENTS_SQL: &str = "\
SELECT COALESCE(shipped_on, snapshot_on) AS shipped_on,
       mode, origin_country, dest_country, carrier, value_usd, weight_kg
FROM shipments
WHERE company_id = :company_id
ORDER BY COALESCE(shipped_on, snapshot_on) DESC, id ASC
LIMIT :limit OFFSET :offset";

fn keyword_param(query: &SearchQuery) -> SqlValue {
    match &query.keyword {
        Some(keyword) => SqlValue::Text(format!(
            "%{}%",
            escape_like(&normalize_company_keyword(keyword))
        )),
        None => SqlValue::Null,
    }
}

fn set_param(values: &BTreeSet<String>) -> SqlValue {
    if values.is_empty() {
        SqlValue::Null
    } else {
        SqlValue::TextList(values.iter().cloned().collect())
    }
}

fn date_param(value: Option<Date>) -> SqlValue {
    value.map_or(SqlValue::Null, |d| SqlValue::Text(format_iso_date(d)))
}

fn filter_params(query: &SearchQuery) -> Vec<NamedParam> {
    vec![
        ("keyword".to_string(), keyword_param(query)),
        (
            "mode".to_string(),
            SqlValue::opt_text(query.mode.as_fact_token()),
        ),
        ("origins".to_string(), set_param(&query.origin_countries)),
        ("dests".to_string(), set_param(&query.dest_countries)),
        ("hs_codes".to_string(), set_param(&query.hs_codes)),
        (
            "carrier".to_string(),
            SqlValue::opt_text(query.carrier.as_deref()),
        ),
        ("date_start".to_string(), date_param(query.date_start)),
        ("date_end".to_string(), date_param(query.date_end)),
    ]
}

/// Compiles the company aggregation page statement. Pure and deterministic:
/// the same `query` and `as_of` always produce byte-identical output.
#[must_use]
pub fn compile_search(query: &SearchQuery, as_of: Date) -> CompiledQuery {
    let mut params = filter_params(query);
    params.push((
        "since".to_string(),
        SqlValue::Text(format_iso_date(trailing_year_start(as_of))),
    ));
    params.push((
        "limit".to_string(),
        SqlValue::Int(query.pagination.limit as i64),
    ));
    params.push((
        "offset".to_string(),
        SqlValue::Int(query.pagination.offset as i64),
    ));
    CompiledQuery {
        sql: SEARCH_SQL.to_string(),
        params,
    }
}

/// Compiles the pre-pagination distinct-company count for the same filter set.
#[must_use]
pub fn compile_search_total(query: &SearchQuery) -> CompiledQuery {
    CompiledQuery {
        sql: SEARCH_TOTAL_SQL.to_string(),
        params: filter_params(query),
    }
}

#[must_use]
pub fn compile_shipments(req: &ShipmentQuery) -> CompiledQuery {
    CompiledQuery {
        sql: SHIPMENTS_SQL.to_string(),
        params: vec![
            (
                "company_id".to_string(),
                SqlValue::Text(req.company_id.clone()),
            ),
            ("limit".to_string(), SqlValue::Int(req.limit as i64)),
            ("offset".to_string(), SqlValue::Int(req.offset as i64)),
        ],
    }
}
