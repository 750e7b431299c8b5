use crate::errors::{ApiError, FieldError};
use freightlens_core::dates::parse_iso_date;
use freightlens_query::{Pagination, SearchMode, SearchQuery, ShipmentQuery};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use time::Date;

pub const MAX_LIMIT: usize = 200;
pub const DEFAULT_SEARCH_LIMIT: usize = 25;
pub const DEFAULT_SHIPMENT_LIMIT: usize = 50;

type JsonMap = Map<String, Value>;

/// The three request shapes the normalizer accepts. Matchers are tried in
/// this order and the first match wins; the winning shape is read atomically,
/// so a field is never filled in from a lower-precedence shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PayloadShape {
    Enveloped,
    Nested,
    Flat,
}

impl PayloadShape {
    const fn prefix(self) -> &'static str {
        match self {
            Self::Enveloped => "data.",
            Self::Nested | Self::Flat => "",
        }
    }
}

struct ResolvedShape<'a> {
    shape: PayloadShape,
    source: &'a JsonMap,
}

type ShapeMatcher = for<'a> fn(&'a JsonMap) -> Option<ResolvedShape<'a>>;

const SHAPE_MATCHERS: [ShapeMatcher; 3] = [match_enveloped, match_nested, match_flat];

fn has_section_keys(map: &JsonMap) -> bool {
    map.contains_key("search") || map.contains_key("pagination") || map.contains_key("filters")
}

fn match_enveloped(root: &JsonMap) -> Option<ResolvedShape<'_>> {
    let data = root.get("data")?.as_object()?;
    if !has_section_keys(data) {
        return None;
    }
    Some(ResolvedShape {
        shape: PayloadShape::Enveloped,
        source: data,
    })
}

fn match_nested(root: &JsonMap) -> Option<ResolvedShape<'_>> {
    if !has_section_keys(root) {
        return None;
    }
    Some(ResolvedShape {
        shape: PayloadShape::Nested,
        source: root,
    })
}

fn match_flat(root: &JsonMap) -> Option<ResolvedShape<'_>> {
    Some(ResolvedShape {
        shape: PayloadShape::Flat,
        source: root,
    })
}

/// Normalizes any accepted request shape into the canonical `SearchQuery`.
///
/// Field errors are collected across the whole payload and reported together;
/// a request either normalizes completely or is rejected completely. Defaults
/// are applied once, here, after every field has been read.
pub fn normalize_search_request(payload: &Value) -> Result<SearchQuery, ApiError> {
    let Some(root) = payload.as_object() else {
        return Err(ApiError::invalid_body("request body must be a JSON object"));
    };

    let mut errors: Vec<FieldError> = Vec::new();

    if let Some(data) = root.get("data") {
        if !data.is_null() && !data.is_object() {
            errors.push(FieldError::new("data", "object", data));
            return Err(ApiError::validation_failed(&errors));
        }
    }

    let resolved = SHAPE_MATCHERS
        .iter()
        .find_map(|matcher| matcher(root))
        .unwrap_or(ResolvedShape {
            shape: PayloadShape::Flat,
            source: root,
        });
    let prefix = resolved.shape.prefix();

    // Section-holding shapes read through typed section objects; the flat
    // shape reads every field from the payload root.
    let (search, pagination, filters) = match resolved.shape {
        PayloadShape::Flat => (None, None, None),
        _ => (
            typed_section(
                resolved.source,
                "search",
                &format!("{prefix}search"),
                &mut errors,
            ),
            typed_section(
                resolved.source,
                "pagination",
                &format!("{prefix}pagination"),
                &mut errors,
            ),
            typed_section(
                resolved.source,
                "filters",
                &format!("{prefix}filters"),
                &mut errors,
            ),
        ),
    };
    let flat = match resolved.shape {
        PayloadShape::Flat => Some(resolved.source),
        _ => None,
    };

    let search_prefix = if flat.is_some() {
        String::new()
    } else {
        format!("{prefix}search.")
    };
    let page_prefix = if flat.is_some() {
        String::new()
    } else {
        format!("{prefix}pagination.")
    };
    let filter_prefix = if flat.is_some() {
        String::new()
    } else {
        format!("{prefix}filters.")
    };
    let search_section = flat.or(search);
    let page_section = flat.or(pagination);
    let filter_section = flat.or(filters);

    let keyword = read_keyword(
        search_section,
        "q",
        &format!("{search_prefix}q"),
        &mut errors,
    );
    let mode = read_mode(
        search_section,
        &format!("{search_prefix}mode"),
        &mut errors,
    );
    let limit = read_int(
        page_section,
        "limit",
        &format!("{page_prefix}limit"),
        &mut errors,
    );
    let offset = read_int(
        page_section,
        "offset",
        &format!("{page_prefix}offset"),
        &mut errors,
    );
    let origin_countries = read_country_set(
        filter_section,
        "origin",
        &format!("{filter_prefix}origin"),
        &mut errors,
    );
    let dest_countries = read_country_set(
        filter_section,
        "destination",
        &format!("{filter_prefix}destination"),
        &mut errors,
    );
    let hs_codes = read_code_set(
        filter_section,
        "hs",
        &format!("{filter_prefix}hs"),
        &mut errors,
    );
    let carrier = read_keyword(
        filter_section,
        "carrier",
        &format!("{filter_prefix}carrier"),
        &mut errors,
    );
    let date_start = read_date(
        filter_section,
        "date_start",
        &format!("{filter_prefix}date_start"),
        &mut errors,
    );
    let date_end = read_date(
        filter_section,
        "date_end",
        &format!("{filter_prefix}date_end"),
        &mut errors,
    );

    if !errors.is_empty() {
        return Err(ApiError::validation_failed(&errors));
    }

    Ok(SearchQuery {
        keyword,
        mode: mode.unwrap_or_default(),
        origin_countries: origin_countries.unwrap_or_default(),
        dest_countries: dest_countries.unwrap_or_default(),
        hs_codes: hs_codes.unwrap_or_default(),
        carrier,
        date_start,
        date_end,
        pagination: Pagination {
            limit: limit.map_or(DEFAULT_SEARCH_LIMIT, clamp_limit),
            offset: offset.map_or(0, clamp_offset),
        },
    })
}

// Out-of-range numbers are clamped; only malformed types fail validation.
fn clamp_limit(raw: i64) -> usize {
    raw.clamp(1, MAX_LIMIT as i64) as usize
}

fn clamp_offset(raw: i64) -> usize {
    raw.max(0) as usize
}

fn typed_section<'a>(
    source: &'a JsonMap,
    key: &str,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<&'a JsonMap> {
    match source.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::Object(map)) => Some(map),
        Some(other) => {
            errors.push(FieldError::new(path, "object", other));
            None
        }
    }
}

fn present<'a>(section: Option<&'a JsonMap>, key: &str) -> Option<&'a Value> {
    match section?.get(key) {
        None | Some(Value::Null) => None,
        Some(value) => Some(value),
    }
}

fn read_keyword(
    section: Option<&JsonMap>,
    key: &str,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<String> {
    let value = present(section, key)?;
    match value.as_str() {
        Some(raw) => {
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        None => {
            errors.push(FieldError::new(path, "string", value));
            None
        }
    }
}

fn read_mode(
    section: Option<&JsonMap>,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<SearchMode> {
    let value = present(section, "mode")?;
    let Some(raw) = value.as_str() else {
        errors.push(FieldError::new(path, "string (air|ocean|all)", value));
        return None;
    };
    match SearchMode::parse(raw) {
        Some(mode) => Some(mode),
        None => {
            errors.push(FieldError::new(path, "one of air|ocean|all", value));
            None
        }
    }
}

fn read_int(
    section: Option<&JsonMap>,
    key: &str,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<i64> {
    let value = present(section, key)?;
    match value {
        Value::Number(n) => match n.as_i64() {
            Some(v) => Some(v),
            None => {
                errors.push(FieldError::new(path, "integer", value));
                None
            }
        },
        Value::String(raw) => match raw.trim().parse::<i64>() {
            Ok(v) => Some(v),
            Err(_) => {
                errors.push(FieldError::new(path, "integer", value));
                None
            }
        },
        _ => {
            errors.push(FieldError::new(path, "integer", value));
            None
        }
    }
}

fn read_date(
    section: Option<&JsonMap>,
    key: &str,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Date> {
    let value = present(section, key)?;
    let Some(raw) = value.as_str() else {
        errors.push(FieldError::new(path, "date (YYYY-MM-DD)", value));
        return None;
    };
    match parse_iso_date(raw) {
        Ok(date) => Some(date),
        Err(_) => {
            errors.push(FieldError::new(path, "date (YYYY-MM-DD)", value));
            None
        }
    }
}

fn read_string_items(
    value: &Value,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<Vec<String>> {
    match value {
        Value::String(raw) => Some(
            raw.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(ToString::to_string)
                .collect(),
        ),
        Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            let mut ok = true;
            for (i, item) in items.iter().enumerate() {
                match item.as_str() {
                    Some(raw) if !raw.trim().is_empty() => out.push(raw.trim().to_string()),
                    Some(_) => {}
                    None => {
                        errors.push(FieldError::new(format!("{path}[{i}]"), "string", item));
                        ok = false;
                    }
                }
            }
            ok.then_some(out)
        }
        _ => {
            errors.push(FieldError::new(path, "string or array of strings", value));
            None
        }
    }
}

fn read_country_set(
    section: Option<&JsonMap>,
    key: &str,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<BTreeSet<String>> {
    let value = present(section, key)?;
    let items = read_string_items(value, path, errors)?;
    Some(items.into_iter().map(|c| c.to_ascii_uppercase()).collect())
}

fn read_code_set(
    section: Option<&JsonMap>,
    key: &str,
    path: &str,
    errors: &mut Vec<FieldError>,
) -> Option<BTreeSet<String>> {
    let value = present(section, key)?;
    let items = read_string_items(value, path, errors)?;
    Some(items.into_iter().collect())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShipmentParams {
    pub company_id: String,
    pub limit: usize,
    pub offset: usize,
}

impl From<ShipmentParams> for ShipmentQuery {
    fn from(value: ShipmentParams) -> Self {
        Self {
            company_id: value.company_id,
            limit: value.limit,
            offset: value.offset,
        }
    }
}

/// Parses the drill-down query string. Unlike the JSON normalizer, query
/// parameters are always strings, so range violations are rejected rather
/// than clamped, matching strict query-param handling elsewhere.
pub fn parse_shipment_params(query: &BTreeMap<String, String>) -> Result<ShipmentParams, ApiError> {
    let company_id = query
        .get("company_id")
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(ApiError::missing_company_id)?;

    let limit = if let Some(raw) = query.get("limit") {
        let value = raw
            .parse::<usize>()
            .map_err(|_| ApiError::invalid_param("limit", raw))?;
        if value == 0 || value > MAX_LIMIT {
            return Err(ApiError::invalid_param("limit", raw));
        }
        value
    } else {
        DEFAULT_SHIPMENT_LIMIT
    };

    let offset = if let Some(raw) = query.get("offset") {
        raw.parse::<usize>()
            .map_err(|_| ApiError::invalid_param("offset", raw))?
    } else {
        0
    };

    Ok(ShipmentParams {
        company_id,
        limit,
        offset,
    })
}
