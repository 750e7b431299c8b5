use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use time::Date;
use unicode_normalization::UnicodeNormalization;

/// Transport mode filter. `All` is the neutral element: it compiles to a
/// no-op predicate rather than a third mode token.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    Air,
    Ocean,
    #[default]
    All,
}

impl SearchMode {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let token = raw.trim();
        if token.eq_ignore_ascii_case("air") {
            Some(Self::Air)
        } else if token.eq_ignore_ascii_case("ocean") {
            Some(Self::Ocean)
        } else if token.eq_ignore_ascii_case("all") {
            Some(Self::All)
        } else {
            None
        }
    }

    /// The fact-table token this mode filters on; `None` means unfiltered.
    #[must_use]
    pub const fn as_fact_token(self) -> Option<&'static str> {
        match self {
            Self::Air => Some("air"),
            Self::Ocean => Some("ocean"),
            Self::All => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub limit: usize,
    pub offset: usize,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: 25,
            offset: 0,
        }
    }
}

/// Canonical search query, independent of wire shape. Every request shape
/// normalizes into this one value; defaults are already applied.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchQuery {
    pub keyword: Option<String>,
    pub mode: SearchMode,
    pub origin_countries: BTreeSet<String>,
    pub dest_countries: BTreeSet<String>,
    pub hs_codes: BTreeSet<String>,
    pub carrier: Option<String>,
    pub date_start: Option<Date>,
    pub date_end: Option<Date>,
    pub pagination: Pagination,
}

impl SearchQuery {
    #[must_use]
    pub fn has_any_filter(&self) -> bool {
        self.keyword.is_some()
            || self.mode != SearchMode::All
            || !self.origin_countries.is_empty()
            || !self.dest_countries.is_empty()
            || !self.hs_codes.is_empty()
            || self.carrier.is_some()
            || self.date_start.is_some()
            || self.date_end.is_some()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanySummary {
    pub company_id: String,
    pub company_name: String,
    pub shipments_12m: u64,
    pub last_activity: Option<Date>,
    pub top_routes: Vec<String>,
    pub top_carriers: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompanySearchPage {
    pub rows: Vec<CompanySummary>,
    pub total: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentMode {
    Air,
    Ocean,
}

impl ShipmentMode {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "air" => Some(Self::Air),
            "ocean" => Some(Self::Ocean),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Air => "air",
            Self::Ocean => "ocean",
        }
    }
}

/// One drill-down row. `shipped_on` is the effective date: the shipment date
/// when present, otherwise the warehouse snapshot date.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipmentRecord {
    pub shipped_on: Date,
    pub mode: ShipmentMode,
    pub origin: String,
    pub destination: String,
    pub carrier: Option<String>,
    pub value_usd: Option<f64>,
    pub weight_kg: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShipmentQuery {
    pub company_id: String,
    pub limit: usize,
    pub offset: usize,
}

impl ShipmentQuery {
    #[must_use]
    pub fn new(company_id: impl Into<String>) -> Self {
        Self {
            company_id: company_id.into(),
            limit: 50,
            offset: 0,
        }
    }
}

/// Canonical keyword normalization policy: NFKC + Unicode lowercase, matching
/// the `company_name_norm` column of the fact table.
#[must_use]
pub fn normalize_company_keyword(input: &str) -> String {
    input.nfkc().collect::<String>().to_lowercase()
}

#[must_use]
pub fn escape_like(fragment: &str) -> String {
    let mut out = String::with_capacity(fragment.len());
    for c in fragment.chars() {
        match c {
            '!' | '%' | '_' => {
                out.push('!');
                out.push(c);
            }
            _ => out.push(c),
        }
    }
    out
}
