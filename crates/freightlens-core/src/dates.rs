use time::macros::format_description;
use time::{Date, Duration, OffsetDateTime};

const ISO_DATE: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day]");

/// Parses a `YYYY-MM-DD` date, the only date format accepted on the wire
/// and the only one stored in the shipment fact table.
pub fn parse_iso_date(raw: &str) -> Result<Date, String> {
    Date::parse(raw.trim(), ISO_DATE).map_err(|e| format!("invalid date `{raw}`: {e}"))
}

#[must_use]
pub fn format_iso_date(date: Date) -> String {
    format!(
        "{:04}-{:02}-{:02}",
        date.year(),
        u8::from(date.month()),
        date.day()
    )
}

/// Start of the trailing-12-months window: 365 days before `as_of`, inclusive.
#[must_use]
pub fn trailing_year_start(as_of: Date) -> Date {
    as_of.saturating_sub(Duration::days(365))
}

#[must_use]
pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}
