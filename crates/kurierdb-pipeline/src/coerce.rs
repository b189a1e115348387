//! Coercion of raw scraped strings into typed values.
//!
//! The source uses German number formatting (decimal comma) and bare `HH:MM`
//! clock times that only make sense together with the document's date.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

/// Parses a decimal-comma number such as `18,357` or `9,30`.
pub(crate) fn parse_decimal(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.trim().replace(',', ".")).ok()
}

pub(crate) fn parse_i64(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}

/// Anchors a bare `HH:MM` clock time on the given calendar day.
pub(crate) fn time_on_day(raw: &str, day: NaiveDate) -> Option<NaiveDateTime> {
    let time = NaiveTime::parse_from_str(raw.trim(), "%H:%M").ok()?;
    Some(day.and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decimal_comma_is_the_decimal_separator() {
        assert_eq!(parse_decimal("18,357"), Decimal::from_str("18.357").ok());
        assert_eq!(parse_decimal("9,30"), Decimal::from_str("9.30").ok());
        assert_eq!(parse_decimal("neun"), None);
    }

    #[test]
    fn clock_time_lands_on_the_document_day() {
        let day = NaiveDate::from_ymd_opt(2014, 5, 6).unwrap();
        let ts = time_on_day("09:45", day).unwrap();
        assert_eq!(ts.to_string(), "2014-05-06 09:45:00");
        assert_eq!(time_on_day("25:00", day), None);
    }
}
