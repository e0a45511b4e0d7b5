// ABOUTME: Display helpers for prices and dates in the Colombian (es-CO) style used by the gym UI.
// ABOUTME: Currency renders as whole pesos with dot grouping; dates render as day/month/year.

use crate::record::timestamp;

/// Shown for a missing or unreadable date.
pub const DATE_PLACEHOLDER: &str = "No especificado";

/// Format a peso amount like `$ 120.000` (non-breaking space after the sign).
/// Zero renders as `$0`.
pub fn format_currency(amount: i64) -> String {
    if amount == 0 {
        return "$0".to_string();
    }

    let digits = amount.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    let sign = if amount < 0 { "-" } else { "" };
    format!("{sign}$\u{a0}{grouped}")
}

/// Format a stored timestamp or `YYYY-MM-DD` date as `d/m/yyyy`.
pub fn format_date(value: Option<&str>) -> String {
    value
        .and_then(timestamp::parse)
        .map(|ts| ts.format("%-d/%-m/%Y").to_string())
        .unwrap_or_else(|| DATE_PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn currency_groups_thousands() {
        assert_eq!(format_currency(120_000), "$\u{a0}120.000");
        assert_eq!(format_currency(5_000), "$\u{a0}5.000");
        assert_eq!(format_currency(1_250_000), "$\u{a0}1.250.000");
        assert_eq!(format_currency(999), "$\u{a0}999");
    }

    #[test]
    fn currency_zero_and_negative() {
        assert_eq!(format_currency(0), "$0");
        assert_eq!(format_currency(-45_000), "-$\u{a0}45.000");
    }

    #[test]
    fn date_formats_day_month_year() {
        assert_eq!(format_date(Some("2024-03-05T14:30:00.000Z")), "5/3/2024");
        assert_eq!(format_date(Some("2023-12-25")), "25/12/2023");
    }

    #[test]
    fn date_placeholder_for_missing_or_bad_input() {
        assert_eq!(format_date(None), DATE_PLACEHOLDER);
        assert_eq!(format_date(Some("")), DATE_PLACEHOLDER);
        assert_eq!(format_date(Some("mañana")), DATE_PLACEHOLDER);
    }
}
