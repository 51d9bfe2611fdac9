use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Deserialize;
use time::format_description::FormatItem;
use time::macros::format_description;
use time::Date;

use crate::error::AppError;

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Raw amount as it arrives in a JSON body. Clients send either a number
/// or a numeric string; both are coerced to a decimal.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

/// Coerces an amount to a decimal, requiring a finite value strictly
/// greater than zero. Normalized to two decimal places, matching the
/// precision of the stored column.
pub fn parse_amount(raw: &AmountInput) -> Result<Decimal, AppError> {
    let amount = match raw {
        AmountInput::Number(n) => {
            if !n.is_finite() {
                return Err(AppError::InvalidAmount);
            }
            Decimal::from_f64(*n).ok_or(AppError::InvalidAmount)?
        }
        AmountInput::Text(s) => s
            .trim()
            .parse::<Decimal>()
            .map_err(|_| AppError::InvalidAmount)?,
    };
    if amount <= Decimal::ZERO {
        return Err(AppError::InvalidAmount);
    }
    Ok(amount.round_dp(2))
}

/// Parses a `YYYY-MM-DD` calendar date and rejects anything after `today`.
/// Time of day never enters the comparison; `today` is injected so tests
/// stay deterministic.
pub fn parse_date(raw: &str, today: Date) -> Result<Date, AppError> {
    let date = Date::parse(raw.trim(), DATE_FORMAT).map_err(|_| AppError::FutureDate)?;
    if date > today {
        return Err(AppError::FutureDate);
    }
    Ok(date)
}

/// Trims a required label (category/source); empty or absent is a
/// missing field.
pub fn required_label(raw: Option<&str>, field: &'static str) -> Result<String, AppError> {
    let value = raw.map(str::trim).unwrap_or_default();
    if value.is_empty() {
        return Err(AppError::MissingField(field));
    }
    Ok(value.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn accepts_positive_numbers_and_numeric_strings() {
        let parsed = parse_amount(&AmountInput::Number(12.5)).unwrap();
        assert_eq!(parsed, "12.50".parse::<Decimal>().unwrap());

        let parsed = parse_amount(&AmountInput::Text(" 99.99 ".into())).unwrap();
        assert_eq!(parsed, "99.99".parse::<Decimal>().unwrap());
    }

    #[test]
    fn normalizes_amounts_to_two_decimal_places() {
        let parsed = parse_amount(&AmountInput::Text("10.999".into())).unwrap();
        assert_eq!(parsed, "11.00".parse::<Decimal>().unwrap());
    }

    #[test]
    fn rejects_zero_negative_and_non_numeric_amounts() {
        assert!(matches!(
            parse_amount(&AmountInput::Number(0.0)),
            Err(AppError::InvalidAmount)
        ));
        assert!(matches!(
            parse_amount(&AmountInput::Number(-3.2)),
            Err(AppError::InvalidAmount)
        ));
        assert!(matches!(
            parse_amount(&AmountInput::Number(f64::NAN)),
            Err(AppError::InvalidAmount)
        ));
        assert!(matches!(
            parse_amount(&AmountInput::Number(f64::INFINITY)),
            Err(AppError::InvalidAmount)
        ));
        assert!(matches!(
            parse_amount(&AmountInput::Text("lunch".into())),
            Err(AppError::InvalidAmount)
        ));
        assert!(matches!(
            parse_amount(&AmountInput::Text("-1".into())),
            Err(AppError::InvalidAmount)
        ));
    }

    #[test]
    fn accepts_today_and_past_dates() {
        let today = date!(2024 - 06 - 15);
        assert_eq!(parse_date("2024-06-15", today).unwrap(), today);
        assert_eq!(
            parse_date("2024-01-05", today).unwrap(),
            date!(2024 - 01 - 05)
        );
    }

    #[test]
    fn rejects_future_and_malformed_dates() {
        let today = date!(2024 - 06 - 15);
        assert!(matches!(
            parse_date("2024-06-16", today),
            Err(AppError::FutureDate)
        ));
        assert!(matches!(
            parse_date("not-a-date", today),
            Err(AppError::FutureDate)
        ));
        assert!(matches!(
            parse_date("2024-13-01", today),
            Err(AppError::FutureDate)
        ));
    }

    #[test]
    fn labels_are_trimmed_and_required() {
        assert_eq!(required_label(Some("  food "), "category").unwrap(), "food");
        assert!(matches!(
            required_label(Some("   "), "category"),
            Err(AppError::MissingField("category"))
        ));
        assert!(matches!(
            required_label(None, "source"),
            Err(AppError::MissingField("source"))
        ));
    }
}
