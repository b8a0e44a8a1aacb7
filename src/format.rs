//! Conversion of raw cell values into the strings printed on the page.

use crate::dates;
use crate::error::FieldFormatError;
use crate::record::Value;

/// How a bound field is turned into text.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FieldFormat {
    /// Trimmed display text; absent values print as an empty string.
    #[default]
    Text,
    /// Two-decimal currency with thousands separators. Absent counts as zero.
    Money,
    /// A calendar date in `MM/DD/YYYY`, or `fallback` when the date is absent.
    Date {
        /// Literal printed when the cell holds no usable date.
        fallback: Option<String>,
    },
    /// Display text followed by `suffix`; absent values stay empty.
    Suffix(String),
}

impl FieldFormat {
    /// Shorthand for a date without a fallback.
    pub fn date() -> Self {
        Self::Date { fallback: None }
    }

    /// Shorthand for a date with a fallback literal.
    pub fn date_or(fallback: impl Into<String>) -> Self {
        Self::Date {
            fallback: Some(fallback.into()),
        }
    }

    /// Applies the format to `value`, read from the field named `field`.
    pub fn apply(&self, field: &str, value: &Value) -> Result<String, FieldFormatError> {
        match self {
            Self::Text => Ok(value.display()),
            Self::Money => parse_money(field, value).map(format_money),
            Self::Date { fallback } => Ok(match dates::normalize(value) {
                Some(date) => dates::format_date(date),
                None => fallback.clone().unwrap_or_default(),
            }),
            Self::Suffix(suffix) => {
                let text = value.display();
                if text.is_empty() {
                    Ok(text)
                } else {
                    Ok(text + suffix)
                }
            }
        }
    }
}

/// Largest magnitude whose cent count is still exact in an `f64`.
const MAX_MONEY: f64 = 1e13;

/// Reads a monetary amount. Text may carry a `$` sign, thousands separators
/// and surrounding whitespace; absent or blank cells count as zero. Amounts
/// of ten trillion or more are rejected.
pub fn parse_money(field: &str, value: &Value) -> Result<f64, FieldFormatError> {
    let not_numeric = || FieldFormatError::NotNumeric {
        field: field.to_owned(),
        value: value.display(),
    };

    let amount = match value {
        Value::Absent => return Ok(0.0),
        Value::Number(amount) => *amount,
        Value::Text(text) => {
            let cleaned: String = text
                .trim()
                .chars()
                .filter(|c| !matches!(c, '$' | ',' | ' '))
                .collect();
            if cleaned.is_empty() {
                return Ok(0.0);
            }
            cleaned.parse::<f64>().map_err(|_| not_numeric())?
        }
    };

    if !amount.is_finite() {
        return Err(not_numeric());
    }
    if amount.abs() >= MAX_MONEY {
        return Err(FieldFormatError::OutOfRange {
            field: field.to_owned(),
            value: value.display(),
        });
    }
    Ok(amount)
}

/// Formats an amount as `$1,234.50`, with a leading `-` for negatives.
pub fn format_money(amount: f64) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = group_thousands(cents / 100);
    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${whole}.{:02}", cents % 100)
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Cuts `text` to at most `max_chars` characters.
pub fn truncate(text: &str, max_chars: Option<usize>) -> String {
    match max_chars {
        Some(max) if text.chars().count() > max => text.chars().take(max).collect(),
        _ => text.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_uses_two_decimals_and_separators() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(5.5), "$5.50");
        assert_eq!(format_money(1234567.891), "$1,234,567.89");
        assert_eq!(format_money(-1000.0), "-$1,000.00");
        assert_eq!(format_money(999.999), "$1,000.00");
    }

    #[test]
    fn money_accepts_formatted_text() {
        let value = Value::from(" $1,204.10 ");
        assert_eq!(parse_money("Tax", &value), Ok(1204.10));
        assert_eq!(parse_money("Tax", &Value::Absent), Ok(0.0));
    }

    #[test]
    fn money_rejects_words_and_nan() {
        let err = parse_money("Amount_Due", &Value::from("n/a")).unwrap_err();
        assert_eq!(
            err,
            FieldFormatError::NotNumeric {
                field: "Amount_Due".into(),
                value: "n/a".into()
            }
        );
        assert!(parse_money("Tax", &Value::from("nan")).is_err());
    }

    #[test]
    fn money_rejects_amounts_too_large_to_print() {
        assert_eq!(
            parse_money("Amount_Due", &Value::Number(1e20)),
            Err(FieldFormatError::OutOfRange {
                field: "Amount_Due".into(),
                value: "100000000000000000000".into()
            })
        );
        assert!(FieldFormat::Money
            .apply("Tax", &Value::from("-25,000,000,000,000"))
            .is_err());
        assert_eq!(
            FieldFormat::Money
                .apply("Tax", &Value::Number(9_999_999_999_999.0))
                .unwrap(),
            "$9,999,999,999,999.00"
        );
    }

    #[test]
    fn truncation_keeps_short_values() {
        assert_eq!(truncate("ABCDEFGHIJ", Some(6)), "ABCDEF");
        assert_eq!(truncate("ABC", Some(6)), "ABC");
        assert_eq!(truncate("ABCDEF", Some(6)), "ABCDEF");
        assert_eq!(truncate("ABCDEFGHIJ", None), "ABCDEFGHIJ");
    }

    #[test]
    fn suffix_skips_empty_values() {
        let term = FieldFormat::Suffix("d".into());
        assert_eq!(term.apply("Term", &Value::Number(30.0)).unwrap(), "30d");
        assert_eq!(term.apply("Term", &Value::Absent).unwrap(), "");
    }

    #[test]
    fn date_falls_back_to_literal() {
        let due = FieldFormat::date_or("Due Upon Receipt");
        assert_eq!(due.apply("DueDate", &Value::Absent).unwrap(), "Due Upon Receipt");
        assert_eq!(due.apply("DueDate", &Value::Number(45292.0)).unwrap(), "01/01/2024");
    }
}
