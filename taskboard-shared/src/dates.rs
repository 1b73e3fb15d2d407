/// Calendar-date parsing for date-only fields
///
/// Task due dates and the `due_from`/`due_to` list filters are date-only
/// values in `YYYY-MM-DD` form with no time component. Parsing distinguishes
/// two failure modes so the API can report them precisely:
///
/// - the string does not match the `YYYY-MM-DD` shape at all
/// - the string is well-formed but names a date that does not exist on the
///   calendar (2023-02-30, 2023-13-01)
///
/// # Example
///
/// ```
/// use taskboard_shared::dates::parse_date_only;
///
/// let date = parse_date_only("2024-02-29", "due_date").unwrap();
/// assert_eq!(date.to_string(), "2024-02-29");
///
/// assert!(parse_date_only("2024-02-30", "due_date").is_err());
/// assert!(parse_date_only("02/29/2024", "due_date").is_err());
/// ```
use chrono::NaiveDate;

/// Error type for calendar-date parsing
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateError {
    /// Input does not match the `YYYY-MM-DD` shape
    #[error("{field} must be YYYY-MM-DD format")]
    Format { field: String },

    /// Input is shaped correctly but is not a real calendar date
    #[error("{field} is not a valid calendar date")]
    Invalid { field: String },
}

impl DateError {
    /// Field name the error refers to (e.g. "due_date", "due_from")
    pub fn field(&self) -> &str {
        match self {
            DateError::Format { field } | DateError::Invalid { field } => field,
        }
    }
}

/// Parses a `YYYY-MM-DD` string into a [`NaiveDate`]
///
/// The shape is checked first (four digits, dash, two digits, dash, two
/// digits); the year/month/day are then validated against real calendar
/// rules, so leap days pass and impossible dates are rejected. Valid inputs
/// round-trip exactly: formatting the returned date with `%Y-%m-%d` yields
/// the original string.
///
/// # Arguments
///
/// * `value` - The candidate date string
/// * `field` - Field name used in error messages
///
/// # Errors
///
/// Returns [`DateError::Format`] for malformed input and
/// [`DateError::Invalid`] for non-existent calendar dates.
pub fn parse_date_only(value: &str, field: &str) -> Result<NaiveDate, DateError> {
    if !matches_date_shape(value) {
        return Err(DateError::Format {
            field: field.to_string(),
        });
    }

    // Shape is verified, so these slices are all-digit ASCII
    let year: i32 = value[0..4].parse().expect("checked digits");
    let month: u32 = value[5..7].parse().expect("checked digits");
    let day: u32 = value[8..10].parse().expect("checked digits");

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| DateError::Invalid {
        field: field.to_string(),
    })
}

fn matches_date_shape(value: &str) -> bool {
    let bytes = value.as_bytes();

    bytes.len() == 10
        && bytes[4] == b'-'
        && bytes[7] == b'-'
        && bytes
            .iter()
            .enumerate()
            .all(|(i, b)| i == 4 || i == 7 || b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_dates() {
        let cases = vec!["2024-01-01", "2024-12-31", "2000-02-29", "1999-06-15"];

        for case in cases {
            let date = parse_date_only(case, "due_date").expect("should parse");
            assert_eq!(date.format("%Y-%m-%d").to_string(), case);
        }
    }

    #[test]
    fn test_parse_leap_day() {
        // 2024 is a leap year, 2023 is not
        assert!(parse_date_only("2024-02-29", "due_date").is_ok());
        assert_eq!(
            parse_date_only("2023-02-29", "due_date"),
            Err(DateError::Invalid {
                field: "due_date".to_string()
            })
        );
    }

    #[test]
    fn test_parse_impossible_dates() {
        let cases = vec!["2023-02-30", "2023-13-01", "2023-00-10", "2023-04-31", "2023-01-00"];

        for case in cases {
            let result = parse_date_only(case, "due_from");
            assert_eq!(
                result,
                Err(DateError::Invalid {
                    field: "due_from".to_string()
                }),
                "expected {} to be an invalid calendar date",
                case
            );
        }
    }

    #[test]
    fn test_parse_malformed_input() {
        let cases = vec![
            "2023-1-01",
            "23-01-01",
            "20230101",
            "2023/01/01",
            "2023-01-01T00:00:00Z",
            "not-a-date",
            "",
            "２０２３-01-01",
        ];

        for case in cases {
            let result = parse_date_only(case, "due_to");
            assert_eq!(
                result,
                Err(DateError::Format {
                    field: "due_to".to_string()
                }),
                "expected {:?} to be a format error",
                case
            );
        }
    }

    #[test]
    fn test_error_messages_name_the_field() {
        let err = parse_date_only("junk", "due_from").unwrap_err();
        assert_eq!(err.to_string(), "due_from must be YYYY-MM-DD format");
        assert_eq!(err.field(), "due_from");

        let err = parse_date_only("2023-02-30", "due_date").unwrap_err();
        assert_eq!(err.to_string(), "due_date is not a valid calendar date");
    }
}
