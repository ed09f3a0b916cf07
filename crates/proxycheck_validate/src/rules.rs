//! Field-level constraint rules.
//!
//! Each rule is a pure check over a single value. It knows nothing about the
//! message or field it is attached to; [`crate::Fields`] turns a
//! [`Violation`] into a [`crate::ValidationError`] naming the owner.

use std::borrow::Cow;
use std::fmt::Display;
use std::ops::Bound;

use regex::Regex;

use crate::ErrorKind;

pub const VALUE_REQUIRED: &str = "value is required";
pub const EMBEDDED_FAILED: &str = "embedded message failed validation";

/// A failed rule: what kind of check it was and the reason text to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub kind: ErrorKind,
    pub reason: Cow<'static, str>,
}

impl Violation {
    pub fn new(kind: ErrorKind, reason: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            reason: reason.into(),
        }
    }
}

pub fn required(present: bool) -> Result<(), Violation> {
    if present {
        Ok(())
    } else {
        Err(Violation::new(ErrorKind::MissingRequired, VALUE_REQUIRED))
    }
}

/// String must contain at least `min` code points.
pub fn min_len(value: &str, min: usize) -> Result<(), Violation> {
    if value.chars().count() < min {
        return Err(Violation::new(
            ErrorKind::LengthViolation,
            format!("value length must be at least {} runes", min),
        ));
    }
    Ok(())
}

/// String must contain at most `max` code points.
pub fn max_len(value: &str, max: usize) -> Result<(), Violation> {
    if value.chars().count() > max {
        return Err(Violation::new(
            ErrorKind::LengthViolation,
            format!("value length must be at most {} runes", max),
        ));
    }
    Ok(())
}

/// Non-empty strings must match `regex`. Empty strings are not checked.
pub fn pattern(value: &str, regex: &Regex) -> Result<(), Violation> {
    if value.is_empty() || regex.is_match(value) {
        return Ok(());
    }
    Err(Violation::new(
        ErrorKind::PatternMismatch,
        format!("value does not match regex pattern \"{}\"", regex.as_str()),
    ))
}

pub fn min_items(len: usize, min: usize) -> Result<(), Violation> {
    if len < min {
        return Err(Violation::new(
            ErrorKind::ItemCountViolation,
            format!("value must contain at least {} item(s)", min),
        ));
    }
    Ok(())
}

pub fn max_items(len: usize, max: usize) -> Result<(), Violation> {
    if len > max {
        return Err(Violation::new(
            ErrorKind::ItemCountViolation,
            format!("value must contain no more than {} item(s)", max),
        ));
    }
    Ok(())
}

pub fn min_pairs(len: usize, min: usize) -> Result<(), Violation> {
    if len < min {
        return Err(Violation::new(
            ErrorKind::ItemCountViolation,
            format!("value must contain at least {} pair(s)", min),
        ));
    }
    Ok(())
}

pub fn max_pairs(len: usize, max: usize) -> Result<(), Violation> {
    if len > max {
        return Err(Violation::new(
            ErrorKind::ItemCountViolation,
            format!("value must contain no more than {} pair(s)", max),
        ));
    }
    Ok(())
}

/// Inclusive/exclusive numeric bound declared on a field.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericBound<T> {
    lower: Bound<T>,
    upper: Bound<T>,
}

impl<T> NumericBound<T>
where
    T: PartialOrd + Display,
{
    pub const fn new(lower: Bound<T>, upper: Bound<T>) -> Self {
        Self { lower, upper }
    }

    pub fn check(&self, value: &T) -> Result<(), Violation> {
        let above = match &self.lower {
            Bound::Included(min) => value >= min,
            Bound::Excluded(min) => value > min,
            Bound::Unbounded => true,
        };
        let below = match &self.upper {
            Bound::Included(max) => value <= max,
            Bound::Excluded(max) => value < max,
            Bound::Unbounded => true,
        };

        if above && below {
            return Ok(());
        }
        Err(Violation::new(ErrorKind::RangeViolation, self.describe()))
    }

    fn describe(&self) -> String {
        match (&self.lower, &self.upper) {
            (Bound::Included(min), Bound::Unbounded) => {
                format!("value must be greater than or equal to {}", min)
            }
            (Bound::Excluded(min), Bound::Unbounded) => {
                format!("value must be greater than {}", min)
            }
            (Bound::Unbounded, Bound::Included(max)) => {
                format!("value must be less than or equal to {}", max)
            }
            (Bound::Unbounded, Bound::Excluded(max)) => {
                format!("value must be less than {}", max)
            }
            (lower, upper) => {
                let (open, min) = match lower {
                    Bound::Included(min) => ('[', min.to_string()),
                    Bound::Excluded(min) => ('(', min.to_string()),
                    Bound::Unbounded => ('(', "-inf".to_string()),
                };
                let (close, max) = match upper {
                    Bound::Included(max) => (']', max.to_string()),
                    Bound::Excluded(max) => (')', max.to_string()),
                    Bound::Unbounded => (')', "+inf".to_string()),
                };
                format!("value must be inside range {}{}, {}{}", open, min, max, close)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_len_counts_code_points() {
        assert!(min_len("a", 1).is_ok());
        // One code point, four bytes
        assert!(min_len("🦀", 1).is_ok());
        assert!(min_len("é", 2).is_err());

        let violation = min_len("", 1).unwrap_err();
        assert_eq!(violation.kind, ErrorKind::LengthViolation);
        assert_eq!(violation.reason, "value length must be at least 1 runes");
    }

    #[test]
    fn test_max_len_counts_code_points() {
        assert!(max_len("🦀🦀🦀", 3).is_ok());
        let violation = max_len("abcd", 3).unwrap_err();
        assert_eq!(violation.reason, "value length must be at most 3 runes");
    }

    #[test]
    fn test_pattern_skips_empty() {
        let regex = Regex::new("^[a-z]+$").unwrap();
        assert!(pattern("", &regex).is_ok());
        assert!(pattern("abc", &regex).is_ok());

        let violation = pattern("ABC", &regex).unwrap_err();
        assert_eq!(violation.kind, ErrorKind::PatternMismatch);
        assert_eq!(
            violation.reason,
            "value does not match regex pattern \"^[a-z]+$\""
        );
    }

    #[test]
    fn test_pattern_reason_keeps_escapes() {
        let regex = Regex::new(r"^[^\x00\n\r]+$").unwrap();
        let violation = pattern("a\nb", &regex).unwrap_err();
        assert_eq!(
            violation.reason,
            r#"value does not match regex pattern "^[^\x00\n\r]+$""#
        );
    }

    #[test]
    fn test_required() {
        assert!(required(true).is_ok());
        let violation = required(false).unwrap_err();
        assert_eq!(violation.kind, ErrorKind::MissingRequired);
        assert_eq!(violation.reason, VALUE_REQUIRED);
    }

    #[test]
    fn test_item_counts() {
        assert!(min_items(1, 1).is_ok());
        assert_eq!(
            min_items(0, 1).unwrap_err().reason,
            "value must contain at least 1 item(s)"
        );
        assert_eq!(
            max_items(3, 2).unwrap_err().reason,
            "value must contain no more than 2 item(s)"
        );
        assert_eq!(
            min_pairs(0, 1).unwrap_err().reason,
            "value must contain at least 1 pair(s)"
        );
        assert_eq!(
            max_pairs(2, 1).unwrap_err().reason,
            "value must contain no more than 1 pair(s)"
        );
    }

    #[test]
    fn test_numeric_bound_one_sided() {
        let gte = NumericBound::new(Bound::Included(1u32), Bound::Unbounded);
        assert!(gte.check(&1).is_ok());
        assert_eq!(
            gte.check(&0).unwrap_err().reason,
            "value must be greater than or equal to 1"
        );

        let lt = NumericBound::new(Bound::Unbounded, Bound::Excluded(10i64));
        assert!(lt.check(&9).is_ok());
        assert_eq!(lt.check(&10).unwrap_err().reason, "value must be less than 10");
    }

    #[test]
    fn test_numeric_bound_two_sided() {
        let port = NumericBound::new(Bound::Included(1u32), Bound::Included(65535));
        assert!(port.check(&443).is_ok());
        let violation = port.check(&70000).unwrap_err();
        assert_eq!(violation.kind, ErrorKind::RangeViolation);
        assert_eq!(violation.reason, "value must be inside range [1, 65535]");

        let ratio = NumericBound::new(Bound::Excluded(0.0f64), Bound::Included(1.0));
        assert!(ratio.check(&0.5).is_ok());
        assert_eq!(
            ratio.check(&0.0).unwrap_err().reason,
            "value must be inside range (0, 1]"
        );
    }
}
