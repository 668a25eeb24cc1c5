// Licensed under the Apache-2.0 license

//! Name comparison and small formatting helpers.
//!
//! Pin and signal names mix text and numbers (`PTA2`, `PTA13`, `ADC0_SE5b`).
//! Plain string ordering puts `PTA13` before `PTA2`, so names are compared
//! piecewise with embedded numbers treated numerically.

use std::cmp::Ordering;

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NAME_PART: Regex = Regex::new(r"^([^\d]*)(\d*)(.*)$").unwrap();
}

/// Compares two names, treating each embedded run of digits as a number.
///
/// # Examples
/// ```
/// use std::cmp::Ordering;
/// use pinmap_generator::util::compare_names;
/// assert_eq!(compare_names("PTA2", "PTA13"), Ordering::Less);
/// assert_eq!(compare_names("PTB0", "PTA13"), Ordering::Greater);
/// ```
pub fn compare_names(a: &str, b: &str) -> Ordering {
    if a.is_empty() && b.is_empty() {
        return Ordering::Equal;
    }
    if a.is_empty() {
        return Ordering::Less;
    }
    if b.is_empty() {
        return Ordering::Greater;
    }
    let (ca, cb) = match (NAME_PART.captures(a), NAME_PART.captures(b)) {
        (Some(ca), Some(cb)) => (ca, cb),
        _ => return a.cmp(b),
    };
    let r = ca[1].cmp(&cb[1]);
    if r != Ordering::Equal {
        return r;
    }
    // A missing number sorts before any number
    let r = parse_number(&ca[2]).cmp(&parse_number(&cb[2]));
    if r != Ordering::Equal {
        return r;
    }
    compare_names(&ca[3], &cb[3])
}

fn parse_number(digits: &str) -> i64 {
    digits.parse().unwrap_or(-1)
}

/// Formats a C `uint8_t`/`uint16_t`/`uint32_t` type name for a bit size.
pub fn c_int_type(size: u32) -> &'static str {
    match size {
        8 => "uint8_t",
        16 => "uint16_t",
        _ => "uint32_t",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compare_names_numeric() {
        assert_eq!(compare_names("PTA2", "PTA13"), Ordering::Less);
        assert_eq!(compare_names("PTA13", "PTA2"), Ordering::Greater);
        assert_eq!(compare_names("PTA13", "PTA13"), Ordering::Equal);
        assert_eq!(compare_names("PTA13", "PTB2"), Ordering::Less);
    }

    #[test]
    fn test_compare_names_mixed_tail() {
        // Tail after the number is compared recursively
        assert_eq!(compare_names("ADC0_SE5a", "ADC0_SE5b"), Ordering::Less);
        assert_eq!(compare_names("ADC0_SE5b", "ADC0_SE15"), Ordering::Less);
        assert_eq!(compare_names("GPIOA_1", "GPIOA_10"), Ordering::Less);
    }

    #[test]
    fn test_compare_names_empty() {
        assert_eq!(compare_names("", ""), Ordering::Equal);
        assert_eq!(compare_names("", "PTA0"), Ordering::Less);
        assert_eq!(compare_names("PTA0", ""), Ordering::Greater);
        // Bare text sorts before the same text with a number
        assert_eq!(compare_names("PIT", "PIT0"), Ordering::Less);
    }

    #[test]
    fn test_c_int_type() {
        assert_eq!(c_int_type(8), "uint8_t");
        assert_eq!(c_int_type(16), "uint16_t");
        assert_eq!(c_int_type(32), "uint32_t");
    }
}
