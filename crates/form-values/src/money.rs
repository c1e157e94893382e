//! Dollar and cent helpers
//!
//! Amounts on tax forms are split across a `<key>_dollars` and a
//! `<key>_cents` field. Rounding always sends 50 cents and above to the next
//! whole dollar, away from zero.

use crate::value::{FieldValue, FieldValues};

/// Insert thousands separators into a digit-only string
///
/// Anything that is not purely ASCII digits is returned unchanged.
///
/// # Examples
/// ```
/// use form_values::commaify;
/// assert_eq!(commaify("1234567"), "1,234,567");
/// assert_eq!(commaify("12.50"), "12.50");
/// ```
pub fn commaify(s: &str) -> String {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return s.to_string();
    }

    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(c);
    }
    result
}

/// Split an amount into whole dollars, rounding 50 cents and above up
///
/// Cents are always discarded after rounding, so the second element is `0`.
///
/// # Examples
/// ```
/// use form_values::to_dollars_cents;
/// assert_eq!(to_dollars_cents(1234.51), (1235, 0));
/// assert_eq!(to_dollars_cents(1234.49), (1234, 0));
/// assert_eq!(to_dollars_cents(-2.50), (-3, 0));
/// ```
pub fn to_dollars_cents(amount: f64) -> (i64, i64) {
    let total_cents = (amount * 100.0).round() as i64;
    let mut dollars = total_cents / 100;
    let cents = (total_cents % 100).abs();
    if cents >= 50 {
        dollars += if total_cents < 0 { -1 } else { 1 };
    }
    (dollars, 0)
}

/// Join dollars and cents back into one amount
pub fn from_dollars_cents(dollars: i64, cents: i64) -> f64 {
    dollars as f64 + cents as f64 * 0.01
}

/// `(d1, c1) - (d2, c2)`, rounded like [`to_dollars_cents`]
pub fn subtract_dollars_cents(d1: i64, c1: i64, d2: i64, c2: i64) -> (i64, i64) {
    to_dollars_cents(from_dollars_cents(d1, c1) - from_dollars_cents(d2, c2))
}

/// Store an amount as a `<key>_dollars` / `<key>_cents` pair
pub fn add_keyed_amount(values: &mut FieldValues, key: &str, amount: f64) {
    let (dollars, cents) = to_dollars_cents(amount);
    values.insert(format!("{key}_dollars"), FieldValue::from(dollars));
    values.insert(format!("{key}_cents"), FieldValue::from(cents));
}

/// Sum the `<key>_dollars` / `<key>_cents` pairs of the given keys
///
/// Keys without both halves present as numbers are skipped.
pub fn sum_fields(values: &FieldValues, keys: &[&str]) -> f64 {
    keys.iter()
        .filter_map(|key| {
            let dollars = values.get(&format!("{key}_dollars"))?.as_f64()?;
            let cents = values.get(&format!("{key}_cents"))?.as_f64()?;
            Some(dollars + cents * 0.01)
        })
        .sum()
}
