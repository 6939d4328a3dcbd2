//! Numeric precision reduction for attribute values.
//!
//! Every run of `digits '.' digits` whose fractional part is longer than the
//! configured precision is replaced by the same number in fixed-point form
//! with exactly that many fractional digits. The run is parsed as an `f64`
//! and the exact value of that double is rounded, half away from zero, so
//! `2.675` (stored as 2.67499...) becomes `2.67`. Signs, exponents and
//! separators around the run are left where they are, so `-1.23456e-7`
//! becomes `-1.23e-7` and `"0.12345,7.891011"` becomes `"0.12,7.89"`.

use std::borrow::Cow;

use regex::Regex;

/// Rewrites over-precise decimal numbers inside arbitrary attribute text.
#[derive(Debug, Clone)]
pub struct DecimalRounder {
    precision: u8,
    pattern: Regex,
}

impl DecimalRounder {
    pub fn new(precision: u8) -> Self {
        // Leftmost-greedy, like the `[0-9]+\.[0-9]{3,}` rule for precision 2.
        let pattern = Regex::new(&format!(r"[0-9]+\.[0-9]{{{},}}", precision as usize + 1))
            .expect("decimal pattern is valid for every precision");
        Self { precision, pattern }
    }

    pub fn precision(&self) -> u8 {
        self.precision
    }

    /// Round every qualifying number in `value`, borrowing when nothing matches.
    pub fn round_all<'a>(&self, value: &'a str) -> Cow<'a, str> {
        self.pattern
            .replace_all(value, |caps: &regex::Captures<'_>| {
                round_decimal(&caps[0], self.precision)
            })
    }
}

impl Default for DecimalRounder {
    fn default() -> Self {
        Self::new(2)
    }
}

/// Round a plain decimal literal (`digits '.' digits`) to `precision`
/// fractional digits.
///
/// The literal is parsed as a double and its exact binary value is rounded,
/// with exact halves going up. Inputs that are not of that shape are
/// returned unchanged.
pub fn round_decimal(number: &str, precision: u8) -> String {
    let Some((int_part, frac_part)) = number.split_once('.') else {
        return number.to_string();
    };
    if int_part.is_empty()
        || !int_part.bytes().all(|b| b.is_ascii_digit())
        || !frac_part.bytes().all(|b| b.is_ascii_digit())
    {
        return number.to_string();
    }
    let value = match number.parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => return number.to_string(),
    };

    let precision = precision as usize;
    if has_exact_digits(value, precision + 1) {
        // Short enough to print exactly, so a tie is visible in the text.
        round_half_up(&format!("{:.*}", precision + 1, value), precision)
    } else {
        // No tie is possible; formatting rounds to nearest.
        format!("{:.*}", precision, value)
    }
}

/// Whether `value` is exactly representable with `digits` fractional
/// decimal digits.
fn has_exact_digits(value: f64, digits: usize) -> bool {
    let bits = value.to_bits();
    let biased = ((bits >> 52) & 0x7ff) as i64;
    let fraction = bits & ((1 << 52) - 1);
    let (mantissa, exponent) = if biased == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), biased - 1075)
    };
    if mantissa == 0 || exponent >= 0 {
        return true;
    }
    // value * 10^digits = mantissa * 5^digits * 2^(exponent + digits)
    mantissa.trailing_zeros() as i64 + digits as i64 + exponent >= 0
}

/// Drop the last fractional digit of an exactly printed number, rounding up
/// when it is 5 or more.
fn round_half_up(exact: &str, precision: usize) -> String {
    let (int_part, frac_part) = exact.split_once('.').unwrap_or((exact, ""));

    let mut digits: Vec<u8> = int_part.bytes().map(|b| b - b'0').collect();
    digits.extend(frac_part.bytes().take(precision).map(|b| b - b'0'));

    let round_up = frac_part
        .as_bytes()
        .get(precision)
        .is_some_and(|&b| b >= b'5');

    let mut int_len = int_part.len();
    if round_up {
        let mut carry = true;
        for d in digits.iter_mut().rev() {
            if *d == 9 {
                *d = 0;
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, 1);
            int_len += 1;
        }
    }

    let mut out = String::with_capacity(digits.len() + 1);
    for (i, d) in digits.iter().enumerate() {
        if i == int_len {
            out.push('.');
        }
        out.push(char::from(b'0' + d));
    }
    out
}
