use core::hash::Hash;
use core::hash::Hasher;
use num_bigint::BigUint;
use serde::Serialize;
use serde::Serializer;
use std::cmp::Ordering;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

// This provides Eq for f64.
#[derive(Copy, Clone, Debug)]
pub struct JsNumber(pub f64);

impl Display for JsNumber {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl PartialEq for JsNumber {
  fn eq(&self, other: &Self) -> bool {
    if self.0.is_nan() {
      return other.0.is_nan();
    };
    self.0.eq(&other.0)
  }
}

impl Eq for JsNumber {}

impl Ord for JsNumber {
  fn cmp(&self, other: &Self) -> Ordering {
    // Only NaNs cannot be compared, and we treat them as equal.
    self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
  }
}

impl PartialOrd for JsNumber {
  fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
    Some(self.cmp(other))
  }
}

impl Hash for JsNumber {
  fn hash<H: Hasher>(&self, state: &mut H) {
    if !self.0.is_nan() {
      self.0.to_bits().hash(state);
    };
  }
}

impl Serialize for JsNumber {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_f64(self.0)
  }
}

/// The syntactic family of a numeric literal, derived from its raw text.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum NumberLiteralForm {
  Binary,
  Decimal,
  Hex,
  // e.g. `017`.
  LegacyOctal,
  // e.g. `089`, a decimal with a leading zero.
  LegacyNonOctalDecimal,
  Octal,
}

impl NumberLiteralForm {
  pub fn of(raw: &str) -> NumberLiteralForm {
    let b = raw.as_bytes();
    if b.len() >= 2 && b[0] == b'0' {
      match b[1] {
        b'b' | b'B' => return NumberLiteralForm::Binary,
        b'x' | b'X' => return NumberLiteralForm::Hex,
        b'o' | b'O' => return NumberLiteralForm::Octal,
        b'0'..=b'9' => {
          return if b.iter().all(|c| (b'0'..=b'7').contains(c)) {
            NumberLiteralForm::LegacyOctal
          } else {
            NumberLiteralForm::LegacyNonOctalDecimal
          };
        }
        _ => {}
      };
    };
    NumberLiteralForm::Decimal
  }

  /// Whether this form is disallowed in strict mode code.
  pub fn is_legacy(self) -> bool {
    matches!(
      self,
      NumberLiteralForm::LegacyOctal | NumberLiteralForm::LegacyNonOctalDecimal
    )
  }
}

fn parse_radix_digits(digits: &str, radix: u32) -> Option<f64> {
  let mut value = 0f64;
  for c in digits.chars() {
    value = value * radix as f64 + c.to_digit(radix)? as f64;
  }
  Some(value)
}

/// Computes the numeric value of a number literal's raw source text.
///
/// Returns None if the text is not a valid number literal; the lexer should have already rejected such text.
pub fn parse_number_literal(raw: &str) -> Option<f64> {
  let clean = raw.replace('_', "");
  match NumberLiteralForm::of(&clean) {
    NumberLiteralForm::Binary => parse_radix_digits(&clean[2..], 2),
    NumberLiteralForm::Hex => parse_radix_digits(&clean[2..], 16),
    NumberLiteralForm::Octal => parse_radix_digits(&clean[2..], 8),
    NumberLiteralForm::LegacyOctal => parse_radix_digits(&clean[1..], 8),
    NumberLiteralForm::LegacyNonOctalDecimal | NumberLiteralForm::Decimal => {
      // Rust's float parser doesn't accept a trailing dot without digits before an exponent (e.g. `1.e5`).
      let normalized = clean.replace(".e", "e").replace(".E", "E");
      let normalized = normalized.strip_suffix('.').unwrap_or(&normalized);
      normalized.parse::<f64>().ok()
    }
  }
}

/// Computes the decimal string value of a bigint literal's raw source text (with the trailing `n`).
pub fn parse_bigint_literal(raw: &str) -> Option<String> {
  let clean = raw.strip_suffix('n')?.replace('_', "");
  let (digits, radix) = match NumberLiteralForm::of(&clean) {
    NumberLiteralForm::Binary => (&clean[2..], 2),
    NumberLiteralForm::Hex => (&clean[2..], 16),
    NumberLiteralForm::Octal => (&clean[2..], 8),
    NumberLiteralForm::Decimal => (&clean[..], 10),
    NumberLiteralForm::LegacyOctal | NumberLiteralForm::LegacyNonOctalDecimal => return None,
  };
  BigUint::parse_bytes(digits.as_bytes(), radix).map(|v| v.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_all_number_forms() {
    assert_eq!(parse_number_literal("0b101"), Some(5.0));
    assert_eq!(parse_number_literal("1_000"), Some(1000.0));
    assert_eq!(parse_number_literal("0xF_F"), Some(255.0));
    assert_eq!(parse_number_literal("0o17"), Some(15.0));
    assert_eq!(parse_number_literal("017"), Some(15.0));
    assert_eq!(parse_number_literal("089"), Some(89.0));
    assert_eq!(parse_number_literal(".5"), Some(0.5));
    assert_eq!(parse_number_literal("1."), Some(1.0));
    assert_eq!(parse_number_literal("1.e3"), Some(1000.0));
    assert_eq!(parse_number_literal("2e-2"), Some(0.02));
  }

  #[test]
  fn parses_bigints() {
    assert_eq!(parse_bigint_literal("10n").as_deref(), Some("10"));
    assert_eq!(parse_bigint_literal("0xffn").as_deref(), Some("255"));
    assert_eq!(
      parse_bigint_literal("18446744073709551616n").as_deref(),
      Some("18446744073709551616")
    );
    assert_eq!(parse_bigint_literal("010n"), None);
  }

  #[test]
  fn classifies_legacy_forms() {
    assert_eq!(NumberLiteralForm::of("017"), NumberLiteralForm::LegacyOctal);
    assert_eq!(NumberLiteralForm::of("019"), NumberLiteralForm::LegacyNonOctalDecimal);
    assert_eq!(NumberLiteralForm::of("0"), NumberLiteralForm::Decimal);
    assert_eq!(NumberLiteralForm::of("0.5"), NumberLiteralForm::Decimal);
    assert!(NumberLiteralForm::of("00").is_legacy());
  }
}
