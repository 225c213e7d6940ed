use parse_js::ast::expr::Expr;
use parse_js::ast::stmt::Stmt;
use parse_js::error::SyntaxErrorType;
use parse_js::num::JsNumber;
use parse_js::parse;

fn parse_number_value(src: &str) -> JsNumber {
  let parsed = parse(src).unwrap();
  let stmt = parsed.stx.body.first().expect("expected a statement");
  match stmt.stx.as_ref() {
    Stmt::Expr(expr_stmt) => match expr_stmt.stx.expr.stx.as_ref() {
      Expr::LitNum(num) => num.stx.value,
      other => panic!("expected numeric literal, got {:?}", other),
    },
    other => panic!("expected expression statement, got {:?}", other),
  }
}

#[test]
fn parses_max_finite_literal() {
  let value = parse_number_value("1.7976931348623157e308");
  assert_eq!(value.0, f64::MAX);
}

#[test]
fn overflows_to_infinity() {
  let value = parse_number_value("1e400");
  assert!(value.0.is_infinite() && value.0.is_sign_positive());
}

#[test]
fn parses_min_subnormal() {
  let value = parse_number_value("5e-324");
  assert_eq!(value.0.to_bits(), f64::from_bits(1).to_bits());
}

#[test]
fn parses_radix_literals() {
  assert_eq!(parse_number_value("0x1F").0, 31.0);
  assert_eq!(parse_number_value("0o17").0, 15.0);
  assert_eq!(parse_number_value("0b101").0, 5.0);
  assert_eq!(parse_number_value("1_000").0, 1000.0);
}

#[test]
fn parses_legacy_octal_literal() {
  assert_eq!(parse_number_value("0777").0, 0o777 as f64);
  // Not octal as it contains an 8.
  assert_eq!(parse_number_value("0778").0, 778.0);
}

#[test]
fn legacy_octal_is_rejected_in_strict_code() {
  let err = parse("'use strict'; 0777").unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::StrictModeLegacyOctal);
  let err = parse("function f() { 'use strict'; return 07 }").unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::StrictModeLegacyOctal);
}
