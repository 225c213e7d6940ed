use parse_js::error::SyntaxErrorType;
use parse_js::parse;

#[test]
fn unary_operand_of_exponentiation_needs_parens() {
  for src in ["-a ** b", "typeof a ** b", "!a ** 2", "delete a.b ** 2"] {
    assert!(matches!(
      parse(src).unwrap_err().typ,
      SyntaxErrorType::ExpectedSyntax(_)
    ), "{src}");
  }
  for src in ["(-a) ** b", "-(a ** b)", "a ** -b", "++a ** 2", "a++ ** 2", "await ** 2"] {
    assert!(parse(src).is_ok(), "{src}");
  }
}

#[test]
fn nullish_coalescing_mixing() {
  for src in ["a ?? b || c", "a || b ?? c", "a && b ?? c", "a ?? b && c"] {
    assert!(parse(src).is_err(), "{src}");
  }
  for src in ["(a ?? b) || c", "a ?? (b || c)", "a ?? b ?? c"] {
    assert!(parse(src).is_ok(), "{src}");
  }
}
