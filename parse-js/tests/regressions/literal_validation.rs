use parse_js::error::SyntaxErrorType;
use parse_js::parse;

#[test]
fn string_literals() {
  assert_eq!(parse("'abc").unwrap_err().typ, SyntaxErrorType::UnterminatedString);
  assert_eq!(parse("'a\nb'").unwrap_err().typ, SyntaxErrorType::LineTerminatorInString);
  assert!(parse("'a\\\nb'").is_ok());
  assert!(parse("'\\u{110000}'").is_err());
  assert!(parse("'\\xZ1'").is_err());
}

#[test]
fn legacy_octal_escapes() {
  assert!(parse("'\\07'").is_ok());
  assert_eq!(
    parse("'use strict'; '\\07'").unwrap_err().typ,
    SyntaxErrorType::StrictModeLegacyOctal
  );
  assert_eq!(
    parse("function f() { '\\07'; 'use strict' }").unwrap_err().typ,
    SyntaxErrorType::StrictModeLegacyOctal
  );
}

#[test]
fn template_escapes() {
  // Tagged templates may have invalid escapes, which cook to undefined.
  assert!(parse("tag`\\unicode`").is_ok());
  assert!(parse("`\\unicode`").is_err());
  assert!(parse("`a${b}c${d}`").is_ok());
  assert_eq!(parse("`abc").unwrap_err().typ, SyntaxErrorType::UnterminatedTemplate);
}

#[test]
fn regex_literals() {
  assert!(parse("/a[/]b/gimsuy").is_ok());
  assert_eq!(parse("/a/gg").unwrap_err().typ, SyntaxErrorType::InvalidRegexFlags);
  assert_eq!(parse("/a\n/").unwrap_err().typ, SyntaxErrorType::LineTerminatorInRegex);
}

#[test]
fn bigint_literals() {
  assert!(parse("0x1fn + 10n").is_ok());
  assert!(parse("01n").is_err());
  assert!(parse("1.5n").is_err());
}
