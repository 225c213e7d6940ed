use crate::lex::lex_next;
use crate::lex::LexMode;
use crate::lex::Lexer;
use crate::token::CommentKind;
use crate::token::TT;
use crate::token::TT::*;

fn check<const N: usize>(code: &str, expecteds: [TT; N]) {
  check_with_mode(code, LexMode::Standard, expecteds);
}

fn check_with_mode<const N: usize>(code: &str, mode: LexMode, expecteds: [TT; N]) {
  let mut lexer = Lexer::new(code);
  for expected in expecteds {
    let t = lex_next(&mut lexer, mode);
    assert_eq!(t.typ, expected, "lexing {:?}", code);
  }
  let t = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(EOF, t.typ, "lexing {:?}", code);
}

#[test]
fn test_lex_keywords() {
  check("class", [KeywordClass]);
  check("instanceof", [KeywordInstanceof]);
  check("let of", [KeywordLet, KeywordOf]);
  check("true null", [LiteralTrue, LiteralNull]);
}

#[test]
fn test_lex_identifiers() {
  check("h929", [Identifier]);
  check("classy", [Identifier]);
  check("$_a1", [Identifier]);
  check("café", [Identifier]);
  check("日本語", [Identifier]);
  check("a\u{0301}", [Identifier]);
  check("a\u{203F}b", [Identifier]);
  check("x\u{200D}", [Identifier]);
  // Escaped keywords are not keywords.
  check("\\u0063lass", [Identifier]);
  check("a\\u{62}c", [Identifier]);
  check("\\u0031a", [Invalid, Identifier]);
}

#[test]
fn test_lex_literal_numbers() {
  check("1", [LiteralNumber]);
  check("929", [LiteralNumber]);
  check(".929", [LiteralNumber]);
  check(". 929", [Dot, LiteralNumber]);
  check(". 929.2.", [Dot, LiteralNumber, Dot]);
  check(".929.2..", [LiteralNumber, LiteralNumber, Dot, Dot]);
  check("?.929", [Question, LiteralNumber]);
  check("?..929", [QuestionDot, LiteralNumber]);
  check("1e10 1E-5 1.5e+3", [LiteralNumber, LiteralNumber, LiteralNumber]);
  check("0x1F 0b101 0o17", [LiteralNumber, LiteralNumber, LiteralNumber]);
  check("017 089", [LiteralNumber, LiteralNumber]);
}

#[test]
fn test_lex_numeric_separators() {
  check("1_000_000", [LiteralNumber]);
  check("0xF_F", [LiteralNumber]);
  check("1_0.0_1e1_0", [LiteralNumber]);
  check("1__0", [Invalid, Identifier]);
  check("1_", [Invalid]);
  check("0_1", [Invalid, Identifier]);
}

#[test]
fn test_lex_bigints() {
  check("10n", [LiteralBigInt]);
  check("0xFFn", [LiteralBigInt]);
  check("1_0n", [LiteralBigInt]);
  check("1.5n", [Invalid, Identifier]);
  check("010n", [Invalid, Identifier]);
}

#[test]
fn test_lex_number_followed_by_identifier() {
  check("3in", [Invalid, KeywordIn]);
  check("1..toString", [LiteralNumber, Dot, Identifier]);
}

#[test]
fn test_lex_strings() {
  check("'hello world'", [LiteralString]);
  check("\"it's\"", [LiteralString]);
  check("'a\\'b'", [LiteralString]);
  check("'line\\\ncontinued'", [LiteralString]);
  check("'sep\u{2028}arator'", [LiteralString]);
  check("'unterminated", [Invalid]);
}

#[test]
fn test_lex_string_with_raw_line_terminator() {
  let mut lexer = Lexer::new("'hello\nworld'");
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, Invalid);
}

#[test]
fn test_lex_templates() {
  check("`plain`", [LiteralTemplatePartStringEnd]);
  check("`a${", [LiteralTemplatePartString]);
  check_with_mode("rest`", LexMode::TemplateStrContinue, [
    LiteralTemplatePartStringEnd,
  ]);
  check("`never ends", [Invalid]);
}

#[test]
fn test_lex_regex_mode() {
  check_with_mode("/a[/]b/gi", LexMode::SlashIsRegex, [LiteralRegex]);
  check_with_mode("/=/", LexMode::SlashIsRegex, [LiteralRegex]);
  check("a / b", [Identifier, Slash, Identifier]);
  check_with_mode("/abc\n", LexMode::SlashIsRegex, [Invalid]);
}

#[test]
fn test_lex_punctuators() {
  check("?.[", [QuestionDotBracketOpen]);
  check("a ?? b ??= c", [
    Identifier,
    QuestionQuestion,
    Identifier,
    QuestionQuestionEquals,
    Identifier,
  ]);
  check(">>>= **=", [ChevronRightChevronRightChevronRightEquals, AsteriskAsteriskEquals]);
  check("#priv", [PrivateMember]);
  check("@", [Invalid]);
}

#[test]
fn test_lex_comments() {
  let mut lexer = Lexer::new("/* a */ // b\nx");
  let t = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(t.typ, Identifier);
  assert!(t.preceded_by_line_terminator);
  assert_eq!(t.comments.len(), 2);
  assert_eq!(t.comments[0].kind, CommentKind::Multiline);
  assert_eq!(&lexer[t.comments[0].loc], "/* a */");
  assert_eq!(&lexer[t.comments[1].loc], "// b");

  check("/* unterminated", [Invalid]);
}

#[test]
fn test_lex_multiline_comment_with_newline() {
  let mut lexer = Lexer::new("a /*\n*/ b");
  lex_next(&mut lexer, LexMode::Standard);
  let t = lex_next(&mut lexer, LexMode::Standard);
  assert!(t.preceded_by_line_terminator);
}

#[test]
fn test_lex_html_comments() {
  check("<!-- hidden\nx", [Identifier]);
  check("x\n--> hidden", [Identifier]);
  check("x --> y", [Identifier, HyphenHyphen, ChevronRight, Identifier]);

  let mut lexer = Lexer::new("a <!-- b");
  lexer.set_html_comments(false);
  let typs: Vec<TT> = (0..5)
    .map(|_| lex_next(&mut lexer, LexMode::Standard).typ)
    .collect();
  assert_eq!(typs, vec![
    Identifier,
    ChevronLeft,
    Exclamation,
    HyphenHyphen,
    Identifier
  ]);
}

#[test]
fn test_skip_hashbang() {
  let mut lexer = Lexer::new("#!/usr/bin/env node\nx");
  let hashbang = lexer.skip_hashbang().unwrap();
  assert_eq!(hashbang.kind, CommentKind::Hashbang);
  assert_eq!(&lexer[hashbang.loc], "#!/usr/bin/env node");
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, Identifier);
}
