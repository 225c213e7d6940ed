use parse_js::ast::expr::Expr;
use parse_js::ast::stmt::Stmt;
use parse_js::error::SyntaxErrorType;
use parse_js::parse;

#[test]
fn asi_before_postfix_update() {
  let ast = parse("a\n++b").unwrap();
  assert_eq!(ast.stx.body.len(), 2);
  let Stmt::Expr(second) = ast.stx.body[1].stx.as_ref() else {
    panic!("expected expression statement");
  };
  assert!(matches!(second.stx.expr.stx.as_ref(), Expr::Unary(_)));
}

#[test]
fn no_asi_before_open_paren() {
  let ast = parse("a\n(b)").unwrap();
  assert_eq!(ast.stx.body.len(), 1);
}

#[test]
fn restricted_productions() {
  let ast = parse("function f() { return\n1 }").unwrap();
  let Stmt::FunctionDecl(f) = ast.stx.body[0].stx.as_ref() else {
    panic!("expected function");
  };
  let parse_js::ast::func::FuncBody::Block(body) = &f.stx.function.stx.body else {
    panic!("expected block body");
  };
  assert_eq!(body.len(), 2);
  assert_eq!(
    parse("throw\n1").unwrap_err().typ,
    SyntaxErrorType::LineTerminatorAfterThrow
  );
}

#[test]
fn do_while_takes_an_optional_semicolon() {
  let ast = parse("do x(); while (a) y()").unwrap();
  assert_eq!(ast.stx.body.len(), 2);
  assert!(matches!(ast.stx.body[0].stx.as_ref(), Stmt::DoWhile(_)));
  let ast = parse("do ; while (a); y()").unwrap();
  assert_eq!(ast.stx.body.len(), 2);
}

#[test]
fn missing_semicolon_on_same_line() {
  assert!(matches!(
    parse("a b").unwrap_err().typ,
    SyntaxErrorType::ExpectedSyntax(_)
  ));
}

#[test]
fn contextual_keywords_are_identifiers() {
  for src in [
    "var of, get, set, from, as, async, let, static;",
    "of = get + set",
    "let\nx = 1",
  ] {
    assert!(parse(src).is_ok(), "{src}");
  }
}

#[test]
fn reserved_words_are_not_identifiers() {
  assert!(matches!(
    parse("var if;").unwrap_err().typ,
    SyntaxErrorType::ExpectedSyntax(_)
  ));
  // Escaped keywords are still reserved.
  assert_eq!(parse("var \\u0069f;").unwrap_err().typ, SyntaxErrorType::ReservedWord);
  assert_eq!(
    parse("'use strict'; var static;").unwrap_err().typ,
    SyntaxErrorType::StrictModeReservedWord
  );
  assert_eq!(
    parse("'use strict'; var eval;").unwrap_err().typ,
    SyntaxErrorType::StrictModeEvalOrArguments
  );
}
