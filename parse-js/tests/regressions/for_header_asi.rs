use parse_js::ast::stmt::ForInOfLhs;
use parse_js::ast::stmt::Stmt;
use parse_js::error::SyntaxErrorType;
use parse_js::options::ParseOptions;
use parse_js::parse;
use parse_js::parse_with_options;

#[test]
fn for_header_semicolons_are_not_inserted() {
  assert!(parse("for (a\nb;;) {}").is_err());
  assert!(parse("for (;;\n) {}").is_ok());
  assert!(parse("for (\n;\n;\n) {}").is_ok());
}

#[test]
fn for_in_and_of_heads() {
  let ast = parse("for (const [a, b] of c) {}").unwrap();
  let Stmt::ForOf(for_of) = ast.stx.body[0].stx.as_ref() else {
    panic!("expected for-of");
  };
  assert!(matches!(for_of.stx.lhs, ForInOfLhs::Decl { .. }));
  let ast = parse("for (a.b in c);").unwrap();
  let Stmt::ForIn(for_in) = ast.stx.body[0].stx.as_ref() else {
    panic!("expected for-in");
  };
  assert!(matches!(for_in.stx.lhs, ForInOfLhs::Assign(_)));
}

#[test]
fn for_in_initializer_rules() {
  assert!(matches!(
    parse("for (let a = 1 of b);").unwrap_err().typ,
    SyntaxErrorType::ExpectedSyntax(_)
  ));
  assert!(parse("for (let a, b of c);").is_err());
  assert!(parse("for (var a = (b in c);;);").is_ok());
}

#[test]
fn for_await() {
  assert!(parse("async function f() { for await (const a of b); }").is_ok());
  assert_eq!(
    parse("function f() { for await (const a of b); }").unwrap_err().typ,
    SyntaxErrorType::AwaitNotAllowed
  );
  assert!(parse_with_options("for await (const a of b);", &ParseOptions::module()).is_ok());
}

#[test]
fn let_in_for_heads() {
  assert!(parse("for (let in a);").is_ok());
  assert!(parse("for (let of of a);").is_ok());
  assert!(parse("for (async of a);").is_err());
}
