use parse_js::ast::expr::pat::Pat;
use parse_js::ast::expr::Expr;
use parse_js::ast::stmt::Stmt;
use parse_js::error::SyntaxErrorType;
use parse_js::parse;

#[test]
fn assignment_patterns() {
  let ast = parse("[a, { b, c: [d] = e }, ...f] = g").unwrap();
  let Stmt::Expr(stmt) = ast.stx.body[0].stx.as_ref() else {
    panic!("expected expression statement");
  };
  let Expr::Binary(assign) = stmt.stx.expr.stx.as_ref() else {
    panic!("expected assignment");
  };
  let Expr::ArrPat(arr) = assign.stx.left.stx.as_ref() else {
    panic!("expected array pattern, got {:?}", assign.stx.left);
  };
  assert_eq!(arr.stx.elements.len(), 2);
  assert!(arr.stx.rest.is_some());
}

#[test]
fn member_targets_in_assignment_patterns() {
  let ast = parse("[a.b, c[d]] = e").unwrap();
  let Stmt::Expr(stmt) = ast.stx.body[0].stx.as_ref() else {
    panic!("expected expression statement");
  };
  let Expr::Binary(assign) = stmt.stx.expr.stx.as_ref() else {
    panic!("expected assignment");
  };
  let Expr::ArrPat(arr) = assign.stx.left.stx.as_ref() else {
    panic!("expected array pattern");
  };
  let first = arr.stx.elements[0].as_ref().unwrap();
  assert!(matches!(first.target.stx.as_ref(), Pat::AssignTarget(_)));
}

#[test]
fn invalid_targets() {
  assert_eq!(parse("1 = a").unwrap_err().typ, SyntaxErrorType::InvalidAssigmentTarget);
  assert_eq!(parse("a + b = c").unwrap_err().typ, SyntaxErrorType::InvalidAssigmentTarget);
  assert_eq!(parse("[...a, b] = c").unwrap_err().typ, SyntaxErrorType::RestElementNotLast);
  assert!(parse("[...a,] = c").is_err());
  assert!(parse("({ a: 1 } = b)").is_err());
  // Member expressions are not bindings.
  assert!(parse("let [a.b] = c").is_err());
  assert!(parse("function f([a.b]) {}").is_err());
}

#[test]
fn cover_initialized_name() {
  assert!(parse("({ a = 1 } = b)").is_ok());
  assert_eq!(
    parse("({ a = 1 })").unwrap_err().typ,
    SyntaxErrorType::InvalidCoverInitializedName
  );
  assert_eq!(
    parse("f({ a = 1 })").unwrap_err().typ,
    SyntaxErrorType::InvalidCoverInitializedName
  );
  assert!(parse("({ a = 1 }) => a").is_ok());
}

#[test]
fn parenthesized_patterns() {
  assert!(parse("(a) = 1").is_ok());
  assert!(parse("(a.b) = 1").is_ok());
  assert!(parse("([a]) = 1").is_err());
  assert!(parse("[(a)] = 1").is_ok());
}

#[test]
fn strict_pattern_names() {
  assert_eq!(
    parse("'use strict'; [eval] = a").unwrap_err().typ,
    SyntaxErrorType::StrictModeEvalOrArguments
  );
  assert_eq!(
    parse("'use strict'; arguments = a").unwrap_err().typ,
    SyntaxErrorType::StrictModeEvalOrArguments
  );
}

#[test]
fn duplicate_parameters() {
  assert!(parse("function f(a, a) {}").is_ok());
  assert_eq!(
    parse("function f(a, a) { 'use strict' }").unwrap_err().typ,
    SyntaxErrorType::DuplicateParameter
  );
  assert_eq!(parse("(a, a) => 1").unwrap_err().typ, SyntaxErrorType::DuplicateParameter);
  assert_eq!(
    parse("function f(a, [a]) {}").unwrap_err().typ,
    SyntaxErrorType::DuplicateParameter
  );
}
