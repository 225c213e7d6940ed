use parse_js::ast::expr::Expr;
use parse_js::ast::func::FuncBody;
use parse_js::ast::stmt::Stmt;
use parse_js::error::SyntaxErrorType;
use parse_js::operator::OperatorName;
use parse_js::options::ParseOptions;
use parse_js::token::TT;
use parse_js::parse_with_options;

fn module(src: &str) -> parse_js::ast::node::Node<parse_js::ast::stx::TopLevel> {
  parse_with_options(src, &ParseOptions::module()).unwrap()
}

#[test]
fn await_allows_operand_after_line_terminator_in_async_function() {
  let parsed = module("async function f(){ await\nfoo(); }");
  let Stmt::FunctionDecl(func_decl) = parsed.stx.body[0].stx.as_ref() else {
    panic!("expected function declaration");
  };
  let FuncBody::Block(body) = &func_decl.stx.function.stx.body else {
    panic!("expected function body");
  };
  assert_eq!(body.len(), 1, "await must not be split by ASI across a newline");
  let Stmt::Expr(stmt) = body[0].stx.as_ref() else {
    panic!("expected expression statement");
  };
  let Expr::Unary(unary) = stmt.stx.expr.stx.as_ref() else {
    panic!("expected await unary expression");
  };
  assert_eq!(unary.stx.operator, OperatorName::Await);
}

#[test]
fn top_level_await_in_modules() {
  let parsed = module("await\nfoo()");
  assert_eq!(parsed.stx.body.len(), 1);
  let Stmt::Expr(stmt) = parsed.stx.body[0].stx.as_ref() else {
    panic!("expected expression statement");
  };
  let Expr::Unary(unary) = stmt.stx.expr.stx.as_ref() else {
    panic!("expected await unary expression");
  };
  assert_eq!(unary.stx.operator, OperatorName::Await);
}

#[test]
fn await_requires_operand() {
  let err = parse_with_options("async function f(){ await; }", &ParseOptions::module()).unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::ExpectedSyntax("expression operand"));
  assert_eq!(err.actual_token, Some(TT::Semicolon));
}

#[test]
fn yield_delegated_requires_operand() {
  let err = parse_js::parse("function* g(){ yield*; }").unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::ExpectedSyntax("expression operand"));
  assert_eq!(err.actual_token, Some(TT::Semicolon));
}

#[test]
fn yield_without_operand() {
  let parsed = parse_js::parse("function* g(){ yield\nfoo; }").unwrap();
  let Stmt::FunctionDecl(func_decl) = parsed.stx.body[0].stx.as_ref() else {
    panic!("expected function declaration");
  };
  let FuncBody::Block(body) = &func_decl.stx.function.stx.body else {
    panic!("expected function body");
  };
  assert_eq!(body.len(), 2);
  let Stmt::Expr(stmt) = body[0].stx.as_ref() else {
    panic!("expected expression statement");
  };
  let Expr::Yield(y) = stmt.stx.expr.stx.as_ref() else {
    panic!("expected yield");
  };
  assert!(y.stx.argument.is_none());
}

#[test]
fn yield_delegated_allows_line_terminator_after_asterisk() {
  let parsed = parse_js::parse("function* g(){ yield*\nfoo; }").unwrap();
  let Stmt::FunctionDecl(func_decl) = parsed.stx.body[0].stx.as_ref() else {
    panic!("expected function declaration");
  };
  let FuncBody::Block(body) = &func_decl.stx.function.stx.body else {
    panic!("expected function body");
  };
  assert_eq!(body.len(), 1);
  let Stmt::Expr(stmt) = body[0].stx.as_ref() else {
    panic!("expected expression statement");
  };
  let Expr::Yield(y) = stmt.stx.expr.stx.as_ref() else {
    panic!("expected yield* expression");
  };
  assert!(y.stx.delegate);
  let Some(Expr::Id(id)) = y.stx.argument.as_ref().map(|a| a.stx.as_ref()) else {
    panic!("expected yield* operand to be identifier");
  };
  assert_eq!(id.stx.name, "foo");
}

#[test]
fn await_and_yield_as_identifiers() {
  assert!(parse_js::parse("var await, yield; await + yield").is_ok());
  assert_eq!(
    parse_js::parse("async function f() { var await; }").unwrap_err().typ,
    SyntaxErrorType::AwaitNotAllowed
  );
  assert_eq!(
    parse_js::parse("function* g() { var yield; }").unwrap_err().typ,
    SyntaxErrorType::YieldNotAllowed
  );
  assert_eq!(
    parse_js::parse("'use strict'; var yield;").unwrap_err().typ,
    SyntaxErrorType::StrictModeReservedWord
  );
}

#[test]
fn await_in_async_arrow_parameters() {
  assert!(parse_js::parse("async (await)").is_ok());
  assert_eq!(
    parse_js::parse("async (await) => 1").unwrap_err().typ,
    SyntaxErrorType::AwaitNotAllowed
  );
}
