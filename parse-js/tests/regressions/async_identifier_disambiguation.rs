use parse_js::ast::expr::Expr;
use parse_js::ast::stmt::Stmt;
use parse_js::parse;

fn first_expr(src: &str) -> Expr {
  let mut ast = parse(src).unwrap();
  let stmt = ast.stx.body.remove(0);
  match *stmt.stx {
    Stmt::Expr(e) => *e.stx.expr.stx,
    other => panic!("expected expression statement, got {other:?}"),
  }
}

#[test]
fn async_call_is_a_call() {
  assert!(matches!(first_expr("async(a, b)"), Expr::Call(_)));
}

#[test]
fn async_arrow_functions() {
  let Expr::ArrowFunc(arrow) = first_expr("async (a, b) => a") else {
    panic!("expected arrow");
  };
  assert!(arrow.stx.func.stx.async_);
  assert_eq!(arrow.stx.func.stx.parameters.len(), 2);
  let Expr::ArrowFunc(arrow) = first_expr("async a => a") else {
    panic!("expected arrow");
  };
  assert!(arrow.stx.func.stx.async_);
}

#[test]
fn async_as_identifier() {
  assert!(matches!(first_expr("async"), Expr::Id(_)));
  // A line terminator after `async` means it's an identifier, so this is two statements.
  let ast = parse("async\nfunction f() {}").unwrap();
  assert_eq!(ast.stx.body.len(), 2);
}

#[test]
fn async_arrow_line_terminator() {
  assert!(parse("async x\n=> x").is_err());
  assert!(parse("(x)\n=> x").is_err());
}
