use parse_js::ast::comment::Annotations;
use parse_js::ast::expr::Expr;
use parse_js::ast::node::Node;
use parse_js::ast::stmt::Stmt;
use parse_js::parse;

fn first_expr(src: &str) -> Node<Expr> {
  let mut ast = parse(src).unwrap();
  let stmt = ast.stx.body.remove(0);
  match *stmt.stx {
    Stmt::Expr(e) => e.stx.expr,
    other => panic!("expected expression statement, got {other:?}"),
  }
}

#[test]
fn pure_call_annotation() {
  let expr = first_expr("/*#__PURE__*/ f(1)");
  let Expr::Call(call) = expr.stx.as_ref() else {
    panic!("expected call");
  };
  assert!(call.assoc.get::<Annotations>().is_some_and(|a| a.pure));

  let expr = first_expr("/* @__PURE__ */ new A()");
  let Expr::New(new) = expr.stx.as_ref() else {
    panic!("expected new");
  };
  assert!(new.assoc.get::<Annotations>().is_some_and(|a| a.pure));
}

#[test]
fn key_annotation_on_strings() {
  let expr = first_expr("/*@__KEY__*/ 'prop'");
  let Expr::LitStr(s) = expr.stx.as_ref() else {
    panic!("expected string");
  };
  assert!(s.assoc.get::<Annotations>().is_some_and(|a| a.key));
}

#[test]
fn plain_comments_are_not_annotations() {
  let expr = first_expr("/* pure */ f()");
  let Expr::Call(call) = expr.stx.as_ref() else {
    panic!("expected call");
  };
  assert!(call.assoc.get::<Annotations>().is_none());
}
