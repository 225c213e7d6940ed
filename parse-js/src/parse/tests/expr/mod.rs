use crate::ast::expr::Expr;
use crate::ast::node::Node;
use crate::ast::stmt::Stmt;
use crate::parse;
use crate::util::test::assert_serialized;
use serde_json::json;

fn parse_expr(input: &str) -> Node<Expr> {
  let mut top = parse(input).unwrap();
  let stmt = top.stx.body.remove(0);
  match *stmt.stx {
    Stmt::Expr(e) => e.stx.expr,
    other => panic!("expected expression statement, got {:?}", other),
  }
}

fn id(name: &str) -> serde_json::Value {
  json!({"$t": "Id", "name": name})
}

#[test]
fn binary_precedence() {
  assert_serialized(
    &parse_expr("a + b * c"),
    json!({
      "$t": "Binary",
      "operator": "Addition",
      "left": id("a"),
      "right": {
        "$t": "Binary",
        "operator": "Multiplication",
        "left": id("b"),
        "right": id("c"),
      },
    }),
  );
}

#[test]
fn right_associative_operators() {
  assert_serialized(
    &parse_expr("a ** b ** c"),
    json!({
      "$t": "Binary",
      "operator": "Exponentiation",
      "left": id("a"),
      "right": {
        "$t": "Binary",
        "operator": "Exponentiation",
        "left": id("b"),
        "right": id("c"),
      },
    }),
  );
}

#[test]
fn member_and_call() {
  assert_serialized(
    &parse_expr("a.b(c)"),
    json!({
      "$t": "Call",
      "optional_chaining": false,
      "callee": {
        "$t": "Member",
        "optional_chaining": false,
        "left": id("a"),
        "right": "b",
      },
      "arguments": [{"spread": false, "value": id("c")}],
    }),
  );
}

#[test]
fn optional_chain_is_wrapped() {
  assert_serialized(
    &parse_expr("a?.[b]"),
    json!({
      "$t": "Chain",
      "expression": {
        "$t": "ComputedMember",
        "optional_chaining": true,
        "object": id("a"),
        "member": id("b"),
      },
    }),
  );
}

#[test]
fn literals() {
  assert_serialized(
    &parse_expr("'a\\x62'"),
    json!({"$t": "LitStr", "value": "ab", "raw": "'a\\x62'"}),
  );
  assert_serialized(
    &parse_expr("0x10"),
    json!({"$t": "LitNum", "value": 16.0, "raw": "0x10"}),
  );
}

#[test]
fn conditional_and_unary() {
  assert_serialized(
    &parse_expr("!a ? b : c"),
    json!({
      "$t": "Cond",
      "test": {"$t": "Unary", "operator": "LogicalNot", "argument": id("a")},
      "consequent": id("b"),
      "alternate": id("c"),
    }),
  );
}
