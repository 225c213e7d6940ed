use crate::parse;
use crate::util::test::assert_serialized;
use serde_json::json;

#[test]
fn var_decl() {
  let top = parse("let a = 1, b;").unwrap();
  assert_serialized(
    &top.stx.body[0],
    json!({
      "$t": "VarDecl",
      "export": false,
      "mode": "Let",
      "declarators": [
        {
          "pattern": {"pat": {"$t": "Id", "name": "a"}},
          "initializer": {"$t": "LitNum", "value": 1.0, "raw": "1"},
        },
        {
          "pattern": {"pat": {"$t": "Id", "name": "b"}},
          "initializer": null,
        },
      ],
    }),
  );
}

#[test]
fn if_else() {
  let top = parse("if (a) b; else {}").unwrap();
  assert_serialized(
    &top.stx.body[0],
    json!({
      "$t": "If",
      "test": {"$t": "Id", "name": "a"},
      "consequent": {"$t": "Expr", "expr": {"$t": "Id", "name": "b"}},
      "alternate": {"$t": "Block", "body": []},
    }),
  );
}

#[test]
fn labelled_break() {
  let top = parse("l: for (;;) break l;").unwrap();
  assert_serialized(
    &top.stx.body[0],
    json!({
      "$t": "Label",
      "name": "l",
      "statement": {
        "$t": "ForTriple",
        "init": "None",
        "cond": null,
        "post": null,
        "body": {"$t": "Break", "label": "l"},
      },
    }),
  );
}
