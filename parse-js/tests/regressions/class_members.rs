use parse_js::ast::class_or_object::ClassOrObjKey;
use parse_js::ast::class_or_object::ClassOrObjVal;
use parse_js::ast::stmt::Stmt;
use parse_js::error::SyntaxErrorType;
use parse_js::parse;

#[test]
fn member_kinds() {
  let ast = parse(
    "class A extends B {
      #x = 1;
      static y;
      get [k]() {}
      set z(v) {}
      static { init(); }
      async *gen() {}
      get() {}
    }",
  )
  .unwrap();
  let Stmt::ClassDecl(class) = ast.stx.body[0].stx.as_ref() else {
    panic!("expected class");
  };
  assert!(class.stx.extends.is_some());
  let members = &class.stx.members;
  assert_eq!(members.len(), 7);
  let ClassOrObjKey::Direct(key) = &members[0].stx.key else {
    panic!("expected direct key");
  };
  assert!(key.stx.is_private());
  assert_eq!(key.stx.key, "#x");
  assert!(members[1].stx.static_);
  assert!(matches!(members[1].stx.val, ClassOrObjVal::Prop(None)));
  assert!(matches!(members[2].stx.key, ClassOrObjKey::Computed(_)));
  assert!(matches!(members[2].stx.val, ClassOrObjVal::Getter(_)));
  assert!(matches!(members[3].stx.val, ClassOrObjVal::Setter(_)));
  assert!(matches!(members[4].stx.val, ClassOrObjVal::StaticBlock(_)));
  assert!(matches!(members[5].stx.val, ClassOrObjVal::Method(_)));
  // `get` followed by `(` is a method named `get`.
  assert!(matches!(members[6].stx.val, ClassOrObjVal::Method(_)));
}

#[test]
fn class_bodies_are_strict() {
  assert_eq!(
    parse("class A { m() { with (a) {} } }").unwrap_err().typ,
    SyntaxErrorType::StrictModeWith
  );
}

#[test]
fn super_usage() {
  assert!(parse("class A extends B { constructor() { super(); super.x; } }").is_ok());
  assert!(parse("({ m() { return super.x } })").is_ok());
  assert_eq!(
    parse("function f() { super.x }").unwrap_err().typ,
    SyntaxErrorType::SuperOutsideMethod
  );
  assert_eq!(
    parse("class A { constructor() { super() } }").unwrap_err().typ,
    SyntaxErrorType::SuperOutsideMethod
  );
}

#[test]
fn private_names_must_be_members() {
  assert!(parse("class A { #x; m(o) { return #x in o && this.#x } }").is_ok());
  assert!(parse("class A { #x; m() { #x } }").is_err());
}
