use derive_visitor::Drive;
use derive_visitor::Visitor;
use parse_js::ast::class_or_object::ClassOrObjMemberDirectKey;
use parse_js::ast::expr::MemberExpr;
use parse_js::ast::node::Node;
use parse_js::ast::stx::TopLevel;
use parse_js::options::ParseOptions;
use parse_js::parse;
use parse_js::parse_with_options;
use std::thread;
use symbol_js::mangle_properties;
use symbol_js::NameCache;
use symbol_js::PropertyManglePolicy;
use symbol_js::SharedNameCache;

type ClassOrObjMemberDirectKeyNode = Node<ClassOrObjMemberDirectKey>;
type MemberExprNode = Node<MemberExpr>;

#[derive(Default, Visitor)]
#[visitor(ClassOrObjMemberDirectKeyNode(enter), MemberExprNode(enter))]
struct PropertyNames {
  keys: Vec<String>,
  members: Vec<String>,
}

impl PropertyNames {
  fn enter_class_or_obj_member_direct_key_node(&mut self, node: &ClassOrObjMemberDirectKeyNode) {
    self.keys.push(node.stx.key.clone());
  }

  fn enter_member_expr_node(&mut self, node: &MemberExprNode) {
    self.members.push(node.stx.right.clone());
  }
}

fn property_names(top: &Node<TopLevel>) -> PropertyNames {
  let mut visitor = PropertyNames::default();
  top.drive(&mut visitor);
  visitor
}

#[test]
fn reserved_names_are_untouched() {
  let mut top = parse("({foo:1, bar:2}).bar").unwrap();
  let policy = PropertyManglePolicy {
    reserved: ["foo".to_string()].into_iter().collect(),
    ..Default::default()
  };
  let result = mangle_properties(&mut top, &policy, &SharedNameCache::default());
  let new_bar = &result.renamed["bar"];
  assert_ne!(new_bar, "bar");
  assert!(!result.renamed.contains_key("foo"));
  assert!(result.kept.contains("foo"));

  let names = property_names(&top);
  assert_eq!(names.keys, vec!["foo".to_string(), new_bar.clone()]);
  assert_eq!(names.members, vec![new_bar.clone()]);
}

#[test]
fn strings_in_property_positions_follow_their_names() {
  let src = r#"
    const o = { spacing: 1 };
    o["spacing"] = Object.defineProperty(o, "gutter", {}).gutter;
    if ("spacing" in o) o.gutter;
    const unrelated = "spacing";
  "#;
  let mut top = parse(src).unwrap();
  let result = mangle_properties(&mut top, &PropertyManglePolicy::default(), &SharedNameCache::default());
  let spacing = result.renamed["spacing"].clone();
  let gutter = result.renamed["gutter"].clone();
  let names = property_names(&top);
  assert_eq!(names.keys, vec![spacing.clone()]);
  assert!(names.members.contains(&gutter));
  assert!(!names.members.contains(&"gutter".to_string()));

  let json = serde_json::to_string(&top).unwrap();
  assert!(json.contains(r#""value":"spacing""#), "unrelated strings are kept");
  assert_eq!(json.matches(&format!(r#""raw":"\"{}\"""#, spacing)).count(), 2);
  assert_eq!(json.matches(&format!(r#""raw":"\"{}\"""#, gutter)).count(), 1);
}

#[test]
fn units_sharing_a_cache_agree() {
  let cache = SharedNameCache::new(NameCache::default());
  let sources = [
    "export const api = { fetchUser() {}, userCache: new Map() };",
    "api.fetchUser(); api.userCache.clear();",
    "const { userCache, fetchUser } = api; userCache.extra = fetchUser;",
  ];
  let handles: Vec<_> = sources
    .iter()
    .map(|src| {
      let cache = cache.clone();
      let src = src.to_string();
      thread::spawn(move || {
        let mut top = parse_with_options(&src, &ParseOptions::module()).unwrap();
        mangle_properties(&mut top, &PropertyManglePolicy::default(), &cache).renamed
      })
    })
    .collect();
  let results: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
  let snapshot = cache.snapshot();
  for renamed in results.iter() {
    for (name, new_name) in renamed.iter() {
      assert_eq!(snapshot.get(name), Some(new_name.as_str()));
    }
  }
  assert_eq!(results[1]["fetchUser"], results[2]["fetchUser"]);
  assert_eq!(results[0]["userCache"], results[2]["userCache"]);
  assert!(!results[1].contains_key("clear"));
  let outputs = snapshot.outputs();
  assert_eq!(outputs.len(), snapshot.props.len(), "two names share one output");
}
