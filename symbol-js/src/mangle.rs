use crate::assoc::resolved_symbol;
use crate::name::CharFrequency;
use crate::name::NameGenerator;
use crate::scope::Resolution;
use crate::scope::ScopeId;
use crate::scope::ScopeKind;
use crate::scope::SymbolId;
use crate::scope::SymbolKind;
use ahash::HashSet;
use derive_visitor::DriveMut;
use derive_visitor::VisitorMut;
use parse_js::ast::class_or_object::ClassOrObjKey;
use parse_js::ast::class_or_object::ClassOrObjMemberDirectKey;
use parse_js::ast::class_or_object::ClassOrObjVal;
use parse_js::ast::class_or_object::ObjMember;
use parse_js::ast::class_or_object::ObjMemberType;
use parse_js::ast::expr::pat::ClassOrFuncName;
use parse_js::ast::expr::pat::IdPat;
use parse_js::ast::expr::pat::ObjPatProp;
use parse_js::ast::expr::pat::Pat;
use parse_js::ast::expr::Expr;
use parse_js::ast::expr::IdExpr;
use parse_js::ast::import_export::ExportName;
use parse_js::ast::import_export::ModuleExportImportName;
use parse_js::ast::node::Node;
use parse_js::ast::stx::TopLevel;
use parse_js::lex::KEYWORD_STRS;
use parse_js::token::TT;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Options controlling which bindings are renamed. Can be loaded from JSON, where missing fields take their defaults.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct MangleOptions {
  /// Names never generated or renamed.
  pub reserved: BTreeSet<String>,
  /// Keep function names, which are visible through `Function.prototype.name`.
  pub keep_fnames: bool,
  /// Keep class names, which are visible through `Class.name`.
  pub keep_classnames: bool,
  /// Rename bindings in the top-level scope. Off by default, as other scripts may see them.
  pub toplevel: bool,
  /// Generate readable `_$name$_` names instead of minimal ones.
  pub debug: bool,
}

#[derive(Clone, Debug, Default)]
pub struct MangleResult {
  /// Symbols whose name changed, mapped to their new names.
  pub renamed: BTreeMap<SymbolId, String>,
}

impl MangleResult {
  /// Original name to every name it was mangled to. One original can map to many names, as it can be declared in many scopes.
  pub fn name_map(&self, res: &Resolution) -> BTreeMap<String, BTreeSet<String>> {
    let mut map = BTreeMap::<String, BTreeSet<String>>::new();
    for (symbol, name) in self.renamed.iter() {
      map
        .entry(res.symbol(*symbol).name.clone())
        .or_default()
        .insert(name.clone());
    }
    map
  }
}

fn is_mangleable(res: &Resolution, opts: &MangleOptions, id: SymbolId) -> bool {
  let symbol = res.symbol(id);
  if res.scope(symbol.scope).pinned || symbol.keep_name || symbol.name == "arguments" {
    return false;
  };
  if opts.reserved.contains(&symbol.name) {
    return false;
  };
  if !opts.toplevel && symbol.scope == res.root {
    return false;
  };
  match symbol.kind {
    SymbolKind::Function | SymbolKind::FunctionExpressionName => !opts.keep_fnames,
    SymbolKind::Class | SymbolKind::ClassExpressionName => !opts.keep_classnames,
    _ => true,
  }
}

struct NameAssigner<'a> {
  res: &'a mut Resolution,
  opts: &'a MangleOptions,
  generator: NameGenerator,
  mangleable: Vec<bool>,
  // Scopes whose `enclosed` set has the symbol.
  enclosing: Vec<Vec<ScopeId>>,
}

impl<'a> NameAssigner<'a> {
  fn new(res: &'a mut Resolution, opts: &'a MangleOptions, generator: NameGenerator, mangleable: Vec<bool>) -> Self {
    let mut enclosing = vec![Vec::new(); res.symbols.len()];
    for id in res.scopes_pre_order() {
      for symbol in res.scope(id).enclosed.iter() {
        enclosing[symbol.0 as usize].push(id);
      }
    }
    NameAssigner {
      res,
      opts,
      generator,
      mangleable,
      enclosing,
    }
  }

  // Unmangleable symbols have their final name from the start; mangleable ones once they've been named.
  fn is_decided(&self, symbol: SymbolId) -> bool {
    !self.mangleable[symbol.0 as usize] || self.res.symbol(symbol).mangled_name.is_some()
  }

  fn final_name(&self, symbol: SymbolId) -> &str {
    self.res.symbol(symbol).final_name()
  }

  /// Names visible inside `scope` that its own bindings must not shadow.
  fn scope_taken(&self, scope: ScopeId, owned: &[SymbolId]) -> HashSet<String> {
    let data = self.res.scope(scope);
    let mut taken = HashSet::default();
    for symbol in data.symbols.values() {
      if !owned.contains(symbol) {
        taken.insert(self.final_name(*symbol).to_string());
      };
    }
    for symbol in data.enclosed.iter() {
      taken.insert(self.final_name(*symbol).to_string());
    }
    // A function expression's name and its parameters shouldn't collide. Nor should parameters and the bindings of a separate body, as `var a` there starts with the value of parameter `a`.
    if let Some(parent) = data.parent {
      let parent = self.res.scope(parent);
      if data.kind == ScopeKind::FunctionBody
        || (data.kind == ScopeKind::Function && parent.kind == ScopeKind::FunctionExpressionName)
      {
        for symbol in parent.symbols.values() {
          taken.insert(self.final_name(*symbol).to_string());
        }
      };
    };
    taken
  }

  /// Names `symbol` must avoid because of bindings in scopes it's referenced from, where those bindings already have their final name.
  fn symbol_taken(&self, symbol: SymbolId) -> HashSet<String> {
    let mut taken = HashSet::default();
    for scope in self.enclosing[symbol.0 as usize].iter() {
      for other in self.res.scope(*scope).symbols.values() {
        if *other != symbol && self.is_decided(*other) {
          taken.insert(self.final_name(*other).to_string());
        };
      }
    }
    taken
  }

  fn debug_name(&self, original: &str, taken: impl Fn(&str) -> bool) -> String {
    let base = format!("_${}$_", original);
    let mut name = base.clone();
    let mut suffix = 0;
    while taken(&name) {
      suffix += 1;
      name = format!("{}{}", base, suffix);
    }
    name
  }

  fn assign_scope(&mut self, scope: ScopeId) {
    let mut owned: Vec<SymbolId> = self
      .res
      .scope(scope)
      .symbols
      .values()
      .copied()
      .filter(|s| self.res.symbol(*s).scope == scope && self.mangleable[s.0 as usize])
      .collect();
    if owned.is_empty() {
      return;
    };
    owned.sort_unstable_by_key(|s| (std::cmp::Reverse(self.res.symbol(*s).reference_count), *s));
    owned.dedup();
    let mut taken = self.scope_taken(scope, &owned);
    let mut counter = 0;
    for symbol in owned {
      let extra = self.symbol_taken(symbol);
      let is_taken = |name: &str| taken.contains(name) || extra.contains(name) || self.opts.reserved.contains(name);
      let name = if self.opts.debug {
        self.debug_name(&self.res.symbol(symbol).name, is_taken)
      } else {
        self.generator.next_available(&mut counter, is_taken)
      };
      tracing::trace!(from = %self.res.symbol(symbol).name, to = %name, "renamed");
      taken.insert(name.clone());
      self.res.symbol_mut(symbol).mangled_name = Some(name);
    }
  }
}

type ClassOrFuncNameNode = Node<ClassOrFuncName>;
type ExportNameNode = Node<ExportName>;
type IdExprNode = Node<IdExpr>;
type IdPatNode = Node<IdPat>;
type ObjMemberNode = Node<ObjMember>;
type ObjPatPropNode = Node<ObjPatProp>;

#[derive(VisitorMut)]
#[visitor(
  ClassOrFuncNameNode(enter),
  ExportNameNode(enter),
  IdExprNode(enter),
  IdPatNode(enter),
  ObjMemberNode(enter),
  ObjPatPropNode(enter)
)]
struct RenameVisitor<'a> {
  res: &'a Resolution,
}

impl<'a> RenameVisitor<'a> {
  fn new_name(&self, symbol: Option<SymbolId>, current: &str) -> Option<String> {
    let name = self.res.symbol(symbol?).mangled_name.as_ref()?;
    (name != current).then(|| name.clone())
  }

  fn rename(&self, symbol: Option<SymbolId>, name: &mut String) {
    if let Some(new_name) = self.new_name(symbol, name) {
      *name = new_name;
    };
  }

  fn enter_id_expr_node(&mut self, node: &mut IdExprNode) {
    self.rename(self.res.symbol_of(&node.assoc), &mut node.stx.name);
  }

  fn enter_id_pat_node(&mut self, node: &mut IdPatNode) {
    self.rename(self.res.symbol_of(&node.assoc), &mut node.stx.name);
  }

  fn enter_class_or_func_name_node(&mut self, node: &mut ClassOrFuncNameNode) {
    self.rename(self.res.symbol_of(&node.assoc), &mut node.stx.name);
  }

  fn enter_export_name_node(&mut self, node: &mut ExportNameNode) {
    let ModuleExportImportName::Ident(local) = &node.stx.exportable else {
      return;
    };
    if let Some(new_name) = self.new_name(resolved_symbol(&node.assoc), local) {
      node.stx.exportable = ModuleExportImportName::Ident(new_name);
    };
  }

  // `{x}` becomes `{x: a}` so the property name survives.
  fn enter_obj_member_node(&mut self, node: &mut ObjMemberNode) {
    let ObjMemberType::Shorthand { id } = &mut node.stx.typ else {
      return;
    };
    let Some(new_name) = self.new_name(self.res.symbol_of(&id.assoc), &id.stx.name) else {
      return;
    };
    let old_name = std::mem::replace(&mut id.stx.name, new_name);
    let loc = id.loc;
    let value = Node {
      loc,
      stx: Box::new(IdExpr {
        name: id.stx.name.clone(),
      }),
      assoc: std::mem::take(&mut id.assoc),
    };
    let tt = KEYWORD_STRS
      .get(old_name.as_str())
      .copied()
      .unwrap_or(TT::Identifier);
    node.stx.typ = ObjMemberType::Valued {
      key: ClassOrObjKey::Direct(Node::new(loc, ClassOrObjMemberDirectKey { key: old_name, tt })),
      val: ClassOrObjVal::Prop(Some(value.into_wrapped::<Expr>())),
    };
  }

  // The key is already separate from the target, so only the shorthand flag needs clearing.
  fn enter_obj_pat_prop_node(&mut self, node: &mut ObjPatPropNode) {
    if !node.stx.shorthand {
      return;
    };
    if let Pat::Id(id) = node.stx.target.stx.as_ref() {
      if self.new_name(self.res.symbol_of(&id.assoc), &id.stx.name).is_some() {
        node.stx.shorthand = false;
      };
    };
  }
}

/// Renames bindings in `top_level` to short names, in place. `res` must come from [`crate::resolve`] on the same tree; the new names are also stored as each symbol's `mangled_name`.
pub fn mangle(top_level: &mut Node<TopLevel>, res: &mut Resolution, opts: &MangleOptions) -> MangleResult {
  let _span = tracing::debug_span!("mangle").entered();
  for symbol in res.symbols.iter_mut() {
    symbol.mangled_name = None;
  }
  let mangleable: Vec<bool> = res.symbol_ids().map(|s| is_mangleable(res, opts, s)).collect();
  let freq = CharFrequency::scan(top_level, res, &|s| !mangleable[s.0 as usize]);
  let generator = NameGenerator::from_frequency(&freq);

  let mut assigner = NameAssigner::new(res, opts, generator, mangleable);
  for scope in assigner.res.scopes_pre_order() {
    assigner.assign_scope(scope);
  }

  let mut renamed = BTreeMap::new();
  for id in res.symbol_ids() {
    let symbol = res.symbol(id);
    if let Some(name) = symbol.mangled_name.as_ref().filter(|n| **n != symbol.name) {
      renamed.insert(id, name.clone());
    };
  }
  let mut visitor = RenameVisitor { res };
  top_level.drive_mut(&mut visitor);
  tracing::debug!(
    symbols = res.symbols.len(),
    renamed = renamed.len(),
    "mangled"
  );
  MangleResult { renamed }
}

#[cfg(test)]
mod tests {
  use super::mangle;
  use super::MangleOptions;
  use crate::resolve;
  use parse_js::ast::class_or_object::ObjMemberType;
  use parse_js::ast::expr::Expr;
  use parse_js::ast::stmt::Stmt;
  use parse_js::options::TopLevelMode;
  use parse_js::parse;

  fn toplevel() -> MangleOptions {
    MangleOptions {
      toplevel: true,
      ..Default::default()
    }
  }

  #[test]
  fn shorthand_members_are_expanded() {
    let mut top = parse("function f(long) { return { long }; }").unwrap();
    let mut res = resolve(&mut top, TopLevelMode::Global).unwrap();
    mangle(&mut top, &mut res, &MangleOptions::default());
    let Stmt::FunctionDecl(f) = top.stx.body[0].stx.as_ref() else {
      panic!("expected function");
    };
    let parse_js::ast::func::FuncBody::Block(body) = &f.stx.function.stx.body else {
      panic!("expected block body");
    };
    let Stmt::Return(ret) = body[0].stx.as_ref() else {
      panic!("expected return");
    };
    let Some(value) = &ret.stx.value else {
      panic!("expected value");
    };
    let Expr::LitObj(obj) = value.stx.as_ref() else {
      panic!("expected object");
    };
    assert!(matches!(
      &obj.stx.members[0].stx.typ,
      ObjMemberType::Valued { .. }
    ));
  }

  #[test]
  fn toplevel_is_opt_in() {
    let mut top = parse("var x = 1; function f(y) { return x + y; }").unwrap();
    let mut res = resolve(&mut top, TopLevelMode::Global).unwrap();
    let result = mangle(&mut top, &mut res, &MangleOptions::default());
    assert_eq!(result.renamed.len(), 1);
    assert_eq!(res.symbol(res.lookup(res.root, "x").unwrap()).final_name(), "x");

    let mut top = parse("var x = 1; function f(y) { return x + y; }").unwrap();
    let mut res = resolve(&mut top, TopLevelMode::Global).unwrap();
    let result = mangle(&mut top, &mut res, &toplevel());
    assert_eq!(result.renamed.len(), 3);
  }

  #[test]
  fn keeps_names_when_asked() {
    let src = "(function () { function named() {} class Named {} let other; })";
    let mut top = parse(src).unwrap();
    let mut res = resolve(&mut top, TopLevelMode::Global).unwrap();
    let opts = MangleOptions {
      keep_fnames: true,
      keep_classnames: true,
      ..Default::default()
    };
    let result = mangle(&mut top, &mut res, &opts);
    let names: Vec<_> = result.name_map(&res).into_keys().collect();
    assert_eq!(names, vec!["other".to_string()]);
  }

  #[test]
  fn reserved_names_are_neither_renamed_nor_generated() {
    let mut top = parse("(function (keep, b) { return keep + b; })").unwrap();
    let mut res = resolve(&mut top, TopLevelMode::Global).unwrap();
    let opts = MangleOptions {
      reserved: ["keep".to_string(), "a".to_string()].into_iter().collect(),
      ..Default::default()
    };
    let result = mangle(&mut top, &mut res, &opts);
    let map = result.name_map(&res);
    assert!(!map.contains_key("keep"));
    assert!(map.values().flatten().all(|n| n != "a" && n != "keep"));
  }

  #[test]
  fn debug_names() {
    let mut top = parse("(function (value, other) { return value + other; })").unwrap();
    let mut res = resolve(&mut top, TopLevelMode::Global).unwrap();
    let opts = MangleOptions {
      debug: true,
      reserved: ["_$value$_".to_string()].into_iter().collect(),
      ..Default::default()
    };
    let result = mangle(&mut top, &mut res, &opts);
    let map = result.name_map(&res);
    assert_eq!(map["value"].iter().next().map(String::as_str), Some("_$value$_1"));
    assert_eq!(map["other"].iter().next().map(String::as_str), Some("_$other$_"));
  }
}
