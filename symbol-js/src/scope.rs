use crate::assoc::declared_symbol;
use crate::assoc::resolved_symbol;
use parse_js::ast::node::NodeAssocData;
use parse_js::loc::Loc;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ScopeId(pub(crate) u32);

impl ScopeId {
  pub fn raw(self) -> u32 {
    self.0
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct SymbolId(pub(crate) u32);

impl SymbolId {
  pub fn raw(self) -> u32 {
    self.0
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct LabelId(pub(crate) u32);

impl LabelId {
  pub fn raw(self) -> u32 {
    self.0
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum ScopeKind {
  Global,
  Module,
  Function,
  ArrowFunction,
  /// The body of a function whose parameters have defaults, patterns or a rest element. Expressions in the parameter list can't see its declarations.
  FunctionBody,
  /// Holds only the name of a named function expression, so the name is visible inside the function but not outside it.
  FunctionExpressionName,
  ClassExpressionName,
  Block,
  /// The head of a `for`, `for-in` or `for-of` loop.
  For,
  Catch,
  Switch,
  Class,
  /// `static { ... }` in a class body. Has its own `var` scope.
  StaticBlock,
}

impl ScopeKind {
  /// Whether `var` declarations stop here.
  pub fn is_var_scope(self) -> bool {
    matches!(
      self,
      ScopeKind::Global
        | ScopeKind::Module
        | ScopeKind::Function
        | ScopeKind::ArrowFunction
        | ScopeKind::FunctionBody
        | ScopeKind::StaticBlock
    )
  }

  pub fn is_function(self) -> bool {
    matches!(self, ScopeKind::Function | ScopeKind::ArrowFunction)
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct ScopeData {
  pub parent: Option<ScopeId>,
  pub kind: ScopeKind,
  pub loc: Loc,
  pub children: Vec<ScopeId>,
  /// Names visible as bindings of this scope. A sloppy-mode function declared in a block is listed in both the block and the enclosing `var` scope under one symbol.
  pub symbols: BTreeMap<String, SymbolId>,
  /// Symbols declared in an ancestor and referenced from this scope or a descendant.
  pub enclosed: BTreeSet<SymbolId>,
  pub uses_with: bool,
  pub uses_eval: bool,
  /// Set if this scope or a descendant uses `with` or direct `eval`. None of its own bindings can be renamed.
  pub pinned: bool,
}

impl ScopeData {
  pub(crate) fn new(parent: Option<ScopeId>, kind: ScopeKind, loc: Loc) -> ScopeData {
    ScopeData {
      parent,
      kind,
      loc,
      children: Vec::new(),
      symbols: BTreeMap::new(),
      enclosed: BTreeSet::new(),
      uses_with: false,
      uses_eval: false,
      pinned: false,
    }
  }

  pub fn get(&self, name: &str) -> Option<SymbolId> {
    self.symbols.get(name).copied()
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum SymbolKind {
  Var,
  Let,
  Const,
  Class,
  Function,
  Param,
  CatchParam,
  Import,
  FunctionExpressionName,
  ClassExpressionName,
  /// The implicit `arguments` object of a non-arrow function.
  Arguments,
  /// Synthesised for a name that is used but never declared.
  Global,
}

impl SymbolKind {
  pub fn is_lexical(self) -> bool {
    matches!(
      self,
      SymbolKind::Let | SymbolKind::Const | SymbolKind::Class | SymbolKind::Import
    )
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct SymbolData {
  pub name: String,
  pub scope: ScopeId,
  pub kind: SymbolKind,
  pub declarations: Vec<Loc>,
  pub references: Vec<Loc>,
  pub undeclared_global: bool,
  /// Declared by `export var`, `export function`, etc., so the local name is also the exported name.
  pub exported: bool,
  /// The name must survive mangling regardless of options.
  pub keep_name: bool,
  pub mangled_name: Option<String>,
  pub reference_count: usize,
  pub assignment_count: usize,
}

impl SymbolData {
  pub(crate) fn new(name: &str, scope: ScopeId, kind: SymbolKind) -> SymbolData {
    SymbolData {
      name: name.to_string(),
      scope,
      kind,
      declarations: Vec::new(),
      references: Vec::new(),
      undeclared_global: kind == SymbolKind::Global,
      exported: false,
      keep_name: matches!(kind, SymbolKind::Global | SymbolKind::Arguments),
      mangled_name: None,
      reference_count: 0,
      assignment_count: 0,
    }
  }

  /// The name after mangling, or the original if it wasn't renamed.
  pub fn final_name(&self) -> &str {
    self.mangled_name.as_deref().unwrap_or(&self.name)
  }
}

#[derive(Clone, Debug, Serialize)]
pub struct LabelData {
  pub name: String,
  pub loc: Loc,
  /// Labels a loop, directly or through other labels, so `continue` may target it.
  pub is_loop: bool,
  pub references: Vec<Loc>,
}

/// The scope tree, symbol table and labels of one compilation unit.
#[derive(Clone, Debug, Serialize)]
pub struct Resolution {
  pub scopes: Vec<ScopeData>,
  pub symbols: Vec<SymbolData>,
  pub labels: Vec<LabelData>,
  pub root: ScopeId,
}

impl Resolution {
  pub fn scope(&self, id: ScopeId) -> &ScopeData {
    &self.scopes[id.0 as usize]
  }

  pub fn scope_mut(&mut self, id: ScopeId) -> &mut ScopeData {
    &mut self.scopes[id.0 as usize]
  }

  pub fn symbol(&self, id: SymbolId) -> &SymbolData {
    &self.symbols[id.0 as usize]
  }

  pub fn symbol_mut(&mut self, id: SymbolId) -> &mut SymbolData {
    &mut self.symbols[id.0 as usize]
  }

  pub fn label(&self, id: LabelId) -> &LabelData {
    &self.labels[id.0 as usize]
  }

  pub fn symbol_ids(&self) -> impl Iterator<Item = SymbolId> {
    (0..self.symbols.len() as u32).map(SymbolId)
  }

  /// The symbol a node declares or refers to.
  pub fn symbol_of(&self, assoc: &NodeAssocData) -> Option<SymbolId> {
    declared_symbol(assoc).or_else(|| resolved_symbol(assoc))
  }

  /// Finds the binding `name` refers to from `scope`, walking up the parent chain.
  pub fn lookup(&self, scope: ScopeId, name: &str) -> Option<SymbolId> {
    self.lookup_with_scope(scope, name).map(|(_, symbol)| symbol)
  }

  /// Like [`Resolution::lookup`], also returning the scope whose table contained the name.
  pub fn lookup_with_scope(&self, scope: ScopeId, name: &str) -> Option<(ScopeId, SymbolId)> {
    let mut current = Some(scope);
    while let Some(id) = current {
      let data = self.scope(id);
      if let Some(symbol) = data.get(name) {
        return Some((id, symbol));
      };
      current = data.parent;
    }
    None
  }

  /// `scope` followed by each of its ancestors up to the root.
  pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
    std::iter::successors(Some(scope), |id| self.scope(*id).parent)
  }

  /// All scopes, parents before children, siblings in source order.
  pub fn scopes_pre_order(&self) -> Vec<ScopeId> {
    let mut order = Vec::with_capacity(self.scopes.len());
    let mut stack = vec![self.root];
    while let Some(id) = stack.pop() {
      order.push(id);
      stack.extend(self.scope(id).children.iter().rev().copied());
    }
    order
  }

  /// Names that are used but never declared, sorted.
  pub fn globals(&self) -> Vec<&str> {
    let mut names: Vec<&str> = self
      .symbols
      .iter()
      .filter(|s| s.undeclared_global)
      .map(|s| s.name.as_str())
      .collect();
    names.sort_unstable();
    names
  }

  /// Sets `pinned` on `scope` and all its ancestors.
  pub(crate) fn pin(&mut self, scope: ScopeId) {
    let mut current = Some(scope);
    while let Some(id) = current {
      let data = self.scope_mut(id);
      data.pinned = true;
      current = data.parent;
    }
  }
}

#[cfg(test)]
mod tests {
  use crate::resolve;
  use crate::scope::ScopeKind;
  use crate::scope::SymbolKind;
  use parse_js::options::TopLevelMode;
  use parse_js::parse;

  #[test]
  fn pre_order_visits_parents_first() {
    let mut top = parse("function f() { { let a; } } { let b; }").unwrap();
    let res = resolve(&mut top, TopLevelMode::Global).unwrap();
    let kinds: Vec<_> = res
      .scopes_pre_order()
      .into_iter()
      .map(|id| res.scope(id).kind)
      .collect();
    assert_eq!(kinds, vec![
      ScopeKind::Global,
      ScopeKind::Function,
      ScopeKind::Block,
      ScopeKind::Block,
    ]);
  }

  #[test]
  fn globals_are_sorted_and_distinct() {
    let mut top = parse("b(); a; b; let c = a;").unwrap();
    let res = resolve(&mut top, TopLevelMode::Global).unwrap();
    assert_eq!(res.globals(), vec!["a", "b"]);
    let a = res.lookup(res.root, "a").unwrap();
    assert_eq!(res.symbol(a).kind, SymbolKind::Global);
    assert_eq!(res.symbol(a).reference_count, 2);
    assert!(res.symbol(a).keep_name);
  }
}
