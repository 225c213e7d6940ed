use crate::assoc::declared_symbol;
use crate::assoc::resolved_symbol;
use crate::assoc::scope_id;
use crate::assoc::ResolvedSymbol;
use crate::declare::declare;
use crate::error::ScopeError;
use crate::error::ScopeErrorType;
use crate::error::ScopeResult;
use crate::scope::Resolution;
use crate::scope::ScopeId;
use crate::scope::ScopeKind;
use crate::scope::SymbolData;
use crate::scope::SymbolId;
use crate::scope::SymbolKind;
use derive_visitor::DriveMut;
use derive_visitor::VisitorMut;
use parse_js::ast::expr::pat::IdPat;
use parse_js::ast::expr::CallExpr;
use parse_js::ast::expr::Expr;
use parse_js::ast::expr::IdExpr;
use parse_js::ast::expr::UnaryExpr;
use parse_js::ast::expr::UnaryPostfixExpr;
use parse_js::ast::import_export::ExportNames;
use parse_js::ast::import_export::ModuleExportImportName;
use parse_js::ast::node::Node;
use parse_js::ast::stmt::ExportListStmt;
use parse_js::ast::stmt::WithStmt;
use parse_js::ast::stx::TopLevel;
use parse_js::loc::Loc;
use parse_js::options::TopLevelMode;

type CallExprNode = Node<CallExpr>;
type ExportListStmtNode = Node<ExportListStmt>;
type IdExprNode = Node<IdExpr>;
type IdPatNode = Node<IdPat>;
type UnaryExprNode = Node<UnaryExpr>;
type UnaryPostfixExprNode = Node<UnaryPostfixExpr>;
type WithStmtNode = Node<WithStmt>;

#[derive(VisitorMut)]
#[visitor(
  CallExprNode(exit),
  ExportListStmtNode(enter),
  IdExprNode(enter),
  IdPatNode(enter),
  UnaryExprNode(enter),
  UnaryPostfixExprNode(enter),
  WithStmtNode(enter)
)]
struct ResolveVisitor<'a> {
  res: &'a mut Resolution,
  // The operand of the `++` or `--` being visited, which is written as well as read.
  update_target: Option<Loc>,
  error: Option<ScopeError>,
}

impl<'a> ResolveVisitor<'a> {
  /// Finds the symbol `name` refers to from `scope`, creating the implicit `arguments` of a function or a global if nothing declares it.
  fn find_or_create(&mut self, scope: ScopeId, name: &str) -> (ScopeId, SymbolId) {
    for id in self.res.ancestors(scope).collect::<Vec<_>>() {
      let data = self.res.scope(id);
      if let Some(symbol) = data.get(name) {
        return (id, symbol);
      };
      if name == "arguments" && data.kind == ScopeKind::Function {
        return (id, self.create(id, name, SymbolKind::Arguments));
      };
    }
    let root = self.res.root;
    (root, self.create(root, name, SymbolKind::Global))
  }

  fn create(&mut self, scope: ScopeId, name: &str, kind: SymbolKind) -> SymbolId {
    let id = SymbolId(self.res.symbols.len() as u32);
    self.res.symbols.push(SymbolData::new(name, scope, kind));
    self.res.scope_mut(scope).symbols.insert(name.to_string(), id);
    id
  }

  fn reference(&mut self, scope: ScopeId, name: &str, loc: Loc, assignment: bool) -> SymbolId {
    let (found_in, symbol) = self.find_or_create(scope, name);
    let between: Vec<_> = self
      .res
      .ancestors(scope)
      .take_while(|id| *id != found_in)
      .collect();
    for id in between {
      self.res.scope_mut(id).enclosed.insert(symbol);
    }
    let data = self.res.symbol_mut(symbol);
    data.references.push(loc);
    data.reference_count += 1;
    if assignment {
      data.assignment_count += 1;
    };
    symbol
  }

  fn mark_update_target(&mut self, argument: &Node<Expr>, operator_is_update: bool) {
    if operator_is_update {
      if let Expr::Id(id) = argument.stx.as_ref() {
        self.update_target = Some(id.loc);
      };
    };
  }
}

impl<'a> ResolveVisitor<'a> {
  fn enter_id_expr_node(&mut self, node: &mut IdExprNode) {
    let Some(scope) = scope_id(&node.assoc) else {
      return;
    };
    let assignment = self.update_target.take() == Some(node.loc);
    let symbol = self.reference(scope, &node.stx.name, node.loc, assignment);
    node.assoc.set(ResolvedSymbol(symbol));
  }

  fn enter_id_pat_node(&mut self, node: &mut IdPatNode) {
    if declared_symbol(&node.assoc).is_some() {
      return;
    };
    let Some(scope) = scope_id(&node.assoc) else {
      return;
    };
    let symbol = self.reference(scope, &node.stx.name, node.loc, true);
    node.assoc.set(ResolvedSymbol(symbol));
  }

  fn enter_unary_expr_node(&mut self, node: &mut UnaryExprNode) {
    self.mark_update_target(&node.stx.argument, node.stx.operator.is_update());
  }

  fn enter_unary_postfix_expr_node(&mut self, node: &mut UnaryPostfixExprNode) {
    self.mark_update_target(&node.stx.argument, node.stx.operator.is_update());
  }

  fn exit_call_expr_node(&mut self, node: &mut CallExprNode) {
    if node.stx.optional_chaining {
      return;
    };
    let Expr::Id(callee) = node.stx.callee.stx.as_ref() else {
      return;
    };
    if callee.stx.name != "eval" {
      return;
    };
    let is_global = resolved_symbol(&callee.assoc).is_some_and(|s| self.res.symbol(s).undeclared_global);
    let Some(scope) = scope_id(&node.assoc) else {
      return;
    };
    if is_global {
      self.res.scope_mut(scope).uses_eval = true;
      self.res.pin(scope);
    };
  }

  fn enter_with_stmt_node(&mut self, node: &mut WithStmtNode) {
    let Some(scope) = scope_id(&node.assoc) else {
      return;
    };
    self.res.scope_mut(scope).uses_with = true;
    self.res.pin(scope);
  }

  fn enter_export_list_stmt_node(&mut self, node: &mut ExportListStmtNode) {
    if node.stx.from.is_some() {
      return;
    };
    let ExportNames::Specific(names) = &mut node.stx.names else {
      return;
    };
    let Some(scope) = scope_id(&node.assoc) else {
      return;
    };
    for name in names.iter_mut() {
      let ModuleExportImportName::Ident(local) = &name.stx.exportable else {
        continue;
      };
      let Some(symbol) = self.res.lookup(scope, local) else {
        if self.error.is_none() {
          self.error = Some(ScopeError::new(
            ScopeErrorType::UnresolvedExport,
            name.loc,
            Some(local.as_str()),
          ));
        };
        continue;
      };
      let data = self.res.symbol_mut(symbol);
      data.references.push(name.loc);
      data.reference_count += 1;
      name.assoc.set(ResolvedSymbol(symbol));
    }
  }
}

/// Builds the scope tree of `top_level`, then binds every identifier reference to its declaration.
///
/// Attaches a [`ScopeId`] to every node, [`crate::assoc::DeclaredSymbol`] to declaring identifiers and [`ResolvedSymbol`] to referencing ones. Running it again on the same tree replaces all of these, so it's safe to resolve a tree that was already resolved and mangled.
pub fn resolve(top_level: &mut Node<TopLevel>, mode: TopLevelMode) -> ScopeResult<Resolution> {
  let _span = tracing::debug_span!("resolve", ?mode).entered();
  let mut res = declare(top_level, mode)?;
  let mut visitor = ResolveVisitor {
    res: &mut res,
    update_target: None,
    error: None,
  };
  top_level.drive_mut(&mut visitor);
  if let Some(err) = visitor.error {
    return Err(err);
  };
  tracing::debug!(
    globals = res.globals().len(),
    pinned = res.scopes.iter().filter(|s| s.pinned).count(),
    "resolved"
  );
  Ok(res)
}
