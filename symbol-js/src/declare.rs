use crate::assoc::DeclaredSymbol;
use crate::assoc::LabelRef;
use crate::error::ScopeError;
use crate::error::ScopeErrorType;
use crate::error::ScopeResult;
use crate::scope::LabelData;
use crate::scope::LabelId;
use crate::scope::Resolution;
use crate::scope::ScopeData;
use crate::scope::ScopeId;
use crate::scope::ScopeKind;
use crate::scope::SymbolData;
use crate::scope::SymbolId;
use crate::scope::SymbolKind;
use ahash::HashMap;
use ahash::HashSet;
use derive_visitor::DriveMut;
use derive_visitor::VisitorMut;
use parse_js::ast::class_or_object::ClassStaticBlock;
use parse_js::ast::expr::pat::ClassOrFuncName;
use parse_js::ast::expr::pat::IdPat;
use parse_js::ast::expr::pat::Pat;
use parse_js::ast::expr::ClassExpr;
use parse_js::ast::expr::Expr;
use parse_js::ast::expr::FuncExpr;
use parse_js::ast::func::Func;
use parse_js::ast::func::FuncBody;
use parse_js::ast::node::Node;
use parse_js::ast::node::NodeAssocData;
use parse_js::ast::node::StrictMode;
use parse_js::ast::stmt::decl::ClassDecl;
use parse_js::ast::stmt::decl::FuncDecl;
use parse_js::ast::stmt::decl::ParamDecl;
use parse_js::ast::stmt::decl::PatDecl;
use parse_js::ast::stmt::decl::VarDecl;
use parse_js::ast::stmt::decl::VarDeclMode;
use parse_js::ast::stmt::BlockStmt;
use parse_js::ast::stmt::BreakStmt;
use parse_js::ast::stmt::CatchBlock;
use parse_js::ast::stmt::ContinueStmt;
use parse_js::ast::stmt::DoWhileStmt;
use parse_js::ast::stmt::ForInOfLhs;
use parse_js::ast::stmt::ForInStmt;
use parse_js::ast::stmt::ForOfStmt;
use parse_js::ast::stmt::ForTripleStmt;
use parse_js::ast::stmt::ImportStmt;
use parse_js::ast::stmt::LabelStmt;
use parse_js::ast::stmt::Stmt;
use parse_js::ast::stmt::SwitchBranch;
use parse_js::ast::stmt::SwitchStmt;
use parse_js::ast::stmt::WhileStmt;
use parse_js::ast::stx::TopLevel;
use parse_js::loc::Loc;
use parse_js::options::TopLevelMode;

type BlockStmtNode = Node<BlockStmt>;
type BreakStmtNode = Node<BreakStmt>;
type CatchBlockNode = Node<CatchBlock>;
type ClassDeclNode = Node<ClassDecl>;
type ClassExprNode = Node<ClassExpr>;
type ClassStaticBlockNode = Node<ClassStaticBlock>;
type ContinueStmtNode = Node<ContinueStmt>;
type DoWhileStmtNode = Node<DoWhileStmt>;
type ExprNode = Node<Expr>;
type ForInStmtNode = Node<ForInStmt>;
type ForOfStmtNode = Node<ForOfStmt>;
type ForTripleStmtNode = Node<ForTripleStmt>;
type FuncDeclNode = Node<FuncDecl>;
type FuncExprNode = Node<FuncExpr>;
type FuncNode = Node<Func>;
type IdPatNode = Node<IdPat>;
type ImportStmtNode = Node<ImportStmt>;
type LabelStmtNode = Node<LabelStmt>;
type PatDeclNode = Node<PatDecl>;
type SwitchBranchNode = Node<SwitchBranch>;
type SwitchStmtNode = Node<SwitchStmt>;
type VarDeclNode = Node<VarDecl>;
type WhileStmtNode = Node<WhileStmt>;

/// How a name is bound in one scope, for early error checks. Kept separately from `SymbolKind` as a sloppy-mode block function shares its symbol with the hoisted `var`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum BindingClass {
  Lexical,
  Var,
  Param,
  CatchParam,
  Function,
  // A sloppy-mode function declared directly in a block.
  BlockFunction,
}

impl BindingClass {
  fn is_lexical(self) -> bool {
    matches!(self, BindingClass::Lexical | BindingClass::BlockFunction)
  }
}

// A sloppy-mode block function that may also bind in `target`. Decided once every lexical declaration is known.
struct BlockFunctionHoist {
  name: String,
  block: ScopeId,
  // Scopes strictly between the block and `target`.
  through: Vec<ScopeId>,
  target: ScopeId,
}

#[derive(Clone, Copy)]
struct DeclContext {
  kind: SymbolKind,
  exported: bool,
}

// Jump targets visible from the current function.
#[derive(Default)]
struct JumpContext {
  loops: usize,
  switches: usize,
  labels: Vec<(String, LabelId)>,
}

struct ScopeBuilder {
  scopes: Vec<ScopeData>,
  symbols: Vec<SymbolData>,
  labels: Vec<LabelData>,
  classes: HashMap<(ScopeId, String), BindingClass>,
  // Names declared with `var` that hoist through a scope without being declared in it.
  var_through: HashSet<(ScopeId, String)>,
  // Symbols folded into another one, mapped to the one that replaced them.
  merged: HashMap<SymbolId, SymbolId>,
}

impl ScopeBuilder {
  fn new(kind: ScopeKind, loc: Loc) -> ScopeBuilder {
    ScopeBuilder {
      scopes: vec![ScopeData::new(None, kind, loc)],
      symbols: Vec::new(),
      labels: Vec::new(),
      classes: HashMap::default(),
      var_through: HashSet::default(),
      merged: HashMap::default(),
    }
  }

  fn scope(&self, id: ScopeId) -> &ScopeData {
    &self.scopes[id.0 as usize]
  }

  fn new_scope(&mut self, parent: ScopeId, kind: ScopeKind, loc: Loc) -> ScopeId {
    let id = ScopeId(self.scopes.len() as u32);
    self.scopes.push(ScopeData::new(Some(parent), kind, loc));
    self.scopes[parent.0 as usize].children.push(id);
    id
  }

  fn class_of(&self, scope: ScopeId, name: &str) -> Option<BindingClass> {
    self.classes.get(&(scope, name.to_string())).copied()
  }

  fn check_conflict(&self, scope: ScopeId, name: &str, class: BindingClass, loc: Loc) -> ScopeResult<()> {
    let err = |typ| Err(ScopeError::new(typ, loc, Some(name)));
    if class.is_lexical() && self.var_through.contains(&(scope, name.to_string())) {
      return err(ScopeErrorType::LexicalVarCollision);
    };
    if class.is_lexical() && self.is_param_of_body(scope, name) {
      return err(ScopeErrorType::LexicalVarCollision);
    };
    let Some(existing) = self.class_of(scope, name) else {
      return Ok(());
    };
    match (existing, class) {
      (BindingClass::BlockFunction, BindingClass::BlockFunction) => Ok(()),
      (BindingClass::CatchParam, BindingClass::CatchParam) => Ok(()),
      (BindingClass::CatchParam, c) if c.is_lexical() => err(ScopeErrorType::CatchParameterRedeclared),
      (e, c) if e.is_lexical() && c.is_lexical() => err(ScopeErrorType::Redeclaration),
      (e, c) if e.is_lexical() || c.is_lexical() => err(ScopeErrorType::LexicalVarCollision),
      _ => Ok(()),
    }
  }

  /// Adds `name` to `scope`, reusing the existing symbol if it's a permitted redeclaration.
  fn bind(
    &mut self,
    scope: ScopeId,
    name: &str,
    kind: SymbolKind,
    class: BindingClass,
    loc: Loc,
  ) -> ScopeResult<SymbolId> {
    self.check_conflict(scope, name, class, loc)?;
    let symbol = match self.scope(scope).get(name) {
      Some(existing) => {
        let data = &mut self.symbols[existing.0 as usize];
        // `var f; function f() {}` is a function.
        if kind == SymbolKind::Function && data.kind == SymbolKind::Var {
          data.kind = SymbolKind::Function;
        };
        existing
      }
      None => {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(SymbolData::new(name, scope, kind));
        self.scopes[scope.0 as usize].symbols.insert(name.to_string(), id);
        id
      }
    };
    self.symbols[symbol.0 as usize].declarations.push(loc);
    self.classes.insert((scope, name.to_string()), class);
    Ok(symbol)
  }

  // Whether `scope` is a separate function body whose parameter list declares `name`.
  fn is_param_of_body(&self, scope: ScopeId, name: &str) -> bool {
    let data = self.scope(scope);
    match data.parent {
      Some(parent) if data.kind == ScopeKind::FunctionBody => self.class_of(parent, name) == Some(BindingClass::Param),
      _ => false,
    }
  }

  /// Replaces `from` with `into` in every scope table. `from` is dropped by `compact`.
  fn merge(&mut self, from: SymbolId, into: SymbolId) {
    if from == into {
      return;
    };
    let declarations = std::mem::take(&mut self.symbols[from.0 as usize].declarations);
    let keep_name = self.symbols[from.0 as usize].keep_name;
    let data = &mut self.symbols[into.0 as usize];
    data.declarations.extend(declarations);
    data.keep_name |= keep_name;
    for scope in self.scopes.iter_mut() {
      for symbol in scope.symbols.values_mut() {
        if *symbol == from {
          *symbol = into;
        };
      }
    }
    for target in self.merged.values_mut() {
      if *target == from {
        *target = into;
      };
    }
    self.merged.insert(from, into);
  }

  /// Binds each sloppy-mode block function in its `var` scope too, unless a lexical declaration of the same name anywhere in between, or a parameter of that name, would conflict.
  fn hoist_block_functions(&mut self, hoists: Vec<BlockFunctionHoist>) {
    for hoist in hoists {
      let name = hoist.name.as_str();
      let Some(symbol) = self.scope(hoist.block).get(name) else {
        continue;
      };
      // Already hoisted through another declaration in the same block.
      if self.symbols[symbol.0 as usize].scope != hoist.block {
        continue;
      };
      let blocked = hoist
        .through
        .iter()
        .chain(std::iter::once(&hoist.target))
        .any(|s| self.class_of(*s, name).is_some_and(|c| c.is_lexical()))
        || self.class_of(hoist.target, name) == Some(BindingClass::Param)
        || self.is_param_of_body(hoist.target, name);
      if blocked {
        continue;
      };
      match self.scope(hoist.target).get(name) {
        Some(existing) => {
          let data = &mut self.symbols[existing.0 as usize];
          if data.kind == SymbolKind::Var {
            data.kind = SymbolKind::Function;
          };
          self.merge(symbol, existing);
        }
        None => {
          self.symbols[symbol.0 as usize].scope = hoist.target;
          self.scopes[hoist.target.0 as usize].symbols.insert(name.to_string(), symbol);
          self.classes.insert((hoist.target, name.to_string()), BindingClass::Function);
        }
      };
    }
  }

  /// Drops merged symbols and renumbers the rest. Returns the old to new id map if anything changed.
  fn compact(&mut self) -> Option<Vec<SymbolId>> {
    if self.merged.is_empty() {
      return None;
    };
    let mut map = vec![SymbolId(0); self.symbols.len()];
    let mut kept = Vec::with_capacity(self.symbols.len() - self.merged.len());
    for (i, data) in std::mem::take(&mut self.symbols).into_iter().enumerate() {
      if self.merged.contains_key(&SymbolId(i as u32)) {
        continue;
      };
      map[i] = SymbolId(kept.len() as u32);
      kept.push(data);
    }
    for (from, into) in self.merged.iter() {
      map[from.0 as usize] = map[into.0 as usize];
    }
    self.symbols = kept;
    for scope in self.scopes.iter_mut() {
      for symbol in scope.symbols.values_mut() {
        *symbol = map[symbol.0 as usize];
      }
    }
    Some(map)
  }

  fn finish(mut self) -> Resolution {
    // A symbol listed in a nested scope's table, such as a hoisted block function, is visible in every scope between it and its owner.
    for id in 0..self.scopes.len() {
      let shared: Vec<SymbolId> = self.scopes[id]
        .symbols
        .values()
        .copied()
        .filter(|s| self.symbols[s.0 as usize].scope.0 as usize != id)
        .collect();
      for symbol in shared {
        let owner = self.symbols[symbol.0 as usize].scope;
        let mut current = self.scopes[id].parent;
        while let Some(scope) = current.filter(|s| *s != owner) {
          self.scopes[scope.0 as usize].enclosed.insert(symbol);
          current = self.scopes[scope.0 as usize].parent;
        }
      }
    }
    Resolution {
      scopes: self.scopes,
      symbols: self.symbols,
      labels: self.labels,
      root: ScopeId(0),
    }
  }
}

// Points declarations of merged symbols at their replacement.
#[derive(VisitorMut)]
#[visitor(NodeAssocData(enter))]
struct RenumberVisitor {
  map: Vec<SymbolId>,
}

impl RenumberVisitor {
  fn enter_node_assoc_data(&mut self, assoc: &mut NodeAssocData) {
    if let Some(declared) = assoc.get_mut::<DeclaredSymbol>() {
      declared.0 = self.map[declared.0.0 as usize];
    };
  }
}

#[derive(VisitorMut)]
#[visitor(
  BlockStmtNode,
  BreakStmtNode(enter),
  CatchBlockNode,
  ClassDeclNode,
  ClassExprNode,
  ClassStaticBlockNode,
  ContinueStmtNode(enter),
  DoWhileStmtNode,
  ExprNode,
  ForInOfLhs,
  ForInStmtNode,
  ForOfStmtNode,
  ForTripleStmtNode,
  FuncDeclNode(enter),
  FuncBody,
  FuncExprNode,
  FuncNode,
  IdPatNode(enter),
  ImportStmtNode,
  LabelStmtNode,
  PatDeclNode,
  SwitchBranchNode(enter),
  SwitchStmtNode,
  VarDeclNode,
  WhileStmtNode,
  NodeAssocData(enter)
)]
struct DeclareVisitor {
  builder: ScopeBuilder,
  scope_stack: Vec<ScopeId>,
  decl_stack: Vec<DeclContext>,
  in_pattern_decl: Vec<bool>,
  strict_stack: Vec<bool>,
  jump_stack: Vec<JumpContext>,
  // Whether each enclosing function expression pushed a name scope.
  func_expr_named: Vec<bool>,
  // Each enclosing switch's location and its scope, once created.
  switch_scopes: Vec<(Loc, Option<ScopeId>)>,
  // For each enclosing function, whether its body gets a scope apart from its parameters.
  separate_bodies: Vec<(bool, Loc)>,
  hoists: Vec<BlockFunctionHoist>,
  error: Option<ScopeError>,
}

impl DeclareVisitor {
  fn current_scope(&self) -> ScopeId {
    self.scope_stack.last().copied().unwrap_or(ScopeId(0))
  }

  fn is_strict(&self) -> bool {
    self.strict_stack.last().copied().unwrap_or(false)
  }

  fn jumps(&mut self) -> &mut JumpContext {
    if self.jump_stack.is_empty() {
      self.jump_stack.push(JumpContext::default());
    };
    let last = self.jump_stack.len() - 1;
    &mut self.jump_stack[last]
  }

  // Only the first error is kept; the rest of the tree is still walked so that the scope stack stays balanced.
  fn fail(&mut self, err: ScopeError) {
    if self.error.is_none() {
      self.error = Some(err);
    };
  }

  fn push_scope(&mut self, kind: ScopeKind, loc: Loc) {
    let id = self.builder.new_scope(self.current_scope(), kind, loc);
    self.scope_stack.push(id);
  }

  fn pop_scope(&mut self) {
    self.scope_stack.pop();
  }

  fn nearest_var_scope(&self) -> ScopeId {
    self
      .scope_stack
      .iter()
      .rev()
      .copied()
      .find(|id| self.builder.scope(*id).kind.is_var_scope())
      .unwrap_or(ScopeId(0))
  }

  fn declare_var(&mut self, name: &str, kind: SymbolKind, class: BindingClass, loc: Loc) -> ScopeResult<SymbolId> {
    let target = self.nearest_var_scope();
    let mut catch_param = None;
    for &scope in self.scope_stack.iter().rev() {
      if scope == target {
        break;
      };
      match self.builder.class_of(scope, name) {
        Some(c) if c.is_lexical() => {
          return Err(ScopeError::new(ScopeErrorType::LexicalVarCollision, loc, Some(name)));
        }
        Some(BindingClass::CatchParam) if catch_param.is_none() => {
          catch_param = self.builder.scope(scope).get(name);
        }
        _ => {}
      };
      self.builder.var_through.insert((scope, name.to_string()));
    }
    // `var a` in a body with its own scope starts out with the value of parameter `a`.
    if self.builder.is_param_of_body(target, name) && self.builder.scope(target).get(name).is_none() {
      let parent = self.builder.scope(target).parent.unwrap_or(ScopeId(0));
      if let Some(param) = self.builder.scope(parent).get(name) {
        self.builder.scopes[target.0 as usize].symbols.insert(name.to_string(), param);
      };
    };
    let symbol = self.builder.bind(target, name, kind, class, loc)?;
    // `catch (e) { var e = 1; }` assigns to the parameter, while `e` is still declared in the `var` scope. One symbol for both keeps them renamed together.
    if let Some(param) = catch_param {
      self.builder.merge(param, symbol);
    };
    Ok(symbol)
  }

  fn declare(&mut self, name: &str, ctx: DeclContext, loc: Loc) -> ScopeResult<SymbolId> {
    let scope = self.current_scope();
    let symbol = match ctx.kind {
      SymbolKind::Var => self.declare_var(name, SymbolKind::Var, BindingClass::Var, loc)?,
      SymbolKind::Param => self.builder.bind(scope, name, ctx.kind, BindingClass::Param, loc)?,
      SymbolKind::CatchParam => self.builder.bind(scope, name, ctx.kind, BindingClass::CatchParam, loc)?,
      _ => self.builder.bind(scope, name, ctx.kind, BindingClass::Lexical, loc)?,
    };
    if ctx.exported {
      self.builder.symbols[symbol.0 as usize].exported = true;
      self.builder.symbols[symbol.0 as usize].keep_name = true;
    };
    Ok(symbol)
  }

  fn declare_function(&mut self, name: &str, loc: Loc) -> ScopeResult<SymbolId> {
    let scope = self.current_scope();
    let kind = self.builder.scope(scope).kind;
    if kind == ScopeKind::Module {
      return self.builder.bind(scope, name, SymbolKind::Function, BindingClass::Lexical, loc);
    };
    if kind.is_var_scope() {
      return self.builder.bind(scope, name, SymbolKind::Function, BindingClass::Function, loc);
    };
    if self.is_strict() {
      return self.builder.bind(scope, name, SymbolKind::Function, BindingClass::Lexical, loc);
    };
    // Sloppy mode may also bind the function in the nearest `var` scope, sharing one symbol so both are renamed together. Later lexical declarations can rule that out, so it's decided after the walk.
    let symbol = self.builder.bind(scope, name, SymbolKind::Function, BindingClass::BlockFunction, loc)?;
    let target = self.nearest_var_scope();
    let through = self
      .scope_stack
      .iter()
      .rev()
      .skip(1)
      .take_while(|s| **s != target)
      .copied()
      .collect();
    self.hoists.push(BlockFunctionHoist {
      name: name.to_string(),
      block: scope,
      through,
      target,
    });
    Ok(symbol)
  }

  fn declare_name_node(&mut self, node: &mut Node<ClassOrFuncName>, result: ScopeResult<SymbolId>) {
    match result {
      Ok(symbol) => node.assoc.set(DeclaredSymbol(symbol)),
      Err(err) => self.fail(err),
    };
  }

  fn enter_loop(&mut self, loc: Loc) {
    self.jumps().loops += 1;
    self.push_scope(ScopeKind::For, loc);
  }

  fn exit_loop(&mut self) {
    self.jumps().loops -= 1;
    self.pop_scope();
  }

  fn find_label(&mut self, name: &str) -> Option<LabelId> {
    self
      .jumps()
      .labels
      .iter()
      .rev()
      .find(|(n, _)| n == name)
      .map(|(_, id)| *id)
  }
}

impl DeclareVisitor {
  fn enter_node_assoc_data(&mut self, assoc: &mut NodeAssocData) {
    assoc.set(self.current_scope());
  }

  fn enter_expr_node(&mut self, _node: &mut ExprNode) {
    self.in_pattern_decl.push(false);
  }

  fn exit_expr_node(&mut self, _node: &mut ExprNode) {
    self.in_pattern_decl.pop();
  }

  fn enter_pat_decl_node(&mut self, _node: &mut PatDeclNode) {
    self.in_pattern_decl.push(true);
  }

  fn exit_pat_decl_node(&mut self, _node: &mut PatDeclNode) {
    self.in_pattern_decl.pop();
  }

  fn enter_id_pat_node(&mut self, node: &mut IdPatNode) {
    if !self.in_pattern_decl.last().copied().unwrap_or(false) {
      return;
    };
    let Some(ctx) = self.decl_stack.last().copied() else {
      return;
    };
    match self.declare(&node.stx.name, ctx, node.loc) {
      Ok(symbol) => node.assoc.set(DeclaredSymbol(symbol)),
      Err(err) => self.fail(err),
    };
  }

  fn enter_var_decl_node(&mut self, node: &mut VarDeclNode) {
    let kind = match node.stx.mode {
      VarDeclMode::Var => SymbolKind::Var,
      VarDeclMode::Let => SymbolKind::Let,
      VarDeclMode::Const => SymbolKind::Const,
    };
    self.decl_stack.push(DeclContext {
      kind,
      exported: node.stx.export,
    });
  }

  fn exit_var_decl_node(&mut self, _node: &mut VarDeclNode) {
    self.decl_stack.pop();
  }

  fn enter_for_in_of_lhs(&mut self, node: &mut ForInOfLhs) {
    if let ForInOfLhs::Decl { mode, .. } = node {
      let kind = match mode {
        VarDeclMode::Var => SymbolKind::Var,
        VarDeclMode::Let => SymbolKind::Let,
        VarDeclMode::Const => SymbolKind::Const,
      };
      self.decl_stack.push(DeclContext {
        kind,
        exported: false,
      });
    };
  }

  fn exit_for_in_of_lhs(&mut self, node: &mut ForInOfLhs) {
    if matches!(node, ForInOfLhs::Decl { .. }) {
      self.decl_stack.pop();
    };
  }

  fn enter_import_stmt_node(&mut self, _node: &mut ImportStmtNode) {
    self.decl_stack.push(DeclContext {
      kind: SymbolKind::Import,
      exported: false,
    });
  }

  fn exit_import_stmt_node(&mut self, _node: &mut ImportStmtNode) {
    self.decl_stack.pop();
  }

  fn enter_func_decl_node(&mut self, node: &mut FuncDeclNode) {
    let exported = node.stx.export && !node.stx.export_default;
    let Some(name) = node.stx.name.as_mut() else {
      return;
    };
    let result = self.declare_function(&name.stx.name, name.loc);
    if exported {
      if let Ok(symbol) = result {
        self.builder.symbols[symbol.0 as usize].exported = true;
        self.builder.symbols[symbol.0 as usize].keep_name = true;
      };
    };
    self.declare_name_node(name, result);
  }

  fn enter_func_expr_node(&mut self, node: &mut FuncExprNode) {
    let Some(name) = node.stx.name.as_mut() else {
      self.func_expr_named.push(false);
      return;
    };
    self.func_expr_named.push(true);
    self.push_scope(ScopeKind::FunctionExpressionName, node.loc);
    let scope = self.current_scope();
    let result = self.builder.bind(
      scope,
      &name.stx.name,
      SymbolKind::FunctionExpressionName,
      BindingClass::Function,
      name.loc,
    );
    self.declare_name_node(name, result);
  }

  fn exit_func_expr_node(&mut self, _node: &mut FuncExprNode) {
    if self.func_expr_named.pop().unwrap_or(false) {
      self.pop_scope();
    };
  }

  fn enter_func_node(&mut self, node: &mut FuncNode) {
    let strict = self.is_strict() || node.assoc.has::<StrictMode>();
    self.strict_stack.push(strict);
    let kind = if node.stx.arrow {
      ScopeKind::ArrowFunction
    } else {
      ScopeKind::Function
    };
    self.push_scope(kind, node.loc);
    self.jump_stack.push(JumpContext::default());
    self.decl_stack.push(DeclContext {
      kind: SymbolKind::Param,
      exported: false,
    });
    let separate_body =
      matches!(node.stx.body, FuncBody::Block(_)) && !node.stx.parameters.iter().all(is_simple_param);
    self.separate_bodies.push((separate_body, node.loc));
  }

  fn exit_func_node(&mut self, _node: &mut FuncNode) {
    self.separate_bodies.pop();
    self.decl_stack.pop();
    self.jump_stack.pop();
    self.pop_scope();
    self.strict_stack.pop();
  }

  fn enter_func_body(&mut self, _node: &mut FuncBody) {
    if let Some((true, loc)) = self.separate_bodies.last().copied() {
      self.push_scope(ScopeKind::FunctionBody, loc);
    };
  }

  fn exit_func_body(&mut self, _node: &mut FuncBody) {
    if let Some((true, _)) = self.separate_bodies.last() {
      self.pop_scope();
    };
  }

  fn enter_class_decl_node(&mut self, node: &mut ClassDeclNode) {
    let exported = node.stx.export && !node.stx.export_default;
    if let Some(name) = node.stx.name.as_mut() {
      let ctx = DeclContext {
        kind: SymbolKind::Class,
        exported,
      };
      let result = self.declare(&name.stx.name, ctx, name.loc);
      self.declare_name_node(name, result);
    };
    self.strict_stack.push(true);
    self.push_scope(ScopeKind::Class, node.loc);
  }

  fn exit_class_decl_node(&mut self, _node: &mut ClassDeclNode) {
    self.pop_scope();
    self.strict_stack.pop();
  }

  fn enter_class_expr_node(&mut self, node: &mut ClassExprNode) {
    self.strict_stack.push(true);
    if let Some(name) = node.stx.name.as_mut() {
      self.push_scope(ScopeKind::ClassExpressionName, node.loc);
      let scope = self.current_scope();
      let result = self.builder.bind(
        scope,
        &name.stx.name,
        SymbolKind::ClassExpressionName,
        BindingClass::Lexical,
        name.loc,
      );
      self.declare_name_node(name, result);
    };
    self.push_scope(ScopeKind::Class, node.loc);
  }

  fn exit_class_expr_node(&mut self, node: &mut ClassExprNode) {
    self.pop_scope();
    if node.stx.name.is_some() {
      self.pop_scope();
    };
    self.strict_stack.pop();
  }

  fn enter_class_static_block_node(&mut self, node: &mut ClassStaticBlockNode) {
    self.push_scope(ScopeKind::StaticBlock, node.loc);
    self.jump_stack.push(JumpContext::default());
  }

  fn exit_class_static_block_node(&mut self, _node: &mut ClassStaticBlockNode) {
    self.jump_stack.pop();
    self.pop_scope();
  }

  fn enter_block_stmt_node(&mut self, node: &mut BlockStmtNode) {
    self.push_scope(ScopeKind::Block, node.loc);
  }

  fn exit_block_stmt_node(&mut self, _node: &mut BlockStmtNode) {
    self.pop_scope();
  }

  fn enter_catch_block_node(&mut self, node: &mut CatchBlockNode) {
    self.push_scope(ScopeKind::Catch, node.loc);
    self.decl_stack.push(DeclContext {
      kind: SymbolKind::CatchParam,
      exported: false,
    });
  }

  fn exit_catch_block_node(&mut self, _node: &mut CatchBlockNode) {
    self.decl_stack.pop();
    self.pop_scope();
  }

  fn enter_for_triple_stmt_node(&mut self, node: &mut ForTripleStmtNode) {
    self.enter_loop(node.loc);
  }

  fn exit_for_triple_stmt_node(&mut self, _node: &mut ForTripleStmtNode) {
    self.exit_loop();
  }

  fn enter_for_in_stmt_node(&mut self, node: &mut ForInStmtNode) {
    self.enter_loop(node.loc);
  }

  fn exit_for_in_stmt_node(&mut self, _node: &mut ForInStmtNode) {
    self.exit_loop();
  }

  fn enter_for_of_stmt_node(&mut self, node: &mut ForOfStmtNode) {
    self.enter_loop(node.loc);
  }

  fn exit_for_of_stmt_node(&mut self, _node: &mut ForOfStmtNode) {
    self.exit_loop();
  }

  fn enter_while_stmt_node(&mut self, _node: &mut WhileStmtNode) {
    self.jumps().loops += 1;
  }

  fn exit_while_stmt_node(&mut self, _node: &mut WhileStmtNode) {
    self.jumps().loops -= 1;
  }

  fn enter_do_while_stmt_node(&mut self, _node: &mut DoWhileStmtNode) {
    self.jumps().loops += 1;
  }

  fn exit_do_while_stmt_node(&mut self, _node: &mut DoWhileStmtNode) {
    self.jumps().loops -= 1;
  }

  fn enter_switch_stmt_node(&mut self, node: &mut SwitchStmtNode) {
    self.jumps().switches += 1;
    self.switch_scopes.push((node.loc, None));
  }

  // The discriminant is outside the switch's scope, so the scope is only created at the first branch.
  fn enter_switch_branch_node(&mut self, _node: &mut SwitchBranchNode) {
    let Some((loc, None)) = self.switch_scopes.last().copied() else {
      return;
    };
    self.push_scope(ScopeKind::Switch, loc);
    let scope = self.current_scope();
    if let Some(last) = self.switch_scopes.last_mut() {
      last.1 = Some(scope);
    };
  }

  fn exit_switch_stmt_node(&mut self, _node: &mut SwitchStmtNode) {
    self.jumps().switches -= 1;
    if let Some((_, Some(_))) = self.switch_scopes.pop() {
      self.pop_scope();
    };
  }

  fn enter_label_stmt_node(&mut self, node: &mut LabelStmtNode) {
    let name = node.stx.name.clone();
    if self.find_label(&name).is_some() {
      self.fail(ScopeError::new(ScopeErrorType::DuplicateLabel, node.loc, Some(name.as_str())));
    };
    let mut target = &node.stx.statement;
    while let Stmt::Label(inner) = target.stx.as_ref() {
      target = &inner.stx.statement;
    }
    let is_loop = matches!(
      target.stx.as_ref(),
      Stmt::DoWhile(_) | Stmt::ForIn(_) | Stmt::ForOf(_) | Stmt::ForTriple(_) | Stmt::While(_)
    );
    let id = LabelId(self.builder.labels.len() as u32);
    self.builder.labels.push(LabelData {
      name: name.clone(),
      loc: node.loc,
      is_loop,
      references: Vec::new(),
    });
    self.jumps().labels.push((name, id));
  }

  fn exit_label_stmt_node(&mut self, _node: &mut LabelStmtNode) {
    self.jumps().labels.pop();
  }

  fn enter_break_stmt_node(&mut self, node: &mut BreakStmtNode) {
    match node.stx.label.clone() {
      Some(label) => match self.find_label(&label) {
        Some(id) => {
          self.builder.labels[id.0 as usize].references.push(node.loc);
          node.assoc.set(LabelRef(id));
        }
        None => self.fail(ScopeError::new(ScopeErrorType::UnknownLabel, node.loc, Some(label.as_str()))),
      },
      None => {
        let jumps = self.jumps();
        if jumps.loops == 0 && jumps.switches == 0 {
          self.fail(ScopeError::new(ScopeErrorType::BreakOutsideLoop, node.loc, None));
        };
      }
    };
  }

  fn enter_continue_stmt_node(&mut self, node: &mut ContinueStmtNode) {
    if self.jumps().loops == 0 {
      self.fail(ScopeError::new(ScopeErrorType::ContinueOutsideLoop, node.loc, None));
      return;
    };
    let Some(label) = node.stx.label.clone() else {
      return;
    };
    match self.find_label(&label) {
      Some(id) if !self.builder.labels[id.0 as usize].is_loop => {
        self.fail(ScopeError::new(ScopeErrorType::ContinueToNonLoopLabel, node.loc, Some(label.as_str())));
      }
      Some(id) => {
        self.builder.labels[id.0 as usize].references.push(node.loc);
        node.assoc.set(LabelRef(id));
      }
      None => self.fail(ScopeError::new(ScopeErrorType::UnknownLabel, node.loc, Some(label.as_str()))),
    };
  }
}

fn is_simple_param(param: &Node<ParamDecl>) -> bool {
  !param.stx.rest
    && param.stx.default_value.is_none()
    && matches!(param.stx.pattern.stx.pat.stx.as_ref(), Pat::Id(_))
}

/// Builds the scope tree and declares every binding, attaching a [`ScopeId`] to every node. References are left unresolved; see [`crate::resolve`].
pub fn declare(top_level: &mut Node<TopLevel>, mode: TopLevelMode) -> ScopeResult<Resolution> {
  let kind = match mode {
    TopLevelMode::Global => ScopeKind::Global,
    TopLevelMode::Module => ScopeKind::Module,
  };
  let strict = mode == TopLevelMode::Module || top_level.assoc.has::<StrictMode>();
  let mut visitor = DeclareVisitor {
    builder: ScopeBuilder::new(kind, top_level.loc),
    scope_stack: vec![ScopeId(0)],
    decl_stack: Vec::new(),
    in_pattern_decl: vec![false],
    strict_stack: vec![strict],
    jump_stack: vec![JumpContext::default()],
    func_expr_named: Vec::new(),
    switch_scopes: Vec::new(),
    separate_bodies: Vec::new(),
    hoists: Vec::new(),
    error: None,
  };
  top_level.drive_mut(&mut visitor);
  if let Some(err) = visitor.error {
    return Err(err);
  };
  let mut builder = visitor.builder;
  builder.hoist_block_functions(visitor.hoists);
  if let Some(map) = builder.compact() {
    top_level.drive_mut(&mut RenumberVisitor { map });
  };
  let resolution = builder.finish();
  tracing::debug!(
    scopes = resolution.scopes.len(),
    symbols = resolution.symbols.len(),
    labels = resolution.labels.len(),
    "declared"
  );
  Ok(resolution)
}

#[cfg(test)]
mod tests {
  use super::declare;
  use crate::error::ScopeErrorType;
  use crate::scope::ScopeKind;
  use crate::scope::SymbolKind;
  use parse_js::options::ParseOptions;
  use parse_js::options::TopLevelMode;
  use parse_js::parse;
  use parse_js::parse_with_options;

  fn err(src: &str) -> ScopeErrorType {
    let mut top = parse(src).unwrap();
    declare(&mut top, TopLevelMode::Global).unwrap_err().typ
  }

  fn ok(src: &str) {
    let mut top = parse(src).unwrap();
    if let Err(e) = declare(&mut top, TopLevelMode::Global) {
      panic!("unexpected error for {:?}: {}", src, e);
    };
  }

  #[test]
  fn builds_scope_tree() {
    let mut top = parse(
      "function outer(a) { let x; { const y = 1; } function inner(b) { var c; const d = () => { let e; }; } }",
    )
    .unwrap();
    let res = declare(&mut top, TopLevelMode::Module).unwrap();
    let root = res.scope(res.root);
    assert_eq!(root.kind, ScopeKind::Module);
    let outer = root.children[0];
    assert_eq!(res.scope(outer).kind, ScopeKind::Function);
    let outer_children = &res.scope(outer).children;
    assert_eq!(outer_children.len(), 2);
    assert_eq!(res.scope(outer_children[0]).kind, ScopeKind::Block);
    let inner = outer_children[1];
    assert_eq!(res.scope(inner).kind, ScopeKind::Function);
    assert_eq!(res.scope(res.scope(inner).children[0]).kind, ScopeKind::ArrowFunction);
    assert!(res.scope(inner).get("b").is_some());
    assert!(res.scope(inner).get("c").is_some());
  }

  #[test]
  fn var_hoists_through_blocks() {
    let mut top = parse("function f() { { for (var i = 0;;) { var j; } } }").unwrap();
    let res = declare(&mut top, TopLevelMode::Global).unwrap();
    let f = res.scope(res.root).children[0];
    let names: Vec<_> = res.scope(f).symbols.keys().cloned().collect();
    assert_eq!(names, vec!["i".to_string(), "j".to_string()]);
  }

  #[test]
  fn for_head_has_its_own_scope() {
    let mut top = parse("for (let i = 0;;) { let i; }").unwrap();
    let res = declare(&mut top, TopLevelMode::Global).unwrap();
    let for_scope = res.scope(res.root).children[0];
    assert_eq!(res.scope(for_scope).kind, ScopeKind::For);
    assert!(res.scope(for_scope).get("i").is_some());
    let body = res.scope(for_scope).children[0];
    assert!(res.scope(body).get("i").is_some());
  }

  #[test]
  fn named_expressions_get_name_scopes() {
    let mut top = parse("(function f(a) {}); (class C {});").unwrap();
    let res = declare(&mut top, TopLevelMode::Global).unwrap();
    let kinds: Vec<_> = res.scope(res.root).children.iter().map(|c| res.scope(*c).kind).collect();
    assert_eq!(kinds, vec![ScopeKind::FunctionExpressionName, ScopeKind::ClassExpressionName]);
    let fen = res.scope(res.root).children[0];
    let f = res.scope(fen).get("f").unwrap();
    assert_eq!(res.symbol(f).kind, SymbolKind::FunctionExpressionName);
    assert!(res.scope(res.root).get("f").is_none());
  }

  #[test]
  fn sloppy_block_functions_share_the_hoisted_symbol() {
    let mut top = parse("function g() { { function f() {} } }").unwrap();
    let res = declare(&mut top, TopLevelMode::Global).unwrap();
    let g = res.scope(res.root).children[0];
    let block = res.scope(g).children[0];
    assert_eq!(res.scope(block).get("f"), res.scope(g).get("f"));

    let mut top = parse("'use strict'; function g() { { function f() {} } }").unwrap();
    let res = declare(&mut top, TopLevelMode::Global).unwrap();
    let g = res.scope(res.root).children[0];
    assert!(res.scope(g).get("f").is_none());
  }

  #[test]
  fn later_lexical_declarations_stop_the_hoist() {
    let mut top = parse("{ function f() {} } let f;").unwrap();
    let res = declare(&mut top, TopLevelMode::Global).unwrap();
    let root = res.scope(res.root);
    let block = root.children[0];
    let outer = root.get("f").unwrap();
    assert_eq!(res.symbol(outer).kind, SymbolKind::Let);
    let inner = res.scope(block).get("f").unwrap();
    assert_ne!(inner, outer);
    assert_eq!(res.symbol(inner).scope, block);

    ok("function g() { { function f() {} } let f; }");
    ok("function g() { { { function f() {} } let f; } }");
    ok("function g(f) { { function f() {} } }");

    let mut top = parse("function g() { { function f() {} } var f; { function f() {} } }").unwrap();
    let res = declare(&mut top, TopLevelMode::Global).unwrap();
    let g = res.scope(res.root).children[0];
    let f = res.scope(g).get("f").unwrap();
    for block in res.scope(g).children.iter() {
      assert_eq!(res.scope(*block).get("f"), Some(f));
    }
    assert_eq!(res.symbol(f).kind, SymbolKind::Function);
    assert_eq!(res.symbol(f).declarations.len(), 3);
    assert_eq!(res.symbol_ids().filter(|s| res.symbol(*s).name == "f").count(), 1);
  }

  #[test]
  fn parameter_expressions_get_their_own_body_scope() {
    let mut top = parse("function f(a = b) { var b; var a; let c; }").unwrap();
    let res = declare(&mut top, TopLevelMode::Global).unwrap();
    let f = res.scope(res.root).children[0];
    assert_eq!(res.scope(f).kind, ScopeKind::Function);
    let body = res.scope(f).children[0];
    assert_eq!(res.scope(body).kind, ScopeKind::FunctionBody);
    assert!(res.scope(f).get("b").is_none());
    assert!(res.scope(body).get("b").is_some());
    assert!(res.scope(body).get("c").is_some());
    // The body's `a` starts with the parameter's value, so it stays the same binding.
    assert_eq!(res.scope(body).get("a"), res.scope(f).get("a"));

    let mut top = parse("function f(a, b) { var c; } (x = 1) => x; ([y]) => { var z; };").unwrap();
    let res = declare(&mut top, TopLevelMode::Global).unwrap();
    let children = &res.scope(res.root).children;
    assert!(res.scope(children[0]).children.is_empty());
    assert!(res.scope(children[1]).children.is_empty());
    let arrow_body = res.scope(children[2]).children[0];
    assert_eq!(res.scope(arrow_body).kind, ScopeKind::FunctionBody);

    assert_eq!(err("function f(a = 1) { let a; }"), ScopeErrorType::LexicalVarCollision);
    assert_eq!(err("function f(...a) { const a = 1; }"), ScopeErrorType::LexicalVarCollision);
    ok("function f(a = 1) { function a() {} }");
  }

  #[test]
  fn var_in_catch_body_shares_the_parameter_symbol() {
    let mut top = parse("function f() { try {} catch (e) { var e = 1; } return e; }").unwrap();
    let res = declare(&mut top, TopLevelMode::Global).unwrap();
    let f = res.scope(res.root).children[0];
    let catch = res.scope(f).children[1];
    assert_eq!(res.scope(catch).kind, ScopeKind::Catch);
    let e = res.scope(f).get("e").unwrap();
    assert_eq!(res.scope(catch).get("e"), Some(e));
    assert_eq!(res.symbol(e).scope, f);
    assert_eq!(res.symbol(e).declarations.len(), 2);
    assert_eq!(res.symbol_ids().filter(|s| res.symbol(*s).name == "e").count(), 1);

    let mut top = parse("try {} catch (e) { try {} catch (e) { var e; } }").unwrap();
    let res = declare(&mut top, TopLevelMode::Global).unwrap();
    let outer = res.scope(res.root).children[1];
    let inner = res.scope(outer).children[1];
    assert_ne!(res.scope(outer).get("e"), res.scope(inner).get("e"));
    assert_eq!(res.scope(inner).get("e"), res.scope(res.root).get("e"));
  }

  #[test]
  fn redeclarations() {
    assert_eq!(err("{ let x; let x; }"), ScopeErrorType::Redeclaration);
    assert_eq!(err("const a = 1; class a {}"), ScopeErrorType::Redeclaration);
    assert_eq!(err("let a; var a;"), ScopeErrorType::LexicalVarCollision);
    assert_eq!(err("{ var a; let a; }"), ScopeErrorType::LexicalVarCollision);
    assert_eq!(err("let a; { var a; }"), ScopeErrorType::LexicalVarCollision);
    assert_eq!(err("function f(a) { let a; }"), ScopeErrorType::LexicalVarCollision);
    assert_eq!(err("function f() {} let f;"), ScopeErrorType::LexicalVarCollision);
    assert_eq!(err("try {} catch (e) { let e; }"), ScopeErrorType::CatchParameterRedeclared);
    assert_eq!(err("'use strict'; { function f() {} function f() {} }"), ScopeErrorType::Redeclaration);
    ok("var a; var a; function a() {}");
    ok("function f(a) { var a; }");
    ok("try {} catch (e) { var e; }");
    ok("{ function f() {} function f() {} }");
    ok("let a; { let a; }");
    ok("(function f() { let f; })");
  }

  #[test]
  fn module_functions_are_lexical() {
    let mut top = parse_with_options("var f; function f() {}", &ParseOptions::module()).unwrap();
    assert_eq!(
      declare(&mut top, TopLevelMode::Module).unwrap_err().typ,
      ScopeErrorType::LexicalVarCollision
    );
  }

  #[test]
  fn labels() {
    assert_eq!(err("a: a: ;"), ScopeErrorType::DuplicateLabel);
    assert_eq!(err("while (1) break b;"), ScopeErrorType::UnknownLabel);
    assert_eq!(err("a: { while (1) continue a; }"), ScopeErrorType::ContinueToNonLoopLabel);
    assert_eq!(err("break;"), ScopeErrorType::BreakOutsideLoop);
    assert_eq!(err("switch (1) { case 1: continue; }"), ScopeErrorType::ContinueOutsideLoop);
    assert_eq!(err("a: while (1) { (function () { break a; }); }"), ScopeErrorType::UnknownLabel);
    ok("a: { break a; }");
    ok("a: b: while (1) { continue a; }");
    ok("a: ; a: ;");
    ok("switch (1) { case 1: break; }");

    let mut top = parse("outer: for (;;) { for (;;) continue outer; }").unwrap();
    let res = declare(&mut top, TopLevelMode::Global).unwrap();
    assert_eq!(res.labels.len(), 1);
    assert!(res.labels[0].is_loop);
    assert_eq!(res.labels[0].references.len(), 1);
  }

  #[test]
  fn exported_declarations_keep_names() {
    let mut top = parse_with_options(
      "export const a = 1; export function b() {} export default function c() {} let d;",
      &ParseOptions::module(),
    )
    .unwrap();
    let res = declare(&mut top, TopLevelMode::Module).unwrap();
    let root = res.scope(res.root);
    let exported = |name: &str| res.symbol(root.get(name).unwrap()).exported;
    assert!(exported("a"));
    assert!(exported("b"));
    assert!(!exported("c"));
    assert!(!exported("d"));
  }
}
