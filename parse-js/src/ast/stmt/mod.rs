pub mod decl;

use decl::{ClassDecl, FuncDecl, PatDecl, VarDecl, VarDeclMode};
use derive_more::derive::{From, TryInto};
use derive_visitor::{Drive, DriveMut};
use serde::Serialize;

use super::{expr::{pat::Pat, Expr}, import_export::{ExportNames, ImportNames}, node::Node};

// We must wrap each variant with Node<T> as otherwise we won't be able to visit Node<T> instead of just T.
#[derive(Debug, Drive, DriveMut, From, Serialize, TryInto)]
#[serde(tag = "$t")]
pub enum Stmt {
  Block(Node<BlockStmt>),
  Break(Node<BreakStmt>),
  Continue(Node<ContinueStmt>),
  Debugger(Node<DebuggerStmt>),
  DoWhile(Node<DoWhileStmt>),
  Empty(Node<EmptyStmt>),
  ExportDefaultExpr(Node<ExportDefaultExprStmt>),
  ExportList(Node<ExportListStmt>),
  Expr(Node<ExprStmt>),
  ForIn(Node<ForInStmt>),
  ForOf(Node<ForOfStmt>),
  ForTriple(Node<ForTripleStmt>),
  If(Node<IfStmt>),
  Import(Node<ImportStmt>),
  Label(Node<LabelStmt>),
  Return(Node<ReturnStmt>),
  Switch(Node<SwitchStmt>),
  Throw(Node<ThrowStmt>),
  Try(Node<TryStmt>),
  While(Node<WhileStmt>),
  With(Node<WithStmt>),
  ClassDecl(Node<ClassDecl>),
  FunctionDecl(Node<FuncDecl>),
  VarDecl(Node<VarDecl>),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct CatchBlock {
  pub parameter: Option<Node<PatDecl>>,
  pub body: Vec<Node<Stmt>>, // We don't want to use BlockStmt as the new block scope starts with the parameter, not the braces. This differentiation ensures BlockStmt specifically means a new scope, helpful for downstream usages. See also: FuncBody.
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct SwitchBranch {
  // If None, it's `default`.
  pub case: Option<Node<Expr>>,
  pub body: Vec<Node<Stmt>>,
}

// Statements.

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct BlockStmt {
  pub body: Vec<Node<Stmt>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct BreakStmt {
  #[drive(skip)]
  pub label: Option<String>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ContinueStmt {
  #[drive(skip)]
  pub label: Option<String>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct DebuggerStmt {}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct DoWhileStmt {
  pub condition: Node<Expr>,
  pub body: Node<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct EmptyStmt {}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ExportDefaultExprStmt {
  pub expression: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ExportListStmt {
  pub names: ExportNames,
  #[drive(skip)]
  pub from: Option<String>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ExprStmt {
  pub expr: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct IfStmt {
  pub test: Node<Expr>,
  pub consequent: Node<Stmt>,
  pub alternate: Option<Node<Stmt>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ImportStmt {
  // PatDecl always contains IdPat.
  pub default: Option<Node<PatDecl>>,
  pub names: Option<ImportNames>,
  #[drive(skip)]
  pub module: String,
}

// The head of a `for` loop starts a scope that also contains the body. The body is a plain statement, so a block body gets its own nested scope, and `for (let i;;) { let i; }` is legal.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ForTripleStmt {
  pub init: ForTripleStmtInit,
  pub cond: Option<Node<Expr>>,
  pub post: Option<Node<Expr>>,
  pub body: Node<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum ForTripleStmtInit {
  None,
  Expr(Node<Expr>),
  Decl(Node<VarDecl>),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum ForInOfLhs {
  // Assignment target.
  Assign(Node<Pat>),
  // Scoped variable declaration.
  Decl {
    mode: VarDeclMode,
    pat: Node<PatDecl>,
  },
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ForInStmt {
  pub lhs: ForInOfLhs,
  pub rhs: Node<Expr>,
  pub body: Node<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ForOfStmt {
  #[drive(skip)]
  pub await_: bool,
  pub lhs: ForInOfLhs,
  pub rhs: Node<Expr>,
  pub body: Node<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LabelStmt {
  #[drive(skip)]
  pub name: String,
  pub statement: Node<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ReturnStmt {
  pub value: Option<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct SwitchStmt {
  pub test: Node<Expr>,
  pub branches: Vec<Node<SwitchBranch>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ThrowStmt {
  pub value: Node<Expr>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct TryStmt {
  pub wrapped: Node<BlockStmt>,
  // One of these must be present.
  pub catch: Option<Node<CatchBlock>>,
  pub finally: Option<Node<BlockStmt>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct WhileStmt {
  pub condition: Node<Expr>,
  pub body: Node<Stmt>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct WithStmt {
  pub object: Node<Expr>,
  pub body: Node<Stmt>,
}
