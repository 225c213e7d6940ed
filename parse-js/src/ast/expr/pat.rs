use derive_more::derive::{From, TryInto};
use derive_visitor::{Drive, DriveMut};
use serde::Serialize;

use crate::ast::{class_or_object::ClassOrObjKey, node::Node};

use super::Expr;

#[derive(Debug, Drive, DriveMut, From, Serialize, TryInto)]
#[serde(tag = "$t")]
pub enum Pat {
  Arr(Node<ArrPat>),
  Id(Node<IdPat>),
  Obj(Node<ObjPat>),
  // Only in assignments and for-in/of heads, never declarations, e.g. `[a.b] = c`.
  AssignTarget(Node<Expr>),
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ArrPatElem {
  pub target: Node<Pat>,
  pub default_value: Option<Node<Expr>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ArrPat {
  // Unnamed elements can exist.
  pub elements: Vec<Option<ArrPatElem>>,
  pub rest: Option<Node<Pat>>,
}

// Not really a pattern but functions similarly so kept here in pat.rs.
// This exists as a separate AST node type for easy replacement when mangling.
#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ClassOrFuncName {
  #[drive(skip)]
  pub name: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct IdPat {
  #[drive(skip)]
  pub name: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ObjPat {
  pub properties: Vec<Node<ObjPatProp>>,
  pub rest: Option<Node<Pat>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct ObjPatProp {
  pub key: ClassOrObjKey,
  // If `shorthand`, `key` is Direct and `target` is an IdPat of the same name. This way, there is always an IdPat that exists and can be visited, instead of also having to consider the direct key as an identifier if shorthand.
  pub target: Node<Pat>,
  #[drive(skip)]
  pub shorthand: bool,
  pub default_value: Option<Node<Expr>>,
}
