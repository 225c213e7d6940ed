use derive_visitor::{Drive, DriveMut};
use serde::Serialize;

use crate::{ast::{class_or_object::ObjMember, node::Node}, num::JsNumber};

use super::Expr;


#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum LitArrElem {
  Single(Node<Expr>),
  Rest(Node<Expr>),
  Empty,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitArrExpr {
  pub elements: Vec<LitArrElem>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitBigIntExpr {
  // Decimal digits, without the `n` suffix.
  #[drive(skip)]
  pub value: String,
  #[drive(skip)]
  pub raw: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitBoolExpr {
  #[drive(skip)]
  pub value: bool,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitNullExpr {}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitNumExpr {
  #[drive(skip)]
  pub value: JsNumber,
  #[drive(skip)]
  pub raw: String,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitObjExpr {
  pub members: Vec<Node<ObjMember>>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitRegexExpr {
  #[drive(skip)]
  pub value: String, // Including delimiter slashes and any flags.
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitStrExpr {
  // Cooked.
  #[drive(skip)]
  pub value: String,
  // Source text including quotes.
  #[drive(skip)]
  pub raw: String,
}

impl LitStrExpr {
  pub fn quote(&self) -> Option<char> {
    self.raw.chars().next()
  }
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub struct LitTemplateExpr {
  pub parts: Vec<LitTemplatePart>,
}

#[derive(Debug, Drive, DriveMut, Serialize)]
pub enum LitTemplatePart {
  Substitution(Node<Expr>),
  String {
    // None in tagged templates with an invalid escape.
    #[drive(skip)]
    cooked: Option<String>,
    // Line terminators are normalised to `\n`.
    #[drive(skip)]
    raw: String,
  },
}
