//! Rewriting the tree in place.
//!
//! Read-only and in-place visiting is done with derive-visitor's `Visitor`/`VisitorMut` directly, as every node type derives `Drive`/`DriveMut`. This module adds whole-node replacement on top: a [`Transformer`] receives each expression, pattern and statement by value after its children have been transformed, and returns its replacement.

use super::expr::pat::Pat;
use super::expr::Expr;
use super::expr::ThisExpr;
use super::node::Node;
use super::stmt::EmptyStmt;
use super::stmt::Stmt;
use crate::loc::Loc;
use derive_visitor::DriveMut;
use derive_visitor::Event;
use derive_visitor::VisitorMut;
use std::any::Any;
use std::mem;

pub trait Transformer {
  fn transform_expr(&mut self, node: Node<Expr>) -> Node<Expr> {
    node
  }

  fn transform_pat(&mut self, node: Node<Pat>) -> Node<Pat> {
    node
  }

  fn transform_stmt(&mut self, node: Node<Stmt>) -> Node<Stmt> {
    node
  }
}

struct TransformVisitor<'t, T: Transformer> {
  transformer: &'t mut T,
}

// Cheap stand-ins that occupy a slot while its node is being transformed.
fn placeholder_expr(loc: Loc) -> Node<Expr> {
  Node::new(loc, ThisExpr {}).into_wrapped()
}

fn placeholder_pat(loc: Loc) -> Node<Pat> {
  Node::new(loc, Pat::AssignTarget(placeholder_expr(loc)))
}

fn placeholder_stmt(loc: Loc) -> Node<Stmt> {
  Node::new(loc, EmptyStmt {}).into_wrapped()
}

impl<'t, T: Transformer> VisitorMut for TransformVisitor<'t, T> {
  fn visit(&mut self, item: &mut dyn Any, event: Event) {
    // Post-order, so that replacements are never visited again.
    if !matches!(event, Event::Exit) {
      return;
    };
    if let Some(node) = item.downcast_mut::<Node<Expr>>() {
      let placeholder = placeholder_expr(node.loc);
      let old = mem::replace(node, placeholder);
      *node = self.transformer.transform_expr(old);
    } else if let Some(node) = item.downcast_mut::<Node<Pat>>() {
      let placeholder = placeholder_pat(node.loc);
      let old = mem::replace(node, placeholder);
      *node = self.transformer.transform_pat(old);
    } else if let Some(node) = item.downcast_mut::<Node<Stmt>>() {
      let placeholder = placeholder_stmt(node.loc);
      let old = mem::replace(node, placeholder);
      *node = self.transformer.transform_stmt(old);
    };
  }
}

/// Transforms every expression, pattern and statement within `node`, bottom-up.
pub fn transform<S: DriveMut, T: Transformer>(node: &mut S, transformer: &mut T) {
  let mut visitor = TransformVisitor { transformer };
  node.drive_mut(&mut visitor);
}
