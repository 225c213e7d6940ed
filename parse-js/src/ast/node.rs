use std::any::{Any, TypeId};
use ahash::HashMap;
use derive_visitor::{Drive, DriveMut};
use std::fmt::{Debug, Formatter};
use std::fmt;
use serde::{Serialize, Serializer};
use crate::error::{SyntaxError, SyntaxErrorType};
use crate::loc::Loc;

/// Side data attached to a node, keyed by type. Later passes (scope resolution, mangling) use this to annotate the tree without changing node types.
///
/// It's visited as its own item after the node's syntax, so a visitor can handle `NodeAssocData` to see every node.
#[derive(Default, Drive, DriveMut)]
pub struct NodeAssocData {
  // Bounded by Send + Sync so that trees can be moved across threads.
  #[drive(skip)]
  map: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl NodeAssocData {
  pub fn get<T: Any>(&self) -> Option<&T> {
    let t = TypeId::of::<T>();
    self.map.get(&t).and_then(|v| v.downcast_ref())
  }

  pub fn get_mut<T: Any>(&mut self) -> Option<&mut T> {
    let t = TypeId::of::<T>();
    self.map.get_mut(&t).and_then(|v| v.downcast_mut())
  }

  pub fn has<T: Any>(&self) -> bool {
    self.map.contains_key(&TypeId::of::<T>())
  }

  pub fn set<T: Any + Send + Sync>(&mut self, v: T) {
    let t = TypeId::of::<T>();
    self.map.insert(t, Box::from(v));
  }

  pub fn take<T: Any>(&mut self) -> Option<T> {
    let t = TypeId::of::<T>();
    let v = self.map.remove(&t)?;
    v.downcast().ok().map(|b| *b)
  }

  pub fn len(&self) -> usize {
    self.map.len()
  }

  pub fn is_empty(&self) -> bool {
    self.map.is_empty()
  }
}

#[derive(Drive, DriveMut)]
pub struct Node<S: Drive + DriveMut> {
  // A location is not a SourceRange; after some transformations, it's possible to create entirely new nodes that don't exist at all in the source code, so locations may be approximate.
  #[drive(skip)]
  pub loc: Loc,
  pub stx: Box<S>,
  pub assoc: NodeAssocData,
}

impl<S: Drive + DriveMut> Node<S> {
  pub fn new(loc: Loc, stx: S) -> Node<S> {
    Node {
      loc,
      stx: Box::new(stx),
      assoc: NodeAssocData::default(),
    }
  }

  pub fn into_stx<T: From<S> + Drive + DriveMut>(self) -> Node<T> {
    Node {
      loc: self.loc,
      stx: Box::new(T::from(*self.stx)),
      assoc: self.assoc,
    }
  }

  /// Maps the syntax, keeping the location and associated data.
  pub fn map_stx<T: Drive + DriveMut, F: FnOnce(S) -> T>(self, f: F) -> Node<T> {
    Node {
      loc: self.loc,
      stx: Box::new(f(*self.stx)),
      assoc: self.assoc,
    }
  }

  /// Maps the syntax, copying the location but not the associated data.
  pub fn derive_stx<T: Drive + DriveMut, F: FnOnce(&S) -> T>(&self, f: F) -> Node<T> {
    Node {
      loc: self.loc,
      stx: Box::new(f(&self.stx)),
      assoc: NodeAssocData::default(),
    }
  }

  /// Wraps the node inside another node with the same loc, with syntax derived from the provided callback.
  pub fn wrap<T: Drive + DriveMut, F: FnOnce(Node<S>) -> T>(self, f: F) -> Node<T> {
    let loc = self.loc;
    let stx = f(self);
    Node::new(loc, stx)
  }

  /// Wraps the node in the enum variant of `T` that holds `Node<S>`, e.g. `Node<IdExpr>` into `Node<Expr>`.
  pub fn into_wrapped<T: From<Node<S>> + Drive + DriveMut>(self) -> Node<T> {
    self.wrap(T::from)
  }

  /// Create an error at this node's location.
  pub fn error(&self, typ: SyntaxErrorType) -> SyntaxError {
    self.loc.error(typ, None)
  }
}

impl<S: Debug + Drive + DriveMut> Debug for Node<S> {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    self.stx.fmt(f)
  }
}

impl<S: Serialize + Drive + DriveMut> Serialize for Node<S> {
  fn serialize<Se: Serializer>(&self, serializer: Se) -> Result<Se::Ok, Se::Error> {
    self.stx.serialize(serializer)
  }
}

// Markers set by the parser.

/// The expression was written inside parentheses, e.g. `(a)`. Parenthesised patterns are not valid destructuring targets.
#[derive(Clone, Copy, Debug)]
pub struct ParenthesizedExpr;

/// An array or object literal had a trailing comma after a spread, e.g. `[...a,]`, which can't become a rest element.
#[derive(Clone, Copy, Debug)]
pub struct TrailingCommaAfterSpread;

/// An array or object literal contains syntax that is only valid once the literal is reinterpreted as a pattern, e.g. `{a = 1}`. Holds the error to raise if it stays an expression.
#[derive(Clone, Debug)]
pub struct InvalidOutsidePattern(pub SyntaxError);

/// A string or template contained a legacy octal escape like `\01` at this location.
#[derive(Clone, Copy, Debug)]
pub struct LegacyOctalEscapeSequence(pub Loc);

/// Set on `TopLevel` and `Func` nodes whose code is strict, whether from a `"use strict"` directive, an enclosing strict context, or module code.
#[derive(Clone, Copy, Debug)]
pub struct StrictMode;

/// The identifier was written with a unicode escape sequence.
#[derive(Clone, Copy, Debug)]
pub struct EscapedIdentifier;
