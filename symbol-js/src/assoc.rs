//! Data attached to `parse-js` nodes by the resolver, and helpers to read it back.
//!
//! Every node gets the [`ScopeId`] it's in. A node that creates a scope (a function, block, class body, etc.) carries the scope it creates.

use crate::scope::LabelId;
use crate::scope::ScopeId;
use crate::scope::SymbolId;
use parse_js::ast::node::NodeAssocData;

/// Set on identifier patterns and class/function names that declare a binding.
#[derive(Clone, Copy, Debug)]
pub struct DeclaredSymbol(pub SymbolId);

/// Set on identifier expressions, non-declaring identifier patterns and local export names.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedSymbol(pub SymbolId);

/// Set on `break` and `continue` statements with a label.
#[derive(Clone, Copy, Debug)]
pub struct LabelRef(pub LabelId);

pub fn scope_id(assoc: &NodeAssocData) -> Option<ScopeId> {
  assoc.get::<ScopeId>().copied()
}

pub fn declared_symbol(assoc: &NodeAssocData) -> Option<SymbolId> {
  assoc.get::<DeclaredSymbol>().map(|d| d.0)
}

pub fn resolved_symbol(assoc: &NodeAssocData) -> Option<SymbolId> {
  assoc.get::<ResolvedSymbol>().map(|r| r.0)
}

pub fn label_ref(assoc: &NodeAssocData) -> Option<LabelId> {
  assoc.get::<LabelRef>().map(|l| l.0)
}
