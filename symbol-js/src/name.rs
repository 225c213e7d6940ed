use crate::scope::Resolution;
use crate::scope::SymbolId;
use ahash::HashSet;
use derive_visitor::Drive;
use derive_visitor::Visitor;
use once_cell::sync::Lazy;
use parse_js::ast::class_or_object::ClassOrObjMemberDirectKey;
use parse_js::ast::class_or_object::ObjMember;
use parse_js::ast::class_or_object::ObjMemberType;
use parse_js::ast::expr::pat::ClassOrFuncName;
use parse_js::ast::expr::pat::IdPat;
use parse_js::ast::expr::ClassExpr;
use parse_js::ast::expr::FuncExpr;
use parse_js::ast::expr::IdExpr;
use parse_js::ast::expr::MemberExpr;
use parse_js::ast::expr::NewExpr;
use parse_js::ast::expr::ThisExpr;
use parse_js::ast::node::Node;
use parse_js::ast::node::NodeAssocData;
use parse_js::ast::stmt::decl::ClassDecl;
use parse_js::ast::stmt::decl::FuncDecl;
use parse_js::ast::stmt::decl::VarDecl;
use parse_js::ast::stmt::decl::VarDeclMode;
use parse_js::ast::stmt::ForInStmt;
use parse_js::ast::stmt::ForOfStmt;
use parse_js::ast::stmt::ForTripleStmt;
use parse_js::ast::stmt::IfStmt;
use parse_js::ast::stmt::ReturnStmt;
use parse_js::ast::stmt::WhileStmt;
use parse_js::ast::stx::TopLevel;
use parse_js::lex::KEYWORDS_MAPPING;
use std::cmp::Reverse;

// First characters cannot be numbers.
const FIRST_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ$_";
const OTHER_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ$_0123456789";

/// Words a generated name must never be: all keywords (including contextual ones), `eval` and `arguments`.
pub static RESERVED_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  let mut set: HashSet<&'static str> = KEYWORDS_MAPPING.values().copied().collect();
  set.insert("eval");
  set.insert("arguments");
  set
});

pub fn is_reserved_word(name: &str) -> bool {
  RESERVED_WORDS.contains(name)
}

/// Counts characters of the text that stays as is after mangling, so that generated names can reuse the most common ones and compress better.
#[derive(Clone)]
pub struct CharFrequency {
  counts: [usize; 128],
}

impl Default for CharFrequency {
  fn default() -> Self {
    CharFrequency { counts: [0; 128] }
  }
}

impl CharFrequency {
  pub fn add(&mut self, text: &str) {
    for b in text.bytes().filter(|b| b.is_ascii()) {
      self.counts[b as usize] += 1;
    }
  }

  pub fn count(&self, c: u8) -> usize {
    self.counts.get(c as usize).copied().unwrap_or(0)
  }

  /// Counts keywords implied by statements and expressions, property names, and identifiers for which `kept` returns true or that have no symbol.
  pub fn scan(top_level: &Node<TopLevel>, res: &Resolution, kept: &dyn Fn(SymbolId) -> bool) -> CharFrequency {
    let mut visitor = FrequencyVisitor {
      freq: CharFrequency::default(),
      res,
      kept,
    };
    top_level.drive(&mut visitor);
    visitor.freq
  }

  // Sorting is stable, so ties keep their default order.
  fn sorted(&self, alphabet: &[u8]) -> Vec<u8> {
    let mut chars = alphabet.to_vec();
    chars.sort_by_key(|c| Reverse(self.count(*c)));
    chars
  }
}

type ClassDeclNode = Node<ClassDecl>;
type ClassExprNode = Node<ClassExpr>;
type ClassOrFuncNameNode = Node<ClassOrFuncName>;
type ClassOrObjMemberDirectKeyNode = Node<ClassOrObjMemberDirectKey>;
type ForInStmtNode = Node<ForInStmt>;
type ForOfStmtNode = Node<ForOfStmt>;
type ForTripleStmtNode = Node<ForTripleStmt>;
type FuncDeclNode = Node<FuncDecl>;
type FuncExprNode = Node<FuncExpr>;
type IdExprNode = Node<IdExpr>;
type IdPatNode = Node<IdPat>;
type IfStmtNode = Node<IfStmt>;
type MemberExprNode = Node<MemberExpr>;
type NewExprNode = Node<NewExpr>;
type ObjMemberNode = Node<ObjMember>;
type ReturnStmtNode = Node<ReturnStmt>;
type ThisExprNode = Node<ThisExpr>;
type VarDeclNode = Node<VarDecl>;
type WhileStmtNode = Node<WhileStmt>;

#[derive(Visitor)]
#[visitor(
  ClassDeclNode(enter),
  ClassExprNode(enter),
  ClassOrFuncNameNode(enter),
  ClassOrObjMemberDirectKeyNode(enter),
  ForInStmtNode(enter),
  ForOfStmtNode(enter),
  ForTripleStmtNode(enter),
  FuncDeclNode(enter),
  FuncExprNode(enter),
  IdExprNode(enter),
  IdPatNode(enter),
  IfStmtNode(enter),
  MemberExprNode(enter),
  NewExprNode(enter),
  ObjMemberNode(enter),
  ReturnStmtNode(enter),
  ThisExprNode(enter),
  VarDeclNode(enter),
  WhileStmtNode(enter)
)]
struct FrequencyVisitor<'a> {
  freq: CharFrequency,
  res: &'a Resolution,
  kept: &'a dyn Fn(SymbolId) -> bool,
}

impl<'a> FrequencyVisitor<'a> {
  fn add_identifier(&mut self, assoc: &NodeAssocData, name: &str) {
    if self.res.symbol_of(assoc).map_or(true, |s| (self.kept)(s)) {
      self.freq.add(name);
    };
  }

  fn enter_id_expr_node(&mut self, node: &IdExprNode) {
    self.add_identifier(&node.assoc, &node.stx.name);
  }

  fn enter_id_pat_node(&mut self, node: &IdPatNode) {
    self.add_identifier(&node.assoc, &node.stx.name);
  }

  fn enter_class_or_func_name_node(&mut self, node: &ClassOrFuncNameNode) {
    self.add_identifier(&node.assoc, &node.stx.name);
  }

  fn enter_member_expr_node(&mut self, node: &MemberExprNode) {
    self.freq.add(&node.stx.right);
  }

  fn enter_class_or_obj_member_direct_key_node(&mut self, node: &ClassOrObjMemberDirectKeyNode) {
    self.freq.add(&node.stx.key);
  }

  // A shorthand's name stays as the property key once the binding is renamed.
  fn enter_obj_member_node(&mut self, node: &ObjMemberNode) {
    if let ObjMemberType::Shorthand { id } = &node.stx.typ {
      self.freq.add(&id.stx.name);
    };
  }

  fn enter_var_decl_node(&mut self, node: &VarDeclNode) {
    self.freq.add(match node.stx.mode {
      VarDeclMode::Const => "const",
      VarDeclMode::Let => "let",
      VarDeclMode::Var => "var",
    });
  }

  fn enter_class_decl_node(&mut self, _node: &ClassDeclNode) {
    self.freq.add("class");
  }

  fn enter_class_expr_node(&mut self, _node: &ClassExprNode) {
    self.freq.add("class");
  }

  fn enter_func_decl_node(&mut self, _node: &FuncDeclNode) {
    self.freq.add("function");
  }

  fn enter_func_expr_node(&mut self, _node: &FuncExprNode) {
    self.freq.add("function");
  }

  fn enter_for_in_stmt_node(&mut self, _node: &ForInStmtNode) {
    self.freq.add("forin");
  }

  fn enter_for_of_stmt_node(&mut self, _node: &ForOfStmtNode) {
    self.freq.add("forof");
  }

  fn enter_for_triple_stmt_node(&mut self, _node: &ForTripleStmtNode) {
    self.freq.add("for");
  }

  fn enter_if_stmt_node(&mut self, node: &IfStmtNode) {
    self.freq.add("if");
    if node.stx.alternate.is_some() {
      self.freq.add("else");
    };
  }

  fn enter_new_expr_node(&mut self, _node: &NewExprNode) {
    self.freq.add("new");
  }

  fn enter_return_stmt_node(&mut self, _node: &ReturnStmtNode) {
    self.freq.add("return");
  }

  fn enter_this_expr_node(&mut self, _node: &ThisExprNode) {
    self.freq.add("this");
  }

  fn enter_while_stmt_node(&mut self, _node: &WhileStmtNode) {
    self.freq.add("while");
  }
}

/// Generates identifiers shortest first. `nth` is a bijection from `usize` to valid identifier names over the generator's alphabet; it doesn't skip keywords.
#[derive(Clone, Debug)]
pub struct NameGenerator {
  first: Vec<u8>,
  other: Vec<u8>,
}

impl Default for NameGenerator {
  fn default() -> Self {
    NameGenerator {
      first: FIRST_CHARS.to_vec(),
      other: OTHER_CHARS.to_vec(),
    }
  }
}

impl NameGenerator {
  /// Orders the alphabet by descending frequency.
  pub fn from_frequency(freq: &CharFrequency) -> NameGenerator {
    NameGenerator {
      first: freq.sorted(FIRST_CHARS),
      other: freq.sorted(OTHER_CHARS),
    }
  }

  pub fn nth(&self, mut n: usize) -> String {
    let mut name = String::new();
    name.push(self.first[n % self.first.len()] as char);
    n /= self.first.len();
    while n > 0 {
      n -= 1;
      name.push(self.other[n % self.other.len()] as char);
      n /= self.other.len();
    }
    name
  }

  /// The first name at or after `*counter` that isn't a reserved word and for which `taken` is false. Advances `counter` past it.
  pub fn next_available(&self, counter: &mut usize, taken: impl Fn(&str) -> bool) -> String {
    loop {
      let name = self.nth(*counter);
      *counter += 1;
      if !is_reserved_word(&name) && !taken(&name) {
        return name;
      };
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::resolve;
  use parse_js::options::TopLevelMode;
  use parse_js::parse;

  #[test]
  fn nth_is_shortest_first() {
    let gen = NameGenerator::default();
    assert_eq!(gen.nth(0), "a");
    assert_eq!(gen.nth(25), "z");
    assert_eq!(gen.nth(26), "A");
    assert_eq!(gen.nth(53), "_");
    assert_eq!(gen.nth(54), "aa");
    assert_eq!(gen.nth(55), "ba");
    assert_eq!(gen.nth(54 + 54 * 64 - 1).len(), 2);
    assert_eq!(gen.nth(54 + 54 * 64).len(), 3);
  }

  #[test]
  fn nth_never_repeats() {
    let gen = NameGenerator::default();
    let names: std::collections::HashSet<_> = (0..20_000).map(|n| gen.nth(n)).collect();
    assert_eq!(names.len(), 20_000);
    assert!(names.iter().all(|n| !n.as_bytes()[0].is_ascii_digit()));
  }

  #[test]
  fn skips_reserved_words() {
    let mut freq = CharFrequency::default();
    freq.add("iiiifff");
    let gen = NameGenerator::from_frequency(&freq);
    assert_eq!(gen.nth(0), "i");
    assert_eq!(gen.nth(1), "f");
    assert_eq!(gen.nth(gen.first.len()), "ii");
    assert_eq!(gen.nth(gen.first.len() + 1), "fi");
    let mut counter = 2 * gen.first.len();
    assert_eq!(gen.nth(counter), "if");
    assert_eq!(gen.next_available(&mut counter, |_| false), "ff");
    assert_eq!(counter, 2 * gen.first.len() + 2);
  }

  #[test]
  fn frequency_prefers_kept_text() {
    let mut top = parse("let zq = 1; o.zzzzzzzz; function f(yyy) { return yyy; }").unwrap();
    let res = resolve(&mut top, TopLevelMode::Global).unwrap();
    let freq = CharFrequency::scan(&top, &res, &|_| false);
    assert_eq!(freq.count(b'z'), 8);
    assert_eq!(freq.count(b'y'), 0);
    let gen = NameGenerator::from_frequency(&freq);
    assert_eq!(gen.nth(0), "z");

    let freq = CharFrequency::scan(&top, &res, &|_| true);
    assert_eq!(freq.count(b'y'), 6);
  }
}
