use crate::loc::Loc;
use crate::token::Comment;
use crate::token::CommentKind;
use std::collections::BTreeMap;

/// All comments of a source file, indexed by the start offset of the token that follows them. Attached to the `TopLevel` node.
#[derive(Debug, Default)]
pub struct CommentIndex {
  comments: Vec<Comment>,
  // Token start offset to a range in `comments`.
  by_token: BTreeMap<usize, (usize, usize)>,
}

impl CommentIndex {
  /// Records the comments that appeared before the token starting at `token_start`. Tokens may be lexed more than once, so repeated calls for the same token are ignored.
  pub fn record(&mut self, token_start: usize, comments: &[Comment]) {
    if comments.is_empty() || self.by_token.contains_key(&token_start) {
      return;
    };
    let start = self.comments.len();
    self.comments.extend_from_slice(comments);
    self.by_token.insert(token_start, (start, self.comments.len()));
  }

  /// Comments immediately before a node, i.e. before its first token.
  pub fn leading(&self, loc: Loc) -> &[Comment] {
    match self.by_token.get(&loc.0) {
      Some(&(start, end)) => &self.comments[start..end],
      None => &[],
    }
  }

  /// Comments immediately after a node, i.e. before the next token at or after its end.
  pub fn trailing(&self, loc: Loc) -> &[Comment] {
    match self.by_token.range(loc.1..).next() {
      // Only if there's no token between the node end and the comments.
      Some((_, &(start, end))) if self.comments[start].loc.0 >= loc.1 => &self.comments[start..end],
      _ => &[],
    }
  }

  /// All comments in source order.
  pub fn all(&self) -> Vec<Comment> {
    let mut all = self.comments.clone();
    all.sort_by_key(|c| c.loc);
    all
  }

  pub fn len(&self) -> usize {
    self.comments.len()
  }

  pub fn is_empty(&self) -> bool {
    self.comments.is_empty()
  }
}

/// Compiler hints written as comments, e.g. `/*@__PURE__*/ f()`. Set on the annotated call, `new`, or string expression.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Annotations {
  pub pure: bool,
  pub inline: bool,
  pub noinline: bool,
  // The string is a property name, for property mangling.
  pub key: bool,
  // Marks a property name for mangling when only annotated names are mangled.
  pub mangle_prop: bool,
}

impl Annotations {
  /// Parses annotations from the raw text of comments (including delimiters). Returns None if there are none.
  pub fn from_comments<'a>(comments: impl IntoIterator<Item = (CommentKind, &'a str)>) -> Option<Annotations> {
    let mut a = Annotations::default();
    for (kind, raw) in comments {
      if kind != CommentKind::Multiline {
        continue;
      };
      let body = raw
        .strip_prefix("/*")
        .and_then(|r| r.strip_suffix("*/"))
        .unwrap_or(raw)
        .trim();
      let Some(name) = body.strip_prefix('@').or_else(|| body.strip_prefix('#')) else {
        continue;
      };
      match name {
        "__PURE__" => a.pure = true,
        "__INLINE__" => a.inline = true,
        "__NOINLINE__" => a.noinline = true,
        "__KEY__" => a.key = true,
        "__MANGLE_PROP__" => a.mangle_prop = true,
        _ => {}
      };
    }
    (a != Annotations::default()).then_some(a)
  }
}
