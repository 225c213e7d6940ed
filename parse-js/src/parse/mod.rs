use crate::ast::comment::Annotations;
use crate::ast::comment::CommentIndex;
use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::lex_next;
use crate::lex::LexMode;
use crate::lex::Lexer;
use crate::loc::Loc;
use crate::options::ParseOptions;
use crate::token::Comment;
use crate::token::Token;
use crate::token::TT;
use expr::pat::ParsePatternRules;

pub mod class_or_object;
pub mod drive;
pub mod expr;
pub mod func;
pub mod import_export;
pub mod operator;
pub mod stmt;
#[cfg(test)]
mod tests;
pub mod top_level;

// Almost every parse_* function takes these field values as parameters. Instead of having to enumerate them as parameters on every function and ordered unnamed arguments on every call, we simply pass this struct around. Fields are public to allow destructuring, but the value should be immutable; the with_* methods can be used to create an altered copy for passing into other functions, which is useful as most calls simply pass through the values unchanged. This struct should be received as a value, not a reference (i.e. `ctx: ParseCtx` not `ctx: &ParseCtx`) as the latter will require a separate lifetime.
// All fields can change between calls, so we don't simply put them in Parser, as otherwise we'd have to "unwind" (i.e. reset) those values after each call returns. Strictness is the exception: it can change in the middle of a statement list, so it lives on the Parser's directive stack.
#[derive(Clone, Copy, Debug)]
pub struct ParseCtx {
  pub rules: ParsePatternRules, // For simplicity, this is a copy, not a non-mutable reference, to avoid having a separate lifetime for it. The value is only two booleans, so a reference is probably slower.
  // Directly within the statement list of the script or module, where import/export declarations may appear.
  pub top_level: bool,
  // `return` is allowed.
  pub in_function: bool,
  // `await` is an operator.
  pub in_async: bool,
  // `yield` is an operator.
  pub in_generator: bool,
  pub new_target_allowed: bool,
  pub super_prop_allowed: bool,
  pub super_call_allowed: bool,
}

impl ParseCtx {
  pub fn with_rules(&self, rules: ParsePatternRules) -> ParseCtx {
    ParseCtx { rules, ..*self }
  }

  pub fn nested(&self) -> ParseCtx {
    ParseCtx {
      top_level: false,
      ..*self
    }
  }
}

#[derive(Debug)]
#[must_use]
pub struct MaybeToken {
  // The type of the token that was actually next.
  typ: TT,
  loc: Loc,
  matched: bool,
}

impl MaybeToken {
  pub fn is_match(&self) -> bool {
    self.matched
  }

  pub fn match_loc(&self) -> Option<Loc> {
    if self.matched {
      Some(self.loc)
    } else {
      None
    }
  }

  pub fn error(&self, err: SyntaxErrorType) -> SyntaxError {
    debug_assert!(!self.matched);
    self.loc.error(err, Some(self.typ))
  }

  pub fn and_then<R, F: FnOnce() -> SyntaxResult<R>>(self, f: F) -> SyntaxResult<Option<R>> {
    Ok(if self.matched { Some(f()?) } else { None })
  }
}

pub struct ParserCheckpoint {
  next_tok_i: usize,
}

/// To get the lexer's `next` after this token was lexed, use `token.loc.1`.
struct BufferedToken {
  token: Token,
  lex_mode: LexMode,
}

pub struct Parser<'a> {
  lexer: Lexer<'a>,
  buf: Vec<BufferedToken>,
  next_tok_i: usize,
  // Where the first token starts lexing, i.e. after any hashbang.
  start: usize,
  hashbang: Option<Comment>,
  options: ParseOptions,
  comments: CommentIndex,
  // One entry per program, function and class body being parsed; whether its code is strict.
  directives: Vec<bool>,
  depth: usize,
}

// We extend this struct with added methods in the various submodules, instead of simply using free functions and passing `&mut Parser` around, for several reasons:
// - Avoid needing to redeclare `<'a>` on every function.
// - More lifetime elision is available for `self` than if it was just another reference parameter.
// - `self` is shorter than `parser` but makes more sense than `p`.
// - Don't need to import each function.
// - Autocomplete is more specific since `self.*` narrows down the options instead of just listing all visible functions.
// - For general consistency; if there's no reason why it should be a free function (e.g. more than one ambiguous base type), it should be a method.
// - Makes free functions truly separate independent utility functions.
impl<'a> Parser<'a> {
  pub fn new(lexer: Lexer<'a>, options: ParseOptions) -> Parser<'a> {
    Parser {
      lexer,
      buf: Vec::new(),
      next_tok_i: 0,
      start: 0,
      hashbang: None,
      options,
      comments: CommentIndex::default(),
      directives: Vec::new(),
      depth: 0,
    }
  }

  /// Skips a leading `#!` line. Must be called before any token is read.
  pub fn skip_hashbang(&mut self) {
    debug_assert!(self.buf.is_empty());
    if let Some(c) = self.lexer.skip_hashbang() {
      self.start = self.lexer.next();
      self.hashbang = Some(c);
    };
  }

  pub fn options(&self) -> &ParseOptions {
    &self.options
  }

  pub fn source_range(&self) -> Loc {
    self.lexer.source_range()
  }

  pub fn str(&self, loc: Loc) -> &'a str {
    &self.lexer.source()[loc.0..loc.1]
  }

  pub fn string(&self, loc: Loc) -> String {
    self.str(loc).to_string()
  }

  pub fn checkpoint(&self) -> ParserCheckpoint {
    ParserCheckpoint {
      next_tok_i: self.next_tok_i,
    }
  }

  // End of the last consumed token.
  fn prev_end(&self) -> usize {
    match self.next_tok_i {
      0 => self.start,
      n => self.buf[n - 1].token.loc.1,
    }
  }

  /// The range of tokens consumed since the checkpoint. Empty (at the end of the previous token) if none were consumed.
  pub fn since_checkpoint(&self, checkpoint: &ParserCheckpoint) -> Loc {
    let end = self.prev_end();
    if checkpoint.next_tok_i < self.next_tok_i {
      Loc(self.buf[checkpoint.next_tok_i].token.loc.0, end)
    } else {
      Loc(end, end)
    }
  }

  pub fn restore_checkpoint(&mut self, checkpoint: ParserCheckpoint) {
    self.next_tok_i = checkpoint.next_tok_i;
  }

  fn reset_to(&mut self, n: usize) {
    self.next_tok_i = n;
    self.buf.truncate(n);
    match self.buf.last() {
      Some(t) => self.lexer.set_next(t.token.loc.1),
      None => self.lexer.set_next(self.start),
    };
  }

  fn forward<K: FnOnce(&Token) -> bool>(&mut self, mode: LexMode, keep: K) -> (bool, Token) {
    if self
      .buf
      .get(self.next_tok_i)
      .is_some_and(|t| t.lex_mode != mode)
    {
      self.reset_to(self.next_tok_i);
    }
    debug_assert!(self.buf.len() >= self.next_tok_i);
    if self.buf.len() == self.next_tok_i {
      let mut token = lex_next(&mut self.lexer, mode);
      if let Some(c) = self.hashbang.take() {
        token.comments.insert(0, c);
      };
      self.comments.record(token.loc.0, &token.comments);
      self.buf.push(BufferedToken {
        token,
        lex_mode: mode,
      });
    }
    let t = self.buf[self.next_tok_i].token.clone();
    let k = keep(&t);
    if k {
      self.next_tok_i += 1;
    };
    (k, t)
  }

  pub fn consume_with_mode(&mut self, mode: LexMode) -> Token {
    self.forward(mode, |_| true).1
  }

  pub fn consume(&mut self) -> Token {
    self.consume_with_mode(LexMode::Standard)
  }

  pub fn peek_with_mode(&mut self, mode: LexMode) -> Token {
    self.forward(mode, |_| false).1
  }

  pub fn peek(&mut self) -> Token {
    self.peek_with_mode(LexMode::Standard)
  }

  /// Peeks the next `N` tokens, all lexed in standard mode.
  pub fn peek_n<const N: usize>(&mut self) -> [Token; N] {
    let cp = self.checkpoint();
    let tokens = std::array::from_fn(|_| self.forward(LexMode::Standard, |_| true).1);
    self.restore_checkpoint(cp);
    tokens
  }

  pub fn peek_2(&mut self) -> (Token, Token) {
    let [a, b] = self.peek_n();
    (a, b)
  }

  pub fn maybe_consume_with_mode(&mut self, typ: TT, mode: LexMode) -> MaybeToken {
    let (matched, t) = self.forward(mode, |t| t.typ == typ);
    MaybeToken {
      typ: t.typ,
      matched,
      loc: t.loc,
    }
  }

  pub fn consume_if(&mut self, typ: TT) -> MaybeToken {
    self.maybe_consume_with_mode(typ, LexMode::Standard)
  }

  pub fn require_with_mode(&mut self, typ: TT, mode: LexMode) -> SyntaxResult<Token> {
    let t = self.consume_with_mode(mode);
    if t.typ != typ {
      Err(t.error(SyntaxErrorType::RequiredTokenNotFound(typ)))
    } else {
      Ok(t)
    }
  }

  pub fn require_predicate<P: FnOnce(TT) -> bool>(
    &mut self,
    pred: P,
    expected: &'static str,
  ) -> SyntaxResult<Token> {
    let t = self.consume_with_mode(LexMode::Standard);
    if !pred(t.typ) {
      Err(t.error(SyntaxErrorType::ExpectedSyntax(expected)))
    } else {
      Ok(t)
    }
  }

  pub fn require(&mut self, typ: TT) -> SyntaxResult<Token> {
    self.require_with_mode(typ, LexMode::Standard)
  }

  /// Annotation comments (e.g. `/*#__PURE__*/`) directly before the token starting at `loc`.
  pub fn annotations_at(&self, loc: Loc) -> Option<Annotations> {
    Annotations::from_comments(
      self
        .comments
        .leading(loc)
        .iter()
        .map(|c| (c.kind, self.str(c.loc))),
    )
  }

  pub fn take_comments(&mut self) -> CommentIndex {
    std::mem::take(&mut self.comments)
  }

  pub fn is_strict(&self) -> bool {
    self.directives.last().copied().unwrap_or(false)
  }

  /// Enters a program, function or class body, which inherits strictness from its enclosing code.
  pub fn enter_directive_scope(&mut self, strict: bool) {
    let strict = strict || self.is_strict();
    self.directives.push(strict);
  }

  pub fn exit_directive_scope(&mut self) -> bool {
    self.directives.pop().unwrap_or(false)
  }

  pub fn set_strict(&mut self) {
    if let Some(top) = self.directives.last_mut() {
      *top = true;
    };
  }

  /// Runs `f` one nesting level deeper, failing once the configured maximum depth is reached.
  pub fn nested<T, F: FnOnce(&mut Self) -> SyntaxResult<T>>(&mut self, f: F) -> SyntaxResult<T> {
    if self.depth >= self.options.max_depth {
      let t = self.peek();
      return Err(t.loc.error(SyntaxErrorType::NestingTooDeep, Some(t.typ)));
    };
    self.depth += 1;
    let res = f(self);
    self.depth -= 1;
    res
  }
}
