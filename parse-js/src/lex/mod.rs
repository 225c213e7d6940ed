use crate::char::is_id_continue;
use crate::char::is_id_start;
use crate::char::CharFilter;
use crate::char::DIGIT;
use crate::char::DIGIT_BIN;
use crate::char::DIGIT_HEX;
use crate::char::DIGIT_OCT;
use crate::char::ECMASCRIPT_WHITESPACE;
use crate::char::ID_CONTINUE;
use crate::error::SyntaxErrorType;
use crate::loc::Loc;
use crate::token::Comment;
use crate::token::CommentKind;
use crate::token::Token;
use crate::token::TT;
use ahash::HashMap;
use ahash::HashMapExt;
use aho_corasick::AhoCorasick;
use aho_corasick::AhoCorasickBuilder;
use aho_corasick::AhoCorasickKind;
use aho_corasick::Anchored;
use aho_corasick::Input;
use aho_corasick::MatchKind;
use aho_corasick::StartKind;
use core::ops::Index;
use memchr::memchr;
use memchr::memchr3;
use once_cell::sync::Lazy;

#[cfg(test)]
mod tests;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum LexMode {
  SlashIsRegex,
  Standard,
  TemplateStrContinue,
}

#[derive(Copy, Clone)]
pub struct LexerCheckpoint {
  next: usize,
}

// Contains the match length.
#[derive(Copy, Clone)]
struct Match(usize);

impl Match {
  pub fn len(&self) -> usize {
    self.0
  }

  pub fn prefix(&self, n: usize) -> Match {
    debug_assert!(n <= self.len());
    Match(n)
  }

  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

struct PatternMatcher {
  patterns: Vec<TT>,
  matcher: AhoCorasick,
  anchored: bool,
}

impl PatternMatcher {
  pub fn new<D: AsRef<[u8]>>(anchored: bool, patterns: Vec<(TT, D)>) -> Self {
    let (tts, syns): (Vec<_>, Vec<_>) = patterns.into_iter().unzip();
    let matcher = AhoCorasickBuilder::new()
      .start_kind(if anchored {
        StartKind::Anchored
      } else {
        StartKind::Unanchored
      })
      .kind(Some(AhoCorasickKind::DFA))
      .match_kind(MatchKind::LeftmostLongest)
      .build(syns)
      // The pattern sets are static and known to be valid.
      .unwrap();
    PatternMatcher {
      patterns: tts,
      matcher,
      anchored,
    }
  }

  pub fn find(&self, lexer: &Lexer) -> LexResult<(TT, Match)> {
    self
      .matcher
      .find(Input::new(&lexer.source[lexer.next..]).anchored(if self.anchored {
        Anchored::Yes
      } else {
        Anchored::No
      }))
      .map(|m| (self.patterns[m.pattern().as_usize()], Match(m.end())))
      .ok_or(LexNotFound)
  }
}

#[derive(Debug)]
struct LexNotFound;

type LexResult<T> = Result<T, LexNotFound>;

pub struct Lexer<'a> {
  source: &'a str,
  next: usize,
  html_comments: bool,
}

impl<'a> Lexer<'a> {
  pub fn new(code: &'a str) -> Lexer<'a> {
    Lexer {
      source: code,
      next: 0,
      html_comments: true,
    }
  }

  /// Whether `<!--` and line-leading `-->` start single-line comments. Must be disabled for modules.
  pub fn set_html_comments(&mut self, enabled: bool) {
    self.html_comments = enabled;
  }

  pub fn source(&self) -> &'a str {
    self.source
  }

  pub fn next(&self) -> usize {
    self.next
  }

  fn end(&self) -> usize {
    self.source.len()
  }

  fn remaining(&self) -> usize {
    self.end() - self.next
  }

  pub fn source_range(&self) -> Loc {
    Loc(0, self.end())
  }

  fn eof_range(&self) -> Loc {
    Loc(self.end(), self.end())
  }

  fn at_end(&self) -> bool {
    self.next >= self.end()
  }

  fn peek(&self, n: usize) -> LexResult<char> {
    self.peek_or_eof(n).ok_or(LexNotFound)
  }

  fn peek_or_eof(&self, n: usize) -> Option<char> {
    self.source[self.next..].chars().nth(n)
  }

  /// WARNING: Prefer checkpoints instead. Only use this if you know what you're doing.
  pub fn set_next(&mut self, next: usize) {
    self.next = next;
  }

  pub fn checkpoint(&self) -> LexerCheckpoint {
    LexerCheckpoint { next: self.next }
  }

  pub fn since_checkpoint(&self, checkpoint: LexerCheckpoint) -> Loc {
    Loc(checkpoint.next, self.next)
  }

  pub fn apply_checkpoint(&mut self, checkpoint: LexerCheckpoint) {
    self.next = checkpoint.next;
  }

  fn if_char(&self, c: char) -> Match {
    match self.peek_or_eof(0) {
      Some(first_char) if first_char == c => Match(c.len_utf8()),
      _ => Match(0),
    }
  }

  fn through_char_or_end(&self, c: char) -> Match {
    debug_assert!(c.is_ascii());
    memchr(c as u8, self.source[self.next..].as_bytes())
      .map(|pos| Match(pos + 1))
      .unwrap_or_else(|| Match(self.remaining()))
  }

  fn while_not_3_chars(&self, a: char, b: char, c: char) -> Match {
    debug_assert!(a.is_ascii() && b.is_ascii() && c.is_ascii());
    Match(
      memchr3(a as u8, b as u8, c as u8, self.source[self.next..].as_bytes())
        .unwrap_or(self.remaining()),
    )
  }

  fn while_chars(&self, chars: &CharFilter) -> Match {
    let mut len = 0;
    for ch in self.source[self.next..].chars() {
      if chars.has(ch) {
        len += ch.len_utf8();
      } else {
        break;
      }
    }
    Match(len)
  }

  fn consume(&mut self, m: Match) -> Match {
    self.next += m.len();
    m
  }

  fn consume_next(&mut self) -> LexResult<char> {
    let c = self.peek(0)?;
    self.next += c.len_utf8();
    Ok(c)
  }

  fn skip_expect(&mut self, n: usize) {
    debug_assert!(self.next + n <= self.end());
    self.next += n;
  }

  fn drive_fallible(
    &mut self,
    mode: LexMode,
    preceded_by_line_terminator: bool,
    comments: Vec<Comment>,
    f: impl FnOnce(&mut Self) -> LexResult<TT>,
  ) -> Token {
    let cp = self.checkpoint();
    let (typ, lex_error) = match f(self) {
      Ok(typ) => (typ, None),
      Err(LexNotFound) => (TT::Invalid, Some(self.classify_failure(mode, cp))),
    };
    Token {
      loc: self.since_checkpoint(cp),
      typ,
      preceded_by_line_terminator,
      comments,
      lex_error,
    }
  }

  // Describes why lexing failed, based on what the token started with and where the lexer stopped.
  fn classify_failure(&self, mode: LexMode, cp: LexerCheckpoint) -> SyntaxErrorType {
    if mode == LexMode::TemplateStrContinue {
      return SyntaxErrorType::UnterminatedTemplate;
    };
    let last = self.source[cp.next..self.next].chars().next_back();
    match self.source[cp.next..].chars().next() {
      Some('"' | '\'') if self.at_end() => SyntaxErrorType::UnterminatedString,
      Some('"' | '\'') => SyntaxErrorType::LineTerminatorInString,
      Some('`') => SyntaxErrorType::UnterminatedTemplate,
      Some('/') if mode == LexMode::SlashIsRegex => {
        if self.at_end() {
          SyntaxErrorType::UnterminatedRegex
        } else if self
          .peek_or_eof(0)
          .is_some_and(crate::char::is_line_terminator)
          || last.is_some_and(crate::char::is_line_terminator)
        {
          SyntaxErrorType::LineTerminatorInRegex
        } else {
          SyntaxErrorType::InvalidRegexFlags
        }
      }
      Some('0'..='9' | '.') => {
        if self.peek_or_eof(0) == Some('n') || last == Some('n') {
          SyntaxErrorType::MalformedLiteralBigInt
        } else {
          SyntaxErrorType::MalformedLiteralNumber
        }
      }
      Some('\\') => SyntaxErrorType::InvalidCharacterEscape,
      _ => SyntaxErrorType::InvalidCharacter,
    }
  }

  /// Consumes a leading `#!` line, if present at the very start of the source.
  pub fn skip_hashbang(&mut self) -> Option<Comment> {
    if self.next != 0 || !self.source.starts_with("#!") {
      return None;
    };
    let cp = self.checkpoint();
    self.consume(Match(
      self.source
        .find(|c| crate::char::is_line_terminator(c))
        .unwrap_or(self.end()),
    ));
    Some(Comment {
      kind: CommentKind::Hashbang,
      loc: self.since_checkpoint(cp),
    })
  }
}

impl<'a> Index<Loc> for Lexer<'a> {
  type Output = str;

  fn index(&self, index: Loc) -> &Self::Output {
    &self.source[index.0..index.1]
  }
}

#[rustfmt::skip]
pub static OPERATORS_MAPPING: Lazy<HashMap<TT, &'static str>> = Lazy::new(|| {
  let mut map = HashMap::<TT, &'static str>::new();
  map.insert(TT::Ampersand, "&");
  map.insert(TT::AmpersandAmpersand, "&&");
  map.insert(TT::AmpersandAmpersandEquals, "&&=");
  map.insert(TT::AmpersandEquals, "&=");
  map.insert(TT::Asterisk, "*");
  map.insert(TT::AsteriskAsterisk, "**");
  map.insert(TT::AsteriskAsteriskEquals, "**=");
  map.insert(TT::AsteriskEquals, "*=");
  map.insert(TT::Bar, "|");
  map.insert(TT::BarBar, "||");
  map.insert(TT::BarBarEquals, "||=");
  map.insert(TT::BarEquals, "|=");
  map.insert(TT::BraceClose, "}");
  map.insert(TT::BraceOpen, "{");
  map.insert(TT::BracketClose, "]");
  map.insert(TT::BracketOpen, "[");
  map.insert(TT::Caret, "^");
  map.insert(TT::CaretEquals, "^=");
  map.insert(TT::ChevronLeft, "<");
  map.insert(TT::ChevronLeftChevronLeft, "<<");
  map.insert(TT::ChevronLeftChevronLeftEquals, "<<=");
  map.insert(TT::ChevronLeftEquals, "<=");
  map.insert(TT::ChevronRight, ">");
  map.insert(TT::ChevronRightChevronRight, ">>");
  map.insert(TT::ChevronRightChevronRightChevronRight, ">>>");
  map.insert(TT::ChevronRightChevronRightChevronRightEquals, ">>>=");
  map.insert(TT::ChevronRightChevronRightEquals, ">>=");
  map.insert(TT::ChevronRightEquals, ">=");
  map.insert(TT::Colon, ":");
  map.insert(TT::Comma, ",");
  map.insert(TT::Dot, ".");
  map.insert(TT::DotDotDot, "...");
  map.insert(TT::Equals, "=");
  map.insert(TT::EqualsChevronRight, "=>");
  map.insert(TT::EqualsEquals, "==");
  map.insert(TT::EqualsEqualsEquals, "===");
  map.insert(TT::Exclamation, "!");
  map.insert(TT::ExclamationEquals, "!=");
  map.insert(TT::ExclamationEqualsEquals, "!==");
  map.insert(TT::Hyphen, "-");
  map.insert(TT::HyphenEquals, "-=");
  map.insert(TT::HyphenHyphen, "--");
  map.insert(TT::ParenthesisClose, ")");
  map.insert(TT::ParenthesisOpen, "(");
  map.insert(TT::Percent, "%");
  map.insert(TT::PercentEquals, "%=");
  map.insert(TT::Plus, "+");
  map.insert(TT::PlusEquals, "+=");
  map.insert(TT::PlusPlus, "++");
  map.insert(TT::PrivateMember, "#");
  map.insert(TT::Question, "?");
  map.insert(TT::QuestionDot, "?.");
  map.insert(TT::QuestionDotBracketOpen, "?.[");
  map.insert(TT::QuestionDotParenthesisOpen, "?.(");
  map.insert(TT::QuestionQuestion, "??");
  map.insert(TT::QuestionQuestionEquals, "??=");
  map.insert(TT::Semicolon, ";");
  map.insert(TT::Slash, "/");
  map.insert(TT::SlashEquals, "/=");
  map.insert(TT::Tilde, "~");
  map
});

pub static KEYWORDS_MAPPING: Lazy<HashMap<TT, &'static str>> = Lazy::new(|| {
  let mut map = HashMap::<TT, &'static str>::new();
  map.insert(TT::KeywordAs, "as");
  map.insert(TT::KeywordAsync, "async");
  map.insert(TT::KeywordAwait, "await");
  map.insert(TT::KeywordBreak, "break");
  map.insert(TT::KeywordCase, "case");
  map.insert(TT::KeywordCatch, "catch");
  map.insert(TT::KeywordClass, "class");
  map.insert(TT::KeywordConst, "const");
  map.insert(TT::KeywordContinue, "continue");
  map.insert(TT::KeywordDebugger, "debugger");
  map.insert(TT::KeywordDefault, "default");
  map.insert(TT::KeywordDelete, "delete");
  map.insert(TT::KeywordDo, "do");
  map.insert(TT::KeywordElse, "else");
  map.insert(TT::KeywordEnum, "enum");
  map.insert(TT::KeywordExport, "export");
  map.insert(TT::KeywordExtends, "extends");
  map.insert(TT::KeywordFinally, "finally");
  map.insert(TT::KeywordFor, "for");
  map.insert(TT::KeywordFrom, "from");
  map.insert(TT::KeywordFunction, "function");
  map.insert(TT::KeywordGet, "get");
  map.insert(TT::KeywordIf, "if");
  map.insert(TT::KeywordImplements, "implements");
  map.insert(TT::KeywordImport, "import");
  map.insert(TT::KeywordIn, "in");
  map.insert(TT::KeywordInstanceof, "instanceof");
  map.insert(TT::KeywordInterface, "interface");
  map.insert(TT::KeywordLet, "let");
  map.insert(TT::KeywordNew, "new");
  map.insert(TT::KeywordOf, "of");
  map.insert(TT::KeywordPackage, "package");
  map.insert(TT::KeywordPrivate, "private");
  map.insert(TT::KeywordProtected, "protected");
  map.insert(TT::KeywordPublic, "public");
  map.insert(TT::KeywordReturn, "return");
  map.insert(TT::KeywordSet, "set");
  map.insert(TT::KeywordStatic, "static");
  map.insert(TT::KeywordSuper, "super");
  map.insert(TT::KeywordSwitch, "switch");
  map.insert(TT::KeywordThis, "this");
  map.insert(TT::KeywordThrow, "throw");
  map.insert(TT::KeywordTry, "try");
  map.insert(TT::KeywordTypeof, "typeof");
  map.insert(TT::KeywordVar, "var");
  map.insert(TT::KeywordVoid, "void");
  map.insert(TT::KeywordWhile, "while");
  map.insert(TT::KeywordWith, "with");
  map.insert(TT::KeywordYield, "yield");
  map.insert(TT::LiteralFalse, "false");
  map.insert(TT::LiteralNull, "null");
  map.insert(TT::LiteralTrue, "true");
  map
});

pub static KEYWORD_STRS: Lazy<HashMap<&'static str, TT>> = Lazy::new(|| {
  KEYWORDS_MAPPING.iter().map(|(tt, s)| (*s, *tt)).collect()
});

#[rustfmt::skip]
static SIG: Lazy<PatternMatcher> = Lazy::new(|| {
  let mut patterns: Vec<(TT, String)> = Vec::new();
  for (&k, &v) in OPERATORS_MAPPING.iter() {
    patterns.push((k, v.into()));
  }
  // Keywords are recognised after the whole identifier has been lexed, so they only need an identifier start here.
  for c in 'a'..='z' {
    patterns.push((TT::Identifier, c.to_string()));
  }
  for c in 'A'..='Z' {
    patterns.push((TT::Identifier, c.to_string()));
  }
  patterns.push((TT::Identifier, "$".into()));
  patterns.push((TT::Identifier, "_".into()));
  patterns.push((TT::Identifier, "\\".into()));
  for c in '0'..='9' {
    patterns.push((TT::LiteralNumber, c.to_string()));
  }
  patterns.push((TT::LiteralNumberBin, "0b".into()));
  patterns.push((TT::LiteralNumberBin, "0B".into()));
  patterns.push((TT::LiteralNumberHex, "0x".into()));
  patterns.push((TT::LiteralNumberHex, "0X".into()));
  patterns.push((TT::LiteralNumberOct, "0o".into()));
  patterns.push((TT::LiteralNumberOct, "0O".into()));
  // Prevent `.` immediately followed by a digit from being recognised as the `.` operator.
  for digit in '0'..='9' {
    patterns.push((TT::LiteralNumber, format!(".{}", digit)));
  }
  // Prevent `?` immediately followed by a decimal number from being recognised as the `?.` operator.
  for digit in '0'..='9' {
    patterns.push((TT::Question, format!("?.{}", digit)));
  }
  patterns.push((TT::LiteralString, "\"".into()));
  patterns.push((TT::LiteralString, "'".into()));
  patterns.push((TT::LiteralTemplatePartString, "`".into()));

  PatternMatcher::new(true, patterns)
});

static ML_COMMENT: Lazy<PatternMatcher> = Lazy::new(|| {
  PatternMatcher::new::<&str>(false, vec![
    (TT::CommentMultilineEnd, "*/"),
    (TT::LineTerminator, "\r"),
    (TT::LineTerminator, "\n"),
    (TT::LineTerminator, "\u{2028}"),
    (TT::LineTerminator, "\u{2029}"),
  ])
});

static INSIG: Lazy<PatternMatcher> = Lazy::new(|| {
  let mut patterns: Vec<(TT, String)> = vec![
    (TT::LineTerminator, "\r".into()),
    (TT::LineTerminator, "\n".into()),
    (TT::LineTerminator, "\u{2028}".into()),
    (TT::LineTerminator, "\u{2029}".into()),
    (TT::CommentMultiline, "/*".into()),
    (TT::CommentSingle, "//".into()),
    (TT::CommentHtmlOpen, "<!--".into()),
    (TT::CommentHtmlClose, "-->".into()),
  ];
  for c in ECMASCRIPT_WHITESPACE {
    patterns.push((TT::Whitespace, c.to_string()));
  }
  PatternMatcher::new(true, patterns)
});

/// Returns whether the comment includes a line terminator, or an error if it's unterminated.
fn lex_multiline_comment(lexer: &mut Lexer<'_>) -> LexResult<bool> {
  // Consume `/*`.
  lexer.skip_expect(2);
  let mut contains_newline = false;
  loop {
    let (tt, mat) = ML_COMMENT.find(lexer)?;
    lexer.consume(mat);
    match tt {
      TT::CommentMultilineEnd => break,
      TT::LineTerminator => contains_newline = true,
      _ => unreachable!(),
    };
  }
  Ok(contains_newline)
}

fn lex_single_comment(lexer: &mut Lexer<'_>, prefix: Match) {
  lexer.skip_expect(prefix.len());
  let rest = &lexer.source[lexer.next..];
  let len = rest
    .find(|c| crate::char::is_line_terminator(c))
    .unwrap_or(rest.len());
  lexer.consume(Match(len));
}

fn lex_unicode_escape(lexer: &mut Lexer<'_>) -> LexResult<char> {
  // We're at '\', consume it.
  lexer.skip_expect(1);
  if lexer.peek(0)? != 'u' {
    return Err(LexNotFound);
  }
  lexer.skip_expect(1);

  let cp = if lexer.peek_or_eof(0) == Some('{') {
    lexer.skip_expect(1);
    let digits = lexer.consume(lexer.while_chars(&DIGIT_HEX));
    if digits.is_empty() || lexer.peek(0)? != '}' {
      return Err(LexNotFound);
    }
    let v = u32::from_str_radix(&lexer.source[lexer.next - digits.len()..lexer.next], 16)
      .map_err(|_| LexNotFound)?;
    lexer.skip_expect(1);
    v
  } else {
    let start = lexer.next;
    for _ in 0..4 {
      if !DIGIT_HEX.has(lexer.peek(0)?) {
        return Err(LexNotFound);
      }
      lexer.skip_expect(1);
    }
    u32::from_str_radix(&lexer.source[start..lexer.next], 16).map_err(|_| LexNotFound)?
  };
  char::from_u32(cp).ok_or(LexNotFound)
}

/// Consumes identifier characters after the start character. Returns whether any escape sequence was seen.
fn lex_identifier_rest(lexer: &mut Lexer<'_>) -> LexResult<bool> {
  let mut escaped = false;
  loop {
    lexer.consume(lexer.while_chars(&ID_CONTINUE));
    match lexer.peek_or_eof(0) {
      Some('\\') => {
        if !is_id_continue(lex_unicode_escape(lexer)?) {
          return Err(LexNotFound);
        };
        escaped = true;
      }
      Some(c) if !c.is_ascii() && is_id_continue(c) => {
        lexer.skip_expect(c.len_utf8());
      }
      _ => break,
    };
  }
  Ok(escaped)
}

fn lex_identifier(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  let start = lexer.next();
  let starter = lexer.peek(0)?;
  let mut escaped = false;
  if starter == '\\' {
    if !is_id_start(lex_unicode_escape(lexer)?) {
      return Err(LexNotFound);
    };
    escaped = true;
  } else {
    lexer.skip_expect(starter.len_utf8());
  };
  escaped |= lex_identifier_rest(lexer)?;
  if escaped {
    // Escaped keywords are never keywords; the parser decodes and validates the name.
    return Ok(TT::Identifier);
  };
  Ok(
    KEYWORD_STRS
      .get(&lexer[Loc(start, lexer.next())])
      .copied()
      .unwrap_or(TT::Identifier),
  )
}

/// Consumes one or more digits with optional single `_` separators between them.
fn lex_digits_with_separators(lexer: &mut Lexer<'_>, digits: &CharFilter) -> LexResult<()> {
  if lexer.consume(lexer.while_chars(digits)).is_empty() {
    return Err(LexNotFound);
  };
  while lexer.peek_or_eof(0) == Some('_') {
    lexer.skip_expect(1);
    if lexer.consume(lexer.while_chars(digits)).is_empty() {
      return Err(LexNotFound);
    };
  }
  Ok(())
}

// An identifier start or a digit cannot immediately follow a numeric literal.
fn require_number_end(lexer: &Lexer<'_>) -> LexResult<()> {
  match lexer.peek_or_eof(0) {
    Some(c) if c == '\\' || is_id_start(c) || DIGIT.has(c) => Err(LexNotFound),
    _ => Ok(()),
  }
}

fn lex_exponent(lexer: &mut Lexer<'_>) -> LexResult<bool> {
  if !matches!(lexer.peek_or_eof(0), Some('e' | 'E')) {
    return Ok(false);
  };
  lexer.skip_expect(1);
  if matches!(lexer.peek(0)?, '+' | '-') {
    lexer.skip_expect(1);
  };
  lex_digits_with_separators(lexer, &DIGIT)?;
  Ok(true)
}

fn lex_bigint_or_number(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  let first = lexer.peek(0)?;
  if first == '0' && lexer.peek_or_eof(1).is_some_and(|c| DIGIT.has(c) || c == '_') {
    // Legacy octal (`017`) or decimal with a leading zero (`089`). Neither allows separators or a bigint suffix.
    let start = lexer.next();
    lexer.consume(lexer.while_chars(&DIGIT));
    let is_octal = lexer[Loc(start, lexer.next())].chars().all(|c| DIGIT_OCT.has(c));
    if !is_octal {
      if !lexer.consume(lexer.if_char('.')).is_empty() {
        lexer.consume(lexer.while_chars(&DIGIT));
      };
      lex_exponent(lexer)?;
    };
    if matches!(lexer.peek_or_eof(0), Some('_' | 'n')) {
      return Err(LexNotFound);
    };
    require_number_end(lexer)?;
    return Ok(TT::LiteralNumber);
  };

  let mut is_integer = true;
  if first == '.' {
    lexer.skip_expect(1);
    lex_digits_with_separators(lexer, &DIGIT)?;
    is_integer = false;
  } else {
    lex_digits_with_separators(lexer, &DIGIT)?;
    if !lexer.consume(lexer.if_char('.')).is_empty() {
      is_integer = false;
      if lexer.peek_or_eof(0).is_some_and(|c| DIGIT.has(c)) {
        lex_digits_with_separators(lexer, &DIGIT)?;
      } else if lexer.peek_or_eof(0) == Some('_') {
        return Err(LexNotFound);
      };
    };
  };
  if lex_exponent(lexer)? {
    is_integer = false;
  };
  if lexer.peek_or_eof(0) == Some('n') {
    if !is_integer {
      return Err(LexNotFound);
    };
    lexer.skip_expect(1);
    require_number_end(lexer)?;
    return Ok(TT::LiteralBigInt);
  };
  require_number_end(lexer)?;
  Ok(TT::LiteralNumber)
}

fn lex_radix_bigint_or_number(lexer: &mut Lexer<'_>, digits: &CharFilter) -> LexResult<TT> {
  lexer.skip_expect(2);
  lex_digits_with_separators(lexer, digits)?;
  let typ = if !lexer.consume(lexer.if_char('n')).is_empty() {
    TT::LiteralBigInt
  } else {
    TT::LiteralNumber
  };
  require_number_end(lexer)?;
  Ok(typ)
}

fn lex_private_member(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  // Include the `#` in the token.
  lexer.skip_expect(1);
  let starter = lexer.peek(0)?;
  if starter == '\\' {
    if !is_id_start(lex_unicode_escape(lexer)?) {
      return Err(LexNotFound);
    };
  } else if is_id_start(starter) {
    lexer.skip_expect(starter.len_utf8());
  } else {
    return Err(LexNotFound);
  };
  lex_identifier_rest(lexer)?;
  Ok(TT::PrivateMember)
}

fn lex_regex(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  // Consume slash.
  lexer.skip_expect(1);
  let mut in_charset = false;
  loop {
    match lexer.consume_next()? {
      '\\' => {
        // Cannot escape line terminator.
        let escaped_char = lexer.peek(0)?;
        if crate::char::is_line_terminator(escaped_char) {
          return Err(LexNotFound);
        };
        lexer.skip_expect(escaped_char.len_utf8());
      }
      '/' if !in_charset => {
        break;
      }
      '[' => {
        in_charset = true;
      }
      ']' if in_charset => {
        in_charset = false;
      }
      c if crate::char::is_line_terminator(c) => {
        return Err(LexNotFound);
      }
      _ => {}
    };
  }
  // Flags are validated by the parser.
  lex_identifier_rest(lexer)?;
  Ok(TT::LiteralRegex)
}

fn lex_string(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  let quote = lexer.peek(0)?;
  lexer.skip_expect(1);
  loop {
    let run = lexer.while_not_3_chars('\\', '\n', quote);
    // U+2028 and U+2029 are allowed unescaped in strings, but `\r` is not.
    if memchr(b'\r', lexer.source[lexer.next..lexer.next + run.len()].as_bytes()).is_some() {
      return Err(LexNotFound);
    };
    lexer.consume(run);
    match lexer.peek(0)? {
      '\\' => {
        lexer.skip_expect(1);
        // An escaped CRLF is one line continuation.
        let next_char = lexer.peek(0)?;
        lexer.skip_expect(next_char.len_utf8());
        if next_char == '\r' && lexer.peek_or_eof(0) == Some('\n') {
          lexer.skip_expect(1);
        };
      }
      '\n' => {
        return Err(LexNotFound);
      }
      c if c == quote => {
        lexer.skip_expect(1);
        break;
      }
      _ => unreachable!(),
    };
  }
  Ok(TT::LiteralString)
}

/// Ends with `${` or backtick.
fn lex_template_string_continue(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  loop {
    lexer.consume(lexer.while_not_3_chars('\\', '`', '$'));
    match lexer.peek(0)? {
      '\\' => {
        lexer.skip_expect(1);
        let next_char = lexer.peek(0)?;
        lexer.skip_expect(next_char.len_utf8());
      }
      '`' => {
        lexer.skip_expect(1);
        return Ok(TT::LiteralTemplatePartStringEnd);
      }
      '$' => {
        if lexer.peek_or_eof(1) == Some('{') {
          lexer.skip_expect(2);
          return Ok(TT::LiteralTemplatePartString);
        };
        lexer.skip_expect(1);
      }
      _ => unreachable!(),
    };
  }
}

fn lex_template(lexer: &mut Lexer<'_>) -> LexResult<TT> {
  // Consume backtick.
  lexer.skip_expect(1);
  lex_template_string_continue(lexer)
}

pub fn lex_next(lexer: &mut Lexer<'_>, mode: LexMode) -> Token {
  if mode == LexMode::TemplateStrContinue {
    return lexer.drive_fallible(mode, false, Vec::new(), lex_template_string_continue);
  };

  // `-->` is only a comment if only whitespace and comments precede it on its line.
  let mut at_line_start = lexer.next() == 0;
  let mut preceded_by_line_terminator = false;
  let mut comments = Vec::new();
  while let Ok((tt, mat)) = INSIG.find(lexer) {
    match tt {
      TT::LineTerminator => {
        lexer.consume(mat);
        at_line_start = true;
        preceded_by_line_terminator = true;
      }
      TT::Whitespace => {
        lexer.consume(mat);
      }
      TT::CommentMultiline => {
        let cp = lexer.checkpoint();
        match lex_multiline_comment(lexer) {
          Ok(has_line_terminator) => {
            at_line_start |= has_line_terminator;
            preceded_by_line_terminator |= has_line_terminator;
            comments.push(Comment {
              kind: CommentKind::Multiline,
              loc: lexer.since_checkpoint(cp),
            });
          }
          Err(LexNotFound) => {
            lexer.set_next(lexer.end());
            return Token {
              loc: lexer.since_checkpoint(cp),
              typ: TT::Invalid,
              preceded_by_line_terminator,
              comments,
              lex_error: Some(SyntaxErrorType::UnterminatedComment),
            };
          }
        };
      }
      TT::CommentSingle => {
        let cp = lexer.checkpoint();
        lex_single_comment(lexer, mat);
        comments.push(Comment {
          kind: CommentKind::Single,
          loc: lexer.since_checkpoint(cp),
        });
      }
      TT::CommentHtmlOpen | TT::CommentHtmlClose => {
        if !lexer.html_comments || (tt == TT::CommentHtmlClose && !at_line_start) {
          break;
        };
        let cp = lexer.checkpoint();
        lex_single_comment(lexer, mat);
        comments.push(Comment {
          kind: CommentKind::Html,
          loc: lexer.since_checkpoint(cp),
        });
      }
      _ => unreachable!(),
    };
  }

  // EOF is different from Invalid, so we should emit this specifically instead of letting drive_fallible return an Invalid.
  if lexer.at_end() {
    return Token {
      loc: lexer.eof_range(),
      typ: TT::EOF,
      preceded_by_line_terminator,
      comments,
      lex_error: None,
    };
  };

  lexer.drive_fallible(mode, preceded_by_line_terminator, comments, |lexer| {
    let c = lexer.peek(0)?;
    if !c.is_ascii() {
      if is_id_start(c) {
        return lex_identifier(lexer);
      };
      // Consume the offending char so the Invalid token has a non-empty range.
      lexer.skip_expect(c.len_utf8());
      return Err(LexNotFound);
    };

    match SIG.find(lexer) {
      Ok((tt, mut mat)) => match tt {
        TT::Identifier => lex_identifier(lexer),
        TT::LiteralNumber => lex_bigint_or_number(lexer),
        TT::LiteralNumberBin => lex_radix_bigint_or_number(lexer, &DIGIT_BIN),
        TT::LiteralNumberHex => lex_radix_bigint_or_number(lexer, &DIGIT_HEX),
        TT::LiteralNumberOct => lex_radix_bigint_or_number(lexer, &DIGIT_OCT),
        TT::LiteralString => lex_string(lexer),
        TT::LiteralTemplatePartString => lex_template(lexer),
        TT::PrivateMember => lex_private_member(lexer),
        TT::Slash | TT::SlashEquals if mode == LexMode::SlashIsRegex => lex_regex(lexer),
        typ => {
          if typ == TT::Question && mat.len() != 1 {
            // We've matched `?.[0-9]`.
            mat = mat.prefix(1);
          };
          lexer.consume(mat);
          Ok(typ)
        }
      },
      Err(LexNotFound) => {
        lexer.skip_expect(c.len_utf8());
        Err(LexNotFound)
      }
    }
  })
}

/// Whether a raw identifier-like token (e.g. a member name after `.`) is usable as a property name.
pub fn is_identifier_name(tt: TT) -> bool {
  tt == TT::Identifier || KEYWORDS_MAPPING.contains_key(&tt)
}
