use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::loc::Loc;
use ahash::HashSet;
use ahash::HashSetExt;
use once_cell::sync::Lazy;
use serde::Serialize;

#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Serialize)]
pub enum TT {
  // Special token used to represent the end of the source code. Easier than using and handling Option everywhere.
  EOF,
  // Special token used to represent invalid source code. Easier than having to propagate SyntaxError from the lexer level, which means even peeking during parsing requires error handling (e.g. can't use Option/Result fluent callbacks without excessive wrapping in OK and then transposing).
  Invalid,
  // These are only used by lexer.
  CommentHtmlClose,
  CommentHtmlOpen,
  CommentMultiline,
  CommentMultilineEnd,
  CommentSingle,
  LineTerminator,
  LiteralNumberBin,
  LiteralNumberHex,
  LiteralNumberOct,
  Whitespace,

  Ampersand,
  AmpersandAmpersand,
  AmpersandAmpersandEquals,
  AmpersandEquals,
  Asterisk,
  AsteriskAsterisk,
  AsteriskAsteriskEquals,
  AsteriskEquals,
  Bar,
  BarBar,
  BarBarEquals,
  BarEquals,
  BraceClose,
  BraceOpen,
  BracketClose,
  BracketOpen,
  Caret,
  CaretEquals,
  ChevronLeft,
  ChevronLeftChevronLeft,
  ChevronLeftChevronLeftEquals,
  ChevronLeftEquals,
  ChevronRight,
  ChevronRightChevronRight,
  ChevronRightChevronRightChevronRight,
  ChevronRightChevronRightChevronRightEquals,
  ChevronRightChevronRightEquals,
  ChevronRightEquals,
  Colon,
  Comma,
  Dot,
  DotDotDot,
  Equals,
  EqualsChevronRight,
  EqualsEquals,
  EqualsEqualsEquals,
  Exclamation,
  ExclamationEquals,
  ExclamationEqualsEquals,
  Hyphen,
  HyphenEquals,
  HyphenHyphen,
  Identifier,
  KeywordAs,
  KeywordAsync,
  KeywordAwait,
  KeywordBreak,
  KeywordCase,
  KeywordCatch,
  KeywordClass,
  KeywordConst,
  KeywordContinue,
  KeywordDebugger,
  KeywordDefault,
  KeywordDelete,
  KeywordDo,
  KeywordElse,
  KeywordEnum,
  KeywordExport,
  KeywordExtends,
  KeywordFinally,
  KeywordFor,
  KeywordFrom,
  KeywordFunction,
  KeywordGet,
  KeywordIf,
  KeywordImplements,
  KeywordImport,
  KeywordIn,
  KeywordInstanceof,
  KeywordInterface,
  KeywordLet,
  KeywordNew,
  KeywordOf,
  KeywordPackage,
  KeywordPrivate,
  KeywordProtected,
  KeywordPublic,
  KeywordReturn,
  KeywordSet,
  KeywordStatic,
  KeywordSuper,
  KeywordSwitch,
  KeywordThis,
  KeywordThrow,
  KeywordTry,
  KeywordTypeof,
  KeywordVar,
  KeywordVoid,
  KeywordWhile,
  KeywordWith,
  KeywordYield,
  LiteralBigInt,
  LiteralFalse,
  LiteralNull,
  LiteralNumber,
  LiteralRegex,
  LiteralString,
  LiteralTemplatePartString,
  LiteralTemplatePartStringEnd,
  LiteralTrue,
  ParenthesisClose,
  ParenthesisOpen,
  Percent,
  PercentEquals,
  Plus,
  PlusEquals,
  PlusPlus,
  PrivateMember,
  Question,
  QuestionDot,
  QuestionDotBracketOpen,
  QuestionDotParenthesisOpen,
  QuestionQuestion,
  QuestionQuestionEquals,
  Semicolon,
  Slash,
  SlashEquals,
  Tilde,
}

// These can be used as parameter and variable names in sloppy mode.
pub static UNRESERVED_KEYWORDS: Lazy<HashSet<TT>> = Lazy::new(|| {
  let mut set = HashSet::<TT>::new();
  set.insert(TT::KeywordAs);
  set.insert(TT::KeywordAsync);
  set.insert(TT::KeywordFrom);
  set.insert(TT::KeywordGet);
  set.insert(TT::KeywordLet);
  set.insert(TT::KeywordOf);
  set.insert(TT::KeywordSet);
  set.insert(TT::KeywordStatic);
  set.insert(TT::KeywordImplements);
  set.insert(TT::KeywordInterface);
  set.insert(TT::KeywordPackage);
  set.insert(TT::KeywordPrivate);
  set.insert(TT::KeywordProtected);
  set.insert(TT::KeywordPublic);
  set
});

// Unreserved in sloppy mode, reserved in strict mode.
pub static STRICT_RESERVED_KEYWORDS: Lazy<HashSet<TT>> = Lazy::new(|| {
  let mut set = HashSet::<TT>::new();
  set.insert(TT::KeywordImplements);
  set.insert(TT::KeywordInterface);
  set.insert(TT::KeywordLet);
  set.insert(TT::KeywordPackage);
  set.insert(TT::KeywordPrivate);
  set.insert(TT::KeywordProtected);
  set.insert(TT::KeywordPublic);
  set.insert(TT::KeywordStatic);
  set.insert(TT::KeywordYield);
  set
});

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub enum CommentKind {
  Hashbang,
  // `<!--` or line-leading `-->`.
  Html,
  Multiline,
  Single,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, Serialize)]
pub struct Comment {
  pub kind: CommentKind,
  pub loc: Loc,
}

#[derive(Clone, Debug)]
pub struct Token {
  pub loc: Loc,
  // Whether one or more whitespace characters appear immediately before this token, and at least
  // one of those whitespace characters is a line terminator.
  pub preceded_by_line_terminator: bool,
  pub typ: TT,
  // Comments between the previous token and this one. Empty for the vast majority of tokens, so this doesn't allocate.
  pub comments: Vec<Comment>,
  // Set on `TT::Invalid` tokens to describe what the lexer couldn't handle.
  pub lex_error: Option<SyntaxErrorType>,
}

impl Token {
  /// Creates an error at this token. If this is an invalid token, the lexer's own classification takes priority over `typ`.
  pub fn error(&self, typ: SyntaxErrorType) -> SyntaxError {
    self.loc.error(self.lex_error.unwrap_or(typ), Some(self.typ))
  }
}
