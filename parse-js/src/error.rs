use crate::loc::Loc;
use crate::token::TT;
use core::fmt;
use core::fmt::Debug;
use core::fmt::Formatter;
use std::error::Error;
use std::fmt::Display;

/// A stable classification of syntax errors produced by the lexer and parser.
///
/// Diagnostic codes (prefix `PS`) are assigned per variant and are stable; see [`SyntaxErrorType::code`].
/// Lexical failures (unterminated literals, bad escapes, malformed numbers) are also represented here, as
/// the lexer only ever emits `TT::Invalid` and the parser classifies the failure when it encounters that token.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum SyntaxErrorType {
  ExpectedNotFound,
  ExpectedSyntax(&'static str),
  InvalidAssigmentTarget,
  InvalidCharacterEscape,
  LineTerminatorAfterArrowFunctionParameters,
  LineTerminatorAfterThrow,
  LineTerminatorInRegex,
  LineTerminatorInString,
  MalformedLiteralBigInt,
  MalformedLiteralNumber,
  RequiredTokenNotFound(TT),
  TryStatementHasNoCatchOrFinally,
  UnexpectedEnd,
  // Lexical.
  InvalidCharacter,
  InvalidRegexFlags,
  UnterminatedComment,
  UnterminatedRegex,
  UnterminatedString,
  UnterminatedTemplate,
  // Patterns and declarations.
  DuplicateParameter,
  InvalidCoverInitializedName,
  InvalidDestructuringTarget,
  RestElementNotLast,
  DuplicateProtoProperty,
  DuplicateConstructor,
  InvalidAccessorParameters,
  LexicalDeclarationNotAllowed,
  // Strict mode.
  StrictModeDeleteIdentifier,
  StrictModeEvalOrArguments,
  StrictModeLegacyOctal,
  StrictModeReservedWord,
  StrictModeWith,
  UseStrictWithNonSimpleParameters,
  // Context restricted keywords.
  ReservedWord,
  AwaitNotAllowed,
  YieldNotAllowed,
  ReturnOutsideFunction,
  ModuleSyntaxOutsideModule,
  NewTargetOutsideFunction,
  SuperOutsideMethod,
  InvalidOptionalChain,
  NestingTooDeep,
}

#[derive(Clone)]
pub struct SyntaxError {
  pub typ: SyntaxErrorType,
  pub loc: Loc,
  pub actual_token: Option<TT>,
}

impl SyntaxError {
  pub fn new(typ: SyntaxErrorType, loc: Loc, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError {
      typ,
      loc,
      actual_token,
    }
  }

  pub fn message(&self) -> String {
    self.typ.message(self.actual_token)
  }
}

impl Debug for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} around loc [{}:{}]", self, self.loc.0, self.loc.1)
  }
}

impl Display for SyntaxError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.typ.code(), self.message())
  }
}

impl Error for SyntaxError {}

impl PartialEq for SyntaxError {
  fn eq(&self, other: &Self) -> bool {
    self.typ == other.typ
  }
}

impl Eq for SyntaxError {}

pub type SyntaxResult<T> = Result<T, SyntaxError>;

impl SyntaxErrorType {
  /// Stable diagnostic code for this syntax error variant.
  pub fn code(&self) -> &'static str {
    match self {
      SyntaxErrorType::ExpectedNotFound => "PS0001",
      SyntaxErrorType::ExpectedSyntax(_) => "PS0002",
      SyntaxErrorType::InvalidAssigmentTarget => "PS0003",
      SyntaxErrorType::InvalidCharacterEscape => "PS0004",
      SyntaxErrorType::LineTerminatorAfterArrowFunctionParameters => "PS0006",
      SyntaxErrorType::LineTerminatorAfterThrow => "PS0007",
      SyntaxErrorType::LineTerminatorInRegex => "PS0009",
      SyntaxErrorType::LineTerminatorInString => "PS0010",
      SyntaxErrorType::MalformedLiteralBigInt => "PS0011",
      SyntaxErrorType::MalformedLiteralNumber => "PS0012",
      SyntaxErrorType::RequiredTokenNotFound(_) => "PS0013",
      SyntaxErrorType::TryStatementHasNoCatchOrFinally => "PS0014",
      SyntaxErrorType::UnexpectedEnd => "PS0015",
      SyntaxErrorType::InvalidCharacter => "PS0016",
      SyntaxErrorType::InvalidRegexFlags => "PS0017",
      SyntaxErrorType::UnterminatedComment => "PS0018",
      SyntaxErrorType::UnterminatedRegex => "PS0019",
      SyntaxErrorType::UnterminatedString => "PS0020",
      SyntaxErrorType::UnterminatedTemplate => "PS0021",
      SyntaxErrorType::DuplicateParameter => "PS0022",
      SyntaxErrorType::InvalidCoverInitializedName => "PS0023",
      SyntaxErrorType::InvalidDestructuringTarget => "PS0024",
      SyntaxErrorType::RestElementNotLast => "PS0025",
      SyntaxErrorType::DuplicateProtoProperty => "PS0026",
      SyntaxErrorType::DuplicateConstructor => "PS0027",
      SyntaxErrorType::InvalidAccessorParameters => "PS0028",
      SyntaxErrorType::LexicalDeclarationNotAllowed => "PS0029",
      SyntaxErrorType::StrictModeDeleteIdentifier => "PS0030",
      SyntaxErrorType::StrictModeEvalOrArguments => "PS0031",
      SyntaxErrorType::StrictModeLegacyOctal => "PS0032",
      SyntaxErrorType::StrictModeReservedWord => "PS0033",
      SyntaxErrorType::StrictModeWith => "PS0034",
      SyntaxErrorType::UseStrictWithNonSimpleParameters => "PS0035",
      SyntaxErrorType::ReservedWord => "PS0036",
      SyntaxErrorType::AwaitNotAllowed => "PS0037",
      SyntaxErrorType::YieldNotAllowed => "PS0038",
      SyntaxErrorType::ReturnOutsideFunction => "PS0039",
      SyntaxErrorType::ModuleSyntaxOutsideModule => "PS0040",
      SyntaxErrorType::NewTargetOutsideFunction => "PS0041",
      SyntaxErrorType::SuperOutsideMethod => "PS0042",
      SyntaxErrorType::InvalidOptionalChain => "PS0043",
      SyntaxErrorType::NestingTooDeep => "PS0044",
    }
  }

  /// Human-readable message describing this syntax error.
  pub fn message(&self, actual_token: Option<TT>) -> String {
    let msg: String = match self {
      SyntaxErrorType::ExpectedNotFound => "expected token not found".into(),
      SyntaxErrorType::ExpectedSyntax(expected) => format!("expected {}", expected),
      SyntaxErrorType::InvalidAssigmentTarget => "invalid assignment target".into(),
      SyntaxErrorType::InvalidCharacterEscape => "invalid character escape".into(),
      SyntaxErrorType::LineTerminatorAfterArrowFunctionParameters => {
        "line terminator not allowed after arrow function parameters".into()
      }
      SyntaxErrorType::LineTerminatorAfterThrow => {
        "line terminator not allowed after `throw`".into()
      }
      SyntaxErrorType::LineTerminatorInRegex => {
        "line terminator not allowed in regular expression".into()
      }
      SyntaxErrorType::LineTerminatorInString => {
        "line terminator not allowed in string literal".into()
      }
      SyntaxErrorType::MalformedLiteralBigInt => "malformed bigint literal".into(),
      SyntaxErrorType::MalformedLiteralNumber => "malformed number literal".into(),
      SyntaxErrorType::RequiredTokenNotFound(token) => format!("expected token {:?}", token),
      SyntaxErrorType::TryStatementHasNoCatchOrFinally => {
        "try statement requires a catch or finally block".into()
      }
      SyntaxErrorType::UnexpectedEnd => "unexpected end of input".into(),
      SyntaxErrorType::InvalidCharacter => "invalid or unexpected character".into(),
      SyntaxErrorType::InvalidRegexFlags => "invalid regular expression flags".into(),
      SyntaxErrorType::UnterminatedComment => "unterminated multiline comment".into(),
      SyntaxErrorType::UnterminatedRegex => "unterminated regular expression".into(),
      SyntaxErrorType::UnterminatedString => "unterminated string literal".into(),
      SyntaxErrorType::UnterminatedTemplate => "unterminated template literal".into(),
      SyntaxErrorType::DuplicateParameter => "duplicate parameter name not allowed in this context".into(),
      SyntaxErrorType::InvalidCoverInitializedName => {
        "shorthand property initializer is only valid in a destructuring pattern".into()
      }
      SyntaxErrorType::InvalidDestructuringTarget => "invalid destructuring target".into(),
      SyntaxErrorType::RestElementNotLast => "rest element must be last and cannot have a trailing comma or initializer".into(),
      SyntaxErrorType::DuplicateProtoProperty => "duplicate `__proto__` property in object literal".into(),
      SyntaxErrorType::DuplicateConstructor => "a class may only have one constructor".into(),
      SyntaxErrorType::InvalidAccessorParameters => "invalid number of accessor parameters".into(),
      SyntaxErrorType::LexicalDeclarationNotAllowed => {
        "lexical declaration cannot appear in a single-statement context".into()
      }
      SyntaxErrorType::StrictModeDeleteIdentifier => {
        "`delete` of an unqualified identifier is not allowed in strict mode".into()
      }
      SyntaxErrorType::StrictModeEvalOrArguments => {
        "`eval` or `arguments` cannot be a binding or assignment target in strict mode".into()
      }
      SyntaxErrorType::StrictModeLegacyOctal => {
        "legacy octal literals and escapes are not allowed in strict mode".into()
      }
      SyntaxErrorType::StrictModeReservedWord => "unexpected reserved word in strict mode".into(),
      SyntaxErrorType::StrictModeWith => "`with` statements are not allowed in strict mode".into(),
      SyntaxErrorType::UseStrictWithNonSimpleParameters => {
        "\"use strict\" not allowed in function with non-simple parameters".into()
      }
      SyntaxErrorType::ReservedWord => "unexpected reserved word".into(),
      SyntaxErrorType::AwaitNotAllowed => "`await` is only valid in async functions and modules".into(),
      SyntaxErrorType::YieldNotAllowed => "`yield` is only valid in generator functions".into(),
      SyntaxErrorType::ReturnOutsideFunction => "`return` outside of function".into(),
      SyntaxErrorType::ModuleSyntaxOutsideModule => {
        "`import` and `export` may only appear at the top level of a module".into()
      }
      SyntaxErrorType::NewTargetOutsideFunction => "`new.target` outside of function".into(),
      SyntaxErrorType::SuperOutsideMethod => "`super` is only valid inside methods".into(),
      SyntaxErrorType::InvalidOptionalChain => "invalid optional chain".into(),
      SyntaxErrorType::NestingTooDeep => "nesting too deep".into(),
    };
    match actual_token {
      Some(TT::EOF) => format!("{}, found end of input", msg),
      Some(tok) => format!("{}, found {:?}", msg, tok),
      None => msg,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn message_mentions_expected_and_found() {
    let err = Loc(3, 4).error(
      SyntaxErrorType::RequiredTokenNotFound(TT::ParenthesisClose),
      Some(TT::BraceOpen),
    );
    assert_eq!(err.message(), "expected token ParenthesisClose, found BraceOpen");
    assert_eq!(err.to_string(), "PS0013 expected token ParenthesisClose, found BraceOpen");
  }

  #[test]
  fn eof_is_described_as_end_of_input() {
    let err = Loc(0, 0).error(SyntaxErrorType::ExpectedSyntax("expression"), Some(TT::EOF));
    assert_eq!(err.message(), "expected expression, found end of input");
  }
}
