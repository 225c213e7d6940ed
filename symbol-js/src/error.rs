use parse_js::diagnostic::Diagnostic;
use parse_js::loc::LineIndex;
use parse_js::loc::Loc;
use std::error::Error;
use std::fmt;
use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;

/// Early errors found while building scopes. Codes (prefix `SC`) are stable; see [`ScopeErrorType::code`].
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum ScopeErrorType {
  /// `let`, `const` or `class` declared twice in one scope.
  Redeclaration,
  /// A lexical declaration and a `var`, parameter or function with the same name in one scope.
  LexicalVarCollision,
  /// `catch (e) { let e; }`
  CatchParameterRedeclared,
  DuplicateLabel,
  UnknownLabel,
  ContinueToNonLoopLabel,
  BreakOutsideLoop,
  ContinueOutsideLoop,
  /// `export { a }` where `a` isn't declared in the module.
  UnresolvedExport,
}

impl ScopeErrorType {
  pub fn code(&self) -> &'static str {
    match self {
      ScopeErrorType::Redeclaration => "SC0001",
      ScopeErrorType::LexicalVarCollision => "SC0002",
      ScopeErrorType::CatchParameterRedeclared => "SC0003",
      ScopeErrorType::DuplicateLabel => "SC0004",
      ScopeErrorType::UnknownLabel => "SC0005",
      ScopeErrorType::ContinueToNonLoopLabel => "SC0006",
      ScopeErrorType::BreakOutsideLoop => "SC0007",
      ScopeErrorType::ContinueOutsideLoop => "SC0008",
      ScopeErrorType::UnresolvedExport => "SC0009",
    }
  }

  pub fn message(&self, name: Option<&str>) -> String {
    let name = name.unwrap_or("");
    match self {
      ScopeErrorType::Redeclaration => format!("identifier `{}` has already been declared", name),
      ScopeErrorType::LexicalVarCollision => {
        format!("lexical declaration of `{}` conflicts with a var, parameter or function of the same name", name)
      }
      ScopeErrorType::CatchParameterRedeclared => {
        format!("`{}` is already declared as the catch parameter", name)
      }
      ScopeErrorType::DuplicateLabel => format!("label `{}` has already been declared", name),
      ScopeErrorType::UnknownLabel => format!("undefined label `{}`", name),
      ScopeErrorType::ContinueToNonLoopLabel => {
        format!("`continue` target `{}` is not a loop label", name)
      }
      ScopeErrorType::BreakOutsideLoop => "`break` outside of loop or switch".into(),
      ScopeErrorType::ContinueOutsideLoop => "`continue` outside of loop".into(),
      ScopeErrorType::UnresolvedExport => format!("export of undeclared binding `{}`", name),
    }
  }
}

#[derive(Clone, PartialEq, Eq)]
pub struct ScopeError {
  pub typ: ScopeErrorType,
  pub loc: Loc,
  pub name: Option<String>,
}

impl ScopeError {
  pub fn new(typ: ScopeErrorType, loc: Loc, name: Option<&str>) -> ScopeError {
    ScopeError {
      typ,
      loc,
      name: name.map(|n| n.to_string()),
    }
  }

  pub fn message(&self) -> String {
    self.typ.message(self.name.as_deref())
  }

  pub fn diagnostic(&self, source: &str, filename: Option<&str>) -> Diagnostic {
    Diagnostic::new(
      self.typ.code(),
      self.message(),
      self.loc,
      filename,
      &LineIndex::new(source),
    )
  }
}

impl Debug for ScopeError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} around loc [{}:{}]", self, self.loc.0, self.loc.1)
  }
}

impl Display for ScopeError {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.typ.code(), self.message())
  }
}

impl Error for ScopeError {}

pub type ScopeResult<T> = Result<T, ScopeError>;

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn renders_code_and_name() {
    let err = ScopeError::new(ScopeErrorType::Redeclaration, Loc(15, 16), Some("x"));
    assert_eq!(err.to_string(), "SC0001 identifier `x` has already been declared");
    let diag = err.diagnostic("{ let x;\n  let x; }", Some("in.js"));
    assert_eq!((diag.line, diag.column), (2, 6));
    assert_eq!(diag.code, "SC0001");
  }
}
