use crate::error::SyntaxError;
use crate::loc::LineIndex;
use crate::loc::Loc;
use serde::Serialize;
use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::fmt::Formatter;

/// A positioned, user-facing report of a fatal error in one compilation unit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
  pub code: &'static str,
  pub message: String,
  pub filename: Option<String>,
  /// 1-based.
  pub line: usize,
  /// 0-based, in chars.
  pub column: usize,
  /// Byte offset into the source.
  pub offset: usize,
}

impl Diagnostic {
  pub fn new(
    code: &'static str,
    message: String,
    loc: Loc,
    filename: Option<&str>,
    lines: &LineIndex,
  ) -> Diagnostic {
    let pos = lines.position(loc.0);
    Diagnostic {
      code,
      message,
      filename: filename.map(|f| f.to_string()),
      line: pos.line,
      column: pos.column,
      offset: loc.0,
    }
  }

  pub fn from_syntax_error(err: &SyntaxError, source: &str, filename: Option<&str>) -> Diagnostic {
    Diagnostic::new(
      err.typ.code(),
      err.message(),
      err.loc,
      filename,
      &LineIndex::new(source),
    )
  }
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{}:{}:{}: error[{}]: {}",
      self.filename.as_deref().unwrap_or("<input>"),
      self.line,
      self.column,
      self.code,
      self.message
    )
  }
}

impl Error for Diagnostic {}
