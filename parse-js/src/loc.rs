use crate::error::SyntaxError;
use crate::error::SyntaxErrorType;
use crate::token::TT;
use serde::Serialize;
use std::cmp::max;
use std::cmp::min;
use std::ops::Add;
use std::ops::AddAssign;

/// A location within the current source file expressed as UTF-8 byte offsets.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, PartialOrd, Ord, Serialize)]
pub struct Loc(pub usize, pub usize);

impl Loc {
  /// Creates a best-effort location for synthetic nodes where only one side of
  /// the range is known.
  ///
  /// If both bounds are missing, an empty location at offset 0 is returned.
  pub fn best_effort(start: Option<Loc>, end: Option<Loc>) -> Loc {
    match (start, end) {
      (Some(mut start), Some(end)) => {
        start.extend(end);
        start
      }
      (Some(start), None) => start,
      (None, Some(end)) => end,
      (None, None) => Loc(0, 0),
    }
  }

  pub fn error(self, typ: SyntaxErrorType, actual_token: Option<TT>) -> SyntaxError {
    SyntaxError::new(typ, self, actual_token)
  }

  pub fn is_empty(&self) -> bool {
    self.0 >= self.1
  }

  pub fn len(&self) -> usize {
    self.1 - self.0
  }

  pub fn contains(&self, other: Loc) -> bool {
    self.0 <= other.0 && other.1 <= self.1
  }

  pub fn extend(&mut self, other: Loc) {
    self.0 = min(self.0, other.0);
    self.1 = max(self.1, other.1);
  }

  pub fn add_option(self, rhs: Option<Loc>) -> Loc {
    let mut new = self;
    if let Some(rhs) = rhs {
      new.extend(rhs);
    };
    new
  }
}

impl Add for Loc {
  type Output = Loc;

  fn add(self, rhs: Self) -> Self::Output {
    let mut new = self;
    new.extend(rhs);
    new
  }
}

impl AddAssign for Loc {
  fn add_assign(&mut self, rhs: Self) {
    self.extend(rhs);
  }
}

/// A resolved human-facing position. `line` is 1-based, `column` is a 0-based count of chars.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize)]
pub struct SourcePos {
  pub line: usize,
  pub column: usize,
}

/// Maps byte offsets to line and column numbers.
///
/// Lines are split on `\n`, `\r\n`, `\r`, U+2028 and U+2029, matching what the lexer considers a line terminator.
pub struct LineIndex<'a> {
  source: &'a str,
  line_starts: Vec<usize>,
}

impl<'a> LineIndex<'a> {
  pub fn new(source: &'a str) -> LineIndex<'a> {
    let mut line_starts = vec![0];
    let mut iter = source.char_indices().peekable();
    while let Some((i, c)) = iter.next() {
      match c {
        '\r' => {
          if iter.peek().is_some_and(|(_, n)| *n == '\n') {
            iter.next();
            line_starts.push(i + 2);
          } else {
            line_starts.push(i + 1);
          }
        }
        '\n' | '\u{2028}' | '\u{2029}' => line_starts.push(i + c.len_utf8()),
        _ => {}
      };
    }
    LineIndex {
      source,
      line_starts,
    }
  }

  pub fn line_count(&self) -> usize {
    self.line_starts.len()
  }

  pub fn position(&self, offset: usize) -> SourcePos {
    let offset = min(offset, self.source.len());
    let line = match self.line_starts.binary_search(&offset) {
      Ok(i) => i,
      Err(i) => i - 1,
    };
    let start = self.line_starts[line];
    // Offsets inside a multibyte char count up to the char start.
    let column = self.source[start..]
      .char_indices()
      .take_while(|(i, _)| start + i < offset)
      .count();
    SourcePos {
      line: line + 1,
      column,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn best_effort_loc_prefers_known_bounds() {
    let start = Loc(1, 2);
    let end = Loc(5, 6);
    assert_eq!(Loc::best_effort(Some(start), Some(end)), Loc(1, 6));
    assert_eq!(Loc::best_effort(Some(start), None), start);
    assert_eq!(Loc::best_effort(None, Some(end)), end);
    assert_eq!(Loc::best_effort(None, None), Loc(0, 0));
  }

  #[test]
  fn line_index_handles_all_terminators() {
    let src = "a\nbc\r\nd\re\u{2028}f";
    let idx = LineIndex::new(src);
    assert_eq!(idx.line_count(), 5);
    assert_eq!(idx.position(0), SourcePos { line: 1, column: 0 });
    assert_eq!(idx.position(3), SourcePos { line: 2, column: 1 });
    assert_eq!(idx.position(6), SourcePos { line: 3, column: 0 });
    assert_eq!(idx.position(8), SourcePos { line: 4, column: 0 });
    assert_eq!(idx.position(src.len()), SourcePos { line: 5, column: 1 });
  }

  #[test]
  fn line_index_counts_chars_not_bytes() {
    let src = "é = 1";
    let idx = LineIndex::new(src);
    assert_eq!(idx.position(3), SourcePos { line: 1, column: 2 });
  }
}
