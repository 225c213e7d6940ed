use super::Parser;
use crate::ast::node::Node;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::token::TT;
use derive_visitor::Drive;
use derive_visitor::DriveMut;

impl<'a> Parser<'a> {
  pub fn with_loc<S: Drive + DriveMut, F>(&mut self, f: F) -> SyntaxResult<Node<S>>
  where
    F: FnOnce(&mut Self) -> SyntaxResult<S>,
  {
    let start = self.checkpoint();
    let stx = f(self)?;
    Ok(Node::new(self.since_checkpoint(&start), stx))
  }

  pub fn repeat_until_tt<S, F>(&mut self, tt: TT, mut f: F) -> SyntaxResult<Vec<S>>
  where
    F: FnMut(&mut Self) -> SyntaxResult<S>,
  {
    let mut nodes = Vec::new();
    loop {
      let t = self.peek();
      if t.typ == tt {
        break;
      };
      if t.typ == TT::EOF {
        return Err(t.error(SyntaxErrorType::RequiredTokenNotFound(tt)));
      };
      nodes.push(f(self)?);
    }
    Ok(nodes)
  }

  pub fn repeat_until_tt_with_loc<S: Drive + DriveMut, F>(
    &mut self,
    tt: TT,
    mut f: F,
  ) -> SyntaxResult<Vec<Node<S>>>
  where
    F: FnMut(&mut Self) -> SyntaxResult<S>,
  {
    self.repeat_until_tt(tt, |p| p.with_loc(&mut f))
  }

  /// Parse a list of items separated by a delimiter until `close`, which will also be consumed.
  /// Allows for a trailing delimiter.
  pub fn list_with_loc<S: Drive + DriveMut, F>(
    &mut self,
    delim: TT,
    close: TT,
    mut f: F,
  ) -> SyntaxResult<Vec<Node<S>>>
  where
    F: FnMut(&mut Self) -> SyntaxResult<S>,
  {
    let mut nodes = Vec::new();
    while !self.consume_if(close).is_match() {
      nodes.push(self.with_loc(&mut f)?);
      // We require either the delimiter or the close token.
      // If the delimiter exists, it can still immediately be followed by the close token (trailing delimiter).
      if !self.consume_if(delim).is_match() {
        self.require(close)?;
        break;
      }
    }
    Ok(nodes)
  }

  /// Ends a statement with a semicolon, or inserts one where the next token is on a new line, is `}`, or is the end of input.
  pub fn require_semicolon_or_asi(&mut self) -> SyntaxResult<()> {
    let t = self.peek();
    match t.typ {
      TT::Semicolon => {
        self.consume();
        Ok(())
      }
      TT::BraceClose | TT::EOF => Ok(()),
      _ if t.preceded_by_line_terminator => Ok(()),
      _ => Err(t.error(SyntaxErrorType::ExpectedSyntax("`;` or line terminator"))),
    }
  }
}
