mod expr;
mod stmt;

use super::Parser;
use crate::lex::LexMode;
use crate::lex::Lexer;
use crate::options::ParseOptions;
use crate::token::TT;

#[test]
fn test_parser() {
  let lexer = Lexer::new("let x = /a/ / 1;");
  let mut p = Parser::new(lexer, ParseOptions::default());
  // Initial state.
  let cp = p.checkpoint();
  assert_eq!(p.next_tok_i, 0);

  // Peek the first token.
  let t = p.peek();
  assert_eq!(p.next_tok_i, 0);
  assert_eq!(p.buf.len(), 1);
  assert_eq!(t.typ, TT::KeywordLet);

  // Consume the first token.
  let t = p.consume();
  assert_eq!(p.next_tok_i, 1);
  assert_eq!(p.buf.len(), 1);
  assert_eq!(t.typ, TT::KeywordLet);

  // Consume the second token.
  let t = p.consume();
  assert_eq!(p.next_tok_i, 2);
  assert_eq!(p.buf.len(), 2);
  assert_eq!(t.typ, TT::Identifier);

  // Reset to a past point.
  p.restore_checkpoint(cp);
  assert_eq!(p.next_tok_i, 0);
  assert_eq!(p.buf.len(), 2);

  // Peek using a different mode, which should truncate the buffer.
  let t = p.peek_with_mode(LexMode::SlashIsRegex);
  assert_eq!(p.next_tok_i, 0);
  assert_eq!(p.buf.len(), 1);
  assert_eq!(t.typ, TT::KeywordLet);
}

#[test]
fn since_checkpoint_spans_consumed_tokens() {
  let mut p = Parser::new(Lexer::new("  a  +  b"), ParseOptions::default());
  let start = p.checkpoint();
  assert_eq!(p.since_checkpoint(&start).0, 0);
  p.consume();
  p.consume();
  let loc = p.since_checkpoint(&start);
  assert_eq!((loc.0, loc.1), (2, 6));
}

#[test]
fn nesting_limit() {
  let opts = ParseOptions {
    max_depth: 32,
    ..Default::default()
  };
  let deep = format!("{}1{}", "(".repeat(64), ")".repeat(64));
  let err = crate::parse_with_options(&deep, &opts).unwrap_err();
  assert_eq!(err.typ, crate::error::SyntaxErrorType::NestingTooDeep);
  assert!(crate::parse_with_options("((((1))))", &opts).is_ok());
}
