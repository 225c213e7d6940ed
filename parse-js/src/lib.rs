use ast::node::Node;
use ast::stx::TopLevel;
use error::SyntaxResult;
use lex::Lexer;
use options::ParseOptions;
use parse::Parser;

pub mod ast;
pub mod char;
pub mod diagnostic;
pub mod error;
pub mod lex;
pub mod loc;
pub mod num;
pub mod operator;
pub mod options;
pub mod parse;
pub mod token;
pub mod util;

/// Parses a script with default options.
pub fn parse(source: &str) -> SyntaxResult<Node<TopLevel>> {
  parse_with_options(source, &ParseOptions::default())
}

pub fn parse_with_options(source: &str, options: &ParseOptions) -> SyntaxResult<Node<TopLevel>> {
  let mut lexer = Lexer::new(source);
  lexer.set_html_comments(options.allow_html_comments && !options.is_module());
  let mut parser = Parser::new(lexer, options.clone());
  parser.parse_top_level()
}
