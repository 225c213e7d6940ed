use super::expr::pat::ParsePatternRules;
use super::ParseCtx;
use super::Parser;
use crate::ast::node::Node;
use crate::ast::node::StrictMode;
use crate::ast::stx::TopLevel;
use crate::error::SyntaxResult;
use crate::token::TT;

impl<'a> Parser<'a> {
  pub fn parse_top_level(&mut self) -> SyntaxResult<Node<TopLevel>> {
    let is_module = self.options().is_module();
    if self.options().allow_hashbang {
      self.skip_hashbang();
    };
    let ctx = ParseCtx {
      rules: ParsePatternRules {
        // `await` is reserved in modules, and is an operator at the top level of one.
        await_allowed: !is_module,
        yield_allowed: true,
      },
      top_level: true,
      in_function: self.options().allow_return_outside_function,
      in_async: is_module,
      in_generator: false,
      new_target_allowed: false,
      super_prop_allowed: false,
      super_call_allowed: false,
    };
    // Module code is always strict.
    self.enter_directive_scope(is_module);
    let body = self.stmts_with_directives(ctx, TT::EOF, true);
    let strict = self.exit_directive_scope();
    let body = body?;
    self.require(TT::EOF)?;
    let mut top_level_node = Node::new(self.source_range(), TopLevel { body });
    if strict {
      top_level_node.assoc.set(StrictMode);
    };
    let comments = self.take_comments();
    tracing::debug!(
      statements = top_level_node.stx.body.len(),
      comments = comments.len(),
      strict,
      module = is_module,
      "parsed top level"
    );
    top_level_node.assoc.set(comments);
    Ok(top_level_node)
  }
}
