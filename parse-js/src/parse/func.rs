use super::expr::pat::ParsePatternRules;
use super::ParseCtx;
use super::Parser;
use super::ParserCheckpoint;
use crate::ast::expr::pat::ClassOrFuncName;
use crate::ast::expr::pat::Pat;
use crate::ast::func::Func;
use crate::ast::func::FuncBody;
use crate::ast::node::Node;
use crate::ast::node::StrictMode;
use crate::ast::stmt::decl::ParamDecl;
use crate::ast::stmt::Stmt;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::loc::Loc;
use crate::token::TT;
use ahash::HashSet;
use ahash::HashSetExt;

/// What kind of function is being parsed. This decides where `await`, `yield`, `super` and `new.target` can appear inside it.
#[derive(Clone, Copy, Debug, Default)]
pub struct FuncKind {
  pub arrow: bool,
  pub async_: bool,
  pub generator: bool,
  // Object and class methods, including getters, setters and constructors.
  pub method: bool,
  pub derived_constructor: bool,
}

impl FuncKind {
  pub fn plain(async_: bool, generator: bool) -> FuncKind {
    FuncKind {
      async_,
      generator,
      ..Default::default()
    }
  }

  pub fn method(async_: bool, generator: bool) -> FuncKind {
    FuncKind {
      async_,
      generator,
      method: true,
      ..Default::default()
    }
  }
}

/// A parameter list is simple if it only has plain identifiers, with no defaults, destructuring or rest.
pub fn is_simple_parameter_list(params: &[Node<ParamDecl>]) -> bool {
  params.iter().all(|param| {
    !param.stx.rest
      && param.stx.default_value.is_none()
      && matches!(param.stx.pattern.stx.pat.stx.as_ref(), Pat::Id(_))
  })
}

/// Collects the identifiers a binding pattern declares, in source order.
pub fn collect_bound_names(pat: &Node<Pat>, out: &mut Vec<(String, Loc)>) {
  match pat.stx.as_ref() {
    Pat::Id(id) => out.push((id.stx.name.clone(), id.loc)),
    Pat::Arr(arr) => {
      for elem in arr.stx.elements.iter().flatten() {
        collect_bound_names(&elem.target, out);
      }
      if let Some(rest) = &arr.stx.rest {
        collect_bound_names(rest, out);
      }
    }
    Pat::Obj(obj) => {
      for prop in obj.stx.properties.iter() {
        collect_bound_names(&prop.stx.target, out);
      }
      if let Some(rest) = &obj.stx.rest {
        collect_bound_names(rest, out);
      }
    }
    // Only in assignments, which don't declare anything.
    Pat::AssignTarget(_) => {}
  }
}

impl<'a> Parser<'a> {
  /// The context inside a function's body.
  pub fn func_ctx(&self, ctx: ParseCtx, kind: FuncKind) -> ParseCtx {
    if kind.arrow {
      // Arrow functions see the `this`, `super` and `new.target` of their enclosing code.
      return ParseCtx {
        rules: ParsePatternRules {
          await_allowed: !kind.async_ && ctx.rules.await_allowed && !ctx.in_async,
          yield_allowed: ctx.rules.yield_allowed && !ctx.in_generator,
        },
        top_level: false,
        in_function: true,
        in_async: kind.async_,
        in_generator: false,
        ..ctx
      };
    };
    ParseCtx {
      rules: ParsePatternRules {
        await_allowed: !kind.async_ && !self.options().is_module(),
        yield_allowed: !kind.generator,
      },
      top_level: false,
      in_function: true,
      in_async: kind.async_,
      in_generator: kind.generator,
      new_target_allowed: true,
      super_prop_allowed: kind.method,
      super_call_allowed: kind.derived_constructor,
    }
  }

  /// The context of a function's parameters, where `await` and `yield` are neither identifiers nor operators if the function is async or a generator.
  pub fn func_params_ctx(&self, ctx: ParseCtx, kind: FuncKind) -> ParseCtx {
    ParseCtx {
      in_async: false,
      in_generator: false,
      ..self.func_ctx(ctx, kind)
    }
  }

  pub fn func_params(&mut self, ctx: ParseCtx) -> SyntaxResult<Vec<Node<ParamDecl>>> {
    self.require(TT::ParenthesisOpen)?;
    let mut parameters = Vec::new();
    while !self.consume_if(TT::ParenthesisClose).is_match() {
      let param = self.with_loc(|p| {
        let rest = p.consume_if(TT::DotDotDot).is_match();
        let pattern = p.pat_decl(ctx)?;
        let default_value = p
          .consume_if(TT::Equals)
          .and_then(|| p.expr(ctx, [TT::Comma, TT::ParenthesisClose]))?;
        if rest {
          if let Some(d) = &default_value {
            return Err(d.error(SyntaxErrorType::ExpectedSyntax("rest parameter without default")));
          };
        };
        Ok(ParamDecl {
          rest,
          pattern,
          default_value,
        })
      })?;
      let rest = param.stx.rest;
      parameters.push(param);
      if rest {
        let t = self.consume();
        if t.typ != TT::ParenthesisClose {
          return Err(t.error(SyntaxErrorType::RestElementNotLast));
        };
        break;
      };
      if !self.consume_if(TT::Comma).is_match() {
        self.require(TT::ParenthesisClose)?;
        break;
      };
    }
    Ok(parameters)
  }

  /// Parses a braced function body. The caller must have entered the function's directive scope.
  pub fn func_block_body(&mut self, ctx: ParseCtx, simple_params: bool) -> SyntaxResult<Vec<Node<Stmt>>> {
    self.require(TT::BraceOpen)?;
    let body = self.stmts_with_directives(ctx, TT::BraceClose, simple_params)?;
    self.require(TT::BraceClose)?;
    Ok(body)
  }

  /// Checks a function's name and parameters once its body (and therefore its strictness) is known.
  fn validate_func_signature(
    &self,
    ctx: ParseCtx,
    kind: FuncKind,
    name: Option<&Node<ClassOrFuncName>>,
    params: &[Node<ParamDecl>],
    simple: bool,
  ) -> SyntaxResult<()> {
    let mut bound = Vec::new();
    for param in params {
      collect_bound_names(&param.stx.pattern.stx.pat, &mut bound);
    }
    let strict = self.is_strict();
    if strict || !simple || kind.arrow || kind.method {
      let mut seen = HashSet::new();
      for (name, loc) in bound.iter() {
        if !seen.insert(name.as_str()) {
          return Err(loc.error(SyntaxErrorType::DuplicateParameter, None));
        };
      }
    };
    if kind.async_ {
      if let Some((_, loc)) = bound.iter().find(|(n, _)| n == "await") {
        return Err(loc.error(SyntaxErrorType::AwaitNotAllowed, Some(TT::KeywordAwait)));
      };
    };
    if strict {
      // A `"use strict"` body also applies to the function's own name and parameters.
      if let Some(name) = name {
        self.validate_identifier(ctx, &name.stx.name, name.loc, true)?;
      };
      for (name, loc) in bound {
        self.validate_identifier(ctx, &name, loc, true)?;
      }
    };
    Ok(())
  }

  /// Parses a non-arrow function's parameters and body, starting at `(`. `name` is rechecked if the body turns out to be strict.
  pub fn func(
    &mut self,
    ctx: ParseCtx,
    kind: FuncKind,
    name: Option<&Node<ClassOrFuncName>>,
  ) -> SyntaxResult<Node<Func>> {
    let body_ctx = self.func_ctx(ctx, kind);
    let params_ctx = self.func_params_ctx(ctx, kind);
    self.enter_directive_scope(false);
    let res = self.with_loc(|p| {
      let parameters = p.func_params(params_ctx)?;
      let simple = is_simple_parameter_list(&parameters);
      let body = p.func_block_body(body_ctx, simple)?;
      p.validate_func_signature(params_ctx, kind, name, &parameters, simple)?;
      Ok(Func {
        arrow: false,
        async_: kind.async_,
        generator: kind.generator,
        parameters,
        body: FuncBody::Block(body),
      })
    });
    let strict = self.exit_directive_scope();
    let mut func = res?;
    if strict {
      func.assoc.set(StrictMode);
    };
    Ok(func)
  }

  /// Parses the `=>` and body of an arrow function whose parameters have already been parsed from `start`.
  pub fn arrow_func<const N: usize>(
    &mut self,
    ctx: ParseCtx,
    start: &ParserCheckpoint,
    async_: bool,
    parameters: Vec<Node<ParamDecl>>,
    terminators: [TT; N],
  ) -> SyntaxResult<Node<Func>> {
    let arrow = self.require(TT::EqualsChevronRight)?;
    if arrow.preceded_by_line_terminator {
      return Err(arrow.error(SyntaxErrorType::LineTerminatorAfterArrowFunctionParameters));
    };
    let kind = FuncKind {
      arrow: true,
      async_,
      ..Default::default()
    };
    let body_ctx = self.func_ctx(ctx, kind);
    let simple = is_simple_parameter_list(&parameters);
    let assignment_prec = self.assignment_prec();
    self.enter_directive_scope(false);
    let res = (|| -> SyntaxResult<FuncBody> {
      let body = if self.peek().typ == TT::BraceOpen {
        FuncBody::Block(self.func_block_body(body_ctx, simple)?)
      } else {
        FuncBody::Expression(self.expr_with_min_prec(body_ctx, assignment_prec, terminators)?)
      };
      self.validate_func_signature(ctx, kind, None, &parameters, simple)?;
      Ok(body)
    })();
    let strict = self.exit_directive_scope();
    let body = res?;
    let mut func = Node::new(self.since_checkpoint(start), Func {
      arrow: true,
      async_,
      generator: false,
      parameters,
      body,
    });
    if strict {
      func.assoc.set(StrictMode);
    };
    Ok(func)
  }
}

#[cfg(test)]
mod tests {
  use crate::ast::expr::Expr;
  use crate::ast::node::StrictMode;
  use crate::ast::stmt::Stmt;
  use crate::error::SyntaxErrorType;
  use crate::parse;

  fn err(src: &str) -> SyntaxErrorType {
    parse(src).unwrap_err().typ
  }

  #[test]
  fn duplicate_parameters() {
    assert!(parse("function f(a, a) {}").is_ok());
    assert_eq!(err("function f(a, a) { 'use strict' }"), SyntaxErrorType::DuplicateParameter);
    assert_eq!(err("function f(a, [a]) {}"), SyntaxErrorType::DuplicateParameter);
    assert_eq!(err("(a, a) => 1"), SyntaxErrorType::DuplicateParameter);
    assert_eq!(err("({ m(a, a) {} })"), SyntaxErrorType::DuplicateParameter);
  }

  #[test]
  fn strict_body_rechecks_signature() {
    assert_eq!(
      err("function eval() { 'use strict' }"),
      SyntaxErrorType::StrictModeEvalOrArguments
    );
    assert_eq!(
      err("function f(arguments) { 'use strict' }"),
      SyntaxErrorType::StrictModeEvalOrArguments
    );
    assert_eq!(
      err("function f(a = 1) { 'use strict' }"),
      SyntaxErrorType::UseStrictWithNonSimpleParameters
    );
  }

  #[test]
  fn marks_strict_functions() {
    let top = parse("function f() { 'use strict'; } function g() {}").unwrap();
    let strict = top
      .stx
      .body
      .iter()
      .map(|s| match s.stx.as_ref() {
        Stmt::FunctionDecl(d) => d.stx.function.assoc.has::<StrictMode>(),
        _ => unreachable!(),
      })
      .collect::<Vec<_>>();
    assert_eq!(strict, vec![true, false]);
  }

  #[test]
  fn rest_parameter_must_be_last() {
    assert_eq!(err("function f(...a, b) {}"), SyntaxErrorType::RestElementNotLast);
    assert!(parse("function f(a, ...[b, c]) {}").is_ok());
  }

  #[test]
  fn arrow_body_keeps_enclosing_context() {
    let top = parse("async function f() { return async x => await x; }").unwrap();
    assert_eq!(top.stx.body.len(), 1);
    assert_eq!(err("async function f() { () => await 1; }"), SyntaxErrorType::AwaitNotAllowed);
    assert_eq!(err("async (await) => 1"), SyntaxErrorType::AwaitNotAllowed);
  }

  #[test]
  fn arrow_line_terminator() {
    assert_eq!(
      err("(a)\n=> a"),
      SyntaxErrorType::LineTerminatorAfterArrowFunctionParameters
    );
    let top = parse("x => x").unwrap();
    assert!(matches!(top.stx.body[0].stx.as_ref(), Stmt::Expr(e) if matches!(e.stx.expr.stx.as_ref(), Expr::ArrowFunc(_))));
  }
}
