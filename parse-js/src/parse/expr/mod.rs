pub mod lit;
pub mod pat;
pub mod util;

use pat::is_valid_pattern_identifier;
use util::assign_target;
use util::call_args_to_params;
use util::check_not_pattern_only;
use util::check_simple_target;
use util::cover_to_params;

use super::func::FuncKind;
use super::ParseCtx;
use super::Parser;
use super::ParserCheckpoint;
use crate::ast::expr::lit::LitBoolExpr;
use crate::ast::expr::lit::LitNullExpr;
use crate::ast::expr::lit::LitTemplateExpr;
use crate::ast::expr::pat::Pat;
use crate::ast::expr::ArrowFuncExpr;
use crate::ast::expr::BinaryExpr;
use crate::ast::expr::CallArg;
use crate::ast::expr::CallExpr;
use crate::ast::expr::ChainExpr;
use crate::ast::expr::ClassExpr;
use crate::ast::expr::ComputedMemberExpr;
use crate::ast::expr::CondExpr;
use crate::ast::expr::Expr;
use crate::ast::expr::FuncExpr;
use crate::ast::expr::IdExpr;
use crate::ast::expr::MemberExpr;
use crate::ast::expr::NewExpr;
use crate::ast::expr::NewTarget;
use crate::ast::expr::PrivateNameExpr;
use crate::ast::expr::SuperExpr;
use crate::ast::expr::TaggedTemplateExpr;
use crate::ast::expr::ThisExpr;
use crate::ast::expr::UnaryExpr;
use crate::ast::expr::UnaryPostfixExpr;
use crate::ast::expr::YieldExpr;
use crate::ast::node::EscapedIdentifier;
use crate::ast::node::Node;
use crate::ast::node::ParenthesizedExpr;
use crate::ast::stmt::decl::ParamDecl;
use crate::ast::stmt::decl::PatDecl;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::is_identifier_name;
use crate::lex::LexMode;
use crate::operator::Associativity;
use crate::operator::OperatorName;
use crate::operator::OPERATORS;
use crate::parse::operator::INFIX_OPERATOR_MAPPING;
use crate::parse::operator::PREFIX_OPERATOR_MAPPING;
use crate::token::TT;
use crate::token::UNRESERVED_KEYWORDS;

fn is_parenthesized(node: &Node<Expr>) -> bool {
  node.assoc.has::<ParenthesizedExpr>()
}

fn is_unparenthesized_binary(node: &Node<Expr>, operators: &[OperatorName]) -> bool {
  !is_parenthesized(node)
    && matches!(node.stx.as_ref(), Expr::Binary(b) if operators.contains(&b.stx.operator))
}

fn is_unparenthesized_arrow(node: &Node<Expr>) -> bool {
  !is_parenthesized(node) && matches!(node.stx.as_ref(), Expr::ArrowFunc(_))
}

impl<'a> Parser<'a> {
  pub fn prec(&self, name: OperatorName) -> u8 {
    OPERATORS[&name].precedence
  }

  /// The minimum precedence of an AssignmentExpression, i.e. anything but the comma operator.
  pub fn assignment_prec(&self) -> u8 {
    self.prec(OperatorName::Assignment)
  }

  /// Parses call arguments up to (but not including) the closing parenthesis. With `cover`, arguments may contain pattern-only syntax, as they may turn out to be async arrow function parameters.
  fn call_args_inner(&mut self, ctx: ParseCtx, cover: bool) -> SyntaxResult<Vec<Node<CallArg>>> {
    let mut args = Vec::new();
    while self.peek().typ != TT::ParenthesisClose {
      let arg = self.with_loc(|p| {
        let spread = p.consume_if(TT::DotDotDot).is_match();
        let value = if cover {
          p.expr_cover(ctx, [TT::Comma, TT::ParenthesisClose])?
        } else {
          p.expr(ctx, [TT::Comma, TT::ParenthesisClose])?
        };
        Ok(CallArg { spread, value })
      })?;
      args.push(arg);
      if !self.consume_if(TT::Comma).is_match() {
        break;
      };
    }
    Ok(args)
  }

  /// Parses `(args)`.
  pub fn call_args(&mut self, ctx: ParseCtx) -> SyntaxResult<Vec<Node<CallArg>>> {
    self.require(TT::ParenthesisOpen)?;
    let args = self.call_args_inner(ctx, false)?;
    self.require(TT::ParenthesisClose)?;
    Ok(args)
  }

  /// Parses an Expression, including the comma operator, stopping at any of `terminators`.
  pub fn expr<const N: usize>(
    &mut self,
    ctx: ParseCtx,
    terminators: [TT; N],
  ) -> SyntaxResult<Node<Expr>> {
    self.expr_with_min_prec(ctx, 1, terminators)
  }

  pub fn expr_with_min_prec<const N: usize>(
    &mut self,
    ctx: ParseCtx,
    min_prec: u8,
    terminators: [TT; N],
  ) -> SyntaxResult<Node<Expr>> {
    let expr = self.expr_cover_with_min_prec(ctx, min_prec, terminators)?;
    check_not_pattern_only(&expr)?;
    Ok(expr)
  }

  /// Parses an AssignmentExpression that may still be reinterpreted as a pattern, so pattern-only syntax like `{ a = 1 }` is left for the caller to reject.
  pub fn expr_cover<const N: usize>(
    &mut self,
    ctx: ParseCtx,
    terminators: [TT; N],
  ) -> SyntaxResult<Node<Expr>> {
    let min_prec = self.assignment_prec();
    self.expr_cover_with_min_prec(ctx, min_prec, terminators)
  }

  pub fn expr_cover_with_min_prec<const N: usize>(
    &mut self,
    ctx: ParseCtx,
    min_prec: u8,
    terminators: [TT; N],
  ) -> SyntaxResult<Node<Expr>> {
    self.nested(|p| p.binary_expr(ctx.nested(), min_prec, terminators))
  }

  fn binary_expr<const N: usize>(
    &mut self,
    ctx: ParseCtx,
    min_prec: u8,
    terminators: [TT; N],
  ) -> SyntaxResult<Node<Expr>> {
    let mut left = self.operand(ctx, min_prec, terminators)?;
    loop {
      let t = self.peek();
      if terminators.contains(&t.typ) {
        break;
      };

      if matches!(t.typ, TT::PlusPlus | TT::HyphenHyphen) {
        // `a \n ++b` is two statements.
        if t.preceded_by_line_terminator {
          break;
        };
        let operator = if t.typ == TT::PlusPlus {
          OperatorName::PostfixIncrement
        } else {
          OperatorName::PostfixDecrement
        };
        if self.prec(operator) < min_prec {
          break;
        };
        check_not_pattern_only(&left)?;
        check_simple_target(&left, self.is_strict())?;
        self.consume();
        left = Node::new(left.loc + t.loc, UnaryPostfixExpr {
          operator,
          argument: left,
        })
        .into_wrapped();
        continue;
      };

      let Some(&operator) = INFIX_OPERATOR_MAPPING.get(&t.typ) else {
        break;
      };
      if operator.precedence < min_prec {
        break;
      };
      if is_unparenthesized_arrow(&left) && operator.name != OperatorName::Comma {
        return Err(t.error(SyntaxErrorType::ExpectedSyntax(
          "parenthesized arrow function",
        )));
      };
      if operator.name != OperatorName::Assignment {
        check_not_pattern_only(&left)?;
      };
      self.consume();

      left = match operator.name {
        OperatorName::Conditional => {
          let assignment_prec = self.assignment_prec();
          let consequent = self.expr_with_min_prec(ctx, assignment_prec, [TT::Colon])?;
          self.require(TT::Colon)?;
          let alternate = self.expr_with_min_prec(ctx, assignment_prec, terminators)?;
          Node::new(left.loc + alternate.loc, CondExpr {
            test: left,
            consequent,
            alternate,
          })
          .into_wrapped()
        }
        name if name.is_assignment() => {
          let target = assign_target(left, name, self.is_strict())?;
          // Right associative, so the right side starts at the same precedence.
          let right = self.expr_with_min_prec(ctx, operator.precedence, terminators)?;
          Node::new(target.loc + right.loc, BinaryExpr {
            operator: name,
            left: target,
            right,
          })
          .into_wrapped()
        }
        name => {
          if name == OperatorName::Exponentiation
            && !is_parenthesized(&left)
            && matches!(left.stx.as_ref(), Expr::Unary(u) if !u.stx.operator.is_update())
          {
            return Err(t.error(SyntaxErrorType::ExpectedSyntax(
              "parenthesized unary expression before `**`",
            )));
          };
          let mixes_nullish = match name {
            OperatorName::NullishCoalescing => {
              is_unparenthesized_binary(&left, &[OperatorName::LogicalOr, OperatorName::LogicalAnd])
            }
            OperatorName::LogicalOr | OperatorName::LogicalAnd => {
              is_unparenthesized_binary(&left, &[OperatorName::NullishCoalescing])
            }
            _ => false,
          };
          if mixes_nullish {
            return Err(t.error(SyntaxErrorType::ExpectedSyntax(
              "parentheses when mixing `??` with `||` or `&&`",
            )));
          };
          let next_min_prec =
            operator.precedence + (operator.associativity == Associativity::Left) as u8;
          let right = self.expr_with_min_prec(ctx, next_min_prec, terminators)?;
          if name == OperatorName::NullishCoalescing
            && is_unparenthesized_binary(&right, &[OperatorName::LogicalOr, OperatorName::LogicalAnd])
          {
            return Err(t.error(SyntaxErrorType::ExpectedSyntax(
              "parentheses when mixing `??` with `||` or `&&`",
            )));
          };
          Node::new(left.loc + right.loc, BinaryExpr {
            operator: name,
            left,
            right,
          })
          .into_wrapped()
        }
      };
    }
    Ok(left)
  }

  /// Parses a prefix operator expression or a member/call expression.
  fn operand<const N: usize>(
    &mut self,
    ctx: ParseCtx,
    min_prec: u8,
    terminators: [TT; N],
  ) -> SyntaxResult<Node<Expr>> {
    let t = self.peek_with_mode(LexMode::SlashIsRegex);

    if let Some(&operator) = PREFIX_OPERATOR_MAPPING.get(&t.typ) {
      let node = self.with_loc(|p| {
        p.consume_with_mode(LexMode::SlashIsRegex);
        let argument = p.expr_with_min_prec(ctx, operator.precedence, terminators)?;
        if operator.name.is_update() {
          check_simple_target(&argument, p.is_strict())?;
        };
        if operator.name == OperatorName::Delete
          && p.is_strict()
          && matches!(argument.stx.as_ref(), Expr::Id(_))
        {
          return Err(argument.error(SyntaxErrorType::StrictModeDeleteIdentifier));
        };
        Ok(UnaryExpr {
          operator: operator.name,
          argument,
        })
      })?;
      return Ok(node.into_wrapped());
    };

    match t.typ {
      TT::KeywordAwait if ctx.in_async => {
        let prec = self.prec(OperatorName::Await);
        let node = self.with_loc(|p| {
          p.consume();
          let argument = p.expr_with_min_prec(ctx, prec, terminators)?;
          Ok(UnaryExpr {
            operator: OperatorName::Await,
            argument,
          })
        })?;
        return Ok(node.into_wrapped());
      }
      TT::KeywordYield if ctx.in_generator => {
        if min_prec > self.assignment_prec() {
          return Err(t.error(SyntaxErrorType::ExpectedSyntax("parenthesized yield")));
        };
        return self.yield_expr(ctx, terminators);
      }
      TT::KeywordNew => {
        let new = self.new_expr(ctx)?;
        return self.member_call_tail(ctx, new, true);
      }
      _ => {}
    };

    let primary = self.primary(ctx, min_prec, terminators)?;
    if is_unparenthesized_arrow(&primary) {
      return Ok(primary);
    };
    self.member_call_tail(ctx, primary, true)
  }

  fn yield_expr<const N: usize>(
    &mut self,
    ctx: ParseCtx,
    terminators: [TT; N],
  ) -> SyntaxResult<Node<Expr>> {
    let assignment_prec = self.assignment_prec();
    let node = self.with_loc(|p| {
      p.require(TT::KeywordYield)?;
      let star = p.peek();
      let delegate = !star.preceded_by_line_terminator && star.typ == TT::Asterisk;
      if delegate {
        p.consume();
      };
      let next = p.peek_with_mode(LexMode::SlashIsRegex);
      let ends = next.preceded_by_line_terminator
        || terminators.contains(&next.typ)
        || matches!(
          next.typ,
          TT::ParenthesisClose
            | TT::BracketClose
            | TT::BraceClose
            | TT::Comma
            | TT::Semicolon
            | TT::Colon
            | TT::EOF
        );
      let argument = if delegate || !ends {
        Some(p.expr_with_min_prec(ctx, assignment_prec, terminators)?)
      } else {
        None
      };
      Ok(YieldExpr { delegate, argument })
    })?;
    Ok(node.into_wrapped())
  }

  /// Parses `new.target` or `new Callee(args)`. The arguments are optional, and a `new` without them binds to the nearest callee, e.g. `new new A()()`.
  fn new_expr(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Expr>> {
    let start = self.checkpoint();
    let new = self.require(TT::KeywordNew)?;
    if self.consume_if(TT::Dot).is_match() {
      let prop = self.consume();
      if prop.typ != TT::Identifier || self.str(prop.loc) != "target" {
        return Err(prop.error(SyntaxErrorType::ExpectedSyntax("`target`")));
      };
      if !ctx.new_target_allowed {
        return Err(new.error(SyntaxErrorType::NewTargetOutsideFunction));
      };
      return Ok(Node::new(self.since_checkpoint(&start), NewTarget {}).into_wrapped());
    };
    let callee = self.nested(|p| {
      if p.peek().typ == TT::KeywordNew {
        return p.new_expr(ctx);
      };
      let min_prec = p.prec(OperatorName::New);
      let primary = p.primary(ctx, min_prec, [])?;
      p.member_call_tail(ctx, primary, false)
    })?;
    let arguments = if self.peek().typ == TT::ParenthesisOpen {
      self.call_args(ctx)?
    } else {
      Vec::new()
    };
    let mut node = Node::new(self.since_checkpoint(&start), NewExpr { callee, arguments });
    if let Some(annotations) = self.annotations_at(new.loc) {
      node.assoc.set(annotations);
    };
    Ok(node.into_wrapped())
  }

  /// Parses any member accesses, calls and tagged templates following `left`. Without `allow_call`, stops before a call, as the arguments belong to a `new`.
  pub fn member_call_tail(
    &mut self,
    ctx: ParseCtx,
    mut left: Node<Expr>,
    allow_call: bool,
  ) -> SyntaxResult<Node<Expr>> {
    let mut chain = false;
    loop {
      let t = self.peek();
      match t.typ {
        TT::ParenthesisOpen if !allow_call => break,
        TT::QuestionDot | TT::QuestionDotBracketOpen | TT::QuestionDotParenthesisOpen
          if !allow_call =>
        {
          return Err(t.error(SyntaxErrorType::InvalidOptionalChain));
        }
        TT::Dot
        | TT::QuestionDot
        | TT::BracketOpen
        | TT::QuestionDotBracketOpen
        | TT::ParenthesisOpen
        | TT::QuestionDotParenthesisOpen
        | TT::LiteralTemplatePartString
        | TT::LiteralTemplatePartStringEnd => {}
        _ => break,
      };
      check_not_pattern_only(&left)?;

      left = match t.typ {
        TT::Dot | TT::QuestionDot => {
          self.consume();
          let optional_chaining = t.typ == TT::QuestionDot;
          chain |= optional_chaining;
          let prop = self.consume();
          let right = match prop.typ {
            TT::PrivateMember => self.string(prop.loc),
            typ if is_identifier_name(typ) => self.identifier_name(&prop)?.0,
            _ => return Err(prop.error(SyntaxErrorType::ExpectedSyntax("property name"))),
          };
          Node::new(left.loc + prop.loc, MemberExpr {
            optional_chaining,
            left,
            right,
          })
          .into_wrapped()
        }
        TT::BracketOpen | TT::QuestionDotBracketOpen => {
          self.consume();
          let optional_chaining = t.typ == TT::QuestionDotBracketOpen;
          chain |= optional_chaining;
          let member = self.expr(ctx, [TT::BracketClose])?;
          let end = self.require(TT::BracketClose)?;
          Node::new(left.loc + end.loc, ComputedMemberExpr {
            optional_chaining,
            object: left,
            member,
          })
          .into_wrapped()
        }
        TT::ParenthesisOpen | TT::QuestionDotParenthesisOpen => {
          self.consume();
          let optional_chaining = t.typ == TT::QuestionDotParenthesisOpen;
          chain |= optional_chaining;
          let arguments = self.call_args_inner(ctx, false)?;
          let end = self.require(TT::ParenthesisClose)?;
          let annotations = self.annotations_at(left.loc);
          let mut node = Node::new(left.loc + end.loc, CallExpr {
            optional_chaining,
            callee: left,
            arguments,
          });
          if let Some(annotations) = annotations {
            node.assoc.set(annotations);
          };
          node.into_wrapped()
        }
        _ => {
          if chain {
            return Err(t.error(SyntaxErrorType::InvalidOptionalChain));
          };
          let start = self.checkpoint();
          let parts = self.lit_template_parts(ctx, true)?;
          Node::new(left.loc + self.since_checkpoint(&start), TaggedTemplateExpr {
            function: left,
            parts,
          })
          .into_wrapped()
        }
      };
    }
    if chain {
      left = left.wrap(|expression| ChainExpr { expression }).into_wrapped();
    };
    Ok(left)
  }

  pub fn id_expr(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Expr>> {
    let (t, name) = self.require_identifier(ctx, false)?;
    let mut node = Node::new(t.loc, IdExpr { name });
    if self.str(t.loc).contains('\\') {
      node.assoc.set(EscapedIdentifier);
    };
    Ok(node.into_wrapped())
  }

  fn arrow_expr<const N: usize>(
    &mut self,
    ctx: ParseCtx,
    start: &ParserCheckpoint,
    async_: bool,
    parameters: Vec<Node<ParamDecl>>,
    min_prec: u8,
    terminators: [TT; N],
  ) -> SyntaxResult<Node<Expr>> {
    if min_prec > self.assignment_prec() {
      return Err(self.peek().error(SyntaxErrorType::ExpectedSyntax(
        "parenthesized arrow function",
      )));
    };
    let func = self.arrow_func(ctx, start, async_, parameters, terminators)?;
    Ok(func.wrap(|func| ArrowFuncExpr { func }).into_wrapped())
  }

  /// Parses `x => ...` or `async x => ...` from the parameter name.
  fn single_param_arrow<const N: usize>(
    &mut self,
    ctx: ParseCtx,
    start: &ParserCheckpoint,
    async_: bool,
    min_prec: u8,
    terminators: [TT; N],
  ) -> SyntaxResult<Node<Expr>> {
    let param = self.id_pat(ctx)?;
    let loc = param.loc;
    let pattern = Node::new(loc, PatDecl {
      pat: param.into_wrapped::<Pat>(),
    });
    let param = Node::new(loc, ParamDecl {
      rest: false,
      pattern,
      default_value: None,
    });
    self.arrow_expr(ctx, start, async_, vec![param], min_prec, terminators)
  }

  /// Parses a parenthesised expression, or arrow function parameters if `=>` follows.
  fn paren_or_arrow<const N: usize>(
    &mut self,
    ctx: ParseCtx,
    min_prec: u8,
    terminators: [TT; N],
  ) -> SyntaxResult<Node<Expr>> {
    let start = self.checkpoint();
    self.require(TT::ParenthesisOpen)?;
    let mut items = Vec::new();
    let mut rest = None;
    let mut trailing_comma = None;
    while self.peek().typ != TT::ParenthesisClose {
      if self.consume_if(TT::DotDotDot).is_match() {
        rest = Some(self.pat(ctx)?);
        break;
      };
      items.push(self.expr_cover(ctx, [TT::Comma, TT::ParenthesisClose])?);
      let comma = self.consume_if(TT::Comma).match_loc();
      if comma.is_none() {
        break;
      };
      if self.peek().typ == TT::ParenthesisClose {
        trailing_comma = comma;
      };
    }
    let close = self.require(TT::ParenthesisClose)?;

    if self.peek().typ == TT::EqualsChevronRight {
      let params = cover_to_params(items, rest, self.is_strict())?;
      return self.arrow_expr(ctx, &start, false, params, min_prec, terminators);
    };

    if let Some(rest) = rest {
      return Err(rest.error(SyntaxErrorType::ExpectedSyntax("arrow function after rest element")));
    };
    if let Some(loc) = trailing_comma {
      return Err(loc.error(SyntaxErrorType::ExpectedSyntax("expression"), Some(TT::Comma)));
    };
    let mut items = items.into_iter();
    let Some(mut expr) = items.next() else {
      return Err(close.error(SyntaxErrorType::ExpectedSyntax("expression")));
    };
    check_not_pattern_only(&expr)?;
    for right in items {
      check_not_pattern_only(&right)?;
      expr = Node::new(expr.loc + right.loc, BinaryExpr {
        operator: OperatorName::Comma,
        left: expr,
        right,
      })
      .into_wrapped();
    }
    expr.loc = self.since_checkpoint(&start);
    expr.assoc.set(ParenthesizedExpr);
    Ok(expr)
  }

  /// Parses the forms starting with `async`: async functions, async arrow functions, calls to a function named `async`, or just the identifier.
  fn async_primary<const N: usize>(
    &mut self,
    ctx: ParseCtx,
    min_prec: u8,
    terminators: [TT; N],
  ) -> SyntaxResult<Node<Expr>> {
    let start = self.checkpoint();
    let [_, next, after] = self.peek_n::<3>();
    if next.preceded_by_line_terminator {
      return self.id_expr(ctx);
    };
    match next.typ {
      TT::KeywordFunction => self.func_expr(ctx),
      TT::ParenthesisOpen => {
        let async_ = self.consume();
        self.consume();
        let args = self.call_args_inner(ctx, true)?;
        let end = self.require(TT::ParenthesisClose)?;
        if self.peek().typ == TT::EqualsChevronRight {
          let params = call_args_to_params(args, self.is_strict())?;
          return self.arrow_expr(ctx, &start, true, params, min_prec, terminators);
        };
        for arg in &args {
          check_not_pattern_only(&arg.stx.value)?;
        }
        let callee = Node::new(async_.loc, IdExpr {
          name: "async".to_string(),
        });
        let mut node = Node::new(async_.loc + end.loc, CallExpr {
          optional_chaining: false,
          callee: callee.into_wrapped(),
          arguments: args,
        });
        if let Some(annotations) = self.annotations_at(async_.loc) {
          node.assoc.set(annotations);
        };
        Ok(node.into_wrapped())
      }
      typ
        if after.typ == TT::EqualsChevronRight
          && (typ == TT::Identifier
            || matches!(typ, TT::KeywordAwait | TT::KeywordYield)
            || UNRESERVED_KEYWORDS.contains(&typ)) =>
      {
        self.consume();
        self.single_param_arrow(ctx, &start, true, min_prec, terminators)
      }
      _ => self.id_expr(ctx),
    }
  }

  pub fn func_expr(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Expr>> {
    let start = self.checkpoint();
    let async_ = self.consume_if(TT::KeywordAsync).is_match();
    self.require(TT::KeywordFunction)?;
    let generator = self.consume_if(TT::Asterisk).is_match();
    let kind = FuncKind::plain(async_, generator);
    // The name of a function expression is bound inside it, so it follows the function's own rules for `await` and `yield`.
    let name = self.maybe_class_or_func_name(self.func_params_ctx(ctx, kind))?;
    let func = self.func(ctx, kind, name.as_ref())?;
    Ok(Node::new(self.since_checkpoint(&start), FuncExpr { name, func }).into_wrapped())
  }

  pub fn class_expr(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Expr>> {
    let start = self.checkpoint();
    let class = self.class(ctx, false)?;
    Ok(Node::new(self.since_checkpoint(&start), ClassExpr {
      name: class.name,
      extends: class.extends,
      members: class.members,
    })
    .into_wrapped())
  }

  fn super_expr(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Expr>> {
    let t = self.require(TT::KeywordSuper)?;
    let allowed = match self.peek().typ {
      TT::ParenthesisOpen => ctx.super_call_allowed,
      TT::Dot | TT::BracketOpen => ctx.super_prop_allowed,
      _ => false,
    };
    if !allowed {
      return Err(t.error(SyntaxErrorType::SuperOutsideMethod));
    };
    Ok(Node::new(t.loc, SuperExpr {}).into_wrapped())
  }

  fn primary<const N: usize>(
    &mut self,
    ctx: ParseCtx,
    min_prec: u8,
    terminators: [TT; N],
  ) -> SyntaxResult<Node<Expr>> {
    let t = self.peek_with_mode(LexMode::SlashIsRegex);
    Ok(match t.typ {
      TT::LiteralRegex => self.lit_regex()?.into_wrapped(),
      TT::ParenthesisOpen => self.paren_or_arrow(ctx, min_prec, terminators)?,
      TT::BracketOpen => self.lit_arr(ctx)?,
      TT::BraceOpen => self.lit_obj(ctx)?,
      TT::KeywordFunction => self.func_expr(ctx)?,
      TT::KeywordClass => self.class_expr(ctx)?,
      TT::KeywordAsync => self.async_primary(ctx, min_prec, terminators)?,
      TT::KeywordSuper => self.super_expr(ctx)?,
      TT::KeywordImport => self.import_expr(ctx)?,
      TT::KeywordThis => {
        self.consume();
        Node::new(t.loc, ThisExpr {}).into_wrapped()
      }
      TT::LiteralTrue | TT::LiteralFalse => {
        self.consume();
        Node::new(t.loc, LitBoolExpr {
          value: t.typ == TT::LiteralTrue,
        })
        .into_wrapped()
      }
      TT::LiteralNull => {
        self.consume();
        Node::new(t.loc, LitNullExpr {}).into_wrapped()
      }
      TT::LiteralNumber => self.lit_num()?.into_wrapped(),
      TT::LiteralBigInt => self.lit_bigint()?.into_wrapped(),
      TT::LiteralString => {
        let mut node = self.lit_str()?;
        if let Some(annotations) = self.annotations_at(t.loc) {
          node.assoc.set(annotations);
        };
        node.into_wrapped()
      }
      TT::LiteralTemplatePartString | TT::LiteralTemplatePartStringEnd => {
        let start = self.checkpoint();
        let parts = self.lit_template_parts(ctx, false)?;
        Node::new(self.since_checkpoint(&start), LitTemplateExpr { parts }).into_wrapped()
      }
      TT::PrivateMember => {
        self.consume();
        if self.peek().typ != TT::KeywordIn {
          return Err(t.error(SyntaxErrorType::ExpectedSyntax("`in` after private name")));
        };
        Node::new(t.loc, PrivateNameExpr {
          name: self.string(t.loc),
        })
        .into_wrapped()
      }
      typ
        if typ == TT::Identifier
          || matches!(typ, TT::KeywordAwait | TT::KeywordYield)
          || is_valid_pattern_identifier(typ, ctx.rules) =>
      {
        if self.peek_2().1.typ == TT::EqualsChevronRight {
          let start = self.checkpoint();
          return self.single_param_arrow(ctx, &start, false, min_prec, terminators);
        };
        self.id_expr(ctx)?
      }
      _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("expression operand"))),
    })
  }
}
