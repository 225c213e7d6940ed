pub mod decl;

use decl::VarDeclParseMode;

use super::expr::pat::is_valid_pattern_identifier;
use super::expr::util::check_not_pattern_only;
use super::expr::util::expr_to_pat;
use super::expr::util::PatConversion;
use super::ParseCtx;
use super::Parser;
use crate::ast::expr::pat::Pat;
use crate::ast::expr::Expr;
use crate::ast::node::LegacyOctalEscapeSequence;
use crate::ast::node::Node;
use crate::ast::node::ParenthesizedExpr;
use crate::ast::stmt::decl::VarDeclMode;
use crate::ast::stmt::BlockStmt;
use crate::ast::stmt::BreakStmt;
use crate::ast::stmt::CatchBlock;
use crate::ast::stmt::ContinueStmt;
use crate::ast::stmt::DebuggerStmt;
use crate::ast::stmt::DoWhileStmt;
use crate::ast::stmt::EmptyStmt;
use crate::ast::stmt::ExprStmt;
use crate::ast::stmt::ForInOfLhs;
use crate::ast::stmt::ForInStmt;
use crate::ast::stmt::ForOfStmt;
use crate::ast::stmt::ForTripleStmt;
use crate::ast::stmt::ForTripleStmtInit;
use crate::ast::stmt::IfStmt;
use crate::ast::stmt::LabelStmt;
use crate::ast::stmt::ReturnStmt;
use crate::ast::stmt::Stmt;
use crate::ast::stmt::SwitchBranch;
use crate::ast::stmt::SwitchStmt;
use crate::ast::stmt::ThrowStmt;
use crate::ast::stmt::TryStmt;
use crate::ast::stmt::WhileStmt;
use crate::ast::stmt::WithStmt;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::TT;

/// The string literal of a directive like `"use strict";`. A parenthesised string is not a directive.
fn directive(stmt: &Node<Stmt>) -> Option<&Node<Expr>> {
  match stmt.stx.as_ref() {
    Stmt::Expr(e)
      if !e.stx.expr.assoc.has::<ParenthesizedExpr>()
        && matches!(e.stx.expr.stx.as_ref(), Expr::LitStr(_)) =>
    {
      Some(&e.stx.expr)
    }
    _ => None,
  }
}

/// Whether `let` followed by `next` starts a lexical declaration rather than an expression.
fn let_starts_decl(next: &Token, ctx: ParseCtx) -> bool {
  matches!(next.typ, TT::BraceOpen | TT::BracketOpen)
    || next.typ == TT::Identifier
    || is_valid_pattern_identifier(next.typ, ctx.rules)
}

impl<'a> Parser<'a> {
  pub fn stmts(&mut self, ctx: ParseCtx, end: TT) -> SyntaxResult<Vec<Node<Stmt>>> {
    self.repeat_until_tt(end, |p| p.stmt(ctx))
  }

  /// Parses a statement list that starts with a directive prologue, i.e. a script, module or function body.
  pub fn stmts_with_directives(
    &mut self,
    ctx: ParseCtx,
    end: TT,
    simple_params: bool,
  ) -> SyntaxResult<Vec<Node<Stmt>>> {
    let mut in_prologue = true;
    let mut legacy_octal: Option<Loc> = None;
    self.repeat_until_tt(end, |p| {
      let stmt = p.stmt(ctx)?;
      if !in_prologue {
        return Ok(stmt);
      };
      let Some(lit) = directive(&stmt) else {
        in_prologue = false;
        return Ok(stmt);
      };
      let Expr::LitStr(s) = lit.stx.as_ref() else {
        return Ok(stmt);
      };
      if let Some(LegacyOctalEscapeSequence(loc)) = s.assoc.get::<LegacyOctalEscapeSequence>() {
        legacy_octal.get_or_insert(*loc);
      };
      // Escapes or line continuations mean it's not the directive.
      let raw = &s.stx.raw;
      if &raw[1..raw.len() - 1] == "use strict" {
        if !simple_params {
          return Err(stmt.error(SyntaxErrorType::UseStrictWithNonSimpleParameters));
        };
        if let Some(loc) = legacy_octal {
          return Err(loc.error(SyntaxErrorType::StrictModeLegacyOctal, None));
        };
        p.set_strict();
      };
      Ok(stmt)
    })
  }

  pub fn stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Stmt>> {
    let [t0, t1] = self.peek_n();
    #[rustfmt::skip]
    let stmt: Node<Stmt> = match t0.typ {
      TT::BraceOpen => self.block_stmt(ctx)?.into_wrapped(),
      TT::KeywordBreak => self.break_stmt(ctx)?.into_wrapped(),
      TT::KeywordClass => self.class_decl(ctx)?.into_wrapped(),
      TT::KeywordConst | TT::KeywordVar => self.var_decl(ctx, VarDeclParseMode::Asi)?.into_wrapped(),
      // `let` is a contextual keyword, only starting a declaration if followed by a pattern.
      TT::KeywordLet if let_starts_decl(&t1, ctx) => self.var_decl(ctx, VarDeclParseMode::Asi)?.into_wrapped(),
      TT::KeywordContinue => self.continue_stmt(ctx)?.into_wrapped(),
      TT::KeywordDebugger => self.debugger_stmt()?.into_wrapped(),
      TT::KeywordDo => self.do_while_stmt(ctx)?.into_wrapped(),
      TT::KeywordExport => self.export_stmt(ctx)?,
      TT::KeywordFor => self.for_stmt(ctx)?,
      TT::KeywordAsync if t1.typ == TT::KeywordFunction && !t1.preceded_by_line_terminator => self.func_decl(ctx)?.into_wrapped(),
      TT::KeywordFunction => self.func_decl(ctx)?.into_wrapped(),
      TT::KeywordIf => self.if_stmt(ctx)?.into_wrapped(),
      TT::KeywordImport if !matches!(t1.typ, TT::ParenthesisOpen | TT::Dot) => self.import_stmt(ctx)?.into_wrapped(),
      TT::KeywordReturn => self.return_stmt(ctx)?.into_wrapped(),
      TT::KeywordSwitch => self.switch_stmt(ctx)?.into_wrapped(),
      TT::KeywordThrow => self.throw_stmt(ctx)?.into_wrapped(),
      TT::KeywordTry => self.try_stmt(ctx)?.into_wrapped(),
      TT::KeywordWhile => self.while_stmt(ctx)?.into_wrapped(),
      TT::KeywordWith => self.with_stmt(ctx)?.into_wrapped(),
      TT::Semicolon => self.empty_stmt()?.into_wrapped(),
      t if (t == TT::Identifier || matches!(t, TT::KeywordAwait | TT::KeywordYield) || is_valid_pattern_identifier(t, ctx.rules)) && t1.typ == TT::Colon => self.label_stmt(ctx)?.into_wrapped(),
      _ => self.expr_stmt(ctx)?.into_wrapped(),
    };
    Ok(stmt)
  }

  /// Parses the body of an `if`, loop, `with` or label, where only a single statement (not a declaration) may appear.
  fn single_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Stmt>> {
    let [t0, t1] = self.peek_n();
    let is_decl = match t0.typ {
      TT::KeywordClass | TT::KeywordConst => true,
      TT::KeywordLet => t1.typ == TT::BracketOpen || (!t1.preceded_by_line_terminator && let_starts_decl(&t1, ctx)),
      // Sloppy code permits plain function declarations here.
      TT::KeywordFunction => self.is_strict() || t1.typ == TT::Asterisk,
      TT::KeywordAsync => t1.typ == TT::KeywordFunction && !t1.preceded_by_line_terminator,
      _ => false,
    };
    if is_decl {
      return Err(t0.error(SyntaxErrorType::LexicalDeclarationNotAllowed));
    };
    self.nested(|p| p.stmt(ctx.nested()))
  }

  pub fn label_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<LabelStmt>> {
    self.with_loc(|p| {
      let (_, name) = p.require_identifier(ctx, false)?;
      p.require(TT::Colon)?;
      let statement = p.single_stmt(ctx)?;
      Ok(LabelStmt { name, statement })
    })
  }

  pub fn empty_stmt(&mut self) -> SyntaxResult<Node<EmptyStmt>> {
    self.with_loc(|p| p.require(TT::Semicolon).map(|_| EmptyStmt {}))
  }

  pub fn block_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<BlockStmt>> {
    self.with_loc(|p| {
      p.require(TT::BraceOpen)?;
      let body = p.nested(|p| p.stmts(ctx.nested(), TT::BraceClose))?;
      p.require(TT::BraceClose)?;
      Ok(BlockStmt { body })
    })
  }

  fn break_or_continue_label(&mut self, ctx: ParseCtx) -> SyntaxResult<Option<String>> {
    let t = self.peek();
    let label = if !t.preceded_by_line_terminator
      && (t.typ == TT::Identifier
        || matches!(t.typ, TT::KeywordAwait | TT::KeywordYield)
        || is_valid_pattern_identifier(t.typ, ctx.rules))
    {
      Some(self.require_identifier(ctx, false)?.1)
    } else {
      None
    };
    self.require_semicolon_or_asi()?;
    Ok(label)
  }

  pub fn break_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<BreakStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordBreak)?;
      let label = p.break_or_continue_label(ctx)?;
      Ok(BreakStmt { label })
    })
  }

  pub fn continue_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ContinueStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordContinue)?;
      let label = p.break_or_continue_label(ctx)?;
      Ok(ContinueStmt { label })
    })
  }

  pub fn debugger_stmt(&mut self) -> SyntaxResult<Node<DebuggerStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordDebugger)?;
      p.require_semicolon_or_asi()?;
      Ok(DebuggerStmt {})
    })
  }

  pub fn expr_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ExprStmt>> {
    self.with_loc(|p| {
      let expr = p.expr(ctx, [TT::Semicolon])?;
      p.require_semicolon_or_asi()?;
      Ok(ExprStmt { expr })
    })
  }

  /// Parses the left side of a `for-in`/`for-of` head, or the initializer of a `for(;;)` head, then the rest of the statement.
  /// One of:
  /// - for ( [<expr> | <var decls> ]? ; <expr>? ; <expr>? )
  /// - for ( [<pat> | <var decl>] in <expr> )
  /// - for await? ( [<pat> | <var decl>] of <expr> )
  pub fn for_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Stmt>> {
    let start = self.checkpoint();
    let for_tok = self.require(TT::KeywordFor)?;
    let await_ = match self.peek().typ {
      TT::KeywordAwait if ctx.in_async => {
        self.consume();
        true
      }
      TT::KeywordAwait => return Err(self.peek().error(SyntaxErrorType::AwaitNotAllowed)),
      _ => false,
    };
    self.require(TT::ParenthesisOpen)?;

    let [t0, t1] = self.peek_n();
    let is_decl = match t0.typ {
      TT::KeywordVar | TT::KeywordConst => true,
      TT::KeywordLet => let_starts_decl(&t1, ctx),
      _ => false,
    };

    enum Head {
      Lhs(ForInOfLhs),
      Init(ForTripleStmtInit),
    }

    let head = if is_decl {
      let decl = self.var_decl(ctx, VarDeclParseMode::Leftmost)?;
      if matches!(self.peek().typ, TT::KeywordIn | TT::KeywordOf) {
        let decl_loc = decl.loc;
        let mut decl = *decl.stx;
        if decl.declarators.len() != 1 {
          return Err(decl_loc.error(SyntaxErrorType::ExpectedSyntax("single declaration"), None));
        };
        let Some(declarator) = decl.declarators.pop() else {
          return Err(decl_loc.error(SyntaxErrorType::ExpectedSyntax("declaration"), None));
        };
        if let Some(init) = declarator.initializer {
          return Err(init.error(SyntaxErrorType::ExpectedSyntax("declaration without initializer")));
        };
        Head::Lhs(ForInOfLhs::Decl {
          mode: decl.mode,
          pat: declarator.pattern,
        })
      } else {
        for declarator in decl.stx.declarators.iter() {
          let destructuring = !matches!(declarator.pattern.stx.pat.stx.as_ref(), Pat::Id(_));
          if declarator.initializer.is_none()
            && (decl.stx.mode == VarDeclMode::Const || destructuring)
          {
            return Err(declarator.pattern.error(SyntaxErrorType::ExpectedSyntax("initializer")));
          };
        }
        Head::Init(ForTripleStmtInit::Decl(decl))
      }
    } else if t0.typ == TT::Semicolon {
      Head::Init(ForTripleStmtInit::None)
    } else {
      // `in` would otherwise be parsed as the operator.
      let expr = self.expr_cover_with_min_prec(ctx, 1, [TT::Semicolon, TT::KeywordIn])?;
      let next = self.peek();
      if matches!(next.typ, TT::KeywordIn | TT::KeywordOf) {
        if next.typ == TT::KeywordOf
          && t0.typ == TT::KeywordAsync
          && !expr.assoc.has::<ParenthesizedExpr>()
          && matches!(expr.stx.as_ref(), Expr::Id(_))
        {
          return Err(t0.error(SyntaxErrorType::ExpectedSyntax("parenthesized `async`")));
        };
        let pat = expr_to_pat(expr, PatConversion {
          binding: false,
          strict: self.is_strict(),
        })?;
        Head::Lhs(ForInOfLhs::Assign(pat))
      } else {
        check_not_pattern_only(&expr)?;
        Head::Init(ForTripleStmtInit::Expr(expr))
      }
    };

    let stmt = match head {
      Head::Lhs(lhs) => {
        let t = self.consume();
        let of = match t.typ {
          TT::KeywordOf => true,
          TT::KeywordIn if !await_ => false,
          _ => return Err(t.error(SyntaxErrorType::RequiredTokenNotFound(TT::KeywordOf))),
        };
        let rhs = if of {
          let prec = self.assignment_prec();
          self.expr_with_min_prec(ctx, prec, [TT::ParenthesisClose])?
        } else {
          self.expr(ctx, [TT::ParenthesisClose])?
        };
        self.require(TT::ParenthesisClose)?;
        let body = self.single_stmt(ctx)?;
        let loc = self.since_checkpoint(&start);
        if of {
          Node::new(loc, ForOfStmt {
            await_,
            lhs,
            rhs,
            body,
          })
          .into_wrapped()
        } else {
          Node::new(loc, ForInStmt { lhs, rhs, body }).into_wrapped()
        }
      }
      Head::Init(init) => {
        if await_ {
          return Err(for_tok.error(SyntaxErrorType::ExpectedSyntax("for-of loop after `await`")));
        };
        self.require(TT::Semicolon)?;
        let cond = (self.peek().typ != TT::Semicolon)
          .then(|| self.expr(ctx, [TT::Semicolon]))
          .transpose()?;
        self.require(TT::Semicolon)?;
        let post = (self.peek().typ != TT::ParenthesisClose)
          .then(|| self.expr(ctx, [TT::ParenthesisClose]))
          .transpose()?;
        self.require(TT::ParenthesisClose)?;
        let body = self.single_stmt(ctx)?;
        Node::new(self.since_checkpoint(&start), ForTripleStmt {
          init,
          cond,
          post,
          body,
        })
        .into_wrapped()
      }
    };
    Ok(stmt)
  }

  pub fn if_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<IfStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordIf)?;
      p.require(TT::ParenthesisOpen)?;
      let test = p.expr(ctx, [TT::ParenthesisClose])?;
      p.require(TT::ParenthesisClose)?;
      let consequent = p.single_stmt(ctx)?;
      let alternate = p
        .consume_if(TT::KeywordElse)
        .and_then(|| p.single_stmt(ctx))?;
      Ok(IfStmt {
        test,
        consequent,
        alternate,
      })
    })
  }

  pub fn return_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ReturnStmt>> {
    self.with_loc(|p| {
      let start = p.require(TT::KeywordReturn)?;
      if !ctx.in_function {
        return Err(start.error(SyntaxErrorType::ReturnOutsideFunction));
      };
      let t = p.peek();
      let value = if t.preceded_by_line_terminator
        || matches!(t.typ, TT::Semicolon | TT::BraceClose | TT::EOF)
      {
        // Automatic Semicolon Insertion.
        None
      } else {
        Some(p.expr(ctx, [TT::Semicolon])?)
      };
      p.require_semicolon_or_asi()?;
      Ok(ReturnStmt { value })
    })
  }

  pub fn throw_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ThrowStmt>> {
    self.with_loc(|p| {
      let start = p.require(TT::KeywordThrow)?;
      if p.peek().preceded_by_line_terminator {
        // Illegal under Automatic Semicolon Insertion rules.
        return Err(start.error(SyntaxErrorType::LineTerminatorAfterThrow));
      }
      let value = p.expr(ctx, [TT::Semicolon])?;
      p.require_semicolon_or_asi()?;
      Ok(ThrowStmt { value })
    })
  }

  pub fn try_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<TryStmt>> {
    self.with_loc(|p| {
      let start = p.require(TT::KeywordTry)?;
      let wrapped = p.block_stmt(ctx)?;
      let catch = p
        .consume_if(TT::KeywordCatch)
        .and_then(|| {
          p.with_loc(|p| {
            let parameter = p
              .consume_if(TT::ParenthesisOpen)
              .and_then(|| {
                let pattern = p.pat_decl(ctx)?;
                p.require(TT::ParenthesisClose)?;
                Ok(pattern)
              })?;
            p.require(TT::BraceOpen)?;
            let body = p.nested(|p| p.stmts(ctx.nested(), TT::BraceClose))?;
            p.require(TT::BraceClose)?;
            Ok(CatchBlock { parameter, body })
          })
        })?;
      let finally = p
        .consume_if(TT::KeywordFinally)
        .and_then(|| p.block_stmt(ctx))?;
      if catch.is_none() && finally.is_none() {
        return Err(start.error(SyntaxErrorType::TryStatementHasNoCatchOrFinally));
      }
      Ok(TryStmt {
        wrapped,
        catch,
        finally,
      })
    })
  }

  pub fn while_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<WhileStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordWhile)?;
      p.require(TT::ParenthesisOpen)?;
      let condition = p.expr(ctx, [TT::ParenthesisClose])?;
      p.require(TT::ParenthesisClose)?;
      let body = p.single_stmt(ctx)?;
      Ok(WhileStmt { condition, body })
    })
  }

  pub fn with_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<WithStmt>> {
    self.with_loc(|p| {
      let start = p.require(TT::KeywordWith)?;
      if p.is_strict() {
        return Err(start.error(SyntaxErrorType::StrictModeWith));
      };
      p.require(TT::ParenthesisOpen)?;
      let object = p.expr(ctx, [TT::ParenthesisClose])?;
      p.require(TT::ParenthesisClose)?;
      let body = p.single_stmt(ctx)?;
      Ok(WithStmt { object, body })
    })
  }

  pub fn do_while_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<DoWhileStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordDo)?;
      let body = p.single_stmt(ctx)?;
      p.require(TT::KeywordWhile)?;
      p.require(TT::ParenthesisOpen)?;
      let condition = p.expr(ctx, [TT::ParenthesisClose])?;
      p.require(TT::ParenthesisClose)?;
      // A semicolon is always inserted after a do-while, even on the same line.
      let _ = p.consume_if(TT::Semicolon);
      Ok(DoWhileStmt { condition, body })
    })
  }

  pub fn switch_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<SwitchStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordSwitch)?;
      p.require(TT::ParenthesisOpen)?;
      let test = p.expr(ctx, [TT::ParenthesisClose])?;
      p.require(TT::ParenthesisClose)?;
      p.require(TT::BraceOpen)?;
      let mut default_seen = false;
      let branches = p.repeat_until_tt_with_loc(TT::BraceClose, |p| {
        let case = if p.consume_if(TT::KeywordCase).is_match() {
          Some(p.expr(ctx, [TT::Colon])?)
        } else {
          let t = p.require(TT::KeywordDefault)?;
          if default_seen {
            return Err(t.error(SyntaxErrorType::ExpectedSyntax("at most one `default` clause")));
          };
          default_seen = true;
          None
        };
        p.require(TT::Colon)?;
        let mut body = Vec::new();
        while !matches!(
          p.peek().typ,
          TT::KeywordCase | TT::KeywordDefault | TT::BraceClose | TT::EOF
        ) {
          body.push(p.stmt(ctx.nested())?);
        }
        Ok(SwitchBranch { case, body })
      })?;
      p.require(TT::BraceClose)?;
      Ok(SwitchStmt { test, branches })
    })
  }
}
