use super::ParseCtx;
use super::Parser;
use crate::ast::expr::pat::Pat;
use crate::ast::node::Node;
use crate::ast::stmt::decl::ClassDecl;
use crate::ast::stmt::decl::FuncDecl;
use crate::ast::stmt::decl::PatDecl;
use crate::ast::stmt::decl::VarDecl;
use crate::ast::stmt::decl::VarDeclMode;
use crate::ast::stmt::decl::VarDeclarator;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::parse::class_or_object::ClassParts;
use crate::parse::func::FuncKind;
use crate::token::TT;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum VarDeclParseMode {
  // Standard parsing mode for var/let/const statement.
  Asi,
  // Parse as many valid declarators as possible, then break before the first invalid token (i.e. not a comma). Used by for-loop parser, which checks initializers itself as `for (const x of y)` has none.
  Leftmost,
}

impl<'a> Parser<'a> {
  pub fn pat_decl(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<PatDecl>> {
    self.with_loc(|p| {
      let pat = p.pat(ctx)?;
      Ok(PatDecl { pat })
    })
  }

  pub fn id_pat_decl(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<PatDecl>> {
    self.with_loc(|p| {
      let pat = p.id_pat(ctx)?.into_wrapped();
      Ok(PatDecl { pat })
    })
  }

  pub fn var_decl_mode(&mut self) -> SyntaxResult<VarDeclMode> {
    let t = self.consume();
    Ok(match t.typ {
      TT::KeywordLet => VarDeclMode::Let,
      TT::KeywordConst => VarDeclMode::Const,
      TT::KeywordVar => VarDeclMode::Var,
      _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("variable declaration"))),
    })
  }

  /// Parses a variable declaration, which contains one or more declarators, each with an optional initializer. Examples of variable declarations:
  /// - `const a = 1`
  /// - `let a, b = 2, c`
  /// - `let { a, b } = c`
  /// - `var a`
  pub fn var_decl(
    &mut self,
    ctx: ParseCtx,
    parse_mode: VarDeclParseMode,
  ) -> SyntaxResult<Node<VarDecl>> {
    let assignment_prec = self.assignment_prec();
    self.with_loc(|p| {
      let export = p.consume_if(TT::KeywordExport).is_match();
      let mode = p.var_decl_mode()?;
      let mut declarators = Vec::new();
      loop {
        let pattern = p.pat_decl(ctx)?;
        if mode.is_lexical() {
          if let Pat::Id(id) = pattern.stx.pat.stx.as_ref() {
            if id.stx.name == "let" {
              return Err(id.error(SyntaxErrorType::ExpectedSyntax("binding name other than `let`")));
            };
          };
        };
        let initializer = if p.consume_if(TT::Equals).is_match() {
          Some(match parse_mode {
            VarDeclParseMode::Asi => p.expr_with_min_prec(ctx, assignment_prec, [])?,
            // `in` ends the initializer so `for (var a = b in c;;)` isn't misread.
            VarDeclParseMode::Leftmost => {
              p.expr_with_min_prec(ctx, assignment_prec, [TT::KeywordIn])?
            }
          })
        } else {
          None
        };
        if parse_mode == VarDeclParseMode::Asi && initializer.is_none() {
          let destructuring = !matches!(pattern.stx.pat.stx.as_ref(), Pat::Id(_));
          if mode == VarDeclMode::Const || destructuring {
            return Err(pattern.error(SyntaxErrorType::ExpectedSyntax("initializer")));
          };
        };
        declarators.push(VarDeclarator {
          pattern,
          initializer,
        });
        if !p.consume_if(TT::Comma).is_match() {
          break;
        };
      }
      if parse_mode == VarDeclParseMode::Asi {
        p.require_semicolon_or_asi()?;
      };
      Ok(VarDecl {
        export,
        mode,
        declarators,
      })
    })
  }

  pub fn func_decl(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<FuncDecl>> {
    self.with_loc(|p| {
      let export = p.consume_if(TT::KeywordExport).is_match();
      let export_default = export && p.consume_if(TT::KeywordDefault).is_match();
      let async_ = p.consume_if(TT::KeywordAsync).is_match();
      let start = p.require(TT::KeywordFunction)?;
      let generator = p.consume_if(TT::Asterisk).is_match();
      // The name is bound in the enclosing scope, so it follows the enclosing rules for `await` and `yield`.
      let name = p.maybe_class_or_func_name(ctx)?;
      // The name can only be omitted in default exports.
      if name.is_none() && !export_default {
        return Err(start.error(SyntaxErrorType::ExpectedSyntax("function name")));
      };
      let function = p.func(ctx, FuncKind::plain(async_, generator), name.as_ref())?;
      Ok(FuncDecl {
        export,
        export_default,
        name,
        function,
      })
    })
  }

  pub fn class_decl(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ClassDecl>> {
    self.with_loc(|p| {
      let export = p.consume_if(TT::KeywordExport).is_match();
      let export_default = export && p.consume_if(TT::KeywordDefault).is_match();
      // Names can be omitted only in default exports.
      let ClassParts {
        name,
        extends,
        members,
      } = p.class(ctx, !export_default)?;
      Ok(ClassDecl {
        export,
        export_default,
        name,
        extends,
        members,
      })
    })
  }
}

#[cfg(test)]
mod tests {
  use crate::ast::stmt::decl::VarDeclMode;
  use crate::ast::stmt::Stmt;
  use crate::error::SyntaxErrorType;
  use crate::parse;

  fn err(src: &str) -> SyntaxErrorType {
    parse(src).unwrap_err().typ
  }

  #[test]
  fn declarators() {
    let top = parse("let a, b = 2, { c } = d").unwrap();
    let Stmt::VarDecl(decl) = top.stx.body[0].stx.as_ref() else { panic!() };
    assert_eq!(decl.stx.mode, VarDeclMode::Let);
    assert_eq!(decl.stx.declarators.len(), 3);
    assert!(decl.stx.declarators[0].initializer.is_none());
  }

  #[test]
  fn missing_initializers() {
    assert!(matches!(err("const a;"), SyntaxErrorType::ExpectedSyntax(_)));
    assert!(matches!(err("var [a];"), SyntaxErrorType::ExpectedSyntax(_)));
    assert!(parse("for (const a of b);").is_ok());
  }

  #[test]
  fn let_cannot_bind_let() {
    assert!(matches!(err("let let = 1"), SyntaxErrorType::ExpectedSyntax(_)));
    assert!(parse("var let = 1").is_ok());
  }

  #[test]
  fn declaration_names() {
    assert!(matches!(err("function () {}"), SyntaxErrorType::ExpectedSyntax(_)));
    assert!(matches!(err("class {}"), SyntaxErrorType::ExpectedSyntax(_)));
    assert_eq!(err("async function f() { function await() {} }"), SyntaxErrorType::AwaitNotAllowed);
    assert_eq!(err("function* g() { function yield() {} }"), SyntaxErrorType::YieldNotAllowed);
    assert!(parse("function* g() {} function yield() {}").is_ok());
  }
}
