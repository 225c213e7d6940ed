use super::ParseCtx;
use super::Parser;
use crate::ast::expr::pat::Pat;
use crate::ast::expr::Expr;
use crate::ast::expr::ImportExpr;
use crate::ast::expr::ImportMeta;
use crate::ast::import_export::ExportName;
use crate::ast::import_export::ExportNames;
use crate::ast::import_export::ImportName;
use crate::ast::import_export::ImportNames;
use crate::ast::import_export::ModuleExportImportName;
use crate::ast::node::Node;
use crate::ast::stmt::decl::PatDecl;
use crate::ast::stmt::ExportDefaultExprStmt;
use crate::ast::stmt::ExportListStmt;
use crate::ast::stmt::ImportStmt;
use crate::ast::stmt::Stmt;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::is_identifier_name;
use crate::parse::stmt::decl::VarDeclParseMode;
use crate::token::Token;
use crate::token::TT;

impl<'a> Parser<'a> {
  // Import and export declarations are only allowed directly in a module's top level.
  fn require_module_item(&mut self, ctx: ParseCtx) -> SyntaxResult<()> {
    if !ctx.top_level || !self.options().is_module() {
      return Err(self.peek().error(SyntaxErrorType::ModuleSyntaxOutsideModule));
    };
    Ok(())
  }

  fn module_specifier(&mut self) -> SyntaxResult<String> {
    Ok(self.lit_str()?.stx.value)
  }

  /// Parses a name in an import or export list, which is any identifier name (including reserved words) or a string literal.
  fn module_export_import_name(&mut self) -> SyntaxResult<ModuleExportImportName> {
    let t = self.peek();
    match t.typ {
      TT::LiteralString => Ok(ModuleExportImportName::Str(self.module_specifier()?)),
      typ if is_identifier_name(typ) => {
        self.consume();
        Ok(ModuleExportImportName::Ident(self.identifier_name(&t)?.0))
      }
      _ => Err(t.error(SyntaxErrorType::ExpectedSyntax("import or export name"))),
    }
  }

  /// Parses `import(module)` or `import.meta`. These are allowed anywhere an expression is, though `import.meta` only in modules.
  pub fn import_expr(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Expr>> {
    let start = self.checkpoint();
    let t = self.require(TT::KeywordImport)?;
    if self.consume_if(TT::Dot).is_match() {
      let prop = self.consume();
      if prop.typ != TT::Identifier || self.str(prop.loc) != "meta" {
        return Err(prop.error(SyntaxErrorType::ExpectedSyntax("`meta` property")));
      };
      if !self.options().is_module() {
        return Err(t.error(SyntaxErrorType::ModuleSyntaxOutsideModule));
      };
      return Ok(Node::new(self.since_checkpoint(&start), ImportMeta {}).into_wrapped());
    };
    self.require(TT::ParenthesisOpen)?;
    let assignment_prec = self.assignment_prec();
    let module = self.expr_with_min_prec(ctx, assignment_prec, [TT::Comma, TT::ParenthesisClose])?;
    let _ = self.consume_if(TT::Comma);
    self.require(TT::ParenthesisClose)?;
    Ok(Node::new(self.since_checkpoint(&start), ImportExpr { module }).into_wrapped())
  }

  fn import_name(&mut self, ctx: ParseCtx) -> SyntaxResult<ImportName> {
    let [t0, t1] = self.peek_n();
    if t0.typ == TT::LiteralString || t1.typ == TT::KeywordAs {
      let importable = self.module_export_import_name()?;
      self.require(TT::KeywordAs)?;
      let alias = self.id_pat_decl(ctx)?;
      return Ok(ImportName { importable, alias });
    };
    // Without an alias, the imported name is also the local binding, so it must be a valid one.
    let id = self.id_pat(ctx)?;
    let importable = ModuleExportImportName::Ident(id.stx.name.clone());
    let alias = id.into_wrapped::<Pat>().wrap(|pat| PatDecl { pat });
    Ok(ImportName { importable, alias })
  }

  /// Parses an import declaration like:
  /// - `import "module"`
  /// - `import * as b from "module"`
  /// - `import {"b" as c, d, e as f, default as g} from "module"`
  /// - `import a from "module"`
  /// - `import a, * as b from "module"`
  /// - `import a, {b} from "module"`
  pub fn import_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ImportStmt>> {
    self.require_module_item(ctx)?;
    self.with_loc(|p| {
      p.require(TT::KeywordImport)?;
      if p.peek().typ == TT::LiteralString {
        let module = p.module_specifier()?;
        p.require_semicolon_or_asi()?;
        return Ok(ImportStmt {
          default: None,
          names: None,
          module,
        });
      };
      let (default, can_have_names) = if matches!(p.peek().typ, TT::Asterisk | TT::BraceOpen) {
        (None, true)
      } else {
        let default = p.id_pat_decl(ctx)?;
        (Some(default), p.consume_if(TT::Comma).is_match())
      };
      let names = if !can_have_names {
        None
      } else if p.consume_if(TT::Asterisk).is_match() {
        p.require(TT::KeywordAs)?;
        Some(ImportNames::All(p.id_pat_decl(ctx)?))
      } else {
        p.require(TT::BraceOpen)?;
        let names = p.list_with_loc(TT::Comma, TT::BraceClose, |p| p.import_name(ctx))?;
        Some(ImportNames::Specific(names))
      };
      p.require(TT::KeywordFrom)?;
      let module = p.module_specifier()?;
      p.require_semicolon_or_asi()?;
      Ok(ImportStmt {
        default,
        names,
        module,
      })
    })
  }

  fn export_name(&mut self) -> SyntaxResult<ExportName> {
    let exportable = self.module_export_import_name()?;
    // The alias is always set so that renaming the local binding never changes the exported name.
    let alias = if self.consume_if(TT::KeywordAs).is_match() {
      self.module_export_import_name()?
    } else {
      exportable.clone()
    };
    Ok(ExportName { exportable, alias })
  }

  /// Parses `export {a, b as c} [from "module"]`, `export * from "module"` or `export * as ns from "module"`.
  pub fn export_list_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ExportListStmt>> {
    self.with_loc(|p| {
      p.require(TT::KeywordExport)?;
      let t = p.consume();
      let (names, from) = match t.typ {
        TT::BraceOpen => {
          let names = p.list_with_loc(TT::Comma, TT::BraceClose, |p| p.export_name())?;
          let from = p
            .consume_if(TT::KeywordFrom)
            .and_then(|| p.module_specifier())?;
          if from.is_none() {
            // Local exports refer to bindings in this module, which must be identifiers.
            for name in &names {
              match &name.stx.exportable {
                ModuleExportImportName::Str(_) => {
                  return Err(name.error(SyntaxErrorType::ExpectedSyntax("identifier")));
                }
                ModuleExportImportName::Ident(local) => {
                  p.validate_identifier(ctx, local, name.loc, false)?;
                }
              };
            }
          };
          (ExportNames::Specific(names), from)
        }
        TT::Asterisk => {
          let alias = p
            .consume_if(TT::KeywordAs)
            .and_then(|| p.module_export_import_name())?;
          p.require(TT::KeywordFrom)?;
          (ExportNames::All(alias), Some(p.module_specifier()?))
        }
        _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("export list"))),
      };
      p.require_semicolon_or_asi()?;
      Ok(ExportListStmt { names, from })
    })
  }

  pub fn export_default_expr_stmt(
    &mut self,
    ctx: ParseCtx,
  ) -> SyntaxResult<Node<ExportDefaultExprStmt>> {
    let assignment_prec = self.assignment_prec();
    self.with_loc(|p| {
      p.require(TT::KeywordExport)?;
      p.require(TT::KeywordDefault)?;
      let expression = p.expr_with_min_prec(ctx, assignment_prec, [TT::Semicolon])?;
      p.require_semicolon_or_asi()?;
      Ok(ExportDefaultExprStmt { expression })
    })
  }

  // https://tc39.es/ecma262/#sec-exports
  // https://jakearchibald.com/2021/export-default-thing-vs-thing-as-default/
  pub fn export_stmt(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Stmt>> {
    self.require_module_item(ctx)?;
    let [t0, t1, t2, t3] = self.peek_n();
    // The first token should always be `export`, but it will be parsed in the subroutines and not here.
    debug_assert_eq!(t0.typ, TT::KeywordExport);
    let async_function = |a: &Token, f: &Token| {
      a.typ == TT::KeywordAsync && f.typ == TT::KeywordFunction && !f.preceded_by_line_terminator
    };
    #[rustfmt::skip]
    let stmt: Node<Stmt> = match (t1.typ, t2.typ) {
      // `class` and `function` are treated as statements that are hoisted, not expressions; however, they can be unnamed, which gives them the name `default`.
      (TT::KeywordDefault, TT::KeywordFunction) | (TT::KeywordFunction, _) => self.func_decl(ctx)?.into_wrapped(),
      (TT::KeywordDefault, TT::KeywordAsync) if async_function(&t2, &t3) => self.func_decl(ctx)?.into_wrapped(),
      (TT::KeywordAsync, _) if async_function(&t1, &t2) => self.func_decl(ctx)?.into_wrapped(),
      (TT::KeywordDefault, TT::KeywordClass) | (TT::KeywordClass, _) => self.class_decl(ctx)?.into_wrapped(),
      (TT::KeywordDefault, _) => self.export_default_expr_stmt(ctx)?.into_wrapped(),
      (TT::KeywordVar | TT::KeywordLet | TT::KeywordConst, _) => self.var_decl(ctx, VarDeclParseMode::Asi)?.into_wrapped(),
      (TT::BraceOpen | TT::Asterisk, _) => self.export_list_stmt(ctx)?.into_wrapped(),
      _ => return Err(t1.error(SyntaxErrorType::ExpectedSyntax("exportable"))),
    };
    Ok(stmt)
  }
}
