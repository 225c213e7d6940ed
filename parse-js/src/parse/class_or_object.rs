use super::func::FuncKind;
use super::ParseCtx;
use super::Parser;
use crate::ast::class_or_object::ClassMember;
use crate::ast::class_or_object::ClassOrObjGetter;
use crate::ast::class_or_object::ClassOrObjKey;
use crate::ast::class_or_object::ClassOrObjMemberDirectKey;
use crate::ast::class_or_object::ClassOrObjMethod;
use crate::ast::class_or_object::ClassOrObjSetter;
use crate::ast::class_or_object::ClassOrObjVal;
use crate::ast::class_or_object::ClassStaticBlock;
use crate::ast::expr::pat::ClassOrFuncName;
use crate::ast::expr::Expr;
use crate::ast::node::Node;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::is_identifier_name;
use crate::operator::OperatorName;
use crate::token::TT;

/// Where a member is being parsed, as classes and object literals accept slightly different members.
#[derive(Clone, Copy, Debug)]
pub enum MemberOwner {
  Object,
  Class { derived: bool, static_: bool },
}

/// Whether a token after a modifier like `get` or `static` starts a key, making the modifier a modifier rather than the member's own name.
fn is_key_start(typ: TT) -> bool {
  !matches!(
    typ,
    TT::ParenthesisOpen
      | TT::Equals
      | TT::Colon
      | TT::Comma
      | TT::Semicolon
      | TT::BraceClose
      | TT::EOF
  )
}

pub struct ClassParts {
  pub name: Option<Node<ClassOrFuncName>>,
  pub extends: Option<Node<Expr>>,
  pub members: Vec<Node<ClassMember>>,
}

impl<'a> Parser<'a> {
  /// Parses a class from the `class` keyword. All parts of a class are strict code.
  pub fn class(&mut self, ctx: ParseCtx, name_required: bool) -> SyntaxResult<ClassParts> {
    self.require(TT::KeywordClass)?;
    self.enter_directive_scope(true);
    let res = (|| -> SyntaxResult<ClassParts> {
      // `class extends B {}` is an anonymous class, not a class named `extends`.
      let name = match self.peek().typ {
        TT::KeywordExtends | TT::BraceOpen if !name_required => None,
        _ => {
          let (t, name) = self.require_identifier(ctx, true)?;
          Some(Node::new(t.loc, ClassOrFuncName { name }))
        }
      };
      let heritage_prec = self.prec(OperatorName::New);
      let extends = self
        .consume_if(TT::KeywordExtends)
        .and_then(|| self.expr_with_min_prec(ctx, heritage_prec, [TT::BraceOpen]))?;
      let members = self.class_body(ctx, extends.is_some())?;
      Ok(ClassParts {
        name,
        extends,
        members,
      })
    })();
    self.exit_directive_scope();
    res
  }

  pub fn class_body(&mut self, ctx: ParseCtx, derived: bool) -> SyntaxResult<Vec<Node<ClassMember>>> {
    self.require(TT::BraceOpen)?;
    let mut members = Vec::new();
    let mut constructor_seen = false;
    loop {
      if self.consume_if(TT::Semicolon).is_match() {
        continue;
      };
      if self.consume_if(TT::BraceClose).is_match() {
        break;
      };
      let member = self.with_loc(|p| {
        let (a, b) = p.peek_2();
        if a.typ == TT::KeywordStatic && b.typ == TT::BraceOpen {
          p.consume();
          let key = Node::new(a.loc, ClassOrObjMemberDirectKey {
            key: "static".to_string(),
            tt: TT::KeywordStatic,
          });
          let block = p.class_static_block(ctx)?;
          return Ok(ClassMember {
            key: ClassOrObjKey::Direct(key),
            static_: true,
            val: ClassOrObjVal::StaticBlock(block),
          });
        };
        // `static` is a modifier unless it's the member's own name, e.g. `static() {}` or `static = 1`.
        let static_ = a.typ == TT::KeywordStatic && (is_key_start(b.typ) || b.typ == TT::Asterisk);
        if static_ {
          p.consume();
        };
        let (key, val) = p.class_or_obj_member(ctx, MemberOwner::Class { derived, static_ })?;
        Ok(ClassMember { key, static_, val })
      })?;
      if !member.stx.static_ && matches!(member.stx.val, ClassOrObjVal::Method(_)) {
        if let ClassOrObjKey::Direct(key) = &member.stx.key {
          if key.stx.key == "constructor" && !key.stx.is_private() {
            if constructor_seen {
              return Err(key.error(SyntaxErrorType::DuplicateConstructor));
            };
            constructor_seen = true;
          };
        };
      };
      members.push(member);
    }
    Ok(members)
  }

  fn class_static_block(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ClassStaticBlock>> {
    let block_ctx = ParseCtx {
      rules: ctx.rules.with_await_allowed(false),
      top_level: false,
      in_function: false,
      in_async: false,
      in_generator: false,
      new_target_allowed: true,
      super_prop_allowed: true,
      super_call_allowed: false,
    };
    self.with_loc(|p| {
      p.require(TT::BraceOpen)?;
      let body = p.stmts(block_ctx, TT::BraceClose)?;
      p.require(TT::BraceClose)?;
      Ok(ClassStaticBlock { body })
    })
  }

  /// Parses a class or object key like `a`, `'a'`, `#a`, `1`, `[a]`. Keys that aren't computed are normalised: strings are cooked, numbers are canonicalised, and escapes in names are decoded.
  pub fn class_or_obj_key(&mut self, ctx: ParseCtx) -> SyntaxResult<ClassOrObjKey> {
    let t = self.peek();
    let (loc, key) = match t.typ {
      TT::BracketOpen => {
        self.consume();
        let key = self.expr(ctx.nested(), [TT::BracketClose])?;
        self.require(TT::BracketClose)?;
        return Ok(ClassOrObjKey::Computed(key));
      }
      TT::LiteralString => {
        let lit = self.lit_str()?;
        (lit.loc, lit.stx.value)
      }
      TT::LiteralNumber => {
        let lit = self.lit_num()?;
        (lit.loc, lit.stx.value.to_string())
      }
      TT::LiteralBigInt => {
        let lit = self.lit_bigint()?;
        (lit.loc, lit.stx.value)
      }
      TT::PrivateMember => {
        self.consume();
        (t.loc, self.string(t.loc))
      }
      typ if is_identifier_name(typ) => {
        self.consume();
        (t.loc, self.identifier_name(&t)?.0)
      }
      _ => return Err(t.error(SyntaxErrorType::ExpectedSyntax("property key"))),
    };
    Ok(ClassOrObjKey::Direct(Node::new(loc, ClassOrObjMemberDirectKey {
      key,
      tt: t.typ,
    })))
  }

  /// Parses a member of a class body or an object literal, other than object shorthands and spreads. This covers methods (including `async`, generator, getter and setter forms), object properties with values, and class fields.
  pub fn class_or_obj_member(
    &mut self,
    ctx: ParseCtx,
    owner: MemberOwner,
  ) -> SyntaxResult<(ClassOrObjKey, ClassOrObjVal)> {
    let (a, b) = self.peek_2();
    let mut async_ = false;
    let mut generator = false;
    let mut accessor = None;
    match a.typ {
      TT::KeywordAsync
        if !b.preceded_by_line_terminator && (b.typ == TT::Asterisk || is_key_start(b.typ)) =>
      {
        self.consume();
        async_ = true;
        generator = self.consume_if(TT::Asterisk).is_match();
      }
      TT::Asterisk => {
        self.consume();
        generator = true;
      }
      TT::KeywordGet | TT::KeywordSet if is_key_start(b.typ) && b.typ != TT::Asterisk => {
        self.consume();
        accessor = Some(a.typ);
      }
      _ => {}
    };

    let key = self.class_or_obj_key(ctx)?;
    let (in_class, derived, static_) = match owner {
      MemberOwner::Object => (false, false, false),
      MemberOwner::Class { derived, static_ } => (true, derived, static_),
    };
    let mut is_constructor = false;
    if let ClassOrObjKey::Direct(k) = &key {
      if k.stx.is_private() {
        if !in_class {
          return Err(k.error(SyntaxErrorType::ExpectedSyntax("property key")));
        };
        if k.stx.key == "#constructor" {
          return Err(k.error(SyntaxErrorType::ExpectedSyntax("private name other than `#constructor`")));
        };
      } else if in_class && static_ && k.stx.key == "prototype" {
        return Err(k.error(SyntaxErrorType::ExpectedSyntax("static member not named `prototype`")));
      } else if in_class && !static_ && k.stx.key == "constructor" {
        if async_ || generator || accessor.is_some() {
          return Err(k.error(SyntaxErrorType::ExpectedSyntax("plain constructor method")));
        };
        is_constructor = true;
      };
    };

    if async_ || generator || accessor.is_some() || self.peek().typ == TT::ParenthesisOpen {
      let kind = FuncKind {
        derived_constructor: is_constructor && derived,
        ..FuncKind::method(async_, generator)
      };
      let func = self.func(ctx, kind, None)?;
      let val = match accessor {
        Some(TT::KeywordGet) => {
          if !func.stx.parameters.is_empty() {
            return Err(func.error(SyntaxErrorType::InvalidAccessorParameters));
          };
          ClassOrObjVal::Getter(func.wrap(|func| ClassOrObjGetter { func }))
        }
        Some(_) => {
          if func.stx.parameters.len() != 1 || func.stx.parameters[0].stx.rest {
            return Err(func.error(SyntaxErrorType::InvalidAccessorParameters));
          };
          ClassOrObjVal::Setter(func.wrap(|func| ClassOrObjSetter { func }))
        }
        None => ClassOrObjVal::Method(func.wrap(|func| ClassOrObjMethod { func })),
      };
      return Ok((key, val));
    };

    if !in_class {
      self.require(TT::Colon)?;
      let value = self.expr_cover(ctx, [TT::Comma, TT::BraceClose])?;
      return Ok((key, ClassOrObjVal::Prop(Some(value))));
    };

    if is_constructor {
      if let ClassOrObjKey::Direct(k) = &key {
        return Err(k.error(SyntaxErrorType::ExpectedSyntax("field not named `constructor`")));
      };
    };
    // Field initialisers are evaluated like methods of the class.
    let init_ctx = ParseCtx {
      top_level: false,
      in_function: false,
      in_async: false,
      in_generator: false,
      new_target_allowed: true,
      super_prop_allowed: true,
      super_call_allowed: false,
      ..ctx
    };
    let value = self
      .consume_if(TT::Equals)
      .and_then(|| self.expr(init_ctx, [TT::Semicolon, TT::BraceClose]))?;
    self.require_semicolon_or_asi()?;
    Ok((key, ClassOrObjVal::Prop(value)))
  }
}

#[cfg(test)]
mod tests {
  use crate::ast::class_or_object::ClassOrObjKey;
  use crate::ast::class_or_object::ClassOrObjVal;
  use crate::ast::stmt::Stmt;
  use crate::error::SyntaxErrorType;
  use crate::parse;

  fn class_members(src: &str) -> Vec<(String, bool, &'static str)> {
    let top = parse(src).unwrap();
    let Stmt::ClassDecl(decl) = top.stx.body[0].stx.as_ref() else {
      panic!("not a class");
    };
    decl
      .stx
      .members
      .iter()
      .map(|m| {
        let key = match &m.stx.key {
          ClassOrObjKey::Direct(k) => k.stx.key.clone(),
          ClassOrObjKey::Computed(_) => "[computed]".to_string(),
        };
        let kind = match &m.stx.val {
          ClassOrObjVal::Getter(_) => "get",
          ClassOrObjVal::Setter(_) => "set",
          ClassOrObjVal::Method(_) => "method",
          ClassOrObjVal::Prop(_) => "prop",
          ClassOrObjVal::StaticBlock(_) => "block",
        };
        (key, m.stx.static_, kind)
      })
      .collect()
  }

  #[test]
  fn modifiers_can_be_names() {
    assert_eq!(
      class_members("class A { static; get; set = 1; async() {} static static() {} get get() {} static {} }"),
      vec![
        ("static".to_string(), false, "prop"),
        ("get".to_string(), false, "prop"),
        ("set".to_string(), false, "prop"),
        ("async".to_string(), false, "method"),
        ("static".to_string(), true, "method"),
        ("get".to_string(), false, "get"),
        ("static".to_string(), true, "block"),
      ]
    );
  }

  #[test]
  fn normalises_keys() {
    assert_eq!(
      class_members("class A { 'a\\x62'() {} 0x10 = 1; #p; [k]; \\u0061b() {} }"),
      vec![
        ("ab".to_string(), false, "method"),
        ("16".to_string(), false, "prop"),
        ("#p".to_string(), false, "prop"),
        ("[computed]".to_string(), false, "prop"),
        ("ab".to_string(), false, "method"),
      ]
    );
  }

  #[test]
  fn constructor_rules() {
    let err = |src| parse(src).unwrap_err().typ;
    assert_eq!(err("class A { constructor() {} constructor() {} }"), SyntaxErrorType::DuplicateConstructor);
    assert!(matches!(err("class A { get constructor() {} }"), SyntaxErrorType::ExpectedSyntax(_)));
    assert!(matches!(err("class A { constructor = 1 }"), SyntaxErrorType::ExpectedSyntax(_)));
    assert!(parse("class A { static constructor() {} constructor() {} }").is_ok());
    assert!(parse("class A extends B { constructor() { super(); } }").is_ok());
    assert_eq!(err("class A { constructor() { super(); } }"), SyntaxErrorType::SuperOutsideMethod);
    assert_eq!(err("class A { m() { super(); } }"), SyntaxErrorType::SuperOutsideMethod);
  }

  #[test]
  fn accessor_parameters() {
    let err = |src| parse(src).unwrap_err().typ;
    assert_eq!(err("({ get a(b) {} })"), SyntaxErrorType::InvalidAccessorParameters);
    assert_eq!(err("({ set a() {} })"), SyntaxErrorType::InvalidAccessorParameters);
    assert_eq!(err("({ set a(...b) {} })"), SyntaxErrorType::InvalidAccessorParameters);
    assert!(parse("({ get a() {}, set a(v) {} })").is_ok());
  }

  #[test]
  fn class_code_is_strict() {
    assert_eq!(
      parse("class A { m() { with (a) {} } }").unwrap_err().typ,
      SyntaxErrorType::StrictModeWith
    );
    assert!(parse("class A { m() { super.x; } } with (a) {}").is_ok());
  }
}
