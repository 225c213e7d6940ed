use super::ParseCtx;
use super::Parser;
use crate::ast::class_or_object::ClassOrObjKey;
use crate::ast::expr::pat::ArrPat;
use crate::ast::expr::pat::ArrPatElem;
use crate::ast::expr::pat::ClassOrFuncName;
use crate::ast::expr::pat::IdPat;
use crate::ast::expr::pat::ObjPat;
use crate::ast::expr::pat::ObjPatProp;
use crate::ast::expr::pat::Pat;
use crate::ast::node::EscapedIdentifier;
use crate::ast::node::Node;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::KEYWORD_STRS;
use crate::loc::Loc;
use crate::token::Token;
use crate::token::STRICT_RESERVED_KEYWORDS;
use crate::token::TT;
use crate::token::UNRESERVED_KEYWORDS;

#[derive(Clone, Copy, Debug)]
pub struct ParsePatternRules {
  // `await` is not allowed as an identifier inside an async function or a module.
  pub await_allowed: bool,
  // `yield` is not allowed as an identifier inside a generator function.
  pub yield_allowed: bool,
}

impl ParsePatternRules {
  pub fn with_await_allowed(&self, await_allowed: bool) -> ParsePatternRules {
    Self {
      await_allowed,
      ..*self
    }
  }

  pub fn with_yield_allowed(&self, yield_allowed: bool) -> ParsePatternRules {
    Self {
      yield_allowed,
      ..*self
    }
  }
}

/// Whether a token could be an identifier in this context. Strict mode restrictions are checked separately when the name is validated.
pub fn is_valid_pattern_identifier(typ: TT, rules: ParsePatternRules) -> bool {
  match typ {
    TT::Identifier => true,
    TT::KeywordAwait => rules.await_allowed,
    TT::KeywordYield => rules.yield_allowed,
    t => UNRESERVED_KEYWORDS.contains(&t),
  }
}

/// Decodes `\uXXXX` and `\u{X...}` escapes in an identifier's raw source. The lexer has already validated them.
pub fn decode_identifier(raw: &str) -> Option<String> {
  let mut out = String::with_capacity(raw.len());
  let mut rest = raw;
  while let Some(i) = rest.find('\\') {
    out.push_str(&rest[..i]);
    let esc = rest[i..].strip_prefix("\\u")?;
    let (hex, after) = match esc.strip_prefix('{') {
      Some(braced) => {
        let end = braced.find('}')?;
        (&braced[..end], &braced[end + 1..])
      }
      None => (esc.get(..4)?, &esc[4..]),
    };
    out.push(char::from_u32(u32::from_str_radix(hex, 16).ok()?)?);
    rest = after;
  }
  out.push_str(rest);
  Some(out)
}

impl<'a> Parser<'a> {
  /// Returns the name of an identifier-like token, decoding any escapes. Escaped keywords are marked by the second value.
  pub fn identifier_name(&self, t: &Token) -> SyntaxResult<(String, bool)> {
    let raw = self.str(t.loc);
    if !raw.contains('\\') {
      return Ok((raw.to_string(), false));
    };
    let name =
      decode_identifier(raw).ok_or_else(|| t.error(SyntaxErrorType::InvalidCharacterEscape))?;
    Ok((name, true))
  }

  /// Checks that `name` can be used as an identifier in this context. `binding` is set when the identifier is being declared or assigned to.
  pub fn validate_identifier(
    &self,
    ctx: ParseCtx,
    name: &str,
    loc: Loc,
    binding: bool,
  ) -> SyntaxResult<()> {
    // Escaped keywords take on the keyword's restrictions, so look up by name rather than token type.
    let tt = KEYWORD_STRS.get(name).copied().unwrap_or(TT::Identifier);
    let err = |typ| Err(loc.error(typ, Some(tt)));
    match tt {
      TT::Identifier => {}
      TT::KeywordAwait if !ctx.rules.await_allowed || ctx.in_async => {
        return err(SyntaxErrorType::AwaitNotAllowed)
      }
      TT::KeywordYield if !ctx.rules.yield_allowed || ctx.in_generator => {
        return err(SyntaxErrorType::YieldNotAllowed)
      }
      TT::KeywordAwait | TT::KeywordYield => {}
      t if UNRESERVED_KEYWORDS.contains(&t) => {}
      _ => return err(SyntaxErrorType::ReservedWord),
    };
    if self.is_strict() {
      if STRICT_RESERVED_KEYWORDS.contains(&tt) {
        return err(SyntaxErrorType::StrictModeReservedWord);
      };
      if binding && (name == "eval" || name == "arguments") {
        return err(SyntaxErrorType::StrictModeEvalOrArguments);
      };
    };
    Ok(())
  }

  /// Consumes an identifier token, returning its validated name.
  pub fn require_identifier(&mut self, ctx: ParseCtx, binding: bool) -> SyntaxResult<(Token, String)> {
    let t = self.consume();
    if t.typ != TT::Identifier && !is_valid_pattern_identifier(t.typ, ctx.rules) {
      // Give the more specific error for contextual keywords.
      return Err(match t.typ {
        TT::KeywordAwait => t.error(SyntaxErrorType::AwaitNotAllowed),
        TT::KeywordYield => t.error(SyntaxErrorType::YieldNotAllowed),
        _ => t.error(SyntaxErrorType::ExpectedSyntax("identifier")),
      });
    };
    let (name, _) = self.identifier_name(&t)?;
    self.validate_identifier(ctx, &name, t.loc, binding)?;
    Ok((t, name))
  }

  pub fn maybe_class_or_func_name(
    &mut self,
    ctx: ParseCtx,
  ) -> SyntaxResult<Option<Node<ClassOrFuncName>>> {
    if self.peek().typ == TT::ParenthesisOpen {
      return Ok(None);
    };
    let (t, name) = self.require_identifier(ctx, true)?;
    Ok(Some(Node::new(t.loc, ClassOrFuncName { name })))
  }

  /// Parses an identifier pattern.
  pub fn id_pat(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<IdPat>> {
    let (t, name) = self.require_identifier(ctx, true)?;
    let mut node = Node::new(t.loc, IdPat { name });
    if self.str(t.loc).contains('\\') {
      node.assoc.set(EscapedIdentifier);
    };
    Ok(node)
  }

  /// Parses an object pattern like `{ x, y: z, [computed]: value, ...rest }`.
  /// An object pattern may only contain one rest element, which must be an identifier and must not have a trailing comma.
  pub fn obj_pat(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ObjPat>> {
    self.with_loc(|p| {
      p.require(TT::BraceOpen)?;
      let mut properties = Vec::new();
      let mut rest = None;
      while p.peek().typ != TT::BraceClose {
        // Check inside loop to ensure that it must come first or after a comma.
        if p.consume_if(TT::DotDotDot).is_match() {
          rest = Some(p.id_pat(ctx)?.into_wrapped());
          let t = p.peek();
          if t.typ != TT::BraceClose {
            return Err(t.error(SyntaxErrorType::RestElementNotLast));
          };
          break;
        };

        let prop = p.with_loc(|p| {
          let key_token = p.peek();
          let key = p.class_or_obj_key(ctx)?;
          if let ClassOrObjKey::Direct(n) = &key {
            if n.stx.tt == TT::PrivateMember {
              return Err(key_token.error(SyntaxErrorType::ExpectedSyntax("property name")));
            };
          };
          let (shorthand, target) = if p.consume_if(TT::Colon).is_match() {
            // There's a colon, so there's a subpattern and it's not a shorthand.
            (false, p.pat(ctx)?)
          } else {
            // There's no colon, so it's a shorthand. The key must not be computed, and be a valid identifier name. (It could be a number, reserved keyword, etc., all of which are not allowed.)
            match &key {
              ClassOrObjKey::Computed(name) => {
                return Err(name.error(SyntaxErrorType::ExpectedSyntax(
                  "object pattern property subpattern",
                )));
              }
              ClassOrObjKey::Direct(n) => {
                if n.stx.tt != TT::Identifier && !is_valid_pattern_identifier(n.stx.tt, ctx.rules)
                {
                  return Err(key_token.error(SyntaxErrorType::ExpectedSyntax("identifier")));
                };
                p.validate_identifier(ctx, &n.stx.key, n.loc, true)?;
                let id_pat = n
                  .derive_stx(|n| IdPat {
                    name: n.key.clone(),
                  })
                  .into_wrapped();
                (true, id_pat)
              }
            }
          };
          let default_value = p
            .consume_if(TT::Equals)
            .and_then(|| p.expr(ctx, [TT::Comma, TT::BraceClose]))?;
          Ok(ObjPatProp {
            key,
            target,
            default_value,
            shorthand,
          })
        })?;
        properties.push(prop);
        // This will break if `}`.
        if !p.consume_if(TT::Comma).is_match() {
          break;
        };
      }
      p.require(TT::BraceClose)?;
      Ok(ObjPat { properties, rest })
    })
  }

  /// Parses an array pattern like `[a, b = c, ...rest]`.
  pub fn arr_pat(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ArrPat>> {
    self.with_loc(|p| {
      p.require(TT::BracketOpen)?;
      let mut elements = Vec::<Option<ArrPatElem>>::new();
      let mut rest = None;
      while p.peek().typ != TT::BracketClose {
        // Check inside loop to ensure that it must come first or after a comma.
        if p.consume_if(TT::DotDotDot).is_match() {
          rest = Some(p.pat(ctx)?);
          let t = p.peek();
          if t.typ != TT::BracketClose {
            return Err(t.error(SyntaxErrorType::RestElementNotLast));
          };
          break;
        };

        // An unnamed element is allowed to ignore that element.
        if p.consume_if(TT::Comma).is_match() {
          elements.push(None);
        } else {
          let target = p.pat(ctx)?;
          let default_value = p
            .consume_if(TT::Equals)
            .and_then(|| p.expr(ctx, [TT::Comma, TT::BracketClose]))?;
          elements.push(Some(ArrPatElem {
            target,
            default_value,
          }));
          // This will break if `]`.
          if !p.consume_if(TT::Comma).is_match() {
            break;
          };
        };
      }
      p.require(TT::BracketClose)?;
      Ok(ArrPat { elements, rest })
    })
  }

  /// Parses any binding pattern: an identifier, or an object or array destructuring pattern.
  pub fn pat(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Pat>> {
    self.nested(|p| {
      let t = p.peek();
      Ok(match t.typ {
        TT::BraceOpen => p.obj_pat(ctx)?.into_wrapped(),
        TT::BracketOpen => p.arr_pat(ctx)?.into_wrapped(),
        _ => p.id_pat(ctx)?.into_wrapped(),
      })
    })
  }
}

#[cfg(test)]
mod tests {
  use super::decode_identifier;

  #[test]
  fn decodes_identifier_escapes() {
    assert_eq!(decode_identifier("a\\u0062c").as_deref(), Some("abc"));
    assert_eq!(decode_identifier("\\u{1d49c}x").as_deref(), Some("\u{1d49c}x"));
    assert_eq!(decode_identifier("plain").as_deref(), Some("plain"));
    assert_eq!(decode_identifier("\\x41"), None);
  }
}
