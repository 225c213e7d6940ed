use crate::parse::class_or_object::MemberOwner;
use super::ParseCtx;
use super::Parser;
use crate::ast::class_or_object::ClassOrObjKey;
use crate::ast::class_or_object::ClassOrObjMemberDirectKey;
use crate::ast::class_or_object::ClassOrObjVal;
use crate::ast::class_or_object::ObjMember;
use crate::ast::class_or_object::ObjMemberType;
use crate::ast::expr::lit::LitArrElem;
use crate::ast::expr::lit::LitArrExpr;
use crate::ast::expr::lit::LitBigIntExpr;
use crate::ast::expr::lit::LitNumExpr;
use crate::ast::expr::lit::LitObjExpr;
use crate::ast::expr::lit::LitRegexExpr;
use crate::ast::expr::lit::LitStrExpr;
use crate::ast::expr::lit::LitTemplatePart;
use crate::ast::expr::pat::IdPat;
use crate::ast::expr::BinaryExpr;
use crate::ast::expr::Expr;
use crate::ast::expr::IdExpr;
use crate::ast::node::InvalidOutsidePattern;
use crate::ast::node::LegacyOctalEscapeSequence;
use crate::ast::node::Node;
use crate::ast::node::TrailingCommaAfterSpread;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::lex::is_identifier_name;
use crate::lex::LexMode;
use crate::loc::Loc;
use crate::num::parse_bigint_literal;
use crate::num::parse_number_literal;
use crate::num::JsNumber;
use crate::num::NumberLiteralForm;
use crate::operator::OperatorName;
use crate::token::TT;

/// The result of processing the escapes in a string or template part.
#[derive(Debug, PartialEq, Eq)]
pub struct Cooked {
  pub value: String,
  // Byte offset within the raw text of the first legacy octal or `\8`/`\9` escape.
  pub legacy_escape: Option<usize>,
}

/// An escape that can't be decoded, at this byte offset within the raw text.
#[derive(Debug, PartialEq, Eq)]
pub struct InvalidEscape(pub usize);

fn hex_value(digits: &str) -> Option<u32> {
  if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
    return None;
  };
  u32::from_str_radix(digits, 16).ok()
}

/// Processes escape sequences. `template` forbids legacy octal and `\8`/`\9` escapes.
pub fn cook(raw: &str, template: bool) -> Result<Cooked, InvalidEscape> {
  let mut value = String::with_capacity(raw.len());
  let mut legacy_escape = None;
  let mut iter = raw.char_indices().peekable();
  while let Some((i, c)) = iter.next() {
    if c != '\\' {
      // A template's line terminators cook to `\n`, like its raw text.
      if template && c == '\r' {
        iter.next_if(|(_, c)| *c == '\n');
        value.push('\n');
      } else {
        value.push(c);
      };
      continue;
    };
    let Some((_, e)) = iter.next() else {
      return Err(InvalidEscape(i));
    };
    match e {
      // Line continuations.
      '\r' => {
        iter.next_if(|(_, c)| *c == '\n');
      }
      '\n' | '\u{2028}' | '\u{2029}' => {}
      'b' => value.push('\x08'),
      'f' => value.push('\x0c'),
      'n' => value.push('\n'),
      'r' => value.push('\r'),
      't' => value.push('\t'),
      'v' => value.push('\x0b'),
      '0' if !iter.peek().is_some_and(|(_, c)| c.is_ascii_digit()) => value.push('\0'),
      '0'..='7' => {
        if template {
          return Err(InvalidEscape(i));
        };
        legacy_escape.get_or_insert(i);
        // Up to three digits, as long as the value stays within `\377`.
        let mut v = e.to_digit(8).unwrap_or(0);
        let max_len = if e <= '3' { 3 } else { 2 };
        for _ in 1..max_len {
          match iter.peek().and_then(|(_, c)| c.to_digit(8)) {
            Some(d) => {
              v = v * 8 + d;
              iter.next();
            }
            None => break,
          };
        }
        value.push(char::from_u32(v).unwrap_or('\u{FFFD}'));
      }
      '8' | '9' => {
        if template {
          return Err(InvalidEscape(i));
        };
        legacy_escape.get_or_insert(i);
        value.push(e);
      }
      'x' => {
        let start = i + 2;
        let digits = raw.get(start..start + 2).ok_or(InvalidEscape(i))?;
        let v = hex_value(digits).ok_or(InvalidEscape(i))?;
        iter.nth(1);
        value.push(char::from_u32(v).ok_or(InvalidEscape(i))?);
      }
      'u' => {
        let start = i + 2;
        let (v, len) = if raw[start..].starts_with('{') {
          let end = raw[start..].find('}').ok_or(InvalidEscape(i))?;
          let v = hex_value(&raw[start + 1..start + end]).ok_or(InvalidEscape(i))?;
          if v > 0x10FFFF {
            return Err(InvalidEscape(i));
          };
          (v, end + 1)
        } else {
          let digits = raw.get(start..start + 4).ok_or(InvalidEscape(i))?;
          (hex_value(digits).ok_or(InvalidEscape(i))?, 4)
        };
        for _ in 0..len {
          iter.next();
        }
        // Combine a surrogate pair written as two escapes.
        let v = if (0xD800..=0xDBFF).contains(&v) && raw[start + len..].starts_with("\\u") {
          match raw
            .get(start + len + 2..start + len + 6)
            .and_then(hex_value)
          {
            Some(low) if (0xDC00..=0xDFFF).contains(&low) => {
              for _ in 0..6 {
                iter.next();
              }
              0x10000 + ((v - 0xD800) << 10) + (low - 0xDC00)
            }
            _ => v,
          }
        } else {
          v
        };
        // Lone surrogates can't be represented in a Rust string.
        value.push(char::from_u32(v).unwrap_or('\u{FFFD}'));
      }
      c => value.push(c),
    };
  }
  Ok(Cooked {
    value,
    legacy_escape,
  })
}

/// Template raw text has its line terminators normalised to `\n`.
pub fn normalise_template_raw(raw: &str) -> String {
  raw.replace("\r\n", "\n").replace('\r', "\n")
}

impl<'a> Parser<'a> {
  pub fn lit_str(&mut self) -> SyntaxResult<Node<LitStrExpr>> {
    let t = self.require(TT::LiteralString)?;
    let raw = self.str(t.loc);
    let body = &raw[1..raw.len() - 1];
    let cooked = cook(body, false).map_err(|InvalidEscape(i)| {
      Loc(t.loc.0 + 1 + i, t.loc.0 + 2 + i).error(SyntaxErrorType::InvalidCharacterEscape, None)
    })?;
    let mut node = Node::new(t.loc, LitStrExpr {
      value: cooked.value,
      raw: raw.to_string(),
    });
    if let Some(i) = cooked.legacy_escape {
      let loc = Loc(t.loc.0 + 1 + i, t.loc.0 + 2 + i);
      if self.is_strict() {
        return Err(loc.error(SyntaxErrorType::StrictModeLegacyOctal, None));
      };
      node.assoc.set(LegacyOctalEscapeSequence(loc));
    };
    Ok(node)
  }

  pub fn lit_num(&mut self) -> SyntaxResult<Node<LitNumExpr>> {
    let t = self.require(TT::LiteralNumber)?;
    let raw = self.string(t.loc);
    if NumberLiteralForm::of(&raw).is_legacy() && self.is_strict() {
      return Err(t.error(SyntaxErrorType::StrictModeLegacyOctal));
    };
    let value = parse_number_literal(&raw)
      .ok_or_else(|| t.error(SyntaxErrorType::MalformedLiteralNumber))?;
    Ok(Node::new(t.loc, LitNumExpr {
      value: JsNumber(value),
      raw,
    }))
  }

  pub fn lit_bigint(&mut self) -> SyntaxResult<Node<LitBigIntExpr>> {
    let t = self.require(TT::LiteralBigInt)?;
    let raw = self.string(t.loc);
    let value =
      parse_bigint_literal(&raw).ok_or_else(|| t.error(SyntaxErrorType::MalformedLiteralBigInt))?;
    Ok(Node::new(t.loc, LitBigIntExpr { value, raw }))
  }

  pub fn lit_regex(&mut self) -> SyntaxResult<Node<LitRegexExpr>> {
    let t = self.require_with_mode(TT::LiteralRegex, LexMode::SlashIsRegex)?;
    let raw = self.str(t.loc);
    let flags = raw.rfind('/').map(|i| &raw[i + 1..]).unwrap_or("");
    let mut seen = Vec::new();
    for f in flags.chars() {
      if !"dgimsuvy".contains(f) || seen.contains(&f) {
        return Err(t.error(SyntaxErrorType::InvalidRegexFlags));
      };
      seen.push(f);
    }
    if seen.contains(&'u') && seen.contains(&'v') {
      return Err(t.error(SyntaxErrorType::InvalidRegexFlags));
    };
    Ok(Node::new(t.loc, LitRegexExpr {
      value: self.string(t.loc),
    }))
  }

  /// Parses the string parts and substitutions of a template, starting at its first token. Invalid escapes are only allowed if `tagged`, where they produce a part with no cooked value.
  pub fn lit_template_parts(
    &mut self,
    ctx: ParseCtx,
    tagged: bool,
  ) -> SyntaxResult<Vec<LitTemplatePart>> {
    let mut parts = Vec::new();
    let mut t = self.consume();
    // The first part starts with a backtick; later ones start after the closing brace of a substitution.
    let mut prefix = 1;
    loop {
      let end = match t.typ {
        TT::LiteralTemplatePartString => 2,
        TT::LiteralTemplatePartStringEnd => 1,
        _ => return Err(t.error(SyntaxErrorType::UnterminatedTemplate)),
      };
      let raw = self.str(t.loc);
      let body = &raw[prefix..raw.len() - end];
      let cooked = match cook(body, true) {
        Ok(c) => Some(c.value),
        Err(_) if tagged => None,
        Err(InvalidEscape(i)) => {
          let at = t.loc.0 + prefix + i;
          return Err(Loc(at, at + 1).error(SyntaxErrorType::InvalidCharacterEscape, None));
        }
      };
      parts.push(LitTemplatePart::String {
        cooked,
        raw: normalise_template_raw(body),
      });
      if t.typ == TT::LiteralTemplatePartStringEnd {
        break;
      };
      let substitution = self.expr(ctx, [TT::BraceClose])?;
      parts.push(LitTemplatePart::Substitution(substitution));
      self.require(TT::BraceClose)?;
      t = self.consume_with_mode(LexMode::TemplateStrContinue);
      prefix = 0;
    }
    Ok(parts)
  }

  /// Parses an array literal, which may later be reinterpreted as an array pattern.
  pub fn lit_arr(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Expr>> {
    let mut pattern_only = None;
    let mut trailing_comma_after_spread = false;
    let node = self.with_loc(|p| {
      p.require(TT::BracketOpen)?;
      let mut elements = Vec::<LitArrElem>::new();
      loop {
        if p.consume_if(TT::BracketClose).is_match() {
          break;
        };
        if p.consume_if(TT::Comma).is_match() {
          elements.push(LitArrElem::Empty);
          continue;
        };
        let rest = p.consume_if(TT::DotDotDot).is_match();
        let value = p.expr_cover(ctx, [TT::Comma, TT::BracketClose])?;
        if let Some(InvalidOutsidePattern(err)) = value.assoc.get() {
          pattern_only.get_or_insert_with(|| err.clone());
        };
        elements.push(if rest {
          LitArrElem::Rest(value)
        } else {
          LitArrElem::Single(value)
        });
        if !p.consume_if(TT::Comma).is_match() {
          p.require(TT::BracketClose)?;
          break;
        };
        if rest && p.peek().typ == TT::BracketClose {
          trailing_comma_after_spread = true;
        };
      }
      Ok(LitArrExpr { elements })
    })?;
    let mut node: Node<Expr> = node.into_wrapped();
    if trailing_comma_after_spread {
      node.assoc.set(TrailingCommaAfterSpread);
    };
    if let Some(err) = pattern_only {
      node.assoc.set(InvalidOutsidePattern(err));
    };
    Ok(node)
  }

  /// Parses an object literal, which may later be reinterpreted as an object pattern.
  pub fn lit_obj(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<Expr>> {
    let mut pattern_only = None;
    let mut trailing_comma_after_spread = false;
    let mut proto_seen = false;
    let node = self.with_loc(|p| {
      p.require(TT::BraceOpen)?;
      let mut members = Vec::new();
      loop {
        if p.consume_if(TT::BraceClose).is_match() {
          break;
        };
        let member = p.obj_member(ctx)?;
        if let Some(InvalidOutsidePattern(err)) = member.assoc.get() {
          pattern_only.get_or_insert_with(|| err.clone());
        };
        // Only `__proto__: value` sets the prototype; shorthands, methods and computed keys don't count.
        if let ObjMemberType::Valued {
          key: ClassOrObjKey::Direct(key),
          val: ClassOrObjVal::Prop(Some(value)),
        } = &member.stx.typ
        {
          if let Some(InvalidOutsidePattern(err)) = value.assoc.get() {
            pattern_only.get_or_insert_with(|| err.clone());
          };
          if key.stx.key == "__proto__" && !p.str(key.loc).starts_with('[') {
            if proto_seen {
              pattern_only.get_or_insert_with(|| key.error(SyntaxErrorType::DuplicateProtoProperty));
            };
            proto_seen = true;
          };
        };
        let is_rest = matches!(member.stx.typ, ObjMemberType::Rest { .. });
        if let ObjMemberType::Rest { val } = &member.stx.typ {
          if let Some(InvalidOutsidePattern(err)) = val.assoc.get() {
            pattern_only.get_or_insert_with(|| err.clone());
          };
        };
        members.push(member);
        if !p.consume_if(TT::Comma).is_match() {
          p.require(TT::BraceClose)?;
          break;
        };
        if is_rest && p.peek().typ == TT::BraceClose {
          trailing_comma_after_spread = true;
        };
      }
      Ok(LitObjExpr { members })
    })?;
    let mut node: Node<Expr> = node.into_wrapped();
    if trailing_comma_after_spread {
      node.assoc.set(TrailingCommaAfterSpread);
    };
    if let Some(err) = pattern_only {
      node.assoc.set(InvalidOutsidePattern(err));
    };
    Ok(node)
  }

  fn obj_member(&mut self, ctx: ParseCtx) -> SyntaxResult<Node<ObjMember>> {
    if self.consume_if(TT::DotDotDot).is_match() {
      return self.with_loc(|p| {
        let val = p.expr_cover(ctx, [TT::Comma, TT::BraceClose])?;
        Ok(ObjMember {
          typ: ObjMemberType::Rest { val },
        })
      });
    };
    let (a, b) = self.peek_2();
    let is_shorthand = (a.typ == TT::Identifier || is_identifier_name(a.typ))
      && matches!(b.typ, TT::Comma | TT::BraceClose | TT::Equals);
    if !is_shorthand {
      return self.with_loc(|p| {
        let (key, val) = p.class_or_obj_member(ctx, MemberOwner::Object)?;
        Ok(ObjMember {
          typ: ObjMemberType::Valued { key, val },
        })
      });
    };

    let t = self.consume();
    let (name, _) = self.identifier_name(&t)?;
    let start = self.checkpoint();
    let initializer = self.consume_if(TT::Equals).match_loc();
    let Some(eq_loc) = initializer else {
      self.validate_identifier(ctx, &name, t.loc, false)?;
      let id = Node::new(t.loc, IdExpr { name });
      return Ok(Node::new(t.loc, ObjMember {
        typ: ObjMemberType::Shorthand { id },
      }));
    };
    // `{a = 1}` is only valid as a pattern, where it's a shorthand with a default value. Keep it as `a: a = 1` until then.
    self.validate_identifier(ctx, &name, t.loc, true)?;
    let default = self.expr(ctx, [TT::Comma, TT::BraceClose])?;
    let loc = t.loc + self.since_checkpoint(&start);
    let target = Node::new(t.loc, IdPat { name: name.clone() }).into_wrapped();
    let value = Node::new(loc, BinaryExpr {
      operator: OperatorName::Assignment,
      left: target,
      right: default,
    })
    .into_wrapped();
    let key = Node::new(t.loc, ClassOrObjMemberDirectKey { key: name, tt: t.typ });
    let mut member = Node::new(loc, ObjMember {
      typ: ObjMemberType::Valued {
        key: ClassOrObjKey::Direct(key),
        val: ClassOrObjVal::Prop(Some(value)),
      },
    });
    member.assoc.set(InvalidOutsidePattern(
      eq_loc.error(SyntaxErrorType::InvalidCoverInitializedName, Some(TT::Equals)),
    ));
    Ok(member)
  }
}

#[cfg(test)]
mod tests {
  use super::cook;
  use super::normalise_template_raw;
  use super::InvalidEscape;

  #[test]
  fn cooks_escapes() {
    let c = cook(r"a\x41B\u{43}\n\
b", false)
    .unwrap();
    assert_eq!(c.value, "aABC\nb");
    assert_eq!(c.legacy_escape, None);
    assert_eq!(cook(r"\uD83D\uDE00", false).unwrap().value, "\u{1F600}");
    assert_eq!(cook(r"\uD83D", false).unwrap().value, "\u{FFFD}");
  }

  #[test]
  fn legacy_octal_escapes() {
    let c = cook(r"x\101\8", false).unwrap();
    assert_eq!(c.value, "xA8");
    assert_eq!(c.legacy_escape, Some(1));
    assert_eq!(cook(r"\0", true).unwrap().value, "\0");
    assert_eq!(cook(r"\01", true), Err(InvalidEscape(0)));
    assert_eq!(cook(r"\xZ1", false), Err(InvalidEscape(0)));
  }

  #[test]
  fn template_raw_normalises_line_terminators() {
    assert_eq!(normalise_template_raw("a\r\nb\rc"), "a\nb\nc");
  }
}
