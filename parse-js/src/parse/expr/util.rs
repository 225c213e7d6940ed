use crate::ast::class_or_object::ClassOrObjKey;
use crate::ast::class_or_object::ClassOrObjMemberDirectKey;
use crate::ast::class_or_object::ClassOrObjVal;
use crate::ast::class_or_object::ObjMemberType;
use crate::ast::expr::lit::LitArrElem;
use crate::ast::expr::pat::ArrPat;
use crate::ast::expr::pat::ArrPatElem;
use crate::ast::expr::pat::IdPat;
use crate::ast::expr::pat::ObjPat;
use crate::ast::expr::pat::ObjPatProp;
use crate::ast::expr::pat::Pat;
use crate::ast::expr::BinaryExpr;
use crate::ast::expr::CallArg;
use crate::ast::expr::Expr;
use crate::ast::node::InvalidOutsidePattern;
use crate::ast::node::Node;
use crate::ast::node::ParenthesizedExpr;
use crate::ast::node::TrailingCommaAfterSpread;
use crate::ast::stmt::decl::ParamDecl;
use crate::ast::stmt::decl::PatDecl;
use crate::error::SyntaxErrorType;
use crate::error::SyntaxResult;
use crate::loc::Loc;
use crate::operator::OperatorName;
use crate::token::TT;

/// How an expression is being reinterpreted as a pattern.
#[derive(Clone, Copy, Debug)]
pub struct PatConversion {
  // Declaring (e.g. arrow function parameters), where only identifiers can be targets. Otherwise, assigning, where member expressions are also targets.
  pub binding: bool,
  pub strict: bool,
}

/// Fails with the deferred error if the expression contains syntax only valid in a pattern, e.g. `({a = 1})`.
pub fn check_not_pattern_only(node: &Node<Expr>) -> SyntaxResult<()> {
  match node.assoc.get::<InvalidOutsidePattern>() {
    Some(InvalidOutsidePattern(err)) => Err(err.clone()),
    None => Ok(()),
  }
}

fn is_parenthesized(node: &Node<Expr>) -> bool {
  node.assoc.has::<ParenthesizedExpr>()
}

/// Splits `target = default` as written inside a pattern. Parenthesised assignments like `[(a = 1)]` are not defaults.
fn split_default(node: Node<Expr>) -> (Node<Expr>, Option<Node<Expr>>) {
  let is_default = !is_parenthesized(&node)
    && matches!(node.stx.as_ref(), Expr::Binary(b) if b.stx.operator == OperatorName::Assignment);
  if !is_default {
    return (node, None);
  };
  match *node.stx {
    Expr::Binary(b) => {
      let BinaryExpr { left, right, .. } = *b.stx;
      (left, Some(right))
    }
    _ => unreachable!(),
  }
}

fn check_binding_name(name: &str, loc: Loc, conv: PatConversion) -> SyntaxResult<()> {
  if conv.strict && (name == "eval" || name == "arguments") {
    return Err(loc.error(SyntaxErrorType::StrictModeEvalOrArguments, None));
  };
  Ok(())
}

/// Checks that an already converted pattern, e.g. the left of `=` inside a cover, has only identifier targets.
fn check_binding_pat(pat: &Node<Pat>) -> SyntaxResult<()> {
  match pat.stx.as_ref() {
    Pat::Id(_) => Ok(()),
    Pat::Arr(arr) => {
      for elem in arr.stx.elements.iter().flatten() {
        check_binding_pat(&elem.target)?;
      }
      arr.stx.rest.as_ref().map_or(Ok(()), check_binding_pat)
    }
    Pat::Obj(obj) => {
      for prop in obj.stx.properties.iter() {
        check_binding_pat(&prop.stx.target)?;
      }
      obj.stx.rest.as_ref().map_or(Ok(()), check_binding_pat)
    }
    Pat::AssignTarget(e) => Err(e.error(SyntaxErrorType::InvalidDestructuringTarget)),
  }
}

/// Reinterprets an expression as a pattern. `{ a: [b] }` could be an object literal or an object pattern, and it's only known which once the following `=` or `=>` is seen. This converts the already parsed literal without needing to rewind and reparse.
pub fn expr_to_pat(node: Node<Expr>, conv: PatConversion) -> SyntaxResult<Node<Pat>> {
  let loc = node.loc;
  let parenthesized = is_parenthesized(&node);
  if parenthesized && conv.binding {
    return Err(node.error(SyntaxErrorType::InvalidDestructuringTarget));
  };
  let trailing_comma_after_spread = node.assoc.has::<TrailingCommaAfterSpread>();
  let invalid = if conv.binding {
    SyntaxErrorType::InvalidDestructuringTarget
  } else {
    SyntaxErrorType::InvalidAssigmentTarget
  };
  match *node.stx {
    Expr::Id(id) => {
      check_binding_name(&id.stx.name, loc, conv)?;
      Ok(id.map_stx(|id| IdPat { name: id.name }).into_wrapped())
    }
    // Already converted, e.g. the `b = 1` in `{ a: b = 1 } = x`.
    Expr::IdPat(id) => Ok(id.into_wrapped()),
    Expr::ArrPat(arr) => {
      let pat = arr.into_wrapped();
      if conv.binding {
        check_binding_pat(&pat)?;
      };
      Ok(pat)
    }
    Expr::ObjPat(obj) => {
      let pat = obj.into_wrapped();
      if conv.binding {
        check_binding_pat(&pat)?;
      };
      Ok(pat)
    }
    Expr::Member(m) if !conv.binding => {
      Ok(Node::new(loc, Pat::AssignTarget(m.into_wrapped())))
    }
    Expr::ComputedMember(m) if !conv.binding => {
      Ok(Node::new(loc, Pat::AssignTarget(m.into_wrapped())))
    }
    Expr::LitArr(_) | Expr::LitObj(_) if parenthesized => {
      Err(loc.error(SyntaxErrorType::InvalidDestructuringTarget, None))
    }
    Expr::LitArr(arr) => {
      let mut elements = Vec::new();
      let mut rest = None;
      let count = arr.stx.elements.len();
      for (i, element) in arr.stx.elements.into_iter().enumerate() {
        match element {
          LitArrElem::Empty => elements.push(None),
          LitArrElem::Single(value) => {
            let (target, default_value) = split_default(value);
            elements.push(Some(ArrPatElem {
              target: expr_to_pat(target, conv)?,
              default_value,
            }));
          }
          LitArrElem::Rest(value) => {
            if i + 1 != count || trailing_comma_after_spread {
              return Err(value.error(SyntaxErrorType::RestElementNotLast));
            };
            let (target, default_value) = split_default(value);
            if let Some(d) = default_value {
              return Err(d.error(SyntaxErrorType::InvalidDestructuringTarget));
            };
            rest = Some(expr_to_pat(target, conv)?);
          }
        };
      }
      Ok(Node::new(loc, ArrPat { elements, rest }).into_wrapped())
    }
    Expr::LitObj(obj) => {
      let mut properties = Vec::new();
      let mut rest = None;
      let count = obj.stx.members.len();
      for (i, member) in obj.stx.members.into_iter().enumerate() {
        let member_loc = member.loc;
        // Only `{a = 1}` is marked, which must become a shorthand with a default.
        let shorthand_with_default = member.assoc.has::<InvalidOutsidePattern>();
        match member.stx.typ {
          ObjMemberType::Valued {
            key,
            val: ClassOrObjVal::Prop(Some(value)),
          } => {
            let (target, default_value) = split_default(value);
            properties.push(Node::new(member_loc, ObjPatProp {
              key,
              target: expr_to_pat(target, conv)?,
              shorthand: shorthand_with_default,
              default_value,
            }));
          }
          ObjMemberType::Valued { .. } => {
            return Err(member_loc.error(invalid, None));
          }
          ObjMemberType::Shorthand { id } => {
            check_binding_name(&id.stx.name, id.loc, conv)?;
            let key = id.derive_stx(|id| ClassOrObjMemberDirectKey {
              key: id.name.clone(),
              tt: TT::Identifier,
            });
            let target = id.map_stx(|id| IdPat { name: id.name }).into_wrapped();
            properties.push(Node::new(member_loc, ObjPatProp {
              key: ClassOrObjKey::Direct(key),
              target,
              shorthand: true,
              default_value: None,
            }));
          }
          ObjMemberType::Rest { val } => {
            if i + 1 != count || trailing_comma_after_spread {
              return Err(member_loc.error(SyntaxErrorType::RestElementNotLast, None));
            };
            let target = expr_to_pat(val, conv)?;
            // An object rest can't be destructured further.
            if matches!(target.stx.as_ref(), Pat::Arr(_) | Pat::Obj(_)) {
              return Err(target.error(SyntaxErrorType::InvalidDestructuringTarget));
            };
            rest = Some(target);
          }
        };
      }
      Ok(Node::new(loc, ObjPat { properties, rest }).into_wrapped())
    }
    _ => Err(loc.error(invalid, None)),
  }
}

/// Wraps a pattern back into an expression so it can be the left of an assignment.
pub fn pat_to_expr(pat: Node<Pat>) -> Node<Expr> {
  let loc = pat.loc;
  match *pat.stx {
    Pat::Arr(n) => n.into_wrapped(),
    Pat::Id(n) => n.into_wrapped(),
    Pat::Obj(n) => n.into_wrapped(),
    Pat::AssignTarget(mut e) => {
      e.loc = loc;
      e
    }
  }
}

/// Converts the left of an assignment operator into its target. Only `=` can destructure; compound assignments need an identifier or member expression.
pub fn assign_target(lhs: Node<Expr>, operator: OperatorName, strict: bool) -> SyntaxResult<Node<Expr>> {
  let conv = PatConversion {
    binding: false,
    strict,
  };
  if operator != OperatorName::Assignment {
    check_simple_target(&lhs, strict)?;
  };
  Ok(pat_to_expr(expr_to_pat(lhs, conv)?))
}

/// Checks an operand of `++`, `--` or a compound assignment, which can only be an identifier or a non-optional member expression.
pub fn check_simple_target(node: &Node<Expr>, strict: bool) -> SyntaxResult<()> {
  match node.stx.as_ref() {
    Expr::Id(id) => check_binding_name(&id.stx.name, node.loc, PatConversion {
      binding: false,
      strict,
    }),
    Expr::Member(_) | Expr::ComputedMember(_) => Ok(()),
    _ => Err(node.error(SyntaxErrorType::InvalidAssigmentTarget)),
  }
}

/// Converts a parenthesised cover like `(a, [b] = c, ...d)` into arrow function parameters.
pub fn cover_to_params(
  items: Vec<Node<Expr>>,
  rest: Option<Node<Pat>>,
  strict: bool,
) -> SyntaxResult<Vec<Node<ParamDecl>>> {
  let conv = PatConversion {
    binding: true,
    strict,
  };
  let mut params = Vec::new();
  for item in items {
    let loc = item.loc;
    let (target, default_value) = split_default(item);
    let pat = expr_to_pat(target, conv)?;
    if let Some(d) = &default_value {
      check_not_pattern_only(d)?;
    };
    params.push(Node::new(loc, ParamDecl {
      rest: false,
      pattern: pat.wrap(|pat| PatDecl { pat }),
      default_value,
    }));
  }
  if let Some(rest) = rest {
    check_binding_pat(&rest)?;
    params.push(Node::new(rest.loc, ParamDecl {
      rest: true,
      pattern: rest.wrap(|pat| PatDecl { pat }),
      default_value: None,
    }));
  };
  Ok(params)
}

/// Converts the arguments of `async(...)` into arrow function parameters, once a following `=>` shows it wasn't a call.
pub fn call_args_to_params(args: Vec<Node<CallArg>>, strict: bool) -> SyntaxResult<Vec<Node<ParamDecl>>> {
  let count = args.len();
  let mut items = Vec::new();
  let mut rest = None;
  for (i, arg) in args.into_iter().enumerate() {
    let CallArg { spread, value } = *arg.stx;
    if !spread {
      items.push(value);
      continue;
    };
    if i + 1 != count {
      return Err(value.error(SyntaxErrorType::RestElementNotLast));
    };
    rest = Some(expr_to_pat(value, PatConversion {
      binding: true,
      strict,
    })?);
  }
  cover_to_params(items, rest, strict)
}

#[cfg(test)]
mod tests {
  use crate::ast::expr::pat::Pat;
  use crate::ast::expr::Expr;
  use crate::ast::stmt::Stmt;
  use crate::error::SyntaxErrorType;
  use crate::parse;

  fn err(src: &str) -> SyntaxErrorType {
    parse(src).unwrap_err().typ
  }

  #[test]
  fn converts_literals_to_patterns() {
    let top = parse("[a, {b, c: [d = 1], ...e}, ...f] = g;").unwrap();
    let Stmt::Expr(stmt) = top.stx.body[0].stx.as_ref() else {
      panic!();
    };
    let Expr::Binary(assign) = stmt.stx.expr.stx.as_ref() else {
      panic!();
    };
    let Expr::ArrPat(arr) = assign.stx.left.stx.as_ref() else {
      panic!();
    };
    assert_eq!(arr.stx.elements.len(), 2);
    assert!(matches!(arr.stx.rest.as_ref().unwrap().stx.as_ref(), Pat::Id(_)));
  }

  #[test]
  fn member_targets_only_when_assigning() {
    assert!(parse("[a.b, c[0]] = d; ({ x: y.z } = w);").is_ok());
    assert_eq!(err("([a.b]) => 1"), SyntaxErrorType::InvalidDestructuringTarget);
    assert_eq!(err("({ ...{a} } = b)"), SyntaxErrorType::InvalidDestructuringTarget);
  }

  #[test]
  fn rejects_invalid_targets() {
    assert_eq!(err("[...a, b] = c"), SyntaxErrorType::RestElementNotLast);
    assert_eq!(err("[...a,] = c"), SyntaxErrorType::RestElementNotLast);
    assert_eq!(err("({...a,} = c)"), SyntaxErrorType::RestElementNotLast);
    assert_eq!(err("[f()] = c"), SyntaxErrorType::InvalidAssigmentTarget);
    assert_eq!(err("[([a])] = c"), SyntaxErrorType::InvalidDestructuringTarget);
    assert_eq!(err("a?.b = c"), SyntaxErrorType::InvalidAssigmentTarget);
    assert_eq!(err("[a] += b"), SyntaxErrorType::InvalidAssigmentTarget);
    assert_eq!(err("({ m() {} } = a)"), SyntaxErrorType::InvalidAssigmentTarget);
  }

  #[test]
  fn cover_initialized_names() {
    assert!(parse("({ a = 1 } = b); ({ a = 1 }) => a;").is_ok());
    assert_eq!(err("({ a = 1 })"), SyntaxErrorType::InvalidCoverInitializedName);
    assert_eq!(err("f({ a = 1 })"), SyntaxErrorType::InvalidCoverInitializedName);
    assert_eq!(err("[{ a = 1 }].x"), SyntaxErrorType::InvalidCoverInitializedName);
  }

  #[test]
  fn strict_eval_targets() {
    assert_eq!(
      err("'use strict'; [eval] = a"),
      SyntaxErrorType::StrictModeEvalOrArguments
    );
    assert_eq!(
      err("'use strict'; arguments++"),
      SyntaxErrorType::StrictModeEvalOrArguments
    );
    assert!(parse("[eval] = a; arguments = 1").is_ok());
  }
}
