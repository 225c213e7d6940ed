use derive_visitor::Drive;
use derive_visitor::Visitor;
use parse_js::ast::expr::lit::LitStrExpr;
use parse_js::ast::expr::lit::LitTemplateExpr;
use parse_js::ast::expr::lit::LitTemplatePart;
use parse_js::ast::node::Node;
use parse_js::lex::lex_next;
use parse_js::lex::LexMode;
use parse_js::lex::Lexer;
use parse_js::loc::Loc;
use parse_js::parse;
use parse_js::token::TT;

type LitStrExprNode = Node<LitStrExpr>;
type LitTemplateExprNode = Node<LitTemplateExpr>;

#[derive(Default, Visitor)]
#[visitor(LitStrExprNode(enter), LitTemplateExprNode(enter))]
struct Literals {
  // (cooked, raw)
  strings: Vec<(String, String)>,
  templates: Vec<Vec<(Option<String>, String)>>,
}

impl Literals {
  fn enter_lit_str_expr_node(&mut self, node: &LitStrExprNode) {
    self.strings.push((node.stx.value.clone(), node.stx.raw.clone()));
  }

  fn enter_lit_template_expr_node(&mut self, node: &LitTemplateExprNode) {
    let parts = node
      .stx
      .parts
      .iter()
      .filter_map(|part| match part {
        LitTemplatePart::String { cooked, raw } => Some((cooked.clone(), raw.clone())),
        LitTemplatePart::Substitution(_) => None,
      })
      .collect();
    self.templates.push(parts);
  }
}

fn literals(src: &str) -> Literals {
  let top = parse(src).unwrap();
  let mut visitor = Literals::default();
  top.drive(&mut visitor);
  visitor
}

fn lex_one(src: &str) -> TT {
  let mut lexer = Lexer::new(src);
  let token = lex_next(&mut lexer, LexMode::Standard);
  assert_eq!(token.loc, Loc(0, src.len()), "lexing {:?}", src);
  assert_eq!(lex_next(&mut lexer, LexMode::Standard).typ, TT::EOF, "lexing {:?}", src);
  token.typ
}

#[test]
fn string_raw_text_relexes_to_the_same_literal() {
  let sources = [
    "'plain'",
    r#""say \"hi\"""#,
    r"'\x41B\u{1F600}\n\t\0\v'",
    r"'😀'",
    r"'legacy \101 \8'",
    "'line \\\ncontinued'",
    "'crlf \\\r\ncontinued'",
    "'sep\u{2028}arator'",
  ];
  for src in sources {
    let found = literals(&format!("({});", src)).strings;
    assert_eq!(found.len(), 1, "{:?}", src);
    let (value, raw) = &found[0];
    assert_eq!(raw, src);
    assert_eq!(lex_one(raw), TT::LiteralString);
    let again = literals(&format!("({});", raw)).strings;
    assert_eq!(&again[0], &found[0], "{:?}", src);
  }
}

#[test]
fn template_raw_text_relexes_to_the_same_literal() {
  let sources = [
    "`plain`",
    r"`\u{41}\x42 \${not a substitution}`",
    "`line \\\ncontinued ${a} and \\\r\nagain`",
    "`crlf\r\nand cr\rnormalise`",
    "`${a}${b}`",
  ];
  for src in sources {
    let found = literals(&format!("({});", src)).templates;
    assert_eq!(found.len(), 1, "{:?}", src);
    let raws: Vec<&str> = found[0].iter().map(|(_, raw)| raw.as_str()).collect();
    let rebuilt = format!("`{}`", raws.join("${x}"));
    if raws.len() == 1 {
      assert_eq!(lex_one(&rebuilt), TT::LiteralTemplatePartStringEnd);
    };
    let again = literals(&format!("({});", rebuilt)).templates;
    assert_eq!(again, found, "{:?}", src);
  }

  let cr = literals("(`a\r\nb\rc`);").templates;
  assert_eq!(cr[0][0], (Some("a\nb\nc".to_string()), "a\nb\nc".to_string()));
}
