use parse_js::ast::stmt::Stmt;
use parse_js::error::SyntaxErrorType;
use parse_js::options::ParseOptions;
use parse_js::options::TopLevelMode;
use parse_js::parse_with_options;

#[test]
fn script_source_type_rejects_module_syntax() {
  let script_opts = ParseOptions::default();
  for src in ["import x from 'y';", "export const x = 1;", "import.meta"] {
    let err = parse_with_options(src, &script_opts).unwrap_err();
    assert_eq!(err.typ, SyntaxErrorType::ModuleSyntaxOutsideModule, "{src}");
  }
}

#[test]
fn module_source_type_accepts_module_syntax() {
  let opts = ParseOptions::module();
  let ast = parse_with_options("import x from 'y';\nexport { x };", &opts).unwrap();
  assert!(matches!(ast.stx.body[0].stx.as_ref(), Stmt::Import(_)));
  assert!(matches!(ast.stx.body[1].stx.as_ref(), Stmt::ExportList(_)));
}

#[test]
fn return_outside_function() {
  assert_eq!(
    parse_js::parse("return 1").unwrap_err().typ,
    SyntaxErrorType::ReturnOutsideFunction
  );
  let opts = ParseOptions {
    allow_return_outside_function: true,
    ..Default::default()
  };
  assert!(parse_with_options("return 1", &opts).is_ok());
}

#[test]
fn html_comments_only_in_scripts() {
  let src = "a <!-- b\n--> c\nd";
  let ast = parse_js::parse(src).unwrap();
  assert_eq!(ast.stx.body.len(), 2);
  // In modules, `<!--` is `<`, `!`, `--`.
  assert!(parse_with_options(src, &ParseOptions::module()).is_err());
}

#[test]
fn options_from_json_config() {
  let opts: ParseOptions = serde_json::from_str(r#"{"top_level_mode": "Module"}"#).unwrap();
  assert_eq!(opts.top_level_mode, TopLevelMode::Module);
  assert!(!opts.allow_return_outside_function);
}
