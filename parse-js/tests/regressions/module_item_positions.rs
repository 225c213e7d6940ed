use parse_js::error::SyntaxErrorType;
use parse_js::options::ParseOptions;
use parse_js::parse_with_options;

fn module_err(src: &str) -> SyntaxErrorType {
  parse_with_options(src, &ParseOptions::module()).unwrap_err().typ
}

#[test]
fn import_must_be_top_level_in_modules() {
  assert_eq!(
    module_err("if (true) { import a from \"mod\"; }"),
    SyntaxErrorType::ModuleSyntaxOutsideModule
  );
}

#[test]
fn export_must_be_top_level_in_modules() {
  assert_eq!(
    module_err("function f() { export {}; }"),
    SyntaxErrorType::ModuleSyntaxOutsideModule
  );
}

#[test]
fn dynamic_import_is_allowed_anywhere() {
  assert!(parse_js::parse("function f() { return import('a') }").is_ok());
  assert!(parse_with_options("if (a) { import('b') }", &ParseOptions::module()).is_ok());
}

#[test]
fn modules_are_strict() {
  assert_eq!(module_err("with (a) {}"), SyntaxErrorType::StrictModeWith);
  assert_eq!(module_err("var yield"), SyntaxErrorType::StrictModeReservedWord);
}
