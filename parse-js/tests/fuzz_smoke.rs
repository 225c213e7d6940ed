use parse_js::error::SyntaxErrorType;
use parse_js::options::ParseOptions;
use parse_js::parse_with_options;

const RANDOM_INPUTS: usize = 300;

#[derive(Clone)]
struct SimpleRng(u64);

impl SimpleRng {
  fn next_u64(&mut self) -> u64 {
    let mut x = self.0;
    // xorshift64*
    x ^= x << 13;
    x ^= x >> 7;
    x ^= x << 17;
    self.0 = x;
    x
  }

  fn choose<'a>(&mut self, slice: &'a [&'a str]) -> &'a str {
    slice[(self.next_u64() % slice.len() as u64) as usize]
  }
}

const FRAGMENTS: &[&str] = &[
  "a", "b", "1", "'s'", "`t${", "}`", "(", ")", "[", "]", "{", "}", ",", ";", "=", "=>", "+", "++",
  "?.", "?", ":", "...", "async", "await", "yield", "function", "class", "let", "var", "const",
  "if", "else", "for", "of", "in", "new", "super", "this", "import", "export", "default", "/",
  "/x/g", "\n", " ", "#p", "static", "get", "set", "*", "**", "??", "!", "delete", "return",
];

fn deep_nesting(depth: usize) -> String {
  let mut out = String::new();
  for _ in 0..depth {
    out.push_str("([{a:");
  }
  out.push_str("value");
  for _ in 0..depth {
    out.push_str("}])");
  }
  out
}

#[test]
fn random_token_soup_never_panics() {
  let mut rng = SimpleRng(0x9E3779B97F4A7C15);
  for _ in 0..RANDOM_INPUTS {
    let len = 1 + (rng.next_u64() % 40) as usize;
    let src: String = (0..len).map(|_| rng.choose(FRAGMENTS)).collect::<Vec<_>>().join(" ");
    let _ = parse_js::parse(&src);
    let _ = parse_with_options(&src, &ParseOptions::module());
  }
}

#[test]
fn deep_nesting_is_an_error_not_a_stack_overflow() {
  let opts = ParseOptions {
    max_depth: 256,
    ..Default::default()
  };
  assert!(parse_with_options(&deep_nesting(10), &opts).is_ok());
  let err = parse_with_options(&deep_nesting(5000), &opts).unwrap_err();
  assert_eq!(err.typ, SyntaxErrorType::NestingTooDeep);
}
