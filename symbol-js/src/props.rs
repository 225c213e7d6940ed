use crate::cache::SharedNameCache;
use crate::name::NameGenerator;
use ahash::HashMap;
use ahash::HashSet;
use derive_visitor::Drive;
use derive_visitor::DriveMut;
use derive_visitor::Visitor;
use derive_visitor::VisitorMut;
use once_cell::sync::Lazy;
use parse_js::ast::class_or_object::ClassMember;
use parse_js::ast::class_or_object::ClassOrObjKey;
use parse_js::ast::class_or_object::ClassOrObjMemberDirectKey;
use parse_js::ast::class_or_object::ClassOrObjVal;
use parse_js::ast::class_or_object::ObjMember;
use parse_js::ast::class_or_object::ObjMemberType;
use parse_js::ast::comment::Annotations;
use parse_js::ast::expr::lit::LitStrExpr;
use parse_js::ast::expr::pat::ObjPatProp;
use parse_js::ast::expr::BinaryExpr;
use parse_js::ast::expr::CallExpr;
use parse_js::ast::expr::ClassExpr;
use parse_js::ast::expr::ComputedMemberExpr;
use parse_js::ast::expr::Expr;
use parse_js::ast::expr::IdExpr;
use parse_js::ast::expr::MemberExpr;
use parse_js::ast::expr::PrivateNameExpr;
use parse_js::ast::node::Node;
use parse_js::ast::stmt::decl::ClassDecl;
use parse_js::ast::stx::TopLevel;
use parse_js::loc::Loc;
use parse_js::operator::OperatorName;
use parse_js::token::TT;
use regex::Regex;
use std::collections::BTreeMap;
use std::collections::BTreeSet;

/// Properties of the standard library and the DOM that code outside the unit can rely on.
pub static BUILTIN_PROPS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
  [
    // Object and Function.
    "__defineGetter__", "__defineSetter__", "__lookupGetter__", "__lookupSetter__", "__proto__",
    "apply", "arguments", "assign", "bind", "call", "callee", "caller", "configurable",
    "constructor", "create", "defineProperties", "defineProperty", "entries", "enumerable",
    "freeze", "fromEntries", "get", "getOwnPropertyDescriptor", "getOwnPropertyDescriptors",
    "getOwnPropertyNames", "getOwnPropertySymbols", "getPrototypeOf", "groupBy", "hasOwn",
    "hasOwnProperty", "is", "isExtensible", "isFrozen", "isPrototypeOf", "isSealed", "keys",
    "length", "name", "preventExtensions", "propertyIsEnumerable", "prototype", "seal", "set",
    "setPrototypeOf", "toLocaleString", "toString", "value", "valueOf", "values", "writable",
    // Array and typed arrays.
    "at", "buffer", "byteLength", "byteOffset", "BYTES_PER_ELEMENT", "concat", "copyWithin",
    "every", "fill", "filter", "find", "findIndex", "findLast", "findLastIndex", "flat", "flatMap",
    "forEach", "from", "fromAsync", "getBigInt64", "getBigUint64", "getFloat32", "getFloat64",
    "getInt16", "getInt32", "getInt8", "getUint16", "getUint32", "getUint8", "includes", "indexOf",
    "isArray", "isView", "join", "lastIndexOf", "map", "maxByteLength", "of", "pop", "push",
    "reduce", "reduceRight", "resizable", "resize", "reverse", "setBigInt64", "setBigUint64",
    "setFloat32", "setFloat64", "setInt16", "setInt32", "setInt8", "setUint16", "setUint32",
    "setUint8", "shift", "slice", "some", "sort", "splice", "subarray", "toReversed", "toSorted",
    "toSpliced", "transfer", "unshift", "with",
    // String and RegExp.
    "anchor", "charAt", "charCodeAt", "codePointAt", "dotAll", "endsWith", "exec", "flags",
    "fromCharCode", "fromCodePoint", "global", "groups", "hasIndices", "ignoreCase", "index",
    "indices", "input", "isWellFormed", "lastIndex", "localeCompare", "match", "matchAll",
    "multiline", "normalize", "padEnd", "padStart", "raw", "repeat", "replace", "replaceAll",
    "search", "source", "split", "startsWith", "sticky", "substr", "substring", "test",
    "toLocaleLowerCase", "toLocaleUpperCase", "toLowerCase", "toUpperCase", "toWellFormed", "trim",
    "trimEnd", "trimLeft", "trimRight", "trimStart", "unicode", "unicodeSets",
    // Number, Math and BigInt.
    "abs", "acos", "acosh", "asin", "asinh", "asIntN", "asUintN", "atan", "atan2", "atanh", "cbrt",
    "ceil", "clz32", "cos", "cosh", "E", "EPSILON", "exp", "expm1", "floor", "fround", "hypot",
    "imul", "isFinite", "isInteger", "isNaN", "isSafeInteger", "LN10", "LN2", "log", "log10",
    "LOG10E", "log1p", "log2", "LOG2E", "max", "MAX_SAFE_INTEGER", "MAX_VALUE", "min",
    "MIN_SAFE_INTEGER", "MIN_VALUE", "NaN", "NEGATIVE_INFINITY", "parseFloat", "parseInt", "PI",
    "POSITIVE_INFINITY", "pow", "random", "round", "sign", "sin", "sinh", "sqrt", "SQRT1_2",
    "SQRT2", "tan", "tanh", "toExponential", "toFixed", "toPrecision", "trunc",
    // Symbol, Reflect and Proxy.
    "asyncIterator", "construct", "deleteProperty", "description", "for", "has", "hasInstance",
    "isConcatSpreadable", "iterator", "keyFor", "matchAll", "ownKeys", "revocable", "revoke",
    "search", "species", "split", "toPrimitive", "toStringTag", "unscopables",
    // Promise, iterators and generators.
    "all", "allSettled", "any", "catch", "done", "finally", "next", "promise", "race", "reject",
    "resolve", "return", "then", "throw", "withResolvers",
    // Collections and weak references.
    "add", "clear", "delete", "deref", "forEach", "has", "register", "size", "unregister",
    // Date.
    "getDate", "getDay", "getFullYear", "getHours", "getMilliseconds", "getMinutes", "getMonth",
    "getSeconds", "getTime", "getTimezoneOffset", "getUTCDate", "getUTCDay", "getUTCFullYear",
    "getUTCHours", "getUTCMilliseconds", "getUTCMinutes", "getUTCMonth", "getUTCSeconds", "getYear",
    "now", "parse", "setDate", "setFullYear", "setHours", "setMilliseconds", "setMinutes",
    "setMonth", "setSeconds", "setTime", "setUTCDate", "setUTCFullYear", "setUTCHours",
    "setUTCMilliseconds", "setUTCMinutes", "setUTCMonth", "setUTCSeconds", "toDateString",
    "toISOString", "toJSON", "toLocaleDateString", "toLocaleTimeString", "toTimeString",
    "toUTCString", "UTC",
    // JSON, Error, Intl, Atomics and globals.
    "and", "captureStackTrace", "cause", "Collator", "compare", "compareExchange", "DateTimeFormat",
    "decodeURI", "decodeURIComponent", "DisplayNames", "encodeURI", "encodeURIComponent", "errors",
    "escape", "eval", "exchange", "format", "formatToParts", "globalThis", "isLockFree",
    "ListFormat", "load", "Locale", "message", "notify", "NumberFormat", "or", "PluralRules",
    "RelativeTimeFormat", "resolvedOptions", "segment", "Segmenter", "select", "stack",
    "stackTraceLimit", "store", "stringify", "sub", "supportedLocalesOf", "unescape", "wait",
    "waitAsync", "xor",
    // console.
    "assert", "count", "countReset", "debug", "dir", "dirxml", "error", "group", "groupCollapsed",
    "groupEnd", "info", "table", "time", "timeEnd", "timeLog", "timeStamp", "trace", "warn",
    // DOM and the browser.
    "abort", "aborted", "addEventListener", "append", "appendChild", "attributes", "blur", "body",
    "classList", "className", "clearInterval", "clearTimeout", "click", "clientHeight",
    "clientWidth", "cloneNode", "closest", "contains", "createElement", "createElementNS",
    "createEvent", "createTextNode", "currentTarget", "data", "dataset", "default",
    "defaultPrevented", "detail", "dispatchEvent", "document", "documentElement", "fetch",
    "firstChild", "firstElementChild", "focus", "getAttribute", "getBoundingClientRect",
    "getComputedStyle", "getElementById", "getElementsByClassName", "getElementsByTagName",
    "getItem", "hasAttribute", "hash", "head", "headers", "height", "host", "hostname", "href",
    "id", "innerHTML", "innerText", "insertBefore", "json", "key", "lastChild", "localStorage",
    "location", "matches", "method", "navigator", "nextSibling", "nodeName", "nodeType",
    "offsetHeight", "offsetWidth", "ok", "onclick", "onerror", "onload", "origin", "outerHTML",
    "parentElement", "parentNode", "pathname", "port", "postMessage", "preventDefault", "protocol",
    "querySelector", "querySelectorAll", "remove", "removeAttribute", "removeChild",
    "removeEventListener", "removeItem", "replaceChild", "requestAnimationFrame", "scrollLeft",
    "scrollTop", "search", "sessionStorage", "setAttribute", "setInterval", "setItem", "setTimeout",
    "signal", "status", "statusText", "stopPropagation", "style", "tagName", "target", "text",
    "textContent", "toggle", "type", "url", "userAgent", "width", "window",
  ]
  .into_iter()
  .collect()
});

// Methods whose first argument is a property name of the receiver.
const NAME_FIRST_ARG_METHODS: &[&str] = &[
  "__defineGetter__",
  "__defineSetter__",
  "__lookupGetter__",
  "__lookupSetter__",
  "hasOwnProperty",
  "propertyIsEnumerable",
];

/// Which property names to rename. `Default` renames every name that isn't a builtin.
#[derive(Clone, Debug)]
pub struct PropertyManglePolicy {
  /// Only rename names matching this.
  pub regex: Option<Regex>,
  /// Never rename a name that appears quoted, as an object key or in `a["b"]`.
  pub keep_quoted: bool,
  pub reserved: BTreeSet<String>,
  /// Never rename names in [`BUILTIN_PROPS`].
  pub builtins: bool,
  /// Only rename names that appear as a `/*@__MANGLE_PROP__*/` string somewhere.
  pub only_annotated: bool,
  /// Generate readable `_$name$_` names instead of minimal ones.
  pub debug: bool,
}

impl Default for PropertyManglePolicy {
  fn default() -> Self {
    PropertyManglePolicy {
      regex: None,
      keep_quoted: false,
      reserved: BTreeSet::new(),
      builtins: true,
      only_annotated: false,
      debug: false,
    }
  }
}

#[derive(Clone, Debug, Default)]
pub struct PropertyMangleResult {
  /// Original property name to new name, including names taken from the cache.
  pub renamed: BTreeMap<String, String>,
  /// Names seen in the unit that were left alone.
  pub kept: BTreeSet<String>,
  /// Count of distinct private names renamed, summed over class bodies.
  pub private_renamed: usize,
}

// Names like "1" or "1.5" that a numeric key could also produce.
fn is_numeric(name: &str) -> bool {
  name.starts_with(|c: char| c.is_ascii_digit() || c == '.' || c == '-') && name.parse::<f64>().is_ok()
}

fn string_arg(call: &CallExpr, index: usize) -> Option<&Node<LitStrExpr>> {
  let arg = call.arguments.get(index)?;
  if arg.stx.spread {
    return None;
  };
  match arg.stx.value.stx.as_ref() {
    Expr::LitStr(s) => Some(s),
    _ => None,
  }
}

/// The string argument of `call` that names a property, if any.
fn property_name_arg(call: &CallExpr) -> Option<&Node<LitStrExpr>> {
  let Expr::Member(callee) = call.callee.stx.as_ref() else {
    return None;
  };
  let right = callee.stx.right.as_str();
  if right == "defineProperty" {
    if let Expr::Id(object) = callee.stx.left.stx.as_ref() {
      if object.stx.name == "Object" || object.stx.name == "Reflect" {
        return string_arg(call, 1);
      };
    };
    return None;
  };
  if NAME_FIRST_ARG_METHODS.contains(&right) {
    return string_arg(call, 0);
  };
  None
}

type BinaryExprNode = Node<BinaryExpr>;
type CallExprNode = Node<CallExpr>;
type ClassDeclNode = Node<ClassDecl>;
type ClassExprNode = Node<ClassExpr>;
type ClassOrObjMemberDirectKeyNode = Node<ClassOrObjMemberDirectKey>;
type ComputedMemberExprNode = Node<ComputedMemberExpr>;
type LitStrExprNode = Node<LitStrExpr>;
type MemberExprNode = Node<MemberExpr>;
type ObjMemberNode = Node<ObjMember>;
type ObjPatPropNode = Node<ObjPatProp>;
type PrivateNameExprNode = Node<PrivateNameExpr>;

#[derive(Visitor, Default)]
#[visitor(
  BinaryExprNode(enter),
  CallExprNode(enter),
  ClassOrObjMemberDirectKeyNode(enter),
  ComputedMemberExprNode(enter),
  LitStrExprNode(enter),
  MemberExprNode(enter),
  ObjMemberNode(enter)
)]
struct CollectVisitor {
  keep_quoted: bool,
  counts: HashMap<String, usize>,
  // Names that must not be renamed regardless of policy.
  pinned: HashSet<String>,
  annotated: HashSet<String>,
  // Strings in property name positions, rewritten along with keys.
  string_sites: HashSet<Loc>,
}

impl CollectVisitor {
  fn add(&mut self, name: &str) {
    *self.counts.entry(name.to_string()).or_default() += 1;
    // Lone surrogates are decoded to U+FFFD, so different keys in the source can look identical here.
    if name.contains('\u{FFFD}') {
      self.pinned.insert(name.to_string());
    };
  }

  fn add_string(&mut self, node: &Node<LitStrExpr>, quoted: bool) {
    self.add(&node.stx.value);
    self.string_sites.insert(node.loc);
    if quoted && self.keep_quoted {
      self.pinned.insert(node.stx.value.clone());
    };
  }

  fn enter_class_or_obj_member_direct_key_node(&mut self, node: &ClassOrObjMemberDirectKeyNode) {
    match node.stx.tt {
      TT::PrivateMember => {}
      TT::LiteralNumber | TT::LiteralBigInt => {
        self.pinned.insert(node.stx.key.clone());
      }
      TT::LiteralString => {
        self.add(&node.stx.key);
        self.string_sites.insert(node.loc);
        if self.keep_quoted {
          self.pinned.insert(node.stx.key.clone());
        };
      }
      _ => self.add(&node.stx.key),
    };
  }

  fn enter_obj_member_node(&mut self, node: &ObjMemberNode) {
    if let ObjMemberType::Shorthand { id } = &node.stx.typ {
      self.add(&id.stx.name);
    };
  }

  fn enter_member_expr_node(&mut self, node: &MemberExprNode) {
    if !node.stx.right.starts_with('#') {
      self.add(&node.stx.right);
    };
  }

  fn enter_computed_member_expr_node(&mut self, node: &ComputedMemberExprNode) {
    if let Expr::LitStr(s) = node.stx.member.stx.as_ref() {
      self.add_string(s, true);
    };
  }

  fn enter_call_expr_node(&mut self, node: &CallExprNode) {
    if let Some(s) = property_name_arg(&node.stx) {
      self.add_string(s, false);
    };
  }

  fn enter_binary_expr_node(&mut self, node: &BinaryExprNode) {
    if node.stx.operator != OperatorName::In {
      return;
    };
    if let Expr::LitStr(s) = node.stx.left.stx.as_ref() {
      self.add_string(s, false);
    };
  }

  fn enter_lit_str_expr_node(&mut self, node: &LitStrExprNode) {
    let Some(annotations) = node.assoc.get::<Annotations>() else {
      return;
    };
    if annotations.mangle_prop {
      self.annotated.insert(node.stx.value.clone());
    };
    if (annotations.key || annotations.mangle_prop) && !self.string_sites.contains(&node.loc) {
      self.add_string(node, false);
    };
  }
}

struct PrivateFrame {
  names: HashMap<String, String>,
  counter: usize,
}

#[derive(VisitorMut)]
#[visitor(
  ClassDeclNode,
  ClassExprNode,
  ClassOrObjMemberDirectKeyNode(enter),
  LitStrExprNode(enter),
  MemberExprNode(enter),
  ObjMemberNode(enter),
  ObjPatPropNode(enter),
  PrivateNameExprNode(enter)
)]
struct RewriteVisitor<'a> {
  renamed: &'a BTreeMap<String, String>,
  string_sites: &'a HashSet<Loc>,
  generator: NameGenerator,
  debug: bool,
  private_frames: Vec<PrivateFrame>,
  private_renamed: usize,
}

impl<'a> RewriteVisitor<'a> {
  fn push_private_frame(&mut self, members: &[Node<ClassMember>]) {
    let mut counter = self.private_frames.last().map_or(0, |f| f.counter);
    let mut names = HashMap::default();
    for member in members {
      let ClassOrObjKey::Direct(key) = &member.stx.key else {
        continue;
      };
      if !key.stx.is_private() || names.contains_key(&key.stx.key) {
        continue;
      };
      let new_name = if self.debug {
        format!("#_${}$_", &key.stx.key[1..])
      } else {
        let name = format!("#{}", self.generator.nth(counter));
        counter += 1;
        name
      };
      names.insert(key.stx.key.clone(), new_name);
    }
    self.private_renamed += names.len();
    self.private_frames.push(PrivateFrame { names, counter });
  }

  fn private_name(&self, name: &str) -> Option<String> {
    self
      .private_frames
      .iter()
      .rev()
      .find_map(|f| f.names.get(name))
      .cloned()
  }

  fn enter_class_decl_node(&mut self, node: &mut ClassDeclNode) {
    self.push_private_frame(&node.stx.members);
  }

  fn exit_class_decl_node(&mut self, _node: &mut ClassDeclNode) {
    self.private_frames.pop();
  }

  fn enter_class_expr_node(&mut self, node: &mut ClassExprNode) {
    self.push_private_frame(&node.stx.members);
  }

  fn exit_class_expr_node(&mut self, _node: &mut ClassExprNode) {
    self.private_frames.pop();
  }

  fn enter_private_name_expr_node(&mut self, node: &mut PrivateNameExprNode) {
    if let Some(new_name) = self.private_name(&node.stx.name) {
      node.stx.name = new_name;
    };
  }

  fn enter_class_or_obj_member_direct_key_node(&mut self, node: &mut ClassOrObjMemberDirectKeyNode) {
    match node.stx.tt {
      TT::PrivateMember => {
        if let Some(new_name) = self.private_name(&node.stx.key) {
          node.stx.key = new_name;
        };
      }
      TT::LiteralNumber | TT::LiteralBigInt => {}
      tt => {
        let Some(new_name) = self.renamed.get(&node.stx.key) else {
          return;
        };
        node.stx.key = new_name.clone();
        if tt != TT::LiteralString {
          node.stx.tt = TT::Identifier;
        };
      }
    };
  }

  fn enter_member_expr_node(&mut self, node: &mut MemberExprNode) {
    let new_name = if node.stx.right.starts_with('#') {
      self.private_name(&node.stx.right)
    } else {
      self.renamed.get(&node.stx.right).cloned()
    };
    if let Some(new_name) = new_name {
      node.stx.right = new_name;
    };
  }

  fn enter_lit_str_expr_node(&mut self, node: &mut LitStrExprNode) {
    if !self.string_sites.contains(&node.loc) {
      return;
    };
    let Some(new_name) = self.renamed.get(&node.stx.value) else {
      return;
    };
    let quote = node.stx.quote().unwrap_or('"');
    node.stx.raw = format!("{}{}{}", quote, new_name, quote);
    node.stx.value = new_name.clone();
  }

  // `{x}` becomes `{a: x}`.
  fn enter_obj_member_node(&mut self, node: &mut ObjMemberNode) {
    let ObjMemberType::Shorthand { id } = &mut node.stx.typ else {
      return;
    };
    let Some(new_name) = self.renamed.get(&id.stx.name) else {
      return;
    };
    let loc = id.loc;
    let value = Node {
      loc,
      stx: Box::new(IdExpr {
        name: id.stx.name.clone(),
      }),
      assoc: std::mem::take(&mut id.assoc),
    };
    node.stx.typ = ObjMemberType::Valued {
      key: ClassOrObjKey::Direct(Node::new(loc, ClassOrObjMemberDirectKey {
        key: new_name.clone(),
        tt: TT::Identifier,
      })),
      val: ClassOrObjVal::Prop(Some(value.into_wrapped::<Expr>())),
    };
  }

  fn enter_obj_pat_prop_node(&mut self, node: &mut ObjPatPropNode) {
    if !node.stx.shorthand {
      return;
    };
    if let ClassOrObjKey::Direct(key) = &node.stx.key {
      if self.renamed.contains_key(&key.stx.key) {
        node.stx.shorthand = false;
      };
    };
  }
}

/// Renames object and class property names in `top_level`, consistently with every other unit sharing `cache`. Private names are renamed per class body and never cached.
pub fn mangle_properties(
  top_level: &mut Node<TopLevel>,
  policy: &PropertyManglePolicy,
  cache: &SharedNameCache,
) -> PropertyMangleResult {
  let _span = tracing::debug_span!("mangle_properties").entered();
  let mut collect = CollectVisitor {
    keep_quoted: policy.keep_quoted,
    ..Default::default()
  };
  top_level.drive(&mut collect);

  let can_rename = |name: &str| {
    !collect.pinned.contains(name)
      && !is_numeric(name)
      && !(policy.builtins && BUILTIN_PROPS.contains(name))
      && !policy.reserved.contains(name)
      && policy.regex.as_ref().map_or(true, |r| r.is_match(name))
      && (!policy.only_annotated || collect.annotated.contains(name))
  };
  let mut candidates: Vec<(&String, usize)> = collect
    .counts
    .iter()
    .filter(|(name, _)| can_rename(name.as_str()))
    .map(|(name, count)| (name, *count))
    .collect();
  candidates.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

  let generator = NameGenerator::default();
  let mut renamed = BTreeMap::new();
  {
    let mut cache = cache.lock();
    let mut used: HashSet<String> = cache.outputs().into_iter().map(str::to_string).collect();
    let mut counter = 0;
    let mut cache_hits = 0;
    for (name, _) in candidates {
      let new_name = match cache.get(name) {
        Some(cached) => {
          cache_hits += 1;
          cached.to_string()
        }
        None => {
          let taken = |n: &str| {
            used.contains(n)
              || collect.counts.contains_key(n)
              || policy.reserved.contains(n)
              || (policy.builtins && BUILTIN_PROPS.contains(n))
          };
          let new_name = if policy.debug {
            let base = format!("_${}$_", name);
            let mut candidate = base.clone();
            let mut suffix = 0;
            while taken(&candidate) {
              suffix += 1;
              candidate = format!("{}{}", base, suffix);
            }
            candidate
          } else {
            generator.next_available(&mut counter, taken)
          };
          cache.insert(name, &new_name);
          new_name
        }
      };
      used.insert(new_name.clone());
      renamed.insert(name.clone(), new_name);
    }
    tracing::debug!(renamed = renamed.len(), cache_hits, "assigned property names");
  }

  let mut rewrite = RewriteVisitor {
    renamed: &renamed,
    string_sites: &collect.string_sites,
    generator,
    debug: policy.debug,
    private_frames: Vec::new(),
    private_renamed: 0,
  };
  top_level.drive_mut(&mut rewrite);
  let private_renamed = rewrite.private_renamed;

  let kept = collect
    .counts
    .keys()
    .filter(|name| !renamed.contains_key(*name))
    .cloned()
    .collect();
  PropertyMangleResult {
    renamed,
    kept,
    private_renamed,
  }
}
