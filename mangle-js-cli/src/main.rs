use clap::builder::PossibleValuesParser;
use clap::builder::TypedValueParser;
use clap::Parser;
use parse_js::diagnostic::Diagnostic;
use parse_js::options::ParseOptions;
use parse_js::parse_with_options;
use regex::Regex;
use serde::Deserialize;
use serde_json::json;
use std::collections::BTreeSet;
use std::error::Error;
use std::fs;
use std::fs::File;
use std::io::stdin;
use std::io::stdout;
use std::io::Read;
use std::io::Write;
use std::path::PathBuf;
use std::process;
use symbol_js::mangle;
use symbol_js::mangle_properties;
use symbol_js::resolve;
use symbol_js::MangleOptions;
use symbol_js::NameCache;
use symbol_js::PropertyManglePolicy;
use symbol_js::SharedNameCache;
use symbol_js::TopLevelMode;
use tracing_subscriber::filter::EnvFilter;

#[derive(Parser)]
#[command(name = "mangle-js", about = "Resolve and mangle JavaScript names, printing the result as JSON")]
// Flags override the values loaded from `--config`.
struct Cli {
  /// File to process; omit for stdin.
  #[arg(short, long)]
  input: Option<PathBuf>,

  /// Output destination; omit for stdout.
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// JSON config with optional `parse`, `mangle` and `mangle_props` sections.
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// Whether file is a module or global script.
  #[arg(
    short,
    long,
    value_parser = PossibleValuesParser::new(["global", "module"])
        .map(|s| match s.as_str() {
          "module" => TopLevelMode::Module,
          _ => TopLevelMode::Global,
        }),
  )]
  mode: Option<TopLevelMode>,

  /// Only parse and resolve; don't rename bindings.
  #[arg(long)]
  no_mangle: bool,

  /// Also rename bindings in the top-level scope.
  #[arg(long)]
  toplevel: bool,

  #[arg(long)]
  keep_fnames: bool,

  #[arg(long)]
  keep_classnames: bool,

  /// Names never renamed or generated, comma separated.
  #[arg(long, value_delimiter = ',')]
  reserved: Vec<String>,

  /// Generate readable `_$name$_` names.
  #[arg(long)]
  debug: bool,

  /// Rename property names too.
  #[arg(long)]
  mangle_props: bool,

  /// Only rename properties matching this regex.
  #[arg(long)]
  props_regex: Option<String>,

  /// Never rename quoted property names.
  #[arg(long)]
  keep_quoted: bool,

  /// Only rename properties annotated with `/*@__MANGLE_PROP__*/`.
  #[arg(long)]
  only_annotated: bool,

  /// Property name cache, read before and written after renaming. Implies `--mangle-props`.
  #[arg(long)]
  name_cache: Option<PathBuf>,
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct Config {
  parse: ParseOptions,
  mangle: MangleOptions,
  mangle_props: Option<PropsConfig>,
}

#[derive(Deserialize)]
#[serde(default)]
struct PropsConfig {
  regex: Option<String>,
  keep_quoted: bool,
  reserved: BTreeSet<String>,
  builtins: bool,
  only_annotated: bool,
  debug: bool,
}

impl Default for PropsConfig {
  fn default() -> Self {
    PropsConfig {
      regex: None,
      keep_quoted: false,
      reserved: BTreeSet::new(),
      builtins: true,
      only_annotated: false,
      debug: false,
    }
  }
}

impl Config {
  fn load(path: Option<&PathBuf>) -> Result<Config, Box<dyn Error>> {
    let Some(path) = path else {
      return Ok(Config::default());
    };
    let raw = fs::read_to_string(path).map_err(|err| format!("failed to read config {}: {err}", path.display()))?;
    let config = serde_json::from_str(&raw).map_err(|err| format!("invalid config {}: {err}", path.display()))?;
    Ok(config)
  }

  fn apply_flags(&mut self, args: &Cli) {
    if let Some(mode) = args.mode {
      self.parse.top_level_mode = mode;
    };
    if let Some(input) = &args.input {
      self.parse.filename = Some(input.to_string_lossy().into_owned());
    };
    let mangle = &mut self.mangle;
    mangle.toplevel |= args.toplevel;
    mangle.keep_fnames |= args.keep_fnames;
    mangle.keep_classnames |= args.keep_classnames;
    mangle.debug |= args.debug;
    mangle.reserved.extend(args.reserved.iter().cloned());
    if args.mangle_props
      || args.props_regex.is_some()
      || args.keep_quoted
      || args.only_annotated
      || args.name_cache.is_some()
    {
      let props = self.mangle_props.get_or_insert_with(PropsConfig::default);
      if args.props_regex.is_some() {
        props.regex = args.props_regex.clone();
      };
      props.keep_quoted |= args.keep_quoted;
      props.only_annotated |= args.only_annotated;
      props.debug |= args.debug;
    };
  }
}

impl PropsConfig {
  fn policy(&self) -> Result<PropertyManglePolicy, Box<dyn Error>> {
    let regex = match &self.regex {
      Some(pattern) => Some(Regex::new(pattern).map_err(|err| format!("invalid property regex: {err}"))?),
      None => None,
    };
    Ok(PropertyManglePolicy {
      regex,
      keep_quoted: self.keep_quoted,
      reserved: self.reserved.clone(),
      builtins: self.builtins,
      only_annotated: self.only_annotated,
      debug: self.debug,
    })
  }
}

fn read_input(args: &Cli) -> Result<String, Box<dyn Error>> {
  let mut input = Vec::new();
  match args.input.as_ref() {
    Some(p) => File::open(p)
      .and_then(|mut f| f.read_to_end(&mut input))
      .map_err(|err| format!("failed to read {}: {err}", p.display()))?,
    None => stdin()
      .read_to_end(&mut input)
      .map_err(|err| format!("failed to read input: {err}"))?,
  };
  let source = String::from_utf8(input).map_err(|err| format!("input is not valid UTF-8: {err}"))?;
  Ok(source)
}

fn load_cache(path: Option<&PathBuf>) -> Result<NameCache, Box<dyn Error>> {
  let Some(path) = path else {
    return Ok(NameCache::default());
  };
  let cache = NameCache::load(path).map_err(|err| format!("failed to load name cache {}: {err}", path.display()))?;
  tracing::debug!(path = %path.display(), props = cache.props.len(), "loaded name cache");
  Ok(cache)
}

fn run(args: Cli) -> Result<(), Box<dyn Error>> {
  let _span = tracing::debug_span!("run", input = ?args.input).entered();
  let mut config = Config::load(args.config.as_ref())?;
  config.apply_flags(&args);
  let source = read_input(&args)?;
  let filename = config.parse.filename.clone();
  tracing::debug!(bytes = source.len(), mode = ?config.parse.top_level_mode, "read input");

  let mut top_level = parse_with_options(&source, &config.parse)
    .map_err(|err| Diagnostic::from_syntax_error(&err, &source, filename.as_deref()))?;
  let mut res = resolve(&mut top_level, config.parse.top_level_mode)
    .map_err(|err| err.diagnostic(&source, filename.as_deref()))?;

  let names = if args.no_mangle {
    None
  } else {
    Some(mangle(&mut top_level, &mut res, &config.mangle).name_map(&res))
  };

  let props = match &config.mangle_props {
    Some(props) => {
      let policy = props.policy()?;
      let cache = SharedNameCache::new(load_cache(args.name_cache.as_ref())?);
      let result = mangle_properties(&mut top_level, &policy, &cache);
      if let Some(path) = &args.name_cache {
        let snapshot = cache.snapshot();
        snapshot
          .save(path)
          .map_err(|err| format!("failed to save name cache {}: {err}", path.display()))?;
        tracing::debug!(path = %path.display(), props = snapshot.props.len(), "saved name cache");
      };
      Some(result.renamed)
    }
    None => None,
  };

  let output = json!({
    "ast": top_level,
    "globals": res.globals(),
    "names": names,
    "props": props,
  });
  let mut output = serde_json::to_vec(&output)?;
  output.push(b'\n');
  match args.output.as_ref() {
    Some(p) => File::create(p)
      .and_then(|mut file| file.write_all(&output))
      .map_err(|err| format!("failed to write {}: {err}", p.display()))?,
    None => stdout()
      .write_all(&output)
      .map_err(|err| format!("failed to write output: {err}"))?,
  };
  Ok(())
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  let args = Cli::parse();
  if let Err(err) = run(args) {
    eprintln!("{err}");
    process::exit(1);
  };
}
