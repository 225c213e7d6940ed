use serde::Deserialize;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
pub enum TopLevelMode {
  #[default]
  Global,
  Module,
}

/// Options for [`crate::parse_with_options`]. Can be deserialized from a JSON config, where any missing field takes its default.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
  pub top_level_mode: TopLevelMode,
  pub allow_return_outside_function: bool,
  // A leading `#!` line becomes a hashbang comment.
  pub allow_hashbang: bool,
  // `<!--` and line-leading `-->` comments. Never enabled in modules.
  pub allow_html_comments: bool,
  // Only used in diagnostics.
  pub filename: Option<String>,
  pub max_depth: usize,
}

impl Default for ParseOptions {
  fn default() -> Self {
    ParseOptions {
      top_level_mode: TopLevelMode::Global,
      allow_return_outside_function: false,
      allow_hashbang: true,
      allow_html_comments: true,
      filename: None,
      max_depth: 1024,
    }
  }
}

impl ParseOptions {
  pub fn module() -> ParseOptions {
    ParseOptions {
      top_level_mode: TopLevelMode::Module,
      allow_html_comments: false,
      ..Default::default()
    }
  }

  pub fn is_module(&self) -> bool {
    self.top_level_mode == TopLevelMode::Module
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_fields_use_defaults() {
    let opts: ParseOptions =
      serde_json::from_str(r#"{"top_level_mode": "Module", "max_depth": 16}"#).unwrap();
    assert!(opts.is_module());
    assert_eq!(opts.max_depth, 16);
    assert!(opts.allow_hashbang);
    assert!(!opts.allow_return_outside_function);
    assert_eq!(opts.filename, None);
  }
}
