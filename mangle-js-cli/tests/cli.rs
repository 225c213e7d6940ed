use assert_cmd::Command;
use serde_json::Value;
use std::time::Duration;
use tempfile::tempdir;

fn mangle_js_cli() -> Command {
  assert_cmd::cargo::cargo_bin_cmd!("mangle-js-cli")
}

fn parse_stdout_json(stdout: &[u8]) -> Value {
  serde_json::from_slice(stdout).expect("stdout should be valid JSON")
}

#[test]
fn prints_ast_and_name_map() {
  let assert = mangle_js_cli()
    .timeout(Duration::from_secs(5))
    .arg("--toplevel")
    .write_stdin("var value = 1; function f() { return value + missing; }")
    .assert()
    .success();

  assert!(
    assert.get_output().stderr.is_empty(),
    "expected stderr to be empty, got: {}",
    String::from_utf8_lossy(&assert.get_output().stderr)
  );
  let output = parse_stdout_json(&assert.get_output().stdout);
  assert_eq!(output["globals"], serde_json::json!(["missing"]));
  let renamed = output["names"]["value"][0].as_str().unwrap();
  assert_ne!(renamed, "value");
  assert_eq!(output["ast"]["body"][0]["$t"], "VarDecl");
  assert!(output["props"].is_null());
}

#[test]
fn syntax_errors_go_to_stderr() {
  let assert = mangle_js_cli()
    .timeout(Duration::from_secs(5))
    .write_stdin("function {")
    .assert()
    .failure()
    .code(1);

  assert!(assert.get_output().stdout.is_empty());
  let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
  assert!(stderr.contains("error[PS"), "got: {}", stderr);
}

#[test]
fn scope_errors_go_to_stderr() {
  let assert = mangle_js_cli()
    .timeout(Duration::from_secs(5))
    .write_stdin("{ let x; let x; }")
    .assert()
    .failure()
    .code(1);

  let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
  assert!(stderr.contains("error[SC0001]"), "got: {}", stderr);
}

#[test]
fn config_file_and_name_cache() {
  let dir = tempdir().unwrap();
  let config = dir.path().join("config.json");
  let cache = dir.path().join("cache.json");
  std::fs::write(
    &config,
    r#"{ "parse": { "top_level_mode": "Module" }, "mangle_props": { "reserved": ["keep"] } }"#,
  )
  .unwrap();

  let first = mangle_js_cli()
    .timeout(Duration::from_secs(5))
    .arg("--config")
    .arg(&config)
    .arg("--name-cache")
    .arg(&cache)
    .write_stdin("export const o = { keep: 1, shared: 2 }; o.shared;")
    .assert()
    .success();
  let first = parse_stdout_json(&first.get_output().stdout);
  let shared = first["props"]["shared"].as_str().unwrap().to_string();
  assert!(first["props"].get("keep").is_none());

  let saved: Value = serde_json::from_str(&std::fs::read_to_string(&cache).unwrap()).unwrap();
  assert_eq!(saved["props"]["shared"], shared.as_str());

  let second = mangle_js_cli()
    .timeout(Duration::from_secs(5))
    .arg("--config")
    .arg(&config)
    .arg("--name-cache")
    .arg(&cache)
    .write_stdin("o.other; o.shared;")
    .assert()
    .success();
  let second = parse_stdout_json(&second.get_output().stdout);
  assert_eq!(second["props"]["shared"], shared.as_str());
  assert_ne!(second["props"]["other"], shared.as_str());
}

#[test]
fn flags_override_config() {
  let dir = tempdir().unwrap();
  let config = dir.path().join("config.json");
  std::fs::write(&config, r#"{ "parse": { "top_level_mode": "Module" } }"#).unwrap();

  mangle_js_cli()
    .timeout(Duration::from_secs(5))
    .arg("--config")
    .arg(&config)
    .arg("--mode")
    .arg("global")
    .write_stdin("with (o) {}")
    .assert()
    .success();
}

#[test]
fn name_cache_alone_turns_on_property_renaming() {
  let dir = tempdir().unwrap();
  let cache = dir.path().join("cache.json");

  let assert = mangle_js_cli()
    .timeout(Duration::from_secs(5))
    .arg("--name-cache")
    .arg(&cache)
    .write_stdin("const o = { counter: 1 }; o.counter++;")
    .assert()
    .success();
  let output = parse_stdout_json(&assert.get_output().stdout);
  let counter = output["props"]["counter"].as_str().unwrap();
  assert_ne!(counter, "counter");

  let saved: Value = serde_json::from_str(&std::fs::read_to_string(&cache).unwrap()).unwrap();
  assert_eq!(saved["props"]["counter"], counter);
}

#[test]
fn debug_logging_goes_to_stderr() {
  let dir = tempdir().unwrap();
  let cache = dir.path().join("cache.json");

  let assert = mangle_js_cli()
    .timeout(Duration::from_secs(5))
    .env("RUST_LOG", "debug")
    .arg("--name-cache")
    .arg(&cache)
    .write_stdin("o.counter;")
    .assert()
    .success();
  let stderr = String::from_utf8_lossy(&assert.get_output().stderr);
  assert!(stderr.contains("saved name cache"), "got: {}", stderr);
  parse_stdout_json(&assert.get_output().stdout);
}
