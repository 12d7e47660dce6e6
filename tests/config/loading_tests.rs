// Config loading tests - AppConfig::load from files on disk
//
// Every test is serialized because config loading reads PORT from the
// process environment.

use serial_test::serial;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::tempdir;
use threadloop_core::AgentOptions;
use threadloop_core::config::{AppConfig, CheckpointConfig, ConfigError};

fn write_config(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("agent.toml");
    fs::write(&path, content).expect("Failed to write agent.toml");
    path
}

fn full_config(data_dir: &Path) -> String {
    format!(
        r#"
default_provider = "local"
model = "llama3"
system_message = "You answer HR questions."

[agent]
recursion_limit = 4
reasoning_timeout_secs = 20
tool_timeout_secs = 5
parallel_tool_calls = false
temperature = 0.5

[checkpoint]
backend = "file"
path = "{}"

[search]
endpoint = "http://127.0.0.1:7070/search"
index = "staff"
default_results = 3

[server]
bind = "0.0.0.0:8088"
cors_origins = ["http://localhost:5173"]

[[providers]]
id = "local"
type = "openai"
endpoint = "http://127.0.0.1:8000"
models = [{{ name = "llama3" }}]
"#,
        data_dir.display()
    )
}

#[test]
#[serial]
fn returns_error_when_explicit_file_is_missing() {
    let result = AppConfig::load(Some(Path::new("/nonexistent/path/agent.toml")));
    assert!(matches!(result, Err(ConfigError::NotFound { .. })));
}

#[test]
#[serial]
fn returns_parse_error_for_invalid_toml() {
    let dir = tempdir().expect("tempdir");
    let path = write_config(dir.path(), "model = [unterminated");
    let result = AppConfig::load(Some(&path));
    assert!(matches!(result, Err(ConfigError::Parse { .. })));
}

#[test]
#[serial]
fn loads_every_section() {
    // SAFETY: serialized with the other env-touching tests.
    unsafe { std::env::remove_var("PORT") };
    let dir = tempdir().expect("tempdir");
    let data_dir = dir.path().join("threads");
    let path = write_config(dir.path(), &full_config(&data_dir));

    let config = AppConfig::load(Some(&path)).expect("config");

    assert_eq!(config.default_provider, "local");
    assert_eq!(config.model, "llama3");
    assert_eq!(config.system_message, "You answer HR questions.");
    assert_eq!(config.agent.recursion_limit, 4);
    assert_eq!(config.agent.reasoning_timeout, Duration::from_secs(20));
    assert_eq!(config.agent.tool_timeout, Duration::from_secs(5));
    assert!(!config.agent.parallel_tool_calls);
    assert_eq!(config.checkpoint, CheckpointConfig::File { dir: data_dir });
    assert_eq!(
        config.search.endpoint.as_deref(),
        Some("http://127.0.0.1:7070/search")
    );
    assert_eq!(config.search.index, "staff");
    assert_eq!(config.search.default_results, 3);
    assert_eq!(
        config.server.bind,
        "0.0.0.0:8088".parse::<SocketAddr>().expect("addr")
    );
    assert_eq!(config.server.cors_origins, ["http://localhost:5173"]);
    assert!(config.provider("local").is_some());

    let options = AgentOptions::from_config(&config);
    assert_eq!(options.recursion_limit, 4);
    assert_eq!(options.provider, "local");
    assert_eq!(options.tool_timeout, Some(Duration::from_secs(5)));
    assert_eq!(options.temperature, Some(0.5));
}

#[test]
#[serial]
fn checkpoint_path_expands_environment_variables() {
    // SAFETY: serialized with the other env-touching tests.
    unsafe { std::env::set_var("THREADLOOP_TEST_DATA", "/var/lib/threadloop") };
    let dir = tempdir().expect("tempdir");
    let path = write_config(
        dir.path(),
        "[checkpoint]\nbackend = \"sqlite\"\npath = \"$THREADLOOP_TEST_DATA/db.sqlite\"\n",
    );

    let config = AppConfig::load(Some(&path));
    unsafe { std::env::remove_var("THREADLOOP_TEST_DATA") };

    assert_eq!(
        config.expect("config").checkpoint,
        CheckpointConfig::Sqlite {
            path: PathBuf::from("/var/lib/threadloop/db.sqlite")
        }
    );
}

fn load_err(dir: &Path, content: &str) -> ConfigError {
    let path = write_config(dir, content);
    AppConfig::load(Some(&path)).expect_err(content)
}

#[test]
#[serial]
fn rejects_invalid_values() {
    let dir = tempdir().expect("tempdir");

    let err = load_err(dir.path(), "[agent]\nrecursion_limit = 0\n");
    assert!(matches!(err, ConfigError::InvalidRecursionLimit));

    let err = load_err(dir.path(), "[server]\nbind = \"localhost\"\n");
    assert!(matches!(err, ConfigError::InvalidBind { .. }));

    let err = load_err(dir.path(), "[checkpoint]\nbackend = \"sqlite\"\n");
    assert!(matches!(err, ConfigError::MissingCheckpointPath { .. }));

    let err = load_err(dir.path(), "[checkpoint]\nbackend = \"redis\"\npath = \"x\"\n");
    assert!(matches!(err, ConfigError::UnknownCheckpointBackend { backend } if backend == "redis"));

    let err = load_err(dir.path(), "[[providers]]\nid = \"gemini\"\ntype = \"gemini\"\n");
    assert!(matches!(err, ConfigError::MissingEndpoint { .. }));
}

#[test]
#[serial]
fn memory_backend_needs_no_path() {
    let config = AppConfig::from_toml_str("[checkpoint]\nbackend = \"memory\"\n").expect("config");
    assert_eq!(config.checkpoint, CheckpointConfig::Memory);
    assert_eq!(config.checkpoint.location(), None);
}
