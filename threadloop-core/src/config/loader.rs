use super::CONFIG_PATH;
use super::app::{
    AgentSettings, AppConfig, CheckpointConfig, HttpServerConfig, SearchConfig, default_providers,
};
use super::defaults::*;
use super::error::ConfigError;
use super::provider::{ModelProviderConfig, RawProviderConfig};
use dotenvy::from_filename;
use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Once;
use std::time::Duration;
use tracing::{debug, info, warn};

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
pub(super) struct RawConfig {
    pub model: Option<String>,
    pub default_provider: Option<String>,
    pub system_message: Option<String>,
    pub prompt_template: Option<String>,
    #[serde(default)]
    pub agent: RawAgent,
    #[serde(default)]
    pub checkpoint: RawCheckpoint,
    #[serde(default)]
    pub search: RawSearch,
    #[serde(default)]
    pub server: RawServer,
    #[serde(default)]
    pub providers: Vec<RawProviderConfig>,
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct RawAgent {
    pub recursion_limit: Option<usize>,
    pub reasoning_timeout_secs: Option<u64>,
    pub tool_timeout_secs: Option<u64>,
    pub parallel_tool_calls: Option<bool>,
    pub temperature: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct RawCheckpoint {
    pub backend: Option<String>,
    pub path: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct RawSearch {
    pub endpoint: Option<String>,
    pub index: Option<String>,
    pub default_results: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
pub(super) struct RawServer {
    pub bind: Option<String>,
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Loads `.env` and `config/.env` into the process environment once.
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        let _ = from_filename(".env");
        let _ = from_filename("config/.env");
    });
}

/// Load and validate configuration.
///
/// An explicit path must exist. Without one, `config/agent.toml` is used
/// when present and built-in defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    match path {
        Some(path) => read_config(path),
        None => {
            let default_path = Path::new(CONFIG_PATH);
            if default_path.exists() {
                read_config(default_path)
            } else {
                info!(
                    path = CONFIG_PATH,
                    "No configuration file found; using built-in defaults"
                );
                validate_and_build(RawConfig::default())
            }
        }
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading agent configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    parse_config(&content, path)
}

pub(super) fn parse_config(content: &str, origin: &Path) -> Result<AppConfig, ConfigError> {
    let parsed: RawConfig = toml::from_str(content).map_err(|source| ConfigError::Parse {
        path: origin.to_path_buf(),
        source,
    })?;
    validate_and_build(parsed)
}

fn validate_and_build(parsed: RawConfig) -> Result<AppConfig, ConfigError> {
    let model = parsed.model.unwrap_or_else(|| DEFAULT_MODEL.to_string());
    let default_provider = parsed
        .default_provider
        .unwrap_or_else(|| DEFAULT_PROVIDER_ID.to_string());

    let mut providers: Vec<ModelProviderConfig> = if parsed.providers.is_empty() {
        default_providers()
    } else {
        let mut providers = Vec::with_capacity(parsed.providers.len());
        for raw_provider in parsed.providers {
            if raw_provider.endpoint.is_none() {
                return Err(ConfigError::MissingEndpoint {
                    provider: raw_provider.id.clone(),
                });
            }
            providers.push(ModelProviderConfig::from(raw_provider));
        }
        providers
    };
    let Some(provider) = providers.iter_mut().find(|p| p.id == default_provider) else {
        return Err(ConfigError::ProviderNotFound {
            provider: default_provider,
        });
    };
    provider.ensure_model(&model);

    let agent = build_agent(parsed.agent)?;
    let checkpoint = build_checkpoint(parsed.checkpoint)?;
    let server = build_server(parsed.server)?;
    let search = SearchConfig {
        endpoint: parsed.search.endpoint.filter(|e| !e.trim().is_empty()),
        index: parsed
            .search
            .index
            .unwrap_or_else(|| DEFAULT_SEARCH_INDEX.to_string()),
        default_results: parsed
            .search
            .default_results
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_SEARCH_RESULTS),
    };

    Ok(AppConfig {
        default_provider,
        model,
        system_message: parsed
            .system_message
            .unwrap_or_else(|| DEFAULT_SYSTEM_MESSAGE.to_string()),
        prompt_template: parsed
            .prompt_template
            .unwrap_or_else(|| DEFAULT_PROMPT_TEMPLATE.to_string()),
        agent,
        checkpoint,
        search,
        server,
        providers,
    })
}

fn build_agent(raw: RawAgent) -> Result<AgentSettings, ConfigError> {
    let defaults = AgentSettings::default();
    let recursion_limit = raw.recursion_limit.unwrap_or(defaults.recursion_limit);
    if recursion_limit == 0 {
        return Err(ConfigError::InvalidRecursionLimit);
    }
    Ok(AgentSettings {
        recursion_limit,
        reasoning_timeout: raw
            .reasoning_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.reasoning_timeout),
        tool_timeout: raw
            .tool_timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(defaults.tool_timeout),
        parallel_tool_calls: raw
            .parallel_tool_calls
            .unwrap_or(defaults.parallel_tool_calls),
        temperature: raw.temperature.or(defaults.temperature),
    })
}

fn build_checkpoint(raw: RawCheckpoint) -> Result<CheckpointConfig, ConfigError> {
    let Some(backend) = raw.backend else {
        return match raw.path {
            Some(path) => Ok(CheckpointConfig::Sqlite {
                path: expand_path(&path)?,
            }),
            None => Ok(CheckpointConfig::default()),
        };
    };

    let require_path = |backend: &str| {
        raw.path
            .as_deref()
            .ok_or_else(|| ConfigError::MissingCheckpointPath {
                backend: backend.to_string(),
            })
            .and_then(expand_path)
    };

    match backend.to_ascii_lowercase().as_str() {
        "memory" => Ok(CheckpointConfig::Memory),
        "file" => Ok(CheckpointConfig::File {
            dir: require_path("file")?,
        }),
        "sqlite" => Ok(CheckpointConfig::Sqlite {
            path: require_path("sqlite")?,
        }),
        _ => Err(ConfigError::UnknownCheckpointBackend { backend }),
    }
}

fn build_server(raw: RawServer) -> Result<HttpServerConfig, ConfigError> {
    let mut server = HttpServerConfig {
        cors_origins: raw.cors_origins,
        ..HttpServerConfig::default()
    };
    if let Some(value) = raw.bind {
        server.bind = value
            .parse()
            .map_err(|source| ConfigError::InvalidBind { value, source })?;
    }

    if let Ok(port) = env::var("PORT") {
        match port.trim().parse::<u16>() {
            Ok(port) => server.bind.set_port(port),
            Err(err) => warn!(value = port.as_str(), %err, "Ignoring unparsable PORT"),
        }
    }
    Ok(server)
}

fn expand_path(value: &str) -> Result<PathBuf, ConfigError> {
    shellexpand::full(value)
        .map(|expanded| PathBuf::from(expanded.as_ref()))
        .map_err(|err| ConfigError::InvalidPath {
            value: value.to_string(),
            reason: err.to_string(),
        })
}
