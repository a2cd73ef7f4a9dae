use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use prodcat_core::config::{
    resolve_config_path, AppConfig, LoadOptions, ENV_LOGGING_FORMAT, ENV_LOGGING_LEVEL,
    ENV_LOG_FORMAT_ALIAS, ENV_LOG_LEVEL_ALIAS, ENV_REMOTE_BASE_URL, ENV_REMOTE_TIMEOUT_SECS,
};
use serde::Serialize;
use toml::Value;

use super::{CommandResult, EXIT_CONFIG};

const COMMAND: &str = "config";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    pub key: String,
    pub value: String,
    pub source: String,
}

pub fn run(options: LoadOptions) -> CommandResult {
    let overrides = options.overrides.clone();
    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            )
        }
    };

    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, overridden: bool, env_keys: &[&str]| {
        if overridden {
            return "override".to_string();
        }
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let entries = vec![
        entry(
            "remote.base_url",
            config.remote.base_url.clone(),
            source("remote.base_url", overrides.remote_base_url.is_some(), &[ENV_REMOTE_BASE_URL]),
        ),
        entry(
            "remote.timeout_secs",
            config.remote.timeout_secs.to_string(),
            source(
                "remote.timeout_secs",
                overrides.remote_timeout_secs.is_some(),
                &[ENV_REMOTE_TIMEOUT_SECS],
            ),
        ),
        entry(
            "logging.level",
            config.logging.level.clone(),
            source(
                "logging.level",
                overrides.log_level.is_some(),
                &[ENV_LOGGING_LEVEL, ENV_LOG_LEVEL_ALIAS],
            ),
        ),
        entry(
            "logging.format",
            format!("{:?}", config.logging.format).to_ascii_lowercase(),
            source(
                "logging.format",
                overrides.log_format.is_some(),
                &[ENV_LOGGING_FORMAT, ENV_LOG_FORMAT_ALIAS],
            ),
        ),
    ];

    CommandResult::success_with_settings(
        COMMAND,
        "effective config (source precedence: override > env > file > default)",
        entries,
    )
}

fn entry(key: &str, value: String, source: String) -> ConfigEntry {
    ConfigEntry { key: key.to_string(), value, source }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| env::var_os(key).is_some()) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("config file"));
            return format!("file ({})", file_path.display());
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::contains_path;

    #[test]
    fn contains_path_walks_nested_tables() {
        let doc: toml::Value = "[remote]\nbase_url = \"http://x\"\n".parse().expect("toml");

        assert!(contains_path(&doc, "remote.base_url"));
        assert!(!contains_path(&doc, "remote.timeout_secs"));
        assert!(!contains_path(&doc, "logging.level"));
    }
}
