use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

pub mod loader;

pub use loader::ConfigLoader;

pub const CONFIG_ENV_VAR: &str = "LLMPIPE_CONFIG";
pub const PROGRAM_ENV_VAR: &str = "LLMPIPE_PROGRAM";
pub const MODEL_ENV_VAR: &str = "LLMPIPE_MODEL";

pub const MODEL_PLACEHOLDER: &str = "{model}";
pub const PROMPT_PLACEHOLDER: &str = "{prompt}";

/// Default location of the user configuration file
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "llmpipe").map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Source of environment variables, so overrides can be tested without
/// touching the process environment.
pub trait EnvSource {
    fn var(&self, key: &str) -> Option<String>;
}

/// The real process environment
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, key: &str) -> Option<String> {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    }
}

impl EnvSource for HashMap<String, String> {
    fn var(&self, key: &str) -> Option<String> {
        self.get(key).cloned()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub model: ModelConfig,
    pub stream: StreamConfig,
}

/// How the text-generation program is invoked
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct ModelConfig {
    /// Executable name or path
    pub program: String,
    /// Argument template; `{model}` and `{prompt}` are substituted
    pub args: Vec<String>,
    /// Model identifier passed through `{model}`
    pub model: String,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            program: "ollama".to_string(),
            args: vec![
                "run".to_string(),
                MODEL_PLACEHOLDER.to_string(),
                PROMPT_PLACEHOLDER.to_string(),
            ],
            model: "deepseek-r1:latest".to_string(),
        }
    }
}

impl ModelConfig {
    /// Whether the prompt travels as an argument rather than on stdin
    pub fn prompt_in_args(&self) -> bool {
        self.args.iter().any(|arg| arg.contains(PROMPT_PLACEHOLDER))
    }
}

/// How streamed output is presented
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct StreamConfig {
    /// Echo the program's stderr as it arrives
    pub show_diagnostics: bool,
    /// Text printed before every answer line
    pub prefix: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn merge_env_vars(&mut self, env: &impl EnvSource) {
        if let Some(program) = env.var(PROGRAM_ENV_VAR) {
            self.model.program = program;
        }

        if let Some(model) = env.var(MODEL_ENV_VAR) {
            self.model.model = model;
        }
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
