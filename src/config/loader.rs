use super::{default_config_path, Config, EnvSource, ProcessEnv, CONFIG_ENV_VAR};
use crate::error::{ErrorCode, LlmpipeError, Result};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Resolves the configuration file and layers environment overrides on top.
///
/// Lookup order: explicit path, `$LLMPIPE_CONFIG`, the per-user config
/// file. An explicitly named file must exist; the per-user file is optional.
pub struct ConfigLoader<E = ProcessEnv> {
    env: E,
    default_path: Option<PathBuf>,
}

impl ConfigLoader<ProcessEnv> {
    pub fn new() -> Self {
        Self {
            env: ProcessEnv,
            default_path: default_config_path(),
        }
    }
}

impl Default for ConfigLoader<ProcessEnv> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: EnvSource> ConfigLoader<E> {
    pub fn with_env(env: E, default_path: Option<PathBuf>) -> Self {
        Self { env, default_path }
    }

    pub async fn load(&self, explicit: Option<&Path>) -> Result<Config> {
        let mut config = match self.resolve_path(explicit) {
            Some((path, required)) => Self::load_file(&path, required).await?,
            None => Config::new(),
        };

        config.merge_env_vars(&self.env);
        Ok(config)
    }

    fn resolve_path(&self, explicit: Option<&Path>) -> Option<(PathBuf, bool)> {
        if let Some(path) = explicit {
            return Some((path.to_path_buf(), true));
        }

        if let Some(path) = self.env.var(CONFIG_ENV_VAR) {
            return Some((PathBuf::from(path), true));
        }

        self.default_path.clone().map(|path| (path, false))
    }

    async fn load_file(path: &Path, required: bool) -> Result<Config> {
        let content = match fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !required => {
                tracing::trace!("No config file at {}, using defaults", path.display());
                return Ok(Config::new());
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(LlmpipeError::config_with_code(
                    ErrorCode::CONFIG_NOT_FOUND,
                    "configuration file does not exist",
                    Some(path.to_path_buf()),
                ));
            }
            Err(e) => {
                return Err(LlmpipeError::config_with_code(
                    ErrorCode::CONFIG_PATH_ERROR,
                    format!("failed to read configuration: {}", e),
                    Some(path.to_path_buf()),
                )
                .with_source(e));
            }
        };

        tracing::debug!("Loading configuration from {}", path.display());
        toml::from_str(&content).map_err(|e| {
            LlmpipeError::config_with_code(
                ErrorCode::CONFIG_INVALID_TOML,
                e.message().to_string(),
                Some(path.to_path_buf()),
            )
            .with_source(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[tokio::test]
    async fn test_missing_default_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_env(env(&[]), Some(dir.path().join("config.toml")));

        let config = loader.load(None).await.unwrap();
        assert_eq!(config, Config::new());
    }

    #[tokio::test]
    async fn test_missing_explicit_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_env(env(&[]), None);

        let err = loader
            .load(Some(dir.path().join("absent.toml").as_path()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_NOT_FOUND);
        assert_eq!(err.exit_code(), 2);
    }

    #[tokio::test]
    async fn test_explicit_file_then_env_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("llmpipe.toml");
        std::fs::write(
            &path,
            "[model]\nprogram = \"llamafile\"\nmodel = \"phi3\"\n",
        )
        .unwrap();

        let loader = ConfigLoader::with_env(env(&[("LLMPIPE_MODEL", "mistral")]), None);
        let config = loader.load(Some(path.as_path())).await.unwrap();

        assert_eq!(config.model.program, "llamafile");
        assert_eq!(config.model.model, "mistral");
    }

    #[tokio::test]
    async fn test_env_var_selects_config_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("from-env.toml");
        std::fs::write(&path, "[stream]\nshow_diagnostics = true\n").unwrap();

        let loader = ConfigLoader::with_env(
            env(&[("LLMPIPE_CONFIG", path.to_str().unwrap())]),
            Some(dir.path().join("ignored.toml")),
        );
        let config = loader.load(None).await.unwrap();
        assert!(config.stream.show_diagnostics);
    }

    #[tokio::test]
    async fn test_invalid_toml_reports_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[model\nprogram = ").unwrap();

        let loader = ConfigLoader::with_env(env(&[]), None);
        let err = loader.load(Some(path.as_path())).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CONFIG_INVALID_TOML);
        assert!(err.user_message().contains("broken.toml"));
    }
}
