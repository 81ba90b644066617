//! `llmpipe config`: show the configuration that would be used

use crate::config::{default_config_path, ConfigLoader};
use crate::error::{ErrorCode, LlmpipeError};
use anyhow::Result;
use std::path::PathBuf;

pub async fn run_config(config_path: Option<PathBuf>, show_path: bool) -> Result<()> {
    if show_path {
        match default_config_path() {
            Some(path) => println!("{}", path.display()),
            None => {
                return Err(LlmpipeError::config_with_code(
                    ErrorCode::CONFIG_PATH_ERROR,
                    "no home directory to place a configuration file in",
                    None,
                )
                .into())
            }
        }
        return Ok(());
    }

    let config = ConfigLoader::new().load(config_path.as_deref()).await?;
    let rendered = config.to_toml().map_err(|e| {
        LlmpipeError::config_with_code(ErrorCode::CONFIG_INVALID_VALUE, e.to_string(), None)
    })?;
    print!("{}", rendered);
    Ok(())
}
