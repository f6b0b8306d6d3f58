//! Config file loading.

use std::path::Path;

use super::{
    ConfigError,
    TsSettings,
};

/// Name of the workspace configuration file.
pub const CONFIG_FILE_NAME: &str = ".qt-ts-ls.json";

/// Loads settings from `.qt-ts-ls.json` in the workspace root.
///
/// # Returns
/// - `Ok(Some(settings))`: the file exists and parsed
/// - `Ok(None)`: no config file
///
/// # Errors
/// - File read error
/// - JSON parse error
pub(super) fn load_from_workspace(workspace_root: &Path) -> Result<Option<TsSettings>, ConfigError> {
    let config_path = workspace_root.join(CONFIG_FILE_NAME);

    if !config_path.exists() {
        tracing::debug!(path = %config_path.display(), "Configuration file not found");
        return Ok(None);
    }

    load_from_file(&config_path).map(Some)
}

/// Loads settings from an explicit path.
///
/// # Errors
/// - File read error
/// - JSON parse error
pub(super) fn load_from_file(config_path: &Path) -> Result<TsSettings, ConfigError> {
    tracing::debug!(path = %config_path.display(), "Loading configuration");

    let content = std::fs::read_to_string(config_path)?;
    let settings: TsSettings = serde_json::from_str(&content)?;

    Ok(settings)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    fn test_load_from_workspace_with_valid_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"sourceLanguage": "de"}"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let result = load_from_workspace(temp_dir.path());

        assert!(result.is_ok());
        let settings = result.unwrap();
        assert!(settings.is_some());
        assert_eq!(settings.unwrap().source_language, "de");
    }

    #[rstest]
    fn test_load_from_workspace_no_config_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_from_workspace(temp_dir.path());

        assert!(result.is_ok());
        assert!(result.unwrap().is_none());
    }

    #[rstest]
    fn test_load_from_workspace_invalid_json() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), "invalid json").unwrap();

        let result = load_from_workspace(temp_dir.path());

        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[rstest]
    fn test_load_from_missing_file() {
        let temp_dir = TempDir::new().unwrap();

        let result = load_from_file(&temp_dir.path().join("missing.json"));

        assert!(matches!(result, Err(ConfigError::IoError(_))));
    }
}
