//! Holds the active settings.

use std::path::{
    Path,
    PathBuf,
};

use super::{
    ConfigError,
    TsSettings,
    loader,
};

#[derive(Default, Debug, Clone)]
pub struct ConfigManager {
    current_settings: TsSettings,
    workspace_root: Option<PathBuf>,
}

impl ConfigManager {
    #[must_use]
    pub fn new() -> Self {
        Self { current_settings: TsSettings::default(), workspace_root: None }
    }

    /// Loads `.qt-ts-ls.json` from the workspace root, falling back to
    /// defaults when there is none.
    ///
    /// # Errors
    /// - File read error
    /// - JSON parse error
    /// - Validation error
    pub fn load_settings(&mut self, workspace_root: Option<PathBuf>) -> Result<(), ConfigError> {
        tracing::debug!(workspace_root = ?workspace_root, "Loading settings");

        let settings = if let Some(root) = &workspace_root {
            loader::load_from_workspace(root)?.unwrap_or_default()
        } else {
            TsSettings::default()
        };

        settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = settings;
        self.workspace_root = workspace_root;
        tracing::debug!(settings = ?self.current_settings, "Settings loaded");

        Ok(())
    }

    /// Loads settings from an explicit file, as `--config` does.
    ///
    /// # Errors
    /// - File read error
    /// - JSON parse error
    /// - Validation error
    pub fn load_file(&mut self, path: &Path) -> Result<(), ConfigError> {
        let settings = loader::load_from_file(path)?;
        self.update_settings(settings)
    }

    /// Replaces the settings, e.g. from `workspace/didChangeConfiguration`.
    ///
    /// # Errors
    /// Returns the validation errors; the previous settings stay active.
    pub fn update_settings(&mut self, new_settings: TsSettings) -> Result<(), ConfigError> {
        new_settings.validate().map_err(ConfigError::ValidationErrors)?;

        self.current_settings = new_settings;
        tracing::debug!("Settings updated");

        Ok(())
    }

    #[must_use]
    pub const fn get_settings(&self) -> &TsSettings {
        &self.current_settings
    }

    #[must_use]
    pub const fn workspace_root(&self) -> Option<&PathBuf> {
        self.workspace_root.as_ref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::fs;

    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;
    use crate::config::CONFIG_FILE_NAME;

    #[rstest]
    fn test_new_creates_default_settings() {
        let manager = ConfigManager::new();

        assert_eq!(manager.get_settings().source_language, "en");
        assert!(manager.workspace_root().is_none());
    }

    #[rstest]
    fn test_load_settings_without_workspace() {
        let mut manager = ConfigManager::new();

        let result = manager.load_settings(None);

        assert!(result.is_ok());
        assert_eq!(manager.get_settings(), &TsSettings::default());
        assert!(manager.workspace_root().is_none());
    }

    #[rstest]
    fn test_load_settings_with_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"pluralForms": {"kk": 1}}"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(result.is_ok());
        assert_eq!(manager.get_settings().plural_forms.get("kk"), Some(&1));
        assert!(manager.workspace_root().is_some());
    }

    #[rstest]
    fn test_load_settings_rejects_invalid_config_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_content = r#"{"pluralForms": {"kk": 0}}"#;
        fs::write(temp_dir.path().join(CONFIG_FILE_NAME), config_content).unwrap();

        let mut manager = ConfigManager::new();
        let result = manager.load_settings(Some(temp_dir.path().to_path_buf()));

        assert!(matches!(result, Err(ConfigError::ValidationErrors(_))));
        assert!(manager.get_settings().plural_forms.is_empty());
    }

    #[rstest]
    fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("custom.json");
        fs::write(&path, r#"{"sourceLanguage": "fr"}"#).unwrap();

        let mut manager = ConfigManager::new();
        manager.load_file(&path).unwrap();

        assert_eq!(manager.get_settings().source_language, "fr");
    }

    #[rstest]
    fn test_update_settings_valid() {
        let mut manager = ConfigManager::new();
        let new_settings = TsSettings { source_language: "de".to_string(), ..TsSettings::default() };

        let result = manager.update_settings(new_settings);

        assert!(result.is_ok());
        assert_eq!(manager.get_settings().source_language, "de");
    }

    #[rstest]
    fn test_update_settings_invalid_keeps_previous() {
        let mut manager = ConfigManager::new();
        let new_settings = TsSettings { source_language: String::new(), ..TsSettings::default() };

        let result = manager.update_settings(new_settings);

        assert!(result.is_err());
        assert_eq!(manager.get_settings().source_language, "en");
    }
}
