use crate::error::{ReportError, Result};
use photo_report_common::layout::{is_valid_image_width, DEFAULT_IMAGE_WIDTH_IN, MAX_IMAGE_WIDTH_IN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 命名パターン（例: "%f %p"）
    pub default_pattern: Option<String>,
    /// テンプレートdocx
    pub default_template: Option<PathBuf>,
    /// 画像幅（インチ）
    pub image_width_inches: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_pattern: None,
            default_template: None,
            image_width_inches: DEFAULT_IMAGE_WIDTH_IN,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| ReportError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("photo-report").join("config.json"))
    }

    pub fn set_image_width(&mut self, inches: f64) -> Result<()> {
        if !is_valid_image_width(inches) {
            return Err(ReportError::Config(format!(
                "画像幅は0より大きく{}インチ以下で指定してください: {}",
                MAX_IMAGE_WIDTH_IN, inches
            )));
        }
        self.image_width_inches = inches;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_missing_returns_default() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("none.json")).unwrap();
        assert!(config.default_pattern.is_none());
        assert_eq!(config.image_width_inches, DEFAULT_IMAGE_WIDTH_IN);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::default();
        config.default_pattern = Some("%f %p".into());
        config.default_template = Some(PathBuf::from("/tmp/template.docx"));
        config.set_image_width(3.5).unwrap();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.default_pattern.as_deref(), Some("%f %p"));
        assert_eq!(loaded.default_template, Some(PathBuf::from("/tmp/template.docx")));
        assert_eq!(loaded.image_width_inches, 3.5);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"default_pattern": "%P"}"#).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.default_pattern.as_deref(), Some("%P"));
        assert_eq!(loaded.image_width_inches, DEFAULT_IMAGE_WIDTH_IN);
    }

    #[test]
    fn test_invalid_width_rejected() {
        let mut config = Config::default();
        assert!(matches!(config.set_image_width(0.0), Err(ReportError::Config(_))));
        assert!(config.set_image_width(12.0).is_err());
        assert_eq!(config.image_width_inches, DEFAULT_IMAGE_WIDTH_IN);
    }

    #[test]
    fn test_broken_json_is_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ broken").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ReportError::JsonParse(_))));
    }
}
