// -- imports
use serde::Deserialize;
use std::path::Path;

use crate::annotate::AnnotateConfigs;
use crate::display::ViewerConfig;
use crate::error::{AppError, Result};

// -- config

/// Optional settings file sections. Anything the CLI does not take as a
/// flag lives here, flags win over file values.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    pub annotate: AnnotateConfigs,
    pub viewer: ViewerConfig,
}

impl AppSettings {
    /// Parse a TOML settings file and return an AppSettings instance.
    ///
    /// Relative paths inside the file are resolved against the file's
    /// own directory.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if:
    /// - The path is not a valid .toml file
    /// - File read fails
    /// - TOML parsing fails
    pub fn from_toml(toml_path: &Path) -> Result<Self> {
        if !toml_path.is_file() || toml_path.extension().map_or(true, |ext| ext != "toml") {
            return Err(AppError::Config(format!(
                "Settings path is not a valid .toml file: {:?}",
                toml_path
            )));
        }

        let content = std::fs::read_to_string(toml_path)?;
        let mut settings: Self = toml::from_str(&content)?;

        let base = toml_path.parent().unwrap_or_else(|| Path::new("."));
        settings.resolve_paths(base);

        Ok(settings)
    }

    /// Resolve relative paths against the settings file directory
    fn resolve_paths(&mut self, base: &Path) {
        if let Some(ref mut font) = self.annotate.font
            && !font.is_absolute()
        {
            *font = base.join(font.as_path());
        }
    }
}

// -- public API

/// Parse a TOML settings file.
///
/// # Errors
///
/// Returns `AppError` if reading or parsing fails.
pub fn parse_toml(toml_path: &Path) -> Result<AppSettings> {
    AppSettings::from_toml(toml_path)
}

// -- tests

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    #[test]
    fn test_from_toml_with_custom_values() {
        let temp_dir = TempDir::new().unwrap();
        let toml_path = temp_dir.path().join("settings.toml");
        let toml_content = r#"
[annotate]
show_box = true
show_label = false
show_conf = false
thickness = 4
font_size = 24.0
font = "fonts/label.ttf"

[viewer]
command = "feh"
"#;
        fs::write(&toml_path, toml_content).unwrap();

        let settings = AppSettings::from_toml(&toml_path).unwrap();

        assert!(settings.annotate.show_box);
        assert!(!settings.annotate.show_label);
        assert!(!settings.annotate.show_conf);
        assert_eq!(settings.annotate.thickness, 4);
        assert_eq!(settings.annotate.font_size, 24.0);
        assert_eq!(
            settings.annotate.font,
            Some(temp_dir.path().join("fonts/label.ttf"))
        );
        assert_eq!(settings.viewer.command.as_deref(), Some("feh"));
    }

    #[test]
    fn test_from_toml_defaults_for_missing_sections() {
        let temp_dir = TempDir::new().unwrap();
        let toml_path = temp_dir.path().join("settings.toml");
        fs::write(&toml_path, "").unwrap();

        let settings = AppSettings::from_toml(&toml_path).unwrap();

        assert!(settings.annotate.show_box);
        assert!(settings.annotate.show_label);
        assert_eq!(settings.annotate.thickness, 2);
        assert!(settings.annotate.font.is_none());
        assert!(settings.viewer.command.is_none());
    }

    #[test]
    fn test_absolute_font_path_is_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let toml_path = temp_dir.path().join("settings.toml");
        fs::write(&toml_path, "[annotate]\nfont = \"/usr/share/fonts/x.ttf\"\n").unwrap();

        let settings = AppSettings::from_toml(&toml_path).unwrap();

        assert_eq!(
            settings.annotate.font,
            Some(PathBuf::from("/usr/share/fonts/x.ttf"))
        );
    }

    #[test]
    fn test_from_toml_invalid_path() {
        let invalid_path = PathBuf::from("/nonexistent/settings.toml");
        let err = AppSettings::from_toml(&invalid_path).unwrap_err();
        assert!(matches!(err, AppError::Config(_)));
    }

    #[test]
    fn test_from_toml_invalid_extension() {
        let temp_dir = TempDir::new().unwrap();
        let invalid_path = temp_dir.path().join("settings.txt");
        fs::write(&invalid_path, "[annotate]\nshow_box = true\n").unwrap();
        assert!(AppSettings::from_toml(&invalid_path).is_err());
    }

    #[test]
    fn test_from_toml_no_extension() {
        let temp_dir = TempDir::new().unwrap();
        let invalid_path = temp_dir.path().join("settings");
        fs::write(&invalid_path, "[annotate]\nshow_box = true\n").unwrap();
        assert!(AppSettings::from_toml(&invalid_path).is_err());
    }

    #[test]
    fn test_parse_toml_invalid_toml() {
        let temp_dir = TempDir::new().unwrap();
        let invalid_toml_path = temp_dir.path().join("invalid.toml");
        fs::write(&invalid_toml_path, "invalid toml [[[").unwrap();
        assert!(parse_toml(&invalid_toml_path).is_err());
    }
}
