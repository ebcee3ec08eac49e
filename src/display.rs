// -- imports
use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use tracing::info;

use crate::error::{AppError, Result};

/// Shows an annotated image to the user, blocking until dismissed.
pub trait ImageViewer {
    /// Display the image and wait for the viewer to close.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Display` when the viewer cannot be launched or
    /// exits with a failure status, and `AppError::ImageSave` when the
    /// image cannot be written for viewing.
    fn show(&self, img: &image::DynamicImage) -> Result<()>;
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// viewer command line, a platform default is used when unset
    pub command: Option<String>,
}

/// Viewer that writes the image to a temporary file and hands it to an
/// external command, waiting for the command to exit.
#[derive(Debug, Clone)]
pub struct CommandViewer {
    command: String,
}

impl CommandViewer {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
        }
    }

    pub fn from_config(config: &ViewerConfig) -> Self {
        match &config.command {
            Some(command) => Self::new(command.clone()),
            None => Self::new(Self::platform_default()),
        }
    }

    fn platform_default() -> &'static str {
        // `open -W` waits for the viewer to close, `xdg-open` blocks on
        // most image viewers directly
        if cfg!(target_os = "macos") {
            "open -W"
        } else {
            "xdg-open"
        }
    }

    fn temp_image_path() -> std::path::PathBuf {
        std::env::temp_dir().join(format!("efficientdet-predict-{}.png", std::process::id()))
    }

    fn run_viewer(&self, path: &Path) -> Result<()> {
        let mut parts = self.command.split_whitespace();
        let program = parts.next().ok_or_else(|| {
            AppError::Display("viewer command is empty".to_string())
        })?;

        info!("Opening viewer: {} {:?}", self.command, path);
        let status = Command::new(program)
            .args(parts)
            .arg(path)
            .status()
            .map_err(|e| AppError::Display(format!("failed to launch {:?}: {}", program, e)))?;

        if !status.success() {
            return Err(AppError::Display(format!(
                "viewer {:?} exited with {}",
                program, status
            )));
        }
        Ok(())
    }
}

impl ImageViewer for CommandViewer {
    fn show(&self, img: &image::DynamicImage) -> Result<()> {
        let path = Self::temp_image_path();
        img.save(&path)
            .map_err(|e| AppError::ImageSave(format!("{:?}: {}", path, e)))?;
        self.run_viewer(&path)
    }
}

// -- tests
