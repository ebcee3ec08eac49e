use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum AppError {
    #[error("TOML settings file error: {0}")]
    TomlConfig(#[from] toml::de::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("onnxruntime error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Checkpoint loading failed: {0}")]
    CheckpointLoad(String),

    #[error("Checkpoint incompatible with configuration: {0}")]
    Incompatible(String),

    #[error("Image loading failed: {0}")]
    ImageLoad(String),

    #[error("Image saving failed: {0}")]
    ImageSave(String),

    #[error("Font loading failed: {0}")]
    FontLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Display failed: {0}")]
    Display(String),
}

/// Result type with default AppError
pub type Result<T, E = AppError> = std::result::Result<T, E>;
