mod annotate;
mod args;
mod detector;
mod display;
mod error;
mod labels;
mod logging;
mod predict;
mod toml_utils;

pub use annotate::{AnnotateConfigs, annotate_image, format_label};
pub use args::Args;
pub use detector::{
    Detection, Detector, EfficientDet, EfficientDetConfig, IMAGENET_MEAN, IMAGENET_STD,
    ScalingLevel,
};
pub use display::{CommandViewer, ImageViewer, ViewerConfig};
pub use error::{AppError, Result};
pub use labels::{LabelFormat, Taxonomy, VOC_LABELS, parse_label_format};
pub use logging::init_logger;
pub use toml_utils::{AppSettings, parse_toml};

// Core inference functions
pub use predict::{PredictArgs, PredictOutcome, run_prediction, run_prediction_with};
