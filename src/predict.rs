// -- imports
use image::DynamicImage;
use std::path::PathBuf;
use std::time::Instant;

use crate::annotate::{AnnotateConfigs, annotate_image};
use crate::detector::{Detection, Detector, EfficientDet, EfficientDetConfig, ScalingLevel};
use crate::display::{CommandViewer, ImageViewer, ViewerConfig};
use crate::error::{AppError, Result};
use crate::labels::{LabelFormat, Taxonomy};

#[derive(Debug, Clone)]
pub struct PredictArgs {
    /// Path to the input image
    pub image: PathBuf,

    /// Path to the ONNX checkpoint
    pub checkpoint: PathBuf,

    /// EfficientDet scaling level, 0 through 7
    pub efficientdet: u8,

    /// Fuse pyramid features bidirectionally (BiFPN)
    pub bidirectional: bool,

    /// Label taxonomy format
    pub format: LabelFormat,

    /// Comma-separated class names, required for the labelme format
    pub classes_names: String,

    /// Drop detections scoring below this
    pub min_score: f32,

    /// Save the annotated image here instead of displaying it
    pub output: Option<PathBuf>,

    /// Annotate configurations
    pub annotate_cfg: AnnotateConfigs,

    /// Viewer configuration
    pub viewer: ViewerConfig,

    /// Show verbose output
    pub verbose: bool,
}

impl Default for PredictArgs {
    fn default() -> Self {
        Self {
            image: PathBuf::new(),
            checkpoint: PathBuf::new(),
            efficientdet: 0,
            bidirectional: true,
            format: LabelFormat::Voc,
            classes_names: String::new(),
            min_score: 0.0,
            output: None,
            annotate_cfg: Default::default(),
            viewer: Default::default(),
            verbose: false,
        }
    }
}

/// Results of one prediction run.
#[derive(Debug)]
pub struct PredictOutcome {
    /// Detections that survived score filtering
    pub detections: Vec<Detection>,

    /// Input image with boxes and labels drawn
    pub annotated: DynamicImage,
}

/// Core prediction API
///
/// Resolves the taxonomy and model configuration, loads the checkpoint and
/// runs a single prediction over `args.image`. Configuration errors are
/// reported before the checkpoint is touched, and the scaling level is
/// checked before any image I/O.
///
/// # Errors
///
/// Returns `AppError::Config` for an unusable taxonomy or scaling level,
/// `AppError::ImageLoad` when the image cannot be read,
/// `AppError::CheckpointLoad` / `AppError::Incompatible` for checkpoint
/// problems, and `AppError::Inference` when the forward pass fails.
pub fn run_prediction(args: &PredictArgs) -> Result<PredictOutcome> {
    let start_time = Instant::now();

    let taxonomy = Taxonomy::resolve(args.format, &args.classes_names)?;
    tracing::info!(
        "Resolved {} taxonomy with {} classes",
        args.format,
        taxonomy.len()
    );

    let level = ScalingLevel::try_from(args.efficientdet)?;
    let config = EfficientDetConfig::new(taxonomy.len(), level, args.bidirectional);

    if !args.image.is_file() {
        return Err(AppError::ImageLoad(format!(
            "Image file not found: {:?}",
            args.image
        )));
    }

    let detector = EfficientDet::load(config, &args.checkpoint)?;
    let viewer = CommandViewer::from_config(&args.viewer);

    let outcome = run_prediction_with(&detector, &viewer, &taxonomy, args)?;

    let duration = start_time.elapsed();
    tracing::info!("Total prediction time: {:.3?}", duration);

    Ok(outcome)
}

/// Prediction over already constructed capabilities.
///
/// Reuses an existing detector and viewer, so callers can run several
/// images against one loaded model or swap the viewer out entirely.
///
/// # Errors
///
/// Same as [`run_prediction`], minus the configuration stage.
pub fn run_prediction_with(
    detector: &dyn Detector,
    viewer: &dyn ImageViewer,
    taxonomy: &Taxonomy,
    args: &PredictArgs,
) -> Result<PredictOutcome> {
    let img = image::open(&args.image)
        .map_err(|e| AppError::ImageLoad(format!("{:?}: {}", args.image, e)))?;
    tracing::info!(
        "Loaded image {:?} ({}x{})",
        args.image,
        img.width(),
        img.height()
    );

    let infer_start = Instant::now();
    let mut detections = detector.detect(&img)?;
    tracing::info!(
        "Inference took {:.3?}, {} raw detections",
        infer_start.elapsed(),
        detections.len()
    );
    tracing::debug!("Raw detections: {:?}", detections);

    if args.min_score > 0.0 {
        detections.retain(|det| det.score >= args.min_score);
        tracing::info!(
            "{} detections above score threshold {:.2}",
            detections.len(),
            args.min_score
        );
    }

    for det in &detections {
        let name = taxonomy.name_of(det.class_id).unwrap_or("object");
        tracing::info!(
            "  {} {:.2} at [{:.1}, {:.1}, {:.1}, {:.1}]",
            name,
            det.score,
            det.bbox[0],
            det.bbox[1],
            det.bbox[2],
            det.bbox[3]
        );
    }

    let annotated = annotate_image(&img, &detections, taxonomy, &args.annotate_cfg)?;

    match &args.output {
        Some(path) => {
            annotated
                .save(path)
                .map_err(|e| AppError::ImageSave(format!("{:?}: {}", path, e)))?;
            tracing::info!("Saved annotated image to {:?}", path);
        }
        None => viewer.show(&annotated)?,
    }

    Ok(PredictOutcome {
        detections,
        annotated,
    })
}

// -- tests
