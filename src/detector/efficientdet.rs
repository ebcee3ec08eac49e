use image::DynamicImage;
use ndarray::{ArrayView2, ArrayView3, Ix2, Ix3};
use ort::{GraphOptimizationLevel, Session, ValueType};
use std::path::Path;

use super::config::EfficientDetConfig;
use super::preprocess::letterbox;
use super::{Detection, Detector};
use crate::error::{AppError, Result};

/// A trained EfficientDet checkpoint behind an onnxruntime session.
///
/// The graph carries one float32 NCHW image input and three aligned outputs:
/// boxes `[batch, n, 4]` as xyxy in input space, labels `[batch, n]` as
/// int64, scores `[batch, n]` as float32 in [0, 1]. Fixed-size exports mark
/// padding entries with a negative label or a non-positive score.
#[derive(Debug)]
pub struct EfficientDet {
    session: Session,
    config: EfficientDetConfig,
    input_name: String,
}

impl EfficientDet {
    /// Build a session from a checkpoint and validate it against the
    /// configuration.
    ///
    /// # Errors
    ///
    /// - `AppError::CheckpointLoad` when the file is missing or unreadable
    /// - `AppError::Incompatible` when the graph structure or its embedded
    ///   metadata does not match the configuration
    pub fn load(config: EfficientDetConfig, checkpoint: &Path) -> Result<Self> {
        if !checkpoint.is_file() {
            return Err(AppError::CheckpointLoad(format!(
                "Checkpoint file not found: {:?}",
                checkpoint
            )));
        }

        let builder = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?;

        #[cfg(feature = "cuda")]
        let builder =
            builder.with_execution_providers([ort::CUDAExecutionProvider::default().build()])?;

        #[cfg(feature = "tensorrt")]
        let builder = builder
            .with_execution_providers([ort::TensorRTExecutionProvider::default().build()])?;

        #[cfg(feature = "coreml")]
        let builder =
            builder.with_execution_providers([ort::CoreMLExecutionProvider::default().build()])?;

        let session = builder
            .commit_from_file(checkpoint)
            .map_err(|e| AppError::CheckpointLoad(format!("{:?}: {e}", checkpoint)))?;

        let input_name = validate_graph(&session, &config)?;
        check_metadata(&session, &config)?;

        tracing::info!("Loaded checkpoint {:?}", checkpoint);
        tracing::info!("Model: {config}");

        Ok(Self {
            session,
            config,
            input_name,
        })
    }

    pub fn config(&self) -> &EfficientDetConfig {
        &self.config
    }
}

impl Detector for EfficientDet {
    fn input_size(&self) -> u32 {
        self.config.input_size()
    }

    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>> {
        let (input, ratio) = letterbox(image, self.input_size());

        let input_name = self.input_name.as_str();
        let outputs = self.session.run(ort::inputs![input_name => input]?)?;

        let boxes = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| AppError::Inference(format!("boxes output: {e}")))?;
        let boxes = boxes
            .into_dimensionality::<Ix3>()
            .map_err(|e| AppError::Inference(format!("boxes output: {e}")))?;

        let labels = outputs[1]
            .try_extract_tensor::<i64>()
            .map_err(|e| AppError::Inference(format!("labels output: {e}")))?;
        let labels = labels
            .into_dimensionality::<Ix2>()
            .map_err(|e| AppError::Inference(format!("labels output: {e}")))?;

        let scores = outputs[2]
            .try_extract_tensor::<f32>()
            .map_err(|e| AppError::Inference(format!("scores output: {e}")))?;
        let scores = scores
            .into_dimensionality::<Ix2>()
            .map_err(|e| AppError::Inference(format!("scores output: {e}")))?;

        decode_detections(boxes, labels, scores, ratio, image.width(), image.height())
    }
}

/// The graph must expose a 4-D float image input matching the scaling
/// level's resolution (dynamic dimensions pass) and the three detection
/// outputs. Returns the input tensor name.
fn validate_graph(session: &Session, config: &EfficientDetConfig) -> Result<String> {
    let input = session
        .inputs
        .first()
        .ok_or_else(|| AppError::Incompatible("graph declares no inputs".to_string()))?;

    if let ValueType::Tensor { dimensions, .. } = &input.input_type {
        if dimensions.len() != 4 {
            return Err(AppError::Incompatible(format!(
                "expected a 4-D image input, got dimensions {:?}",
                dimensions
            )));
        }

        let size = i64::from(config.input_size());
        let (channels, height, width) = (dimensions[1], dimensions[2], dimensions[3]);
        if channels > 0 && channels != 3 {
            return Err(AppError::Incompatible(format!(
                "expected 3 input channels, got {channels}"
            )));
        }
        for dim in [height, width] {
            if dim > 0 && dim != size {
                return Err(AppError::Incompatible(format!(
                    "input resolution {height}x{width} does not match {size}x{size} for {}",
                    config.level
                )));
            }
        }
    }

    if session.outputs.len() < 3 {
        return Err(AppError::Incompatible(format!(
            "expected boxes, labels and scores outputs, graph has {}",
            session.outputs.len()
        )));
    }

    Ok(input.name.clone())
}

/// Cross-check exporter metadata against the configuration. Absent keys
/// pass, present keys must agree.
fn check_metadata(session: &Session, config: &EfficientDetConfig) -> Result<()> {
    let Ok(metadata) = session.metadata() else {
        return Ok(());
    };

    if let Ok(Some(value)) = metadata.custom("num_classes")
        && let Ok(num_classes) = value.trim().parse::<usize>()
        && num_classes != config.num_classes
    {
        return Err(AppError::Incompatible(format!(
            "checkpoint was trained with {num_classes} classes, taxonomy has {}",
            config.num_classes
        )));
    }

    if let Ok(Some(value)) = metadata.custom("bidirectional")
        && let Ok(bidirectional) = value.trim().parse::<bool>()
        && bidirectional != config.bidirectional
    {
        return Err(AppError::Incompatible(format!(
            "checkpoint fusion topology is bidirectional={bidirectional}, configured bidirectional={}",
            config.bidirectional
        )));
    }

    Ok(())
}

/// Zip the batch-0 slice of the raw outputs into detections.
///
/// Box coordinates come back in network input space; they are scaled by the
/// inverse letterbox ratio and clamped to the original image bounds.
fn decode_detections(
    boxes: ArrayView3<f32>,
    labels: ArrayView2<i64>,
    scores: ArrayView2<f32>,
    ratio: f32,
    width: u32,
    height: u32,
) -> Result<Vec<Detection>> {
    let (batches, count, coords) = boxes.dim();
    if batches == 0 || coords != 4 {
        return Err(AppError::Inference(format!(
            "unexpected boxes shape [{batches}, {count}, {coords}]"
        )));
    }
    if labels.dim() != (batches, count) || scores.dim() != (batches, count) {
        return Err(AppError::Inference(format!(
            "misaligned outputs: {count} boxes, {} labels, {} scores",
            labels.dim().1,
            scores.dim().1
        )));
    }

    let mut detections = Vec::new();

    // Single-image inference: only batch position 0 is ever read.
    for i in 0..count {
        let label = labels[[0, i]];
        let score = scores[[0, i]];
        if label < 0 || score <= 0.0 {
            continue;
        }

        let x1 = (boxes[[0, i, 0]] / ratio).clamp(0.0, width as f32);
        let y1 = (boxes[[0, i, 1]] / ratio).clamp(0.0, height as f32);
        let x2 = (boxes[[0, i, 2]] / ratio).clamp(0.0, width as f32);
        let y2 = (boxes[[0, i, 3]] / ratio).clamp(0.0, height as f32);

        detections.push(Detection {
            bbox: [x1, y1, x2, y2],
            class_id: label as usize,
            score,
        });
    }

    Ok(detections)
}
