/// An example of directly running prediction without parsing CLI flags.
use std::path::PathBuf;

use anyhow::{Context, Result};
use efficientdet_inference::{
    AnnotateConfigs, LabelFormat, PredictArgs, init_logger, run_prediction,
};

#[allow(dead_code)]
enum Checkpoint {
    VocD0,
    LabelmeD2,
}

fn main() -> Result<()> {
    init_logger(true);

    let project_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let checkpoint_dir = project_root.join("assets/checkpoints");

    let checkpoint_type = Checkpoint::VocD0;
    let (checkpoint, efficientdet, format, classes_names) = match checkpoint_type {
        Checkpoint::VocD0 => (
            checkpoint_dir.join("efficientdet-d0-voc.onnx"),
            0,
            LabelFormat::Voc,
            String::new(),
        ),
        Checkpoint::LabelmeD2 => (
            checkpoint_dir.join("efficientdet-d2-shapes.onnx"),
            2,
            LabelFormat::Labelme,
            "circle,square,triangle".to_string(),
        ),
    };

    let annotate_cfg = AnnotateConfigs {
        show_box: true,
        show_label: true,
        show_conf: true,
        ..Default::default()
    };

    let args = PredictArgs {
        image: project_root.join("assets/images/street.jpg"),
        checkpoint,
        efficientdet,
        format,
        classes_names,
        min_score: 0.3,
        annotate_cfg,
        verbose: true,
        ..Default::default()
    };

    let outcome = run_prediction(&args).with_context(|| "Failed to run prediction".to_string())?;
    tracing::info!("Total detections returned: {}", outcome.detections.len());

    Ok(())
}
