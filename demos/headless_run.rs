/// An example of running prediction headlessly. A custom viewer saves every
/// annotated image into a directory instead of opening a window, and one
/// loaded model is reused across several images.
use std::cell::Cell;
use std::path::PathBuf;

use anyhow::{Context, Result};
use efficientdet_inference::{
    AppError, EfficientDet, EfficientDetConfig, ImageViewer, LabelFormat, PredictArgs,
    ScalingLevel, Taxonomy, init_logger, run_prediction_with,
};

/// Viewer replacement that writes every shown image into a directory.
struct DirectoryViewer {
    dir: PathBuf,
    counter: Cell<usize>,
}

impl ImageViewer for DirectoryViewer {
    fn show(&self, img: &image::DynamicImage) -> efficientdet_inference::Result<()> {
        let n = self.counter.get();
        self.counter.set(n + 1);
        let path = self.dir.join(format!("annotated-{n:03}.png"));
        img.save(&path)
            .map_err(|e| AppError::ImageSave(format!("{path:?}: {e}")))?;
        tracing::info!("Wrote {:?}", path);
        Ok(())
    }
}

fn main() -> Result<()> {
    init_logger(false);

    let project_root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    let save_dir = project_root.join("results/headless");
    std::fs::create_dir_all(&save_dir)?;

    let taxonomy = Taxonomy::resolve(LabelFormat::Voc, "")?;
    let level = ScalingLevel::try_from(0u8)?;
    let config = EfficientDetConfig::new(taxonomy.len(), level, true);
    let checkpoint = project_root.join("assets/checkpoints/efficientdet-d0-voc.onnx");
    let detector = EfficientDet::load(config, &checkpoint)?;

    let viewer = DirectoryViewer {
        dir: save_dir,
        counter: Cell::new(0),
    };

    for name in ["street.jpg", "park.jpg"] {
        let args = PredictArgs {
            image: project_root.join("assets/images").join(name),
            min_score: 0.3,
            ..Default::default()
        };
        let outcome = run_prediction_with(&detector, &viewer, &taxonomy, &args)
            .with_context(|| format!("Failed on {name}"))?;
        tracing::info!("{}: {} detections", name, outcome.detections.len());
    }

    Ok(())
}
