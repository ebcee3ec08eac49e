// -- imports
use clap::Parser;
use std::path::PathBuf;

use crate::error::Result;
use crate::labels::{LabelFormat, parse_label_format};
use crate::predict::PredictArgs;
use crate::toml_utils::AppSettings;

/// Single-shot EfficientDet object detection on one image.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input image to run detection on
    #[arg(long, value_parser = existing_file, value_name = "FILE")]
    pub image: PathBuf,

    /// ONNX checkpoint exported for the chosen configuration
    #[arg(long, value_name = "FILE")]
    pub checkpoint: PathBuf,

    /// EfficientDet scaling level
    #[arg(
        long,
        default_value_t = 0,
        value_parser = clap::value_parser!(u8).range(0..=7),
        value_name = "LEVEL"
    )]
    pub efficientdet: u8,

    /// Fuse pyramid features bidirectionally (default)
    #[arg(long, overrides_with = "no_bidirectional")]
    pub bidirectional: bool,

    /// Disable bidirectional feature fusion
    #[arg(long)]
    pub no_bidirectional: bool,

    /// Label taxonomy format: VOC or labelme
    #[arg(long, value_parser = parse_label_format, value_name = "FORMAT")]
    pub format: LabelFormat,

    /// Comma-separated class names, required with --format labelme
    #[arg(long, default_value = "", value_name = "NAMES")]
    pub classes_names: String,

    /// Drop detections scoring below this
    #[arg(long, default_value_t = 0.0, value_name = "SCORE")]
    pub min_score: f32,

    /// Save the annotated image instead of displaying it
    #[arg(long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// TOML settings file for annotation and viewer options
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// TTF font for label text, overrides the settings file
    #[arg(long, value_name = "FILE")]
    pub font: Option<PathBuf>,

    /// Viewer command, overrides the settings file
    #[arg(long, value_name = "COMMAND")]
    pub viewer: Option<String>,

    /// Log debug output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Effective setting after resolving the --bidirectional /
    /// --no-bidirectional pair, on unless turned off.
    pub fn bidirectional(&self) -> bool {
        self.bidirectional || !self.no_bidirectional
    }

    /// Merge CLI flags with the optional settings file.
    ///
    /// Flags win over file values, file values win over built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns `AppError` when the settings file cannot be read or parsed.
    pub fn into_predict_args(self) -> Result<PredictArgs> {
        let settings = match &self.config {
            Some(path) => AppSettings::from_toml(path)?,
            None => AppSettings::default(),
        };

        let bidirectional = self.bidirectional();

        let mut annotate_cfg = settings.annotate;
        if self.font.is_some() {
            annotate_cfg.font = self.font;
        }

        let mut viewer = settings.viewer;
        if self.viewer.is_some() {
            viewer.command = self.viewer;
        }

        Ok(PredictArgs {
            image: self.image,
            checkpoint: self.checkpoint,
            efficientdet: self.efficientdet,
            bidirectional,
            format: self.format,
            classes_names: self.classes_names,
            min_score: self.min_score,
            output: self.output,
            annotate_cfg,
            viewer,
            verbose: self.verbose,
        })
    }
}

fn existing_file(value: &str) -> std::result::Result<PathBuf, String> {
    let path = PathBuf::from(value);
    if path.is_file() {
        Ok(path)
    } else {
        Err(format!("file not found: {value}"))
    }
}

// -- tests

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn write_test_image(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("input.png");
        image::RgbImage::new(8, 8).save(&path).unwrap();
        path
    }

    fn base_cmd(image: &Path) -> Vec<String> {
        vec![
            "predict".to_string(),
            "--image".to_string(),
            image.display().to_string(),
            "--checkpoint".to_string(),
            "model.onnx".to_string(),
            "--format".to_string(),
            "VOC".to_string(),
        ]
    }

    #[test]
    fn test_parse_happy_path() {
        let temp_dir = TempDir::new().unwrap();
        let image = write_test_image(&temp_dir);
        let mut cmd = base_cmd(&image);
        cmd.extend([
            "--efficientdet".to_string(),
            "3".to_string(),
            "--classes-names".to_string(),
            "cat,dog".to_string(),
        ]);

        let args = Args::try_parse_from(&cmd).unwrap();

        assert_eq!(args.image, image);
        assert_eq!(args.checkpoint, PathBuf::from("model.onnx"));
        assert_eq!(args.efficientdet, 3);
        assert_eq!(args.format, LabelFormat::Voc);
        assert_eq!(args.classes_names, "cat,dog");
        assert!(args.bidirectional());
        assert!(!args.verbose);
    }

    #[test]
    fn test_level_out_of_range_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let image = write_test_image(&temp_dir);

        for level in ["8", "9", "255"] {
            let mut cmd = base_cmd(&image);
            cmd.extend(["--efficientdet".to_string(), level.to_string()]);
            let err = Args::try_parse_from(&cmd).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::ValueValidation, "level {level}");
        }
    }

    #[test]
    fn test_level_defaults_to_zero() {
        let temp_dir = TempDir::new().unwrap();
        let image = write_test_image(&temp_dir);

        let args = Args::try_parse_from(base_cmd(&image)).unwrap();
        assert_eq!(args.efficientdet, 0);
    }

    #[test]
    fn test_format_is_required() {
        let temp_dir = TempDir::new().unwrap();
        let image = write_test_image(&temp_dir);
        let cmd = &base_cmd(&image)[..5];

        let err = Args::try_parse_from(cmd).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let image = write_test_image(&temp_dir);
        let mut cmd = base_cmd(&image)[..5].to_vec();
        cmd.extend(["--format".to_string(), "coco".to_string()]);

        let err = Args::try_parse_from(&cmd).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_bidirectional_flag_pair() {
        let temp_dir = TempDir::new().unwrap();
        let image = write_test_image(&temp_dir);

        let args = Args::try_parse_from(base_cmd(&image)).unwrap();
        assert!(args.bidirectional());

        let mut cmd = base_cmd(&image);
        cmd.push("--no-bidirectional".to_string());
        let args = Args::try_parse_from(&cmd).unwrap();
        assert!(!args.bidirectional());

        // Last flag wins when both are given
        let mut cmd = base_cmd(&image);
        cmd.push("--no-bidirectional".to_string());
        cmd.push("--bidirectional".to_string());
        let args = Args::try_parse_from(&cmd).unwrap();
        assert!(args.bidirectional());
    }

    #[test]
    fn test_missing_image_is_rejected() {
        let cmd = base_cmd(Path::new("/nonexistent/input.png"));

        let err = Args::try_parse_from(&cmd).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_settings_file_merges_with_flag_override() {
        let temp_dir = TempDir::new().unwrap();
        let image = write_test_image(&temp_dir);
        let settings_path = temp_dir.path().join("settings.toml");
        fs::write(
            &settings_path,
            "[annotate]\nthickness = 5\nfont = \"file.ttf\"\n\n[viewer]\ncommand = \"feh\"\n",
        )
        .unwrap();

        let mut cmd = base_cmd(&image);
        cmd.extend([
            "--config".to_string(),
            settings_path.display().to_string(),
            "--font".to_string(),
            "/override/font.ttf".to_string(),
        ]);

        let args = Args::try_parse_from(&cmd).unwrap();
        let predict_args = args.into_predict_args().unwrap();

        assert_eq!(predict_args.annotate_cfg.thickness, 5);
        assert_eq!(
            predict_args.annotate_cfg.font,
            Some(PathBuf::from("/override/font.ttf"))
        );
        assert_eq!(predict_args.viewer.command.as_deref(), Some("feh"));
    }
}
