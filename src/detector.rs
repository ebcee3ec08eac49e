// -- submodules
mod config;
mod efficientdet;
mod preprocess;

pub use config::{EfficientDetConfig, ScalingLevel};
pub use efficientdet::EfficientDet;
pub use preprocess::{IMAGENET_MEAN, IMAGENET_STD};

// -- external imports
use image::DynamicImage;
use std::fmt;

use crate::error::Result;

/// A loaded detection model.
///
/// Implementations own their weights and input resolution; `detect` runs a
/// single forward pass and reports boxes in original image pixel
/// coordinates.
pub trait Detector {
    /// Side length of the square network input.
    fn input_size(&self) -> u32;

    /// Run one forward pass over a single image.
    ///
    /// # Errors
    ///
    /// Returns an inference error when the forward pass fails or the model
    /// outputs cannot be decoded.
    fn detect(&self, image: &DynamicImage) -> Result<Vec<Detection>>;
}

/// One detected object.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Corners as [left, top, right, bottom] in image pixels
    pub bbox: [f32; 4],

    /// Index into the taxonomy
    pub class_id: usize,

    /// Confidence in [0, 1]
    pub score: f32,
}

impl Detection {
    pub fn width(&self) -> f32 {
        self.bbox[2] - self.bbox[0]
    }

    pub fn height(&self) -> f32 {
        self.bbox[3] - self.bbox[1]
    }

    pub fn area(&self) -> f32 {
        self.width().max(0.0) * self.height().max(0.0)
    }
}

impl fmt::Display for Detection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "class {} score {:.2} at [{:.1}, {:.1}, {:.1}, {:.1}]",
            self.class_id, self.score, self.bbox[0], self.bbox[1], self.bbox[2], self.bbox[3]
        )
    }
}

// -- tests

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_geometry() {
        let det = Detection {
            bbox: [10.0, 20.0, 50.0, 80.0],
            class_id: 3,
            score: 0.5,
        };
        assert_eq!(det.width(), 40.0);
        assert_eq!(det.height(), 60.0);
        assert_eq!(det.area(), 2400.0);
    }

    #[test]
    fn test_degenerate_detection_has_zero_area() {
        let det = Detection {
            bbox: [50.0, 50.0, 10.0, 10.0],
            class_id: 0,
            score: 0.5,
        };
        assert_eq!(det.area(), 0.0);
    }

    #[test]
    fn test_detection_display_rounds_score() {
        let det = Detection {
            bbox: [10.0, 10.0, 50.0, 50.0],
            class_id: 2,
            score: 0.87,
        };
        let text = det.to_string();
        assert!(text.contains("class 2"));
        assert!(text.contains("0.87"));
    }
}
