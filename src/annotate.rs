// -- submodules
mod font;

use font::load_font;

// -- external imports
use ab_glyph::{Font, FontRef, PxScale, ScaleFont};
use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut};
use imageproc::rect::Rect;
use serde::Deserialize;
use std::path::PathBuf;

use crate::detector::Detection;
use crate::error::Result;
use crate::labels::Taxonomy;

/// Box outline and label strip color.
const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);

/// Label text color, dark for contrast on the strip.
const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnnotateConfigs {
    /// whether to draw boxes
    pub show_box: bool,

    /// whether to draw class labels
    pub show_label: bool,

    /// whether to append confidence scores to labels
    pub show_conf: bool,

    /// box outline thickness in pixels
    pub thickness: i32,

    /// label text height in pixels
    pub font_size: f32,

    /// optional TTF font path, system locations are searched otherwise
    pub font: Option<PathBuf>,
}

impl Default for AnnotateConfigs {
    fn default() -> Self {
        Self {
            show_box: true,
            show_label: true,
            show_conf: true,
            thickness: 2,
            font_size: 16.0,
            font: None,
        }
    }
}

/// Label text for one detection, e.g. "dog 0.87".
pub fn format_label(class_name: &str, score: f32, show_conf: bool) -> String {
    if show_conf {
        format!("{} {:.2}", class_name, score)
    } else {
        class_name.to_string()
    }
}

/// Draw detections onto a copy of the image.
///
/// Coordinates are clamped to the image bounds, inverted corners are
/// swapped and boxes that collapse to zero width or height are skipped.
/// Without a usable font, boxes are drawn and label text is skipped.
///
/// # Errors
///
/// Returns `AppError::FontLoad` when an explicitly configured font cannot
/// be read.
pub fn annotate_image(
    img: &DynamicImage,
    detections: &[Detection],
    taxonomy: &Taxonomy,
    configs: &AnnotateConfigs,
) -> Result<DynamicImage> {
    let mut annotated = img.to_rgb8();

    let want_labels = configs.show_box && configs.show_label && !detections.is_empty();
    let font_data = if want_labels {
        load_font(configs.font.as_deref())?
    } else {
        None
    };
    let font = match font_data {
        Some(ref data) => FontRef::try_from_slice(data).ok(),
        None => None,
    };
    if want_labels && font.is_none() {
        tracing::warn!("No usable font found, drawing boxes without label text");
    }

    draw_detections(&mut annotated, detections, taxonomy, configs, font.as_ref());

    Ok(DynamicImage::ImageRgb8(annotated))
}

fn draw_detections(
    img: &mut RgbImage,
    detections: &[Detection],
    taxonomy: &Taxonomy,
    configs: &AnnotateConfigs,
    font: Option<&FontRef>,
) {
    let show_box = configs.show_box;
    let show_label = configs.show_label && show_box;
    let show_conf = configs.show_conf && show_label;

    if !show_box {
        return;
    }

    let (width, height) = img.dimensions();
    let thickness = configs.thickness.max(1);

    for det in detections {
        let mut x1 = det.bbox[0].round() as i32;
        let mut y1 = det.bbox[1].round() as i32;
        let mut x2 = det.bbox[2].round() as i32;
        let mut y2 = det.bbox[3].round() as i32;

        if x1 > x2 {
            std::mem::swap(&mut x1, &mut x2);
        }
        if y1 > y2 {
            std::mem::swap(&mut y1, &mut y2);
        }

        x1 = x1.max(0).min(width as i32 - 1);
        y1 = y1.max(0).min(height as i32 - 1);
        x2 = x2.max(0).min(width as i32 - 1);
        y2 = y2.max(0).min(height as i32 - 1);

        if x2 <= x1 || y2 <= y1 {
            continue;
        }

        for t in 0..thickness {
            let tx1 = (x1 + t).min(x2);
            let ty1 = (y1 + t).min(y2);
            let tx2 = (x2 - t).max(tx1);
            let ty2 = (y2 - t).max(ty1);
            if tx2 > tx1 && ty2 > ty1 {
                let rect = Rect::at(tx1, ty1).of_size((tx2 - tx1) as u32, (ty2 - ty1) as u32);
                draw_hollow_rect_mut(img, rect, BOX_COLOR);
            }
        }

        if !show_label {
            continue;
        }

        let class_name = match taxonomy.name_of(det.class_id) {
            Some(name) => name,
            None => {
                tracing::warn!(
                    "Label index {} outside taxonomy of {} classes",
                    det.class_id,
                    taxonomy.len()
                );
                "object"
            }
        };
        let label = format_label(class_name, det.score, show_conf);

        if let Some(f) = font {
            let scale = PxScale::from(configs.font_size);
            let scaled_font = f.as_scaled(scale);
            let mut text_w = 0.0;
            for c in label.chars() {
                text_w += scaled_font.h_advance(scaled_font.glyph_id(c));
            }
            let text_w = (text_w.ceil() as i32).max(1);
            let text_h = (scale.y.ceil() as i32).max(1);

            // Above the box, pulled inside when clipped by an image edge
            let mut text_x = x1;
            let mut text_y = y1 - text_h;
            if text_y < 0 {
                text_y = y1;
            }
            if text_x + text_w >= width as i32 {
                text_x = (width as i32 - text_w - 1).max(0);
            }
            if text_y + text_h >= height as i32 {
                text_y = (height as i32 - text_h - 1).max(0);
            }

            let strip = Rect::at(text_x, text_y).of_size(text_w as u32, text_h as u32);
            draw_filled_rect_mut(img, strip, BOX_COLOR);
            draw_text_mut(img, TEXT_COLOR, text_x, text_y, scale, f, &label);
        }
    }
}

// -- tests
