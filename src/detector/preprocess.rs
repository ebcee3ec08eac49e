use image::{DynamicImage, imageops};
use ndarray::{Array, Array4, s};

/// Channel means of the backbone's pretraining corpus.
pub const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Channel standard deviations of the backbone's pretraining corpus.
pub const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Gray fill for the letterbox margin, in raw pixel units.
const PAD_FILL: f32 = 114.0;

/// Letterbox one image into a normalized NCHW batch of size one.
///
/// The image is resized preserving aspect ratio into the top-left corner of
/// a `size`x`size` canvas; the margin is filled with the normalized pad
/// constant. Returns the tensor and the resize ratio, which callers use to
/// map box coordinates back to the original image.
pub fn letterbox(img: &DynamicImage, size: u32) -> (Array4<f32>, f32) {
    let (img_width, img_height) = (img.width(), img.height());

    let ratio = f64::min(
        size as f64 / img_height as f64,
        size as f64 / img_width as f64,
    );

    let resized = img.resize_exact(
        ((img_width as f64 * ratio) as u32).max(1),
        ((img_height as f64 * ratio) as u32).max(1),
        imageops::FilterType::Triangle,
    );

    let mut input = Array::zeros((1, 3, size as usize, size as usize));
    for (channel, (mean, std)) in IMAGENET_MEAN.iter().zip(IMAGENET_STD.iter()).enumerate() {
        input
            .slice_mut(s![0, channel, .., ..])
            .fill(normalize(PAD_FILL, *mean, *std));
    }

    for pixel in resized.into_rgb8().enumerate_pixels() {
        let x = pixel.0 as usize;
        let y = pixel.1 as usize;
        let [r, g, b] = pixel.2.0;
        input[[0, 0, y, x]] = normalize(f32::from(r), IMAGENET_MEAN[0], IMAGENET_STD[0]);
        input[[0, 1, y, x]] = normalize(f32::from(g), IMAGENET_MEAN[1], IMAGENET_STD[1]);
        input[[0, 2, y, x]] = normalize(f32::from(b), IMAGENET_MEAN[2], IMAGENET_STD[2]);
    }

    (input, ratio as f32)
}

fn normalize(value: f32, mean: f32, std: f32) -> f32 {
    (value / 255.0 - mean) / std
}
