use std::path::Path;

use anyhow::Context;
use eframe::egui::{ColorImage, Rect};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, RgbaImage};

/// Suggested file name for a saved map figure.
pub const FIGURE_FILE_NAME: &str = "DFFE_Sampling_Stations_figure.png";

/// Logical figure size in points; the saved PNG is this times [`FIGURE_SCALE`].
pub const FIGURE_SIZE: [u32; 2] = [1400, 800];
pub const FIGURE_SCALE: u32 = 3;

/// Cut the map out of a window screenshot and scale it up to figure size.
///
/// `region` is in points. Without one the whole screenshot is used. The
/// aspect ratio is kept, so one side may come out shorter than the figure.
pub fn figure_image(
    screen: &ColorImage,
    region: Option<Rect>,
    pixels_per_point: f32,
) -> anyhow::Result<RgbaImage> {
    let cropped = match region {
        Some(rect) => screen.region(&rect, Some(pixels_per_point)),
        None => screen.clone(),
    };
    let [width, height] = cropped.size;
    if width == 0 || height == 0 {
        anyhow::bail!("map area is empty");
    }

    let bytes: Vec<u8> = cropped
        .pixels
        .iter()
        .flat_map(|c| c.to_srgba_unmultiplied())
        .collect();
    let capture = RgbaImage::from_raw(width as u32, height as u32, bytes)
        .context("screenshot does not match its reported size")?;

    let [w, h] = FIGURE_SIZE;
    Ok(DynamicImage::ImageRgba8(capture)
        .resize(w * FIGURE_SCALE, h * FIGURE_SCALE, FilterType::Triangle)
        .into_rgba8())
}

pub fn save_png(image: &RgbaImage, path: &Path) -> anyhow::Result<()> {
    image
        .save_with_format(path, ImageFormat::Png)
        .with_context(|| format!("writing figure to {}", path.display()))
}
