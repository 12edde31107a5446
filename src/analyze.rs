use image::{RgbImage, imageops};
use log::info;
use serde::Serialize;

use crate::AnalysisError;
use crate::block::Block;
use crate::layout::{LayoutConfig, extract_layout};
use crate::palette::{ClusterProvider, PaletteConfig, dominant_color, extract_palette};

/// Edge/contour collaborator that turns pixels into candidate boxes.
///
/// No ordering or uniqueness is assumed of the output; nested and
/// duplicate boxes are expected and cleaned up downstream.
pub trait RegionDetector {
    fn detect_regions(&self, img: &RgbImage) -> Vec<Block>;
}

/// Whole-image structural report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAnalysis {
    pub width: u32,
    pub height: u32,
    pub dominant_colors: Vec<String>,
    pub layout_blocks: Vec<Block>,
}

/// Two-region color report: the top band of the frame (title and
/// background area) and its center (the primary subject).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuralColors {
    pub background: String,
    pub primary_mass: String,
}

/// Analyze one image: detect candidate regions, reduce them to layout
/// blocks, and extract the dominant-color palette.
///
/// Each call is a pure function of its input; nothing is retained across
/// calls, so any number of images may be analyzed concurrently.
pub fn analyze_image<D, C>(
    img: &RgbImage,
    detector: &D,
    clusterer: &C,
    layout: &LayoutConfig,
    palette: &PaletteConfig,
) -> Result<ImageAnalysis, AnalysisError>
where
    D: RegionDetector + ?Sized,
    C: ClusterProvider + ?Sized,
{
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(AnalysisError::EmptyImage);
    }

    let candidates = detector.detect_regions(img);
    let layout_blocks = extract_layout(&candidates, width as u64 * height as u64, layout);
    let dominant_colors = extract_palette(img, palette, clusterer);

    info!(
        "{width}x{height}: {} candidate boxes reduced to {} layout blocks",
        candidates.len(),
        layout_blocks.len()
    );

    Ok(ImageAnalysis {
        width,
        height,
        dominant_colors,
        layout_blocks,
    })
}

/// Decode raw image bytes and analyze them.
///
/// Undecodable input is rejected up front as [`AnalysisError::InvalidImage`];
/// once decoding succeeds the pipeline has no further failure modes.
pub fn analyze_bytes<D, C>(
    input: &[u8],
    detector: &D,
    clusterer: &C,
    layout: &LayoutConfig,
    palette: &PaletteConfig,
) -> Result<ImageAnalysis, AnalysisError>
where
    D: RegionDetector + ?Sized,
    C: ClusterProvider + ?Sized,
{
    let img = image::load_from_memory(input)
        .map_err(|e| AnalysisError::InvalidImage(e.to_string()))?
        .to_rgb8();
    analyze_image(&img, detector, clusterer, layout, palette)
}

/// Report the dominant color of two fixed regions: the top 25% band
/// (`background`) and the center 30-70% crop (`primary_mass`).
pub fn structural_colors<C>(
    img: &RgbImage,
    clusterer: &C,
    palette: &PaletteConfig,
) -> Result<StructuralColors, AnalysisError>
where
    C: ClusterProvider + ?Sized,
{
    let (width, height) = img.dimensions();
    if width == 0 || height == 0 {
        return Err(AnalysisError::EmptyImage);
    }

    let band = ((height as f64 * 0.25) as u32).max(1);
    let top = imageops::crop_imm(img, 0, 0, width, band).to_image();

    let cx = (width as f64 * 0.3) as u32;
    let cy = (height as f64 * 0.3) as u32;
    let cw = ((width as f64 * 0.7) as u32 - cx).max(1);
    let ch = ((height as f64 * 0.7) as u32 - cy).max(1);
    let center = imageops::crop_imm(img, cx, cy, cw, ch).to_image();

    Ok(StructuralColors {
        background: dominant_color(&top, palette, clusterer),
        primary_mass: dominant_color(&center, palette, clusterer),
    })
}
