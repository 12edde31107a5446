//! Structural analysis of rasterized design mockups.
//!
//! Given an image, the crate reports two kinds of structure:
//!
//! - **Layout blocks**: candidate bounding boxes from an external contour
//!   detector are filtered by area, stripped of nested duplicates, and
//!   vertically merged into a minimal top-to-bottom sequence of regions
//!   ([`extract_layout`]).
//! - **Palettes**: pixels are sampled on a stride grid and clustered into
//!   a small ordered set of `#rrggbb` colors ([`extract_palette`]), or
//!   reduced to the single majority color of a region ([`dominant_color`]).
//!
//! Both halves are pure synchronous functions over borrowed data and can
//! run independently; [`analyze_image`] composes them into one report.
//! The contour and clustering collaborators are injectable through the
//! [`RegionDetector`] and [`ClusterProvider`] traits, with a shipped
//! k-means implementation ([`KmeansClusterer`]).

pub mod analyze;
pub mod block;
pub mod layout;
pub mod palette;

pub use analyze::{
    ImageAnalysis, RegionDetector, StructuralColors, analyze_bytes, analyze_image,
    structural_colors,
};
pub use block::Block;
pub use layout::{AreaThreshold, LayoutConfig, extract_layout};
pub use palette::{
    ClusterProvider, ColorCluster, KmeansClusterer, PaletteConfig, SENTINEL_COLOR, dominant_color,
    extract_palette,
};

use thiserror::Error;

/// Errors surfaced before the core pipeline runs.
///
/// Once an image decodes to a non-empty pixel buffer, every pipeline step
/// (filtering, sorting, merging, averaging) is total; degenerate sample
/// sets fall back to the sentinel palette rather than an error.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The input bytes could not be decoded as an image.
    #[error("unable to decode image: {0}")]
    InvalidImage(String),
    /// The decoded image has no pixels.
    #[error("image has no pixels")]
    EmptyImage,
}
