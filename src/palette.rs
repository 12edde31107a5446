use image::RgbImage;
use kmeans_colors::get_kmeans;
use log::debug;
use palette::Srgb;

/// Palette entry returned when a region is too small to cluster.
pub const SENTINEL_COLOR: &str = "#000000";

// Fixed seed so repeated analyses of the same image agree.
const KMEANS_SEED: u64 = 0;
const KMEANS_MAX_ITER: usize = 20;
const KMEANS_CONVERGE: f32 = 1e-4;

/// One cluster of color samples: its representative color and how many
/// samples it absorbed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCluster {
    /// Component-wise mean of the cluster, rounded to nearest and clamped
    /// to `0..=255`.
    pub centroid: [u8; 3],
    pub count: usize,
}

/// Color clustering collaborator.
///
/// Implementations partition `samples` into `k` representative clusters.
/// Callers guarantee `k >= 1` and `samples.len() >= k`; the degenerate
/// cases are handled before a provider is ever invoked.
pub trait ClusterProvider {
    fn cluster(&self, samples: &[[u8; 3]], k: usize) -> Vec<ColorCluster>;
}

/// k-means clustering in sRGB space via `kmeans_colors`.
#[derive(Debug, Clone, Copy, Default)]
pub struct KmeansClusterer;

impl ClusterProvider for KmeansClusterer {
    fn cluster(&self, samples: &[[u8; 3]], k: usize) -> Vec<ColorCluster> {
        let buf: Vec<Srgb> = samples
            .iter()
            .map(|&[r, g, b]| Srgb::new(r, g, b).into_format::<f32>())
            .collect();

        let kmeans = get_kmeans(k, KMEANS_MAX_ITER, KMEANS_CONVERGE, false, &buf, KMEANS_SEED);

        let mut counts = vec![0usize; kmeans.centroids.len()];
        for &index in &kmeans.indices {
            counts[index as usize] += 1;
        }

        kmeans
            .centroids
            .iter()
            .zip(counts)
            .map(|(centroid, count)| {
                let rgb: Srgb<u8> = centroid.into_format();
                ColorCluster {
                    centroid: [rgb.red, rgb.green, rgb.blue],
                    count,
                }
            })
            .collect()
    }
}

/// Per-call tuning for palette extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteConfig {
    /// Sampling stride in pixels, applied to both axes.
    pub stride: u32,
    /// Palette size for whole-image extraction.
    pub colors: usize,
    /// Cluster count used when picking a single dominant color.
    pub groups: usize,
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            stride: 10,
            colors: 5,
            groups: 3,
        }
    }
}

/// Collect RGB samples on a fixed stride grid starting at the origin.
/// Sampling rather than reading every pixel bounds clustering cost on
/// large images.
pub fn sample_colors(img: &RgbImage, stride: u32) -> Vec<[u8; 3]> {
    let stride = stride.max(1);
    let mut samples = Vec::new();
    let mut y = 0;
    while y < img.height() {
        let mut x = 0;
        while x < img.width() {
            let pixel = img.get_pixel(x, y);
            samples.push([pixel[0], pixel[1], pixel[2]]);
            x += stride;
        }
        y += stride;
    }
    samples
}

/// Summarize an image (or region) as `config.colors` hex strings, in the
/// provider's cluster order.
///
/// Regions with fewer samples than requested colors yield the sentinel
/// palette instead of invoking the provider, whose behavior is undefined
/// for `k` above the sample count. This function never fails.
pub fn extract_palette<P>(img: &RgbImage, config: &PaletteConfig, provider: &P) -> Vec<String>
where
    P: ClusterProvider + ?Sized,
{
    if config.colors == 0 {
        return Vec::new();
    }

    let samples = sample_colors(img, config.stride);
    if samples.len() < config.colors {
        debug!(
            "{} samples for a {}-color palette, returning sentinel",
            samples.len(),
            config.colors
        );
        return vec![SENTINEL_COLOR.to_string(); config.colors];
    }

    provider
        .cluster(&samples, config.colors)
        .iter()
        .map(|cluster| hex(cluster.centroid))
        .collect()
}

/// Majority color of a region: the centroid of the most populated cluster,
/// not the mean of all samples. Busy regions (text over a background, for
/// instance) keep their prevailing tone instead of a blend with outliers.
pub fn dominant_color<P>(img: &RgbImage, config: &PaletteConfig, provider: &P) -> String
where
    P: ClusterProvider + ?Sized,
{
    let samples = sample_colors(img, config.stride);
    if samples.len() < config.groups.max(1) {
        return SENTINEL_COLOR.to_string();
    }

    provider
        .cluster(&samples, config.groups.max(1))
        .iter()
        .max_by_key(|cluster| cluster.count)
        .map_or_else(|| SENTINEL_COLOR.to_string(), |cluster| hex(cluster.centroid))
}

/// Format a color as `#rrggbb`, lowercase, zero-padded.
pub fn hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}
