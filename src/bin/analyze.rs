use anyhow::{Context, Result};
use clap::Parser;
use design_perception::{
    AreaThreshold, Block, KmeansClusterer, LayoutConfig, PaletteConfig, RegionDetector,
    analyze_bytes, structural_colors,
};
use image::RgbImage;
use std::fs;
use std::path::PathBuf;

/// Report layout blocks and dominant colors for rasterized design mockups.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// One or more input image paths
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// JSON file with candidate boxes from an external contour detector
    #[arg(short = 'b', long)]
    blocks: Option<PathBuf>,

    /// Palette size for the whole-image report
    #[arg(short = 'k', long, default_value_t = 5)]
    colors: usize,

    /// Sampling stride in pixels
    #[arg(short, long, default_value_t = 10)]
    stride: u32,

    /// Absolute minimum block area in px^2 (default: 5% of the image area)
    #[arg(short = 'a', long)]
    min_area: Option<u64>,

    /// Emit the two-region structural color report instead of the full analysis
    #[arg(long)]
    structural: bool,
}

/// Candidate boxes loaded from disk, standing in for a live contour service.
struct FixedRegions(Vec<Block>);

impl RegionDetector for FixedRegions {
    fn detect_regions(&self, _img: &RgbImage) -> Vec<Block> {
        self.0.clone()
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let candidates: Vec<Block> = match &args.blocks {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).context("candidate box JSON is malformed")?
        }
        None => Vec::new(),
    };

    let layout = LayoutConfig {
        threshold: match args.min_area {
            Some(pixels) => AreaThreshold::Absolute(pixels),
            None => LayoutConfig::default().threshold,
        },
        ..LayoutConfig::default()
    };
    let palette = PaletteConfig {
        stride: args.stride,
        colors: args.colors,
        ..PaletteConfig::default()
    };
    let clusterer = KmeansClusterer;

    for input in &args.inputs {
        let bytes = fs::read(input).with_context(|| format!("reading {}", input.display()))?;

        let report = if args.structural {
            let img = image::load_from_memory(&bytes)
                .with_context(|| format!("decoding {}", input.display()))?
                .to_rgb8();
            serde_json::to_string_pretty(&structural_colors(&img, &clusterer, &palette)?)?
        } else {
            let detector = FixedRegions(candidates.clone());
            let analysis = analyze_bytes(&bytes, &detector, &clusterer, &layout, &palette)
                .with_context(|| format!("analyzing {}", input.display()))?;
            serde_json::to_string_pretty(&analysis)?
        };

        println!("{report}");
    }

    Ok(())
}
