use log::debug;

use crate::block::Block;

/// Minimum-area policy applied to candidate boxes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AreaThreshold {
    /// Fixed floor in square pixels. Suited to per-region detection on
    /// small or cropped inputs.
    Absolute(u64),
    /// Fraction of the total image area, which keeps the filter
    /// scale-invariant across resolutions.
    Relative(f64),
}

impl AreaThreshold {
    fn resolve(&self, image_area: u64) -> f64 {
        match *self {
            AreaThreshold::Absolute(pixels) => pixels as f64,
            AreaThreshold::Relative(fraction) => fraction * image_area as f64,
        }
    }
}

/// Tuning for [`extract_layout`]. Every call carries its own config so
/// concurrent callers can run different policies.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    pub threshold: AreaThreshold,
    /// Vertical overlap ratio (relative to the shorter block) above which
    /// two y-adjacent blocks are folded together.
    pub merge_overlap: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            threshold: AreaThreshold::Relative(0.05),
            merge_overlap: 0.4,
        }
    }
}

/// Reduce raw candidate boxes to a minimal, top-to-bottom ordered set of
/// layout blocks.
///
/// Candidates may arrive in any order and may be nested or duplicated;
/// `image_area` is the total pixel area the relative threshold policy
/// resolves against. Boxes below the area threshold are dropped, boxes
/// fully contained in a larger surviving box are dropped as nested
/// artifacts of the same visual region, and strongly overlapping vertical
/// neighbours are merged.
pub fn extract_layout(candidates: &[Block], image_area: u64, config: &LayoutConfig) -> Vec<Block> {
    let min_area = config.threshold.resolve(image_area);

    let mut blocks: Vec<Block> = candidates
        .iter()
        .copied()
        .filter(|b| b.area() as f64 >= min_area)
        .collect();

    // Largest first, so the containment check only has to look at blocks
    // already accepted: nothing later in the walk can enclose an earlier
    // entry.
    blocks.sort_by(|a, b| b.area().cmp(&a.area()));

    let mut kept: Vec<Block> = Vec::with_capacity(blocks.len());
    for block in blocks {
        if !kept.iter().any(|outer| outer.contains(&block)) {
            kept.push(block);
        }
    }

    debug!(
        "{} of {} candidates survive area and containment filters",
        kept.len(),
        candidates.len()
    );

    merge_vertical(kept, config.merge_overlap)
}

/// Single forward pass over y-sorted blocks, folding each block into the
/// previously accepted one when their vertical spans overlap by more than
/// `merge_overlap` of the shorter height.
///
/// Only adjacent-in-sort-order pairs are compared; a merge never cascades
/// to blocks further down the sequence. The merged block keeps the earlier
/// block's x, spans both vertical extents, and takes the wider width.
fn merge_vertical(mut blocks: Vec<Block>, merge_overlap: f64) -> Vec<Block> {
    blocks.sort_by_key(|b| b.y);

    let mut merged: Vec<Block> = Vec::with_capacity(blocks.len());
    for block in blocks {
        let Some(last) = merged.last_mut() else {
            merged.push(block);
            continue;
        };

        let overlap = last.bottom().min(block.bottom()) as i64 - last.y.max(block.y) as i64;
        let min_height = last.height.min(block.height);

        if overlap as f64 > merge_overlap * min_height as f64 {
            let top = last.y.min(block.y);
            let bottom = last.bottom().max(block.bottom());
            last.y = top;
            last.height = bottom - top;
            last.width = last.width.max(block.width);
        } else {
            merged.push(block);
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    fn absolute(min_area: u64) -> LayoutConfig {
        LayoutConfig {
            threshold: AreaThreshold::Absolute(min_area),
            ..LayoutConfig::default()
        }
    }

    #[test]
    fn empty_candidates_give_empty_layout() {
        assert!(extract_layout(&[], 1_000_000, &LayoutConfig::default()).is_empty());
    }

    #[test]
    fn single_box_passes_through() {
        let candidates = [Block::new(0, 0, 300, 300)];
        let result = extract_layout(&candidates, 1_000_000, &absolute(100));
        assert_eq!(result, vec![Block::new(0, 0, 300, 300)]);
    }

    #[test]
    fn boxes_below_threshold_are_dropped() {
        let candidates = [Block::new(0, 0, 5, 5), Block::new(10, 10, 8, 8)];
        assert!(extract_layout(&candidates, 1_000_000, &absolute(100)).is_empty());
    }

    #[test]
    fn box_at_exact_threshold_survives() {
        let candidates = [Block::new(0, 0, 10, 10)];
        let result = extract_layout(&candidates, 1_000_000, &absolute(100));
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn relative_threshold_scales_with_image_area() {
        let candidates = [Block::new(0, 0, 100, 100)];
        let config = LayoutConfig::default(); // 5% of total area

        // 10_000 px^2 against a 1_000_000 px^2 image is below 5%.
        assert!(extract_layout(&candidates, 1_000_000, &config).is_empty());
        // Against a 100_000 px^2 image the same box is well above it.
        assert_eq!(extract_layout(&candidates, 100_000, &config).len(), 1);
    }

    #[test]
    fn nested_box_is_dropped() {
        let candidates = [Block::new(0, 0, 200, 200), Block::new(10, 10, 50, 50)];
        let result = extract_layout(&candidates, 1_000_000, &absolute(100));
        assert_eq!(result, vec![Block::new(0, 0, 200, 200)]);
    }

    #[test]
    fn duplicate_boxes_collapse_to_one() {
        let candidates = [Block::new(20, 20, 400, 100), Block::new(20, 20, 400, 100)];
        let result = extract_layout(&candidates, 1_000_000, &absolute(100));
        assert_eq!(result, vec![Block::new(20, 20, 400, 100)]);
    }

    #[test]
    fn weak_vertical_overlap_keeps_blocks_separate() {
        // overlap = 10, min height = 50, ratio 0.2 < 0.4
        let candidates = [Block::new(0, 0, 100, 50), Block::new(0, 40, 100, 50)];
        let result = extract_layout(&candidates, 1_000_000, &absolute(100));
        assert_eq!(
            result,
            vec![Block::new(0, 0, 100, 50), Block::new(0, 40, 100, 50)]
        );
    }

    #[test]
    fn strong_vertical_overlap_merges() {
        // overlap = 40, min height = 50, ratio 0.8 > 0.4
        let candidates = [Block::new(0, 0, 100, 50), Block::new(0, 10, 100, 60)];
        let result = extract_layout(&candidates, 1_000_000, &absolute(100));
        assert_eq!(result, vec![Block::new(0, 0, 100, 70)]);
    }

    #[test]
    fn merge_takes_wider_width() {
        let candidates = [Block::new(0, 0, 80, 50), Block::new(0, 10, 120, 60)];
        let result = extract_layout(&candidates, 1_000_000, &absolute(100));
        assert_eq!(result, vec![Block::new(0, 0, 120, 70)]);
    }

    #[test]
    fn output_is_sorted_by_y() {
        let candidates = [
            Block::new(0, 500, 300, 60),
            Block::new(0, 0, 280, 60),
            Block::new(0, 250, 290, 60),
        ];
        let result = extract_layout(&candidates, 1_000_000, &absolute(100));
        let ys: Vec<u32> = result.iter().map(|b| b.y).collect();
        assert_eq!(ys, vec![0, 250, 500]);
    }

    #[test]
    fn adjacent_merge_does_not_cascade() {
        // The first two merge (overlap 5 of min height 10), but the grown
        // block is compared against the third as-is and does not absorb it,
        // even though the second and third on their own would have merged.
        let candidates = [
            Block::new(0, 0, 100, 50),
            Block::new(0, 45, 100, 10),
            Block::new(0, 48, 100, 50),
        ];
        let result = extract_layout(&candidates, 1_000_000, &absolute(100));
        assert_eq!(
            result,
            vec![Block::new(0, 0, 100, 55), Block::new(0, 48, 100, 50)]
        );
    }

    #[test]
    fn extraction_is_idempotent() {
        let candidates = [
            Block::new(0, 0, 200, 200),
            Block::new(10, 10, 50, 50),
            Block::new(0, 300, 180, 100),
            Block::new(0, 320, 150, 100),
        ];
        let config = absolute(100);
        let once = extract_layout(&candidates, 1_000_000, &config);
        let twice = extract_layout(&once, 1_000_000, &config);
        assert_eq!(once, twice);
    }

    #[test]
    fn no_output_block_contains_another() {
        let candidates = [
            Block::new(0, 0, 400, 120),
            Block::new(20, 10, 100, 40),
            Block::new(0, 200, 400, 120),
            Block::new(300, 210, 90, 100),
        ];
        let result = extract_layout(&candidates, 1_000_000, &absolute(100));
        for (i, a) in result.iter().enumerate() {
            for (j, b) in result.iter().enumerate() {
                if i != j {
                    assert!(!a.contains(b), "{a:?} contains {b:?}");
                }
            }
        }
    }
}
