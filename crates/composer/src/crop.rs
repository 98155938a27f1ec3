//! Cover-crop geometry

/// Source rectangle to cut out before scaling into the target region
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Largest centered rectangle of the source with the target's aspect ratio.
/// Wider sources lose columns on both sides, taller ones lose rows.
pub fn cover_crop(src_width: u32, src_height: u32, target_width: u32, target_height: u32) -> CropRect {
    let target_ratio = target_width as f64 / target_height.max(1) as f64;
    let src_ratio = src_width as f64 / src_height.max(1) as f64;

    if src_ratio > target_ratio {
        let width = ((src_height as f64 * target_ratio).round() as u32).clamp(1, src_width.max(1));
        CropRect {
            x: (src_width - width) / 2,
            y: 0,
            width,
            height: src_height,
        }
    } else {
        let height = ((src_width as f64 / target_ratio).round() as u32).clamp(1, src_height.max(1));
        CropRect {
            x: 0,
            y: (src_height - height) / 2,
            width: src_width,
            height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1080 x 756 region, ratio ~1.4286
    const W: u32 = 1080;
    const H: u32 = 756;

    #[test]
    fn wide_source_is_cropped_horizontally() {
        let rect = cover_crop(2000, 700, W, H);
        assert_eq!(rect.height, 700);
        assert_eq!(rect.y, 0);
        assert_eq!(rect.width, 1000);
        assert_eq!(rect.x, 500);
    }

    #[test]
    fn tall_source_is_cropped_vertically() {
        let rect = cover_crop(1000, 1000, W, H);
        assert_eq!(rect.width, 1000);
        assert_eq!(rect.x, 0);
        assert_eq!(rect.height, 700);
        assert_eq!(rect.y, 150);
    }

    #[test]
    fn matching_ratio_keeps_everything() {
        let rect = cover_crop(W * 2, H * 2, W, H);
        assert_eq!(rect, CropRect { x: 0, y: 0, width: W * 2, height: H * 2 });
    }

    #[test]
    fn crop_stays_inside_tiny_sources() {
        let rect = cover_crop(1, 1, W, H);
        assert!(rect.x + rect.width <= 1);
        assert!(rect.y + rect.height <= 1);
        assert!(rect.width >= 1 && rect.height >= 1);
    }
}
