use std::path::Path;

use ab_glyph::FontArc;
use image::{DynamicImage, RgbaImage};

use crate::{ComposeError, Result};

const HEADLINE_FONT: &str = "fonts/headline.ttf";
const BRAND_FONT: &str = "fonts/brand.ttf";
const LOGO: &str = "logo.png";
const OVERLAY: &str = "overlay.png";

/// Fonts, images and text stamped onto every card. Loaded once, up front,
/// so a composition never starts drawing with a missing resource.
#[derive(Clone)]
pub struct BrandAssets {
    pub headline_font: FontArc,
    pub brand_font: FontArc,
    pub logo: RgbaImage,
    pub overlay: RgbaImage,
    pub brand_text: String,
}

impl std::fmt::Debug for BrandAssets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BrandAssets")
            .field("logo", &self.logo.dimensions())
            .field("overlay", &self.overlay.dimensions())
            .field("brand_text", &self.brand_text)
            .finish_non_exhaustive()
    }
}

impl BrandAssets {
    /// Load the standard asset layout from `dir`:
    /// `fonts/headline.ttf`, `fonts/brand.ttf`, `logo.png`, `overlay.png`
    pub fn load(dir: &Path, brand_text: impl Into<String>) -> Result<Self> {
        let assets = Self {
            headline_font: load_font(&dir.join(HEADLINE_FONT))?,
            brand_font: load_font(&dir.join(BRAND_FONT))?,
            logo: load_image(&dir.join(LOGO))?,
            overlay: load_image(&dir.join(OVERLAY))?,
            brand_text: brand_text.into(),
        };

        tracing::info!(
            "[COMPOSER] Loaded brand assets from {} (logo {}x{}, overlay {}x{})",
            dir.display(),
            assets.logo.width(),
            assets.logo.height(),
            assets.overlay.width(),
            assets.overlay.height()
        );
        Ok(assets)
    }
}

fn load_font(path: &Path) -> Result<FontArc> {
    let bytes = std::fs::read(path).map_err(|source| ComposeError::Io {
        path: path.display().to_string(),
        source,
    })?;
    FontArc::try_from_vec(bytes).map_err(|_| ComposeError::Font {
        path: path.display().to_string(),
    })
}

fn load_image(path: &Path) -> Result<RgbaImage> {
    let image: DynamicImage = image::open(path).map_err(|source| ComposeError::Asset {
        path: path.display().to_string(),
        source,
    })?;
    if image.width() == 0 || image.height() == 0 {
        return Err(ComposeError::EmptyImage);
    }
    Ok(image.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_directory_is_an_io_error() {
        let err = BrandAssets::load(Path::new("/nonexistent/brand-assets"), "Brand").unwrap_err();
        match err {
            ComposeError::Io { path, .. } => assert!(path.ends_with("fonts/headline.ttf")),
            other => panic!("unexpected error: {other}"),
        }
    }
}
