use composer::{BrandAssets, CardGeometry, EncodedImage};
use image::DynamicImage;

use super::error::PipelineError;

/// Everything one card needs besides the brand assets
#[derive(Debug, Clone)]
pub struct CompositionJob {
    pub source: DynamicImage,
    pub headline: String,
    pub highlights: Vec<String>,
}

/// Synchronous rendering seam; the pipeline calls it from a blocking thread
pub trait Compositor: Send + Sync {
    fn compose(&self, job: &CompositionJob) -> Result<EncodedImage, PipelineError>;
}

#[derive(Debug, Clone)]
pub struct BrandedCompositor {
    assets: BrandAssets,
    geometry: CardGeometry,
}

impl BrandedCompositor {
    pub fn new(assets: BrandAssets) -> Self {
        Self {
            assets,
            geometry: CardGeometry::default(),
        }
    }

    pub fn with_geometry(assets: BrandAssets, geometry: CardGeometry) -> Self {
        Self { assets, geometry }
    }
}

impl Compositor for BrandedCompositor {
    fn compose(&self, job: &CompositionJob) -> Result<EncodedImage, PipelineError> {
        let encoded = composer::compose(
            &job.source,
            &job.headline,
            &job.highlights,
            &self.assets,
            &self.geometry,
        )?;
        Ok(encoded)
    }
}
