use std::io::Cursor;

use ab_glyph::{Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::{
    imageops::{self, FilterType},
    DynamicImage, ImageFormat, Rgba, RgbaImage,
};
use imageproc::{
    drawing::{draw_filled_rect_mut, draw_text_mut},
    rect::Rect,
};

use crate::{
    assets::BrandAssets,
    crop::cover_crop,
    layout::{find_highlights, fit_text, FitOptions, TextLayout, TextMeasure},
    ComposeError, EncodedImage, Result,
};

const BACKGROUND: Rgba<u8> = Rgba([11, 31, 58, 255]);
const ACCENT: Rgba<u8> = Rgba([230, 57, 70, 255]);
const HEADLINE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BRAND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const SHADOW: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Fixed card layout, in pixels unless noted
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CardGeometry {
    pub size: u32,
    /// Fraction of the canvas height given to the photo, measured from the bottom
    pub image_fraction: f32,
    pub side_margin: f32,
    pub top_margin: f32,
    pub bottom_padding: f32,
    pub separator_height: u32,
    pub max_font_size: f32,
    pub min_font_size: f32,
    pub font_step: f32,
    pub line_height_factor: f32,
    pub edge_inset: u32,
    pub logo_height: u32,
    pub brand_font_size: f32,
    pub shadow_offset: i32,
}

impl Default for CardGeometry {
    fn default() -> Self {
        Self {
            size: 1080,
            image_fraction: 0.7,
            side_margin: 50.0,
            top_margin: 40.0,
            bottom_padding: 30.0,
            separator_height: 8,
            max_font_size: 72.0,
            min_font_size: 32.0,
            font_step: 2.0,
            line_height_factor: 1.2,
            edge_inset: 40,
            logo_height: 64,
            brand_font_size: 30.0,
            shadow_offset: 2,
        }
    }
}

impl CardGeometry {
    pub fn image_height(&self) -> u32 {
        (self.size as f32 * self.image_fraction).round() as u32
    }

    pub fn text_height(&self) -> u32 {
        self.size - self.image_height()
    }

    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            max_width: self.size as f32 - 2.0 * self.side_margin,
            max_height: self.text_height() as f32 - self.top_margin - self.bottom_padding,
            max_font_size: self.max_font_size,
            min_font_size: self.min_font_size,
            step: self.font_step,
            line_height_factor: self.line_height_factor,
        }
    }
}

/// Advance-width measurement against a loaded font
pub struct FontMeasure<'a> {
    font: &'a FontArc,
}

impl<'a> FontMeasure<'a> {
    pub fn new(font: &'a FontArc) -> Self {
        Self { font }
    }
}

impl TextMeasure for FontMeasure<'_> {
    fn text_width(&self, font_size: f32, text: &str) -> f32 {
        let scaled = self.font.as_scaled(PxScale::from(font_size));
        let mut width = 0.0;
        let mut previous: Option<GlyphId> = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = previous {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            previous = Some(id);
        }
        width
    }
}

/// Render one card and encode it as PNG.
///
/// Drawing order is fixed: background, photo, separator, highlights, headline,
/// overlay, logo, brand text.
pub fn compose(
    source: &DynamicImage,
    headline: &str,
    highlights: &[String],
    assets: &BrandAssets,
    geometry: &CardGeometry,
) -> Result<EncodedImage> {
    if source.width() == 0 || source.height() == 0 {
        return Err(ComposeError::EmptyImage);
    }

    let size = geometry.size;
    let mut canvas = RgbaImage::from_pixel(size, size, BACKGROUND);

    draw_photo(&mut canvas, source, geometry);
    draw_separator(&mut canvas, geometry);

    let measure = FontMeasure::new(&assets.headline_font);
    let layout = fit_text(&measure, headline, &geometry.fit_options());
    tracing::debug!(
        "[COMPOSER] Headline fitted at {}px over {} lines",
        layout.font_size,
        layout.lines.len()
    );
    draw_headline(&mut canvas, &layout, highlights, &measure, &assets.headline_font, geometry);

    draw_overlay(&mut canvas, &assets.overlay);
    draw_logo(&mut canvas, &assets.logo, geometry);
    draw_brand_text(&mut canvas, &assets.brand_text, &assets.brand_font, geometry);

    encode_png(canvas)
}

fn draw_photo(canvas: &mut RgbaImage, source: &DynamicImage, geometry: &CardGeometry) {
    let (width, height) = (geometry.size, geometry.image_height());
    let rect = cover_crop(source.width(), source.height(), width, height);
    let cropped = source.crop_imm(rect.x, rect.y, rect.width, rect.height).to_rgba8();
    let scaled = imageops::resize(&cropped, width, height, FilterType::Lanczos3);
    imageops::overlay(canvas, &scaled, 0, geometry.text_height() as i64);
}

fn draw_separator(canvas: &mut RgbaImage, geometry: &CardGeometry) {
    let bar = geometry.separator_height.max(1);
    let top = geometry.text_height() as i32 - (bar / 2) as i32;
    draw_filled_rect_mut(canvas, Rect::at(0, top).of_size(geometry.size, bar), ACCENT);
}

/// Highlights for a line are painted before that line's glyphs
/// Horizontal extent `(x, width)` of each highlight on one line, exactly as
/// wide as the matched text
fn highlight_boxes(
    line: &str,
    highlights: &[String],
    measure: &impl TextMeasure,
    font_size: f32,
    left: f32,
) -> Vec<(f32, f32)> {
    find_highlights(line, highlights)
        .into_iter()
        .map(|span| {
            let x = left + measure.text_width(font_size, &line[..span.start]);
            let width = measure.text_width(font_size, &line[span.start..span.end]);
            (x, width)
        })
        .collect()
}

fn draw_headline(
    canvas: &mut RgbaImage,
    layout: &TextLayout,
    highlights: &[String],
    measure: &FontMeasure<'_>,
    font: &FontArc,
    geometry: &CardGeometry,
) {
    let options = geometry.fit_options();
    let block_width = layout
        .lines
        .iter()
        .map(|line| measure.text_width(layout.font_size, line))
        .fold(0.0_f32, f32::max);
    let left = (geometry.size as f32 - block_width) / 2.0;
    let top = geometry.top_margin + (options.max_height - layout.total_height()).max(0.0) / 2.0;
    let glyph_offset = (layout.line_height - layout.font_size) / 2.0;
    let scale = PxScale::from(layout.font_size);

    for (index, line) in layout.lines.iter().enumerate() {
        let line_top = top + index as f32 * layout.line_height;

        for (x, width) in highlight_boxes(line, highlights, measure, layout.font_size, left) {
            fill_rect(canvas, x, line_top, width, layout.line_height, ACCENT);
        }

        draw_text_mut(
            canvas,
            HEADLINE,
            left.round() as i32,
            (line_top + glyph_offset).round() as i32,
            scale,
            font,
            line,
        );
    }
}

fn fill_rect(canvas: &mut RgbaImage, x: f32, y: f32, width: f32, height: f32, color: Rgba<u8>) {
    let (w, h) = (width.round(), height.round());
    if w < 1.0 || h < 1.0 {
        return;
    }
    let rect = Rect::at(x.round() as i32, y.round() as i32).of_size(w as u32, h as u32);
    draw_filled_rect_mut(canvas, rect, color);
}

fn draw_overlay(canvas: &mut RgbaImage, overlay: &RgbaImage) {
    if overlay.dimensions() == canvas.dimensions() {
        imageops::overlay(canvas, overlay, 0, 0);
    } else {
        let resized = imageops::resize(overlay, canvas.width(), canvas.height(), FilterType::Triangle);
        imageops::overlay(canvas, &resized, 0, 0);
    }
}

fn draw_logo(canvas: &mut RgbaImage, logo: &RgbaImage, geometry: &CardGeometry) {
    let height = geometry.logo_height.max(1);
    let width = ((logo.width() as f64 * height as f64 / logo.height().max(1) as f64).round() as u32).max(1);
    let scaled = imageops::resize(logo, width, height, FilterType::Lanczos3);

    let x = geometry.edge_inset as i64;
    let y = geometry.size as i64 - geometry.edge_inset as i64 - height as i64;
    imageops::overlay(canvas, &scaled, x, y);
}

fn draw_brand_text(canvas: &mut RgbaImage, text: &str, font: &FontArc, geometry: &CardGeometry) {
    if text.trim().is_empty() {
        return;
    }

    let font_size = geometry.brand_font_size;
    let width = FontMeasure::new(font).text_width(font_size, text);
    let x = (geometry.size as f32 - geometry.edge_inset as f32 - width).round() as i32;
    let y = (geometry.size as f32 - geometry.edge_inset as f32 - font_size).round() as i32;
    let scale = PxScale::from(font_size);
    let offset = geometry.shadow_offset;

    draw_text_mut(canvas, SHADOW, x + offset, y + offset, scale, font, text);
    draw_text_mut(canvas, BRAND, x, y, scale, font, text);
}

fn encode_png(canvas: RgbaImage) -> Result<EncodedImage> {
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(canvas)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .map_err(ComposeError::Encode)?;
    Ok(EncodedImage::from_png(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const SYSTEM_FONTS: &[&str] = &[
        "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
        "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
        "/Library/Fonts/Arial.ttf",
    ];

    fn system_font() -> Option<FontArc> {
        SYSTEM_FONTS
            .iter()
            .map(Path::new)
            .find(|p| p.exists())
            .and_then(|p| std::fs::read(p).ok())
            .and_then(|bytes| FontArc::try_from_vec(bytes).ok())
    }

    fn test_assets(font: FontArc) -> BrandAssets {
        BrandAssets {
            headline_font: font.clone(),
            brand_font: font,
            logo: RgbaImage::from_pixel(200, 100, Rgba([0, 255, 0, 255])),
            overlay: RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0])),
            brand_text: "Daily Brief".to_string(),
        }
    }

    struct Monospace;

    impl TextMeasure for Monospace {
        fn text_width(&self, font_size: f32, text: &str) -> f32 {
            text.chars().count() as f32 * font_size * 0.5
        }
    }

    #[test]
    fn highlight_box_matches_measured_phrase_width() {
        let boxes = highlight_boxes(
            "Rates hold steady",
            &["hold".to_string()],
            &Monospace,
            20.0,
            100.0,
        );
        // "Rates " is 6 chars, "hold" is 4, at 10px each
        assert_eq!(boxes, [(160.0, 40.0)]);
    }

    #[test]
    fn geometry_splits_canvas_seventy_thirty() {
        let geometry = CardGeometry::default();
        assert_eq!(geometry.image_height(), 756);
        assert_eq!(geometry.text_height(), 324);

        let options = geometry.fit_options();
        assert_eq!(options.max_width, 980.0);
        assert_eq!(options.max_height, 254.0);
    }

    #[test]
    fn composes_square_png_with_photo_and_logo() {
        let Some(font) = system_font() else {
            eprintln!("no system font available, skipping");
            return;
        };
        let assets = test_assets(font);
        let geometry = CardGeometry::default();
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(1600, 900, Rgba([200, 0, 0, 255])));

        let encoded = compose(
            &source,
            "Markets rally as rates hold steady",
            &["rates".to_string()],
            &assets,
            &geometry,
        )
        .unwrap();
        let decoded = image::load_from_memory(encoded.as_bytes()).unwrap().to_rgba8();

        assert_eq!(decoded.dimensions(), (1080, 1080));
        // Center of the photo region carries the source color.
        assert_eq!(decoded.get_pixel(540, 700), &Rgba([200, 0, 0, 255]));
        // Background shows in the top-left corner of the text band.
        assert_eq!(decoded.get_pixel(2, 2), &BACKGROUND);
        // Logo sits inset from the bottom-left corner.
        assert_eq!(decoded.get_pixel(60, 1080 - 40 - 32), &Rgba([0, 255, 0, 255]));
    }

    #[test]
    fn highlight_sits_beneath_headline_start() {
        let Some(font) = system_font() else {
            eprintln!("no system font available, skipping");
            return;
        };
        let assets = test_assets(font);
        let geometry = CardGeometry::default();
        let source = DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 100, Rgba([0, 0, 255, 255])));

        let plain = compose(&source, "Storm", &[], &assets, &geometry).unwrap();
        let marked = compose(&source, "Storm", &["storm".to_string()], &assets, &geometry).unwrap();

        assert_ne!(plain, marked);
    }

    #[test]
    fn zero_sized_source_is_rejected() {
        let Some(font) = system_font() else {
            return;
        };
        let assets = test_assets(font);
        let source = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        let err = compose(&source, "x", &[], &assets, &CardGeometry::default()).unwrap_err();
        assert!(matches!(err, ComposeError::EmptyImage));
    }
}
