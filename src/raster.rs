use crate::error::RasterError;
use crate::settings::Viewport;
use cosmic_text::{fontdb, Attrs, Buffer, Color, Family, FontSystem, Metrics, Shaping, SwashCache, Weight, Wrap};
use image::{Rgba, RgbaImage};
use std::path::Path;

/// Largest canvas we are willing to allocate (bytes of RGBA data)
const MAX_CANVAS_BYTES: u64 = 64 * 1024 * 1024;

const BACKGROUND: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Bold serif face shipped with the binary so output never depends on installed fonts
static SERIF_BOLD: &[u8] = include_bytes!("../assets/fonts/DejaVuSerif-Bold.ttf");
const SERIF_FAMILY: &str = "DejaVu Serif";

const LINE_HEIGHT_SCALE: f32 = 1.2;

/// Canvas geometry for one rasterization
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasSpec {
    pub width: u32,
    pub height: u32,
    pub font_px: f32,
}

impl CanvasSpec {
    pub fn for_viewport(viewport: Viewport) -> Self {
        let (width, height) = viewport.canvas_size();
        Self {
            width,
            height,
            font_px: viewport.font_px() as f32,
        }
    }
}

/// One run of glyph coverage reported by the shaper
#[derive(Debug, Clone, Copy)]
struct InkRect {
    x: i32,
    y: i32,
    w: u32,
    h: u32,
    coverage: u8,
}

/// Shaping and glyph cache for the embedded serif face
struct TextRasterizer {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl TextRasterizer {
    fn new() -> Result<Self, RasterError> {
        let mut db = fontdb::Database::new();
        db.load_font_data(SERIF_BOLD.to_vec());
        if db.len() == 0 {
            return Err(RasterError::FontUnavailable);
        }
        db.set_serif_family(SERIF_FAMILY);

        Ok(Self {
            font_system: FontSystem::new_with_locale_and_db("en-US".to_string(), db),
            swash_cache: SwashCache::new(),
        })
    }

    /// Shape `text` on a single unwrapped line and collect its coverage
    fn shape(&mut self, text: &str, font_px: f32) -> Vec<InkRect> {
        let metrics = Metrics::new(font_px, font_px * LINE_HEIGHT_SCALE);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_wrap(&mut self.font_system, Wrap::None);
        buffer.set_size(&mut self.font_system, None, None);

        let attrs = Attrs::new().family(Family::Serif).weight(Weight::BOLD);
        buffer.set_text(&mut self.font_system, text, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let mut ink = Vec::new();
        buffer.draw(
            &mut self.font_system,
            &mut self.swash_cache,
            Color::rgb(255, 255, 255),
            |x, y, w, h, color| {
                if color.a() > 0 {
                    ink.push(InkRect {
                        x,
                        y,
                        w,
                        h,
                        coverage: color.a(),
                    });
                }
            },
        );
        ink
    }
}

/// Draw `text` in white on black, its ink centered on the canvas
pub fn rasterize(text: &str, spec: CanvasSpec) -> Result<RgbaImage, RasterError> {
    let bytes = spec.width as u64 * spec.height as u64 * 4;
    if bytes == 0 || bytes > MAX_CANVAS_BYTES {
        return Err(RasterError::ContextUnavailable {
            width: spec.width,
            height: spec.height,
        });
    }

    let mut canvas = RgbaImage::from_pixel(spec.width, spec.height, BACKGROUND);
    let ink = TextRasterizer::new()?.shape(text, spec.font_px);
    let Some((x0, y0, x1, y1)) = ink_bounds(&ink) else {
        return Ok(canvas);
    };

    let dx = (spec.width as i32 - (x1 - x0)) / 2 - x0;
    let dy = (spec.height as i32 - (y1 - y0)) / 2 - y0;
    for rect in &ink {
        paint(&mut canvas, rect, dx, dy);
    }

    Ok(canvas)
}

/// Rasterize for a viewport class
pub fn rasterize_for(text: &str, viewport: Viewport) -> Result<RgbaImage, RasterError> {
    rasterize(text, CanvasSpec::for_viewport(viewport))
}

/// Write the bitmap as a PNG for inspection
pub fn save_bitmap(bitmap: &RgbaImage, path: &Path) -> Result<(), RasterError> {
    bitmap.save(path)?;
    Ok(())
}

/// Exclusive bounding box (x0, y0, x1, y1) of all coverage
fn ink_bounds(ink: &[InkRect]) -> Option<(i32, i32, i32, i32)> {
    ink.iter().fold(None, |bounds, r| {
        let (rx1, ry1) = (r.x + r.w as i32, r.y + r.h as i32);
        Some(match bounds {
            None => (r.x, r.y, rx1, ry1),
            Some((x0, y0, x1, y1)) => (x0.min(r.x), y0.min(r.y), x1.max(rx1), y1.max(ry1)),
        })
    })
}

/// Coverage becomes the gray level; overlapping glyphs keep the brighter value
fn paint(canvas: &mut RgbaImage, rect: &InkRect, dx: i32, dy: i32) {
    let (w, h) = canvas.dimensions();
    for py in rect.y + dy..rect.y + dy + rect.h as i32 {
        for px in rect.x + dx..rect.x + dx + rect.w as i32 {
            if px < 0 || py < 0 || px as u32 >= w || py as u32 >= h {
                continue;
            }
            let pixel = canvas.get_pixel_mut(px as u32, py as u32);
            let level = pixel[0].max(rect.coverage);
            *pixel = Rgba([level, level, level, 255]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(canvas: &RgbaImage) -> Option<(u32, u32, u32, u32)> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (x, y, px) in canvas.enumerate_pixels() {
            if px[0] > 20 {
                bounds = Some(match bounds {
                    None => (x, y, x, y),
                    Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
                });
            }
        }
        bounds
    }

    fn lit_pixels(canvas: &RgbaImage) -> usize {
        canvas.pixels().filter(|px| px[0] > 20).count()
    }

    #[test]
    fn test_canvas_size_per_viewport() {
        let mobile = rasterize_for("AB", Viewport::Mobile).unwrap();
        assert_eq!(mobile.dimensions(), (512, 256));

        let desktop = rasterize_for("AB", Viewport::Desktop).unwrap();
        assert_eq!(desktop.dimensions(), (1024, 512));
    }

    #[test]
    fn test_text_is_centered() {
        let canvas = rasterize_for("HH", Viewport::Desktop).unwrap();
        let (x0, y0, x1, y1) = bounds(&canvas).expect("text should produce ink");

        let left_margin = x0 as i64;
        let right_margin = 1023 - x1 as i64;
        assert!((left_margin - right_margin).abs() <= 2);

        let top_margin = y0 as i64;
        let bottom_margin = 511 - y1 as i64;
        assert!((top_margin - bottom_margin).abs() <= 2);
    }

    #[test]
    fn test_text_scales_with_canvas() {
        let mobile = rasterize_for("I", Viewport::Mobile).unwrap();
        let desktop = rasterize_for("I", Viewport::Desktop).unwrap();
        let (_, my0, _, my1) = bounds(&mobile).unwrap();
        let (_, dy0, _, dy1) = bounds(&desktop).unwrap();
        assert!(dy1 - dy0 > my1 - my0);
    }

    #[test]
    fn test_lowercase_has_its_own_shapes() {
        let lower = rasterize_for("sandesh", Viewport::Desktop).unwrap();
        let upper = rasterize_for("SANDESH", Viewport::Desktop).unwrap();
        assert_ne!(lower.as_raw(), upper.as_raw());
        assert!(lit_pixels(&lower) > 0);
    }

    #[test]
    fn test_accents_add_ink() {
        let plain = rasterize_for("Jose", Viewport::Desktop).unwrap();
        let accented = rasterize_for("José", Viewport::Desktop).unwrap();
        assert!(lit_pixels(&accented) > lit_pixels(&plain));
    }

    #[test]
    fn test_empty_text_is_blank() {
        let canvas = rasterize_for("", Viewport::Mobile).unwrap();
        assert!(bounds(&canvas).is_none());
        let canvas = rasterize_for("   ", Viewport::Mobile).unwrap();
        assert!(bounds(&canvas).is_none());
    }

    #[test]
    fn test_zero_sized_canvas_is_unavailable() {
        let spec = CanvasSpec {
            width: 0,
            height: 256,
            font_px: 80.0,
        };
        let err = rasterize("AB", spec).unwrap_err();
        assert!(matches!(err, RasterError::ContextUnavailable { width: 0, height: 256 }));
    }

    #[test]
    fn test_oversized_canvas_is_unavailable() {
        let spec = CanvasSpec {
            width: 100_000,
            height: 100_000,
            font_px: 80.0,
        };
        assert!(rasterize("AB", spec).is_err());
    }

    #[test]
    fn test_ink_bounds_spans_all_rects() {
        let ink = [
            InkRect { x: 3, y: 4, w: 1, h: 1, coverage: 255 },
            InkRect { x: -2, y: 9, w: 2, h: 3, coverage: 40 },
        ];
        assert_eq!(ink_bounds(&ink), Some((-2, 4, 4, 12)));
        assert_eq!(ink_bounds(&[]), None);
    }

    #[test]
    fn test_save_bitmap_writes_png() {
        let canvas = rasterize_for("A", Viewport::Mobile).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bitmap.png");
        save_bitmap(&canvas, &path).unwrap();
        let reloaded = image::open(&path).unwrap().to_rgba8();
        assert_eq!(reloaded.dimensions(), (512, 256));
    }
}
