use crate::surface::DotCanvas;
use ratatui::style::Color;

/// Braille character rendering for high-resolution terminal graphics.
/// Each Braille character represents a 2x4 grid of dots (8 dots total).
///
/// Dot positions and their bit values:
/// ```text
/// (0,0)=0x01  (1,0)=0x08
/// (0,1)=0x02  (1,1)=0x10
/// (0,2)=0x04  (1,2)=0x20
/// (0,3)=0x40  (1,3)=0x80
/// ```
///
/// Unicode Braille patterns: U+2800 to U+28FF (256 patterns)
const BRAILLE_BASE: u32 = 0x2800;

/// Dot position to bit mapping for Braille characters
const BRAILLE_DOTS: [[u8; 4]; 2] = [
    [0x01, 0x02, 0x04, 0x40], // Left column (x=0): rows 0,1,2,3
    [0x08, 0x10, 0x20, 0x80], // Right column (x=1): rows 0,1,2,3
];

/// Gray levels below this are not emitted
const MIN_VISIBLE_LEVEL: u8 = 12;

/// A single rendered Braille cell with position and color
#[derive(Clone, Copy)]
pub struct BrailleCell {
    pub x: u16,
    pub y: u16,
    pub char: char,
    pub color: Color,
}

/// Dot resolution of a canvas measured in character cells
pub fn dot_resolution(canvas_width: u16, canvas_height: u16) -> (usize, usize) {
    (canvas_width as usize * 2, canvas_height as usize * 4)
}

/// Gray level for a cell: brighter with more overlapping points (additive look)
pub fn cell_level(hits: u32, brightness: f32) -> u8 {
    if hits == 0 {
        return 0;
    }
    // Eight dots per cell; stacked points saturate at twice that
    let coverage = (hits as f32 / 16.0).min(1.0);
    let level = 255.0 * brightness.clamp(0.0, 1.0) * (0.6 + 0.4 * coverage);
    level.round() as u8
}

/// Render a dot canvas to Braille characters, gray-shaded by `brightness`
pub fn render_to_braille(
    dots: &DotCanvas,
    canvas_width: u16,
    canvas_height: u16,
    brightness: f32,
) -> Vec<BrailleCell> {
    let mut cells = Vec::new();

    for cy in 0..canvas_height {
        for cx in 0..canvas_width {
            let mut pattern: u8 = 0;
            let mut hits: u32 = 0;

            // Sample the 2x4 dots for this Braille character
            let base_bx = cx as usize * 2;
            let base_by = cy as usize * 4;

            for dx in 0..2 {
                for dy in 0..4 {
                    let h = dots.hits(base_bx + dx, base_by + dy);
                    if h > 0 {
                        pattern |= BRAILLE_DOTS[dx][dy];
                        hits += h as u32;
                    }
                }
            }

            if pattern == 0 {
                continue;
            }

            let level = cell_level(hits, brightness);
            if level < MIN_VISIBLE_LEVEL {
                continue;
            }

            cells.push(BrailleCell {
                x: cx,
                y: cy,
                char: char::from_u32(BRAILLE_BASE + pattern as u32).unwrap_or(' '),
                color: Color::Rgb(level, level, level),
            });
        }
    }

    cells
}
