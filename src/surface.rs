use crate::braille;
use crate::field::{Material, ParticleField};

/// Perspective camera on the +z axis looking at the origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub fov_deg: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub position_z: f32,
}

impl Camera {
    pub fn new(aspect: f32) -> Self {
        Self {
            fov_deg: 75.0,
            aspect,
            near: 0.1,
            far: 1000.0,
            position_z: 30.0,
        }
    }

    fn focal(&self) -> f32 {
        1.0 / (self.fov_deg.to_radians() * 0.5).tan()
    }

    /// Project a world point to viewport pixel coordinates.
    /// Returns (x, y, depth) or None when the point is clipped.
    pub fn project(&self, point: [f32; 3], viewport_w: f32, viewport_h: f32) -> Option<(f32, f32, f32)> {
        let depth = self.position_z - point[2];
        if depth < self.near || depth > self.far {
            return None;
        }

        let f = self.focal();
        let ndc_x = f / self.aspect * point[0] / depth;
        let ndc_y = f * point[1] / depth;
        if !(-1.0..=1.0).contains(&ndc_x) || !(-1.0..=1.0).contains(&ndc_y) {
            return None;
        }

        let sx = (ndc_x + 1.0) * 0.5 * viewport_w;
        let sy = (1.0 - ndc_y) * 0.5 * viewport_h;
        Some((sx, sy, depth))
    }

    /// On-screen point size for an attenuated world-space size at `depth`
    pub fn point_size_px(&self, size: f32, depth: f32, viewport_h: f32) -> f32 {
        size * (viewport_h * 0.5) / depth
    }
}

/// Dot-resolution hit counts for one frame
#[derive(Debug, Clone)]
pub struct DotCanvas {
    pub width: usize,
    pub height: usize,
    hits: Vec<u16>,
}

impl DotCanvas {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            hits: vec![0; width * height],
        }
    }

    pub fn hits(&self, x: usize, y: usize) -> u16 {
        if x < self.width && y < self.height {
            self.hits[y * self.width + x]
        } else {
            0
        }
    }

    /// Stamp a square of half-width `radius` centered on (x, y)
    pub fn plot(&mut self, x: f32, y: f32, radius: i32) {
        let cx = x.floor() as i64;
        let cy = y.floor() as i64;
        for py in (cy - radius as i64)..=(cy + radius as i64) {
            for px in (cx - radius as i64)..=(cx + radius as i64) {
                if px >= 0 && py >= 0 && (px as usize) < self.width && (py as usize) < self.height {
                    let idx = py as usize * self.width + px as usize;
                    self.hits[idx] = self.hits[idx].saturating_add(1);
                }
            }
        }
    }

    #[cfg(test)]
    pub fn total_hits(&self) -> u64 {
        self.hits.iter().map(|&h| h as u64).sum()
    }
}

/// The rendering target: a terminal canvas measured in character cells
#[derive(Debug, Clone)]
pub struct Surface {
    pub camera: Camera,
    pub width: u16,
    pub height: u16,
}

impl Surface {
    pub fn new(width: u16, height: u16) -> Self {
        let (dot_w, dot_h) = braille::dot_resolution(width, height);
        Self {
            camera: Camera::new(aspect(dot_w, dot_h)),
            width,
            height,
        }
    }

    /// Update size and projection only
    pub fn resize(&mut self, width: u16, height: u16) {
        let (dot_w, dot_h) = braille::dot_resolution(width, height);
        self.width = width;
        self.height = height;
        self.camera.aspect = aspect(dot_w, dot_h);
    }

    /// Project the field onto a dot canvas of the given resolution
    pub fn draw_points(&self, field: &ParticleField, material: &Material, dot_w: usize, dot_h: usize) -> DotCanvas {
        let mut canvas = DotCanvas::new(dot_w, dot_h);
        let (vw, vh) = (dot_w as f32, dot_h as f32);

        for point in field.positions() {
            if let Some((sx, sy, depth)) = self.camera.project(*point, vw, vh) {
                let size_px = self.camera.point_size_px(material.size, depth, vh);
                let radius = ((size_px * 0.5).floor() as i32).clamp(0, 2);
                canvas.plot(sx, sy, radius);
            }
        }
        canvas
    }

    /// Project the field at this surface's own Braille resolution
    pub fn draw(&self, field: &ParticleField, material: &Material) -> DotCanvas {
        let (dot_w, dot_h) = braille::dot_resolution(self.width, self.height);
        self.draw_points(field, material, dot_w, dot_h)
    }
}

fn aspect(dot_w: usize, dot_h: usize) -> f32 {
    if dot_h == 0 {
        1.0
    } else {
        dot_w as f32 / dot_h as f32
    }
}
