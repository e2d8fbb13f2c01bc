use crate::field::ParticleField;
use crate::settings::Viewport;
use image::RgbaImage;
use rand::Rng;

/// Red-channel value a sampled pixel must exceed to count as text
pub const BRIGHTNESS_THRESHOLD: u8 = 20;

/// Canvas pixels per world unit before scaling
const WORLD_DIVISOR: f32 = 250.0;

/// Scale applied to the normalized canvas coordinate
const WORLD_SCALE: f32 = 15.0;

/// Half-range of the random depth jitter on targets
const Z_JITTER: f32 = 0.25;

/// Half-width of the cube particles are scattered in before forming
const SCATTER_HALF_WIDTH: f32 = 20.0;

/// Scan parameters for converting a bitmap to particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplerParams {
    pub stride: u32,
    pub threshold: u8,
    pub cap: usize,
}

impl SamplerParams {
    pub fn for_viewport(viewport: Viewport) -> Self {
        Self {
            stride: viewport.stride(),
            threshold: BRIGHTNESS_THRESHOLD,
            cap: viewport.particle_cap(),
        }
    }
}

/// Target x/y for a canvas pixel, in world units
pub fn canvas_to_world(x: u32, y: u32, width: u32, height: u32) -> (f32, f32) {
    let (w, h) = (width as f32, height as f32);
    let wx = ((x as f32 / w) - 0.5) * (w / WORLD_DIVISOR);
    let wy = (-(y as f32 / h) + 0.5) * (h / WORLD_DIVISOR);
    (wx * WORLD_SCALE, wy * WORLD_SCALE)
}

/// Scan the bitmap row-major on the stride grid, emitting one particle per bright pixel.
///
/// Emission stops at the cap even if the scan is incomplete, so the set of
/// targets (x and y) depends only on the bitmap and params. The RNG supplies
/// the depth jitter and the initial scatter.
pub fn sample_particles<R: Rng>(bitmap: &RgbaImage, params: &SamplerParams, rng: &mut R) -> ParticleField {
    let (width, height) = bitmap.dimensions();
    let stride = params.stride.max(1) as usize;
    let mut field = ParticleField::with_capacity(params.cap.min(4096));

    'scan: for y in (0..height).step_by(stride) {
        for x in (0..width).step_by(stride) {
            if field.len() >= params.cap {
                break 'scan;
            }
            if bitmap.get_pixel(x, y)[0] <= params.threshold {
                continue;
            }

            let (tx, ty) = canvas_to_world(x, y, width, height);
            let tz = rng.gen_range(-Z_JITTER..=Z_JITTER);
            let start = [
                rng.gen_range(-SCATTER_HALF_WIDTH..=SCATTER_HALF_WIDTH),
                rng.gen_range(-SCATTER_HALF_WIDTH..=SCATTER_HALF_WIDTH),
                rng.gen_range(-SCATTER_HALF_WIDTH..=SCATTER_HALF_WIDTH),
            ];
            field.push(start, [tx, ty, tz]);
        }
    }

    field
}
