use serde::{Deserialize, Serialize};

/// Width in pixels below which the layout is treated as mobile
const MOBILE_BREAKPOINT_PX: u32 = 768;

/// Approximate pixel width of one terminal column
const COLUMN_WIDTH_PX: u32 = 8;

/// Resolved viewport class; selects canvas size, sampling density and particle budget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Viewport {
    Mobile,
    Desktop,
}

impl Viewport {
    pub fn name(&self) -> &str {
        match self {
            Viewport::Mobile => "Mobile",
            Viewport::Desktop => "Desktop",
        }
    }

    /// Off-screen canvas dimensions (width, height)
    pub fn canvas_size(&self) -> (u32, u32) {
        match self {
            Viewport::Mobile => (512, 256),
            Viewport::Desktop => (1024, 512),
        }
    }

    /// Font size in pixels for the rasterized text
    pub fn font_px(&self) -> u32 {
        match self {
            Viewport::Mobile => 80,
            Viewport::Desktop => 130,
        }
    }

    /// Pixel stride for the sampler scan (denser on the larger canvas)
    pub fn stride(&self) -> u32 {
        match self {
            Viewport::Mobile => 3,
            Viewport::Desktop => 2,
        }
    }

    /// Maximum number of particles emitted
    pub fn particle_cap(&self) -> usize {
        match self {
            Viewport::Mobile => 8000,
            Viewport::Desktop => 14000,
        }
    }

    /// Base particle size; the rendered point size is this times 0.06
    pub fn particle_size(&self) -> f32 {
        match self {
            Viewport::Mobile => 3.0,
            Viewport::Desktop => 4.0,
        }
    }
}

/// Viewport as requested on the command line or in the config
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ViewportMode {
    /// Pick from the terminal width at startup
    #[default]
    Auto,
    Mobile,
    Desktop,
}

impl ViewportMode {
    /// Resolve to a concrete viewport given the terminal width in columns
    pub fn resolve(&self, terminal_columns: u16) -> Viewport {
        match self {
            ViewportMode::Mobile => Viewport::Mobile,
            ViewportMode::Desktop => Viewport::Desktop,
            ViewportMode::Auto => {
                if (terminal_columns as u32) * COLUMN_WIDTH_PX < MOBILE_BREAKPOINT_PX {
                    Viewport::Mobile
                } else {
                    Viewport::Desktop
                }
            }
        }
    }
}

/// Strongest fade still allowed; 1.0 would stop the dispersal fade
const MAX_FADE_FACTOR: f32 = 0.999;

/// Per-frame physics constants for the phase animator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationSettings {
    // === Forming ===
    /// Fraction of the remaining distance closed each frame (0.01-0.5)
    pub ease_factor: f32,

    // === Glowing ===
    /// Amplitude of the sinusoidal pulse (0.0-0.5)
    pub glow_amplitude: f32,
    /// Pulse angular frequency in radians per second (0.0-20.0)
    pub glow_frequency: f32,
    /// Phase shift per particle index (0.0-1.0)
    pub index_phase: f32,
    /// Per-particle, per-frame probability of a spark jump (0.0-0.2)
    pub spark_probability: f32,
    /// Total width of the spark displacement, centered on zero (0.0-2.0)
    pub spark_spread: f32,

    // === Dispersing ===
    /// Base radial push per frame (0.0-2.0)
    pub disperse_force: f32,
    /// Multiplier applied to point size and opacity each frame (0.9-0.999)
    pub fade_factor: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            ease_factor: 0.09,
            glow_amplitude: 0.06,
            glow_frequency: 6.0,
            index_phase: 0.1,
            spark_probability: 0.015,
            spark_spread: 0.6,
            disperse_force: 0.25,
            fade_factor: 0.99,
        }
    }
}

impl AnimationSettings {
    /// Clamp every value into its documented range
    pub fn sanitized(&self) -> Self {
        Self {
            ease_factor: self.ease_factor.clamp(0.01, 0.5),
            glow_amplitude: self.glow_amplitude.clamp(0.0, 0.5),
            glow_frequency: self.glow_frequency.clamp(0.0, 20.0),
            index_phase: self.index_phase.clamp(0.0, 1.0),
            spark_probability: self.spark_probability.clamp(0.0, 0.2),
            spark_spread: self.spark_spread.clamp(0.0, 2.0),
            disperse_force: self.disperse_force.clamp(0.0, 2.0),
            fade_factor: self.fade_factor.clamp(0.9, MAX_FADE_FACTOR),
        }
    }
}
