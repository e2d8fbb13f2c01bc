use crate::animator::PhaseAnimator;
use crate::field::{Material, ParticleField};
use crate::phase::{AnimationClock, AnimationPhase, PhaseMachine, PhaseSchedule, PhaseTimers};
use crate::raster;
use crate::sampler::{sample_particles, SamplerParams};
use crate::settings::{AnimationSettings, Viewport};
use crate::surface::{DotCanvas, Surface};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use std::time::Duration;

/// How long the overlay takes to dim once dispersal starts
const OVERLAY_DIM_SECS: f32 = 1.0;

/// Overlay brightness reached at the end of the dim
const OVERLAY_DIM_TARGET: f32 = 0.8;

/// Everything needed to mount the landing animation
pub struct MountOptions {
    pub text: String,
    pub viewport: Viewport,
    pub schedule: PhaseSchedule,
    pub settings: AnimationSettings,
    /// Terminal canvas size in character cells
    pub surface_size: (u16, u16),
}

/// Owns the landing animation's resources for one run.
///
/// Holds the rendering surface, the particle buffers, the three phase
/// timers and the completion callback. `teardown` releases all of them;
/// it runs automatically on drop and when the schedule completes.
pub struct LandingHost {
    surface: Option<Surface>,
    field: Option<ParticleField>,
    material: Material,
    timers: PhaseTimers,
    machine: PhaseMachine,
    clock: AnimationClock,
    animator: PhaseAnimator,
    rng: StdRng,
    on_complete: Option<Box<dyn FnOnce()>>,
    running: bool,
    phase_entered_at: Duration,
    last_elapsed: Duration,
}

impl LandingHost {
    /// Rasterize, sample and arm the timers. Never fails: an unavailable
    /// rasterization context yields an empty field that still completes.
    pub fn mount(options: MountOptions, mut rng: StdRng, on_complete: Box<dyn FnOnce()>) -> Self {
        let field = match raster::rasterize_for(&options.text, options.viewport) {
            Ok(bitmap) => {
                let params = SamplerParams::for_viewport(options.viewport);
                sample_particles(&bitmap, &params, &mut rng)
            }
            Err(e) => {
                warn!("{}; continuing without particles", e);
                ParticleField::empty()
            }
        };

        if field.is_empty() {
            warn!("no particles sampled from {:?}", options.text);
        }
        info!(
            "mounted {:?} ({} viewport): {} particles",
            options.text,
            options.viewport.name(),
            field.len()
        );

        let (width, height) = options.surface_size;
        Self {
            surface: Some(Surface::new(width, height)),
            field: Some(field),
            material: Material::new(options.viewport.particle_size()),
            timers: PhaseTimers::arm(&options.schedule),
            machine: PhaseMachine::default(),
            clock: AnimationClock::start(),
            animator: PhaseAnimator::new(options.settings),
            rng,
            on_complete: Some(on_complete),
            running: true,
            phase_entered_at: Duration::ZERO,
            last_elapsed: Duration::ZERO,
        }
    }

    /// Run one frame against the wall clock
    pub fn tick(&mut self) -> bool {
        let elapsed = self.clock.elapsed();
        self.tick_at(elapsed)
    }

    /// Run one frame as if `elapsed` had passed since mount.
    /// Returns whether the animation is still running.
    pub fn tick_at(&mut self, elapsed: Duration) -> bool {
        if !self.running {
            return false;
        }
        self.last_elapsed = elapsed;

        for phase in self.timers.poll(elapsed) {
            if !self.machine.enter(phase) {
                warn!("ignoring out-of-order transition to {}", phase.name());
                continue;
            }
            debug!("phase {} at {:.3}s", phase.name(), elapsed.as_secs_f32());
            self.phase_entered_at = elapsed;

            if phase == AnimationPhase::Complete {
                self.complete();
                return false;
            }
        }

        if let Some(field) = self.field.as_mut() {
            self.animator.step(
                self.machine.phase(),
                elapsed.as_secs_f32(),
                field,
                &mut self.material,
                &mut self.rng,
            );
        }
        true
    }

    fn complete(&mut self) {
        info!("landing animation complete");
        self.teardown();
        if let Some(callback) = self.on_complete.take() {
            callback();
        }
    }

    /// Stop the frame loop, cancel pending timers and release the surface and buffers.
    /// The completion callback is dropped without being called if still pending.
    pub fn teardown(&mut self) {
        if !self.running && self.surface.is_none() {
            return;
        }
        self.running = false;
        self.timers.cancel_all();
        self.surface = None;
        self.field = None;
        if self.machine.phase() != AnimationPhase::Complete {
            self.on_complete = None;
            info!("unmounted during {}", self.machine.phase().name());
        }
    }

    /// Update the projection for a new canvas size; particles are left alone
    pub fn resize(&mut self, width: u16, height: u16) {
        if let Some(surface) = self.surface.as_mut() {
            surface.resize(width, height);
            debug!("surface resized to {}x{}", width, height);
        }
    }

    /// Brightness of the overlay, dimming slightly once dispersal begins
    pub fn overlay_brightness(&self) -> f32 {
        match self.machine.phase() {
            AnimationPhase::Dispersing => {
                let since = self.last_elapsed.saturating_sub(self.phase_entered_at).as_secs_f32();
                let t = (since / OVERLAY_DIM_SECS).min(1.0);
                1.0 - (1.0 - OVERLAY_DIM_TARGET) * t
            }
            _ => 1.0,
        }
    }

    /// Final shade for rendered points: material opacity under the overlay
    pub fn brightness(&self) -> f32 {
        self.material.opacity * self.overlay_brightness()
    }

    /// Project the current frame at the surface's own resolution
    pub fn render(&self) -> Option<DotCanvas> {
        let surface = self.surface.as_ref()?;
        let field = self.field.as_ref()?;
        Some(surface.draw(field, &self.material))
    }

    /// Project the current frame at an arbitrary dot resolution
    pub fn render_at(&self, dot_w: usize, dot_h: usize) -> Option<DotCanvas> {
        let surface = self.surface.as_ref()?;
        let field = self.field.as_ref()?;
        Some(surface.draw_points(field, &self.material, dot_w, dot_h))
    }

    pub fn phase(&self) -> AnimationPhase {
        self.machine.phase()
    }

    #[cfg(test)]
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn field(&self) -> Option<&ParticleField> {
        self.field.as_ref()
    }

    pub fn surface(&self) -> Option<&Surface> {
        self.surface.as_ref()
    }

    #[cfg(test)]
    pub fn material(&self) -> &Material {
        &self.material
    }

    #[cfg(test)]
    pub fn pending_timers(&self) -> usize {
        self.timers.pending()
    }

    pub fn elapsed(&self) -> Duration {
        self.last_elapsed
    }
}

impl Drop for LandingHost {
    fn drop(&mut self) {
        self.teardown();
    }
}
