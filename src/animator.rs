use crate::field::{Material, ParticleField};
use crate::phase::AnimationPhase;
use crate::settings::AnimationSettings;
use rand::Rng;

/// Stand-in distance for a particle sitting exactly on the origin
const MIN_DISPERSE_DISTANCE: f32 = 0.001;

/// Per-frame physics for each phase.
///
/// The stepper holds no timing state of its own: the caller tells it which
/// phase is active and how long the animation has been running.
#[derive(Debug, Clone, Default)]
pub struct PhaseAnimator {
    pub settings: AnimationSettings,
}

impl PhaseAnimator {
    pub fn new(settings: AnimationSettings) -> Self {
        Self { settings }
    }

    /// Advance every particle by one frame
    pub fn step<R: Rng>(
        &self,
        phase: AnimationPhase,
        elapsed_secs: f32,
        field: &mut ParticleField,
        material: &mut Material,
        rng: &mut R,
    ) {
        match phase {
            AnimationPhase::Forming => self.form(field),
            AnimationPhase::Glowing => self.glow(elapsed_secs, field, rng),
            AnimationPhase::Dispersing => self.disperse(field, material),
            AnimationPhase::Complete => {}
        }
    }

    /// Ease each particle toward its target by a fixed fraction of the gap
    fn form(&self, field: &mut ParticleField) {
        let ease = self.settings.ease_factor;
        let (positions, targets) = field.split_mut();
        for (pos, target) in positions.iter_mut().zip(targets) {
            for axis in 0..3 {
                pos[axis] += (target[axis] - pos[axis]) * ease;
            }
        }
    }

    /// Pulse around the target, with occasional spark jumps
    fn glow<R: Rng>(&self, elapsed_secs: f32, field: &mut ParticleField, rng: &mut R) {
        let s = &self.settings;
        let half_spread = s.spark_spread * 0.5;
        let (positions, targets) = field.split_mut();

        for (i, (pos, target)) in positions.iter_mut().zip(targets).enumerate() {
            let pulse = (elapsed_secs * s.glow_frequency + i as f32 * s.index_phase).sin() * s.glow_amplitude;
            pos[0] = target[0] + pulse;
            pos[1] = target[1] + pulse;

            if half_spread > 0.0 && rng.gen::<f32>() < s.spark_probability {
                pos[0] += rng.gen_range(-half_spread..=half_spread);
                pos[1] += rng.gen_range(-half_spread..=half_spread);
            }
        }
    }

    /// Push each particle radially away from the origin and fade the material
    fn disperse(&self, field: &mut ParticleField, material: &mut Material) {
        let (positions, _) = field.split_mut();

        for (i, pos) in positions.iter_mut().enumerate() {
            let [dx, dy, dz] = *pos;
            let mut dist = (dx * dx + dy * dy + dz * dz).sqrt();
            if dist == 0.0 {
                dist = MIN_DISPERSE_DISTANCE;
            }

            let force = self.settings.disperse_force * (1.0 + (i as f32 * self.settings.index_phase).sin());
            pos[0] += dx / dist * force;
            pos[1] += dy / dist * force;
            pos[2] += dz / dist * force;
        }

        material.fade(self.settings.fade_factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn distance(a: [f32; 3], b: [f32; 3]) -> f32 {
        ((a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)).sqrt()
    }

    fn scattered_field(rng: &mut StdRng, n: usize) -> ParticleField {
        let mut field = ParticleField::with_capacity(n);
        for _ in 0..n {
            let start = [
                rng.gen_range(-20.0..=20.0),
                rng.gen_range(-20.0..=20.0),
                rng.gen_range(-20.0..=20.0),
            ];
            let target = [
                rng.gen_range(-5.0..=5.0),
                rng.gen_range(-2.0..=2.0),
                rng.gen_range(-0.25..=0.25),
            ];
            field.push(start, target);
        }
        field
    }

    #[test]
    fn test_forming_converges_without_overshoot() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut field = scattered_field(&mut rng, 200);
        let mut material = Material::new(4.0);
        let animator = PhaseAnimator::default();

        let mut previous: Vec<f32> = field
            .positions()
            .iter()
            .zip(field.targets())
            .map(|(p, t)| distance(*p, *t))
            .collect();

        // One second at 60fps
        for frame in 0..60 {
            animator.step(AnimationPhase::Forming, frame as f32 / 60.0, &mut field, &mut material, &mut rng);
            for (i, (p, t)) in field.positions().iter().zip(field.targets()).enumerate() {
                let d = distance(*p, *t);
                assert!(d < previous[i], "particle {i} did not approach its target");
                previous[i] = d;
            }
        }

        // 0.91^60 of the starting gap remains; never reaches zero
        assert!(previous.iter().all(|d| *d > 0.0));
        // Forming leaves the material untouched
        assert_eq!(material, Material::new(4.0));
    }

    #[test]
    fn test_forming_single_step_factor() {
        let mut field = ParticleField::empty();
        field.push([10.0, -10.0, 4.0], [0.0, 0.0, 0.0]);
        let mut material = Material::new(4.0);
        let mut rng = StdRng::seed_from_u64(0);
        PhaseAnimator::default().step(AnimationPhase::Forming, 0.0, &mut field, &mut material, &mut rng);
        let p = field.positions()[0];
        assert!((p[0] - 9.1).abs() < 1e-5);
        assert!((p[1] + 9.1).abs() < 1e-5);
        assert!((p[2] - 3.64).abs() < 1e-5);
    }

    #[test]
    fn test_glowing_stays_near_target() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut field = scattered_field(&mut rng, 500);
        let mut material = Material::new(3.0);
        let animator = PhaseAnimator::default();

        for frame in 0..120 {
            animator.step(AnimationPhase::Glowing, 1.0 + frame as f32 / 60.0, &mut field, &mut material, &mut rng);
            for (p, t) in field.positions().iter().zip(field.targets()) {
                // Pulse (0.06) plus the largest spark (0.3)
                assert!((p[0] - t[0]).abs() <= 0.36 + 1e-5);
                assert!((p[1] - t[1]).abs() <= 0.36 + 1e-5);
            }
        }
    }

    #[test]
    fn test_sparks_jump_a_small_share_of_particles() {
        let settings = AnimationSettings {
            glow_amplitude: 0.0,
            ..Default::default()
        };
        let animator = PhaseAnimator::new(settings);
        let mut rng = StdRng::seed_from_u64(21);
        let mut field = scattered_field(&mut rng, 10_000);
        let mut material = Material::new(4.0);

        animator.step(AnimationPhase::Glowing, 2.0, &mut field, &mut material, &mut rng);

        let mut jumped = 0;
        for (p, t) in field.positions().iter().zip(field.targets()) {
            let (dx, dy) = (p[0] - t[0], p[1] - t[1]);
            assert!(dx.abs() <= 0.3 + 1e-5 && dy.abs() <= 0.3 + 1e-5);
            if dx != 0.0 || dy != 0.0 {
                jumped += 1;
            }
        }
        // 1.5% of 10,000
        assert!((80..=250).contains(&jumped), "{} particles sparked", jumped);
    }

    #[test]
    fn test_glowing_pulse_without_sparks() {
        let settings = AnimationSettings {
            spark_probability: 0.0,
            ..Default::default()
        };
        let animator = PhaseAnimator::new(settings);
        let mut field = ParticleField::empty();
        field.push([9.0, 9.0, 9.0], [1.0, 2.0, 0.1]);
        field.push([9.0, 9.0, 9.0], [1.0, 2.0, 0.1]);
        let mut material = Material::new(4.0);
        let mut rng = StdRng::seed_from_u64(0);

        let elapsed = 1.5f32;
        animator.step(AnimationPhase::Glowing, elapsed, &mut field, &mut material, &mut rng);

        let pulse0 = (elapsed * 6.0).sin() * 0.06;
        let pulse1 = (elapsed * 6.0 + 0.1).sin() * 0.06;
        let p0 = field.positions()[0];
        let p1 = field.positions()[1];
        assert!((p0[0] - (1.0 + pulse0)).abs() < 1e-5);
        assert!((p0[1] - (2.0 + pulse0)).abs() < 1e-5);
        assert!((p1[0] - (1.0 + pulse1)).abs() < 1e-5);
        // Depth is not touched by the pulse
        assert_eq!(p0[2], 9.0);
    }

    #[test]
    fn test_dispersing_pushes_outward_and_fades() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut field = scattered_field(&mut rng, 100);
        let mut material = Material::new(4.0);
        let animator = PhaseAnimator::default();

        let origin_distance = |p: &[f32; 3]| (p[0] * p[0] + p[1] * p[1] + p[2] * p[2]).sqrt();

        for _ in 0..150 {
            let before: Vec<f32> = field.positions().iter().map(origin_distance).collect();
            let (size, opacity) = (material.size, material.opacity);

            animator.step(AnimationPhase::Dispersing, 4.0, &mut field, &mut material, &mut rng);

            assert!(material.size < size);
            assert!(material.opacity < opacity);
            assert!((material.opacity - opacity * 0.99).abs() < 1e-6);
            for (i, p) in field.positions().iter().enumerate() {
                assert!(origin_distance(p) >= before[i]);
            }
        }
        assert!(material.opacity > 0.0);
    }

    #[test]
    fn test_dispersing_origin_particle_stays_finite() {
        let mut field = ParticleField::empty();
        field.push([0.0, 0.0, 0.0], [0.0, 0.0, 0.0]);
        let mut material = Material::new(4.0);
        let mut rng = StdRng::seed_from_u64(0);
        PhaseAnimator::default().step(AnimationPhase::Dispersing, 4.0, &mut field, &mut material, &mut rng);
        assert!(field.positions()[0].iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_empty_field_still_fades() {
        let mut field = ParticleField::empty();
        let mut material = Material::new(3.0);
        let mut rng = StdRng::seed_from_u64(0);
        PhaseAnimator::default().step(AnimationPhase::Dispersing, 4.0, &mut field, &mut material, &mut rng);
        assert!(material.opacity < 0.9);
    }
}
