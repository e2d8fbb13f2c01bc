/// A particle cloud: current positions and the text-shaped targets they animate against.
///
/// Both buffers always have the same length and index `i` of one always pairs
/// with index `i` of the other; particles are only ever appended together.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleField {
    positions: Vec<[f32; 3]>,
    targets: Vec<[f32; 3]>,
}

impl ParticleField {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            positions: Vec::with_capacity(capacity),
            targets: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, position: [f32; 3], target: [f32; 3]) {
        self.positions.push(position);
        self.targets.push(target);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    pub fn targets(&self) -> &[[f32; 3]] {
        &self.targets
    }

    /// Mutable positions alongside read-only targets for the frame update
    pub fn split_mut(&mut self) -> (&mut [[f32; 3]], &[[f32; 3]]) {
        (&mut self.positions, &self.targets)
    }
}

/// Point material shared by every particle in the cloud
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Point size in world units
    pub size: f32,
    /// 0.0 (invisible) to 1.0
    pub opacity: f32,
}

/// World-units-per-particle-size factor for the rendered point
const POINT_SIZE_SCALE: f32 = 0.06;

const INITIAL_OPACITY: f32 = 0.9;

impl Material {
    pub fn new(particle_size: f32) -> Self {
        Self {
            size: particle_size * POINT_SIZE_SCALE,
            opacity: INITIAL_OPACITY,
        }
    }

    /// Multiply size and opacity by `factor`
    pub fn fade(&mut self, factor: f32) {
        self.size *= factor;
        self.opacity *= factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_buffers_paired() {
        let mut field = ParticleField::with_capacity(2);
        field.push([1.0, 2.0, 3.0], [0.0, 0.0, 0.0]);
        field.push([4.0, 5.0, 6.0], [1.0, 1.0, 1.0]);
        assert_eq!(field.len(), 2);
        assert_eq!(field.positions().len(), field.targets().len());
        assert_eq!(field.targets()[1], [1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_material_fade() {
        let mut material = Material::new(4.0);
        assert!((material.size - 0.24).abs() < 1e-6);
        material.fade(0.5);
        assert!((material.size - 0.12).abs() < 1e-6);
        assert!((material.opacity - 0.45).abs() < 1e-6);
    }
}
