use glam::{vec3, UVec2, Vec3};

/// Tiny PCG-based hash; used wherever kernels need deterministic
/// "randomness" (block offsets, debug colors).
#[derive(Copy, Clone)]
pub struct Noise {
    state: u32,
}

impl Noise {
    pub fn new(seed: u32, id: UVec2) -> Self {
        Self {
            state: seed
                ^ 48619u32.wrapping_mul(id.x)
                ^ 95461u32.wrapping_mul(id.y),
        }
    }

    /// Generates a uniform sample in range `<0.0, 1.0>`.
    pub fn sample(&mut self) -> f32 {
        (self.sample_int() as f32) / (u32::MAX as f32)
    }

    /// Generates a uniform sample in range `<0, u32::MAX>`.
    pub fn sample_int(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(747796405)
            .wrapping_add(2891336453);

        let word = ((self.state >> ((self.state >> 28) + 4)) ^ self.state)
            .wrapping_mul(277803737);

        (word >> 22) ^ word
    }

    /// Generates a random, reasonably saturated color.
    pub fn sample_color(&mut self) -> Vec3 {
        vec3(
            0.2 + 0.8 * self.sample(),
            0.2 + 0.8 * self.sample(),
            0.2 + 0.8 * self.sample(),
        )
    }
}
