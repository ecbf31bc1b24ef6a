use glam::{UVec2, Vec4};

use crate::{AcceptMask, Reprojection};

#[derive(Clone, Copy)]
pub struct BilinearFilter {
    /// Samples at `00, 10, 01, 11`
    pub samples: [Vec4; 4],

    /// Weights for each sample; rejected taps have zero weight
    pub weights: Vec4,
}

impl BilinearFilter {
    /// Gathers the previous frame's samples for given reprojection, skipping
    /// taps not present in `mask`.
    pub fn from_reprojection(
        reprojection: &Reprojection,
        mask: AcceptMask,
        sample: impl Fn(UVec2) -> Vec4,
    ) -> Self {
        let mut samples = [Vec4::ZERO; 4];
        let mut weights = Vec4::ZERO;

        for tap in 0..4 {
            if mask.has_tap(tap) {
                samples[tap] = sample(reprojection.taps[tap]);
                weights[tap] = reprojection.weight(tap);
            }
        }

        Self { samples, weights }
    }

    /// Returns the combined weight of all accepted taps.
    pub fn weight(&self) -> f32 {
        self.weights.dot(Vec4::ONE)
    }

    /// Returns the weighted (and normalized) sample; zero if no tap has been
    /// accepted.
    pub fn eval(&self) -> Vec4 {
        let w_sum = self.weight();

        if w_sum == 0.0 {
            Default::default()
        } else {
            (self.samples[0] * self.weights.x
                + self.samples[1] * self.weights.y
                + self.samples[2] * self.weights.z
                + self.samples[3] * self.weights.w)
                / w_sum
        }
    }
}
