use glam::Vec3;

use crate::BMFR_EPSILON;

/// Number of regressors: bias, normal (xyz), position (xyz), albedo (rgb).
pub const FEATURE_COUNT: usize = 10;

/// Number of regression targets: accumulated radiance (rgb).
pub const TARGET_COUNT: usize = 3;

/// Number of channels stored per pixel in a block's working storage.
pub const CHANNEL_COUNT: usize = FEATURE_COUNT + TARGET_COUNT;

pub const CHANNEL_BIAS: usize = 0;
pub const CHANNEL_NORMAL: usize = 1;
pub const CHANNEL_POSITION: usize = 4;
pub const CHANNEL_ALBEDO: usize = 7;
pub const CHANNEL_RADIANCE: usize = 10;

/// Regressors of a single pixel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Features([f32; FEATURE_COUNT]);

impl Features {
    pub fn new(position: Vec3, normal: Vec3, albedo: Vec3) -> Self {
        let mut features = [0.0; FEATURE_COUNT];

        features[CHANNEL_BIAS] = 1.0;

        for axis in 0..3 {
            features[CHANNEL_NORMAL + axis] = normal[axis];
            features[CHANNEL_POSITION + axis] = position[axis];
            features[CHANNEL_ALBEDO + axis] = albedo[axis];
        }

        Self(features)
    }

    pub fn get(&self, feature: usize) -> f32 {
        self.0[feature]
    }

    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|feature| feature.is_finite())
    }
}

/// Per-block normalization of regressors into `[-1, 1]`, which keeps the
/// least-squares solve well-conditioned regardless of scene scale.
#[derive(Clone, Copy, Debug)]
pub struct FeatureScale {
    min: [f32; FEATURE_COUNT],
    max: [f32; FEATURE_COUNT],
}

impl Default for FeatureScale {
    fn default() -> Self {
        Self {
            min: [f32::INFINITY; FEATURE_COUNT],
            max: [f32::NEG_INFINITY; FEATURE_COUNT],
        }
    }
}

impl FeatureScale {
    pub fn include(&mut self, features: &Features) {
        for feature in 0..FEATURE_COUNT {
            self.min[feature] = self.min[feature].min(features.get(feature));
            self.max[feature] = self.max[feature].max(features.get(feature));
        }
    }

    /// Maps given features into `[-1, 1]`; the bias stays at `1.0` and
    /// features constant across the block collapse into zero.
    pub fn apply(&self, features: &Features) -> Features {
        let mut scaled = [0.0; FEATURE_COUNT];

        scaled[CHANNEL_BIAS] = 1.0;

        for feature in (CHANNEL_BIAS + 1)..FEATURE_COUNT {
            let min = self.min[feature];
            let range = self.max[feature] - min;

            if range > BMFR_EPSILON {
                scaled[feature] =
                    2.0 * (features.get(feature) - min) / range - 1.0;
            }
        }

        Features(scaled)
    }
}
