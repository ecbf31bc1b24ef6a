use glam::{UVec2, Vec3, Vec4, Vec4Swizzles};

use crate::{
    DebugMode, F32Ext, FeatureScale, Features, Noise, RegressionPassParams,
    Tex, Vec3Ext, BLOCK_PIXELS, CHANNEL_BIAS, CHANNEL_COUNT, CHANNEL_RADIANCE,
    FEATURE_COUNT, TARGET_COUNT,
};

/// Number of `f32`s of working storage needed by a single block.
pub const BLOCK_STORAGE: usize = CHANNEL_COUNT * BLOCK_PIXELS;

/// Pixels with more accumulated samples are trusted more, up to this limit.
const MAX_SAMPLE_WEIGHT: f32 = 32.0;

/// Columns whose residual norm drops below this fraction of their total norm
/// are linearly dependent on the previous ones and get dropped from the fit.
const RANK_EPSILON: f32 = 0.0001;

/// Outcome of fitting a single block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockFit {
    /// Block had no contributing pixels (e.g. it lies in the grid's margin)
    Empty,

    /// Model has been fitted using `rank` regressors
    Solved { rank: usize },

    /// Solve was degenerate, pixels got the raw accumulated radiance
    PassThrough,
}

/// Number of blocks per fit outcome, gathered over a single dispatch.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RegressionStats {
    pub empty: usize,
    pub solved: usize,
    pub pass_through: usize,
}

impl RegressionStats {
    pub fn record(&mut self, fit: BlockFit) {
        match fit {
            BlockFit::Empty => self.empty += 1,
            BlockFit::Solved { .. } => self.solved += 1,
            BlockFit::PassThrough => self.pass_through += 1,
        }
    }
}

impl FromIterator<BlockFit> for RegressionStats {
    fn from_iter<I: IntoIterator<Item = BlockFit>>(iter: I) -> Self {
        let mut stats = Self::default();

        for fit in iter {
            stats.record(fit);
        }

        stats
    }
}

/// Fits a weighted linear model mapping features into accumulated radiance,
/// block by block.
///
/// Working storage is laid out channel-major: `storage[channel * BLOCK_PIXELS
/// + pixel]`, with channels following [`Features`] and then the three radiance
/// channels.
pub struct Regressor<'a> {
    pub params: &'a RegressionPassParams,
    pub position: Tex<'a>,
    pub normal: Tex<'a>,
    pub albedo: Tex<'a>,
    pub accumulation: Tex<'a>,
}

type Coefficients = [[f32; TARGET_COUNT]; FEATURE_COUNT];

impl<'a> Regressor<'a> {
    pub fn run(
        &self,
        block_idx: u32,
        storage: &mut [f32],
        out: &mut [Vec4],
    ) -> BlockFit {
        assert_eq!(BLOCK_STORAGE, storage.len());
        assert_eq!(BLOCK_PIXELS, out.len());

        let mut scale = FeatureScale::default();
        let mut weights = [0.0; BLOCK_PIXELS];
        let mut contributing = 0;

        // ---------------------------------------------------------------------
        // Gather

        for (pixel, weight) in weights.iter_mut().enumerate() {
            let Some(screen_pos) = self.screen_pos(block_idx, pixel) else {
                continue;
            };

            let features = self.features(screen_pos);
            let sample = self.accumulation.read(screen_pos);

            if !features.is_finite() || !sample.is_finite() {
                continue;
            }

            scale.include(&features);

            *weight = sample.w.clamp(1.0, MAX_SAMPLE_WEIGHT);
            contributing += 1;
        }

        if contributing == 0 {
            self.pass_through(block_idx, out);

            return BlockFit::Empty;
        }

        for (pixel, &weight) in weights.iter().enumerate() {
            let row = self
                .screen_pos(block_idx, pixel)
                .filter(|_| weight > 0.0)
                .map(|screen_pos| {
                    (
                        scale.apply(&self.features(screen_pos)),
                        self.accumulation.read(screen_pos).xyz(),
                    )
                });

            let weight = weight.sqrt();

            for channel in 0..CHANNEL_COUNT {
                storage[channel * BLOCK_PIXELS + pixel] = match row {
                    Some((features, radiance)) => {
                        weight
                            * if channel < FEATURE_COUNT {
                                features.get(channel)
                            } else {
                                radiance[channel - CHANNEL_RADIANCE]
                            }
                    }
                    None => 0.0,
                };
            }
        }

        // ---------------------------------------------------------------------
        // Solve

        let Some((coefficients, rank)) = solve(storage) else {
            self.pass_through(block_idx, out);

            return BlockFit::PassThrough;
        };

        // ---------------------------------------------------------------------
        // Evaluate

        for (pixel, out) in out.iter_mut().enumerate() {
            *out = match self.screen_pos(block_idx, pixel) {
                Some(screen_pos) => {
                    let raw = self.raw(screen_pos);
                    let features = scale.apply(&self.features(screen_pos));

                    if features.is_finite() {
                        let filtered = eval(&coefficients, &features);

                        if filtered.is_finite() {
                            filtered.max(Vec3::ZERO).extend(1.0)
                        } else {
                            raw
                        }
                    } else {
                        raw
                    }
                }

                None => Vec4::ZERO,
            };
        }

        BlockFit::Solved { rank }
    }

    fn screen_pos(&self, block_idx: u32, pixel: usize) -> Option<UVec2> {
        let pos = self.params.offset().screen_pos(
            &self.params.grid(),
            block_idx,
            pixel,
        );

        if self.accumulation.contains(pos) {
            Some(pos.as_uvec2())
        } else {
            None
        }
    }

    fn features(&self, screen_pos: UVec2) -> Features {
        Features::new(
            self.position.read(screen_pos).xyz(),
            self.normal.read(screen_pos).xyz(),
            self.albedo.read(screen_pos).xyz(),
        )
    }

    fn raw(&self, screen_pos: UVec2) -> Vec4 {
        self.accumulation
            .read(screen_pos)
            .xyz()
            .finite_or_zero()
            .extend(1.0)
    }

    fn pass_through(&self, block_idx: u32, out: &mut [Vec4]) {
        for (pixel, out) in out.iter_mut().enumerate() {
            *out = match self.screen_pos(block_idx, pixel) {
                Some(screen_pos) => self.raw(screen_pos),
                None => Vec4::ZERO,
            };
        }
    }
}

/// Solves the weighted least-squares problem stored in `storage` using
/// Householder QR; destroys the storage in the process.
///
/// Returns the coefficients together with the number of regressors actually
/// used, or `None` when the bias column itself is degenerate or when the
/// solution isn't finite.
fn solve(storage: &mut [f32]) -> Option<(Coefficients, usize)> {
    let column = |channel: usize| channel * BLOCK_PIXELS;
    let mut pivots = [None; FEATURE_COUNT];
    let mut row = 0;

    for feature in 0..FEATURE_COUNT {
        let col = column(feature);

        let total_norm = storage[col..col + BLOCK_PIXELS]
            .iter()
            .map(|v| v.sqr())
            .sum::<f32>()
            .sqrt();

        let residual_norm = storage[col + row..col + BLOCK_PIXELS]
            .iter()
            .map(|v| v.sqr())
            .sum::<f32>()
            .sqrt();

        if residual_norm == 0.0 || residual_norm <= RANK_EPSILON * total_norm {
            continue;
        }

        // Householder vector gets stored in place of the column
        let x0 = storage[col + row];
        let alpha = if x0 >= 0.0 {
            -residual_norm
        } else {
            residual_norm
        };

        storage[col + row] -= alpha;

        let v_norm2 = 2.0 * residual_norm * (residual_norm + x0.abs());

        for other in (feature + 1)..CHANNEL_COUNT {
            let other = column(other);

            let dot: f32 = (row..BLOCK_PIXELS)
                .map(|i| storage[col + i] * storage[other + i])
                .sum();

            let factor = 2.0 * dot / v_norm2;

            for i in row..BLOCK_PIXELS {
                storage[other + i] -= factor * storage[col + i];
            }
        }

        storage[col + row] = alpha;
        pivots[feature] = Some(row);
        row += 1;
    }

    pivots[CHANNEL_BIAS]?;

    let mut coefficients = [[0.0; TARGET_COUNT]; FEATURE_COUNT];

    for feature in (0..FEATURE_COUNT).rev() {
        let Some(pivot) = pivots[feature] else {
            continue;
        };

        for target in 0..TARGET_COUNT {
            let mut value = storage[column(CHANNEL_RADIANCE + target) + pivot];

            for other in (feature + 1)..FEATURE_COUNT {
                if pivots[other].is_some() {
                    value -= storage[column(other) + pivot]
                        * coefficients[other][target];
                }
            }

            coefficients[feature][target] =
                value / storage[column(feature) + pivot];
        }
    }

    let finite = coefficients
        .iter()
        .flatten()
        .all(|coefficient| coefficient.is_finite());

    finite.then_some((coefficients, row))
}

fn eval(coefficients: &Coefficients, features: &Features) -> Vec3 {
    let mut out = Vec3::ZERO;

    for (feature, coefficient) in coefficients.iter().enumerate() {
        out += Vec3::from_array(*coefficient) * features.get(feature);
    }

    out
}

/// Maps the per-block output back into screen-space.
pub struct RegressionResolver<'a> {
    pub params: &'a RegressionPassParams,

    /// Output of [`Regressor`], `BLOCK_PIXELS` entries per block
    pub blocks: &'a [Vec4],
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RegressionOutput {
    pub filtered: Vec4,
    pub block_idx: u32,
}

impl RegressionOutput {
    pub fn display(&self, mode: DebugMode) -> Option<Vec4> {
        match mode {
            DebugMode::RegressionOutput => {
                Some(self.filtered.xyz().extend(1.0))
            }

            DebugMode::RegressionBlocks => Some(
                Noise::new(self.block_idx, UVec2::ZERO)
                    .sample_color()
                    .extend(1.0),
            ),

            _ => None,
        }
    }
}

impl<'a> RegressionResolver<'a> {
    pub fn run(&self, screen_pos: UVec2) -> RegressionOutput {
        let (block_idx, pixel) =
            self.params.offset().locate(&self.params.grid(), screen_pos);

        RegressionOutput {
            filtered: self.blocks[block_idx as usize * BLOCK_PIXELS + pixel],
            block_idx,
        }
    }
}
