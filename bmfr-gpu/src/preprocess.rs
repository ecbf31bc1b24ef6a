use glam::{vec4, UVec2, Vec3, Vec4, Vec4Swizzles};

use crate::{
    lerp, AcceptMask, BilinearFilter, DebugMode, PreprocessPassParams,
    Reprojection, Tex, Vec3Ext,
};

/// Reprojects the previous accumulation into the current frame and blends the
/// new noisy sample into it.
pub struct Preprocessor<'a> {
    pub params: &'a PreprocessPassParams,
    pub primary: Tex<'a>,
    pub position: Tex<'a>,
    pub prev_position: Tex<'a>,
    pub normal: Tex<'a>,
    pub prev_normal: Tex<'a>,
    pub motion: Tex<'a>,
    pub prev_accumulation: Tex<'a>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreprocessOutput {
    /// Accumulated radiance (`xyz`) and the number of accumulated samples
    /// (`w`)
    pub accumulated: Vec4,

    pub accepts: AcceptMask,

    /// Weight the new sample got blended with
    pub alpha: f32,
}

impl PreprocessOutput {
    pub fn display(&self, mode: DebugMode) -> Option<Vec4> {
        match mode {
            DebugMode::PreprocessOutput => {
                Some(self.accumulated.xyz().extend(1.0))
            }

            DebugMode::PreprocessAccepts => Some(if self.accepts.is_accepted() {
                Vec4::ONE
            } else {
                vec4(1.0, 0.0, 0.0, 1.0)
            }),

            DebugMode::PreprocessAlpha => {
                Some(Vec3::splat(self.alpha).extend(1.0))
            }

            _ => None,
        }
    }
}

impl<'a> Preprocessor<'a> {
    pub fn run(&self, screen_pos: UVec2) -> PreprocessOutput {
        let sample = self.primary.read(screen_pos).xyz().finite_or_zero();

        let reprojection = Reprojection::from_motion(
            screen_pos,
            self.motion.read(screen_pos).xy(),
            self.primary.size(),
        );

        let accepts = if self.params.history_enabled() {
            self.validate(screen_pos, &reprojection)
        } else {
            AcceptMask::NONE
        };

        if !accepts.is_accepted() {
            return PreprocessOutput {
                accumulated: sample.extend(1.0),
                accepts,
                alpha: 1.0,
            };
        }

        let prev = BilinearFilter::from_reprojection(
            &reprojection,
            accepts,
            |pos| self.prev_accumulation.read(pos),
        )
        .eval();

        let samples = prev.w.max(1.0) + 1.0;
        let alpha = (1.0 / samples).max(self.params.min_new_data_weight);
        let color = lerp(prev.xyz(), sample, alpha);

        PreprocessOutput {
            accumulated: color.extend(samples),
            accepts,
            alpha,
        }
    }

    /// Compares current surface with the reprojected one, tap by tap; returns
    /// an empty mask if the accepted taps don't carry enough weight.
    fn validate(
        &self,
        screen_pos: UVec2,
        reprojection: &Reprojection,
    ) -> AcceptMask {
        let position = self.position.read(screen_pos).xyz();
        let normal = self.normal.read(screen_pos).xyz().normalize_or_zero();

        let mut accepts = AcceptMask::NONE;
        let mut weight = 0.0;

        for (tap, &tap_pos) in reprojection.taps.iter().enumerate() {
            if reprojection.weight(tap) <= 0.0 {
                continue;
            }

            let prev_position = self.prev_position.read(tap_pos).xyz();

            let prev_normal =
                self.prev_normal.read(tap_pos).xyz().normalize_or_zero();

            let position_ok = position.distance(prev_position)
                < self.params.max_position_difference;

            let normal_ok = normal.sin_angle_to(prev_normal)
                < self.params.max_normal_deviation;

            if position_ok && normal_ok {
                accepts = accepts.with_tap(tap);
                weight += reprojection.weight(tap);
            }
        }

        if weight > self.params.weight_threshold {
            accepts
        } else {
            AcceptMask::NONE
        }
    }
}
