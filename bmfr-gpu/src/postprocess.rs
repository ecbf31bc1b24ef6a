use glam::{vec4, UVec2, Vec3, Vec4, Vec4Swizzles};

use crate::{
    lerp, AcceptMask, BilinearFilter, DebugMode, PostprocessPassParams,
    Reprojection, Tex, TexR8, Vec3Ext,
};

/// Blends the freshly filtered image with its own history.
pub struct Postprocessor<'a> {
    pub params: &'a PostprocessPassParams,
    pub filtered: Tex<'a>,
    pub prev_filtered: Tex<'a>,
    pub motion: Tex<'a>,
    pub accepts: TexR8<'a>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostprocessOutput {
    /// Denoised radiance (`xyz`) and the number of blended frames (`w`)
    pub color: Vec4,

    /// Weight the new filtered estimate got blended with
    pub alpha: f32,

    /// Whether history contributed to this pixel
    pub blended: bool,
}

impl PostprocessOutput {
    pub fn display(&self, mode: DebugMode) -> Option<Vec4> {
        match mode {
            DebugMode::None => Some(self.color.xyz().extend(1.0)),

            DebugMode::PostprocessAccepts => Some(if self.blended {
                Vec4::ONE
            } else {
                vec4(1.0, 0.0, 0.0, 1.0)
            }),

            DebugMode::PostprocessAlpha => {
                Some(Vec3::splat(self.alpha).extend(1.0))
            }

            _ => None,
        }
    }
}

impl<'a> Postprocessor<'a> {
    pub fn run(&self, screen_pos: UVec2) -> PostprocessOutput {
        let filtered = self.filtered.read(screen_pos).xyz().finite_or_zero();
        let accepts = AcceptMask::from_bits(self.accepts.read(screen_pos));

        let reset = PostprocessOutput {
            color: filtered.extend(1.0),
            alpha: 1.0,
            blended: false,
        };

        if !self.params.history_enabled() || !accepts.is_accepted() {
            return reset;
        }

        let reprojection = Reprojection::from_motion(
            screen_pos,
            self.motion.read(screen_pos).xy(),
            self.filtered.size(),
        );

        let prev = BilinearFilter::from_reprojection(
            &reprojection,
            accepts,
            |pos| self.prev_filtered.read(pos),
        );

        if prev.weight() <= self.params.weight_threshold {
            return reset;
        }

        let prev = prev.eval();
        let frames = prev.w.max(1.0) + 1.0;
        let alpha = (1.0 / frames).max(self.params.min_new_data_weight);

        PostprocessOutput {
            color: lerp(prev.xyz(), filtered, alpha).extend(frames),
            alpha,
            blended: true,
        }
    }
}
