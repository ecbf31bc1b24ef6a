use glam::{ivec2, vec4, UVec2, Vec2, Vec4};

/// Location of a pixel in the previous frame, expressed as four bilinear taps.
///
/// Taps are ordered `00, 10, 01, 11` and are always clamped into the image -
/// a motion vector pointing outside of the screen doesn't reject the sample by
/// itself, the position & normal test decides.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Reprojection {
    pub taps: [UVec2; 4],
    pub weights: Vec4,
}

impl Reprojection {
    /// Reprojects given pixel using a screen-space motion vector, which is the
    /// UV-space difference between the current and the previous position of
    /// the surface.
    pub fn from_motion(screen_pos: UVec2, motion: Vec2, size: UVec2) -> Self {
        let prev_pos = screen_pos.as_vec2() - motion * size.as_vec2();

        let prev_pos = if prev_pos.is_finite() {
            prev_pos.clamp(Vec2::splat(-1.0), size.as_vec2())
        } else {
            screen_pos.as_vec2()
        };

        let base = prev_pos.floor();
        let uv = prev_pos - base;
        let base = base.as_ivec2();
        let max = size.as_ivec2() - 1;

        let tap = |dx, dy| {
            (base + ivec2(dx, dy)).clamp(Default::default(), max).as_uvec2()
        };

        Self {
            taps: [tap(0, 0), tap(1, 0), tap(0, 1), tap(1, 1)],
            weights: vec4(
                (1.0 - uv.x) * (1.0 - uv.y),
                uv.x * (1.0 - uv.y),
                (1.0 - uv.x) * uv.y,
                uv.x * uv.y,
            ),
        }
    }

    pub fn weight(&self, tap: usize) -> f32 {
        self.weights[tap]
    }
}

/// Per-pixel record of which bilinear taps passed the reprojection test.
///
/// Bit `n` corresponds to `Reprojection::taps[n]`; a pixel with no bits set
/// has been rejected.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AcceptMask(u8);

impl AcceptMask {
    pub const NONE: Self = Self(0);
    pub const ALL: Self = Self(0b1111);

    pub fn from_bits(bits: u8) -> Self {
        Self(bits & 0b1111)
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn with_tap(self, tap: usize) -> Self {
        Self(self.0 | (1 << tap))
    }

    pub fn has_tap(self, tap: usize) -> bool {
        self.0 & (1 << tap) > 0
    }

    pub fn is_accepted(self) -> bool {
        self.0 != 0
    }
}
