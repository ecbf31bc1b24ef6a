use glam::{ivec2, uvec2, IVec2, UVec2};

use crate::{Frame, Noise};

/// Side length of a square regression block, in pixels.
pub const BLOCK_EDGE: u32 = 32;

/// Number of pixels covered by a single regression block.
pub const BLOCK_PIXELS: usize = (BLOCK_EDGE * BLOCK_EDGE) as usize;

/// Number of regression blocks covering the frame.
///
/// The grid is one block larger than the frame in each axis so that it still
/// covers every pixel after being shifted by [`BlockOffset`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DispatchGrid {
    pub width: u32,
    pub height: u32,
}

impl DispatchGrid {
    pub fn new(frame_size: UVec2) -> Self {
        let size = (frame_size + (BLOCK_EDGE - 1)) / BLOCK_EDGE + 1;

        Self {
            width: size.x,
            height: size.y,
        }
    }

    pub fn size(&self) -> UVec2 {
        uvec2(self.width, self.height)
    }

    pub fn len(&self) -> usize {
        (self.width * self.height) as usize
    }

    pub fn block_coords(&self, block_idx: u32) -> UVec2 {
        uvec2(block_idx % self.width, block_idx / self.width)
    }

    pub fn block_idx(&self, block_coords: UVec2) -> u32 {
        block_coords.y * self.width + block_coords.x
    }
}

/// Per-frame shift of the block grid, in `[0, BLOCK_EDGE)` for each axis.
///
/// Pixel `p` belongs to block `(p + offset) / BLOCK_EDGE`; moving the seams
/// every frame lets the temporal postprocess hide them.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BlockOffset(UVec2);

impl BlockOffset {
    pub fn new(offset: UVec2) -> Self {
        assert!(offset.x < BLOCK_EDGE && offset.y < BLOCK_EDGE);

        Self(offset)
    }

    pub fn for_frame(frame: Frame) -> Self {
        let mut noise = Noise::new(frame.get(), UVec2::ZERO);

        Self(uvec2(
            noise.sample_int() % BLOCK_EDGE,
            noise.sample_int() % BLOCK_EDGE,
        ))
    }

    pub fn get(self) -> UVec2 {
        self.0
    }

    /// Returns the block containing given pixel together with the pixel's
    /// index inside that block.
    pub fn locate(
        self,
        grid: &DispatchGrid,
        screen_pos: UVec2,
    ) -> (u32, usize) {
        let shifted = screen_pos + self.0;
        let block = shifted / BLOCK_EDGE;
        let local = shifted % BLOCK_EDGE;

        (
            grid.block_idx(block),
            (local.y * BLOCK_EDGE + local.x) as usize,
        )
    }

    /// Inverse of [`Self::locate()`]; the returned position can lie outside of
    /// the screen (in the grid's margin).
    pub fn screen_pos(
        self,
        grid: &DispatchGrid,
        block_idx: u32,
        local_idx: usize,
    ) -> IVec2 {
        let block = grid.block_coords(block_idx).as_ivec2();
        let local = ivec2(
            local_idx as i32 % BLOCK_EDGE as i32,
            local_idx as i32 / BLOCK_EDGE as i32,
        );

        block * BLOCK_EDGE as i32 + local - self.0.as_ivec2()
    }
}
