use bytemuck::{Pod, Zeroable};

/// Index of the frame being denoised.
///
/// Frame parity decides which slot of the double-buffered images is read and
/// which one is written; the two swap every frame.
#[repr(C)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Pod, Zeroable,
)]
pub struct Frame(u32);

impl Frame {
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    pub fn get(self) -> u32 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }

    /// Slot holding the previous frame's data.
    pub fn read_slot(self) -> usize {
        (self.0 % 2) as usize
    }

    /// Slot this frame writes into; next frame reads it.
    pub fn write_slot(self) -> usize {
        (self.0.wrapping_add(1) % 2) as usize
    }
}
