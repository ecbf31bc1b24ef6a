use glam::UVec2;

use crate::Texture;

/// Pair of resources alternating between being read and written, indexed by
/// frame parity (see [`crate::gpu::Frame::read_slot()`]).
#[derive(Debug)]
pub struct DoubleBuffered<T> {
    a: T,
    b: T,
}

impl<T> DoubleBuffered<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    pub fn get(&self, slot: usize) -> &T {
        match slot {
            0 => &self.a,
            1 => &self.b,
            _ => panic!("slot out of range: {slot}"),
        }
    }

    /// Returns `(read, write)` pair, where `read` is the resource at given
    /// slot and `write` is the other one.
    pub fn split(&mut self, read_slot: usize) -> (&T, &mut T) {
        match read_slot {
            0 => (&self.a, &mut self.b),
            1 => (&self.b, &mut self.a),
            _ => panic!("slot out of range: {read_slot}"),
        }
    }
}

impl DoubleBuffered<Texture> {
    /// Allocates two textures, labelled `{label}_0` and `{label}_1`.
    pub fn textures(label: &str, size: UVec2) -> Self {
        Self::new(
            Texture::new(format!("{label}_0"), size),
            Texture::new(format!("{label}_1"), size),
        )
    }
}
