use rayon::prelude::*;

use crate::gpu::DispatchGrid;

/// Storage holding a fixed number of elements per regression block.
#[derive(Debug)]
pub struct BlockBuffer<T> {
    label: String,
    per_block: usize,
    blocks: usize,
    data: Vec<T>,
}

impl<T> BlockBuffer<T>
where
    T: Copy + Default + Send,
{
    pub fn new(
        label: impl AsRef<str>,
        grid: &DispatchGrid,
        per_block: usize,
    ) -> Self {
        let label = label.as_ref();
        let blocks = grid.len();

        log::debug!(
            "Allocating block buffer `{label}`; blocks={blocks}, \
             per_block={per_block}"
        );

        assert!(per_block > 0);

        Self {
            label: label.to_owned(),
            per_block,
            blocks,
            data: vec![T::default(); blocks * per_block],
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn blocks(&self) -> usize {
        self.blocks
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn par_blocks_mut(&mut self) -> rayon::slice::ChunksMut<'_, T> {
        self.data.par_chunks_mut(self.per_block)
    }
}
