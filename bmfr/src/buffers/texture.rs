use std::sync::Arc;

use derivative::Derivative;
use glam::{uvec2, UVec2, Vec4};
use parking_lot::RwLock;
use rayon::prelude::*;

use crate::gpu;

/// CPU-resident 2D image, laid out row-major.
#[derive(Clone, Derivative)]
#[derivative(Debug)]
pub struct Texture<T = Vec4> {
    label: String,
    size: UVec2,
    #[derivative(Debug = "ignore")]
    data: Vec<T>,
}

/// Single-channel texture holding per-pixel accept masks.
pub type MaskTexture = Texture<u8>;

/// Texture shared between the denoiser and the host (G-buffer, noisy input,
/// output target).
pub type TextureHandle = Arc<RwLock<Texture>>;

impl<T> Texture<T>
where
    T: Copy + Default + Send + Sync,
{
    pub fn new(label: impl AsRef<str>, size: UVec2) -> Self {
        let label = label.as_ref();

        log::debug!("Allocating texture `{label}`; size={:?}", size);

        assert!(size.x > 0);
        assert!(size.y > 0);

        Self {
            label: label.to_owned(),
            size,
            data: vec![T::default(); (size.x * size.y) as usize],
        }
    }

    pub fn from_fn(
        label: impl AsRef<str>,
        size: UVec2,
        f: impl Fn(UVec2) -> T,
    ) -> Self {
        let mut this = Self::new(label, size);

        for y in 0..size.y {
            for x in 0..size.x {
                this.write(uvec2(x, y), f(uvec2(x, y)));
            }
        }

        this
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn read(&self, pos: UVec2) -> T {
        self.data[self.idx(pos)]
    }

    pub fn write(&mut self, pos: UVec2, value: T) {
        let idx = self.idx(pos);

        self.data[idx] = value;
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Copies contents of another texture of the same size.
    pub fn copy_from(&mut self, other: &Self) {
        assert_eq!(
            self.size, other.size,
            "cannot copy `{}` into `{}`: sizes differ",
            other.label, self.label
        );

        self.data.copy_from_slice(&other.data);
    }

    /// Reallocates this texture; previous contents are lost.
    pub fn resize(&mut self, size: UVec2) {
        *self = Self::new(&self.label, size);
    }

    pub fn view(&self) -> gpu::ImageView<'_, T> {
        gpu::ImageView::new(&self.data, self.size)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Returns rows of this texture, ready to be written in parallel.
    pub fn par_rows_mut(&mut self) -> rayon::slice::ChunksMut<'_, T> {
        self.data.par_chunks_mut(self.size.x as usize)
    }

    fn idx(&self, pos: UVec2) -> usize {
        assert!(
            pos.x < self.size.x && pos.y < self.size.y,
            "{:?} is out of bounds of `{}` ({:?})",
            pos,
            self.label,
            self.size
        );

        (pos.y * self.size.x + pos.x) as usize
    }
}

impl Texture {
    pub fn into_handle(self) -> TextureHandle {
        Arc::new(RwLock::new(self))
    }

    /// Converts this texture into an HDR image, e.g. to dump it to disk.
    pub fn to_image(&self) -> image::Rgba32FImage {
        image::Rgba32FImage::from_fn(self.size.x, self.size.y, |x, y| {
            image::Rgba(self.read(uvec2(x, y)).to_array())
        })
    }

    /// Converts this texture into an LDR image, clamping colors into `[0, 1]`.
    pub fn to_rgba8(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.size.x, self.size.y, |x, y| {
            let color = self.read(uvec2(x, y)).clamp(Vec4::ZERO, Vec4::ONE);

            image::Rgba((color * 255.0).round().as_uvec4().to_array().map(
                |channel| channel as u8,
            ))
        })
    }

    pub fn from_image(
        label: impl AsRef<str>,
        image: &image::Rgba32FImage,
    ) -> Self {
        Self::from_fn(label, uvec2(image.width(), image.height()), |pos| {
            Vec4::from_array(image.get_pixel(pos.x, pos.y).0)
        })
    }
}
