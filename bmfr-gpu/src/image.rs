use glam::{IVec2, UVec2, Vec4};

/// Read-only view into a 2D image laid out row-major.
///
/// Kernels only ever read through views; writing is done by the host, which
/// hands every work-item its own output slot.
#[derive(Clone, Copy)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    size: UVec2,
}

/// View into an RGBA32F image.
pub type Tex<'a> = ImageView<'a, Vec4>;

/// View into a single-channel `u8` image (e.g. the accept mask).
pub type TexR8<'a> = ImageView<'a, u8>;

impl<'a, T> ImageView<'a, T>
where
    T: Copy,
{
    pub fn new(data: &'a [T], size: UVec2) -> Self {
        assert_eq!(
            data.len(),
            (size.x * size.y) as usize,
            "image data doesn't match its size"
        );

        Self { data, size }
    }

    pub fn size(&self) -> UVec2 {
        self.size
    }

    pub fn contains(&self, pos: IVec2) -> bool {
        pos.x >= 0
            && pos.y >= 0
            && (pos.x as u32) < self.size.x
            && (pos.y as u32) < self.size.y
    }

    /// Clamps given position into the image's bounds.
    pub fn clamp(&self, pos: IVec2) -> UVec2 {
        pos.clamp(IVec2::ZERO, self.size.as_ivec2() - 1).as_uvec2()
    }

    pub fn read(&self, pos: UVec2) -> T {
        self.data[(pos.y * self.size.x + pos.x) as usize]
    }

    pub fn data(&self) -> &'a [T] {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use glam::{ivec2, uvec2, vec4};

    use super::*;

    #[test]
    fn read_and_clamp() {
        let data: Vec<_> =
            (0..6).map(|n| vec4(n as f32, 0.0, 0.0, 0.0)).collect();
        let tex = Tex::new(&data, uvec2(3, 2));

        assert_eq!(4.0, tex.read(uvec2(1, 1)).x);
        assert!(tex.contains(ivec2(2, 1)));
        assert!(!tex.contains(ivec2(3, 1)));
        assert!(!tex.contains(ivec2(-1, 0)));
        assert_eq!(uvec2(0, 1), tex.clamp(ivec2(-5, 9)));
        assert_eq!(uvec2(2, 0), tex.clamp(ivec2(7, -1)));
    }
}
