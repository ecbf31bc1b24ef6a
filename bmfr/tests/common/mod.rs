#![allow(dead_code)]

use bmfr::*;
use glam::{UVec2, Vec2, Vec3, Vec4};

/// Everything the renderer knows about a single pixel.
#[derive(Clone, Copy, Debug)]
pub struct Pixel {
    pub radiance: Vec3,
    pub position: Vec3,
    pub normal: Vec3,
    pub motion: Vec2,
    pub albedo: Vec3,
}

impl Default for Pixel {
    fn default() -> Self {
        Self {
            radiance: Vec3::ZERO,
            position: Vec3::ZERO,
            normal: Vec3::Z,
            motion: Vec2::ZERO,
            albedo: Vec3::ONE,
        }
    }
}

/// Bindings of a denoiser, as owned by the renderer.
pub struct Scene {
    pub size: UVec2,
    pub primary: TextureHandle,
    pub position: TextureHandle,
    pub normal: TextureHandle,
    pub motion: TextureHandle,
    pub albedo: TextureHandle,
    pub output: TextureHandle,
    pub states: ResourceStates,
}

impl Scene {
    pub fn new(size: UVec2) -> Self {
        let texture =
            |label: &str| Texture::<Vec4>::new(label, size).into_handle();

        Self {
            size,
            primary: texture("primary"),
            position: texture("position"),
            normal: texture("normal"),
            motion: texture("motion"),
            albedo: texture("albedo"),
            output: texture("output"),
            states: ResourceStates::new(),
        }
    }

    pub fn config(&self) -> DenoiserConfig {
        DenoiserConfig {
            primary: Some(self.primary.clone()),
            position: Some(self.position.clone()),
            normal: Some(self.normal.clone()),
            motion: Some(self.motion.clone()),
            albedo: Some(self.albedo.clone()),
            output: Some(self.output.clone()),
            ..Default::default()
        }
    }

    pub fn denoiser(&self) -> Denoiser {
        Denoiser::new(self.config()).unwrap()
    }

    /// Fills the G-buffer and the noisy input.
    pub fn draw(&self, mut f: impl FnMut(UVec2) -> Pixel) {
        let mut primary = self.primary.write();
        let mut position = self.position.write();
        let mut normal = self.normal.write();
        let mut motion = self.motion.write();
        let mut albedo = self.albedo.write();

        for y in 0..self.size.y {
            for x in 0..self.size.x {
                let pos = UVec2::new(x, y);
                let pixel = f(pos);

                primary.write(pos, pixel.radiance.extend(1.0));
                position.write(pos, pixel.position.extend(1.0));
                normal.write(pos, pixel.normal.extend(0.0));
                motion.write(pos, pixel.motion.extend(0.0).extend(0.0));
                albedo.write(pos, pixel.albedo.extend(1.0));
            }
        }
    }

    pub fn resize(&mut self, size: UVec2) {
        self.size = size;

        for handle in [
            &self.primary,
            &self.position,
            &self.normal,
            &self.motion,
            &self.albedo,
            &self.output,
        ] {
            handle.write().resize(size);
        }
    }

    pub fn render(
        &mut self,
        denoiser: &mut Denoiser,
        frame: u32,
    ) -> CommandEncoder {
        let mut encoder = CommandEncoder::new();

        let mut ctx =
            FrameContext::new(Frame::new(frame), self.size, &mut self.states);

        denoiser.render(&mut encoder, &mut ctx);

        encoder
    }

    pub fn output(&self) -> Texture {
        self.output.read().clone()
    }

    pub fn read_output(&self, pos: UVec2) -> Vec4 {
        self.output.read().read(pos)
    }
}

/// Mean of `|a - b|` over the color channels of two textures.
pub fn mean_abs_diff(a: &Texture, b: &Texture) -> f32 {
    assert_eq!(a.size(), b.size());

    let sum: f32 = a
        .data()
        .iter()
        .zip(b.data())
        .map(|(a, b)| {
            let diff = (a.truncate() - b.truncate()).abs();

            (diff.x + diff.y + diff.z) / 3.0
        })
        .sum();

    sum / a.data().len() as f32
}
