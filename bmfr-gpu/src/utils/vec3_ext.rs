use glam::{vec3, Vec3};

use crate::F32Ext;

pub trait Vec3Ext
where
    Self: Sized,
{
    /// Returns sine of the angle between this and the other unit vector.
    ///
    /// Vectors pointing into opposite hemispheres yield `1.0`, i.e. they are
    /// treated as maximally different.
    fn sin_angle_to(self, other: Self) -> f32;

    /// Replaces non-finite components with zeros.
    fn finite_or_zero(self) -> Self;
}

impl Vec3Ext for Vec3 {
    fn sin_angle_to(self, other: Self) -> f32 {
        let cos = self.dot(other);

        if cos <= 0.0 {
            1.0
        } else {
            (1.0 - cos.min(1.0).sqr()).sqrt()
        }
    }

    fn finite_or_zero(self) -> Self {
        vec3(
            self.x.finite_or_zero(),
            self.y.finite_or_zero(),
            self.z.finite_or_zero(),
        )
    }
}
