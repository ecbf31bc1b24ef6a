pub trait F32Ext
where
    Self: Sized,
{
    fn sqr(self) -> Self;

    /// Returns `self` if it's finite, zero otherwise.
    fn finite_or_zero(self) -> Self;
}

impl F32Ext for f32 {
    fn sqr(self) -> Self {
        self * self
    }

    fn finite_or_zero(self) -> Self {
        if self.is_finite() {
            self
        } else {
            0.0
        }
    }
}
