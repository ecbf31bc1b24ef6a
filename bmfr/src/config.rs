use std::fmt;
use std::sync::Arc;

use derivative::Derivative;
use glam::UVec2;

use crate::gpu::{Frame, PostprocessPassParams, PreprocessPassParams};
use crate::{Benchmark, DenoiserError, TextureHandle};

/// Textures the denoiser reads from (G-buffer, noisy input) and writes to.
///
/// Every binding is required; they are kept as options so that a missing one
/// can be reported instead of panicking.
#[derive(Default, Derivative)]
#[derivative(Debug)]
pub struct DenoiserConfig {
    /// Noisy radiance (`xyz`)
    pub primary: Option<TextureHandle>,

    /// World-space position (`xyz`)
    pub position: Option<TextureHandle>,

    /// World-space normal (`xyz`)
    pub normal: Option<TextureHandle>,

    /// Screen-space motion (`xy`), in UV units, pointing from the previous
    /// frame's position to the current one
    pub motion: Option<TextureHandle>,

    /// Surface albedo (`xyz`)
    pub albedo: Option<TextureHandle>,

    /// Target for the denoised image (or the active debug view)
    pub output: Option<TextureHandle>,

    pub params: DenoiserParams,

    #[derivative(Debug = "ignore")]
    pub benchmark: Option<Box<dyn Benchmark>>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Binding {
    Normal,
    Motion,
    Position,
    Albedo,
    Primary,
    Output,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Binding::Normal => "normal",
            Binding::Motion => "motion",
            Binding::Position => "position",
            Binding::Albedo => "albedo",
            Binding::Primary => "primary",
            Binding::Output => "output",
        };

        write!(f, "{name}")
    }
}

/// Validated set of bindings.
#[derive(Clone, Debug)]
pub(crate) struct DenoiserInputs {
    pub primary: TextureHandle,
    pub position: TextureHandle,
    pub normal: TextureHandle,
    pub motion: TextureHandle,
    pub albedo: TextureHandle,
    pub output: TextureHandle,
}

impl DenoiserInputs {
    pub fn new(config: &DenoiserConfig) -> Result<Self, DenoiserError> {
        fn require(
            binding: Binding,
            handle: &Option<TextureHandle>,
        ) -> Result<TextureHandle, DenoiserError> {
            handle
                .clone()
                .ok_or(DenoiserError::MissingBinding(binding))
        }

        let this = Self {
            normal: require(Binding::Normal, &config.normal)?,
            motion: require(Binding::Motion, &config.motion)?,
            position: require(Binding::Position, &config.position)?,
            albedo: require(Binding::Albedo, &config.albedo)?,
            primary: require(Binding::Primary, &config.primary)?,
            output: require(Binding::Output, &config.output)?,
        };

        let expected = this.primary.read().size();

        for (binding, handle) in this.iter() {
            let actual = handle.read().size();

            if actual != expected {
                return Err(DenoiserError::MismatchedSize {
                    binding,
                    expected,
                    actual,
                });
            }
        }

        for (binding, handle) in this.iter() {
            if binding != Binding::Output && Arc::ptr_eq(handle, &this.output)
            {
                return Err(DenoiserError::AliasedOutput(binding));
            }
        }

        Ok(this)
    }

    pub fn size(&self) -> UVec2 {
        self.primary.read().size()
    }

    /// Panics if any of the bindings doesn't match given size.
    pub fn assert_size(&self, size: UVec2) {
        for (binding, handle) in self.iter() {
            let actual = handle.read().size();

            assert_eq!(
                size, actual,
                "binding {binding} has size {actual:?}, but the denoiser \
                 renders at {size:?}; did you forget to call `resize()`?"
            );
        }
    }

    fn iter(&self) -> impl Iterator<Item = (Binding, &TextureHandle)> + '_ {
        [
            (Binding::Normal, &self.normal),
            (Binding::Motion, &self.motion),
            (Binding::Position, &self.position),
            (Binding::Albedo, &self.albedo),
            (Binding::Primary, &self.primary),
            (Binding::Output, &self.output),
        ]
        .into_iter()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DenoiserParams {
    pub preprocess: PreprocessParams,
    pub postprocess: PostprocessParams,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PreprocessParams {
    pub max_position_difference: f32,
    pub max_normal_deviation: f32,
    pub weight_threshold: f32,
    pub min_new_data_weight: f32,
}

impl PreprocessParams {
    pub(crate) fn build(
        &self,
        frame: Frame,
        history_valid: bool,
        debug_mode: u32,
    ) -> PreprocessPassParams {
        PreprocessPassParams {
            frame,
            enable_history: history_valid as u32,
            debug_mode,
            max_position_difference: self.max_position_difference,
            max_normal_deviation: self.max_normal_deviation,
            weight_threshold: self.weight_threshold,
            min_new_data_weight: self.min_new_data_weight,
        }
    }
}

impl Default for PreprocessParams {
    fn default() -> Self {
        Self {
            max_position_difference: 0.15,
            max_normal_deviation: 0.05,
            weight_threshold: 0.01,
            min_new_data_weight: 0.1,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PostprocessParams {
    pub weight_threshold: f32,
    pub min_new_data_weight: f32,
}

impl PostprocessParams {
    pub(crate) fn build(
        &self,
        frame: Frame,
        history_valid: bool,
        debug_mode: u32,
    ) -> PostprocessPassParams {
        PostprocessPassParams {
            frame,
            enable_history: history_valid as u32,
            debug_mode,
            weight_threshold: self.weight_threshold,
            min_new_data_weight: self.min_new_data_weight,
        }
    }
}

impl Default for PostprocessParams {
    fn default() -> Self {
        Self {
            weight_threshold: 0.01,
            min_new_data_weight: 1.0 / 6.0,
        }
    }
}
