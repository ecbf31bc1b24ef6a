//! Real-time denoiser for path-traced images, based on Blockwise Multi-Order
//! Feature Regression (BMFR).
//!
//! The denoiser consumes a noisy one-sample-per-pixel image together with its
//! G-buffer (positions, normals, albedo and motion) and produces a denoised
//! image; see [`Denoiser`].
//!
//! All of the stages run on the CPU, spread across threads with `rayon`, while
//! the operations they perform are recorded into a [`CommandEncoder`].

#![allow(clippy::new_without_default)]
#![allow(clippy::too_many_arguments)]

mod benchmark;
mod buffers;
mod config;
mod denoiser;
mod encoder;
mod error;
mod resource_states;

pub use bmfr_gpu as gpu;
pub use bmfr_gpu::{
    DebugMode, DispatchGrid, Frame, RegressionStats, BLOCK_EDGE,
};

pub use self::benchmark::*;
pub use self::buffers::*;
pub use self::config::*;
pub use self::denoiser::*;
pub use self::encoder::*;
pub use self::error::*;
pub use self::resource_states::*;
