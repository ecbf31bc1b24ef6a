//! Common structs, algorithms etc. used by the denoiser's kernels and its
//! host-side orchestrator.
//!
//! Everything in here operates on a single work-item at a time (a pixel or a
//! block); parallelism is the host's responsibility.

#![allow(clippy::len_without_is_empty)]
#![allow(clippy::manual_range_contains)]

mod block;
mod debug;
mod features;
mod frame;
mod image;
mod noise;
mod passes;
mod postprocess;
mod preprocess;
mod regression;
mod reprojection;
mod utils;

pub use self::block::*;
pub use self::debug::*;
pub use self::features::*;
pub use self::frame::*;
pub use self::image::*;
pub use self::noise::*;
pub use self::passes::*;
pub use self::postprocess::*;
pub use self::preprocess::*;
pub use self::regression::*;
pub use self::reprojection::*;
pub use self::utils::*;

/// Small value used to guard divisions and normalizations.
pub const BMFR_EPSILON: f32 = 0.00001;
