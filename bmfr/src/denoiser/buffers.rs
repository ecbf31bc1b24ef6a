use glam::{UVec2, Vec4};
use log::debug;

use crate::gpu::{self, DispatchGrid};
use crate::{BlockBuffer, DoubleBuffered, MaskTexture, Texture};

/// G-buffer of the previous frame, used to validate reprojected samples.
#[derive(Debug)]
pub struct History {
    pub position: Texture,
    pub normal: Texture,

    /// Whether the textures above (and the accumulated history) describe the
    /// previous frame; false right after creation, resize or a reset
    pub valid: bool,
}

#[derive(Debug)]
pub struct DenoiserBuffers {
    pub size: UVec2,
    pub grid: DispatchGrid,
    pub history: History,
    pub accumulation: DoubleBuffered<Texture>,
    pub filtered_history: DoubleBuffered<Texture>,
    pub accepts: MaskTexture,
    pub filter: Texture,
    pub regression_temp: BlockBuffer<f32>,
    pub regression_out: BlockBuffer<Vec4>,
}

impl DenoiserBuffers {
    pub const HISTORY_POSITION: &'static str = "bmfr_history_position";
    pub const HISTORY_NORMAL: &'static str = "bmfr_history_normal";
    pub const ACCUMULATION: &'static str = "bmfr_accumulation";
    pub const FILTERED_HISTORY: &'static str = "bmfr_filtered_history";
    pub const ACCEPTS: &'static str = "bmfr_accepts";
    pub const FILTER: &'static str = "bmfr_filter";
    pub const REGRESSION_TEMP: &'static str = "bmfr_regression_temp";
    pub const REGRESSION_OUT: &'static str = "bmfr_regression_out";

    pub fn new(size: UVec2) -> Self {
        debug!("Initializing denoiser buffers; size={:?}", size);

        let grid = DispatchGrid::new(size);

        let history = History {
            position: Texture::new(Self::HISTORY_POSITION, size),
            normal: Texture::new(Self::HISTORY_NORMAL, size),
            valid: false,
        };

        let accumulation = DoubleBuffered::textures(Self::ACCUMULATION, size);

        let filtered_history =
            DoubleBuffered::textures(Self::FILTERED_HISTORY, size);

        let accepts = MaskTexture::new(Self::ACCEPTS, size);
        let filter = Texture::new(Self::FILTER, size);

        let regression_temp =
            BlockBuffer::new(Self::REGRESSION_TEMP, &grid, gpu::BLOCK_STORAGE);

        let regression_out =
            BlockBuffer::new(Self::REGRESSION_OUT, &grid, gpu::BLOCK_PIXELS);

        Self {
            size,
            grid,
            history,
            accumulation,
            filtered_history,
            accepts,
            filter,
            regression_temp,
            regression_out,
        }
    }

    /// Releases all buffers, in reverse order of their creation.
    pub fn destroy(self) {
        let Self {
            history,
            accumulation,
            filtered_history,
            accepts,
            filter,
            regression_temp,
            regression_out,
            ..
        } = self;

        debug!("Releasing {}", regression_out.label());
        drop(regression_out);

        debug!("Releasing {}", regression_temp.label());
        drop(regression_temp);

        debug!("Releasing {}", filter.label());
        drop(filter);

        debug!("Releasing {}", accepts.label());
        drop(accepts);

        debug!("Releasing {}", Self::FILTERED_HISTORY);
        drop(filtered_history);

        debug!("Releasing {}", Self::ACCUMULATION);
        drop(accumulation);

        debug!("Releasing {}", Self::HISTORY_NORMAL);
        debug!("Releasing {}", Self::HISTORY_POSITION);
        drop(history);
    }
}

#[cfg(test)]
mod tests {
    use glam::uvec2;

    use super::*;

    #[test]
    fn new() {
        let target = DenoiserBuffers::new(uvec2(100, 40));

        assert_eq!(uvec2(5, 3), target.grid.size());
        assert!(!target.history.valid);
        assert_eq!(uvec2(100, 40), target.filter.size());
        assert_eq!(uvec2(100, 40), target.accumulation.get(1).size());
        assert_eq!("bmfr_accumulation_1", target.accumulation.get(1).label());
        assert_eq!(15, target.regression_temp.blocks());

        assert_eq!(
            15 * gpu::BLOCK_STORAGE,
            target.regression_temp.data().len()
        );

        assert_eq!(15 * gpu::BLOCK_PIXELS, target.regression_out.data().len());
    }
}
