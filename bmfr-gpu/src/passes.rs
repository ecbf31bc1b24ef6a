use bytemuck::{Pod, Zeroable};
use glam::UVec2;

use crate::{BlockOffset, DebugMode, DispatchGrid, Frame};

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PreprocessPassParams {
    pub frame: Frame,
    pub enable_history: u32,
    pub debug_mode: u32,

    /// Maximum distance between the current and the reprojected position,
    /// in scene units
    pub max_position_difference: f32,

    /// Maximum sine of the angle between the current and the reprojected
    /// normal
    pub max_normal_deviation: f32,

    /// Minimum combined weight of accepted bilinear taps
    pub weight_threshold: f32,

    /// Minimum weight assigned to the new sample
    pub min_new_data_weight: f32,
}

impl PreprocessPassParams {
    pub fn history_enabled(&self) -> bool {
        self.enable_history != 0
    }

    pub fn debug_mode(&self) -> DebugMode {
        DebugMode::from_u32(self.debug_mode).unwrap_or_default()
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct RegressionPassParams {
    pub frame: Frame,
    pub debug_mode: u32,
    pub screen: UVec2,
    pub block_offset: UVec2,
    pub dispatch_grid: UVec2,
}

impl RegressionPassParams {
    pub fn grid(&self) -> DispatchGrid {
        DispatchGrid {
            width: self.dispatch_grid.x,
            height: self.dispatch_grid.y,
        }
    }

    pub fn offset(&self) -> BlockOffset {
        BlockOffset::new(self.block_offset)
    }

    pub fn debug_mode(&self) -> DebugMode {
        DebugMode::from_u32(self.debug_mode).unwrap_or_default()
    }
}

#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct PostprocessPassParams {
    pub frame: Frame,
    pub enable_history: u32,
    pub debug_mode: u32,

    /// Minimum combined weight of accepted bilinear taps
    pub weight_threshold: f32,

    /// Minimum weight assigned to the new filtered estimate
    pub min_new_data_weight: f32,
}

impl PostprocessPassParams {
    pub fn history_enabled(&self) -> bool {
        self.enable_history != 0
    }

    pub fn debug_mode(&self) -> DebugMode {
        DebugMode::from_u32(self.debug_mode).unwrap_or_default()
    }
}
