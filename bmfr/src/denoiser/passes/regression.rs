use glam::uvec2;
use log::{trace, warn};
use rayon::prelude::*;

use crate::gpu::{self, RegressionStats};
use crate::{
    Access, Binding, CommandEncoder, DenoiserBuffers, DenoiserComputePass,
    DenoiserInputs, FrameContext,
};

/// Fits per-block feature models and resolves them back into screen-space.
#[derive(Debug)]
pub struct RegressionPass {
    fit: DenoiserComputePass<gpu::RegressionPassParams>,
    resolve: DenoiserComputePass<gpu::RegressionPassParams>,
}

impl RegressionPass {
    pub fn new() -> Self {
        Self {
            fit: DenoiserComputePass::new("regression", uvec2(1, 1)),
            resolve: DenoiserComputePass::new(
                "regression_resolve",
                uvec2(16, 16),
            ),
        }
    }

    pub fn run(
        &self,
        inputs: &DenoiserInputs,
        buffers: &mut DenoiserBuffers,
        encoder: &mut CommandEncoder,
        ctx: &mut FrameContext<'_>,
        params: gpu::RegressionPassParams,
    ) -> RegressionStats {
        let debug_mode = params.debug_mode();

        for (resource, access) in [
            (Binding::Position.to_string(), Access::Read),
            (Binding::Normal.to_string(), Access::Read),
            (Binding::Albedo.to_string(), Access::Read),
            (DenoiserBuffers::ACCUMULATION.into(), Access::Read),
            (DenoiserBuffers::REGRESSION_TEMP.into(), Access::ReadWrite),
            (DenoiserBuffers::REGRESSION_OUT.into(), Access::Write),
        ] {
            ctx.states.barrier(encoder, &resource, access);
        }

        let position = inputs.position.read();
        let normal = inputs.normal.read();
        let albedo = inputs.albedo.read();

        let DenoiserBuffers {
            grid,
            accumulation,
            filter,
            regression_temp,
            regression_out,
            ..
        } = buffers;

        let accumulation = accumulation.get(ctx.frame.write_slot());

        let fits: Vec<_> = self.fit.run(encoder, grid.size(), params, |params| {
            let kernel = gpu::Regressor {
                params,
                position: position.view(),
                normal: normal.view(),
                albedo: albedo.view(),
                accumulation: accumulation.view(),
            };

            regression_temp
                .par_blocks_mut()
                .zip(regression_out.par_blocks_mut())
                .enumerate()
                .map(|(block_idx, (storage, out))| {
                    kernel.run(block_idx as u32, storage, out)
                })
                .collect()
        });

        let stats: RegressionStats = fits.into_iter().collect();

        if stats.pass_through > 0 {
            warn!(
                "Frame {}: {} out of {} regression blocks were degenerate",
                ctx.frame.get(),
                stats.pass_through,
                grid.len()
            );
        }

        trace!("Frame {}: {:?}", ctx.frame.get(), stats);

        // ---

        ctx.states.barrier(
            encoder,
            DenoiserBuffers::REGRESSION_OUT,
            Access::Read,
        );

        ctx.states.barrier(encoder, DenoiserBuffers::FILTER, Access::Write);

        if debug_mode.is_regression() {
            ctx.states.barrier(
                encoder,
                &Binding::Output.to_string(),
                Access::Write,
            );
        }

        let mut output = inputs.output.write();

        self.resolve.run(encoder, ctx.size, params, |params| {
            let kernel = gpu::RegressionResolver {
                params,
                blocks: regression_out.data(),
            };

            filter
                .par_rows_mut()
                .zip(output.par_rows_mut())
                .enumerate()
                .for_each(|(y, (filter, output))| {
                    let texels = filter.iter_mut().zip(output.iter_mut());

                    for (x, (filter, output)) in texels.enumerate() {
                        let out = kernel.run(uvec2(x as u32, y as u32));

                        *filter = out.filtered;

                        if let Some(color) = out.display(debug_mode) {
                            *output = color;
                        }
                    }
                });
        });

        stats
    }
}
