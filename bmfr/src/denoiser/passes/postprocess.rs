use glam::uvec2;
use rayon::prelude::*;

use crate::gpu;
use crate::{
    Access, Binding, CommandEncoder, DenoiserBuffers, DenoiserComputePass,
    DenoiserInputs, FrameContext,
};

/// Temporally stabilizes the filtered image.
#[derive(Debug)]
pub struct PostprocessPass {
    pass: DenoiserComputePass<gpu::PostprocessPassParams>,
}

impl PostprocessPass {
    pub fn new() -> Self {
        Self {
            pass: DenoiserComputePass::new("postprocess", uvec2(16, 16)),
        }
    }

    pub fn run(
        &self,
        inputs: &DenoiserInputs,
        buffers: &mut DenoiserBuffers,
        encoder: &mut CommandEncoder,
        ctx: &mut FrameContext<'_>,
        params: gpu::PostprocessPassParams,
    ) {
        let debug_mode = params.debug_mode();

        for (resource, access) in [
            (Binding::Motion.to_string(), Access::Read),
            (DenoiserBuffers::FILTER.into(), Access::Read),
            (DenoiserBuffers::ACCEPTS.into(), Access::Read),
            (DenoiserBuffers::FILTERED_HISTORY.into(), Access::ReadWrite),
        ] {
            ctx.states.barrier(encoder, &resource, access);
        }

        if debug_mode.is_postprocess() {
            ctx.states.barrier(
                encoder,
                &Binding::Output.to_string(),
                Access::Write,
            );
        }

        let motion = inputs.motion.read();
        let mut output = inputs.output.write();

        let DenoiserBuffers {
            filtered_history,
            accepts,
            filter,
            ..
        } = buffers;

        let (prev_filtered, filtered) =
            filtered_history.split(ctx.frame.read_slot());

        self.pass.run(encoder, ctx.size, params, |params| {
            let kernel = gpu::Postprocessor {
                params,
                filtered: filter.view(),
                prev_filtered: prev_filtered.view(),
                motion: motion.view(),
                accepts: accepts.view(),
            };

            filtered
                .par_rows_mut()
                .zip(output.par_rows_mut())
                .enumerate()
                .for_each(|(y, (filtered, output))| {
                    let texels = filtered.iter_mut().zip(output.iter_mut());

                    for (x, (filtered, output)) in texels.enumerate() {
                        let out = kernel.run(uvec2(x as u32, y as u32));

                        *filtered = out.color;

                        if let Some(color) = out.display(debug_mode) {
                            *output = color;
                        }
                    }
                });
        });
    }
}
