use glam::uvec2;
use rayon::prelude::*;

use crate::gpu;
use crate::{
    Access, Binding, CommandEncoder, DenoiserBuffers, DenoiserComputePass,
    DenoiserInputs, FrameContext,
};

/// Reprojects and accumulates the noisy input.
#[derive(Debug)]
pub struct PreprocessPass {
    pass: DenoiserComputePass<gpu::PreprocessPassParams>,
}

impl PreprocessPass {
    pub fn new() -> Self {
        Self {
            pass: DenoiserComputePass::new("preprocess", uvec2(16, 16)),
        }
    }

    pub fn run(
        &self,
        inputs: &DenoiserInputs,
        buffers: &mut DenoiserBuffers,
        encoder: &mut CommandEncoder,
        ctx: &mut FrameContext<'_>,
        params: gpu::PreprocessPassParams,
    ) {
        let debug_mode = params.debug_mode();

        for (resource, access) in [
            (Binding::Primary.to_string(), Access::Read),
            (Binding::Position.to_string(), Access::Read),
            (Binding::Normal.to_string(), Access::Read),
            (Binding::Motion.to_string(), Access::Read),
            (DenoiserBuffers::HISTORY_POSITION.into(), Access::Read),
            (DenoiserBuffers::HISTORY_NORMAL.into(), Access::Read),
            (DenoiserBuffers::ACCUMULATION.into(), Access::ReadWrite),
            (DenoiserBuffers::ACCEPTS.into(), Access::Write),
        ] {
            ctx.states.barrier(encoder, &resource, access);
        }

        if debug_mode.is_preprocess() {
            ctx.states.barrier(
                encoder,
                &Binding::Output.to_string(),
                Access::Write,
            );
        }

        let primary = inputs.primary.read();
        let position = inputs.position.read();
        let normal = inputs.normal.read();
        let motion = inputs.motion.read();
        let mut output = inputs.output.write();

        let DenoiserBuffers {
            history,
            accumulation,
            accepts,
            ..
        } = buffers;

        let (prev_accumulation, accumulation) =
            accumulation.split(ctx.frame.read_slot());

        self.pass.run(encoder, ctx.size, params, |params| {
            let kernel = gpu::Preprocessor {
                params,
                primary: primary.view(),
                position: position.view(),
                prev_position: history.position.view(),
                normal: normal.view(),
                prev_normal: history.normal.view(),
                motion: motion.view(),
                prev_accumulation: prev_accumulation.view(),
            };

            accumulation
                .par_rows_mut()
                .zip(accepts.par_rows_mut())
                .zip(output.par_rows_mut())
                .enumerate()
                .for_each(|(y, ((accumulation, accepts), output))| {
                    let texels = accumulation
                        .iter_mut()
                        .zip(accepts.iter_mut())
                        .zip(output.iter_mut());

                    for (x, ((accumulation, accepts), output)) in
                        texels.enumerate()
                    {
                        let out = kernel.run(uvec2(x as u32, y as u32));

                        *accumulation = out.accumulated;
                        *accepts = out.accepts.bits();

                        if let Some(color) = out.display(debug_mode) {
                            *output = color;
                        }
                    }
                });
        });
    }
}
