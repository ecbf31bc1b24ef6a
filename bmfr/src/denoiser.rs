mod buffers;
mod pass;
mod passes;

use derivative::Derivative;
use glam::UVec2;
use log::{debug, info, trace};

pub(crate) use self::buffers::*;
pub(crate) use self::pass::*;
pub(crate) use self::passes::*;
use crate::gpu::{
    self, BlockOffset, DebugMode, DispatchGrid, RegressionStats,
};
use crate::{
    Access, Benchmark, Binding, Command, CommandEncoder, DenoiserConfig,
    DenoiserError, DenoiserInputs, DenoiserParams, FrameContext,
    MaskTexture, Texture, TIMESTAMP_BEGIN, TIMESTAMP_END,
    TIMESTAMP_POSTPROCESS, TIMESTAMP_PREPROCESS, TIMESTAMP_REGRESSION,
};

/// Blockwise Multi-Order Feature Regression denoiser.
///
/// Each frame goes through three stages:
///
/// - preprocess, which reprojects the previous accumulation and blends the new
///   noisy sample into it,
///
/// - regression, which fits per-block linear models of radiance over the
///   G-buffer features,
///
/// - postprocess, which blends the filtered image with its own history.
#[derive(Derivative)]
#[derivative(Debug)]
pub struct Denoiser {
    inputs: DenoiserInputs,
    params: DenoiserParams,
    buffers: Option<DenoiserBuffers>,
    passes: DenoiserPasses,
    debug_mode: DebugMode,
    regression_stats: RegressionStats,

    #[derivative(Debug = "ignore")]
    benchmark: Option<Box<dyn Benchmark>>,
}

impl Denoiser {
    pub fn new(config: DenoiserConfig) -> Result<Self, DenoiserError> {
        let inputs = DenoiserInputs::new(&config)?;
        let size = inputs.size();

        info!("Creating denoiser: {}x{}", size.x, size.y);

        let buffers = DenoiserBuffers::new(size);
        let passes = DenoiserPasses::new();

        debug!("Denoiser created");

        Ok(Self {
            inputs,
            params: config.params,
            buffers: Some(buffers),
            passes,
            debug_mode: DebugMode::default(),
            regression_stats: RegressionStats::default(),
            benchmark: config.benchmark,
        })
    }

    pub fn label(&self) -> &'static str {
        "BMFR Denoiser"
    }

    /// Denoises a single frame, writing the result into the output binding.
    ///
    /// Panics if the context's size doesn't match the denoiser's size or if
    /// the denoiser has been destroyed.
    pub fn render(
        &mut self,
        encoder: &mut CommandEncoder,
        ctx: &mut FrameContext<'_>,
    ) {
        let Some(buffers) = &mut self.buffers else {
            panic!("denoiser has been destroyed");
        };

        assert_eq!(
            buffers.size, ctx.size,
            "denoiser has size {:?}, but the frame has size {:?}; did you \
             forget to call `resize()`?",
            buffers.size, ctx.size
        );

        self.inputs.assert_size(ctx.size);

        let frame = ctx.frame;
        let history_valid = buffers.history.valid;
        let debug_mode = self.debug_mode.as_u32();

        trace!(
            "Rendering frame {}; read_slot={}, write_slot={}, history_valid={}",
            frame.get(),
            frame.read_slot(),
            frame.write_slot(),
            history_valid,
        );

        if let Some(benchmark) = &mut self.benchmark {
            benchmark.begin(frame);
            encoder.push(Command::Timestamp { label: TIMESTAMP_BEGIN });
        }

        self.passes.preprocess.run(
            &self.inputs,
            buffers,
            encoder,
            ctx,
            self.params
                .preprocess
                .build(frame, history_valid, debug_mode),
        );

        Self::timestamp(
            &mut self.benchmark,
            encoder,
            ctx,
            TIMESTAMP_PREPROCESS,
        );

        let block_offset = BlockOffset::for_frame(frame);

        trace!("Frame {}: block_offset={:?}", frame.get(), block_offset);

        let regression_params = gpu::RegressionPassParams {
            frame,
            debug_mode,
            screen: ctx.size,
            block_offset: block_offset.get(),
            dispatch_grid: buffers.grid.size(),
        };

        self.regression_stats = self.passes.regression.run(
            &self.inputs,
            buffers,
            encoder,
            ctx,
            regression_params,
        );

        Self::timestamp(
            &mut self.benchmark,
            encoder,
            ctx,
            TIMESTAMP_REGRESSION,
        );

        self.passes.postprocess.run(
            &self.inputs,
            buffers,
            encoder,
            ctx,
            self.params
                .postprocess
                .build(frame, history_valid, debug_mode),
        );

        Self::timestamp(
            &mut self.benchmark,
            encoder,
            ctx,
            TIMESTAMP_POSTPROCESS,
        );

        Self::store_history(&self.inputs, buffers, encoder, ctx);

        if let Some(benchmark) = &mut self.benchmark {
            encoder.push(Command::Timestamp { label: TIMESTAMP_END });
            benchmark.end(frame);
        }
    }

    fn timestamp(
        benchmark: &mut Option<Box<dyn Benchmark>>,
        encoder: &mut CommandEncoder,
        ctx: &FrameContext<'_>,
        label: &'static str,
    ) {
        if let Some(benchmark) = benchmark {
            encoder.push(Command::Timestamp { label });
            benchmark.timestamp(ctx.frame, label);
        }
    }

    /// Copies current G-buffer into the history, so that the next frame can
    /// validate its reprojection against it.
    fn store_history(
        inputs: &DenoiserInputs,
        buffers: &mut DenoiserBuffers,
        encoder: &mut CommandEncoder,
        ctx: &mut FrameContext<'_>,
    ) {
        for (src, dst, input, history) in [
            (
                Binding::Position,
                DenoiserBuffers::HISTORY_POSITION,
                &inputs.position,
                &mut buffers.history.position,
            ),
            (
                Binding::Normal,
                DenoiserBuffers::HISTORY_NORMAL,
                &inputs.normal,
                &mut buffers.history.normal,
            ),
        ] {
            let src = src.to_string();

            ctx.states.barrier(encoder, &src, Access::TransferSrc);
            ctx.states.barrier(encoder, dst, Access::TransferDst);

            encoder.push(Command::Copy {
                src,
                dst: dst.to_owned(),
            });

            history.copy_from(&input.read());
        }

        buffers.history.valid = true;
    }

    /// Reallocates all size-dependent buffers and invalidates the history.
    ///
    /// Input and output textures are owned by the caller, who's responsible
    /// for resizing them as well.
    ///
    /// Resizing to an empty size (e.g. a minimized window) is ignored and the
    /// current buffers, together with their history, are kept.
    pub fn resize(&mut self, size: UVec2) {
        if size.x == 0 || size.y == 0 {
            debug!("Ignoring resize to an empty size: {:?}", size);
            return;
        }

        let Some(buffers) = self.buffers.take() else {
            debug!("Ignoring resize of a destroyed denoiser");
            return;
        };

        debug!("Resizing denoiser: {:?} -> {:?}", buffers.size, size);

        buffers.destroy();

        self.buffers = Some(DenoiserBuffers::new(size));
    }

    /// Makes the next frame ignore all of the accumulated history, e.g. after
    /// a camera cut.
    pub fn ignore_history_next_frame(&mut self) {
        if let Some(buffers) = &mut self.buffers {
            buffers.history.valid = false;
        }
    }

    pub fn is_history_valid(&self) -> bool {
        self.buffers
            .as_ref()
            .map_or(false, |buffers| buffers.history.valid)
    }

    pub fn debug_mode(&self) -> DebugMode {
        self.debug_mode
    }

    pub fn set_debug_mode(&mut self, mode: DebugMode) {
        if mode != self.debug_mode {
            debug!("Switching debug mode: {}", mode.label());
        }

        self.debug_mode = mode;
    }

    pub fn params(&self) -> &DenoiserParams {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut DenoiserParams {
        &mut self.params
    }

    pub fn size(&self) -> UVec2 {
        self.buffers().size
    }

    pub fn dispatch_grid(&self) -> DispatchGrid {
        self.buffers().grid
    }

    /// Returns how the regression blocks of the last rendered frame got
    /// fitted.
    pub fn regression_stats(&self) -> RegressionStats {
        self.regression_stats
    }

    pub fn is_destroyed(&self) -> bool {
        self.buffers.is_none()
    }

    pub fn accumulation(&self, slot: usize) -> &Texture {
        self.buffers().accumulation.get(slot)
    }

    pub fn filtered_history(&self, slot: usize) -> &Texture {
        self.buffers().filtered_history.get(slot)
    }

    pub fn accepts(&self) -> &MaskTexture {
        &self.buffers().accepts
    }

    pub fn filter_image(&self) -> &Texture {
        &self.buffers().filter
    }

    /// Releases all of the denoiser's buffers; afterwards the denoiser can
    /// only be dropped.
    pub fn destroy(&mut self) {
        if let Some(buffers) = self.buffers.take() {
            info!("Destroying denoiser");

            buffers.destroy();
        }
    }

    fn buffers(&self) -> &DenoiserBuffers {
        match &self.buffers {
            Some(buffers) => buffers,
            None => panic!("denoiser has been destroyed"),
        }
    }
}

impl Drop for Denoiser {
    fn drop(&mut self) {
        info!("Deleting denoiser");

        self.destroy();
    }
}
