use std::time::{Duration, Instant};

use fxhash::FxHashMap;

use crate::gpu::Frame;

pub const TIMESTAMP_BEGIN: &str = "BEGIN";
pub const TIMESTAMP_PREPROCESS: &str = "PreProcess";
pub const TIMESTAMP_REGRESSION: &str = "Regression";
pub const TIMESTAMP_POSTPROCESS: &str = "PostProcess";
pub const TIMESTAMP_END: &str = "END";

/// Timestamps, in the order they're recorded within a frame.
pub const TIMESTAMPS: [&str; 5] = [
    TIMESTAMP_BEGIN,
    TIMESTAMP_PREPROCESS,
    TIMESTAMP_REGRESSION,
    TIMESTAMP_POSTPROCESS,
    TIMESTAMP_END,
];

/// Hook notified when each of the denoiser's stages finishes.
pub trait Benchmark: Send {
    fn begin(&mut self, frame: Frame);
    fn timestamp(&mut self, frame: Frame, label: &'static str);
    fn end(&mut self, frame: Frame);
}

/// Measures stages using wall-clock time.
#[derive(Debug, Default)]
pub struct CpuBenchmark {
    frame: Option<Frame>,
    timestamps: FxHashMap<&'static str, Instant>,
    durations: Vec<(&'static str, Duration)>,
    frames: u64,
}

impl CpuBenchmark {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns how long each stage took during the last completed frame.
    ///
    /// The duration is measured from the previous timestamp, so `END` covers
    /// the history copy.
    pub fn durations(&self) -> &[(&'static str, Duration)] {
        &self.durations
    }

    pub fn duration(&self, label: &str) -> Option<Duration> {
        self.durations
            .iter()
            .find(|(label2, _)| *label2 == label)
            .map(|(_, duration)| *duration)
    }

    /// Number of frames completed so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Benchmark for CpuBenchmark {
    fn begin(&mut self, frame: Frame) {
        self.frame = Some(frame);
        self.timestamps.clear();
        self.timestamps.insert(TIMESTAMP_BEGIN, Instant::now());
    }

    fn timestamp(&mut self, frame: Frame, label: &'static str) {
        assert_eq!(Some(frame), self.frame, "timestamp outside of a frame");

        self.timestamps.insert(label, Instant::now());
    }

    fn end(&mut self, frame: Frame) {
        self.timestamp(frame, TIMESTAMP_END);
        self.frame = None;
        self.frames += 1;
        self.durations.clear();

        for pair in TIMESTAMPS.windows(2) {
            let (Some(prev), Some(curr)) =
                (self.timestamps.get(pair[0]), self.timestamps.get(pair[1]))
            else {
                continue;
            };

            self.durations.push((pair[1], curr.duration_since(*prev)));
        }

        #[cfg(feature = "metrics")]
        for (label, duration) in &self.durations {
            log::info!(
                "Frame {}: {label} took {}",
                frame.get(),
                humantime::format_duration(*duration)
            );
        }
    }
}
