/// Selects which intermediate image gets routed into the output target.
///
/// Debug views never affect the accumulated state - switching modes back and
/// forth yields the same images as if the mode was never changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DebugMode {
    #[default]
    None,
    PreprocessOutput,
    PreprocessAccepts,
    PreprocessAlpha,
    RegressionOutput,
    RegressionBlocks,
    PostprocessAccepts,
    PostprocessAlpha,
}

impl DebugMode {
    pub const ALL: [Self; 8] = [
        Self::None,
        Self::PreprocessOutput,
        Self::PreprocessAccepts,
        Self::PreprocessAlpha,
        Self::RegressionOutput,
        Self::RegressionBlocks,
        Self::PostprocessAccepts,
        Self::PostprocessAlpha,
    ];

    pub fn from_u32(val: u32) -> Option<Self> {
        Self::ALL.get(val as usize).copied()
    }

    pub fn as_u32(self) -> u32 {
        self as u32
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::None => "None",
            Self::PreprocessOutput => "Preprocess Output",
            Self::PreprocessAccepts => "Preprocess Accepts",
            Self::PreprocessAlpha => "Preprocess Alpha",
            Self::RegressionOutput => "Regression Output",
            Self::RegressionBlocks => "Regression Blocks",
            Self::PostprocessAccepts => "Postprocess Accepts",
            Self::PostprocessAlpha => "Postprocess Alpha",
        }
    }

    /// Returns the next mode, wrapping around; handy for cycling through the
    /// views with a single key.
    pub fn next(self) -> Self {
        Self::ALL[(self.as_u32() as usize + 1) % Self::ALL.len()]
    }

    pub fn is_preprocess(self) -> bool {
        matches!(
            self,
            Self::PreprocessOutput
                | Self::PreprocessAccepts
                | Self::PreprocessAlpha
        )
    }

    pub fn is_regression(self) -> bool {
        matches!(self, Self::RegressionOutput | Self::RegressionBlocks)
    }

    /// Whether postprocess owns the output target in this mode - it does for
    /// the regular (non-debug) output, too.
    pub fn is_postprocess(self) -> bool {
        matches!(
            self,
            Self::None | Self::PostprocessAccepts | Self::PostprocessAlpha
        )
    }
}
