//! Gaussian falloff used for both the spatial and the intensity weight.

/// How a Gaussian falloff value is turned into a weight.
///
/// `Exact` is the reference. `Quantized` truncates the falloff to one of
/// `levels + 1` steps (`0, 1/levels, ..., 1`), so every quantized weight is at
/// most `1 / levels` below the exact one and never above it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Weighting {
    #[default]
    Exact,
    Quantized { levels: u32 },
}

impl Weighting {
    /// Step count of the classic three-level fast path.
    pub const DEFAULT_LEVELS: u32 = 3;

    /// Three-level quantization.
    pub fn quantized() -> Self {
        Weighting::Quantized {
            levels: Self::DEFAULT_LEVELS,
        }
    }

    /// Largest absolute difference to the exact weight.
    pub fn tolerance(&self) -> f64 {
        match *self {
            Weighting::Exact => 0.0,
            Weighting::Quantized { levels } => 1.0 / levels as f64,
        }
    }
}

/// `exp(-0.5 * d² / sigma²)` with the configured weighting.
#[derive(Debug, Clone, Copy)]
pub struct Falloff {
    coeff: f64,
    weighting: Weighting,
}

impl Falloff {
    pub fn new(sigma: f64, weighting: Weighting) -> Self {
        Falloff {
            coeff: -0.5 / (sigma * sigma),
            weighting,
        }
    }

    /// Weight for a squared distance.
    #[inline]
    pub fn at(&self, dist_sq: f64) -> f64 {
        let w = (self.coeff * dist_sq).exp();
        match self.weighting {
            Weighting::Exact => w,
            Weighting::Quantized { levels } => {
                let levels = levels as f64;
                (w * levels).floor() / levels
            }
        }
    }
}
