//! Power squelch with hysteresis

/// Power squelch
///
/// The squelch opens when the mean-square power of a chunk
/// exceeds the threshold. Once open, it stays open until the
/// power drops below `threshold - hysteresis`. Chunks which
/// arrive while the squelch is closed are not demodulated.
#[derive(Clone, Debug, PartialEq)]
pub struct SquelchGate {
    threshold: f32,
    hysteresis: f32,
    open: bool,
    power: f32,
}

impl SquelchGate {
    /// New squelch, initially closed
    pub fn new(threshold: f32, hysteresis: f32) -> Self {
        Self {
            threshold: f32::max(threshold, 0.0),
            hysteresis: f32::max(hysteresis, 0.0),
            open: false,
            power: 0.0,
        }
    }

    /// Evaluate a chunk of audio
    ///
    /// Returns `true` if the chunk should be processed.
    pub fn input(&mut self, samples: &[f32]) -> bool {
        self.power = mean_power(samples);
        if self.open {
            if self.power < self.threshold - self.hysteresis {
                self.open = false;
            }
        } else if self.power > self.threshold {
            self.open = true;
        }
        self.open
    }

    /// True if the squelch is open
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Power of the most recent chunk
    pub fn power(&self) -> f32 {
        self.power
    }

    /// Close the squelch
    pub fn reset(&mut self) {
        self.open = false;
        self.power = 0.0;
    }
}

/// Mean-square power of `samples`, or zero if empty
pub fn mean_power(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32
}
