//! Multi-phase bit slicing
//!
//! The receiver does not recover symbol timing. Instead, it
//! slices the audio into bit-length windows at several fixed
//! phase offsets and decodes each resulting bitstream
//! independently. At least one phase will be close to the
//! transmitter's bit timing.

use crate::tone::{BitDecision, ToneBitDetector, ToneFrequencyPair};
use crate::waveform::{samples_per_bit, DEFAULT_FFT_SIZE};

/// Slices audio into K phase-shifted bitstreams
///
/// Stream `j` samples bit windows starting at offset
/// `j * slip`, where `slip` is `floor(spb / 2) / K`. Samples
/// which do not yet form a complete window for every phase are
/// carried over to the next call.
#[derive(Debug)]
pub struct BitstreamSynchronizer {
    detector: ToneBitDetector,
    samples_per_bit: usize,
    phases: usize,
    slip: usize,
    tail: Vec<f32>,
    confidence: f32,
}

impl BitstreamSynchronizer {
    /// Create for the given sampling rate and number of phases
    ///
    /// At least one phase is always used.
    pub fn new(input_rate: u32, phases: usize) -> Self {
        Self::with_fft_len(input_rate, phases, DEFAULT_FFT_SIZE)
    }

    /// Create with a custom bit detector FFT length
    pub fn with_fft_len(input_rate: u32, phases: usize, fft_len: usize) -> Self {
        let phases = usize::max(phases, 1);
        let spb = usize::max(samples_per_bit(input_rate), 1);
        Self {
            detector: ToneBitDetector::with_fft_len(input_rate, fft_len),
            samples_per_bit: spb,
            phases,
            slip: (spb / 2) / phases,
            tail: Vec::new(),
            confidence: 0.0,
        }
    }

    /// Slice a chunk of audio into bits
    ///
    /// Returns exactly `phases()` bitstreams, which may be
    /// empty if too little audio has arrived.
    pub fn input(&mut self, chunk: &[f32], tones: ToneFrequencyPair) -> Vec<Vec<u8>> {
        let mut combined = std::mem::take(&mut self.tail);
        combined.extend_from_slice(chunk);

        let mut streams = vec![Vec::new(); self.phases];
        let reach = (self.phases - 1) * self.slip + self.samples_per_bit;
        let mut confidence_sum = 0.0f32;
        let mut decisions = 0usize;

        let mut i = 0;
        while i + reach <= combined.len() {
            for (j, stream) in streams.iter_mut().enumerate() {
                let start = i + j * self.slip;
                let BitDecision { bit, confidence } = self
                    .detector
                    .detect(&combined[start..start + self.samples_per_bit], tones);
                stream.push(bit);
                confidence_sum += confidence;
                decisions += 1;
            }
            i += self.samples_per_bit;
        }

        if decisions > 0 {
            self.confidence = confidence_sum / decisions as f32;
        }

        combined.drain(0..usize::min(i, combined.len()));
        self.tail = combined;
        streams
    }

    /// Number of phase-shifted streams
    pub fn phases(&self) -> usize {
        self.phases
    }

    /// Phase offset between adjacent streams (samples)
    pub fn slip(&self) -> usize {
        self.slip
    }

    /// Samples per bit
    pub fn samples_per_bit(&self) -> usize {
        self.samples_per_bit
    }

    /// Mean bit confidence over the most recent call which produced bits
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Discard carried-over samples
    pub fn reset(&mut self) {
        self.tail.clear();
        self.confidence = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::waveform::modulate_fsk;

    #[test]
    fn test_geometry() {
        let sync = BitstreamSynchronizer::new(44100, 3);
        assert_eq!(441, sync.samples_per_bit());
        assert_eq!(73, sync.slip());
        assert_eq!(3, sync.phases());

        let sync = BitstreamSynchronizer::new(44100, 0);
        assert_eq!(1, sync.phases());
        assert_eq!(220, sync.slip());
    }

    #[test]
    fn test_carry_over() {
        let tones = ToneFrequencyPair::default();
        let mut sync = BitstreamSynchronizer::new(44100, 3);

        // one bit of audio is not enough for the late phases
        let streams = sync.input(&[0.0f32; 441], tones);
        assert_eq!(3, streams.len());
        assert!(streams.iter().all(|s| s.is_empty()));

        // now there is enough for one bit on every phase
        let streams = sync.input(&[0.0f32; 441], tones);
        assert!(streams.iter().all(|s| s.len() == 1));
    }

    #[test]
    fn test_slice_bits() {
        let tones = ToneFrequencyPair::default();
        let bits = [1, 0, 1, 1, 0, 0, 1, 0, 1, 1, 1, 0];
        let audio = modulate_fsk(&bits, 44100, tones.mark, tones.space);

        let mut sync = BitstreamSynchronizer::new(44100, 3);
        let mut aligned = Vec::new();
        for chunk in audio.chunks(441) {
            let streams = sync.input(chunk, tones);
            aligned.extend_from_slice(&streams[0]);
        }

        // the final bit is held until more audio arrives
        assert_eq!(&bits[0..bits.len() - 1], aligned.as_slice());
        assert!(sync.confidence() > 0.5);
    }
}
