use std::time::Duration;

use crate::receiver::{DscReceiver, HealthLimits};
use crate::tone::ToneFrequencyPair;
use crate::waveform::{DEFAULT_FFT_SIZE, DEFAULT_MAX_PARITY_ERRORS, FSK_SHIFT_HZ};

/// Builds a DSC receiver
///
/// The builder comes with a sensible set of default options.
/// All you really need to provide is the input sampling rate.
/// The defaults assume 16-bit audio from an SSB receiver tuned
/// so that the DSC tones land at 1615 Hz and 1785 Hz.
///
/// ```
/// use dscrx::DscReceiverBuilder;
///
/// let receiver = DscReceiverBuilder::new(48000)
///     .with_phases(4)
///     .with_auto_tune(false)
///     .build();
/// assert_eq!(receiver.input_rate(), 48000);
/// ```
///
/// The API specified by the builder is part of this crate's
/// API. The actual default values are *not*, however, and
/// are subject to revision in any minor release. If you
/// care very strongly about a setting, be sure to configure
/// it here.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DscReceiverBuilder {
    input_rate: u32,
    phases: usize,
    fft_size: usize,
    tones: ToneFrequencyPair,
    auto_tune: bool,
    tuning_band: (f32, f32),
    shift: f32,
    shift_tolerance: f32,
    dominance: f32,
    spectrum_events: bool,
    squelch_threshold: f32,
    squelch_hysteresis: f32,
    settle_window: Duration,
    chunk_bytes: usize,
    max_parity_errors: u32,
    health: HealthLimits,
    idle_wait: Duration,
    error_backoff_step: Duration,
    error_backoff_max: Duration,
    stop_grace: Duration,
}

impl DscReceiverBuilder {
    /// New receiver chain with "sensible" defaults
    ///
    /// The only mandatory parameter is the input sampling
    /// rate, in Hz. Rates which are a multiple of the 100 Hz
    /// DSC baud rate keep bit windows exactly aligned; 44100
    /// and 48000 Hz both qualify.
    pub fn new(input_rate: u32) -> Self {
        Self {
            input_rate,
            phases: 3,
            fft_size: DEFAULT_FFT_SIZE,
            tones: ToneFrequencyPair::default(),
            auto_tune: true,
            tuning_band: (1400.0, 2000.0),
            shift: FSK_SHIFT_HZ,
            shift_tolerance: 10.0,
            dominance: 0.10,
            spectrum_events: true,
            squelch_threshold: 1.0e-7,
            squelch_hysteresis: 0.0,
            settle_window: Duration::from_secs(2),
            chunk_bytes: 1764,
            max_parity_errors: DEFAULT_MAX_PARITY_ERRORS,
            health: HealthLimits::default(),
            idle_wait: Duration::from_millis(10),
            error_backoff_step: Duration::from_secs(1),
            error_backoff_max: Duration::from_secs(5),
            stop_grace: Duration::from_secs(5),
        }
    }

    /// Build a receiver chain
    ///
    /// Once built, the receiver chain is immediately ready to
    /// process samples.
    pub fn build(&self) -> DscReceiver {
        DscReceiver::from(self)
    }

    /// Number of bit-phase windows
    ///
    /// The receiver slices the audio into bits at this many
    /// different phase offsets, spread across half a bit, and
    /// decodes each independently. More phases tolerate more
    /// clock error at the cost of CPU. Clamped to `1..=8`.
    pub fn with_phases(&mut self, phases: usize) -> &mut Self {
        self.phases = usize::clamp(phases, 1, 8);
        self
    }

    /// FFT length for tone detection
    ///
    /// Each bit window is zero-padded to this length. Clamped
    /// to at least one bit of audio.
    pub fn with_fft_size(&mut self, fft_size: usize) -> &mut Self {
        self.fft_size = usize::max(fft_size, crate::waveform::samples_per_bit(self.input_rate));
        self
    }

    /// Initial mark and space frequencies (Hz)
    ///
    /// The lower of the two is the mark (`1`) tone.
    pub fn with_tones(&mut self, a: f32, b: f32) -> &mut Self {
        self.tones = ToneFrequencyPair::from_tones(a, b);
        self
    }

    /// Enable or disable automatic tone tracking
    pub fn with_auto_tune(&mut self, enabled: bool) -> &mut Self {
        self.auto_tune = enabled;
        self
    }

    /// Frequency band searched by the tone tracker (Hz)
    pub fn with_tuning_band(&mut self, low: f32, high: f32) -> &mut Self {
        let low = f32::max(low, 0.0);
        let high = f32::max(high, 0.0);
        self.tuning_band = (f32::min(low, high), f32::max(low, high));
        self
    }

    /// Expected FSK shift and tolerance (Hz)
    ///
    /// The tone tracker only accepts a pair of peaks whose
    /// separation is within `tolerance` of `shift`.
    pub fn with_shift(&mut self, shift: f32, tolerance: f32) -> &mut Self {
        self.shift = shift.abs();
        self.shift_tolerance = tolerance.abs();
        self
    }

    /// Required power dominance of the stronger peak (fraction)
    ///
    /// The tone tracker only retunes when the two peaks differ
    /// in power by more than this fraction of the larger one.
    pub fn with_dominance(&mut self, dominance: f32) -> &mut Self {
        self.dominance = f32::clamp(dominance, 0.0, 1.0);
        self
    }

    /// Publish the in-band spectrum to subscribers
    ///
    /// When enabled, every chunk of audio produces a
    /// [`DscEvent::Spectrum`](crate::DscEvent::Spectrum).
    /// Subscribers which only want calls should disable this.
    pub fn with_spectrum_events(&mut self, enabled: bool) -> &mut Self {
        self.spectrum_events = enabled;
        self
    }

    /// Squelch threshold and hysteresis (mean-square power)
    ///
    /// The squelch opens when chunk power exceeds `threshold`
    /// and closes when power drops below `threshold - hysteresis`.
    /// Set both to zero to disable the squelch.
    pub fn with_squelch(&mut self, threshold: f32, hysteresis: f32) -> &mut Self {
        self.squelch_threshold = f32::max(threshold, 0.0);
        self.squelch_hysteresis = f32::clamp(hysteresis, 0.0, self.squelch_threshold);
        self
    }

    /// Candidate settling window
    ///
    /// A decoded call is issued once no better candidate for it
    /// has arrived for this long.
    pub fn with_settle_window(&mut self, window: Duration) -> &mut Self {
        self.settle_window = window;
        self
    }

    /// Audio read size (bytes)
    ///
    /// Rounded down to whole 16-bit samples. The default of
    /// 1764 bytes is two bits of audio at 44100 Hz.
    pub fn with_chunk_bytes(&mut self, bytes: usize) -> &mut Self {
        self.chunk_bytes = usize::max(bytes, 2) & !1;
        self
    }

    /// Maximum parity errors per synchronization attempt
    pub fn with_max_parity_errors(&mut self, max_err: u32) -> &mut Self {
        self.max_parity_errors = max_err;
        self
    }

    /// Health and error recovery thresholds
    pub fn with_health_limits(&mut self, limits: HealthLimits) -> &mut Self {
        self.health = limits;
        self
    }

    /// Consecutive errors which halt the receiver
    ///
    /// At least one error is required to halt.
    pub fn with_max_consecutive_errors(&mut self, max_err: u32) -> &mut Self {
        self.health.max_consecutive_errors = u32::max(max_err, 1);
        self
    }

    /// Wait between reads which return no audio
    pub fn with_idle_wait(&mut self, wait: Duration) -> &mut Self {
        self.idle_wait = wait;
        self
    }

    /// Retry backoff after a read error
    ///
    /// The receiver waits `step` times the number of consecutive
    /// errors, but never longer than `max`.
    pub fn with_error_backoff(&mut self, step: Duration, max: Duration) -> &mut Self {
        self.error_backoff_step = step;
        self.error_backoff_max = max;
        self
    }

    /// How long a stop request may take to complete
    pub fn with_stop_grace(&mut self, grace: Duration) -> &mut Self {
        self.stop_grace = grace;
        self
    }

    /// Input sampling rate (Hz)
    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    /// Number of bit-phase windows
    pub fn phases(&self) -> usize {
        self.phases
    }

    /// FFT length for tone detection
    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    /// Initial tone pair
    pub fn tones(&self) -> ToneFrequencyPair {
        self.tones
    }

    /// True if automatic tone tracking is enabled
    pub fn auto_tune(&self) -> bool {
        self.auto_tune
    }

    /// Tone tracker search band, `(low, high)` Hz
    pub fn tuning_band(&self) -> (f32, f32) {
        self.tuning_band
    }

    /// Expected FSK shift and tolerance, `(shift, tolerance)` Hz
    pub fn shift(&self) -> (f32, f32) {
        (self.shift, self.shift_tolerance)
    }

    /// Required power dominance (fraction)
    pub fn dominance(&self) -> f32 {
        self.dominance
    }

    /// True if spectrum events are published
    pub fn spectrum_events(&self) -> bool {
        self.spectrum_events
    }

    /// Squelch `(threshold, hysteresis)`
    pub fn squelch(&self) -> (f32, f32) {
        (self.squelch_threshold, self.squelch_hysteresis)
    }

    /// Candidate settling window
    pub fn settle_window(&self) -> Duration {
        self.settle_window
    }

    /// Audio read size (bytes)
    pub fn chunk_bytes(&self) -> usize {
        self.chunk_bytes
    }

    /// Maximum parity errors per synchronization attempt
    pub fn max_parity_errors(&self) -> u32 {
        self.max_parity_errors
    }

    /// Health and error recovery thresholds
    pub fn health_limits(&self) -> HealthLimits {
        self.health
    }

    /// Wait between reads which return no audio
    pub fn idle_wait(&self) -> Duration {
        self.idle_wait
    }

    /// Retry backoff `(step, max)`
    pub fn error_backoff(&self) -> (Duration, Duration) {
        (self.error_backoff_step, self.error_backoff_max)
    }

    /// How long a stop request may take to complete
    pub fn stop_grace(&self) -> Duration {
        self.stop_grace
    }
}

impl std::default::Default for DscReceiverBuilder {
    fn default() -> Self {
        Self::new(44100)
    }
}
