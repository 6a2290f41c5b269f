//! Full receiver chain

#[cfg(not(test))]
use log::{debug, info, trace, warn};

#[cfg(test)]
use std::println as debug;
#[cfg(test)]
use std::println as trace;
#[cfg(test)]
use std::println as info;
#[cfg(test)]
use std::println as warn;

mod health;
mod output;
mod reconcile;
mod timeddata;

pub use health::{HealthLimits, HealthState};
pub use output::{DscEvent, SUBSCRIBER_QUEUE_LEN};
pub use reconcile::{CandidateReconciler, DEFAULT_SETTLE_WINDOW};

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crossbeam_channel::Receiver;
use thiserror::Error;

use crate::autotune::FrequencyAutoTuner;
use crate::bitsync::BitstreamSynchronizer;
use crate::builder::DscReceiverBuilder;
use crate::framing::FrameDecoder;
use crate::message::DscMessage;
use crate::source::{pcm_to_samples, AudioSource, SourceError};
use crate::squelch::SquelchGate;
use crate::tone::ToneFrequencyPair;

use output::EventBus;

/// Fatal receiver error
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum ReceiverError {
    /// The audio source could not be started
    #[error("audio source failed to start: {0}")]
    Start(SourceError),

    /// Too many consecutive errors
    #[error("receiver halted after {errors} consecutive errors")]
    Halted {
        /// Number of consecutive errors
        errors: u32,
    },

    /// Audio contained NaN or infinity
    #[error("non-finite audio sample")]
    NonFiniteSample,
}

/// A complete DSC receiver chain
///
/// The receive chain takes `f32` audio samples and performs
/// the following operations:
///
/// 1. Power squelch
/// 2. Automatic tracking of the mark and space tones
/// 3. Bit slicing at several phase offsets
/// 4. One frame decoder per phase, which finds the dot
///    pattern and phasing sequence, checks character parity,
///    and merges the DX and RX copies of each character
/// 5. Message decoding
/// 6. Reconciliation of the candidate decodings into a
///    single call
///
/// To create the receiver, first create its Builder:
///
/// ```
/// use dscrx::DscReceiverBuilder;
///
/// let mut builder = DscReceiverBuilder::default();
/// let receiver = builder.build();
/// assert_eq!(receiver.input_rate(), 44100);
/// ```
///
/// Audio may be pushed with [`process()`](#method.process),
/// or the receiver may pull it from an [`AudioSource`] with
/// [`run()`](#method.run).
#[derive(Debug)]
pub struct DscReceiver {
    squelch: SquelchGate,
    tuner: FrequencyAutoTuner,
    bitsync: BitstreamSynchronizer,
    framers: Vec<FrameDecoder>,
    reconciler: CandidateReconciler,
    health: HealthState,
    limits: HealthLimits,
    events: EventBus,
    spectrum_events: bool,
    input_rate: u32,
    chunk_bytes: usize,
    idle_wait: Duration,
    error_backoff_step: Duration,
    error_backoff_max: Duration,
    stop_grace: Duration,
    input_sample_counter: u64,
    messages_issued: u64,
}

impl DscReceiver {
    /// Subscribe to receiver events
    ///
    /// Every subscriber receives every event, including every
    /// decoded call. Events are dropped for a subscriber whose
    /// queue is full. Drop the receiver to unsubscribe.
    pub fn subscribe(&mut self) -> Receiver<DscEvent> {
        self.events.subscribe()
    }

    /// Process a chunk of audio
    ///
    /// The `samples` must be mono audio at the
    /// [`input_rate()`](#method.input_rate), scaled to
    /// `[-1.0, 1.0]`. Chunks of one bit (10 ms) work well,
    /// but any size is accepted. `now` is the time at which
    /// the audio was received.
    ///
    /// Returns a call if one has settled. Calls are also
    /// published to subscribers as [`DscEvent::Message`].
    pub fn process(
        &mut self,
        samples: &[f32],
        now: Instant,
    ) -> Result<Option<DscMessage>, ReceiverError> {
        if samples.iter().any(|sa| !sa.is_finite()) {
            return Err(ReceiverError::NonFiniteSample);
        }

        let before = self.input_sample_counter;
        self.input_sample_counter = self.input_sample_counter.wrapping_add(samples.len() as u64);

        let open = self.squelch.input(samples);
        if before / self.trace_interval() != self.input_sample_counter / self.trace_interval() {
            let tones = self.tuner.tones();
            trace!(
                "[{:<14}]: power {:0.2e}, squelch {}, mark {:0.1} Hz, space {:0.1} Hz, confidence {:0.2}",
                self.input_sample_counter,
                self.squelch.power(),
                if open { "open" } else { "closed" },
                tones.mark,
                tones.space,
                self.bitsync.confidence()
            );
        }

        if open {
            self.demodulate(samples, now);
        }

        Ok(self.poll(now))
    }

    /// Issue a settled call, if any
    ///
    /// A call settles once no new candidate for it has arrived
    /// within the settling window. [`process()`](#method.process)
    /// polls automatically; call this when no audio is arriving.
    pub fn poll(&mut self, now: Instant) -> Option<DscMessage> {
        let msg = self.reconciler.poll(now)?;
        Some(self.issue(msg))
    }

    /// Issue any pending call immediately
    ///
    /// Use this when the input ends, such as at the end of a
    /// file, so the final call is not lost.
    pub fn flush(&mut self) -> Option<DscMessage> {
        let msg = self.reconciler.flush()?;
        Some(self.issue(msg))
    }

    /// Receive from an audio source until stopped
    ///
    /// Starts the `source` on the given `device` and reads
    /// [`chunk_bytes()`](#method.chunk_bytes) at a time until
    /// `stop` becomes `true` or a finite source is exhausted.
    /// The source is always stopped before returning.
    ///
    /// Read errors are reported to subscribers and retried with
    /// a growing backoff. The receiver halts with an error when
    /// too many consecutive reads or chunks fail. When `stop`
    /// is set, any call which has not yet settled is discarded.
    pub fn run<S>(
        &mut self,
        source: &mut S,
        device: u32,
        stop: &AtomicBool,
    ) -> Result<(), ReceiverError>
    where
        S: AudioSource + ?Sized,
    {
        if let Err(err) = source.start(device) {
            warn!("receiver: {}", err);
            self.events.publish(DscEvent::Error(err.to_string()));
            return Err(ReceiverError::Start(err));
        }

        info!("receiver: started on device {}", device);
        self.health.set_running(true);
        self.events
            .publish(DscEvent::Status(format!("started on device {}", device)));

        let result = self.acquire(source, stop);

        source.stop();
        self.health.set_running(false);
        info!("receiver: stopped");
        self.events.publish(DscEvent::Status("stopped".to_owned()));
        result
    }

    /// Health snapshot
    pub fn health(&self) -> &HealthState {
        &self.health
    }

    /// Health thresholds
    pub fn health_limits(&self) -> &HealthLimits {
        &self.limits
    }

    /// Liveness predicate
    ///
    /// True if [`run()`](#method.run) is receiving audio and
    /// is not accumulating errors.
    pub fn is_healthy(&self, now: Instant) -> bool {
        self.health.is_healthy(now, &self.limits)
    }

    /// Current mark and space estimate
    pub fn tones(&self) -> ToneFrequencyPair {
        self.tuner.tones()
    }

    /// Input sampling rate
    pub fn input_rate(&self) -> u32 {
        self.input_rate
    }

    /// Audio read size (bytes)
    pub fn chunk_bytes(&self) -> usize {
        self.chunk_bytes
    }

    /// How long a stop request may take to complete
    pub fn stop_grace(&self) -> Duration {
        self.stop_grace
    }

    /// Lifetime total of input samples processed
    pub fn input_sample_counter(&self) -> u64 {
        self.input_sample_counter
    }

    /// Lifetime total of calls issued
    pub fn messages_issued(&self) -> u64 {
        self.messages_issued
    }

    /// Clear all DSP states
    ///
    /// Buffered audio, bits, and pending candidates are
    /// discarded. The tone estimate and health are kept.
    pub fn reset(&mut self) {
        self.squelch.reset();
        self.tuner.reset();
        self.bitsync.reset();
        for framer in &mut self.framers {
            framer.reset();
        }
        self.reconciler.reset();
        self.input_sample_counter = 0;
    }

    // squelch is open: tune, slice, and frame
    fn demodulate(&mut self, samples: &[f32], now: Instant) {
        let tuned = self.tuner.input(samples);
        if self.spectrum_events && self.events.has_subscribers() {
            self.events.publish(DscEvent::Spectrum(tuned.spectrum));
        }

        let chunk = match tuned.delayed {
            Some(chunk) => chunk,
            None => return,
        };

        let streams = self.bitsync.input(&chunk, self.tuner.tones());
        for (phase, (framer, bits)) in self.framers.iter_mut().zip(streams).enumerate() {
            if bits.is_empty() {
                continue;
            }

            for frame in framer.push_bits(&bits) {
                let msg = DscMessage::decode(&frame);
                info!(
                    "receiver [{:<14}]: phase {} candidate: {}, {} good symbols, {}",
                    self.input_sample_counter,
                    phase,
                    msg.format(),
                    msg.valid_symbol_count(),
                    msg.status()
                );
                self.reconciler.accept(msg, now);
            }
        }
    }

    // log and publish a settled call
    fn issue(&mut self, msg: DscMessage) -> DscMessage {
        self.messages_issued += 1;
        info!(
            "receiver: issued {} ({}), status {}",
            msg.format(),
            msg.from().map(|id| id.as_str()).unwrap_or("unknown"),
            msg.status()
        );
        self.events.publish(DscEvent::Message(msg.clone()));
        msg
    }

    // acquisition loop; the source is already started
    fn acquire<S>(&mut self, source: &mut S, stop: &AtomicBool) -> Result<(), ReceiverError>
    where
        S: AudioSource + ?Sized,
    {
        let max_errors = self.limits.max_consecutive_errors;
        let started = Instant::now();
        let first_sample = self.input_sample_counter;

        while !stop.load(Ordering::Relaxed) {
            let now = Instant::now();
            if self.health.expire_errors(now, self.limits.error_reset) {
                debug!("receiver: error counters cleared");
            }

            // finite sources may be read faster than real time,
            // so the audio itself is the clock when it runs ahead
            let audio_elapsed = Duration::from_secs_f64(
                self.input_sample_counter.wrapping_sub(first_sample) as f64
                    / self.input_rate as f64,
            );
            let clock = Instant::max(now, started + audio_elapsed);
            self.poll(clock);

            match source.read(self.chunk_bytes) {
                Ok(bytes) if bytes.is_empty() => {
                    if source.is_finished() {
                        info!("receiver: end of input");
                        self.flush();
                        break;
                    }

                    if self.health.record_empty_read() > Self::EMPTY_READ_LIMIT {
                        warn!("receiver: no audio data received");
                        self.events
                            .publish(DscEvent::Error("no audio data received".to_owned()));
                        self.health.clear_empty_reads();
                    }
                    self.wait(self.idle_wait, stop);
                }
                Ok(bytes) => {
                    self.health.record_data(now);
                    let samples = pcm_to_samples(&bytes);
                    match self.process(&samples, clock) {
                        Ok(_) => self.health.record_processed(),
                        Err(err) => {
                            let errors = self.health.record_processing_error(now);
                            warn!("receiver: processing error {}/{}: {}", errors, max_errors, err);
                            self.events.publish(DscEvent::Error(err.to_string()));
                            if errors >= max_errors {
                                return Err(self.halt(errors));
                            }
                            self.wait(self.error_backoff(errors), stop);
                        }
                    }
                }
                Err(err) => {
                    let errors = self.health.record_read_error(now);
                    warn!("receiver: read error {}/{}: {}", errors, max_errors, err);
                    self.events.publish(DscEvent::Error(err.to_string()));
                    if errors >= max_errors {
                        return Err(self.halt(errors));
                    }

                    self.wait(self.error_backoff(errors), stop);
                }
            }
        }

        Ok(())
    }

    // wait after the given number of consecutive errors
    fn error_backoff(&self, errors: u32) -> Duration {
        std::cmp::min(
            self.error_backoff_step.saturating_mul(errors),
            self.error_backoff_max,
        )
    }

    fn halt(&mut self, errors: u32) -> ReceiverError {
        let err = ReceiverError::Halted { errors };
        warn!("receiver: {}", err);
        self.health.halt();
        self.events.publish(DscEvent::Error(err.to_string()));
        err
    }

    // sleep, waking early if stopped
    fn wait(&self, duration: Duration, stop: &AtomicBool) {
        let deadline = Instant::now() + duration;
        loop {
            let now = Instant::now();
            if now >= deadline || stop.load(Ordering::Relaxed) {
                return;
            }
            std::thread::sleep(Duration::min(deadline - now, Self::STOP_POLL_INTERVAL));
        }
    }

    // print trace-level messages about once per second
    fn trace_interval(&self) -> u64 {
        u64::max(self.input_rate as u64, 1)
    }

    // consecutive empty reads before an error is reported
    const EMPTY_READ_LIMIT: u32 = 100;

    // how often a sleeping receiver checks for a stop request
    const STOP_POLL_INTERVAL: Duration = Duration::from_millis(50);
}

impl From<&DscReceiverBuilder> for DscReceiver {
    /// Create the DSC Receiver from its Builder
    fn from(cfg: &DscReceiverBuilder) -> Self {
        let input_rate = cfg.input_rate();
        let (squelch_threshold, squelch_hysteresis) = cfg.squelch();
        let (shift, tolerance) = cfg.shift();
        let (error_backoff_step, error_backoff_max) = cfg.error_backoff();

        let tuner = FrequencyAutoTuner::new(
            input_rate,
            cfg.tones(),
            cfg.tuning_band(),
            shift,
            tolerance,
        )
        .with_fft_len(cfg.fft_size())
        .with_dominance(cfg.dominance())
        .with_enabled(cfg.auto_tune());
        let bitsync = BitstreamSynchronizer::with_fft_len(input_rate, cfg.phases(), cfg.fft_size());
        let framers = (0..bitsync.phases())
            .map(|_| FrameDecoder::with_max_parity_errors(cfg.max_parity_errors()))
            .collect();

        Self {
            squelch: SquelchGate::new(squelch_threshold, squelch_hysteresis),
            tuner,
            bitsync,
            framers,
            reconciler: CandidateReconciler::new(cfg.settle_window()),
            health: HealthState::default(),
            limits: cfg.health_limits(),
            events: EventBus::default(),
            spectrum_events: cfg.spectrum_events(),
            input_rate,
            chunk_bytes: cfg.chunk_bytes(),
            idle_wait: cfg.idle_wait(),
            error_backoff_step,
            error_backoff_max,
            stop_grace: cfg.stop_grace(),
            input_sample_counter: 0,
            messages_issued: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Cursor;

    use crate::message::FormatSpecifier;
    use crate::source::{samples_to_pcm, PcmSource};
    use crate::symbol::Symbol;
    use crate::waveform::{make_burst, modulate_fsk, DEFAULT_MARK_HZ, DEFAULT_SPACE_HZ};

    const DISTRESS: [u8; 20] = [
        112, 112, 25, 58, 5, 99, 70, 107, 4, 52, 60, 13, 7, 12, 52, 109, 127, 52, 127, 127,
    ];

    // one distress burst at 44.1 kHz, at half scale
    fn distress_audio() -> Vec<f32> {
        let bits = make_burst(&DISTRESS, 20, 400);
        modulate_fsk(&bits, 44100, DEFAULT_MARK_HZ, DEFAULT_SPACE_HZ)
            .into_iter()
            .map(|sa| 0.5 * sa)
            .collect()
    }

    fn assert_distress(msg: &DscMessage) {
        let expect: Vec<Symbol> = DISTRESS.iter().map(|v| Symbol::new(*v)).collect();
        assert_eq!(FormatSpecifier::DistressAlert, msg.format());
        assert_eq!(&expect, &msg.symbols()[0..DISTRESS.len()]);
        assert_eq!("255805997", msg.from().expect("from").as_str());
        assert!(msg.is_ok());
    }

    // audio source which always fails
    #[derive(Debug, Default)]
    struct BrokenSource {
        started: bool,
        stopped: bool,
        reads: u32,
    }

    impl AudioSource for BrokenSource {
        fn start(&mut self, _device: u32) -> Result<(), SourceError> {
            self.started = true;
            Ok(())
        }

        fn read(&mut self, _byte_count: usize) -> Result<Vec<u8>, SourceError> {
            self.reads += 1;
            Err(SourceError::Io {
                kind: std::io::ErrorKind::BrokenPipe,
                message: "unplugged".to_owned(),
            })
        }

        fn stop(&mut self) {
            self.stopped = true;
        }
    }

    // audio source which never has audio and asks to stop
    #[derive(Debug)]
    struct SilentSource<'a> {
        stop_after: u32,
        reads: u32,
        stop: &'a AtomicBool,
    }

    impl<'a> AudioSource for SilentSource<'a> {
        fn start(&mut self, device: u32) -> Result<(), SourceError> {
            if device == 0 {
                Ok(())
            } else {
                Err(SourceError::Open {
                    device,
                    reason: "no such device".to_owned(),
                })
            }
        }

        fn read(&mut self, _byte_count: usize) -> Result<Vec<u8>, SourceError> {
            self.reads += 1;
            if self.reads >= self.stop_after {
                self.stop.store(true, Ordering::Relaxed);
            }
            Ok(Vec::new())
        }

        fn stop(&mut self) {}
    }

    #[test]
    fn test_top_level_receiver() {
        let audio = distress_audio();
        let mut rx = DscReceiverBuilder::new(44100).build();
        println!("{:?}", rx.tones());

        let t0 = Instant::now();
        let mut out = Vec::new();
        for (i, chunk) in audio.chunks(441).enumerate() {
            let now = t0 + Duration::from_millis(10 * i as u64);
            if let Some(msg) = rx.process(chunk, now).expect("finite audio") {
                out.push(msg);
            }
        }
        out.extend(rx.flush());

        assert_eq!(1, out.len());
        assert_distress(&out[0]);
        assert_eq!(1, rx.messages_issued());
        assert_eq!(audio.len() as u64, rx.input_sample_counter());

        // nothing left to issue
        assert_eq!(None, rx.flush());
    }

    #[test]
    fn test_settles_after_window() {
        let mut audio = distress_audio();
        audio.extend(std::iter::repeat(0.0f32).take(3 * 44100));

        let mut rx = DscReceiverBuilder::new(44100)
            .with_spectrum_events(false)
            .build();
        let events = rx.subscribe();

        let t0 = Instant::now();
        let mut out = Vec::new();
        for (i, chunk) in audio.chunks(441).enumerate() {
            let now = t0 + Duration::from_millis(10 * i as u64);
            out.extend(rx.process(chunk, now).expect("finite audio"));
        }

        // the trailing silence is long enough to settle
        assert_eq!(1, out.len());
        assert_distress(&out[0]);
        assert_eq!(None, rx.flush());

        let evt = events.try_recv().expect("message event");
        assert_distress(evt.message().expect("message"));
        assert!(events.try_recv().is_err());
    }

    #[test]
    fn test_rejects_non_finite() {
        let mut rx = DscReceiverBuilder::default().build();
        assert_eq!(
            Err(ReceiverError::NonFiniteSample),
            rx.process(&[0.0, f32::NAN], Instant::now())
        );
        assert_eq!(0, rx.input_sample_counter());
    }

    #[test]
    fn test_run_file() {
        let pcm = samples_to_pcm(&distress_audio());
        let mut source = PcmSource::new(Cursor::new(pcm));
        let stop = AtomicBool::new(false);

        let mut rx = DscReceiverBuilder::new(44100)
            .with_spectrum_events(false)
            .build();
        let events = rx.subscribe();
        rx.run(&mut source, 0, &stop).expect("clean exit");

        let all: Vec<DscEvent> = events.try_iter().collect();
        assert_eq!(
            DscEvent::Status("started on device 0".to_owned()),
            all[0]
        );
        assert_eq!(DscEvent::Status("stopped".to_owned()), all[all.len() - 1]);

        let msgs: Vec<&DscMessage> = all.iter().filter_map(|evt| evt.message()).collect();
        assert_eq!(1, msgs.len());
        assert_distress(msgs[0]);

        assert!(!rx.health().is_running());
        assert!(!rx.health().is_halted());
        assert!(rx.health().last_data().is_some());
        assert!(!rx.is_healthy(Instant::now()));
    }

    #[test]
    fn test_run_halts_on_errors() {
        let mut source = BrokenSource::default();
        let stop = AtomicBool::new(false);

        let mut rx = DscReceiverBuilder::new(44100)
            .with_error_backoff(Duration::ZERO, Duration::ZERO)
            .build();
        let events = rx.subscribe();

        assert_eq!(
            Err(ReceiverError::Halted { errors: 10 }),
            rx.run(&mut source, 0, &stop)
        );
        assert!(source.started);
        assert!(source.stopped);
        assert_eq!(10, source.reads);
        assert!(rx.health().is_halted());
        assert_eq!(10, rx.health().consecutive_read_errors());
        assert!(!rx.is_healthy(Instant::now()));

        let errors = events
            .try_iter()
            .filter(|evt| matches!(evt, DscEvent::Error(_)))
            .count();
        assert_eq!(11, errors);
    }

    #[test]
    fn test_error_backoff() {
        let rx = DscReceiverBuilder::new(44100).build();
        assert_eq!(Duration::from_secs(1), rx.error_backoff(1));
        assert_eq!(Duration::from_secs(3), rx.error_backoff(3));
        assert_eq!(Duration::from_secs(5), rx.error_backoff(5));
        assert_eq!(Duration::from_secs(5), rx.error_backoff(9));
    }

    #[test]
    fn test_run_until_stopped() {
        let stop = AtomicBool::new(false);
        let mut source = SilentSource {
            stop_after: 150,
            reads: 0,
            stop: &stop,
        };

        let mut rx = DscReceiverBuilder::new(44100)
            .with_idle_wait(Duration::ZERO)
            .build();
        let events = rx.subscribe();
        assert_eq!(Ok(()), rx.run(&mut source, 0, &stop));
        assert_eq!(150, source.reads);

        // one watchdog report after 101 empty reads
        let all: Vec<DscEvent> = events.try_iter().collect();
        assert_eq!(3, all.len());
        assert_eq!(
            DscEvent::Error("no audio data received".to_owned()),
            all[1]
        );
        assert_eq!(49, rx.health().empty_reads());
        assert!(!rx.health().is_halted());
    }

    #[test]
    fn test_run_start_failure() {
        let stop = AtomicBool::new(false);
        let mut source = SilentSource {
            stop_after: 1,
            reads: 0,
            stop: &stop,
        };

        let mut rx = DscReceiverBuilder::default().build();
        match rx.run(&mut source, 3, &stop) {
            Err(ReceiverError::Start(SourceError::Open { device, .. })) => assert_eq!(3, device),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(0, source.reads);
        assert!(!rx.health().is_running());
    }
}
