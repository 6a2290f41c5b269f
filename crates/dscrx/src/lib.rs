//! # dscrx: Digital Selective Calling Demodulation
//!
//! This crate provides a digital demodulator and decoder for maritime
//! [Digital Selective Calling](https://en.wikipedia.org/wiki/Digital_selective_calling)
//! (DSC), as specified by ITU-R M.493. It detects DSC calls in an audio
//! signal, such as the output of an HF or MF single-sideband receiver,
//! and reports them to the caller.
//!
//! ## Disclaimer
//!
//! This crate has not been certified for GMDSS watchkeeping or for any
//! other purpose. The author **strongly discourages** its use in any
//! safety-critical applications. A distress alert received by this
//! software is not a substitute for a type-approved DSC controller.
//!
//! ## Example
//!
//! You will first need *audio* from a receiver tuned to a DSC
//! channel. Tune in upper sideband so that the two DSC tones land
//! near 1615 Hz and 1785 Hz. Obtaining the audio is beyond the scope
//! of this crate. To sample your soundcard, try
//! [cpal](https://crates.io/crates/cpal). If you have a stereo
//! signal, mix to mono first.
//!
//! ```
//! use std::time::Instant;
//! use dscrx::{DscReceiverBuilder, FormatSpecifier};
//!
//! # let some_audio_source = || vec![0.0f32; 441];
//! #
//! // create a DscReceiver with your audio sampling rate
//! let mut rx = DscReceiverBuilder::new(44100)
//!     .with_phases(3)                  // bit phases to try
//!     .with_squelch(1.0e-7, 0.0)       // squelch power and hysteresis
//!     .with_tones(1615.0, 1785.0)      // initial mark and space (Hz)
//!     .build();
//!
//! // feed f32 audio at the sampling rate, in any chunk size
//! let audio = some_audio_source();
//! for chunk in audio.chunks(441) {
//!     if let Some(call) = rx.process(chunk, Instant::now()).expect("bad audio") {
//!         if call.format() == FormatSpecifier::DistressAlert {
//!             println!("DISTRESS:\n{}", call);
//!         }
//!     }
//! }
//! ```
//!
//! The digital receiver is created via a
//! [builder](struct.DscReceiverBuilder.html). You may push audio to
//! the [`DscReceiver`](struct.DscReceiver.html) as shown above, or
//! implement [`AudioSource`] and let the receiver pull it with
//! [`DscReceiver::run()`]. Either way, every decoded call is also
//! sent to each [subscriber](struct.DscReceiver.html#method.subscribe)
//! as a [`DscEvent`].
//!
//! Calls which were received with errors are still reported. Check
//! the [`status()`](struct.DscMessage.html#method.status) before you
//! trust the contents. A call decoded "off the wire" is a sequence of
//! seven-bit symbols, which you can also decode yourself:
//!
//! ```
//! use dscrx::{Destination, DscMessage, EndOfSequence, FormatSpecifier, Symbol};
//!
//! let symbols: Vec<Symbol> = [
//!     112u8, 112, 25, 58, 5, 99, 70, 107, 4, 52, 60, 13, 7, 12, 52, 109, 127, 52, 127, 127,
//! ]
//! .iter()
//! .map(|&v| Symbol::from(v))
//! .collect();
//!
//! let call = DscMessage::decode(&symbols);
//! assert!(call.is_ok());
//! assert_eq!(FormatSpecifier::DistressAlert, call.format());
//! assert_eq!(Some(&Destination::AllShips), call.to());
//! assert_eq!("255805997", call.from().expect("no sender").as_str());
//! assert_eq!(
//!     "North-East (NE), Latitude: 045.26°, Longitude: 013.07°",
//!     call.position().expect("no position").to_string()
//! );
//! assert_eq!(Some(EndOfSequence::OtherCalls), call.eos());
//! ```
//!
//! ## Background
//!
//! DSC is the digital calling system of the Global Maritime Distress
//! and Safety System (GMDSS). Ships and coast stations use it to send
//! distress alerts and to set up routine calls on MF, HF, and VHF.
//!
//! On MF and HF, DSC is sent as two-tone frequency-shift keying with
//! a 170 Hz shift at 100 baud. Each ten-bit character carries seven
//! information bits and a three-bit count of its zero bits. Every
//! character is sent twice, in two interleaved streams called DX and
//! RX, and the call ends with an error check character which is the
//! exclusive-or of the information characters. This receiver exploits
//! both layers of redundancy.
//!
//! ## Crate features
//!
//! * `chrono`: Convert call times to
//!   [`chrono::NaiveTime`](struct.UtcTime.html#method.to_naive_time).
//!   If enabled, `chrono` becomes part of this crate's public API.
//!

mod autotune;
mod bitsync;
mod builder;
mod framing;
mod message;
mod receiver;
mod source;
mod spectrum;
mod squelch;
mod symbol;
mod tone;
mod waveform;

pub use autotune::{FrequencyAutoTuner, FrequencyPower, TunerOutput};
pub use bitsync::BitstreamSynchronizer;
pub use builder::DscReceiverBuilder;
pub use framing::{
    decode_characters, is_phased, is_preamble_group, preamble_length, reconcile_dx_rx,
    DecodedFrame, FrameDecoder,
};
pub use message::{
    compute_ecc, AreaDescriptor, CategoryOfCall, Destination, DscMessage, EndOfSequence,
    FieldValue, FirstCommand, FormatSpecifier, FrequencyField, Identifier, MessageDecodeErr,
    MessageStatus, NatureOfDistress, Position, Quadrant, SecondCommand, UtcTime, UNREADABLE,
};
pub use receiver::{
    CandidateReconciler, DscEvent, DscReceiver, HealthLimits, HealthState, ReceiverError,
    DEFAULT_SETTLE_WINDOW, SUBSCRIBER_QUEUE_LEN,
};
pub use source::{pcm_to_samples, samples_to_pcm, AudioSource, PcmSource, SourceError};
pub use spectrum::SpectralAnalyzer;
pub use squelch::SquelchGate;
pub use symbol::Symbol;
pub use tone::{BitDecision, ToneBitDetector, ToneFrequencyPair};
pub use waveform::{BAUD_HZ, DEFAULT_MARK_HZ, DEFAULT_SPACE_HZ, FSK_SHIFT_HZ};
