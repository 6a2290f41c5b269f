//! Audio acquisition
//!
//! The receiver reads 16-bit signed little-endian mono PCM
//! from an [`AudioSource`]. Sound cards, files, and network
//! streams can all be wrapped this way.

use std::io::{self, Read};

use byteorder::{ByteOrder, LittleEndian};
use thiserror::Error;

/// Error from an audio source
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum SourceError {
    /// The source could not be opened
    #[error("unable to open audio device {device}: {reason}")]
    Open {
        /// Requested device
        device: u32,

        /// Reason for the failure
        reason: String,
    },

    /// The source has not been started
    #[error("audio source not started")]
    NotStarted,

    /// An I/O error occurred while reading
    #[error("audio read failed ({kind:?}): {message}")]
    Io {
        /// Kind of I/O error
        kind: io::ErrorKind,

        /// Error description
        message: String,
    },
}

impl From<io::Error> for SourceError {
    fn from(err: io::Error) -> Self {
        SourceError::Io {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// A source of 16-bit little-endian mono PCM
///
/// `read()` should not block for long. When no audio is
/// available, return an empty buffer and the receiver will
/// wait briefly before trying again.
pub trait AudioSource {
    /// Open the given device
    fn start(&mut self, device: u32) -> Result<(), SourceError>;

    /// Read up to `byte_count` bytes of PCM
    fn read(&mut self, byte_count: usize) -> Result<Vec<u8>, SourceError>;

    /// Close the device
    fn stop(&mut self);

    /// True if the source will never produce more audio
    ///
    /// Live devices never finish.
    fn is_finished(&self) -> bool {
        false
    }
}

/// PCM from any [`Read`]er, such as a file or stdin
///
/// The device number is ignored. The source is finished once
/// the reader reaches end-of-file. Read requests are rounded
/// down to a whole number of samples.
#[derive(Debug)]
pub struct PcmSource<R> {
    reader: R,
    started: bool,
    finished: bool,
}

impl<R: Read> PcmSource<R> {
    /// Wrap a reader
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            started: false,
            finished: false,
        }
    }

    /// Unwrap the reader
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> AudioSource for PcmSource<R> {
    fn start(&mut self, _device: u32) -> Result<(), SourceError> {
        self.started = true;
        Ok(())
    }

    fn read(&mut self, byte_count: usize) -> Result<Vec<u8>, SourceError> {
        if !self.started {
            return Err(SourceError::NotStarted);
        }

        // whole samples only, so the stream never slips by a byte
        let byte_count = byte_count & !1;
        let mut buf = vec![0u8; byte_count];
        let mut filled = 0;
        while filled < byte_count {
            match self.reader.read(&mut buf[filled..]) {
                Ok(0) => {
                    self.finished = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }

        // a partial sample can only remain at end of file
        buf.truncate(filled - filled % 2);
        Ok(buf)
    }

    fn stop(&mut self) {
        self.started = false;
    }

    fn is_finished(&self) -> bool {
        self.finished
    }
}

/// Convert 16-bit little-endian PCM to samples in `[-1.0, 1.0)`
///
/// A trailing odd byte is ignored.
pub fn pcm_to_samples(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(2)
        .map(|b| LittleEndian::read_i16(b) as f32 / 32768.0)
        .collect()
}

/// Convert samples to 16-bit little-endian PCM
///
/// Samples are clipped to the representable range.
pub fn samples_to_pcm(samples: &[f32]) -> Vec<u8> {
    let mut out = vec![0u8; 2 * samples.len()];
    for (chunk, s) in out.chunks_exact_mut(2).zip(samples) {
        let v = (s * 32768.0).round().clamp(i16::MIN as f32, i16::MAX as f32) as i16;
        LittleEndian::write_i16(chunk, v);
    }
    out
}
