//! Character synchronization and DX/RX reconciliation
//!
//! A DSC call opens with a dot pattern, followed by a phasing
//! sequence that interleaves two character streams:
//!
//! * the DX stream (even character positions) repeats
//!   character 125; and
//! * the RX stream (odd character positions) counts down from
//!   111 to 104.
//!
//! Every message character is then sent twice: once in the DX
//! stream and again, a few character slots later, in the RX
//! stream. The [`FrameDecoder`] searches a bit buffer for a
//! phased run of characters and merges the two streams into a
//! single sequence of symbols.

#[cfg(not(test))]
use log::{debug, trace};

#[cfg(test)]
use std::{println as debug, println as trace};

use arraydeque::{ArrayDeque, Wrapping};
use arrayvec::ArrayVec;

use crate::symbol::Symbol;
use crate::waveform::{
    BIT_BUFFER_BITS, CHARACTER_BITS, DEFAULT_MAX_PARITY_ERRORS, MESSAGE_WINDOW_BITS, PHASING_DX,
    PHASING_DX_COUNT, PHASING_DX_SKIP, PHASING_RX, PREAMBLE_GROUPS, RX_DELAY, SYNC_OFFSETS,
};

/// Maximum number of characters in one analysis window
pub const MAX_CHARACTERS: usize = BIT_BUFFER_BITS / CHARACTER_BITS;

/// Minimum number of phasing characters which must match
const PHASING_MIN_MATCHES: usize = 3;

/// Characters decoded from one synchronization attempt
pub type CharacterRun = ArrayVec<Symbol, MAX_CHARACTERS>;

/// Symbols of one candidate message
///
/// The DX and RX streams have been merged and the phasing
/// characters removed. The first symbol should be the format
/// specifier.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DecodedFrame {
    symbols: Vec<Symbol>,
}

impl DecodedFrame {
    /// Wrap symbols
    pub fn new(symbols: Vec<Symbol>) -> Self {
        Self { symbols }
    }

    /// Merged symbols
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Number of symbols which were received intact
    pub fn valid_count(&self) -> usize {
        self.symbols.iter().filter(|s| s.is_valid()).count()
    }
}

impl AsRef<[Symbol]> for DecodedFrame {
    fn as_ref(&self) -> &[Symbol] {
        &self.symbols
    }
}

impl From<DecodedFrame> for Vec<Symbol> {
    fn from(frame: DecodedFrame) -> Self {
        frame.symbols
    }
}

/// Searches a bitstream for phased DSC character runs
///
/// Bits are buffered in a fixed-size ring which discards the
/// oldest bit when full. Once enough bits are buffered, every
/// call to [`push_bits()`](#method.push_bits) makes a
/// synchronization pass over up to ten bit offsets. Each
/// attempt skips the dot pattern, decodes characters, and
/// checks for the phasing sequence. The oldest bit is dropped
/// after each attempt, whether or not it succeeds, so the
/// buffer slides forward through the stream.
#[derive(Clone, Debug)]
pub struct FrameDecoder {
    bits: ArrayDeque<u8, BIT_BUFFER_BITS, Wrapping>,
    max_parity_errors: u32,
    frames_found: u64,
}

impl FrameDecoder {
    /// New decoder with the default parity error limit
    pub fn new() -> Self {
        Self::with_max_parity_errors(DEFAULT_MAX_PARITY_ERRORS)
    }

    /// New decoder with a custom parity error limit
    ///
    /// A synchronization attempt is abandoned once more than
    /// `max_parity_errors` characters fail their parity check.
    pub fn with_max_parity_errors(max_parity_errors: u32) -> Self {
        Self {
            bits: ArrayDeque::new(),
            max_parity_errors,
            frames_found: 0,
        }
    }

    /// Buffer bits and search for frames
    ///
    /// Returns every candidate frame found by this pass, in the
    /// order they were found.
    pub fn push_bits(&mut self, bits: &[u8]) -> Vec<DecodedFrame> {
        for bit in bits {
            self.bits.push_back(*bit & 0x01);
        }
        self.sync_pass()
    }

    /// Number of buffered bits
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True if no bits are buffered
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Lifetime count of candidate frames found
    pub fn frames_found(&self) -> u64 {
        self.frames_found
    }

    /// Discard buffered bits
    pub fn reset(&mut self) {
        self.bits.clear();
    }

    fn sync_pass(&mut self) -> Vec<DecodedFrame> {
        let mut out = Vec::new();
        if self.bits.len() < MESSAGE_WINDOW_BITS {
            return out;
        }

        let snapshot: Vec<u8> = self.bits.iter().copied().collect();
        for offset in 0..SYNC_OFFSETS {
            if let Some(frame) = self.attempt(&snapshot, offset) {
                debug!(
                    "framing: phased run at bit offset {} ({} symbols)",
                    offset,
                    frame.symbols().len()
                );
                out.push(frame);
            }
            self.bits.pop_front();
        }

        self.frames_found += out.len() as u64;
        out
    }

    // one synchronization attempt at the given bit offset
    fn attempt(&self, snapshot: &[u8], offset: usize) -> Option<DecodedFrame> {
        let bits = snapshot.get(offset..)?;
        let start = preamble_length(bits);
        let end = usize::min(start + MESSAGE_WINDOW_BITS, bits.len());
        let window = bits.get(start..end)?;

        let chars = decode_characters(window, self.max_parity_errors)?;
        if !is_phased(&chars) {
            return None;
        }
        trace!("framing: characters {:?}", chars.as_slice());
        Some(reconcile_dx_rx(&chars))
    }
}

impl Default for FrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

/// True if `group` is one ten-bit group of dot pattern
pub fn is_preamble_group(group: &[u8]) -> bool {
    PREAMBLE_GROUPS
        .iter()
        .any(|pattern| group == pattern.as_slice())
}

/// Number of leading bits which belong to the dot pattern
///
/// Counts whole ten-bit groups of either dot polarity.
pub fn preamble_length(bits: &[u8]) -> usize {
    bits.chunks_exact(CHARACTER_BITS)
        .take_while(|group| is_preamble_group(group))
        .count()
        * CHARACTER_BITS
}

/// Decode ten-bit characters
///
/// Decodes as many whole characters as `bits` contains. Returns
/// `None` if more than `max_parity_errors` of them fail their
/// parity check.
pub fn decode_characters(bits: &[u8], max_parity_errors: u32) -> Option<CharacterRun> {
    let mut out = CharacterRun::new();
    let mut errors = 0u32;
    for group in bits.chunks_exact(CHARACTER_BITS) {
        let sym = Symbol::from_character(group);
        if sym.is_error() {
            errors += 1;
            if errors > max_parity_errors {
                return None;
            }
        }
        if out.try_push(sym).is_err() {
            break;
        }
    }
    Some(out)
}

/// True if `chars` opens with a recognizable phasing sequence
///
/// Even positions are compared against the DX phasing
/// character and odd positions against the descending RX
/// phasing characters. The run is phased when at least three
/// positions match and at least one of those is an RX match.
pub fn is_phased(chars: &[Symbol]) -> bool {
    let mut dx_matches = 0usize;
    let mut rx_matches = 0usize;

    for (i, sym) in chars
        .iter()
        .take(2 * usize::max(PHASING_DX_COUNT, PHASING_RX.len()))
        .enumerate()
    {
        let expect = if i % 2 == 0 {
            (i / 2 < PHASING_DX_COUNT).then_some(PHASING_DX)
        } else {
            PHASING_RX.get(i / 2).copied()
        };

        match (expect, sym.value()) {
            (Some(want), Some(got)) if want == got => {
                if i % 2 == 0 {
                    dx_matches += 1;
                } else {
                    rx_matches += 1;
                }
            }
            _ => {}
        }
    }

    rx_matches > 0 && dx_matches + rx_matches >= PHASING_MIN_MATCHES
}

/// Merge the DX and RX streams of a phased run
///
/// Even characters form the DX stream and odd characters the
/// RX stream. The phasing characters at the head of the DX
/// stream are skipped. Each remaining DX character is used if
/// it was received intact. Otherwise its RX repeat is used, if
/// the run is long enough to contain it, or an error symbol.
pub fn reconcile_dx_rx(chars: &[Symbol]) -> DecodedFrame {
    let dx: Vec<Symbol> = chars.iter().step_by(2).copied().collect();
    let rx: Vec<Symbol> = chars.iter().skip(1).step_by(2).copied().collect();

    let symbols = dx
        .iter()
        .enumerate()
        .skip(PHASING_DX_SKIP)
        .map(|(d, sym)| {
            if sym.is_valid() {
                *sym
            } else {
                rx.get(d + RX_DELAY).copied().unwrap_or(Symbol::ERROR)
            }
        })
        .collect();

    DecodedFrame::new(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::waveform::{characters_to_bits, make_burst, phased_characters};

    fn syms(values: &[u8]) -> Vec<Symbol> {
        values.iter().map(|v| Symbol::new(*v)).collect()
    }

    const DISTRESS: [u8; 20] = [
        112, 112, 25, 58, 5, 99, 70, 107, 4, 52, 60, 13, 7, 12, 52, 109, 127, 52, 127, 127,
    ];

    #[test]
    fn test_preamble_length() {
        let mut bits = Vec::new();
        bits.extend_from_slice(&PREAMBLE_GROUPS[0]);
        bits.extend_from_slice(&PREAMBLE_GROUPS[1]);
        bits.extend_from_slice(&PREAMBLE_GROUPS[0]);
        bits.extend_from_slice(&[1, 1, 1, 0, 0, 0, 1, 1, 1, 0]);
        assert_eq!(30, preamble_length(&bits));
        assert_eq!(0, preamble_length(&bits[1..4]));
        assert!(is_preamble_group(&PREAMBLE_GROUPS[1]));
        assert!(!is_preamble_group(&[1, 1, 1, 1, 1, 1, 1, 1, 1, 1]));
    }

    #[test]
    fn test_decode_characters() {
        let bits = characters_to_bits(&[2, 125, 108]);
        let chars = decode_characters(&bits, 0).expect("clean characters");
        assert_eq!(syms(&[2, 125, 108]), chars.as_slice());

        // three bad characters against a limit of two
        let mut bits = vec![1u8; 30];
        bits.extend(characters_to_bits(&[2]));
        assert!(decode_characters(&bits, 2).is_none());
        let chars = decode_characters(&bits, 3).expect("within limit");
        assert_eq!(4, chars.len());
        assert!(chars[0].is_error());
    }

    #[test]
    fn test_is_phased() {
        let chars = syms(&phased_characters(&DISTRESS));
        assert!(is_phased(&chars));

        // DX-only matches are not enough
        let chars = syms(&[125, 0, 125, 0, 125, 0, 125, 0]);
        assert!(!is_phased(&chars));

        // three matches including an RX match
        let chars = syms(&[125, 111, 0, 0, 125, 0]);
        assert!(is_phased(&chars));

        // two matches are not enough
        let chars = syms(&[125, 111, 0, 0, 0, 0]);
        assert!(!is_phased(&chars));

        let mut chars = syms(&[125, 111, 125, 110]);
        chars[0] = Symbol::ERROR;
        assert!(is_phased(&chars));
        chars[2] = Symbol::ERROR;
        assert!(!is_phased(&chars));
    }

    #[test]
    fn test_reconcile() {
        let mut chars = syms(&phased_characters(&DISTRESS));
        let frame = reconcile_dx_rx(&chars);
        assert_eq!(&syms(&DISTRESS), &frame.symbols()[0..DISTRESS.len()]);

        // lose the DX copy of the third message symbol
        chars[2 * (PHASING_DX_SKIP + 2)] = Symbol::ERROR;
        let frame = reconcile_dx_rx(&chars);
        assert_eq!(Symbol::new(25), frame.symbols()[2]);

        // lose both copies
        chars[2 * (PHASING_DX_SKIP + 2 + RX_DELAY) + 1] = Symbol::ERROR;
        let frame = reconcile_dx_rx(&chars);
        assert!(frame.symbols()[2].is_error());
        assert_eq!(DISTRESS.len() - 1 + 2, frame.valid_count());
    }

    #[test]
    fn test_reconcile_short_run() {
        // RX repeat falls beyond the end of the run
        let mut chars = syms(&[125; 14]);
        chars.push(Symbol::ERROR);
        let frame = reconcile_dx_rx(&chars);
        assert_eq!(vec![Symbol::new(125), Symbol::ERROR], frame.symbols());
    }

    #[test]
    fn test_push_bits_finds_frame() {
        let bits = make_burst(&DISTRESS, 12, 240);
        assert_eq!(920, bits.len());
        let mut framer = FrameDecoder::new();

        // not enough bits yet
        assert!(framer.push_bits(&bits[0..800]).is_empty());
        assert_eq!(800, framer.len());

        let frames = framer.push_bits(&bits[800..]);
        assert!(!frames.is_empty());
        assert_eq!(&syms(&DISTRESS), &frames[0].symbols()[0..DISTRESS.len()]);
        assert_eq!(frames.len() as u64, framer.frames_found());

        // one bit dropped per attempt
        assert_eq!(bits.len() - SYNC_OFFSETS, framer.len());
    }

    #[test]
    fn test_push_bits_misaligned() {
        // three stray bits ahead of the dot pattern
        let mut bits = vec![1, 1, 0];
        bits.extend(make_burst(&DISTRESS, 20, 400));
        let mut framer = FrameDecoder::new();
        let frames = framer.push_bits(&bits);
        assert!(frames
            .iter()
            .any(|f| f.symbols().get(0..DISTRESS.len()) == Some(syms(&DISTRESS).as_slice())));
    }

    #[test]
    fn test_buffer_drops_oldest() {
        let mut framer = FrameDecoder::new();
        framer.push_bits(&[1u8; 500]);
        framer.push_bits(&[0u8; 300]);
        assert_eq!(800, framer.len());
        framer.push_bits(&[0u8; 99]);
        assert_eq!(899, framer.len());

        // buffer is full after this; sync pass drops ten bits
        assert!(framer.push_bits(&[0u8; 200]).is_empty());
        assert_eq!(BIT_BUFFER_BITS - SYNC_OFFSETS, framer.len());

        framer.reset();
        assert!(framer.is_empty());
    }
}
