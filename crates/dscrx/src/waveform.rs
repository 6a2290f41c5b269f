//! DSC waveform definitions
//!
//! Digital Selective Calling (ITU-R M.493) on the MF/HF bands is
//! a 100 Bd frequency shift keyed signal. The "mark" (binary 1)
//! and "space" (binary 0) tones are separated by 170 Hz. Each
//! character occupies ten bit units: seven information bits,
//! LSB first, followed by a three-bit error-check count.

/// DSC baud rate (Hz)
pub const BAUD_HZ: u32 = 100;

/// Nominal separation between the mark and space tones (Hz)
pub const FSK_SHIFT_HZ: f32 = 170.0;

/// Default mark (binary 1) frequency (Hz)
pub const DEFAULT_MARK_HZ: f32 = 1615.0;

/// Default space (binary 0) frequency (Hz)
pub const DEFAULT_SPACE_HZ: f32 = 1785.0;

/// Number of bit units in one DSC character
pub const CHARACTER_BITS: usize = 10;

/// Number of information bits in one DSC character
pub const INFORMATION_BITS: usize = 7;

/// Dot-pattern groups which may precede the phasing sequence
///
/// The dot pattern is an alternating `1010…` sequence. Depending
/// on where the receiver starts sampling, either polarity may
/// appear in a ten-bit group.
pub const PREAMBLE_GROUPS: [[u8; CHARACTER_BITS]; 2] = [
    [1, 0, 1, 0, 1, 0, 1, 0, 1, 0],
    [0, 1, 0, 1, 0, 1, 0, 1, 0, 1],
];

/// Phasing character sent in the DX (even) positions
pub const PHASING_DX: u8 = 125;

/// Number of DX phasing characters checked while synchronizing
pub const PHASING_DX_COUNT: usize = 7;

/// Phasing characters sent in the RX (odd) positions, in order
pub const PHASING_RX: [u8; 8] = [111, 110, 109, 108, 107, 106, 105, 104];

/// Number of DX characters which belong to the phasing sequence
///
/// These are skipped when reconstructing the message symbols.
pub const PHASING_DX_SKIP: usize = 6;

/// Character-slot delay between a DX character and its RX repeat
///
/// Measured in DX/RX pair indices: the RX copy of DX character `d`
/// is carried in RX slot `d + RX_DELAY`.
pub const RX_DELAY: usize = 2;

/// Analysis window for one synchronization attempt (bits)
pub const MESSAGE_WINDOW_BITS: usize = 900;

/// Capacity of the bit buffer which feeds the frame decoder (bits)
pub const BIT_BUFFER_BITS: usize = 1024;

/// Number of bit offsets tried per synchronization pass
pub const SYNC_OFFSETS: usize = 10;

/// Default limit on parity failures before a sync attempt is abandoned
pub const DEFAULT_MAX_PARITY_ERRORS: u32 = 75;

/// Default FFT length for tone power estimates
pub const DEFAULT_FFT_SIZE: usize = 2048;

/// Samples per DSC bit at the given sampling rate
///
/// This is the integer number of samples, rounded down. At
/// 44.1 kHz it is 441.
#[inline]
pub const fn samples_per_bit(input_rate: u32) -> usize {
    (input_rate / BAUD_HZ) as usize
}

#[cfg(test)]
use crate::symbol::encode_character;

/// Produce continuous-phase FSK audio for the given bits
///
/// A `1` is sent on `mark_hz`, a `0` on `space_hz`. Each bit
/// lasts exactly [`samples_per_bit()`] samples.
#[cfg(test)]
pub(crate) fn modulate_fsk(bits: &[u8], input_rate: u32, mark_hz: f32, space_hz: f32) -> Vec<f32> {
    let spb = samples_per_bit(input_rate);
    let mut out = Vec::with_capacity(bits.len() * spb);
    let mut phase = 0.0f64;
    for &bit in bits {
        let freq = (if bit > 0 { mark_hz } else { space_hz }) as f64;
        let step = 2.0 * std::f64::consts::PI * freq / input_rate as f64;
        for _ in 0..spb {
            out.push(phase.cos() as f32);
            phase = (phase + step) % (2.0 * std::f64::consts::PI);
        }
    }
    out
}

/// Expand DSC character values into their ten-unit bit patterns
#[cfg(test)]
pub(crate) fn characters_to_bits(characters: &[u8]) -> Vec<u8> {
    characters
        .iter()
        .flat_map(|&c| encode_character(c))
        .collect()
}

/// Interleave a message into a phased DX/RX character sequence
///
/// The DX stream is six phasing characters followed by the
/// message. The RX stream is the eight descending phasing
/// characters followed by the same message, so every message
/// character appears twice.
#[cfg(test)]
pub(crate) fn phased_characters(message: &[u8]) -> Vec<u8> {
    let dx: Vec<u8> = std::iter::repeat(PHASING_DX)
        .take(PHASING_DX_SKIP)
        .chain(message.iter().copied())
        .collect();
    let rx: Vec<u8> = PHASING_RX
        .iter()
        .copied()
        .chain(message.iter().copied())
        .collect();

    let mut out = Vec::with_capacity(2 * rx.len());
    for (i, r) in rx.iter().enumerate() {
        out.push(dx.get(i).copied().unwrap_or(127));
        out.push(*r);
    }
    out
}

/// A complete DSC burst, as bits
///
/// The burst is `dot_groups` groups of dot pattern, the phased
/// message, and `trailer_bits` of zero-valued filler.
#[cfg(test)]
pub(crate) fn make_burst(message: &[u8], dot_groups: usize, trailer_bits: usize) -> Vec<u8> {
    let mut bits = Vec::new();
    for _ in 0..dot_groups {
        bits.extend_from_slice(&PREAMBLE_GROUPS[0]);
    }
    bits.extend(characters_to_bits(&phased_characters(message)));
    bits.extend(std::iter::repeat(0).take(trailer_bits));
    bits
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_samples_per_bit() {
        assert_eq!(441, samples_per_bit(44100));
        assert_eq!(480, samples_per_bit(48000));
        assert_eq!(80, samples_per_bit(8000));
    }

    #[test]
    fn test_phased_characters() {
        let chars = phased_characters(&[112, 112, 25]);
        assert_eq!(&chars[0..4], &[125, 111, 125, 110]);
        // first message character lands in DX slot 6
        assert_eq!(112, chars[12]);
        // and is repeated in RX slot 8
        assert_eq!(112, chars[17]);
        assert_eq!(2 * (PHASING_RX.len() + 3), chars.len());
    }

    #[test]
    fn test_modulate_length() {
        let audio = modulate_fsk(&[1, 0, 1], 44100, DEFAULT_MARK_HZ, DEFAULT_SPACE_HZ);
        assert_eq!(3 * 441, audio.len());
        assert!(audio.iter().all(|s| s.abs() <= 1.0));
    }
}
