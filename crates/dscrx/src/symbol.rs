//! DSC characters and symbols
//!
//! A DSC character is ten bit units long. The first seven
//! units carry the symbol value, least-significant bit first.
//! The last three units are a binary count of the *zero* bits
//! in the information part, most-significant bit first.

use std::fmt;

use crate::waveform::{CHARACTER_BITS, INFORMATION_BITS};

/// A received DSC symbol
///
/// Symbols carry a value in the range `0..=127`. A character
/// which fails its parity check is represented by the
/// distinguished [`Symbol::ERROR`] value, which never compares
/// equal to a valid symbol.
///
/// ```
/// use dscrx::Symbol;
///
/// let sym = Symbol::new(52);
/// assert_eq!(Some(52), sym.value());
/// assert_eq!("052", &format!("{}", sym));
/// assert!(Symbol::ERROR.is_error());
/// assert_eq!("e", &format!("{}", Symbol::ERROR));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Symbol(Option<u8>);

impl Symbol {
    /// A character which could not be received
    pub const ERROR: Symbol = Symbol(None);

    /// Symbol with the given value
    ///
    /// Only the low seven bits of `value` are kept.
    pub const fn new(value: u8) -> Self {
        Symbol(Some(value & 0x7f))
    }

    /// Decode a received ten-unit character
    ///
    /// Each element of `units` is a bit, `0` or `1`. Returns
    /// [`Symbol::ERROR`] if the character fails its parity check
    /// or if fewer than ten units are given.
    pub fn from_character(units: &[u8]) -> Self {
        if units.len() < CHARACTER_BITS {
            return Symbol::ERROR;
        }

        let mut value = 0u8;
        for (i, unit) in units[0..INFORMATION_BITS].iter().enumerate() {
            value |= (unit & 0x01) << i;
        }

        let mut check = 0u8;
        for unit in &units[INFORMATION_BITS..CHARACTER_BITS] {
            check = (check << 1) | (unit & 0x01);
        }

        if check == zero_count(value) {
            Symbol::new(value)
        } else {
            Symbol::ERROR
        }
    }

    /// Symbol value, or `None` for an error symbol
    #[inline]
    pub fn value(&self) -> Option<u8> {
        self.0
    }

    /// True if this symbol could not be received
    #[inline]
    pub fn is_error(&self) -> bool {
        self.0.is_none()
    }

    /// True if this symbol carries a value
    #[inline]
    pub fn is_valid(&self) -> bool {
        self.0.is_some()
    }

    /// Two-digit decimal value, if this symbol encodes one
    ///
    /// Numeric fields pack two decimal digits per symbol, so
    /// only values `0..=99` are meaningful there.
    #[inline]
    pub fn decimal(&self) -> Option<u8> {
        self.0.filter(|v| *v <= 99)
    }
}

impl From<u8> for Symbol {
    fn from(value: u8) -> Self {
        Symbol::new(value)
    }
}

impl From<Option<u8>> for Symbol {
    fn from(value: Option<u8>) -> Self {
        match value {
            Some(v) => Symbol::new(v),
            None => Symbol::ERROR,
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => write!(f, "{:03}", v),
            None => write!(f, "e"),
        }
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

/// Encode a symbol value as its ten-unit character
///
/// The inverse of [`Symbol::from_character()`]. Only the low
/// seven bits of `value` are used.
#[cfg(test)]
pub(crate) fn encode_character(value: u8) -> [u8; CHARACTER_BITS] {
    let value = value & 0x7f;
    let check = zero_count(value);

    let mut out = [0u8; CHARACTER_BITS];
    for (i, unit) in out[0..INFORMATION_BITS].iter_mut().enumerate() {
        *unit = (value >> i) & 0x01;
    }
    out[7] = (check >> 2) & 0x01;
    out[8] = (check >> 1) & 0x01;
    out[9] = check & 0x01;
    out
}

/// Count of zero bits among the seven information bits
#[inline]
fn zero_count(value: u8) -> u8 {
    (!value & 0x7f).count_ones() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_known_characters() {
        assert_eq!(
            Symbol::new(2),
            Symbol::from_character(&[0, 1, 0, 0, 0, 0, 0, 1, 1, 0])
        );
        assert_eq!(
            Symbol::new(122),
            Symbol::from_character(&[0, 1, 0, 1, 1, 1, 1, 0, 1, 0])
        );
        assert_eq!(
            Symbol::new(127),
            Symbol::from_character(&[1, 1, 1, 1, 1, 1, 1, 0, 0, 0])
        );
        assert_eq!(
            Symbol::new(43),
            Symbol::from_character(&[1, 1, 0, 1, 0, 1, 0, 0, 1, 1])
        );
    }

    #[test]
    fn test_encode_known_characters() {
        assert_eq!([0, 1, 0, 0, 0, 0, 0, 1, 1, 0], encode_character(2));
        assert_eq!([1, 0, 1, 1, 1, 1, 1, 0, 0, 1], encode_character(125));
        assert_eq!([0, 0, 1, 1, 0, 1, 1, 0, 1, 1], encode_character(108));
    }

    #[test]
    fn test_parity_failure() {
        // 2 with a corrupted check count
        assert!(Symbol::from_character(&[0, 1, 0, 0, 0, 0, 0, 1, 1, 1]).is_error());
        // single information bit flipped
        assert!(Symbol::from_character(&[1, 1, 0, 0, 0, 0, 0, 1, 1, 0]).is_error());
        // too short
        assert!(Symbol::from_character(&[0, 1, 0]).is_error());
    }

    #[test]
    fn test_every_character() {
        // a character is accepted iff its check units count its zero bits
        for word in 0u16..1024 {
            let units: Vec<u8> = (0..10).map(|i| ((word >> (9 - i)) & 0x01) as u8).collect();
            let mut value = 0u8;
            let mut zeros = 0u8;
            for (i, u) in units[0..7].iter().enumerate() {
                value |= u << i;
                zeros += 1 - u;
            }
            let check = (units[7] << 2) | (units[8] << 1) | units[9];

            let sym = Symbol::from_character(&units);
            if check == zeros {
                assert_eq!(Some(value), sym.value());
                assert_eq!(units.as_slice(), &encode_character(value));
            } else {
                assert!(sym.is_error());
            }
        }
    }

    #[test]
    fn test_symbol_display() {
        assert_eq!("000", &format!("{}", Symbol::new(0)));
        assert_eq!("127", &format!("{}", Symbol::new(127)));
        assert_eq!("e", &format!("{:?}", Symbol::ERROR));
        assert_eq!(Some(99), Symbol::new(99).decimal());
        assert_eq!(None, Symbol::new(100).decimal());
        assert_eq!(None, Symbol::ERROR.decimal());
        assert_eq!(Symbol::ERROR, Symbol::from(None));
        assert_ne!(Symbol::ERROR, Symbol::new(0));
    }
}
