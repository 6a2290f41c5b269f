//! Decoded DSC calls

mod codes;
mod fields;
mod grammar;

use std::fmt;

use thiserror::Error;

use crate::symbol::Symbol;

pub use codes::{
    CategoryOfCall, EndOfSequence, FirstCommand, FormatSpecifier, NatureOfDistress,
    SecondCommand,
};
pub use fields::{
    AreaDescriptor, FieldValue, FrequencyField, Identifier, Position, Quadrant, UtcTime,
    UNREADABLE,
};
pub use grammar::compute_ecc;

/// Reason a call did not decode cleanly
///
/// Even a call with an error may carry useful fields. See
/// [`DscMessage::status()`].
#[derive(Error, Clone, Debug, PartialEq, Eq)]
pub enum MessageDecodeErr {
    /// The format specifier is unreadable or undefined
    #[error("unrecognized format specifier")]
    UnrecognizedFormat,

    /// The format is recognized, but its layout is not decoded
    #[error("format not supported: {0}")]
    FormatNotSupported(FormatSpecifier),

    /// Too few symbols for the format
    #[error("call too short: {got} symbols, need {needed}")]
    TooShort {
        /// Symbols required by the format
        needed: usize,

        /// Symbols received
        got: usize,
    },

    /// The error-check character does not match the message
    ///
    /// Either value may be `None` if the symbols it depends on
    /// were not received.
    #[error("error-check character mismatch")]
    EccMismatch {
        /// Error-check character as received
        received: Option<u8>,

        /// Error-check character computed from the message
        computed: Option<u8>,
    },
}

/// Outcome of decoding a call
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageStatus {
    /// Error-check character verified
    Ok,

    /// Call is damaged, truncated, or not supported
    Error(MessageDecodeErr),
}

impl MessageStatus {
    /// True if the call verified
    pub fn is_ok(&self) -> bool {
        matches!(self, MessageStatus::Ok)
    }

    /// True if the format is recognized but not decoded
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            MessageStatus::Error(MessageDecodeErr::FormatNotSupported(_))
        )
    }

    /// Cause of the error, if any
    pub fn cause(&self) -> Option<&MessageDecodeErr> {
        match self {
            MessageStatus::Ok => None,
            MessageStatus::Error(e) => Some(e),
        }
    }

    /// Short status: `OK` or `Error`
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageStatus::Ok => "OK",
            MessageStatus::Error(_) => "Error",
        }
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageStatus::Ok => f.write_str("OK"),
            MessageStatus::Error(e) => write!(f, "Error ({})", e),
        }
    }
}

/// Addressee of a call
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Destination {
    /// Every station in range
    AllShips,

    /// A single station
    Station(Identifier),

    /// Every station within a geographic area
    Area(FieldValue<AreaDescriptor>),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::AllShips => f.write_str("All ships"),
            Destination::Station(id) => fmt::Display::fmt(id, f),
            Destination::Area(area) => fmt::Display::fmt(area, f),
        }
    }
}

/// A decoded DSC call
///
/// Calls are decoded from the merged symbol sequence of one
/// DSC burst with [`DscMessage::decode()`]. Decoding never
/// fails outright: every field which can be read is filled in,
/// and the [`status()`](DscMessage::status) reports whether the
/// error-check character verified.
///
/// ```
/// use dscrx::{DscMessage, FormatSpecifier, NatureOfDistress, Symbol};
///
/// let syms: Vec<Symbol> = [
///     112u8, 112, 25, 58, 5, 99, 70, 107, 4, 52, 60, 13, 7, 12, 52, 109, 127, 52, 127, 127,
/// ]
/// .iter()
/// .map(|v| Symbol::new(*v))
/// .collect();
///
/// let msg = DscMessage::decode(&syms);
/// assert_eq!(FormatSpecifier::DistressAlert, msg.format());
/// assert_eq!("255805997", msg.from().unwrap().as_str());
/// assert_eq!(Some(NatureOfDistress::Undesignated), msg.nature());
/// assert_eq!("12:52", &msg.time().unwrap().to_string());
/// assert!(msg.status().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DscMessage {
    pub(crate) symbols: Vec<Symbol>,
    pub(crate) format: FormatSpecifier,
    pub(crate) category: Option<CategoryOfCall>,
    pub(crate) nature: Option<NatureOfDistress>,
    pub(crate) to: Option<Destination>,
    pub(crate) from: Option<Identifier>,
    pub(crate) first_command: Option<FirstCommand>,
    pub(crate) second_command: Option<SecondCommand>,
    pub(crate) position: Option<FieldValue<Position>>,
    pub(crate) position_requested: bool,
    pub(crate) time: Option<UtcTime>,
    pub(crate) frequency: Option<FrequencyField>,
    pub(crate) eos: Option<EndOfSequence>,
    pub(crate) ecc: Option<Symbol>,
    pub(crate) status: MessageStatus,
}

impl DscMessage {
    /// Decode a call from its merged symbols
    ///
    /// The first symbol is the format specifier. It is usually
    /// transmitted twice.
    pub fn decode<S: AsRef<[Symbol]>>(symbols: S) -> Self {
        grammar::decode(symbols.as_ref())
    }

    // blank message with no fields decoded
    pub(crate) fn blank(symbols: &[Symbol], format: FormatSpecifier, status: MessageStatus) -> Self {
        Self {
            symbols: symbols.to_vec(),
            format,
            category: None,
            nature: None,
            to: None,
            from: None,
            first_command: None,
            second_command: None,
            position: None,
            position_requested: false,
            time: None,
            frequency: None,
            eos: None,
            ecc: None,
            status,
        }
    }

    /// Received symbols, as merged from the DX and RX streams
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    /// Number of symbols which were received intact
    ///
    /// Used to choose among candidate decodings of the same
    /// burst: more intact symbols is better.
    pub fn valid_symbol_count(&self) -> usize {
        self.symbols.iter().filter(|s| s.is_valid()).count()
    }

    /// Format specifier
    pub fn format(&self) -> FormatSpecifier {
        self.format
    }

    /// Category (priority) of the call
    ///
    /// Distress alerts do not carry a category.
    pub fn category(&self) -> Option<CategoryOfCall> {
        self.category
    }

    /// Nature of distress, for distress alerts
    pub fn nature(&self) -> Option<NatureOfDistress> {
        self.nature
    }

    /// Addressee
    pub fn to(&self) -> Option<&Destination> {
        self.to.as_ref()
    }

    /// Calling station
    pub fn from(&self) -> Option<&Identifier> {
        self.from.as_ref()
    }

    /// First telecommand
    pub fn first_command(&self) -> Option<FirstCommand> {
        self.first_command
    }

    /// Second telecommand
    pub fn second_command(&self) -> Option<SecondCommand> {
        self.second_command
    }

    /// Reported position
    pub fn position(&self) -> Option<&FieldValue<Position>> {
        self.position.as_ref()
    }

    /// True if the call asks the addressee to report its position
    pub fn position_requested(&self) -> bool {
        self.position_requested
    }

    /// Time of the reported position (UTC)
    pub fn time(&self) -> Option<&UtcTime> {
        self.time.as_ref()
    }

    /// Proposed working frequency
    ///
    /// Only present for J3E telephony calls.
    pub fn frequency(&self) -> Option<&FrequencyField> {
        self.frequency.as_ref()
    }

    /// End-of-sequence symbol
    pub fn eos(&self) -> Option<EndOfSequence> {
        self.eos
    }

    /// Error-check character as received
    pub fn ecc(&self) -> Option<Symbol> {
        self.ecc
    }

    /// Decoding status
    pub fn status(&self) -> &MessageStatus {
        &self.status
    }

    /// True if the error-check character verified
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }
}

impl fmt::Display for DscMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Format: {}", self.format)?;
        if let Some(cat) = self.category {
            writeln!(f, "Category: {}", cat)?;
        }
        if let Some(to) = &self.to {
            writeln!(f, "To: {}", to)?;
        }
        if let Some(from) = &self.from {
            writeln!(f, "From: {}", from)?;
        }
        if let Some(nature) = self.nature {
            writeln!(f, "Nature: {}", nature)?;
        }
        if let Some(tc1) = self.first_command {
            writeln!(f, "TC1: {}", tc1)?;
        }
        if let Some(tc2) = self.second_command {
            writeln!(f, "TC2: {}", tc2)?;
        }
        if let Some(freq) = &self.frequency {
            writeln!(f, "Frequency: {}", freq)?;
        }
        if let Some(pos) = &self.position {
            writeln!(f, "Position: {}", pos)?;
        }
        if self.position_requested {
            writeln!(f, "Position: requested")?;
        }
        if let Some(time) = &self.time {
            writeln!(f, "Time: {} UTC", time)?;
        }
        if let Some(eos) = self.eos {
            writeln!(f, "EOS: {}", eos)?;
        }
        if let Some(ecc) = self.ecc {
            writeln!(f, "ECC: {}", ecc)?;
        }
        f.write_str("Symbols:")?;
        for sym in &self.symbols {
            write!(f, " {}", sym)?;
        }
        writeln!(f)?;
        write!(f, "Status: {}", self.status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syms(values: &[u8]) -> Vec<Symbol> {
        values.iter().map(|v| Symbol::new(*v)).collect()
    }

    #[test]
    fn test_status() {
        assert_eq!("OK", MessageStatus::Ok.as_str());
        let err = MessageStatus::Error(MessageDecodeErr::FormatNotSupported(
            FormatSpecifier::GroupCall,
        ));
        assert_eq!("Error", err.as_str());
        assert!(err.is_unsupported());
        assert_eq!("Error (format not supported: Group call)", err.to_string());
        assert!(MessageStatus::Ok.cause().is_none());
    }

    #[test]
    fn test_display_summary() {
        let msg = DscMessage::decode(syms(&[
            120, 120, 0, 23, 71, 0, 0, 108, 32, 51, 42, 0, 0, 118, 126, 38, 75, 0, 38, 75, 0, 117,
            0, 117, 117,
        ]));
        let text = msg.to_string();
        assert!(text.starts_with("Format: Individual call\n"));
        assert!(text.contains("To: 002371000\n"));
        assert!(text.contains("From: 325142000\n"));
        assert!(text.contains("TC1: Test\n"));
        assert!(text.contains("EOS: Acknowledge RQ\n"));
        assert!(text.contains("ECC: 000\n"));
        assert!(text.contains("Symbols: 120 120 000 023 071 "));
        assert!(text.ends_with("Status: OK"));
        assert_eq!(25, msg.valid_symbol_count());
    }

    #[test]
    fn test_destination_display() {
        assert_eq!("All ships", Destination::AllShips.to_string());
        let area = AreaDescriptor::from_symbols(&syms(&[4, 40, 3, 5, 8]));
        assert!(Destination::Area(area)
            .to_string()
            .starts_with("North-East (NE), Reference point"));
    }
}
