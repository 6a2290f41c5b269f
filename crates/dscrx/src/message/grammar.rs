//! Per-format DSC call layouts
//!
//! Symbol positions are relative to the merged symbol sequence,
//! which begins with the (doubled) format specifier.

use crate::symbol::Symbol;

use super::{
    AreaDescriptor, CategoryOfCall, Destination, DscMessage, EndOfSequence,
    FirstCommand, FormatSpecifier, FrequencyField, Identifier, MessageDecodeErr, MessageStatus,
    NatureOfDistress, Position, SecondCommand, UtcTime,
};

/// Conditional symbol which introduces a position
const POSITION_FOLLOWS: u8 = 55;

/// Conditional symbol which asks for the addressee's position
const POSITION_REQUEST: u8 = 126;

/// Offsets from the first EOS slot which may carry the EOS symbol
const EOS_OFFSETS: [usize; 3] = [0, 2, 3];

// Where the fixed parts of each format live
#[derive(Clone, Copy, Debug)]
struct Layout {
    min_len: usize,
    eos: usize,
    ecc: usize,
}

const SHORT_LAYOUT: Layout = Layout {
    min_len: 20,
    eos: 16,
    ecc: 17,
};

const LONG_LAYOUT: Layout = Layout {
    min_len: 25,
    eos: 21,
    ecc: 22,
};

fn layout(format: FormatSpecifier) -> Option<Layout> {
    match format {
        FormatSpecifier::DistressAlert | FormatSpecifier::AllShips => Some(SHORT_LAYOUT),
        FormatSpecifier::IndividualCall | FormatSpecifier::GeographicArea => Some(LONG_LAYOUT),
        _ => None,
    }
}

/// Decode a call
pub(crate) fn decode(symbols: &[Symbol]) -> DscMessage {
    // the format specifier is sent twice
    let format = symbols
        .iter()
        .take(2)
        .find(|s| s.is_valid())
        .map(|s| FormatSpecifier::from(*s))
        .unwrap_or(FormatSpecifier::Error);

    let layout = match (format, layout(format)) {
        (FormatSpecifier::Error, _) => {
            return DscMessage::blank(
                symbols,
                format,
                MessageStatus::Error(MessageDecodeErr::UnrecognizedFormat),
            );
        }
        (_, None) => {
            return DscMessage::blank(
                symbols,
                format,
                MessageStatus::Error(MessageDecodeErr::FormatNotSupported(format)),
            );
        }
        (_, Some(layout)) => layout,
    };

    if symbols.len() < layout.min_len {
        return DscMessage::blank(
            symbols,
            format,
            MessageStatus::Error(MessageDecodeErr::TooShort {
                needed: layout.min_len,
                got: symbols.len(),
            }),
        );
    }

    let mut msg = DscMessage::blank(symbols, format, MessageStatus::Ok);
    match format {
        FormatSpecifier::DistressAlert => distress(&mut msg, symbols),
        FormatSpecifier::AllShips => all_ships(&mut msg, symbols),
        FormatSpecifier::IndividualCall => individual(&mut msg, symbols),
        FormatSpecifier::GeographicArea => area(&mut msg, symbols),
        _ => {}
    }

    msg.eos = Some(end_of_sequence(&symbols[layout.eos..]));
    msg.ecc = Some(symbols[layout.ecc]);
    msg.status = check_ecc(symbols, layout.ecc);
    msg
}

fn distress(msg: &mut DscMessage, symbols: &[Symbol]) {
    msg.to = Some(Destination::AllShips);
    msg.category = Some(CategoryOfCall::Distress);
    msg.from = Some(Identifier::from_symbols(&symbols[2..7]));
    msg.nature = Some(NatureOfDistress::from(symbols[7]));
    msg.position = Some(Position::from_symbols(&symbols[8..13]));
    msg.time = Some(UtcTime::from_symbols(symbols[13], symbols[14]));
}

fn all_ships(msg: &mut DscMessage, symbols: &[Symbol]) {
    msg.to = Some(Destination::AllShips);
    msg.category = Some(CategoryOfCall::from(symbols[2]));
    msg.from = Some(Identifier::from_symbols(&symbols[3..8]));
    msg.first_command = Some(FirstCommand::from(symbols[8]));
    msg.second_command = Some(SecondCommand::from(symbols[9]));
    conditional(msg, symbols, 10);
}

fn individual(msg: &mut DscMessage, symbols: &[Symbol]) {
    msg.to = Some(Destination::Station(Identifier::from_symbols(&symbols[2..7])));
    msg.category = Some(CategoryOfCall::from(symbols[7]));
    msg.from = Some(Identifier::from_symbols(&symbols[8..13]));
    msg.first_command = Some(FirstCommand::from(symbols[13]));
    msg.second_command = Some(SecondCommand::from(symbols[14]));
    conditional(msg, symbols, 15);
}

fn area(msg: &mut DscMessage, symbols: &[Symbol]) {
    msg.to = Some(Destination::Area(AreaDescriptor::from_symbols(
        &symbols[2..7],
    )));
    msg.category = Some(CategoryOfCall::from(symbols[7]));
    msg.from = Some(Identifier::from_symbols(&symbols[8..13]));
    msg.first_command = Some(FirstCommand::from(symbols[13]));
    msg.second_command = Some(SecondCommand::from(symbols[14]));
    set_frequency(msg, &symbols[15..21]);
}

// The six-symbol message field after the telecommands: a
// position, a request for one, or a frequency.
fn conditional(msg: &mut DscMessage, symbols: &[Symbol], at: usize) {
    match symbols[at].value() {
        Some(POSITION_FOLLOWS) => {
            msg.position = Some(Position::from_symbols(&symbols[at + 1..at + 6]));
        }
        Some(POSITION_REQUEST) => {
            msg.position_requested = true;
        }
        _ => set_frequency(msg, &symbols[at..at + 6]),
    }
}

// Frequencies are only meaningful for J3E telephony
fn set_frequency(msg: &mut DscMessage, symbols: &[Symbol]) {
    if msg.first_command == Some(FirstCommand::J3eTelephony) {
        msg.frequency = Some(FrequencyField::from_symbols(symbols));
    }
}

// First readable EOS candidate
fn end_of_sequence(tail: &[Symbol]) -> EndOfSequence {
    EOS_OFFSETS
        .iter()
        .filter_map(|i| tail.get(*i))
        .find(|s| s.is_valid())
        .map(|s| EndOfSequence::from(*s))
        .unwrap_or(EndOfSequence::Error)
}

/// Compute the error-check character
///
/// The ECC is the bitwise XOR of the given information symbols.
/// Returns `None` if any of them was not received.
///
/// ```
/// use dscrx::{compute_ecc, Symbol};
///
/// let info = [Symbol::new(112), Symbol::new(25), Symbol::new(58)];
/// assert_eq!(Some(112 ^ 25 ^ 58), compute_ecc(&info));
/// assert_eq!(None, compute_ecc(&[Symbol::new(1), Symbol::ERROR]));
/// ```
pub fn compute_ecc(info: &[Symbol]) -> Option<u8> {
    info.iter()
        .try_fold(0u8, |acc, sym| sym.value().map(|v| acc ^ v))
}

// Verify the ECC at `ecc_pos` against symbols[1..ecc_pos]
fn check_ecc(symbols: &[Symbol], ecc_pos: usize) -> MessageStatus {
    let received = symbols.get(ecc_pos).and_then(|s| s.value());
    let computed = symbols.get(1..ecc_pos).and_then(compute_ecc);
    match (received, computed) {
        (Some(r), Some(c)) if r & 0x7f == c & 0x7f => MessageStatus::Ok,
        _ => MessageStatus::Error(MessageDecodeErr::EccMismatch { received, computed }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // None marks a symbol lost in reception
    fn syms(values: &[Option<u8>]) -> Vec<Symbol> {
        values.iter().map(|v| Symbol::from(*v)).collect()
    }

    fn ok(values: &[u8]) -> Vec<Symbol> {
        values.iter().map(|v| Symbol::new(*v)).collect()
    }

    #[test]
    fn test_distress() {
        let mut raw = [
            112, 112, 25, 58, 5, 99, 70, 107, 4, 52, 60, 13, 7, 12, 52, 109, 127, 52, 127, 127,
        ];
        let msg = decode(&ok(&raw));
        assert_eq!(FormatSpecifier::DistressAlert, msg.format());
        assert_eq!("255805997", msg.from().expect("from").as_str());
        assert_eq!(Some(NatureOfDistress::Undesignated), msg.nature());
        assert_eq!(
            "North-East (NE), Latitude: 045.26°, Longitude: 013.07°",
            msg.position().expect("position").to_string()
        );
        assert_eq!("12:52", msg.time().expect("time").to_string());
        assert_eq!(Some(EndOfSequence::OtherCalls), msg.eos());
        assert_eq!(Some(Symbol::new(52)), msg.ecc());
        assert_eq!(&MessageStatus::Ok, msg.status());
        assert_eq!(Some(CategoryOfCall::Distress), msg.category());
        assert_eq!(Some(&Destination::AllShips), msg.to());

        raw[17] = 51;
        let msg = decode(&ok(&raw));
        assert_eq!(
            &MessageStatus::Error(MessageDecodeErr::EccMismatch {
                received: Some(51),
                computed: Some(52)
            }),
            msg.status()
        );
        // fields still decoded
        assert_eq!("255805997", msg.from().expect("from").as_str());
    }

    #[test]
    fn test_individual_test_call() {
        let msg = decode(&ok(&[
            120, 120, 0, 23, 71, 0, 0, 108, 32, 51, 42, 0, 0, 118, 126, 38, 75, 0, 38, 75, 0, 117,
            0, 117, 117,
        ]));
        assert_eq!(FormatSpecifier::IndividualCall, msg.format());
        assert_eq!(
            Some(&Destination::Station(Identifier::from_symbols(&ok(&[
                0, 23, 71, 0, 0
            ])))),
            msg.to()
        );
        assert_eq!("002371000", msg.to().expect("to").to_string());
        assert_eq!("325142000", msg.from().expect("from").as_str());
        assert_eq!(Some(CategoryOfCall::Safety), msg.category());
        assert_eq!(Some(FirstCommand::Test), msg.first_command());
        assert_eq!(Some(SecondCommand::NoInformation), msg.second_command());
        assert_eq!(Some(EndOfSequence::AcknowledgeRequest), msg.eos());
        assert_eq!(Some(Symbol::new(0)), msg.ecc());
        assert!(msg.frequency().is_none());
        assert!(msg.position().is_none());
        assert!(!msg.position_requested());
        assert!(msg.is_ok());
    }

    #[test]
    fn test_individual_j3e_pair() {
        let msg = decode(&ok(&[
            120, 120, 34, 18, 55, 0, 0, 100, 0, 23, 71, 0, 0, 109, 126, 4, 10, 10, 4, 39, 30, 122,
            27, 122, 122,
        ]));
        assert_eq!("341855000", msg.to().expect("to").to_string());
        assert_eq!("002371000", msg.from().expect("from").as_str());
        assert_eq!(Some(CategoryOfCall::Routine), msg.category());
        assert_eq!(Some(FirstCommand::J3eTelephony), msg.first_command());
        assert_eq!(
            "04101.0/04393.0",
            msg.frequency().expect("frequency").to_string()
        );
        assert_eq!(Some(EndOfSequence::AcknowledgeAnswer), msg.eos());
        assert_eq!(Some(Symbol::new(27)), msg.ecc());
        assert!(msg.is_ok());
    }

    #[test]
    fn test_individual_j3e_single() {
        let msg = decode(&ok(&[
            120, 120, 0, 23, 71, 0, 4, 100, 23, 82, 30, 0, 0, 109, 126, 8, 41, 45, 126, 126, 126,
            117, 7, 117, 117,
        ]));
        assert_eq!("002371000", msg.to().expect("to").to_string());
        assert_eq!("238230000", msg.from().expect("from").as_str());
        assert_eq!("08414.5", msg.frequency().expect("frequency").to_string());
        assert_eq!(Some(Symbol::new(7)), msg.ecc());
        assert!(msg.is_ok());
    }

    #[test]
    fn test_all_ships() {
        let msg = decode(&ok(&[
            116, 116, 108, 0, 23, 71, 0, 0, 109, 126, 4, 12, 50, 4, 12, 50, 127, 36, 127, 127,
        ]));
        assert_eq!(FormatSpecifier::AllShips, msg.format());
        assert_eq!(Some(&Destination::AllShips), msg.to());
        assert_eq!(Some(CategoryOfCall::Safety), msg.category());
        assert_eq!("002371000", msg.from().expect("from").as_str());
        assert_eq!(Some(FirstCommand::J3eTelephony), msg.first_command());
        assert_eq!(Some(SecondCommand::NoInformation), msg.second_command());
        assert_eq!(
            "04125.0/04125.0",
            msg.frequency().expect("frequency").to_string()
        );
        assert_eq!(Some(EndOfSequence::OtherCalls), msg.eos());
        assert_eq!(Some(Symbol::new(36)), msg.ecc());
        assert!(msg.is_ok());
    }

    #[test]
    fn test_geographic_area() {
        let msg = decode(&ok(&[
            102, 102, 4, 40, 3, 5, 8, 108, 0, 22, 75, 40, 0, 109, 126, 2, 18, 20, 2, 18, 20, 127,
            49, 127, 127,
        ]));
        assert_eq!(FormatSpecifier::GeographicArea, msg.format());
        assert_eq!(
            "North-East (NE), Reference point: 44°, 3°, Vertical side: 5°, Horizontal side: 8°",
            msg.to().expect("to").to_string()
        );
        assert_eq!(Some(CategoryOfCall::Safety), msg.category());
        assert_eq!("002275400", msg.from().expect("from").as_str());
        assert_eq!(
            "02182.0/02182.0",
            msg.frequency().expect("frequency").to_string()
        );
        assert_eq!(Some(EndOfSequence::OtherCalls), msg.eos());
        assert_eq!(Some(Symbol::new(49)), msg.ecc());
        assert!(msg.is_ok());
    }

    #[test]
    fn test_position_reply() {
        let msg = decode(&ok(&[
            120, 120, 0, 25, 70, 0, 0, 108, 23, 20, 19, 71, 50, 109, 126, 55, 5, 85, 30, 1, 34,
            117, 18, 117, 117,
        ]));
        assert_eq!("002570000", msg.to().expect("to").to_string());
        assert_eq!("232019715", msg.from().expect("from").as_str());
        assert_eq!(
            "North-East (NE), Latitude: 058.53°, Longitude: 001.34°",
            msg.position().expect("position").to_string()
        );
        assert!(msg.frequency().is_none());
        assert!(!msg.position_requested());
        assert_eq!(Some(Symbol::new(18)), msg.ecc());
        assert!(msg.is_ok());
    }

    #[test]
    fn test_position_request() {
        let msg = decode(&ok(&[
            120, 120, 51, 89, 99, 19, 50, 100, 0, 27, 11, 0, 0, 126, 126, 126, 126, 126, 126, 126,
            126, 117, 81, 117, 117,
        ]));
        assert_eq!("518999195", msg.to().expect("to").to_string());
        assert_eq!("002711000", msg.from().expect("from").as_str());
        assert_eq!(Some(FirstCommand::NoInformation), msg.first_command());
        assert!(msg.position_requested());
        assert!(msg.position().is_none());
        assert!(msg.frequency().is_none());
        assert_eq!(Some(Symbol::new(81)), msg.ecc());
        assert!(msg.is_ok());
    }

    #[test]
    fn test_corrupted_tail() {
        let mut raw: Vec<Option<u8>> = [120, 120, 0, 21, 50, 10, 0, 108, 22, 93, 64, 0, 0]
            .iter()
            .map(|v| Some(*v))
            .collect();
        raw.resize(25, None);
        let msg = decode(&syms(&raw));
        assert_eq!("002150100", msg.to().expect("to").to_string());
        assert_eq!("229364000", msg.from().expect("from").as_str());
        assert_eq!(Some(FirstCommand::Error), msg.first_command());
        assert_eq!(Some(SecondCommand::Error), msg.second_command());
        assert_eq!(Some(EndOfSequence::Error), msg.eos());
        assert_eq!(Some(Symbol::ERROR), msg.ecc());
        assert_eq!(
            &MessageStatus::Error(MessageDecodeErr::EccMismatch {
                received: None,
                computed: None
            }),
            msg.status()
        );
    }

    #[test]
    fn test_corrupted_frequency() {
        let msg = decode(&syms(&[
            Some(120),
            Some(120),
            Some(25),
            Some(75),
            Some(30),
            Some(0),
            Some(0),
            Some(108),
            Some(0),
            Some(23),
            Some(20),
            Some(1),
            Some(40),
            Some(109),
            Some(126),
            Some(2),
            None,
            Some(20),
            Some(2),
            Some(18),
            Some(20),
            Some(122),
            Some(27),
            Some(122),
            Some(122),
        ]));
        assert_eq!(
            "02__2.0/02182.0",
            msg.frequency().expect("frequency").to_string()
        );
        assert_eq!(Some(EndOfSequence::AcknowledgeAnswer), msg.eos());
        assert!(!msg.is_ok());
    }

    #[test]
    fn test_mixed_errors() {
        let msg = decode(&syms(&[
            Some(120),
            Some(120),
            Some(24),
            Some(91),
            None,
            None,
            Some(0),
            Some(108),
            None,
            None,
            None,
            None,
            None,
            Some(100),
            None,
            Some(126),
            Some(126),
            Some(126),
            Some(126),
            None,
            Some(126),
            Some(122),
            Some(4),
            Some(122),
            Some(122),
        ]));
        assert_eq!("2491____0", msg.to().expect("to").to_string());
        assert_eq!("_________", msg.from().expect("from").as_str());
        assert_eq!(Some(FirstCommand::AllModesTelephony), msg.first_command());
        assert_eq!(Some(SecondCommand::Error), msg.second_command());
        assert!(msg.position_requested());
        assert_eq!(Some(EndOfSequence::AcknowledgeAnswer), msg.eos());
        assert_eq!(Some(Symbol::new(4)), msg.ecc());
        assert_eq!(
            &MessageStatus::Error(MessageDecodeErr::EccMismatch {
                received: Some(4),
                computed: None
            }),
            msg.status()
        );
    }

    #[test]
    fn test_eos_fallback() {
        let mut raw: Vec<Option<u8>> = [
            112, 112, 25, 58, 5, 99, 70, 107, 4, 52, 60, 13, 7, 12, 52, 109, 127, 52, 127, 127,
        ]
        .iter()
        .map(|v| Some(*v))
        .collect();

        raw[16] = None;
        let msg = decode(&syms(&raw));
        assert_eq!(Some(EndOfSequence::OtherCalls), msg.eos());
        // the lost symbol is also covered by the ECC
        assert!(!msg.is_ok());

        raw[18] = None;
        raw[19] = None;
        let msg = decode(&syms(&raw));
        assert_eq!(Some(EndOfSequence::Error), msg.eos());
    }

    #[test]
    fn test_unsupported_and_short() {
        let msg = decode(&ok(&[114, 114, 0, 0, 0]));
        assert_eq!(FormatSpecifier::GroupCall, msg.format());
        assert!(msg.status().is_unsupported());
        assert!(msg.from().is_none());

        let msg = decode(&ok(&[123, 123]));
        assert!(msg.status().is_unsupported());

        let msg = decode(&ok(&[3, 3, 3]));
        assert_eq!(
            &MessageStatus::Error(MessageDecodeErr::UnrecognizedFormat),
            msg.status()
        );

        let msg = decode(&[]);
        assert_eq!(FormatSpecifier::Error, msg.format());

        let msg = decode(&ok(&[120, 120, 0, 23]));
        assert_eq!(
            &MessageStatus::Error(MessageDecodeErr::TooShort { needed: 25, got: 4 }),
            msg.status()
        );

        // the repeated format specifier stands in for a lost one
        let msg = decode(&syms(&[None, Some(114), Some(0)]));
        assert_eq!(FormatSpecifier::GroupCall, msg.format());
        let msg = decode(&syms(&[None, None, Some(114)]));
        assert_eq!(FormatSpecifier::Error, msg.format());
    }

    #[test]
    fn test_ecc() {
        assert_eq!(Some(0), compute_ecc(&[]));
        assert_eq!(Some(52), compute_ecc(&ok(&[112, 25, 58, 5, 99, 70, 107, 4, 52, 60, 13, 7, 12, 52, 109, 127])));
        assert_eq!(MessageStatus::Ok, check_ecc(&ok(&[1, 7, 7]), 2));
        assert!(!check_ecc(&ok(&[1, 7, 6]), 2).is_ok());
    }
}
