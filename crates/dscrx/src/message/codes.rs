//! DSC symbol code tables
//!
//! Most DSC fields are a single symbol drawn from a small
//! table. Each table here has an `Error` variant for symbols
//! which were lost in reception or are not defined.

use std::fmt;

use strum::EnumMessage;

use crate::symbol::Symbol;

/// Format specifier
///
/// The first symbol of every call. It determines the layout of
/// the rest of the message.
///
/// ```
/// use dscrx::{FormatSpecifier, Symbol};
///
/// let fmt = FormatSpecifier::from(Symbol::new(120));
/// assert_eq!(FormatSpecifier::IndividualCall, fmt);
/// assert_eq!("Individual call", fmt.as_display_str());
/// assert_eq!("SEL", fmt.as_code_str());
/// assert_eq!(FormatSpecifier::Error, FormatSpecifier::from(Symbol::new(3)));
/// ```
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::FromRepr,
    strum_macros::EnumIter,
)]
#[repr(u8)]
pub enum FormatSpecifier {
    /// Calls to ships in a geographic area
    #[strum(message = "AREA", detailed_message = "Geographic area call")]
    GeographicArea = 102,

    /// Distress alert
    #[strum(message = "DIS", detailed_message = "Distress alert")]
    DistressAlert = 112,

    /// Calls to a group of ships
    #[strum(message = "GRP", detailed_message = "Group call")]
    GroupCall = 114,

    /// Calls to all ships
    #[strum(message = "ALL", detailed_message = "All ships call")]
    AllShips = 116,

    /// Selective call to a single station
    #[strum(message = "SEL", detailed_message = "Individual call")]
    IndividualCall = 120,

    /// Automatic/semi-automatic service
    #[strum(message = "AUT", detailed_message = "Automatic service call")]
    AutomaticService = 123,

    /// Unrecognized or unreadable format specifier
    #[strum(message = "ERR", detailed_message = "Unrecognized format")]
    Error = 255,
}

/// Category of the call
///
/// Indicates priority.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::FromRepr,
    strum_macros::EnumIter,
)]
#[repr(u8)]
pub enum CategoryOfCall {
    /// Routine traffic
    #[strum(message = "RTN", detailed_message = "Routine")]
    Routine = 100,

    /// Safety
    #[strum(message = "SAF", detailed_message = "Safety")]
    Safety = 108,

    /// Urgency
    #[strum(message = "URG", detailed_message = "Urgency")]
    Urgency = 110,

    /// Distress
    #[strum(message = "DIS", detailed_message = "Distress")]
    Distress = 112,

    /// Unrecognized or unreadable category
    #[strum(message = "ERR", detailed_message = "Error")]
    Error = 255,
}

/// Nature of a distress
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::FromRepr,
    strum_macros::EnumIter,
)]
#[repr(u8)]
pub enum NatureOfDistress {
    #[strum(message = "FIRE", detailed_message = "Fire, explosion")]
    Fire = 100,

    #[strum(message = "FLOOD", detailed_message = "Flooding")]
    Flooding = 101,

    #[strum(message = "COLL", detailed_message = "Collision")]
    Collision = 102,

    #[strum(message = "GRND", detailed_message = "Grounding")]
    Grounding = 103,

    #[strum(message = "LIST", detailed_message = "Listing, in danger of capsizing")]
    Listing = 104,

    #[strum(message = "SINK", detailed_message = "Sinking")]
    Sinking = 105,

    #[strum(message = "ADRIFT", detailed_message = "Disabled and adrift")]
    DisabledAdrift = 106,

    #[strum(message = "UNDES", detailed_message = "Undesignated distress")]
    Undesignated = 107,

    #[strum(message = "ABDN", detailed_message = "Abandoning ship")]
    AbandoningShip = 108,

    #[strum(message = "PIRACY", detailed_message = "Piracy/armed robbery attack")]
    Piracy = 109,

    #[strum(message = "MOB", detailed_message = "Man overboard")]
    ManOverboard = 110,

    /// Unrecognized or unreadable nature
    #[strum(message = "ERR", detailed_message = "Error")]
    Error = 255,
}

/// First telecommand
///
/// The kind of communication which is proposed.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::FromRepr,
    strum_macros::EnumIter,
)]
#[repr(u8)]
pub enum FirstCommand {
    #[strum(message = "F3E/G3E ALL", detailed_message = "F3E/G3E all modes TP")]
    AllModesTelephony = 100,

    #[strum(message = "F3E/G3E DUP", detailed_message = "F3E/G3E duplex TP")]
    DuplexTelephony = 101,

    #[strum(message = "POLL", detailed_message = "Polling")]
    Polling = 103,

    #[strum(message = "UNABLE", detailed_message = "Unable to comply")]
    UnableToComply = 104,

    #[strum(message = "EOC", detailed_message = "End of call")]
    EndOfCall = 105,

    #[strum(message = "DATA", detailed_message = "Data")]
    Data = 106,

    /// Single sideband telephony
    ///
    /// The only telecommand which carries a working frequency.
    #[strum(message = "J3E TP", detailed_message = "J3E TP")]
    J3eTelephony = 109,

    #[strum(message = "DIS ACK", detailed_message = "Distress acknowledgement")]
    DistressAcknowledgement = 110,

    #[strum(message = "DIS RLY", detailed_message = "Distress alert relay")]
    DistressRelay = 112,

    #[strum(message = "FEC", detailed_message = "F1B/J2B TTY-FEC")]
    TeletypeFec = 113,

    #[strum(message = "ARQ", detailed_message = "F1B/J2B TTY-ARQ")]
    TeletypeArq = 115,

    #[strum(message = "TEST", detailed_message = "Test")]
    Test = 118,

    #[strum(message = "POS UPD", detailed_message = "Ship position or location registration updating")]
    PositionUpdating = 121,

    #[strum(message = "NOINF", detailed_message = "No information")]
    NoInformation = 126,

    /// Unrecognized or unreadable telecommand
    #[strum(message = "ERR", detailed_message = "Error")]
    Error = 255,
}

/// Second telecommand
///
/// Additional information about the proposed communication,
/// or the reason a call cannot be answered.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::FromRepr,
    strum_macros::EnumIter,
)]
#[repr(u8)]
pub enum SecondCommand {
    #[strum(message = "NO REASON", detailed_message = "No reason given")]
    NoReason = 100,

    #[strum(message = "CONGESTION", detailed_message = "Congestion at maritime switching centre")]
    Congestion = 101,

    #[strum(message = "BUSY", detailed_message = "Busy")]
    Busy = 102,

    #[strum(message = "QUEUE", detailed_message = "Queue indication")]
    QueueIndication = 103,

    #[strum(message = "BARRED", detailed_message = "Station barred")]
    StationBarred = 104,

    #[strum(message = "NO OPER", detailed_message = "No operator available")]
    NoOperator = 105,

    #[strum(message = "OPER UNAVAIL", detailed_message = "Operator temporarily unavailable")]
    OperatorUnavailable = 106,

    #[strum(message = "DISABLED", detailed_message = "Equipment disabled")]
    EquipmentDisabled = 107,

    #[strum(message = "CHAN UNUSABLE", detailed_message = "Unable to use proposed channel")]
    ChannelUnusable = 108,

    #[strum(message = "MODE UNUSABLE", detailed_message = "Unable to use proposed mode")]
    ModeUnusable = 109,

    #[strum(message = "ARMED CONFLICT", detailed_message = "Ships and aircraft of states not parties to an armed conflict")]
    ArmedConflict = 110,

    #[strum(message = "MEDICAL", detailed_message = "Medical transports")]
    MedicalTransports = 111,

    #[strum(message = "PAYPHONE", detailed_message = "Pay-phone/public call office")]
    PayPhone = 112,

    #[strum(message = "FAX", detailed_message = "Facsimile/data according to ITU-T Rec. V.21")]
    Facsimile = 113,

    #[strum(message = "NO REMAIN", detailed_message = "No remaining ACS sequential transmission")]
    NoRemaining = 120,

    #[strum(message = "REMAIN 1", detailed_message = "1 ACS sequential transmission remaining")]
    OneRemaining = 121,

    #[strum(message = "REMAIN 2", detailed_message = "2 ACS sequential transmissions remaining")]
    TwoRemaining = 122,

    #[strum(message = "REMAIN 3", detailed_message = "3 ACS sequential transmissions remaining")]
    ThreeRemaining = 123,

    #[strum(message = "REMAIN 4", detailed_message = "4 ACS sequential transmissions remaining")]
    FourRemaining = 124,

    #[strum(message = "REMAIN 5", detailed_message = "5 ACS sequential transmissions remaining")]
    FiveRemaining = 125,

    #[strum(message = "NOINF", detailed_message = "No information")]
    NoInformation = 126,

    /// Unrecognized or unreadable telecommand
    #[strum(message = "ERR", detailed_message = "Error")]
    Error = 255,
}

/// End-of-sequence symbol
///
/// Closes every call and says whether an acknowledgement is
/// expected.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum_macros::EnumMessage,
    strum_macros::FromRepr,
    strum_macros::EnumIter,
)]
#[repr(u8)]
pub enum EndOfSequence {
    /// Acknowledgement requested
    #[strum(message = "REQ", detailed_message = "Acknowledge RQ")]
    AcknowledgeRequest = 117,

    /// This call is an acknowledgement
    #[strum(message = "ACK", detailed_message = "Acknowledge BQ")]
    AcknowledgeAnswer = 122,

    /// Any other call
    #[strum(message = "EOS", detailed_message = "Other calls")]
    OtherCalls = 127,

    /// No end-of-sequence symbol could be read
    #[strum(message = "ERR", detailed_message = "Error")]
    Error = 255,
}

// Implements symbol lookup and display for a code table
macro_rules! code_table {
    ($name:ident) => {
        impl $name {
            /// Human-readable description
            pub fn as_display_str(&self) -> &'static str {
                self.get_detailed_message().unwrap_or("Error")
            }

            /// Short code, as shown in call logs
            pub fn as_code_str(&self) -> &'static str {
                self.get_message().unwrap_or("ERR")
            }

            /// Symbol value, or `None` for the error variant
            pub fn symbol(&self) -> Option<u8> {
                match self {
                    $name::Error => None,
                    _ => Some(*self as u8),
                }
            }

            /// True if the symbol was unreadable or undefined
            pub fn is_error(&self) -> bool {
                *self == $name::Error
            }
        }

        impl From<Symbol> for $name {
            fn from(sym: Symbol) -> Self {
                sym.value()
                    .and_then($name::from_repr)
                    .unwrap_or($name::Error)
            }
        }

        impl From<u8> for $name {
            fn from(value: u8) -> Self {
                $name::from(Symbol::new(value))
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(self.as_display_str(), f)
            }
        }
    };
}

code_table!(FormatSpecifier);
code_table!(CategoryOfCall);
code_table!(NatureOfDistress);
code_table!(FirstCommand);
code_table!(SecondCommand);
code_table!(EndOfSequence);

#[cfg(test)]
mod tests {
    use super::*;

    use strum::IntoEnumIterator;

    #[test]
    fn test_lookup() {
        assert_eq!(FormatSpecifier::DistressAlert, FormatSpecifier::from(112));
        assert_eq!(CategoryOfCall::Safety, CategoryOfCall::from(108));
        assert_eq!(NatureOfDistress::Undesignated, NatureOfDistress::from(107));
        assert_eq!(FirstCommand::J3eTelephony, FirstCommand::from(109));
        assert_eq!(SecondCommand::NoInformation, SecondCommand::from(126));
        assert_eq!(EndOfSequence::OtherCalls, EndOfSequence::from(127));

        assert_eq!(CategoryOfCall::Error, CategoryOfCall::from(Symbol::ERROR));
        assert_eq!(FirstCommand::Error, FirstCommand::from(102));
        assert_eq!(EndOfSequence::Error, EndOfSequence::from(0));
    }

    #[test]
    fn test_display() {
        assert_eq!("Undesignated distress", NatureOfDistress::Undesignated.to_string());
        assert_eq!("J3E TP", FirstCommand::J3eTelephony.as_code_str());
        assert_eq!("Acknowledge BQ", EndOfSequence::AcknowledgeAnswer.to_string());
        assert_eq!(Some(117), EndOfSequence::AcknowledgeRequest.symbol());
        assert_eq!(None, EndOfSequence::Error.symbol());
        assert!(SecondCommand::Error.is_error());
    }

    #[test]
    fn test_tables_round_trip() {
        // every defined variant is reachable from its own symbol
        for fmt in FormatSpecifier::iter() {
            if let Some(v) = fmt.symbol() {
                assert_eq!(fmt, FormatSpecifier::from(v));
            }
            assert!(!fmt.as_display_str().is_empty());
        }
        for cmd in FirstCommand::iter() {
            if let Some(v) = cmd.symbol() {
                assert_eq!(cmd, FirstCommand::from(v));
            }
        }
        for cmd in SecondCommand::iter() {
            if let Some(v) = cmd.symbol() {
                assert_eq!(cmd, SecondCommand::from(v));
            }
        }
        assert_eq!(11, NatureOfDistress::iter().filter(|n| !n.is_error()).count());
    }
}
