//! Multi-symbol DSC fields
//!
//! Numeric DSC fields pack two decimal digits into each
//! symbol. A symbol which was lost in reception, or which is
//! outside `0..=99`, cannot contribute digits. Depending on the
//! field, such symbols either render as `__` placeholders or
//! make the whole field unreadable.

use std::fmt;

use strum::EnumMessage;

use crate::symbol::Symbol;

/// Placeholder for two digits which could not be read
const MISSING_DIGITS: &str = "__";

/// Rendering of a field which could not be read
pub const UNREADABLE: &str = "--error--";

/// Decimal digits of `symbols`, two per symbol
///
/// Returns `None` if any symbol is not a two-digit value.
pub fn digits(symbols: &[Symbol]) -> Option<Vec<u8>> {
    let mut out = Vec::with_capacity(2 * symbols.len());
    for sym in symbols {
        let v = sym.decimal()?;
        out.push(v / 10);
        out.push(v % 10);
    }
    Some(out)
}

/// Decimal rendering of `symbols`, two characters per symbol
///
/// Unreadable symbols render as `__`.
pub fn digit_string(symbols: &[Symbol]) -> String {
    let mut out = String::with_capacity(2 * symbols.len());
    for sym in symbols {
        match sym.decimal() {
            Some(v) => out.push_str(&format!("{:02}", v)),
            None => out.push_str(MISSING_DIGITS),
        }
    }
    out
}

/// A maritime mobile service identity (MMSI)
///
/// Nine digits, carried in five symbols. The tenth digit is
/// always zero and is not part of the identity. Digits which
/// could not be received are shown as `_`.
///
/// ```
/// use dscrx::{Identifier, Symbol};
///
/// let syms: Vec<Symbol> = [25u8, 58, 5, 99, 70].iter().map(|v| Symbol::new(*v)).collect();
/// assert_eq!("255805997", Identifier::from_symbols(&syms).as_str());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Identifier(String);

impl Identifier {
    /// Decode from five symbols
    pub fn from_symbols(symbols: &[Symbol]) -> Self {
        let mut s = digit_string(symbols);
        s.pop();
        Identifier(s)
    }

    /// Identity as text
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if every digit was received
    pub fn is_complete(&self) -> bool {
        !self.0.is_empty() && self.0.bytes().all(|b| b.is_ascii_digit())
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Earth quadrant of a position or area
///
/// Carried as the first digit of the field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::EnumMessage)]
pub enum Quadrant {
    #[strum(detailed_message = "North-East (NE)")]
    NorthEast,

    #[strum(detailed_message = "North-West (NW)")]
    NorthWest,

    #[strum(detailed_message = "South-East (SE)")]
    SouthEast,

    #[strum(detailed_message = "South-West (SW)")]
    SouthWest,

    /// Quadrant digit was not 0 to 3
    #[strum(detailed_message = "Unknown quadrant")]
    Unknown,
}

impl Quadrant {
    /// Quadrant from its digit
    pub fn from_digit(digit: u8) -> Self {
        match digit {
            0 => Quadrant::NorthEast,
            1 => Quadrant::NorthWest,
            2 => Quadrant::SouthEast,
            3 => Quadrant::SouthWest,
            _ => Quadrant::Unknown,
        }
    }

    /// Human-readable description
    pub fn as_display_str(&self) -> &'static str {
        self.get_detailed_message().unwrap_or("Unknown quadrant")
    }
}

impl fmt::Display for Quadrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self.as_display_str(), f)
    }
}

/// A field which may have been received damaged
///
/// Positions and areas are all-or-nothing: one bad symbol makes
/// the whole field unreadable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FieldValue<T> {
    /// Field was read
    Known(T),

    /// One or more symbols could not be read
    Unreadable,
}

impl<T> FieldValue<T> {
    /// The value, if it was read
    pub fn known(&self) -> Option<&T> {
        match self {
            FieldValue::Known(v) => Some(v),
            FieldValue::Unreadable => None,
        }
    }

    /// True if the field could not be read
    pub fn is_unreadable(&self) -> bool {
        matches!(self, FieldValue::Unreadable)
    }
}

impl<T> From<Option<T>> for FieldValue<T> {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => FieldValue::Known(v),
            None => FieldValue::Unreadable,
        }
    }
}

impl<T: fmt::Display> fmt::Display for FieldValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Known(v) => fmt::Display::fmt(v, f),
            FieldValue::Unreadable => f.write_str(UNREADABLE),
        }
    }
}

/// A ship position
///
/// Ten digits: the quadrant, two of latitude degrees, two of
/// latitude minutes, three of longitude degrees, and two of
/// longitude minutes.
///
/// ```
/// use dscrx::{Position, Symbol};
///
/// let syms: Vec<Symbol> = [4u8, 52, 60, 13, 7].iter().map(|v| Symbol::new(*v)).collect();
/// let pos = Position::from_symbols(&syms).known().cloned().unwrap();
/// assert_eq!(
///     "North-East (NE), Latitude: 045.26°, Longitude: 013.07°",
///     &format!("{}", pos)
/// );
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Position {
    digits: [u8; 10],
}

impl Position {
    /// Decode from five symbols
    pub fn from_symbols(symbols: &[Symbol]) -> FieldValue<Position> {
        digits(symbols)
            .and_then(|d| <[u8; 10]>::try_from(d).ok())
            .map(|digits| Position { digits })
            .into()
    }

    /// Quadrant
    pub fn quadrant(&self) -> Quadrant {
        Quadrant::from_digit(self.digits[0])
    }

    /// Latitude as (degrees, minutes)
    pub fn latitude(&self) -> (u8, u8) {
        (
            10 * self.digits[1] + self.digits[2],
            10 * self.digits[3] + self.digits[4],
        )
    }

    /// Longitude as (degrees, minutes)
    pub fn longitude(&self) -> (u16, u8) {
        (
            100 * self.digits[5] as u16 + 10 * self.digits[6] as u16 + self.digits[7] as u16,
            10 * self.digits[8] + self.digits[9],
        )
    }

    /// Signed decimal degrees, as (latitude, longitude)
    ///
    /// North and East are positive. `None` if the quadrant is
    /// unknown.
    pub fn to_degrees(&self) -> Option<(f64, f64)> {
        let (lat_d, lat_m) = self.latitude();
        let (lon_d, lon_m) = self.longitude();
        let lat = lat_d as f64 + lat_m as f64 / 60.0;
        let lon = lon_d as f64 + lon_m as f64 / 60.0;
        match self.quadrant() {
            Quadrant::NorthEast => Some((lat, lon)),
            Quadrant::NorthWest => Some((lat, -lon)),
            Quadrant::SouthEast => Some((-lat, lon)),
            Quadrant::SouthWest => Some((-lat, -lon)),
            Quadrant::Unknown => None,
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let d = &self.digits;
        write!(
            f,
            "{}, Latitude: 0{}{}.{}{}°, Longitude: {}{}{}.{}{}°",
            self.quadrant(),
            d[1],
            d[2],
            d[3],
            d[4],
            d[5],
            d[6],
            d[7],
            d[8],
            d[9]
        )
    }
}

/// A geographic area
///
/// Ten digits: the quadrant, the latitude and longitude of the
/// reference corner in whole degrees, and the vertical and
/// horizontal extent in degrees.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct AreaDescriptor {
    quadrant: Quadrant,
    latitude: u8,
    longitude: u16,
    vertical: u8,
    horizontal: u8,
}

impl AreaDescriptor {
    /// Decode from five symbols
    pub fn from_symbols(symbols: &[Symbol]) -> FieldValue<AreaDescriptor> {
        digits(symbols)
            .filter(|d| d.len() == 10)
            .map(|d| AreaDescriptor {
                quadrant: Quadrant::from_digit(d[0]),
                latitude: 10 * d[1] + d[2],
                longitude: 100 * d[3] as u16 + 10 * d[4] as u16 + d[5] as u16,
                vertical: 10 * d[6] + d[7],
                horizontal: 10 * d[8] + d[9],
            })
            .into()
    }

    /// Quadrant
    pub fn quadrant(&self) -> Quadrant {
        self.quadrant
    }

    /// Reference point as (latitude, longitude) degrees
    pub fn reference(&self) -> (u8, u16) {
        (self.latitude, self.longitude)
    }

    /// Vertical (latitude) extent, degrees
    pub fn vertical(&self) -> u8 {
        self.vertical
    }

    /// Horizontal (longitude) extent, degrees
    pub fn horizontal(&self) -> u8 {
        self.horizontal
    }
}

impl fmt::Display for AreaDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}, Reference point: {}°, {}°, Vertical side: {}°, Horizontal side: {}°",
            self.quadrant, self.latitude, self.longitude, self.vertical, self.horizontal
        )
    }
}

/// Working frequency, or a pair of them
///
/// Each frequency is six digits in units of 100 Hz, rendered
/// as `ddddd.d` kHz. When a call proposes separate transmit and
/// receive frequencies, both are shown as `tx/rx`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrequencyField {
    first: String,
    second: Option<String>,
}

impl FrequencyField {
    /// Decode from six symbols
    ///
    /// The second frequency is omitted if all three of its
    /// symbols are filler values above 99.
    pub fn from_symbols(symbols: &[Symbol]) -> Self {
        let split = usize::min(3, symbols.len());
        let (head, tail) = symbols.split_at(split);

        let filler = tail
            .iter()
            .all(|s| s.value().map(|v| v > 99).unwrap_or(false));
        let second = if tail.is_empty() || filler {
            None
        } else {
            Some(render_frequency(tail))
        };

        FrequencyField {
            first: render_frequency(head),
            second,
        }
    }

    /// First (or only) frequency
    pub fn first(&self) -> &str {
        &self.first
    }

    /// Second frequency, if any
    pub fn second(&self) -> Option<&str> {
        self.second.as_deref()
    }

    /// True if every digit was received
    pub fn is_complete(&self) -> bool {
        !self.to_string().contains('_')
    }
}

impl fmt::Display for FrequencyField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.second {
            Some(second) => write!(f, "{}/{}", self.first, second),
            None => f.write_str(&self.first),
        }
    }
}

// ddddd.d from three symbols
fn render_frequency(symbols: &[Symbol]) -> String {
    let mut s = digit_string(symbols);
    if s.len() > 1 {
        s.insert(s.len() - 1, '.');
    }
    s
}

/// Time of day (UTC)
///
/// Sent by distress alerts as two symbols: hours and minutes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct UtcTime {
    hours: Option<u8>,
    minutes: Option<u8>,
}

impl UtcTime {
    /// Decode from two symbols
    pub fn from_symbols(hours: Symbol, minutes: Symbol) -> Self {
        UtcTime {
            hours: hours.decimal(),
            minutes: minutes.decimal(),
        }
    }

    /// Hours, if received
    pub fn hours(&self) -> Option<u8> {
        self.hours
    }

    /// Minutes, if received
    pub fn minutes(&self) -> Option<u8> {
        self.minutes
    }

    /// Convert to a time of day
    ///
    /// Returns `None` if either half is missing or out of range.
    /// Ships which do not know the time send `88:88`.
    #[cfg(feature = "chrono")]
    pub fn to_naive_time(&self) -> Option<chrono::NaiveTime> {
        chrono::NaiveTime::from_hms_opt(self.hours? as u32, self.minutes? as u32, 0)
    }
}

impl fmt::Display for UtcTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.hours {
            Some(h) => write!(f, "{:02}", h)?,
            None => f.write_str(MISSING_DIGITS)?,
        }
        f.write_str(":")?;
        match self.minutes {
            Some(m) => write!(f, "{:02}", m),
            None => f.write_str(MISSING_DIGITS),
        }
    }
}
