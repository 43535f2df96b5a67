//! Property addressing types shared by the listener and the subsystem boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier of a hardware object whose properties can be observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(pub u32);

impl ObjectId {
    /// The "no object" identifier.
    pub const UNKNOWN: ObjectId = ObjectId(0);
    /// The system object that owns every device.
    pub const SYSTEM: ObjectId = ObjectId(1);

    /// Raw identifier value.
    pub fn get(self) -> u32 {
        self.0
    }
}

impl From<u32> for ObjectId {
    fn from(value: u32) -> Self {
        ObjectId(value)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A 32-bit code conventionally written as four ASCII characters, e.g. `'glob'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "FourCharCodeRepr", into = "FourCharCodeRepr")]
pub struct FourCharCode(pub u32);

impl FourCharCode {
    /// Build a code from its four big-endian bytes.
    pub const fn from_bytes(bytes: [u8; 4]) -> Self {
        FourCharCode(u32::from_be_bytes(bytes))
    }

    /// The four big-endian bytes of this code.
    pub const fn as_bytes(self) -> [u8; 4] {
        self.0.to_be_bytes()
    }

    /// Raw numeric value.
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Returns true if every byte is printable ASCII.
    pub fn is_printable(self) -> bool {
        self.as_bytes().iter().all(|b| (0x20..=0x7e).contains(b))
    }
}

impl From<u32> for FourCharCode {
    fn from(value: u32) -> Self {
        FourCharCode(value)
    }
}

impl fmt::Display for FourCharCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_printable() {
            let text: String = self.as_bytes().iter().map(|b| char::from(*b)).collect();
            write!(f, "{}", text)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Error returned when a string is neither a number nor four ASCII characters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid four-char code: {0:?}")]
pub struct ParseFourCharCodeError(String);

impl FromStr for FourCharCode {
    type Err = ParseFourCharCodeError;

    /// Parses a decimal or `0x`-prefixed hex integer, or exactly four ASCII
    /// characters. Numeric forms win, so `"1234"` is the number 1234.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
            return u32::from_str_radix(hex, 16)
                .map(FourCharCode)
                .map_err(|_| ParseFourCharCodeError(s.to_string()));
        }

        if let Ok(value) = s.parse::<u32>() {
            return Ok(FourCharCode(value));
        }

        let bytes = s.as_bytes();
        if bytes.len() == 4 && bytes.iter().all(|b| (0x20..=0x7e).contains(b)) {
            return Ok(FourCharCode::from_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]));
        }

        Err(ParseFourCharCodeError(s.to_string()))
    }
}

/// Serialized form: a four-char string when printable, the integer otherwise.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum FourCharCodeRepr {
    Number(u32),
    Text(String),
}

impl TryFrom<FourCharCodeRepr> for FourCharCode {
    type Error = ParseFourCharCodeError;

    fn try_from(repr: FourCharCodeRepr) -> Result<Self, Self::Error> {
        match repr {
            FourCharCodeRepr::Number(value) => Ok(FourCharCode(value)),
            FourCharCodeRepr::Text(text) => text.parse(),
        }
    }
}

impl From<FourCharCode> for FourCharCodeRepr {
    fn from(code: FourCharCode) -> Self {
        if code.is_printable() {
            FourCharCodeRepr::Text(code.to_string())
        } else {
            FourCharCodeRepr::Number(code.0)
        }
    }
}

/// Well-known property scopes.
pub mod scope {
    use super::FourCharCode;

    /// Properties that apply to the object as a whole.
    pub const GLOBAL: FourCharCode = FourCharCode::from_bytes(*b"glob");
    /// Input side of a device.
    pub const INPUT: FourCharCode = FourCharCode::from_bytes(*b"inpt");
    /// Output side of a device.
    pub const OUTPUT: FourCharCode = FourCharCode::from_bytes(*b"outp");
    /// Play-through side of a device.
    pub const PLAYTHROUGH: FourCharCode = FourCharCode::from_bytes(*b"ptru");
    /// Matches every scope.
    pub const WILDCARD: FourCharCode = FourCharCode::from_bytes(*b"****");
}

/// Well-known property elements.
pub mod element {
    /// The main element.
    pub const MAIN: u32 = 0;
    /// Matches every element.
    pub const WILDCARD: u32 = 0xFFFF_FFFF;
}

/// Selector that matches every property.
pub const SELECTOR_WILDCARD: FourCharCode = FourCharCode::from_bytes(*b"****");

/// Identifies one property of a hardware object: which property (`selector`),
/// which side of the object (`scope`) and which channel (`element`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyAddress {
    /// Which property.
    pub selector: FourCharCode,
    /// Which side of the object.
    pub scope: FourCharCode,
    /// Which element (channel).
    pub element: u32,
}

impl PropertyAddress {
    /// Address covering all selectors, scopes and elements.
    pub const WILDCARD: PropertyAddress = PropertyAddress {
        selector: SELECTOR_WILDCARD,
        scope: scope::WILDCARD,
        element: element::WILDCARD,
    };

    /// Address for `selector` in the global scope on the main element.
    pub const fn new(selector: FourCharCode) -> Self {
        PropertyAddress {
            selector,
            scope: scope::GLOBAL,
            element: element::MAIN,
        }
    }

    /// Replace the scope.
    pub const fn with_scope(mut self, scope: FourCharCode) -> Self {
        self.scope = scope;
        self
    }

    /// Replace the element.
    pub const fn with_element(mut self, element: u32) -> Self {
        self.element = element;
        self
    }

    /// Returns true if every field is a wildcard.
    pub fn is_wildcard(&self) -> bool {
        *self == Self::WILDCARD
    }

    /// Returns true if `self` and `other` select an overlapping set of properties.
    ///
    /// A field matches when the values are equal or either side is that
    /// field's wildcard.
    pub fn matches(&self, other: &PropertyAddress) -> bool {
        let selector = self.selector == other.selector
            || self.selector == SELECTOR_WILDCARD
            || other.selector == SELECTOR_WILDCARD;
        let scope = self.scope == other.scope
            || self.scope == scope::WILDCARD
            || other.scope == scope::WILDCARD;
        let element = self.element == other.element
            || self.element == element::WILDCARD
            || other.element == element::WILDCARD;

        selector && scope && element
    }
}

impl Default for PropertyAddress {
    fn default() -> Self {
        Self::WILDCARD
    }
}

impl fmt::Display for PropertyAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "('{}', '{}', {})", self.selector, self.scope, self.element)
    }
}
