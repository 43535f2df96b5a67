//! Status codes returned across the subsystem boundary.

use crate::core::FourCharCode;
use crate::error::{ListenerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw status returned by the hardware subsystem. Zero means success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Status(pub i32);

const fn fourcc(bytes: [u8; 4]) -> Status {
    Status(i32::from_be_bytes(bytes))
}

impl Status {
    /// The call succeeded.
    pub const NO_ERROR: Status = Status(0);
    /// The hardware is not running.
    pub const NOT_RUNNING: Status = fourcc(*b"stop");
    /// Unspecified failure.
    pub const UNSPECIFIED: Status = fourcc(*b"what");
    /// The object does not know the requested property.
    pub const UNKNOWN_PROPERTY: Status = fourcc(*b"who?");
    /// A property data buffer had the wrong size.
    pub const BAD_PROPERTY_SIZE: Status = fourcc(*b"!siz");
    /// The operation is not allowed in the current state.
    pub const ILLEGAL_OPERATION: Status = fourcc(*b"nope");
    /// The object identifier is not valid.
    pub const BAD_OBJECT: Status = fourcc(*b"!obj");
    /// The device identifier is not valid.
    pub const BAD_DEVICE: Status = fourcc(*b"!dev");
    /// The stream identifier is not valid.
    pub const BAD_STREAM: Status = fourcc(*b"!str");
    /// The object does not support the operation.
    pub const UNSUPPORTED_OPERATION: Status = fourcc(*b"unop");

    /// Raw status code.
    pub const fn code(self) -> i32 {
        self.0
    }

    /// Returns true for [`Status::NO_ERROR`].
    pub const fn is_ok(self) -> bool {
        self.0 == 0
    }

    /// Converts a non-zero status into [`ListenerError::Subsystem`].
    pub fn into_result(self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(ListenerError::Subsystem(self))
        }
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        Status(code)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = FourCharCode(self.0 as u32);
        if self.0 != 0 && code.is_printable() {
            write!(f, "'{}'", code)
        } else {
            write!(f, "{}", self.0)
        }
    }
}
