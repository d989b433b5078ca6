//! Device status codes
//!
//! Values come from the Chrome U2F extension (`devicestatuscodes.js`). Positive
//! values are ISO 7816 status words, negative values are helper-specific.

use std::fmt;

/// Status code carried in the `code` field of every helper reply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum StatusCode {
    /// Request completed
    Ok = 0,
    /// Wrong length
    WrongLength = 0x6700,
    /// Test of user presence is required
    WaitTouch = 0x6985,
    /// Invalid data
    InvalidData = 0x6984,
    /// Wrong data (unknown key handle)
    WrongData = 0x6a80,
    /// Operation timed out
    Timeout = -5,
    /// Device is busy
    Busy = -6,
    /// Device has gone away
    Gone = -8,
}

impl StatusCode {
    pub fn is_ok(self) -> bool {
        self == StatusCode::Ok
    }
}

impl TryFrom<i32> for StatusCode {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, i32> {
        match value {
            0 => Ok(StatusCode::Ok),
            0x6700 => Ok(StatusCode::WrongLength),
            0x6985 => Ok(StatusCode::WaitTouch),
            0x6984 => Ok(StatusCode::InvalidData),
            0x6a80 => Ok(StatusCode::WrongData),
            -5 => Ok(StatusCode::Timeout),
            -6 => Ok(StatusCode::Busy),
            -8 => Ok(StatusCode::Gone),
            other => Err(other),
        }
    }
}

impl From<StatusCode> for i32 {
    fn from(code: StatusCode) -> Self {
        code as i32
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StatusCode::Ok => "OK",
            StatusCode::WrongLength => "WRONG_LENGTH",
            StatusCode::WaitTouch => "WAIT_TOUCH",
            StatusCode::InvalidData => "INVALID_DATA",
            StatusCode::WrongData => "WRONG_DATA",
            StatusCode::Timeout => "TIMEOUT",
            StatusCode::Busy => "BUSY",
            StatusCode::Gone => "GONE",
        };
        write!(f, "{} ({})", name, i32::from(*self))
    }
}
