//! Device failure types.

use super::codes::ErrorCodeTable;
use thiserror::Error;

/// A failure reported by device I/O.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DeviceFault {
    /// Numeric completion code resolved through an [`ErrorCodeTable`]
    #[error("Device error {code}: {description}")]
    Code { code: u32, description: &'static str },

    #[error("Communication failed: {0}")]
    Communication(String),

    /// The device answered but had nothing to report
    #[error("No data available")]
    NoData,

    /// The driver is not in a position to serve the request
    #[error("Device is not available")]
    Unavailable,

    #[error("Tool rejected: {0}")]
    ToolRejected(String),

    #[error("Failed to spawn communication thread: {0}")]
    ThreadSpawn(String),

    #[error("Communication thread panicked")]
    ThreadPanicked,
}

impl DeviceFault {
    /// Fault for completion `code`, described by `table`.
    ///
    /// ```rust
    /// use statebridge::device::{DeviceFault, OPTICAL_TRACKER_ERRORS};
    ///
    /// let fault = DeviceFault::from_code(&OPTICAL_TRACKER_ERRORS, 55);
    /// assert_eq!(fault.to_string(), "Device error 55: Grab frame error");
    /// ```
    pub fn from_code(table: &ErrorCodeTable, code: u32) -> Self {
        Self::Code {
            code,
            description: table.describe(code),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::codes::{OPTICAL_TRACKER_ERRORS, UNKNOWN_ERROR_CODE};

    #[test]
    fn unknown_code_still_builds_a_fault() {
        let fault = DeviceFault::from_code(&OPTICAL_TRACKER_ERRORS, 999);
        assert_eq!(
            fault,
            DeviceFault::Code {
                code: 999,
                description: UNKNOWN_ERROR_CODE
            }
        );
    }
}
