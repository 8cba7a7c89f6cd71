//! Double-buffered device status.
//!
//! A device runs its I/O on one background [`CommunicationThread`] that
//! writes acquired frames into a [`StatusBuffer`]. The owner's state machine
//! reads the same buffer from its own thread, typically inside an action
//! bound to an "update status" input. The buffer's lock is the only thing
//! the two threads share; the state machine is never called from the
//! background thread.
//!
//! Payloads are stamped with a [`TimeStamp`] when they are written, so a
//! consumer can tell stale data from fresh without waiting for new frames.
//! Acquisition failures travel separately as [`DeviceFault`]s and never
//! overwrite the buffer.

mod buffer;
mod clock;
mod codes;
mod communication;
mod fault;
mod stamp;

pub use buffer::{BufferEntry, Reading, StatusBuffer};
pub use clock::{Clock, ManualClock, SystemClock};
pub use codes::{ErrorCodeTable, OPTICAL_TRACKER_ERRORS, UNKNOWN_ERROR_CODE};
pub use communication::{CommunicationConfig, CommunicationThread, DataSource};
pub use fault::DeviceFault;
pub use stamp::{Stamped, TimeStamp};
