//! A tracking device as a state-machine owner.
//!
//! [`Tracker`] composes one [`StateMachine`](crate::machine::StateMachine)
//! and one [`StatusBuffer`](crate::device::StatusBuffer). Its request
//! methods are the only way to drive it; each returns once the machine has
//! drained, with outcomes published as [`TrackerEvent`]s.
//!
//! ```text
//! Idle --EstablishCommunication--> AttemptingToEstablishCommunication
//!   --Success--> CommunicationEstablished --AttachTool--> AttemptingToAttachTool
//!   --Success--> ToolAttached --StartTracking--> AttemptingToTrack
//!   --Success--> Tracking --UpdateStatus--> AttemptingToUpdate --Success--> Tracking
//! ```

mod config;
mod driver;
#[allow(clippy::module_inception)]
mod tracker;
mod types;

pub use config::TrackerConfig;
pub use driver::TrackerDriver;
pub use tracker::{Tracker, TrackerCore, TrackerMachine};
pub use types::{TrackedTool, TrackerEvent, TrackerInput, TrackerState, Transform};
