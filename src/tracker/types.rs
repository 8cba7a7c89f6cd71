//! Vocabulary of the tracker owner.

use crate::device::Stamped;
use serde::{Deserialize, Serialize};

crate::symbol_enum! {
    /// States of a [`Tracker`](super::Tracker).
    pub enum TrackerState {
        Idle,
        AttemptingToEstablishCommunication,
        CommunicationEstablished,
        AttemptingToAttachTool,
        ToolAttached,
        AttemptingToTrack,
        Tracking,
        AttemptingToUpdate,
        AttemptingToStopTracking,
        AttemptingToCloseCommunication,
        AttemptingToReset,
    }
}

crate::symbol_enum! {
    /// Inputs of a [`Tracker`](super::Tracker).
    ///
    /// `Success` and `Failure` are only ever pushed by the tracker's own
    /// actions, reporting the outcome of the attempt they just made.
    /// `ToolsPresent` and `NoTools` are pushed the same way, to keep the
    /// state in line with the attached tools.
    pub enum TrackerInput {
        EstablishCommunication,
        AttachTool,
        DetachTool,
        StartTracking,
        UpdateStatus,
        StopTracking,
        Reset,
        CloseCommunication,
        Success,
        Failure,
        ToolsPresent,
        NoTools,
    }
}

/// Rigid transform of a tool in tracker coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    pub translation: [f64; 3],
    /// Unit quaternion, `[x, y, z, w]`.
    pub rotation: [f64; 4],
    /// RMS error reported by the device, zero when unknown.
    pub error: f64,
}

impl Transform {
    pub fn new(translation: [f64; 3], rotation: [f64; 4]) -> Self {
        Self {
            translation,
            rotation,
            error: 0.0,
        }
    }

    pub fn identity() -> Self {
        Self::new([0.0; 3], [0.0, 0.0, 0.0, 1.0])
    }

    pub fn with_error(mut self, error: f64) -> Self {
        self.error = error;
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// What the tracker knows about one attached tool.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackedTool<K> {
    id: K,
    transform: Option<Stamped<Transform>>,
    visible: bool,
    updated: bool,
}

impl<K> TrackedTool<K> {
    pub(crate) fn new(id: K) -> Self {
        Self {
            id,
            transform: None,
            visible: false,
            updated: false,
        }
    }

    pub(crate) fn report_visible(&mut self, transform: Stamped<Transform>) {
        self.transform = Some(transform);
        self.visible = true;
        self.updated = true;
    }

    /// The last known transform is kept.
    pub(crate) fn report_not_available(&mut self) {
        self.visible = false;
        self.updated = false;
    }

    pub fn id(&self) -> &K {
        &self.id
    }

    /// Last transform received, possibly stale. Check its stamp.
    pub fn transform(&self) -> Option<&Stamped<Transform>> {
        self.transform.as_ref()
    }

    /// Seen by the device in the last status update.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The last status update replaced the transform.
    pub fn is_updated(&self) -> bool {
        self.updated
    }
}

/// Notifications published by a tracker as requests play out.
#[derive(Clone, Debug, PartialEq)]
pub enum TrackerEvent<K> {
    Opened,
    OpenFailed(String),
    ToolAttached(K),
    ToolAttachFailed { tool: Option<K>, reason: String },
    ToolDetached(K),
    ToolDetachFailed { tool: Option<K>, reason: String },
    TrackingStarted,
    TrackingStartFailed(String),
    ToolVisible(K),
    ToolNotAvailable(K),
    UpdateFailed(String),
    TrackingStopped,
    TrackingStopFailed(String),
    ResetDone,
    ResetFailed(String),
    Closed,
    CloseFailed(String),
    /// A request arrived in a state with no transition for it.
    InvalidRequest { state: String, request: String },
}

impl<K> TrackerEvent<K> {
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            Self::OpenFailed(_)
                | Self::ToolAttachFailed { .. }
                | Self::ToolDetachFailed { .. }
                | Self::TrackingStartFailed(_)
                | Self::UpdateFailed(_)
                | Self::TrackingStopFailed(_)
                | Self::ResetFailed(_)
                | Self::CloseFailed(_)
                | Self::InvalidRequest { .. }
        )
    }
}
