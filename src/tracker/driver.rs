//! Hardware collaborator of a tracker.

use super::types::Transform;
use crate::device::{DataSource, DeviceFault};

/// A tracking device.
///
/// The tracker calls these from its own thread while no communication
/// thread is running. While tracking, the driver is moved onto the
/// communication thread and only [`DataSource::acquire`] is called.
pub trait TrackerDriver: DataSource<Payload = Transform> {
    /// Open the connection to the device.
    fn open(&mut self) -> Result<(), DeviceFault>;

    /// Check that `tool` can be tracked by this device.
    fn verify_tool(&mut self, _tool: &Self::Key) -> Result<(), DeviceFault> {
        Ok(())
    }

    fn start_tracking(&mut self) -> Result<(), DeviceFault>;

    fn stop_tracking(&mut self) -> Result<(), DeviceFault>;

    fn reset(&mut self) -> Result<(), DeviceFault> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), DeviceFault>;
}
