//! Background device I/O feeding a [`StatusBuffer`].

use super::buffer::StatusBuffer;
use super::clock::Clock;
use super::fault::DeviceFault;
use super::stamp::{Stamped, TimeStamp};
use crossbeam_channel::{Sender, TrySendError};
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Hardware-facing side of a device.
///
/// `acquire` is called from the communication thread only, so it may block
/// on I/O. It returns one frame: every key the device currently sees,
/// paired with its payload.
pub trait DataSource: Send + 'static {
    type Key: Clone + Eq + Hash + Debug + Send + 'static;
    type Payload: Clone + Send + 'static;

    fn acquire(&mut self) -> Result<Vec<(Self::Key, Self::Payload)>, DeviceFault>;
}

/// Settings for one communication thread.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CommunicationConfig {
    /// OS thread name.
    pub thread_name: String,
    /// Pause between acquisitions.
    pub poll_interval_ms: u64,
    /// How long each payload stays valid after it is stamped.
    pub validity_ms: u64,
}

impl Default for CommunicationConfig {
    fn default() -> Self {
        Self {
            thread_name: "device-io".to_string(),
            poll_interval_ms: 10,
            validity_ms: 100,
        }
    }
}

impl CommunicationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn validity(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(i64::try_from(self.validity_ms).unwrap_or(i64::MAX))
    }
}

/// Handle to a running communication thread.
///
/// The thread owns the [`DataSource`] while it runs and never touches the
/// state machine: it writes frames into the buffer and sends failures over
/// `faults`, leaving the buffer as it was. Stopping hands the source back.
pub struct CommunicationThread<D: DataSource> {
    stop_flag: Arc<AtomicBool>,
    thread: Option<JoinHandle<D>>,
}

impl<D: DataSource> CommunicationThread<D> {
    /// Start polling `source`.
    ///
    /// If the OS refuses to create the thread the source is dropped with it.
    pub fn spawn(
        source: D,
        buffer: StatusBuffer<D::Key, D::Payload>,
        clock: Arc<dyn Clock>,
        config: &CommunicationConfig,
        faults: Sender<DeviceFault>,
    ) -> Result<Self, DeviceFault> {
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop_clone = stop_flag.clone();
        let poll_interval = config.poll_interval();
        let validity = config.validity();

        let thread = std::thread::Builder::new()
            .name(config.thread_name.clone())
            .spawn(move || {
                communication_loop(
                    source,
                    buffer,
                    clock,
                    faults,
                    stop_clone,
                    poll_interval,
                    validity,
                )
            })
            .map_err(|e| DeviceFault::ThreadSpawn(e.to_string()))?;

        Ok(Self {
            stop_flag,
            thread: Some(thread),
        })
    }

    /// Whether the thread is still polling. False once it was told to stop,
    /// and also once it has exited on its own or panicked.
    pub fn is_active(&self) -> bool {
        !self.stop_flag.load(Ordering::Relaxed)
            && self.thread.as_ref().map_or(false, |t| !t.is_finished())
    }

    /// Stop the thread, wait for it and take the source back.
    pub fn stop(mut self) -> Result<D, DeviceFault> {
        self.shutdown().unwrap_or(Err(DeviceFault::ThreadPanicked))
    }

    fn shutdown(&mut self) -> Option<Result<D, DeviceFault>> {
        self.stop_flag.store(true, Ordering::Relaxed);
        let thread = self.thread.take()?;
        Some(thread.join().map_err(|_| DeviceFault::ThreadPanicked))
    }
}

impl<D: DataSource> Drop for CommunicationThread<D> {
    fn drop(&mut self) {
        if let Some(Err(err)) = self.shutdown() {
            log::error!("communication thread ended badly: {}", err);
        }
    }
}

fn communication_loop<D: DataSource>(
    mut source: D,
    buffer: StatusBuffer<D::Key, D::Payload>,
    clock: Arc<dyn Clock>,
    faults: Sender<DeviceFault>,
    stop_flag: Arc<AtomicBool>,
    poll_interval: Duration,
    validity: chrono::Duration,
) -> D {
    log::info!("communication thread started");

    loop {
        if stop_flag.load(Ordering::Relaxed) {
            log::info!("communication thread stopping (stop flag set)");
            break;
        }

        match source.acquire() {
            Ok(frame) => {
                let stamp = TimeStamp::new(clock.now(), validity);
                let frame = frame
                    .into_iter()
                    .map(|(key, payload)| (key, Stamped::new(payload, stamp)))
                    .collect();
                buffer.write_frame(frame);
            }
            Err(fault) => {
                log::warn!("device acquisition failed: {}", fault);
                if let Err(e) = faults.try_send(fault) {
                    match e {
                        TrySendError::Full(_) => {
                            log::trace!("fault channel full, dropping fault");
                        }
                        TrySendError::Disconnected(_) => {
                            log::info!("fault channel disconnected, stopping");
                            break;
                        }
                    }
                }
            }
        }

        std::thread::sleep(poll_interval);
    }

    source
}
