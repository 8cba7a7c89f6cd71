//! The tracker owner and its transition table.

use super::config::TrackerConfig;
use super::driver::TrackerDriver;
use super::types::{TrackedTool, TrackerEvent, TrackerInput, TrackerState, Transform};
use crate::core::{Action, Cascade, MachineError};
use crate::device::{Clock, CommunicationThread, DeviceFault, Reading, StatusBuffer, SystemClock};
use crate::machine::{ProcessReport, StateMachine};
use crossbeam_channel::{Receiver, Sender, TrySendError};
use std::collections::HashMap;
use std::sync::Arc;

/// The engine a [`Tracker`] composes.
pub type TrackerMachine<D> = StateMachine<TrackerCore<D>, TrackerState, TrackerInput>;

/// A tracking device governed by one state machine.
///
/// Requests push an input and drain the machine at once. Attempts talk to
/// the driver and report their outcome by cascading `Success` or `Failure`,
/// so every request returns with the tracker settled in a stable state.
///
/// While tracking, the driver lives on a [`CommunicationThread`] that fills
/// a [`StatusBuffer`]; `request_update_status` copies the buffer into the
/// tool records. Outcomes are published as [`TrackerEvent`]s.
pub struct Tracker<D: TrackerDriver> {
    machine: TrackerMachine<D>,
    core: TrackerCore<D>,
    events: Receiver<TrackerEvent<D::Key>>,
}

/// The part of a [`Tracker`] its actions operate on.
pub struct TrackerCore<D: TrackerDriver> {
    driver: Option<D>,
    thread: Option<CommunicationThread<D>>,
    buffer: StatusBuffer<D::Key, Transform>,
    tools: HashMap<D::Key, TrackedTool<D::Key>>,
    pending_tool: Option<D::Key>,
    last_fault: Option<DeviceFault>,
    clock: Arc<dyn Clock>,
    config: TrackerConfig,
    fault_tx: Sender<DeviceFault>,
    fault_rx: Receiver<DeviceFault>,
    event_tx: Sender<TrackerEvent<D::Key>>,
}

impl<D: TrackerDriver> Tracker<D> {
    pub fn new(driver: D, config: TrackerConfig) -> Result<Self, MachineError> {
        Self::with_clock(driver, config, Arc::new(SystemClock))
    }

    /// Build a tracker stamping transforms with `clock`.
    pub fn with_clock(
        driver: D,
        config: TrackerConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, MachineError> {
        let (fault_tx, fault_rx) = crossbeam_channel::bounded(config.fault_queue_capacity.max(1));
        let (event_tx, events) = crossbeam_channel::bounded(config.event_queue_capacity.max(1));
        let machine = build_machine(&config)?;

        Ok(Self {
            machine,
            core: TrackerCore {
                driver: Some(driver),
                thread: None,
                buffer: StatusBuffer::new(),
                tools: HashMap::new(),
                pending_tool: None,
                last_fault: None,
                clock,
                config,
                fault_tx,
                fault_rx,
                event_tx,
            },
            events,
        })
    }

    pub fn request_open(&mut self) -> Result<ProcessReport, MachineError> {
        self.request(TrackerInput::EstablishCommunication)
    }

    pub fn request_attach_tool(&mut self, tool: D::Key) -> Result<ProcessReport, MachineError> {
        self.core.pending_tool = Some(tool);
        self.request(TrackerInput::AttachTool)
    }

    pub fn request_detach_tool(&mut self, tool: D::Key) -> Result<ProcessReport, MachineError> {
        self.core.pending_tool = Some(tool);
        self.request(TrackerInput::DetachTool)
    }

    pub fn request_start_tracking(&mut self) -> Result<ProcessReport, MachineError> {
        self.request(TrackerInput::StartTracking)
    }

    /// Copy the latest buffered transforms into the tool records.
    pub fn request_update_status(&mut self) -> Result<ProcessReport, MachineError> {
        self.request(TrackerInput::UpdateStatus)
    }

    pub fn request_stop_tracking(&mut self) -> Result<ProcessReport, MachineError> {
        self.request(TrackerInput::StopTracking)
    }

    pub fn request_reset(&mut self) -> Result<ProcessReport, MachineError> {
        self.request(TrackerInput::Reset)
    }

    pub fn request_close(&mut self) -> Result<ProcessReport, MachineError> {
        self.request(TrackerInput::CloseCommunication)
    }

    fn request(&mut self, input: TrackerInput) -> Result<ProcessReport, MachineError> {
        let result = self.drive(input);
        self.core.pending_tool = None;
        result
    }

    fn drive(&mut self, input: TrackerInput) -> Result<ProcessReport, MachineError> {
        self.machine.push_input(input)?;
        let report = self.machine.process_inputs(&mut self.core)?;
        for err in &report.errors {
            if let MachineError::UndefinedTransition { state, input } = err {
                self.core.publish(TrackerEvent::InvalidRequest {
                    state: state.clone(),
                    request: input.clone(),
                });
            }
        }
        Ok(report)
    }

    pub fn state(&self) -> Option<TrackerState> {
        self.machine.current_state().copied()
    }

    pub fn state_name(&self) -> Option<&str> {
        self.machine.current_state_name()
    }

    /// Whether a communication thread is currently running.
    pub fn is_tracking(&self) -> bool {
        self.core.thread.is_some()
    }

    pub fn tool(&self, id: &D::Key) -> Option<&TrackedTool<D::Key>> {
        self.core.tools.get(id)
    }

    pub fn tools(&self) -> impl Iterator<Item = &TrackedTool<D::Key>> + '_ {
        self.core.tools.values()
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.core.config
    }

    /// The driver, when it is not on the communication thread.
    pub fn driver(&self) -> Option<&D> {
        self.core.driver.as_ref()
    }

    pub fn machine(&self) -> &TrackerMachine<D> {
        &self.machine
    }

    pub fn events(&self) -> &Receiver<TrackerEvent<D::Key>> {
        &self.events
    }

    /// Take every event published so far.
    pub fn drain_events(&self) -> Vec<TrackerEvent<D::Key>> {
        self.events.try_iter().collect()
    }
}

fn build_machine<D: TrackerDriver>(
    config: &TrackerConfig,
) -> Result<TrackerMachine<D>, MachineError> {
    use TrackerInput as In;
    use TrackerState as St;

    let mut machine = StateMachine::with_config(config.name.clone(), config.machine);
    for state in St::ALL {
        machine.add_state(*state, state.name())?;
    }
    for input in In::ALL {
        machine.add_input(*input, input.name())?;
    }

    let transitions: Vec<(St, In, St, Action<TrackerCore<D>, In>)> = vec![
        // Communication
        (
            St::Idle,
            In::EstablishCommunication,
            St::AttemptingToEstablishCommunication,
            Action::new(TrackerCore::attempt_open),
        ),
        (
            St::AttemptingToEstablishCommunication,
            In::Success,
            St::CommunicationEstablished,
            Action::new(TrackerCore::report_opened),
        ),
        (
            St::AttemptingToEstablishCommunication,
            In::Failure,
            St::Idle,
            Action::new(TrackerCore::report_open_failed),
        ),
        // Tools
        (
            St::CommunicationEstablished,
            In::AttachTool,
            St::AttemptingToAttachTool,
            Action::new(TrackerCore::attempt_attach),
        ),
        (
            St::ToolAttached,
            In::AttachTool,
            St::AttemptingToAttachTool,
            Action::new(TrackerCore::attempt_attach),
        ),
        (
            St::AttemptingToAttachTool,
            In::Success,
            St::ToolAttached,
            Action::new(TrackerCore::report_tool_attached),
        ),
        (
            St::AttemptingToAttachTool,
            In::Failure,
            St::CommunicationEstablished,
            Action::new(TrackerCore::report_attach_failed),
        ),
        (
            St::ToolAttached,
            In::DetachTool,
            St::ToolAttached,
            Action::new(TrackerCore::detach_attached_tool),
        ),
        (
            St::ToolAttached,
            In::NoTools,
            St::CommunicationEstablished,
            Action::none(),
        ),
        (
            St::CommunicationEstablished,
            In::ToolsPresent,
            St::ToolAttached,
            Action::none(),
        ),
        (
            St::Tracking,
            In::DetachTool,
            St::Tracking,
            Action::new(TrackerCore::detach_tool),
        ),
        // Tracking
        (
            St::CommunicationEstablished,
            In::StartTracking,
            St::AttemptingToTrack,
            Action::new(TrackerCore::attempt_start),
        ),
        (
            St::ToolAttached,
            In::StartTracking,
            St::AttemptingToTrack,
            Action::new(TrackerCore::attempt_start),
        ),
        (
            St::AttemptingToTrack,
            In::Success,
            St::Tracking,
            Action::new(TrackerCore::report_tracking_started),
        ),
        (
            St::AttemptingToTrack,
            In::Failure,
            St::CommunicationEstablished,
            Action::new(TrackerCore::report_start_failed),
        ),
        (
            St::Tracking,
            In::UpdateStatus,
            St::AttemptingToUpdate,
            Action::new(TrackerCore::update_status),
        ),
        (St::AttemptingToUpdate, In::Success, St::Tracking, Action::none()),
        (
            St::AttemptingToUpdate,
            In::Failure,
            St::Tracking,
            Action::new(TrackerCore::report_update_failed),
        ),
        (
            St::Tracking,
            In::StopTracking,
            St::AttemptingToStopTracking,
            Action::new(TrackerCore::attempt_stop),
        ),
        (
            St::AttemptingToStopTracking,
            In::Success,
            St::CommunicationEstablished,
            Action::new(TrackerCore::report_tracking_stopped),
        ),
        (
            St::AttemptingToStopTracking,
            In::Failure,
            St::Tracking,
            Action::new(TrackerCore::report_stop_failed),
        ),
        // Reset
        (
            St::CommunicationEstablished,
            In::Reset,
            St::AttemptingToReset,
            Action::new(TrackerCore::attempt_reset),
        ),
        (
            St::ToolAttached,
            In::Reset,
            St::AttemptingToReset,
            Action::new(TrackerCore::attempt_reset),
        ),
        (
            St::Tracking,
            In::Reset,
            St::AttemptingToReset,
            Action::new(TrackerCore::attempt_reset),
        ),
        (
            St::AttemptingToReset,
            In::Success,
            St::CommunicationEstablished,
            Action::new(TrackerCore::report_reset),
        ),
        (
            St::AttemptingToReset,
            In::Failure,
            St::CommunicationEstablished,
            Action::new(TrackerCore::report_reset_failed),
        ),
        // Close
        (
            St::CommunicationEstablished,
            In::CloseCommunication,
            St::AttemptingToCloseCommunication,
            Action::new(TrackerCore::attempt_close),
        ),
        (
            St::ToolAttached,
            In::CloseCommunication,
            St::AttemptingToCloseCommunication,
            Action::new(TrackerCore::attempt_close),
        ),
        (
            St::AttemptingToCloseCommunication,
            In::Success,
            St::Idle,
            Action::new(TrackerCore::report_closed),
        ),
        (
            St::AttemptingToCloseCommunication,
            In::Failure,
            St::CommunicationEstablished,
            Action::new(TrackerCore::report_close_failed),
        ),
    ];
    for (from, input, to, action) in transitions {
        machine.add_transition(from, input, to, action)?;
    }

    machine.select_initial_state(St::Idle)?;
    machine.set_ready_to_run()?;
    Ok(machine)
}

impl<D: TrackerDriver> TrackerCore<D> {
    fn attempt_open(&mut self, cascade: &mut Cascade<TrackerInput>) {
        let result = self.with_driver(|driver| driver.open());
        self.settle(result, cascade);
    }

    fn report_opened(&mut self, _: &mut Cascade<TrackerInput>) {
        self.publish(TrackerEvent::Opened);
    }

    fn report_open_failed(&mut self, _: &mut Cascade<TrackerInput>) {
        let reason = self.failure_reason();
        self.publish(TrackerEvent::OpenFailed(reason));
    }

    fn attempt_attach(&mut self, cascade: &mut Cascade<TrackerInput>) {
        let result = match self.pending_tool.clone() {
            None => Err(DeviceFault::ToolRejected("no tool given".to_string())),
            Some(tool) if self.tools.contains_key(&tool) => Err(DeviceFault::ToolRejected(
                format!("{:?} is already attached", tool),
            )),
            Some(tool) => self.with_driver(|driver| driver.verify_tool(&tool)),
        };
        self.settle(result, cascade);
    }

    fn report_tool_attached(&mut self, _: &mut Cascade<TrackerInput>) {
        if let Some(tool) = self.pending_tool.take() {
            self.buffer.register(tool.clone());
            self.tools.insert(tool.clone(), TrackedTool::new(tool.clone()));
            self.publish(TrackerEvent::ToolAttached(tool));
        }
    }

    fn report_attach_failed(&mut self, cascade: &mut Cascade<TrackerInput>) {
        let reason = self.failure_reason();
        let tool = self.pending_tool.take();
        self.publish(TrackerEvent::ToolAttachFailed { tool, reason });
        self.resume_tools(cascade);
    }

    fn detach_tool(&mut self, _: &mut Cascade<TrackerInput>) {
        match self.pending_tool.take() {
            Some(tool) if self.tools.remove(&tool).is_some() => {
                self.buffer.remove(&tool);
                self.publish(TrackerEvent::ToolDetached(tool));
            }
            tool => {
                log::warn!("{}: cannot detach {:?}, not attached", self.config.name, tool);
                self.publish(TrackerEvent::ToolDetachFailed {
                    tool,
                    reason: "tool is not attached".to_string(),
                });
            }
        }
    }

    /// Detach while tools are the reason for being in `ToolAttached`.
    fn detach_attached_tool(&mut self, cascade: &mut Cascade<TrackerInput>) {
        self.detach_tool(cascade);
        if self.tools.is_empty() {
            cascade.push_input(TrackerInput::NoTools);
        }
    }

    fn attempt_start(&mut self, cascade: &mut Cascade<TrackerInput>) {
        let result = self.start_communication();
        self.settle(result, cascade);
    }

    fn start_communication(&mut self) -> Result<(), DeviceFault> {
        let mut driver = self.driver.take().ok_or(DeviceFault::Unavailable)?;
        if let Err(fault) = driver.start_tracking() {
            self.driver = Some(driver);
            return Err(fault);
        }
        // Faults left over from an earlier session are stale.
        while self.fault_rx.try_recv().is_ok() {}
        self.spawn_thread(driver)
    }

    fn spawn_thread(&mut self, driver: D) -> Result<(), DeviceFault> {
        let thread = CommunicationThread::spawn(
            driver,
            self.buffer.clone(),
            Arc::clone(&self.clock),
            &self.config.communication(),
            self.fault_tx.clone(),
        )?;
        self.thread = Some(thread);
        Ok(())
    }

    fn report_tracking_started(&mut self, _: &mut Cascade<TrackerInput>) {
        self.publish(TrackerEvent::TrackingStarted);
    }

    fn report_start_failed(&mut self, cascade: &mut Cascade<TrackerInput>) {
        let reason = self.failure_reason();
        self.publish(TrackerEvent::TrackingStartFailed(reason));
        self.resume_tools(cascade);
    }

    /// Consumer side of the status buffer.
    fn update_status(&mut self, cascade: &mut Cascade<TrackerInput>) {
        let mut faults: Vec<DeviceFault> = self.fault_rx.try_iter().collect();
        if !self.thread.as_ref().map_or(false, |t| t.is_active()) {
            faults.push(DeviceFault::Unavailable);
        }

        let mut events = Vec::new();
        for (id, reading) in self.buffer.read_all() {
            let Some(tool) = self.tools.get_mut(&id) else {
                continue;
            };
            match reading {
                Reading::Visible(transform) => {
                    tool.report_visible(transform);
                    events.push(TrackerEvent::ToolVisible(id));
                }
                Reading::NotAvailable => {
                    log::debug!("{}: tool {:?} is not in view", self.config.name, id);
                    tool.report_not_available();
                    events.push(TrackerEvent::ToolNotAvailable(id));
                }
            }
        }
        for event in events {
            self.publish(event);
        }

        let result = match faults.pop() {
            Some(fault) => {
                for earlier in &faults {
                    log::debug!("{}: superseded fault: {}", self.config.name, earlier);
                }
                Err(fault)
            }
            None => Ok(()),
        };
        self.settle(result, cascade);
    }

    fn report_update_failed(&mut self, _: &mut Cascade<TrackerInput>) {
        let reason = self.failure_reason();
        self.publish(TrackerEvent::UpdateFailed(reason));
    }

    fn attempt_stop(&mut self, cascade: &mut Cascade<TrackerInput>) {
        let result = self.stop_communication();
        self.settle(result, cascade);
    }

    /// Join the thread and take the driver back. If the driver refuses to
    /// stop, tracking resumes on a fresh thread.
    fn stop_communication(&mut self) -> Result<(), DeviceFault> {
        let thread = self.thread.take().ok_or(DeviceFault::Unavailable)?;
        let mut driver = thread.stop()?;
        if let Err(fault) = driver.stop_tracking() {
            self.spawn_thread(driver)?;
            return Err(fault);
        }
        self.driver = Some(driver);
        self.mark_all_not_available();
        Ok(())
    }

    fn report_tracking_stopped(&mut self, cascade: &mut Cascade<TrackerInput>) {
        self.publish(TrackerEvent::TrackingStopped);
        self.resume_tools(cascade);
    }

    fn report_stop_failed(&mut self, _: &mut Cascade<TrackerInput>) {
        let reason = self.failure_reason();
        self.publish(TrackerEvent::TrackingStopFailed(reason));
    }

    fn attempt_reset(&mut self, cascade: &mut Cascade<TrackerInput>) {
        let result = self.reset_device();
        self.settle(result, cascade);
    }

    fn reset_device(&mut self) -> Result<(), DeviceFault> {
        if let Some(thread) = self.thread.take() {
            self.driver = Some(thread.stop()?);
        }
        self.mark_all_not_available();
        self.with_driver(|driver| driver.reset())
    }

    fn report_reset(&mut self, cascade: &mut Cascade<TrackerInput>) {
        self.publish(TrackerEvent::ResetDone);
        self.resume_tools(cascade);
    }

    fn report_reset_failed(&mut self, cascade: &mut Cascade<TrackerInput>) {
        let reason = self.failure_reason();
        self.publish(TrackerEvent::ResetFailed(reason));
        self.resume_tools(cascade);
    }

    fn attempt_close(&mut self, cascade: &mut Cascade<TrackerInput>) {
        let result = self.with_driver(|driver| driver.close());
        self.settle(result, cascade);
    }

    fn report_closed(&mut self, _: &mut Cascade<TrackerInput>) {
        for id in self.tools.keys() {
            self.buffer.remove(id);
        }
        self.tools.clear();
        self.publish(TrackerEvent::Closed);
    }

    fn report_close_failed(&mut self, cascade: &mut Cascade<TrackerInput>) {
        let reason = self.failure_reason();
        self.publish(TrackerEvent::CloseFailed(reason));
        self.resume_tools(cascade);
    }

    fn with_driver(
        &mut self,
        f: impl FnOnce(&mut D) -> Result<(), DeviceFault>,
    ) -> Result<(), DeviceFault> {
        match self.driver.as_mut() {
            Some(driver) => f(driver),
            None => Err(DeviceFault::Unavailable),
        }
    }

    /// Cascade the outcome of an attempt, keeping the fault for the
    /// failure transition to report.
    fn settle(&mut self, result: Result<(), DeviceFault>, cascade: &mut Cascade<TrackerInput>) {
        let succeeded = result.is_ok();
        if let Err(fault) = result {
            log::warn!("{}: {}", self.config.name, fault);
            self.last_fault = Some(fault);
        }
        cascade.push_input_boolean(succeeded, TrackerInput::Success, TrackerInput::Failure);
    }

    fn failure_reason(&mut self) -> String {
        self.last_fault
            .take()
            .map(|fault| fault.to_string())
            .unwrap_or_else(|| "unknown failure".to_string())
    }

    /// Called on landing in `CommunicationEstablished`, which means no tools.
    fn resume_tools(&self, cascade: &mut Cascade<TrackerInput>) {
        if !self.tools.is_empty() {
            cascade.push_input(TrackerInput::ToolsPresent);
        }
    }

    fn mark_all_not_available(&mut self) {
        self.buffer.clear_presence();
        for tool in self.tools.values_mut() {
            tool.report_not_available();
        }
    }

    fn publish(&self, event: TrackerEvent<D::Key>) {
        if let Err(e) = self.event_tx.try_send(event) {
            match e {
                TrySendError::Full(_) => {
                    log::trace!("{}: event queue full, dropping event", self.config.name);
                }
                TrySendError::Disconnected(_) => {
                    log::trace!("{}: no event listener", self.config.name);
                }
            }
        }
    }
}
