//! Simulated Tracker
//!
//! Drives a `Tracker` against a driver that invents a probe moving in a
//! circle, with a reference marker that drops out now and then.
//!
//! Key concepts:
//! - Driver moved onto a communication thread while tracking
//! - Status updates copying the double buffer into tool records
//! - Events published for every outcome
//! - Audit, graph export and snapshot of the tracker's machine
//!
//! Run with: RUST_LOG=debug cargo run --example simulated_tracker

use statebridge::audit::audit;
use statebridge::device::{DataSource, DeviceFault, OPTICAL_TRACKER_ERRORS};
use statebridge::export::to_dot;
use statebridge::tracker::{Tracker, TrackerConfig, TrackerDriver, TrackerEvent, Transform};
use std::f64::consts::TAU;
use std::time::Duration;

struct CircleDriver {
    tick: u32,
}

impl DataSource for CircleDriver {
    type Key = &'static str;
    type Payload = Transform;

    fn acquire(&mut self) -> Result<Vec<(&'static str, Transform)>, DeviceFault> {
        self.tick += 1;
        if self.tick % 97 == 0 {
            return Err(DeviceFault::from_code(&OPTICAL_TRACKER_ERRORS, 55));
        }

        let angle = f64::from(self.tick % 360) / 360.0 * TAU;
        let mut frame = vec![(
            "probe",
            Transform::new([100.0 * angle.cos(), 100.0 * angle.sin(), 0.0], [0.0, 0.0, 0.0, 1.0]),
        )];
        if self.tick % 50 < 40 {
            frame.push(("reference", Transform::identity()));
        }
        Ok(frame)
    }
}

impl TrackerDriver for CircleDriver {
    fn open(&mut self) -> Result<(), DeviceFault> {
        Ok(())
    }

    fn start_tracking(&mut self) -> Result<(), DeviceFault> {
        self.tick = 0;
        Ok(())
    }

    fn stop_tracking(&mut self) -> Result<(), DeviceFault> {
        Ok(())
    }

    fn close(&mut self) -> Result<(), DeviceFault> {
        Ok(())
    }
}

fn print_events(tracker: &Tracker<CircleDriver>) {
    for event in tracker.drain_events() {
        match event {
            TrackerEvent::ToolVisible(_) | TrackerEvent::ToolNotAvailable(_) => {}
            event if event.is_failure() => println!("  [event] FAILED {:?}", event),
            event => println!("  [event] {:?}", event),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    println!("=== Simulated Tracker Example ===\n");

    let config = TrackerConfig::from_json(
        r#"{ "name": "optical", "poll_interval_ms": 2, "validity_ms": 20 }"#,
    )?;
    let mut tracker = Tracker::new(CircleDriver { tick: 0 }, config)?;

    tracker.request_open()?;
    tracker.request_attach_tool("probe")?;
    tracker.request_attach_tool("reference")?;
    tracker.request_start_tracking()?;
    print_events(&tracker);

    for _ in 0..10 {
        std::thread::sleep(Duration::from_millis(25));
        tracker.request_update_status()?;
        print_events(&tracker);

        let now = chrono::Utc::now();
        for tool in tracker.tools() {
            match tool.transform() {
                Some(stamped) if tool.is_visible() => println!(
                    "  {:<10} at [{:7.2}, {:7.2}, {:7.2}]{}",
                    tool.id(),
                    stamped.value.translation[0],
                    stamped.value.translation[1],
                    stamped.value.translation[2],
                    if stamped.is_valid_at(now) { "" } else { " (stale)" }
                ),
                _ => println!("  {:<10} not available", tool.id()),
            }
        }
    }

    tracker.request_stop_tracking()?;
    print_events(&tracker);

    println!("\nAudit: {}", if audit(tracker.machine()).is_success() { "clean" } else { "findings" });
    println!("\nSnapshot:\n{}", tracker.machine().snapshot().to_json()?);
    println!("\nTransition graph:\n{}", to_dot(tracker.machine(), true));

    tracker.request_close()?;
    print_events(&tracker);

    println!("=== Example Complete ===");
    Ok(())
}
