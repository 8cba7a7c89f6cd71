//! Coin Machine
//!
//! An owner that composes a state machine instead of inheriting one.
//!
//! Key concepts:
//! - Registering states, inputs and transitions at construction
//! - Request methods that push inputs and drain the queue
//! - Actions cascading follow-up inputs in the same call
//! - Invalid requests reported, not fatal
//!
//! Run with: cargo run --example coin_machine

use statebridge::export::to_dot;
use statebridge::{symbol_enum, Action, MachineError, StateMachine};

symbol_enum! {
    enum Credit {
        Idle,
        OneQuarter,
        TwoQuarters,
        Vending,
    }
}

symbol_enum! {
    enum Coin {
        QuarterInserted,
        Refund,
        Dispensed,
    }
}

/// What the actions operate on.
#[derive(Default)]
struct Hopper {
    credit: u32,
    sodas: u32,
}

struct SodaMachine {
    machine: StateMachine<Hopper, Credit, Coin>,
    hopper: Hopper,
}

impl SodaMachine {
    fn new() -> Result<Self, MachineError> {
        let mut machine = StateMachine::new("soda");
        for state in Credit::ALL {
            machine.add_state(*state, state.name())?;
        }
        for input in Coin::ALL {
            machine.add_input(*input, input.name())?;
        }

        let take_quarter = || Action::new(|hopper: &mut Hopper, _| hopper.credit += 1);
        machine.add_transition(
            Credit::Idle,
            Coin::QuarterInserted,
            Credit::OneQuarter,
            take_quarter(),
        )?;
        machine.add_transition(
            Credit::OneQuarter,
            Coin::QuarterInserted,
            Credit::TwoQuarters,
            take_quarter(),
        )?;
        // The second quarter pays for a soda; dispensing reports back by
        // cascading `Dispensed`.
        machine.add_transition(
            Credit::TwoQuarters,
            Coin::QuarterInserted,
            Credit::Vending,
            Action::new(|hopper: &mut Hopper, cascade| {
                hopper.credit = 0;
                hopper.sodas += 1;
                println!("  [action] dispensing soda #{}", hopper.sodas);
                cascade.push_input(Coin::Dispensed);
            }),
        )?;
        machine.add_transition(Credit::Vending, Coin::Dispensed, Credit::Idle, Action::none())?;
        for state in [Credit::OneQuarter, Credit::TwoQuarters] {
            machine.add_transition(
                state,
                Coin::Refund,
                Credit::Idle,
                Action::new(|hopper: &mut Hopper, _| {
                    println!("  [action] refunding {} quarter(s)", hopper.credit);
                    hopper.credit = 0;
                }),
            )?;
        }

        machine.select_initial_state(Credit::Idle)?;
        machine.set_ready_to_run()?;
        Ok(Self {
            machine,
            hopper: Hopper::default(),
        })
    }

    fn request(&mut self, coin: Coin) -> Result<(), MachineError> {
        println!("request {}", coin.name());
        self.machine.push_input(coin)?;
        let report = self.machine.process_inputs(&mut self.hopper)?;
        for err in &report.errors {
            println!("  [rejected] {}", err);
        }
        println!(
            "  -> {} ({} transition(s))",
            self.machine.current_state_name().unwrap_or("?"),
            report.applied
        );
        Ok(())
    }
}

fn main() -> Result<(), MachineError> {
    env_logger::init();
    println!("=== Coin Machine Example ===\n");

    let mut soda = SodaMachine::new()?;

    soda.request(Coin::QuarterInserted)?;
    soda.request(Coin::QuarterInserted)?;
    soda.request(Coin::QuarterInserted)?;
    soda.request(Coin::Refund)?;
    soda.request(Coin::QuarterInserted)?;
    soda.request(Coin::Refund)?;

    println!("\nSodas sold: {}", soda.hopper.sodas);
    println!("Path: {:?}", soda.machine.history().path());

    println!("\nTransition graph:\n{}", to_dot(&soda.machine, false));

    println!("=== Example Complete ===");
    Ok(())
}
