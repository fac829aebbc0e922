use crate::config::ElevatorConfig;
use crate::dispatcher::Dispatcher;
use crate::elevator::ElevatorHandle;
use crate::shared::{Direction, PlanViolation};
use crossbeam_channel as cbc;
use log::{debug, error, info};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, PartialEq)]
pub(crate) enum Event {
    FloorReached(u8),
    Parked,
}

/**
 * Runs one elevator.
 *
 * The `ElevatorFSM` (Finite State Machine) drains its elevator's stop plan one floor at a time,
 * pausing at every floor, and publishes each direction change to the dispatcher while still
 * holding the registry lock, so the eligibility index never disagrees with the elevator. When
 * there is nothing left to do it parks until the dispatcher wakes it.
 *
 * # Fields
 * - `elevator`:        The elevator this worker moves. No other thread writes its floor or direction.
 * - `dispatcher`:      Owner of the registry lock, the stop plan and the eligibility index.
 * - `wake_rx`:         Signalled when the dispatcher changes this elevator's plan or operating flag.
 * - `terminate_rx`:    Disconnected when the dispatcher shuts down.
 * - `stop_time`:       Pause at each floor stop.
 */
pub struct ElevatorFSM {
    elevator: ElevatorHandle,
    dispatcher: Arc<Dispatcher>,
    wake_rx: cbc::Receiver<()>,
    terminate_rx: cbc::Receiver<()>,
    stop_time: Duration,
}

impl ElevatorFSM {
    pub fn new(
        config: &ElevatorConfig,
        elevator: ElevatorHandle,
        dispatcher: Arc<Dispatcher>,
        wake_rx: cbc::Receiver<()>,
        terminate_rx: cbc::Receiver<()>,
    ) -> ElevatorFSM {
        ElevatorFSM {
            elevator,
            dispatcher,
            wake_rx,
            terminate_rx,
            stop_time: config.stop_duration(),
        }
    }

    pub fn id(&self) -> usize {
        self.elevator.id()
    }

    pub fn run(self) {
        debug!("Elevator {} worker started", self.id());

        // Main loop
        loop {
            let event = match self.step() {
                Ok(event) => event,
                Err(violation) => self.abort(violation),
            };

            let keep_running = match event {
                Event::FloorReached(_) => self.pause(),
                Event::Parked => self.park(),
            };
            if !keep_running {
                break;
            }
        }

        debug!("Elevator {} worker terminated", self.id());
    }

    /// Makes one move under the registry lock: a floor stop, a status change, or nothing.
    pub(crate) fn step(&self) -> Result<Event, PlanViolation> {
        // Wakes that arrived while moving are answered by this step
        while self.wake_rx.try_recv().is_ok() {}

        let elevator = &self.elevator;
        let mut registry = self.dispatcher.registry();

        let deactivated = elevator.take_deactivated();
        if !elevator.is_operating() {
            if elevator.direction() != Direction::Offline {
                elevator.set_current_floor(0);
                elevator.set_direction(Direction::Offline);
                registry.plan_mut(elevator.id()).clear();
                registry.publish_direction(elevator);
                info!("Elevator {} is offline at floor 0", elevator.id());
            }
            return Ok(Event::Parked);
        }

        // Also taken when the elevator went offline and back before this worker noticed
        if deactivated || elevator.direction() == Direction::Offline {
            elevator.set_current_floor(0);
            elevator.set_direction(Direction::Idle);
            registry.publish_direction(elevator);
            info!("Elevator {} is back in service at floor 0", elevator.id());
        }

        match registry.plan_mut(elevator.id()).next_stop(elevator.current_floor())? {
            Some((direction, floor)) => {
                if direction != elevator.direction() {
                    elevator.set_direction(direction);
                    registry.publish_direction(elevator);
                }
                elevator.set_current_floor(floor);
                debug!(
                    "Elevator {} | Current floor {} | Direction {}",
                    elevator.id(),
                    floor,
                    direction
                );
                Ok(Event::FloorReached(floor))
            }
            None => {
                if elevator.direction() != Direction::Idle {
                    elevator.set_direction(Direction::Idle);
                    registry.publish_direction(elevator);
                    debug!(
                        "Elevator {} is idle at floor {}",
                        elevator.id(),
                        elevator.current_floor()
                    );
                }
                Ok(Event::Parked)
            }
        }
    }

    // Stop at the floor just reached. False once the dispatcher shuts down.
    fn pause(&self) -> bool {
        matches!(
            self.terminate_rx.recv_timeout(self.stop_time),
            Err(cbc::RecvTimeoutError::Timeout)
        )
    }

    // Sleep until the dispatcher hands over work. False once the dispatcher shuts down.
    fn park(&self) -> bool {
        cbc::select! {
            recv(self.wake_rx) -> wake => wake.is_ok(),
            recv(self.terminate_rx) -> _ => false,
        }
    }

    fn abort(&self, violation: PlanViolation) -> ! {
        {
            let mut registry = self.dispatcher.registry();
            registry.plan_mut(self.id()).clear();
            self.elevator.set_halted();
            self.elevator.set_operating(false);
            self.elevator.set_direction(Direction::Offline);
            registry.publish_direction(&self.elevator);
        }

        error!("Elevator {} stopped: {}", self.id(), violation);
        panic!("elevator {} stopped: {}", self.id(), violation);
    }
}
