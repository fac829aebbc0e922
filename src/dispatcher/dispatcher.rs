/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use log::{debug, error, info, warn};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{Builder, JoinHandle};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::config::ElevatorConfig;
use crate::dispatcher::{EligibilityIndex, Request};
use crate::elevator::{Elevator, ElevatorFSM, ElevatorHandle, StopPlan};
use crate::shared::{DispatchError, ElevatorStatus};

/**
 * State shared between the dispatcher and every elevator worker.
 *
 * Everything in here is guarded by the dispatcher's single registry lock.
 *
 * # Fields
 * - `index`:   Which elevators can take an up or a down request.
 * - `plans`:   Stop plan of every elevator, indexed by elevator id.
 */
#[derive(Debug)]
pub(crate) struct Registry {
    pub(crate) index: EligibilityIndex,
    pub(crate) plans: Vec<StopPlan>,
}

impl Registry {
    pub(crate) fn publish_direction(&mut self, elevator: &ElevatorHandle) {
        self.index.publish(elevator);
        debug!(
            "Elevator {} published direction {}",
            elevator.id(),
            elevator.direction()
        );
    }

    pub(crate) fn plan_mut(&mut self, id: usize) -> &mut StopPlan {
        &mut self.plans[id]
    }
}

/**
 * Assigns requests to the elevator bank.
 *
 * The dispatcher owns the fixed pool of elevators and one worker thread per elevator. It keeps the
 * eligibility index in step with each elevator's direction and writes the floors an assignment
 * needs into the chosen elevator's stop plan, then wakes only that elevator.
 *
 * # Fields
 * - `config`:          Pool size, floor range and stop time.
 * - `elevators`:       Handles to every elevator, indexed by id.
 * - `registry`:        Eligibility index and stop plans behind the single registry lock.
 * - `terminate_tx`:    Dropped on shutdown, which disconnects every worker.
 * - `workers`:         Join handles of the running elevator workers.
 */
pub struct Dispatcher {
    config: ElevatorConfig,
    elevators: Vec<ElevatorHandle>,
    registry: Mutex<Registry>,
    terminate_tx: Mutex<Option<cbc::Sender<()>>>,
    workers: Mutex<Vec<JoinHandle<()>>>,
}

impl Dispatcher {
    /// Builds the elevator pool and starts one named worker thread per elevator.
    pub fn start(config: &ElevatorConfig) -> std::io::Result<Arc<Dispatcher>> {
        let (dispatcher, fsms) = Dispatcher::build(config);

        for fsm in fsms {
            let thread = Builder::new().name(format!("elevator_{}", fsm.id()));
            match thread.spawn(move || fsm.run()) {
                Ok(handle) => lock(&dispatcher.workers).push(handle),
                Err(e) => {
                    dispatcher.shutdown();
                    return Err(e);
                }
            }
        }

        info!(
            "Dispatcher started with {} elevators serving floors 0 to {}",
            config.n_elevators,
            config.n_floors.saturating_sub(1)
        );
        Ok(dispatcher)
    }

    /// Builds the pool without starting the workers; the caller decides how to run them.
    pub(crate) fn build(config: &ElevatorConfig) -> (Arc<Dispatcher>, Vec<ElevatorFSM>) {
        let (terminate_tx, terminate_rx) = cbc::unbounded::<()>();

        let mut elevators = Vec::with_capacity(config.n_elevators);
        let mut wake_rxs = Vec::with_capacity(config.n_elevators);
        let mut index = EligibilityIndex::new();
        for id in 0..config.n_elevators {
            let (wake_tx, wake_rx) = cbc::unbounded::<()>();
            let elevator = Arc::new(Elevator::new(id, wake_tx));

            // Fresh elevators are idle and ready to serve either direction
            index.publish(&elevator);
            elevators.push(elevator);
            wake_rxs.push(wake_rx);
        }

        let dispatcher = Arc::new(Dispatcher {
            config: config.clone(),
            elevators: elevators.clone(),
            registry: Mutex::new(Registry {
                index,
                plans: vec![StopPlan::new(); config.n_elevators],
            }),
            terminate_tx: Mutex::new(Some(terminate_tx)),
            workers: Mutex::new(Vec::new()),
        });

        let fsms = elevators
            .into_iter()
            .zip(wake_rxs)
            .map(|(elevator, wake_rx)| {
                ElevatorFSM::new(
                    config,
                    elevator,
                    dispatcher.clone(),
                    wake_rx,
                    terminate_rx.clone(),
                )
            })
            .collect();

        (dispatcher, fsms)
    }

    pub fn submit_request(
        &self,
        origin: u8,
        destination: u8,
    ) -> Result<Option<ElevatorHandle>, DispatchError> {
        Request::new(origin, destination).submit(self)
    }

    /**
     * Chooses an elevator for `request` and records the floors it has to visit.
     *
     * The request is checked against the floor range first and a request whose origin equals its
     * destination returns `Ok(None)` without touching any elevator. Otherwise the nearest eligible
     * elevator is picked (see `EligibilityIndex::select`) and two intervals are written into its
     * stop plan: the approach from the elevator to `origin` and the requested trip from `origin`
     * to `destination`.
     *
     * Both intervals are appended after whatever the elevator has queued, with the approach
     * starting where that queue ends. The legs already planned are never widened, so the elevator
     * always finishes at the destination of the last request it was given.
     *
     * Selection and recording happen under one lock acquisition, so a request is either fully
     * recorded or not at all.
     */
    pub fn select_elevator(&self, request: &Request) -> Result<Option<ElevatorHandle>, DispatchError> {
        for floor in [request.origin, request.destination] {
            if !self.config.is_valid_floor(floor) {
                warn!("Rejected request {:?}: floor {} is out of range", request, floor);
                return Err(DispatchError::InvalidFloor(floor));
            }
        }

        let Some(requested) = request.direction() else {
            debug!("Request {:?} starts and ends on the same floor", request);
            return Ok(None);
        };

        let mut registry = self.registry();
        let elevator = match registry.index.select(requested, request.origin) {
            Ok(elevator) => elevator,
            Err(e) => {
                warn!("Rejected request {:?}: {}", request, e);
                return Err(e);
            }
        };

        let current = elevator.current_floor();
        let plan = registry.plan_mut(elevator.id());
        let tail = plan.tail_floor(current);
        plan.push_interval(tail, request.origin);
        plan.push_interval(request.origin, request.destination);
        drop(registry);

        elevator.wake();
        info!(
            "Request from floor {} to floor {} assigned to elevator {} at floor {}",
            request.origin,
            request.destination,
            elevator.id(),
            current
        );
        Ok(Some(elevator))
    }

    /// Re-indexes `elevator` from its current direction.
    pub fn publish_direction(&self, elevator: &ElevatorHandle) {
        self.registry().publish_direction(elevator);
    }

    pub fn elevator(&self, id: usize) -> Result<ElevatorHandle, DispatchError> {
        self.elevators
            .get(id)
            .cloned()
            .ok_or(DispatchError::UnknownElevator(id))
    }

    pub fn elevators(&self) -> &[ElevatorHandle] {
        &self.elevators
    }

    pub fn get_elevator_status(&self, id: usize) -> Result<ElevatorStatus, DispatchError> {
        self.elevator(id).map(|elevator| elevator.status())
    }

    pub fn statuses(&self) -> Vec<ElevatorStatus> {
        self.elevators.iter().map(|elevator| elevator.status()).collect()
    }

    /**
     * Takes an elevator out of service or puts it back.
     *
     * Going out of service clears the stop plan and removes the elevator from both eligibility
     * maps right away; its worker then parks it at floor 0 as `Offline`. Coming back, the worker
     * resets it to floor 0 as `Idle` and re-registers it. An elevator whose worker stopped on a
     * broken stop plan has no worker left and cannot come back.
     */
    pub fn set_elevator_operating(&self, id: usize, operating: bool) -> Result<(), DispatchError> {
        let elevator = self.elevator(id)?;

        {
            let mut registry = self.registry();
            if operating && elevator.is_halted() {
                warn!("Elevator {} cannot return to service, its worker has stopped", id);
                return Err(DispatchError::ElevatorHalted(id));
            }
            if !operating {
                registry.plan_mut(id).clear();
                registry.index.retire(id);
            }
            elevator.set_operating(operating);
        }

        elevator.wake();
        info!(
            "Elevator {} set {}",
            id,
            if operating { "in service" } else { "out of service" }
        );
        Ok(())
    }

    /// Stops every worker and waits for it to finish.
    pub fn shutdown(&self) {
        // Dropping the sender disconnects every worker's terminate receiver
        lock(&self.terminate_tx).take();

        let workers: Vec<JoinHandle<()>> = lock(&self.workers).drain(..).collect();
        for worker in workers {
            let name = worker.thread().name().unwrap_or("elevator").to_string();
            if worker.join().is_err() {
                error!("Worker {} ended with a panic", name);
            }
        }
        info!("Dispatcher shut down");
    }

    pub(crate) fn registry(&self) -> MutexGuard<'_, Registry> {
        lock(&self.registry)
    }

    #[cfg(test)]
    pub(crate) fn test_plan(&self, id: usize) -> StopPlan {
        self.registry().plans[id].clone()
    }

    #[cfg(test)]
    pub(crate) fn test_index_members(&self, direction: crate::shared::Direction) -> Vec<usize> {
        self.registry().index.members(direction)
    }
}

// The registry is never left half-updated across a panic point, so a poisoned lock is still usable
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
