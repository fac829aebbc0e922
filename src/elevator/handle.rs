/***************************************/
/*        3rd party libraries          */
/***************************************/
use crossbeam_channel as cbc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::{Direction, ElevatorStatus};

pub type ElevatorHandle = Arc<Elevator>;

/**
 * Shared view of one elevator in the bank.
 *
 * Anyone holding a handle may read the elevator's floor and direction at any time without taking
 * the dispatcher's lock. Only the elevator's own worker (`ElevatorFSM`) writes `current_floor`
 * and `direction`, and it does so while holding the dispatcher's registry lock.
 *
 * # Fields
 * - `id`:              Stable identity, index into the dispatcher's pool.
 * - `current_floor`:   Floor the elevator is stopped at or passing.
 * - `direction`:       Current `Direction`, stored as its `u8` value.
 * - `operating`:       Operator switch. `false` takes the elevator out of service.
 * - `deactivated`:     Set whenever the elevator is taken out of service, cleared by its worker once
 *                      it has parked the elevator at floor 0. Survives a quick offline/online toggle.
 * - `halted`:          Set when the worker stopped on a broken stop plan. Never cleared.
 * - `wake_tx`:         Wakes this elevator's worker when it is parked.
 */
#[derive(Debug)]
pub struct Elevator {
    id: usize,
    current_floor: AtomicU8,
    direction: AtomicU8,
    operating: AtomicBool,
    deactivated: AtomicBool,
    halted: AtomicBool,
    wake_tx: cbc::Sender<()>,
}

impl Elevator {
    pub(crate) fn new(id: usize, wake_tx: cbc::Sender<()>) -> Elevator {
        Elevator {
            id,
            current_floor: AtomicU8::new(0),
            direction: AtomicU8::new(Direction::Idle.to_u8()),
            operating: AtomicBool::new(true),
            deactivated: AtomicBool::new(false),
            halted: AtomicBool::new(false),
            wake_tx,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn current_floor(&self) -> u8 {
        self.current_floor.load(Ordering::Acquire)
    }

    pub fn direction(&self) -> Direction {
        Direction::from(self.direction.load(Ordering::Acquire))
    }

    pub fn is_operating(&self) -> bool {
        self.operating.load(Ordering::Acquire)
    }

    /// True once the worker has stopped for good. A halted elevator cannot return to service.
    pub fn is_halted(&self) -> bool {
        self.halted.load(Ordering::Acquire)
    }

    pub fn status(&self) -> ElevatorStatus {
        ElevatorStatus {
            id: self.id,
            current_floor: self.current_floor(),
            direction: self.direction(),
        }
    }

    pub(crate) fn set_current_floor(&self, floor: u8) {
        self.current_floor.store(floor, Ordering::Release);
    }

    pub(crate) fn set_direction(&self, direction: Direction) {
        self.direction.store(direction.to_u8(), Ordering::Release);
    }

    pub(crate) fn set_operating(&self, operating: bool) {
        if !operating {
            self.deactivated.store(true, Ordering::Release);
        }
        self.operating.store(operating, Ordering::Release);
    }

    /// Clears the deactivation mark, returning whether it was set.
    pub(crate) fn take_deactivated(&self) -> bool {
        self.deactivated.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn set_halted(&self) {
        self.halted.store(true, Ordering::Release);
    }

    pub(crate) fn wake(&self) {
        // The worker owns the receiver for as long as the elevator exists
        let _ = self.wake_tx.send(());
    }
}
