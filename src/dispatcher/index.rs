/***************************************/
/*        3rd party libraries          */
/***************************************/
use std::collections::BTreeMap;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::elevator::ElevatorHandle;
use crate::shared::{Direction, DispatchError};

/**
 * Which elevators can be handed a request in each direction.
 *
 * An idle elevator sits in both maps, an elevator moving up only in `up`, one moving down only in
 * `down`, and an offline elevator in neither. The maps are keyed by elevator id so iteration, and
 * with it tie-breaking, is deterministic.
 */
#[derive(Debug, Default)]
pub struct EligibilityIndex {
    up: BTreeMap<usize, ElevatorHandle>,
    down: BTreeMap<usize, ElevatorHandle>,
}

impl EligibilityIndex {
    pub fn new() -> EligibilityIndex {
        EligibilityIndex::default()
    }

    /// Re-indexes `elevator` from its current direction.
    pub fn publish(&mut self, elevator: &ElevatorHandle) {
        let id = elevator.id();
        let direction = if elevator.is_operating() {
            elevator.direction()
        } else {
            Direction::Offline
        };

        match direction {
            Direction::Up => {
                self.up.insert(id, elevator.clone());
                self.down.remove(&id);
            }
            Direction::Down => {
                self.down.insert(id, elevator.clone());
                self.up.remove(&id);
            }
            Direction::Idle => {
                self.up.insert(id, elevator.clone());
                self.down.insert(id, elevator.clone());
            }
            Direction::Offline => self.retire(id),
        }
    }

    pub fn retire(&mut self, id: usize) {
        self.up.remove(&id);
        self.down.remove(&id);
    }

    pub fn contains(&self, direction: Direction, id: usize) -> bool {
        match direction {
            Direction::Up => self.up.contains_key(&id),
            Direction::Down => self.down.contains_key(&id),
            _ => false,
        }
    }

    pub fn members(&self, direction: Direction) -> Vec<usize> {
        match direction {
            Direction::Up => self.up.keys().copied().collect(),
            Direction::Down => self.down.keys().copied().collect(),
            _ => Vec::new(),
        }
    }

    /**
     * Picks the elevator closest to `origin` that can take a request going `requested`.
     *
     * Elevators already travelling in `requested` that have passed `origin` are skipped; they would
     * have to finish their run and come back. Equal distances go to the lowest id.
     */
    pub fn select(&self, requested: Direction, origin: u8) -> Result<ElevatorHandle, DispatchError> {
        let candidates = match requested {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
            other => return Err(DispatchError::NoAvailableElevator(other)),
        };

        candidates
            .values()
            .filter(|elevator| !has_passed(elevator, requested, origin))
            .min_by_key(|elevator| (elevator.current_floor().abs_diff(origin), elevator.id()))
            .cloned()
            .ok_or(DispatchError::NoAvailableElevator(requested))
    }
}

fn has_passed(elevator: &ElevatorHandle, requested: Direction, origin: u8) -> bool {
    if elevator.direction() != requested {
        return false;
    }

    match requested {
        Direction::Up => elevator.current_floor() > origin,
        Direction::Down => elevator.current_floor() < origin,
        _ => false,
    }
}
