/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::{Deserialize, Serialize};

/***************************************/
/*           Local modules             */
/***************************************/
use crate::dispatcher::Dispatcher;
use crate::elevator::ElevatorHandle;
use crate::shared::{Direction, DispatchError};

/// A passenger asking to travel from `origin` to `destination`.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub origin: u8,
    pub destination: u8,
}

impl Request {
    pub fn new(origin: u8, destination: u8) -> Request {
        Request {
            origin,
            destination,
        }
    }

    /// `None` for a request that starts and ends on the same floor.
    pub fn direction(&self) -> Option<Direction> {
        Direction::between(self.origin, self.destination)
    }

    /// Hands the request to `dispatcher`. `Ok(None)` means there was nothing to do.
    pub fn submit(&self, dispatcher: &Dispatcher) -> Result<Option<ElevatorHandle>, DispatchError> {
        dispatcher.select_elevator(self)
    }
}
