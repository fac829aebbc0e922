/***************************************/
/*        3rd party libraries          */
/***************************************/
use serde::Deserialize;
use serde::Serialize;
use std::fmt;

/***************************************/
/*       Public data structures        */
/***************************************/
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Idle,
    Up,
    Down,
    Offline,
}

pub const DIRN_IDLE: u8 = 0;
pub const DIRN_UP: u8 = 1;
pub const DIRN_DOWN: u8 = 2;
pub const DIRN_OFFLINE: u8 = 3;

impl Direction {
    pub fn to_u8(&self) -> u8 {
        match *self {
            Direction::Idle => DIRN_IDLE,
            Direction::Up => DIRN_UP,
            Direction::Down => DIRN_DOWN,
            Direction::Offline => DIRN_OFFLINE,
        }
    }

    /// Direction of travel from `from` to `to`, `None` when the floors coincide.
    pub fn between(from: u8, to: u8) -> Option<Direction> {
        if to > from {
            Some(Direction::Up)
        } else if to < from {
            Some(Direction::Down)
        } else {
            None
        }
    }
}

impl From<u8> for Direction {
    fn from(item: u8) -> Self {
        match item {
            DIRN_IDLE => Direction::Idle,
            DIRN_UP => Direction::Up,
            DIRN_DOWN => Direction::Down,
            DIRN_OFFLINE => Direction::Offline,
            _ => panic!("Invalid direction value"),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Direction::Idle => "idle",
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Offline => "offline",
        };
        f.write_str(name)
    }
}

/// Point-in-time view of one elevator, as shown to operators.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ElevatorStatus {
    pub id: usize,
    #[serde(rename = "currentFloor")]
    pub current_floor: u8,
    pub direction: Direction,
}

impl fmt::Display for ElevatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Elevator {} | Current floor {} | Direction {}",
            self.id, self.current_floor, self.direction
        )
    }
}
