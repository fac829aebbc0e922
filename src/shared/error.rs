/***************************************/
/*        3rd party libraries          */
/***************************************/
use thiserror::Error;

/***************************************/
/*           Local modules             */
/***************************************/
use crate::shared::Direction;

/***************************************/
/*            Error types              */
/***************************************/
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("floor {0} is outside the configured floor range")]
    InvalidFloor(u8),
    #[error("no elevator can currently serve a request going {0}")]
    NoAvailableElevator(Direction),
    #[error("there is no elevator with id {0}")]
    UnknownElevator(usize),
    #[error("elevator {0} was stopped by a broken stop plan and cannot return to service")]
    ElevatorHalted(usize),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A stop plan that asks an elevator to visit a floor behind its direction of travel.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("stop plan asks for floor {floor} while travelling {direction} from floor {current}")]
pub struct PlanViolation {
    pub direction: Direction,
    pub current: u8,
    pub floor: u8,
}
