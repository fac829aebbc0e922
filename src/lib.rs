/* Modules */
pub mod cli;
pub mod config;
pub mod dispatcher;
pub mod elevator;
pub mod shared;

pub use config::{Config, ElevatorConfig};
pub use dispatcher::{Dispatcher, Request};
pub use elevator::{Elevator, ElevatorHandle};
pub use shared::{Direction, DispatchError, ElevatorStatus};
