pub mod error;
pub mod macros;
pub mod structs;

pub use error::ConfigError;
pub use error::DispatchError;
pub use error::PlanViolation;
pub use structs::Direction;
pub use structs::ElevatorStatus;
