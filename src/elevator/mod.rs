pub mod fsm;
pub mod handle;
pub mod stop_plan;

pub use fsm::ElevatorFSM;
pub use handle::Elevator;
pub use handle::ElevatorHandle;
pub use stop_plan::{Leg, StopPlan};
