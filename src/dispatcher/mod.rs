pub mod dispatcher;
pub mod dispatcher_tests;
pub mod index;
pub mod request;

pub use dispatcher::Dispatcher;
pub use index::EligibilityIndex;
pub use request::Request;
