//! Application layer - the service callers talk to.

pub mod service;

pub use service::{PassengerService, ServiceError};
