//! HTTP transport adapter.

pub mod controller;
pub mod response;

pub use controller::{AppState, create_router};
