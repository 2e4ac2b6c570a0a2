//! Network layer - backend request execution
//!
//! The Network actor receives commands from the App layer, runs each one as
//! a Tokio task and sends back one typed response per command.

pub mod actor;
pub mod client;
pub mod error;

pub use actor::NetworkActor;
pub use client::BackendClient;
pub use error::TransportError;
