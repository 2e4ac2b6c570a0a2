//! App layer - central state management and command processing
//!
//! The App actor receives UI events, network responses and timer firings,
//! updates state, and emits network commands and render state.

pub mod state;
pub mod actor;
pub mod commands;
pub mod forms;
pub mod notifications;
pub mod pagination;
pub mod region;
pub mod scheduler;

pub use state::{AppState, Effect};
pub use actor::{AppActor, Clipboard};
