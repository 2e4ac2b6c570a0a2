//! # Discharge Desk
//!
//! Terminal client for a discharge-summary backend.
//!
//! ## Features
//! - Patient preview and AI discharge summary generation
//! - Copy summary to clipboard, download the summary PDF
//! - Add patient and upload test report forms
//! - Paginated patient database view
//! - Transient success/error notifications
//! - Persisted light/dark theme
//!
//! ## Architecture
//! Actor-based with channels:
//! - UI Layer (Ratatui) - synchronous
//! - App Layer (State machine, timers)
//! - Network Layer (Tokio runtime)

pub mod config;
pub mod constants;
pub mod models;
pub mod storage;
pub mod ui;
pub mod messages;
pub mod app;
pub mod network;

// Re-export commonly used types
pub use config::ClientConfig;
pub use models::{DischargeSummary, PatientPreview, PatientRow, Theme};
pub use messages::{ApiOutcome, UiEvent, NetworkCommand, NetworkResponse, RenderState};
pub use app::{AppState, AppActor, Clipboard};
pub use network::{BackendClient, NetworkActor, TransportError};
pub use storage::Storage;
