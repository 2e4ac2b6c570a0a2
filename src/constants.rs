//! Application constants
//!
//! Centralized location for magic strings and configuration defaults.

use std::time::Duration;

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:5000";

/// Environment variable overriding the backend base URL
pub const BASE_URL_ENV: &str = "DISCHARGE_DESK_URL";

/// Environment variable overriding the PDF download directory
pub const DOWNLOAD_DIR_ENV: &str = "DISCHARGE_DESK_DOWNLOADS";

/// Directory (under the home directory) holding persisted preferences
pub const CONFIG_DIR_NAME: &str = ".discharge-desk";

/// Preferences file inside the config directory
pub const PREFERENCES_FILE: &str = "preferences.yaml";

/// Log file written next to the working directory
pub const LOG_FILE: &str = "discharge-desk.log";

/// Ceiling for every request except summary generation
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Client-side deadline for `/generate`
pub const GENERATE_TIMEOUT: Duration = Duration::from_secs(60);

/// How long a notification stays fully visible
pub const NOTIFICATION_DISPLAY: Duration = Duration::from_millis(3000);

/// Exit animation budget before a dismissed notification is removed
pub const NOTIFICATION_EXIT: Duration = Duration::from_millis(500);

/// Delay before following the redirect returned by `/add_patient`
pub const REDIRECT_DELAY: Duration = Duration::from_millis(2000);

/// File name used when the server token carries no usable name
pub const DEFAULT_PDF_NAME: &str = "discharge_summary.pdf";

/// Validation message for an empty patient identifier
pub const MISSING_PATIENT_ID: &str = "Enter a patient ID";

/// Application name
pub const APP_NAME: &str = "Discharge Desk";

/// Application version
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");
