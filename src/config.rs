//! Client configuration
//!
//! Defaults come from [`crate::constants`]; the backend URL and the download
//! directory can be overridden from the environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    BASE_URL_ENV, DEFAULT_BASE_URL, DOWNLOAD_DIR_ENV, GENERATE_TIMEOUT, NOTIFICATION_DISPLAY,
    NOTIFICATION_EXIT, REDIRECT_DELAY, REQUEST_TIMEOUT,
};

#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Backend base URL without trailing slash
    pub base_url: String,
    /// Where downloaded summary PDFs are written
    pub download_dir: PathBuf,
    pub request_timeout: Duration,
    pub generate_timeout: Duration,
    pub notification_display: Duration,
    pub notification_exit: Duration,
    pub redirect_delay: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            base_url: DEFAULT_BASE_URL.to_string(),
            download_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            request_timeout: REQUEST_TIMEOUT,
            generate_timeout: GENERATE_TIMEOUT,
            notification_display: NOTIFICATION_DISPLAY,
            notification_exit: NOTIFICATION_EXIT,
            redirect_delay: REDIRECT_DELAY,
        }
    }
}

impl ClientConfig {
    /// Build the configuration from defaults plus environment overrides
    pub fn from_env() -> Self {
        let mut config = ClientConfig::default();

        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                config.base_url = url.trim().to_string();
            }
        }
        if let Ok(dir) = std::env::var(DOWNLOAD_DIR_ENV) {
            if !dir.trim().is_empty() {
                config.download_dir = PathBuf::from(dir.trim());
            }
        }

        let base_url = config.base_url.clone();
        config.with_base_url(base_url)
    }

    /// Replace the base URL, normalizing the trailing slash away
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Absolute URL of a backend path such as `/preview`
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}
