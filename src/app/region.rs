//! Display regions - per-area request state with stale-response suppression

use std::fmt;

/// Independent display areas, each with its own request lifecycle
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegionId {
    Preview,
    Result,
    PatientForm,
    UploadForm,
    PdfDownload,
}

impl RegionId {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionId::Preview => "preview",
            RegionId::Result => "result",
            RegionId::PatientForm => "patient_form",
            RegionId::UploadForm => "upload_form",
            RegionId::PdfDownload => "pdf_download",
        }
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle of a single region
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestState<T> {
    #[default]
    Idle,
    Loading,
    Success(T),
    Failure(String),
}

impl<T> RequestState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, RequestState::Loading)
    }

    pub fn success(&self) -> Option<&T> {
        match self {
            RequestState::Success(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&str> {
        match self {
            RequestState::Failure(message) => Some(message),
            _ => None,
        }
    }
}

/// A region plus the sequence number of its latest request.
///
/// Only the latest request may resolve the region, and only while it is
/// still loading. Anything else is stale and gets dropped.
#[derive(Clone, Debug)]
pub struct Region<T> {
    id: RegionId,
    seq: u64,
    state: RequestState<T>,
}

impl<T> Region<T> {
    pub fn new(id: RegionId) -> Self {
        Region {
            id,
            seq: 0,
            state: RequestState::Idle,
        }
    }

    pub fn state(&self) -> &RequestState<T> {
        &self.state
    }

    pub fn latest_seq(&self) -> u64 {
        self.seq
    }

    pub fn is_loading(&self) -> bool {
        self.state.is_loading()
    }

    /// Start a new request, superseding whatever the region was doing
    pub fn begin(&mut self) -> u64 {
        self.seq += 1;
        self.state = RequestState::Loading;
        self.seq
    }

    /// True when a response tagged `seq` may still be rendered
    pub fn accepts(&self, seq: u64) -> bool {
        seq == self.seq && self.state.is_loading()
    }

    /// Apply a terminal state for `seq`. Returns false for stale responses.
    pub fn resolve(&mut self, seq: u64, state: RequestState<T>) -> bool {
        if !self.accepts(seq) {
            tracing::debug!(region = %self.id, seq, latest = self.seq, "Discarding stale response");
            return false;
        }
        self.state = state;
        true
    }

    /// Back to idle, invalidating any outstanding request
    pub fn reset(&mut self) {
        self.seq += 1;
        self.state = RequestState::Idle;
    }
}
