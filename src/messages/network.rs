//! Network messages - communication between App and Network layers

use std::path::PathBuf;

use crate::models::{
    ApiReply, FormPayload, GenerateOptions, GenerateReply, PatientPage, PatientPreview,
    SubmitReceipt,
};
use crate::network::TransportError;

/// Result of one backend call, keeping application and transport errors apart
#[derive(Debug, Clone, PartialEq)]
pub enum ApiOutcome<T> {
    /// 2xx with the expected payload
    Success(T),
    /// 2xx carrying an explicit `error` field
    Rejected(String),
    /// Network failure, non-2xx, timeout or undecodable body
    Failed(TransportError),
}

impl<T> From<ApiReply<T>> for ApiOutcome<T> {
    fn from(reply: ApiReply<T>) -> Self {
        match reply.into_result() {
            Ok(payload) => ApiOutcome::Success(payload),
            Err(error) => ApiOutcome::Rejected(error),
        }
    }
}

/// Commands sent from App layer to Network layer.
///
/// `seq` is the sequence number of the issuing region and comes back
/// unchanged in the response.
#[derive(Debug, Clone, PartialEq)]
pub enum NetworkCommand {
    /// POST /preview
    Preview { seq: u64, patient_id: String },
    /// POST /generate
    Generate {
        seq: u64,
        patient_id: String,
        options: GenerateOptions,
    },
    /// Stop waiting for a `/generate` that the App has given up on
    CancelGenerate(u64),
    /// POST /add_patient (multipart)
    AddPatient { seq: u64, form: FormPayload },
    /// POST /upload_test_report (multipart)
    UploadTestReport { seq: u64, form: FormPayload },
    /// GET /view_database?page=N&ajax=true
    LoadPatients { seq: u64, page: u32 },
    /// GET /download/<token>, saved under `dest_dir`
    DownloadPdf {
        seq: u64,
        token: String,
        dest_dir: PathBuf,
    },

    /// Shutdown the network actor
    Shutdown,
}

/// Responses sent from Network layer to App layer
#[derive(Debug, Clone)]
pub enum NetworkResponse {
    Preview {
        seq: u64,
        outcome: ApiOutcome<PatientPreview>,
    },
    Generate {
        seq: u64,
        outcome: ApiOutcome<GenerateReply>,
    },
    PatientAdded {
        seq: u64,
        outcome: ApiOutcome<SubmitReceipt>,
    },
    ReportUploaded {
        seq: u64,
        outcome: ApiOutcome<SubmitReceipt>,
    },
    PatientsPage {
        seq: u64,
        page: u32,
        outcome: ApiOutcome<PatientPage>,
    },
    PdfDownloaded {
        seq: u64,
        outcome: Result<PathBuf, TransportError>,
    },
}

impl NetworkResponse {
    /// Get the sequence number the response answers
    pub fn seq(&self) -> u64 {
        match self {
            NetworkResponse::Preview { seq, .. } => *seq,
            NetworkResponse::Generate { seq, .. } => *seq,
            NetworkResponse::PatientAdded { seq, .. } => *seq,
            NetworkResponse::ReportUploaded { seq, .. } => *seq,
            NetworkResponse::PatientsPage { seq, .. } => *seq,
            NetworkResponse::PdfDownloaded { seq, .. } => *seq,
        }
    }

    /// Short name for logging
    pub fn kind(&self) -> &'static str {
        match self {
            NetworkResponse::Preview { .. } => "preview",
            NetworkResponse::Generate { .. } => "generate",
            NetworkResponse::PatientAdded { .. } => "add_patient",
            NetworkResponse::ReportUploaded { .. } => "upload_test_report",
            NetworkResponse::PatientsPage { .. } => "view_database",
            NetworkResponse::PdfDownloaded { .. } => "download",
        }
    }
}
