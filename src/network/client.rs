//! HTTP client wrapper - executes backend calls and decodes replies

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures_util::StreamExt;
use reqwest::multipart;
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;

use crate::config::ClientConfig;
use crate::constants::DEFAULT_PDF_NAME;
use crate::messages::ApiOutcome;
use crate::models::{
    ApiReply, FormPayload, GenerateOptions, GenerateReply, PatientPage, PatientPreview,
    SubmitReceipt,
};
use crate::network::TransportError;

/// Typed access to the discharge-summary backend
#[derive(Clone, Debug)]
pub struct BackendClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl BackendClient {
    pub fn new(config: ClientConfig) -> Self {
        BackendClient {
            http: create_client(),
            config,
        }
    }

    /// POST /preview
    pub async fn preview(&self, patient_id: &str) -> ApiOutcome<PatientPreview> {
        let request = self
            .http
            .post(self.config.endpoint("/preview"))
            .timeout(self.config.request_timeout)
            .form(&[("patient_id", patient_id)]);
        decode(request.send().await).await
    }

    /// POST /generate
    ///
    /// No transport timeout here: the App owns the deadline and cancels the
    /// wait through the actor.
    pub async fn generate(
        &self,
        patient_id: &str,
        options: &GenerateOptions,
    ) -> ApiOutcome<GenerateReply> {
        let request = self.http.post(self.config.endpoint("/generate")).form(&[
            ("patient_id", patient_id),
            ("detail_level", options.detail_level.as_str()),
            ("doctor_notes", options.doctor_notes.as_str()),
            ("discharge_date", options.discharge_date.as_str()),
        ]);
        decode(request.send().await).await
    }

    /// POST /add_patient
    pub async fn add_patient(&self, form: &FormPayload) -> ApiOutcome<SubmitReceipt> {
        self.submit_multipart("/add_patient", form).await
    }

    /// POST /upload_test_report
    pub async fn upload_test_report(&self, form: &FormPayload) -> ApiOutcome<SubmitReceipt> {
        self.submit_multipart("/upload_test_report", form).await
    }

    async fn submit_multipart(&self, path: &str, form: &FormPayload) -> ApiOutcome<SubmitReceipt> {
        let body = match build_multipart(form).await {
            Ok(body) => body,
            Err(e) => return ApiOutcome::Failed(e),
        };
        let request = self
            .http
            .post(self.config.endpoint(path))
            .timeout(self.config.request_timeout)
            .multipart(body);
        decode(request.send().await).await
    }

    /// GET /view_database?page=N&ajax=true
    pub async fn view_database(&self, page: u32) -> ApiOutcome<PatientPage> {
        let page = page.to_string();
        let request = self
            .http
            .get(self.config.endpoint("/view_database"))
            .timeout(self.config.request_timeout)
            .query(&[("page", page.as_str()), ("ajax", "true")]);
        decode(request.send().await).await
    }

    /// GET /download/<token>, streamed into `dest_dir`
    pub async fn download_pdf(&self, token: &str, dest_dir: &Path) -> Result<PathBuf, TransportError> {
        let url = self.config.endpoint(&format!("/download/{}", token));
        let resp = self
            .http
            .get(url)
            .timeout(self.config.request_timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                status: status.as_u16(),
                detail: None,
            });
        }

        let name = pdf_file_name(token);
        let partial = dest_dir.join(format!("{}.part", name));
        let dest = dest_dir.join(name);
        let write_err = |e: std::io::Error| TransportError::Write {
            path: dest.display().to_string(),
            reason: e.to_string(),
        };

        tokio::fs::create_dir_all(dest_dir).await.map_err(write_err)?;
        if let Err(e) = stream_to_file(resp, &partial).await {
            // A previous download at `dest` stays untouched
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        if let Err(e) = tokio::fs::rename(&partial, &dest).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(write_err(e));
        }

        Ok(dest)
    }
}

/// Turn a sent request into an outcome: non-2xx is a transport failure, a
/// 2xx body is either `{error}` or the payload.
async fn decode<T: DeserializeOwned>(
    result: Result<reqwest::Response, reqwest::Error>,
) -> ApiOutcome<T> {
    let resp = match result {
        Ok(resp) => resp,
        Err(e) => return ApiOutcome::Failed(e.into()),
    };

    let status = resp.status();
    let body = match resp.text().await {
        Ok(body) => body,
        Err(e) => return ApiOutcome::Failed(e.into()),
    };

    if !status.is_success() {
        let detail = serde_json::from_str::<serde_json::Value>(&body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string));
        return ApiOutcome::Failed(TransportError::Status {
            status: status.as_u16(),
            detail,
        });
    }

    match serde_json::from_str::<ApiReply<T>>(&body) {
        Ok(reply) => reply.into(),
        Err(e) => ApiOutcome::Failed(TransportError::Decode(e.to_string())),
    }
}

/// Write a response body to `path` chunk by chunk
async fn stream_to_file(resp: reqwest::Response, path: &Path) -> Result<(), TransportError> {
    let write_err = |e: std::io::Error| TransportError::Write {
        path: path.display().to_string(),
        reason: e.to_string(),
    };

    let mut file = tokio::fs::File::create(path).await.map_err(write_err)?;
    let mut stream = resp.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        file.write_all(&bytes).await.map_err(write_err)?;
    }
    file.flush().await.map_err(write_err)?;
    Ok(())
}

/// Multipart body with every text field and the attachment bytes as-is
async fn build_multipart(form: &FormPayload) -> Result<multipart::Form, TransportError> {
    let mut body = multipart::Form::new();
    for (name, value) in &form.fields {
        body = body.text(name.clone(), value.clone());
    }

    if let Some(attachment) = &form.attachment {
        let bytes = tokio::fs::read(&attachment.path)
            .await
            .map_err(|e| TransportError::Attachment {
                path: attachment.path.display().to_string(),
                reason: e.to_string(),
            })?;
        let file_name = attachment
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| attachment.field.clone());
        body = body.part(
            attachment.field.clone(),
            multipart::Part::bytes(bytes).file_name(file_name),
        );
    }

    Ok(body)
}

/// Local file name for a download token, never escaping the target dir
fn pdf_file_name(token: &str) -> String {
    Path::new(token)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_PDF_NAME.to_string())
}

/// Create an HTTP client with default configuration
pub fn create_client() -> reqwest::Client {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pdf_file_name_strips_directories() {
        assert_eq!(pdf_file_name("discharge_summary.pdf"), "discharge_summary.pdf");
        assert_eq!(pdf_file_name("../../etc/passwd"), "passwd");
        assert_eq!(pdf_file_name(""), DEFAULT_PDF_NAME);
    }

    #[tokio::test]
    async fn test_missing_attachment_is_reported_before_sending() {
        let form = FormPayload {
            fields: vec![("patient_id".into(), "3".into())],
            attachment: Some(crate::models::Attachment {
                field: "test_report".into(),
                path: PathBuf::from("/definitely/not/here.pdf"),
            }),
        };
        let err = build_multipart(&form).await.unwrap_err();
        assert!(matches!(err, TransportError::Attachment { .. }));
    }
}
