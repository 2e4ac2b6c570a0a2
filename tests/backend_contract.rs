use std::collections::HashMap;
use std::time::Duration;

use axum::body::{Body, Bytes};
use axum::extract::{Multipart, Path, Query};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use discharge_desk::models::{Attachment, DetailLevel, FormPayload, GenerateOptions};
use discharge_desk::{ApiOutcome, BackendClient, ClientConfig, TransportError};

async fn handle_preview(Form(form): Form<HashMap<String, String>>) -> impl IntoResponse {
    match form.get("patient_id").map(String::as_str) {
        Some("P100") => (
            StatusCode::OK,
            Json(json!({"name": "Jane Doe", "sex": "F", "age": 45, "chronic": 1})),
        ),
        Some("404") => (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "No patient found with ID 404"})),
        ),
        Some(other) => (
            StatusCode::OK,
            Json(json!({"error": format!("No patient found with ID {}", other)})),
        ),
        None => (StatusCode::BAD_REQUEST, Json(json!({"error": "missing"}))),
    }
}

async fn handle_generate(Form(form): Form<HashMap<String, String>>) -> Json<Value> {
    Json(json!({
        "summary": {
            "hpi": form.get("doctor_notes").cloned().unwrap_or_default(),
            "ai_notes": form.get("detail_level").cloned().unwrap_or_default(),
            "discharge_date": form.get("discharge_date").cloned().unwrap_or_default(),
            "age": 61,
        },
        "pdf_file": "discharge_summary_P100.pdf",
    }))
}

async fn handle_view_database(Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let page: u32 = query.get("page").and_then(|p| p.parse().ok()).unwrap_or(0);
    let ajax = query.get("ajax").cloned().unwrap_or_default();
    Json(json!({
        "patients": [
            {"PatientID": page * 100 + 1, "Name": format!("ajax={}", ajax), "HasChronicCondition": "Yes"},
        ],
        "has_more": page < 2,
        "next_page": page + 1,
    }))
}

async fn handle_upload(mut multipart: Multipart) -> Json<Value> {
    let mut seen = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.unwrap_or_default();
        match file_name {
            Some(file_name) => seen.push(format!("{}={}:{}", name, file_name, bytes.len())),
            None => seen.push(format!("{}={}", name, String::from_utf8_lossy(&bytes))),
        }
    }
    Json(json!({"message": seen.join("&")}))
}

async fn handle_add_patient() -> Json<Value> {
    Json(json!({"error": "Duplicate ID"}))
}

async fn handle_download(Path(token): Path<String>) -> Response {
    match token.as_str() {
        "missing.pdf" => (StatusCode::NOT_FOUND, Vec::new()).into_response(),
        "discharge_summary.pdf" => {
            // Connection drops after the first chunk
            let chunks = futures_util::stream::iter(vec![
                Ok(Bytes::from_static(b"%PDF-partial")),
                Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "worker crashed")),
            ]);
            (StatusCode::OK, Body::from_stream(chunks)).into_response()
        }
        _ => (StatusCode::OK, b"%PDF-1.4 discharge".to_vec()).into_response(),
    }
}

async fn spawn_backend() -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = Router::new()
        .route("/preview", post(handle_preview))
        .route("/generate", post(handle_generate))
        .route("/add_patient", post(handle_add_patient))
        .route("/upload_test_report", post(handle_upload))
        .route("/view_database", get(handle_view_database))
        .route("/download/:token", get(handle_download));
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}/")
}

async fn client() -> BackendClient {
    let base_url = spawn_backend().await;
    BackendClient::new(ClientConfig::default().with_base_url(base_url))
}

#[tokio::test]
async fn preview_decodes_loose_scalars() {
    let client = client().await;
    match client.preview("P100").await {
        ApiOutcome::Success(preview) => {
            assert_eq!(preview.name.as_deref(), Some("Jane Doe"));
            assert_eq!(preview.age.as_deref(), Some("45"));
            assert_eq!(preview.chronic, Some(true));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn error_field_on_success_status_is_rejection() {
    let client = client().await;
    assert_eq!(
        client.preview("9").await,
        ApiOutcome::Rejected("No patient found with ID 9".into())
    );
}

#[tokio::test]
async fn non_success_status_is_transport_failure() {
    let client = client().await;
    assert_eq!(
        client.preview("404").await,
        ApiOutcome::Failed(TransportError::Status {
            status: 404,
            detail: Some("No patient found with ID 404".into()),
        })
    );
}

#[tokio::test]
async fn generate_sends_options_as_form_fields() {
    let client = client().await;
    let options = GenerateOptions {
        detail_level: DetailLevel::Brief,
        doctor_notes: "Stable on discharge".into(),
        discharge_date: "2025-03-02".into(),
    };
    match client.generate("P100", &options).await {
        ApiOutcome::Success(reply) => {
            assert_eq!(reply.summary.hpi.as_deref(), Some("Stable on discharge"));
            assert_eq!(reply.summary.ai_notes.as_deref(), Some("brief"));
            assert_eq!(reply.summary.discharge_date.as_deref(), Some("2025-03-02"));
            assert_eq!(reply.summary.age.as_deref(), Some("61"));
            assert_eq!(reply.pdf_file.as_deref(), Some("discharge_summary_P100.pdf"));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn view_database_requests_page_in_ajax_mode() {
    let client = client().await;
    match client.view_database(2).await {
        ApiOutcome::Success(page) => {
            assert_eq!(page.patients.len(), 1);
            assert_eq!(page.patients[0].patient_id.as_deref(), Some("201"));
            assert_eq!(page.patients[0].name.as_deref(), Some("ajax=true"));
            assert_eq!(page.patients[0].has_chronic_condition, Some(true));
            assert!(!page.has_more);
            assert_eq!(page.next_page, Some(3));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn upload_passes_fields_and_file_through() {
    let dir = tempfile::tempdir().unwrap();
    let report = dir.path().join("cbc.pdf");
    std::fs::write(&report, b"0123456789").unwrap();

    let client = client().await;
    let form = FormPayload {
        fields: vec![("patient_id".into(), "3".into())],
        attachment: Some(Attachment {
            field: "test_report".into(),
            path: report,
        }),
    };
    match client.upload_test_report(&form).await {
        ApiOutcome::Success(receipt) => {
            assert_eq!(
                receipt.message.as_deref(),
                Some("patient_id=3&test_report=cbc.pdf:10")
            );
            assert_eq!(receipt.redirect, None);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[tokio::test]
async fn duplicate_patient_is_rejection() {
    let client = client().await;
    let form = FormPayload {
        fields: vec![("name".into(), "Jane Doe".into())],
        attachment: None,
    };
    assert_eq!(
        client.add_patient(&form).await,
        ApiOutcome::Rejected("Duplicate ID".into())
    );
}

#[tokio::test]
async fn download_writes_pdf_into_target_dir() {
    let dir = tempfile::tempdir().unwrap();
    let client = client().await;

    let saved = client
        .download_pdf("discharge_summary_P100.pdf", dir.path())
        .await
        .unwrap();
    assert_eq!(saved, dir.path().join("discharge_summary_P100.pdf"));
    assert_eq!(std::fs::read(&saved).unwrap(), b"%PDF-1.4 discharge");

    let missing = client.download_pdf("missing.pdf", dir.path()).await;
    assert!(matches!(
        missing,
        Err(TransportError::Status { status: 404, .. })
    ));
}

#[tokio::test]
async fn interrupted_download_keeps_previous_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let existing = dir.path().join("discharge_summary.pdf");
    std::fs::write(&existing, b"%PDF-1.4 earlier summary").unwrap();
    let client = client().await;

    let result = client.download_pdf("discharge_summary.pdf", dir.path()).await;
    assert!(result.is_err(), "unexpected success: {:?}", result);

    assert_eq!(std::fs::read(&existing).unwrap(), b"%PDF-1.4 earlier summary");
    let leftovers: Vec<_> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name())
        .collect();
    assert_eq!(leftovers, vec![std::ffi::OsString::from("discharge_summary.pdf")]);
}

#[tokio::test]
async fn unreachable_backend_is_transport_failure() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let mut config = ClientConfig::default().with_base_url(format!("http://{addr}"));
    config.request_timeout = Duration::from_secs(5);
    let client = BackendClient::new(config);

    match client.preview("P100").await {
        ApiOutcome::Failed(TransportError::Connect(_)) | ApiOutcome::Failed(TransportError::Other(_)) => {}
        other => panic!("unexpected outcome: {:?}", other),
    }
}
