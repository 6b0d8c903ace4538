use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use std::sync::Arc;
use tempfile::{tempdir, TempDir};
use tower::ServiceExt;

use candidate_intake::pipeline::export::ExportWriter;
use candidate_intake::pipeline::storage::{CandidateStore, InMemoryCandidateStore};
use candidate_intake::pipeline::UploadPipeline;
use candidate_intake::web::{app_router, AppState};
use candidate_intake::CandidateRecord;

const BOUNDARY: &str = "intake-test-boundary";

fn test_state() -> (AppState, Arc<InMemoryCandidateStore>, TempDir) {
    let dir = tempdir().expect("tempdir");
    let store = Arc::new(InMemoryCandidateStore::new());
    let pipeline = UploadPipeline::new(store.clone(), ExportWriter::new(dir.path()));
    (AppState::new(pipeline, "direct", 1024 * 1024), store, dir)
}

fn multipart_body(file_name: &str, content: &str, schema: &str) -> String {
    format!(
        "--{b}\r\n\
         Content-Disposition: form-data; name=\"schema\"\r\n\r\n\
         {schema}\r\n\
         --{b}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {content}\r\n\
         --{b}--\r\n",
        b = BOUNDARY
    )
}

fn upload_request(file_name: &str, content: &str, schema: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(file_name, content, schema)))
        .expect("request")
}

async fn body_text(response: axum::response::Response) -> Result<String> {
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    Ok(String::from_utf8(bytes.to_vec())?)
}

fn record(first: &str, company: &str, country: &str) -> CandidateRecord {
    CandidateRecord {
        first_name: first.to_string(),
        last_name: "Test".to_string(),
        email: format!("{}@example.com", first.to_lowercase()),
        phone: String::new(),
        job_title: "Engineer".to_string(),
        company_name: company.to_string(),
        country: country.to_string(),
    }
}

#[tokio::test]
async fn upload_form_lists_both_schemas() -> Result<()> {
    let (state, _store, _dir) = test_state();
    let response = app_router(state)
        .oneshot(Request::builder().uri("/").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await?;
    assert!(html.contains("direct"));
    assert!(html.contains("derived"));
    Ok(())
}

#[tokio::test]
async fn posting_a_valid_csv_stores_candidates() -> Result<()> {
    let (state, store, _dir) = test_state();
    let csv = "First Name,Last Name,Email,Phone Number,Job Title,Company Name,Country\n\
               Ana,Diaz,a@x.com,,Engineer,Acme,Germany";

    let response = app_router(state)
        .oneshot(upload_request("leads.csv", csv, "direct"))
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await?;
    assert!(html.contains("File uploaded and processed successfully."));
    assert_eq!(store.count().await?, 1);
    Ok(())
}

#[tokio::test]
async fn posting_a_non_csv_file_is_rejected() -> Result<()> {
    let (state, store, _dir) = test_state();

    let response = app_router(state)
        .oneshot(upload_request("leads.txt", "First Name\nAna", "direct"))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await?;
    assert!(html.contains("Please upload a valid CSV file."));
    assert_eq!(store.count().await?, 0);
    Ok(())
}

#[tokio::test]
async fn posting_a_csv_with_missing_columns_names_them() -> Result<()> {
    let (state, store, _dir) = test_state();
    let csv = "First Name,Last Name,Email,Phone Number,Job Title,Company Name\n\
               Ana,Diaz,a@x.com,,Engineer,Acme";

    let response = app_router(state)
        .oneshot(upload_request("leads.csv", csv, "direct"))
        .await?;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let html = body_text(response).await?;
    assert!(html.contains("Missing required columns in CSV: Country"));
    assert_eq!(store.count().await?, 0);
    Ok(())
}

#[tokio::test]
async fn report_applies_query_filters() -> Result<()> {
    let (state, store, _dir) = test_state();
    store
        .insert_batch(&[
            record("Ana", "Acme", "Germany"),
            record("Bo", "Initech", "USA"),
            record("Cy", "Acme Labs", "France"),
        ])
        .await?;

    let response = app_router(state)
        .oneshot(
            Request::builder()
                .uri("/report?company_name=Acme&country=&first_name=")
                .body(Body::empty())?,
        )
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await?;
    assert!(html.contains("Ana"));
    assert!(html.contains("Acme Labs"));
    assert!(!html.contains("Initech"));
    Ok(())
}

#[tokio::test]
async fn export_download_is_404_before_any_upload() -> Result<()> {
    let (state, _store, _dir) = test_state();
    let response = app_router(state)
        .oneshot(Request::builder().uri("/exports/ready").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn export_download_serves_the_latest_ready_file() -> Result<()> {
    let (state, _store, _dir) = test_state();
    let app = app_router(state);
    let csv = "First Name,Last Name,Email,Phone Number,Job Title,Company Name,Country\n\
               Ana,Diaz,a@x.com,,Engineer,Acme,Germany";

    let upload = app.clone().oneshot(upload_request("leads.csv", csv, "direct")).await?;
    assert_eq!(upload.status(), StatusCode::OK);

    let response = app
        .oneshot(Request::builder().uri("/exports/ready").body(Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).map(|v| v.as_bytes()),
        Some("text/csv; charset=utf-8".as_bytes())
    );
    let text = body_text(response).await?;
    assert!(text.starts_with("First Name,Last Name,Job Title,Email,Phone Number,Company Name,Country"));
    assert!(text.contains("Ana,Diaz,Engineer,a@x.com,,Acme,Germany"));
    Ok(())
}

#[tokio::test]
async fn health_reports_candidate_count() -> Result<()> {
    let (state, store, _dir) = test_state();
    store.insert(&record("Ana", "Acme", "Germany")).await?;

    let response = app_router(state)
        .oneshot(Request::builder().uri("/health").body(Body::empty())?)
        .await?;

    assert_eq!(response.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_str(&body_text(response).await?)?;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["candidates"], 1);
    Ok(())
}

#[tokio::test]
async fn oversized_upload_is_rejected_as_too_large() -> Result<()> {
    let dir = tempdir()?;
    let store = Arc::new(InMemoryCandidateStore::new());
    let pipeline = UploadPipeline::new(store.clone(), ExportWriter::new(dir.path()));
    let state = AppState::new(pipeline, "direct", 256);

    let mut csv = String::from("First Name,Last Name,Email,Phone Number,Job Title,Company Name,Country\n");
    for i in 0..50 {
        csv.push_str(&format!("Ana{i},Diaz,a{i}@x.com,,Engineer,Acme,Germany\n"));
    }

    let response = app_router(state)
        .oneshot(upload_request("leads.csv", &csv, "direct"))
        .await?;

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let html = body_text(response).await?;
    assert!(html.contains("The uploaded file is too large. The limit is 256 bytes."));
    assert_eq!(store.count().await?, 0);
    Ok(())
}
