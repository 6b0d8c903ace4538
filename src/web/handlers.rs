use askama::Template;
use axum::{
    extract::{multipart::MultipartError, Multipart, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json, Response},
};
use std::path::Path;
use tracing::{error, warn};

use crate::constants::{get_supported_schemas, MISSING_EXPORT_FILE, READY_EXPORT_FILE};
use crate::error::IntakeError;
use crate::pipeline::UploadSummary;
use crate::types::CandidateFilter;
use crate::web::state::AppState;
use crate::web::templates::{FilterInput, ReportTemplate, SchemaOption, SummaryView, UploadTemplate};

fn status_for(err: &IntakeError) -> StatusCode {
    match err {
        IntakeError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
        e if e.is_rejection() => StatusCode::BAD_REQUEST,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for IntakeError {
    fn into_response(self) -> Response {
        let status = status_for(&self);
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, self.user_message()).into_response()
    }
}

/// Body limit overruns surface as multipart errors; everything else is a malformed upload
fn multipart_failure(state: &AppState, e: MultipartError) -> Response {
    let err = if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        IntakeError::PayloadTooLarge {
            limit: state.max_upload_bytes,
        }
    } else {
        IntakeError::Format(e.body_text())
    };
    warn!("Rejected multipart upload: {}", e);
    render_upload(state, status_for(&err), Some(err.user_message()), None)
}

fn schema_options(selected: &str) -> Vec<SchemaOption> {
    get_supported_schemas()
        .into_iter()
        .map(|name| SchemaOption {
            name: name.to_string(),
            selected: name == selected,
        })
        .collect()
}

fn render_upload(
    state: &AppState,
    status: StatusCode,
    message: Option<String>,
    summary: Option<&UploadSummary>,
) -> Response {
    let template = UploadTemplate {
        schemas: schema_options(&state.default_schema),
        message,
        summary: summary.map(SummaryView::from),
    };
    match template.render() {
        Ok(html) => (status, Html(html)).into_response(),
        Err(e) => IntakeError::Render(e).into_response(),
    }
}

pub async fn upload_form(State(state): State<AppState>) -> Response {
    render_upload(&state, StatusCode::OK, None, None)
}

pub async fn upload(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut schema = state.default_schema.clone();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return multipart_failure(&state, e),
        };

        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                match field.bytes().await {
                    Ok(bytes) => file = Some((file_name, bytes.to_vec())),
                    Err(e) => return multipart_failure(&state, e),
                }
            }
            Some("schema") => {
                if let Ok(text) = field.text().await {
                    if !text.trim().is_empty() {
                        schema = text.trim().to_string();
                    }
                }
            }
            _ => {}
        }
    }

    let Some((file_name, bytes)) = file.filter(|(name, _)| !name.is_empty()) else {
        let err = IntakeError::UnsupportedFile("no file selected".to_string());
        return render_upload(&state, StatusCode::BAD_REQUEST, Some(err.user_message()), None);
    };

    match state.pipeline.process_upload(&file_name, &bytes, &schema).await {
        Ok(summary) => render_upload(
            &state,
            StatusCode::OK,
            Some("File uploaded and processed successfully.".to_string()),
            Some(&summary),
        ),
        Err(e) => {
            let status = status_for(&e);
            if status.is_server_error() {
                error!("Upload failed: {}", e);
            }
            render_upload(&state, status, Some(e.user_message()), None)
        }
    }
}

pub async fn report(
    State(state): State<AppState>,
    Query(filter): Query<CandidateFilter>,
) -> Result<Html<String>, IntakeError> {
    let candidates = state.pipeline.store().query(&filter).await?;
    let template = ReportTemplate {
        filters: FilterInput::from_filter(&filter),
        candidates,
    };
    Ok(Html(template.render()?))
}

async fn download(path: &Path, file_name: &str) -> Response {
    match tokio::fs::read(path).await {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", file_name),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => (
            StatusCode::NOT_FOUND,
            "No export available yet. Upload a CSV first.",
        )
            .into_response(),
        Err(e) => IntakeError::Io(e).into_response(),
    }
}

pub async fn download_ready(State(state): State<AppState>) -> Response {
    let paths = state.pipeline.exporter().paths();
    download(&paths.ready, READY_EXPORT_FILE).await
}

pub async fn download_missing(State(state): State<AppState>) -> Response {
    let paths = state.pipeline.exporter().paths();
    download(&paths.missing, MISSING_EXPORT_FILE).await
}

pub async fn health(State(state): State<AppState>) -> Response {
    match state.pipeline.store().count().await {
        Ok(candidates) => Json(serde_json::json!({
            "status": "healthy",
            "service": "candidate-intake",
            "version": env!("CARGO_PKG_VERSION"),
            "candidates": candidates,
        }))
        .into_response(),
        Err(e) => {
            error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(serde_json::json!({ "status": "unhealthy" })),
            )
                .into_response()
        }
    }
}
