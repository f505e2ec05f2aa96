use super::dto::{DownloadQuery, JobResponse, JobSummary, StartResponse, SubmitResponse};
use super::service::JobService;
use crate::common::response::{ApiError, ApiResponse, ApiSuccess};
use crate::state::AppState;
use axum::{
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tokio_util::io::ReaderStream;
use tracing::{error, info};
use uuid::Uuid;

/// Submit a source video
/// Streams the `video` multipart field to disk and registers an `uploaded` job
#[utoipa::path(
    post,
    path = "/api/v1/jobs",
    request_body(content = String, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Job created", body = ApiResponse<SubmitResponse>),
        (status = 400, description = "Missing payload or not a video"),
        (status = 500, description = "Internal Server Error")
    ),
    tag = "Jobs"
)]
pub async fn submit_job(State(state): State<AppState>, mut multipart: Multipart) -> impl IntoResponse {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => return ApiError::bad_request(format!("Malformed multipart body: {}", e)).into_response(),
        };

        if field.name() != Some("video") {
            continue;
        }

        return match JobService::submit(&state, field).await {
            Ok(res) => ApiSuccess::with_status(res, "Job submitted successfully", StatusCode::CREATED).into_response(),
            Err(e) => ApiError::from(e).into_response(),
        };
    }

    ApiError::bad_request("No video field found in multipart request").into_response()
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs",
    responses(
        (status = 200, description = "List jobs in submission order", body = ApiResponse<Vec<JobSummary>>)
    ),
    tag = "Jobs"
)]
pub async fn list_jobs(State(state): State<AppState>) -> impl IntoResponse {
    ApiSuccess::ok(JobService::list(&state), "Jobs retrieved successfully")
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job snapshot", body = ApiResponse<JobResponse>),
        (status = 404, description = "Job not found")
    ),
    tag = "Jobs"
)]
pub async fn get_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match JobService::query(&state, id) {
        Ok(res) => ApiSuccess::ok(res, "Job retrieved successfully").into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Start transcoding
/// Returns immediately; poll the job for progress
#[utoipa::path(
    post,
    path = "/api/v1/jobs/{id}/start",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 202, description = "Transcode started", body = ApiResponse<StartResponse>),
        (status = 404, description = "Job not found"),
        (status = 409, description = "Job is not in the uploaded state")
    ),
    tag = "Jobs"
)]
pub async fn start_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match JobService::start(&state, id) {
        Ok(res) => ApiSuccess::with_status(res, "Processing started", StatusCode::ACCEPTED).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/v1/jobs/{id}/download",
    params(
        ("id" = Uuid, Path, description = "Job ID"),
        DownloadQuery
    ),
    responses(
        (status = 200, description = "Rendition file", body = Vec<u8>, content_type = "video/mp4"),
        (status = 404, description = "Job, quality or file not found"),
        (status = 409, description = "Job has not completed")
    ),
    tag = "Jobs"
)]
pub async fn download_rendition(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DownloadQuery>,
) -> Response {
    let target = match JobService::resolve_download(&state, id, query.quality.as_deref()).await {
        Ok(target) => target,
        Err(e) => return ApiError::from(e).into_response(),
    };

    let file = match tokio::fs::File::open(&target.path).await {
        Ok(file) => file,
        Err(e) => {
            error!("Failed to open {}: {}", target.path.display(), e);
            return ApiError::new(StatusCode::NOT_FOUND, "Rendition could not be opened").into_response();
        }
    };
    let length = file.metadata().await.ok().map(|m| m.len());

    info!(job_id = %id, "⬇️ Serving {}", target.filename);

    let content_type = mime_guess::from_path(&target.path).first_or_octet_stream();
    let disposition = format!("attachment; filename=\"{}\"", target.filename.replace('"', "'"));

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type.as_ref())
        .header(header::CONTENT_DISPOSITION, disposition);
    if let Some(length) = length {
        builder = builder.header(header::CONTENT_LENGTH, length);
    }

    let body = Body::from_stream(ReaderStream::new(file));
    builder
        .body(body)
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

#[utoipa::path(
    delete,
    path = "/api/v1/jobs/{id}",
    params(
        ("id" = Uuid, Path, description = "Job ID")
    ),
    responses(
        (status = 200, description = "Job and artifacts deleted", body = ApiResponse<String>),
        (status = 404, description = "Job not found")
    ),
    tag = "Jobs"
)]
pub async fn delete_job(State(state): State<AppState>, Path(id): Path<Uuid>) -> impl IntoResponse {
    match JobService::delete(&state, id).await {
        Ok(()) => ApiSuccess::ok(id.to_string(), "Job deleted successfully").into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}
