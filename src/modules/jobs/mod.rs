use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};

pub mod collector;
pub mod dto;
pub mod handler;
pub mod ladder;
pub mod model;
pub mod repository;
pub mod service;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/jobs", get(handler::list_jobs).post(handler::submit_job))
        .route("/jobs/{id}", get(handler::get_job).delete(handler::delete_job))
        .route("/jobs/{id}/start", post(handler::start_job))
        .route("/jobs/{id}/download", get(handler::download_rendition))
}
