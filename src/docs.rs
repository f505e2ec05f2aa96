use crate::modules::jobs::dto::{JobResponse, JobSummary, StartResponse, SubmitResponse};
use crate::modules::jobs::model::{JobStatus, Rendition};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::modules::jobs::handler::submit_job,
        crate::modules::jobs::handler::list_jobs,
        crate::modules::jobs::handler::get_job,
        crate::modules::jobs::handler::start_job,
        crate::modules::jobs::handler::download_rendition,
        crate::modules::jobs::handler::delete_job,
    ),
    components(
        schemas(
            JobStatus, Rendition, SubmitResponse, StartResponse, JobSummary, JobResponse,
        )
    ),
    tags(
        (name = "Jobs", description = "Rendition ladder transcoding jobs")
    )
)]
pub struct ApiDoc;
