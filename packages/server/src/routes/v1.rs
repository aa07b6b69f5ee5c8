use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::config::AppConfig;
use crate::handlers;
use crate::state::AppState;

pub fn routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    OpenApiRouter::new().nest("/resume", resume_routes(config))
}

fn resume_routes(config: &AppConfig) -> OpenApiRouter<AppState> {
    let read = OpenApiRouter::new()
        .routes(routes!(handlers::resume::list_resumes))
        .routes(routes!(handlers::resume::view_resume))
        .routes(routes!(handlers::resume::download_resume))
        .routes(routes!(handlers::resume::delete_resume));

    let upload = OpenApiRouter::new()
        .routes(routes!(handlers::resume::upload_resume))
        .layer(handlers::resume::upload_body_limit(
            config.storage.max_file_size,
        ));

    read.merge(upload)
}
