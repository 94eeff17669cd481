pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::jobs::handlers as jobs;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Favorites
        .route(
            "/api/v1/jobs/favorites",
            get(jobs::handle_list_favorites)
                .post(jobs::handle_favorite)
                .delete(jobs::handle_clear_favorites),
        )
        .route(
            "/api/v1/jobs/favorites/remove",
            post(jobs::handle_unfavorite),
        )
        .route(
            "/api/v1/jobs/favorites/check",
            post(jobs::handle_check_favorite),
        )
        // Applied
        .route(
            "/api/v1/jobs/applied",
            get(jobs::handle_list_applied)
                .post(jobs::handle_apply)
                .delete(jobs::handle_clear_applied),
        )
        .route("/api/v1/jobs/applied/remove", post(jobs::handle_unapply))
        .route(
            "/api/v1/jobs/applied/check",
            post(jobs::handle_check_applied),
        )
        .route(
            "/api/v1/jobs/applied/stats",
            get(jobs::handle_applied_stats),
        )
        // Resumes
        .route("/api/v1/resumes", get(analysis::handle_list_resumes))
        .route(
            "/api/v1/resumes/:id/parse",
            post(analysis::handle_parse_resume),
        )
        .route(
            "/api/v1/resumes/:id/text",
            post(analysis::handle_extract_text),
        )
        // Analysis
        .route("/api/v1/analysis/compare", post(analysis::handle_compare))
        .with_state(state)
}
