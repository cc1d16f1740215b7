use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Protected Router Module
///
/// The Workwise resource routes. Every (method, path) pair here has an entry in the
/// endpoint token table; the gate layered on this router resolves the pair from the
/// matched route template and rejects the request with 401 before the handler (and
/// its body extractor) runs.
///
/// Most collections share one shape: GET lists rows oldest first, optionally filtered
/// by a parent id, and POST validates, inserts and returns the new row with 201.
/// Per-user collections take the user id from the path instead.
pub fn protected_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Accounts ---
        // POST /v1/workwise/account
        // Registration. Stores an Argon2id hash of the password.
        .route("/v1/workwise/account", post(handlers::create_account))
        // POST /v1/workwise/user
        // Login by username or email.
        .route("/v1/workwise/user", post(handlers::login))
        // --- Profiles ---
        .route(
            "/v1/workwise/workers",
            get(handlers::list_workers).post(handlers::create_worker),
        )
        .route(
            "/v1/workwise/employers",
            get(handlers::list_employers).post(handlers::create_employer),
        )
        // --- Unions ---
        .route(
            "/v1/workwise/unions",
            get(handlers::list_unions).post(handlers::create_union),
        )
        // GET ?union_id= / POST increments the union's membership_size.
        .route(
            "/v1/workwise/union_members",
            get(handlers::list_union_members).post(handlers::add_union_member),
        )
        // --- Jobs & Applications ---
        .route(
            "/v1/workwise/jobs",
            get(handlers::list_jobs).post(handlers::create_job),
        )
        // GET ?employer_id=&limit=&offset= is paged; search covers open jobs only.
        .route("/v1/workwise/jobs/search", get(handlers::search_jobs))
        .route("/v1/workwise/jobs/detail/{job_id}", get(handlers::get_job_detail))
        // GET ?job_id=&worker_id= / POST computes the match score.
        .route(
            "/v1/workwise/applications",
            get(handlers::list_applications).post(handlers::create_application),
        )
        // --- Per-user collections ---
        .route(
            "/v1/workwise/saved-jobs/{user_id}",
            get(handlers::list_saved_jobs).post(handlers::save_job),
        )
        .route(
            "/v1/workwise/qualifications/{user_id}",
            get(handlers::list_qualifications).post(handlers::add_qualification),
        )
        .route("/v1/workwise/stats/{user_id}", get(handlers::get_user_stats))
        // --- Courses ---
        .route(
            "/v1/workwise/courses",
            get(handlers::list_courses).post(handlers::create_course),
        )
        // GET ?worker_id=
        .route(
            "/v1/workwise/worker_courses",
            get(handlers::list_worker_courses).post(handlers::enroll_worker),
        )
        // --- Businesses ---
        .route(
            "/v1/workwise/businesses",
            get(handlers::list_businesses).post(handlers::create_business),
        )
        // --- Government registries ---
        .route(
            "/v1/workwise/governments",
            get(handlers::list_governments).post(handlers::create_government),
        )
        // GET ?department_id=
        .route(
            "/v1/workwise/government_programs",
            get(handlers::list_government_programs).post(handlers::create_government_program),
        )
        .route(
            "/v1/workwise/training_institutions",
            get(handlers::list_training_institutions)
                .post(handlers::create_training_institution),
        )
}
