use axum::{
    Router,
    extract::{FromRef, Request},
    http::HeaderName,
    middleware::{self, Next},
    response::Response,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod matching;
pub mod models;
pub mod password;
pub mod repository;
pub mod validation;

// Public (ungated) and protected (token-gated) route tables.
pub mod routes;
use auth::EndpointAccess;
use routes::{protected, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::{ApiError, ApiResult};
pub use repository::{RepositoryState, SqliteRepository};

/// ApiDoc
///
/// Generated OpenAPI document for every route, served as JSON at
/// `/api-docs/openapi.json` and rendered at `/swagger-ui`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::ping,
        handlers::create_account, handlers::login,
        handlers::list_workers, handlers::create_worker,
        handlers::list_employers, handlers::create_employer,
        handlers::list_unions, handlers::create_union,
        handlers::list_union_members, handlers::add_union_member,
        handlers::list_jobs, handlers::create_job,
        handlers::get_job_detail, handlers::search_jobs,
        handlers::list_applications, handlers::create_application,
        handlers::list_saved_jobs, handlers::save_job, handlers::get_user_stats,
        handlers::list_qualifications, handlers::add_qualification,
        handlers::list_courses, handlers::create_course,
        handlers::list_worker_courses, handlers::enroll_worker,
        handlers::list_businesses, handlers::create_business,
        handlers::list_governments, handlers::create_government,
        handlers::list_government_programs, handlers::create_government_program,
        handlers::list_training_institutions, handlers::create_training_institution,
    ),
    components(
        schemas(
            models::Account, models::RegisterRequest, models::LoginRequest,
            models::Worker, models::CreateWorkerRequest,
            models::Employer, models::CreateEmployerRequest,
            models::Union, models::CreateUnionRequest,
            models::UnionMember, models::CreateUnionMemberRequest,
            models::Job, models::CreateJobRequest,
            models::Application, models::ApplicationStatus, models::CreateApplicationRequest,
            models::SavedJob, models::CreateSavedJobRequest, models::UserStats,
            models::Qualification, models::CreateQualificationRequest,
            models::Business, models::CreateBusinessRequest,
            models::Course, models::CreateCourseRequest,
            models::WorkerCourse, models::CreateWorkerCourseRequest,
            models::GovernmentDepartment, models::CreateGovernmentDepartmentRequest,
            models::GovernmentProgram, models::CreateGovernmentProgramRequest,
            models::TrainingInstitution, models::CreateTrainingInstitutionRequest,
            models::PingResponse, error::ErrorBody, error::FieldViolation,
        )
    ),
    modifiers(&EndpointTokenScheme),
    tags(
        (name = "workwise", description = "Workwise labor marketplace API")
    )
)]
struct ApiDoc;

/// Registers the `X-Endpoint-Token` header as the `endpoint_token` security scheme
/// referenced by the protected paths.
struct EndpointTokenScheme;

impl Modify for EndpointTokenScheme {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "endpoint_token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("X-Endpoint-Token"))),
        );
    }
}

/// AppState
///
/// The single shared container handed to every route: the repository and the loaded
/// configuration (which carries the endpoint token table). Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub repo: RepositoryState,
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// require_endpoint_token
///
/// Middleware guarding the protected routes. All the work happens in the
/// `EndpointAccess` extractor: if the request's `X-Endpoint-Token` does not match the
/// token configured for the matched route, extraction fails with 401 and the handler
/// is never called, so nothing is parsed or persisted.
async fn require_endpoint_token(
    _access: EndpointAccess,
    request: Request,
    next: Next,
) -> Response {
    next.run(request).await
}

/// create_router
///
/// Assembles the routing table, applies the token gate to the protected routes and
/// wraps everything in the observability layers.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        // route_layer: the gate only runs for requests that matched a protected route,
        // so MatchedPath is always present.
        .merge(
            protected::protected_routes().route_layer(middleware::from_fn_with_state(
                state.clone(),
                require_endpoint_token,
            )),
        )
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Builds the per-request span so every log line of a request carries its method,
/// URI and `x-request-id`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
