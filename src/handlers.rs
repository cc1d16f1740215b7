use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Deserialize;
use validator::Validate;

use crate::{
    AppState,
    error::{ApiError, ApiResult, ErrorBody},
    matching::match_score,
    models::{
        Account, Application, Business, Course, CreateApplicationRequest, CreateBusinessRequest,
        CreateCourseRequest, CreateEmployerRequest, CreateGovernmentDepartmentRequest,
        CreateGovernmentProgramRequest, CreateJobRequest, CreateQualificationRequest,
        CreateSavedJobRequest, CreateTrainingInstitutionRequest, CreateUnionMemberRequest,
        CreateUnionRequest, CreateWorkerCourseRequest, CreateWorkerRequest, Employer,
        GovernmentDepartment, GovernmentProgram, Job, JobSearch, LoginRequest, NewApplication,
        NewUnionMember, NewUser, Page, PingResponse, Qualification, RegisterRequest, SavedJob,
        TrainingInstitution, Union, UnionMember, UserStats, Worker, WorkerCourse,
    },
    password,
    validation::{FilterQuery, PathParams, ValidatedJson},
};

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const DEFAULT_MEMBERSHIP_STATUS: &str = "active";
const DEFAULT_SEARCH_LIMIT: i64 = 20;

/// A created row, answered with `201 Created`.
type Created<T> = ApiResult<(StatusCode, Json<T>)>;

fn created<T>(value: T) -> Created<T> {
    Ok((StatusCode::CREATED, Json(value)))
}

// --- Filter Structs ---

/// UnionMemberFilter
///
/// Query parameters for GET /v1/workwise/union_members.
#[derive(Debug, Default, Deserialize, Validate, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UnionMemberFilter {
    /// Only memberships of this union.
    pub union_id: Option<i64>,
}

/// JobFilter
///
/// Query parameters for GET /v1/workwise/jobs. Without `limit` every matching job is
/// returned.
#[derive(Debug, Default, Deserialize, Validate, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JobFilter {
    /// Only jobs posted by this employer.
    pub employer_id: Option<i64>,
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub limit: Option<i64>,
    #[validate(range(min = 0, message = "cannot be negative"))]
    pub offset: Option<i64>,
}

/// JobSearchFilter
///
/// Query parameters for GET /v1/workwise/jobs/search. All given filters must match.
#[derive(Debug, Default, Deserialize, Validate, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct JobSearchFilter {
    /// Case-insensitive substring of the title or description.
    pub query: Option<String>,
    pub employment_type: Option<String>,
    pub work_arrangement: Option<String>,
    /// Case-insensitive substring of the location.
    pub location: Option<String>,
    /// Defaults to 20.
    #[validate(range(min = 1, max = 100, message = "must be between 1 and 100"))]
    pub limit: Option<i64>,
    #[validate(range(min = 0, message = "cannot be negative"))]
    pub offset: Option<i64>,
}

/// ApplicationFilter
///
/// Both parameters are optional and combine with AND.
#[derive(Debug, Default, Deserialize, Validate, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ApplicationFilter {
    pub job_id: Option<i64>,
    pub worker_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct WorkerCourseFilter {
    /// Only enrollments of this worker.
    pub worker_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize, Validate, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GovernmentProgramFilter {
    /// Only programs run by this department.
    pub department_id: Option<i64>,
}

// --- Path Parameters ---

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Path)]
pub struct UserPath {
    pub user_id: i64,
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Path)]
pub struct JobPath {
    pub job_id: i64,
}

/// Blank filter strings behave as if the parameter were absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

// --- Service ---

/// ping
///
/// [Public Route] Liveness check with the server's current time.
#[utoipa::path(
    get,
    path = "/v1/ping",
    tag = "service",
    responses((status = 200, description = "Service is up", body = PingResponse))
)]
pub async fn ping() -> Json<PingResponse> {
    Json(PingResponse {
        ok: true,
        ts: Utc::now(),
    })
}

// --- Accounts ---

/// create_account
///
/// [Protected Route] Registers a user. The password is hashed with Argon2id on the
/// blocking pool before anything is written; the stored hash never leaves the
/// repository.
#[utoipa::path(
    post,
    path = "/v1/workwise/account",
    tag = "accounts",
    request_body = RegisterRequest,
    security(("endpoint_token" = [])),
    responses(
        (status = 201, description = "Account created", body = Account),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody),
        (status = 409, description = "Username or email already exists", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn create_account(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Created<Account> {
    let RegisterRequest {
        username,
        email,
        password,
        role,
    } = payload;

    let password_hash = tokio::task::spawn_blocking(move || password::hash_password(&password))
        .await
        .map_err(|e| ApiError::internal(format!("password hashing task failed: {e}")))??;

    let user = state
        .repo
        .create_user(NewUser {
            username,
            email,
            password_hash,
            role,
        })
        .await?;

    tracing::info!(user_id = user.user_id, role = %user.role, "account created");

    created(Account::from(user))
}

/// login
///
/// [Protected Route] Checks a username-or-email and password pair. Unknown users,
/// wrong passwords and inactive accounts all answer with the same 401 so callers
/// cannot tell them apart.
#[utoipa::path(
    post,
    path = "/v1/workwise/user",
    tag = "accounts",
    request_body = LoginRequest,
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "Credentials accepted", body = Account),
        (status = 401, description = "Invalid credentials or endpoint token", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> ApiResult<Json<Account>> {
    let Some(user) = state.repo.find_user_by_login(&payload.username_or_email).await? else {
        tracing::info!("login failed: unknown user");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    };

    let hash = user.password_hash.clone();
    let password = payload.password;
    let verified = tokio::task::spawn_blocking(move || password::verify_password(&password, &hash))
        .await
        .map_err(|e| ApiError::internal(format!("password verification task failed: {e}")))??;

    if !verified || !user.is_active {
        tracing::info!(user_id = user.user_id, "login failed");
        return Err(ApiError::unauthorized(INVALID_CREDENTIALS));
    }

    tracing::info!(user_id = user.user_id, "login succeeded");
    Ok(Json(Account::from(user)))
}

// --- Profiles ---

/// list_workers
///
/// [Protected Route] Lists every worker profile, oldest first.
#[utoipa::path(
    get,
    path = "/v1/workwise/workers",
    tag = "workers",
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "All worker profiles", body = [Worker]),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody)
    )
)]
pub async fn list_workers(State(state): State<AppState>) -> ApiResult<Json<Vec<Worker>>> {
    Ok(Json(state.repo.list_workers().await?))
}

/// create_worker
///
/// [Protected Route] Attaches a worker profile to an existing user. One profile per
/// user.
#[utoipa::path(
    post,
    path = "/v1/workwise/workers",
    tag = "workers",
    request_body = CreateWorkerRequest,
    security(("endpoint_token" = [])),
    responses(
        (status = 201, description = "Worker profile created", body = Worker),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 409, description = "User already has a worker profile", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn create_worker(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateWorkerRequest>,
) -> Created<Worker> {
    let worker = state.repo.create_worker(payload).await?;
    tracing::info!(
        worker_id = worker.worker_id,
        user_id = worker.user_id,
        "worker profile created"
    );
    created(worker)
}

/// list_employers
///
/// [Protected Route] Lists every employer profile.
#[utoipa::path(
    get,
    path = "/v1/workwise/employers",
    tag = "employers",
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "All employer profiles", body = [Employer]),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody)
    )
)]
pub async fn list_employers(State(state): State<AppState>) -> ApiResult<Json<Vec<Employer>>> {
    Ok(Json(state.repo.list_employers().await?))
}

/// create_employer
///
/// [Protected Route] Attaches an employer profile to an existing user, one per user.
#[utoipa::path(
    post,
    path = "/v1/workwise/employers",
    tag = "employers",
    request_body = CreateEmployerRequest,
    security(("endpoint_token" = [])),
    responses(
        (status = 201, description = "Employer profile created", body = Employer),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 409, description = "User already has an employer profile", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn create_employer(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateEmployerRequest>,
) -> Created<Employer> {
    let employer = state.repo.create_employer(payload).await?;
    tracing::info!(employer_id = employer.employer_id, "employer profile created");
    created(employer)
}

// --- Unions ---

/// list_unions
///
/// [Protected Route] Lists every union with its current `membership_size`.
#[utoipa::path(
    get,
    path = "/v1/workwise/unions",
    tag = "unions",
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "All unions", body = [Union]),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody)
    )
)]
pub async fn list_unions(State(state): State<AppState>) -> ApiResult<Json<Vec<Union>>> {
    Ok(Json(state.repo.list_unions().await?))
}

/// create_union
///
/// [Protected Route] Registers a union. Its `membership_size` starts at 0 whatever
/// the client sends.
#[utoipa::path(
    post,
    path = "/v1/workwise/unions",
    tag = "unions",
    request_body = CreateUnionRequest,
    security(("endpoint_token" = [])),
    responses(
        (status = 201, description = "Union created", body = Union),
        (status = 409, description = "Registration number already exists", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn create_union(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUnionRequest>,
) -> Created<Union> {
    let union = state.repo.create_union(payload).await?;
    tracing::info!(
        union_id = union.union_id,
        register_num = %union.register_num,
        "union created"
    );
    created(union)
}

/// list_union_members
///
/// [Protected Route] Lists memberships oldest first, optionally for one union.
#[utoipa::path(
    get,
    path = "/v1/workwise/union_members",
    tag = "union_members",
    params(UnionMemberFilter),
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "Memberships, oldest first", body = [UnionMember]),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody),
        (status = 422, description = "Malformed filter", body = ErrorBody)
    )
)]
pub async fn list_union_members(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<UnionMemberFilter>,
) -> ApiResult<Json<Vec<UnionMember>>> {
    Ok(Json(state.repo.list_union_members(filter.union_id).await?))
}

/// add_union_member
///
/// [Protected Route] Enrolls a worker in a union and bumps the union's member count in
/// the same transaction. `membership_num` defaults to
/// `MEM-{worker}-{union}-{YYYYMMDD}` (UTC date) and `status` to `active`.
#[utoipa::path(
    post,
    path = "/v1/workwise/union_members",
    tag = "union_members",
    request_body = CreateUnionMemberRequest,
    security(("endpoint_token" = [])),
    responses(
        (status = 201, description = "Membership created", body = UnionMember),
        (status = 404, description = "Union or worker not found", body = ErrorBody),
        (status = 409, description = "Worker is already a member", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn add_union_member(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateUnionMemberRequest>,
) -> Created<UnionMember> {
    let membership_num = payload.membership_num.unwrap_or_else(|| {
        format!(
            "MEM-{}-{}-{}",
            payload.worker_id,
            payload.union_id,
            Utc::now().format("%Y%m%d")
        )
    });

    let member = state
        .repo
        .create_union_member(NewUnionMember {
            worker_id: payload.worker_id,
            union_id: payload.union_id,
            membership_num,
            status: payload
                .status
                .unwrap_or_else(|| DEFAULT_MEMBERSHIP_STATUS.to_string()),
        })
        .await?;

    tracing::info!(
        membership_id = member.membership_id,
        union_id = member.union_id,
        worker_id = member.worker_id,
        "union member added"
    );

    created(member)
}

// --- Jobs & Applications ---

/// list_jobs
///
/// [Protected Route] Lists jobs oldest first, optionally for one employer and within a
/// `limit`/`offset` window.
#[utoipa::path(
    get,
    path = "/v1/workwise/jobs",
    tag = "jobs",
    params(JobFilter),
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "Jobs, oldest first", body = [Job]),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody),
        (status = 422, description = "Malformed filter", body = ErrorBody)
    )
)]
pub async fn list_jobs(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<JobFilter>,
) -> ApiResult<Json<Vec<Job>>> {
    let page = Page {
        limit: filter.limit,
        offset: filter.offset.unwrap_or(0),
    };
    Ok(Json(state.repo.list_jobs(filter.employer_id, page).await?))
}

/// create_job
///
/// [Protected Route] Posts a job for an existing employer. `status` defaults to `open`.
#[utoipa::path(
    post,
    path = "/v1/workwise/jobs",
    tag = "jobs",
    request_body = CreateJobRequest,
    security(("endpoint_token" = [])),
    responses(
        (status = 201, description = "Job posted", body = Job),
        (status = 404, description = "Employer not found", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn create_job(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateJobRequest>,
) -> Created<Job> {
    let job = state.repo.create_job(payload).await?;
    tracing::info!(job_id = job.job_id, employer_id = job.employer_id, "job posted");
    created(job)
}

/// get_job_detail
///
/// [Protected Route] Retrieves a single job by id, whatever its status.
#[utoipa::path(
    get,
    path = "/v1/workwise/jobs/detail/{job_id}",
    tag = "jobs",
    params(JobPath),
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "The job", body = Job),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody),
        (status = 404, description = "Job not found", body = ErrorBody),
        (status = 422, description = "Malformed job id", body = ErrorBody)
    )
)]
pub async fn get_job_detail(
    State(state): State<AppState>,
    PathParams(path): PathParams<JobPath>,
) -> ApiResult<Json<Job>> {
    let job = state
        .repo
        .get_job(path.job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    Ok(Json(job))
}

/// search_jobs
///
/// [Protected Route] Searches open jobs, newest first. Blank filters are ignored and
/// `limit` defaults to 20.
#[utoipa::path(
    get,
    path = "/v1/workwise/jobs/search",
    tag = "jobs",
    params(JobSearchFilter),
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "Matching open jobs, newest first", body = [Job]),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody),
        (status = 422, description = "Malformed filter", body = ErrorBody)
    )
)]
pub async fn search_jobs(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<JobSearchFilter>,
) -> ApiResult<Json<Vec<Job>>> {
    let search = JobSearch {
        query: non_blank(filter.query),
        employment_type: non_blank(filter.employment_type),
        work_arrangement: non_blank(filter.work_arrangement),
        location: non_blank(filter.location),
        page: Page {
            limit: Some(filter.limit.unwrap_or(DEFAULT_SEARCH_LIMIT)),
            offset: filter.offset.unwrap_or(0),
        },
    };
    Ok(Json(state.repo.search_jobs(search).await?))
}

/// list_applications
///
/// [Protected Route] Lists applications oldest first, filtered by job and/or worker.
#[utoipa::path(
    get,
    path = "/v1/workwise/applications",
    tag = "applications",
    params(ApplicationFilter),
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "Applications, oldest first", body = [Application]),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody),
        (status = 422, description = "Malformed filter", body = ErrorBody)
    )
)]
pub async fn list_applications(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<ApplicationFilter>,
) -> ApiResult<Json<Vec<Application>>> {
    let applications = state
        .repo
        .list_applications(filter.job_id, filter.worker_id)
        .await?;
    Ok(Json(applications))
}

/// create_application
///
/// [Protected Route] Files a worker's application to a job. The match score is
/// computed from the worker's skills and the job's required skills at this moment and
/// stored with the row; the application starts as `pending`.
#[utoipa::path(
    post,
    path = "/v1/workwise/applications",
    tag = "applications",
    request_body = CreateApplicationRequest,
    security(("endpoint_token" = [])),
    responses(
        (status = 201, description = "Application filed", body = Application),
        (status = 404, description = "Worker or job not found", body = ErrorBody),
        (status = 409, description = "Worker already applied to this job", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn create_application(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateApplicationRequest>,
) -> Created<Application> {
    let worker = state
        .repo
        .get_worker(payload.worker_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Worker not found"))?;
    let job = state
        .repo
        .get_job(payload.job_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    let score = match_score(&worker.skills, &job.required_skills);

    let application = state
        .repo
        .create_application(NewApplication {
            worker_id: worker.worker_id,
            job_id: job.job_id,
            match_score: score,
            cover_letter: payload.cover_letter,
        })
        .await?;

    tracing::info!(
        application_id = application.application_id,
        match_score = application.match_score,
        "application filed"
    );

    created(application)
}

// --- Saved jobs & stats ---

/// list_saved_jobs
///
/// [Protected Route] Lists a user's saved jobs, most recently saved first.
#[utoipa::path(
    get,
    path = "/v1/workwise/saved-jobs/{user_id}",
    tag = "saved_jobs",
    params(UserPath),
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "Saved jobs, newest first", body = [SavedJob]),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody),
        (status = 422, description = "Malformed user id", body = ErrorBody)
    )
)]
pub async fn list_saved_jobs(
    State(state): State<AppState>,
    PathParams(path): PathParams<UserPath>,
) -> ApiResult<Json<Vec<SavedJob>>> {
    Ok(Json(state.repo.list_saved_jobs(path.user_id).await?))
}

/// save_job
///
/// [Protected Route] Bookmarks a job for a user. A job can be saved once per user.
#[utoipa::path(
    post,
    path = "/v1/workwise/saved-jobs/{user_id}",
    tag = "saved_jobs",
    params(UserPath),
    request_body = CreateSavedJobRequest,
    security(("endpoint_token" = [])),
    responses(
        (status = 201, description = "Job saved", body = SavedJob),
        (status = 404, description = "User or job not found", body = ErrorBody),
        (status = 409, description = "Job is already saved", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn save_job(
    State(state): State<AppState>,
    PathParams(path): PathParams<UserPath>,
    ValidatedJson(payload): ValidatedJson<CreateSavedJobRequest>,
) -> Created<SavedJob> {
    let saved = state
        .repo
        .create_saved_job(path.user_id, payload.job_id)
        .await?;
    tracing::info!(
        saved_job_id = saved.saved_job_id,
        user_id = saved.user_id,
        job_id = saved.job_id,
        "job saved"
    );
    created(saved)
}

/// get_user_stats
///
/// [Protected Route] Counts a user's applications (through their worker profile) and
/// saved jobs.
#[utoipa::path(
    get,
    path = "/v1/workwise/stats/{user_id}",
    tag = "stats",
    params(UserPath),
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "Activity counters", body = UserStats),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 422, description = "Malformed user id", body = ErrorBody)
    )
)]
pub async fn get_user_stats(
    State(state): State<AppState>,
    PathParams(path): PathParams<UserPath>,
) -> ApiResult<Json<UserStats>> {
    let stats = state
        .repo
        .user_stats(path.user_id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;
    Ok(Json(stats))
}

// --- Qualifications ---

/// list_qualifications
///
/// [Protected Route] Lists a user's qualifications, latest end date first. An unknown
/// user simply has none.
#[utoipa::path(
    get,
    path = "/v1/workwise/qualifications/{user_id}",
    tag = "qualifications",
    params(UserPath),
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "The user's qualifications", body = [Qualification]),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody),
        (status = 422, description = "Malformed user id", body = ErrorBody)
    )
)]
pub async fn list_qualifications(
    State(state): State<AppState>,
    PathParams(path): PathParams<UserPath>,
) -> ApiResult<Json<Vec<Qualification>>> {
    Ok(Json(state.repo.list_qualifications(path.user_id).await?))
}

/// add_qualification
///
/// [Protected Route] Records a qualification for a user. An `end_date` before the
/// `start_date` is rejected; a current qualification drops its `end_date`.
#[utoipa::path(
    post,
    path = "/v1/workwise/qualifications/{user_id}",
    tag = "qualifications",
    params(UserPath),
    request_body = CreateQualificationRequest,
    security(("endpoint_token" = [])),
    responses(
        (status = 201, description = "Qualification recorded", body = Qualification),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn add_qualification(
    State(state): State<AppState>,
    PathParams(path): PathParams<UserPath>,
    ValidatedJson(payload): ValidatedJson<CreateQualificationRequest>,
) -> Created<Qualification> {
    if let (Some(start), Some(end), false) =
        (payload.start_date, payload.end_date, payload.is_current)
    {
        if end < start {
            return Err(ApiError::invalid_field(
                "end_date",
                "cannot be before start_date",
            ));
        }
    }

    let qualification = state
        .repo
        .create_qualification(path.user_id, payload)
        .await?;
    tracing::info!(
        qualification_id = qualification.qualification_id,
        user_id = qualification.user_id,
        "qualification recorded"
    );
    created(qualification)
}

// --- Courses ---

/// list_courses
///
/// [Protected Route] Lists every course.
#[utoipa::path(
    get,
    path = "/v1/workwise/courses",
    tag = "courses",
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "All courses", body = [Course]),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody)
    )
)]
pub async fn list_courses(State(state): State<AppState>) -> ApiResult<Json<Vec<Course>>> {
    Ok(Json(state.repo.list_courses().await?))
}

/// create_course
///
/// [Protected Route] Creates a course, optionally offered by a training institution.
#[utoipa::path(
    post,
    path = "/v1/workwise/courses",
    tag = "courses",
    request_body = CreateCourseRequest,
    security(("endpoint_token" = [])),
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 404, description = "Training institution not found", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn create_course(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateCourseRequest>,
) -> Created<Course> {
    let course = state.repo.create_course(payload).await?;
    tracing::info!(course_id = course.course_id, "course created");
    created(course)
}

/// list_worker_courses
///
/// [Protected Route] Lists enrollments oldest first, optionally for one worker.
#[utoipa::path(
    get,
    path = "/v1/workwise/worker_courses",
    tag = "worker_courses",
    params(WorkerCourseFilter),
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "Enrollments, oldest first", body = [WorkerCourse]),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody),
        (status = 422, description = "Malformed filter", body = ErrorBody)
    )
)]
pub async fn list_worker_courses(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<WorkerCourseFilter>,
) -> ApiResult<Json<Vec<WorkerCourse>>> {
    Ok(Json(state.repo.list_worker_courses(filter.worker_id).await?))
}

/// enroll_worker
///
/// [Protected Route] Enrolls a worker in a course. `completed` is derived from
/// `progress == 100`.
#[utoipa::path(
    post,
    path = "/v1/workwise/worker_courses",
    tag = "worker_courses",
    request_body = CreateWorkerCourseRequest,
    security(("endpoint_token" = [])),
    responses(
        (status = 201, description = "Enrollment created", body = WorkerCourse),
        (status = 404, description = "Worker or course not found", body = ErrorBody),
        (status = 409, description = "Worker already enrolled", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn enroll_worker(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateWorkerCourseRequest>,
) -> Created<WorkerCourse> {
    let enrollment = state.repo.create_worker_course(payload).await?;
    tracing::info!(
        enrollment_id = enrollment.enrollment_id,
        worker_id = enrollment.worker_id,
        course_id = enrollment.course_id,
        "worker enrolled"
    );
    created(enrollment)
}

// --- Businesses ---

/// list_businesses
///
/// [Protected Route] Lists every registered business.
#[utoipa::path(
    get,
    path = "/v1/workwise/businesses",
    tag = "businesses",
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "All businesses", body = [Business]),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody)
    )
)]
pub async fn list_businesses(State(state): State<AppState>) -> ApiResult<Json<Vec<Business>>> {
    Ok(Json(state.repo.list_businesses().await?))
}

/// create_business
///
/// [Protected Route] Registers a business, optionally linked to an employer profile.
#[utoipa::path(
    post,
    path = "/v1/workwise/businesses",
    tag = "businesses",
    request_body = CreateBusinessRequest,
    security(("endpoint_token" = [])),
    responses(
        (status = 201, description = "Business registered", body = Business),
        (status = 404, description = "Employer not found", body = ErrorBody),
        (status = 409, description = "Registration number already exists", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn create_business(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateBusinessRequest>,
) -> Created<Business> {
    let business = state.repo.create_business(payload).await?;
    tracing::info!(business_id = business.business_id, "business registered");
    created(business)
}

// --- Government registries ---

/// list_governments
///
/// [Protected Route] Lists every government department.
#[utoipa::path(
    get,
    path = "/v1/workwise/governments",
    tag = "governments",
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "All government departments", body = [GovernmentDepartment]),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody)
    )
)]
pub async fn list_governments(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<GovernmentDepartment>>> {
    Ok(Json(state.repo.list_government_departments().await?))
}

/// create_government
///
/// [Protected Route] Registers a government department. Names are unique.
#[utoipa::path(
    post,
    path = "/v1/workwise/governments",
    tag = "governments",
    request_body = CreateGovernmentDepartmentRequest,
    security(("endpoint_token" = [])),
    responses(
        (status = 201, description = "Department registered", body = GovernmentDepartment),
        (status = 409, description = "Department name already exists", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn create_government(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateGovernmentDepartmentRequest>,
) -> Created<GovernmentDepartment> {
    let department = state.repo.create_government_department(payload).await?;
    tracing::info!(
        department_id = department.department_id,
        "government department registered"
    );
    created(department)
}

/// list_government_programs
///
/// [Protected Route] Lists programs oldest first, optionally for one department.
#[utoipa::path(
    get,
    path = "/v1/workwise/government_programs",
    tag = "government_programs",
    params(GovernmentProgramFilter),
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "Programs, oldest first", body = [GovernmentProgram]),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody),
        (status = 422, description = "Malformed filter", body = ErrorBody)
    )
)]
pub async fn list_government_programs(
    State(state): State<AppState>,
    FilterQuery(filter): FilterQuery<GovernmentProgramFilter>,
) -> ApiResult<Json<Vec<GovernmentProgram>>> {
    let programs = state
        .repo
        .list_government_programs(filter.department_id)
        .await?;
    Ok(Json(programs))
}

/// create_government_program
///
/// [Protected Route] Creates a program run by an existing department.
#[utoipa::path(
    post,
    path = "/v1/workwise/government_programs",
    tag = "government_programs",
    request_body = CreateGovernmentProgramRequest,
    security(("endpoint_token" = [])),
    responses(
        (status = 201, description = "Program created", body = GovernmentProgram),
        (status = 404, description = "Department not found", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn create_government_program(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateGovernmentProgramRequest>,
) -> Created<GovernmentProgram> {
    let program = state.repo.create_government_program(payload).await?;
    tracing::info!(
        program_id = program.program_id,
        department_id = program.department_id,
        "government program created"
    );
    created(program)
}

/// list_training_institutions
///
/// [Protected Route] Lists every training institution.
#[utoipa::path(
    get,
    path = "/v1/workwise/training_institutions",
    tag = "training_institutions",
    security(("endpoint_token" = [])),
    responses(
        (status = 200, description = "All training institutions", body = [TrainingInstitution]),
        (status = 401, description = "Missing or invalid endpoint token", body = ErrorBody)
    )
)]
pub async fn list_training_institutions(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<TrainingInstitution>>> {
    Ok(Json(state.repo.list_training_institutions().await?))
}

/// create_training_institution
///
/// [Protected Route] Registers a training institution. Accreditation numbers are
/// unique when given.
#[utoipa::path(
    post,
    path = "/v1/workwise/training_institutions",
    tag = "training_institutions",
    request_body = CreateTrainingInstitutionRequest,
    security(("endpoint_token" = [])),
    responses(
        (status = 201, description = "Institution registered", body = TrainingInstitution),
        (status = 409, description = "Accreditation number already exists", body = ErrorBody),
        (status = 422, description = "Invalid payload", body = ErrorBody)
    )
)]
pub async fn create_training_institution(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<CreateTrainingInstitutionRequest>,
) -> Created<TrainingInstitution> {
    let institution = state.repo.create_training_institution(payload).await?;
    tracing::info!(
        institution_id = institution.institution_id,
        "training institution registered"
    );
    created(institution)
}
