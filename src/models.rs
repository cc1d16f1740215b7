use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::{
    validate_job_status, validate_role, validate_skills, validate_work_arrangement,
};

// --- Accounts ---

/// User
///
/// The canonical account row from the `users` table. Internal only: it carries the
/// password hash, so it is never serialized. Handlers respond with [`Account`].
#[derive(Debug, Clone, FromRow, Default)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    // 'worker' or 'employer'.
    pub role: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Account
///
/// Public view of a [`User`], returned by registration and login.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct Account {
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    pub is_active: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

impl From<User> for Account {
    fn from(user: User) -> Self {
        Self {
            user_id: user.user_id,
            username: user.username,
            email: user.email,
            role: user.role,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// RegisterRequest
///
/// Input payload for account creation (POST /v1/workwise/account).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 50, message = "must be between 3 and 50 characters"))]
    pub username: String,
    #[validate(email(message = "must be a valid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
    #[schema(example = "worker")]
    #[validate(custom(function = "validate_role"))]
    pub role: String,
}

/// LoginRequest
///
/// Input payload for login (POST /v1/workwise/user). Either the username or the
/// email identifies the account.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct LoginRequest {
    #[serde(alias = "usernameOrEmail")]
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub username_or_email: String,
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub password: String,
}

/// NewUser
///
/// Repository input for account creation; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
}

// --- Profiles ---

/// Worker
///
/// Worker profile. Extends a [`User`] by reference (`user_id`), one profile per user.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Worker {
    pub worker_id: i64,
    pub user_id: i64,
    pub bio: Option<String>,
    pub experience_years: i64,
    // Stored as a JSON array in a TEXT column.
    #[sqlx(json)]
    pub skills: Vec<String>,
    pub location: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateWorkerRequest {
    pub user_id: i64,
    pub bio: Option<String>,
    #[serde(default)]
    #[validate(range(min = 0, message = "cannot be negative"))]
    pub experience_years: i64,
    #[serde(default)]
    #[validate(custom(function = "validate_skills"))]
    pub skills: Vec<String>,
    pub location: Option<String>,
}

/// Employer
///
/// Employer profile, one per user.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Employer {
    pub employer_id: i64,
    pub user_id: i64,
    pub company_name: String,
    pub company_description: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateEmployerRequest {
    pub user_id: i64,
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub company_name: String,
    pub company_description: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
}

// --- Unions ---

/// Union
///
/// `membership_size` is a cached count of this union's `union_members` rows. It starts
/// at zero and only moves when a membership is created.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Union {
    pub union_id: i64,
    pub name: String,
    pub register_num: String,
    pub sector_info: String,
    pub membership_size: i64,
    pub is_active_council: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// CreateUnionRequest
///
/// There is deliberately no `membership_size` field: the count is derived from
/// membership rows and any value a client sends is ignored.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateUnionRequest {
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub name: String,
    #[schema(example = "REG-2025-008")]
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub register_num: String,
    #[schema(example = "Education")]
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub sector_info: String,
    #[serde(default)]
    pub is_active_council: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct UnionMember {
    pub membership_id: i64,
    pub worker_id: i64,
    pub union_id: i64,
    pub membership_num: String,
    pub status: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// CreateUnionMemberRequest
///
/// `membership_num` defaults to `MEM-{worker_id}-{union_id}-{YYYYMMDD}` and `status`
/// to `active` when omitted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateUnionMemberRequest {
    pub worker_id: i64,
    pub union_id: i64,
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub membership_num: Option<String>,
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub status: Option<String>,
}

/// Repository input for a membership with defaults already resolved.
#[derive(Debug, Clone)]
pub struct NewUnionMember {
    pub worker_id: i64,
    pub union_id: i64,
    pub membership_num: String,
    pub status: String,
}

// --- Jobs & Applications ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Job {
    pub job_id: i64,
    pub employer_id: i64,
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    pub employment_type: Option<String>,
    // 'onsite', 'remote' or 'hybrid'.
    pub work_arrangement: Option<String>,
    pub salary_min: Option<f64>,
    pub salary_max: Option<f64>,
    #[sqlx(json)]
    pub required_skills: Vec<String>,
    // 'open' or 'closed'.
    pub status: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateJobRequest {
    pub employer_id: i64,
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub title: String,
    pub description: Option<String>,
    pub location: Option<String>,
    #[schema(example = "full-time")]
    pub employment_type: Option<String>,
    #[schema(example = "hybrid")]
    #[validate(custom(function = "validate_work_arrangement"))]
    pub work_arrangement: Option<String>,
    #[validate(range(min = 0.0, message = "cannot be negative"))]
    pub salary_min: Option<f64>,
    #[validate(range(min = 0.0, message = "cannot be negative"))]
    pub salary_max: Option<f64>,
    #[serde(default)]
    #[validate(custom(function = "validate_skills"))]
    pub required_skills: Vec<String>,
    // Defaults to 'open'.
    #[validate(custom(function = "validate_job_status"))]
    pub status: Option<String>,
}

/// JobSearch
///
/// Repository input for the job search. Every `Some` filter must match; only open
/// jobs are considered.
#[derive(Debug, Clone, Default)]
pub struct JobSearch {
    pub query: Option<String>,
    pub employment_type: Option<String>,
    pub work_arrangement: Option<String>,
    pub location: Option<String>,
    pub page: Page,
}

/// Page
///
/// A result window. `limit: None` means no upper bound.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: Option<i64>,
    pub offset: i64,
}

/// SavedJob
///
/// A user's bookmark of a job, listed together with the job's title, location and
/// the posting employer's company name.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct SavedJob {
    pub saved_job_id: i64,
    pub user_id: i64,
    pub job_id: i64,
    pub job_title: String,
    pub company_name: String,
    pub job_location: Option<String>,
    #[ts(type = "string")]
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateSavedJobRequest {
    pub job_id: i64,
}

/// ApplicationStatus
///
/// Lifecycle of an [`Application`]. Creation always yields `Pending`; no route
/// moves an application to the other states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Application {
    pub application_id: i64,
    pub worker_id: i64,
    pub job_id: i64,
    // 0-100, computed from skill overlap when the application is created.
    pub match_score: i64,
    pub status: String,
    pub cover_letter: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateApplicationRequest {
    pub worker_id: i64,
    pub job_id: i64,
    pub cover_letter: Option<String>,
}

/// Repository input for an application whose score has been computed.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub worker_id: i64,
    pub job_id: i64,
    pub match_score: i64,
    pub cover_letter: Option<String>,
}

// --- Courses ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Course {
    pub course_id: i64,
    pub institution_id: Option<i64>,
    pub title: String,
    pub description: Option<String>,
    pub cost: f64,
    #[sqlx(json)]
    pub skills: Vec<String>,
    pub duration_weeks: Option<i64>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateCourseRequest {
    #[schema(example = "Welding")]
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub title: String,
    pub description: Option<String>,
    #[schema(example = 100)]
    #[validate(range(min = 0.0, message = "cannot be negative"))]
    pub cost: f64,
    #[serde(default)]
    #[validate(custom(function = "validate_skills"))]
    pub skills: Vec<String>,
    #[validate(range(min = 1, message = "must be at least 1"))]
    pub duration_weeks: Option<i64>,
    pub institution_id: Option<i64>,
}

/// WorkerCourse
///
/// A worker's enrollment in a course. `completed` is true exactly when `progress` is 100.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct WorkerCourse {
    pub enrollment_id: i64,
    pub worker_id: i64,
    pub course_id: i64,
    pub progress: i64,
    pub completed: bool,
    #[ts(type = "string")]
    pub enrolled_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateWorkerCourseRequest {
    pub worker_id: i64,
    pub course_id: i64,
    #[serde(default)]
    #[validate(range(min = 0, max = 100, message = "must be between 0 and 100"))]
    pub progress: i64,
}

// --- Qualifications ---

/// Qualification
///
/// An academic or vocational qualification held by a user. A current qualification
/// never carries an `end_date`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Qualification {
    pub qualification_id: i64,
    pub user_id: i64,
    pub qualification_type: String,
    pub institution: String,
    pub field_of_study: Option<String>,
    pub qualification_name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub is_current: bool,
    pub grade_or_gpa: Option<String>,
    pub description: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// CreateQualificationRequest
///
/// Input payload for POST /v1/workwise/qualifications/{user_id}. Dates are
/// `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateQualificationRequest {
    #[schema(example = "Diploma")]
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub qualification_type: String,
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub institution: String,
    pub field_of_study: Option<String>,
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub qualification_name: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    pub is_current: bool,
    pub grade_or_gpa: Option<String>,
    pub description: Option<String>,
}

/// UserStats
///
/// Activity counters for one user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserStats {
    // Applications filed through the user's worker profile.
    pub applications_count: i64,
    pub saved_jobs_count: i64,
}

// --- Businesses ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Business {
    pub business_id: i64,
    pub employer_id: Option<i64>,
    pub name: String,
    pub registration_number: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// CreateBusinessRequest
///
/// `employer_id`, when given, links the business to an existing employer profile.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateBusinessRequest {
    pub employer_id: Option<i64>,
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub name: String,
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub registration_number: Option<String>,
    pub industry: Option<String>,
    pub location: Option<String>,
    pub description: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub contact_email: Option<String>,
}

// --- Government registries ---

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct GovernmentDepartment {
    pub department_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub contact_email: Option<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateGovernmentDepartmentRequest {
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(email(message = "must be a valid email address"))]
    pub contact_email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct GovernmentProgram {
    pub program_id: i64,
    pub department_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub eligibility_criteria: Option<String>,
    #[sqlx(json)]
    pub skills_focus: Vec<String>,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateGovernmentProgramRequest {
    pub department_id: i64,
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub name: String,
    pub description: Option<String>,
    pub eligibility_criteria: Option<String>,
    #[serde(default)]
    #[validate(custom(function = "validate_skills"))]
    pub skills_focus: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct TrainingInstitution {
    pub institution_id: i64,
    pub name: String,
    pub accreditation_body: Option<String>,
    pub accreditation_number: Option<String>,
    pub location: Option<String>,
    pub is_accredited: bool,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Validate)]
#[ts(export)]
pub struct CreateTrainingInstitutionRequest {
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub name: String,
    pub accreditation_body: Option<String>,
    #[validate(length(min = 1, message = "cannot be empty"))]
    pub accreditation_number: Option<String>,
    pub location: Option<String>,
    #[serde(default)]
    pub is_accredited: bool,
}

// --- Service ---

/// PingResponse
///
/// Liveness payload for GET /v1/ping.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct PingResponse {
    pub ok: bool,
    #[ts(type = "string")]
    pub ts: DateTime<Utc>,
}
