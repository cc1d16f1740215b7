use std::collections::HashMap;

use axum::{
    extract::{FromRef, FromRequestParts, MatchedPath},
    http::{Method, request::Parts},
};
use subtle::ConstantTimeEq;

use crate::{config::AppConfig, error::ApiError};

/// Header every protected route reads its shared secret from.
pub const ENDPOINT_TOKEN_HEADER: &str = "x-endpoint-token";

const INVALID_TOKEN: &str = "Missing or invalid endpoint token";

/// Endpoint
///
/// Every token-gated (method, path) pair served by the API. The gate resolves the
/// incoming request to one of these and looks up the secret configured for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    CreateAccount,
    Login,
    ListUnions,
    CreateUnion,
    ListUnionMembers,
    CreateUnionMember,
    ListWorkers,
    CreateWorker,
    ListEmployers,
    CreateEmployer,
    ListJobs,
    CreateJob,
    ListApplications,
    CreateApplication,
    ListCourses,
    CreateCourse,
    ListWorkerCourses,
    CreateWorkerCourse,
    ListGovernments,
    CreateGovernment,
    ListGovernmentPrograms,
    CreateGovernmentProgram,
    ListTrainingInstitutions,
    CreateTrainingInstitution,
    JobDetail,
    SearchJobs,
    ListQualifications,
    CreateQualification,
    UserStats,
    ListSavedJobs,
    SaveJob,
    ListBusinesses,
    CreateBusiness,
}

/// Prefix shared by every protected route.
const API_PREFIX: &str = "/v1/workwise/";

impl Endpoint {
    pub const ALL: [Endpoint; 33] = [
        Endpoint::CreateAccount,
        Endpoint::Login,
        Endpoint::ListUnions,
        Endpoint::CreateUnion,
        Endpoint::ListUnionMembers,
        Endpoint::CreateUnionMember,
        Endpoint::ListWorkers,
        Endpoint::CreateWorker,
        Endpoint::ListEmployers,
        Endpoint::CreateEmployer,
        Endpoint::ListJobs,
        Endpoint::CreateJob,
        Endpoint::ListApplications,
        Endpoint::CreateApplication,
        Endpoint::ListCourses,
        Endpoint::CreateCourse,
        Endpoint::ListWorkerCourses,
        Endpoint::CreateWorkerCourse,
        Endpoint::ListGovernments,
        Endpoint::CreateGovernment,
        Endpoint::ListGovernmentPrograms,
        Endpoint::CreateGovernmentProgram,
        Endpoint::ListTrainingInstitutions,
        Endpoint::CreateTrainingInstitution,
        Endpoint::JobDetail,
        Endpoint::SearchJobs,
        Endpoint::ListQualifications,
        Endpoint::CreateQualification,
        Endpoint::UserStats,
        Endpoint::ListSavedJobs,
        Endpoint::SaveJob,
        Endpoint::ListBusinesses,
        Endpoint::CreateBusiness,
    ];

    pub fn method(self) -> Method {
        match self {
            Endpoint::ListUnions
            | Endpoint::ListUnionMembers
            | Endpoint::ListWorkers
            | Endpoint::ListEmployers
            | Endpoint::ListJobs
            | Endpoint::ListApplications
            | Endpoint::ListCourses
            | Endpoint::ListWorkerCourses
            | Endpoint::ListGovernments
            | Endpoint::ListGovernmentPrograms
            | Endpoint::ListTrainingInstitutions
            | Endpoint::JobDetail
            | Endpoint::SearchJobs
            | Endpoint::ListQualifications
            | Endpoint::UserStats
            | Endpoint::ListSavedJobs
            | Endpoint::ListBusinesses => Method::GET,
            _ => Method::POST,
        }
    }

    /// The route template as registered on the router.
    pub fn path(self) -> &'static str {
        match self {
            Endpoint::CreateAccount => "/v1/workwise/account",
            Endpoint::Login => "/v1/workwise/user",
            Endpoint::ListUnions | Endpoint::CreateUnion => "/v1/workwise/unions",
            Endpoint::ListUnionMembers | Endpoint::CreateUnionMember => {
                "/v1/workwise/union_members"
            }
            Endpoint::ListWorkers | Endpoint::CreateWorker => "/v1/workwise/workers",
            Endpoint::ListEmployers | Endpoint::CreateEmployer => "/v1/workwise/employers",
            Endpoint::ListJobs | Endpoint::CreateJob => "/v1/workwise/jobs",
            Endpoint::ListApplications | Endpoint::CreateApplication => {
                "/v1/workwise/applications"
            }
            Endpoint::ListCourses | Endpoint::CreateCourse => "/v1/workwise/courses",
            Endpoint::ListWorkerCourses | Endpoint::CreateWorkerCourse => {
                "/v1/workwise/worker_courses"
            }
            Endpoint::ListGovernments | Endpoint::CreateGovernment => "/v1/workwise/governments",
            Endpoint::ListGovernmentPrograms | Endpoint::CreateGovernmentProgram => {
                "/v1/workwise/government_programs"
            }
            Endpoint::ListTrainingInstitutions | Endpoint::CreateTrainingInstitution => {
                "/v1/workwise/training_institutions"
            }
            Endpoint::JobDetail => "/v1/workwise/jobs/detail/{job_id}",
            Endpoint::SearchJobs => "/v1/workwise/jobs/search",
            Endpoint::ListQualifications | Endpoint::CreateQualification => {
                "/v1/workwise/qualifications/{user_id}"
            }
            Endpoint::UserStats => "/v1/workwise/stats/{user_id}",
            Endpoint::ListSavedJobs | Endpoint::SaveJob => "/v1/workwise/saved-jobs/{user_id}",
            Endpoint::ListBusinesses | Endpoint::CreateBusiness => "/v1/workwise/businesses",
        }
    }

    /// Token shipped with the service. Deployments override these through the
    /// environment (see [`Endpoint::env_key`]).
    pub fn default_token(self) -> &'static str {
        match self {
            Endpoint::CreateAccount => "USNACCTOK123",
            Endpoint::Login => "USNDPNQNKW",
            Endpoint::ListUnions => "UNIONLISTTOK456",
            Endpoint::CreateUnion => "UNIONCREATETOK789",
            Endpoint::ListUnionMembers => "MEMBERLISTTOK012",
            Endpoint::CreateUnionMember => "MEMBERADDTOK345",
            Endpoint::ListWorkers => "WORKERLISTTOK101",
            Endpoint::CreateWorker => "WORKERADDTOK102",
            Endpoint::ListEmployers => "EMPLOYERLISTTOK201",
            Endpoint::CreateEmployer => "EMPLOYERADDTOK202",
            Endpoint::ListJobs => "JOBLISTTOK333",
            Endpoint::CreateJob => "JOBADDTOK222",
            Endpoint::ListApplications => "APPLISTTOK301",
            Endpoint::CreateApplication => "APPADDTOK302",
            Endpoint::ListCourses => "COURSELISTTOK401",
            Endpoint::CreateCourse => "COURSEADDTOK402",
            Endpoint::ListWorkerCourses => "ENROLLLISTTOK501",
            Endpoint::CreateWorkerCourse => "ENROLLADDTOK502",
            Endpoint::ListGovernments => "GOVLISTTOK601",
            Endpoint::CreateGovernment => "GOVADDTOK602",
            Endpoint::ListGovernmentPrograms => "PROGRAMLISTTOK701",
            Endpoint::CreateGovernmentProgram => "PROGRAMADDTOK702",
            Endpoint::ListTrainingInstitutions => "INSTLISTTOK801",
            Endpoint::CreateTrainingInstitution => "INSTADDTOK802",
            Endpoint::JobDetail => "JOBDETAILTOK444",
            Endpoint::SearchJobs => "JOBSEARCHTOK555",
            Endpoint::ListQualifications => "QUALLISTTOK567",
            Endpoint::CreateQualification => "QUALADDTOK890",
            Endpoint::UserStats => "STATSTOK789",
            Endpoint::ListSavedJobs => "SAVEDLISTTOK012",
            Endpoint::SaveJob => "SAVEDADDTOK345",
            Endpoint::ListBusinesses => "BUSILISTTOK110",
            Endpoint::CreateBusiness => "BUSIADDTOK111",
        }
    }

    /// Environment variable overriding this endpoint's token, e.g.
    /// `WORKWISE_TOKEN_POST_COURSES` or `WORKWISE_TOKEN_GET_JOBS_DETAIL`.
    /// Path parameters are left out of the resource name.
    pub fn env_key(self) -> String {
        let path = self.path();
        let resource = path
            .strip_prefix(API_PREFIX)
            .unwrap_or(path)
            .split('/')
            .filter(|segment| !segment.is_empty() && !segment.starts_with('{'))
            .collect::<Vec<_>>()
            .join("_")
            .replace('-', "_")
            .to_ascii_uppercase();

        format!("WORKWISE_TOKEN_{}_{}", self.method().as_str(), resource)
    }

    /// Maps a request's method and matched route template back to its endpoint.
    pub fn resolve(method: &Method, path: &str) -> Option<Endpoint> {
        Endpoint::ALL
            .into_iter()
            .find(|endpoint| endpoint.method() == *method && endpoint.path() == path)
    }
}

/// EndpointTokens
///
/// The static (endpoint, secret) table. Built once at startup and read-only afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointTokens {
    tokens: HashMap<Endpoint, String>,
}

impl Default for EndpointTokens {
    fn default() -> Self {
        Self {
            tokens: Endpoint::ALL
                .into_iter()
                .map(|endpoint| (endpoint, endpoint.default_token().to_string()))
                .collect(),
        }
    }
}

impl EndpointTokens {
    /// Builds the table from the defaults, replacing any token for which `lookup`
    /// returns a non-empty value under the endpoint's [`Endpoint::env_key`].
    pub fn with_overrides(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut table = Self::default();
        for endpoint in Endpoint::ALL {
            if let Some(token) = lookup(&endpoint.env_key()).filter(|t| !t.is_empty()) {
                table.tokens.insert(endpoint, token);
            }
        }
        table
    }

    pub fn expected(&self, endpoint: Endpoint) -> Option<&str> {
        self.tokens.get(&endpoint).map(String::as_str)
    }
}

/// Exact, case-sensitive comparison that does not short-circuit on the first differing byte.
fn tokens_match(presented: &str, expected: &str) -> bool {
    presented.as_bytes().ct_eq(expected.as_bytes()).into()
}

/// EndpointAccess
///
/// Proof that the request carried the correct `X-Endpoint-Token` for the route it
/// matched. Extracting it is the whole token gate: the route is identified from the
/// `MatchedPath` template and the method, the expected secret is pulled from
/// [`AppConfig`], and any mismatch rejects with 401 before the body is touched.
#[derive(Debug, Clone, Copy)]
pub struct EndpointAccess {
    pub endpoint: Endpoint,
}

impl<S> FromRequestParts<S> for EndpointAccess
where
    S: Send + Sync,
    AppConfig: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = AppConfig::from_ref(state);

        let path = parts
            .extensions
            .get::<MatchedPath>()
            .map(|matched| matched.as_str())
            .unwrap_or_else(|| parts.uri.path());

        let Some(endpoint) = Endpoint::resolve(&parts.method, path) else {
            tracing::warn!(method = %parts.method, path, "no endpoint token registered for route");
            return Err(ApiError::unauthorized(INVALID_TOKEN));
        };

        let expected = config
            .endpoint_tokens
            .expected(endpoint)
            .ok_or_else(|| ApiError::unauthorized(INVALID_TOKEN))?;

        let presented = parts
            .headers
            .get(ENDPOINT_TOKEN_HEADER)
            .and_then(|value| value.to_str().ok());

        match presented {
            Some(token) if tokens_match(token, expected) => Ok(EndpointAccess { endpoint }),
            Some(_) => {
                tracing::warn!(?endpoint, "rejected request with wrong endpoint token");
                Err(ApiError::unauthorized(INVALID_TOKEN))
            }
            None => {
                tracing::warn!(?endpoint, "rejected request without endpoint token");
                Err(ApiError::unauthorized(INVALID_TOKEN))
            }
        }
    }
}
