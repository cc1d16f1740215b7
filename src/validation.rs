use std::borrow::Cow;

use axum::{
    Json,
    extract::{
        FromRequest, FromRequestParts, Path, Query, Request,
        path::ErrorKind,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::request::Parts,
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::error::{ApiError, FieldViolation};

pub const USER_ROLES: [&str; 2] = ["worker", "employer"];
pub const JOB_STATUSES: [&str; 2] = ["open", "closed"];
pub const WORK_ARRANGEMENTS: [&str; 3] = ["onsite", "remote", "hybrid"];

const BODY_FIELD: &str = "body";
const PATH_FIELD: &str = "path";
const DATA_ERROR_MARKER: &str = "into the target type: ";
const QUERY_ERROR_MARKER: &str = "query string: ";
const MISSING_FIELD: &str = "missing field `";

/// ValidatedJson
///
/// JSON body extractor that runs the payload's `Validate` rules after deserializing.
/// Both steps reject with a 422 listing the offending fields, so a handler that
/// receives a value knows every declared constraint holds.
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_to_error)?;

        value.validate().map_err(violations_to_error)?;

        Ok(ValidatedJson(value))
    }
}

/// FilterQuery
///
/// Query-string extractor for list filters. A malformed parameter (e.g.
/// `?union_id=abc`) or one outside its declared bounds (e.g. `?limit=0`) rejects
/// with the same 422 body as an invalid JSON payload.
pub struct FilterQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for FilterQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| {
                let text = rejection.body_text();
                let detail = after_marker(&text, QUERY_ERROR_MARKER);
                ApiError::Validation(vec![path_violation(detail, "query")])
            })?;

        value.validate().map_err(violations_to_error)?;

        Ok(FilterQuery(value))
    }
}

/// PathParams
///
/// Path-parameter extractor for routes such as `/stats/{user_id}`. An id that does
/// not parse answers 422 naming the parameter, like every other input failure.
pub struct PathParams<T>(pub T);

impl<T, S> FromRequestParts<S> for PathParams<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(path_rejection_to_error)?;

        Ok(PathParams(value))
    }
}

fn path_rejection_to_error(rejection: PathRejection) -> ApiError {
    let violation = match &rejection {
        PathRejection::FailedToDeserializePathParams(err) => match err.kind() {
            ErrorKind::ParseErrorAtKey {
                key, expected_type, ..
            } => FieldViolation::new(key.as_str(), format!("expected {expected_type}")),
            _ => FieldViolation::new(PATH_FIELD, err.body_text()),
        },
        _ => FieldViolation::new(PATH_FIELD, rejection.body_text()),
    };

    ApiError::Validation(vec![violation])
}

fn rejection_to_error(rejection: JsonRejection) -> ApiError {
    tracing::debug!("rejected request body: {}", rejection.body_text());

    let violation = match &rejection {
        JsonRejection::JsonDataError(_) => data_error_violation(&rejection.body_text()),
        JsonRejection::JsonSyntaxError(_) => {
            FieldViolation::new(BODY_FIELD, "request body is not valid JSON")
        }
        JsonRejection::MissingJsonContentType(_) => {
            FieldViolation::new(BODY_FIELD, "expected `Content-Type: application/json`")
        }
        _ => FieldViolation::new(BODY_FIELD, "request body could not be read"),
    };

    ApiError::Validation(vec![violation])
}

/// Turns a deserialization failure into a violation naming the field it happened on.
///
/// The rejection text has one of two shapes after axum's preamble:
/// ``missing field `title` at line 1 column 2`` or `cost: invalid type: ...`.
fn data_error_violation(text: &str) -> FieldViolation {
    let detail = after_marker(text, DATA_ERROR_MARKER);

    if let Some((_, rest)) = detail.split_once(MISSING_FIELD) {
        if let Some((field, _)) = rest.split_once('`') {
            return FieldViolation::new(field, "field is required");
        }
    }

    path_violation(detail, BODY_FIELD)
}

fn after_marker<'a>(text: &'a str, marker: &str) -> &'a str {
    text.split_once(marker).map_or(text, |(_, rest)| rest)
}

/// Splits `path: message`, attributing the whole text to `fallback` when there is no path.
fn path_violation(detail: &str, fallback: &str) -> FieldViolation {
    match detail.split_once(": ") {
        Some((path, message)) if !path.is_empty() && !path.contains(' ') => {
            FieldViolation::new(path, message)
        }
        _ => FieldViolation::new(fallback, detail),
    }
}

fn violations_to_error(errors: ValidationErrors) -> ApiError {
    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |err| {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("failed `{}` check", err.code));
                FieldViolation::new(field.to_string(), message)
            })
        })
        .collect();

    violations.sort_by(|a, b| a.field.cmp(&b.field));

    ApiError::Validation(violations)
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

pub fn validate_role(role: &str) -> Result<(), ValidationError> {
    if USER_ROLES.contains(&role) {
        Ok(())
    } else {
        Err(invalid("role", "must be 'worker' or 'employer'"))
    }
}

pub fn validate_job_status(status: &str) -> Result<(), ValidationError> {
    if JOB_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(invalid("job_status", "must be 'open' or 'closed'"))
    }
}

pub fn validate_work_arrangement(arrangement: &str) -> Result<(), ValidationError> {
    if WORK_ARRANGEMENTS.contains(&arrangement) {
        Ok(())
    } else {
        Err(invalid(
            "work_arrangement",
            "must be 'onsite', 'remote' or 'hybrid'",
        ))
    }
}

/// Skill lists may be empty, but no entry may be blank.
pub fn validate_skills(skills: &[String]) -> Result<(), ValidationError> {
    if skills.iter().any(|skill| skill.trim().is_empty()) {
        Err(invalid("skills", "entries cannot be blank"))
    } else {
        Ok(())
    }
}
