mod common;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::Utc;
use chrono::NaiveDate;
use common::{DbTestContext, seed_employer, seed_user, seed_worker, skills};
use workwise_api::{
    ApiError,
    error::FieldViolation,
    handlers::{self, JobPath, JobSearchFilter, UserPath},
    models::{
        Account, CreateApplicationRequest, CreateJobRequest, CreateQualificationRequest,
        CreateSavedJobRequest, CreateUnionMemberRequest, CreateUnionRequest, LoginRequest,
        RegisterRequest,
    },
    validation::{FilterQuery, PathParams, ValidatedJson},
};

fn register(username: &str, password: &str) -> RegisterRequest {
    RegisterRequest {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password: password.to_string(),
        role: "worker".to_string(),
    }
}

async fn register_account(ctx: &DbTestContext, username: &str, password: &str) -> Account {
    let (_, Json(account)) =
        handlers::create_account(State(ctx.state()), ValidatedJson(register(username, password)))
            .await
            .unwrap();
    account
}

fn job(employer_id: i64, title: &str, required: &[&str]) -> CreateJobRequest {
    CreateJobRequest {
        employer_id,
        title: title.to_string(),
        description: None,
        location: None,
        employment_type: None,
        work_arrangement: None,
        salary_min: None,
        salary_max: None,
        required_skills: skills(required),
        status: None,
    }
}

fn login_as(username_or_email: &str, password: &str) -> LoginRequest {
    LoginRequest {
        username_or_email: username_or_email.to_string(),
        password: password.to_string(),
    }
}

// --- Accounts ---

#[tokio::test]
async fn test_register_then_login_with_username_and_email() {
    let ctx = DbTestContext::setup().await;

    let (status, Json(account)) = handlers::create_account(
        State(ctx.state()),
        ValidatedJson(register("chidi", "s3cret-pass")),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(account.username, "chidi");
    assert_eq!(account.role, "worker");
    assert!(account.is_active);

    let Json(by_name) = handlers::login(
        State(ctx.state()),
        ValidatedJson(login_as("chidi", "s3cret-pass")),
    )
    .await
    .unwrap();
    assert_eq!(by_name.user_id, account.user_id);

    let Json(by_email) = handlers::login(
        State(ctx.state()),
        ValidatedJson(login_as("chidi@example.com", "s3cret-pass")),
    )
    .await
    .unwrap();
    assert_eq!(by_email.user_id, account.user_id);
}

#[tokio::test]
async fn test_stored_password_is_an_argon2_hash() {
    let ctx = DbTestContext::setup().await;
    register_account(&ctx, "ada", "plaintext-pw").await;

    let stored: String =
        sqlx::query_scalar("SELECT password_hash FROM users WHERE username = 'ada'")
            .fetch_one(&ctx.pool)
            .await
            .unwrap();
    assert!(stored.starts_with("$argon2id$"));
    assert!(!stored.contains("plaintext-pw"));
}

#[tokio::test]
async fn test_duplicate_registration_is_conflict() {
    let ctx = DbTestContext::setup().await;
    register_account(&ctx, "bola", "password-1").await;

    let second =
        handlers::create_account(State(ctx.state()), ValidatedJson(register("bola", "password-2")))
            .await;

    match second {
        Err(err @ ApiError::Conflict(_)) => {
            assert_eq!(err.status_code(), StatusCode::CONFLICT);
            assert_eq!(err.to_string(), "Username or email already exists");
        }
        other => panic!("expected conflict, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let ctx = DbTestContext::setup().await;
    register_account(&ctx, "femi", "right-password").await;
    register_account(&ctx, "dormant", "right-password").await;
    sqlx::query("UPDATE users SET is_active = 0 WHERE username = 'dormant'")
        .execute(&ctx.pool)
        .await
        .unwrap();

    for attempt in [
        login_as("femi", "wrong-password"),
        login_as("nobody", "right-password"),
        login_as("dormant", "right-password"),
    ] {
        let err = handlers::login(State(ctx.state()), ValidatedJson(attempt))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(err.to_string(), "Invalid credentials");
    }
}

// --- Unions ---

#[tokio::test]
async fn test_union_member_defaults() {
    let ctx = DbTestContext::setup().await;
    let worker = seed_worker(&ctx.repo, "sade", &[]).await;

    let (_, Json(union)) = handlers::create_union(
        State(ctx.state()),
        ValidatedJson(CreateUnionRequest {
            name: "Teachers".into(),
            register_num: "REG-2025-008".into(),
            sector_info: "Education".into(),
            is_active_council: false,
        }),
    )
    .await
    .unwrap();

    let (status, Json(member)) = handlers::add_union_member(
        State(ctx.state()),
        ValidatedJson(CreateUnionMemberRequest {
            worker_id: worker.worker_id,
            union_id: union.union_id,
            membership_num: None,
            status: None,
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(member.status, "active");
    let expected = format!(
        "MEM-{}-{}-{}",
        worker.worker_id,
        union.union_id,
        Utc::now().format("%Y%m%d")
    );
    assert_eq!(member.membership_num, expected);

    let Json(unions) = handlers::list_unions(State(ctx.state())).await.unwrap();
    assert_eq!(unions[0].membership_size, 1);
}

// --- Applications ---

#[tokio::test]
async fn test_application_stores_match_score() {
    let ctx = DbTestContext::setup().await;
    let worker = seed_worker(&ctx.repo, "emeka", &["A", "B", "C"]).await;
    let employer = seed_employer(&ctx.repo, "works").await;

    let (_, Json(job)) = handlers::create_job(
        State(ctx.state()),
        ValidatedJson(job(employer.employer_id, "Site hand", &["B", "C", "D"])),
    )
    .await
    .unwrap();

    let (status, Json(application)) = handlers::create_application(
        State(ctx.state()),
        ValidatedJson(CreateApplicationRequest {
            worker_id: worker.worker_id,
            job_id: job.job_id,
            cover_letter: Some("Hire me".into()),
        }),
    )
    .await
    .unwrap();

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(application.match_score, 67);
    assert_eq!(application.status, "pending");
}

#[tokio::test]
async fn test_application_for_unknown_job_is_not_found() {
    let ctx = DbTestContext::setup().await;
    let worker = seed_worker(&ctx.repo, "lonely", &[]).await;

    let err = handlers::create_application(
        State(ctx.state()),
        ValidatedJson(CreateApplicationRequest {
            worker_id: worker.worker_id,
            job_id: 4242,
            cover_letter: None,
        }),
    )
    .await
    .unwrap_err();

    assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(err.to_string(), "Job not found");
}

// --- Jobs ---

#[tokio::test]
async fn test_job_detail_and_search_defaults() {
    let ctx = DbTestContext::setup().await;
    let employer = seed_employer(&ctx.repo, "crane").await;

    for i in 0..25 {
        let (_, Json(_)) = handlers::create_job(
            State(ctx.state()),
            ValidatedJson(job(employer.employer_id, &format!("Rigger {i}"), &[])),
        )
        .await
        .unwrap();
    }

    let Json(detail) =
        handlers::get_job_detail(State(ctx.state()), PathParams(JobPath { job_id: 1 }))
            .await
            .unwrap();
    assert_eq!(detail.title, "Rigger 0");

    let missing = handlers::get_job_detail(State(ctx.state()), PathParams(JobPath { job_id: 404 }))
        .await
        .unwrap_err();
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(missing.to_string(), "Job not found");

    // No limit given: the first 20, newest first. A blank query is ignored.
    let Json(found) = handlers::search_jobs(
        State(ctx.state()),
        FilterQuery(JobSearchFilter {
            query: Some("   ".to_string()),
            ..Default::default()
        }),
    )
    .await
    .unwrap();
    assert_eq!(found.len(), 20);
    assert_eq!(found[0].title, "Rigger 24");
}

// --- Qualifications, saved jobs & stats ---

fn qualification_dated(start: &str, end: &str, is_current: bool) -> CreateQualificationRequest {
    let date = |d: &str| NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap();
    CreateQualificationRequest {
        qualification_type: "Degree".to_string(),
        institution: "UNILAG".to_string(),
        field_of_study: Some("Civil Engineering".to_string()),
        qualification_name: "BSc".to_string(),
        start_date: Some(date(start)),
        end_date: Some(date(end)),
        is_current,
        grade_or_gpa: None,
        description: None,
    }
}

#[tokio::test]
async fn test_qualification_end_before_start_is_rejected() {
    let ctx = DbTestContext::setup().await;
    let user = seed_user(&ctx.repo, "graduate", "worker").await;

    let err = handlers::add_qualification(
        State(ctx.state()),
        PathParams(UserPath {
            user_id: user.user_id,
        }),
        ValidatedJson(qualification_dated("2020-09-01", "2019-06-30", false)),
    )
    .await
    .unwrap_err();

    match err {
        ApiError::Validation(violations) => assert_eq!(
            violations,
            vec![FieldViolation::new("end_date", "cannot be before start_date")]
        ),
        other => panic!("expected validation error, got {other:?}"),
    }

    // Nothing was stored.
    let Json(listed) = handlers::list_qualifications(
        State(ctx.state()),
        PathParams(UserPath {
            user_id: user.user_id,
        }),
    )
    .await
    .unwrap();
    assert!(listed.is_empty());

    // A current qualification ignores the stale end date.
    let (status, Json(current)) = handlers::add_qualification(
        State(ctx.state()),
        PathParams(UserPath {
            user_id: user.user_id,
        }),
        ValidatedJson(qualification_dated("2020-09-01", "2019-06-30", true)),
    )
    .await
    .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(current.end_date, None);
}

#[tokio::test]
async fn test_saved_jobs_feed_user_stats() {
    let ctx = DbTestContext::setup().await;
    let worker = seed_worker(&ctx.repo, "keeper", &["tiling"]).await;
    let employer = seed_employer(&ctx.repo, "tiles").await;
    let (_, Json(posted)) = handlers::create_job(
        State(ctx.state()),
        ValidatedJson(job(employer.employer_id, "Tiler", &["tiling"])),
    )
    .await
    .unwrap();

    let path = || {
        PathParams(UserPath {
            user_id: worker.user_id,
        })
    };
    let body = || {
        ValidatedJson(CreateSavedJobRequest {
            job_id: posted.job_id,
        })
    };

    let (status, Json(saved)) = handlers::save_job(State(ctx.state()), path(), body())
        .await
        .unwrap();
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(saved.job_title, "Tiler");

    let duplicate = handlers::save_job(State(ctx.state()), path(), body())
        .await
        .unwrap_err();
    assert_eq!(duplicate.status_code(), StatusCode::CONFLICT);
    assert_eq!(duplicate.to_string(), "Job is already saved");

    let Json(stats) = handlers::get_user_stats(State(ctx.state()), path())
        .await
        .unwrap();
    assert_eq!(stats.saved_jobs_count, 1);
    assert_eq!(stats.applications_count, 0);

    let unknown =
        handlers::get_user_stats(State(ctx.state()), PathParams(UserPath { user_id: 777 }))
            .await
            .unwrap_err();
    assert_eq!(unknown.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(unknown.to_string(), "User not found");
}

// --- Storage faults ---

#[tokio::test]
async fn test_storage_fault_is_generic_500() {
    let ctx = DbTestContext::setup().await;
    ctx.pool.close().await;

    let err = handlers::list_unions(State(ctx.state())).await.unwrap_err();
    assert!(matches!(err, ApiError::Internal(_)));

    let response = err.into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["detail"], "Internal server error");
    assert!(body.get("errors").is_none());
}
