mod common;

use common::DbTestContext;
use reqwest::StatusCode;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use workwise_api::create_router;

pub struct TestApp {
    pub address: String,
    pub client: reqwest::Client,
    _ctx: DbTestContext,
}

impl TestApp {
    async fn post(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(format!("{}{}", self.address, path))
            .header("X-Endpoint-Token", token)
            .json(&body)
            .send()
            .await
            .expect("Failed to execute request")
    }

    async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(format!("{}{}", self.address, path))
            .header("X-Endpoint-Token", token)
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// POSTs and returns the created row, asserting a 201.
    async fn create(&self, path: &str, token: &str, body: Value) -> Value {
        let response = self.post(path, token, body).await;
        assert_eq!(response.status(), StatusCode::CREATED, "POST {path}");
        response.json().await.unwrap()
    }
}

async fn spawn_app() -> TestApp {
    let ctx = DbTestContext::setup().await;
    let router = create_router(ctx.state());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        client: reqwest::Client::new(),
        _ctx: ctx,
    }
}

/// Registers a worker account and its profile, returning the profile.
async fn create_worker(app: &TestApp, username: &str, skills: Value) -> Value {
    let account = app
        .create(
            "/v1/workwise/account",
            "USNACCTOK123",
            json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password": "password123",
                "role": "worker"
            }),
        )
        .await;

    app.create(
        "/v1/workwise/workers",
        "WORKERADDTOK102",
        json!({ "user_id": account["user_id"], "experience_years": 3, "skills": skills }),
    )
    .await
}

// --- Tests ---

#[tokio::test]
async fn test_health_check() {
    let app = spawn_app().await;
    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .unwrap();

    assert!(response.status().is_success());
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn test_course_enrollment_flow() {
    let app = spawn_app().await;
    let worker = create_worker(&app, "welder", json!(["welding"])).await;
    assert_eq!(worker["worker_id"], 1);

    let course = app
        .create(
            "/v1/workwise/courses",
            "COURSEADDTOK402",
            json!({ "title": "Welding", "cost": 100, "skills": ["welding"] }),
        )
        .await;
    assert!(course["course_id"].as_i64().is_some());
    assert_eq!(course["skills"], json!(["welding"]));

    let enrollment = app
        .create(
            "/v1/workwise/worker_courses",
            "ENROLLADDTOK502",
            json!({ "worker_id": 1, "course_id": course["course_id"], "progress": 0 }),
        )
        .await;
    assert_eq!(enrollment["completed"], false);

    let response = app
        .get("/v1/workwise/worker_courses?worker_id=1", "ENROLLLISTTOK501")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let enrollments: Vec<Value> = response.json().await.unwrap();
    assert!(enrollments.iter().any(|e| {
        e["enrollment_id"] == enrollment["enrollment_id"] && e["progress"] == 0
    }));
}

#[tokio::test]
async fn test_login_returns_public_user_shape() {
    let app = spawn_app().await;
    create_worker(&app, "kunle", json!([])).await;

    let response = app
        .post(
            "/v1/workwise/user",
            "USNDPNQNKW",
            json!({ "usernameOrEmail": "kunle@example.com", "password": "password123" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let user: Value = response.json().await.unwrap();
    assert_eq!(user["username"], "kunle");
    assert!(user.get("password_hash").is_none());
    assert!(user.get("password").is_none());

    let response = app
        .post(
            "/v1/workwise/user",
            "USNDPNQNKW",
            json!({ "username_or_email": "kunle", "password": "not-it" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Invalid credentials");
}

#[tokio::test]
async fn test_duplicate_registration_returns_409() {
    let app = spawn_app().await;
    let body = json!({
        "username": "twice",
        "email": "twice@example.com",
        "password": "password123",
        "role": "employer"
    });

    app.create("/v1/workwise/account", "USNACCTOK123", body.clone()).await;
    let response = app.post("/v1/workwise/account", "USNACCTOK123", body).await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["detail"], "Username or email already exists");
}

#[tokio::test]
async fn test_union_membership_count_over_http() {
    let app = spawn_app().await;

    let union = app
        .create(
            "/v1/workwise/unions",
            "UNIONCREATETOK789",
            json!({
                "name": "Teachers Union",
                "register_num": "REG-2025-008",
                "sector_info": "Education",
                "membership_size": 500,
                "is_active_council": true
            }),
        )
        .await;
    assert_eq!(union["membership_size"], 0);

    // Usernames need at least 3 characters.
    for name in ["member1", "member2", "member3"] {
        let worker = create_worker(&app, name, json!([])).await;
        app.create(
            "/v1/workwise/union_members",
            "MEMBERADDTOK345",
            json!({ "worker_id": worker["worker_id"], "union_id": union["union_id"] }),
        )
        .await;
    }

    let unions: Vec<Value> = app
        .get("/v1/workwise/unions", "UNIONLISTTOK456")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(unions[0]["membership_size"], 3);

    let path = format!("/v1/workwise/union_members?union_id={}", union["union_id"]);
    let members: Vec<Value> = app.get(&path, "MEMBERLISTTOK012").await.json().await.unwrap();
    assert_eq!(members.len(), 3);

    let none: Vec<Value> = app
        .get("/v1/workwise/union_members?union_id=999", "MEMBERLISTTOK012")
        .await
        .json()
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn test_job_application_scores_and_filters() {
    let app = spawn_app().await;

    let account = app
        .create(
            "/v1/workwise/account",
            "USNACCTOK123",
            json!({
                "username": "hirer",
                "email": "hirer@example.com",
                "password": "password123",
                "role": "employer"
            }),
        )
        .await;
    let employer = app
        .create(
            "/v1/workwise/employers",
            "EMPLOYERADDTOK202",
            json!({ "user_id": account["user_id"], "company_name": "Hirer Ltd" }),
        )
        .await;

    let job = app
        .create(
            "/v1/workwise/jobs",
            "JOBADDTOK222",
            json!({
                "employer_id": employer["employer_id"],
                "title": "Builder",
                "salary_min": 100.5,
                "required_skills": ["B", "C", "D"]
            }),
        )
        .await;
    assert_eq!(job["status"], "open");

    let worker = create_worker(&app, "applicant", json!(["A", "B", "C"])).await;
    let application = app
        .create(
            "/v1/workwise/applications",
            "APPADDTOK302",
            json!({ "worker_id": worker["worker_id"], "job_id": job["job_id"] }),
        )
        .await;
    assert_eq!(application["match_score"], 67);
    assert_eq!(application["status"], "pending");

    let path = format!(
        "/v1/workwise/applications?job_id={}&worker_id={}",
        job["job_id"], worker["worker_id"]
    );
    let listed: Vec<Value> = app.get(&path, "APPLISTTOK301").await.json().await.unwrap();
    assert_eq!(listed.len(), 1);

    let path = format!("/v1/workwise/jobs?employer_id={}", employer["employer_id"]);
    let jobs: Vec<Value> = app.get(&path, "JOBLISTTOK333").await.json().await.unwrap();
    assert_eq!(jobs.len(), 1);
}

#[tokio::test]
async fn test_job_search_saved_jobs_and_stats_over_http() {
    let app = spawn_app().await;

    let account = app
        .create(
            "/v1/workwise/account",
            "USNACCTOK123",
            json!({
                "username": "poster",
                "email": "poster@example.com",
                "password": "password123",
                "role": "employer"
            }),
        )
        .await;
    let employer = app
        .create(
            "/v1/workwise/employers",
            "EMPLOYERADDTOK202",
            json!({ "user_id": account["user_id"], "company_name": "Poster Ltd" }),
        )
        .await;

    for (title, arrangement) in [("Remote Bookkeeper", "remote"), ("Site Bookkeeper", "onsite")] {
        app.create(
            "/v1/workwise/jobs",
            "JOBADDTOK222",
            json!({
                "employer_id": employer["employer_id"],
                "title": title,
                "work_arrangement": arrangement
            }),
        )
        .await;
    }

    let found: Vec<Value> = app
        .get(
            "/v1/workwise/jobs/search?query=bookkeeper&work_arrangement=Remote",
            "JOBSEARCHTOK555",
        )
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["title"], "Remote Bookkeeper");

    let paged: Vec<Value> = app
        .get("/v1/workwise/jobs?limit=1&offset=1", "JOBLISTTOK333")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(paged.len(), 1);
    assert_eq!(paged[0]["title"], "Site Bookkeeper");

    let too_many = app.get("/v1/workwise/jobs?limit=500", "JOBLISTTOK333").await;
    assert_eq!(too_many.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let detail = app
        .get(
            &format!("/v1/workwise/jobs/detail/{}", found[0]["job_id"]),
            "JOBDETAILTOK444",
        )
        .await;
    assert_eq!(detail.status(), StatusCode::OK);

    let worker = create_worker(&app, "browser", json!([])).await;
    let saved_path = format!("/v1/workwise/saved-jobs/{}", worker["user_id"]);
    let saved = app
        .create(&saved_path, "SAVEDADDTOK345", json!({ "job_id": found[0]["job_id"] }))
        .await;
    assert_eq!(saved["company_name"], "Poster Ltd");

    let again = app
        .post(&saved_path, "SAVEDADDTOK345", json!({ "job_id": found[0]["job_id"] }))
        .await;
    assert_eq!(again.status(), StatusCode::CONFLICT);

    let stats: Value = app
        .get(&format!("/v1/workwise/stats/{}", worker["user_id"]), "STATSTOK789")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(stats["saved_jobs_count"], 1);
    assert_eq!(stats["applications_count"], 0);
}

#[tokio::test]
async fn test_qualifications_and_businesses_over_http() {
    let app = spawn_app().await;
    let worker = create_worker(&app, "learner", json!([])).await;
    let path = format!("/v1/workwise/qualifications/{}", worker["user_id"]);

    let backwards = app
        .post(
            &path,
            "QUALADDTOK890",
            json!({
                "qualification_type": "Diploma",
                "institution": "Yaba Tech",
                "qualification_name": "OND",
                "start_date": "2021-09-01",
                "end_date": "2020-07-01"
            }),
        )
        .await;
    assert_eq!(backwards.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = backwards.json().await.unwrap();
    assert_eq!(body["errors"][0]["field"], "end_date");

    app.create(
        &path,
        "QUALADDTOK890",
        json!({
            "qualification_type": "Diploma",
            "institution": "Yaba Tech",
            "qualification_name": "OND",
            "start_date": "2019-09-01",
            "end_date": "2021-07-01"
        }),
    )
    .await;
    let listed: Vec<Value> = app.get(&path, "QUALLISTTOK567").await.json().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["end_date"], "2021-07-01");

    let business = app
        .create(
            "/v1/workwise/businesses",
            "BUSIADDTOK111",
            json!({ "name": "Mama Put Kitchen", "registration_number": "BN-42" }),
        )
        .await;
    assert!(business["employer_id"].is_null());

    let duplicate = app
        .post(
            "/v1/workwise/businesses",
            "BUSIADDTOK111",
            json!({ "name": "Copycat", "registration_number": "BN-42" }),
        )
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);

    let businesses: Vec<Value> = app
        .get("/v1/workwise/businesses", "BUSILISTTOK110")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(businesses.len(), 1);
}

#[tokio::test]
async fn test_negative_salary_is_rejected() {
    let app = spawn_app().await;
    let response = app
        .post(
            "/v1/workwise/jobs",
            "JOBADDTOK222",
            json!({ "employer_id": 1, "title": "Cheap", "salary_min": -5 }),
        )
        .await;

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["errors"][0]["field"], "salary_min");
}

#[tokio::test]
async fn test_government_registries() {
    let app = spawn_app().await;

    let department = app
        .create(
            "/v1/workwise/governments",
            "GOVADDTOK602",
            json!({ "name": "Ministry of Labour", "contact_email": "info@labour.gov.ng" }),
        )
        .await;

    app.create(
        "/v1/workwise/government_programs",
        "PROGRAMADDTOK702",
        json!({
            "department_id": department["department_id"],
            "name": "Skills Up",
            "skills_focus": ["masonry", "tiling"]
        }),
    )
    .await;

    let missing_department = app
        .post(
            "/v1/workwise/government_programs",
            "PROGRAMADDTOK702",
            json!({ "department_id": 77, "name": "Orphan" }),
        )
        .await;
    assert_eq!(missing_department.status(), StatusCode::NOT_FOUND);

    let bad_email = app
        .post(
            "/v1/workwise/governments",
            "GOVADDTOK602",
            json!({ "name": "Ministry of Works", "contact_email": "nope" }),
        )
        .await;
    assert_eq!(bad_email.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let institution = app
        .create(
            "/v1/workwise/training_institutions",
            "INSTADDTOK802",
            json!({
                "name": "Yaba College",
                "accreditation_number": "NBTE-01",
                "is_accredited": true
            }),
        )
        .await;
    assert_eq!(institution["is_accredited"], true);

    let programs: Vec<Value> = app
        .get("/v1/workwise/government_programs", "PROGRAMLISTTOK701")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(programs.len(), 1);
    assert_eq!(programs[0]["skills_focus"], json!(["masonry", "tiling"]));

    let institutions: Vec<Value> = app
        .get("/v1/workwise/training_institutions", "INSTLISTTOK801")
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(institutions.len(), 1);
}

#[tokio::test]
async fn test_openapi_document_lists_routes() {
    let app = spawn_app().await;
    let doc: Value = app
        .client
        .get(format!("{}/api-docs/openapi.json", app.address))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert!(doc["paths"]["/v1/workwise/courses"].is_object());
    assert!(doc["paths"]["/v1/workwise/saved-jobs/{user_id}"].is_object());
    assert!(doc["components"]["securitySchemes"]["endpoint_token"].is_object());
}
