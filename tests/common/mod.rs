//! Shared setup for the integration tests: a fresh SQLite file per test.
#![allow(dead_code)]

use std::sync::Arc;

use tempfile::TempDir;
use workwise_api::{
    AppConfig, AppState, db,
    models::{CreateEmployerRequest, CreateWorkerRequest, Employer, NewUser, User, Worker},
    repository::{RepositoryState, SqliteRepository},
};

/// Holds the temporary directory so the database file outlives the test body.
pub struct DbTestContext {
    pub repo: RepositoryState,
    pub pool: sqlx::SqlitePool,
    _dir: TempDir,
}

impl DbTestContext {
    pub async fn setup() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}", dir.path().join("workwise-test.db").display());

        let pool = db::connect(&db_url)
            .await
            .expect("Failed to open test database");

        let repo = Arc::new(SqliteRepository::new(pool.clone())) as RepositoryState;

        DbTestContext {
            repo,
            pool,
            _dir: dir,
        }
    }

    pub fn state(&self) -> AppState {
        AppState {
            repo: self.repo.clone(),
            config: AppConfig::default(),
        }
    }
}

pub fn skills(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

/// Inserts a user directly. The hash is a placeholder; use the account route when a
/// test needs to log in.
pub async fn seed_user(repo: &RepositoryState, username: &str, role: &str) -> User {
    repo.create_user(NewUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: "not-a-real-hash".to_string(),
        role: role.to_string(),
    })
    .await
    .expect("Failed to seed user")
}

pub async fn seed_worker(
    repo: &RepositoryState,
    username: &str,
    worker_skills: &[&str],
) -> Worker {
    let user = seed_user(repo, username, "worker").await;
    repo.create_worker(CreateWorkerRequest {
        user_id: user.user_id,
        bio: None,
        experience_years: 2,
        skills: skills(worker_skills),
        location: Some("Lagos".to_string()),
    })
    .await
    .expect("Failed to seed worker")
}

pub async fn seed_employer(repo: &RepositoryState, username: &str) -> Employer {
    let user = seed_user(repo, username, "employer").await;
    repo.create_employer(CreateEmployerRequest {
        user_id: user.user_id,
        company_name: format!("{username} Ltd"),
        company_description: None,
        industry: Some("Construction".to_string()),
        location: None,
    })
    .await
    .expect("Failed to seed employer")
}
