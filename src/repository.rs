use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, Transaction, types::Json};
use thiserror::Error;

use crate::models::{
    Application, ApplicationStatus, Business, Course, CreateBusinessRequest,
    CreateCourseRequest, CreateEmployerRequest, CreateGovernmentDepartmentRequest,
    CreateGovernmentProgramRequest, CreateJobRequest, CreateQualificationRequest,
    CreateTrainingInstitutionRequest, CreateUnionRequest, CreateWorkerCourseRequest,
    CreateWorkerRequest, Employer, GovernmentDepartment, GovernmentProgram, Job, JobSearch,
    NewApplication, NewUnionMember, NewUser, Page, Qualification, SavedJob,
    TrainingInstitution, Union, UnionMember, User, UserStats, Worker, WorkerCourse,
};

/// RepoError
///
/// Failures at the storage boundary. Constraint violations are translated here so the
/// route layer never inspects SQLite error codes.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A uniqueness constraint rejected the write.
    #[error("{0}")]
    Conflict(String),

    /// A referenced parent row does not exist.
    #[error("{0}")]
    NotFound(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),
}

pub type RepoResult<T> = Result<T, RepoError>;

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_foreign_key_violation() {
                return RepoError::NotFound("Referenced record not found".to_string());
            }
        }
        RepoError::Database(err)
    }
}

/// Maps an insert failure, reporting a unique violation as `Conflict(message)`.
fn on_insert(conflict: &'static str) -> impl Fn(sqlx::Error) -> RepoError {
    move |err| match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepoError::Conflict(conflict.to_string())
        }
        _ => RepoError::from(err),
    }
}

/// Fails with `NotFound(missing)` unless `sql` (a single-id existence check) yields a row.
async fn ensure_exists(
    conn: &mut SqliteConnection,
    sql: &'static str,
    id: i64,
    missing: &str,
) -> RepoResult<()> {
    let found: Option<i64> = sqlx::query_scalar(sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;

    found
        .map(|_| ())
        .ok_or_else(|| RepoError::NotFound(missing.to_string()))
}

const USER_EXISTS: &str = "SELECT 1 FROM users WHERE user_id = ?";
const WORKER_EXISTS: &str = "SELECT 1 FROM workers WHERE worker_id = ?";
const EMPLOYER_EXISTS: &str = "SELECT 1 FROM employers WHERE employer_id = ?";
const JOB_EXISTS: &str = "SELECT 1 FROM jobs WHERE job_id = ?";
const COURSE_EXISTS: &str = "SELECT 1 FROM courses WHERE course_id = ?";
const DEPARTMENT_EXISTS: &str = "SELECT 1 FROM government_departments WHERE department_id = ?";
const INSTITUTION_EXISTS: &str = "SELECT 1 FROM training_institutions WHERE institution_id = ?";

/// Columns of a [`Job`] row, in `SELECT` order.
const JOB_COLUMNS: &str = "job_id, employer_id, title, description, location, employment_type, \
     work_arrangement, salary_min, salary_max, required_skills, status, created_at";

/// A [`SavedJob`] joined with its job and the job's employer; callers append the
/// `WHERE` clause.
const SAVED_JOB_SELECT: &str = "SELECT s.saved_job_id, s.user_id, s.job_id, \
     j.title AS job_title, e.company_name, j.location AS job_location, s.saved_at \
     FROM saved_jobs s \
     JOIN jobs j ON j.job_id = s.job_id \
     JOIN employers e ON e.employer_id = j.employer_id";

/// Appends `LIMIT ? OFFSET ?` for `page`. SQLite needs a LIMIT before an OFFSET;
/// `-1` stands for "no limit".
fn push_page(builder: &mut QueryBuilder<'_, Sqlite>, page: Page) {
    builder.push(" LIMIT ");
    builder.push_bind(page.limit.unwrap_or(-1));
    builder.push(" OFFSET ");
    builder.push_bind(page.offset);
}

/// Appends a case-insensitive substring match of `value` against `column`.
fn push_contains<'args>(builder: &mut QueryBuilder<'args, Sqlite>, column: &str, value: String) {
    builder.push(format!(" AND instr(lower(coalesce({column}, '')), lower("));
    builder.push_bind(value);
    builder.push(")) > 0");
}

/// Repository Trait
///
/// The persistence contract used by the handlers: one insert-and-return and one
/// list operation per entity, plus the lookups needed for login and match scoring.
/// Every insert is a single transaction in which parent ids are checked first.
/// Lists return rows in insertion order.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Accounts ---
    async fn create_user(&self, user: NewUser) -> RepoResult<User>;
    // Matches either the username or the email.
    async fn find_user_by_login(&self, username_or_email: &str) -> RepoResult<Option<User>>;

    // --- Profiles ---
    async fn create_worker(&self, req: CreateWorkerRequest) -> RepoResult<Worker>;
    async fn list_workers(&self) -> RepoResult<Vec<Worker>>;
    async fn get_worker(&self, worker_id: i64) -> RepoResult<Option<Worker>>;
    async fn create_employer(&self, req: CreateEmployerRequest) -> RepoResult<Employer>;
    async fn list_employers(&self) -> RepoResult<Vec<Employer>>;

    // --- Unions ---
    async fn create_union(&self, req: CreateUnionRequest) -> RepoResult<Union>;
    async fn list_unions(&self) -> RepoResult<Vec<Union>>;
    /// Inserts the membership and bumps the union's `membership_size` atomically.
    async fn create_union_member(&self, member: NewUnionMember) -> RepoResult<UnionMember>;
    async fn list_union_members(&self, union_id: Option<i64>) -> RepoResult<Vec<UnionMember>>;

    // --- Jobs & Applications ---
    async fn create_job(&self, req: CreateJobRequest) -> RepoResult<Job>;
    async fn list_jobs(&self, employer_id: Option<i64>, page: Page) -> RepoResult<Vec<Job>>;
    async fn get_job(&self, job_id: i64) -> RepoResult<Option<Job>>;
    /// Open jobs matching every filter in `search`, newest first.
    async fn search_jobs(&self, search: JobSearch) -> RepoResult<Vec<Job>>;
    async fn create_application(&self, application: NewApplication) -> RepoResult<Application>;
    async fn list_applications(
        &self,
        job_id: Option<i64>,
        worker_id: Option<i64>,
    ) -> RepoResult<Vec<Application>>;

    // --- Courses ---
    async fn create_course(&self, req: CreateCourseRequest) -> RepoResult<Course>;
    async fn list_courses(&self) -> RepoResult<Vec<Course>>;
    async fn create_worker_course(&self, req: CreateWorkerCourseRequest)
    -> RepoResult<WorkerCourse>;
    async fn list_worker_courses(&self, worker_id: Option<i64>) -> RepoResult<Vec<WorkerCourse>>;

    // --- Government registries ---
    async fn create_government_department(
        &self,
        req: CreateGovernmentDepartmentRequest,
    ) -> RepoResult<GovernmentDepartment>;
    async fn list_government_departments(&self) -> RepoResult<Vec<GovernmentDepartment>>;
    async fn create_government_program(
        &self,
        req: CreateGovernmentProgramRequest,
    ) -> RepoResult<GovernmentProgram>;
    async fn list_government_programs(
        &self,
        department_id: Option<i64>,
    ) -> RepoResult<Vec<GovernmentProgram>>;
    async fn create_training_institution(
        &self,
        req: CreateTrainingInstitutionRequest,
    ) -> RepoResult<TrainingInstitution>;
    async fn list_training_institutions(&self) -> RepoResult<Vec<TrainingInstitution>>;

    // --- Per-user collections ---
    async fn create_qualification(
        &self,
        user_id: i64,
        req: CreateQualificationRequest,
    ) -> RepoResult<Qualification>;
    async fn list_qualifications(&self, user_id: i64) -> RepoResult<Vec<Qualification>>;
    async fn create_saved_job(&self, user_id: i64, job_id: i64) -> RepoResult<SavedJob>;
    /// The user's saved jobs, most recently saved first.
    async fn list_saved_jobs(&self, user_id: i64) -> RepoResult<Vec<SavedJob>>;
    /// `None` when the user does not exist.
    async fn user_stats(&self, user_id: i64) -> RepoResult<Option<UserStats>>;

    // --- Businesses ---
    async fn create_business(&self, req: CreateBusinessRequest) -> RepoResult<Business>;
    async fn list_businesses(&self) -> RepoResult<Vec<Business>>;
}

/// RepositoryState
///
/// The shared handle to the persistence layer stored in the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// SqliteRepository
///
/// [`Repository`] backed by a SQLite pool opened through [`crate::db::connect`].
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Starts a write transaction. `BEGIN IMMEDIATE` takes SQLite's write lock up
    /// front, so a transaction that reads before it writes waits on the busy timeout
    /// instead of failing with `SQLITE_BUSY` when another connection has written.
    async fn begin_write(&self) -> RepoResult<Transaction<'static, Sqlite>> {
        Ok(self.pool.begin_with("BEGIN IMMEDIATE").await?)
    }
}

#[async_trait]
impl Repository for SqliteRepository {
    async fn create_user(&self, user: NewUser) -> RepoResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash, role, is_active, created_at)
            VALUES (?, ?, ?, ?, 1, ?)
            RETURNING user_id, username, email, password_hash, role, is_active, created_at
            "#,
        )
        .bind(user.username)
        .bind(user.email)
        .bind(user.password_hash)
        .bind(user.role)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(on_insert("Username or email already exists"))?;

        Ok(created)
    }

    async fn find_user_by_login(&self, username_or_email: &str) -> RepoResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT user_id, username, email, password_hash, role, is_active, created_at
            FROM users
            WHERE username = ?1 OR email = ?1
            ORDER BY user_id ASC
            LIMIT 1
            "#,
        )
        .bind(username_or_email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_worker(&self, req: CreateWorkerRequest) -> RepoResult<Worker> {
        let mut tx = self.begin_write().await?;
        ensure_exists(&mut tx, USER_EXISTS, req.user_id, "User not found").await?;

        let worker = sqlx::query_as::<_, Worker>(
            r#"
            INSERT INTO workers (user_id, bio, experience_years, skills, location, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING worker_id, user_id, bio, experience_years, skills, location, created_at
            "#,
        )
        .bind(req.user_id)
        .bind(req.bio)
        .bind(req.experience_years)
        .bind(Json(req.skills))
        .bind(req.location)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(on_insert("Worker profile already exists for this user"))?;

        tx.commit().await?;
        Ok(worker)
    }

    async fn list_workers(&self) -> RepoResult<Vec<Worker>> {
        let workers = sqlx::query_as::<_, Worker>(
            r#"
            SELECT worker_id, user_id, bio, experience_years, skills, location, created_at
            FROM workers
            ORDER BY worker_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(workers)
    }

    async fn get_worker(&self, worker_id: i64) -> RepoResult<Option<Worker>> {
        let worker = sqlx::query_as::<_, Worker>(
            r#"
            SELECT worker_id, user_id, bio, experience_years, skills, location, created_at
            FROM workers
            WHERE worker_id = ?
            "#,
        )
        .bind(worker_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(worker)
    }

    async fn create_employer(&self, req: CreateEmployerRequest) -> RepoResult<Employer> {
        let mut tx = self.begin_write().await?;
        ensure_exists(&mut tx, USER_EXISTS, req.user_id, "User not found").await?;

        let employer = sqlx::query_as::<_, Employer>(
            r#"
            INSERT INTO employers
                (user_id, company_name, company_description, industry, location, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING employer_id, user_id, company_name, company_description, industry,
                      location, created_at
            "#,
        )
        .bind(req.user_id)
        .bind(req.company_name)
        .bind(req.company_description)
        .bind(req.industry)
        .bind(req.location)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(on_insert("Employer profile already exists for this user"))?;

        tx.commit().await?;
        Ok(employer)
    }

    async fn list_employers(&self) -> RepoResult<Vec<Employer>> {
        let employers = sqlx::query_as::<_, Employer>(
            r#"
            SELECT employer_id, user_id, company_name, company_description, industry,
                   location, created_at
            FROM employers
            ORDER BY employer_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(employers)
    }

    /// create_union
    ///
    /// New unions always start with `membership_size = 0`.
    async fn create_union(&self, req: CreateUnionRequest) -> RepoResult<Union> {
        let union = sqlx::query_as::<_, Union>(
            r#"
            INSERT INTO unions
                (name, register_num, sector_info, membership_size, is_active_council, created_at)
            VALUES (?, ?, ?, 0, ?, ?)
            RETURNING union_id, name, register_num, sector_info, membership_size,
                      is_active_council, created_at
            "#,
        )
        .bind(req.name)
        .bind(req.register_num)
        .bind(req.sector_info)
        .bind(req.is_active_council)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(on_insert("Union registration number already exists"))?;

        Ok(union)
    }

    async fn list_unions(&self) -> RepoResult<Vec<Union>> {
        let unions = sqlx::query_as::<_, Union>(
            r#"
            SELECT union_id, name, register_num, sector_info, membership_size,
                   is_active_council, created_at
            FROM unions
            ORDER BY union_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(unions)
    }

    /// create_union_member
    ///
    /// Runs as one transaction: bump the union's count, verify the worker, insert the
    /// membership, commit. Any failure drops the transaction, rolling the count back.
    async fn create_union_member(&self, member: NewUnionMember) -> RepoResult<UnionMember> {
        let mut tx = self.begin_write().await?;

        let bumped = sqlx::query(
            "UPDATE unions SET membership_size = membership_size + 1 WHERE union_id = ?",
        )
        .bind(member.union_id)
        .execute(&mut *tx)
        .await?;

        if bumped.rows_affected() == 0 {
            return Err(RepoError::NotFound("Union not found".to_string()));
        }

        ensure_exists(&mut tx, WORKER_EXISTS, member.worker_id, "Worker not found").await?;

        let created = sqlx::query_as::<_, UnionMember>(
            r#"
            INSERT INTO union_members (worker_id, union_id, membership_num, status, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING membership_id, worker_id, union_id, membership_num, status, created_at
            "#,
        )
        .bind(member.worker_id)
        .bind(member.union_id)
        .bind(member.membership_num)
        .bind(member.status)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(on_insert("Worker is already a member of this union"))?;

        tx.commit().await?;
        Ok(created)
    }

    async fn list_union_members(&self, union_id: Option<i64>) -> RepoResult<Vec<UnionMember>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT membership_id, worker_id, union_id, membership_num, status, created_at
            FROM union_members
            WHERE 1 = 1
            "#,
        );

        if let Some(id) = union_id {
            builder.push(" AND union_id = ");
            builder.push_bind(id);
        }

        builder.push(" ORDER BY membership_id ASC");

        let members = builder
            .build_query_as::<UnionMember>()
            .fetch_all(&self.pool)
            .await?;

        Ok(members)
    }

    async fn create_job(&self, req: CreateJobRequest) -> RepoResult<Job> {
        let mut tx = self.begin_write().await?;
        ensure_exists(&mut tx, EMPLOYER_EXISTS, req.employer_id, "Employer not found").await?;

        let job = sqlx::query_as::<_, Job>(
            r#"
            INSERT INTO jobs
                (employer_id, title, description, location, employment_type, work_arrangement,
                 salary_min, salary_max, required_skills, status, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING job_id, employer_id, title, description, location, employment_type,
                      work_arrangement, salary_min, salary_max, required_skills, status,
                      created_at
            "#,
        )
        .bind(req.employer_id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.location)
        .bind(req.employment_type)
        .bind(req.work_arrangement)
        .bind(req.salary_min)
        .bind(req.salary_max)
        .bind(Json(req.required_skills))
        .bind(req.status.unwrap_or_else(|| "open".to_string()))
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(job)
    }

    async fn list_jobs(&self, employer_id: Option<i64>, page: Page) -> RepoResult<Vec<Job>> {
        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {JOB_COLUMNS} FROM jobs WHERE 1 = 1"));

        if let Some(id) = employer_id {
            builder.push(" AND employer_id = ");
            builder.push_bind(id);
        }

        builder.push(" ORDER BY job_id ASC");
        push_page(&mut builder, page);

        let jobs = builder.build_query_as::<Job>().fetch_all(&self.pool).await?;

        Ok(jobs)
    }

    async fn get_job(&self, job_id: i64) -> RepoResult<Option<Job>> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE job_id = ?");
        let job = sqlx::query_as::<_, Job>(&sql)
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(job)
    }

    async fn search_jobs(&self, search: JobSearch) -> RepoResult<Vec<Job>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(format!(
            "SELECT {JOB_COLUMNS} FROM jobs WHERE status = 'open'"
        ));

        if let Some(query) = search.query {
            builder.push(" AND (instr(lower(title), lower(");
            builder.push_bind(query.clone());
            builder.push(")) > 0 OR instr(lower(coalesce(description, '')), lower(");
            builder.push_bind(query);
            builder.push(")) > 0)");
        }

        if let Some(employment_type) = search.employment_type {
            builder.push(" AND lower(employment_type) = lower(");
            builder.push_bind(employment_type);
            builder.push(")");
        }

        if let Some(work_arrangement) = search.work_arrangement {
            builder.push(" AND lower(work_arrangement) = lower(");
            builder.push_bind(work_arrangement);
            builder.push(")");
        }

        if let Some(location) = search.location {
            push_contains(&mut builder, "location", location);
        }

        builder.push(" ORDER BY job_id DESC");
        push_page(&mut builder, search.page);

        let jobs = builder.build_query_as::<Job>().fetch_all(&self.pool).await?;

        Ok(jobs)
    }

    async fn create_application(&self, application: NewApplication) -> RepoResult<Application> {
        let mut tx = self.begin_write().await?;
        ensure_exists(&mut tx, WORKER_EXISTS, application.worker_id, "Worker not found").await?;
        ensure_exists(&mut tx, JOB_EXISTS, application.job_id, "Job not found").await?;

        let created = sqlx::query_as::<_, Application>(
            r#"
            INSERT INTO applications
                (worker_id, job_id, match_score, status, cover_letter, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING application_id, worker_id, job_id, match_score, status,
                      cover_letter, created_at
            "#,
        )
        .bind(application.worker_id)
        .bind(application.job_id)
        .bind(application.match_score)
        .bind(ApplicationStatus::Pending.as_str())
        .bind(application.cover_letter)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(on_insert("Worker has already applied to this job"))?;

        tx.commit().await?;
        Ok(created)
    }

    async fn list_applications(
        &self,
        job_id: Option<i64>,
        worker_id: Option<i64>,
    ) -> RepoResult<Vec<Application>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT application_id, worker_id, job_id, match_score, status,
                   cover_letter, created_at
            FROM applications
            WHERE 1 = 1
            "#,
        );

        if let Some(id) = job_id {
            builder.push(" AND job_id = ");
            builder.push_bind(id);
        }

        if let Some(id) = worker_id {
            builder.push(" AND worker_id = ");
            builder.push_bind(id);
        }

        builder.push(" ORDER BY application_id ASC");

        let applications = builder
            .build_query_as::<Application>()
            .fetch_all(&self.pool)
            .await?;

        Ok(applications)
    }

    async fn create_course(&self, req: CreateCourseRequest) -> RepoResult<Course> {
        let mut tx = self.begin_write().await?;
        if let Some(institution_id) = req.institution_id {
            ensure_exists(
                &mut tx,
                INSTITUTION_EXISTS,
                institution_id,
                "Training institution not found",
            )
            .await?;
        }

        let course = sqlx::query_as::<_, Course>(
            r#"
            INSERT INTO courses
                (institution_id, title, description, cost, skills, duration_weeks, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING course_id, institution_id, title, description, cost, skills,
                      duration_weeks, created_at
            "#,
        )
        .bind(req.institution_id)
        .bind(req.title)
        .bind(req.description)
        .bind(req.cost)
        .bind(Json(req.skills))
        .bind(req.duration_weeks)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(course)
    }

    async fn list_courses(&self) -> RepoResult<Vec<Course>> {
        let courses = sqlx::query_as::<_, Course>(
            r#"
            SELECT course_id, institution_id, title, description, cost, skills,
                   duration_weeks, created_at
            FROM courses
            ORDER BY course_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(courses)
    }

    async fn create_worker_course(
        &self,
        req: CreateWorkerCourseRequest,
    ) -> RepoResult<WorkerCourse> {
        let mut tx = self.begin_write().await?;
        ensure_exists(&mut tx, WORKER_EXISTS, req.worker_id, "Worker not found").await?;
        ensure_exists(&mut tx, COURSE_EXISTS, req.course_id, "Course not found").await?;

        let enrollment = sqlx::query_as::<_, WorkerCourse>(
            r#"
            INSERT INTO worker_courses (worker_id, course_id, progress, completed, enrolled_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING enrollment_id, worker_id, course_id, progress, completed, enrolled_at
            "#,
        )
        .bind(req.worker_id)
        .bind(req.course_id)
        .bind(req.progress)
        .bind(req.progress == 100)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(on_insert("Worker is already enrolled in this course"))?;

        tx.commit().await?;
        Ok(enrollment)
    }

    async fn list_worker_courses(&self, worker_id: Option<i64>) -> RepoResult<Vec<WorkerCourse>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT enrollment_id, worker_id, course_id, progress, completed, enrolled_at
            FROM worker_courses
            WHERE 1 = 1
            "#,
        );

        if let Some(id) = worker_id {
            builder.push(" AND worker_id = ");
            builder.push_bind(id);
        }

        builder.push(" ORDER BY enrollment_id ASC");

        let enrollments = builder
            .build_query_as::<WorkerCourse>()
            .fetch_all(&self.pool)
            .await?;

        Ok(enrollments)
    }

    async fn create_government_department(
        &self,
        req: CreateGovernmentDepartmentRequest,
    ) -> RepoResult<GovernmentDepartment> {
        let department = sqlx::query_as::<_, GovernmentDepartment>(
            r#"
            INSERT INTO government_departments (name, description, contact_email, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING department_id, name, description, contact_email, created_at
            "#,
        )
        .bind(req.name)
        .bind(req.description)
        .bind(req.contact_email)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(on_insert("Government department already exists"))?;

        Ok(department)
    }

    async fn list_government_departments(&self) -> RepoResult<Vec<GovernmentDepartment>> {
        let departments = sqlx::query_as::<_, GovernmentDepartment>(
            r#"
            SELECT department_id, name, description, contact_email, created_at
            FROM government_departments
            ORDER BY department_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(departments)
    }

    async fn create_government_program(
        &self,
        req: CreateGovernmentProgramRequest,
    ) -> RepoResult<GovernmentProgram> {
        let mut tx = self.begin_write().await?;
        ensure_exists(
            &mut tx,
            DEPARTMENT_EXISTS,
            req.department_id,
            "Government department not found",
        )
        .await?;

        let program = sqlx::query_as::<_, GovernmentProgram>(
            r#"
            INSERT INTO government_programs
                (department_id, name, description, eligibility_criteria, skills_focus, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING program_id, department_id, name, description, eligibility_criteria,
                      skills_focus, created_at
            "#,
        )
        .bind(req.department_id)
        .bind(req.name)
        .bind(req.description)
        .bind(req.eligibility_criteria)
        .bind(Json(req.skills_focus))
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(program)
    }

    async fn list_government_programs(
        &self,
        department_id: Option<i64>,
    ) -> RepoResult<Vec<GovernmentProgram>> {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            r#"
            SELECT program_id, department_id, name, description, eligibility_criteria,
                   skills_focus, created_at
            FROM government_programs
            WHERE 1 = 1
            "#,
        );

        if let Some(id) = department_id {
            builder.push(" AND department_id = ");
            builder.push_bind(id);
        }

        builder.push(" ORDER BY program_id ASC");

        let programs = builder
            .build_query_as::<GovernmentProgram>()
            .fetch_all(&self.pool)
            .await?;

        Ok(programs)
    }

    async fn create_training_institution(
        &self,
        req: CreateTrainingInstitutionRequest,
    ) -> RepoResult<TrainingInstitution> {
        let institution = sqlx::query_as::<_, TrainingInstitution>(
            r#"
            INSERT INTO training_institutions
                (name, accreditation_body, accreditation_number, location, is_accredited,
                 created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            RETURNING institution_id, name, accreditation_body, accreditation_number,
                      location, is_accredited, created_at
            "#,
        )
        .bind(req.name)
        .bind(req.accreditation_body)
        .bind(req.accreditation_number)
        .bind(req.location)
        .bind(req.is_accredited)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(on_insert("Accreditation number already exists"))?;

        Ok(institution)
    }

    async fn list_training_institutions(&self) -> RepoResult<Vec<TrainingInstitution>> {
        let institutions = sqlx::query_as::<_, TrainingInstitution>(
            r#"
            SELECT institution_id, name, accreditation_body, accreditation_number,
                   location, is_accredited, created_at
            FROM training_institutions
            ORDER BY institution_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(institutions)
    }

    /// create_qualification
    ///
    /// A current qualification is stored without an `end_date`.
    async fn create_qualification(
        &self,
        user_id: i64,
        req: CreateQualificationRequest,
    ) -> RepoResult<Qualification> {
        let mut tx = self.begin_write().await?;
        ensure_exists(&mut tx, USER_EXISTS, user_id, "User not found").await?;

        let end_date = if req.is_current { None } else { req.end_date };

        let qualification = sqlx::query_as::<_, Qualification>(
            r#"
            INSERT INTO qualifications
                (user_id, qualification_type, institution, field_of_study, qualification_name,
                 start_date, end_date, is_current, grade_or_gpa, description, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING qualification_id, user_id, qualification_type, institution,
                      field_of_study, qualification_name, start_date, end_date, is_current,
                      grade_or_gpa, description, created_at
            "#,
        )
        .bind(user_id)
        .bind(req.qualification_type)
        .bind(req.institution)
        .bind(req.field_of_study)
        .bind(req.qualification_name)
        .bind(req.start_date)
        .bind(end_date)
        .bind(req.is_current)
        .bind(req.grade_or_gpa)
        .bind(req.description)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(qualification)
    }

    async fn list_qualifications(&self, user_id: i64) -> RepoResult<Vec<Qualification>> {
        // Latest end date first; open-ended entries after dated ones.
        let qualifications = sqlx::query_as::<_, Qualification>(
            r#"
            SELECT qualification_id, user_id, qualification_type, institution,
                   field_of_study, qualification_name, start_date, end_date, is_current,
                   grade_or_gpa, description, created_at
            FROM qualifications
            WHERE user_id = ?
            ORDER BY end_date IS NULL, end_date DESC, start_date DESC, qualification_id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(qualifications)
    }

    async fn create_saved_job(&self, user_id: i64, job_id: i64) -> RepoResult<SavedJob> {
        let mut tx = self.begin_write().await?;
        ensure_exists(&mut tx, USER_EXISTS, user_id, "User not found").await?;
        ensure_exists(&mut tx, JOB_EXISTS, job_id, "Job not found").await?;

        let saved_job_id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO saved_jobs (user_id, job_id, saved_at)
            VALUES (?, ?, ?)
            RETURNING saved_job_id
            "#,
        )
        .bind(user_id)
        .bind(job_id)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(on_insert("Job is already saved"))?;

        let sql = format!("{SAVED_JOB_SELECT} WHERE s.saved_job_id = ?");
        let saved = sqlx::query_as::<_, SavedJob>(&sql)
            .bind(saved_job_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(saved)
    }

    async fn list_saved_jobs(&self, user_id: i64) -> RepoResult<Vec<SavedJob>> {
        let sql = format!("{SAVED_JOB_SELECT} WHERE s.user_id = ? ORDER BY s.saved_job_id DESC");
        let saved = sqlx::query_as::<_, SavedJob>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(saved)
    }

    async fn user_stats(&self, user_id: i64) -> RepoResult<Option<UserStats>> {
        let counts: Option<(i64, i64)> = sqlx::query_as(
            r#"
            SELECT
                (SELECT COUNT(*)
                 FROM applications a
                 JOIN workers w ON w.worker_id = a.worker_id
                 WHERE w.user_id = u.user_id),
                (SELECT COUNT(*) FROM saved_jobs s WHERE s.user_id = u.user_id)
            FROM users u
            WHERE u.user_id = ?
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(counts.map(|(applications_count, saved_jobs_count)| UserStats {
            applications_count,
            saved_jobs_count,
        }))
    }

    async fn create_business(&self, req: CreateBusinessRequest) -> RepoResult<Business> {
        let mut tx = self.begin_write().await?;
        if let Some(employer_id) = req.employer_id {
            ensure_exists(&mut tx, EMPLOYER_EXISTS, employer_id, "Employer not found").await?;
        }

        let business = sqlx::query_as::<_, Business>(
            r#"
            INSERT INTO businesses
                (employer_id, name, registration_number, industry, location, description,
                 contact_email, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING business_id, employer_id, name, registration_number, industry,
                      location, description, contact_email, created_at
            "#,
        )
        .bind(req.employer_id)
        .bind(req.name)
        .bind(req.registration_number)
        .bind(req.industry)
        .bind(req.location)
        .bind(req.description)
        .bind(req.contact_email)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await
        .map_err(on_insert("Business registration number already exists"))?;

        tx.commit().await?;
        Ok(business)
    }

    async fn list_businesses(&self) -> RepoResult<Vec<Business>> {
        let businesses = sqlx::query_as::<_, Business>(
            r#"
            SELECT business_id, employer_id, name, registration_number, industry,
                   location, description, contact_email, created_at
            FROM businesses
            ORDER BY business_id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(businesses)
    }
}
