//! `SQLite` implementation of [`JobRepository`].
//!
//! The progress document is kept as a JSON column.

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use labhub_app::ports::JobRepository;
use labhub_domain::error::LabHubError;
use labhub_domain::id::{JobId, PrinterId};
use labhub_domain::job::{Job, JobData};

use crate::codec::{decode_id, decode_time, encode_time};
use crate::error::StorageError;

struct Wrapper(Job);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Job> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let printer_id: String = row.try_get("printer_id")?;
        let created_by: String = row.try_get("created_by_user_id")?;
        let data_json: String = row.try_get("data")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        let data: JobData =
            serde_json::from_str(&data_json).map_err(|err| sqlx::Error::Decode(Box::new(err)))?;

        Ok(Self(Job {
            id: decode_id(&id)?,
            printer_id: decode_id(&printer_id)?,
            model: row.try_get("model")?,
            model_file_name: row.try_get("model_file_name")?,
            data,
            created_by_user_id: decode_id(&created_by)?,
            created_at: decode_time(&created_at)?,
            updated_at: decode_time(&updated_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO jobs (id, printer_id, model, model_file_name, data, created_by_user_id, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM jobs WHERE id = ?";
const SELECT_BY_PRINTER: &str =
    "SELECT * FROM jobs WHERE printer_id = ? ORDER BY created_at DESC, id DESC";
const UPDATE: &str = r"
    UPDATE jobs SET model = ?, model_file_name = ?, data = ?, updated_at = ?
    WHERE id = ?
";

/// `SQLite`-backed job repository.
#[derive(Clone)]
pub struct SqliteJobRepository {
    pool: SqlitePool,
}

impl SqliteJobRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl JobRepository for SqliteJobRepository {
    fn create(&self, job: Job) -> impl Future<Output = Result<Job, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let data = serde_json::to_string(&job.data).map_err(StorageError::from)?;
            sqlx::query(INSERT)
                .bind(job.id.to_string())
                .bind(job.printer_id.to_string())
                .bind(&job.model)
                .bind(&job.model_file_name)
                .bind(data)
                .bind(job.created_by_user_id.to_string())
                .bind(encode_time(&job.created_at))
                .bind(encode_time(&job.updated_at))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(job)
        }
    }

    fn get_by_id(
        &self,
        id: JobId,
    ) -> impl Future<Output = Result<Option<Job>, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_ID)
                .bind(id.to_string())
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn find_by_printer(
        &self,
        printer_id: PrinterId,
    ) -> impl Future<Output = Result<Vec<Job>, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_PRINTER)
                .bind(printer_id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn update(&self, job: Job) -> impl Future<Output = Result<Job, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let data = serde_json::to_string(&job.data).map_err(StorageError::from)?;
            sqlx::query(UPDATE)
                .bind(&job.model)
                .bind(&job.model_file_name)
                .bind(data)
                .bind(encode_time(&job.updated_at))
                .bind(job.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(job)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{memory_pool, seed_printer, seed_user};
    use chrono::Duration;
    use labhub_domain::job::{Filament, JobFile, Progress};
    use labhub_domain::time::now;

    fn full_data() -> JobData {
        JobData {
            file: Some(JobFile {
                date: Some(1_700_000_000),
                name: Some("benchy.gcode".into()),
                size: Some(1024),
                origin: Some("local".into()),
            }),
            status: Some("printing".into()),
            filament: Some(Filament {
                length: Some(120.5),
                volume: Some(3.2),
            }),
            progress: Some(Progress {
                file_position: Some(512),
                print_time: Some(60.0),
                completion: Some(50.0),
                print_time_left: Some(60.0),
            }),
            estimated_print_time: Some(120.0),
        }
    }

    #[tokio::test]
    async fn should_store_progress_document_as_json() {
        let pool = memory_pool().await;
        let owner = seed_user(&pool, "Bob").await;
        let printer = seed_printer(&pool, &owner).await;
        let repo = SqliteJobRepository::new(pool);
        let job = Job::builder()
            .printer_id(printer.id)
            .created_by_user_id(owner.id)
            .data(full_data())
            .build()
            .unwrap();

        repo.create(job.clone()).await.unwrap();

        let fetched = repo.get_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(fetched.data, full_data());
        assert_eq!(fetched.status(), Some("printing"));
    }

    #[tokio::test]
    async fn should_list_jobs_newest_first() {
        let pool = memory_pool().await;
        let owner = seed_user(&pool, "Bob").await;
        let printer = seed_printer(&pool, &owner).await;
        let repo = SqliteJobRepository::new(pool);
        let base = now();
        let mut ids = Vec::new();
        for minutes in [30, 10, 20] {
            let job = Job::builder()
                .printer_id(printer.id)
                .created_by_user_id(owner.id)
                .created_at(base - Duration::minutes(minutes))
                .build()
                .unwrap();
            ids.push((minutes, job.id));
            repo.create(job).await.unwrap();
        }
        ids.sort_by_key(|(minutes, _)| *minutes);

        let listed: Vec<JobId> = repo
            .find_by_printer(printer.id)
            .await
            .unwrap()
            .into_iter()
            .map(|j| j.id)
            .collect();

        assert_eq!(listed, ids.into_iter().map(|(_, id)| id).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn should_update_model_and_status() {
        let pool = memory_pool().await;
        let owner = seed_user(&pool, "Bob").await;
        let printer = seed_printer(&pool, &owner).await;
        let repo = SqliteJobRepository::new(pool);
        let mut job = Job::builder()
            .printer_id(printer.id)
            .created_by_user_id(owner.id)
            .build()
            .unwrap();
        repo.create(job.clone()).await.unwrap();

        job.set_status("paused", now());
        job.model = Some("uploads/job/model/x/part.stl".into());
        repo.update(job.clone()).await.unwrap();

        let fetched = repo.get_by_id(job.id).await.unwrap().unwrap();
        assert_eq!(fetched.status(), Some("paused"));
        assert_eq!(fetched.model, job.model);
    }
}
