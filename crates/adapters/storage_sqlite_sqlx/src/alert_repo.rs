//! `SQLite` implementation of [`AlertRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use labhub_app::ports::AlertRepository;
use labhub_domain::alert::Alert;
use labhub_domain::error::LabHubError;
use labhub_domain::id::JobId;

use crate::codec::{decode_id, decode_time, encode_time};
use crate::error::StorageError;

struct Wrapper(Alert);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let job_id: String = row.try_get("job_id")?;
        let printer_id: String = row.try_get("printer_id")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(Alert {
            id: decode_id(&id)?,
            job_id: decode_id(&job_id)?,
            printer_id: decode_id(&printer_id)?,
            from_status: row.try_get("from_status")?,
            to_status: row.try_get("to_status")?,
            created_at: decode_time(&created_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO alerts (id, job_id, printer_id, from_status, to_status, created_at)
    VALUES (?, ?, ?, ?, ?, ?)
";
const SELECT_BY_JOB: &str =
    "SELECT * FROM alerts WHERE job_id = ? ORDER BY created_at DESC, id DESC";

/// `SQLite`-backed job alert log.
#[derive(Clone)]
pub struct SqliteAlertRepository {
    pool: SqlitePool,
}

impl SqliteAlertRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl AlertRepository for SqliteAlertRepository {
    fn record(&self, alert: Alert) -> impl Future<Output = Result<Alert, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(alert.id.to_string())
                .bind(alert.job_id.to_string())
                .bind(alert.printer_id.to_string())
                .bind(&alert.from_status)
                .bind(&alert.to_status)
                .bind(encode_time(&alert.created_at))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(alert)
        }
    }

    fn find_by_job(
        &self,
        job_id: JobId,
    ) -> impl Future<Output = Result<Vec<Alert>, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_JOB)
                .bind(job_id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}
