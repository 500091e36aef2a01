//! `SQLite` implementation of [`PrinterRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use labhub_app::ports::PrinterRepository;
use labhub_domain::error::LabHubError;
use labhub_domain::id::{PrinterId, UserId};
use labhub_domain::printer::Printer;

use crate::codec::{decode_id, decode_time, encode_time};
use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`Printer`].
struct Wrapper(Printer);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Printer> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let owner_id: String = row.try_get("owner_id")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(Printer {
            id: decode_id(&id)?,
            name: row.try_get("name")?,
            model: row.try_get("model")?,
            owner_id: decode_id(&owner_id)?,
            created_at: decode_time(&created_at)?,
        }))
    }
}

const INSERT: &str =
    "INSERT INTO printers (id, name, model, owner_id, created_at) VALUES (?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM printers WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM printers ORDER BY created_at";
const SELECT_BY_OWNER: &str = "SELECT * FROM printers WHERE owner_id = ? ORDER BY created_at";
const DELETE_BY_ID: &str = "DELETE FROM printers WHERE id = ?";

/// `SQLite`-backed printer repository.
#[derive(Clone)]
pub struct SqlitePrinterRepository {
    pool: SqlitePool,
}

impl SqlitePrinterRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl PrinterRepository for SqlitePrinterRepository {
    fn create(
        &self,
        printer: Printer,
    ) -> impl Future<Output = Result<Printer, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(printer.id.to_string())
                .bind(&printer.name)
                .bind(&printer.model)
                .bind(printer.owner_id.to_string())
                .bind(encode_time(&printer.created_at))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(printer)
        }
    }

    fn get_by_id(
        &self,
        id: PrinterId,
    ) -> impl Future<Output = Result<Option<Printer>, LabHubError>> + Send {
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

    fn get_all(&self) -> impl Future<Output = Result<Vec<Printer>, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_ALL)
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn find_by_owner(
        &self,
        owner_id: UserId,
    ) -> impl Future<Output = Result<Vec<Printer>, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_OWNER)
                .bind(owner_id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn delete(&self, id: PrinterId) -> impl Future<Output = Result<(), LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(DELETE_BY_ID)
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(())
        }
    }
}
