//! `SQLite` implementation of [`HubRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use labhub_app::ports::HubRepository;
use labhub_domain::error::LabHubError;
use labhub_domain::hub::Hub;
use labhub_domain::id::{HubId, UserId};

use crate::codec::{decode_id, decode_time, encode_time};
use crate::error::StorageError;

struct Wrapper(Hub);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Hub> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let owner_id: String = row.try_get("owner_id")?;
        let created_at: String = row.try_get("created_at")?;

        Ok(Self(Hub {
            id: decode_id(&id)?,
            name: row.try_get("name")?,
            location: row.try_get("location")?,
            owner_id: decode_id(&owner_id)?,
            created_at: decode_time(&created_at)?,
        }))
    }
}

const INSERT: &str =
    "INSERT INTO hubs (id, name, location, owner_id, created_at) VALUES (?, ?, ?, ?, ?)";
const SELECT_BY_ID: &str = "SELECT * FROM hubs WHERE id = ?";
const SELECT_ALL: &str = "SELECT * FROM hubs ORDER BY created_at";
const SELECT_BY_OWNER: &str = "SELECT * FROM hubs WHERE owner_id = ? ORDER BY created_at";
const DELETE_BY_ID: &str = "DELETE FROM hubs WHERE id = ?";

/// `SQLite`-backed hub repository.
#[derive(Clone)]
pub struct SqliteHubRepository {
    pool: SqlitePool,
}

impl SqliteHubRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl HubRepository for SqliteHubRepository {
    fn create(&self, hub: Hub) -> impl Future<Output = Result<Hub, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(hub.id.to_string())
                .bind(&hub.name)
                .bind(&hub.location)
                .bind(hub.owner_id.to_string())
                .bind(encode_time(&hub.created_at))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(hub)
        }
    }

    fn get_by_id(
        &self,
        id: HubId,
    ) -> impl Future<Output = Result<Option<Hub>, LabHubError>> + Send {
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

    fn get_all(&self) -> impl Future<Output = Result<Vec<Hub>, LabHubError>> + Send {
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
    ) -> impl Future<Output = Result<Vec<Hub>, LabHubError>> + Send {
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

    fn delete(&self, id: HubId) -> impl Future<Output = Result<(), LabHubError>> + Send {
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
