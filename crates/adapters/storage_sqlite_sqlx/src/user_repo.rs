//! `SQLite` implementation of [`UserRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use labhub_app::ports::UserRepository;
use labhub_domain::error::LabHubError;
use labhub_domain::id::UserId;
use labhub_domain::user::{TokenDigest, User};

use crate::codec::{decode_id, decode_optional_time, decode_time, encode_time};
use crate::error::StorageError;

/// Wrapper for converting database rows into domain [`User`].
struct Wrapper(User);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<User> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let created_at: String = row.try_get("created_at")?;
        let default_hub_id: Option<String> = row.try_get("default_hub_id")?;

        Ok(Self(User {
            id: decode_id(&id)?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            image: row.try_get("image")?,
            admin: row.try_get("admin")?,
            last_sign_in_ip: row.try_get("last_sign_in_ip")?,
            current_sign_in_ip: row.try_get("current_sign_in_ip")?,
            last_sign_in_at: decode_optional_time(row.try_get("last_sign_in_at")?)?,
            current_sign_in_at: decode_optional_time(row.try_get("current_sign_in_at")?)?,
            created_at: decode_time(&created_at)?,
            default_hub_id: default_hub_id.as_deref().map(decode_id).transpose()?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO users (id, name, email, image, admin, token_digest, created_at, default_hub_id)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM users WHERE id = ?";
const SELECT_BY_TOKEN_DIGEST: &str = "SELECT * FROM users WHERE token_digest = ?";
const SELECT_BY_EMAIL: &str = "SELECT * FROM users WHERE email = ?";
const UPDATE: &str = r"
    UPDATE users SET name = ?, email = ?, image = ?, admin = ?,
        last_sign_in_ip = ?, current_sign_in_ip = ?, last_sign_in_at = ?, current_sign_in_at = ?,
        default_hub_id = ?
    WHERE id = ?
";
const COUNT: &str = "SELECT COUNT(*) FROM users";

/// `SQLite`-backed user repository.
#[derive(Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Create a new repository using the given connection pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl UserRepository for SqliteUserRepository {
    fn create(
        &self,
        user: User,
        digest: TokenDigest,
    ) -> impl Future<Output = Result<User, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(user.id.to_string())
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.image)
                .bind(user.admin)
                .bind(digest.as_str())
                .bind(encode_time(&user.created_at))
                .bind(user.default_hub_id.map(|id| id.to_string()))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(user)
        }
    }

    fn get_by_id(
        &self,
        id: UserId,
    ) -> impl Future<Output = Result<Option<User>, LabHubError>> + Send {
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

    fn find_by_token_digest(
        &self,
        digest: &TokenDigest,
    ) -> impl Future<Output = Result<Option<User>, LabHubError>> + Send {
        let pool = self.pool.clone();
        let digest = digest.as_str().to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_TOKEN_DIGEST)
                .bind(digest)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<User>, LabHubError>> + Send {
        let pool = self.pool.clone();
        let email = email.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_EMAIL)
                .bind(email)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn update(&self, user: User) -> impl Future<Output = Result<User, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE)
                .bind(&user.name)
                .bind(&user.email)
                .bind(&user.image)
                .bind(user.admin)
                .bind(&user.last_sign_in_ip)
                .bind(&user.current_sign_in_ip)
                .bind(user.last_sign_in_at.as_ref().map(encode_time))
                .bind(user.current_sign_in_at.as_ref().map(encode_time))
                .bind(user.default_hub_id.map(|id| id.to_string()))
                .bind(user.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(user)
        }
    }

    fn count(&self) -> impl Future<Output = Result<usize, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let count: i64 = sqlx::query_scalar(COUNT)
                .fetch_one(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(usize::try_from(count).unwrap_or_default())
        }
    }
}
