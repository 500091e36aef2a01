//! `SQLite` implementation of [`SensorRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use labhub_app::ports::SensorRepository;
use labhub_domain::error::LabHubError;
use labhub_domain::id::{HubId, SensorId};
use labhub_domain::sensor::Sensor;

use crate::codec::{decode_id, decode_time, encode_time};
use crate::error::StorageError;

struct Wrapper(Sensor);

impl Wrapper {
    fn maybe(value: Option<Self>) -> Option<Sensor> {
        value.map(|w| w.0)
    }
}

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let hub_id: String = row.try_get("hub_id")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;

        Ok(Self(Sensor {
            id: decode_id(&id)?,
            hub_id: decode_id(&hub_id)?,
            friendly_id: row.try_get("friendly_id")?,
            category: row.try_get("category")?,
            manufacturer: row.try_get("manufacturer")?,
            model: row.try_get("model")?,
            desc: row.try_get("description")?,
            data_count: row.try_get("data_count")?,
            low_threshold: row.try_get("low_threshold")?,
            high_threshold: row.try_get("high_threshold")?,
            node_id: row.try_get("node_id")?,
            pin: row.try_get("pin")?,
            created_at: decode_time(&created_at)?,
            updated_at: decode_time(&updated_at)?,
        }))
    }
}

const INSERT: &str = r"
    INSERT INTO sensors (id, hub_id, friendly_id, category, manufacturer, model, description,
        data_count, low_threshold, high_threshold, node_id, pin, created_at, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
";
const SELECT_BY_ID: &str = "SELECT * FROM sensors WHERE id = ?";
const SELECT_BY_HUB: &str = "SELECT * FROM sensors WHERE hub_id = ? ORDER BY friendly_id";
const SELECT_BY_HUB_AND_FRIENDLY_ID: &str =
    "SELECT * FROM sensors WHERE hub_id = ? AND friendly_id = ?";
const UPDATE: &str = r"
    UPDATE sensors SET friendly_id = ?, category = ?, manufacturer = ?, model = ?, description = ?,
        data_count = ?, low_threshold = ?, high_threshold = ?, node_id = ?, pin = ?, updated_at = ?
    WHERE id = ?
";
const DELETE_BY_ID: &str = "DELETE FROM sensors WHERE id = ?";

/// `SQLite`-backed sensor repository.
#[derive(Clone)]
pub struct SqliteSensorRepository {
    pool: SqlitePool,
}

impl SqliteSensorRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl SensorRepository for SqliteSensorRepository {
    fn create(&self, sensor: Sensor) -> impl Future<Output = Result<Sensor, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(sensor.id.to_string())
                .bind(sensor.hub_id.to_string())
                .bind(&sensor.friendly_id)
                .bind(&sensor.category)
                .bind(&sensor.manufacturer)
                .bind(&sensor.model)
                .bind(&sensor.desc)
                .bind(sensor.data_count)
                .bind(sensor.low_threshold)
                .bind(sensor.high_threshold)
                .bind(sensor.node_id)
                .bind(sensor.pin)
                .bind(encode_time(&sensor.created_at))
                .bind(encode_time(&sensor.updated_at))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(sensor)
        }
    }

    fn get_by_id(
        &self,
        id: SensorId,
    ) -> impl Future<Output = Result<Option<Sensor>, LabHubError>> + Send {
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

    fn find_by_hub(
        &self,
        hub_id: HubId,
    ) -> impl Future<Output = Result<Vec<Sensor>, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = sqlx::query_as(SELECT_BY_HUB)
                .bind(hub_id.to_string())
                .fetch_all(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }

    fn find_by_hub_and_friendly_id(
        &self,
        hub_id: HubId,
        friendly_id: &str,
    ) -> impl Future<Output = Result<Option<Sensor>, LabHubError>> + Send {
        let pool = self.pool.clone();
        let friendly_id = friendly_id.to_string();
        async move {
            let row: Option<Wrapper> = sqlx::query_as(SELECT_BY_HUB_AND_FRIENDLY_ID)
                .bind(hub_id.to_string())
                .bind(friendly_id)
                .fetch_optional(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(Wrapper::maybe(row))
        }
    }

    fn update(&self, sensor: Sensor) -> impl Future<Output = Result<Sensor, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(UPDATE)
                .bind(&sensor.friendly_id)
                .bind(&sensor.category)
                .bind(&sensor.manufacturer)
                .bind(&sensor.model)
                .bind(&sensor.desc)
                .bind(sensor.data_count)
                .bind(sensor.low_threshold)
                .bind(sensor.high_threshold)
                .bind(sensor.node_id)
                .bind(sensor.pin)
                .bind(encode_time(&sensor.updated_at))
                .bind(sensor.id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(sensor)
        }
    }

    fn delete(&self, id: SensorId) -> impl Future<Output = Result<bool, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let result = sqlx::query(DELETE_BY_ID)
                .bind(id.to_string())
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(result.rows_affected() > 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteDataPointRepository;
    use crate::fixtures::{memory_pool, seed_hub, seed_user};
    use labhub_app::ports::DataPointRepository;
    use labhub_domain::data_point::{DataPoint, DataPointParams};
    use labhub_domain::time::now;

    async fn setup() -> (SqliteSensorRepository, SqlitePool, HubId) {
        let pool = memory_pool().await;
        let owner = seed_user(&pool, "Bob").await;
        let hub = seed_hub(&pool, &owner).await;
        (SqliteSensorRepository::new(pool.clone()), pool, hub.id)
    }

    fn test_sensor(hub_id: HubId, friendly_id: &str) -> Sensor {
        Sensor::builder()
            .hub_id(hub_id)
            .friendly_id(friendly_id)
            .category("humidity")
            .thresholds(20.0, 80.0)
            .pin(4)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn should_round_trip_optional_columns() {
        let (repo, _, hub_id) = setup().await;
        let sensor = test_sensor(hub_id, "h1");

        repo.create(sensor.clone()).await.unwrap();

        let fetched = repo.get_by_id(sensor.id).await.unwrap().unwrap();
        assert_eq!(fetched.friendly_id, "h1");
        assert_eq!(fetched.category.as_deref(), Some("humidity"));
        assert_eq!(fetched.low_threshold, Some(20.0));
        assert_eq!(fetched.high_threshold, Some(80.0));
        assert_eq!(fetched.pin, Some(4));
        assert!(fetched.desc.is_none());
    }

    #[tokio::test]
    async fn should_find_by_hub_and_friendly_id() {
        let (repo, _, hub_id) = setup().await;
        let sensor = test_sensor(hub_id, "h1");
        repo.create(sensor.clone()).await.unwrap();

        let found = repo
            .find_by_hub_and_friendly_id(hub_id, "h1")
            .await
            .unwrap()
            .unwrap();

        assert_eq!(found.id, sensor.id);
        assert!(
            repo.find_by_hub_and_friendly_id(hub_id, "h2")
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn should_reject_duplicate_friendly_id_in_same_hub() {
        let (repo, _, hub_id) = setup().await;
        repo.create(test_sensor(hub_id, "h1")).await.unwrap();

        let result = repo.create(test_sensor(hub_id, "h1")).await;

        assert!(matches!(result, Err(LabHubError::Storage(_))));
    }

    #[tokio::test]
    async fn should_update_sensor() {
        let (repo, _, hub_id) = setup().await;
        let mut sensor = test_sensor(hub_id, "h1");
        repo.create(sensor.clone()).await.unwrap();

        sensor.desc = Some("by the door".into());
        sensor.node_id = Some(7);
        repo.update(sensor.clone()).await.unwrap();

        let fetched = repo.get_by_id(sensor.id).await.unwrap().unwrap();
        assert_eq!(fetched.desc.as_deref(), Some("by the door"));
        assert_eq!(fetched.node_id, Some(7));
        assert_eq!(repo.find_by_hub(hub_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn should_delete_sensor_with_its_data() {
        let (repo, pool, hub_id) = setup().await;
        let sensor = test_sensor(hub_id, "h1");
        repo.create(sensor.clone()).await.unwrap();
        let data = SqliteDataPointRepository::new(pool);
        let point = DataPoint::from_params(
            sensor.id,
            DataPointParams {
                value: Some(42.0),
                recorded_at: None,
            },
            now(),
        )
        .unwrap();
        data.record(point).await.unwrap();

        assert!(repo.delete(sensor.id).await.unwrap());

        assert!(repo.get_by_id(sensor.id).await.unwrap().is_none());
        assert!(
            data.find_by_sensor_since(sensor.id, None)
                .await
                .unwrap()
                .is_empty()
        );
        assert!(!repo.delete(sensor.id).await.unwrap());
    }
}
