//! `SQLite` implementation of [`DataPointRepository`].

use std::future::Future;

use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row, SqlitePool};

use labhub_app::ports::DataPointRepository;
use labhub_domain::data_point::DataPoint;
use labhub_domain::error::LabHubError;
use labhub_domain::id::SensorId;
use labhub_domain::time::Timestamp;

use crate::codec::{decode_id, decode_time, encode_time};
use crate::error::StorageError;

struct Wrapper(DataPoint);

impl<'r> FromRow<'r, SqliteRow> for Wrapper {
    fn from_row(row: &'r SqliteRow) -> Result<Self, sqlx::Error> {
        let id: String = row.try_get("id")?;
        let sensor_id: String = row.try_get("sensor_id")?;
        let recorded_at: String = row.try_get("recorded_at")?;

        Ok(Self(DataPoint {
            id: decode_id(&id)?,
            sensor_id: decode_id(&sensor_id)?,
            value: row.try_get("value")?,
            recorded_at: decode_time(&recorded_at)?,
        }))
    }
}

const INSERT: &str =
    "INSERT INTO data_points (id, sensor_id, value, recorded_at) VALUES (?, ?, ?, ?)";
const SELECT_BY_SENSOR: &str =
    "SELECT * FROM data_points WHERE sensor_id = ? ORDER BY recorded_at ASC";
const SELECT_BY_SENSOR_SINCE: &str = r"
    SELECT * FROM data_points
    WHERE sensor_id = ? AND recorded_at >= ?
    ORDER BY recorded_at ASC
";

/// `SQLite`-backed sensor reading log.
#[derive(Clone)]
pub struct SqliteDataPointRepository {
    pool: SqlitePool,
}

impl SqliteDataPointRepository {
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

impl DataPointRepository for SqliteDataPointRepository {
    fn record(
        &self,
        point: DataPoint,
    ) -> impl Future<Output = Result<DataPoint, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            sqlx::query(INSERT)
                .bind(point.id.to_string())
                .bind(point.sensor_id.to_string())
                .bind(point.value)
                .bind(encode_time(&point.recorded_at))
                .execute(&pool)
                .await
                .map_err(StorageError::from)?;

            Ok(point)
        }
    }

    fn find_by_sensor_since(
        &self,
        sensor_id: SensorId,
        since: Option<Timestamp>,
    ) -> impl Future<Output = Result<Vec<DataPoint>, LabHubError>> + Send {
        let pool = self.pool.clone();
        async move {
            let rows: Vec<Wrapper> = match since {
                Some(since) => {
                    sqlx::query_as::<_, Wrapper>(SELECT_BY_SENSOR_SINCE)
                        .bind(sensor_id.to_string())
                        .bind(encode_time(&since))
                        .fetch_all(&pool)
                        .await
                }
                None => {
                    sqlx::query_as::<_, Wrapper>(SELECT_BY_SENSOR)
                        .bind(sensor_id.to_string())
                        .fetch_all(&pool)
                        .await
                }
            }
            .map_err(StorageError::from)?;

            Ok(rows.into_iter().map(|w| w.0).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SqliteSensorRepository;
    use crate::fixtures::{memory_pool, seed_hub, seed_user};
    use chrono::Duration;
    use labhub_app::ports::SensorRepository;
    use labhub_domain::data_point::DataPointParams;
    use labhub_domain::sensor::Sensor;
    use labhub_domain::time::now;

    async fn setup() -> (SqliteDataPointRepository, SensorId) {
        let pool = memory_pool().await;
        let owner = seed_user(&pool, "Bob").await;
        let hub = seed_hub(&pool, &owner).await;
        let sensor = Sensor::builder()
            .hub_id(hub.id)
            .friendly_id("t1")
            .build()
            .unwrap();
        SqliteSensorRepository::new(pool.clone())
            .create(sensor.clone())
            .await
            .unwrap();
        (SqliteDataPointRepository::new(pool), sensor.id)
    }

    fn reading(sensor_id: SensorId, value: f64, at: Timestamp) -> DataPoint {
        DataPoint::from_params(
            sensor_id,
            DataPointParams {
                value: Some(value),
                recorded_at: Some(at),
            },
            at,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn should_return_readings_oldest_first() {
        let (repo, sensor_id) = setup().await;
        let base = now();
        repo.record(reading(sensor_id, 2.0, base - Duration::hours(1)))
            .await
            .unwrap();
        repo.record(reading(sensor_id, 1.0, base - Duration::hours(2)))
            .await
            .unwrap();

        let values: Vec<f64> = repo
            .find_by_sensor_since(sensor_id, None)
            .await
            .unwrap()
            .into_iter()
            .map(|p| p.value)
            .collect();

        assert_eq!(values, vec![1.0, 2.0]);
    }

    #[tokio::test]
    async fn should_filter_readings_by_lower_bound() {
        let (repo, sensor_id) = setup().await;
        let base = now();
        for hours in [48, 12, 1] {
            repo.record(reading(
                sensor_id,
                f64::from(hours),
                base - Duration::hours(i64::from(hours)),
            ))
            .await
            .unwrap();
        }

        let recent = repo
            .find_by_sensor_since(sensor_id, Some(base - Duration::hours(24)))
            .await
            .unwrap();

        assert_eq!(
            recent.iter().map(|p| p.value).collect::<Vec<_>>(),
            vec![12.0, 1.0]
        );
    }
}
