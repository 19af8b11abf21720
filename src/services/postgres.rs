use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::time::Duration;

use crate::models::{CreateBloodRequest, CreateEmergencyRequest, DonorCandidate, NotificationKind};
use crate::services::registry::{DonorRegistry, RegistryError, RequestStore, StoreError};

/// PostgreSQL-backed donor registry and request store
///
/// Donors live in the shared `users` table (role = 'donor'); requests,
/// emergencies and in-app notifications each have their own table.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

#[async_trait]
impl DonorRegistry for PostgresClient {
    async fn fetch_donors(
        &self,
        blood_group: &str,
        available_only: bool,
    ) -> Result<Vec<DonorCandidate>, RegistryError> {
        // Ordered by id so ties in distance resolve the same way every call
        let query = r#"
            SELECT id, COALESCE(name, '') AS name, phone, blood_group,
                   latitude, longitude, is_available
            FROM users
            WHERE role = 'donor'
              AND blood_group = $1
              AND ($2 = FALSE OR is_available = TRUE)
            ORDER BY id
        "#;

        let rows = sqlx::query(query)
            .bind(blood_group)
            .bind(available_only)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;

        rows.iter()
            .map(|row| -> Result<DonorCandidate, sqlx::Error> {
                Ok(DonorCandidate {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    phone: row.try_get("phone")?,
                    blood_group: row.try_get("blood_group")?,
                    latitude: row.try_get("latitude")?,
                    longitude: row.try_get("longitude")?,
                    is_available: row.try_get("is_available")?,
                })
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| RegistryError::Unavailable(e.to_string()))
    }
}

#[async_trait]
impl RequestStore for PostgresClient {
    async fn create_patient_request(
        &self,
        patient_id: i64,
        request: &CreateBloodRequest,
    ) -> Result<i64, StoreError> {
        let query = r#"
            INSERT INTO patient_requests
                (patient_id, blood_group, units_required, request_type, scheduled_date,
                 latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id
        "#;

        let row = sqlx::query(query)
            .bind(patient_id)
            .bind(&request.blood_group)
            .bind(request.units_required)
            .bind(request.request_type.as_str())
            .bind(&request.scheduled_date)
            .bind(request.latitude)
            .bind(request.longitude)
            .fetch_one(&self.pool)
            .await?;

        let id: i64 = row.try_get("id")?;
        tracing::debug!("Stored patient request {} for patient {}", id, patient_id);
        Ok(id)
    }

    async fn create_emergency_request(
        &self,
        hospital_id: i64,
        request: &CreateEmergencyRequest,
    ) -> Result<i64, StoreError> {
        let query = r#"
            INSERT INTO emergency_requests
                (hospital_id, blood_group, units_required, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
        "#;

        let row = sqlx::query(query)
            .bind(hospital_id)
            .bind(&request.blood_group)
            .bind(request.units_required)
            .bind(request.latitude)
            .bind(request.longitude)
            .fetch_one(&self.pool)
            .await?;

        let id: i64 = row.try_get("id")?;
        tracing::debug!("Stored emergency {} for hospital {}", id, hospital_id);
        Ok(id)
    }

    async fn record_notification(
        &self,
        user_id: i64,
        message: &str,
        kind: NotificationKind,
    ) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO notifications (user_id, message, type)
            VALUES ($1, $2, $3)
        "#;

        sqlx::query(query)
            .bind(user_id)
            .bind(message)
            .bind(kind.as_str())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
