use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::models::{CreateBloodRequest, CreateEmergencyRequest, DonorCandidate, Notification, NotificationKind};

/// Errors surfaced by the donor registry
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Donor registry unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur when persisting requests and notifications
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),
}

/// Read access to registered donors
#[async_trait]
pub trait DonorRegistry: Send + Sync {
    /// Donors whose stored blood group equals `blood_group` exactly,
    /// restricted to available donors when `available_only` is set
    async fn fetch_donors(
        &self,
        blood_group: &str,
        available_only: bool,
    ) -> Result<Vec<DonorCandidate>, RegistryError>;
}

/// Persistence for the workflows that trigger matching
#[async_trait]
pub trait RequestStore: Send + Sync {
    async fn create_patient_request(
        &self,
        patient_id: i64,
        request: &CreateBloodRequest,
    ) -> Result<i64, StoreError>;

    async fn create_emergency_request(
        &self,
        hospital_id: i64,
        request: &CreateEmergencyRequest,
    ) -> Result<i64, StoreError>;

    async fn record_notification(
        &self,
        user_id: i64,
        message: &str,
        kind: NotificationKind,
    ) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Stored patient request
#[derive(Debug, Clone)]
pub struct StoredPatientRequest {
    pub id: i64,
    pub patient_id: i64,
    pub request: CreateBloodRequest,
}

/// Stored emergency
#[derive(Debug, Clone)]
pub struct StoredEmergency {
    pub id: i64,
    pub hospital_id: i64,
    pub request: CreateEmergencyRequest,
}

#[derive(Debug, Default)]
struct MemoryTables {
    donors: Vec<DonorCandidate>,
    patient_requests: Vec<StoredPatientRequest>,
    emergencies: Vec<StoredEmergency>,
    notifications: Vec<Notification>,
}

/// Process-local registry and store
///
/// Used when no database is configured, and by tests. Reads clone the
/// donor table under a read lock, so every fetch sees a consistent snapshot.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<MemoryTables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_donors(donors: Vec<DonorCandidate>) -> Self {
        Self {
            tables: RwLock::new(MemoryTables {
                donors,
                ..MemoryTables::default()
            }),
        }
    }

    /// Register a donor, or replace the one with the same id
    pub async fn upsert_donor(&self, donor: DonorCandidate) {
        let mut tables = self.tables.write().await;
        match tables.donors.iter_mut().find(|d| d.id == donor.id) {
            Some(existing) => *existing = donor,
            None => tables.donors.push(donor),
        }
    }

    /// Load donors from a JSON array, returning how many were registered
    pub async fn load_donors_json(&self, json: &str) -> Result<usize, serde_json::Error> {
        let donors: Vec<DonorCandidate> = serde_json::from_str(json)?;
        let count = donors.len();
        for donor in donors {
            self.upsert_donor(donor).await;
        }
        Ok(count)
    }

    pub async fn set_availability(&self, donor_id: i64, is_available: bool) -> bool {
        let mut tables = self.tables.write().await;
        match tables.donors.iter_mut().find(|d| d.id == donor_id) {
            Some(donor) => {
                donor.is_available = is_available;
                true
            }
            None => false,
        }
    }

    pub async fn patient_requests(&self) -> Vec<StoredPatientRequest> {
        self.tables.read().await.patient_requests.clone()
    }

    pub async fn emergencies(&self) -> Vec<StoredEmergency> {
        self.tables.read().await.emergencies.clone()
    }

    pub async fn notifications(&self) -> Vec<Notification> {
        self.tables.read().await.notifications.clone()
    }
}

#[async_trait]
impl DonorRegistry for InMemoryStore {
    async fn fetch_donors(
        &self,
        blood_group: &str,
        available_only: bool,
    ) -> Result<Vec<DonorCandidate>, RegistryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .donors
            .iter()
            .filter(|d| d.blood_group == blood_group && (!available_only || d.is_available))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RequestStore for InMemoryStore {
    async fn create_patient_request(
        &self,
        patient_id: i64,
        request: &CreateBloodRequest,
    ) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        let id = tables.patient_requests.len() as i64 + 1;
        tables.patient_requests.push(StoredPatientRequest {
            id,
            patient_id,
            request: request.clone(),
        });
        Ok(id)
    }

    async fn create_emergency_request(
        &self,
        hospital_id: i64,
        request: &CreateEmergencyRequest,
    ) -> Result<i64, StoreError> {
        let mut tables = self.tables.write().await;
        let id = tables.emergencies.len() as i64 + 1;
        tables.emergencies.push(StoredEmergency {
            id,
            hospital_id,
            request: request.clone(),
        });
        Ok(id)
    }

    async fn record_notification(
        &self,
        user_id: i64,
        message: &str,
        kind: NotificationKind,
    ) -> Result<(), StoreError> {
        self.tables.write().await.notifications.push(Notification {
            user_id,
            message: message.to_string(),
            kind,
        });
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donor(id: i64, blood_group: &str, available: bool) -> DonorCandidate {
        DonorCandidate {
            id,
            name: format!("Donor {}", id),
            phone: None,
            blood_group: blood_group.to_string(),
            latitude: Some(0.0),
            longitude: Some(0.0),
            is_available: available,
        }
    }

    #[test]
    fn test_fetch_filters_blood_group_and_availability() {
        let store = InMemoryStore::with_donors(vec![
            donor(1, "A+", true),
            donor(2, "A+", false),
            donor(3, "B+", true),
        ]);

        let available = tokio_test::block_on(store.fetch_donors("A+", true)).unwrap();
        assert_eq!(available.len(), 1);
        assert_eq!(available[0].id, 1);

        let all = tokio_test::block_on(store.fetch_donors("A+", false)).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_upsert_and_toggle_availability() {
        let store = InMemoryStore::new();
        store.upsert_donor(donor(1, "O-", true)).await;
        store.upsert_donor(donor(1, "O+", true)).await;

        assert!(store.fetch_donors("O-", true).await.unwrap().is_empty());
        assert_eq!(store.fetch_donors("O+", true).await.unwrap().len(), 1);

        assert!(store.set_availability(1, false).await);
        assert!(!store.set_availability(99, false).await);
        assert!(store.fetch_donors("O+", true).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_load_donors_json() {
        let store = InMemoryStore::new();
        let loaded = store
            .load_donors_json(
                r#"[
                    {"id": 1, "name": "Meera", "phone": "+919000000001", "blood_group": "A+",
                     "latitude": 12.97, "longitude": 77.59},
                    {"id": 2, "name": "Kabir", "blood_group": "A+", "is_available": false}
                ]"#,
            )
            .await
            .unwrap();

        assert_eq!(loaded, 2);
        let donors = store.fetch_donors("A+", true).await.unwrap();
        assert_eq!(donors.len(), 1);
        assert_eq!(donors[0].name, "Meera");

        assert!(store.load_donors_json("not json").await.is_err());
    }

    #[tokio::test]
    async fn test_records_notifications() {
        let store = InMemoryStore::new();
        store
            .record_notification(4, "hello", NotificationKind::Emergency)
            .await
            .unwrap();

        let notifications = store.notifications().await;
        assert_eq!(notifications.len(), 1);
        assert_eq!(notifications[0].user_id, 4);
        assert_eq!(notifications[0].kind, NotificationKind::Emergency);
    }
}
