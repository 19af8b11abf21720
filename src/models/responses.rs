use serde::{Deserialize, Serialize};
use crate::models::domain::MatchResult;

/// Response for the patient request endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateRequestResponse {
    pub message: String,
    pub request_id: i64,
    pub matched_donors: Vec<MatchResult>,
}

/// Response for the emergency endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEmergencyResponse {
    pub message: String,
    pub emergency_id: i64,
    pub matched_donors_count: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
