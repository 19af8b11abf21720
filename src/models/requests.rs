use serde::{Deserialize, Serialize};
use validator::Validate;

/// When the patient needs the blood
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    Immediate,
    Scheduled,
}

impl RequestType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestType::Immediate => "immediate",
            RequestType::Scheduled => "scheduled",
        }
    }
}

/// Patient blood request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateBloodRequest {
    #[validate(length(min = 1))]
    pub blood_group: String,
    #[validate(range(min = 1))]
    pub units_required: i32,
    pub request_type: RequestType,
    #[serde(default)]
    pub scheduled_date: Option<String>,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

/// Emergency raised by a hospital or admin
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEmergencyRequest {
    #[validate(length(min = 1))]
    pub blood_group: String,
    #[validate(range(min = 1))]
    pub units_required: i32,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[serde(default)]
    pub hospital_name: Option<String>,
}
