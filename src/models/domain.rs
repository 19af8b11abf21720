use serde::{Deserialize, Serialize};

/// A geographic point in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// Donor record as read from the donor registry
///
/// Coordinates are optional: donors who never shared a location are still
/// registered, they just can't be ranked by distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonorCandidate {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub blood_group: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
    #[serde(default = "default_true")]
    pub is_available: bool,
}

impl DonorCandidate {
    /// Location of the donor, if both latitude and longitude are known
    pub fn coordinate(&self) -> Option<Coordinate> {
        match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        }
    }
}

fn default_true() -> bool { true }

/// What the matcher is asked to find
#[derive(Debug, Clone)]
pub struct MatchQuery {
    /// Compared byte-for-byte against the stored blood group
    pub blood_group: String,
    pub origin: Coordinate,
}

impl MatchQuery {
    pub fn new(blood_group: impl Into<String>, origin: Coordinate) -> Self {
        Self {
            blood_group: blood_group.into(),
            origin,
        }
    }
}

/// A donor selected by the matcher, annotated with its distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub distance_km: f64,
}

/// Tunables for donor matching
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct MatchSettings {
    #[serde(default = "default_max_radius_km")]
    pub max_radius_km: f64,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    #[serde(default = "default_earth_radius_km")]
    pub earth_radius_km: f64,
}

impl Default for MatchSettings {
    fn default() -> Self {
        Self {
            max_radius_km: default_max_radius_km(),
            max_results: default_max_results(),
            earth_radius_km: default_earth_radius_km(),
        }
    }
}

fn default_max_radius_km() -> f64 { 150.0 }
fn default_max_results() -> usize { 10 }
fn default_earth_radius_km() -> f64 { 6371.0 }

/// Roles a caller can hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Donor,
    Patient,
    Hospital,
    Bloodbank,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Donor => "donor",
            Role::Patient => "patient",
            Role::Hospital => "hospital",
            Role::Bloodbank => "bloodbank",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of in-app notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Emergency,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Emergency => "emergency",
        }
    }
}

/// Stored in-app notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub user_id: i64,
    pub message: String,
    pub kind: NotificationKind,
}
