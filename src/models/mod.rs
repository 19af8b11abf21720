// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Coordinate, DonorCandidate, MatchQuery, MatchResult, MatchSettings, Notification, NotificationKind, Role};
pub use requests::{CreateBloodRequest, CreateEmergencyRequest, RequestType};
pub use responses::{CreateEmergencyResponse, CreateRequestResponse, ErrorResponse, HealthResponse};
