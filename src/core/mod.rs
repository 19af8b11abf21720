// Core algorithm exports
pub mod distance;
pub mod matcher;

pub use distance::{great_circle_distance, haversine_distance, round_km, EARTH_RADIUS_KM};
pub use matcher::DonorMatcher;
