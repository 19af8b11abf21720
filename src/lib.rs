//! BloodLink - donor matching and emergency dispatch service
//!
//! This library provides the donor-matching engine used when a patient
//! request or a hospital emergency is created: find available donors of the
//! requested blood group near a point, rank them by distance, and hand the
//! nearest ones to the notification dispatcher.

pub mod auth;
pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{great_circle_distance, haversine_distance, DonorMatcher};
pub use models::{Coordinate, DonorCandidate, MatchQuery, MatchResult, MatchSettings};
pub use services::{DonorRegistry, RegistryError};
