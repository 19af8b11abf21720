use crate::core::distance::{great_circle_distance, round_km};
use crate::models::{Coordinate, DonorCandidate, MatchQuery, MatchResult, MatchSettings};
use crate::services::registry::{DonorRegistry, RegistryError};

/// Donor matching engine
///
/// # Pipeline Stages
/// 1. Blood group + availability filter
/// 2. Drop donors without a known location
/// 3. Radius filter on the great-circle distance
/// 4. Rank by distance and cap the list
///
/// The matcher holds only its settings, so one instance can be shared by
/// every request handler.
#[derive(Debug, Clone)]
pub struct DonorMatcher {
    settings: MatchSettings,
}

impl DonorMatcher {
    pub fn new(settings: MatchSettings) -> Self {
        Self { settings }
    }

    pub fn with_default_settings() -> Self {
        Self {
            settings: MatchSettings::default(),
        }
    }

    pub fn settings(&self) -> &MatchSettings {
        &self.settings
    }

    /// Fetch donors for `blood_group` from the registry and rank them
    ///
    /// Performs exactly one registry read. A registry failure is returned
    /// as-is; no partial result is produced.
    pub async fn find_matching_donors(
        &self,
        registry: &dyn DonorRegistry,
        blood_group: &str,
        origin: Coordinate,
    ) -> Result<Vec<MatchResult>, RegistryError> {
        let donors = registry.fetch_donors(blood_group, true).await?;

        tracing::debug!(
            "Registry returned {} available {} donors",
            donors.len(),
            blood_group
        );

        let query = MatchQuery::new(blood_group, origin);
        Ok(self.rank(&query, &donors))
    }

    /// Filter and rank a donor snapshot against a query
    ///
    /// Pure: the input slice is left untouched and a new list is returned,
    /// sorted by rounded distance with ties kept in input order.
    pub fn rank(&self, query: &MatchQuery, donors: &[DonorCandidate]) -> Vec<MatchResult> {
        let mut matched: Vec<MatchResult> = donors
            .iter()
            // Stage 1: exact blood group, available only
            .filter(|donor| donor.is_available && donor.blood_group == query.blood_group)
            // Stage 2 & 3: located donors inside the radius
            .filter_map(|donor| {
                let location = donor.coordinate()?;
                let distance_km =
                    great_circle_distance(&query.origin, &location, self.settings.earth_radius_km);

                if distance_km <= self.settings.max_radius_km {
                    Some(MatchResult {
                        id: donor.id,
                        name: donor.name.clone(),
                        phone: donor.phone.clone(),
                        distance_km: round_km(distance_km),
                    })
                } else {
                    None
                }
            })
            .collect();

        // Stage 4: nearest first (sort_by is stable)
        matched.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        matched.truncate(self.settings.max_results);
        matched
    }
}

impl Default for DonorMatcher {
    fn default() -> Self {
        Self::with_default_settings()
    }
}
