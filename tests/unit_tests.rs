// Unit tests for BloodLink donor matching

use bloodlink::core::{
    distance::{great_circle_distance, haversine_distance, round_km, EARTH_RADIUS_KM},
    DonorMatcher,
};
use bloodlink::models::{Coordinate, DonorCandidate, MatchQuery, MatchSettings};

// 1 degree of latitude on a 6371 km sphere
const KM_PER_DEGREE: f64 = 111.19492664455873;

fn donor_at_km(id: i64, blood_group: &str, km_north: f64, available: bool) -> DonorCandidate {
    DonorCandidate {
        id,
        name: format!("Donor {}", id),
        phone: Some(format!("+9198000000{:02}", id)),
        blood_group: blood_group.to_string(),
        latitude: Some(km_north / KM_PER_DEGREE),
        longitude: Some(0.0),
        is_available: available,
    }
}

fn origin_query(blood_group: &str) -> MatchQuery {
    MatchQuery::new(blood_group, Coordinate::new(0.0, 0.0))
}

#[test]
fn test_haversine_distance_zero() {
    for (lat, lon) in [(0.0, 0.0), (12.9716, 77.5946), (-33.8688, 151.2093), (89.9, -179.9)] {
        assert_eq!(haversine_distance(lat, lon, lat, lon), 0.0);
    }
}

#[test]
fn test_haversine_distance_symmetric() {
    let points = [
        (0.0, 0.0),
        (28.6139, 77.2090),
        (19.0760, 72.8777),
        (-23.5505, -46.6333),
        (51.5074, -0.1278),
        (35.6762, 139.6503),
    ];

    for &(lat1, lon1) in &points {
        for &(lat2, lon2) in &points {
            let there = haversine_distance(lat1, lon1, lat2, lon2);
            let back = haversine_distance(lat2, lon2, lat1, lon1);
            assert!((there - back).abs() < 1e-9, "{} vs {}", there, back);
        }
    }
}

#[test]
fn test_haversine_known_fixture() {
    let distance = haversine_distance(0.0, 0.0, 0.0, 1.0);
    assert!((distance - 111.19).abs() < 0.1, "Expected ~111.19km, got {}", distance);
}

#[test]
fn test_great_circle_matches_haversine_on_earth() {
    let a = Coordinate::new(12.9716, 77.5946);
    let b = Coordinate::new(13.0827, 80.2707);
    let expected = haversine_distance(a.latitude, a.longitude, b.latitude, b.longitude);
    assert_eq!(great_circle_distance(&a, &b, EARTH_RADIUS_KM), expected);
}

#[test]
fn test_round_km_two_decimals() {
    assert_eq!(round_km(1.005_1), 1.01);
    assert_eq!(round_km(7.0), 7.0);
    assert_eq!(round_km(149.996), 150.0);
}

#[test]
fn test_output_satisfies_filters() {
    let matcher = DonorMatcher::with_default_settings();
    let donors: Vec<DonorCandidate> = (0..40)
        .map(|i| {
            let blood_group = if i % 3 == 0 { "A+" } else { "B+" };
            donor_at_km(i, blood_group, (i * 7) as f64, i % 4 != 0)
        })
        .collect();

    let result = matcher.rank(&origin_query("A+"), &donors);

    assert!(!result.is_empty());
    for m in &result {
        let source = donors.iter().find(|d| d.id == m.id).unwrap();
        assert_eq!(source.blood_group, "A+");
        assert!(source.is_available);
        assert!(m.distance_km <= 150.0);
    }
}

#[test]
fn test_radius_bound_is_inclusive() {
    let boundary = Coordinate::new(1.2, 0.4);
    let exact = haversine_distance(0.0, 0.0, boundary.latitude, boundary.longitude);
    let donor = DonorCandidate {
        id: 1,
        name: "Boundary".to_string(),
        phone: None,
        blood_group: "O+".to_string(),
        latitude: Some(boundary.latitude),
        longitude: Some(boundary.longitude),
        is_available: true,
    };

    let at_bound = DonorMatcher::new(MatchSettings {
        max_radius_km: exact,
        ..MatchSettings::default()
    });
    assert_eq!(at_bound.rank(&origin_query("O+"), &[donor.clone()]).len(), 1);

    let just_inside = DonorMatcher::new(MatchSettings {
        max_radius_km: exact - 0.01,
        ..MatchSettings::default()
    });
    assert!(just_inside.rank(&origin_query("O+"), &[donor]).is_empty());
}

#[test]
fn test_default_radius_150_km() {
    let matcher = DonorMatcher::with_default_settings();
    let donors = vec![
        donor_at_km(1, "B-", 149.99, true),
        donor_at_km(2, "B-", 150.01, true),
        donor_at_km(3, "B-", 150.0, true),
    ];

    let result = matcher.rank(&origin_query("B-"), &donors);

    let ids: Vec<i64> = result.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3]);
    assert_eq!(result[0].distance_km, 149.99);
    assert_eq!(result[1].distance_km, 150.0);
}

#[test]
fn test_missing_coordinates_never_returned() {
    let matcher = DonorMatcher::with_default_settings();
    let mut no_lat = donor_at_km(1, "AB-", 1.0, true);
    no_lat.latitude = None;
    let mut no_lon = donor_at_km(2, "AB-", 1.0, true);
    no_lon.longitude = None;
    let mut neither = donor_at_km(3, "AB-", 1.0, true);
    neither.latitude = None;
    neither.longitude = None;

    assert!(matcher.rank(&origin_query("AB-"), &[no_lat, no_lon, neither]).is_empty());
}

#[test]
fn test_ordering_by_distance() {
    let matcher = DonorMatcher::with_default_settings();
    let donors = vec![
        donor_at_km(1, "A-", 5.0, true),
        donor_at_km(2, "A-", 2.0, true),
        donor_at_km(3, "A-", 8.0, true),
        donor_at_km(4, "A-", 1.0, true),
    ];

    let distances: Vec<f64> = matcher
        .rank(&origin_query("A-"), &donors)
        .iter()
        .map(|m| m.distance_km)
        .collect();

    assert_eq!(distances, vec![1.0, 2.0, 5.0, 8.0]);
}

#[test]
fn test_cap_keeps_ten_nearest() {
    let matcher = DonorMatcher::with_default_settings();
    // Farthest first so the cap has to pick, not just truncate input order
    let donors: Vec<DonorCandidate> = (1..=15)
        .rev()
        .map(|i| donor_at_km(i, "O+", i as f64 * 3.0, true))
        .collect();

    let result = matcher.rank(&origin_query("O+"), &donors);

    assert_eq!(result.len(), 10);
    let ids: Vec<i64> = result.iter().map(|m| m.id).collect();
    assert_eq!(ids, (1..=10).collect::<Vec<i64>>());
}

#[test]
fn test_fewer_than_cap_returns_all() {
    let matcher = DonorMatcher::with_default_settings();
    let donors: Vec<DonorCandidate> = (1..=3).map(|i| donor_at_km(i, "O+", i as f64, true)).collect();

    assert_eq!(matcher.rank(&origin_query("O+"), &donors).len(), 3);
}

#[test]
fn test_empty_input() {
    let matcher = DonorMatcher::with_default_settings();
    assert!(matcher.rank(&origin_query("O-"), &[]).is_empty());
}
