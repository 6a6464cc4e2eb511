use crate::models::{DoctorRecord, GeoPoint, NearbyDoctor};

/// Mean Earth radius (IUGG).
const EARTH_RADIUS_KM: f64 = 6371.0088;

/// Great-circle distance between two points, in kilometres.
pub fn distance_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1 = from.latitude.to_radians();
    let lat2 = to.latitude.to_radians();
    let d_lat = (to.latitude - from.latitude).to_radians();
    let d_lng = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Doctors with a known location within `radius_km` of `origin`, nearest
/// first. Equal distances keep directory order.
pub fn nearby(doctors: &[DoctorRecord], origin: GeoPoint, radius_km: f64) -> Vec<NearbyDoctor> {
    let mut found: Vec<NearbyDoctor> = doctors
        .iter()
        .filter_map(|doctor| {
            let distance = distance_km(origin, doctor.location?);
            (distance <= radius_km).then(|| NearbyDoctor {
                doctor: doctor.clone(),
                distance_km: distance,
            })
        })
        .collect();

    found.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    found
}
