use crate::models::{DoctorRecord, MapMarker};

/// One marker per doctor with a usable location, in directory order.
pub fn to_markers(doctors: &[DoctorRecord]) -> Vec<MapMarker> {
    doctors
        .iter()
        .filter_map(|doctor| {
            let point = doctor.location?;
            Some(MapMarker {
                id: doctor.id.clone(),
                lat: point.latitude,
                lng: point.longitude,
                title: doctor.display_name(),
                description: doctor.profession.clone().unwrap_or_default(),
            })
        })
        .collect()
}
