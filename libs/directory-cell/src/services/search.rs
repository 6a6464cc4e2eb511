use crate::models::{DoctorRecord, SearchSurface, ALL_SPECIALTIES};

/// Visible subset of the directory for the selected chip and query.
///
/// Stable: the result keeps the input order. `filter(l, "All", "", _)`
/// returns `l` unchanged.
pub fn filter(
    doctors: &[DoctorRecord],
    selected_specialty: &str,
    query: &str,
    surface: SearchSurface,
) -> Vec<DoctorRecord> {
    let needle = query.to_lowercase();

    doctors
        .iter()
        .filter(|d| matches_specialty(d, selected_specialty))
        .filter(|d| matches_query(d, &needle, surface))
        .cloned()
        .collect()
}

pub fn matches_specialty(doctor: &DoctorRecord, selected_specialty: &str) -> bool {
    selected_specialty == ALL_SPECIALTIES
        || doctor.profession.as_deref() == Some(selected_specialty)
}

/// `needle` must already be lowercased.
fn matches_query(doctor: &DoctorRecord, needle: &str, surface: SearchSurface) -> bool {
    if needle.is_empty() {
        return true;
    }

    // records without a name or profession never match a text query
    let (Some(name), Some(profession)) = (doctor.full_name.as_deref(), doctor.profession.as_deref()) else {
        return false;
    };

    let contains = |field: &str| field.to_lowercase().contains(needle);

    contains(name)
        || contains(profession)
        || (surface.include_city && doctor.city.as_deref().is_some_and(contains))
}
