use std::collections::BTreeSet;

use crate::models::{DoctorRecord, ALL_SPECIALTIES};

/// Filter chips for the directory: `"All"` followed by every distinct
/// profession in ascending order.
///
/// Suspended records and records without a profession contribute nothing.
/// Professions compare exactly, so `"Dentist"` and `"dentist"` are two chips.
pub fn build_index(doctors: &[DoctorRecord]) -> Vec<String> {
    let professions: BTreeSet<&str> = doctors
        .iter()
        .filter(|d| !d.is_suspended)
        .filter_map(|d| d.profession.as_deref())
        .filter(|p| *p != ALL_SPECIALTIES)
        .collect();

    std::iter::once(ALL_SPECIALTIES)
        .chain(professions)
        .map(str::to_string)
        .collect()
}
