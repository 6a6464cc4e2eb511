use std::collections::HashSet;

use directory_cell::DoctorRecord;

use crate::models::DashboardSummary;

/// Header counts for the admin dashboard.
///
/// Distinct specialties count every profession once, including those of
/// suspended doctors; a record without a profession counts as its own
/// "unspecified" specialty.
pub fn dashboard_summary(doctors: &[DoctorRecord]) -> DashboardSummary {
    let specialties: HashSet<Option<&str>> = doctors
        .iter()
        .map(|d| d.profession.as_deref())
        .collect();

    DashboardSummary {
        total_doctors: doctors.len(),
        specialties: specialties.len(),
        suspended: doctors.iter().filter(|d| d.is_suspended).count(),
    }
}
