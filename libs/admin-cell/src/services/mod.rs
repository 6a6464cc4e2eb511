pub mod dashboard;
pub mod doctors;
pub mod media;
pub mod report;

pub use dashboard::dashboard_summary;
pub use doctors::DoctorAdminService;
pub use media::{CloudMediaUploader, MediaUploader};
pub use report::render_report;
