pub mod backend;

pub use backend::{ApiError, BackendClient};

/// Collection holding doctor records.
pub const DOCTORS: &str = "doctors";
/// Collection holding one profile document per account.
pub const USERS: &str = "users";
/// Collection holding appointment requests.
pub const APPOINTMENTS: &str = "appointments";
