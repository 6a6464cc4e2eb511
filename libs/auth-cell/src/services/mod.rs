pub mod account;
pub mod auth;
pub mod profile;
pub mod session;

pub use account::AccountService;
pub use auth::AuthService;
pub use profile::ProfileService;
pub use session::SessionStore;
