pub mod booking;
pub mod mail;

pub use booking::BookingService;
pub use mail::{MailComposer, SystemMailComposer};
