pub mod availability;
pub mod geo;
pub mod loader;
pub mod markers;
pub mod proximity;
pub mod search;
pub mod specialty;
pub mod state;

pub use availability::{evaluate, is_available_now};
pub use geo::normalize_location;
pub use loader::{normalize_document, DirectoryLoader};
pub use markers::to_markers;
pub use proximity::{distance_km, nearby};
pub use search::filter;
pub use specialty::build_index;
pub use state::{DirectoryState, LoadGeneration, LoadTicket};
