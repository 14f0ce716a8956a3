mod record;
mod records;
mod session;

pub use record::Record;
pub use records::{Records, TrackerConfig, TrackerState};
pub use session::Session;
