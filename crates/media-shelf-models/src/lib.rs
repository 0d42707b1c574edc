pub mod candidate;
pub mod record;
pub mod status;

pub use candidate::{Candidate, Recommendation};
pub use record::{MediaType, Record};
pub use status::WATCHLIST;
