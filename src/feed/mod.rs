pub mod dedup;
pub mod pager;
pub mod session;

pub use dedup::{dedup, Deduplicator};
pub use pager::Pager;
pub use session::FeedSession;
