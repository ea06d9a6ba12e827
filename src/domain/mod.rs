pub mod item;

pub use item::{EmbedDescriptor, FeedItem, FeedItemBuilder, ItemKind, Platform};
