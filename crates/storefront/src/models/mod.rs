//! Session-held models for the storefront.

pub mod flash;
pub mod session;

pub use flash::{Flash, FlashKind};
pub use session::{Badges, RecentSearches, keys as session_keys};
