//! In-memory cache structures backing the dynamic resolver.

pub mod backing;
pub mod negative;

pub use backing::BackingStore;
pub use negative::NegativeLookupCache;
