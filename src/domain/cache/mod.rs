//! Persistent store abstraction for the cache tiers

mod repository;

pub use repository::{glob_matcher, Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
