//! Cache Configuration Module
//!
//! Each bounded cache is created from its configuration struct. Capacity is
//! carried as a `NonZeroUsize` so a constructed config is always valid; the
//! fallible `usize` validation lives in each cache's `new` constructor,
//! which reports [`CacheError::InvalidCapacity`](crate::CacheError) for a
//! zero capacity.
//!
//! The TTL cache has no configuration: it is unbounded and its wheel
//! geometry is fixed.

use core::fmt;
use core::num::NonZeroUsize;

macro_rules! capacity_config {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy)]
        pub struct $name {
            /// Maximum number of key-value pairs the cache can hold.
            capacity: NonZeroUsize,
        }

        impl $name {
            /// Creates a new configuration with the given capacity.
            pub fn new(capacity: NonZeroUsize) -> Self {
                Self { capacity }
            }

            /// Returns the maximum number of key-value pairs the cache can hold.
            pub fn capacity(&self) -> NonZeroUsize {
                self.capacity
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("capacity", &self.capacity)
                    .finish()
            }
        }
    };
}

capacity_config! {
    /// Configuration for an LRU (Least Recently Used) cache.
    LruCacheConfig
}

capacity_config! {
    /// Configuration for an MRU (Most Recently Used) cache.
    MruCacheConfig
}

capacity_config! {
    /// Configuration for an LFU (Least Frequently Used) cache.
    LfuCacheConfig
}

capacity_config! {
    /// Configuration for a Random Replacement cache.
    RrCacheConfig
}
