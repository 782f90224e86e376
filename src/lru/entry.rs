//! Cache Entry Module
//!
//! Defines the structure stored for each key in the eviction engine.

// == Cache Entry ==
/// A single cached value together with the capacity it consumes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    /// Owning key, kept so eviction can drop the index mapping
    pub key: String,
    /// The stored bytes
    pub value: Vec<u8>,
    /// Capacity units charged for this entry (1 or byte length)
    pub weight: u64,
}

impl CacheEntry {
    // == Constructor ==
    pub fn new(key: String, value: Vec<u8>, weight: u64) -> Self {
        Self { key, value, weight }
    }

    // == Replace ==
    /// Swaps in a new value and weight, returning the previous weight.
    pub fn replace(&mut self, value: Vec<u8>, weight: u64) -> u64 {
        self.value = value;
        std::mem::replace(&mut self.weight, weight)
    }
}
