use std::collections::HashMap;

use super::delta::CpuTimes;

/// Last-seen tick counts per pid or tid.
///
/// Rebuilt from scratch every pass and swapped in with [`CpuTimeCache::replace`],
/// so it only ever holds the entities observed by the previous pass.
#[derive(Debug, Default)]
pub struct CpuTimeCache {
    entries: HashMap<u32, CpuTimes>,
}

impl CpuTimeCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
        }
    }

    pub fn get(&self, id: u32) -> Option<CpuTimes> {
        self.entries.get(&id).copied()
    }

    pub fn insert(&mut self, id: u32, times: CpuTimes) {
        self.entries.insert(id, times);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Discard the current entries and adopt `next` wholesale.
    pub fn replace(&mut self, next: CpuTimeCache) {
        self.entries = next.entries;
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
