
use {ahash::AHashMap, parking_lot::Mutex};

/// Number of live owners of each GEM handle of a device.
///
/// Every update is a single critical section.
#[derive(Default)]
pub struct HandleRefs {
    counts: Mutex<AHashMap<u32, usize>>,
}

impl HandleRefs {
    pub fn get(&self, handle: u32) -> usize {
        self.counts.lock().get(&handle).copied().unwrap_or(0)
    }

    pub fn increment(&self, handle: u32) -> usize {
        let mut counts = self.counts.lock();
        let count = counts.entry(handle).or_insert(0);
        *count += 1;
        *count
    }

    /// Decrementing a handle that has no owners leaves it at zero.
    pub fn decrement(&self, handle: u32) -> usize {
        let mut counts = self.counts.lock();
        let Some(count) = counts.get_mut(&handle) else {
            log::warn!("Reference count of handle {} underflowed", handle);
            return 0;
        };
        *count -= 1;
        let count = *count;
        if count == 0 {
            counts.remove(&handle);
        }
        count
    }

    /// Handles that still have owners, sorted by handle.
    pub fn leaked(&self) -> Vec<(u32, usize)> {
        let mut res: Vec<_> = self.counts.lock().iter().map(|(h, c)| (*h, *c)).collect();
        res.sort_unstable();
        res
    }

    pub fn is_empty(&self) -> bool {
        self.counts.lock().is_empty()
    }
}
