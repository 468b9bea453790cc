use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use serde::Serialize;

pub const UNKNOWN_NAME: &str = "<unknown>";
pub const ACCESS_DENIED_NAME: &str = "<access denied>";

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SystemSample {
    pub memory_total: u64,
    pub memory_used: u64,
    pub memory_load_percent: f64,
    pub cpu_load_percent: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessSample {
    pub pid: u32,
    pub name: String,
    pub memory_bytes: u64,
    pub cpu_percent: f64,
}

/// CPU usage of one thread of the focus process, relative to system ticks.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ThreadSample {
    pub tid: u32,
    pub cpu_percent: f64,
}

/// On-demand attributes for one process; all zero when it cannot be read.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ExtraProcessDetail {
    pub thread_count: u32,
    pub io_read_bytes: u64,
    pub io_write_bytes: u64,
}

/// One completed sampling pass.
///
/// `processes` is ordered by memory, `threads` by CPU, both descending.
/// `sequence` is the pass number; the store starts out holding sequence 0.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Snapshot {
    pub sequence: u64,
    pub focus_pid: Option<u32>,
    pub system: SystemSample,
    pub processes: Vec<ProcessSample>,
    pub threads: Vec<ThreadSample>,
}

impl Snapshot {
    pub fn process(&self, pid: u32) -> Option<&ProcessSample> {
        self.processes.iter().find(|p| p.pid == pid)
    }
}

/// Holds the latest published snapshot.
///
/// Both sides hold the lock only long enough to swap or clone an `Arc`, so a
/// reader never waits on a sampling pass and the sampler never waits on a
/// reader. Consumers that want every snapshot block in
/// [`SnapshotStore::wait_newer`] instead of polling.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    current: Mutex<Arc<Snapshot>>,
    published: Condvar,
}

impl SnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publish(&self, snapshot: Snapshot) {
        let next = Arc::new(snapshot);
        let previous = std::mem::replace(&mut *self.current.lock(), next);
        // Dropping the old snapshot happens outside the critical section.
        drop(previous);
        self.published.notify_all();
    }

    pub fn read(&self) -> Arc<Snapshot> {
        Arc::clone(&self.current.lock())
    }

    /// First snapshot whose sequence is past `after`, or `None` if nothing
    /// newer is published within `timeout`.
    pub fn wait_newer(&self, after: u64, timeout: Duration) -> Option<Arc<Snapshot>> {
        let deadline = Instant::now() + timeout;
        let mut current = self.current.lock();
        while current.sequence <= after {
            if self.published.wait_until(&mut current, deadline).timed_out() {
                break;
            }
        }
        (current.sequence > after).then(|| Arc::clone(&current))
    }
}
