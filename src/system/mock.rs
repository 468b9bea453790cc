//! In-memory stand-in for the operating system.
//!
//! `MockSystem` is a cheaply cloneable handle to a shared process table.
//! Tests mutate the table between passes the way real processes come and go,
//! while a `Sampler` or `Monitor` reads it through [`EntitySource`] and
//! [`ProcessControl`].

use std::sync::Arc;

use parking_lot::Mutex;

use super::delta::{CpuTimes, SystemCpuTimes};
use super::error::{CollectError, Result};
use super::monitor::ProcessControl;
use super::platform::IoStats;
use super::snapshot::ExtraProcessDetail;
use super::source::{EntitySource, MemoryStatus, ProcessRecord, ThreadRecord};

#[derive(Clone, Debug, PartialEq)]
pub struct MockProcess {
    pub name: String,
    pub memory_bytes: u64,
    pub times: Option<CpuTimes>,
    pub denied: bool,
    pub threads: Vec<(u32, Option<CpuTimes>)>,
    pub io: IoStats,
}

impl MockProcess {
    pub fn new(name: &str, memory_bytes: u64) -> Self {
        Self {
            name: name.to_string(),
            memory_bytes,
            times: Some(CpuTimes::default()),
            denied: false,
            threads: Vec::new(),
            io: IoStats::default(),
        }
    }

    pub fn access_denied() -> Self {
        Self {
            name: String::new(),
            memory_bytes: 0,
            times: None,
            denied: true,
            threads: Vec::new(),
            io: IoStats::default(),
        }
    }

    pub fn with_times(mut self, kernel: u64, user: u64) -> Self {
        self.times = Some(CpuTimes::new(kernel, user));
        self
    }

    pub fn with_thread(mut self, tid: u32, kernel: u64, user: u64) -> Self {
        self.threads.push((tid, Some(CpuTimes::new(kernel, user))));
        self
    }

    pub fn with_io(mut self, read_bytes: u64, write_bytes: u64) -> Self {
        self.io = IoStats {
            read_bytes,
            write_bytes,
        };
        self
    }
}

#[derive(Debug, Default)]
struct World {
    memory: MemoryStatus,
    system_times: Option<SystemCpuTimes>,
    // Insertion order stands in for the OS enumeration order.
    processes: Vec<(u32, MockProcess)>,
    fail_enumeration: bool,
    terminated: Vec<u32>,
    detail_requests: u64,
}

impl World {
    fn process(&self, pid: u32) -> Option<&MockProcess> {
        self.processes.iter().find(|(p, _)| *p == pid).map(|(_, p)| p)
    }
}

#[derive(Clone, Debug, Default)]
pub struct MockSystem {
    world: Arc<Mutex<World>>,
}

impl MockSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_memory(&self, total_bytes: u64, used_bytes: u64) {
        self.world.lock().memory = MemoryStatus::from_totals(total_bytes, used_bytes);
    }

    pub fn set_system_times(&self, times: SystemCpuTimes) {
        self.world.lock().system_times = Some(times);
    }

    /// Make the next system tick read fail.
    pub fn clear_system_times(&self) {
        self.world.lock().system_times = None;
    }

    pub fn upsert_process(&self, pid: u32, process: MockProcess) {
        let mut world = self.world.lock();
        match world.processes.iter_mut().find(|(p, _)| *p == pid) {
            Some(slot) => slot.1 = process,
            None => world.processes.push((pid, process)),
        }
    }

    pub fn remove_process(&self, pid: u32) {
        self.world.lock().processes.retain(|(p, _)| *p != pid);
    }

    pub fn set_process_times(&self, pid: u32, kernel: u64, user: u64) {
        let mut world = self.world.lock();
        if let Some((_, process)) = world.processes.iter_mut().find(|(p, _)| *p == pid) {
            process.times = Some(CpuTimes::new(kernel, user));
        }
    }

    pub fn fail_enumeration(&self, fail: bool) {
        self.world.lock().fail_enumeration = fail;
    }

    pub fn contains(&self, pid: u32) -> bool {
        self.world.lock().process(pid).is_some()
    }

    pub fn terminated(&self) -> Vec<u32> {
        self.world.lock().terminated.clone()
    }

    /// How many extra-detail reads have been made.
    pub fn detail_requests(&self) -> u64 {
        self.world.lock().detail_requests
    }
}

impl EntitySource for MockSystem {
    fn memory(&mut self) -> MemoryStatus {
        self.world.lock().memory
    }

    fn system_cpu_times(&mut self) -> Result<SystemCpuTimes> {
        self.world
            .lock()
            .system_times
            .ok_or(CollectError::Unsupported("mock system times"))
    }

    fn processes(&mut self) -> Result<Vec<ProcessRecord>> {
        let world = self.world.lock();
        if world.fail_enumeration {
            return Err(CollectError::Enumeration("mock failure".to_string()));
        }
        Ok(world
            .processes
            .iter()
            .map(|(pid, p)| {
                if p.denied {
                    ProcessRecord::access_denied(*pid)
                } else {
                    ProcessRecord {
                        pid: *pid,
                        name: p.name.clone(),
                        memory_bytes: p.memory_bytes,
                        times: p.times,
                    }
                }
            })
            .collect())
    }

    fn threads(&mut self, owner: u32) -> Result<Vec<ThreadRecord>> {
        let world = self.world.lock();
        if world.fail_enumeration {
            return Err(CollectError::Enumeration("mock failure".to_string()));
        }
        let process = world.process(owner).ok_or(CollectError::NotFound(owner))?;
        if process.denied {
            return Err(CollectError::AccessDenied(owner));
        }
        Ok(process
            .threads
            .iter()
            .map(|&(tid, times)| ThreadRecord { tid, times })
            .collect())
    }
}

impl ProcessControl for MockSystem {
    fn terminate(&self, pid: u32) {
        let mut world = self.world.lock();
        let before = world.processes.len();
        world.processes.retain(|(p, _)| *p != pid);
        if world.processes.len() != before {
            world.terminated.push(pid);
        }
    }

    fn extra_detail(&self, pid: u32) -> ExtraProcessDetail {
        let mut world = self.world.lock();
        world.detail_requests += 1;
        match world.process(pid) {
            Some(p) if !p.denied => ExtraProcessDetail {
                thread_count: p.threads.len() as u32,
                io_read_bytes: p.io.read_bytes,
                io_write_bytes: p.io.write_bytes,
            },
            _ => ExtraProcessDetail::default(),
        }
    }
}
