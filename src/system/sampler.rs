use tracing::{debug, debug_span, warn};

use super::cache::CpuTimeCache;
use super::delta::{SystemCpuTimes, cpu_percent, interval_ticks, system_load};
use super::error::CollectError;
use super::snapshot::{ProcessSample, Snapshot, SystemSample, ThreadSample};
use super::source::EntitySource;

/// Runs one sampling pass at a time against an [`EntitySource`], carrying
/// the tick history needed to turn counters into rates.
pub struct Sampler<S> {
    source: S,
    last_system: Option<SystemCpuTimes>,
    process_cache: CpuTimeCache,
    thread_cache: CpuTimeCache,
    sequence: u64,
}

impl<S: EntitySource> Sampler<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            last_system: None,
            process_cache: CpuTimeCache::new(),
            thread_cache: CpuTimeCache::new(),
            sequence: 0,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn process_cache(&self) -> &CpuTimeCache {
        &self.process_cache
    }

    pub fn thread_cache(&self) -> &CpuTimeCache {
        &self.thread_cache
    }

    /// One full pass. `focus` of 0 disables thread sampling.
    ///
    /// Never fails: a pass whose enumeration fails outright returns a
    /// zeroed snapshot and leaves empty caches behind.
    pub fn sample(&mut self, focus: u32) -> Snapshot {
        self.sequence += 1;
        let _span = debug_span!("sampler.pass", sequence = self.sequence, focus).entered();

        let focus_pid = (focus != 0).then_some(focus);
        match self.collect(focus_pid) {
            Ok(snapshot) => {
                debug!(
                    processes = snapshot.processes.len(),
                    threads = snapshot.threads.len(),
                    cpu = snapshot.system.cpu_load_percent,
                    "pass complete"
                );
                snapshot
            }
            Err(err) => {
                warn!(error = %err, "sampling pass failed, publishing empty snapshot");
                self.process_cache.clear();
                self.thread_cache.clear();
                Snapshot {
                    sequence: self.sequence,
                    focus_pid,
                    ..Snapshot::default()
                }
            }
        }
    }

    fn collect(&mut self, focus_pid: Option<u32>) -> Result<Snapshot, CollectError> {
        let memory = self.source.memory();

        let (cpu_load_percent, denominator) = match self.source.system_cpu_times() {
            Ok(current) => {
                let denominator = interval_ticks(self.last_system, current);
                let load = system_load(self.last_system, current, denominator);
                self.last_system = Some(current);
                (load, denominator)
            }
            Err(err) => {
                debug!(error = %err, "system cpu times unavailable");
                (0.0, 0)
            }
        };

        let records = self.source.processes()?;
        let mut next_processes = CpuTimeCache::with_capacity(records.len());
        let mut processes = Vec::with_capacity(records.len());
        for record in records {
            let cpu = match record.times {
                Some(times) => {
                    next_processes.insert(record.pid, times);
                    cpu_percent(self.process_cache.get(record.pid), times, denominator)
                }
                None => 0.0,
            };
            processes.push(ProcessSample {
                pid: record.pid,
                name: record.name,
                memory_bytes: record.memory_bytes,
                cpu_percent: cpu,
            });
        }

        let mut next_threads = CpuTimeCache::new();
        let mut threads = Vec::new();
        if let Some(owner) = focus_pid {
            match self.source.threads(owner) {
                Ok(records) => {
                    threads.reserve(records.len());
                    for record in records {
                        let cpu = match record.times {
                            Some(times) => {
                                next_threads.insert(record.tid, times);
                                cpu_percent(self.thread_cache.get(record.tid), times, denominator)
                            }
                            None => 0.0,
                        };
                        threads.push(ThreadSample {
                            tid: record.tid,
                            cpu_percent: cpu,
                        });
                    }
                }
                // The focus target exited, cannot be opened, or its threads
                // cannot be read on this platform; keep the rest of the pass.
                Err(err)
                    if err.is_per_entity() || matches!(err, CollectError::Unsupported(_)) =>
                {
                    debug!(error = %err, "focus threads unavailable");
                }
                Err(err) => return Err(err),
            }
        }

        sort_processes(&mut processes);
        sort_threads(&mut threads);

        self.process_cache.replace(next_processes);
        self.thread_cache.replace(next_threads);

        Ok(Snapshot {
            sequence: self.sequence,
            focus_pid,
            system: SystemSample {
                memory_total: memory.total_bytes,
                memory_used: memory.used_bytes,
                memory_load_percent: memory.load_percent,
                cpu_load_percent,
            },
            processes,
            threads,
        })
    }
}

/// Descending by resident memory; ties by pid for a stable order.
pub fn sort_processes(processes: &mut [ProcessSample]) {
    processes.sort_by(|a, b| {
        b.memory_bytes
            .cmp(&a.memory_bytes)
            .then_with(|| a.pid.cmp(&b.pid))
    });
}

/// Descending by CPU percentage; ties by tid.
pub fn sort_threads(threads: &mut [ThreadSample]) {
    threads.sort_by(|a, b| {
        b.cpu_percent
            .total_cmp(&a.cpu_percent)
            .then_with(|| a.tid.cmp(&b.tid))
    });
}
