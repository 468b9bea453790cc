use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, System};

use super::delta::{CpuTimes, SystemCpuTimes};
use super::error::{CollectError, Result};
use super::platform;
use super::snapshot::{ACCESS_DENIED_NAME, UNKNOWN_NAME};

/// Instantaneous physical memory figures; all zero when unavailable.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MemoryStatus {
    pub total_bytes: u64,
    pub used_bytes: u64,
    pub load_percent: f64,
}

impl MemoryStatus {
    pub fn from_totals(total_bytes: u64, used_bytes: u64) -> Self {
        let load_percent = if total_bytes > 0 {
            used_bytes as f64 * 100.0 / total_bytes as f64
        } else {
            0.0
        };
        Self {
            total_bytes,
            used_bytes,
            load_percent,
        }
    }
}

/// One live process as enumerated. `times` is `None` when its tick counters
/// could not be read; the process is still listed.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessRecord {
    pub pid: u32,
    pub name: String,
    pub memory_bytes: u64,
    pub times: Option<CpuTimes>,
}

impl ProcessRecord {
    /// Placeholder row for a process whose details cannot be opened.
    pub fn access_denied(pid: u32) -> Self {
        Self {
            pid,
            name: ACCESS_DENIED_NAME.to_string(),
            memory_bytes: 0,
            times: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThreadRecord {
    pub tid: u32,
    pub times: Option<CpuTimes>,
}

/// OS-facing reads the sampler performs once per pass, in this order:
/// memory, system ticks, processes, then threads of the focus target.
pub trait EntitySource: Send {
    fn memory(&mut self) -> MemoryStatus;
    fn system_cpu_times(&mut self) -> Result<SystemCpuTimes>;
    fn processes(&mut self) -> Result<Vec<ProcessRecord>>;
    fn threads(&mut self, owner: u32) -> Result<Vec<ThreadRecord>>;
}

impl<T: EntitySource + ?Sized> EntitySource for Box<T> {
    fn memory(&mut self) -> MemoryStatus {
        (**self).memory()
    }

    fn system_cpu_times(&mut self) -> Result<SystemCpuTimes> {
        (**self).system_cpu_times()
    }

    fn processes(&mut self) -> Result<Vec<ProcessRecord>> {
        (**self).processes()
    }

    fn threads(&mut self, owner: u32) -> Result<Vec<ThreadRecord>> {
        (**self).threads(owner)
    }
}

/// The live operating system: sysinfo for listing, names and memory, the
/// platform module for tick counters.
pub struct OsSource {
    sys: System,
}

impl Default for OsSource {
    fn default() -> Self {
        Self::new()
    }
}

impl OsSource {
    pub fn new() -> Self {
        OsSource { sys: System::new() }
    }
}

impl EntitySource for OsSource {
    fn memory(&mut self) -> MemoryStatus {
        self.sys.refresh_memory();
        MemoryStatus::from_totals(self.sys.total_memory(), self.sys.used_memory())
    }

    fn system_cpu_times(&mut self) -> Result<SystemCpuTimes> {
        platform::system_cpu_times()
    }

    fn processes(&mut self) -> Result<Vec<ProcessRecord>> {
        self.sys.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing().with_memory().without_tasks(),
        );
        if self.sys.processes().is_empty() {
            return Err(CollectError::Enumeration(
                "no processes visible".to_string(),
            ));
        }

        let mut records = Vec::with_capacity(self.sys.processes().len());
        for (pid, process) in self.sys.processes() {
            let pid = pid.as_u32();
            // pid 0 is the idle pseudo-process on Windows and the scheduler elsewhere.
            // Linux tasks are threads of another entry, not processes.
            if pid == 0 || process.thread_kind().is_some() {
                continue;
            }
            let record = match platform::process_cpu_times(pid) {
                Err(CollectError::AccessDenied(_)) => ProcessRecord::access_denied(pid),
                times => {
                    let name = process.name().to_string_lossy().to_string();
                    ProcessRecord {
                        pid,
                        name: if name.is_empty() {
                            UNKNOWN_NAME.to_string()
                        } else {
                            name
                        },
                        memory_bytes: process.memory(),
                        times: times.ok(),
                    }
                }
            };
            records.push(record);
        }
        Ok(records)
    }

    fn threads(&mut self, owner: u32) -> Result<Vec<ThreadRecord>> {
        Ok(platform::thread_cpu_times(owner)?
            .into_iter()
            .map(|(tid, times)| ThreadRecord { tid, times })
            .collect())
    }
}
