use super::{IoStats, PlatformExtensions};
use crate::system::delta::{CpuTimes, SystemCpuTimes};
use crate::system::error::{CollectError, Result};

/// Targets without a raw tick reader. Names, memory and the process list
/// still come from sysinfo.
pub struct Platform;

impl PlatformExtensions for Platform {
    fn system_cpu_times() -> Result<SystemCpuTimes> {
        Err(CollectError::Unsupported("system cpu times"))
    }

    fn process_cpu_times(_pid: u32) -> Result<CpuTimes> {
        Err(CollectError::Unsupported("process cpu times"))
    }

    fn thread_cpu_times(_pid: u32) -> Result<Vec<(u32, Option<CpuTimes>)>> {
        Err(CollectError::Unsupported("thread cpu times"))
    }

    fn process_io(_pid: u32) -> Option<IoStats> {
        None
    }

    fn thread_count(_pid: u32) -> Option<u32> {
        None
    }
}
