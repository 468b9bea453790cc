use serde::Serialize;

use super::delta::{CpuTimes, SystemCpuTimes};
use super::error::Result;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct IoStats {
    pub read_bytes: u64,
    pub write_bytes: u64,
}

/// Raw tick and counter reads. Process and system ticks returned by one
/// implementation share a unit, so their ratios are meaningful.
pub trait PlatformExtensions {
    fn system_cpu_times() -> Result<SystemCpuTimes>;
    fn process_cpu_times(pid: u32) -> Result<CpuTimes>;
    /// Threads owned by `pid`; `None` times mean the thread could not be read.
    fn thread_cpu_times(pid: u32) -> Result<Vec<(u32, Option<CpuTimes>)>>;
    fn process_io(pid: u32) -> Option<IoStats>;
    fn thread_count(pid: u32) -> Option<u32>;
}

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
mod fallback;
#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "windows")]
mod windows;

#[cfg(not(any(target_os = "linux", target_os = "windows")))]
use fallback as platform_impl;
#[cfg(target_os = "linux")]
use linux as platform_impl;
#[cfg(target_os = "windows")]
use windows as platform_impl;

pub fn system_cpu_times() -> Result<SystemCpuTimes> {
    platform_impl::Platform::system_cpu_times()
}

pub fn process_cpu_times(pid: u32) -> Result<CpuTimes> {
    platform_impl::Platform::process_cpu_times(pid)
}

pub fn thread_cpu_times(pid: u32) -> Result<Vec<(u32, Option<CpuTimes>)>> {
    platform_impl::Platform::thread_cpu_times(pid)
}

pub fn process_io(pid: u32) -> Option<IoStats> {
    platform_impl::Platform::process_io(pid)
}

pub fn thread_count(pid: u32) -> Option<u32> {
    platform_impl::Platform::thread_count(pid)
}
