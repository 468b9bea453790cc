use std::fs;

use super::{IoStats, PlatformExtensions};
use crate::system::delta::{CpuTimes, SystemCpuTimes};
use crate::system::error::{CollectError, Result};

pub struct Platform;

impl PlatformExtensions for Platform {
    fn system_cpu_times() -> Result<SystemCpuTimes> {
        let contents = fs::read_to_string("/proc/stat")
            .map_err(|e| CollectError::io("reading /proc/stat", e))?;
        parse_system_stat(&contents)
            .ok_or_else(|| CollectError::Enumeration("malformed /proc/stat".to_string()))
    }

    fn process_cpu_times(pid: u32) -> Result<CpuTimes> {
        let contents = fs::read_to_string(format!("/proc/{pid}/stat"))
            .map_err(|e| CollectError::for_entity(pid, e))?;
        parse_stat_times(&contents).ok_or(CollectError::NotFound(pid))
    }

    fn thread_cpu_times(pid: u32) -> Result<Vec<(u32, Option<CpuTimes>)>> {
        let entries = fs::read_dir(format!("/proc/{pid}/task"))
            .map_err(|e| CollectError::for_entity(pid, e))?;
        let mut threads = Vec::new();
        for entry in entries.flatten() {
            let Some(tid) = entry
                .file_name()
                .to_str()
                .and_then(|name| name.parse::<u32>().ok())
            else {
                continue;
            };
            // Threads can exit between listing and reading.
            match fs::read_to_string(entry.path().join("stat")) {
                Ok(contents) => threads.push((tid, parse_stat_times(&contents))),
                Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                    threads.push((tid, None));
                }
                Err(_) => continue,
            }
        }
        Ok(threads)
    }

    fn process_io(pid: u32) -> Option<IoStats> {
        let contents = fs::read_to_string(format!("/proc/{pid}/io")).ok()?;
        let mut read_bytes = None;
        let mut write_bytes = None;
        for line in contents.lines() {
            if let Some(val) = line.strip_prefix("read_bytes: ") {
                read_bytes = val.trim().parse().ok();
            } else if let Some(val) = line.strip_prefix("write_bytes: ") {
                write_bytes = val.trim().parse().ok();
            }
        }
        Some(IoStats {
            read_bytes: read_bytes?,
            write_bytes: write_bytes?,
        })
    }

    fn thread_count(pid: u32) -> Option<u32> {
        let contents = fs::read_to_string(format!("/proc/{pid}/status")).ok()?;
        contents
            .lines()
            .find_map(|line| line.strip_prefix("Threads:"))
            .and_then(|val| val.trim().parse().ok())
    }
}

/// Aggregate `cpu` line of /proc/stat:
/// user nice system idle iowait irq softirq steal ...
fn parse_system_stat(contents: &str) -> Option<SystemCpuTimes> {
    let line = contents.lines().find(|l| l.starts_with("cpu "))?;
    let fields: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|f| f.parse().unwrap_or(0))
        .collect();
    if fields.len() < 4 {
        return None;
    }
    let at = |i: usize| fields.get(i).copied().unwrap_or(0);
    let idle = at(3) + at(4);
    Some(SystemCpuTimes {
        idle,
        kernel: at(2) + at(5) + at(6) + at(7) + idle,
        user: at(0) + at(1),
    })
}

/// utime/stime from a /proc/<pid>/stat or /proc/<pid>/task/<tid>/stat line.
fn parse_stat_times(contents: &str) -> Option<CpuTimes> {
    // comm may contain spaces and parens, so split after the last ')'
    let after_comm = contents.rfind(')')? + 1;
    let fields: Vec<&str> = contents[after_comm..].split_whitespace().collect();
    // state(0) ppid(1) pgrp(2) session(3) tty_nr(4) tpgid(5) flags(6)
    // minflt(7) cminflt(8) majflt(9) cmajflt(10) utime(11) stime(12)
    let user = fields.get(11)?.parse().ok()?;
    let kernel = fields.get(12)?.parse().ok()?;
    Some(CpuTimes { kernel, user })
}
