use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KillResult {
    Success(u32),
    Failed(u32, String),
    NotFound(u32),
}

/// Forcefully end `pid`. Looks the process up in a private `System` so it
/// can run on any thread without touching the sampler's state.
pub fn kill_process(pid: u32) -> KillResult {
    if pid == 0 {
        return KillResult::NotFound(pid);
    }

    let sysinfo_pid = Pid::from_u32(pid);
    let mut sys = System::new();
    sys.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[sysinfo_pid]),
        true,
        ProcessRefreshKind::nothing(),
    );

    match sys.process(sysinfo_pid) {
        Some(process) => {
            if process.kill() {
                KillResult::Success(pid)
            } else {
                #[cfg(target_os = "windows")]
                let reason = format!("Failed to terminate PID {pid} (access denied?)");
                #[cfg(not(target_os = "windows"))]
                let reason = format!("Failed to send SIGKILL to PID {pid} (permission denied?)");
                KillResult::Failed(pid, reason)
            }
        }
        None => KillResult::NotFound(pid),
    }
}
