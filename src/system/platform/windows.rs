use super::{IoStats, PlatformExtensions};
use crate::system::delta::{CpuTimes, SystemCpuTimes};
use crate::system::error::{CollectError, Result};

pub struct Platform;

use windows_sys::Win32::{
    Foundation::{
        CloseHandle, ERROR_ACCESS_DENIED, FILETIME, GetLastError, HANDLE, INVALID_HANDLE_VALUE,
    },
    System::Diagnostics::ToolHelp::{
        CreateToolhelp32Snapshot, TH32CS_SNAPTHREAD, THREADENTRY32, Thread32First, Thread32Next,
    },
    System::Threading::{
        GetProcessIoCounters, GetProcessTimes, GetSystemTimes, GetThreadTimes, IO_COUNTERS,
        OpenProcess, OpenThread, PROCESS_QUERY_INFORMATION, PROCESS_QUERY_LIMITED_INFORMATION,
        THREAD_QUERY_LIMITED_INFORMATION,
    },
};

/// Closes the wrapped handle on drop.
struct OwnedHandle(HANDLE);

impl Drop for OwnedHandle {
    fn drop(&mut self) {
        unsafe {
            CloseHandle(self.0);
        }
    }
}

fn empty_filetime() -> FILETIME {
    FILETIME {
        dwLowDateTime: 0,
        dwHighDateTime: 0,
    }
}

fn filetime_ticks(ft: &FILETIME) -> u64 {
    (u64::from(ft.dwHighDateTime) << 32) | u64::from(ft.dwLowDateTime)
}

fn open_process(pid: u32, access: u32) -> Result<OwnedHandle> {
    let handle = unsafe { OpenProcess(access, 0, pid) };
    if handle.is_null() {
        let err = unsafe { GetLastError() };
        return Err(if err == ERROR_ACCESS_DENIED {
            CollectError::AccessDenied(pid)
        } else {
            CollectError::NotFound(pid)
        });
    }
    Ok(OwnedHandle(handle))
}

/// Visit every entry of a system-wide thread snapshot.
fn for_each_thread(mut visit: impl FnMut(&THREADENTRY32)) -> Result<()> {
    let snapshot = unsafe { CreateToolhelp32Snapshot(TH32CS_SNAPTHREAD, 0) };
    if snapshot == INVALID_HANDLE_VALUE {
        return Err(CollectError::io(
            "CreateToolhelp32Snapshot",
            std::io::Error::last_os_error(),
        ));
    }
    let snapshot = OwnedHandle(snapshot);

    let mut entry: THREADENTRY32 = unsafe { std::mem::zeroed() };
    entry.dwSize = std::mem::size_of::<THREADENTRY32>() as u32;
    let mut ok = unsafe { Thread32First(snapshot.0, &mut entry) };
    while ok != 0 {
        visit(&entry);
        ok = unsafe { Thread32Next(snapshot.0, &mut entry) };
    }
    Ok(())
}

fn thread_times(tid: u32) -> Option<CpuTimes> {
    let handle = unsafe { OpenThread(THREAD_QUERY_LIMITED_INFORMATION, 0, tid) };
    if handle.is_null() {
        return None;
    }
    let handle = OwnedHandle(handle);
    let (mut creation, mut exit, mut kernel, mut user) = (
        empty_filetime(),
        empty_filetime(),
        empty_filetime(),
        empty_filetime(),
    );
    let ok = unsafe { GetThreadTimes(handle.0, &mut creation, &mut exit, &mut kernel, &mut user) };
    (ok != 0).then(|| CpuTimes {
        kernel: filetime_ticks(&kernel),
        user: filetime_ticks(&user),
    })
}

impl PlatformExtensions for Platform {
    fn system_cpu_times() -> Result<SystemCpuTimes> {
        let (mut idle, mut kernel, mut user) = (empty_filetime(), empty_filetime(), empty_filetime());
        let ok = unsafe { GetSystemTimes(&mut idle, &mut kernel, &mut user) };
        if ok == 0 {
            return Err(CollectError::io(
                "GetSystemTimes",
                std::io::Error::last_os_error(),
            ));
        }
        Ok(SystemCpuTimes {
            idle: filetime_ticks(&idle),
            kernel: filetime_ticks(&kernel),
            user: filetime_ticks(&user),
        })
    }

    fn process_cpu_times(pid: u32) -> Result<CpuTimes> {
        let handle = open_process(pid, PROCESS_QUERY_LIMITED_INFORMATION)?;
        let (mut creation, mut exit, mut kernel, mut user) = (
            empty_filetime(),
            empty_filetime(),
            empty_filetime(),
            empty_filetime(),
        );
        let ok =
            unsafe { GetProcessTimes(handle.0, &mut creation, &mut exit, &mut kernel, &mut user) };
        if ok == 0 {
            return Err(CollectError::AccessDenied(pid));
        }
        Ok(CpuTimes {
            kernel: filetime_ticks(&kernel),
            user: filetime_ticks(&user),
        })
    }

    fn thread_cpu_times(pid: u32) -> Result<Vec<(u32, Option<CpuTimes>)>> {
        let mut tids = Vec::new();
        for_each_thread(|entry| {
            if entry.th32OwnerProcessID == pid {
                tids.push(entry.th32ThreadID);
            }
        })?;
        if tids.is_empty() {
            return Err(CollectError::NotFound(pid));
        }
        Ok(tids.into_iter().map(|tid| (tid, thread_times(tid))).collect())
    }

    fn process_io(pid: u32) -> Option<IoStats> {
        let handle = open_process(pid, PROCESS_QUERY_INFORMATION).ok()?;
        let mut counters: IO_COUNTERS = unsafe { std::mem::zeroed() };
        let ok = unsafe { GetProcessIoCounters(handle.0, &mut counters) };
        if ok == 0 {
            return None;
        }
        Some(IoStats {
            read_bytes: counters.ReadTransferCount,
            write_bytes: counters.WriteTransferCount,
        })
    }

    fn thread_count(pid: u32) -> Option<u32> {
        let mut count = 0u32;
        for_each_thread(|entry| {
            if entry.th32OwnerProcessID == pid {
                count += 1;
            }
        })
        .ok()?;
        (count > 0).then_some(count)
    }
}
