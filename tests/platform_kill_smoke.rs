use std::process::{Child, Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use hostpulse::system::kill::{KillResult, kill_process};
use hostpulse::system::{OsControl, ProcessControl};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};

fn spawn_long_lived_child() -> Child {
    #[cfg(windows)]
    let mut cmd = {
        let mut c = Command::new("powershell");
        c.args([
            "-NoProfile",
            "-NonInteractive",
            "-Command",
            "Start-Sleep -Seconds 30",
        ]);
        c
    };

    #[cfg(not(windows))]
    let mut cmd = {
        let mut c = Command::new("sh");
        c.args(["-c", "sleep 30"]);
        c
    };

    cmd.stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .expect("failed to spawn child process")
}

fn wait_for_pid(pid: u32, timeout: Duration) -> bool {
    let mut sys = System::new();
    let sys_pid = Pid::from_u32(pid);
    let deadline = Instant::now() + timeout;
    loop {
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[sys_pid]),
            true,
            ProcessRefreshKind::nothing(),
        );
        if sys.process(sys_pid).is_some() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn wait_for_exit(child: &mut Child) {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        match child.try_wait() {
            Ok(Some(_)) => return,
            Ok(None) if Instant::now() < deadline => {
                thread::sleep(Duration::from_millis(50));
            }
            Ok(None) => {
                let _ = child.kill();
                panic!("child process did not exit before timeout");
            }
            Err(err) => {
                let _ = child.kill();
                panic!("failed waiting for child exit: {err}");
            }
        }
    }
}

#[test]
fn kill_nonexistent_pid_returns_not_found() {
    let result = kill_process(u32::MAX);
    assert!(matches!(result, KillResult::NotFound(_)));
}

#[test]
fn kill_spawned_child_terminates() {
    let mut child = spawn_long_lived_child();
    let pid = child.id();

    if !wait_for_pid(pid, Duration::from_secs(3)) {
        let _ = child.kill();
        panic!("child process PID {pid} was not observed before kill attempt");
    }

    match kill_process(pid) {
        KillResult::Success(killed) => {
            assert_eq!(killed, pid);
            wait_for_exit(&mut child);
        }
        KillResult::Failed(_, reason) => {
            let _ = child.kill();
            panic!("kill_process reported failure: {reason}");
        }
        KillResult::NotFound(_) => {
            let _ = child.kill();
            panic!("child process not found");
        }
    }
}

#[test]
fn os_control_terminates_and_ignores_unknown_pids() {
    OsControl.terminate(u32::MAX);
    OsControl.terminate(0);

    let mut child = spawn_long_lived_child();
    let pid = child.id();
    if !wait_for_pid(pid, Duration::from_secs(3)) {
        let _ = child.kill();
        panic!("child process PID {pid} was not observed before terminate");
    }

    OsControl.terminate(pid);
    wait_for_exit(&mut child);
}

#[cfg(any(target_os = "linux", target_os = "windows"))]
#[test]
fn os_control_reads_detail_for_self() {
    let detail = OsControl.extra_detail(std::process::id());
    assert!(detail.thread_count >= 1);
    assert_eq!(OsControl.extra_detail(u32::MAX), Default::default());
}
