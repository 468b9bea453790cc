use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use parking_lot::Mutex;
use tracing::{debug, info, warn};

use super::error::{CollectError, Result};
use super::kill::{KillResult, kill_process};
use super::platform;
use super::sampler::Sampler;
use super::snapshot::{ExtraProcessDetail, Snapshot, SnapshotStore};
use super::source::{EntitySource, OsSource};

pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_secs(1);
pub const MIN_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Direct, uncached actions on processes. Called from foreground threads
/// while a pass may be running.
pub trait ProcessControl: Send + Sync {
    /// Best effort. Unknown or protected pids are ignored.
    fn terminate(&self, pid: u32);
    /// Zero-valued when the process cannot be read.
    fn extra_detail(&self, pid: u32) -> ExtraProcessDetail;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct OsControl;

impl ProcessControl for OsControl {
    fn terminate(&self, pid: u32) {
        match kill_process(pid) {
            KillResult::Success(pid) => info!(pid, "terminated process"),
            KillResult::Failed(pid, reason) => debug!(pid, %reason, "terminate failed"),
            KillResult::NotFound(pid) => debug!(pid, "terminate target not found"),
        }
    }

    fn extra_detail(&self, pid: u32) -> ExtraProcessDetail {
        let io = platform::process_io(pid).unwrap_or_default();
        ExtraProcessDetail {
            thread_count: platform::thread_count(pid).unwrap_or(0),
            io_read_bytes: io.read_bytes,
            io_write_bytes: io.write_bytes,
        }
    }
}

type SharedSampler = Arc<Mutex<Sampler<Box<dyn EntitySource>>>>;

struct Worker {
    cancel: mpsc::Sender<()>,
    handle: JoinHandle<()>,
}

/// Background sampling plus the control calls the front end makes.
///
/// `start` spawns a thread that runs a pass, publishes it and waits one
/// interval, until `stop` is called. A pass in flight always finishes and
/// publishes before the thread exits.
pub struct Monitor {
    sampler: SharedSampler,
    store: Arc<SnapshotStore>,
    focus: Arc<AtomicU32>,
    control: Arc<dyn ProcessControl>,
    interval: Duration,
    worker: Option<Worker>,
}

impl Monitor {
    pub fn new(
        source: impl EntitySource + 'static,
        control: impl ProcessControl + 'static,
        interval: Duration,
    ) -> Self {
        let source: Box<dyn EntitySource> = Box::new(source);
        Self {
            sampler: Arc::new(Mutex::new(Sampler::new(source))),
            store: Arc::new(SnapshotStore::new()),
            focus: Arc::new(AtomicU32::new(0)),
            control: Arc::new(control),
            interval: interval.max(MIN_SAMPLE_INTERVAL),
            worker: None,
        }
    }

    /// Monitor over the live operating system.
    pub fn os(interval: Duration) -> Self {
        Self::new(OsSource::new(), OsControl, interval)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|worker| !worker.handle.is_finished())
    }

    pub fn start(&mut self) -> Result<()> {
        if self.is_running() {
            debug!("monitor already running");
            return Ok(());
        }
        // Reap a worker that exited on its own before spawning a new one.
        self.stop();

        let (cancel, cancelled) = mpsc::channel::<()>();
        let sampler = Arc::clone(&self.sampler);
        let store = Arc::clone(&self.store);
        let focus = Arc::clone(&self.focus);
        let interval = self.interval;

        let handle = thread::Builder::new()
            .name("hostpulse-sampler".to_string())
            .spawn(move || {
                loop {
                    let target = focus.load(Ordering::Acquire);
                    let pass =
                        panic::catch_unwind(AssertUnwindSafe(|| sampler.lock().sample(target)));
                    match pass {
                        Ok(snapshot) => store.publish(snapshot),
                        Err(_) => warn!(focus = target, "sampling pass panicked"),
                    }
                    match cancelled.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => continue,
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
            })
            .map_err(|e| CollectError::io("spawning sampler thread", e))?;

        info!(interval_ms = interval.as_millis() as u64, "monitor started");
        self.worker = Some(Worker { cancel, handle });
        Ok(())
    }

    /// Signal the sampler thread and wait for it to exit.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        // The thread may already be gone; a closed channel stops it too.
        let _ = worker.cancel.send(());
        if worker.handle.join().is_err() {
            warn!("sampler thread panicked");
        }
        info!("monitor stopped");
    }

    pub fn read_latest(&self) -> Arc<Snapshot> {
        self.store.read()
    }

    /// Block until a snapshot newer than `after` is published, up to
    /// `timeout`.
    pub fn wait_for_snapshot(&self, after: u64, timeout: Duration) -> Option<Arc<Snapshot>> {
        self.store.wait_newer(after, timeout)
    }

    pub fn terminate(&self, pid: u32) {
        self.control.terminate(pid);
    }

    /// Takes effect on the next pass. `0` clears the focus.
    pub fn set_focus(&self, pid: u32) {
        debug!(pid, "focus changed");
        self.focus.store(pid, Ordering::Release);
    }

    pub fn focus(&self) -> Option<u32> {
        match self.focus.load(Ordering::Acquire) {
            0 => None,
            pid => Some(pid),
        }
    }

    pub fn fetch_extra_detail(&self, pid: u32) -> ExtraProcessDetail {
        self.control.extra_detail(pid)
    }
}

impl Drop for Monitor {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::delta::SystemCpuTimes;
    use crate::system::mock::{MockProcess, MockSystem};
    use crate::system::source::{MemoryStatus, ProcessRecord, ThreadRecord};
    use std::time::Instant;

    struct PanicOnce {
        inner: MockSystem,
        armed: bool,
    }

    impl EntitySource for PanicOnce {
        fn memory(&mut self) -> MemoryStatus {
            self.inner.memory()
        }

        fn system_cpu_times(&mut self) -> Result<SystemCpuTimes> {
            self.inner.system_cpu_times()
        }

        fn processes(&mut self) -> Result<Vec<ProcessRecord>> {
            if std::mem::take(&mut self.armed) {
                panic!("enumeration blew up");
            }
            self.inner.processes()
        }

        fn threads(&mut self, owner: u32) -> Result<Vec<ThreadRecord>> {
            self.inner.threads(owner)
        }
    }

    fn wait_for_sequence(monitor: &Monitor, at_least: u64) -> Arc<Snapshot> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            let snap = monitor.read_latest();
            if snap.sequence >= at_least || Instant::now() >= deadline {
                return snap;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn interval_is_floored() {
        let monitor = Monitor::new(MockSystem::new(), MockSystem::new(), Duration::ZERO);
        assert_eq!(monitor.interval(), MIN_SAMPLE_INTERVAL);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let os = MockSystem::new();
        os.set_system_times(SystemCpuTimes::default());
        os.upsert_process(1, MockProcess::new("init", 10));
        let mut monitor = Monitor::new(os.clone(), os, MIN_SAMPLE_INTERVAL);

        monitor.stop();
        assert!(!monitor.is_running());
        monitor.start().unwrap();
        monitor.start().unwrap();
        assert!(monitor.is_running());
        let snap = wait_for_sequence(&monitor, 1);
        assert_eq!(snap.processes.len(), 1);
        monitor.stop();
        monitor.stop();
        assert!(!monitor.is_running());
    }

    #[test]
    fn restart_continues_sequence() {
        let os = MockSystem::new();
        let mut monitor = Monitor::new(os.clone(), os, MIN_SAMPLE_INTERVAL);
        monitor.start().unwrap();
        let first = wait_for_sequence(&monitor, 1).sequence;
        monitor.stop();
        monitor.start().unwrap();
        let second = wait_for_sequence(&monitor, first + 1).sequence;
        monitor.stop();
        assert!(second > first);
    }

    #[test]
    fn panicking_pass_does_not_stop_sampling() {
        let os = MockSystem::new();
        os.upsert_process(1, MockProcess::new("init", 10));
        let source = PanicOnce {
            inner: os.clone(),
            armed: true,
        };
        let mut monitor = Monitor::new(source, os, MIN_SAMPLE_INTERVAL);
        monitor.start().unwrap();

        let snap = wait_for_sequence(&monitor, 2);
        assert!(snap.sequence >= 2);
        assert_eq!(snap.processes.len(), 1);
        assert!(monitor.is_running());
        monitor.stop();
        assert!(!monitor.is_running());
    }

    #[test]
    fn wait_for_snapshot_sees_every_pass() {
        let os = MockSystem::new();
        os.upsert_process(1, MockProcess::new("init", 10));
        let mut monitor = Monitor::new(os.clone(), os, MIN_SAMPLE_INTERVAL);
        monitor.start().unwrap();

        let mut last = 0;
        for _ in 0..5 {
            let snap = monitor
                .wait_for_snapshot(last, Duration::from_secs(5))
                .unwrap();
            assert_eq!(snap.sequence, last + 1);
            last = snap.sequence;
        }
        monitor.stop();
        assert!(monitor.wait_for_snapshot(last, Duration::from_millis(300)).is_none());
    }

    #[test]
    fn focus_round_trips() {
        let monitor = Monitor::new(MockSystem::new(), MockSystem::new(), MIN_SAMPLE_INTERVAL);
        assert_eq!(monitor.focus(), None);
        monitor.set_focus(42);
        assert_eq!(monitor.focus(), Some(42));
        monitor.set_focus(0);
        assert_eq!(monitor.focus(), None);
    }
}
