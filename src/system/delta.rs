//! Tick-counter arithmetic shared by every CPU percentage the sampler reports.
//!
//! Counters are cumulative and expected to grow. A counter that goes
//! backwards (wrap, reset, pid reuse inside one interval) yields `0.0`
//! instead of a negative rate.

/// Cumulative kernel-mode and user-mode ticks for one process or thread.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CpuTimes {
    pub kernel: u64,
    pub user: u64,
}

impl CpuTimes {
    pub fn new(kernel: u64, user: u64) -> Self {
        Self { kernel, user }
    }

    pub fn total(self) -> u64 {
        self.kernel.saturating_add(self.user)
    }
}

/// System-wide tick totals. `kernel` includes `idle`, so `kernel + user` is
/// the whole capacity elapsed across all CPUs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SystemCpuTimes {
    pub idle: u64,
    pub kernel: u64,
    pub user: u64,
}

impl SystemCpuTimes {
    pub fn total(self) -> u64 {
        self.kernel.saturating_add(self.user)
    }

    /// Busy ticks expressed as a `CpuTimes` pair so they go through the same
    /// delta path as per-entity counters.
    pub fn busy(self) -> CpuTimes {
        CpuTimes {
            kernel: self.kernel.saturating_sub(self.idle),
            user: self.user,
        }
    }
}

/// `100 * (current - previous) / denominator`, or `0.0` when there is no
/// previous observation, the denominator is zero, or the counter went
/// backwards.
pub fn cpu_percent(previous: Option<CpuTimes>, current: CpuTimes, denominator: u64) -> f64 {
    let Some(previous) = previous else {
        return 0.0;
    };
    if denominator == 0 {
        return 0.0;
    }
    let delta = i128::from(current.total()) - i128::from(previous.total());
    if delta <= 0 {
        return 0.0;
    }
    delta as f64 * 100.0 / denominator as f64
}

/// Ticks elapsed system-wide between two readings; `0` on the first reading
/// or when the totals went backwards.
pub fn interval_ticks(previous: Option<SystemCpuTimes>, current: SystemCpuTimes) -> u64 {
    previous
        .and_then(|prev| current.total().checked_sub(prev.total()))
        .unwrap_or(0)
}

/// System-wide CPU load for the interval whose length is `denominator`.
pub fn system_load(
    previous: Option<SystemCpuTimes>,
    current: SystemCpuTimes,
    denominator: u64,
) -> f64 {
    cpu_percent(previous.map(SystemCpuTimes::busy), current.busy(), denominator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn first_observation_is_zero() {
        assert_eq!(cpu_percent(None, CpuTimes::new(70, 80), 1000), 0.0);
    }

    #[test]
    fn second_observation_uses_tick_delta() {
        let prev = CpuTimes::new(50, 50);
        let cur = CpuTimes::new(70, 80);
        assert!((cpu_percent(Some(prev), cur, 1000) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn zero_denominator_is_zero() {
        let prev = CpuTimes::new(0, 0);
        assert_eq!(cpu_percent(Some(prev), CpuTimes::new(10, 10), 0), 0.0);
    }

    #[test]
    fn counter_wrap_clamps_to_zero() {
        let prev = CpuTimes::new(u64::MAX - 5, 100);
        let cur = CpuTimes::new(3, 100);
        assert_eq!(cpu_percent(Some(prev), cur, 1000), 0.0);
    }

    #[test]
    fn system_load_counts_non_idle_ticks() {
        let prev = SystemCpuTimes {
            idle: 1000,
            kernel: 1500,
            user: 500,
        };
        let cur = SystemCpuTimes {
            idle: 1750,
            kernel: 2400,
            user: 600,
        };
        let denominator = interval_ticks(Some(prev), cur);
        assert_eq!(denominator, 1000);
        // busy: (2400-1750+600) - (1500-1000+500) = 250
        assert!((system_load(Some(prev), cur, denominator) - 25.0).abs() < 1e-9);
    }

    #[test]
    fn interval_ticks_is_zero_without_baseline_or_on_reset() {
        let cur = SystemCpuTimes {
            idle: 10,
            kernel: 20,
            user: 30,
        };
        assert_eq!(interval_ticks(None, cur), 0);
        let later = SystemCpuTimes {
            idle: 100,
            kernel: 200,
            user: 300,
        };
        assert_eq!(interval_ticks(Some(later), cur), 0);
    }

    proptest! {
        #[test]
        fn percent_is_never_negative(
            pk in any::<u64>(), pu in any::<u64>(),
            ck in any::<u64>(), cu in any::<u64>(),
            denom in any::<u64>(),
        ) {
            let pct = cpu_percent(Some(CpuTimes::new(pk, pu)), CpuTimes::new(ck, cu), denom);
            prop_assert!(pct >= 0.0);
            prop_assert!(pct.is_finite());
        }

        #[test]
        fn percent_is_deterministic(
            k in 0u64..1_000_000, u in 0u64..1_000_000,
            dk in 0u64..10_000, du in 0u64..10_000,
            denom in 1u64..100_000,
        ) {
            let prev = CpuTimes::new(k, u);
            let cur = CpuTimes::new(k + dk, u + du);
            let a = cpu_percent(Some(prev), cur, denom);
            let b = cpu_percent(Some(prev), cur, denom);
            prop_assert_eq!(a, b);
            let expected = (dk + du) as f64 * 100.0 / denom as f64;
            prop_assert!((a - expected).abs() < 1e-9);
        }
    }
}
