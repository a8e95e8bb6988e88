use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc,
};

/// Metrics collector, if active, it provides Counters and Timers
#[derive(Clone)]
pub struct Metrics {
    metrics: Option<Arc<ActiveMetrics>>,
}

/// Metrics that can be collected during execution
#[derive(PartialEq, Eq, Hash)]
pub enum Metric {
    /// Counter of proofs which verified successfully
    Verified,
    /// Counter of proofs rejected for any reason
    Rejected,
    /// Counter of rejections caused by a root digest mismatch, a subset of `Rejected`
    DigestMismatches,
    /// Timer used to record average verification time
    VerifyTime,
}

struct ActiveMetrics {
    verified: AtomicU64,
    rejected: AtomicU64,
    digest_mismatches: AtomicU64,
    verify_time: Timer,
}

impl Metrics {
    /// Returns the Metrics object, active or not based on the specified input
    pub fn new(active: bool) -> Self {
        Self {
            metrics: if active {
                Some(Arc::new(ActiveMetrics {
                    verified: AtomicU64::new(0),
                    rejected: AtomicU64::new(0),
                    digest_mismatches: AtomicU64::new(0),
                    verify_time: Timer::new(),
                }))
            } else {
                None
            },
        }
    }

    /// Increase the Counter specified by the input
    ///
    /// panics if the specified [`Metric`] is not a Counter
    pub fn count(&self, metric: Metric) {
        if let Some(ref metrics) = self.metrics {
            let counter = match metric {
                Metric::Verified => &metrics.verified,
                Metric::Rejected => &metrics.rejected,
                Metric::DigestMismatches => &metrics.digest_mismatches,
                _ => panic!("Specified metric is not a Counter"),
            };

            counter.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Returns the current value of the Counter specified by the input, or `None` if metrics
    /// collection is not active.
    ///
    /// panics if the specified [`Metric`] is not a Counter
    pub fn get(&self, metric: Metric) -> Option<u64> {
        self.metrics.as_ref().map(|metrics| {
            let counter = match metric {
                Metric::Verified => &metrics.verified,
                Metric::Rejected => &metrics.rejected,
                Metric::DigestMismatches => &metrics.digest_mismatches,
                _ => panic!("Specified metric is not a Counter"),
            };
            counter.load(Ordering::Relaxed)
        })
    }

    /// Returns a guard that, when dropped, will record the time passed since creation
    ///
    /// panics if the specified [`Metric`] is not a Timer
    pub fn record<'a>(&'a self, metric: Metric) -> Option<impl Drop + 'a> {
        self.metrics.as_ref().map(|metrics| {
            let timer = match metric {
                Metric::VerifyTime => &metrics.verify_time,
                _ => panic!("Specified metric is not a Timer"),
            };

            timer.record()
        })
    }

    /// Print collected metrics to stdout
    pub fn print(&self) {
        if let Some(ref metrics) = self.metrics {
            println!("metrics");

            let verified = metrics.verified.load(Ordering::Relaxed);
            println!("  verified              {}", verified);

            let rejected = metrics.rejected.load(Ordering::Relaxed);
            println!("  rejected              {}", rejected);

            if rejected != 0 {
                let mismatches = metrics.digest_mismatches.load(Ordering::Relaxed);
                let percentage_mismatches = (mismatches as f64 / rejected as f64) * 100.0;

                println!(
                    "  digest mismatches     {} - {:.2}% of rejections",
                    mismatches, percentage_mismatches
                );
            }

            if let Some(mean) = metrics.verify_time.mean() {
                println!("  verify mean           {}", pretty_display_ns(mean));
            }
        } else {
            println!("Metrics collection was not activated")
        }
    }
}

fn pretty_display_ns(ns: u64) -> String {
    // preserve 3 sig figs at minimum.
    let (val, unit) = if ns > 100 * 1_000_000_000 {
        (ns / 1_000_000_000, "s")
    } else if ns > 100 * 1_000_000 {
        (ns / 1_000_000, "ms")
    } else if ns > 100 * 1_000 {
        (ns / 1_000, "us")
    } else {
        (ns, "ns")
    };

    format!("{val} {unit}")
}

struct Timer {
    number_of_records: AtomicU64,
    sum: AtomicU64,
}

impl Timer {
    fn new() -> Self {
        Timer {
            number_of_records: AtomicU64::new(0),
            sum: AtomicU64::new(0),
        }
    }

    fn mean(&self) -> Option<u64> {
        let n = self.number_of_records.load(Ordering::Relaxed);
        let sum = self.sum.load(Ordering::Relaxed);
        sum.checked_div(n)
    }

    fn record<'a>(&'a self) -> impl Drop + 'a {
        struct TimerGuard<'a> {
            start: std::time::Instant,
            n: &'a AtomicU64,
            sum: &'a AtomicU64,
        }

        impl Drop for TimerGuard<'_> {
            fn drop(&mut self) {
                let elapsed = self.start.elapsed().as_nanos() as u64;
                self.n.fetch_add(1, Ordering::Relaxed);
                self.sum.fetch_add(elapsed, Ordering::Relaxed);
            }
        }

        TimerGuard {
            start: std::time::Instant::now(),
            n: &self.number_of_records,
            sum: &self.sum,
        }
    }
}
