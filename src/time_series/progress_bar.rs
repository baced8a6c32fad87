//! Progress display for long sequential sweeps (feature `progress`).
//!
//! * [`sweep_progress_bar`] – an `indicatif` bar styled for sample counts.
//! * [`IterTimer`] – per-sample wall time with an exponential moving average,
//!   `ema ← α·dt + (1 - α)·ema`, initialised with the first sample.
//! * [`fmt_dur`] – compact duration formatting (`"253µs"`, `"42ms"`, `"3.14s"`).
use indicatif::{ProgressBar, ProgressStyle};
use std::time::{Duration, Instant};

const SWEEP_TEMPLATE: &str =
    "{bar:40.cyan/blue} {pos}/{len} samples ({percent:>3}%) | {per_sec} | ETA {eta_precise} | {msg}";

/// Progress bar over `total` samples; falls back to the default style if the template is rejected.
pub(crate) fn sweep_progress_bar(total: usize) -> ProgressBar {
    let pb = ProgressBar::new((total as u64).max(1));
    pb.set_style(
        ProgressStyle::with_template(SWEEP_TEMPLATE).unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.enable_steady_tick(Duration::from_millis(200));
    pb
}

pub(crate) struct IterTimer {
    last: Instant,
    ema_ns: f64,
    alpha: f64,
    ticks: u64,
}

impl IterTimer {
    pub(crate) fn new(alpha: f64) -> Self {
        Self {
            last: Instant::now(),
            ema_ns: 0.0,
            alpha,
            ticks: 0,
        }
    }

    /// Close the current iteration and return its duration.
    #[inline]
    pub(crate) fn tick(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.duration_since(self.last);
        self.last = now;
        self.ticks += 1;

        let dt_ns = dt.as_nanos() as f64;
        self.ema_ns = match self.ticks {
            1 => dt_ns,
            _ => self.alpha * dt_ns + (1.0 - self.alpha) * self.ema_ns,
        };
        dt
    }

    #[inline]
    pub(crate) fn avg(&self) -> Duration {
        Duration::from_nanos(self.ema_ns as u64)
    }

    /// Bar message with the last and smoothed sample times.
    pub(crate) fn message(&mut self) -> String {
        let last = self.tick();
        format!("last: {}, avg: {}", fmt_dur(last), fmt_dur(self.avg()))
    }
}

#[inline]
pub(crate) fn fmt_dur(d: Duration) -> String {
    match d.as_micros() {
        us if us < 1_000 => format!("{us}µs"),
        _ if d.as_millis() < 1_000 => format!("{}ms", d.as_millis()),
        _ => format!("{:.2}s", d.as_secs_f32()),
    }
}

#[cfg(test)]
mod progress_bar_test {
    use super::*;

    #[test]
    fn test_fmt_dur() {
        assert_eq!(fmt_dur(Duration::from_micros(253)), "253µs");
        assert_eq!(fmt_dur(Duration::from_millis(42)), "42ms");
        assert_eq!(fmt_dur(Duration::from_millis(3_140)), "3.14s");
    }

    #[test]
    fn test_timer_average() {
        let mut timer = IterTimer::new(0.2);
        assert_eq!(timer.avg(), Duration::ZERO);
        let first = timer.tick();
        assert_eq!(timer.avg().as_nanos() as u64, first.as_nanos() as u64);
        assert!(timer.message().starts_with("last: "));
    }
}
