use std::time::Duration;

use crate::error::TonopahError;

/// Default initial congestion window, matching the host's NewReno family.
pub const CWIN_INITIAL: u64 = 14720;

/// Lower bound below which `cwnd` is never allowed to fall.
pub const CWIN_MIN: u64 = 2 * 1460;

/// RTT above which the initial window is grown for long-delay links.
pub const TARGET_RENO_RTT: Duration = Duration::from_millis(100);

/// RTT beyond which the long-delay initial-window growth is capped.
pub const TARGET_SATELLITE_RTT: Duration = Duration::from_millis(800);

/// Static, validated tunables for a [`crate::Controller`].
///
/// Mirrors the chained-setter shape of `quiche::Config`: each setter
/// validates its argument immediately and returns `Result` so a
/// misconfiguration is caught at construction, not deep inside a `notify`
/// call.
#[derive(Debug, Clone)]
pub struct Config {
    pub(crate) ratio: f64,
    pub(crate) min_tick: Duration,
    pub(crate) min_ca_tick: Duration,
    pub(crate) max_tick: Duration,
    pub(crate) required_intervals: usize,
    pub(crate) fq_rtt_gap_threshold: Duration,
    pub(crate) recovery_multiplier: f64,
    pub(crate) cwin_initial: u64,
    pub(crate) cwin_min: u64,
    pub(crate) target_reno_rtt: Duration,
    pub(crate) target_satellite_rtt: Duration,
    pub(crate) rotate_dominance: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ratio: 2.0 / 3.0,
            min_tick: Duration::from_micros(0),
            min_ca_tick: Duration::from_millis(50),
            max_tick: Duration::from_secs(1),
            required_intervals: 1,
            fq_rtt_gap_threshold: Duration::from_millis(5),
            recovery_multiplier: 7.0 / 8.0,
            cwin_initial: CWIN_INITIAL,
            cwin_min: CWIN_MIN,
            target_reno_rtt: TARGET_RENO_RTT,
            target_satellite_rtt: TARGET_SATELLITE_RTT,
            rotate_dominance: false,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Config::default()
    }

    /// Dominant-path share of `cwnd`. Must be strictly between 0.5 and 1.0.
    pub fn set_ratio(&mut self, ratio: f64) -> Result<&mut Self, TonopahError> {
        if !(ratio > 0.5 && ratio < 1.0) {
            return Err(TonopahError::InvalidConfig(
                "ratio must be in (0.5, 1.0)",
            ));
        }
        self.ratio = ratio;
        Ok(self)
    }

    pub fn set_min_tick(&mut self, min_tick: Duration) -> &mut Self {
        self.min_tick = min_tick;
        self
    }

    pub fn set_min_ca_tick(
        &mut self, min_ca_tick: Duration,
    ) -> Result<&mut Self, TonopahError> {
        if min_ca_tick.is_zero() {
            return Err(TonopahError::InvalidConfig(
                "min_ca_tick must be non-zero",
            ));
        }
        self.min_ca_tick = min_ca_tick;
        Ok(self)
    }

    pub fn set_max_tick(&mut self, max_tick: Duration) -> &mut Self {
        self.max_tick = max_tick;
        self
    }

    /// Number of trailing finalized intervals the FQ aggregator must see
    /// before it renders a decision. Build-time constant in the original
    /// source; kept runtime-tunable here so it is measurable in tests.
    pub fn set_required_intervals(
        &mut self, required: usize,
    ) -> Result<&mut Self, TonopahError> {
        if required == 0 {
            return Err(TonopahError::InvalidConfig(
                "required_intervals must be >= 1",
            ));
        }
        self.required_intervals = required;
        Ok(self)
    }

    pub fn set_fq_rtt_gap_threshold(&mut self, threshold: Duration) -> &mut Self {
        self.fq_rtt_gap_threshold = threshold;
        self
    }

    pub fn set_recovery_multiplier(
        &mut self, multiplier: f64,
    ) -> Result<&mut Self, TonopahError> {
        if !(multiplier > 0.0 && multiplier < 1.0) {
            return Err(TonopahError::InvalidConfig(
                "recovery_multiplier must be in (0.0, 1.0)",
            ));
        }
        self.recovery_multiplier = multiplier;
        Ok(self)
    }

    pub fn set_cwin_initial(
        &mut self, cwin_initial: u64,
    ) -> Result<&mut Self, TonopahError> {
        if cwin_initial < self.cwin_min {
            return Err(TonopahError::InvalidConfig(
                "cwin_initial must be >= cwin_min",
            ));
        }
        self.cwin_initial = cwin_initial;
        Ok(self)
    }

    pub fn set_cwin_min(&mut self, cwin_min: u64) -> Result<&mut Self, TonopahError> {
        if cwin_min == 0 {
            return Err(TonopahError::InvalidConfig("cwin_min must be > 0"));
        }
        self.cwin_min = cwin_min;
        Ok(self)
    }

    pub fn set_target_reno_rtt(&mut self, rtt: Duration) -> &mut Self {
        self.target_reno_rtt = rtt;
        self
    }

    pub fn set_target_satellite_rtt(&mut self, rtt: Duration) -> &mut Self {
        self.target_satellite_rtt = rtt;
        self
    }

    /// Whether the dominance scheduler swaps the dominant path on every
    /// tick. Default `false` — the original source never runs the
    /// commented-out swap branch. See `SPEC_FULL.md` §9.
    pub fn set_rotate_dominance(&mut self, rotate: bool) -> &mut Self {
        self.rotate_dominance = rotate;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let cfg = Config::default();
        assert!((cfg.ratio - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(cfg.min_ca_tick, Duration::from_millis(50));
        assert_eq!(cfg.max_tick, Duration::from_secs(1));
        assert_eq!(cfg.required_intervals, 1);
        assert_eq!(cfg.fq_rtt_gap_threshold, Duration::from_millis(5));
        assert!(!cfg.rotate_dominance);
    }

    #[test]
    fn rejects_out_of_range_ratio() {
        let mut cfg = Config::default();
        assert!(cfg.set_ratio(0.5).is_err());
        assert!(cfg.set_ratio(1.0).is_err());
        assert!(cfg.set_ratio(0.4).is_err());
        assert!(cfg.set_ratio(0.75).is_ok());
    }

    #[test]
    fn rejects_zero_min_ca_tick() {
        let mut cfg = Config::default();
        assert!(cfg.set_min_ca_tick(Duration::ZERO).is_err());
    }

    #[test]
    fn rejects_zero_required_intervals() {
        let mut cfg = Config::default();
        assert!(cfg.set_required_intervals(0).is_err());
        assert!(cfg.set_required_intervals(4).is_ok());
    }
}
