use std::time::Duration;

/// Minimum increase in delay considered significant by the hystart test.
const MIN_DELAY_THRESHOLD: Duration = Duration::from_millis(4);

/// Maximum increase in delay considered by the hystart test.
const MAX_DELAY_THRESHOLD: Duration = Duration::from_millis(16);

/// Divisor applied to the previous round's minimum RTT to derive the
/// inflation threshold, matching the `tcp_cubic.c`-derived constant used in
/// the hybrid-slow-start literature.
const THRESHOLD_DIVIDEND: u32 = 8;

/// Number of RTT samples collected per sampling round before judging
/// whether the round's minimum RTT inflated relative to the previous round.
const SAMPLES_PER_ROUND: u32 = 8;

/// Min/max RTT sampler backing the hystart-style slow-start exit test.
///
/// Owned by the controller (it is part of per-path algorithm state, see
/// `spec.md` §3's `rtt_filter` field) but driven by
/// [`crate::Host::hystart_test`]: the host decides whether a sample
/// constitutes an exit signal, this struct only accumulates the rounds.
/// Grounded on the round-sampling idiom in the pack's hybrid slow-start
/// implementations (`other_examples/…hybrid_slow_start.rs`) and the
/// `Minmax`-backed `RttStats` pattern in `other_examples/…vkrasnov-quiche…
/// congestion.rs`.
#[derive(Debug, Clone)]
pub struct HystartFilter {
    samples_remaining: u32,
    last_round_min: Option<Duration>,
    current_round_min: Option<Duration>,
    inflated: bool,
}

impl Default for HystartFilter {
    fn default() -> Self {
        HystartFilter {
            samples_remaining: 0,
            last_round_min: None,
            current_round_min: None,
            inflated: false,
        }
    }
}

impl HystartFilter {
    pub fn new() -> Self {
        HystartFilter::default()
    }

    pub fn reset(&mut self) {
        *self = HystartFilter::default();
    }

    /// Feed one RTT (or one-way-delay, when timestamps are enabled) sample
    /// into the round sampler, returning `true` if this sample proves the
    /// path's queueing delay inflated enough to exit slow start.
    ///
    /// This is the implementation backing [`crate::Host::hystart_test`] for
    /// hosts that want Tonopah's own judgement rather than supplying their
    /// own; a host may instead route to its transport stack's existing
    /// hystart logic and ignore this type entirely.
    pub fn sample(&mut self, rtt_sample: Duration) -> bool {
        if self.samples_remaining == 0 {
            self.last_round_min = self.current_round_min;
            self.current_round_min = Some(rtt_sample);
            self.samples_remaining = SAMPLES_PER_ROUND - 1;
            return false;
        }

        self.current_round_min = Some(
            self.current_round_min
                .map_or(rtt_sample, |cur| cur.min(rtt_sample)),
        );
        self.samples_remaining -= 1;

        if self.samples_remaining != 0 {
            return false;
        }

        let (last_min, cur_min) = match (self.last_round_min, self.current_round_min) {
            (Some(last), Some(cur)) => (last, cur),
            _ => return false,
        };

        let threshold = (last_min / THRESHOLD_DIVIDEND)
            .clamp(MIN_DELAY_THRESHOLD, MAX_DELAY_THRESHOLD);

        if cur_min >= last_min + threshold {
            self.inflated = true;
        }
        self.inflated
    }
}
