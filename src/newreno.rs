use std::time::Duration;

use crate::config::Config;

/// Algorithm phase. Recovery is modeled as an edge-triggered transition
/// (see [`NewRenoSim::on_loss`]), not a persisting variant: the original
/// source never leaves `alg_state` set to a "recovery" value, and
/// `spec.md` §4.1 is explicit that "there is no long-lived Recovery; it is
/// a single event, not a phase."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlgState {
    SlowStart,
    CongestionAvoidance,
}

/// Which signal triggered a recovery-entry check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LossKind {
    EcnCe,
    Repeat,
    Timeout,
}

/// The recovery-entry/rollback gate, computed by the caller from host-owned
/// sequence numbers because `NewRenoSim` itself never talks to the host
/// (it is, per `spec.md` §4.1/§2, a pure-state simulator).
///
/// `caught_up` answers "has an ACK proven that the current recovery marker
/// has been passed", which is `recovery_sequence <= ack_number` on a
/// single path or `recovery_start <= ack_sent_time` under multipath (see
/// `spec.md` §4.1 and the original source's two branches).
#[derive(Debug, Clone, Copy)]
pub struct RecoveryGate {
    pub elapsed_since_recovery_start: Duration,
    pub caught_up: bool,
}

/// Pure-state NewReno simulator (`spec.md` §4.1, component C1).
///
/// Drives the *aggregate* congestion window for the connection; it is not
/// instantiated per path (`spec.md` §9, "Mixed dominant/submissive
/// semantics in NewReno").
#[derive(Debug, Clone)]
pub struct NewRenoSim {
    pub cwnd: u64,
    /// `None` means "unbounded", matching the original `UINT64_MAX` sentinel
    /// without baking an arithmetic sentinel into comparisons.
    pub ssthresh: Option<u64>,
    pub alg_state: AlgState,
    pub residual_ack: u64,
    pub recovery_start: Duration,
    pub recovery_sequence: u64,
}

impl NewRenoSim {
    pub fn new(cwin_initial: u64) -> Self {
        let mut sim = NewRenoSim {
            cwnd: 0,
            ssthresh: None,
            alg_state: AlgState::SlowStart,
            residual_ack: 0,
            recovery_start: Duration::ZERO,
            recovery_sequence: 0,
        };
        sim.reset(cwin_initial);
        sim
    }

    /// `reset ∘ reset = reset` (spec.md §8): resetting twice in a row is
    /// observably identical to resetting once, since reset fully
    /// overwrites every field from the initial values.
    pub fn reset(&mut self, cwin_initial: u64) {
        self.cwnd = cwin_initial;
        self.ssthresh = None;
        self.alg_state = AlgState::SlowStart;
        self.residual_ack = 0;
        self.recovery_start = Duration::ZERO;
        self.recovery_sequence = 0;
    }

    /// True while the algorithm is in slow start with no ssthresh set yet —
    /// the window during which RTT/bandwidth samples are allowed to raise
    /// the cwnd floor and hystart may fire (`spec.md` §4.5).
    pub fn is_unbounded_slow_start(&self) -> bool {
        self.alg_state == AlgState::SlowStart && self.ssthresh.is_none()
    }

    /// Raise `cwnd` to `floor` if it is currently lower. Used by the
    /// RTT-sample and bandwidth-sample floors in `spec.md` §4.5.
    pub fn raise_cwin_floor(&mut self, floor: u64) {
        if floor > self.cwnd {
            self.cwnd = floor;
        }
    }

    /// Exit slow start because the hystart test fired.
    pub fn exit_slow_start_via_hystart(&mut self) {
        self.ssthresh = Some(self.cwnd);
        self.alg_state = AlgState::CongestionAvoidance;
    }

    /// `notify(SeedCwin, b)` when `b ≤ cwnd` is a no-op (spec.md §8).
    pub fn seed_cwin(&mut self, bytes_in_flight: u64) {
        if self.alg_state == AlgState::SlowStart && self.ssthresh.is_none() {
            if bytes_in_flight > self.cwnd {
                self.cwnd = bytes_in_flight;
                self.ssthresh = Some(bytes_in_flight);
                self.alg_state = AlgState::CongestionAvoidance;
            }
        }
    }

    /// Apply an ACK of `bytes_acked` bytes. `send_mtu` and `mean_srtt` are
    /// the current values observed by the caller; `mean_srtt` is the
    /// average of the two paths' smoothed RTTs under multipath, or the
    /// single path's own smoothed RTT otherwise (`spec.md` §4.1).
    pub fn on_ack(
        &mut self, bytes_acked: u64, send_mtu: u64, mean_srtt: Duration,
        min_ca_tick: Duration, cwin_min: u64,
    ) {
        match self.alg_state {
            AlgState::SlowStart => {
                self.cwnd += bytes_acked;
                if let Some(ssthresh) = self.ssthresh {
                    if self.cwnd >= ssthresh {
                        self.alg_state = AlgState::CongestionAvoidance;
                    }
                }
            },
            AlgState::CongestionAvoidance => {
                let complete_delta =
                    bytes_acked * send_mtu + self.residual_ack;
                self.residual_ack = complete_delta % self.cwnd.max(1);

                let ratio = (mean_srtt.as_secs_f64()
                    / min_ca_tick.as_secs_f64())
                .clamp(0.0, 1.0);
                let increment =
                    ratio * (complete_delta as f64 / self.cwnd as f64);
                self.cwnd += increment as u64;
            },
        }
        self.clamp_cwin(cwin_min);
    }

    /// Recovery-entry check for `EcnCe`/`Repeat`/`Timeout`. Returns `true`
    /// iff recovery was actually entered (the caller must then wipe the
    /// interval ledger, per `spec.md` §4.1).
    pub fn on_loss(
        &mut self, kind: LossKind, gate: RecoveryGate, mean_srtt: Duration,
        now: Duration, recovery_sequence: u64, cwin_min: u64,
    ) -> bool {
        if gate.elapsed_since_recovery_start > mean_srtt || gate.caught_up {
            self.enter_recovery(kind, now, recovery_sequence, cwin_min);
            true
        } else {
            false
        }
    }

    /// Spurious-repeat rollback check. Idempotent: applying it when
    /// `cwnd ≥ 2·ssthresh` is a no-op (spec.md §8).
    pub fn on_spurious_repeat(&mut self, gate: RecoveryGate, mean_srtt: Duration) {
        if gate.elapsed_since_recovery_start >= mean_srtt || gate.caught_up {
            return;
        }
        if let Some(ssthresh) = self.ssthresh {
            if self.cwnd < 2 * ssthresh {
                self.cwnd = 2 * ssthresh;
                self.alg_state = AlgState::CongestionAvoidance;
            }
        }
    }

    fn enter_recovery(
        &mut self, kind: LossKind, now: Duration, recovery_sequence: u64,
        cwin_min: u64,
    ) {
        self.ssthresh = Some((self.cwnd / 2).max(cwin_min));

        if kind == LossKind::Timeout {
            self.cwnd = cwin_min;
            self.alg_state = AlgState::SlowStart;
        } else {
            self.cwnd = self.ssthresh.unwrap();
            self.alg_state = AlgState::CongestionAvoidance;
        }

        self.recovery_start = now;
        self.recovery_sequence = recovery_sequence;
        self.residual_ack = 0;
        self.clamp_cwin(cwin_min);
    }

    fn clamp_cwin(&mut self, cwin_min: u64) {
        if self.cwnd < cwin_min {
            self.cwnd = cwin_min;
        }
        if let Some(ssthresh) = &mut self.ssthresh {
            if *ssthresh < cwin_min {
                *ssthresh = cwin_min;
            }
        }
    }
}
