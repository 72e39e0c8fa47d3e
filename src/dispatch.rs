use std::time::Duration;

use crate::config::Config;
use crate::event::Event;
use crate::host::Host;
use crate::ledger::IntervalLedger;
use crate::newreno::{LossKind, NewRenoSim, RecoveryGate};
use crate::path::{PathId, PathRegistry, Role};
use crate::rtt::HystartFilter;
use crate::scheduler::DominanceScheduler;

/// Per-connection controller state and notification router
/// (`spec.md` §4.5/§4.6, components C5 and C6's backing value).
///
/// Owns every piece of per-connection state named in `spec.md` §3 —
/// nothing here is global, resolving the self-imposed "does not support
/// several consecutive connections" limitation of the original source
/// (`SPEC_FULL.md` §3).
pub struct Controller {
    config: Config,
    registry: PathRegistry,
    newreno: NewRenoSim,
    ledger: IntervalLedger,
    scheduler: DominanceScheduler,
    hystart_filter: HystartFilter,
}

impl Controller {
    pub fn new(config: Config) -> Self {
        let cwin_initial = config.cwin_initial;
        Controller {
            config,
            registry: PathRegistry::new(),
            newreno: NewRenoSim::new(cwin_initial),
            ledger: IntervalLedger::new(),
            scheduler: DominanceScheduler::new(),
            hystart_filter: HystartFilter::new(),
        }
    }

    pub(crate) fn newreno(&self) -> &NewRenoSim {
        &self.newreno
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Route one host notification to C1–C4 and request a pacing
    /// recompute on `path` (`spec.md` §4.5).
    pub fn notify(
        &mut self, host: &mut impl Host, path: PathId, event: Event, now: Duration,
    ) {
        let role = self.registry.resolve(path);
        host.mark_cc_data_updated(path);

        let primary = self.registry.path_a().unwrap_or(path);
        let mean_srtt = self.mean_srtt(host, primary);

        match event {
            Event::Ack { bytes_acked } => {
                let not_sender_limited = host.last_time_acked_data_frame_sent(path)
                    > host.last_sender_limited_time(path);
                if not_sender_limited {
                    self.newreno.on_ack(
                        bytes_acked,
                        host.send_mtu(primary),
                        mean_srtt,
                        self.config.min_ca_tick,
                        self.config.cwin_min,
                    );

                    let ack_num = host.get_ack_number(path);
                    if let Some(idx) =
                        self.ledger.find_and_finalize_predecessor(role, ack_num)
                    {
                        self.ledger.record_ack(
                            idx,
                            role,
                            bytes_acked,
                            host.smoothed_rtt(path),
                            now,
                        );
                    }

                    self.run_scheduler(host, now, mean_srtt);
                }
            },

            Event::EcnCe => {
                if self.registry.dominant() == Some(role) {
                    log::trace!("tonopah: CE on dominant path, ignoring");
                } else {
                    self.apply_loss(LossKind::EcnCe, host, primary, now, mean_srtt);
                }
            },

            Event::Repeat => {
                self.apply_loss(LossKind::Repeat, host, primary, now, mean_srtt);
            },

            Event::Timeout => {
                self.apply_loss(LossKind::Timeout, host, primary, now, mean_srtt);
            },

            Event::SpuriousRepeat => {
                let gate = self.recovery_gate(host, primary, now);
                self.newreno.on_spurious_repeat(gate, mean_srtt);
                self.run_scheduler(host, now, mean_srtt);
            },

            Event::RttSample { rtt, one_way_delay } => {
                self.on_rtt_sample(host, primary, rtt, one_way_delay, now);
            },

            Event::BwSample => {
                self.on_bw_sample(host, primary, mean_srtt);
            },

            Event::CwinBlocked => {},

            Event::SeedCwin { bytes_in_flight } => {
                self.newreno.seed_cwin(bytes_in_flight);
            },

            Event::Reset => {
                self.newreno.reset(self.config.cwin_initial);
                self.ledger.wipe();
                self.hystart_filter.reset();
                if let Some(a) = self.registry.path_a() {
                    host.set_cwnd(a, self.newreno.cwnd);
                }
                if let Some(b) = self.registry.path_b() {
                    host.set_cwnd(b, self.newreno.cwnd);
                }
            },
        }

        host.update_pacing_data(path, self.newreno.is_unbounded_slow_start());
    }

    fn mean_srtt(&self, host: &impl Host, primary: PathId) -> Duration {
        match (self.registry.path_a(), self.registry.path_b()) {
            (Some(a), Some(b)) => (host.smoothed_rtt(a) + host.smoothed_rtt(b)) / 2,
            _ => host.smoothed_rtt(primary),
        }
    }

    /// All NewReno recovery bookkeeping, including this gate, is performed
    /// against the primary path's state (`path_a`), never the actual
    /// triggering path — `spec.md` §4.5: "The path passed in is 'actual';
    /// all NewReno bookkeeping is performed against the primary path's
    /// state (path 0 in the connection)."
    fn recovery_gate(
        &self, host: &impl Host, primary: PathId, now: Duration,
    ) -> RecoveryGate {
        let elapsed = now.saturating_sub(self.newreno.recovery_start);
        let caught_up = if host.is_multipath_enabled() {
            self.newreno.recovery_start <= host.get_ack_sent_time(primary)
        } else {
            self.newreno.recovery_sequence <= host.get_ack_number(primary)
        };
        RecoveryGate {
            elapsed_since_recovery_start: elapsed,
            caught_up,
        }
    }

    fn apply_loss(
        &mut self, kind: LossKind, host: &mut impl Host, primary: PathId, now: Duration,
        mean_srtt: Duration,
    ) {
        let gate = self.recovery_gate(host, primary, now);
        let recovery_sequence = host.get_sequence_number(primary);
        let entered = self.newreno.on_loss(
            kind,
            gate,
            mean_srtt,
            now,
            recovery_sequence,
            self.config.cwin_min,
        );
        if entered {
            log::debug!("tonopah: entering recovery ({:?}), wiping interval ledger", kind);
            self.ledger.wipe();
        }
        self.run_scheduler(host, now, mean_srtt);
    }

    fn on_rtt_sample(
        &mut self, host: &mut impl Host, primary: PathId, rtt: Duration,
        one_way_delay: Duration, now: Duration,
    ) {
        if !self.newreno.is_unbounded_slow_start() {
            return;
        }

        let min_rtt = host.min_rtt(primary);
        if min_rtt > self.config.target_reno_rtt {
            let min_win = if min_rtt > self.config.target_satellite_rtt {
                scale_window(
                    self.config.cwin_initial,
                    self.config.target_satellite_rtt,
                    self.config.target_reno_rtt,
                )
            } else {
                scale_window(self.config.cwin_initial, min_rtt, self.config.target_reno_rtt)
            };
            self.newreno.raise_cwin_floor(min_win);
        }

        let timestamps_enabled = host.is_timestamp_enabled();
        let sample = if timestamps_enabled { one_way_delay } else { rtt };
        let pacing_time = host.pacing_packet_time(primary);
        let should_exit = host.hystart_test(
            &mut self.hystart_filter,
            sample,
            pacing_time,
            now,
            timestamps_enabled,
        );
        if should_exit {
            log::debug!("tonopah: hystart exiting slow start, cwnd={}", self.newreno.cwnd);
            self.newreno.exit_slow_start_via_hystart();
            host.set_ssthresh_initialized(primary, true);
        }
    }

    fn on_bw_sample(&mut self, host: &impl Host, primary: PathId, mean_srtt: Duration) {
        if !self.newreno.is_unbounded_slow_start() {
            return;
        }
        let bandwidth_estimate_bps = host.max_bandwidth_estimate_bps(primary);
        let max_win =
            (bandwidth_estimate_bps as u128 * mean_srtt.as_micros() / 1_000_000) as u64;
        let min_win = max_win / 2;
        self.newreno.raise_cwin_floor(min_win);
    }

    fn run_scheduler(&mut self, host: &mut impl Host, now: Duration, mean_srtt: Duration) {
        let first_seq = match (self.registry.path_a(), self.registry.path_b()) {
            (Some(a), Some(b)) => [host.get_sequence_number(a), host.get_sequence_number(b)],
            _ => [0, 0],
        };

        let split = self.scheduler.tick(
            &mut self.registry,
            &mut self.newreno,
            &mut self.ledger,
            &self.config,
            now,
            mean_srtt,
            first_seq,
        );

        let split = match split {
            Some(split) => split,
            None => return,
        };

        if let (Some(a), Some(b)) = (self.registry.path_a(), self.registry.path_b()) {
            let (dominant_path, submissive_path) = match self.registry.dominant() {
                Some(Role::PathA) => (a, b),
                Some(Role::PathB) => (b, a),
                None => return,
            };
            host.set_cwnd(dominant_path, split.dominant);
            host.set_cwnd(submissive_path, split.submissive);
        }
    }
}

fn scale_window(base: u64, numerator_rtt: Duration, denominator_rtt: Duration) -> u64 {
    (base as f64 * numerator_rtt.as_secs_f64() / denominator_rtt.as_secs_f64()) as u64
}
