use std::time::Duration;

use crate::ledger::IntervalLedger;
use crate::path::Role;

/// Running accumulators for one role (dominant or submissive) across a
/// contiguous trailing run of usable intervals.
#[derive(Debug, Clone, Copy, Default)]
struct RoleAccumulator {
    rtt_sum_micros: u64,
    num_acks: u64,
}

impl RoleAccumulator {
    fn mean_rtt(&self) -> Option<Duration> {
        if self.num_acks == 0 {
            None
        } else {
            Some(Duration::from_micros(self.rtt_sum_micros / self.num_acks))
        }
    }
}

/// Scan the trailing finalized intervals and decide whether the bottleneck
/// looks like it enforces per-flow fair queueing (`spec.md` §4.3,
/// component C3).
///
/// Walks from the tail toward the head. Any unusable interval (not
/// finished on both paths, or flagged `dont_use`) resets the running
/// accumulators — aggregation requires a *contiguous* trailing run,
/// matching `new_tonopah_aggregate_intervals` in the original source.
/// Returns `true` the first time `required` usable intervals have been
/// accumulated and the dominant/submissive mean-RTT gap exceeds
/// `rtt_gap_threshold`; returns `false` if the ledger never accumulates
/// that many.
pub fn detect_fq(
    ledger: &IntervalLedger, required: usize, rtt_gap_threshold: Duration,
) -> bool {
    let mut dominant = RoleAccumulator::default();
    let mut submissive = RoleAccumulator::default();
    let mut run_len = 0usize;

    for (record, next) in ledger.iter_tail_with_next() {
        if !record.usable() {
            dominant = RoleAccumulator::default();
            submissive = RoleAccumulator::default();
            run_len = 0;
            continue;
        }

        let dom_idx = record.dominant.index();
        let sub_idx = record.dominant.other().index();

        dominant.rtt_sum_micros += record.rtt_sum_micros[dom_idx];
        dominant.num_acks += record.num_acks[dom_idx];
        submissive.rtt_sum_micros += record.rtt_sum_micros[sub_idx];
        submissive.num_acks += record.num_acks[sub_idx];

        // Bytes sent this interval, per role, is the delta between this
        // interval's and the next (chronologically later) interval's
        // opening sequence number. It is not used in the FQ decision
        // itself (only RTT gap is), but is computed here to mirror the
        // original aggregator's bookkeeping and to keep the accumulator
        // symmetric with `spec.md` §4.3's listed fields.
        let _ = bytes_sent(record.first_seq[dom_idx], next.map(|n| n.first_seq[dom_idx]));
        let _ = bytes_sent(
            record.first_seq[sub_idx],
            next.map(|n| n.first_seq[sub_idx]),
        );

        run_len += 1;
        if run_len == required {
            return match (dominant.mean_rtt(), submissive.mean_rtt()) {
                (Some(mean_dom), Some(mean_sub)) => {
                    mean_dom.saturating_sub(mean_sub) > rtt_gap_threshold
                },
                _ => false,
            };
        }
    }

    false
}

fn bytes_sent(this_first_seq: u64, next_first_seq: Option<u64>) -> u64 {
    next_first_seq.map_or(0, |next| next.saturating_sub(this_first_seq))
}
