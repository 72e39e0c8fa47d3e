use std::collections::VecDeque;
use std::time::Duration;

use crate::path::Role;

/// One dominance epoch's per-path counters (`spec.md` §3, `IntervalRecord`).
///
/// Represented as a plain value stored in a `VecDeque`-backed ring
/// (`IntervalLedger`) rather than an owned doubly linked list — see
/// `SPEC_FULL.md` §3 for the rationale. Per-path fields are two-element
/// arrays indexed by [`Role::index`] rather than the original source's
/// `_1`/`_2` field-name suffixes.
#[derive(Debug, Clone)]
pub struct IntervalRecord {
    pub dominant: Role,
    pub first_seq: [u64; 2],
    pub bytes_rcvd: [u64; 2],
    pub first_ack_t: [Option<Duration>; 2],
    pub last_ack_t: [Option<Duration>; 2],
    /// Accumulated RTT samples in microseconds, avoiding repeated
    /// `Duration` division; mean RTT is recovered as
    /// `rtt_sum_micros / num_acks`.
    pub rtt_sum_micros: [u64; 2],
    pub num_acks: [u64; 2],
    pub finished: [bool; 2],
    /// Set on the first interval ever opened: it has no predecessor and so
    /// lacks a valid baseline for the aggregator (`spec.md` §3 invariant 6,
    /// §9 Open Question 4).
    pub dont_use: bool,
}

impl IntervalRecord {
    fn open(dominant: Role, first_seq: [u64; 2], dont_use: bool) -> Self {
        IntervalRecord {
            dominant,
            first_seq,
            bytes_rcvd: [0, 0],
            first_ack_t: [None, None],
            last_ack_t: [None, None],
            rtt_sum_micros: [0, 0],
            num_acks: [0, 0],
            finished: [false, false],
            dont_use,
        }
    }

    pub fn usable(&self) -> bool {
        !self.dont_use && self.finished[0] && self.finished[1]
    }
}

/// Bounded sliding window of [`IntervalRecord`]s (`spec.md` §4.2,
/// component C2).
///
/// Backed by a `VecDeque` instead of an owned doubly linked list: pushes
/// and drops are O(1) at either end, the backward scan C3 needs is a plain
/// reverse iteration, and there is no per-tick heap allocation beyond the
/// deque's own growth (`SPEC_FULL.md` §3).
#[derive(Debug, Clone, Default)]
pub struct IntervalLedger {
    records: VecDeque<IntervalRecord>,
}

impl IntervalLedger {
    pub fn new() -> Self {
        IntervalLedger::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Open a new interval at the tail. The first interval ever opened is
    /// marked `dont_use` (`spec.md` §3 invariant 6).
    pub fn open(&mut self, dominant: Role, first_seq: [u64; 2]) {
        let dont_use = self.records.is_empty();
        self.records.push_back(IntervalRecord::open(dominant, first_seq, dont_use));
    }

    /// Drop the head record while the list exceeds `max_len`
    /// (`spec.md` §3 invariant 4: length never exceeds `4·REQUIRED+1`).
    pub fn retire_if_overflow(&mut self, max_len: usize) {
        while self.records.len() > max_len {
            self.records.pop_front();
        }
    }

    /// Find the most recent interval whose `first_seq[role]` is at or
    /// before `ack_num`, lazily finalizing its predecessor's `finished`
    /// flag on the way (`spec.md` §4.2, §3 invariant 3). Returns the
    /// found interval's index for a follow-up [`IntervalLedger::record_ack`]
    /// call, or `None` if no interval covers this ACK
    /// (`spec.md` §7, error kind 4).
    pub fn find_and_finalize_predecessor(
        &mut self, role: Role, ack_num: u64,
    ) -> Option<usize> {
        let idx = role.index();
        for i in (0..self.records.len()).rev() {
            if ack_num >= self.records[i].first_seq[idx] {
                if i > 0 && !self.records[i - 1].finished[idx] {
                    self.records[i - 1].finished[idx] = true;
                }
                return Some(i);
            }
        }
        None
    }

    /// Accumulate one ACK's counters into the interval at `idx`
    /// (`spec.md` §4.2).
    pub fn record_ack(
        &mut self, idx: usize, role: Role, bytes: u64, rtt_sample: Duration,
        now: Duration,
    ) {
        if let Some(rec) = self.records.get_mut(idx) {
            let i = role.index();
            rec.bytes_rcvd[i] += bytes;
            rec.rtt_sum_micros[i] += rtt_sample.as_micros() as u64;
            rec.num_acks[i] += 1;
            if rec.first_ack_t[i].is_none() {
                rec.first_ack_t[i] = Some(now);
            }
            rec.last_ack_t[i] = Some(now);
        }
    }

    /// Drop every record. Called on recovery entry and after an
    /// FQ-triggered adjustment (`spec.md` §4.2).
    pub fn wipe(&mut self) {
        self.records.clear();
    }

    /// Iterate from the most recent interval (tail) toward the oldest
    /// (head), pairing each with its chronologically-next neighbor (the
    /// previously-yielded one, or `None` at the tail) so the FQ aggregator
    /// can compute the "bytes sent" delta across adjacent intervals.
    pub(crate) fn iter_tail_with_next(
        &self,
    ) -> impl Iterator<Item = (&IntervalRecord, Option<&IntervalRecord>)> {
        let len = self.records.len();
        (0..len).rev().map(move |i| {
            let next = if i + 1 < len {
                Some(&self.records[i + 1])
            } else {
                None
            };
            (&self.records[i], next)
        })
    }
}
