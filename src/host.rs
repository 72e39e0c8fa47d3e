use std::time::Duration;

use crate::path::PathId;
use crate::rtt::HystartFilter;

/// Everything the controller needs from (or writes back to) the QUIC host
/// (`spec.md` §6, "External interfaces").
///
/// Mirrors the teacher's pattern of a congestion-control implementation
/// driven by externally-owned connection/path state (`quiche`'s
/// `Recovery`/`Congestion` structs) — inverted into a trait here because,
/// unlike `quiche`, the real data genuinely lives on the host's per-path
/// structures and must be fetched through calls rather than through fields
/// the controller owns directly.
pub trait Host {
    fn smoothed_rtt(&self, path: PathId) -> Duration;
    fn min_rtt(&self, path: PathId) -> Duration;
    fn send_mtu(&self, path: PathId) -> u64;
    fn max_bandwidth_estimate_bps(&self, path: PathId) -> u64;
    fn pacing_packet_time(&self, path: PathId) -> Duration;
    fn last_time_acked_data_frame_sent(&self, path: PathId) -> Duration;
    fn last_sender_limited_time(&self, path: PathId) -> Duration;
    fn is_multipath_enabled(&self) -> bool;
    fn is_timestamp_enabled(&self) -> bool;
    fn num_paths(&self) -> usize;

    fn get_sequence_number(&self, path: PathId) -> u64;
    fn get_ack_number(&self, path: PathId) -> u64;
    fn get_ack_sent_time(&self, path: PathId) -> Duration;

    /// Ask the host to recompute pacing for `path`. `is_slowstart_unbounded`
    /// tells the host whether the controller is still in slow start with
    /// no ssthresh set, which affects the host's pacing gain.
    fn update_pacing_data(&mut self, path: PathId, is_slowstart_unbounded: bool);

    /// Host-owned hystart decision: given the controller's own RTT filter,
    /// a new sample, the path's pacing packet time, the current time, and
    /// whether timestamping is enabled, decide whether slow start should
    /// end. Hosts that have no opinion of their own may delegate to
    /// [`HystartFilter::sample`].
    fn hystart_test(
        &self, filter: &mut HystartFilter, sample: Duration, pacing_time: Duration,
        now: Duration, timestamps_enabled: bool,
    ) -> bool;

    fn set_cwnd(&mut self, path: PathId, cwnd: u64);
    fn set_ssthresh_initialized(&mut self, path: PathId, value: bool);
    fn mark_cc_data_updated(&mut self, path: PathId);
}
