use std::time::Duration;

/// The union of signals the host may deliver to the controller
/// (`spec.md` §4.5, §9 "Tagged event union").
///
/// Modeled as a sum type with per-variant payloads rather than a single
/// struct carrying every possible field, per `spec.md` §9's explicit
/// design note.
#[derive(Debug, Clone, Copy)]
pub enum Event {
    Ack { bytes_acked: u64 },
    EcnCe,
    Repeat,
    Timeout,
    SpuriousRepeat,
    RttSample { rtt: Duration, one_way_delay: Duration },
    BwSample,
    CwinBlocked,
    SeedCwin { bytes_in_flight: u64 },
    Reset,
}
