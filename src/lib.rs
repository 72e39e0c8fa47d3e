//! Tonopah is a multipath congestion controller for QUIC.
//!
//! It runs two network paths at a deliberate send-ratio asymmetry — one
//! *dominant* path carrying the larger share of `cwnd`, one *submissive*
//! path carrying the rest — and watches per-interval ACK statistics for
//! the signature of a flow-queueing (FQ) fair scheduler at the
//! bottleneck: if the dominant path's mean RTT pulls far enough ahead of
//! the submissive path's, the bottleneck is presumed to be handing the
//! two paths equal shares regardless of the asymmetry, and `cwnd` is
//! pulled back.
//!
//! The algorithm is built on a NewReno skeleton (slow start, congestion
//! avoidance, loss recovery) extended with:
//!
//! - a per-path `cwnd` split driven by the dominant/submissive ratio,
//! - a sliding window of per-dominance-epoch interval records,
//! - an FQ-detection aggregator over the trailing finalized intervals,
//! - a rotation clock deciding when to tick the above.
//!
//! A host drives the controller by implementing [`Host`] and calling
//! [`Controller::notify`] (or the [`algorithm::AlgorithmOps`] wrapper) for
//! every [`Event`] it observes on either path.

pub mod algorithm;
mod config;
mod dispatch;
mod error;
mod event;
mod fq;
mod host;
mod ledger;
mod newreno;
mod path;
mod rtt;
mod scheduler;

pub use config::Config;
pub use dispatch::Controller;
pub use error::TonopahError;
pub use event::Event;
pub use host::Host;
pub use newreno::AlgState;
pub use path::{PathId, Role};
pub use rtt::HystartFilter;
