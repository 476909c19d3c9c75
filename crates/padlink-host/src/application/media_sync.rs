//! The media-push synchronizer: at most one `SONG_INFO:` push in flight.
//!
//! The device acknowledges each now-playing push with a bare `OK` line, and
//! the protocol carries no correlation id, so only one push may be
//! outstanding at a time.  The source implementation guarded a shared
//! "pending ack" cell with a lock across two async call sites; here the
//! pending token is single-owner state inside a two-state machine driven
//! from one serialized session task, which removes the lock by
//! construction.
//!
//! ```text
//!            payload != baseline
//!   Idle ──────────────────────────► AwaitingAck
//!    ▲                                   │
//!    │  OK received (baseline updated)   │
//!    ├───────────────────────────────────┤
//!    │  timeout    (baseline unchanged)  │
//!    └───────────────────────────────────┘
//! ```
//!
//! The synchronizer is sans-io: it returns the line to write and exposes
//! the ACK deadline; the session loop owns the clock and the transport.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use padlink_core::protocol::messages::SONG_INFO_PREFIX;

/// Default cadence at which the session computes a fresh now-playing
/// payload.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(500);

/// Default time to wait for the device to acknowledge a push.
pub const DEFAULT_ACK_TIMEOUT: Duration = Duration::from_millis(1000);

/// The single outstanding flow-control token.
///
/// A `PendingAck` only ever lives inside [`PushState::AwaitingAck`], so a
/// second token cannot exist while one is unresolved; the tick handler
/// observes the state and no-ops instead.
#[derive(Debug)]
struct PendingAck {
    /// When the push was written, for latency diagnostics.
    created: Instant,
    /// The payload in flight, promoted to the baseline on acknowledgement.
    payload: String,
}

#[derive(Debug)]
enum PushState {
    Idle,
    AwaitingAck { token: PendingAck, deadline: Instant },
}

/// Outcome of routing an inbound `OK` through the synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AckOutcome {
    /// A push was outstanding and is now acknowledged.
    PushAcknowledged,
    /// No push was outstanding; the `OK` belongs to the configuration
    /// write path and should be routed to the status collaborator.
    NotWaiting,
}

/// See the module docs.
#[derive(Debug)]
pub struct MediaPushSynchronizer {
    state: PushState,
    /// Payload of the last *acknowledged* push.  `None` after a reset, so
    /// a reconnect always re-sends fresh state.
    last_acked: Option<String>,
    ack_timeout: Duration,
}

impl MediaPushSynchronizer {
    pub fn new(ack_timeout: Duration) -> Self {
        Self {
            state: PushState::Idle,
            last_acked: None,
            ack_timeout,
        }
    }

    /// Handles one media tick with a freshly computed payload.
    ///
    /// Returns the `SONG_INFO:` line to write when a push should go out.
    /// Returns `None` while a push is outstanding (no second token, no
    /// second write) and when the payload equals the acknowledged baseline
    /// (suppresses redundant writes).
    pub fn on_tick(&mut self, payload: String, now: Instant) -> Option<String> {
        if matches!(self.state, PushState::AwaitingAck { .. }) {
            trace!("push already in flight; tick ignored");
            return None;
        }
        if self.last_acked.as_deref() == Some(payload.as_str()) {
            return None;
        }

        let line = format!("{SONG_INFO_PREFIX}{payload}");
        self.state = PushState::AwaitingAck {
            token: PendingAck {
                created: now,
                payload,
            },
            deadline: now + self.ack_timeout,
        };
        Some(line)
    }

    /// Routes an inbound `OK`.
    ///
    /// With a pending token the push is acknowledged and its payload
    /// becomes the new baseline; without one the `OK` is not ours.
    pub fn on_ack(&mut self) -> AckOutcome {
        match std::mem::replace(&mut self.state, PushState::Idle) {
            PushState::AwaitingAck { token, .. } => {
                debug!(
                    elapsed_ms = token.created.elapsed().as_millis() as u64,
                    "song info push acknowledged"
                );
                self.last_acked = Some(token.payload);
                AckOutcome::PushAcknowledged
            }
            PushState::Idle => AckOutcome::NotWaiting,
        }
    }

    /// Expires the outstanding push.
    ///
    /// The baseline is *not* updated, so the same payload (or a newer one)
    /// is retried on a later tick.  A no-op when nothing is pending.
    pub fn on_timeout(&mut self) {
        if let PushState::AwaitingAck { token, .. } =
            std::mem::replace(&mut self.state, PushState::Idle)
        {
            debug!(payload = %token.payload, "song info push timed out; will retry");
        }
    }

    /// The instant at which the outstanding push expires, if any.  The
    /// session loop races this against inbound lines.
    pub fn deadline(&self) -> Option<Instant> {
        match &self.state {
            PushState::AwaitingAck { deadline, .. } => Some(*deadline),
            PushState::Idle => None,
        }
    }

    pub fn is_awaiting(&self) -> bool {
        matches!(self.state, PushState::AwaitingAck { .. })
    }

    /// Disconnect cancellation: abandons any pending token (an immediate
    /// timeout) and clears the baseline so a reconnect re-sends state.
    pub fn reset(&mut self) {
        self.state = PushState::Idle;
        self.last_acked = None;
    }
}

impl Default for MediaPushSynchronizer {
    fn default() -> Self {
        Self::new(DEFAULT_ACK_TIMEOUT)
    }
}
