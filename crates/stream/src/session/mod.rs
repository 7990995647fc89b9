//! Session lifecycle: negotiation identity, supervision, and teardown
//!
//! The [`controller`] owns all mutable session state in a single task;
//! every asynchronous continuation reaches it as a generation-tagged
//! [`SessionEvent`] and is discarded when its generation is stale.

pub mod controller;
pub mod generation;

pub use controller::{LiveViewClient, SessionSnapshot};
pub use generation::Generation;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::trace;

use crate::media::MediaTrack;
use crate::session::generation::GenerationGate;
use crate::signaling::SignalingTarget;
use crate::Result;

/// Lifecycle state of the current session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No negotiation in progress and no live connection
    Idle,
    /// Initial negotiation attempt in flight
    Negotiating,
    /// A negotiated connection is live and supervised
    Connected,
    /// The link degraded; a budgeted re-negotiation attempt is in flight
    Reconnecting,
    /// Terminal failure declared; only a new session leaves this state
    Failed,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Negotiating => write!(f, "negotiating"),
            SessionState::Connected => write!(f, "connected"),
            SessionState::Reconnecting => write!(f, "reconnecting"),
            SessionState::Failed => write!(f, "failed"),
        }
    }
}

/// Events delivered to the controller task. Every variant is tagged with
/// the generation of the attempt that produced it.
pub(crate) enum SessionEvent {
    /// A negotiation attempt completed with a live connection
    Negotiated {
        generation: Generation,
        link: Box<dyn MediaLink>,
    },
    /// A negotiation attempt failed before producing a connection
    AttemptFailed {
        generation: Generation,
        error: crate::Error,
    },
    /// The supervised connection's ICE state reached `failed` or `closed`
    LinkDown { generation: Generation },
    /// An inbound media track arrived
    TrackReady {
        generation: Generation,
        track: MediaTrack,
    },
}

/// One full negotiation attempt: build the offer, exchange it with the
/// gateway, and hand back the live connection with its monitor wired to
/// the attempt's event channel.
#[async_trait]
pub(crate) trait Negotiator: Send + Sync {
    async fn negotiate(
        &self,
        target: &SignalingTarget,
        attempt: AttemptContext,
    ) -> Result<Box<dyn MediaLink>>;
}

/// Owned handle to a negotiated connection
#[async_trait]
pub(crate) trait MediaLink: Send + Sync {
    /// Stop transceivers, close the connection, and release gateway-side
    /// resources. Consumes the link; a session never reuses one.
    async fn shutdown(self: Box<Self>);
}

/// Checked-generation context handed into every asynchronous unit of work
#[derive(Clone)]
pub(crate) struct AttemptContext {
    pub generation: Generation,
    gate: Arc<GenerationGate>,
    events: mpsc::UnboundedSender<SessionEvent>,
}

impl AttemptContext {
    pub fn new(
        generation: Generation,
        gate: Arc<GenerationGate>,
        events: mpsc::UnboundedSender<SessionEvent>,
    ) -> Self {
        Self {
            generation,
            gate,
            events,
        }
    }

    pub fn is_current(&self) -> bool {
        self.gate.is_current(self.generation)
    }

    /// Deliver an event unconditionally. Used for attempt results, which
    /// the controller must see even when stale (to tear the link down).
    pub fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    /// Deliver an event only while this attempt's generation is current
    pub fn emit_if_current(&self, event: SessionEvent) {
        if self.is_current() {
            self.emit(event);
        } else {
            trace!(generation = %self.generation, "dropping event from superseded session");
        }
    }
}
