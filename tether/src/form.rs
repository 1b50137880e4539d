//! The change pipeline for value-bearing form inputs: coalescing, the
//! one-in-flight rule, and the wiring that feeds settled envelopes back
//! through it.

use log::{trace, warn};
use serde_json::{Map, Value};

use crate::component::{Component, Dispatchable, Identifiable};
use crate::context::EventCtx;
use crate::envelope::EventId;

/// Decision for one observed change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoalesceDecision {
    /// Transmit this value now.
    Send(String),
    /// Held back; it rides out once the in-flight change resolves.
    Deferred,
}

#[derive(Debug, Default)]
enum CoalesceState {
    #[default]
    Idle,
    InFlight {
        eid: EventId,
        sent: String,
        queued: Option<String>,
    },
}

/// Per-input coalescing state. At most one change per input is on the
/// wire; newer values overwrite the waiting slot, and a value equal to
/// the one already out there is dropped outright.
#[derive(Debug, Default)]
pub struct Coalescer {
    state: CoalesceState,
}

impl Coalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classify one observed change. `enqueue` is the default policy;
    /// inputs rendered with `fire_change_immediately` pass false and
    /// bypass coalescing entirely.
    pub fn change(&mut self, value: &str, enqueue: bool) -> CoalesceDecision {
        if !enqueue {
            return CoalesceDecision::Send(value.to_owned());
        }
        match &mut self.state {
            CoalesceState::Idle => CoalesceDecision::Send(value.to_owned()),
            CoalesceState::InFlight { sent, queued, .. } => {
                if queued.as_deref() == Some(value) || (queued.is_none() && sent == value) {
                    trace!("change to {value:?} already covered, dropping");
                } else {
                    *queued = Some(value.to_owned());
                }
                CoalesceDecision::Deferred
            }
        }
    }

    /// Record the envelope now carrying the in-flight change.
    pub fn mark_in_flight(&mut self, eid: EventId, value: String) {
        self.state = CoalesceState::InFlight {
            eid,
            sent: value,
            queued: None,
        };
    }

    /// Feed a settled envelope through. Returns the queued value to
    /// transmit next when one was waiting behind a successful response.
    /// After a failure the queued value is dropped, not retried; the
    /// surface still holds it and the next change or blur re-reads it.
    pub fn settle(&mut self, eid: EventId, ok: bool) -> Option<String> {
        let CoalesceState::InFlight {
            eid: in_flight,
            queued,
            ..
        } = &mut self.state
        else {
            return None;
        };
        if *in_flight != eid {
            return None;
        }
        let next = queued.take();
        self.state = CoalesceState::Idle;
        match (ok, next) {
            (true, next) => next,
            (false, dropped) => {
                if let Some(value) = dropped {
                    warn!("queued change to {value:?} dropped after transport failure");
                }
                None
            }
        }
    }

    pub fn in_flight(&self) -> bool {
        matches!(self.state, CoalesceState::InFlight { .. })
    }

    pub fn queued(&self) -> Option<&str> {
        match &self.state {
            CoalesceState::InFlight { queued, .. } => queued.as_deref(),
            CoalesceState::Idle => None,
        }
    }
}

/// Change pipeline wiring for inputs that own a [`Coalescer`].
///
/// Leaves route observed values through [`change_value`] and feed their
/// settled envelopes through [`settle_change`] from `on_response` /
/// `on_send_failed`.
///
/// [`change_value`]: ChangeCoalescing::change_value
/// [`settle_change`]: ChangeCoalescing::settle_change
pub trait ChangeCoalescing: Component {
    fn coalescer(&self) -> &Coalescer;
    fn coalescer_mut(&mut self) -> &mut Coalescer;

    /// Route one observed value through coalescing and out to the
    /// server.
    fn change_value(&mut self, ctx: &mut EventCtx<'_>, value: &str) {
        let enqueue = !self.core().params().flag("fire_change_immediately");
        match self.coalescer_mut().change(value, enqueue) {
            CoalesceDecision::Send(value) => self.send_change(ctx, value, enqueue),
            CoalesceDecision::Deferred => {}
        }
    }

    /// Transmit a change envelope and, in enqueue mode, mark it as the
    /// one in flight.
    fn send_change(&mut self, ctx: &mut EventCtx<'_>, value: String, enqueue: bool) {
        let mut params = Map::new();
        params.insert("value".to_owned(), Value::String(value.clone()));
        match self.make_event(ctx, "change", Some(params)) {
            Ok(envelope) => {
                if enqueue {
                    self.coalescer_mut().mark_in_flight(envelope.eid(), value);
                }
                ctx.channel.send(envelope, None);
            }
            Err(_) => warn!("dropping change from {}: transaction ended", self.cid()),
        }
    }

    /// Feed a settled envelope through the coalescer; flushes the
    /// queued value behind a successful response.
    fn settle_change(&mut self, ctx: &mut EventCtx<'_>, eid: EventId, ok: bool) {
        if let Some(next) = self.coalescer_mut().settle(eid, ok) {
            self.send_change(ctx, next, true);
        }
    }
}

/// Server-side validation verdict riding back on a change response, if
/// any. The server puts the rejection message under `error`.
pub fn validation_error(data: &Value) -> Option<&str> {
    data.get("error").and_then(Value::as_str)
}
