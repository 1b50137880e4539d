//! The event channel: response correlation, per-component ordering,
//! and abandonment of requests the server never answers.

use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use log::{debug, trace, warn};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::context::ResponseCallback;
use crate::envelope::{Cid, Envelope, EventId, wire_batch};
use crate::session::Session;
use crate::transport::TransportError;

#[derive(Debug, Clone, Error)]
pub enum ChannelError {
    #[error("transport failed: {0}")]
    Transport(String),
    #[error("no response within {0:?}, request abandoned")]
    Abandoned(Duration),
}

/// Policy knobs for the channel.
#[derive(Debug, Clone)]
pub struct ChannelConfig {
    /// How long a pending envelope may wait for its response before the
    /// channel gives up on it. `None` waits forever, which also means a
    /// hung batch blocks its cid lane forever.
    pub abandon_after: Option<Duration>,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            abandon_after: Some(Duration::from_secs(30)),
        }
    }
}

/// One flushed batch on its way to the transport worker.
#[derive(Debug)]
pub struct WireJob {
    pub body: Value,
    pub eids: Vec<EventId>,
    pub cid: Option<Cid>,
}

/// What the transport worker reports back for one job.
#[derive(Debug)]
pub struct TransportOutcome {
    pub eids: Vec<EventId>,
    pub cid: Option<Cid>,
    pub result: Result<Value, TransportError>,
}

/// A resolved pending entry, ready to be applied to the page.
pub struct Settlement {
    pub eid: EventId,
    pub cid: Option<Cid>,
    pub outcome: Result<Value, ChannelError>,
    pub callback: Option<ResponseCallback>,
}

struct Pending {
    cid: Option<Cid>,
    callback: Option<ResponseCallback>,
    deadline: Option<Instant>,
}

/// Per-cid ordering state: at most one batch per cid is on the wire,
/// everything else queues behind it.
#[derive(Default)]
struct Lane {
    in_flight: bool,
    queued: VecDeque<Envelope>,
}

/// Routes envelopes out and responses back. Owned by the page; every
/// resolution comes back to the page task as a [`Settlement`].
pub struct Channel {
    session: Session,
    config: ChannelConfig,
    jobs: mpsc::UnboundedSender<WireJob>,
    pending: HashMap<EventId, Pending>,
    lanes: HashMap<Cid, Lane>,
}

impl Channel {
    pub fn new(
        session: Session,
        config: ChannelConfig,
        jobs: mpsc::UnboundedSender<WireJob>,
    ) -> Self {
        Self {
            session,
            config,
            jobs,
            pending: HashMap::new(),
            lanes: HashMap::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Hand an envelope to the channel. Exactly one pending entry is
    /// created, before anything is transmitted; per-cid ordering may
    /// hold the envelope back until earlier traffic for the same cid
    /// resolves. Envelopes without a cid go straight out.
    pub fn send(&mut self, envelope: Envelope, callback: Option<ResponseCallback>) {
        let eid = envelope.eid();
        let deadline = self
            .config
            .abandon_after
            .map(|after| Instant::now() + after);
        self.pending.insert(
            eid,
            Pending {
                cid: envelope.cid().cloned(),
                callback,
                deadline,
            },
        );

        match envelope.cid().cloned() {
            Some(cid) => {
                let lane = self.lanes.entry(cid.clone()).or_default();
                if lane.in_flight {
                    trace!("lane {cid} busy, queueing {eid}");
                    lane.queued.push_back(envelope);
                } else {
                    lane.in_flight = true;
                    self.transmit(Some(cid), vec![envelope]);
                }
            }
            None => self.transmit(None, vec![envelope]),
        }
    }

    /// Fire-and-forget convenience: build a component event and send it
    /// without a callback. Dropped with a warning once the transaction
    /// has ended.
    pub fn dispatch_event(&mut self, cid: &Cid, name: &str, params: Option<Map<String, Value>>) {
        match self.session.stamp() {
            Ok(tid) => {
                let envelope = Envelope::component(cid.clone(), name, params, tid);
                self.send(envelope, None);
            }
            Err(_) => warn!("dropping {name:?} for {cid}: transaction ended"),
        }
    }

    /// Same, for page-level events.
    pub fn send_page_event(
        &mut self,
        name: &str,
        params: Option<Map<String, Value>>,
        callback: Option<ResponseCallback>,
    ) {
        match self.session.stamp() {
            Ok(tid) => {
                let envelope = Envelope::page(name, params, tid);
                self.send(envelope, callback);
            }
            Err(_) => warn!("dropping page event {name:?}: transaction ended"),
        }
    }

    fn transmit(&mut self, cid: Option<Cid>, envelopes: Vec<Envelope>) {
        let Some(first) = envelopes.first() else {
            return;
        };
        let body = wire_batch(first.tid(), &envelopes);
        let eids: Vec<EventId> = envelopes.iter().map(Envelope::eid).collect();
        debug!("transmitting {} envelope(s): {eids:?}", envelopes.len());
        if self.jobs.send(WireJob { body, eids, cid }).is_err() {
            warn!("transport worker is gone, dropping batch");
        }
    }

    /// Resolve whatever the transport produced for one job. Every eid in
    /// the job settles at most once; late results for entries already
    /// abandoned are dropped here. The cid lane is released either way,
    /// which is what keeps per-cid ordering tied to actual transport
    /// completion.
    pub fn on_transport_result(&mut self, outcome: TransportOutcome) -> Vec<Settlement> {
        let mut settlements = Vec::new();
        for eid in &outcome.eids {
            let Some(pending) = self.pending.remove(eid) else {
                debug!("late result for {eid}, entry already resolved");
                continue;
            };
            let settled = match &outcome.result {
                Ok(value) => Ok(value.clone()),
                Err(err) => Err(ChannelError::Transport(err.to_string())),
            };
            settlements.push(Settlement {
                eid: *eid,
                cid: pending.cid,
                outcome: settled,
                callback: pending.callback,
            });
        }
        if let Some(cid) = &outcome.cid {
            self.release_lane(cid);
        }
        settlements
    }

    fn release_lane(&mut self, cid: &Cid) {
        let Some(lane) = self.lanes.get_mut(cid) else {
            return;
        };
        lane.in_flight = false;
        if lane.queued.is_empty() {
            return;
        }
        let queued: Vec<Envelope> = lane.queued.drain(..).collect();
        lane.in_flight = true;
        trace!("lane {cid} released, flushing {} queued envelope(s)", queued.len());
        self.transmit(Some(cid.clone()), queued);
    }

    /// Abandon pending entries whose deadline has passed. Their lanes
    /// stay blocked until the transport actually reports back; only the
    /// waiting callers are cut loose.
    pub fn sweep(&mut self, now: Instant) -> Vec<Settlement> {
        let Some(after) = self.config.abandon_after else {
            return Vec::new();
        };
        let expired: Vec<EventId> = self
            .pending
            .iter()
            .filter(|(_, pending)| pending.deadline.is_some_and(|deadline| deadline <= now))
            .map(|(eid, _)| *eid)
            .collect();
        let mut settlements = Vec::new();
        for eid in expired {
            if let Some(pending) = self.pending.remove(&eid) {
                warn!("abandoning {eid} after {after:?} without a response");
                settlements.push(Settlement {
                    eid,
                    cid: pending.cid,
                    outcome: Err(ChannelError::Abandoned(after)),
                    callback: pending.callback,
                });
            }
        }
        settlements
    }

    /// Number of envelopes still waiting for a response.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_idle(&self) -> bool {
        self.pending.is_empty()
    }

    /// Envelopes held back behind in-flight traffic for this cid.
    pub fn queued_for(&self, cid: &Cid) -> usize {
        self.lanes.get(cid).map_or(0, |lane| lane.queued.len())
    }
}
