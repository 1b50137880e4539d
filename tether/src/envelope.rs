//! Event envelopes and their wire encoding.
//!
//! The field names in [`Envelope::to_wire`] are the server's ajax
//! contract and must not drift: `t`, `id`, `cid`, `e`, `p`, `tid`, and
//! `widget_name` for upload records.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::{Map, Value, json};

use crate::session::TransactionId;

static NEXT_EVENT_ID: AtomicU64 = AtomicU64::new(1);

/// Correlation key for one envelope. Unique for the life of the process
/// and strictly increasing, so the server can spot replays.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u64);

impl EventId {
    pub fn next() -> Self {
        Self(NEXT_EVENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ev{}", self.0)
    }
}

/// Component instance id, assigned server-side, unique per page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Cid(String);

impl Cid {
    pub fn new(cid: impl Into<String>) -> Self {
        Self(cid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Cid {
    fn from(cid: &str) -> Self {
        Self(cid.to_owned())
    }
}

impl From<String> for Cid {
    fn from(cid: String) -> Self {
        Self(cid)
    }
}

impl fmt::Display for Cid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Widget id. Lives in its own namespace beside cids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Wid(String);

impl Wid {
    pub fn new(wid: impl Into<String>) -> Self {
        Self(wid.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Wid {
    fn from(wid: &str) -> Self {
        Self(wid.to_owned())
    }
}

impl From<String> for Wid {
    fn from(wid: String) -> Self {
        Self(wid)
    }
}

impl fmt::Display for Wid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which server handler an envelope addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Handled by the component bound to the cid. `"ce"` on the wire.
    Component { name: String },
    /// Handled by the page itself. `"pe"` on the wire.
    Page { name: String },
    /// Upload bookkeeping record. `"upl"` on the wire; rides along a
    /// multipart POST instead of the ajax queue.
    Upload { widget_name: String },
}

impl EventKind {
    pub fn wire_tag(&self) -> &'static str {
        match self {
            EventKind::Component { .. } => "ce",
            EventKind::Page { .. } => "pe",
            EventKind::Upload { .. } => "upl",
        }
    }
}

/// One addressed, parameterized, correlatable unit of user intent.
#[derive(Debug, Clone)]
pub struct Envelope {
    eid: EventId,
    kind: EventKind,
    cid: Option<Cid>,
    params: Map<String, Value>,
    tid: TransactionId,
}

impl Envelope {
    /// Event for the component's server half. Absent params become an
    /// empty map; the server always sees `p`.
    pub fn component(
        cid: Cid,
        name: impl Into<String>,
        params: Option<Map<String, Value>>,
        tid: TransactionId,
    ) -> Self {
        Self {
            eid: EventId::next(),
            kind: EventKind::Component { name: name.into() },
            cid: Some(cid),
            params: params.unwrap_or_default(),
            tid,
        }
    }

    /// Event for a page-level handler; carries no cid.
    pub fn page(
        name: impl Into<String>,
        params: Option<Map<String, Value>>,
        tid: TransactionId,
    ) -> Self {
        Self {
            eid: EventId::next(),
            kind: EventKind::Page { name: name.into() },
            cid: None,
            params: params.unwrap_or_default(),
            tid,
        }
    }

    /// Bookkeeping record for one file upload.
    pub fn upload(cid: Cid, widget_name: impl Into<String>, tid: TransactionId) -> Self {
        Self {
            eid: EventId::next(),
            kind: EventKind::Upload {
                widget_name: widget_name.into(),
            },
            cid: Some(cid),
            params: Map::new(),
            tid,
        }
    }

    pub fn eid(&self) -> EventId {
        self.eid
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn cid(&self) -> Option<&Cid> {
        self.cid.as_ref()
    }

    /// Server-side handler name, where the kind has one.
    pub fn name(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Component { name } | EventKind::Page { name } => Some(name),
            EventKind::Upload { .. } => None,
        }
    }

    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    pub fn tid(&self) -> &TransactionId {
        &self.tid
    }

    /// Encode for the ajax queue.
    pub fn to_wire(&self) -> Value {
        match &self.kind {
            EventKind::Component { name } => json!({
                "t": "ce",
                "id": self.eid.as_u64(),
                "cid": self.cid.as_ref().map(Cid::as_str),
                "e": name,
                "p": Value::Object(self.params.clone()),
                "tid": self.tid.as_str(),
            }),
            EventKind::Page { name } => json!({
                "t": "pe",
                "id": self.eid.as_u64(),
                "e": name,
                "p": Value::Object(self.params.clone()),
                "tid": self.tid.as_str(),
            }),
            EventKind::Upload { widget_name } => json!({
                "t": "upl",
                "id": self.eid.as_u64(),
                "cid": self.cid.as_ref().map(Cid::as_str),
                "widget_name": widget_name,
                "tid": self.tid.as_str(),
            }),
        }
    }
}

/// Encode a flushed batch the way the server expects it: the batch tid
/// plus the queue under `q`.
pub fn wire_batch(tid: &TransactionId, envelopes: &[Envelope]) -> Value {
    json!({
        "tid": tid.as_str(),
        "q": envelopes.iter().map(Envelope::to_wire).collect::<Vec<_>>(),
    })
}
