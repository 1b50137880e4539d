//! Page transaction state: the tid every outgoing event is stamped with.

use std::fmt;
use std::sync::{Arc, RwLock};

use log::{debug, warn};
use thiserror::Error;
use uuid::Uuid;

/// Server-issued transaction id. Rendered into the page at delivery and
/// rotated when the server says so.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(tid: impl Into<String>) -> Self {
        Self(tid.into())
    }

    /// A fresh random tid, for hosts that start without a rendered one.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Constructing events is refused once the transaction has ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("page transaction has ended")]
pub struct SessionEnded;

#[derive(Debug)]
struct Inner {
    tid: TransactionId,
    ended: bool,
}

/// Shared handle on the page transaction. Cheap to clone; every clone
/// sees rotations and the end of the transaction.
#[derive(Clone)]
pub struct Session {
    inner: Arc<RwLock<Inner>>,
}

impl Session {
    pub fn begin(tid: TransactionId) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner { tid, ended: false })),
        }
    }

    pub fn generate() -> Self {
        Self::begin(TransactionId::generate())
    }

    /// The tid to stamp an event with right now.
    pub fn stamp(&self) -> Result<TransactionId, SessionEnded> {
        let inner = self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        if inner.ended {
            return Err(SessionEnded);
        }
        Ok(inner.tid.clone())
    }

    /// Current tid regardless of lifecycle state. Display purposes only;
    /// stamping goes through [`Session::stamp`].
    pub fn tid(&self) -> TransactionId {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .tid
            .clone()
    }

    /// Adopt a server-issued replacement tid. Events constructed from
    /// here on carry the new one; the old tid is dead to the server.
    pub fn rotate(&self, tid: TransactionId) {
        let mut inner = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if inner.ended {
            warn!("ignoring tid rotation after transaction end");
            return;
        }
        debug!("transaction rotated {} -> {}", inner.tid, tid);
        inner.tid = tid;
    }

    /// Close the transaction for good. Idempotent.
    pub fn end(&self) {
        let mut inner = self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        if !inner.ended {
            debug!("transaction {} ended", inner.tid);
            inner.ended = true;
        }
    }

    pub fn is_ended(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .ended
    }
}
