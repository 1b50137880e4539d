//! What a handler gets to touch while it runs.

use pagedom::Document;
use serde_json::Value;

use crate::channel::Channel;
use crate::notice::NoticeQueue;

/// Borrowed view of the page a handler may act on: the rendered tree,
/// the event channel, and the notice queue. Handlers run one at a time
/// on the page task; there is nothing to lock.
pub struct EventCtx<'a> {
    pub doc: &'a mut Document,
    pub channel: &'a mut Channel,
    pub notices: &'a mut NoticeQueue,
}

/// Invoked on the page task once the response for an envelope arrives.
/// Runs after the owning component's `after_response`. Transport
/// failures never reach the callback; they take the page's failure path
/// instead.
pub type ResponseCallback = Box<dyn FnOnce(&mut EventCtx<'_>, &Value) + Send>;
