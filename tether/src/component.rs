//! The component capability surface: identity, event dispatch, and the
//! handler hooks a live instance receives.

use log::{trace, warn};
use pagedom::{ClickEvent, KeyEvent, Surface};
use serde_json::{Map, Value};

use crate::context::{EventCtx, ResponseCallback};
use crate::envelope::{Cid, Envelope, EventId};
use crate::params::Params;
use crate::session::SessionEnded;

/// Identity and configuration every live instance carries.
#[derive(Debug)]
pub struct ComponentCore {
    cid: Cid,
    params: Params,
    surface: Surface,
    interactions: u64,
}

impl ComponentCore {
    pub fn new(cid: Cid, params: Params, surface: Surface) -> Self {
        Self {
            cid,
            params,
            surface,
            interactions: 0,
        }
    }

    pub fn cid(&self) -> &Cid {
        &self.cid
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// How many times the shared click protocol ran for this instance.
    pub fn interactions(&self) -> u64 {
        self.interactions
    }

    pub fn note_interaction(&mut self) {
        self.interactions += 1;
    }
}

/// Read access to an instance's identity.
pub trait Identifiable {
    fn cid(&self) -> &Cid;
    fn params(&self) -> &Params;
    fn surface(&self) -> &Surface;
}

impl<T: Component + ?Sized> Identifiable for T {
    fn cid(&self) -> &Cid {
        self.core().cid()
    }

    fn params(&self) -> &Params {
        self.core().params()
    }

    fn surface(&self) -> &Surface {
        self.core().surface()
    }
}

/// Ability to address the server handler behind this instance.
pub trait Dispatchable: Identifiable {
    /// Build a component event envelope stamped with the current
    /// transaction. Pure construction, nothing is transmitted. Absent
    /// params become an empty map so the server always sees `p`.
    fn make_event(
        &self,
        ctx: &EventCtx<'_>,
        name: &str,
        params: Option<Map<String, Value>>,
    ) -> Result<Envelope, SessionEnded> {
        let tid = ctx.channel.session().stamp()?;
        Ok(Envelope::component(self.cid().clone(), name, params, tid))
    }

    /// Build and transmit in one go. On an ended transaction the event
    /// is dropped with a warning; instances outliving their page are an
    /// ordinary teardown race, not a fault.
    fn fire_event(
        &self,
        ctx: &mut EventCtx<'_>,
        name: &str,
        params: Option<Map<String, Value>>,
        callback: Option<ResponseCallback>,
    ) {
        match self.make_event(ctx, name, params) {
            Ok(envelope) => ctx.channel.send(envelope, callback),
            Err(SessionEnded) => {
                warn!("dropping {name:?} from {}: transaction ended", self.cid());
            }
        }
    }
}

impl<T: Identifiable + ?Sized> Dispatchable for T {}

/// A live client-side instance: per-instance state plus the user events
/// routed to its surface. Every handler gets the id of the node the
/// interaction targeted; most leaves only care for some of them.
pub trait Component: Send {
    fn core(&self) -> &ComponentCore;
    fn core_mut(&mut self) -> &mut ComponentCore;
    fn type_name(&self) -> &'static str;

    /// Shared click protocol. Runs before any leaf extension, always.
    fn base_click(&mut self, _ctx: &mut EventCtx<'_>, _ev: &mut ClickEvent) {
        self.core_mut().note_interaction();
        trace!("{} clicked", self.core().cid());
    }

    fn on_click(&mut self, ctx: &mut EventCtx<'_>, _target: &str, ev: &mut ClickEvent) {
        self.base_click(ctx, ev);
    }

    fn base_double_click(&mut self, _ctx: &mut EventCtx<'_>, _ev: &mut ClickEvent) {
        self.core_mut().note_interaction();
        trace!("{} double clicked", self.core().cid());
    }

    fn on_double_click(&mut self, ctx: &mut EventCtx<'_>, _target: &str, ev: &mut ClickEvent) {
        self.base_double_click(ctx, ev);
    }

    fn on_key_down(&mut self, _ctx: &mut EventCtx<'_>, _target: &str, _ev: &mut KeyEvent) {}

    fn on_key_up(&mut self, _ctx: &mut EventCtx<'_>, _target: &str, _ev: &mut KeyEvent) {}

    fn on_change(&mut self, _ctx: &mut EventCtx<'_>, _target: &str, _value: &str) {}

    fn on_blur(&mut self, _ctx: &mut EventCtx<'_>, _target: &str) {}

    /// The surface became visible (dialogs, panes).
    fn on_shown(&mut self, _ctx: &mut EventCtx<'_>, _target: &str) {}

    /// Response hook: runs for every response addressed to this
    /// instance, before any caller-supplied callback.
    fn after_response(&mut self, _ctx: &mut EventCtx<'_>, _data: &Value) {}

    /// Runtime entry point for a successfully settled envelope. Form
    /// inputs override this to feed their change pipeline before the
    /// `after_response` hook runs.
    fn on_response(&mut self, ctx: &mut EventCtx<'_>, eid: EventId, data: &Value) {
        let _ = eid;
        self.after_response(ctx, data);
    }

    /// The envelope failed in transit or was abandoned. The page has
    /// already raised the transient error notice.
    fn on_send_failed(&mut self, _ctx: &mut EventCtx<'_>, _eid: EventId) {}

    /// The page is dropping this instance.
    fn on_destroy(&mut self, _ctx: &mut EventCtx<'_>) {}
}
