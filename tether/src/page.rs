//! The live page: component and widget instances, their surfaces, and
//! everything routed between them.

use std::collections::HashMap;
use std::time::Instant;

use log::{debug, warn};
use pagedom::{Document, EventDisposition, Node, UiEvent, UiEventKind};
use serde_json::{Map, Value};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::channel::{Channel, ChannelConfig, Settlement, TransportOutcome, WireJob};
use crate::component::{Component, ComponentCore};
use crate::context::{EventCtx, ResponseCallback};
use crate::envelope::{Cid, Wid};
use crate::notice::{Notice, NoticeQueue};
use crate::params::Params;
use crate::registry;
use crate::session::Session;
use crate::widget::{Widget, WidgetCore};

#[derive(Debug, Error)]
pub enum PageError {
    #[error("unknown component type {0:?}")]
    UnknownComponentType(String),
    #[error("unknown widget type {0:?}")]
    UnknownWidgetType(String),
    #[error(transparent)]
    Surface(#[from] pagedom::SurfaceError),
}

/// Everything the host can feed into the page.
#[derive(Debug)]
pub enum HostEvent {
    Ui(UiEvent),
    /// The hosting uploader finished a file; `result` is the server's
    /// parsed reply.
    UploadDone { wid: Wid, result: Value },
    UploadFailed { wid: Wid },
}

/// A server-rendered replacement subtree plus the instances to bring up
/// inside it.
#[derive(Debug)]
pub struct Fragment {
    pub cid: Cid,
    pub markup: Node,
    pub reinit: Vec<InitSpec>,
}

#[derive(Debug)]
pub struct InitSpec {
    pub cid: Cid,
    pub type_name: String,
    pub params: Params,
}

/// Single owner of the document, the instances living on it, and the
/// event channel. Everything here runs on one task; handlers get a
/// borrowed [`EventCtx`] and never outlive their dispatch.
pub struct Page {
    document: Document,
    session: Session,
    channel: Channel,
    notices: NoticeQueue,
    components: HashMap<Cid, Box<dyn Component>>,
    widgets: HashMap<Wid, Box<dyn Widget>>,
}

impl Page {
    pub fn new(
        document: Document,
        session: Session,
        config: ChannelConfig,
        jobs: mpsc::UnboundedSender<WireJob>,
    ) -> Self {
        let channel = Channel::new(session.clone(), config, jobs);
        Self {
            document,
            session,
            channel,
            notices: NoticeQueue::new(),
            components: HashMap::new(),
            widgets: HashMap::new(),
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn component(&self, cid: &Cid) -> Option<&dyn Component> {
        self.components.get(cid).map(|instance| instance.as_ref())
    }

    pub fn widget(&self, wid: &Wid) -> Option<&dyn Widget> {
        self.widgets.get(wid).map(|instance| instance.as_ref())
    }

    /// Drain the notices queued for the host.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.take_all()
    }

    /// Envelopes still waiting for a response.
    pub fn pending_responses(&self) -> usize {
        self.channel.pending_len()
    }

    pub fn is_idle(&self) -> bool {
        self.channel.is_idle()
    }

    fn split(
        &mut self,
    ) -> (
        EventCtx<'_>,
        &mut HashMap<Cid, Box<dyn Component>>,
        &mut HashMap<Wid, Box<dyn Widget>>,
    ) {
        (
            EventCtx {
                doc: &mut self.document,
                channel: &mut self.channel,
                notices: &mut self.notices,
            },
            &mut self.components,
            &mut self.widgets,
        )
    }

    // Instance lifecycle

    /// Bring a component instance up on its rendered surface. Re-running
    /// for a cid replaces the previous instance wholesale, so one
    /// instance handles each interaction no matter how often the server
    /// repeats its init.
    pub fn init_component(
        &mut self,
        cid: Cid,
        type_name: &str,
        params: Params,
    ) -> Result<(), PageError> {
        let registration = registry::find_component(type_name)
            .ok_or_else(|| PageError::UnknownComponentType(type_name.to_owned()))?;
        let surface = self.document.bind(cid.as_str())?;
        let core = ComponentCore::new(cid.clone(), params, surface);
        let (mut ctx, components, _) = self.split();
        let instance = (registration.construct)(core, &mut ctx);
        if components.insert(cid.clone(), instance).is_some() {
            debug!("replaced live instance for {cid}");
        } else {
            debug!("initialized {type_name} instance for {cid}");
        }
        Ok(())
    }

    /// Bring a widget up on its wid-bound node.
    pub fn init_widget(
        &mut self,
        wid: Wid,
        cid: Cid,
        type_name: &str,
        params: Params,
    ) -> Result<(), PageError> {
        let registration = registry::find_widget(type_name)
            .ok_or_else(|| PageError::UnknownWidgetType(type_name.to_owned()))?;
        let surface = self.document.bind(wid.as_str())?;
        let core = WidgetCore::new(wid.clone(), cid, params, surface);
        let (mut ctx, _, widgets) = self.split();
        let instance = (registration.construct)(core, &mut ctx);
        if widgets.insert(wid.clone(), instance).is_some() {
            debug!("replaced live widget {wid}");
        } else {
            debug!("initialized {type_name} widget {wid}");
        }
        Ok(())
    }

    /// Drop an instance. Its surface stays rendered; nothing is routed
    /// to the cid afterwards.
    pub fn destroy_component(&mut self, cid: &Cid) {
        if let Some(mut instance) = self.components.remove(cid) {
            let (mut ctx, _, _) = self.split();
            instance.on_destroy(&mut ctx);
            debug!("destroyed instance for {cid}");
        }
    }

    pub fn destroy_widget(&mut self, wid: &Wid) {
        if self.widgets.remove(wid).is_some() {
            debug!("destroyed widget {wid}");
        }
    }

    /// Swap in a server-rendered fragment and bring up the instances it
    /// names. Instances bound inside the old subtree are dropped first;
    /// every handle onto the old subtree is stale from here on.
    pub fn apply_fragment(&mut self, fragment: Fragment) -> Result<(), PageError> {
        let invalidated = self.document.replace(fragment.cid.as_str(), fragment.markup)?;
        for binding in &invalidated {
            if let Some(mut instance) = self.components.remove(&Cid::new(binding.as_str())) {
                let (mut ctx, _, _) = self.split();
                instance.on_destroy(&mut ctx);
            }
            self.widgets.remove(&Wid::new(binding.as_str()));
        }
        for InitSpec {
            cid,
            type_name,
            params,
        } in fragment.reinit
        {
            self.init_component(cid, &type_name, params)?;
        }
        Ok(())
    }

    // Event routing

    /// Route one host event. Unroutable events are dropped with a log
    /// entry; a surface whose instance is gone stays inert.
    pub fn dispatch(&mut self, event: HostEvent) -> EventDisposition {
        match event {
            HostEvent::Ui(ev) => self.dispatch_ui(ev),
            HostEvent::UploadDone { wid, result } => {
                self.dispatch_upload(&wid, Some(result));
                EventDisposition::default()
            }
            HostEvent::UploadFailed { wid } => {
                self.dispatch_upload(&wid, None);
                EventDisposition::default()
            }
        }
    }

    fn dispatch_ui(&mut self, mut event: UiEvent) -> EventDisposition {
        if let UiEventKind::Change { value } = &event.kind {
            let value = value.clone();
            // The rendered control already holds this value; the mirror
            // has to agree before any handler re-reads the node.
            let _ = self.document.set_value(&event.target, value.clone());
            // Value changes on a widget-bound node belong to the widget,
            // not the enclosing component.
            let wid = self.document.widget_owner_of(&event.target).map(Wid::new);
            if let Some(wid) = wid {
                if self.widgets.contains_key(&wid) {
                    let (mut ctx, _, widgets) = self.split();
                    if let Some(widget) = widgets.get_mut(&wid) {
                        widget.on_change(&mut ctx, &value);
                    }
                    return EventDisposition::of(&event.kind);
                }
            }
        }

        let Some(cid) = self.document.owner_of(&event.target).map(Cid::new) else {
            debug!("no component owns node {:?}, dropping event", event.target);
            return EventDisposition::default();
        };
        let target = event.target.clone();
        let (mut ctx, components, _) = self.split();
        let Some(instance) = components.get_mut(&cid) else {
            debug!("no live instance for {cid}, dropping event");
            return EventDisposition::default();
        };
        match &mut event.kind {
            UiEventKind::Click(ev) => instance.on_click(&mut ctx, &target, ev),
            UiEventKind::DoubleClick(ev) => instance.on_double_click(&mut ctx, &target, ev),
            UiEventKind::KeyDown(ev) => instance.on_key_down(&mut ctx, &target, ev),
            UiEventKind::KeyUp(ev) => instance.on_key_up(&mut ctx, &target, ev),
            UiEventKind::Change { value } => instance.on_change(&mut ctx, &target, value),
            UiEventKind::Blur => instance.on_blur(&mut ctx, &target),
            UiEventKind::Shown => instance.on_shown(&mut ctx, &target),
        }
        EventDisposition::of(&event.kind)
    }

    /// Multipart bookkeeping fields for the uploader hosting `wid`.
    pub fn upload_form_data(&mut self, wid: &Wid) -> Option<Vec<(String, String)>> {
        let (ctx, _, widgets) = self.split();
        widgets.get(wid).and_then(|widget| widget.form_data(&ctx))
    }

    fn dispatch_upload(&mut self, wid: &Wid, result: Option<Value>) {
        let (mut ctx, _, widgets) = self.split();
        let Some(widget) = widgets.get_mut(wid) else {
            debug!("no live widget {wid}, dropping upload event");
            return;
        };
        match result {
            Some(data) => widget.on_upload_done(&mut ctx, &data),
            None => widget.on_upload_failed(&mut ctx),
        }
    }

    /// Fire a page-level event, outside any component.
    pub fn fire_page_event(
        &mut self,
        name: &str,
        params: Option<Map<String, Value>>,
        callback: Option<ResponseCallback>,
    ) {
        self.channel.send_page_event(name, params, callback);
    }

    // Responses

    /// Apply one transport outcome: resolve pending entries, run
    /// response hooks and callbacks, release the cid lane.
    pub fn on_transport_result(&mut self, outcome: TransportOutcome) {
        let settlements = self.channel.on_transport_result(outcome);
        for settlement in settlements {
            self.settle(settlement);
        }
    }

    /// Abandon requests that outlived the channel's patience.
    pub fn sweep_deadlines(&mut self, now: Instant) {
        let settlements = self.channel.sweep(now);
        for settlement in settlements {
            self.settle(settlement);
        }
    }

    fn settle(&mut self, settlement: Settlement) {
        let Settlement {
            eid,
            cid,
            outcome,
            callback,
        } = settlement;
        match outcome {
            Ok(data) => {
                let (mut ctx, components, _) = self.split();
                if let Some(cid) = &cid {
                    if let Some(instance) = components.get_mut(cid) {
                        instance.on_response(&mut ctx, eid, &data);
                    }
                }
                if let Some(callback) = callback {
                    callback(&mut ctx, &data);
                }
            }
            Err(err) => {
                warn!("{eid} failed: {err}");
                let (mut ctx, components, _) = self.split();
                ctx.notices.push(Notice::error(err.to_string()));
                if let Some(cid) = &cid {
                    if let Some(instance) = components.get_mut(cid) {
                        instance.on_send_failed(&mut ctx, eid);
                    }
                }
            }
        }
    }

    /// Direct channel access, for handlers constructed outside a
    /// dispatch (demos, tests).
    pub fn channel_mut(&mut self) -> &mut Channel {
        &mut self.channel
    }
}
