//! The widget capability surface. Widgets extend a component with a
//! wid-addressed piece of page real estate; their events still travel
//! as component events, tagged with the widget's name.

use log::warn;
use pagedom::{Document, Surface};
use serde_json::{Map, Value};

use crate::context::{EventCtx, ResponseCallback};
use crate::envelope::{Cid, Envelope, Wid};
use crate::params::Params;
use crate::session::SessionEnded;

/// Identity every live widget carries: its own wid plus the cid of the
/// component it belongs to.
#[derive(Debug)]
pub struct WidgetCore {
    wid: Wid,
    cid: Cid,
    params: Params,
    surface: Surface,
}

impl WidgetCore {
    pub fn new(wid: Wid, cid: Cid, params: Params, surface: Surface) -> Self {
        Self {
            wid,
            cid,
            params,
            surface,
        }
    }

    pub fn wid(&self) -> &Wid {
        &self.wid
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

    /// Build a component event whose params carry `widget_name`, so the
    /// server can tell which of the component's widgets spoke.
    pub fn make_event(
        &self,
        ctx: &EventCtx<'_>,
        name: &str,
        params: Option<Map<String, Value>>,
    ) -> Result<Envelope, SessionEnded> {
        let tid = ctx.channel.session().stamp()?;
        let mut params = params.unwrap_or_default();
        params.insert(
            "widget_name".to_owned(),
            Value::String(self.wid.as_str().to_owned()),
        );
        Ok(Envelope::component(self.cid.clone(), name, Some(params), tid))
    }

    pub fn fire_event(
        &self,
        ctx: &mut EventCtx<'_>,
        name: &str,
        params: Option<Map<String, Value>>,
        callback: Option<ResponseCallback>,
    ) {
        match self.make_event(ctx, name, params) {
            Ok(envelope) => ctx.channel.send(envelope, callback),
            Err(SessionEnded) => {
                warn!("dropping {name:?} from widget {}: transaction ended", self.wid);
            }
        }
    }
}

/// A live widget instance.
pub trait Widget: Send {
    fn core(&self) -> &WidgetCore;
    fn core_mut(&mut self) -> &mut WidgetCore;
    fn type_name(&self) -> &'static str;

    /// Current user-visible value, read off the widget's node.
    fn value(&self, doc: &Document) -> Option<String> {
        doc.value_of(self.core().wid().as_str()).map(str::to_owned)
    }

    fn on_change(&mut self, ctx: &mut EventCtx<'_>, _value: &str) {
        self.notify_value_change(ctx);
    }

    /// Tell the owning component's server half the value moved. Only
    /// widgets rendered with `on_change` report.
    fn notify_value_change(&mut self, ctx: &mut EventCtx<'_>) {
        if self.core().params().flag("on_change") {
            self.core().fire_event(ctx, "onChange", None, None);
        }
    }

    /// Fields a hosting uploader must attach to its multipart POST.
    /// `None` for widgets that take no part in uploads.
    fn form_data(&self, _ctx: &EventCtx<'_>) -> Option<Vec<(String, String)>> {
        None
    }

    /// The hosting uploader finished a file; `result` is the server's
    /// parsed reply.
    fn on_upload_done(&mut self, _ctx: &mut EventCtx<'_>, _result: &Value) {}

    fn on_upload_failed(&mut self, _ctx: &mut EventCtx<'_>) {}
}
