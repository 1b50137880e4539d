//! Upload widget: the file traffic itself belongs to the hosting
//! uploader, which POSTs multipart to the server's upload endpoint.
//! This side supplies the bookkeeping fields that request must carry
//! and reacts to its outcome: a preview rewrite on success, a transient
//! error on failure.

use log::{debug, warn};
use serde_json::Value;

use crate::context::EventCtx;
use crate::envelope::Envelope;
use crate::notice::Notice;
use crate::registry::WidgetRegistration;
use crate::session::SessionEnded;
use crate::widget::{Widget, WidgetCore};

pub struct UploadWidget {
    core: WidgetCore,
}

impl Widget for UploadWidget {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "upload"
    }

    /// Form fields the uploader attaches to its multipart POST. Field
    /// names are the server's upload contract.
    fn form_data(&self, ctx: &EventCtx<'_>) -> Option<Vec<(String, String)>> {
        let tid = match ctx.channel.session().stamp() {
            Ok(tid) => tid,
            Err(SessionEnded) => {
                warn!("no upload fields for {}: transaction ended", self.core.wid());
                return None;
            }
        };
        let envelope = Envelope::upload(self.core.cid().clone(), self.core.wid().as_str(), tid);
        Some(vec![
            (
                "widget_name".to_owned(),
                self.core.wid().as_str().to_owned(),
            ),
            ("id".to_owned(), envelope.eid().as_u64().to_string()),
            ("t".to_owned(), envelope.kind().wire_tag().to_owned()),
            ("cid".to_owned(), self.core.cid().as_str().to_owned()),
            ("tid".to_owned(), envelope.tid().as_str().to_owned()),
        ])
    }

    fn on_upload_done(&mut self, ctx: &mut EventCtx<'_>, result: &Value) {
        let Some(url) = result.get("preview_url").and_then(Value::as_str) else {
            warn!("upload reply for {} has no preview_url", self.core.wid());
            return;
        };
        let preview = format!("{}_preview", self.core.wid());
        let markup =
            format!("<a target=\"_blank\" href=\"{url}\"><img src=\"{url}\" width=\"300\"></a>");
        if let Err(err) = ctx.doc.set_markup(&preview, markup) {
            debug!("no preview region {preview:?}: {err}");
        }
        ctx.notices.push(Notice::ok("txt_upload_file_ok"));
    }

    fn on_upload_failed(&mut self, ctx: &mut EventCtx<'_>) {
        ctx.notices.push(Notice::error("txt_upload_file_error"));
    }
}

fn construct(core: WidgetCore, _ctx: &mut EventCtx<'_>) -> Box<dyn Widget> {
    Box::new(UploadWidget { core })
}

inventory::submit! {
    WidgetRegistration::new("upload", construct)
}
