//! Modal: a dialog whose save and close buttons report back to the
//! server, and which grabs focus for its first input when shown.

use log::debug;
use pagedom::ClickEvent;

use crate::component::{Component, ComponentCore, Identifiable};
use crate::context::EventCtx;
use crate::registry::ComponentRegistration;

pub struct Modal {
    core: ComponentCore,
    save_id: String,
    close_id: String,
}

impl Component for Modal {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "modal"
    }

    fn on_click(&mut self, ctx: &mut EventCtx<'_>, target: &str, ev: &mut ClickEvent) {
        self.base_click(ctx, ev);
        if target == self.save_id {
            ctx.channel.dispatch_event(self.cid(), "save", None);
        } else if target == self.close_id {
            ctx.channel.dispatch_event(self.cid(), "close", None);
        }
    }

    /// The dialog is on screen; put the cursor into its first input.
    fn on_shown(&mut self, ctx: &mut EventCtx<'_>, _target: &str) {
        let first_input = match ctx.doc.surface(self.surface()) {
            Ok(node) => node.first_tag("input").and_then(|input| input.id.clone()),
            Err(err) => {
                debug!("modal {} shown on dead surface: {err}", self.cid());
                return;
            }
        };
        if let Some(id) = first_input {
            if let Err(err) = ctx.doc.focus(&id) {
                debug!("cannot focus {id:?}: {err}");
            }
        }
    }
}

fn construct(core: ComponentCore, _ctx: &mut EventCtx<'_>) -> Box<dyn Component> {
    let cid = core.cid();
    let save_id = format!("{cid}_modal_save");
    let close_id = format!("{cid}_modal_close");
    Box::new(Modal {
        core,
        save_id,
        close_id,
    })
}

inventory::submit! {
    ComponentRegistration::new("modal", construct)
}
