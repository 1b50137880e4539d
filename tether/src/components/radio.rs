//! Radio group: one value for the whole group, reported through the
//! change pipeline. Re-selecting the already-selected option is not a
//! change and sends nothing.

use log::trace;
use pagedom::Document;
use serde_json::Value;

use crate::component::{Component, ComponentCore, Identifiable};
use crate::context::EventCtx;
use crate::envelope::EventId;
use crate::form::{ChangeCoalescing, Coalescer};
use crate::registry::ComponentRegistration;

pub struct Radio {
    core: ComponentCore,
    coalescer: Coalescer,
    selected: Option<String>,
}

impl Radio {
    fn selected_value(doc: &Document, cid: &str) -> Option<String> {
        doc.value_of(cid).map(str::to_owned)
    }
}

impl Component for Radio {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "radio"
    }

    fn on_change(&mut self, ctx: &mut EventCtx<'_>, _target: &str, value: &str) {
        if self.selected.as_deref() == Some(value) {
            trace!("{} already at {value:?}", self.cid());
            return;
        }
        self.selected = Some(value.to_owned());
        self.change_value(ctx, value);
    }

    fn on_response(&mut self, ctx: &mut EventCtx<'_>, eid: EventId, data: &Value) {
        self.settle_change(ctx, eid, true);
        self.after_response(ctx, data);
    }

    fn on_send_failed(&mut self, ctx: &mut EventCtx<'_>, eid: EventId) {
        self.settle_change(ctx, eid, false);
    }
}

impl ChangeCoalescing for Radio {
    fn coalescer(&self) -> &Coalescer {
        &self.coalescer
    }

    fn coalescer_mut(&mut self) -> &mut Coalescer {
        &mut self.coalescer
    }
}

fn construct(core: ComponentCore, ctx: &mut EventCtx<'_>) -> Box<dyn Component> {
    let selected = Radio::selected_value(ctx.doc, core.cid().as_str());
    Box::new(Radio {
        core,
        coalescer: Coalescer::new(),
        selected,
    })
}

inventory::submit! {
    ComponentRegistration::new("radio", construct)
}
