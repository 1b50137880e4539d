//! Link: an anchor whose click optionally becomes a server event
//! instead of a navigation.

use pagedom::ClickEvent;

use crate::component::{Component, ComponentCore, Dispatchable, Identifiable};
use crate::context::EventCtx;
use crate::registry::ComponentRegistration;

pub struct Link {
    core: ComponentCore,
}

impl Component for Link {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "link"
    }

    /// With `event_name` configured the click goes to the server and
    /// the navigation is suppressed; without it the anchor stays a
    /// plain link. `stop_propagration_on_click` (the key carries the
    /// server contract's spelling) halts bubbling either way.
    fn on_click(&mut self, ctx: &mut EventCtx<'_>, _target: &str, ev: &mut ClickEvent) {
        self.base_click(ctx, ev);
        if let Some(name) = self.params().str_opt("event_name").map(str::to_owned) {
            self.fire_event(ctx, &name, None, None);
            ev.prevent_default();
        }
        if self.params().flag("stop_propagration_on_click") {
            ev.stop_propagation();
        }
    }

    fn on_double_click(&mut self, ctx: &mut EventCtx<'_>, _target: &str, ev: &mut ClickEvent) {
        self.base_double_click(ctx, ev);
        if let Some(name) = self
            .params()
            .str_opt("double_click_event_name")
            .map(str::to_owned)
        {
            self.fire_event(ctx, &name, None, None);
            ev.prevent_default();
        }
        if self.params().flag("stop_propagration_on_click") {
            ev.stop_propagation();
        }
    }
}

fn construct(core: ComponentCore, _ctx: &mut EventCtx<'_>) -> Box<dyn Component> {
    Box::new(Link { core })
}

inventory::submit! {
    ComponentRegistration::new("link", construct)
}
