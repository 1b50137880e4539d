//! Tab strip: the menu and its panes share one cid. Clicking a menu
//! anchor tells the server which pane to bring up; the server answers
//! with a re-rendered fragment.

use pagedom::ClickEvent;
use serde_json::{Map, Value};

use crate::component::{Component, ComponentCore, Dispatchable};
use crate::context::EventCtx;
use crate::registry::ComponentRegistration;

pub struct TabsLayout {
    core: ComponentCore,
}

impl Component for TabsLayout {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "tabs_layout"
    }

    /// Menu anchors carry the pane's cid in `data-tab-compo-cid`;
    /// anything else on the surface is an ordinary click.
    fn on_click(&mut self, ctx: &mut EventCtx<'_>, target: &str, ev: &mut ClickEvent) {
        self.base_click(ctx, ev);
        let selected = ctx
            .doc
            .attr_of(target, "data-tab-compo-cid")
            .map(str::to_owned);
        if let Some(selected) = selected {
            let mut params = Map::new();
            params.insert("selected_compo_cid".to_owned(), Value::String(selected));
            self.fire_event(ctx, "toggle_tab", Some(params), None);
        }
    }
}

fn construct(core: ComponentCore, ctx: &mut EventCtx<'_>) -> Box<dyn Component> {
    // Panes arrive from the server as plain role="tabpanel" containers;
    // the pane class drives the host's show/hide styling.
    if let Ok(node) = ctx.doc.surface_mut(core.surface()) {
        node.visit_mut(&mut |child| {
            if child.get_attr("role") == Some("tabpanel") {
                child.add_class("tab-pane");
            }
        });
    }
    Box::new(TabsLayout { core })
}

inventory::submit! {
    ComponentRegistration::new("tabs_layout", construct)
}
