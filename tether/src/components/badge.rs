//! Badge: a passive display element. Everything it can do comes from
//! the base capabilities.

use crate::component::{Component, ComponentCore};
use crate::context::EventCtx;
use crate::registry::ComponentRegistration;

pub struct Badge {
    core: ComponentCore,
}

impl Component for Badge {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "badge"
    }
}

fn construct(core: ComponentCore, _ctx: &mut EventCtx<'_>) -> Box<dyn Component> {
    Box::new(Badge { core })
}

inventory::submit! {
    ComponentRegistration::new("badge", construct)
}
