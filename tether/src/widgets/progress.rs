//! Progress bar: its value moves host-side, the server half only hears
//! about it when the instance was rendered with `on_change`. Everything
//! it needs is the widget base behavior.

use crate::context::EventCtx;
use crate::registry::WidgetRegistration;
use crate::widget::{Widget, WidgetCore};

pub struct ProgressWidget {
    core: WidgetCore,
}

impl Widget for ProgressWidget {
    fn core(&self) -> &WidgetCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut WidgetCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "progress"
    }
}

fn construct(core: WidgetCore, _ctx: &mut EventCtx<'_>) -> Box<dyn Widget> {
    Box::new(ProgressWidget { core })
}

inventory::submit! {
    WidgetRegistration::new("progress", construct)
}
