//! Numeric input: a keystroke filter in front of the change pipeline.
//!
//! The filter is a pure predicate over the key code; the instance only
//! contributes whether Ctrl is currently held (tracked across
//! keydown/keyup, since clipboard shortcuts arrive as plain letter
//! codes) and whether the rendered input accepts a decimal point.

use pagedom::{KeyEvent, keys};
use serde_json::Value;

use crate::component::{Component, ComponentCore};
use crate::context::EventCtx;
use crate::envelope::EventId;
use crate::form::{ChangeCoalescing, Coalescer};
use crate::registry::ComponentRegistration;

/// Control and navigation keys that always pass the filter.
const ALLOWED_KEYS: [u16; 13] = [
    keys::DELETE,
    keys::BACKSPACE,
    keys::TAB,
    keys::ESCAPE,
    keys::ENTER,
    keys::NUMPAD_DECIMAL,
    keys::END,
    keys::HOME,
    keys::ARROW_LEFT,
    keys::ARROW_UP,
    keys::ARROW_RIGHT,
    keys::ARROW_DOWN,
    keys::MINUS,
];

/// Select-all, copy, paste, cut. Allowed only while Ctrl is held.
const CLIPBOARD_KEYS: [u16; 4] = [keys::KEY_A, keys::KEY_C, keys::KEY_V, keys::KEY_X];

/// Whether a key press may reach the input. `float` widens the filter
/// to the decimal point.
pub fn key_allowed(code: u16, float: bool, ctrl_held: bool) -> bool {
    if (keys::DIGIT_0..=keys::DIGIT_9).contains(&code) {
        return true;
    }
    if ALLOWED_KEYS.contains(&code) {
        return true;
    }
    if code == keys::PERIOD && float {
        return true;
    }
    ctrl_held && CLIPBOARD_KEYS.contains(&code)
}

pub struct NumberInput {
    core: ComponentCore,
    coalescer: Coalescer,
    input_id: String,
    float: bool,
    ctrl_held: bool,
}

impl Component for NumberInput {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "number_input"
    }

    fn on_key_down(&mut self, _ctx: &mut EventCtx<'_>, _target: &str, ev: &mut KeyEvent) {
        if ev.code == keys::CTRL {
            self.ctrl_held = true;
        }
        let ctrl = self.ctrl_held || ev.modifiers.ctrl;
        if !key_allowed(ev.code, self.float, ctrl) {
            ev.prevent_default();
        }
    }

    fn on_key_up(&mut self, _ctx: &mut EventCtx<'_>, _target: &str, ev: &mut KeyEvent) {
        if ev.code == keys::CTRL {
            self.ctrl_held = false;
        }
    }

    fn on_change(&mut self, ctx: &mut EventCtx<'_>, _target: &str, value: &str) {
        self.change_value(ctx, value);
    }

    fn on_blur(&mut self, ctx: &mut EventCtx<'_>, _target: &str) {
        let value = ctx.doc.value_of(&self.input_id).map(str::to_owned);
        if let Some(value) = value {
            self.change_value(ctx, &value);
        }
    }

    fn on_response(&mut self, ctx: &mut EventCtx<'_>, eid: EventId, data: &Value) {
        self.settle_change(ctx, eid, true);
        self.after_response(ctx, data);
    }

    fn on_send_failed(&mut self, ctx: &mut EventCtx<'_>, eid: EventId) {
        self.settle_change(ctx, eid, false);
    }
}

impl ChangeCoalescing for NumberInput {
    fn coalescer(&self) -> &Coalescer {
        &self.coalescer
    }

    fn coalescer_mut(&mut self) -> &mut Coalescer {
        &mut self.coalescer
    }
}

fn construct(core: ComponentCore, ctx: &mut EventCtx<'_>) -> Box<dyn Component> {
    let input_id = format!("{}_input", core.cid());
    let float = ctx.doc.attr_of(&input_id, "data-validation-type") == Some("float");
    Box::new(NumberInput {
        core,
        coalescer: Coalescer::new(),
        input_id,
        float,
        ctrl_held: false,
    })
}

inventory::submit! {
    ComponentRegistration::new("number_input", construct)
}
