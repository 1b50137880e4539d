/// Browser key codes, as delivered by keydown/keyup.
pub mod keys {
    pub const BACKSPACE: u16 = 8;
    pub const TAB: u16 = 9;
    pub const ENTER: u16 = 13;
    pub const CTRL: u16 = 17;
    pub const ESCAPE: u16 = 27;
    pub const END: u16 = 35;
    pub const HOME: u16 = 36;
    pub const ARROW_LEFT: u16 = 37;
    pub const ARROW_UP: u16 = 38;
    pub const ARROW_RIGHT: u16 = 39;
    pub const ARROW_DOWN: u16 = 40;
    pub const DELETE: u16 = 46;
    pub const DIGIT_0: u16 = 48;
    pub const DIGIT_9: u16 = 57;
    pub const KEY_A: u16 = 65;
    pub const KEY_C: u16 = 67;
    pub const KEY_V: u16 = 86;
    pub const KEY_X: u16 = 88;
    pub const NUMPAD_DECIMAL: u16 = 110;
    pub const MINUS: u16 = 189;
    pub const PERIOD: u16 = 190;
}

/// User interaction with a node, targeted by node id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UiEvent {
    pub target: String,
    pub kind: UiEventKind,
}

impl UiEvent {
    pub fn new(target: impl Into<String>, kind: UiEventKind) -> Self {
        Self {
            target: target.into(),
            kind,
        }
    }

    pub fn click(target: impl Into<String>) -> Self {
        Self::new(target, UiEventKind::Click(ClickEvent::default()))
    }

    pub fn double_click(target: impl Into<String>) -> Self {
        Self::new(target, UiEventKind::DoubleClick(ClickEvent::default()))
    }

    pub fn key_down(target: impl Into<String>, code: u16, modifiers: Modifiers) -> Self {
        Self::new(target, UiEventKind::KeyDown(KeyEvent::new(code, modifiers)))
    }

    pub fn key_up(target: impl Into<String>, code: u16, modifiers: Modifiers) -> Self {
        Self::new(target, UiEventKind::KeyUp(KeyEvent::new(code, modifiers)))
    }

    pub fn change(target: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(
            target,
            UiEventKind::Change {
                value: value.into(),
            },
        )
    }

    pub fn blur(target: impl Into<String>) -> Self {
        Self::new(target, UiEventKind::Blur)
    }

    pub fn shown(target: impl Into<String>) -> Self {
        Self::new(target, UiEventKind::Shown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEventKind {
    Click(ClickEvent),
    DoubleClick(ClickEvent),
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    /// A form-ish node settled on a new value.
    Change { value: String },
    Blur,
    /// The node became visible (dialogs, panes).
    Shown,
}

/// Mutable click state; handlers flip the flags, the host reads them
/// back off the returned [`EventDisposition`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClickEvent {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl ClickEvent {
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub code: u16,
    pub modifiers: Modifiers,
    pub default_prevented: bool,
}

impl KeyEvent {
    pub fn new(code: u16, modifiers: Modifiers) -> Self {
        Self {
            code,
            modifiers,
            default_prevented: false,
        }
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
}

/// Key modifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

impl Modifiers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Default::default()
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Default::default()
        }
    }

    pub fn alt() -> Self {
        Self {
            alt: true,
            ..Default::default()
        }
    }

    pub fn none(&self) -> bool {
        !self.shift && !self.ctrl && !self.alt
    }
}

/// What the host should do with the browser-default action after an
/// event went through dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventDisposition {
    pub default_prevented: bool,
    pub propagation_stopped: bool,
}

impl EventDisposition {
    /// Read the flags back out of a dispatched event.
    pub fn of(kind: &UiEventKind) -> Self {
        match kind {
            UiEventKind::Click(ev) | UiEventKind::DoubleClick(ev) => Self {
                default_prevented: ev.default_prevented,
                propagation_stopped: ev.propagation_stopped,
            },
            UiEventKind::KeyDown(ev) | UiEventKind::KeyUp(ev) => Self {
                default_prevented: ev.default_prevented,
                propagation_stopped: false,
            },
            UiEventKind::Change { .. } | UiEventKind::Blur | UiEventKind::Shown => Self::default(),
        }
    }
}
