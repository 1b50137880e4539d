//! Per-instance configuration rendered into the page by the server.

use log::warn;
use serde_json::{Map, Value};

/// Configuration a component or widget instance was rendered with.
///
/// Keys are free-form JSON; what a given instance reads is up to its
/// type. The leaves in this crate use: `event_name`,
/// `double_click_event_name`, `stop_propagration_on_click` (sic, the
/// server contract carries the typo), `fire_change_immediately`,
/// `show_count`, `max_length`, `submit_form_on_enter`, `date`,
/// `typeahead`, `type_func`, and `on_change`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params(Map<String, Value>);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap a rendered params object. Anything that is not a JSON
    /// object collapses to empty with a warning; the server only ever
    /// renders objects here.
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map),
            Value::Null => Self::default(),
            other => {
                warn!("params must be an object, got {other}; using empty params");
                Self::default()
            }
        }
    }

    /// Builder-style insert, mostly for tests and demos.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Truthiness the way rendered templates use it: absent, `null`,
    /// `false`, `0`, and `""` are off; everything else is on.
    pub fn flag(&self, key: &str) -> bool {
        match self.0.get(key) {
            None | Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        }
    }

    pub fn str_opt(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn u64_opt(&self, key: &str) -> Option<u64> {
        self.0.get(key).and_then(Value::as_u64)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Map<String, Value>> for Params {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
