//! Text input: change coalescing plus the optional extras a rendered
//! text field can carry. A character counter tracks the value length
//! while the server enforces `max_length`; Enter can stand in for the
//! form's submit button; `typeahead` turns keystrokes into server
//! lookups whose results are ranked client-side and written into the
//! input's suggestion region.

use log::{debug, warn};
use nucleo_matcher::pattern::{AtomKind, CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Config, Matcher, Utf32Str};
use pagedom::{Document, KeyEvent, Node, keys};
use serde_json::{Map, Value};

use crate::component::{Component, ComponentCore, Dispatchable, Identifiable};
use crate::context::{EventCtx, ResponseCallback};
use crate::envelope::EventId;
use crate::form::{ChangeCoalescing, Coalescer};
use crate::registry::ComponentRegistration;

pub struct TextInput {
    core: ComponentCore,
    coalescer: Coalescer,
    input_id: String,
}

impl TextInput {
    fn current_value(&self, doc: &Document) -> Option<String> {
        doc.value_of(&self.input_id).map(str::to_owned)
    }

    /// Mirror the value length into the `{input}_count` node. The node
    /// only exists when the template rendered a counter.
    fn update_count(&self, ctx: &mut EventCtx<'_>) {
        let length = ctx
            .doc
            .value_of(&self.input_id)
            .map_or(0, |value| value.chars().count());
        let _ = ctx
            .doc
            .set_text(&format!("{}_count", self.input_id), length.to_string());
    }

    /// Report one value through the change pipeline. The
    /// `data-initial-value` marker moves with it, so the drift check in
    /// [`after_response`](Component::after_response) only sees values
    /// this instance never reported.
    fn report(&mut self, ctx: &mut EventCtx<'_>, value: &str) {
        let _ = ctx.doc.set_attr(&self.input_id, "data-initial-value", value);
        self.change_value(ctx, value);
    }

    /// Enter pressed with `submit_form_on_enter`: make sure the server
    /// has the final value, then trigger the submit handler.
    fn submit(&mut self, ctx: &mut EventCtx<'_>) {
        if let Some(value) = self.current_value(ctx.doc) {
            self.report(ctx, &value);
        }
        self.fire_event(ctx, "submit", None, None);
    }

    /// Ask the server half for suggestions matching the current value.
    /// The response lands in the `{cid}_typeahead` region once it is
    /// ranked.
    fn lookup(&self, ctx: &mut EventCtx<'_>, query: &str) {
        let Some(event_name) = self.params().str_opt("type_func").map(str::to_owned) else {
            warn!("{} has typeahead but no type_func", self.cid());
            return;
        };
        let region = format!("{}_typeahead", self.cid());
        let ranking_query = query.to_owned();
        let mut params = Map::new();
        params.insert("query".to_owned(), Value::String(query.to_owned()));
        let callback: ResponseCallback = Box::new(move |ctx, data| {
            let ranked = rank_suggestions(&ranking_query, data);
            write_suggestions(ctx.doc, &region, ranked);
        });
        self.fire_event(ctx, &event_name, Some(params), Some(callback));
    }
}

impl Component for TextInput {
    fn core(&self) -> &ComponentCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ComponentCore {
        &mut self.core
    }

    fn type_name(&self) -> &'static str {
        "text_input"
    }

    fn on_key_up(&mut self, ctx: &mut EventCtx<'_>, _target: &str, ev: &mut KeyEvent) {
        let watches_keys =
            self.params().flag("show_count") || self.params().flag("submit_form_on_enter");
        if watches_keys {
            if self.params().u64_opt("max_length").is_some() {
                self.update_count(ctx);
            }
            if self.params().flag("submit_form_on_enter") && ev.code == keys::ENTER {
                self.submit(ctx);
            }
        }
        if self.params().flag("typeahead") {
            let query = self.current_value(ctx.doc);
            if let Some(query) = query {
                self.lookup(ctx, &query);
            }
        }
    }

    fn on_change(&mut self, ctx: &mut EventCtx<'_>, _target: &str, value: &str) {
        self.report(ctx, value);
    }

    fn on_blur(&mut self, ctx: &mut EventCtx<'_>, _target: &str) {
        let value = self.current_value(ctx.doc);
        if let Some(value) = value {
            self.report(ctx, &value);
        }
    }

    /// Runs on every settled response for this instance, so the extras
    /// rebind against whatever markup the server just confirmed.
    fn after_response(&mut self, ctx: &mut EventCtx<'_>, _data: &Value) {
        if self.params().flag("date") {
            let _ = ctx
                .doc
                .set_attr(&self.input_id, "data-enhance", "datetimepicker");
        }
        if self.params().flag("typeahead") {
            let _ = ctx.doc.set_attr(&self.input_id, "data-enhance", "typeahead");
        }

        // The surface may come back re-rendered with a value this
        // instance never reported. Fire the drift as one change.
        let value = self.current_value(ctx.doc);
        let initial = ctx
            .doc
            .attr_of(&self.input_id, "data-initial-value")
            .map(str::to_owned);
        if let Some(value) = value {
            if initial.as_deref() != Some(value.as_str()) {
                self.report(ctx, &value);
            }
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

impl ChangeCoalescing for TextInput {
    fn coalescer(&self) -> &Coalescer {
        &self.coalescer
    }

    fn coalescer_mut(&mut self) -> &mut Coalescer {
        &mut self.coalescer
    }
}

/// Order `[id, label]` suggestion pairs by fuzzy match quality against
/// the query, best first. Pairs the query does not match at all are
/// dropped; an empty query keeps the server's order. Anything that is
/// not a list of pairs ranks as no suggestions.
fn rank_suggestions(query: &str, data: &Value) -> Vec<(String, String)> {
    let Some(rows) = data.as_array() else {
        return Vec::new();
    };
    let pairs: Vec<(String, String)> = rows
        .iter()
        .filter_map(|row| {
            let row = row.as_array()?;
            let id = match row.first()? {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            let label = row.get(1)?.as_str()?.to_owned();
            Some((id, label))
        })
        .collect();
    if query.is_empty() {
        return pairs;
    }

    let mut matcher = Matcher::new(Config::DEFAULT);
    let pattern = Pattern::new(
        query,
        CaseMatching::Ignore,
        Normalization::Smart,
        AtomKind::Fuzzy,
    );
    let mut scored: Vec<(u32, (String, String))> = pairs
        .into_iter()
        .filter_map(|(id, label)| {
            let mut buf = Vec::new();
            let haystack = Utf32Str::new(&label, &mut buf);
            pattern
                .score(haystack, &mut matcher)
                .map(|score| (score, (id, label)))
        })
        .collect();
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.into_iter().map(|(_, pair)| pair).collect()
}

/// Replace the suggestion region's children with one anchor per pair.
fn write_suggestions(doc: &mut Document, region: &str, pairs: Vec<(String, String)>) {
    let Some(node) = doc.find_mut(region) else {
        debug!("no suggestion region {region:?}");
        return;
    };
    node.children = pairs
        .into_iter()
        .map(|(id, label)| {
            Node::anchor()
                .class("typeahead-item")
                .attr("data-id", id)
                .text(label)
        })
        .collect();
}

fn construct(core: ComponentCore, _ctx: &mut EventCtx<'_>) -> Box<dyn Component> {
    let input_id = format!("{}_input", core.cid());
    Box::new(TextInput {
        core,
        coalescer: Coalescer::new(),
        input_id,
    })
}

inventory::submit! {
    ComponentRegistration::new("text_input", construct)
}
